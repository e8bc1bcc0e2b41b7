//! Result paging and its hard ceiling.

use crate::error::{QueryError, Result};

/// Largest page a caller may request. Requests above it are rejected, never
/// clamped.
pub const MAX_PAGE_SIZE: u64 = 50_000;

/// `from`/`size` window over the hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Page {
    pub offset: u64,
    /// `None` leaves the page size to the index default.
    pub limit: Option<u64>,
}

impl Page {
    pub fn new(offset: u64, limit: Option<u64>) -> Result<Self> {
        let page = Self { offset, limit };
        page.validate()?;
        Ok(page)
    }

    /// A single-hit page, used by lookups by id.
    pub fn first() -> Self {
        Self {
            offset: 0,
            limit: Some(1),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.limit {
            Some(limit) if limit > MAX_PAGE_SIZE => Err(QueryError::InvalidArgument(format!(
                "limit={} exceeds the maximum page size of {}",
                limit, MAX_PAGE_SIZE
            ))),
            _ => Ok(()),
        }
    }
}
