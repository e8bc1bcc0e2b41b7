//! Sort order resolution.

use crate::fields;
use serde::Deserialize;
use serde_json::{json, Value};

/// Requested ordering of search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum OrderBy {
    #[serde(rename = "ORDER_BY_MZ")]
    Mz,
    #[serde(rename = "ORDER_BY_MSM")]
    Msm,
    #[serde(rename = "ORDER_BY_FDR_MSM")]
    FdrThenMsm,
    #[serde(rename = "ORDER_BY_DATASET")]
    DatasetThenMz,
    #[serde(rename = "ORDER_BY_FORMULA")]
    FormulaThenAdductThenFdr,
    #[serde(rename = "ORDER_BY_OFF_SAMPLE")]
    OffSample,
    #[serde(rename = "ORDER_BY_DATE")]
    Date,
    #[serde(rename = "ORDER_BY_NAME")]
    Name,
    /// No explicit order: the index's relevance order applies.
    #[serde(other)]
    Unspecified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortingOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn inverse(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

impl From<SortingOrder> for SortDirection {
    fn from(order: SortingOrder) -> Self {
        match order {
            SortingOrder::Ascending => Self::Ascending,
            SortingOrder::Descending => Self::Descending,
        }
    }
}

/// One field of a (possibly multi-field) sort.
///
/// Documents missing the field always sort last, whatever the direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: &'static str,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: &'static str, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn to_json(&self) -> Value {
        json!({
            self.field: {
                "order": self.direction.as_str(),
                "missing": "_last",
                // keeps the index from failing on shards where the field was never mapped
                "unmapped_type": "keyword",
            }
        })
    }
}

impl OrderBy {
    /// Direction used when the caller does not pass a sorting order.
    pub fn default_direction(self) -> SortDirection {
        match self {
            Self::Msm | Self::Date => SortDirection::Descending,
            _ => SortDirection::Ascending,
        }
    }
}

/// Resolve an ordering into the list of field sorts to send to the index.
///
/// An explicit `sorting_order` overrides the default direction of every field,
/// except that for [`OrderBy::FdrThenMsm`] the MSM tie-break always runs
/// opposite to the FDR direction so the best scores surface first within an
/// FDR level.
pub fn resolve_sort(order_by: OrderBy, sorting_order: Option<SortingOrder>) -> Vec<SortSpec> {
    let dir = sorting_order
        .map(SortDirection::from)
        .unwrap_or_else(|| order_by.default_direction());

    match order_by {
        OrderBy::Mz => vec![SortSpec::new(fields::MZ, dir)],
        OrderBy::Msm => vec![SortSpec::new(fields::MSM, dir)],
        OrderBy::FdrThenMsm => vec![
            SortSpec::new(fields::FDR, dir),
            SortSpec::new(fields::MSM, dir.inverse()),
        ],
        OrderBy::DatasetThenMz => vec![
            SortSpec::new(fields::DS_NAME, dir),
            SortSpec::new(fields::MZ, dir),
        ],
        OrderBy::FormulaThenAdductThenFdr => vec![
            SortSpec::new(fields::FORMULA, dir),
            SortSpec::new(fields::ADDUCT, dir),
            SortSpec::new(fields::FDR, dir),
        ],
        OrderBy::OffSample => vec![SortSpec::new(fields::OFF_SAMPLE_PROB, dir)],
        OrderBy::Date => vec![
            SortSpec::new(fields::DS_STATUS_UPDATE_DT, dir),
            SortSpec::new(fields::DS_LAST_FINISHED, dir),
        ],
        OrderBy::Name => vec![SortSpec::new(fields::DS_NAME, dir)],
        OrderBy::Unspecified => Vec::new(),
    }
}
