//! Query layer for the dataset/annotation search index.
//!
//! Pure, synchronous builders used by the search service:
//! - [`query::QueryComposer`] assembles filters, visibility and sort into one query
//! - [`auth`] computes what a requester may see from identity and project roles
//! - [`sort`] resolves an ordering into field sorts
//! - [`aggregation`] builds grouped-count requests and flattens their responses
//!
//! Nothing here performs I/O. Executing queries is the caller's job.

pub mod aggregation;
pub mod auth;
pub mod clause;
pub mod error;
pub mod fields;
pub mod filters;
pub mod pagination;
pub mod query;
pub mod sort;

pub use aggregation::{Bucket, BucketTree, FlattenedCount};
pub use auth::{ProjectRole, Requester, RequesterIdentity, RoleMap, RoleMapState};
pub use clause::Clause;
pub use error::{QueryError, Result};
pub use fields::{DatasetFilterKey, FieldRef, GroupingField};
pub use filters::{AnnotationFilter, DatasetFilter, Interval, ModifierFilter, OneOrMany};
pub use pagination::{Page, MAX_PAGE_SIZE};
pub use query::{ComposedQuery, DocType, QueryArgs, QueryComposer};
pub use sort::{OrderBy, SortDirection, SortSpec, SortingOrder};
