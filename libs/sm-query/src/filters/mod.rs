//! Clause builders for the structured filter objects.

mod annotation;
mod dataset;
mod fulltext;
mod term;

pub use annotation::{AnnotationFilter, ModifierFilter, FDR_EPSILON};
pub use dataset::{DatasetFilter, DatasetStatus, Polarity};
pub use fulltext::{simple_query_filter, SIMPLE_QUERY_FIELDS};
pub use term::{
    escape_wildcard, field_filter, format_mz, mz_range_filter, range_filter, term_filter,
    Interval, OneOrMany,
};
