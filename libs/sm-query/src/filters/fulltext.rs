//! Free text ("simple query") clause.

use crate::clause::Clause;
use crate::fields;

/// Fields searched by the simple query box.
pub const SIMPLE_QUERY_FIELDS: [&str; 2] = [fields::ALL, fields::DS_NAME_SEARCHABLE];

/// Query-parser clause over [`SIMPLE_QUERY_FIELDS`]; terms are ANDed.
pub fn simple_query_filter(query: &str) -> Clause {
    Clause::SimpleQueryString {
        query: query.to_string(),
        fields: SIMPLE_QUERY_FIELDS.iter().map(|f| f.to_string()).collect(),
    }
}
