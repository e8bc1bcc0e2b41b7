//! Filter clauses understood by the document index.
//!
//! Clauses are built once per request and never mutated afterwards. They are
//! opaque to callers: only [`Clause::to_json`] (used by the index executor)
//! gives them a concrete shape.

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

/// A single filter clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Field equals value.
    Term { field: String, value: Value },
    /// Field equals one of the values.
    Terms { field: String, values: Vec<Value> },
    /// `gte <= field < lt`
    Range { field: String, gte: Value, lt: Value },
    /// Case-insensitive shell-style pattern match (`*` and `?`).
    Wildcard { field: String, pattern: String },
    /// Equality against a value computed by an index-side script.
    ScriptEquals { source: String, value: Value },
    /// Query-parser based free text search over several fields. All terms
    /// must match.
    SimpleQueryString { query: String, fields: Vec<String> },
    Bool(BoolClause),
}

/// Boolean composition of clauses.
///
/// `filter` members are ANDed, `should` members are ORed (at least one must
/// match), `must_not` members are excluded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolClause {
    pub filter: Vec<Clause>,
    pub should: Vec<Clause>,
    pub must_not: Vec<Clause>,
}

impl Clause {
    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn terms<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::Terms {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn range(field: impl Into<String>, gte: impl Into<Value>, lt: impl Into<Value>) -> Self {
        Self::Range {
            field: field.into(),
            gte: gte.into(),
            lt: lt.into(),
        }
    }

    pub fn wildcard(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Wildcard {
            field: field.into(),
            pattern: pattern.into(),
        }
    }

    /// Matches when every clause matches.
    pub fn all_of(clauses: Vec<Clause>) -> Self {
        Self::Bool(BoolClause {
            filter: clauses,
            ..BoolClause::default()
        })
    }

    /// Matches when at least one clause matches.
    pub fn any_of(clauses: Vec<Clause>) -> Self {
        Self::Bool(BoolClause {
            should: clauses,
            ..BoolClause::default()
        })
    }

    /// Matches when none of the clauses match.
    pub fn none_of(clauses: Vec<Clause>) -> Self {
        Self::Bool(BoolClause {
            must_not: clauses,
            ..BoolClause::default()
        })
    }

    /// Render the clause in the index's query DSL.
    pub fn to_json(&self) -> Value {
        match self {
            Clause::Term { field, value } => json!({ "term": { field.as_str(): value } }),
            Clause::Terms { field, values } => json!({ "terms": { field.as_str(): values } }),
            Clause::Range { field, gte, lt } => json!({
                "range": { field.as_str(): { "gte": gte, "lt": lt } }
            }),
            Clause::Wildcard { field, pattern } => json!({
                "wildcard": {
                    field.as_str(): { "value": pattern, "case_insensitive": true }
                }
            }),
            Clause::ScriptEquals { source, value } => json!({
                "script": {
                    "script": {
                        "source": format!("({}) == params.value", source),
                        "lang": "painless",
                        "params": { "value": value },
                    }
                }
            }),
            Clause::SimpleQueryString { query, fields } => json!({
                "simple_query_string": {
                    "query": query,
                    "fields": fields,
                    "default_operator": "and",
                }
            }),
            Clause::Bool(b) => b.to_json(),
        }
    }
}

impl BoolClause {
    fn to_json(&self) -> Value {
        let render = |clauses: &[Clause]| {
            Value::Array(clauses.iter().map(Clause::to_json).collect::<Vec<_>>())
        };

        let mut body = Map::new();
        if !self.filter.is_empty() {
            body.insert("filter".to_string(), render(&self.filter));
        }
        if !self.should.is_empty() {
            body.insert("should".to_string(), render(&self.should));
            if self.filter.is_empty() {
                body.insert("minimum_should_match".to_string(), json!(1));
            }
        }
        if !self.must_not.is_empty() {
            body.insert("must_not".to_string(), render(&self.must_not));
        }
        json!({ "bool": body })
    }
}

impl Serialize for Clause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
