//! Single-field clause helpers.

use crate::clause::Clause;
use crate::fields::FieldRef;
use serde::Deserialize;
use serde_json::Value;

/// A scalar or a set of scalars.
///
/// A set matches when the field equals any member.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> From<T> for OneOrMany<T> {
    fn from(value: T) -> Self {
        Self::One(value)
    }
}

impl<T> From<Vec<T>> for OneOrMany<T> {
    fn from(values: Vec<T>) -> Self {
        Self::Many(values)
    }
}

/// `min <= x < max`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

/// Encode an m/z value the way it is stored in the index.
///
/// m/z is indexed as a zero-padded string (`%012.6f`) so that lexicographic
/// and numeric order agree. Range bounds must use the same encoding or they
/// silently stop matching.
pub fn format_mz(mz: f64) -> String {
    format!("{:012.6}", mz)
}

/// Equality clause for a scalar, "one of" clause for a set.
pub fn term_filter<T>(field: &str, value: &OneOrMany<T>) -> Clause
where
    T: Clone + Into<Value>,
{
    match value {
        OneOrMany::One(v) => Clause::term(field, v.clone()),
        OneOrMany::Many(vs) => Clause::terms(field, vs.iter().cloned()),
    }
}

pub fn range_filter<T>(field: &str, interval: &Interval<T>) -> Clause
where
    T: Clone + Into<Value>,
{
    Clause::range(field, interval.min.clone(), interval.max.clone())
}

pub fn mz_range_filter(field: &str, interval: &Interval<f64>) -> Clause {
    Clause::range(field, format_mz(interval.min), format_mz(interval.max))
}

/// Equality clause against a registry field, stored or scripted.
pub fn field_filter<T>(field: FieldRef, value: &OneOrMany<T>) -> Clause
where
    T: Clone + Into<Value>,
{
    match field {
        FieldRef::Direct(path) => term_filter(path, value),
        FieldRef::Scripted(source) => {
            let script_eq = |v: &T| Clause::ScriptEquals {
                source: source.to_string(),
                value: v.clone().into(),
            };
            match value {
                OneOrMany::One(v) => script_eq(v),
                OneOrMany::Many(vs) => Clause::any_of(vs.iter().map(script_eq).collect()),
            }
        }
    }
}

/// Escape the metacharacters of a wildcard pattern.
pub fn escape_wildcard(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '*' | '?') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
