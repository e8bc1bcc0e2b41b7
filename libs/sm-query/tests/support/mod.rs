//! In-memory stand-in for the document index.
//!
//! Evaluates rendered clauses and terms aggregations against JSON documents
//! so tests can assert on what a query matches rather than on its shape.
//! Only the subset of the query DSL produced by `sm-query` is supported.

#![allow(dead_code)]

use serde_json::{json, Map, Value};
use sm_query::{ComposedQuery, DocType};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Build a document of the given kind from a JSON object.
pub fn doc(doc_type: DocType, id: &str, fields: Value) -> Value {
    let mut obj = match fields {
        Value::Object(map) => map,
        other => panic!("document fields must be an object, got {}", other),
    };
    obj.insert("_type".to_string(), json!(doc_type.as_str()));
    obj.insert("_id".to_string(), json!(id));
    Value::Object(obj)
}

/// Dataset visibility attributes with sensible private defaults.
pub fn visibility(public: bool, submitter: &str) -> Map<String, Value> {
    let mut m = Map::new();
    m.insert("ds_is_public".into(), json!(public));
    m.insert("ds_submitter_id".into(), json!(submitter));
    m.insert("ds_group_id".into(), Value::Null);
    m.insert("ds_group_approved".into(), json!(false));
    m.insert("ds_project_ids".into(), json!([]));
    m
}

/// Ids of `docs` matched by `query`, in input order.
pub fn matching_ids<'a>(query: &ComposedQuery, docs: &'a [Value]) -> Vec<&'a str> {
    docs.iter()
        .filter(|d| query_matches(query, d))
        .map(|d| d["_id"].as_str().unwrap())
        .collect()
}

pub fn query_matches(query: &ComposedQuery, doc: &Value) -> bool {
    query
        .must_filters()
        .iter()
        .all(|clause| matches(&clause.to_json(), doc))
}

/// All values reachable at a dotted path, descending through arrays.
pub fn values_at(doc: &Value, path: &str) -> Vec<Value> {
    let mut current = vec![doc.clone()];
    for segment in path.split('.') {
        let mut next = Vec::new();
        for v in current {
            match v {
                Value::Object(map) => {
                    if let Some(child) = map.get(segment) {
                        next.push(child.clone());
                    }
                }
                Value::Array(items) => {
                    for item in items {
                        if let Some(child) = item.get(segment) {
                            next.push(child.clone());
                        }
                    }
                }
                _ => {}
            }
        }
        current = next;
    }
    current
        .into_iter()
        .flat_map(|v| match v {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => vec![other],
        })
        .collect()
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn equals(a: &Value, b: &Value) -> bool {
    compare(a, b) == Some(Ordering::Equal)
}

fn single_entry(obj: &Value) -> (&String, &Value) {
    let map = obj.as_object().expect("clause body must be an object");
    assert_eq!(map.len(), 1, "expected single-field clause: {}", obj);
    map.iter().next().unwrap()
}

fn glob_matches(pattern: &[char], text: &[char]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some(('*', rest)) => (0..=text.len()).any(|i| glob_matches(rest, &text[i..])),
        Some(('?', rest)) => !text.is_empty() && glob_matches(rest, &text[1..]),
        Some(('\\', rest)) => match (rest.split_first(), text.split_first()) {
            (Some((p, prest)), Some((t, trest))) => p == t && glob_matches(prest, trest),
            _ => false,
        },
        Some((p, rest)) => match text.split_first() {
            Some((t, trest)) => p == t && glob_matches(rest, trest),
            None => false,
        },
    }
}

/// Evaluate one rendered clause against a document.
pub fn matches(clause: &Value, doc: &Value) -> bool {
    let (kind, body) = single_entry(clause);
    match kind.as_str() {
        "term" => {
            let (field, target) = single_entry(body);
            values_at(doc, field).iter().any(|v| equals(v, target))
        }
        "terms" => {
            let (field, targets) = single_entry(body);
            let targets = targets.as_array().expect("terms takes an array");
            values_at(doc, field)
                .iter()
                .any(|v| targets.iter().any(|t| equals(v, t)))
        }
        "range" => {
            let (field, bounds) = single_entry(body);
            values_at(doc, field).iter().any(|v| {
                let above = compare(v, &bounds["gte"])
                    .map(|o| o != Ordering::Less)
                    .unwrap_or(false);
                let below = compare(v, &bounds["lt"])
                    .map(|o| o == Ordering::Less)
                    .unwrap_or(false);
                above && below
            })
        }
        "wildcard" => {
            let (field, spec) = single_entry(body);
            let (pattern, fold) = match spec {
                Value::String(pattern) => (pattern.as_str(), false),
                _ => (
                    spec["value"].as_str().expect("wildcard takes a value"),
                    spec["case_insensitive"].as_bool().unwrap_or(false),
                ),
            };
            let fold_case = |s: &str| if fold { s.to_lowercase() } else { s.to_string() };
            let pattern: Vec<char> = fold_case(pattern).chars().collect();
            values_at(doc, field).iter().any(|v| {
                let text: Vec<char> = fold_case(v.as_str().unwrap_or_default()).chars().collect();
                glob_matches(&pattern, &text)
            })
        }
        "bool" => {
            let section = |name: &str| {
                body.get(name)
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default()
            };
            let filter = section("filter");
            let should = section("should");
            let must_not = section("must_not");

            filter.iter().all(|c| matches(c, doc))
                && (should.is_empty() || should.iter().any(|c| matches(c, doc)))
                && !must_not.iter().any(|c| matches(c, doc))
        }
        other => panic!("clause kind {} is not supported by the in-memory index", other),
    }
}

fn bucket_key(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Answer a (possibly nested) terms aggregation request like the index does:
/// buckets ordered by descending count, then key, truncated to `size`.
pub fn run_aggregations(request: &Value, docs: &[&Value]) -> Value {
    let mut out = Map::new();
    for (name, agg) in request.as_object().expect("aggs must be an object") {
        let terms = &agg["terms"];
        let field = terms["field"]
            .as_str()
            .expect("only field-based terms aggregations are supported");
        let size = terms["size"].as_u64().unwrap_or(10) as usize;

        let mut groups: BTreeMap<String, Vec<&Value>> = BTreeMap::new();
        for d in docs {
            for v in values_at(d, field) {
                groups.entry(bucket_key(&v)).or_default().push(d);
            }
        }
        let mut groups: Vec<(String, Vec<&Value>)> = groups.into_iter().collect();
        groups.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(&b.0)));
        groups.truncate(size);

        let buckets: Vec<Value> = groups
            .into_iter()
            .map(|(key, members)| {
                let mut bucket = Map::new();
                bucket.insert("key".into(), json!(key));
                bucket.insert("doc_count".into(), json!(members.len()));
                if let Some(sub) = agg.get("aggs") {
                    if let Value::Object(nested) = run_aggregations(sub, &members) {
                        bucket.extend(nested);
                    }
                }
                Value::Object(bucket)
            })
            .collect();

        out.insert(name.clone(), json!({ "buckets": buckets }));
    }
    Value::Object(out)
}
