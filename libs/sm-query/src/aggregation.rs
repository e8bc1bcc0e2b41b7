//! Grouped counts.
//!
//! A grouping over fields `[f0, f1, .., fn]` is requested as nested terms
//! aggregations, `f0` outermost and `fn` innermost. The index answers with a
//! bucket tree of the same shape, which [`flatten`] unfolds into one row per
//! distinct combination of values.
//!
//! Each level asks for at most [`TERMS_PER_LEVEL`] distinct values and no
//! "other" bucket is requested, so groups past that cap are not counted.

use crate::error::{QueryError, Result};
use crate::fields::{self, GroupingField};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Distinct values requested per grouping level.
pub const TERMS_PER_LEVEL: u32 = 1000;

/// Distinct datasets requested by the per-dataset count.
pub const PER_DATASET_BUCKETS: u32 = 1_000_000;

/// Aggregation name used by the per-dataset count.
pub const PER_DATASET_AGG: &str = fields::DS_ID;

/// Aggregation name used by single-field value counts.
pub const FIELD_COUNTS_AGG: &str = "field_counts";

/// Aggregation name -> buckets.
pub type BucketTree = BTreeMap<String, Vec<Bucket>>;

/// One bucket of a terms aggregation, with its nested sub-aggregations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub key: String,
    pub doc_count: u64,
    pub children: BucketTree,
}

impl Bucket {
    pub fn leaf(key: impl Into<String>, doc_count: u64) -> Self {
        Self {
            key: key.into(),
            doc_count,
            children: BucketTree::new(),
        }
    }

    pub fn with_children(
        key: impl Into<String>,
        doc_count: u64,
        name: impl Into<String>,
        buckets: Vec<Bucket>,
    ) -> Self {
        let mut children = BucketTree::new();
        children.insert(name.into(), buckets);
        Self {
            key: key.into(),
            doc_count,
            children,
        }
    }
}

/// One row of a grouped count.
///
/// `field_values` follows the order the grouping fields were requested in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenedCount {
    pub field_values: Vec<String>,
    pub count: u64,
}

/// The single row returned when no grouping field is requested.
pub fn ungrouped_count(count: u64) -> Vec<FlattenedCount> {
    vec![FlattenedCount {
        field_values: Vec::new(),
        count,
    }]
}

fn terms_source(field: &str, size: u32) -> Value {
    json!({ "field": field, "size": size })
}

/// Nested terms aggregation for `fields`, or `None` when there is nothing to
/// group by.
///
/// Built by folding from the last field to the first so that the first
/// field ends up outermost.
pub fn build_aggregation(fields: &[GroupingField]) -> Option<Value> {
    fields.iter().rev().fold(None, |inner, field| {
        let mut level = json!({ "terms": terms_source(field.field(), TERMS_PER_LEVEL) });
        if let Some(inner) = inner {
            level["aggs"] = inner;
        }
        Some(json!({ field.key(): level }))
    })
}

/// Single-level aggregation counting documents per dataset.
pub fn per_dataset_aggregation() -> Value {
    json!({
        PER_DATASET_AGG: {
            "terms": terms_source(fields::DS_ID, PER_DATASET_BUCKETS)
        }
    })
}

/// Single-level aggregation counting documents per value of `field`.
pub fn field_counts_aggregation(field: GroupingField) -> Value {
    json!({
        FIELD_COUNTS_AGG: { "terms": terms_source(field.field(), TERMS_PER_LEVEL) }
    })
}

#[derive(Deserialize)]
struct RawBucket {
    key: Value,
    #[serde(default)]
    key_as_string: Option<String>,
    doc_count: u64,
}

impl RawBucket {
    fn key_string(self) -> String {
        match (self.key_as_string, self.key) {
            (Some(s), _) => s,
            (None, Value::String(s)) => s,
            (None, other) => other.to_string(),
        }
    }
}

fn buckets_of<'a>(container: &'a Value, name: &str) -> Result<&'a Vec<Value>> {
    container
        .get(name)
        .and_then(|agg| agg.get("buckets"))
        .and_then(Value::as_array)
        .ok_or_else(|| {
            QueryError::MalformedResponse(format!("missing buckets for aggregation {}", name))
        })
}

fn parse_bucket(raw: &Value) -> Result<(String, u64)> {
    let bucket = RawBucket::deserialize(raw)
        .map_err(|e| QueryError::MalformedResponse(format!("invalid bucket: {}", e)))?;
    let doc_count = bucket.doc_count;
    Ok((bucket.key_string(), doc_count))
}

fn parse_level(container: &Value, fields: &[GroupingField], idx: usize) -> Result<BucketTree> {
    let name = fields[idx].key();
    let mut buckets = Vec::new();
    for raw in buckets_of(container, name)? {
        let (key, doc_count) = parse_bucket(raw)?;
        let children = if idx + 1 < fields.len() {
            parse_level(raw, fields, idx + 1)?
        } else {
            BucketTree::new()
        };
        buckets.push(Bucket {
            key,
            doc_count,
            children,
        });
    }

    let mut tree = BucketTree::new();
    tree.insert(name.to_string(), buckets);
    Ok(tree)
}

/// Decode the `aggregations` section of a response to a request built by
/// [`build_aggregation`] for the same `fields`.
pub fn parse_bucket_tree(aggregations: &Value, fields: &[GroupingField]) -> Result<BucketTree> {
    if fields.is_empty() {
        return Ok(BucketTree::new());
    }
    parse_level(aggregations, fields, 0)
}

/// Flatten a bucket tree into `(field values, count)` rows.
///
/// At `idx` the buckets of `fields[idx]` are read. The last field emits one
/// row per bucket; every other field recurses into each bucket's
/// sub-aggregation for `fields[idx + 1]` and prepends the bucket key to the
/// rows found there.
pub fn flatten(
    fields: &[GroupingField],
    tree: &BucketTree,
    idx: usize,
) -> Result<Vec<FlattenedCount>> {
    let Some(field) = fields.get(idx) else {
        return Err(QueryError::InvalidArgument(format!(
            "grouping level {} out of range for {} fields",
            idx,
            fields.len()
        )));
    };
    let buckets = tree.get(field.key()).ok_or_else(|| {
        QueryError::MalformedResponse(format!("missing buckets for aggregation {}", field))
    })?;

    let mut counts = Vec::new();
    for bucket in buckets {
        if idx + 1 == fields.len() {
            counts.push(FlattenedCount {
                field_values: vec![bucket.key.clone()],
                count: bucket.doc_count,
            });
            continue;
        }

        for nested in flatten(fields, &bucket.children, idx + 1)? {
            let mut field_values = Vec::with_capacity(fields.len() - idx);
            field_values.push(bucket.key.clone());
            field_values.extend(nested.field_values);
            counts.push(FlattenedCount {
                field_values,
                count: nested.count,
            });
        }
    }
    Ok(counts)
}

/// Decode and flatten a grouped-count response in one step.
pub fn decode_grouped_counts(
    fields: &[GroupingField],
    aggregations: &Value,
) -> Result<Vec<FlattenedCount>> {
    let tree = parse_bucket_tree(aggregations, fields)?;
    flatten(fields, &tree, 0)
}

/// Decode a single-level terms aggregation into `key -> count`.
pub fn decode_value_counts(aggregations: &Value, name: &str) -> Result<BTreeMap<String, u64>> {
    buckets_of(aggregations, name)?
        .iter()
        .map(parse_bucket)
        .collect()
}
