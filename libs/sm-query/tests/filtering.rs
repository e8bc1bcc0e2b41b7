//! Annotation and dataset filters against an in-memory index.

mod support;

use serde_json::{json, Value};
use sm_query::filters::format_mz;
use sm_query::{DocType, QueryArgs, QueryComposer, Requester, RequesterIdentity, RoleMap};
use support::{doc, matching_ids};

fn annotation(id: &str, extra: Value) -> Value {
    let mut fields = json!({
        "ds_is_public": true,
        "ds_submitter_id": "someone",
        "ds_project_ids": [],
        "db_name": "HMDB",
        "adduct": "+H",
        "chem_mod": "",
        "neutral_loss": "",
        "ds_meta": { "MS_Analysis": { "Polarity": "Positive" } },
    });
    for (k, v) in extra.as_object().unwrap() {
        fields[k] = v.clone();
    }
    doc(DocType::Annotation, id, fields)
}

fn search(args: Value, docs: &[Value]) -> Vec<String> {
    let args: QueryArgs = serde_json::from_value(args).unwrap();
    let requester = Requester::new(RequesterIdentity::admin("root"), RoleMap::new());
    let query = QueryComposer::new(vec!["[M]+".to_string(), "[M]-".to_string()])
        .compose(&args, DocType::Annotation, &requester)
        .unwrap();
    matching_ids(&query, docs)
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[test]
fn fdr_level_keeps_annotations_on_the_threshold() {
    let docs = vec![
        annotation("fdr-05", json!({ "fdr": 0.05 })),
        annotation("fdr-10", json!({ "fdr": 0.1 })),
        annotation("fdr-20", json!({ "fdr": 0.2 })),
        annotation("fdr-30", json!({ "fdr": 0.1 + 0.2 })),
        annotation("fdr-50", json!({ "fdr": 0.5 })),
    ];
    assert_eq!(
        search(json!({ "filter": { "fdrLevel": 0.1 } }), &docs),
        vec!["fdr-05", "fdr-10"]
    );
    assert_eq!(
        search(json!({ "filter": { "fdrLevel": 0.3 } }), &docs),
        vec!["fdr-05", "fdr-10", "fdr-20", "fdr-30"]
    );
}

#[test]
fn mz_filter_compares_encoded_values() {
    let docs = vec![
        annotation("low", json!({ "mz": format_mz(99.5) })),
        annotation("edge", json!({ "mz": format_mz(100.0) })),
        annotation("mid", json!({ "mz": format_mz(150.25) })),
        annotation("high", json!({ "mz": format_mz(1000.0) })),
    ];
    assert_eq!(
        search(json!({ "filter": { "mzFilter": { "min": 100.0, "max": 200.0 } } }), &docs),
        vec!["edge", "mid"]
    );
}

#[test]
fn hidden_adducts_can_be_excluded() {
    let docs = vec![
        annotation("protonated", json!({ "adduct": "+H" })),
        annotation("radical-pos", json!({ "adduct": "[M]+" })),
        annotation("radical-neg", json!({ "adduct": "[M]-" })),
    ];
    assert_eq!(
        search(json!({ "filter": { "hasHiddenAdduct": false } }), &docs),
        vec!["protonated"]
    );
    assert_eq!(search(json!({ "filter": { "hasHiddenAdduct": true } }), &docs).len(), 3);
}

#[test]
fn missing_modifier_is_not_the_same_as_none() {
    let docs = vec![
        annotation("plain", json!({})),
        annotation("oxidised", json!({ "chem_mod": "+O" })),
        doc(DocType::Annotation, "legacy", json!({ "ds_is_public": true })),
    ];
    assert_eq!(
        search(json!({ "filter": { "hasChemMod": false } }), &docs),
        vec!["plain"]
    );
    assert_eq!(
        search(json!({ "filter": { "chemMod": "+O" } }), &docs),
        vec!["oxidised"]
    );
}

#[test]
fn compound_query_matches_names_case_insensitively_or_formula() {
    let docs = vec![
        annotation(
            "glucose",
            json!({ "formula": "C6H12O6", "comp_names": ["D-Glucose", "Dextrose"] }),
        ),
        annotation("fructose", json!({ "formula": "C6H12O6", "comp_names": ["Fructose"] })),
        annotation("other", json!({ "formula": "C5H10O5", "comp_names": ["Ribose"] })),
    ];
    assert_eq!(
        search(json!({ "filter": { "compoundQuery": "GLUCOSE" } }), &docs),
        vec!["glucose"]
    );
    assert_eq!(
        search(json!({ "filter": { "compoundQuery": "C6H12O6" } }), &docs),
        vec!["glucose", "fructose"]
    );
}

#[test]
fn wildcard_characters_in_compound_query_are_literal() {
    let docs = vec![
        annotation("star", json!({ "formula": "X", "comp_names": ["a*b"] })),
        annotation("plain", json!({ "formula": "Y", "comp_names": ["axxb"] })),
    ];
    assert_eq!(
        search(json!({ "filter": { "compoundQuery": "a*b" } }), &docs),
        vec!["star"]
    );
}

#[test]
fn isobar_filter_looks_inside_nested_isobars() {
    let docs = vec![
        annotation("with-isobar", json!({ "isobars": [ { "ion_formula": "C6H12O6+H" } ] })),
        annotation("without", json!({ "isobars": [] })),
    ];
    assert_eq!(
        search(json!({ "filter": { "isobaricWith": "C6H12O6+H" } }), &docs),
        vec!["with-isobar"]
    );
}

#[test]
fn dataset_and_annotation_filters_combine_with_and() {
    let docs = vec![
        annotation("pos-hmdb", json!({})),
        annotation("pos-chebi", json!({ "db_name": "ChEBI" })),
        annotation(
            "neg-hmdb",
            json!({ "ds_meta": { "MS_Analysis": { "Polarity": "Negative" } } }),
        ),
    ];
    assert_eq!(
        search(
            json!({
                "filter": { "database": "HMDB" },
                "datasetFilter": { "polarity": "POSITIVE" },
            }),
            &docs
        ),
        vec!["pos-hmdb"]
    );
}
