//! Dataset-level filters.
//!
//! These apply to both document kinds: annotation documents carry a copy of
//! their dataset's attributes.

use super::term::{field_filter, OneOrMany};
use crate::clause::Clause;
use crate::fields::DatasetFilterKey;
use serde::Deserialize;

/// Ion mode. Requested upper-case, indexed capitalised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "Positive",
            Self::Negative => "Negative",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DatasetStatus {
    Queued,
    Annotating,
    Finished,
    Failed,
}

impl DatasetStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Queued => "QUEUED",
            Self::Annotating => "ANNOTATING",
            Self::Finished => "FINISHED",
            Self::Failed => "FAILED",
        }
    }
}

/// Sparse dataset filter: every present field adds one constraint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DatasetFilter {
    pub ids: Option<Vec<String>>,
    pub name: Option<String>,
    /// Submitter user id.
    pub submitter: Option<String>,
    /// Submitter's full name as entered in the dataset metadata.
    pub submitter_name: Option<String>,
    pub group: Option<String>,
    pub project: Option<String>,
    pub polarity: Option<Polarity>,
    pub ionisation_source: Option<String>,
    pub analyzer_type: Option<String>,
    pub organism: Option<String>,
    pub organism_part: Option<String>,
    pub condition: Option<String>,
    pub growth_conditions: Option<String>,
    pub maldi_matrix: Option<String>,
    pub metadata_type: Option<String>,
    pub status: Option<DatasetStatus>,
}

impl DatasetFilter {
    /// Dataset filter matching a single dataset id.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            ids: Some(vec![id.into()]),
            ..Self::default()
        }
    }

    /// Present constraints, in registry order.
    fn constraints(&self) -> Vec<(DatasetFilterKey, OneOrMany<String>)> {
        use DatasetFilterKey as K;

        let single = |key: K, value: &Option<String>| {
            value.as_ref().map(|v| (key, OneOrMany::One(v.clone())))
        };

        [
            self.ids
                .as_ref()
                .map(|ids| (K::Ids, OneOrMany::Many(ids.clone()))),
            single(K::Name, &self.name),
            single(K::Submitter, &self.submitter),
            single(K::SubmitterName, &self.submitter_name),
            single(K::Group, &self.group),
            single(K::Project, &self.project),
            self.polarity
                .map(|p| (K::Polarity, OneOrMany::One(p.as_str().to_string()))),
            single(K::IonisationSource, &self.ionisation_source),
            single(K::AnalyzerType, &self.analyzer_type),
            single(K::Organism, &self.organism),
            single(K::OrganismPart, &self.organism_part),
            single(K::Condition, &self.condition),
            single(K::GrowthConditions, &self.growth_conditions),
            single(K::MaldiMatrix, &self.maldi_matrix),
            single(K::MetadataType, &self.metadata_type),
            self.status
                .map(|s| (K::Status, OneOrMany::One(s.as_str().to_string()))),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// One clause per present constraint.
    pub fn clauses(&self) -> Vec<Clause> {
        self.constraints()
            .iter()
            .map(|(key, value)| field_filter(key.field(), value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_filter_adds_nothing() {
        assert!(DatasetFilter::default().clauses().is_empty());
    }

    #[test]
    fn metadata_keys_map_to_metadata_paths() {
        let filter = DatasetFilter {
            polarity: Some(Polarity::Negative),
            organism: Some("Homo sapiens".to_string()),
            ..DatasetFilter::default()
        };
        let rendered: Vec<_> = filter.clauses().iter().map(Clause::to_json).collect();
        assert_eq!(
            rendered,
            vec![
                json!({ "term": { "ds_meta.MS_Analysis.Polarity": "Negative" } }),
                json!({ "term": { "ds_meta.Sample_Information.Organism": "Homo sapiens" } }),
            ]
        );
    }

    #[test]
    fn ids_use_terms() {
        let filter = DatasetFilter {
            ids: Some(vec!["2020-01-01_00h00m00s".to_string(), "x".to_string()]),
            ..DatasetFilter::default()
        };
        assert_eq!(
            filter.clauses()[0].to_json(),
            json!({ "terms": { "ds_id": ["2020-01-01_00h00m00s", "x"] } })
        );
    }

    #[test]
    fn empty_string_is_a_constraint_not_unset() {
        let filter = DatasetFilter {
            maldi_matrix: Some(String::new()),
            ..DatasetFilter::default()
        };
        assert_eq!(filter.clauses().len(), 1);
    }

    #[test]
    fn submitter_name_filter_is_scripted() {
        let filter = DatasetFilter {
            submitter_name: Some("Jane Doe".to_string()),
            ..DatasetFilter::default()
        };
        assert!(matches!(
            filter.clauses()[0],
            Clause::ScriptEquals { .. }
        ));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let parsed: Result<DatasetFilter, _> =
            serde_json::from_value(json!({ "organism": "Mouse", "colour": "red" }));
        assert!(parsed.is_err());
    }
}
