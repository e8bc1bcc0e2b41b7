//! Index field registry.
//!
//! Maps the typed filter and grouping keys onto the paths of the index
//! mapping. A few keys are not stored as a field at all and are computed by
//! an index-side script instead; [`FieldRef`] keeps that distinction visible.

use crate::error::{QueryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Document discriminator and identity
pub const DOC_TYPE: &str = "_type";
pub const DOC_ID: &str = "_id";

// Dataset attributes (embedded into annotation documents at index time)
pub const DS_ID: &str = "ds_id";
pub const DS_NAME: &str = "ds_name";
pub const DS_NAME_SEARCHABLE: &str = "ds_name.searchable";
pub const DS_STATUS: &str = "ds_status";
pub const DS_STATUS_UPDATE_DT: &str = "ds_status_update_dt";
pub const DS_LAST_FINISHED: &str = "ds_last_finished";
pub const DS_IS_PUBLIC: &str = "ds_is_public";
pub const DS_SUBMITTER_ID: &str = "ds_submitter_id";
pub const DS_SUBMITTER_NAME: &str = "ds_submitter_name";
pub const DS_GROUP_ID: &str = "ds_group_id";
pub const DS_GROUP_SHORT_NAME: &str = "ds_group_short_name";
pub const DS_GROUP_APPROVED: &str = "ds_group_approved";
pub const DS_PROJECT_IDS: &str = "ds_project_ids";

// Dataset metadata
pub const META_POLARITY: &str = "ds_meta.MS_Analysis.Polarity";
pub const META_IONISATION_SOURCE: &str = "ds_meta.MS_Analysis.Ionisation_Source";
pub const META_ANALYZER: &str = "ds_meta.MS_Analysis.Analyzer";
pub const META_ORGANISM: &str = "ds_meta.Sample_Information.Organism";
pub const META_ORGANISM_PART: &str = "ds_meta.Sample_Information.Organism_Part";
pub const META_CONDITION: &str = "ds_meta.Sample_Information.Condition";
pub const META_GROWTH_CONDITIONS: &str = "ds_meta.Sample_Information.Sample_Growth_Conditions";
pub const META_MALDI_MATRIX: &str = "ds_meta.Sample_Preparation.MALDI_Matrix";
pub const META_DATA_TYPE: &str = "ds_meta.Data_Type";

// Annotation attributes
pub const DB_NAME: &str = "db_name";
pub const FORMULA: &str = "formula";
pub const ADDUCT: &str = "adduct";
pub const CHEM_MOD: &str = "chem_mod";
pub const NEUTRAL_LOSS: &str = "neutral_loss";
pub const ION: &str = "ion";
pub const ION_FORMULA: &str = "ion_formula";
pub const ISOBAR_ION_FORMULA: &str = "isobars.ion_formula";
pub const MZ: &str = "mz";
pub const MSM: &str = "msm";
pub const FDR: &str = "fdr";
pub const COMP_NAMES: &str = "comp_names";
pub const OFF_SAMPLE_PROB: &str = "off_sample_prob";
pub const OFF_SAMPLE_LABEL: &str = "off_sample_label";

/// Catch-all field used by free text search.
pub const ALL: &str = "_all";

const SUBMITTER_FULL_NAME_SCRIPT: &str = "doc['ds_meta.Submitted_By.Submitter.First_Name'].value \
     + ' ' + doc['ds_meta.Submitted_By.Submitter.Surname'].value";

/// Where the value of a registry key comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRef {
    /// A stored field path.
    Direct(&'static str),
    /// A painless expression evaluated per document.
    Scripted(&'static str),
}

/// Dataset-level filter keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetFilterKey {
    Ids,
    Name,
    Submitter,
    SubmitterName,
    Group,
    Project,
    Polarity,
    IonisationSource,
    AnalyzerType,
    Organism,
    OrganismPart,
    Condition,
    GrowthConditions,
    MaldiMatrix,
    MetadataType,
    Status,
}

impl DatasetFilterKey {
    pub const fn field(self) -> FieldRef {
        use FieldRef::{Direct, Scripted};
        match self {
            Self::Ids => Direct(DS_ID),
            Self::Name => Direct(DS_NAME),
            Self::Submitter => Direct(DS_SUBMITTER_ID),
            Self::SubmitterName => Scripted(SUBMITTER_FULL_NAME_SCRIPT),
            Self::Group => Direct(DS_GROUP_ID),
            Self::Project => Direct(DS_PROJECT_IDS),
            Self::Polarity => Direct(META_POLARITY),
            Self::IonisationSource => Direct(META_IONISATION_SOURCE),
            Self::AnalyzerType => Direct(META_ANALYZER),
            Self::Organism => Direct(META_ORGANISM),
            Self::OrganismPart => Direct(META_ORGANISM_PART),
            Self::Condition => Direct(META_CONDITION),
            Self::GrowthConditions => Direct(META_GROWTH_CONDITIONS),
            Self::MaldiMatrix => Direct(META_MALDI_MATRIX),
            Self::MetadataType => Direct(META_DATA_TYPE),
            Self::Status => Direct(DS_STATUS),
        }
    }
}

/// Fields a count can be grouped by.
///
/// Serialized with the wire keys used by API clients (`DF_POLARITY`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupingField {
    #[serde(rename = "DF_GROUP")]
    Group,
    #[serde(rename = "DF_SUBMITTER_NAME")]
    SubmitterName,
    #[serde(rename = "DF_POLARITY")]
    Polarity,
    #[serde(rename = "DF_ION_SOURCE")]
    IonSource,
    #[serde(rename = "DF_ANALYZER_TYPE")]
    AnalyzerType,
    #[serde(rename = "DF_ORGANISM")]
    Organism,
    #[serde(rename = "DF_ORGANISM_PART")]
    OrganismPart,
    #[serde(rename = "DF_CONDITION")]
    Condition,
    #[serde(rename = "DF_GROWTH_CONDITIONS")]
    GrowthConditions,
    #[serde(rename = "DF_MALDI_MATRIX")]
    MaldiMatrix,
    #[serde(rename = "DF_STATUS")]
    Status,
}

impl GroupingField {
    pub const ALL: [GroupingField; 11] = [
        Self::Group,
        Self::SubmitterName,
        Self::Polarity,
        Self::IonSource,
        Self::AnalyzerType,
        Self::Organism,
        Self::OrganismPart,
        Self::Condition,
        Self::GrowthConditions,
        Self::MaldiMatrix,
        Self::Status,
    ];

    /// Wire key, also used as the aggregation name in requests and responses.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Group => "DF_GROUP",
            Self::SubmitterName => "DF_SUBMITTER_NAME",
            Self::Polarity => "DF_POLARITY",
            Self::IonSource => "DF_ION_SOURCE",
            Self::AnalyzerType => "DF_ANALYZER_TYPE",
            Self::Organism => "DF_ORGANISM",
            Self::OrganismPart => "DF_ORGANISM_PART",
            Self::Condition => "DF_CONDITION",
            Self::GrowthConditions => "DF_GROWTH_CONDITIONS",
            Self::MaldiMatrix => "DF_MALDI_MATRIX",
            Self::Status => "DF_STATUS",
        }
    }

    /// Stored field the terms aggregation runs on.
    pub const fn field(self) -> &'static str {
        match self {
            // Groups and submitters are faceted by display name, not id.
            Self::Group => DS_GROUP_SHORT_NAME,
            Self::SubmitterName => DS_SUBMITTER_NAME,
            Self::Polarity => META_POLARITY,
            Self::IonSource => META_IONISATION_SOURCE,
            Self::AnalyzerType => META_ANALYZER,
            Self::Organism => META_ORGANISM,
            Self::OrganismPart => META_ORGANISM_PART,
            Self::Condition => META_CONDITION,
            Self::GrowthConditions => META_GROWTH_CONDITIONS,
            Self::MaldiMatrix => META_MALDI_MATRIX,
            Self::Status => DS_STATUS,
        }
    }

    /// Parse a list of wire keys, rejecting the first unknown one.
    pub fn parse_list<S: AsRef<str>>(keys: &[S]) -> Result<Vec<GroupingField>> {
        keys.iter().map(|k| k.as_ref().parse()).collect()
    }
}

impl FromStr for GroupingField {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.key() == s)
            .ok_or_else(|| QueryError::InvalidArgument(format!("Unknown grouping field: {}", s)))
    }
}

impl fmt::Display for GroupingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
