//! Annotation-level filters.

use super::term::{escape_wildcard, mz_range_filter, range_filter, term_filter, Interval, OneOrMany};
use crate::clause::Clause;
use crate::fields;
use serde::Deserialize;

/// Added to the FDR threshold so a document sitting exactly on the level is
/// not lost to floating point representation.
pub const FDR_EPSILON: f64 = 1e-3;

/// Constraint on a chemical modification or neutral loss.
///
/// The index stores "no modification" as an empty string, which is distinct
/// from the field being absent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ModifierFilter {
    /// Only annotations without a modification.
    None,
    /// Only annotations with exactly this modification.
    Only(String),
}

impl From<String> for ModifierFilter {
    fn from(raw: String) -> Self {
        if raw.is_empty() {
            Self::None
        } else {
            Self::Only(raw)
        }
    }
}

impl ModifierFilter {
    fn indexed_value(&self) -> &str {
        match self {
            Self::None => "",
            Self::Only(v) => v,
        }
    }
}

/// Sparse annotation filter: every present field adds one constraint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AnnotationFilter {
    pub ann_id: Option<String>,
    pub database: Option<String>,
    pub dataset_name: Option<String>,
    pub mz_filter: Option<Interval<f64>>,
    pub msm_score_filter: Option<Interval<f64>>,
    pub fdr_level: Option<f64>,
    pub sum_formula: Option<String>,
    pub chem_mod: Option<ModifierFilter>,
    pub neutral_loss: Option<ModifierFilter>,
    pub adduct: Option<String>,
    pub off_sample: Option<bool>,
    pub has_neutral_loss: Option<bool>,
    pub has_chem_mod: Option<bool>,
    pub has_hidden_adduct: Option<bool>,
    pub ion: Option<OneOrMany<String>>,
    pub ion_formula: Option<OneOrMany<String>>,
    pub isobaric_with: Option<OneOrMany<String>>,
    pub compound_query: Option<String>,
}

impl AnnotationFilter {
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            ann_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// One clause per present constraint.
    ///
    /// `hidden_adducts` is the configured set of adducts excluded by
    /// `has_hidden_adduct == false`.
    pub fn clauses(&self, hidden_adducts: &[String]) -> Vec<Clause> {
        let mut filters = Vec::new();

        if let Some(mz) = &self.mz_filter {
            filters.push(mz_range_filter(fields::MZ, mz));
        }
        if let Some(msm) = &self.msm_score_filter {
            filters.push(range_filter(fields::MSM, msm));
        }
        if let Some(level) = self.fdr_level {
            filters.push(Clause::range(fields::FDR, 0, level + FDR_EPSILON));
        }
        if let Some(id) = &self.ann_id {
            filters.push(Clause::term(fields::DOC_ID, id.as_str()));
        }
        if let Some(db) = &self.database {
            filters.push(Clause::term(fields::DB_NAME, db.as_str()));
        }
        if let Some(formula) = &self.sum_formula {
            filters.push(Clause::term(fields::FORMULA, formula.as_str()));
        }
        if let Some(chem_mod) = &self.chem_mod {
            filters.push(Clause::term(fields::CHEM_MOD, chem_mod.indexed_value()));
        }
        if let Some(loss) = &self.neutral_loss {
            filters.push(Clause::term(fields::NEUTRAL_LOSS, loss.indexed_value()));
        }
        if let Some(adduct) = &self.adduct {
            filters.push(Clause::term(fields::ADDUCT, adduct.as_str()));
        }
        if let Some(name) = &self.dataset_name {
            filters.push(Clause::term(fields::DS_NAME, name.as_str()));
        }
        if let Some(off_sample) = self.off_sample {
            let label = if off_sample { "off" } else { "on" };
            filters.push(Clause::term(fields::OFF_SAMPLE_LABEL, label));
        }
        if self.has_neutral_loss == Some(false) {
            filters.push(Clause::term(fields::NEUTRAL_LOSS, ""));
        }
        if self.has_chem_mod == Some(false) {
            filters.push(Clause::term(fields::CHEM_MOD, ""));
        }
        if self.has_hidden_adduct == Some(false) {
            filters.push(Clause::none_of(vec![Clause::terms(
                fields::ADDUCT,
                hidden_adducts.iter().map(String::as_str),
            )]));
        }
        if let Some(ion) = &self.ion {
            filters.push(term_filter(fields::ION, ion));
        }
        if let Some(ion_formula) = &self.ion_formula {
            filters.push(term_filter(fields::ION_FORMULA, ion_formula));
        }
        if let Some(isobaric_with) = &self.isobaric_with {
            filters.push(term_filter(fields::ISOBAR_ION_FORMULA, isobaric_with));
        }
        if let Some(query) = &self.compound_query {
            filters.push(compound_query_filter(query));
        }

        filters
    }
}

/// Case-insensitive substring match on compound names, or exact formula.
fn compound_query_filter(query: &str) -> Clause {
    Clause::any_of(vec![
        Clause::wildcard(
            fields::COMP_NAMES,
            format!("*{}*", escape_wildcard(&query.to_lowercase())),
        ),
        Clause::term(fields::FORMULA, query),
    ])
}
