//! The analysis report and its JSON form.

use serde::{Serialize, Serializer};
use skrifa::Tag;

use crate::{
    classify::Classification,
    coverage::ScriptAnalysis,
    font::{FontTables, OutlineFormat},
    metrics::{Measurements, MetricOrigins, MetricVector},
    personality::{PersonalitySummary, TraitScores},
    recommend::Recommendation,
    variation::VariationAnalysis,
};

/// Identifying information about the analyzed font.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct FontInfo {
    pub id: String,
    pub family_name: Option<String>,
    pub full_name: Option<String>,
    pub outline_format: Option<OutlineFormat>,
    pub units_per_em: u16,
    pub glyph_count: u16,
    pub is_variable: bool,
}

impl FontInfo {
    pub fn new(id: &str, tables: &FontTables) -> Self {
        Self {
            id: id.to_string(),
            family_name: tables.family_name(),
            full_name: tables.full_name(),
            outline_format: tables.outline_format(),
            units_per_em: tables.units_per_em(),
            glyph_count: tables.glyph_count(),
            is_variable: tables.is_variable(),
        }
    }
}

/// Outcome of the variable axis analysis.
///
/// Serializes as `"not_requested"`, `"not_applicable"` or the analysis
/// object.
#[derive(Clone, PartialEq, Debug)]
pub enum VariableAnalysis {
    NotRequested,
    /// Requested, but the font has no variation axes.
    NotApplicable,
    Analyzed(VariationAnalysis),
}

impl VariableAnalysis {
    pub fn analysis(&self) -> Option<&VariationAnalysis> {
        match self {
            Self::Analyzed(analysis) => Some(analysis),
            _ => None,
        }
    }
}

impl Serialize for VariableAnalysis {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::NotRequested => serializer.serialize_str("not_requested"),
            Self::NotApplicable => serializer.serialize_str("not_applicable"),
            Self::Analyzed(analysis) => analysis.serialize(serializer),
        }
    }
}

/// Everything derived from a single font.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct AnalysisReport {
    pub font: FontInfo,
    pub metrics: MetricVector,
    pub metric_origins: MetricOrigins,
    pub measurements: Measurements,
    pub classification: Classification,
    pub personality: TraitScores,
    pub summary: PersonalitySummary,
    pub recommendations: Vec<Recommendation>,
    pub variable_analysis: VariableAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_analysis: Option<ScriptAnalysis>,
}

impl AnalysisReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub(crate) fn serialize_tag<S: Serializer>(tag: &Tag, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(tag)
}
