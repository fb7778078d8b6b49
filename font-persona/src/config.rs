//! Analysis options and normalization constants.

use std::{collections::BTreeSet, path::Path};

use serde::{Deserialize, Serialize};

use crate::{coverage::Script, Error};

/// Options controlling which analyses run for a font.
///
/// Every field has a default so partial JSON documents are accepted.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Run the variable axis analyzer when the font declares axes.
    pub generate_variable_analysis: bool,
    /// Run the script coverage analyzer.
    pub generate_script_analysis: bool,
    /// Scripts evaluated by the coverage analyzer.
    pub script_list: BTreeSet<Script>,
    /// Number of interior samples taken along each axis, in addition to
    /// the axis minimum and maximum.
    pub axis_sample_count: usize,
    /// Maximum number of missing code points listed per script.
    pub missing_sample_limit: usize,
    /// Constants used to normalize raw measurements.
    pub calibration: Calibration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            generate_variable_analysis: false,
            generate_script_analysis: false,
            script_list: Script::COMMON.iter().copied().collect(),
            axis_sample_count: 3,
            missing_sample_limit: 16,
            calibration: Calibration::default(),
        }
    }
}

impl AnalysisConfig {
    /// Loads a configuration from a JSON document on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| Error::Config {
            path: path.to_owned(),
            source,
        })
    }

    /// Enables every optional analysis.
    pub fn with_all_analyses(mut self) -> Self {
        self.generate_variable_analysis = true;
        self.generate_script_analysis = true;
        self
    }
}

/// A three point piecewise linear mapping onto `[0, 1]`.
///
/// Values at or below `low` map to 0, `mid` maps to 0.5 and values at or
/// above `high` map to 1. Non-finite input maps to the neutral 0.5.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Ramp {
    pub low: f32,
    pub mid: f32,
    pub high: f32,
}

impl Ramp {
    pub const fn new(low: f32, mid: f32, high: f32) -> Self {
        Self { low, mid, high }
    }

    pub fn map(&self, value: f32) -> f32 {
        if !value.is_finite() {
            return 0.5;
        }
        if value <= self.low {
            0.0
        } else if value >= self.high {
            1.0
        } else if value < self.mid {
            0.5 * (value - self.low) / (self.mid - self.low)
        } else {
            0.5 + 0.5 * (value - self.mid) / (self.high - self.mid)
        }
    }

    /// Maps a normalized value back into the input domain.
    pub fn unmap(&self, normalized: f32) -> f32 {
        let normalized = normalized.clamp(0.0, 1.0);
        if normalized < 0.5 {
            self.low + (self.mid - self.low) * normalized * 2.0
        } else {
            self.mid + (self.high - self.mid) * (normalized - 0.5) * 2.0
        }
    }
}

/// Normalization constants for the metric extractor.
///
/// The defaults were chosen by hand so that a conventional regular text
/// face lands near the middle of each range:
///
/// * OS/2 weight class 400 and width class 5 map to 0.5.
/// * Stem thickness of ~8.5% of the em (a typical regular) maps to 0.5;
///   hairline faces sit near 4% and black faces near 19%.
/// * An average `o`/`n`/`H` advance of 55% of the em is normal width.
/// * A thick/thin ratio of 1 is monoline, 5 is treated as maximal.
/// * An opening of half the glyph height is a fully open aperture.
/// * Combined side bearings of a quarter em are maximally loose.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub weight_class: Ramp,
    pub width_class: Ramp,
    pub stroke_ratio: Ramp,
    pub advance_ratio: Ramp,
    pub contrast_ratio: Ramp,
    pub aperture_ratio: Ramp,
    pub spacing_ratio: Ramp,
    /// Italic angle (in degrees) that saturates the slant metric.
    pub max_slant_degrees: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            weight_class: Ramp::new(100.0, 400.0, 900.0),
            width_class: Ramp::new(1.0, 5.0, 9.0),
            stroke_ratio: Ramp::new(0.04, 0.085, 0.19),
            advance_ratio: Ramp::new(0.40, 0.55, 0.80),
            contrast_ratio: Ramp::new(1.0, 3.0, 5.0),
            aperture_ratio: Ramp::new(0.0, 0.25, 0.5),
            spacing_ratio: Ramp::new(0.0, 0.125, 0.25),
            max_slant_degrees: 30.0,
        }
    }
}
