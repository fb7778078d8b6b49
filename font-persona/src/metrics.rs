//! Extraction of normalized shape metrics from glyph data.

use std::{collections::BTreeMap, fmt, ops::Index};

use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::{
    config::Calibration,
    outline::{GlyphOutline, Run, Scan},
    source::{Glyph, GlyphSource},
};

/// Glyphs whose stems estimate weight and whose advances estimate width.
const STEM_REFERENCE: [char; 3] = ['o', 'n', 'H'];
/// Glyphs used to classify the shape as curved or angular.
const SHAPE_REFERENCE: [char; 12] = ['a', 'e', 'o', 'n', 'h', 'm', 'v', 'w', 's', 'c', 'z', 'k'];
/// Glyphs measured for aperture.
const APERTURE_REFERENCE: [char; 2] = ['c', 'e'];
/// Fractions of the glyph width at which aperture scanlines are placed.
const APERTURE_SCANS: [f32; 3] = [0.7, 0.8, 0.9];
/// Fraction of the glyph height at which stems are measured, low enough to
/// miss the crossbar of `H` and the arch of `n`.
const STEM_SCAN_HEIGHT: f32 = 0.3;
/// Minimum number of equal advances that mark a font as monospaced.
const MIN_PITCH_SAMPLES: usize = 3;

/// A normalized measurement of the design.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Metric {
    Weight,
    Width,
    Contrast,
    XHeightRatio,
    Aperture,
    Spacing,
    Slant,
    Roundness,
    FixedPitch,
}

impl Metric {
    /// All metrics in report order.
    pub const ALL: [Metric; 9] = [
        Metric::Weight,
        Metric::Width,
        Metric::Contrast,
        Metric::XHeightRatio,
        Metric::Aperture,
        Metric::Spacing,
        Metric::Slant,
        Metric::Roundness,
        Metric::FixedPitch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Weight => "weight",
            Self::Width => "width",
            Self::Contrast => "contrast",
            Self::XHeightRatio => "x_height_ratio",
            Self::Aperture => "aperture",
            Self::Spacing => "spacing",
            Self::Slant => "slant",
            Self::Roundness => "roundness",
            Self::FixedPitch => "fixed_pitch",
        }
    }

    /// Inclusive range of the normalized value.
    pub fn range(self) -> (f32, f32) {
        match self {
            Self::Slant => (-1.0, 1.0),
            _ => (0.0, 1.0),
        }
    }

    /// Value used when the inputs for this metric are unavailable.
    pub fn neutral(self) -> f32 {
        match self {
            Self::Slant => 0.0,
            _ => 0.5,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// One normalized value per [`Metric`].
///
/// Values are always finite and within [`Metric::range`].
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct MetricVector([f32; 9]);

impl MetricVector {
    /// Creates a vector with every metric at its neutral value.
    pub fn neutral() -> Self {
        Self(Metric::ALL.map(Metric::neutral))
    }

    pub fn get(&self, metric: Metric) -> f32 {
        self.0[metric.index()]
    }

    /// Sets a metric, clamping into its range. Non-finite values are
    /// replaced by the neutral value.
    pub fn set(&mut self, metric: Metric, value: f32) {
        let (min, max) = metric.range();
        self.0[metric.index()] = if value.is_finite() {
            value.clamp(min, max)
        } else {
            metric.neutral()
        };
    }

    pub fn with(mut self, metric: Metric, value: f32) -> Self {
        self.set(metric, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, f32)> + '_ {
        Metric::ALL.into_iter().map(|metric| (metric, self.get(metric)))
    }
}

impl Default for MetricVector {
    fn default() -> Self {
        Self::neutral()
    }
}

impl Index<Metric> for MetricVector {
    type Output = f32;

    fn index(&self, metric: Metric) -> &f32 {
        &self.0[metric.index()]
    }
}

impl Serialize for MetricVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Metric::ALL.len()))?;
        for (metric, value) in self.iter() {
            map.serialize_entry(metric.name(), &value)?;
        }
        map.end()
    }
}

/// Where the value of a metric came from.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricOrigin {
    /// Read from a declared table value.
    Table,
    /// Measured directly on outlines or advances.
    Measured,
    /// Derived indirectly from a related measurement.
    Estimated,
    /// No usable input; the neutral value was used.
    Default,
}

/// The [`MetricOrigin`] of each metric.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct MetricOrigins([MetricOrigin; 9]);

impl MetricOrigins {
    pub fn get(&self, metric: Metric) -> MetricOrigin {
        self.0[metric.index()]
    }

    fn set(&mut self, metric: Metric, origin: MetricOrigin) {
        self.0[metric.index()] = origin;
    }
}

impl Default for MetricOrigins {
    fn default() -> Self {
        Self([MetricOrigin::Default; 9])
    }
}

impl Serialize for MetricOrigins {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Metric::ALL.len()))?;
        for metric in Metric::ALL {
            map.serialize_entry(metric.name(), &self.get(metric))?;
        }
        map.end()
    }
}

/// Raw measurements, relative to the em unless noted.
#[derive(Clone, PartialEq, Default, Debug, Serialize)]
pub struct Measurements {
    /// Mean stem thickness of the stem reference glyphs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width_ratio: Option<f32>,
    /// Thick to thin stroke ratio (always >= 1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast_ratio: Option<f32>,
    /// Aperture opening relative to glyph height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aperture_ratio: Option<f32>,
    /// Mean combined side bearings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing_ratio: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_height_ratio: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cap_height_ratio: Option<f32>,
    /// Fraction of curved outline segments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curve_ratio: Option<f32>,
    /// In degrees.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic_angle: Option<f32>,
    /// Mean advance of the stem reference glyphs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_advance_ratio: Option<f32>,
    /// Declared OS/2 weight class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_class: Option<u16>,
    /// Declared OS/2 width class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width_class: Option<u16>,
}

/// Output of [`extract`].
#[derive(Clone, PartialEq, Debug)]
pub struct Extraction {
    pub metrics: MetricVector,
    pub origins: MetricOrigins,
    pub measurements: Measurements,
}

/// Computes the metric vector for a glyph source.
///
/// Never fails: metrics whose inputs are missing take their neutral value
/// with origin [`MetricOrigin::Default`].
pub fn extract<S: GlyphSource + ?Sized>(source: &S, calibration: &Calibration) -> Extraction {
    let upem = match source.units_per_em() {
        0 => 1000.0,
        upem => upem as f32,
    };
    let glyphs: BTreeMap<char, Glyph> = ('A'..='Z')
        .chain('a'..='z')
        .filter_map(|ch| Some((ch, source.glyph(ch)?)))
        .collect();
    let mut extractor = Extractor {
        upem,
        glyphs,
        calibration,
        metrics: MetricVector::neutral(),
        origins: MetricOrigins::default(),
        measurements: Measurements::default(),
    };
    extractor.weight_and_width(source);
    extractor.contrast();
    extractor.x_height(source);
    extractor.aperture();
    extractor.spacing();
    extractor.slant(source);
    extractor.roundness();
    extractor.fixed_pitch(source);
    for metric in Metric::ALL {
        if extractor.origins.get(metric) == MetricOrigin::Default {
            log::debug!("{metric} has no usable input, using {}", metric.neutral());
        }
    }
    Extraction {
        metrics: extractor.metrics,
        origins: extractor.origins,
        measurements: extractor.measurements,
    }
}

struct Extractor<'a> {
    upem: f32,
    glyphs: BTreeMap<char, Glyph>,
    calibration: &'a Calibration,
    metrics: MetricVector,
    origins: MetricOrigins,
    measurements: Measurements,
}

impl Extractor<'_> {
    fn record(&mut self, metric: Metric, value: f32, origin: MetricOrigin) {
        if value.is_finite() {
            self.metrics.set(metric, value);
            self.origins.set(metric, origin);
        }
    }

    fn outline(&self, ch: char) -> Option<&GlyphOutline> {
        self.glyphs
            .get(&ch)
            .map(|glyph| &glyph.outline)
            .filter(|outline| !outline.is_empty())
    }

    fn weight_and_width<S: GlyphSource + ?Sized>(&mut self, source: &S) {
        let classes = source.design_classes();
        let weight_class = classes.map(|c| c.weight).filter(|w| (1..=1000).contains(w));
        let width_class = classes.map(|c| c.width).filter(|w| (1..=9).contains(w));
        self.measurements.weight_class = weight_class;
        self.measurements.width_class = width_class;

        let stems: Vec<f32> = STEM_REFERENCE
            .iter()
            .filter_map(|ch| stem_width(self.outline(*ch)?))
            .collect();
        let stroke_ratio = mean(&stems).map(|stem| stem / self.upem);
        self.measurements.stroke_width_ratio = stroke_ratio;
        if let Some(class) = weight_class {
            let value = self.calibration.weight_class.map(class as f32);
            self.record(Metric::Weight, value, MetricOrigin::Table);
        } else if let Some(ratio) = stroke_ratio {
            let value = self.calibration.stroke_ratio.map(ratio);
            self.record(Metric::Weight, value, MetricOrigin::Estimated);
        } else {
            log::warn!("no weight class or reference stems, weight is unknown");
        }

        let advances: Vec<f32> = STEM_REFERENCE
            .iter()
            .filter_map(|ch| self.glyphs.get(ch))
            .map(|glyph| glyph.advance)
            .filter(|advance| *advance > 0.0)
            .collect();
        let advance_ratio = mean(&advances).map(|advance| advance / self.upem);
        self.measurements.average_advance_ratio = advance_ratio;
        if let Some(class) = width_class {
            let value = self.calibration.width_class.map(class as f32);
            self.record(Metric::Width, value, MetricOrigin::Table);
        } else if let Some(ratio) = advance_ratio {
            let value = self.calibration.advance_ratio.map(ratio);
            self.record(Metric::Width, value, MetricOrigin::Estimated);
        }
    }

    fn contrast(&mut self) {
        let Some(outline) = self.outline('o').or_else(|| self.outline('O')) else {
            return;
        };
        let Some(bounds) = outline.bounds() else {
            return;
        };
        let (cx, cy) = bounds.center();
        let horizontal = mean_run(&outline.runs(Scan::Horizontal, cy));
        let vertical = mean_run(&outline.runs(Scan::Vertical, cx));
        let (Some(horizontal), Some(vertical)) = (horizontal, vertical) else {
            return;
        };
        let (thick, thin) = if horizontal >= vertical {
            (horizontal, vertical)
        } else {
            (vertical, horizontal)
        };
        if thin <= 0.0 {
            return;
        }
        let ratio = thick / thin;
        self.measurements.contrast_ratio = Some(ratio);
        let value = self.calibration.contrast_ratio.map(ratio);
        self.record(Metric::Contrast, value, MetricOrigin::Measured);
    }

    fn x_height<S: GlyphSource + ?Sized>(&mut self, source: &S) {
        let measured_top = |chars: &[char]| {
            chars
                .iter()
                .find_map(|ch| self.outline(*ch)?.bounds())
                .map(|bounds| bounds.y_max)
                .filter(|top| *top > 0.0)
        };
        let (x_height, origin) = match source.x_height() {
            Some(height) => (Some(height), MetricOrigin::Table),
            None => (measured_top(&['x', 'z', 'v']), MetricOrigin::Measured),
        };
        let cap_height = source.cap_height().or_else(|| measured_top(&['H', 'I']));
        self.measurements.cap_height_ratio = cap_height.map(|height| height / self.upem);
        if let Some(height) = x_height {
            let ratio = height / self.upem;
            self.measurements.x_height_ratio = Some(ratio);
            self.record(Metric::XHeightRatio, ratio, origin);
        }
    }

    fn aperture(&mut self) {
        let openings: Vec<f32> = APERTURE_REFERENCE
            .iter()
            .filter_map(|ch| aperture_opening(self.outline(*ch)?))
            .collect();
        if let Some(ratio) = mean(&openings) {
            self.measurements.aperture_ratio = Some(ratio);
            let value = self.calibration.aperture_ratio.map(ratio);
            self.record(Metric::Aperture, value, MetricOrigin::Measured);
        }
    }

    fn spacing(&mut self) {
        let bearings: Vec<f32> = self
            .glyphs
            .values()
            .filter_map(|glyph| {
                let bounds = glyph.outline.bounds()?;
                Some(glyph.advance - bounds.width())
            })
            .collect();
        if let Some(bearing) = mean(&bearings) {
            let ratio = bearing / self.upem;
            self.measurements.spacing_ratio = Some(ratio);
            let value = self.calibration.spacing_ratio.map(ratio);
            self.record(Metric::Spacing, value, MetricOrigin::Measured);
        }
    }

    fn slant<S: GlyphSource + ?Sized>(&mut self, source: &S) {
        if let Some(angle) = source.italic_angle().filter(|angle| angle.is_finite()) {
            self.measurements.italic_angle = Some(angle);
            let value = -angle / self.calibration.max_slant_degrees;
            self.record(Metric::Slant, value, MetricOrigin::Table);
        }
    }

    fn roundness(&mut self) {
        let (curves, lines) = SHAPE_REFERENCE
            .iter()
            .filter_map(|ch| self.outline(*ch))
            .fold((0, 0), |(curves, lines), outline| {
                (
                    curves + outline.curve_segments(),
                    lines + outline.line_segments(),
                )
            });
        let total = curves + lines;
        if total > 0 {
            let ratio = curves as f32 / total as f32;
            self.measurements.curve_ratio = Some(ratio);
            self.record(Metric::Roundness, ratio, MetricOrigin::Measured);
        }
    }

    fn fixed_pitch<S: GlyphSource + ?Sized>(&mut self, source: &S) {
        let declared = source.is_fixed_pitch();
        if declared == Some(true) {
            self.record(Metric::FixedPitch, 1.0, MetricOrigin::Table);
            return;
        }
        let advances: Vec<f32> = self
            .glyphs
            .values()
            .map(|glyph| glyph.advance)
            .filter(|advance| *advance > 0.0)
            .collect();
        let uniform = advances.len() >= MIN_PITCH_SAMPLES
            && advances
                .iter()
                .all(|advance| (advance - advances[0]).abs() < 0.5);
        if uniform {
            self.record(Metric::FixedPitch, 1.0, MetricOrigin::Measured);
        } else if declared == Some(false) {
            self.record(Metric::FixedPitch, 0.0, MetricOrigin::Table);
        } else if advances.len() >= MIN_PITCH_SAMPLES {
            self.record(Metric::FixedPitch, 0.0, MetricOrigin::Measured);
        }
    }
}

/// Mean horizontal stem thickness near the bottom of the glyph.
fn stem_width(outline: &GlyphOutline) -> Option<f32> {
    let bounds = outline.bounds()?;
    let y = bounds.y_min + bounds.height() * STEM_SCAN_HEIGHT;
    mean_run(&outline.runs(Scan::Horizontal, y))
}

/// The narrowest of the widest interior gaps along the aperture scanlines,
/// relative to the glyph height.
///
/// Scanlines crossing fewer than two runs (past a terminal) are skipped; a
/// glyph with no such scanline is closed.
fn aperture_opening(outline: &GlyphOutline) -> Option<f32> {
    let bounds = outline.bounds()?;
    if bounds.height() <= 0.0 {
        return None;
    }
    let opening = APERTURE_SCANS
        .iter()
        .filter_map(|fraction| {
            let x = bounds.x_min + bounds.width() * fraction;
            largest_gap(&outline.runs(Scan::Vertical, x))
        })
        .min_by(f32::total_cmp)
        .unwrap_or(0.0);
    Some(opening / bounds.height())
}

fn largest_gap(runs: &[Run]) -> Option<f32> {
    runs.windows(2)
        .map(|pair| pair[1].start - pair[0].end)
        .max_by(f32::total_cmp)
}

fn mean_run(runs: &[Run]) -> Option<f32> {
    let lens: Vec<f32> = runs.iter().map(Run::len).collect();
    mean(&lens)
}

fn mean(values: &[f32]) -> Option<f32> {
    (!values.is_empty()).then(|| values.iter().sum::<f32>() / values.len() as f32)
}
