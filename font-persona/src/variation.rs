//! Sampling the design space of variable fonts.
//!
//! Each axis is swept independently while the others stay at their
//! defaults. Every sample is instantiated and measured with the regular
//! metric extractor, and only the per-axis changes relative to the default
//! instance are retained.

use serde::{ser::SerializeMap, Serialize, Serializer};
use skrifa::Tag;

use crate::{
    config::AnalysisConfig,
    font::{FontTables, NamedInstance, VariationAxis},
    instance::FontInstance,
    metrics::{extract, Metric, MetricVector},
    Error, FontHandle,
};

/// Changes below this are treated as no movement.
const MOVEMENT_EPSILON: f32 = 1e-6;

/// A user space location that differs from the default along one axis.
#[derive(Clone, PartialEq, Debug)]
pub struct SampleLocation {
    /// Index of the swept axis.
    pub axis: usize,
    /// One user space value per axis, in axis order.
    pub coords: Vec<(Tag, f32)>,
}

/// A sampled location and the metrics measured there.
#[derive(Clone, PartialEq, Debug)]
pub struct AxisSample {
    pub location: SampleLocation,
    pub metrics: MetricVector,
}

/// Summary of how a metric changed along one axis.
#[derive(Copy, Clone, PartialEq, Default, Debug, Serialize)]
pub struct MetricDelta {
    pub min: f32,
    pub max: f32,
    pub mean: f32,
}

impl MetricDelta {
    /// Largest absolute change.
    pub fn magnitude(&self) -> f32 {
        self.min.abs().max(self.max.abs())
    }
}

/// A [`MetricDelta`] for every metric.
#[derive(Copy, Clone, PartialEq, Default, Debug)]
pub struct MetricDeltas([MetricDelta; 9]);

impl MetricDeltas {
    pub fn get(&self, metric: Metric) -> MetricDelta {
        self.0[metric as usize]
    }
}

impl Serialize for MetricDeltas {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Metric::ALL.len()))?;
        for metric in Metric::ALL {
            map.serialize_entry(metric.name(), &self.get(metric))?;
        }
        map.end()
    }
}

/// Metric changes along one axis.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct AxisDelta {
    #[serde(serialize_with = "crate::report::serialize_tag")]
    pub tag: Tag,
    pub name: String,
    pub sample_count: usize,
    pub deltas: MetricDeltas,
}

/// The axis that moves a metric the most.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct DominantAxis {
    pub metric: Metric,
    #[serde(serialize_with = "crate::report::serialize_tag")]
    pub tag: Tag,
    /// Largest absolute change of the metric along the axis.
    pub change: f32,
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct VariationAnalysis {
    pub axes: Vec<VariationAxis>,
    pub named_instances: Vec<NamedInstance>,
    /// Metrics of the default location.
    pub baseline: MetricVector,
    /// Total number of sampled locations.
    pub sample_count: usize,
    pub axis_deltas: Vec<AxisDelta>,
    /// Metrics that change anywhere in the design space and the axis that
    /// changes them most.
    pub dominant_axes: Vec<DominantAxis>,
}

/// Returns the locations sampled for the given axes.
///
/// Each axis contributes its minimum, `interior` evenly spaced values and
/// its maximum, with every other axis at its default.
pub fn sample_locations(axes: &[VariationAxis], interior: usize) -> Vec<SampleLocation> {
    let defaults: Vec<_> = axes.iter().map(|axis| (axis.tag, axis.default)).collect();
    let steps = interior + 1;
    axes.iter()
        .enumerate()
        .flat_map(|(ix, axis)| {
            let defaults = &defaults;
            (0..=steps).map(move |step| {
                let value = if step == steps {
                    axis.max
                } else {
                    axis.min + (axis.max - axis.min) * step as f32 / steps as f32
                };
                let mut coords = defaults.clone();
                coords[ix].1 = value;
                SampleLocation { axis: ix, coords }
            })
        })
        .collect()
}

/// Samples every axis of the font and aggregates metric changes.
///
/// Fails with [`Error::NotVariableFont`] when the font has no axes.
pub fn analyze_variation(
    handle: &FontHandle,
    config: &AnalysisConfig,
) -> Result<VariationAnalysis, Error> {
    let font = handle.font()?;
    let tables = FontTables::new(font.clone());
    let axes = tables.axes();
    if axes.is_empty() {
        return Err(Error::NotVariableFont {
            font: handle.id().to_string(),
        });
    }
    let calibration = &config.calibration;
    let baseline = extract(&FontInstance::at(font.clone(), &[]), calibration).metrics;
    let locations = sample_locations(&axes, config.axis_sample_count);
    log::debug!(
        "[{}] sampling {} locations over {} axes",
        handle.id(),
        locations.len(),
        axes.len()
    );
    let samples: Vec<_> = locations
        .into_iter()
        .map(|location| {
            let instance = FontInstance::at(font.clone(), &location.coords);
            let metrics = extract(&instance, calibration).metrics;
            AxisSample { location, metrics }
        })
        .collect();
    let axis_deltas: Vec<_> = axes
        .iter()
        .enumerate()
        .map(|(ix, axis)| {
            let sampled: Vec<_> = samples
                .iter()
                .filter(|sample| sample.location.axis == ix)
                .collect();
            AxisDelta {
                tag: axis.tag,
                name: axis.name.clone(),
                sample_count: sampled.len(),
                deltas: aggregate(&baseline, &sampled),
            }
        })
        .collect();
    Ok(VariationAnalysis {
        dominant_axes: dominant_axes(&axis_deltas),
        named_instances: tables.named_instances(),
        sample_count: samples.len(),
        axes,
        baseline,
        axis_deltas,
    })
}

fn aggregate(baseline: &MetricVector, samples: &[&AxisSample]) -> MetricDeltas {
    let mut deltas = MetricDeltas::default();
    if samples.is_empty() {
        return deltas;
    }
    for metric in Metric::ALL {
        let changes = samples
            .iter()
            .map(|sample| sample.metrics[metric] - baseline[metric]);
        let (min, max, sum) = changes.fold(
            (f32::INFINITY, f32::NEG_INFINITY, 0.0),
            |(min, max, sum), change| (min.min(change), max.max(change), sum + change),
        );
        deltas.0[metric as usize] = MetricDelta {
            min,
            max,
            mean: sum / samples.len() as f32,
        };
    }
    deltas
}

fn dominant_axes(axis_deltas: &[AxisDelta]) -> Vec<DominantAxis> {
    Metric::ALL
        .into_iter()
        .filter_map(|metric| {
            let mut best: Option<DominantAxis> = None;
            for axis in axis_deltas {
                let change = axis.deltas.get(metric).magnitude();
                if change > MOVEMENT_EPSILON
                    && best.as_ref().is_none_or(|best| change > best.change)
                {
                    best = Some(DominantAxis {
                        metric,
                        tag: axis.tag,
                        change,
                    });
                }
            }
            best
        })
        .collect()
}
