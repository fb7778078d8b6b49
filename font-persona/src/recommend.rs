//! Ranking use cases against metrics and trait scores.

use serde::Serialize;

use crate::{
    metrics::{Metric, MetricVector},
    personality::{Trait, TraitScores},
};

/// Confidence assigned to a candidate that matches no criterion.
const CONFIDENCE_FLOOR: f32 = 0.05;
/// Distance outside a criterion's range over which its score falls from
/// 0.5 to 0.
const FALLOFF: f32 = 0.25;

/// A value a criterion is evaluated against.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Feature {
    Metric(Metric),
    Trait(Trait),
}

impl Feature {
    fn value(self, metrics: &MetricVector, traits: &TraitScores) -> f32 {
        match self {
            Self::Metric(metric) => metrics[metric],
            Self::Trait(target) => traits[target],
        }
    }
}

/// Preferred range of one feature for a use case.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Criterion {
    pub feature: Feature,
    pub min: f32,
    pub ideal: f32,
    pub max: f32,
    pub weight: f32,
}

impl Criterion {
    /// 1 at the ideal, 0.5 at the range bounds, 0 once `FALLOFF` beyond.
    pub fn score(&self, value: f32) -> f32 {
        if value < self.min || value > self.max {
            let distance = if value < self.min {
                self.min - value
            } else {
                value - self.max
            };
            return 0.5 * (1.0 - distance / FALLOFF).max(0.0);
        }
        let span = if value <= self.ideal {
            self.ideal - self.min
        } else {
            self.max - self.ideal
        };
        if span <= 0.0 {
            return 1.0;
        }
        1.0 - 0.5 * (value - self.ideal).abs() / span
    }
}

/// A use case and the criteria it prefers.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct UseCase {
    pub label: &'static str,
    pub criteria: &'static [Criterion],
}

const fn metric(metric: Metric, min: f32, ideal: f32, max: f32, weight: f32) -> Criterion {
    Criterion {
        feature: Feature::Metric(metric),
        min,
        ideal,
        max,
        weight,
    }
}

const fn personality(target: Trait, min: f32, ideal: f32, max: f32, weight: f32) -> Criterion {
    Criterion {
        feature: Feature::Trait(target),
        min,
        ideal,
        max,
        weight,
    }
}

pub static USE_CASES: &[UseCase] = {
    use Metric::*;
    use Trait::*;
    &[
        UseCase {
            label: "body text",
            criteria: &[
                metric(Weight, 0.35, 0.5, 0.6, 1.0),
                metric(XHeightRatio, 0.45, 0.6, 1.0, 1.0),
                metric(Aperture, 0.4, 0.7, 1.0, 1.0),
                metric(Contrast, 0.0, 0.25, 0.5, 0.75),
                metric(Width, 0.35, 0.5, 0.65, 0.5),
                metric(Slant, -0.15, 0.0, 0.15, 0.75),
            ],
        },
        UseCase {
            label: "display headlines",
            criteria: &[
                metric(Weight, 0.6, 0.85, 1.0, 1.0),
                personality(Bold, 0.5, 0.9, 1.0, 1.0),
                metric(Contrast, 0.3, 0.7, 1.0, 0.5),
                personality(Dynamic, 0.3, 0.7, 1.0, 0.5),
            ],
        },
        UseCase {
            label: "ui labels",
            criteria: &[
                metric(Aperture, 0.5, 0.8, 1.0, 1.0),
                metric(XHeightRatio, 0.5, 0.7, 1.0, 1.0),
                metric(Contrast, 0.0, 0.0, 0.3, 1.0),
                metric(Weight, 0.4, 0.5, 0.65, 0.5),
                personality(Modern, 0.5, 0.8, 1.0, 0.75),
            ],
        },
        UseCase {
            label: "logo/branding",
            criteria: &[
                personality(Bold, 0.4, 0.8, 1.0, 0.75),
                personality(Modern, 0.4, 0.8, 1.0, 0.5),
                personality(Elegant, 0.3, 0.7, 1.0, 0.5),
                metric(Spacing, 0.3, 0.5, 0.8, 0.25),
            ],
        },
        UseCase {
            label: "code & terminals",
            criteria: &[
                metric(FixedPitch, 0.8, 1.0, 1.0, 2.0),
                personality(Technical, 0.5, 0.9, 1.0, 1.0),
                metric(Aperture, 0.4, 0.7, 1.0, 0.5),
                metric(Slant, -0.1, 0.0, 0.1, 0.5),
            ],
        },
        UseCase {
            label: "editorial",
            criteria: &[
                personality(Formal, 0.4, 0.7, 1.0, 1.0),
                metric(Contrast, 0.35, 0.6, 0.9, 1.0),
                personality(Elegant, 0.4, 0.7, 1.0, 0.75),
                metric(Weight, 0.3, 0.5, 0.65, 0.5),
            ],
        },
        UseCase {
            label: "children's content",
            criteria: &[
                personality(Friendly, 0.5, 0.9, 1.0, 1.0),
                personality(Playful, 0.4, 0.8, 1.0, 1.0),
                metric(Roundness, 0.5, 0.9, 1.0, 0.75),
                metric(XHeightRatio, 0.5, 0.7, 1.0, 0.5),
            ],
        },
        UseCase {
            label: "luxury & fashion",
            criteria: &[
                personality(Elegant, 0.5, 0.9, 1.0, 1.0),
                metric(Contrast, 0.5, 0.85, 1.0, 1.0),
                metric(Weight, 0.0, 0.3, 0.5, 0.5),
                personality(Formal, 0.4, 0.7, 1.0, 0.5),
            ],
        },
        UseCase {
            label: "signage & wayfinding",
            criteria: &[
                metric(Aperture, 0.6, 0.9, 1.0, 1.0),
                metric(XHeightRatio, 0.5, 0.75, 1.0, 1.0),
                metric(Weight, 0.45, 0.65, 0.8, 0.75),
                metric(Contrast, 0.0, 0.1, 0.3, 0.75),
                metric(Spacing, 0.4, 0.6, 0.9, 0.5),
            ],
        },
    ]
};

/// How well a use case fits.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Fit {
    Strong,
    Moderate,
    Weak,
}

impl Fit {
    pub fn from_confidence(confidence: f32) -> Self {
        if confidence >= 0.75 {
            Self::Strong
        } else if confidence >= 0.5 {
            Self::Moderate
        } else {
            Self::Weak
        }
    }
}

#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Recommendation {
    pub label: &'static str,
    pub confidence: f32,
    pub fit: Fit,
}

/// Ranks every use case, most confident first. Ties are ordered by label.
pub fn recommend(metrics: &MetricVector, traits: &TraitScores) -> Vec<Recommendation> {
    let mut ranked: Vec<_> = USE_CASES
        .iter()
        .map(|use_case| {
            let confidence = confidence(use_case, metrics, traits);
            Recommendation {
                label: use_case.label,
                confidence,
                fit: Fit::from_confidence(confidence),
            }
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| a.label.cmp(b.label))
    });
    ranked
}

fn confidence(use_case: &UseCase, metrics: &MetricVector, traits: &TraitScores) -> f32 {
    let (total, weights) = use_case
        .criteria
        .iter()
        .fold((0.0, 0.0), |(total, weights), criterion| {
            let value = criterion.feature.value(metrics, traits);
            (
                total + criterion.weight * criterion.score(value),
                weights + criterion.weight,
            )
        });
    let mean = if weights > 0.0 { total / weights } else { 0.0 };
    (CONFIDENCE_FLOOR + (1.0 - CONFIDENCE_FLOOR) * mean).clamp(0.0, 1.0)
}
