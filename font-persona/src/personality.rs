//! Scoring personality traits from metric vectors.
//!
//! Every trait is the clamped sum of weighted responses to individual
//! metrics. The rules live in a single static table so that adjusting the
//! model never requires touching the scorer.

use std::{cmp::Ordering, fmt, ops::Index};

use serde::{ser::SerializeMap, Serialize, Serializer};

use crate::metrics::{Metric, MetricVector};

/// A personality trait.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Trait {
    Elegant,
    Friendly,
    Bold,
    Technical,
    Playful,
    Formal,
    Modern,
    Dynamic,
}

impl Trait {
    pub const ALL: [Trait; 8] = [
        Trait::Elegant,
        Trait::Friendly,
        Trait::Bold,
        Trait::Technical,
        Trait::Playful,
        Trait::Formal,
        Trait::Modern,
        Trait::Dynamic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Elegant => "elegant",
            Self::Friendly => "friendly",
            Self::Bold => "bold",
            Self::Technical => "technical",
            Self::Playful => "playful",
            Self::Formal => "formal",
            Self::Modern => "modern",
            Self::Dynamic => "dynamic",
        }
    }

    /// Phrase used when this trait dominates the description.
    fn phrase(self) -> &'static str {
        match self {
            Self::Elegant => "refined, graceful letterforms",
            Self::Friendly => "an approachable, open feel",
            Self::Bold => "a strong, heavy presence",
            Self::Technical => "a precise, engineered character",
            Self::Playful => "a lively, informal tone",
            Self::Formal => "a traditional, dignified voice",
            Self::Modern => "a clean, contemporary look",
            Self::Dynamic => "a sense of movement and energy",
        }
    }
}

impl fmt::Display for Trait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Trait {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// How a rule responds to its metric value `x`.
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum Response {
    /// `x`
    Linear,
    /// `1 - x`
    Inverse,
    /// `|x|`, for signed metrics.
    Magnitude,
    /// `1 - |x|`, for signed metrics.
    Upright,
    /// 1 at `center`, falling linearly to 0 at `center ± width`.
    Peak { center: f32, width: f32 },
}

impl Response {
    pub fn apply(self, x: f32) -> f32 {
        match self {
            Self::Linear => x,
            Self::Inverse => 1.0 - x,
            Self::Magnitude => x.abs(),
            Self::Upright => 1.0 - x.abs(),
            Self::Peak { center, width } => (1.0 - (x - center).abs() / width).max(0.0),
        }
    }
}

/// A weighted contribution of one metric to one trait.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Rule {
    pub target: Trait,
    pub metric: Metric,
    pub weight: f32,
    pub response: Response,
}

const fn rule(target: Trait, metric: Metric, weight: f32, response: Response) -> Rule {
    Rule {
        target,
        metric,
        weight,
        response,
    }
}

const MIDDLE: Response = Response::Peak {
    center: 0.5,
    width: 0.5,
};

/// The trait model. The weights of each trait sum to 1.
pub static RULES: &[Rule] = {
    use Metric::*;
    use Response::*;
    use Trait::*;
    &[
        rule(Elegant, Width, 0.4, Inverse),
        rule(Elegant, Contrast, 0.3, Linear),
        rule(Elegant, Weight, 0.3, Inverse),
        rule(Friendly, Roundness, 0.35, Linear),
        rule(Friendly, Aperture, 0.25, Linear),
        rule(Friendly, XHeightRatio, 0.2, Linear),
        rule(Friendly, Weight, 0.2, MIDDLE),
        rule(Bold, Weight, 0.8, Linear),
        rule(Bold, Width, 0.2, Linear),
        rule(Technical, FixedPitch, 0.35, Linear),
        rule(Technical, Roundness, 0.2, Inverse),
        rule(Technical, Contrast, 0.2, Inverse),
        rule(Technical, Slant, 0.15, Upright),
        rule(Technical, Spacing, 0.1, Linear),
        rule(Playful, Roundness, 0.3, Linear),
        rule(Playful, Slant, 0.25, Magnitude),
        rule(Playful, Aperture, 0.2, Linear),
        rule(Playful, FixedPitch, 0.15, Inverse),
        rule(Playful, XHeightRatio, 0.1, Linear),
        rule(Formal, Contrast, 0.35, Linear),
        rule(Formal, XHeightRatio, 0.25, Inverse),
        rule(Formal, Slant, 0.2, Upright),
        rule(Formal, Weight, 0.2, MIDDLE),
        rule(Modern, Contrast, 0.3, Inverse),
        rule(Modern, XHeightRatio, 0.25, Linear),
        rule(Modern, Width, 0.25, MIDDLE),
        rule(Modern, Aperture, 0.2, Linear),
        rule(Dynamic, Slant, 0.5, Magnitude),
        rule(Dynamic, Contrast, 0.25, Linear),
        rule(Dynamic, Roundness, 0.25, Linear),
    ]
};

/// Minimum score for a trait to be considered dominant.
const DOMINANT_THRESHOLD: f32 = 0.5;
/// Maximum number of dominant traits reported.
const MAX_DOMINANT: usize = 3;

/// A score in `[0, 1]` for every [`Trait`].
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct TraitScores([f32; 8]);

impl TraitScores {
    pub fn get(&self, target: Trait) -> f32 {
        self.0[target as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Trait, f32)> + '_ {
        Trait::ALL.into_iter().map(|target| (target, self.get(target)))
    }

    /// Traits scoring at least 0.5, strongest first, at most three.
    pub fn dominant(&self) -> Vec<Trait> {
        let mut ranked: Vec<_> = self
            .iter()
            .filter(|(_, score)| *score >= DOMINANT_THRESHOLD)
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.name().cmp(b.0.name()))
        });
        ranked
            .into_iter()
            .take(MAX_DOMINANT)
            .map(|(target, _)| target)
            .collect()
    }
}

impl Index<Trait> for TraitScores {
    type Output = f32;

    fn index(&self, target: Trait) -> &f32 {
        &self.0[target as usize]
    }
}

impl Serialize for TraitScores {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Trait::ALL.len()))?;
        for (target, score) in self.iter() {
            map.serialize_entry(target.name(), &score)?;
        }
        map.end()
    }
}

/// Scores every trait for the given metrics.
pub fn score(metrics: &MetricVector) -> TraitScores {
    let mut scores = [0.0f32; 8];
    for rule in RULES {
        scores[rule.target as usize] += rule.weight * rule.response.apply(metrics[rule.metric]);
    }
    TraitScores(scores.map(|score| score.clamp(0.0, 1.0)))
}

/// Dominant traits and a one sentence description.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct PersonalitySummary {
    pub dominant_traits: Vec<Trait>,
    pub description: String,
}

pub fn summarize(scores: &TraitScores) -> PersonalitySummary {
    let dominant = scores.dominant();
    let description = match dominant.as_slice() {
        [] => "A neutral typeface without a strongly pronounced personality.".to_string(),
        [only] => format!(
            "{} {} typeface with {}.",
            article(only.name()),
            only.name(),
            only.phrase()
        ),
        [first, rest @ ..] => {
            let names: Vec<_> = dominant.iter().map(|t| t.name()).collect();
            let phrases: Vec<_> = rest.iter().map(|t| t.phrase()).collect();
            format!(
                "{} {} typeface with {}, complemented by {}.",
                article(first.name()),
                names.join(" and "),
                first.phrase(),
                phrases.join(" and ")
            )
        }
    };
    PersonalitySummary {
        dominant_traits: dominant,
        description,
    }
}

fn article(word: &str) -> &'static str {
    match word.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "An",
        _ => "A",
    }
}
