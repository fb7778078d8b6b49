//! Descriptive labels derived from metrics and font metadata.

use serde::Serialize;

use crate::{
    config::Calibration,
    font::FontTables,
    metrics::{Extraction, Metric},
};

/// Named weight, as used for OS/2 weight classes.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
pub enum WeightName {
    Thin,
    #[serde(rename = "Extra Light")]
    ExtraLight,
    Light,
    Regular,
    Medium,
    #[serde(rename = "Semi Bold")]
    SemiBold,
    Bold,
    #[serde(rename = "Extra Bold")]
    ExtraBold,
    Black,
}

impl WeightName {
    /// Returns the name of the nearest weight class.
    pub fn from_class(class: f32) -> Self {
        const NAMES: [WeightName; 9] = [
            WeightName::Thin,
            WeightName::ExtraLight,
            WeightName::Light,
            WeightName::Regular,
            WeightName::Medium,
            WeightName::SemiBold,
            WeightName::Bold,
            WeightName::ExtraBold,
            WeightName::Black,
        ];
        let ix = ((class / 100.0).round() as i32 - 1).clamp(0, 8);
        NAMES[ix as usize]
    }
}

/// Named width, as used for OS/2 width classes.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
pub enum WidthName {
    #[serde(rename = "Ultra Condensed")]
    UltraCondensed,
    #[serde(rename = "Extra Condensed")]
    ExtraCondensed,
    Condensed,
    #[serde(rename = "Semi Condensed")]
    SemiCondensed,
    Normal,
    #[serde(rename = "Semi Expanded")]
    SemiExpanded,
    Expanded,
    #[serde(rename = "Extra Expanded")]
    ExtraExpanded,
    #[serde(rename = "Ultra Expanded")]
    UltraExpanded,
}

impl WidthName {
    pub fn from_class(class: f32) -> Self {
        const NAMES: [WidthName; 9] = [
            WidthName::UltraCondensed,
            WidthName::ExtraCondensed,
            WidthName::Condensed,
            WidthName::SemiCondensed,
            WidthName::Normal,
            WidthName::SemiExpanded,
            WidthName::Expanded,
            WidthName::ExtraExpanded,
            WidthName::UltraExpanded,
        ];
        let ix = (class.round() as i32 - 1).clamp(0, 8);
        NAMES[ix as usize]
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContrastType {
    Monoline,
    Low,
    Medium,
    High,
    Extreme,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpacingType {
    Tight,
    Normal,
    Loose,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeType {
    Angular,
    #[serde(rename = "mostly angular")]
    MostlyAngular,
    Mixed,
    Curvy,
    #[serde(rename = "very curvy")]
    VeryCurvy,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum XHeightClass {
    Small,
    Medium,
    Large,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleClass {
    Monospace,
    Script,
    Decorative,
    Serif,
    SansSerif,
    Unknown,
}

/// Labels describing a font.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct Classification {
    pub weight: WeightName,
    pub width: WidthName,
    pub contrast: ContrastType,
    pub spacing: SpacingType,
    pub shape: ShapeType,
    pub x_height: XHeightClass,
    pub style: StyleClass,
}

/// Font metadata consulted by the style classifier.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct StyleHints {
    /// OS/2 sFamilyClass.
    pub family_class: Option<i16>,
    pub panose: Option<[u8; 10]>,
    pub family_name: Option<String>,
}

impl StyleHints {
    pub fn from_tables(tables: &FontTables) -> Self {
        let os2 = tables.os2();
        Self {
            family_class: os2.as_ref().map(|os2| os2.s_family_class()),
            panose: os2
                .as_ref()
                .and_then(|os2| os2.panose_10().try_into().ok()),
            family_name: tables.family_name(),
        }
    }
}

pub fn classify(
    extraction: &Extraction,
    hints: &StyleHints,
    calibration: &Calibration,
) -> Classification {
    let metrics = &extraction.metrics;
    let measurements = &extraction.measurements;
    let weight = match measurements.weight_class {
        Some(class) => WeightName::from_class(class as f32),
        None => WeightName::from_class(calibration.weight_class.unmap(metrics[Metric::Weight])),
    };
    let width = match measurements.width_class {
        Some(class) => WidthName::from_class(class as f32),
        None => WidthName::from_class(calibration.width_class.unmap(metrics[Metric::Width])),
    };
    let contrast = match metrics[Metric::Contrast] {
        c if c < 0.05 => ContrastType::Monoline,
        c if c < 0.3 => ContrastType::Low,
        c if c < 0.6 => ContrastType::Medium,
        c if c < 0.85 => ContrastType::High,
        _ => ContrastType::Extreme,
    };
    let spacing = match metrics[Metric::Spacing] {
        s if s < 0.35 => SpacingType::Tight,
        s if s < 0.65 => SpacingType::Normal,
        _ => SpacingType::Loose,
    };
    let shape = match metrics[Metric::Roundness] {
        r if r < 0.15 => ShapeType::Angular,
        r if r < 0.35 => ShapeType::MostlyAngular,
        r if r < 0.6 => ShapeType::Mixed,
        r if r < 0.85 => ShapeType::Curvy,
        _ => ShapeType::VeryCurvy,
    };
    let x_height = match (measurements.x_height_ratio, measurements.cap_height_ratio) {
        (Some(x), Some(cap)) if cap > 0.0 => match x / cap {
            r if r < 0.65 => XHeightClass::Small,
            r if r < 0.75 => XHeightClass::Medium,
            _ => XHeightClass::Large,
        },
        _ => match metrics[Metric::XHeightRatio] {
            r if r < 0.45 => XHeightClass::Small,
            r if r < 0.55 => XHeightClass::Medium,
            _ => XHeightClass::Large,
        },
    };
    Classification {
        weight,
        width,
        contrast,
        spacing,
        shape,
        x_height,
        style: style_class(metrics[Metric::FixedPitch] >= 1.0, hints),
    }
}

fn style_class(fixed_pitch: bool, hints: &StyleHints) -> StyleClass {
    if fixed_pitch {
        return StyleClass::Monospace;
    }
    // IBM font class, high byte
    match hints.family_class.map(|class| class >> 8) {
        Some(1..=5 | 7) => return StyleClass::Serif,
        Some(8) => return StyleClass::SansSerif,
        Some(9 | 12) => return StyleClass::Decorative,
        Some(10) => return StyleClass::Script,
        _ => {}
    }
    if let Some(panose) = hints.panose {
        match (panose[0], panose[1]) {
            (2, 2..=10) => return StyleClass::Serif,
            (2, 11..=14) => return StyleClass::SansSerif,
            (3, _) => return StyleClass::Script,
            (4 | 5, _) => return StyleClass::Decorative,
            _ => {}
        }
    }
    let name = hints
        .family_name
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    if ["mono", "code", "console", "terminal"]
        .iter()
        .any(|word| name.contains(word))
    {
        StyleClass::Monospace
    } else if ["script", "hand", "brush"].iter().any(|word| name.contains(word)) {
        StyleClass::Script
    } else if name.contains("sans") {
        StyleClass::SansSerif
    } else if name.contains("serif") || name.contains("slab") {
        StyleClass::Serif
    } else {
        StyleClass::Unknown
    }
}
