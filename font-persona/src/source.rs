//! The glyph data capability consumed by the metric extractor.

use crate::outline::GlyphOutline;

/// Weight and width classes declared in the OS/2 table.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct DesignClasses {
    pub weight: u16,
    pub width: u16,
}

/// Advance and outline of a single glyph, in font units.
#[derive(Clone, PartialEq, Debug)]
pub struct Glyph {
    pub advance: f32,
    pub outline: GlyphOutline,
}

/// Source of the font level values and glyphs needed to compute metrics.
///
/// All lengths are in font units. Every accessor returns `None` when the
/// underlying data is absent; callers substitute documented defaults.
pub trait GlyphSource {
    fn units_per_em(&self) -> u16;

    /// OS/2 weight and width classes, when they describe this instance.
    fn design_classes(&self) -> Option<DesignClasses>;

    /// Declared x-height.
    fn x_height(&self) -> Option<f32>;

    /// Declared cap height.
    fn cap_height(&self) -> Option<f32>;

    /// Italic angle in degrees, counter-clockwise from vertical. Fonts
    /// leaning to the right have negative angles.
    fn italic_angle(&self) -> Option<f32>;

    /// Whether the font declares itself monospaced.
    fn is_fixed_pitch(&self) -> Option<bool>;

    /// Returns the glyph mapped to the given character.
    fn glyph(&self, ch: char) -> Option<Glyph>;
}
