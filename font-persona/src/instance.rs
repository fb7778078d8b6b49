//! Glyph sources backed by a parsed font.

use skrifa::{
    charmap::Charmap,
    instance::{Location, Size},
    outline::{DrawSettings, OutlineGlyphCollection},
    raw::{FontRef, TableProvider},
    MetadataProvider, Tag,
};

use crate::{
    outline::OutlineRecorder,
    source::{DesignClasses, Glyph, GlyphSource},
};

const SLNT: Tag = Tag::new(b"slnt");

/// How an instance relates to the font's design space.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum InstanceKind {
    /// The default instance, with all table data available.
    Static,
    /// An arbitrary location in design space.
    ///
    /// OS/2 weight and width classes are withheld because they describe the
    /// default instance only. The italic angle follows the `slnt` axis when
    /// the font has one.
    Instantiated,
}

/// A font at a specific location in its design space.
pub struct FontInstance<'a> {
    font: FontRef<'a>,
    kind: InstanceKind,
    location: Location,
    charmap: Charmap<'a>,
    outlines: OutlineGlyphCollection<'a>,
    units_per_em: u16,
    x_height: Option<f32>,
    cap_height: Option<f32>,
    italic_angle: Option<f32>,
    fixed_pitch: Option<bool>,
}

impl<'a> FontInstance<'a> {
    /// Creates the default instance of the font.
    pub fn new(font: FontRef<'a>) -> Self {
        let location = Location::new(font.axes().len());
        let italic_angle = font.post().ok().map(|post| post.italic_angle().to_f32());
        Self::with_location(font, InstanceKind::Static, location, italic_angle)
    }

    /// Creates an instance at the given user space coordinates.
    ///
    /// Axes that are not mentioned are set to their defaults and values are
    /// clamped to the axis range. Coordinates are normalized through `fvar`
    /// and `avar`.
    pub fn at(font: FontRef<'a>, coords: &[(Tag, f32)]) -> Self {
        let axes = font.axes();
        let location = axes.location(coords);
        let slant = axes.get_by_tag(SLNT).map(|axis| {
            coords
                .iter()
                .rev()
                .find(|(tag, _)| *tag == SLNT)
                .map(|(_, value)| value.clamp(axis.min_value(), axis.max_value()))
                .unwrap_or(axis.default_value())
        });
        let italic_angle =
            slant.or_else(|| font.post().ok().map(|post| post.italic_angle().to_f32()));
        Self::with_location(font, InstanceKind::Instantiated, location, italic_angle)
    }

    fn with_location(
        font: FontRef<'a>,
        kind: InstanceKind,
        location: Location,
        italic_angle: Option<f32>,
    ) -> Self {
        let metrics = font.metrics(Size::unscaled(), &location);
        Self {
            kind,
            charmap: font.charmap(),
            outlines: font.outline_glyphs(),
            units_per_em: metrics.units_per_em,
            x_height: metrics.x_height.filter(|height| *height > 0.0),
            cap_height: metrics.cap_height.filter(|height| *height > 0.0),
            italic_angle,
            fixed_pitch: font.post().ok().map(|post| post.is_fixed_pitch() != 0),
            location,
            font,
        }
    }

    pub fn kind(&self) -> InstanceKind {
        self.kind
    }

    pub fn location(&self) -> &Location {
        &self.location
    }
}

impl GlyphSource for FontInstance<'_> {
    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn design_classes(&self) -> Option<DesignClasses> {
        if self.kind == InstanceKind::Instantiated {
            return None;
        }
        let os2 = self.font.os2().ok()?;
        Some(DesignClasses {
            weight: os2.us_weight_class(),
            width: os2.us_width_class(),
        })
    }

    fn x_height(&self) -> Option<f32> {
        self.x_height
    }

    fn cap_height(&self) -> Option<f32> {
        self.cap_height
    }

    fn italic_angle(&self) -> Option<f32> {
        self.italic_angle
    }

    fn is_fixed_pitch(&self) -> Option<bool> {
        self.fixed_pitch
    }

    fn glyph(&self, ch: char) -> Option<Glyph> {
        let gid = self.charmap.map(ch)?;
        let advance = self
            .font
            .glyph_metrics(Size::unscaled(), &self.location)
            .advance_width(gid)?;
        let mut recorder = OutlineRecorder::default();
        if let Some(glyph) = self.outlines.get(gid) {
            if let Err(e) = glyph.draw(
                DrawSettings::unhinted(Size::unscaled(), &self.location),
                &mut recorder,
            ) {
                log::warn!("failed to draw outline for {ch:?} ({gid:?}): {e}");
                return None;
            }
        }
        Some(Glyph {
            advance,
            outline: recorder.finish(),
        })
    }
}
