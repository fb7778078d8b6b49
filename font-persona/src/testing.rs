//! Fonts and glyph sources constructed in memory for tests.
//!
//! Fonts are assembled with write-fonts' `FontBuilder` from hand encoded
//! tables so that every value the analyzer reads is visible in the test.

use std::collections::BTreeMap;

use write_fonts::{types::Tag, FontBuilder};

use crate::{
    outline::{shapes, GlyphOutline, Point},
    source::{DesignClasses, Glyph, GlyphSource},
    FontHandle,
};

/// Big endian byte writer for table data.
#[derive(Default)]
struct BeBuffer(Vec<u8>);

impl BeBuffer {
    fn u8(&mut self, value: u8) -> &mut Self {
        self.0.push(value);
        self
    }

    fn u16(&mut self, value: u16) -> &mut Self {
        self.0.extend(value.to_be_bytes());
        self
    }

    fn i16(&mut self, value: i16) -> &mut Self {
        self.0.extend(value.to_be_bytes());
        self
    }

    fn u32(&mut self, value: u32) -> &mut Self {
        self.0.extend(value.to_be_bytes());
        self
    }

    fn fixed(&mut self, value: f32) -> &mut Self {
        self.0.extend(((value * 65536.0).round() as i32).to_be_bytes());
        self
    }

    fn zeros(&mut self, count: usize) -> &mut Self {
        self.0.extend(std::iter::repeat_n(0, count));
        self
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

struct TestGlyph {
    ch: char,
    advance: u16,
    contours: Vec<Vec<(i16, i16)>>,
}

struct TestAxis {
    tag: [u8; 4],
    min: f32,
    default: f32,
    max: f32,
}

/// A TrueType font assembled from hand encoded tables.
pub struct TestFont {
    units_per_em: u16,
    glyphs: Vec<TestGlyph>,
    weight_class: u16,
    width_class: u16,
    x_height: i16,
    cap_height: i16,
    family_class: i16,
    panose: [u8; 10],
    italic_angle: f32,
    fixed_pitch: bool,
    axes: Vec<TestAxis>,
    instances: Vec<Vec<f32>>,
    /// Units added to each side of every stroke at the `wght` maximum.
    stroke_delta: i16,
    omitted: Vec<[u8; 4]>,
}

impl TestFont {
    /// A geometric monospaced Latin font: every letter advances 600 units,
    /// OS/2 declares weight 400 and width 5, and post sets isFixedPitch.
    ///
    /// All outlines are straight sided; `o` has 80 unit stems and 40 unit
    /// hairlines, `c` and `e` are open on the right.
    pub fn monospace() -> Self {
        let glyphs = ('A'..='Z')
            .chain('a'..='z')
            .map(|ch| TestGlyph {
                ch,
                advance: 600,
                contours: to_i16(letter_shape(ch)),
            })
            .collect();
        Self {
            units_per_em: 1000,
            glyphs,
            weight_class: 400,
            width_class: 5,
            x_height: 500,
            cap_height: 700,
            // IBM class 8 (sans serif), PANOSE Latin text, sans serif.
            family_class: 8 << 8,
            panose: [2, 11, 5, 9, 0, 0, 0, 0, 0, 0],
            italic_angle: 0.0,
            fixed_pitch: true,
            axes: vec![],
            instances: vec![],
            stroke_delta: 0,
            omitted: vec![],
        }
    }

    /// The monospaced font with `wght` (100..900), `wdth` (75..125) and
    /// `slnt` (-12..0) axes and a single "Bold" named instance.
    ///
    /// `gvar` thickens every stroke by 40 units per side at `wght` 900, so
    /// 80 unit stems become 160 units; lighter weights are unchanged.
    /// Advances and vertical extents do not vary.
    pub fn variable() -> Self {
        let mut font = Self::monospace();
        font.axes = vec![
            TestAxis {
                tag: *b"wght",
                min: 100.0,
                default: 400.0,
                max: 900.0,
            },
            TestAxis {
                tag: *b"wdth",
                min: 75.0,
                default: 100.0,
                max: 125.0,
            },
            TestAxis {
                tag: *b"slnt",
                min: -12.0,
                default: 0.0,
                max: 0.0,
            },
        ];
        font.instances = vec![vec![700.0, 100.0, 0.0]];
        font.stroke_delta = 40;
        font
    }

    pub fn without_table(mut self, tag: &[u8; 4]) -> Self {
        self.omitted.push(*tag);
        self
    }

    pub fn with_italic_angle(mut self, angle: f32) -> Self {
        self.italic_angle = angle;
        self
    }

    pub fn with_fixed_pitch(mut self, fixed_pitch: bool) -> Self {
        self.fixed_pitch = fixed_pitch;
        self
    }

    pub fn with_weight_class(mut self, weight_class: u16) -> Self {
        self.weight_class = weight_class;
        self
    }

    /// Replaces the advance of the glyph mapped to `ch`.
    pub fn with_advance(mut self, ch: char, advance: u16) -> Self {
        if let Some(glyph) = self.glyphs.iter_mut().find(|glyph| glyph.ch == ch) {
            glyph.advance = advance;
        }
        self
    }

    /// Keeps only the glyphs for characters in `chars`.
    pub fn retain_chars(mut self, chars: &str) -> Self {
        self.glyphs.retain(|glyph| chars.contains(glyph.ch));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut tables: Vec<([u8; 4], Vec<u8>)> = vec![
            (*b"head", self.head()),
            (*b"hhea", self.hhea()),
            (*b"maxp", self.maxp()),
            (*b"hmtx", self.hmtx()),
            (*b"cmap", self.cmap()),
            (*b"OS/2", self.os2()),
            (*b"post", self.post()),
        ];
        let (glyf, loca) = self.glyf_and_loca();
        tables.push((*b"glyf", glyf));
        tables.push((*b"loca", loca));
        if !self.axes.is_empty() {
            tables.push((*b"fvar", self.fvar()));
        }
        if let Some(gvar) = self.gvar() {
            tables.push((*b"gvar", gvar));
        }
        let mut builder = FontBuilder::new();
        for (tag, data) in tables {
            if !self.omitted.contains(&tag) {
                builder.add_raw(Tag::new(&tag), data);
            }
        }
        builder.build()
    }

    fn num_glyphs(&self) -> u16 {
        self.glyphs.len() as u16 + 1
    }

    fn head(&self) -> Vec<u8> {
        let mut buf = BeBuffer::default();
        buf.u16(1).u16(0);
        buf.fixed(1.0);
        buf.u32(0); // checksum adjustment
        buf.u32(0x5F0F3CF5);
        buf.u16(0);
        buf.u16(self.units_per_em);
        buf.zeros(16); // created, modified
        buf.i16(0).i16(-200).i16(1000).i16(800);
        buf.u16(0); // mac style
        buf.u16(8);
        buf.i16(2);
        buf.i16(1); // long loca
        buf.i16(0);
        assert_eq!(buf.len(), 54);
        buf.into_inner()
    }

    fn hhea(&self) -> Vec<u8> {
        let mut buf = BeBuffer::default();
        buf.u16(1).u16(0);
        buf.i16(800).i16(-200).i16(0);
        let max_advance = self.glyphs.iter().map(|g| g.advance).max().unwrap_or(0);
        buf.u16(max_advance);
        buf.i16(0).i16(0).i16(max_advance as i16);
        buf.i16(1).i16(0).i16(0);
        buf.zeros(8);
        buf.i16(0);
        buf.u16(self.num_glyphs());
        assert_eq!(buf.len(), 36);
        buf.into_inner()
    }

    fn maxp(&self) -> Vec<u8> {
        let mut buf = BeBuffer::default();
        buf.u32(0x00010000);
        buf.u16(self.num_glyphs());
        buf.u16(64).u16(4); // max points, contours
        buf.u16(0).u16(0); // composite
        buf.u16(2); // zones
        buf.zeros(16);
        assert_eq!(buf.len(), 32);
        buf.into_inner()
    }

    fn hmtx(&self) -> Vec<u8> {
        let mut buf = BeBuffer::default();
        buf.u16(0).i16(0);
        for glyph in &self.glyphs {
            let lsb = glyph.contours.iter().flatten().map(|p| p.0).min();
            buf.u16(glyph.advance).i16(lsb.unwrap_or(0));
        }
        buf.into_inner()
    }

    fn cmap(&self) -> Vec<u8> {
        let mut mapped: Vec<_> = self
            .glyphs
            .iter()
            .enumerate()
            .map(|(ix, glyph)| (glyph.ch as u32, ix as u32 + 1))
            .collect();
        mapped.sort();
        let mut buf = BeBuffer::default();
        buf.u16(0).u16(1);
        buf.u16(3).u16(10).u32(12);
        buf.u16(12).u16(0);
        buf.u32(16 + 12 * mapped.len() as u32);
        buf.u32(0);
        buf.u32(mapped.len() as u32);
        for (code_point, gid) in mapped {
            buf.u32(code_point).u32(code_point).u32(gid);
        }
        buf.into_inner()
    }

    fn glyf_and_loca(&self) -> (Vec<u8>, Vec<u8>) {
        let mut glyf = BeBuffer::default();
        let mut loca = BeBuffer::default();
        // .notdef is empty
        loca.u32(0).u32(0);
        for glyph in &self.glyphs {
            let points = glyph.contours.iter().flatten();
            let x_min = points.clone().map(|p| p.0).min().unwrap_or(0);
            let x_max = points.clone().map(|p| p.0).max().unwrap_or(0);
            let y_min = points.clone().map(|p| p.1).min().unwrap_or(0);
            let y_max = points.clone().map(|p| p.1).max().unwrap_or(0);
            glyf.i16(glyph.contours.len() as i16);
            glyf.i16(x_min).i16(y_min).i16(x_max).i16(y_max);
            let mut end = 0u16;
            for contour in &glyph.contours {
                end += contour.len() as u16;
                glyf.u16(end - 1);
            }
            glyf.u16(0); // instructions
            for _ in points.clone() {
                // on curve, 16-bit deltas
                glyf.u8(0x01);
            }
            let mut prev = 0;
            for p in points.clone() {
                glyf.i16(p.0 - prev);
                prev = p.0;
            }
            let mut prev = 0;
            for p in points {
                glyf.i16(p.1 - prev);
                prev = p.1;
            }
            while glyf.len() % 4 != 0 {
                glyf.u8(0);
            }
            loca.u32(glyf.len() as u32);
        }
        (glyf.into_inner(), loca.into_inner())
    }

    fn os2(&self) -> Vec<u8> {
        let mut buf = BeBuffer::default();
        buf.u16(4);
        buf.i16(600);
        buf.u16(self.weight_class).u16(self.width_class);
        buf.u16(0);
        buf.zeros(20);
        buf.i16(self.family_class);
        for byte in self.panose {
            buf.u8(byte);
        }
        buf.zeros(16);
        buf.0.extend(b"TEST");
        buf.u16(0x40).u16(0x41).u16(0x7A);
        buf.i16(800).i16(-200).i16(0);
        buf.u16(800).u16(200);
        buf.zeros(8);
        buf.i16(self.x_height).i16(self.cap_height);
        buf.u16(0).u16(0x20).u16(1);
        assert_eq!(buf.len(), 96);
        buf.into_inner()
    }

    fn post(&self) -> Vec<u8> {
        let mut buf = BeBuffer::default();
        buf.u32(0x00030000);
        buf.fixed(self.italic_angle);
        buf.i16(-100).i16(50);
        buf.u32(self.fixed_pitch as u32);
        buf.zeros(16);
        assert_eq!(buf.len(), 32);
        buf.into_inner()
    }

    fn fvar(&self) -> Vec<u8> {
        let axis_count = self.axes.len() as u16;
        let mut buf = BeBuffer::default();
        buf.u16(1).u16(0);
        buf.u16(16).u16(2);
        buf.u16(axis_count).u16(20);
        buf.u16(self.instances.len() as u16);
        buf.u16(axis_count * 4 + 4);
        for (ix, axis) in self.axes.iter().enumerate() {
            buf.u32(u32::from_be_bytes(axis.tag));
            buf.fixed(axis.min).fixed(axis.default).fixed(axis.max);
            buf.u16(0);
            buf.u16(256 + ix as u16);
        }
        for (ix, coords) in self.instances.iter().enumerate() {
            buf.u16(300 + ix as u16).u16(0);
            for coord in coords {
                buf.fixed(*coord);
            }
        }
        buf.into_inner()
    }
}

impl TestFont {
    /// A `gvar` with one tuple per glyph peaking at the `wght` maximum.
    fn gvar(&self) -> Option<Vec<u8>> {
        let wght = self.axes.iter().position(|axis| &axis.tag == b"wght")?;
        if self.stroke_delta == 0 {
            return None;
        }
        let axis_count = self.axes.len();
        // .notdef has no variation data
        let mut offsets = vec![0u32, 0];
        let mut data = BeBuffer::default();
        for glyph in &self.glyphs {
            let mut x_deltas: Vec<i16> = glyph
                .contours
                .iter()
                .flat_map(|contour| embolden(contour, self.stroke_delta))
                .collect();
            // phantom points
            x_deltas.extend([0; 4]);
            let mut serialized = BeBuffer::default();
            // private point numbers: all points
            serialized.u8(0);
            for chunk in x_deltas.chunks(64) {
                serialized.u8(0x40 | (chunk.len() as u8 - 1));
                for delta in chunk {
                    serialized.i16(*delta);
                }
            }
            for chunk in x_deltas.chunks(64) {
                serialized.u8(0x80 | (chunk.len() as u8 - 1));
            }
            let serialized = serialized.into_inner();
            let header_len = 4 + 4 + 2 * axis_count;
            data.u16(1);
            data.u16(header_len as u16);
            data.u16(serialized.len() as u16);
            // embedded peak tuple, private point numbers
            data.u16(0x8000 | 0x2000);
            for ix in 0..axis_count {
                data.i16(if ix == wght { 0x4000 } else { 0 });
            }
            data.0.extend(serialized);
            offsets.push(data.len() as u32);
        }
        let glyph_count = self.num_glyphs();
        let array_offset = 20 + 4 * (glyph_count as u32 + 1);
        let mut buf = BeBuffer::default();
        buf.u16(1).u16(0);
        buf.u16(axis_count as u16);
        buf.u16(0).u32(array_offset); // no shared tuples
        buf.u16(glyph_count);
        buf.u16(1); // long offsets
        buf.u32(array_offset);
        for offset in offsets {
            buf.u32(offset);
        }
        buf.0.extend(data.into_inner());
        Some(buf.into_inner())
    }
}

/// Horizontal deltas that push every point of a contour away from its
/// ink: outward for outer contours, inward for counters.
fn embolden(contour: &[(i16, i16)], amount: i16) -> Vec<i16> {
    let twice_area: i32 = contour
        .iter()
        .zip(contour.iter().cycle().skip(1))
        .map(|(a, b)| a.0 as i32 * b.1 as i32 - b.0 as i32 * a.1 as i32)
        .sum();
    let outward = twice_area.signum() as i16;
    let x_min = contour.iter().map(|p| p.0).min().unwrap_or(0) as i32;
    let x_max = contour.iter().map(|p| p.0).max().unwrap_or(0) as i32;
    contour
        .iter()
        .map(|p| (2 * p.0 as i32 - x_min - x_max).signum() as i16 * outward * amount)
        .collect()
}

/// Packs standalone fonts into a TrueType collection.
pub fn collection(fonts: &[Vec<u8>]) -> Vec<u8> {
    let header_len = 12 + 4 * fonts.len();
    let mut buf = BeBuffer::default();
    buf.0.extend(b"ttcf");
    buf.u32(0x00010000);
    buf.u32(fonts.len() as u32);
    let mut base = header_len;
    for font in fonts {
        buf.u32(base as u32);
        base += font.len().next_multiple_of(4);
    }
    for font in fonts {
        let base = buf.len() as u32;
        let mut font = font.clone();
        let num_tables = u16::from_be_bytes([font[4], font[5]]) as usize;
        for ix in 0..num_tables {
            let pos = 12 + 16 * ix + 8;
            let offset =
                u32::from_be_bytes([font[pos], font[pos + 1], font[pos + 2], font[pos + 3]]);
            font[pos..pos + 4].copy_from_slice(&(offset + base).to_be_bytes());
        }
        buf.0.extend(font);
        while buf.len() % 4 != 0 {
            buf.u8(0);
        }
    }
    buf.into_inner()
}

/// Outline of the given letter in the monospaced test design.
pub fn letter_shape(ch: char) -> Vec<Vec<Point>> {
    let cap = ch.is_ascii_uppercase();
    let top = if cap { 700.0 } else { 500.0 };
    match ch {
        'o' | 'O' => shapes::ring(50.0, 0.0, 550.0, top, 80.0, 40.0),
        'c' => shapes::open_ring(50.0, 0.0, 550.0, top, 80.0, 200.0),
        'e' => shapes::open_ring(50.0, 0.0, 550.0, top, 80.0, 120.0),
        'n' => vec![
            shapes::rect(50.0, 0.0, 130.0, top),
            shapes::rect(470.0, 0.0, 550.0, top),
            shapes::rect(50.0, top - 80.0, 550.0, top),
        ],
        'H' => vec![
            shapes::rect(50.0, 0.0, 130.0, top),
            shapes::rect(470.0, 0.0, 550.0, top),
            shapes::rect(130.0, 320.0, 470.0, 400.0),
        ],
        _ => vec![shapes::rect(100.0, 0.0, 500.0, top)],
    }
}

fn to_i16(contours: Vec<Vec<Point>>) -> Vec<Vec<(i16, i16)>> {
    contours
        .into_iter()
        .map(|contour| {
            contour
                .into_iter()
                .map(|(x, y)| (x as i16, y as i16))
                .collect()
        })
        .collect()
}

pub fn handle(font: TestFont) -> FontHandle {
    FontHandle::from_bytes("test.ttf", font.build()).unwrap()
}

/// A glyph source with directly specified values.
#[derive(Clone, Default)]
pub struct SyntheticSource {
    pub units_per_em: u16,
    pub classes: Option<DesignClasses>,
    pub x_height: Option<f32>,
    pub cap_height: Option<f32>,
    pub italic_angle: Option<f32>,
    pub fixed_pitch: Option<bool>,
    pub glyphs: BTreeMap<char, Glyph>,
}

impl SyntheticSource {
    pub fn new() -> Self {
        Self {
            units_per_em: 1000,
            ..Default::default()
        }
    }

    /// A source carrying the monospaced test design, with no declared
    /// values.
    pub fn monospace_design() -> Self {
        let mut source = Self::new();
        for ch in ('A'..='Z').chain('a'..='z') {
            source = source.with_glyph(ch, 600.0, letter_shape(ch));
        }
        source
    }

    pub fn with_glyph(mut self, ch: char, advance: f32, contours: Vec<Vec<Point>>) -> Self {
        self.glyphs.insert(
            ch,
            Glyph {
                advance,
                outline: GlyphOutline::from_polygons(contours),
            },
        );
        self
    }

    pub fn with_outline(mut self, ch: char, advance: f32, outline: GlyphOutline) -> Self {
        self.glyphs.insert(ch, Glyph { advance, outline });
        self
    }
}

impl GlyphSource for SyntheticSource {
    fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    fn design_classes(&self) -> Option<DesignClasses> {
        self.classes
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
        self.glyphs.get(&ch).cloned()
    }
}
