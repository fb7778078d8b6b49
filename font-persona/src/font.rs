//! Loading and validating font binaries.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::Path,
    sync::Arc,
};

use serde::Serialize;
use skrifa::{
    raw::{
        tables::{head::Head, hhea::Hhea, os2::Os2, post::Post},
        FileRef, FontRef, TableProvider,
    },
    string::StringId,
    MetadataProvider, Tag,
};

use crate::Error;

/// Tables that must be present for any analysis to run.
///
/// `hhea` and `maxp` are needed to interpret `hmtx`.
const REQUIRED_TABLES: [Tag; 4] = [
    Tag::new(b"head"),
    Tag::new(b"hhea"),
    Tag::new(b"maxp"),
    Tag::new(b"hmtx"),
];

/// Reference counted font bytes, either a heap buffer or a memory map.
#[derive(Clone)]
pub struct SharedFontData(Arc<dyn AsRef<[u8]> + Send + Sync>);

impl SharedFontData {
    pub fn new(data: impl AsRef<[u8]> + Send + Sync + 'static) -> Self {
        Self(Arc::new(data))
    }

    /// Maps the file at `path` into memory.
    pub fn map_file(path: &Path) -> Result<Self, Error> {
        let io_err = |source| Error::Io {
            path: path.to_owned(),
            source,
        };
        let file = std::fs::File::open(path).map_err(io_err)?;
        // The map is read only; modifying the file while it is mapped is
        // outside of our control.
        let map = unsafe { memmap2::Mmap::map(&file) }.map_err(io_err)?;
        Ok(Self::new(map))
    }
}

impl AsRef<[u8]> for SharedFontData {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref().as_ref()
    }
}

/// A validated font face.
///
/// The handle owns (a share of) the font bytes; everything derived from it
/// borrows from the handle and is released with it.
#[derive(Clone)]
pub struct FontHandle {
    id: String,
    data: SharedFontData,
    index: u32,
}

impl FontHandle {
    /// Loads the first face of the font file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let data = SharedFontData::map_file(path)?;
        Self::from_shared(path.display().to_string(), data, 0)
    }

    /// Loads every face of the font or collection file at `path`.
    ///
    /// Fails only when the file cannot be read or is not an sfnt container;
    /// each face is validated separately. Faces of a collection are
    /// identified as `path#index`.
    pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<Result<Self, Error>>, Error> {
        let path = path.as_ref();
        let data = SharedFontData::map_file(path)?;
        Self::faces(path.display().to_string(), data)
    }

    /// Splits shared font data into one handle per face.
    pub fn faces(
        id: impl Into<String>,
        data: SharedFontData,
    ) -> Result<Vec<Result<Self, Error>>, Error> {
        let id = id.into();
        let count = match FileRef::new(data.as_ref()) {
            Ok(FileRef::Font(_)) => 1,
            Ok(FileRef::Collection(collection)) => collection.len(),
            Err(reason) => return Err(Error::UnsupportedFormat { font: id, reason }),
        };
        if count == 1 {
            return Ok(vec![Self::from_shared(id, data, 0)]);
        }
        Ok((0..count)
            .map(|index| Self::from_shared(format!("{id}#{index}"), data.clone(), index))
            .collect())
    }

    /// Creates a handle over an owned buffer.
    pub fn from_bytes(id: impl Into<String>, data: Vec<u8>) -> Result<Self, Error> {
        Self::from_shared(id, SharedFontData::new(data), 0)
    }

    /// Creates a handle for the face at `index` of the given data.
    pub fn from_shared(
        id: impl Into<String>,
        data: SharedFontData,
        index: u32,
    ) -> Result<Self, Error> {
        let handle = Self {
            id: id.into(),
            data,
            index,
        };
        let font = handle.font()?;
        if let Some(tag) = REQUIRED_TABLES
            .into_iter()
            .find(|tag| font.table_data(*tag).is_none())
        {
            return Err(Error::MissingTable {
                font: handle.id.clone(),
                tag,
            });
        }
        Ok(handle)
    }

    /// Identifier used in reports and error messages.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    pub fn font(&self) -> Result<FontRef<'_>, Error> {
        FontRef::from_index(self.data.as_ref(), self.index).map_err(|reason| {
            Error::UnsupportedFormat {
                font: self.id.clone(),
                reason,
            }
        })
    }

    pub fn tables(&self) -> Result<FontTables<'_>, Error> {
        self.font().map(FontTables::new)
    }
}

/// Kind of glyph outlines carried by a font.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutlineFormat {
    TrueType,
    Cff,
    Cff2,
}

/// A variation axis as declared in `fvar`.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct VariationAxis {
    #[serde(serialize_with = "crate::report::serialize_tag")]
    pub tag: Tag,
    pub name: String,
    pub min: f32,
    pub default: f32,
    pub max: f32,
    pub hidden: bool,
}

/// A named instance declared in `fvar`.
#[derive(Clone, PartialEq, Debug, Serialize)]
pub struct NamedInstance {
    pub name: String,
    /// User space coordinates keyed by axis tag.
    pub coordinates: BTreeMap<String, f32>,
}

/// Typed access to the tables of a font.
///
/// Optional tables yield `None`.
#[derive(Clone)]
pub struct FontTables<'a> {
    font: FontRef<'a>,
}

impl<'a> FontTables<'a> {
    pub fn new(font: FontRef<'a>) -> Self {
        Self { font }
    }

    pub fn font(&self) -> &FontRef<'a> {
        &self.font
    }

    pub fn head(&self) -> Option<Head<'a>> {
        self.font.head().ok()
    }

    pub fn hhea(&self) -> Option<Hhea<'a>> {
        self.font.hhea().ok()
    }

    pub fn os2(&self) -> Option<Os2<'a>> {
        self.font.os2().ok()
    }

    pub fn post(&self) -> Option<Post<'a>> {
        self.font.post().ok()
    }

    pub fn units_per_em(&self) -> u16 {
        self.head().map(|head| head.units_per_em()).unwrap_or(1000)
    }

    pub fn glyph_count(&self) -> u16 {
        self.font
            .maxp()
            .map(|maxp| maxp.num_glyphs())
            .unwrap_or_default()
    }

    /// Every code point mapped by the preferred `cmap` subtable.
    pub fn code_points(&self) -> BTreeSet<u32> {
        self.font
            .charmap()
            .mappings()
            .map(|(code_point, _)| code_point)
            .collect()
    }

    pub fn outline_format(&self) -> Option<OutlineFormat> {
        let has = |tag: &[u8; 4]| self.font.table_data(Tag::new(tag)).is_some();
        if has(b"CFF2") {
            Some(OutlineFormat::Cff2)
        } else if has(b"CFF ") {
            Some(OutlineFormat::Cff)
        } else if has(b"glyf") && has(b"loca") {
            Some(OutlineFormat::TrueType)
        } else {
            None
        }
    }

    pub fn is_variable(&self) -> bool {
        !self.font.axes().is_empty()
    }

    pub fn axes(&self) -> Vec<VariationAxis> {
        self.font
            .axes()
            .iter()
            .map(|axis| VariationAxis {
                tag: axis.tag(),
                name: self
                    .string(axis.name_id())
                    .unwrap_or_else(|| axis_display_name(axis.tag())),
                min: axis.min_value(),
                default: axis.default_value(),
                max: axis.max_value(),
                hidden: axis.is_hidden(),
            })
            .collect()
    }

    pub fn named_instances(&self) -> Vec<NamedInstance> {
        let tags: Vec<_> = self.font.axes().iter().map(|axis| axis.tag()).collect();
        self.font
            .named_instances()
            .iter()
            .enumerate()
            .map(|(ix, instance)| NamedInstance {
                name: self
                    .string(instance.subfamily_name_id())
                    .unwrap_or_else(|| format!("Instance {}", ix + 1)),
                coordinates: tags
                    .iter()
                    .map(Tag::to_string)
                    .zip(instance.user_coords())
                    .collect(),
            })
            .collect()
    }

    /// Typographic family name, falling back to the legacy family name.
    pub fn family_name(&self) -> Option<String> {
        self.string(StringId::TYPOGRAPHIC_FAMILY_NAME)
            .or_else(|| self.string(StringId::FAMILY_NAME))
    }

    pub fn full_name(&self) -> Option<String> {
        self.string(StringId::FULL_NAME)
    }

    fn string(&self, id: StringId) -> Option<String> {
        self.font
            .localized_strings(id)
            .english_or_first()
            .map(|string| string.to_string())
            .filter(|string| !string.is_empty())
    }
}

/// Fallback names for registered axes without a name table entry.
fn axis_display_name(tag: Tag) -> String {
    match &tag.to_be_bytes() {
        b"wght" => "Weight".into(),
        b"wdth" => "Width".into(),
        b"slnt" => "Slant".into(),
        b"ital" => "Italic".into(),
        b"opsz" => "Optical Size".into(),
        b"GRAD" => "Grade".into(),
        _ => tag.to_string(),
    }
}
