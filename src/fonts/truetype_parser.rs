//! TrueType font model for PDF embedding.
//!
//! Reads the tables needed to embed a TrueType font as a CIDFontType2:
//! global metrics (`head`, `hhea`, `OS/2`, `post`), advance widths (`hmtx`),
//! the PostScript name (`name`) and the Unicode to glyph mapping (`cmap`).
//!
//! # Font Embedding in PDF
//!
//! Per ISO 32000-1 sections 9.6-9.8, embedded fonts require:
//! - FontDescriptor with metrics (ascender, descender, cap height, etc.)
//! - ToUnicode CMap for text extraction
//! - Font program data (FontFile2 for TrueType)
//! - CIDFont for Unicode (Type 0 composite fonts with Identity-H encoding)

use super::cmap_table::parse_cmap;
use super::sfnt::{TTFTable, TableDirectory, Tag};
use crate::error::{Error, Result};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::path::Path;

/// Global font metrics in font units.
#[derive(Debug, Clone, PartialEq)]
pub struct FontMetrics {
    /// Units per em (head.unitsPerEm)
    pub units_per_em: u16,
    /// Font bounding box (xMin, yMin, xMax, yMax)
    pub bbox: [i16; 4],
    /// Typographic ascender (hhea)
    pub ascent: i16,
    /// Typographic descender, negative (hhea)
    pub descent: i16,
    /// Line gap (hhea)
    pub line_gap: i16,
    /// Cap height (OS/2 v2+, else ascent)
    pub cap_height: i16,
    /// x-height (OS/2 v2+, else 0)
    pub x_height: i16,
    /// Italic angle in degrees (post)
    pub italic_angle: f32,
    /// OS/2 weight class, if the table is present
    pub weight_class: Option<u16>,
    /// Monospaced (post.isFixedPitch)
    pub is_fixed_pitch: bool,
    /// Italic per head.macStyle or OS/2.fsSelection
    pub is_italic: bool,
}

/// A parsed TrueType font.
///
/// Immutable after loading; share it between subsets with `Arc`.
#[derive(Debug, Clone)]
pub struct TrueTypeFont {
    data: Bytes,
    tables: TableDirectory,
    file_name: Option<String>,
    postscript_name: String,
    metrics: FontMetrics,
    num_glyphs: u16,
    index_to_loc_format: i16,
    glyph_widths: BTreeMap<u16, u16>,
    char_to_glyph: BTreeMap<char, u16>,
}

impl TrueTypeFont {
    /// Parse a TrueType font from raw data.
    ///
    /// Fails without returning a partial model when the sfnt header, the
    /// table directory or any required table is malformed.
    pub fn parse(data: impl Into<Bytes>) -> Result<Self> {
        let data = data.into();
        let tables = TableDirectory::parse(&data)?;

        let head = tables.require(Tag::HEAD)?.reader();
        let units_per_em = head.u16(18)?;
        if units_per_em == 0 {
            return Err(Error::InvalidFormat("unitsPerEm is zero".to_string()));
        }
        let bbox = [head.i16(36)?, head.i16(38)?, head.i16(40)?, head.i16(42)?];
        let mac_style = head.u16(44)?;
        let index_to_loc_format = head.i16(50)?;

        let num_glyphs = tables.require(Tag::MAXP)?.reader().u16(4)?;
        if num_glyphs == 0 {
            return Err(Error::InvalidFormat("font has no glyphs".to_string()));
        }

        let hhea = tables.require(Tag::HHEA)?.reader();
        let ascent = hhea.i16(4)?;
        let descent = hhea.i16(6)?;
        let line_gap = hhea.i16(8)?;
        let num_h_metrics = hhea.u16(34)?;

        let glyph_widths =
            parse_hmtx(tables.require(Tag::HMTX)?, num_h_metrics, num_glyphs)?;

        let mut char_to_glyph = parse_cmap(tables.require(Tag::CMAP)?, num_glyphs)?;
        let before = char_to_glyph.len();
        char_to_glyph.retain(|_, gid| *gid < num_glyphs);
        if char_to_glyph.len() != before {
            log::debug!(
                "Dropped {} cmap entries pointing past glyph count {}",
                before - char_to_glyph.len(),
                num_glyphs
            );
        }

        let os2 = tables.get(Tag::OS2).map(parse_os2).transpose()?.flatten();
        let (italic_angle, is_fixed_pitch) = match tables.get(Tag::POST) {
            Some(post) => {
                let reader = post.reader();
                (reader.i32(4)? as f32 / 65536.0, reader.u32(12)? != 0)
            },
            None => (0.0, false),
        };

        let metrics = FontMetrics {
            units_per_em,
            bbox,
            ascent,
            descent,
            line_gap,
            cap_height: os2.as_ref().and_then(|o| o.cap_height).unwrap_or(ascent),
            x_height: os2.as_ref().and_then(|o| o.x_height).unwrap_or(0),
            italic_angle,
            weight_class: os2.as_ref().map(|o| o.weight_class),
            is_fixed_pitch,
            is_italic: mac_style & 0x0002 != 0
                || os2.as_ref().is_some_and(|o| o.fs_selection & 0x0001 != 0),
        };

        let postscript_name = match tables.get(Tag::NAME) {
            Some(name) => parse_postscript_name(name)?,
            None => String::new(),
        };

        log::debug!(
            "Parsed font '{}': {} glyphs, {} mapped chars, {} units/em",
            postscript_name,
            num_glyphs,
            char_to_glyph.len(),
            units_per_em
        );

        Ok(Self {
            data,
            tables,
            file_name: None,
            postscript_name,
            metrics,
            num_glyphs,
            index_to_loc_format,
            glyph_widths,
            char_to_glyph,
        })
    }

    /// Load a font from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let font = Self::parse(data)?;
        Ok(match path.file_stem() {
            Some(stem) => font.with_file_name(stem.to_string_lossy()),
            None => font,
        })
    }

    /// Set the file name used when the font has no PostScript name.
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    /// Name used for `/BaseFont` and `/FontName`.
    ///
    /// The PostScript name, or the file name with spaces removed when the
    /// font does not carry one.
    pub fn base_name(&self) -> String {
        if !self.postscript_name.is_empty() {
            return self.postscript_name.clone();
        }
        match &self.file_name {
            Some(name) => name.chars().filter(|c| *c != ' ').collect(),
            None => "Unnamed".to_string(),
        }
    }

    /// PostScript name from the `name` table (may be empty).
    pub fn postscript_name(&self) -> &str {
        &self.postscript_name
    }

    /// Global metrics.
    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    /// Units per em.
    pub fn units_per_em(&self) -> u16 {
        self.metrics.units_per_em
    }

    /// Number of glyphs (maxp.numGlyphs).
    pub fn num_glyphs(&self) -> u16 {
        self.num_glyphs
    }

    /// `head.indexToLocFormat` (0 short, 1 long).
    pub fn index_to_loc_format(&self) -> i16 {
        self.index_to_loc_format
    }

    /// Advance width of every glyph, in font units.
    pub fn glyph_widths(&self) -> &BTreeMap<u16, u16> {
        &self.glyph_widths
    }

    /// Unicode scalar to glyph mapping.
    pub fn char_to_glyph(&self) -> &BTreeMap<char, u16> {
        &self.char_to_glyph
    }

    /// Glyph ID for a character.
    pub fn glyph_id(&self, ch: char) -> Option<u16> {
        self.char_to_glyph.get(&ch).copied()
    }

    /// Advance width of a glyph in font units.
    pub fn glyph_width(&self, gid: u16) -> Option<u16> {
        self.glyph_widths.get(&gid).copied()
    }

    /// Raw font file.
    pub fn font_data(&self) -> &Bytes {
        &self.data
    }

    /// Table directory.
    pub fn tables(&self) -> &TableDirectory {
        &self.tables
    }

    /// A table by tag.
    pub fn table(&self, tag: Tag) -> Option<&TTFTable> {
        self.tables.get(tag)
    }

    /// Convert font units to PDF glyph space (1/1000 em), truncating toward zero.
    pub fn to_pdf_units(&self, value: i32) -> i32 {
        (value as i64 * 1000 / self.metrics.units_per_em as i64) as i32
    }
}

fn parse_hmtx(table: &TTFTable, num_h_metrics: u16, num_glyphs: u16) -> Result<BTreeMap<u16, u16>> {
    if num_h_metrics == 0 {
        return Err(Error::InvalidFormat("hhea.numberOfHMetrics is zero".to_string()));
    }
    let reader = table.reader();
    let long_metrics = num_h_metrics.min(num_glyphs);

    let mut widths = BTreeMap::new();
    let mut last = 0;
    for gid in 0..long_metrics {
        last = reader.u16(gid as usize * 4)?;
        widths.insert(gid, last);
    }
    // Trailing glyphs repeat the last advance.
    for gid in long_metrics..num_glyphs {
        widths.insert(gid, last);
    }
    Ok(widths)
}

struct Os2 {
    weight_class: u16,
    fs_selection: u16,
    x_height: Option<i16>,
    cap_height: Option<i16>,
}

fn parse_os2(table: &TTFTable) -> Result<Option<Os2>> {
    let reader = table.reader();
    if reader.len() < 64 {
        log::debug!("Ignoring short OS/2 table ({} bytes)", reader.len());
        return Ok(None);
    }
    let version = reader.u16(0)?;
    let (x_height, cap_height) = if version >= 2 && reader.len() >= 90 {
        (Some(reader.i16(86)?), Some(reader.i16(88)?))
    } else {
        (None, None)
    };
    Ok(Some(Os2 {
        weight_class: reader.u16(4)?,
        fs_selection: reader.u16(62)?,
        x_height,
        cap_height,
    }))
}

/// Name ID 6, preferring Windows Unicode, then Unicode, then Mac Roman.
fn parse_postscript_name(table: &TTFTable) -> Result<String> {
    let reader = table.reader();
    let count = reader.u16(2)? as usize;
    let storage = reader.u16(4)? as usize;

    let mut best: Option<(u8, String)> = None;
    for i in 0..count {
        let base = 6 + i * 12;
        let platform_id = reader.u16(base)?;
        let encoding_id = reader.u16(base + 2)?;
        let name_id = reader.u16(base + 6)?;
        if name_id != 6 {
            continue;
        }
        let length = reader.u16(base + 8)? as usize;
        let offset = reader.u16(base + 10)? as usize;
        let Ok(raw) = reader.bytes(storage + offset, length) else {
            log::warn!("PostScript name record {} points outside the name table", i);
            continue;
        };

        let (rank, name) = match (platform_id, encoding_id) {
            (3, 1) | (3, 10) => (0, decode_utf16be(raw)),
            (0, _) => (1, decode_utf16be(raw)),
            (1, 0) => (2, raw.iter().map(|&b| b as char).collect()),
            _ => continue,
        };
        if best.as_ref().map_or(true, |(r, _)| rank < *r) {
            best = Some((rank, name));
        }
    }

    Ok(best.map(|(_, name)| name.trim().to_string()).unwrap_or_default())
}

fn decode_utf16be(raw: &[u8]) -> String {
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::test_fonts::{hello_font, TestFont, TestGlyph};

    #[test]
    fn test_parse_hello_font() {
        let font = TrueTypeFont::parse(hello_font()).unwrap();
        assert_eq!(font.postscript_name(), "TestSans");
        assert_eq!(font.units_per_em(), 1000);
        assert_eq!(font.num_glyphs(), 3);
        assert_eq!(font.glyph_id('H'), Some(1));
        assert_eq!(font.glyph_id('i'), Some(2));
        assert_eq!(font.glyph_id('x'), None);
        assert_eq!(font.glyph_width(0), Some(500));
        assert_eq!(font.glyph_width(1), Some(700));
        assert_eq!(font.glyph_width(2), Some(300));
    }

    #[test]
    fn test_metrics() {
        let mut test_font = TestFont::new(2048);
        test_font.italic_angle = -12 << 16;
        test_font.fixed_pitch = true;
        let font = TrueTypeFont::parse(test_font.build()).unwrap();
        let m = font.metrics();
        assert_eq!(m.ascent, 800);
        assert_eq!(m.descent, -200);
        assert_eq!(m.cap_height, 700);
        assert_eq!(m.x_height, 500);
        assert_eq!(m.weight_class, Some(400));
        assert_eq!(m.italic_angle, -12.0);
        assert!(m.is_fixed_pitch);
        assert!(m.is_italic);
        assert_eq!(font.to_pdf_units(-200), -97);
    }

    #[test]
    fn test_metrics_without_os2() {
        let mut test_font = TestFont::new(1000);
        test_font.with_os2 = false;
        let font = TrueTypeFont::parse(test_font.build()).unwrap();
        assert_eq!(font.metrics().cap_height, 800);
        assert_eq!(font.metrics().x_height, 0);
        assert_eq!(font.metrics().weight_class, None);
    }

    #[test]
    fn test_base_name_falls_back_to_file_name() {
        let font = TrueTypeFont::parse(TestFont::new(1000).name(None).build())
            .unwrap()
            .with_file_name("My Font Regular");
        assert_eq!(font.postscript_name(), "");
        assert_eq!(font.base_name(), "MyFontRegular");
    }

    #[test]
    fn test_widths_cover_every_glyph() {
        let data = TestFont::new(1000)
            .glyph(TestGlyph::Empty(250))
            .simple(600)
            .build();
        let font = TrueTypeFont::parse(data).unwrap();
        assert_eq!(font.glyph_widths().len(), 3);
        assert_eq!(font.glyph_width(1), Some(250));
        assert_eq!(font.glyph_width(2), Some(600));
    }

    #[test]
    fn test_supplementary_plane_mapping() {
        let data = TestFont::new(1000).simple(900).map('\u{1F600}', 1).map('a', 1).build();
        let font = TrueTypeFont::parse(data).unwrap();
        assert_eq!(font.glyph_id('\u{1F600}'), Some(1));
        assert_eq!(font.glyph_id('a'), Some(1));
    }

    #[test]
    fn test_cmap_entries_past_glyph_count_dropped() {
        let data = TestFont::new(1000).simple(700).map('A', 1).map('B', 9).build();
        let font = TrueTypeFont::parse(data).unwrap();
        assert_eq!(font.char_to_glyph().len(), 1);
    }

    #[test]
    fn test_zero_units_per_em_rejected() {
        let err = TrueTypeFont::parse(TestFont::new(0).build()).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_truncated_font_rejected() {
        let data = hello_font();
        assert!(TrueTypeFont::parse(data[..data.len() / 2].to_vec()).is_err());
        assert!(TrueTypeFont::parse(Vec::new()).is_err());
    }

    #[test]
    fn test_from_file_uses_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Open Sans.ttf");
        std::fs::write(&path, TestFont::new(1000).name(None).build()).unwrap();
        let font = TrueTypeFont::from_file(&path).unwrap();
        assert_eq!(font.base_name(), "OpenSans");
    }
}
