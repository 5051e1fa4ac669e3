//! FontDescriptor dictionaries for embedded TrueType fonts.
//!
//! All metrics are converted from font units to the 1000-unit glyph space
//! PDF expects, truncating toward zero.

use super::truetype_parser::TrueTypeFont;
use crate::object::{Object, ObjectRef};
use bitflags::bitflags;
use std::collections::HashMap;

bitflags! {
    /// FontDescriptor `/Flags` (PDF 32000-1:2008, Table 123).
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FontFlags: u32 {
        /// All glyphs have the same width
        const FIXED_PITCH = 1 << 0;
        /// Glyphs have serifs
        const SERIF = 1 << 1;
        /// Font contains glyphs outside the standard Latin set
        const SYMBOLIC = 1 << 2;
        /// Glyphs resemble cursive handwriting
        const SCRIPT = 1 << 3;
        /// Font uses the standard Latin character set
        const NONSYMBOLIC = 1 << 5;
        /// Glyphs are slanted
        const ITALIC = 1 << 6;
    }
}

/// StemV used when the font has no OS/2 table.
const DEFAULT_STEM_V: i32 = 80;

/// Derived PDF metrics of a font.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    /// `/FontName`
    pub font_name: String,
    /// `/Flags`
    pub flags: FontFlags,
    /// `/FontBBox` (llx, lly, urx, ury)
    pub bbox: [i32; 4],
    /// `/ItalicAngle` in degrees
    pub italic_angle: f32,
    /// `/Ascent`
    pub ascent: i32,
    /// `/Descent`
    pub descent: i32,
    /// `/CapHeight`
    pub cap_height: i32,
    /// `/XHeight`, omitted when zero
    pub x_height: i32,
    /// `/Leading`, omitted when zero
    pub leading: i32,
    /// `/StemV`
    pub stem_v: i32,
}

impl FontDescriptor {
    /// Compute the descriptor of `font`, named after its base name.
    pub fn from_font(font: &TrueTypeFont) -> Self {
        let m = font.metrics();
        let scale = |v: i16| font.to_pdf_units(i32::from(v));

        let mut flags = FontFlags::NONSYMBOLIC;
        if m.is_fixed_pitch {
            flags |= FontFlags::FIXED_PITCH;
        }
        if m.is_italic || m.italic_angle != 0.0 {
            flags |= FontFlags::ITALIC;
        }

        Self {
            font_name: font.base_name(),
            flags,
            bbox: [scale(m.bbox[0]), scale(m.bbox[1]), scale(m.bbox[2]), scale(m.bbox[3])],
            italic_angle: m.italic_angle,
            ascent: scale(m.ascent),
            descent: scale(m.descent),
            cap_height: scale(m.cap_height),
            x_height: scale(m.x_height),
            leading: scale(m.line_gap),
            stem_v: m.weight_class.map_or(DEFAULT_STEM_V, stem_v_from_weight),
        }
    }

    /// Replace the font name, e.g. with the tagged subset name.
    pub fn with_font_name(mut self, name: impl Into<String>) -> Self {
        self.font_name = name.into();
        self
    }

    /// Build the `/FontDescriptor` dictionary.
    ///
    /// `font_file2` is the object number of the font program stream; 0
    /// leaves the reference out.
    pub fn to_object(&self, font_file2: u32) -> Object {
        let mut dict = HashMap::new();
        dict.insert("Type".to_string(), Object::Name("FontDescriptor".to_string()));
        dict.insert("FontName".to_string(), Object::Name(self.font_name.clone()));
        dict.insert("Flags".to_string(), Object::Integer(i64::from(self.flags.bits())));
        dict.insert(
            "FontBBox".to_string(),
            Object::Array(self.bbox.iter().map(|&v| Object::Integer(i64::from(v))).collect()),
        );
        dict.insert("ItalicAngle".to_string(), Object::Real(f64::from(self.italic_angle)));
        dict.insert("Ascent".to_string(), Object::Integer(i64::from(self.ascent)));
        dict.insert("Descent".to_string(), Object::Integer(i64::from(self.descent)));
        dict.insert("CapHeight".to_string(), Object::Integer(i64::from(self.cap_height)));
        dict.insert("StemV".to_string(), Object::Integer(i64::from(self.stem_v)));

        if self.x_height > 0 {
            dict.insert("XHeight".to_string(), Object::Integer(i64::from(self.x_height)));
        }
        if self.leading > 0 {
            dict.insert("Leading".to_string(), Object::Integer(i64::from(self.leading)));
        }
        if font_file2 != 0 {
            dict.insert("FontFile2".to_string(), Object::Reference(ObjectRef::new(font_file2, 0)));
        }

        Object::Dictionary(dict)
    }
}

/// Approximate the dominant vertical stem width from the weight class.
fn stem_v_from_weight(weight: u16) -> i32 {
    let w = (f32::from(weight) - 50.0) / 900.0;
    (10.0 + 220.0 * w * w) as i32
}
