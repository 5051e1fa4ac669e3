//! Type0 / CIDFontType2 font embedding.
//!
//! Per ISO 32000-1 section 9.7, a TrueType font used for Unicode text is
//! written as five objects:
//!
//! ```text
//! Type0 font ──/DescendantFonts──> CIDFontType2 ──/FontDescriptor──> FontDescriptor
//!     │                                                                   │
//!     └──/ToUnicode──> CMap stream                        /FontFile2 ─────┘──> font program
//! ```
//!
//! Content streams show 2-byte glyph IDs (`/Encoding /Identity-H`) and the
//! CIDFont maps them straight to glyphs (`/CIDToGIDMap /Identity`).

use super::compression::StreamCompressor;
use super::font_manager::StandardFont;
use super::object_ids::ObjectIdAllocator;
use super::object_serializer::ObjectSerializer;
use crate::config::EmbedConfig;
use crate::error::{Error, Result};
use crate::fonts::{generate_tounicode_cmap, BuiltSubset, FontDescriptor, TrueTypeFont};
use crate::object::{IndirectObject, Object};

/// Object numbers of one embedded font.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedFontRefs {
    /// Type0 font dictionary, the object pages reference
    pub type0: u32,
    /// FontDescriptor dictionary
    pub descriptor: u32,
    /// ToUnicode CMap stream
    pub to_unicode: u32,
    /// FontFile2 stream
    pub font_file: u32,
    /// CIDFontType2 dictionary
    pub cid_font: u32,
}

/// Write the objects embedding `subset`.
///
/// Object numbers for the Type0 font, FontDescriptor, ToUnicode and
/// FontFile2 are allocated in that order, followed by the CIDFont. The
/// objects come back as Type0, CIDFont, FontDescriptor, ToUnicode,
/// FontFile2. Any failure aborts the whole font before a single object
/// number is allocated.
pub fn write_font(
    subset: &BuiltSubset<'_>,
    ids: &mut dyn ObjectIdAllocator,
    compressor: &dyn StreamCompressor,
    config: &EmbedConfig,
) -> Result<(Vec<IndirectObject>, EmbeddedFontRefs)> {
    let font = subset.font();
    build_font_objects(subset, ids, compressor, config).map_err(|e| Error::FontWrite {
        font: font.base_name(),
        source: Box::new(e),
    })
}

fn build_font_objects(
    subset: &BuiltSubset<'_>,
    ids: &mut dyn ObjectIdAllocator,
    compressor: &dyn StreamCompressor,
    config: &EmbedConfig,
) -> Result<(Vec<IndirectObject>, EmbeddedFontRefs)> {
    let font = subset.font();
    let serializer = ObjectSerializer::new();

    let font_name = if config.subsetting() {
        subset.subset_font_name()
    } else {
        font.base_name()
    };

    // Streams are compressed before any number is taken, so a failed
    // write leaves the allocator untouched.
    let font_file_obj = font_program_stream(subset, compressor, config)?;
    let cmap = generate_tounicode_cmap(subset);
    let cmap_data = compressor.compress(cmap.as_bytes(), config.compression_level)?;
    let to_unicode_obj = ObjectSerializer::stream(
        vec![("Filter", ObjectSerializer::name(compressor.filter_name()))],
        cmap_data,
    );

    let type0 = ids.allocate();
    let descriptor = ids.allocate();
    let to_unicode = ids.allocate();
    let font_file = ids.allocate();

    let descriptor_obj = FontDescriptor::from_font(font)
        .with_font_name(font_name.clone())
        .to_object(font_file);

    let cid_font = ids.allocate();
    let cid_font_obj = ObjectSerializer::dict(vec![
        ("Type", ObjectSerializer::name("Font")),
        ("Subtype", ObjectSerializer::name("CIDFontType2")),
        ("BaseFont", ObjectSerializer::name(&font_name)),
        (
            "CIDSystemInfo",
            ObjectSerializer::dict(vec![
                ("Registry", ObjectSerializer::string("Adobe")),
                ("Ordering", ObjectSerializer::string("Identity")),
                ("Supplement", ObjectSerializer::integer(0)),
            ]),
        ),
        ("FontDescriptor", ObjectSerializer::reference(descriptor, 0)),
        ("CIDToGIDMap", ObjectSerializer::name("Identity")),
        ("DW", ObjectSerializer::integer(i64::from(default_width(font)))),
        ("W", widths_array(&glyph_widths(subset))),
    ]);

    let type0_obj = ObjectSerializer::dict(vec![
        ("Type", ObjectSerializer::name("Font")),
        ("Subtype", ObjectSerializer::name("Type0")),
        ("BaseFont", ObjectSerializer::name(&font_name)),
        ("Encoding", ObjectSerializer::name("Identity-H")),
        (
            "DescendantFonts",
            ObjectSerializer::array(vec![ObjectSerializer::reference(cid_font, 0)]),
        ),
        ("ToUnicode", ObjectSerializer::reference(to_unicode, 0)),
    ]);

    log::debug!(
        "Embedded font '{}': Type0 {} CIDFont {} FontDescriptor {} ToUnicode {} FontFile2 {}",
        font_name,
        type0,
        cid_font,
        descriptor,
        to_unicode,
        font_file
    );

    let objects = vec![
        serializer.indirect(type0, &type0_obj),
        serializer.indirect(cid_font, &cid_font_obj),
        serializer.indirect(descriptor, &descriptor_obj),
        serializer.indirect(to_unicode, &to_unicode_obj),
        serializer.indirect(font_file, &font_file_obj),
    ];

    Ok((
        objects,
        EmbeddedFontRefs {
            type0,
            descriptor,
            to_unicode,
            font_file,
            cid_font,
        },
    ))
}

/// FontFile2 stream: the compressed subset when it beats the compressed
/// original, otherwise the original.
fn font_program_stream(
    subset: &BuiltSubset<'_>,
    compressor: &dyn StreamCompressor,
    config: &EmbedConfig,
) -> Result<Object> {
    let original = subset.font().font_data();
    let level = config.compression_level;
    let compressed_original = compressor.compress(original, level)?;

    let (length1, data) = if config.subsetting() {
        let compressed_subset = compressor.compress(subset.data(), level)?;
        if compressed_subset.len() < compressed_original.len() {
            log::debug!(
                "Using subset program for '{}': {} bytes (original {})",
                subset.font().base_name(),
                compressed_subset.len(),
                compressed_original.len()
            );
            (subset.data().len(), compressed_subset)
        } else {
            log::debug!(
                "Subset of '{}' is not smaller, embedding original program",
                subset.font().base_name()
            );
            (original.len(), compressed_original)
        }
    } else {
        (original.len(), compressed_original)
    };

    Ok(ObjectSerializer::stream(
        vec![
            ("Filter", ObjectSerializer::name(compressor.filter_name())),
            ("Length1", ObjectSerializer::integer(length1 as i64)),
        ],
        data,
    ))
}

/// `/DW`: width of the space glyph, or 1000.
fn default_width(font: &TrueTypeFont) -> i32 {
    font.glyph_id(' ')
        .and_then(|gid| font.glyph_width(gid))
        .map_or(1000, |w| font.to_pdf_units(i32::from(w)))
}

/// Scaled widths of every used glyph with a known width, sorted by glyph.
fn glyph_widths(subset: &BuiltSubset<'_>) -> Vec<(u16, i32)> {
    let font = subset.font();
    subset
        .used_glyphs()
        .into_iter()
        .filter_map(|gid| {
            font.glyph_width(gid)
                .map(|w| (gid, font.to_pdf_units(i32::from(w))))
        })
        .collect()
}

/// Build a `/W` array, merging consecutive glyph IDs into one run:
/// `[start [w1 w2 ...] start [w ...] ...]`.
///
/// `widths` must be sorted by glyph ID.
pub fn widths_array(widths: &[(u16, i32)]) -> Object {
    let mut result = Vec::new();
    let mut run: Vec<Object> = Vec::new();
    let mut run_start = 0u16;
    let mut prev: Option<u16> = None;

    for &(gid, width) in widths {
        let continues = prev.is_some_and(|p| u32::from(p) + 1 == u32::from(gid));
        if !continues && !run.is_empty() {
            result.push(Object::Integer(i64::from(run_start)));
            result.push(Object::Array(std::mem::take(&mut run)));
        }
        if run.is_empty() {
            run_start = gid;
        }
        run.push(Object::Integer(i64::from(width)));
        prev = Some(gid);
    }
    if !run.is_empty() {
        result.push(Object::Integer(i64::from(run_start)));
        result.push(Object::Array(run));
    }

    Object::Array(result)
}

/// Write a standard 14 font as a simple `/Type1` font dictionary.
///
/// Symbol and ZapfDingbats use their built-in encoding; the others use
/// `/WinAnsiEncoding`.
pub fn write_standard_font(font: StandardFont, ids: &mut dyn ObjectIdAllocator) -> IndirectObject {
    let mut entries = vec![
        ("Type", ObjectSerializer::name("Font")),
        ("Subtype", ObjectSerializer::name("Type1")),
        ("BaseFont", ObjectSerializer::name(font.name())),
    ];
    if font.uses_win_ansi() {
        entries.push(("Encoding", ObjectSerializer::name("WinAnsiEncoding")));
    }
    ObjectSerializer::new().indirect(ids.allocate(), &ObjectSerializer::dict(entries))
}
