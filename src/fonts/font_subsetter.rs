//! Font subsetting for PDF embedding.
//!
//! A [`FontSubset`] records which characters of a font are drawn and turns
//! that set into a font program fit for a FontFile2 stream.
//!
//! # Subset Naming
//!
//! Per ISO 32000-1 section 9.6.4, subset fonts should have a tag prefix:
//! `ABCDEF+FontName` where ABCDEF is a 6-letter uppercase tag derived from
//! the used characters.
//!
//! # Glyph IDs
//!
//! Content streams address glyphs by their original IDs (the CIDFont uses
//! `/CIDToGIDMap /Identity`), so the subset keeps every glyph slot and only
//! empties the outlines nobody references.

use super::sfnt::{SfntBuilder, TTFTable, TableReader, Tag};
use super::truetype_parser::TrueTypeFont;
use crate::config::EmbedConfig;
use crate::error::{Error, Result};
use bytes::Bytes;
use std::collections::BTreeSet;
use std::sync::Arc;

static NO_CHARS: BTreeSet<char> = BTreeSet::new();

/// Tables copied into a subset; everything else is dropped.
const KEPT_TABLES: [Tag; 13] = [
    Tag::HEAD,
    Tag::HHEA,
    Tag::HMTX,
    Tag::MAXP,
    Tag::LOCA,
    Tag::GLYF,
    Tag::CVT,
    Tag::FPGM,
    Tag::PREP,
    Tag::CMAP,
    Tag::OS2,
    Tag::NAME,
    Tag::POST,
];

const HINTING_TABLES: [Tag; 3] = [Tag::CVT, Tag::FPGM, Tag::PREP];

// Composite glyph component flags
const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
const WE_HAVE_A_SCALE: u16 = 0x0008;
const MORE_COMPONENTS: u16 = 0x0020;
const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;

/// Options controlling subset construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubsetOptions {
    /// Drop `cvt `, `fpgm` and `prep`
    pub strip_hinting: bool,
}

impl From<&EmbedConfig> for SubsetOptions {
    fn from(config: &EmbedConfig) -> Self {
        Self {
            strip_hinting: config.strip_hinting,
        }
    }
}

/// Lifecycle of a subset.
///
/// `build()` is the only way into `Built`; recording any character moves a
/// built subset back to `Dirty`.
#[derive(Debug, Clone, PartialEq)]
pub enum SubsetState {
    /// Nothing recorded yet
    Empty,
    /// Characters recorded since the last build
    Dirty(BTreeSet<char>),
    /// Subset program matching `chars`
    Built {
        /// Characters the program was built for
        chars: BTreeSet<char>,
        /// Subset font program
        data: Bytes,
    },
}

/// Usage tracker and subset builder for one font.
#[derive(Debug, Clone)]
pub struct FontSubset {
    font: Arc<TrueTypeFont>,
    state: SubsetState,
    options: SubsetOptions,
}

impl FontSubset {
    /// Create an empty subset of `font`.
    pub fn new(font: Arc<TrueTypeFont>) -> Self {
        Self {
            font,
            state: SubsetState::Empty,
            options: SubsetOptions::default(),
        }
    }

    /// Set subset options.
    pub fn with_options(mut self, options: SubsetOptions) -> Self {
        self.options = options;
        self
    }

    /// The font being subset.
    pub fn font(&self) -> &TrueTypeFont {
        &self.font
    }

    /// Current state.
    pub fn state(&self) -> &SubsetState {
        &self.state
    }

    /// Whether the subset program is current.
    pub fn is_built(&self) -> bool {
        matches!(self.state, SubsetState::Built { .. })
    }

    /// Characters recorded so far.
    pub fn used_chars(&self) -> &BTreeSet<char> {
        match &self.state {
            SubsetState::Empty => &NO_CHARS,
            SubsetState::Dirty(chars) | SubsetState::Built { chars, .. } => chars,
        }
    }

    /// Record one character.
    pub fn use_char(&mut self, ch: char) {
        let mut chars = self.take_chars();
        chars.insert(ch);
        self.state = SubsetState::Dirty(chars);
    }

    /// Record every character of `text`.
    pub fn use_string(&mut self, text: &str) {
        let mut chars = self.take_chars();
        chars.extend(text.chars());
        self.state = SubsetState::Dirty(chars);
    }

    fn take_chars(&mut self) -> BTreeSet<char> {
        match std::mem::replace(&mut self.state, SubsetState::Empty) {
            SubsetState::Empty => BTreeSet::new(),
            SubsetState::Dirty(chars) | SubsetState::Built { chars, .. } => chars,
        }
    }

    /// Build the subset program for the current characters.
    ///
    /// Does nothing when already built. On error the state is unchanged.
    pub fn build(&mut self) -> Result<BuiltSubset<'_>> {
        if !self.is_built() {
            let chars = self.used_chars().clone();
            let data = subset_font(&self.font, &chars, self.options)?;
            log::debug!(
                "Built subset of '{}': {} chars, {} -> {} bytes",
                self.font.base_name(),
                chars.len(),
                self.font.font_data().len(),
                data.len()
            );
            self.state = SubsetState::Built {
                chars,
                data: Bytes::from(data),
            };
        }
        self.built()
            .ok_or_else(|| Error::Font("subset left unbuilt".to_string()))
    }

    /// View of the subset if it is built.
    pub fn built(&self) -> Option<BuiltSubset<'_>> {
        match &self.state {
            SubsetState::Built { chars, data } => Some(BuiltSubset {
                font: &self.font,
                chars,
                data,
            }),
            _ => None,
        }
    }

    /// Width of `text` in points at `size`.
    ///
    /// Characters the font does not map contribute nothing.
    pub fn measure_string(&self, text: &str, size: f32) -> f32 {
        measure(&self.font, text, size)
    }

    /// Six-letter tag for the current characters.
    pub fn subset_tag(&self) -> String {
        subset_tag(self.used_chars())
    }

    /// `TAG+BaseName`.
    pub fn subset_font_name(&self) -> String {
        format!("{}+{}", self.subset_tag(), self.font.base_name())
    }

    /// Subset statistics.
    pub fn stats(&self) -> SubsetStats {
        let glyphs = used_glyphs(&self.font, self.used_chars());
        SubsetStats {
            char_count: self.used_chars().len(),
            glyph_count: glyphs.len(),
            original_size: self.font.font_data().len(),
            subset_size: self.built().map(|b| b.data().len()),
        }
    }
}

/// A subset whose program matches its recorded characters.
///
/// Only obtainable from [`FontSubset::build`] or [`FontSubset::built`], so
/// holding one proves the glyph encoding and the embedded program agree.
#[derive(Debug, Clone, Copy)]
pub struct BuiltSubset<'a> {
    font: &'a TrueTypeFont,
    chars: &'a BTreeSet<char>,
    data: &'a Bytes,
}

impl<'a> BuiltSubset<'a> {
    /// The font.
    pub fn font(&self) -> &'a TrueTypeFont {
        self.font
    }

    /// Characters in the subset.
    pub fn used_chars(&self) -> &'a BTreeSet<char> {
        self.chars
    }

    /// Subset font program.
    pub fn data(&self) -> &'a Bytes {
        self.data
    }

    /// Glyph IDs of the used characters the font maps.
    pub fn used_glyphs(&self) -> BTreeSet<u16> {
        used_glyphs(self.font, self.chars)
    }

    /// Glyph for `ch`, `.notdef` when unmapped.
    pub fn glyph_id(&self, ch: char) -> u16 {
        self.font.glyph_id(ch).unwrap_or(0)
    }

    /// Encode text for Identity-H: `<XXXX...>`, one 4-digit glyph ID per char.
    pub fn encode_hex(&self, text: &str) -> String {
        let mut hex = String::with_capacity(text.len() * 4 + 2);
        hex.push('<');
        for ch in text.chars() {
            hex.push_str(&format!("{:04X}", self.glyph_id(ch)));
        }
        hex.push('>');
        hex
    }

    /// Width of `text` in points at `size`.
    pub fn measure_string(&self, text: &str, size: f32) -> f32 {
        measure(self.font, text, size)
    }

    /// Six-letter tag for the subset characters.
    pub fn subset_tag(&self) -> String {
        subset_tag(self.chars)
    }

    /// `TAG+BaseName`.
    pub fn subset_font_name(&self) -> String {
        format!("{}+{}", self.subset_tag(), self.font.base_name())
    }
}

/// Statistics about a subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsetStats {
    /// Number of recorded characters
    pub char_count: usize,
    /// Number of distinct glyphs they map to
    pub glyph_count: usize,
    /// Original font program size
    pub original_size: usize,
    /// Subset program size, once built
    pub subset_size: Option<usize>,
}

fn measure(font: &TrueTypeFont, text: &str, size: f32) -> f32 {
    let units: u32 = text
        .chars()
        .filter_map(|ch| font.glyph_id(ch))
        .filter_map(|gid| font.glyph_width(gid))
        .map(u32::from)
        .sum();
    units as f32 * size / font.units_per_em() as f32
}

fn used_glyphs(font: &TrueTypeFont, chars: &BTreeSet<char>) -> BTreeSet<u16> {
    chars.iter().filter_map(|&ch| font.glyph_id(ch)).collect()
}

/// Polynomial hash (base 31) over the characters in ascending order, read
/// out as six base-26 letters.
fn subset_tag(chars: &BTreeSet<char>) -> String {
    let hash = chars
        .iter()
        .fold(0u64, |h, &ch| h.wrapping_mul(31).wrapping_add(ch as u64));
    hash_to_tag(hash)
}

/// Convert a hash to a 6-letter uppercase tag.
fn hash_to_tag(hash: u64) -> String {
    let mut tag = String::with_capacity(6);
    let mut h = hash;
    for _ in 0..6 {
        let ch = (h % 26) as u8 + b'A';
        tag.push(ch as char);
        h /= 26;
    }
    tag
}

/// Write a subset of `font` keeping the outlines `chars` need.
///
/// Glyph IDs are preserved. Fonts without `glyf`/`loca` are returned as-is.
pub fn subset_font(
    font: &TrueTypeFont,
    chars: &BTreeSet<char>,
    options: SubsetOptions,
) -> Result<Vec<u8>> {
    let (Some(glyf), Some(loca)) = (font.table(Tag::GLYF), font.table(Tag::LOCA)) else {
        log::debug!("Font '{}' has no glyf/loca, embedding it whole", font.base_name());
        return Ok(font.font_data().to_vec());
    };

    let num_glyphs = font.num_glyphs();
    let offsets = read_loca(loca, font.index_to_loc_format(), num_glyphs)?;

    // .notdef, the mapped glyphs, and everything composites pull in.
    let mut keep: BTreeSet<u16> = BTreeSet::new();
    let mut pending: Vec<u16> = vec![0];
    pending.extend(used_glyphs(font, chars));
    while let Some(gid) = pending.pop() {
        if !keep.insert(gid) {
            continue;
        }
        for component in composite_components(glyph_bytes(&glyf.data, &offsets, gid)?)? {
            if component >= num_glyphs {
                log::warn!("Glyph {} references missing component {}", gid, component);
            } else if !keep.contains(&component) {
                pending.push(component);
            }
        }
    }

    let mut new_glyf = Vec::new();
    let mut new_loca = Vec::with_capacity((num_glyphs as usize + 1) * 4);
    for gid in 0..num_glyphs {
        new_loca.extend_from_slice(&(new_glyf.len() as u32).to_be_bytes());
        if keep.contains(&gid) {
            new_glyf.extend_from_slice(glyph_bytes(&glyf.data, &offsets, gid)?);
            new_glyf.resize((new_glyf.len() + 3) & !3, 0);
        }
    }
    new_loca.extend_from_slice(&(new_glyf.len() as u32).to_be_bytes());

    let mut builder = SfntBuilder::new();
    for table in font.tables().iter() {
        if !KEPT_TABLES.contains(&table.tag)
            || (options.strip_hinting && HINTING_TABLES.contains(&table.tag))
        {
            continue;
        }
        let data = match table.tag {
            Tag::GLYF => std::mem::take(&mut new_glyf),
            Tag::LOCA => std::mem::take(&mut new_loca),
            Tag::HEAD => long_loca_head(table)?,
            _ => table.data.to_vec(),
        };
        builder.table(table.tag, data);
    }

    log::trace!("Subset keeps {} of {} glyph outlines", keep.len(), num_glyphs);
    Ok(builder.build())
}

fn glyph_bytes<'a>(glyf: &'a [u8], offsets: &[u32], gid: u16) -> Result<&'a [u8]> {
    let start = offsets[gid as usize] as usize;
    let end = offsets[gid as usize + 1] as usize;
    glyf.get(start..end)
        .ok_or_else(|| Error::truncated("glyf", start))
}

fn read_loca(table: &TTFTable, format: i16, num_glyphs: u16) -> Result<Vec<u32>> {
    let reader = table.reader();
    let count = num_glyphs as usize + 1;
    let offsets: Vec<u32> = if format == 0 {
        reader
            .u16_array(0, count)?
            .into_iter()
            .map(|o| o as u32 * 2)
            .collect()
    } else {
        (0..count)
            .map(|i| reader.u32(i * 4))
            .collect::<Result<_>>()?
    };
    if offsets.windows(2).any(|w| w[0] > w[1]) {
        return Err(Error::InvalidFormat("loca offsets are not ascending".to_string()));
    }
    Ok(offsets)
}

/// `head` with indexToLocFormat set to long.
fn long_loca_head(table: &TTFTable) -> Result<Vec<u8>> {
    let mut head = table.data.to_vec();
    if head.len() < 54 {
        return Err(Error::truncated("head", head.len()));
    }
    head[50..52].copy_from_slice(&1i16.to_be_bytes());
    Ok(head)
}

/// Glyph IDs referenced by a composite glyph (empty for simple glyphs).
fn composite_components(glyph: &[u8]) -> Result<Vec<u16>> {
    let reader = TableReader::new(Tag::GLYF, glyph);
    if reader.len() < 10 || reader.i16(0)? >= 0 {
        return Ok(Vec::new());
    }

    let mut components = Vec::new();
    let mut offset = 10;
    loop {
        let flags = reader.u16(offset)?;
        components.push(reader.u16(offset + 2)?);
        offset += 4;
        offset += if flags & ARG_1_AND_2_ARE_WORDS != 0 { 4 } else { 2 };
        offset += if flags & WE_HAVE_A_SCALE != 0 {
            2
        } else if flags & WE_HAVE_AN_X_AND_Y_SCALE != 0 {
            4
        } else if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
            8
        } else {
            0
        };
        if flags & MORE_COMPONENTS == 0 {
            break;
        }
    }
    Ok(components)
}
