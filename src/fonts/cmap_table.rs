//! `cmap` table decoding: Unicode scalar to glyph ID.
//!
//! Format 4 (BMP segments) is the workhorse; format 12 is read when the
//! font offers it so supplementary-plane characters resolve too.

use super::sfnt::{TTFTable, TableReader};
use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Highest Unicode scalar value.
const MAX_SCALAR: u32 = 0x10FFFF;

/// Decoded segment arrays of a format 4 subtable.
///
/// The final segment is the `0xFFFF` sentinel and maps nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Format4 {
    /// Segment end codes (inclusive)
    pub end_codes: Vec<u16>,
    /// Segment start codes
    pub start_codes: Vec<u16>,
    /// Per-segment deltas
    pub id_deltas: Vec<i16>,
    /// Per-segment offsets into `glyph_ids`, in bytes from the offset word itself
    pub id_range_offsets: Vec<u16>,
    /// The glyphIdArray
    pub glyph_ids: Vec<u16>,
}

impl Format4 {
    /// Parse a format 4 subtable starting at the format field.
    pub fn parse(reader: TableReader<'_>) -> Result<Self> {
        let format = reader.u16(0)?;
        if format != 4 {
            return Err(Error::InvalidFormat(format!(
                "expected cmap format 4, found {}",
                format
            )));
        }
        let length = reader.u16(2)? as usize;
        let seg_count = (reader.u16(6)? / 2) as usize;

        let end_offset = 14;
        let start_offset = end_offset + seg_count * 2 + 2;
        let delta_offset = start_offset + seg_count * 2;
        let range_offset = delta_offset + seg_count * 2;
        let glyphs_offset = range_offset + seg_count * 2;

        let end_codes = reader.u16_array(end_offset, seg_count)?;
        let start_codes = reader.u16_array(start_offset, seg_count)?;
        let id_deltas = reader.i16_array(delta_offset, seg_count)?;
        let id_range_offsets = reader.u16_array(range_offset, seg_count)?;

        // Some fonts misstate `length`; fall back to the end of the table.
        let end = if (glyphs_offset..=reader.len()).contains(&length) {
            length
        } else {
            reader.len()
        };
        let glyph_count = end.saturating_sub(glyphs_offset) / 2;
        let glyph_ids = reader.u16_array(glyphs_offset, glyph_count)?;

        Ok(Self {
            end_codes,
            start_codes,
            id_deltas,
            id_range_offsets,
            glyph_ids,
        })
    }

    /// Number of segments, sentinel included.
    pub fn seg_count(&self) -> usize {
        self.end_codes.len()
    }

    /// Glyph for code `code` in segment `i`, 0 when unmapped.
    fn glyph_in_segment(&self, i: usize, code: u16) -> u16 {
        let delta = self.id_deltas[i];
        let range_offset = self.id_range_offsets[i];

        if range_offset == 0 {
            return code.wrapping_add(delta as u16);
        }

        let index = (range_offset / 2) as i64 + (code - self.start_codes[i]) as i64
            - (self.seg_count() - i) as i64;
        let glyph = match usize::try_from(index).ok().and_then(|i| self.glyph_ids.get(i)) {
            Some(&glyph) => glyph,
            None => return 0,
        };
        if glyph == 0 {
            0
        } else {
            glyph.wrapping_add(delta as u16)
        }
    }

    /// Glyph for a single code, 0 when unmapped.
    pub fn glyph_id(&self, code: u16) -> u16 {
        for i in 0..self.seg_count() {
            if self.end_codes[i] >= code {
                if self.start_codes[i] <= code && !self.is_sentinel(i) {
                    return self.glyph_in_segment(i, code);
                }
                return 0;
            }
        }
        0
    }

    fn is_sentinel(&self, i: usize) -> bool {
        self.start_codes[i] == 0xFFFF && self.end_codes[i] == 0xFFFF
    }

    /// Every mapped scalar. Glyph 0 and surrogate code points are skipped.
    ///
    /// Segments of a well-formed subtable are disjoint, so together they
    /// cover at most the 65536 BMP codes; more than that is rejected before
    /// anything is expanded.
    pub fn mappings(&self) -> Result<BTreeMap<char, u16>> {
        let live: Vec<usize> = (0..self.seg_count())
            .filter(|&i| self.start_codes[i] <= self.end_codes[i] && !self.is_sentinel(i))
            .collect();
        let covered: u32 = live
            .iter()
            .map(|&i| u32::from(self.end_codes[i] - self.start_codes[i]) + 1)
            .sum();
        if covered > 0x10000 {
            return Err(Error::InvalidFormat(format!(
                "cmap format 4 segments cover {} codes, overlapping",
                covered
            )));
        }

        let mut map = BTreeMap::new();
        for i in live {
            for code in self.start_codes[i]..=self.end_codes[i] {
                let Some(ch) = char::from_u32(code as u32) else {
                    continue;
                };
                let glyph = self.glyph_in_segment(i, code);
                if glyph != 0 {
                    map.entry(ch).or_insert(glyph);
                }
            }
        }
        Ok(map)
    }
}

/// Sequential map groups of a format 12 subtable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Format12 {
    /// `(start_char, end_char, start_glyph)` triples
    pub groups: Vec<(u32, u32, u32)>,
}

impl Format12 {
    /// Parse a format 12 subtable starting at the format field.
    pub fn parse(reader: TableReader<'_>) -> Result<Self> {
        let num_groups = reader.u32(12)? as usize;
        // Each group is 12 bytes; refuse counts the table cannot hold.
        if num_groups > reader.len().saturating_sub(16) / 12 {
            return Err(Error::truncated("cmap", 16 + num_groups.saturating_mul(12)));
        }
        let mut groups = Vec::with_capacity(num_groups);
        for g in 0..num_groups {
            let base = 16 + g * 12;
            groups.push((reader.u32(base)?, reader.u32(base + 4)?, reader.u32(base + 8)?));
        }
        Ok(Self { groups })
    }

    /// Every mapped scalar below `num_glyphs`.
    ///
    /// Each group is first clamped to the codes whose glyph exists, so its
    /// cost is bounded by the glyph count. Clamped groups covering more than
    /// the Unicode scalar range can only overlap and are rejected.
    pub fn mappings(&self, num_glyphs: u16) -> Result<BTreeMap<char, u16>> {
        let spans: Vec<(u32, u32, u32)> = self
            .groups
            .iter()
            .filter_map(|&(start, end, start_glyph)| {
                let end = end.min(MAX_SCALAR);
                let available = u32::from(num_glyphs).checked_sub(start_glyph)?;
                if start > end || available == 0 {
                    return None;
                }
                Some((start, (end - start + 1).min(available), start_glyph))
            })
            .collect();
        let covered: u64 = spans.iter().map(|&(_, len, _)| u64::from(len)).sum();
        if covered > u64::from(MAX_SCALAR) + 1 {
            return Err(Error::InvalidFormat(format!(
                "cmap format 12 groups cover {} codes, overlapping",
                covered
            )));
        }

        let mut map = BTreeMap::new();
        for (start, len, start_glyph) in spans {
            for offset in 0..len {
                // Clamped above: start_glyph + offset < num_glyphs
                let glyph = (start_glyph + offset) as u16;
                if let Some(ch) = char::from_u32(start + offset) {
                    if glyph != 0 {
                        map.entry(ch).or_insert(glyph);
                    }
                }
            }
        }
        Ok(map)
    }
}

/// An encoding record of the cmap header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct EncodingRecord {
    platform_id: u16,
    encoding_id: u16,
    offset: u32,
    format: u16,
}

impl EncodingRecord {
    /// Lower is better; `None` for subtables that are not Unicode.
    fn rank(&self) -> Option<u8> {
        match (self.platform_id, self.encoding_id, self.format) {
            (3, 10, 12) => Some(0),
            (0, 4, 12) | (0, 6, 12) => Some(1),
            (3, 1, 4) => Some(2),
            (0, _, 4) => Some(3),
            (3, 0, 4) => Some(4),
            _ => None,
        }
    }
}

/// Decode the best Unicode subtable of a `cmap` table.
pub fn parse_cmap(table: &TTFTable, num_glyphs: u16) -> Result<BTreeMap<char, u16>> {
    let reader = table.reader();
    let num_tables = reader.u16(2)? as usize;

    let mut records = Vec::with_capacity(num_tables);
    for i in 0..num_tables {
        let base = 4 + i * 8;
        let offset = reader.u32(base + 4)?;
        if offset as usize >= reader.len() {
            return Err(Error::TableOutOfBounds {
                tag: "cmap".to_string(),
                offset,
                length: 0,
                file_len: reader.len(),
            });
        }
        records.push(EncodingRecord {
            platform_id: reader.u16(base)?,
            encoding_id: reader.u16(base + 2)?,
            offset,
            format: reader.u16(offset as usize)?,
        });
    }

    let best = records
        .iter()
        .filter_map(|r| r.rank().map(|rank| (rank, r)))
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, r)| *r)
        .ok_or_else(|| Error::UnsupportedFormat("no Unicode cmap subtable".to_string()))?;

    log::debug!(
        "Using cmap subtable platform {} encoding {} format {}",
        best.platform_id,
        best.encoding_id,
        best.format
    );

    let sub = reader.sub(best.offset as usize)?;
    match best.format {
        4 => Format4::parse(sub)?.mappings(),
        _ => Format12::parse(sub)?.mappings(num_glyphs),
    }
}
