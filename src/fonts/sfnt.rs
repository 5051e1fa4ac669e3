//! sfnt container: table directory loading and font file assembly.
//!
//! Only TrueType-outline fonts (sfnt version 0x00010000) are accepted.
//! Every table byte range is checked against the file length before any
//! table data is touched.

use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder};
use bytes::Bytes;
use indexmap::IndexMap;
use std::fmt;

/// sfnt version for TrueType outlines.
pub const TRUETYPE_VERSION: u32 = 0x0001_0000;
/// 'OTTO', OpenType with CFF outlines.
const CFF_VERSION: u32 = 0x4F54_544F;
/// 'ttcf', TrueType collection.
const COLLECTION_TAG: u32 = 0x7474_6366;
/// Magic used for `head.checkSumAdjustment`.
const CHECKSUM_MAGIC: u32 = 0xB1B0_AFBA;

const HEADER_LEN: usize = 12;
const RECORD_LEN: usize = 16;

/// Four-byte table tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    /// Font header
    pub const HEAD: Tag = Tag(*b"head");
    /// Horizontal header
    pub const HHEA: Tag = Tag(*b"hhea");
    /// Horizontal metrics
    pub const HMTX: Tag = Tag(*b"hmtx");
    /// Maximum profile
    pub const MAXP: Tag = Tag(*b"maxp");
    /// Character to glyph mapping
    pub const CMAP: Tag = Tag(*b"cmap");
    /// Naming table
    pub const NAME: Tag = Tag(*b"name");
    /// OS/2 and Windows metrics
    pub const OS2: Tag = Tag(*b"OS/2");
    /// PostScript information
    pub const POST: Tag = Tag(*b"post");
    /// Glyph data
    pub const GLYF: Tag = Tag(*b"glyf");
    /// Glyph locations
    pub const LOCA: Tag = Tag(*b"loca");
    /// Control values
    pub const CVT: Tag = Tag(*b"cvt ");
    /// Font program
    pub const FPGM: Tag = Tag(*b"fpgm");
    /// Control value program
    pub const PREP: Tag = Tag(*b"prep");

    /// Tag from its string form (must be 4 bytes).
    pub fn from_name(tag: &str) -> Option<Tag> {
        <[u8; 4]>::try_from(tag.as_bytes()).ok().map(Tag)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// One table of an sfnt file.
#[derive(Debug, Clone)]
pub struct TTFTable {
    /// Table tag
    pub tag: Tag,
    /// Checksum from the directory
    pub checksum: u32,
    /// Offset of the table in the file
    pub offset: u32,
    /// Length of the table in bytes
    pub length: u32,
    /// Table bytes (shares the font buffer)
    pub data: Bytes,
}

impl TTFTable {
    /// Bounds-checked reader over the table bytes.
    pub fn reader(&self) -> TableReader<'_> {
        TableReader::new(self.tag, &self.data)
    }

    /// Whether the stored checksum matches the table bytes.
    ///
    /// For `head` the checkSumAdjustment field is treated as zero.
    pub fn verify_checksum(&self) -> bool {
        let actual = if self.tag == Tag::HEAD && self.data.len() >= 12 {
            let mut copy = self.data.to_vec();
            copy[8..12].fill(0);
            table_checksum(&copy)
        } else {
            table_checksum(&self.data)
        };
        actual == self.checksum
    }
}

/// Parsed table directory, in file order.
#[derive(Debug, Clone)]
pub struct TableDirectory {
    /// sfnt version
    pub version: u32,
    tables: IndexMap<Tag, TTFTable>,
}

impl TableDirectory {
    /// Parse the table directory of `data`.
    ///
    /// Fails on any sfnt version other than TrueType and on any table whose
    /// byte range does not lie within `data`.
    pub fn parse(data: &Bytes) -> Result<Self> {
        if data.len() < HEADER_LEN {
            return Err(Error::InvalidFormat(format!(
                "file too short for sfnt header ({} bytes)",
                data.len()
            )));
        }

        let version = BigEndian::read_u32(&data[0..4]);
        match version {
            TRUETYPE_VERSION => {},
            CFF_VERSION => {
                return Err(Error::UnsupportedFormat(
                    "OpenType fonts with CFF outlines".to_string(),
                ))
            },
            COLLECTION_TAG => {
                return Err(Error::UnsupportedFormat("TrueType collections".to_string()))
            },
            other => {
                return Err(Error::InvalidFormat(format!("sfnt version 0x{:08X}", other)));
            },
        }

        let num_tables = BigEndian::read_u16(&data[4..6]) as usize;
        let directory_end = HEADER_LEN + num_tables * RECORD_LEN;
        if data.len() < directory_end {
            return Err(Error::InvalidFormat(format!(
                "table directory of {} entries exceeds file size {}",
                num_tables,
                data.len()
            )));
        }

        let mut tables = IndexMap::with_capacity(num_tables);
        for i in 0..num_tables {
            let record = &data[HEADER_LEN + i * RECORD_LEN..HEADER_LEN + (i + 1) * RECORD_LEN];
            let tag = Tag([record[0], record[1], record[2], record[3]]);
            let checksum = BigEndian::read_u32(&record[4..8]);
            let offset = BigEndian::read_u32(&record[8..12]);
            let length = BigEndian::read_u32(&record[12..16]);

            let end = offset as u64 + length as u64;
            if end > data.len() as u64 {
                return Err(Error::TableOutOfBounds {
                    tag: tag.to_string(),
                    offset,
                    length,
                    file_len: data.len(),
                });
            }

            if tables.contains_key(&tag) {
                log::warn!("Duplicate '{}' table in font directory, keeping the first", tag);
                continue;
            }

            let table = TTFTable {
                tag,
                checksum,
                offset,
                length,
                data: data.slice(offset as usize..end as usize),
            };
            if !table.verify_checksum() {
                log::debug!("Checksum mismatch for '{}' table", tag);
            }
            log::trace!("Table '{}' at {} ({} bytes)", tag, offset, length);
            tables.insert(tag, table);
        }

        Ok(Self { version, tables })
    }

    /// Look up a table.
    pub fn get(&self, tag: Tag) -> Option<&TTFTable> {
        self.tables.get(&tag)
    }

    /// Look up a table that must be present.
    pub fn require(&self, tag: Tag) -> Result<&TTFTable> {
        self.get(tag).ok_or_else(|| Error::MissingTable(tag.to_string()))
    }

    /// Whether a table is present.
    pub fn contains(&self, tag: Tag) -> bool {
        self.tables.contains_key(&tag)
    }

    /// Tables in directory order.
    pub fn iter(&self) -> impl Iterator<Item = &TTFTable> {
        self.tables.values()
    }

    /// Number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the directory is empty.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Big-endian reads that fail with [`Error::Truncated`] instead of panicking.
#[derive(Debug, Clone, Copy)]
pub struct TableReader<'a> {
    tag: Tag,
    data: &'a [u8],
}

impl<'a> TableReader<'a> {
    /// Reader over `data`, reporting errors against `tag`.
    pub fn new(tag: Tag, data: &'a [u8]) -> Self {
        Self { tag, data }
    }

    /// Underlying bytes.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Length of the underlying bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether there are no bytes.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `len` bytes at `offset`.
    pub fn bytes(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| Error::truncated(&self.tag.to_string(), offset))
    }

    /// Sub-reader starting at `offset`, to the end of the data.
    pub fn sub(&self, offset: usize) -> Result<TableReader<'a>> {
        let data = self
            .data
            .get(offset..)
            .ok_or_else(|| Error::truncated(&self.tag.to_string(), offset))?;
        Ok(TableReader::new(self.tag, data))
    }

    /// Read a u8.
    pub fn u8(&self, offset: usize) -> Result<u8> {
        Ok(self.bytes(offset, 1)?[0])
    }

    /// Read a big-endian u16.
    pub fn u16(&self, offset: usize) -> Result<u16> {
        Ok(BigEndian::read_u16(self.bytes(offset, 2)?))
    }

    /// Read a big-endian i16.
    pub fn i16(&self, offset: usize) -> Result<i16> {
        Ok(BigEndian::read_i16(self.bytes(offset, 2)?))
    }

    /// Read a big-endian u32.
    pub fn u32(&self, offset: usize) -> Result<u32> {
        Ok(BigEndian::read_u32(self.bytes(offset, 4)?))
    }

    /// Read a big-endian i32.
    pub fn i32(&self, offset: usize) -> Result<i32> {
        Ok(BigEndian::read_i32(self.bytes(offset, 4)?))
    }

    /// Read `count` consecutive u16 values.
    pub fn u16_array(&self, offset: usize, count: usize) -> Result<Vec<u16>> {
        let raw = self.bytes(offset, count * 2)?;
        Ok(raw.chunks_exact(2).map(BigEndian::read_u16).collect())
    }

    /// Read `count` consecutive i16 values.
    pub fn i16_array(&self, offset: usize, count: usize) -> Result<Vec<i16>> {
        let raw = self.bytes(offset, count * 2)?;
        Ok(raw.chunks_exact(2).map(BigEndian::read_i16).collect())
    }
}

/// Sum of big-endian u32 words, zero-padding the final word.
pub fn table_checksum(data: &[u8]) -> u32 {
    let mut sum = 0u32;
    let mut chunks = data.chunks_exact(4);
    for word in &mut chunks {
        sum = sum.wrapping_add(BigEndian::read_u32(word));
    }
    let rest = chunks.remainder();
    if !rest.is_empty() {
        let mut last = [0u8; 4];
        last[..rest.len()].copy_from_slice(rest);
        sum = sum.wrapping_add(BigEndian::read_u32(&last));
    }
    sum
}

/// Assembles an sfnt file from tables.
///
/// Tables are written in tag order, each padded to a 4-byte boundary, with
/// checksums and the `head` checkSumAdjustment recomputed.
#[derive(Debug, Default)]
pub struct SfntBuilder {
    tables: Vec<(Tag, Vec<u8>)>,
}

impl SfntBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a table.
    pub fn table(&mut self, tag: Tag, data: Vec<u8>) -> &mut Self {
        self.tables.retain(|(t, _)| *t != tag);
        self.tables.push((tag, data));
        self
    }

    /// Write the font file.
    pub fn build(&self) -> Vec<u8> {
        let mut tables: Vec<&(Tag, Vec<u8>)> = self.tables.iter().collect();
        tables.sort_by_key(|(tag, _)| *tag);

        let num_tables = tables.len() as u16;
        let entry_selector = if num_tables == 0 {
            0
        } else {
            15 - num_tables.leading_zeros() as u16
        };
        let search_range = (1u16 << entry_selector) * 16;
        let range_shift = (num_tables * 16).saturating_sub(search_range);

        let mut out = Vec::new();
        push_u32(&mut out, TRUETYPE_VERSION);
        push_u16(&mut out, num_tables);
        push_u16(&mut out, search_range);
        push_u16(&mut out, entry_selector);
        push_u16(&mut out, range_shift);

        let mut offset = HEADER_LEN + tables.len() * RECORD_LEN;
        let mut head_offset = None;
        for (tag, data) in &tables {
            let mut padded = data.clone();
            if *tag == Tag::HEAD && padded.len() >= 12 {
                padded[8..12].fill(0);
                head_offset = Some(offset);
            }
            out.extend_from_slice(&tag.0);
            push_u32(&mut out, table_checksum(&padded));
            push_u32(&mut out, offset as u32);
            push_u32(&mut out, data.len() as u32);
            offset += align4(data.len());
        }

        for (tag, data) in &tables {
            let start = out.len();
            out.extend_from_slice(data);
            if *tag == Tag::HEAD && data.len() >= 12 {
                out[start + 8..start + 12].fill(0);
            }
            out.resize(start + align4(data.len()), 0);
        }

        if let Some(head) = head_offset {
            let adjustment = CHECKSUM_MAGIC.wrapping_sub(table_checksum(&out));
            BigEndian::write_u32(&mut out[head + 8..head + 12], adjustment);
        }

        out
    }
}

fn align4(len: usize) -> usize {
    (len + 3) & !3
}

pub(crate) fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

pub(crate) fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}
