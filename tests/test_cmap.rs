//! Character map decoding tests.
//!
//! Builds raw `cmap` tables and checks:
//! - Format 4 direct segments (code + idDelta)
//! - Format 4 indirect segments through glyphIdArray
//! - Format 12 groups for supplementary planes
//! - Subtable preference when several are present

use bytes::Bytes;
use pdf_glyphs::fonts::{parse_cmap, TTFTable, Tag};
use pdf_glyphs::Error;

/// (start, end, idDelta, idRangeOffset) per segment; the 0xFFFF sentinel is appended.
fn format4(segments: &[(u16, u16, i16, u16)], glyph_ids: &[u16]) -> Vec<u8> {
    let mut segs = segments.to_vec();
    segs.push((0xFFFF, 0xFFFF, 1, 0));
    let seg_count = segs.len() as u16;

    let mut out = Vec::new();
    let length = 16 + segs.len() * 8 + glyph_ids.len() * 2;
    for v in [4, length as u16, 0, seg_count * 2, 0, 0, 0] {
        out.extend_from_slice(&v.to_be_bytes());
    }
    for s in &segs {
        out.extend_from_slice(&s.1.to_be_bytes());
    }
    out.extend_from_slice(&0u16.to_be_bytes());
    for s in &segs {
        out.extend_from_slice(&s.0.to_be_bytes());
    }
    for s in &segs {
        out.extend_from_slice(&s.2.to_be_bytes());
    }
    for s in &segs {
        out.extend_from_slice(&s.3.to_be_bytes());
    }
    for g in glyph_ids {
        out.extend_from_slice(&g.to_be_bytes());
    }
    out
}

fn format12(groups: &[(u32, u32, u32)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&12u16.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&(16 + groups.len() as u32 * 12).to_be_bytes());
    out.extend_from_slice(&0u32.to_be_bytes());
    out.extend_from_slice(&(groups.len() as u32).to_be_bytes());
    for (start, end, glyph) in groups {
        for v in [start, end, glyph] {
            out.extend_from_slice(&v.to_be_bytes());
        }
    }
    out
}

/// Wrap subtables, keyed by (platform, encoding), into a cmap table.
fn cmap_table(subtables: &[((u16, u16), Vec<u8>)]) -> TTFTable {
    let mut out = Vec::new();
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&(subtables.len() as u16).to_be_bytes());
    let mut offset = 4 + subtables.len() as u32 * 8;
    for ((platform, encoding), data) in subtables {
        out.extend_from_slice(&platform.to_be_bytes());
        out.extend_from_slice(&encoding.to_be_bytes());
        out.extend_from_slice(&offset.to_be_bytes());
        offset += data.len() as u32;
    }
    for (_, data) in subtables {
        out.extend_from_slice(data);
    }
    TTFTable {
        tag: Tag::CMAP,
        checksum: 0,
        offset: 0,
        length: out.len() as u32,
        data: Bytes::from(out),
    }
}

#[test]
fn test_format4_direct_segment() {
    let table = cmap_table(&[((3, 1), format4(&[(0x41, 0x5A, 0, 0)], &[]))]);
    let map = parse_cmap(&table, 100).unwrap();

    assert_eq!(map.len(), 26);
    for (i, ch) in ('A'..='Z').enumerate() {
        assert_eq!(map[&ch], 65 + i as u16);
    }
}

#[test]
fn test_format4_negative_delta_wraps() {
    // 'a'..'c' (0x61..0x63) with delta -0x60 -> glyphs 1..3
    let table = cmap_table(&[((3, 1), format4(&[(0x61, 0x63, -0x60, 0)], &[]))]);
    let map = parse_cmap(&table, 10).unwrap();

    assert_eq!(map[&'a'], 1);
    assert_eq!(map[&'c'], 3);
}

#[test]
fn test_format4_indirect_segment() {
    // Two segments: idRangeOffset 4 from segment 0 lands on glyphIdArray[0]
    let table = cmap_table(&[((3, 1), format4(&[(0x30, 0x32, 0, 4)], &[100, 101, 102]))]);
    let map = parse_cmap(&table, 200).unwrap();

    assert_eq!(map[&'0'], 100);
    assert_eq!(map[&'1'], 101);
    assert_eq!(map[&'2'], 102);
    assert_eq!(map.len(), 3);
}

#[test]
fn test_format4_indirect_applies_delta_and_skips_zero() {
    let table = cmap_table(&[((3, 1), format4(&[(0x30, 0x32, 5, 4)], &[100, 0, 102]))]);
    let map = parse_cmap(&table, 200).unwrap();

    assert_eq!(map[&'0'], 105);
    assert!(!map.contains_key(&'1'));
    assert_eq!(map[&'2'], 107);
}

#[test]
fn test_format12_reaches_supplementary_planes() {
    let table = cmap_table(&[((3, 10), format12(&[(0x1F600, 0x1F602, 7)]))]);
    let map = parse_cmap(&table, 20).unwrap();

    assert_eq!(map[&'\u{1F600}'], 7);
    assert_eq!(map[&'\u{1F602}'], 9);
}

#[test]
fn test_format12_stops_at_glyph_count() {
    let table = cmap_table(&[((3, 10), format12(&[(0x41, 0x5A, 1)]))]);
    let map = parse_cmap(&table, 4).unwrap();

    assert_eq!(map.len(), 3);
    assert_eq!(map[&'C'], 3);
    assert!(!map.contains_key(&'D'));
}

#[test]
fn test_format12_full_range_groups_stay_bounded() {
    // Every group spans all of Unicode; only the first 9 codes have glyphs
    let groups: Vec<(u32, u32, u32)> = (0..64).map(|i| (0, 0x10FFFF, 1 + i * 1000)).collect();
    let table = cmap_table(&[((3, 10), format12(&groups))]);

    let started = std::time::Instant::now();
    let map = parse_cmap(&table, 10).unwrap();
    assert!(started.elapsed() < std::time::Duration::from_secs(1));

    assert_eq!(map.len(), 9);
    assert_eq!(map[&'\u{8}'], 9);
    assert!(map.values().all(|&gid| gid < 10));
}

#[test]
fn test_format12_overlapping_groups_are_invalid() {
    let groups = vec![(0x20, 0x10FFFF, 1); 40];
    let table = cmap_table(&[((3, 10), format12(&groups))]);
    assert!(matches!(parse_cmap(&table, u16::MAX), Err(Error::InvalidFormat(_))));
}

#[test]
fn test_full_repertoire_subtable_preferred() {
    let table = cmap_table(&[
        ((3, 1), format4(&[(0x41, 0x41, 0, 0)], &[])),
        ((3, 10), format12(&[(0x41, 0x41, 9)])),
    ]);
    let map = parse_cmap(&table, 100).unwrap();
    assert_eq!(map[&'A'], 9);
}

#[test]
fn test_symbol_subtable_used_as_last_resort() {
    let table = cmap_table(&[
        ((1, 0), format4(&[(0x41, 0x41, 1, 0)], &[])),
        ((3, 0), format4(&[(0xF041, 0xF041, 0x100F, 0)], &[])),
    ]);
    let map = parse_cmap(&table, 0x2000).unwrap();
    assert_eq!(map[&'\u{F041}'], 0x0050);
}

#[test]
fn test_no_unicode_subtable() {
    let table = cmap_table(&[((1, 0), format4(&[(0x41, 0x41, 0, 0)], &[]))]);
    assert!(matches!(parse_cmap(&table, 100), Err(Error::UnsupportedFormat(_))));
}
