//! ToUnicode CMap generation.
//!
//! Maps the 2-byte glyph IDs written by Identity-H content streams back to
//! Unicode so viewers can extract and search text.

use super::font_subsetter::BuiltSubset;
use std::collections::BTreeMap;

/// Maximum entries per `beginbfchar` section (PDF 32000-1:2008, 9.10.3).
const MAX_BFCHAR_ENTRIES: usize = 100;

const CMAP_HEADER: &str = "/CIDInit /ProcSet findresource begin\n\
12 dict begin\n\
begincmap\n\
/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n\
/CMapName /Adobe-Identity-UCS def\n\
/CMapType 2 def\n\
1 begincodespacerange\n\
<0000> <FFFF>\n\
endcodespacerange\n";

const CMAP_FOOTER: &str = "endcmap\n\
CMapName currentdict /CMap defineresource pop\n\
end\n\
end\n";

/// Generate the ToUnicode CMap for a built subset.
pub fn generate_tounicode_cmap(subset: &BuiltSubset<'_>) -> String {
    let font = subset.font();
    let pairs = subset
        .used_chars()
        .iter()
        .filter_map(|&ch| font.glyph_id(ch).map(|gid| (gid, ch)));
    tounicode_cmap(pairs)
}

/// Generate a ToUnicode CMap from `(glyph, char)` pairs.
///
/// Entries are sorted by glyph ID. When several characters share a glyph
/// the lowest one is kept.
pub fn tounicode_cmap(pairs: impl IntoIterator<Item = (u16, char)>) -> String {
    let mut by_glyph: BTreeMap<u16, char> = BTreeMap::new();
    for (gid, ch) in pairs {
        by_glyph
            .entry(gid)
            .and_modify(|existing| *existing = (*existing).min(ch))
            .or_insert(ch);
    }
    let mappings: Vec<(u16, char)> = by_glyph.into_iter().collect();

    let mut cmap = String::with_capacity(CMAP_HEADER.len() + CMAP_FOOTER.len() + mappings.len() * 16);
    cmap.push_str(CMAP_HEADER);

    for chunk in mappings.chunks(MAX_BFCHAR_ENTRIES) {
        cmap.push_str(&format!("{} beginbfchar\n", chunk.len()));
        for &(gid, ch) in chunk {
            cmap.push_str(&format!("<{:04X}> <", gid));
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                cmap.push_str(&format!("{:04X}", unit));
            }
            cmap.push_str(">\n");
        }
        cmap.push_str("endbfchar\n");
    }

    cmap.push_str(CMAP_FOOTER);
    cmap
}
