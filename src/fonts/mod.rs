//! TrueType fonts for PDF embedding.
//!
//! Loading ([`TrueTypeFont`]), usage tracking and subsetting
//! ([`FontSubset`]), and the derived PDF structures: the
//! [`FontDescriptor`] and the ToUnicode CMap.

pub mod cmap_table;
pub mod encoding;
pub mod font_descriptor;
pub mod font_subsetter;
pub mod sfnt;
pub mod to_unicode;
pub mod truetype_parser;

#[doc(hidden)]
pub mod test_fonts;

pub use cmap_table::parse_cmap;
pub use encoding::unicode_to_winansi;
pub use font_descriptor::{FontDescriptor, FontFlags};
pub use font_subsetter::{subset_font, BuiltSubset, FontSubset, SubsetOptions, SubsetState, SubsetStats};
pub use sfnt::{SfntBuilder, TTFTable, TableDirectory, TableReader, Tag};
pub use to_unicode::{generate_tounicode_cmap, tounicode_cmap};
pub use truetype_parser::{FontMetrics, TrueTypeFont};
