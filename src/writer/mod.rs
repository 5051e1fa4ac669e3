//! PDF writing: embedded fonts and page content.
//!
//! ## Architecture
//!
//! ```text
//! GraphicsOp[] + TextOp[]
//!     ↓
//! [FontCollection::scan] (records used characters per font)
//!     ↓
//! [FontCollection::build_all] (builds subsets → BoundFonts)
//!     ↓
//! [render_page] (content stream bytes + ResourceDictionary)
//!     ↓
//! [BoundFonts::write_fonts] (Type0/CIDFontType2 objects, patches resources)
//!     ↓
//! [ObjectSerializer] (serializes PDF objects)
//!     ↓
//! IndirectObject[] for the document's xref writer
//! ```
//!
//! ## Example
//!
//! ```
//! use pdf_glyphs::config::{EmbedConfig, RenderConfig};
//! use pdf_glyphs::elements::{FontRef, TextOp};
//! use pdf_glyphs::geometry::Point;
//! use pdf_glyphs::writer::{render_page, FlateCompressor, FontCollection, SequentialIds};
//!
//! # fn main() -> pdf_glyphs::Result<()> {
//! let text = vec![TextOp::new("Hello", Point::new(72.0, 720.0), FontRef::standard("Helvetica"), 12.0)];
//!
//! let mut fonts = FontCollection::new();
//! fonts.scan(&[], &text)?;
//! let bound = fonts.build_all()?;
//!
//! let mut page = render_page(&[], &text, &bound, &RenderConfig::default())?;
//! let mut ids = SequentialIds::new(10);
//! let objects = bound.write_fonts(&mut page.resources, &mut ids, &FlateCompressor, &EmbedConfig::default())?;
//!
//! assert_eq!(objects.len(), 1);
//! assert_eq!(page.resources.serialize()?, "<< /Font << /F1 10 0 R >> >>");
//! # Ok(())
//! # }
//! ```

mod compression;
mod content_stream;
mod font_embedder;
mod font_manager;
mod object_ids;
mod object_serializer;
mod page_renderer;
mod resources;

pub use compression::{FlateCompressor, StreamCompressor};
pub use content_stream::{format_number, ContentStreamBuilder, ContentStreamOp, KAPPA};
pub use font_embedder::{widths_array, write_font, write_standard_font, EmbeddedFontRefs};
pub use font_manager::{BoundFont, BoundFonts, FontCollection, StandardFont};
pub use object_ids::{ObjectIdAllocator, SequentialIds};
pub use object_serializer::ObjectSerializer;
pub use page_renderer::{render_page, PageContent};
pub use resources::ResourceDictionary;
