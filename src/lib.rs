//! # pdf_glyphs
//!
//! TrueType font embedding and content-stream rendering for PDF writers.
//!
//! ## Core Features
//!
//! - **Font Loading**: sfnt table directory, metrics, advance widths and the
//!   Unicode cmap (formats 4 and 12)
//! - **Subsetting**: per-font usage tracking, glyph-ID-stable subset programs
//!   with `TAG+Name` subset names (ISO 32000-1 §9.6.4)
//! - **Composite Fonts**: Type0 / CIDFontType2 / FontDescriptor / ToUnicode /
//!   FontFile2 objects with Identity-H encoding and compact `/W` arrays
//! - **Page Rendering**: shapes, clipping and text turned into balanced
//!   content-stream operators with a page resource dictionary
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use pdf_glyphs::config::{EmbedConfig, RenderConfig};
//! use pdf_glyphs::elements::{Color, FontRef, GraphicsOp, ShapeStyle, TextOp};
//! use pdf_glyphs::fonts::TrueTypeFont;
//! use pdf_glyphs::geometry::{Point, Rect};
//! use pdf_glyphs::writer::{render_page, FlateCompressor, FontCollection, SequentialIds};
//!
//! # fn main() -> pdf_glyphs::Result<()> {
//! let font = Arc::new(TrueTypeFont::from_file("DejaVuSans.ttf")?);
//!
//! let graphics = vec![GraphicsOp::rect(
//!     Rect::new(72.0, 700.0, 200.0, 40.0),
//!     ShapeStyle::filled(Color::new(0.9, 0.9, 0.9)),
//! )];
//! let text = vec![TextOp::new("Grüße", Point::new(80.0, 715.0), FontRef::custom("body"), 12.0)];
//!
//! let mut fonts = FontCollection::new();
//! fonts.add_font("body", font);
//! fonts.scan(&graphics, &text)?;
//! let bound = fonts.build_all()?;
//!
//! let mut page = render_page(&graphics, &text, &bound, &RenderConfig::default())?;
//! let mut ids = SequentialIds::new(4);
//! let font_objects =
//!     bound.write_fonts(&mut page.resources, &mut ids, &FlateCompressor, &EmbedConfig::default())?;
//!
//! println!("{} font objects, resources {}", font_objects.len(), page.resources.serialize()?);
//! # Ok(())
//! # }
//! ```
//!
//! ## License
//!
//! Licensed under either of:
//!
//! * Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Write-side object model
pub mod object;

// Geometry primitives
pub mod geometry;

// Drawing and text instructions
pub mod elements;

// TrueType loading, subsetting and derived PDF structures
pub mod fonts;

// Font embedding and page rendering
pub mod writer;

pub use error::{Error, Result};
