//! Drawing and text instructions consumed by the page renderer.
//!
//! A layout layer produces an ordered list of [`GraphicsOp`]s and
//! [`TextOp`]s per page; the renderer turns them into content-stream
//! operators. All types are serde-serializable so the list can be handed
//! over as JSON.
//!
//! ## Example
//!
//! ```
//! use pdf_glyphs::elements::{Color, FontRef, GraphicsOp, ShapeStyle, TextOp};
//! use pdf_glyphs::geometry::{Point, Rect};
//!
//! let graphics = vec![GraphicsOp::rect(
//!     Rect::new(72.0, 700.0, 200.0, 40.0),
//!     ShapeStyle::filled(Color::new(0.9, 0.9, 0.9)),
//! )];
//! let text = vec![TextOp::new(
//!     "Hello",
//!     Point::new(80.0, 715.0),
//!     FontRef::standard("Helvetica"),
//!     12.0,
//! )];
//! assert_eq!(graphics.len() + text.len(), 2);
//! ```

mod color;
mod graphics;
mod text;

pub use color::{resolve_color, CmykColor, Color, Gradient, GradientStop, PaintColor};
pub use graphics::{
    BezierSegment, DashPattern, GraphicsOp, LineCap, LineJoin, ShapeStyle,
};
pub use text::{FontRef, TextOp, TextRenderMode};
