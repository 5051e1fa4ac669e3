//! Text drawing operations.

use super::color::{resolve_color, CmykColor, Color, PaintColor};
use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// The font a text run is set in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontRef {
    /// One of the 14 standard Type 1 fonts, by PostScript name
    Standard(String),
    /// An embedded TrueType font, by the id it was registered under
    Custom(String),
}

impl FontRef {
    /// Standard font reference.
    pub fn standard(name: impl Into<String>) -> Self {
        FontRef::Standard(name.into())
    }

    /// Embedded font reference.
    pub fn custom(id: impl Into<String>) -> Self {
        FontRef::Custom(id.into())
    }

    /// Logical key used to register the font in page resources.
    ///
    /// ```
    /// use pdf_glyphs::elements::FontRef;
    ///
    /// assert_eq!(FontRef::standard("Helvetica").key(), "std:Helvetica");
    /// assert_eq!(FontRef::custom("body").key(), "custom:body");
    /// ```
    pub fn key(&self) -> String {
        match self {
            FontRef::Standard(name) => format!("std:{}", name),
            FontRef::Custom(id) => format!("custom:{}", id),
        }
    }
}

impl Default for FontRef {
    fn default() -> Self {
        FontRef::Standard("Helvetica".to_string())
    }
}

/// Text rendering mode (`Tr`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextRenderMode {
    /// Fill glyphs (default)
    #[default]
    Fill = 0,
    /// Stroke glyph outlines
    Stroke = 1,
    /// Fill then stroke
    FillStroke = 2,
    /// Paint nothing
    Invisible = 3,
}

/// A run of text placed at a fixed position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOp {
    /// Text content; `\n` starts a new line
    pub text: String,
    /// Baseline origin of the first line
    pub position: Point,
    /// Font
    pub font: FontRef,
    /// Font size in points
    pub size: f32,
    /// RGB fill color
    pub color: Option<Color>,
    /// CMYK fill color
    pub cmyk: Option<CmykColor>,
    /// Character spacing (`Tc`)
    pub char_spacing: Option<f32>,
    /// Word spacing (`Tw`)
    pub word_spacing: Option<f32>,
    /// Horizontal scaling in percent (`Tz`)
    pub horizontal_scaling: Option<f32>,
    /// Rendering mode (`Tr`)
    pub render_mode: Option<TextRenderMode>,
    /// Distance between baselines for multi-line text
    pub line_height: Option<f32>,
}

impl TextOp {
    /// Create a text run in black.
    pub fn new(text: impl Into<String>, position: Point, font: FontRef, size: f32) -> Self {
        Self {
            text: text.into(),
            position,
            font,
            size,
            color: None,
            cmyk: None,
            char_spacing: None,
            word_spacing: None,
            horizontal_scaling: None,
            render_mode: None,
            line_height: None,
        }
    }

    /// Set RGB color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Set CMYK color.
    pub fn with_cmyk(mut self, color: CmykColor) -> Self {
        self.cmyk = Some(color);
        self
    }

    /// Set character spacing.
    pub fn with_char_spacing(mut self, spacing: f32) -> Self {
        self.char_spacing = Some(spacing);
        self
    }

    /// Set word spacing.
    pub fn with_word_spacing(mut self, spacing: f32) -> Self {
        self.word_spacing = Some(spacing);
        self
    }

    /// Set horizontal scaling.
    pub fn with_horizontal_scaling(mut self, percent: f32) -> Self {
        self.horizontal_scaling = Some(percent);
        self
    }

    /// Set rendering mode.
    pub fn with_render_mode(mut self, mode: TextRenderMode) -> Self {
        self.render_mode = Some(mode);
        self
    }

    /// Set line height for multi-line text.
    pub fn with_line_height(mut self, height: f32) -> Self {
        self.line_height = Some(height);
        self
    }

    /// Resolved fill color.
    pub fn fill_color(&self) -> Option<PaintColor> {
        resolve_color(self.color, self.cmyk, None)
    }

    /// Lines of the run.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }
}
