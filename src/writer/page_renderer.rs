//! Page content rendering.
//!
//! Turns a page's ordered [`GraphicsOp`]s and [`TextOp`]s into a content
//! stream plus the font resources it names. Graphics are painted first and
//! text on top. Every shape is wrapped in its own `q ... Q`, so graphics
//! state never leaks from one operation to the next.

use super::compression::StreamCompressor;
use super::content_stream::{ContentStreamBuilder, ContentStreamOp};
use super::font_manager::{BoundFont, BoundFonts};
use super::object_serializer::ObjectSerializer;
use super::resources::ResourceDictionary;
use crate::config::RenderConfig;
use crate::elements::{BezierSegment, Color, GraphicsOp, PaintColor, ShapeStyle, TextOp};
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::object::Object;
use std::collections::HashSet;

/// Leading used for multi-line text without an explicit line height.
const DEFAULT_LINE_HEIGHT: f32 = 1.2;

/// Compression level for page content streams.
const CONTENT_COMPRESSION_LEVEL: u32 = 6;

/// Rendered page: content stream bytes and the fonts they reference.
#[derive(Debug, Clone, PartialEq)]
pub struct PageContent {
    /// Content stream, uncompressed
    pub content: Vec<u8>,
    /// Font resources named by the content stream
    pub resources: ResourceDictionary,
}

impl PageContent {
    /// Content stream object, compressed when `config.compress_content` is set.
    pub fn stream_object(
        &self,
        compressor: &dyn StreamCompressor,
        config: &RenderConfig,
    ) -> Result<Object> {
        if config.compress_content {
            let data = compressor.compress(&self.content, CONTENT_COMPRESSION_LEVEL)?;
            Ok(ObjectSerializer::stream(
                vec![("Filter", ObjectSerializer::name(compressor.filter_name()))],
                data,
            ))
        } else {
            Ok(ObjectSerializer::stream(vec![], self.content.clone()))
        }
    }
}

/// Render one page.
///
/// Fonts must come from [`FontCollection::build_all`], so every embedded
/// font is built before its glyph IDs are written.
///
/// [`FontCollection::build_all`]: super::FontCollection::build_all
pub fn render_page(
    graphics: &[GraphicsOp],
    text: &[TextOp],
    fonts: &BoundFonts<'_>,
    config: &RenderConfig,
) -> Result<PageContent> {
    let mut renderer = PageRenderer::new(fonts, config);
    for op in graphics {
        renderer.graphics_op(op)?;
    }
    renderer.close_open_clips();
    for run in text {
        renderer.text_op(run)?;
    }
    renderer.finish()
}

struct PageRenderer<'f, 'a> {
    fonts: &'f BoundFonts<'a>,
    builder: ContentStreamBuilder,
    resources: ResourceDictionary,
    open_clips: usize,
    /// (font key, char) pairs already reported as missing
    reported_missing: HashSet<(String, char)>,
}

impl<'f, 'a> PageRenderer<'f, 'a> {
    fn new(fonts: &'f BoundFonts<'a>, config: &RenderConfig) -> Self {
        Self {
            fonts,
            builder: ContentStreamBuilder::with_precision(config.precision),
            resources: ResourceDictionary::new(),
            open_clips: 0,
            reported_missing: HashSet::new(),
        }
    }

    fn finish(self) -> Result<PageContent> {
        Ok(PageContent {
            content: self.builder.build(),
            resources: self.resources,
        })
    }

    fn graphics_op(&mut self, op: &GraphicsOp) -> Result<()> {
        match op {
            GraphicsOp::BeginClip { rect } => {
                self.builder
                    .save_state()
                    .clip_rect(rect.x, rect.y, rect.width, rect.height);
                self.open_clips += 1;
            },
            GraphicsOp::EndClip => {
                if self.open_clips == 0 {
                    log::warn!("EndClip without matching BeginClip ignored");
                } else {
                    self.builder.restore_state();
                    self.open_clips -= 1;
                }
            },
            GraphicsOp::TextBlock { clip, text } => {
                self.builder.save_state();
                if let Some(rect) = clip {
                    self.builder
                        .clip_rect(rect.x, rect.y, rect.width, rect.height);
                }
                for run in text {
                    self.text_op(run)?;
                }
                self.builder.restore_state();
            },
            shape => self.shape(shape),
        }
        Ok(())
    }

    fn close_open_clips(&mut self) {
        if self.open_clips > 0 {
            log::warn!("{} clip region(s) left open, closing", self.open_clips);
        }
        while self.open_clips > 0 {
            self.builder.restore_state();
            self.open_clips -= 1;
        }
    }

    /// Paint one shape inside its own `q ... Q`.
    fn shape(&mut self, op: &GraphicsOp) {
        let Some((style, fillable)) = shape_style(op) else {
            return;
        };
        if let Some(reason) = degenerate(op) {
            log::warn!("Skipping {}: {}", op.kind(), reason);
            return;
        }

        let fill = if fillable { style.fill_color() } else { None };
        let stroke = style.stroke_color();

        self.builder.save_state();
        self.apply_style(style, fill, stroke);

        match op {
            GraphicsOp::Rectangle { rect, .. } => {
                self.builder.rect(rect.x, rect.y, rect.width, rect.height);
            },
            GraphicsOp::RoundedRectangle { rect, radius, .. } => {
                self.builder
                    .rounded_rect(rect.x, rect.y, rect.width, rect.height, *radius);
            },
            GraphicsOp::Line { from, to, .. } => {
                self.builder.move_to(from.x, from.y).line_to(to.x, to.y);
            },
            GraphicsOp::Circle { center, radius, .. } => {
                self.builder.circle(center.x, center.y, *radius);
            },
            GraphicsOp::Ellipse { center, rx, ry, .. } => {
                self.builder.ellipse(center.x, center.y, *rx, *ry);
            },
            GraphicsOp::Polygon { points, .. } => {
                self.polyline(points);
                self.builder.close_path();
            },
            GraphicsOp::Polyline { points, .. } => self.polyline(points),
            GraphicsOp::BezierPath {
                start,
                segments,
                closed,
                ..
            } => self.bezier(*start, segments, *closed),
            GraphicsOp::BeginClip { .. } | GraphicsOp::EndClip | GraphicsOp::TextBlock { .. } => {},
        }

        let paint = match (fill.is_some(), stroke.is_some(), style.even_odd) {
            (true, true, false) => ContentStreamOp::FillStroke,
            (true, true, true) => ContentStreamOp::FillStrokeEvenOdd,
            (true, false, false) => ContentStreamOp::Fill,
            (true, false, true) => ContentStreamOp::FillEvenOdd,
            (false, true, _) => ContentStreamOp::Stroke,
            (false, false, _) => ContentStreamOp::EndPath,
        };
        self.builder.op(paint).restore_state();
    }

    fn apply_style(&mut self, style: &ShapeStyle, fill: Option<PaintColor>, stroke: Option<PaintColor>) {
        if let Some(color) = fill {
            self.builder.fill_color(color);
        }
        if let Some(color) = stroke {
            self.builder.stroke_color(color);
        }
        if let (Some(width), Some(_)) = (style.stroke_width, stroke) {
            self.builder.set_line_width(width);
        }
        if let Some(dash) = &style.dash {
            self.builder.set_dash_pattern(dash.array.clone(), dash.phase);
        }
        if let Some(cap) = style.line_cap {
            self.builder.set_line_cap(cap);
        }
        if let Some(join) = style.line_join {
            self.builder.set_line_join(join);
        }
    }

    fn polyline(&mut self, points: &[Point]) {
        if let Some((first, rest)) = points.split_first() {
            self.builder.move_to(first.x, first.y);
            for p in rest {
                self.builder.line_to(p.x, p.y);
            }
        }
    }

    fn bezier(&mut self, start: Point, segments: &[BezierSegment], closed: bool) {
        self.builder.move_to(start.x, start.y);
        for seg in segments {
            self.builder
                .curve_to(seg.c1.x, seg.c1.y, seg.c2.x, seg.c2.y, seg.end.x, seg.end.y);
        }
        if closed {
            self.builder.close_path();
        }
    }

    /// Emit one text run as `BT ... ET`.
    fn text_op(&mut self, op: &TextOp) -> Result<()> {
        let key = op.font.key();
        let font = self
            .fonts
            .get(&key)
            .ok_or_else(|| Error::Font(format!("font '{}' was not collected for this page", key)))?;
        let resource = self.resources.register(&key);

        self.builder.begin_text().set_font(&resource, op.size);
        if let Some(spacing) = op.char_spacing {
            self.builder.op(ContentStreamOp::SetCharacterSpacing(spacing));
        }
        if let Some(spacing) = op.word_spacing {
            self.builder.op(ContentStreamOp::SetWordSpacing(spacing));
        }
        if let Some(scale) = op.horizontal_scaling {
            self.builder.op(ContentStreamOp::SetHorizontalScaling(scale));
        }
        if let Some(mode) = op.render_mode {
            self.builder.op(ContentStreamOp::SetTextRenderMode(mode as u8));
        }
        let color = op.fill_color().unwrap_or(PaintColor::Rgb(Color::black()));
        self.builder.fill_color(color);
        self.builder
            .op(ContentStreamOp::MoveText(op.position.x, op.position.y));

        let multi_line = op.text.contains('\n');
        if multi_line {
            let leading = op.line_height.unwrap_or(op.size * DEFAULT_LINE_HEIGHT);
            self.builder.op(ContentStreamOp::SetTextLeading(leading));
        }
        for (i, line) in op.lines().enumerate() {
            if i > 0 {
                self.builder.op(ContentStreamOp::NextLine);
            }
            let show = self.show_text(&key, font, line);
            self.builder.op(show);
        }

        self.builder.end_text();
        Ok(())
    }

    fn show_text(&mut self, key: &str, font: BoundFont<'_>, text: &str) -> ContentStreamOp {
        match font {
            BoundFont::Standard(_) => ContentStreamOp::ShowText(text.to_string()),
            BoundFont::Embedded(subset) => {
                for ch in text.chars() {
                    if subset.font().glyph_id(ch).is_none()
                        && self.reported_missing.insert((key.to_string(), ch))
                    {
                        log::debug!("No glyph for U+{:04X} in '{}', using .notdef", ch as u32, key);
                    }
                }
                ContentStreamOp::ShowHexText(subset.encode_hex(text))
            },
        }
    }
}

/// Style of a shape and whether it may be filled.
fn shape_style(op: &GraphicsOp) -> Option<(&ShapeStyle, bool)> {
    match op {
        GraphicsOp::Rectangle { style, .. }
        | GraphicsOp::RoundedRectangle { style, .. }
        | GraphicsOp::Circle { style, .. }
        | GraphicsOp::Ellipse { style, .. }
        | GraphicsOp::Polygon { style, .. } => Some((style, true)),
        GraphicsOp::Line { style, .. } | GraphicsOp::Polyline { style, .. } => Some((style, false)),
        GraphicsOp::BezierPath { style, closed, .. } => Some((style, *closed)),
        GraphicsOp::BeginClip { .. } | GraphicsOp::EndClip | GraphicsOp::TextBlock { .. } => None,
    }
}

/// Why a shape cannot be drawn, if it cannot.
fn degenerate(op: &GraphicsOp) -> Option<String> {
    match op {
        GraphicsOp::Polygon { points, .. } if points.len() < 3 => {
            Some(format!("needs at least 3 points, got {}", points.len()))
        },
        GraphicsOp::Polyline { points, .. } if points.len() < 2 => {
            Some(format!("needs at least 2 points, got {}", points.len()))
        },
        GraphicsOp::BezierPath { segments, .. } if segments.is_empty() => {
            Some("no segments".to_string())
        },
        _ => None,
    }
}
