//! Vector drawing operations.

use super::color::{resolve_color, CmykColor, Color, Gradient, PaintColor};
use super::text::TextOp;
use crate::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Line cap styles for path stroking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineCap {
    /// Square butt cap (default)
    #[default]
    Butt = 0,
    /// Round cap
    Round = 1,
    /// Projecting square cap
    Square = 2,
}

/// Line join styles for path stroking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineJoin {
    /// Miter join (default)
    #[default]
    Miter = 0,
    /// Round join
    Round = 1,
    /// Bevel join
    Bevel = 2,
}

/// Dash pattern for stroked lines.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashPattern {
    /// Alternating dash and gap lengths
    pub array: Vec<f32>,
    /// Offset into the pattern
    pub phase: f32,
}

impl DashPattern {
    /// Create a dash pattern.
    pub fn new(array: Vec<f32>, phase: f32) -> Self {
        Self { array, phase }
    }
}

/// Fill and stroke attributes shared by every shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeStyle {
    /// RGB fill color
    pub fill: Option<Color>,
    /// CMYK fill color
    pub fill_cmyk: Option<CmykColor>,
    /// Gradient fill
    pub gradient: Option<Gradient>,
    /// RGB stroke color
    pub stroke: Option<Color>,
    /// CMYK stroke color
    pub stroke_cmyk: Option<CmykColor>,
    /// Stroke width in points
    pub stroke_width: Option<f32>,
    /// Dash pattern
    pub dash: Option<DashPattern>,
    /// Line cap style
    pub line_cap: Option<LineCap>,
    /// Line join style
    pub line_join: Option<LineJoin>,
    /// Fill with the even-odd rule instead of non-zero winding
    pub even_odd: bool,
}

impl ShapeStyle {
    /// An unpainted style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filled with an RGB color.
    pub fn filled(color: Color) -> Self {
        Self::new().with_fill(color)
    }

    /// Stroked with an RGB color and width.
    pub fn stroked(color: Color, width: f32) -> Self {
        Self::new().with_stroke(color).with_stroke_width(width)
    }

    /// Set RGB fill color.
    pub fn with_fill(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    /// Set CMYK fill color.
    pub fn with_fill_cmyk(mut self, color: CmykColor) -> Self {
        self.fill_cmyk = Some(color);
        self
    }

    /// Set gradient fill.
    pub fn with_gradient(mut self, gradient: Gradient) -> Self {
        self.gradient = Some(gradient);
        self
    }

    /// Set RGB stroke color.
    pub fn with_stroke(mut self, color: Color) -> Self {
        self.stroke = Some(color);
        self
    }

    /// Set CMYK stroke color.
    pub fn with_stroke_cmyk(mut self, color: CmykColor) -> Self {
        self.stroke_cmyk = Some(color);
        self
    }

    /// Set stroke width.
    pub fn with_stroke_width(mut self, width: f32) -> Self {
        self.stroke_width = Some(width);
        self
    }

    /// Set dash pattern.
    pub fn with_dash(mut self, dash: DashPattern) -> Self {
        self.dash = Some(dash);
        self
    }

    /// Set line cap.
    pub fn with_line_cap(mut self, cap: LineCap) -> Self {
        self.line_cap = Some(cap);
        self
    }

    /// Set line join.
    pub fn with_line_join(mut self, join: LineJoin) -> Self {
        self.line_join = Some(join);
        self
    }

    /// Fill with the even-odd rule.
    pub fn with_even_odd(mut self, even_odd: bool) -> Self {
        self.even_odd = even_odd;
        self
    }

    /// Resolved fill color, if the shape is filled.
    pub fn fill_color(&self) -> Option<PaintColor> {
        resolve_color(self.fill, self.fill_cmyk, self.gradient.as_ref())
    }

    /// Resolved stroke color, if the shape is stroked.
    pub fn stroke_color(&self) -> Option<PaintColor> {
        if self.stroke_width.is_some_and(|w| w <= 0.0) {
            return None;
        }
        resolve_color(self.stroke, self.stroke_cmyk, None)
    }
}

/// One cubic Bézier segment, continuing from the previous end point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BezierSegment {
    /// First control point
    pub c1: Point,
    /// Second control point
    pub c2: Point,
    /// End point
    pub end: Point,
}

impl BezierSegment {
    /// Create a segment.
    pub fn new(c1: Point, c2: Point, end: Point) -> Self {
        Self { c1, c2, end }
    }
}

/// A drawing instruction for one page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GraphicsOp {
    /// Axis-aligned rectangle
    Rectangle {
        /// Rectangle bounds
        rect: Rect,
        /// Paint
        style: ShapeStyle,
    },
    /// Rectangle with rounded corners
    RoundedRectangle {
        /// Rectangle bounds
        rect: Rect,
        /// Corner radius, clamped to half the shorter side
        radius: f32,
        /// Paint
        style: ShapeStyle,
    },
    /// Straight line segment (stroked only)
    Line {
        /// Start point
        from: Point,
        /// End point
        to: Point,
        /// Paint
        style: ShapeStyle,
    },
    /// Circle
    Circle {
        /// Center point
        center: Point,
        /// Radius
        radius: f32,
        /// Paint
        style: ShapeStyle,
    },
    /// Axis-aligned ellipse
    Ellipse {
        /// Center point
        center: Point,
        /// Horizontal radius
        rx: f32,
        /// Vertical radius
        ry: f32,
        /// Paint
        style: ShapeStyle,
    },
    /// Closed polygon (at least 3 vertices)
    Polygon {
        /// Vertices
        points: Vec<Point>,
        /// Paint
        style: ShapeStyle,
    },
    /// Open polyline (at least 2 vertices, never filled)
    Polyline {
        /// Vertices
        points: Vec<Point>,
        /// Paint
        style: ShapeStyle,
    },
    /// Path of cubic Bézier segments
    BezierPath {
        /// Start point
        start: Point,
        /// Segments
        segments: Vec<BezierSegment>,
        /// Close the path; only closed paths are filled
        closed: bool,
        /// Paint
        style: ShapeStyle,
    },
    /// Push the graphics state and clip to a rectangle until the matching `EndClip`
    BeginClip {
        /// Clip rectangle
        rect: Rect,
    },
    /// Pop the state pushed by `BeginClip`
    EndClip,
    /// Text drawn inside the graphics sequence, optionally clipped
    TextBlock {
        /// Optional clip rectangle
        clip: Option<Rect>,
        /// Text runs
        text: Vec<TextOp>,
    },
}

impl GraphicsOp {
    /// Filled/stroked rectangle.
    pub fn rect(rect: Rect, style: ShapeStyle) -> Self {
        GraphicsOp::Rectangle { rect, style }
    }

    /// Stroked line.
    pub fn line(from: Point, to: Point, style: ShapeStyle) -> Self {
        GraphicsOp::Line { from, to, style }
    }

    /// Circle.
    pub fn circle(center: Point, radius: f32, style: ShapeStyle) -> Self {
        GraphicsOp::Circle {
            center,
            radius,
            style,
        }
    }

    /// Short name of the shape kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            GraphicsOp::Rectangle { .. } => "rectangle",
            GraphicsOp::RoundedRectangle { .. } => "rounded-rectangle",
            GraphicsOp::Line { .. } => "line",
            GraphicsOp::Circle { .. } => "circle",
            GraphicsOp::Ellipse { .. } => "ellipse",
            GraphicsOp::Polygon { .. } => "polygon",
            GraphicsOp::Polyline { .. } => "polyline",
            GraphicsOp::BezierPath { .. } => "bezier",
            GraphicsOp::BeginClip { .. } => "begin-clip",
            GraphicsOp::EndClip => "end-clip",
            GraphicsOp::TextBlock { .. } => "text-block",
        }
    }
}
