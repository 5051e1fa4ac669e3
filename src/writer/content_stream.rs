//! Content stream operators and their byte encoding.
//!
//! Operators follow ISO 32000-1:2008, sections 8 and 9. Each operator is
//! written on its own line with its operands in front of it.

use crate::elements::{LineCap, LineJoin, PaintColor};
use crate::fonts::unicode_to_winansi;

/// Bézier approximation constant for quarter circles, 4/3 * (sqrt(2) - 1).
pub const KAPPA: f32 = 0.552_284_75;

/// Unit directions of the four quadrant ends, counter-clockwise from +x.
const AXES: [(f32, f32); 4] = [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)];

/// One content stream operator with its operands.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentStreamOp {
    /// `q`
    SaveState,
    /// `Q`
    RestoreState,
    /// `BT`
    BeginText,
    /// `ET`
    EndText,
    /// `/name size Tf`
    SetFont(String, f32),
    /// `tx ty Td`
    MoveText(f32, f32),
    /// `(...) Tj` with a WinAnsi literal string
    ShowText(String),
    /// `<...> Tj`; the operand already includes the angle brackets
    ShowHexText(String),
    /// `Tc`
    SetCharacterSpacing(f32),
    /// `Tw`
    SetWordSpacing(f32),
    /// `Tz`, in percent
    SetHorizontalScaling(f32),
    /// `Tr`
    SetTextRenderMode(u8),
    /// `TL`
    SetTextLeading(f32),
    /// `T*`
    NextLine,
    /// `r g b rg`
    SetFillColorRGB(f32, f32, f32),
    /// `r g b RG`
    SetStrokeColorRGB(f32, f32, f32),
    /// `c m y k k`
    SetFillColorCMYK(f32, f32, f32, f32),
    /// `c m y k K`
    SetStrokeColorCMYK(f32, f32, f32, f32),
    /// `w`
    SetLineWidth(f32),
    /// `J`
    SetLineCap(LineCap),
    /// `j`
    SetLineJoin(LineJoin),
    /// `[array] phase d`
    SetDashPattern(Vec<f32>, f32),
    /// `m`
    MoveTo(f32, f32),
    /// `l`
    LineTo(f32, f32),
    /// `c`
    CurveTo(f32, f32, f32, f32, f32, f32),
    /// `re`
    Rectangle(f32, f32, f32, f32),
    /// `h`
    ClosePath,
    /// `S`
    Stroke,
    /// `f`
    Fill,
    /// `f*`
    FillEvenOdd,
    /// `B`
    FillStroke,
    /// `B*`
    FillStrokeEvenOdd,
    /// `n`
    EndPath,
    /// `W`
    Clip,
}

impl ContentStreamOp {
    fn operator(&self) -> &'static str {
        use ContentStreamOp::*;
        match self {
            SaveState => "q",
            RestoreState => "Q",
            BeginText => "BT",
            EndText => "ET",
            SetFont(..) => "Tf",
            MoveText(..) => "Td",
            ShowText(_) | ShowHexText(_) => "Tj",
            SetCharacterSpacing(_) => "Tc",
            SetWordSpacing(_) => "Tw",
            SetHorizontalScaling(_) => "Tz",
            SetTextRenderMode(_) => "Tr",
            SetTextLeading(_) => "TL",
            NextLine => "T*",
            SetFillColorRGB(..) => "rg",
            SetStrokeColorRGB(..) => "RG",
            SetFillColorCMYK(..) => "k",
            SetStrokeColorCMYK(..) => "K",
            SetLineWidth(_) => "w",
            SetLineCap(_) => "J",
            SetLineJoin(_) => "j",
            SetDashPattern(..) => "d",
            MoveTo(..) => "m",
            LineTo(..) => "l",
            CurveTo(..) => "c",
            Rectangle(..) => "re",
            ClosePath => "h",
            Stroke => "S",
            Fill => "f",
            FillEvenOdd => "f*",
            FillStroke => "B",
            FillStrokeEvenOdd => "B*",
            EndPath => "n",
            Clip => "W",
        }
    }

    /// Numeric operands, for operators that take nothing else.
    fn numbers(&self) -> Vec<f32> {
        use ContentStreamOp::*;
        match *self {
            MoveText(a, b) | MoveTo(a, b) | LineTo(a, b) => vec![a, b],
            SetCharacterSpacing(v)
            | SetWordSpacing(v)
            | SetHorizontalScaling(v)
            | SetTextLeading(v)
            | SetLineWidth(v) => vec![v],
            SetFillColorRGB(r, g, b) | SetStrokeColorRGB(r, g, b) => vec![r, g, b],
            SetFillColorCMYK(c, m, y, k) | SetStrokeColorCMYK(c, m, y, k) => vec![c, m, y, k],
            Rectangle(x, y, w, h) => vec![x, y, w, h],
            CurveTo(x1, y1, x2, y2, x3, y3) => vec![x1, y1, x2, y2, x3, y3],
            _ => Vec::new(),
        }
    }
}

/// Accumulates operators and encodes them as content stream bytes.
///
/// Numbers are written with at most `precision` decimals and no trailing
/// zeros, so identical input always yields identical bytes.
#[derive(Debug, Clone)]
pub struct ContentStreamBuilder {
    operations: Vec<ContentStreamOp>,
    precision: usize,
    in_text: bool,
}

impl Default for ContentStreamBuilder {
    fn default() -> Self {
        Self::with_precision(4)
    }
}

impl ContentStreamBuilder {
    /// Builder writing at most four decimals.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder writing at most `precision` decimals.
    pub fn with_precision(precision: usize) -> Self {
        Self {
            operations: Vec::new(),
            precision,
            in_text: false,
        }
    }

    /// Append an operator.
    pub fn op(&mut self, op: ContentStreamOp) -> &mut Self {
        self.operations.push(op);
        self
    }

    /// Operators appended so far.
    pub fn operations(&self) -> &[ContentStreamOp] {
        &self.operations
    }

    /// `BT`, unless a text object is already open.
    pub fn begin_text(&mut self) -> &mut Self {
        if !self.in_text {
            self.in_text = true;
            self.op(ContentStreamOp::BeginText);
        }
        self
    }

    /// `ET`, if a text object is open.
    pub fn end_text(&mut self) -> &mut Self {
        if self.in_text {
            self.in_text = false;
            self.op(ContentStreamOp::EndText);
        }
        self
    }

    /// Select font resource `resource` at `size` points.
    pub fn set_font(&mut self, resource: &str, size: f32) -> &mut Self {
        self.op(ContentStreamOp::SetFont(resource.to_string(), size))
    }

    /// Nonstroking color in its own color space.
    pub fn fill_color(&mut self, color: PaintColor) -> &mut Self {
        self.op(match color {
            PaintColor::Rgb(c) => ContentStreamOp::SetFillColorRGB(c.r, c.g, c.b),
            PaintColor::Cmyk(c) => ContentStreamOp::SetFillColorCMYK(c.c, c.m, c.y, c.k),
        })
    }

    /// Stroking color in its own color space.
    pub fn stroke_color(&mut self, color: PaintColor) -> &mut Self {
        self.op(match color {
            PaintColor::Rgb(c) => ContentStreamOp::SetStrokeColorRGB(c.r, c.g, c.b),
            PaintColor::Cmyk(c) => ContentStreamOp::SetStrokeColorCMYK(c.c, c.m, c.y, c.k),
        })
    }

    /// `w`
    pub fn set_line_width(&mut self, width: f32) -> &mut Self {
        self.op(ContentStreamOp::SetLineWidth(width))
    }

    /// `J`
    pub fn set_line_cap(&mut self, cap: LineCap) -> &mut Self {
        self.op(ContentStreamOp::SetLineCap(cap))
    }

    /// `j`
    pub fn set_line_join(&mut self, join: LineJoin) -> &mut Self {
        self.op(ContentStreamOp::SetLineJoin(join))
    }

    /// `d`
    pub fn set_dash_pattern(&mut self, array: Vec<f32>, phase: f32) -> &mut Self {
        self.op(ContentStreamOp::SetDashPattern(array, phase))
    }

    /// Begin a subpath at `(x, y)`.
    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.op(ContentStreamOp::MoveTo(x, y))
    }

    /// Straight segment to `(x, y)`.
    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.op(ContentStreamOp::LineTo(x, y))
    }

    /// Cubic Bézier segment with two control points.
    pub fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) -> &mut Self {
        self.op(ContentStreamOp::CurveTo(x1, y1, x2, y2, x3, y3))
    }

    /// `re`
    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        self.op(ContentStreamOp::Rectangle(x, y, width, height))
    }

    /// `h`
    pub fn close_path(&mut self) -> &mut Self {
        self.op(ContentStreamOp::ClosePath)
    }

    /// Intersect the clip with a rectangle: `re W n`.
    pub fn clip_rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        self.rect(x, y, width, height)
            .op(ContentStreamOp::Clip)
            .op(ContentStreamOp::EndPath)
    }

    /// `q`
    pub fn save_state(&mut self) -> &mut Self {
        self.op(ContentStreamOp::SaveState)
    }

    /// `Q`
    pub fn restore_state(&mut self) -> &mut Self {
        self.op(ContentStreamOp::RestoreState)
    }

    /// Closed ellipse of four quarter curves, counter-clockwise from the
    /// rightmost point.
    pub fn ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32) -> &mut Self {
        let at = |(ux, uy): (f32, f32), (vx, vy): (f32, f32)| {
            (cx + ux * rx + vx * rx * KAPPA, cy + uy * ry + vy * ry * KAPPA)
        };

        self.move_to(cx + rx, cy);
        for quadrant in 0..4 {
            let from = AXES[quadrant];
            let to = AXES[(quadrant + 1) % 4];
            let (x1, y1) = at(from, to);
            let (x2, y2) = at(to, from);
            let (x3, y3) = at(to, (0.0, 0.0));
            self.curve_to(x1, y1, x2, y2, x3, y3);
        }
        self.close_path()
    }

    /// Circle of `radius` around `(cx, cy)`.
    pub fn circle(&mut self, cx: f32, cy: f32, radius: f32) -> &mut Self {
        self.ellipse(cx, cy, radius, radius)
    }

    /// Rectangle with quarter-circle corners.
    ///
    /// The radius is clamped to half the shorter side; a radius of zero
    /// falls back to `re`.
    pub fn rounded_rect(&mut self, x: f32, y: f32, width: f32, height: f32, radius: f32) -> &mut Self {
        let r = radius.max(0.0).min(width / 2.0).min(height / 2.0);
        if r <= 0.0 {
            return self.rect(x, y, width, height);
        }
        let inset = r * (1.0 - KAPPA);

        // Corner, direction of the edge arriving at it, direction leaving it
        let corners = [
            ((x + width, y), AXES[0], AXES[1]),
            ((x + width, y + height), AXES[1], AXES[2]),
            ((x, y + height), AXES[2], AXES[3]),
            ((x, y), AXES[3], AXES[0]),
        ];

        self.move_to(x + r, y);
        for ((px, py), (ix, iy), (ox, oy)) in corners {
            self.line_to(px - ix * r, py - iy * r).curve_to(
                px - ix * inset,
                py - iy * inset,
                px + ox * inset,
                py + oy * inset,
                px + ox * r,
                py + oy * r,
            );
        }
        self.close_path()
    }

    /// Encode every operator, one per line.
    pub fn build(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.operations.len() * 16);
        for op in &self.operations {
            self.encode(op, &mut out);
            out.extend_from_slice(op.operator().as_bytes());
            out.push(b'\n');
        }
        out
    }

    /// Operands of `op`, each followed by a space.
    fn encode(&self, op: &ContentStreamOp, out: &mut Vec<u8>) {
        match op {
            ContentStreamOp::SetFont(name, size) => {
                out.push(b'/');
                out.extend_from_slice(name.as_bytes());
                out.push(b' ');
                self.number(*size, out);
            },
            ContentStreamOp::ShowText(text) => {
                out.push(b'(');
                escape_literal(text, out);
                out.extend_from_slice(b") ");
            },
            ContentStreamOp::ShowHexText(hex) => {
                out.extend_from_slice(hex.as_bytes());
                out.push(b' ');
            },
            ContentStreamOp::SetTextRenderMode(mode) => out.extend_from_slice(format!("{} ", mode).as_bytes()),
            ContentStreamOp::SetLineCap(cap) => out.extend_from_slice(format!("{} ", *cap as u8).as_bytes()),
            ContentStreamOp::SetLineJoin(join) => {
                out.extend_from_slice(format!("{} ", *join as u8).as_bytes())
            },
            ContentStreamOp::SetDashPattern(array, phase) => {
                let items: Vec<String> = array.iter().map(|v| format_number(*v, self.precision)).collect();
                out.extend_from_slice(format!("[{}] ", items.join(" ")).as_bytes());
                self.number(*phase, out);
            },
            other => {
                for value in other.numbers() {
                    self.number(value, out);
                }
            },
        }
    }

    fn number(&self, value: f32, out: &mut Vec<u8>) {
        out.extend_from_slice(format_number(value, self.precision).as_bytes());
        out.push(b' ');
    }
}

/// Format `value` with at most `precision` decimals.
///
/// Trailing zeros and a bare decimal point are dropped, `-0` becomes `0`
/// and non-finite values are written as `0`.
pub fn format_number(value: f32, precision: usize) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let fixed = format!("{:.*}", precision, value);
    let digits = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    match digits {
        "-0" => "0".to_string(),
        s => s.to_string(),
    }
}

/// Literal string body in WinAnsiEncoding.
///
/// Characters WinAnsi cannot encode become `?`. Control bytes and the
/// upper half are written as octal escapes, keeping the stream 7-bit.
fn escape_literal(text: &str, out: &mut Vec<u8>) {
    for ch in text.chars() {
        match unicode_to_winansi(ch).unwrap_or(b'?') {
            byte @ (b'(' | b')' | b'\\') => out.extend_from_slice(&[b'\\', byte]),
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\t' => out.extend_from_slice(b"\\t"),
            byte @ (0x00..=0x1F | 0x7F..=0xFF) => {
                out.extend_from_slice(format!("\\{:03o}", byte).as_bytes())
            },
            byte => out.push(byte),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{CmykColor, Color};

    fn text(builder: &ContentStreamBuilder) -> String {
        String::from_utf8(builder.build()).unwrap()
    }

    #[test]
    fn test_text_object() {
        let mut builder = ContentStreamBuilder::new();
        builder
            .begin_text()
            .set_font("F2", 10.5)
            .op(ContentStreamOp::MoveText(72.0, 700.0))
            .op(ContentStreamOp::ShowHexText("<00030001>".to_string()))
            .end_text();

        assert_eq!(text(&builder), "BT\n/F2 10.5 Tf\n72 700 Td\n<00030001> Tj\nET\n");
    }

    #[test]
    fn test_begin_and_end_text_are_idempotent() {
        let mut builder = ContentStreamBuilder::new();
        builder.end_text().begin_text().begin_text().end_text().end_text();
        assert_eq!(builder.operations(), &[ContentStreamOp::BeginText, ContentStreamOp::EndText]);
    }

    #[test]
    fn test_stroked_line() {
        let mut builder = ContentStreamBuilder::new();
        builder
            .stroke_color(PaintColor::Rgb(Color::new(0.2, 0.4, 0.6)))
            .set_line_width(0.75)
            .move_to(0.0, 0.0)
            .line_to(100.0, 50.0)
            .op(ContentStreamOp::Stroke);

        assert_eq!(text(&builder), "0.2 0.4 0.6 RG\n0.75 w\n0 0 m\n100 50 l\nS\n");
    }

    #[test]
    fn test_cmyk_paint() {
        let mut builder = ContentStreamBuilder::new();
        builder
            .fill_color(PaintColor::Cmyk(CmykColor::new(0.0, 0.5, 1.0, 0.25)))
            .stroke_color(PaintColor::Cmyk(CmykColor::new(1.0, 0.0, 0.0, 0.0)));
        assert_eq!(text(&builder), "0 0.5 1 0.25 k\n1 0 0 0 K\n");
    }

    #[test]
    fn test_clip_rect_ends_path() {
        let mut builder = ContentStreamBuilder::new();
        builder.save_state().clip_rect(10.0, 20.0, 30.0, 40.0).restore_state();
        assert_eq!(text(&builder), "q\n10 20 30 40 re\nW\nn\nQ\n");
    }

    #[test]
    fn test_circle_quadrants() {
        let mut builder = ContentStreamBuilder::with_precision(2);
        builder.circle(0.0, 0.0, 100.0);

        let lines: Vec<String> = text(&builder).lines().map(str::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "100 0 m",
                "100 55.23 55.23 100 0 100 c",
                "-55.23 100 -100 55.23 -100 0 c",
                "-100 -55.23 -55.23 -100 0 -100 c",
                "55.23 -100 100 -55.23 100 0 c",
                "h",
            ]
        );
    }

    #[test]
    fn test_rounded_rect_corners() {
        let mut builder = ContentStreamBuilder::with_precision(2);
        builder.rounded_rect(0.0, 0.0, 100.0, 50.0, 10.0);

        let content = text(&builder);
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "10 0 m");
        assert_eq!(lines[1], "90 0 l");
        assert_eq!(lines[2], "95.52 0 100 4.48 100 10 c");
        assert_eq!(lines[8], "0 4.48 4.48 0 10 0 c");
        assert_eq!(lines[9], "h");
    }

    #[test]
    fn test_rounded_rect_radius_clamped_or_dropped() {
        let mut builder = ContentStreamBuilder::new();
        builder.rounded_rect(0.0, 0.0, 10.0, 10.0, 0.0);
        assert_eq!(builder.operations(), &[ContentStreamOp::Rectangle(0.0, 0.0, 10.0, 10.0)]);

        let mut builder = ContentStreamBuilder::new();
        builder.rounded_rect(0.0, 0.0, 10.0, 4.0, 50.0);
        assert_eq!(builder.operations()[0], ContentStreamOp::MoveTo(2.0, 0.0));
    }

    #[test]
    fn test_line_style_operators() {
        let mut builder = ContentStreamBuilder::new();
        builder
            .set_dash_pattern(vec![3.0, 1.5], 0.0)
            .set_line_cap(LineCap::Round)
            .set_line_join(LineJoin::Bevel)
            .op(ContentStreamOp::SetTextRenderMode(7));
        assert_eq!(text(&builder), "[3 1.5] 0 d\n1 J\n2 j\n7 Tr\n");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0, 4), "1");
        assert_eq!(format_number(0.5, 4), "0.5");
        assert_eq!(format_number(0.123456, 4), "0.1235");
        assert_eq!(format_number(-0.00001, 4), "0");
        assert_eq!(format_number(-2.5, 4), "-2.5");
        assert_eq!(format_number(100.0, 0), "100");
        assert_eq!(format_number(f32::INFINITY, 4), "0");
    }

    #[test]
    fn test_literal_text_escapes() {
        let mut builder = ContentStreamBuilder::new();
        builder.op(ContentStreamOp::ShowText("a(b)\\c\u{1}é中".to_string()));
        assert_eq!(builder.build(), b"(a\\(b\\)\\\\c\\001\\351?) Tj\n".to_vec());
    }

    #[test]
    fn test_literal_text_uses_winansi() {
        let mut builder = ContentStreamBuilder::new();
        builder.op(ContentStreamOp::ShowText("€“x”".to_string()));
        assert_eq!(text(&builder), "(\\200\\223x\\224) Tj\n");

        // C1 controls have no WinAnsi glyph
        let mut builder = ContentStreamBuilder::new();
        builder.op(ContentStreamOp::ShowText("\u{80}".to_string()));
        assert_eq!(text(&builder), "(?) Tj\n");
    }
}
