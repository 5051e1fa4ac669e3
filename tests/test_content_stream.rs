//! Page content stream tests.
//!
//! Renders whole pages and checks the operator stream:
//! - Graphics painted before text
//! - Balanced q/Q around shapes, clips and text blocks
//! - Paint operators chosen from fill/stroke/even-odd
//! - Text encoded per font kind (literal for standard, hex glyph IDs for embedded)

mod common;

use common::{hello_font, inflate, load, stream_data, text_of};
use pdf_glyphs::config::RenderConfig;
use pdf_glyphs::elements::{BezierSegment, Color, FontRef, GraphicsOp, ShapeStyle, TextOp, TextRenderMode};
use pdf_glyphs::geometry::{Point, Rect};
use pdf_glyphs::object::Object;
use pdf_glyphs::writer::{format_number, render_page, FlateCompressor, FontCollection, PageContent};
use pdf_glyphs::Error;

fn render_with(graphics: &[GraphicsOp], text: &[TextOp], config: &RenderConfig) -> PageContent {
    let mut fonts = FontCollection::new();
    fonts.add_font("body", load(hello_font()));
    fonts.scan(graphics, text).unwrap();
    let bound = fonts.build_all().unwrap();
    render_page(graphics, text, &bound, config).unwrap()
}

fn render(graphics: &[GraphicsOp], text: &[TextOp]) -> String {
    let page = render_with(graphics, text, &RenderConfig::default());
    String::from_utf8(page.content).unwrap()
}

fn count_ops(content: &str, op: &str) -> usize {
    content.lines().filter(|line| *line == op).count()
}

fn grey() -> ShapeStyle {
    ShapeStyle::filled(Color::new(0.5, 0.5, 0.5))
}

#[test]
fn test_rectangle_painted_before_text() {
    let graphics = [GraphicsOp::rect(Rect::new(72.0, 700.0, 200.0, 40.0), grey())];
    let text = [TextOp::new("Hi", Point::new(80.0, 715.0), FontRef::custom("body"), 12.0)];
    let content = render(&graphics, &text);

    let expected_rect = "q\n0.5 0.5 0.5 rg\n72 700 200 40 re\nf\nQ\n";
    assert!(content.starts_with(expected_rect));
    assert_eq!(
        &content[expected_rect.len()..],
        "BT\n/F1 12 Tf\n0 0 0 rg\n80 715 Td\n<00010002> Tj\nET\n"
    );
}

#[test]
fn test_nested_clips_balance() {
    let mut graphics = Vec::new();
    for i in 0..5 {
        graphics.push(GraphicsOp::BeginClip { rect: Rect::new(i as f32, i as f32, 100.0, 100.0) });
    }
    graphics.push(GraphicsOp::rect(Rect::new(10.0, 10.0, 5.0, 5.0), grey()));
    for _ in 0..5 {
        graphics.push(GraphicsOp::EndClip);
    }
    let content = render(&graphics, &[]);

    assert_eq!(count_ops(&content, "q"), 6);
    assert_eq!(count_ops(&content, "Q"), 6);
    assert_eq!(count_ops(&content, "W"), 5);
}

#[test]
fn test_unclosed_clip_closed_before_text() {
    let graphics = [GraphicsOp::BeginClip { rect: Rect::new(0.0, 0.0, 50.0, 50.0) }];
    let text = [TextOp::new("H", Point::new(1.0, 1.0), FontRef::custom("body"), 10.0)];
    let content = render(&graphics, &text);

    assert!(content.starts_with("q\n0 0 50 50 re\nW\nn\nQ\nBT\n"));
}

#[test]
fn test_shapes_each_in_own_state() {
    let graphics = [
        GraphicsOp::circle(Point::new(50.0, 50.0), 10.0, grey()),
        GraphicsOp::Ellipse { center: Point::new(0.0, 0.0), rx: 20.0, ry: 10.0, style: grey() },
        GraphicsOp::RoundedRectangle {
            rect: Rect::new(0.0, 0.0, 40.0, 20.0),
            radius: 5.0,
            style: ShapeStyle::stroked(Color::black(), 1.0),
        },
        GraphicsOp::line(Point::new(0.0, 0.0), Point::new(10.0, 0.0), ShapeStyle::stroked(Color::black(), 2.0)),
    ];
    let content = render(&graphics, &[]);

    assert_eq!(count_ops(&content, "q"), 4);
    assert_eq!(count_ops(&content, "Q"), 4);
    assert_eq!(content.lines().filter(|l| l.ends_with(" c")).count(), 12);
    assert_eq!(count_ops(&content, "f"), 2);
    assert_eq!(count_ops(&content, "S"), 2);
    assert!(content.contains("2 w\n0 0 m\n10 0 l\nS\n"));
}

#[test]
fn test_closed_bezier_filled_and_stroked_even_odd() {
    let style = grey().with_stroke(Color::black()).with_even_odd(true);
    let graphics = [GraphicsOp::BezierPath {
        start: Point::new(0.0, 0.0),
        segments: vec![
            BezierSegment::new(Point::new(0.0, 10.0), Point::new(10.0, 10.0), Point::new(10.0, 0.0)),
            BezierSegment::new(Point::new(10.0, -10.0), Point::new(0.0, -10.0), Point::new(0.0, 0.0)),
        ],
        closed: true,
        style,
    }];
    let content = render(&graphics, &[]);
    assert!(content.ends_with("h\nB*\nQ\n"));
}

#[test]
fn test_empty_bezier_skipped() {
    let graphics = [GraphicsOp::BezierPath {
        start: Point::new(0.0, 0.0),
        segments: vec![],
        closed: true,
        style: grey(),
    }];
    assert_eq!(render(&graphics, &[]), "");
}

#[test]
fn test_text_block_clipped_and_restored() {
    let block = GraphicsOp::TextBlock {
        clip: Some(Rect::new(0.0, 0.0, 30.0, 12.0)),
        text: vec![
            TextOp::new("Hi", Point::new(1.0, 2.0), FontRef::custom("body"), 8.0),
            TextOp::new("x", Point::new(1.0, 10.0), FontRef::standard("Helvetica"), 8.0),
        ],
    };
    let content = render(&[block], &[]);

    assert!(content.starts_with("q\n0 0 30 12 re\nW\nn\nBT\n"));
    assert_eq!(count_ops(&content, "BT"), 2);
    assert_eq!(count_ops(&content, "ET"), 2);
    assert!(content.ends_with("ET\nQ\n"));
}

#[test]
fn test_text_state_operators() {
    let text = [TextOp::new("Hi", Point::new(0.0, 0.0), FontRef::standard("Helvetica-Bold"), 9.0)
        .with_word_spacing(1.5)
        .with_horizontal_scaling(90.0)
        .with_render_mode(TextRenderMode::Stroke)];
    assert_eq!(
        render(&[], &text),
        "BT\n/F1 9 Tf\n1.5 Tw\n90 Tz\n1 Tr\n0 0 0 rg\n0 0 Td\n(Hi) Tj\nET\n"
    );
}

#[test]
fn test_standard_font_text_is_winansi() {
    let text = [TextOp::new("€“x”", Point::new(0.0, 0.0), FontRef::standard("Times-Roman"), 10.0)];
    let content = render(&[], &text);
    assert!(content.contains("(\\200\\223x\\224) Tj\n"));
}

#[test]
fn test_multi_line_embedded_text_uses_line_height() {
    let text = [TextOp::new("H\ni", Point::new(0.0, 100.0), FontRef::custom("body"), 10.0)
        .with_line_height(14.0)];
    let content = render(&[], &text);
    assert!(content.contains("14 TL\n<0001> Tj\nT*\n<0002> Tj\n"));
}

#[test]
fn test_missing_glyph_uses_notdef() {
    let text = [TextOp::new("H?H?", Point::new(0.0, 0.0), FontRef::custom("body"), 10.0)];
    let content = render(&[], &text);
    assert!(content.contains("<0001000000010000> Tj"));
}

#[test]
fn test_precision_applies_to_coordinates() {
    let graphics = [GraphicsOp::rect(Rect::new(1.23456, 0.0, 1.0, 1.0), grey())];
    let page = render_with(&graphics, &[], &RenderConfig::default().with_precision(2));
    let content = String::from_utf8(page.content).unwrap();
    assert!(content.contains("1.23 0 1 1 re"));
    assert_eq!(format_number(1.23456, 2), "1.23");
}

#[test]
fn test_compressed_content_stream() {
    let graphics = [GraphicsOp::rect(Rect::new(0.0, 0.0, 10.0, 10.0), grey())];
    let page = render_with(&graphics, &[], &RenderConfig::default());
    let config = RenderConfig::default().with_compress_content(true);

    let object = page.stream_object(&FlateCompressor, &config).unwrap();
    let Object::Stream { data, .. } = &object else {
        panic!("expected a stream object");
    };
    assert_eq!(inflate(data), page.content);

    let serialized = pdf_glyphs::writer::ObjectSerializer::new().serialize(&object);
    assert!(text_of(&serialized).contains("/Filter /FlateDecode"));
    assert_eq!(inflate(stream_data(&serialized)), page.content);
}

#[test]
fn test_unregistered_font_fails_scan() {
    let text = [TextOp::new("x", Point::new(0.0, 0.0), FontRef::custom("nope"), 10.0)];
    let mut fonts = FontCollection::new();
    assert!(matches!(fonts.scan(&[], &text), Err(Error::Font(_))));

    let text = [TextOp::new("x", Point::new(0.0, 0.0), FontRef::standard("Comic Sans"), 10.0)];
    assert!(matches!(fonts.scan(&[], &text), Err(Error::Font(_))));
}
