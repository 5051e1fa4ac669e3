//! Color and paint descriptions for drawing operations.

use serde::{Deserialize, Serialize};

/// RGB color with components in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red component
    pub r: f32,
    /// Green component
    pub g: f32,
    /// Blue component
    pub b: f32,
}

impl Color {
    /// Create a new RGB color.
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create a color from 8-bit components.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    /// Black.
    pub fn black() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// White.
    pub fn white() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// CMYK color with components in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CmykColor {
    /// Cyan
    pub c: f32,
    /// Magenta
    pub m: f32,
    /// Yellow
    pub y: f32,
    /// Black
    pub k: f32,
}

impl CmykColor {
    /// Create a new CMYK color.
    pub fn new(c: f32, m: f32, y: f32, k: f32) -> Self {
        Self { c, m, y, k }
    }
}

/// A color stop in a gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient (0.0 to 1.0)
    pub position: f32,
    /// Color at this position
    pub color: Color,
}

impl GradientStop {
    /// Create a new gradient stop.
    pub fn new(position: f32, color: Color) -> Self {
        Self {
            position: position.clamp(0.0, 1.0),
            color,
        }
    }
}

/// A gradient fill.
///
/// Page content is painted with a single flat color taken from the
/// middle stop; shading patterns are not generated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Gradient {
    /// Color stops, in ascending position order
    pub stops: Vec<GradientStop>,
}

impl Gradient {
    /// Create a gradient from stops.
    pub fn new(stops: Vec<GradientStop>) -> Self {
        Self { stops }
    }

    /// Add a stop.
    pub fn add_stop(mut self, position: f32, color: Color) -> Self {
        self.stops.push(GradientStop::new(position, color));
        self
    }

    /// The stop at index `len / 2`, used as the flat approximation.
    pub fn middle_color(&self) -> Option<Color> {
        self.stops.get(self.stops.len() / 2).map(|stop| stop.color)
    }
}

/// A color resolved to the operator family that paints it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PaintColor {
    /// DeviceRGB (`rg` / `RG`)
    Rgb(Color),
    /// DeviceCMYK (`k` / `K`)
    Cmyk(CmykColor),
}

/// Choose the color to paint with.
///
/// A gradient wins over a flat color, and CMYK wins over RGB. An empty
/// gradient is ignored.
pub fn resolve_color(
    rgb: Option<Color>,
    cmyk: Option<CmykColor>,
    gradient: Option<&Gradient>,
) -> Option<PaintColor> {
    if let Some(color) = gradient.and_then(Gradient::middle_color) {
        return Some(PaintColor::Rgb(color));
    }
    match (cmyk, rgb) {
        (Some(cmyk), _) => Some(PaintColor::Cmyk(cmyk)),
        (None, Some(rgb)) => Some(PaintColor::Rgb(rgb)),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmyk_beats_rgb() {
        let cmyk = CmykColor::new(0.0, 1.0, 1.0, 0.0);
        let resolved = resolve_color(Some(Color::black()), Some(cmyk), None);
        assert_eq!(resolved, Some(PaintColor::Cmyk(cmyk)));
    }

    #[test]
    fn test_gradient_beats_flat_fill() {
        let gradient = Gradient::default()
            .add_stop(0.0, Color::new(1.0, 0.0, 0.0))
            .add_stop(0.5, Color::new(0.0, 1.0, 0.0))
            .add_stop(1.0, Color::new(0.0, 0.0, 1.0));
        let resolved = resolve_color(
            Some(Color::black()),
            Some(CmykColor::new(0.0, 0.0, 0.0, 1.0)),
            Some(&gradient),
        );
        assert_eq!(resolved, Some(PaintColor::Rgb(Color::new(0.0, 1.0, 0.0))));
    }

    #[test]
    fn test_middle_stop_of_even_count() {
        let gradient = Gradient::default()
            .add_stop(0.0, Color::black())
            .add_stop(1.0, Color::white());
        assert_eq!(gradient.middle_color(), Some(Color::white()));
    }

    #[test]
    fn test_empty_gradient_falls_back() {
        let resolved = resolve_color(Some(Color::white()), None, Some(&Gradient::default()));
        assert_eq!(resolved, Some(PaintColor::Rgb(Color::white())));
        assert_eq!(resolve_color(None, None, None), None);
    }
}
