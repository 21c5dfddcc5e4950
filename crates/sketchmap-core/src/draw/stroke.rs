//! Stroke definitions for links.
//!
//! [`StrokeDefinition`] carries what both exporters need to draw a line:
//! color, width and opacity. The [`apply_stroke!`](crate::apply_stroke!)
//! macro copies it onto any SVG element.
//!
//! ```
//! use sketchmap_core::color::Color;
//! use sketchmap_core::draw::StrokeDefinition;
//! use svg::node::element as svg_element;
//!
//! let stroke = StrokeDefinition::new(Color::from_hex("#8b5cf6").unwrap(), 2.0)
//!     .with_opacity(0.6);
//! let line = sketchmap_core::apply_stroke!(svg_element::Line::new(), &stroke);
//! assert!(line.to_string().contains("stroke-opacity"));
//! ```

use crate::color::Color;

/// Defines how line endpoints are rendered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StrokeCap {
    #[default]
    Butt,
    Round,
}

impl StrokeCap {
    /// Returns the SVG stroke-linecap value
    pub fn to_svg_value(&self) -> &'static str {
        match self {
            Self::Butt => "butt",
            Self::Round => "round",
        }
    }
}

/// Color, width and opacity of a line.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeDefinition {
    color: Color,
    width: f32,
    opacity: f32,
    cap: StrokeCap,
}

impl Default for StrokeDefinition {
    fn default() -> Self {
        Self {
            color: Color::default(),
            width: 1.0,
            opacity: 1.0,
            cap: StrokeCap::Butt,
        }
    }
}

impl StrokeDefinition {
    /// Creates an opaque stroke with the given color and width.
    pub fn new(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            ..Self::default()
        }
    }

    /// Sets the opacity, clamped to `[0, 1]` (builder style).
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Sets the line cap (builder style).
    pub fn with_cap(mut self, cap: StrokeCap) -> Self {
        self.cap = cap;
        self
    }

    /// Returns the stroke color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Returns the stroke width.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Returns the stroke opacity.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Returns the line cap.
    pub fn cap(&self) -> StrokeCap {
        self.cap
    }
}

/// Applies all stroke attributes of a [`StrokeDefinition`] to an SVG element.
#[macro_export]
macro_rules! apply_stroke {
    ($element:expr, $stroke:expr) => {{
        $element
            .set("stroke", $stroke.color().to_hex())
            .set("stroke-opacity", $stroke.opacity())
            .set("stroke-width", $stroke.width())
            .set("stroke-linecap", $stroke.cap().to_svg_value())
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_default() {
        let stroke = StrokeDefinition::default();
        assert_eq!(stroke.width(), 1.0);
        assert_eq!(stroke.opacity(), 1.0);
        assert_eq!(stroke.cap(), StrokeCap::Butt);
    }

    #[test]
    fn test_opacity_is_clamped() {
        let stroke = StrokeDefinition::default().with_opacity(1.7);
        assert_eq!(stroke.opacity(), 1.0);
        let stroke = stroke.with_opacity(-0.2);
        assert_eq!(stroke.opacity(), 0.0);
    }

    #[test]
    fn test_apply_stroke_sets_attributes() {
        let stroke = StrokeDefinition::new(Color::from_hex("#ff0000").unwrap(), 2.0)
            .with_cap(StrokeCap::Round);
        let line = apply_stroke!(svg::node::element::Line::new(), &stroke).to_string();
        assert!(line.contains("stroke=\"#ff0000\""));
        assert!(line.contains("stroke-width=\"2\""));
        assert!(line.contains("stroke-linecap=\"round\""));
    }
}
