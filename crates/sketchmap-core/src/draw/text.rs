//! Node label text: styling, measurement and rasterization.
//!
//! - [`TextDefinition`] - font family, size and color shared by all labels
//! - [`Text`] - a label ready to be drawn centered on a point
//!
//! SVG output only needs the attributes; raster output needs real glyphs, so
//! this module also owns the shared `cosmic-text` font system used to measure
//! and rasterize labels.

use std::sync::{Mutex, OnceLock};

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, SwashCache};
use log::info;
use svg::{self, node::Text as SvgText, node::element as svg_element};

use crate::{
    color::Color,
    draw::{Drawable, LayeredOutput, RenderLayer},
    geometry::{Point, Size},
};

/// Points to pixels at standard DPI.
const PT_TO_PX: f32 = 1.33;

/// Line height as a multiple of the font size.
const LINE_HEIGHT_FACTOR: f32 = 1.15;

/// Visual style for labels.
///
/// # Examples
///
/// ```
/// # use sketchmap_core::color::Color;
/// # use sketchmap_core::draw::TextDefinition;
/// let def = TextDefinition::new("Courier", 14).with_color(Color::from_hex("#ffffff").unwrap());
/// assert_eq!(def.font_family(), "Courier");
/// assert_eq!(def.font_size(), 14);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TextDefinition {
    font_family: String,
    font_size: u16,
    color: Option<Color>,
}

impl Default for TextDefinition {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size: 12,
            color: None,
        }
    }
}

impl TextDefinition {
    /// Creates a text definition with no color.
    pub fn new(font_family: &str, font_size: u16) -> Self {
        Self {
            font_family: font_family.to_string(),
            font_size,
            color: None,
        }
    }

    /// Sets the text fill color (builder style).
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Returns the font family name.
    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    /// Returns the font size in pixels.
    pub fn font_size(&self) -> u16 {
        self.font_size
    }

    /// Text fill color; `None` renders with the SVG default (black)
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    fn metrics(&self) -> Metrics {
        let font_size_px = self.font_size as f32 * PT_TO_PX;
        Metrics::new(font_size_px, font_size_px * LINE_HEIGHT_FACTOR)
    }
}

/// A label drawn centered on its position.
#[derive(Debug, Clone)]
pub struct Text<'a> {
    definition: &'a TextDefinition,
    content: &'a str,
}

impl<'a> Text<'a> {
    /// Creates a label for `content`.
    pub fn new(definition: &'a TextDefinition, content: &'a str) -> Self {
        Self {
            definition,
            content,
        }
    }

    /// Measured size of the rendered text in pixels.
    pub fn calculate_size(&self) -> Size {
        text_manager().calculate_text_size(self.content, self.definition)
    }

    /// Rasterizes the label centered on `position`.
    ///
    /// `paint` receives every covered pixel with its coverage-weighted RGBA
    /// color. Nothing is painted when no font is available.
    pub fn rasterize(&self, position: Point, paint: impl FnMut(i32, i32, [u8; 4])) {
        text_manager().rasterize(self.content, self.definition, position, paint);
    }
}

impl Drawable for Text<'_> {
    fn render_to_layers(&self, position: Point) -> LayeredOutput {
        let mut output = LayeredOutput::new();

        let mut rendered_text = svg_element::Text::new("")
            .set("x", position.x())
            .set("y", position.y())
            .set("text-anchor", "middle")
            .set("font-family", self.definition.font_family())
            .set("font-size", format!("{}px", self.definition.font_size()));

        if let Some(color) = self.definition.color() {
            rendered_text = rendered_text.set("fill", color);
        }

        // Text elements pretty-print their children, a tspan keeps the content inline
        let tspan = svg_element::TSpan::new("")
            .set("x", position.x())
            .set("dy", ".35em")
            .add(SvgText::new(self.content));
        rendered_text = rendered_text.add(tspan);
        output.add_to_layer(RenderLayer::Text, Box::new(rendered_text));
        output
    }

    fn size(&self) -> Size {
        self.calculate_size()
    }
}

/// Owns the font database and glyph cache.
///
/// Creating a `FontSystem` scans system fonts, so one instance is shared.
struct TextManager {
    font_system: Mutex<FontSystem>,
    swash_cache: Mutex<SwashCache>,
}

impl TextManager {
    fn new() -> Self {
        info!("Initializing FontSystem");
        Self {
            font_system: Mutex::new(FontSystem::new()),
            swash_cache: Mutex::new(SwashCache::new()),
        }
    }

    /// Measures text with real font metrics, falling back to an estimate
    /// when shaping produces no runs (e.g. no fonts installed).
    fn calculate_text_size(&self, text: &str, text_def: &TextDefinition) -> Size {
        if text.is_empty() {
            return Size::default();
        }

        let mut font_system = self
            .font_system
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let metrics = text_def.metrics();

        let mut buffer = Buffer::new(&mut font_system, metrics);
        let mut buffer = buffer.borrow_with(&mut font_system);
        let attrs = Attrs::new().family(Family::Name(text_def.font_family()));
        buffer.set_size(None, None);
        buffer.set_text(text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(true);

        let mut max_width: f32 = 0.0;
        let mut total_height: f32 = 0.0;
        for run in buffer.layout_runs() {
            if let Some(last) = run.glyphs.last() {
                max_width = max_width.max(last.x + last.w);
            }
            total_height += metrics.line_height;
        }

        if total_height == 0.0 {
            max_width = text.chars().count() as f32 * metrics.font_size * 0.55;
            total_height = metrics.line_height;
        }

        Size::new(max_width, total_height)
    }

    fn rasterize(
        &self,
        text: &str,
        text_def: &TextDefinition,
        center: Point,
        mut paint: impl FnMut(i32, i32, [u8; 4]),
    ) {
        if text.is_empty() {
            return;
        }

        let size = self.calculate_text_size(text, text_def);
        let origin_x = (center.x() - size.width() / 2.0).round() as i32;
        let origin_y = (center.y() - size.height() / 2.0).round() as i32;
        let [r, g, b, a] = text_def.color().unwrap_or_default().to_rgba8();

        let mut font_system = self
            .font_system
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut swash_cache = self
            .swash_cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut buffer = Buffer::new(&mut font_system, text_def.metrics());
        let mut buffer = buffer.borrow_with(&mut font_system);
        let attrs = Attrs::new().family(Family::Name(text_def.font_family()));
        buffer.set_size(None, None);
        buffer.set_text(text, &attrs, Shaping::Advanced, None);
        buffer.shape_until_scroll(true);

        buffer.draw(
            &mut swash_cache,
            cosmic_text::Color::rgba(r, g, b, a),
            |x, y, w, h, color| {
                let rgba = [color.r(), color.g(), color.b(), color.a()];
                for dy in 0..h as i32 {
                    for dx in 0..w as i32 {
                        paint(origin_x + x + dx, origin_y + y + dy, rgba);
                    }
                }
            },
        );
    }
}

static TEXT_MANAGER: OnceLock<TextManager> = OnceLock::new();

fn text_manager() -> &'static TextManager {
    TEXT_MANAGER.get_or_init(TextManager::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_definition_default() {
        let def = TextDefinition::default();
        assert_eq!(def.font_family(), "Arial");
        assert_eq!(def.font_size(), 12);
        assert!(def.color().is_none());
    }

    #[test]
    fn test_text_size_is_positive() {
        let def = TextDefinition::default();
        let size = Text::new(&def, "Main Idea").calculate_size();
        assert!(size.width() > 0.0);
        assert!(size.height() > 0.0);
    }

    #[test]
    fn test_empty_text_has_zero_size() {
        let def = TextDefinition::default();
        assert!(Text::new(&def, "").calculate_size().is_zero());
    }

    #[test]
    fn test_render_to_layers_centers_text() {
        let def = TextDefinition::new("Courier", 14).with_color(Color::from_hex("#ffffff").unwrap());
        let output = Text::new(&def, "Leaf").render_to_layers(Point::new(30.0, 40.0));
        let svg: String = output.render().iter().map(|n| n.to_string()).collect();

        assert!(svg.contains("text-anchor=\"middle\""));
        assert!(svg.contains("font-family=\"Courier\""));
        assert!(svg.contains("font-size=\"14px\""));
        assert!(svg.contains("fill=\"#ffffff\""));
        assert!(svg.contains(">Leaf</tspan>"));
        assert!(!svg.contains("\nLeaf"));
        assert!(svg.contains("dy=\".35em\""));
    }
}
