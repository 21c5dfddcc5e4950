//! PNG export.
//!
//! Draws the same scene as the SVG backend straight into an RGBA buffer:
//! anti-aliased links and node circles, then labels rasterized with
//! `cosmic-text`.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use log::{debug, info};

use sketchmap_core::{
    color::Color,
    draw::Text,
    geometry::Point,
    graph::Graph,
};

use super::{Error, Exporter, Theme, node_positions};

const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Renders the positioned graph as a PNG of the canvas size.
pub struct PngExporter {
    theme: Theme,
    width: u32,
    height: u32,
}

impl PngExporter {
    /// Creates an exporter drawing on a `width` by `height` canvas.
    pub fn new(theme: Theme, width: u32, height: u32) -> Self {
        Self {
            theme,
            width,
            height,
        }
    }

    /// Draws the scene into an image buffer.
    pub fn render_image(&self, graph: &Graph) -> Result<RgbaImage, Error> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Render(format!(
                "canvas {}x{} has no pixels",
                self.width, self.height
            )));
        }

        let positions = node_positions(graph)?;
        let mut image = RgbaImage::from_pixel(self.width, self.height, PAPER);

        let link = self.theme.link();
        for (source, target) in graph.edge_indices() {
            draw_segment(
                &mut image,
                positions[source],
                positions[target],
                link.width(),
                link.color(),
                link.opacity(),
            );
        }

        for &position in &positions {
            draw_disc(&mut image, position, self.theme.node_size(), self.theme.node_fill());
        }

        for (node, &position) in graph.nodes().zip(&positions) {
            Text::new(self.theme.label(), node.label()).rasterize(position, |x, y, rgba| {
                let coverage = rgba[3] as f32 / 255.0;
                blend(&mut image, x, y, [rgba[0], rgba[1], rgba[2]], coverage);
            });
        }

        debug!(width = self.width, height = self.height; "Raster image rendered");
        Ok(image)
    }
}

impl Exporter for PngExporter {
    fn export(&self, graph: &Graph) -> Result<Vec<u8>, Error> {
        info!("Exporting PNG");
        let image = self.render_image(graph)?;

        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(Error::Encode)?;
        Ok(bytes)
    }
}

/// Source-over blend of `rgb` at `alpha` onto one pixel; off-canvas is ignored.
fn blend(image: &mut RgbaImage, x: i32, y: i32, rgb: [u8; 3], alpha: f32) {
    if x < 0 || y < 0 || x as u32 >= image.width() || y as u32 >= image.height() {
        return;
    }
    let alpha = alpha.clamp(0.0, 1.0);
    if alpha == 0.0 {
        return;
    }

    let pixel = image.get_pixel_mut(x as u32, y as u32);
    for channel in 0..3 {
        let under = pixel.0[channel] as f32;
        let over = rgb[channel] as f32;
        pixel.0[channel] = (over * alpha + under * (1.0 - alpha)).round() as u8;
    }
    pixel.0[3] = 255;
}

/// Pixel rectangle covering `min..=max`, clipped to the image.
fn pixel_span(image: &RgbaImage, min: Point, max: Point) -> (i32, i32, i32, i32) {
    let x0 = (min.x().floor() as i32).max(0);
    let y0 = (min.y().floor() as i32).max(0);
    let x1 = (max.x().ceil() as i32).min(image.width() as i32 - 1);
    let y1 = (max.y().ceil() as i32).min(image.height() as i32 - 1);
    (x0, y0, x1, y1)
}

fn draw_disc(image: &mut RgbaImage, center: Point, radius: f32, color: Color) {
    let [r, g, b, a] = color.to_rgba8();
    let reach = Point::new(radius + 1.0, radius + 1.0);
    let (x0, y0, x1, y1) = pixel_span(image, center.sub_point(reach), center.add_point(reach));

    for y in y0..=y1 {
        for x in x0..=x1 {
            let pixel_center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            let coverage = (radius + 0.5 - pixel_center.distance(center)).clamp(0.0, 1.0);
            blend(image, x, y, [r, g, b], coverage * a as f32 / 255.0);
        }
    }
}

fn draw_segment(image: &mut RgbaImage, from: Point, to: Point, width: f32, color: Color, opacity: f32) {
    let [r, g, b, a] = color.to_rgba8();
    let half_width = width / 2.0;
    let reach = half_width + 1.0;
    let min = Point::new(from.x().min(to.x()) - reach, from.y().min(to.y()) - reach);
    let max = Point::new(from.x().max(to.x()) + reach, from.y().max(to.y()) + reach);
    let (x0, y0, x1, y1) = pixel_span(image, min, max);

    let axis = to.sub_point(from);
    let length_sq = axis.x() * axis.x() + axis.y() * axis.y();

    for y in y0..=y1 {
        for x in x0..=x1 {
            let pixel_center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            let t = if length_sq == 0.0 {
                0.0
            } else {
                let rel = pixel_center.sub_point(from);
                ((rel.x() * axis.x() + rel.y() * axis.y()) / length_sq).clamp(0.0, 1.0)
            };
            let closest = from.add_point(axis.scale(t));
            let coverage = (half_width + 0.5 - pixel_center.distance(closest)).clamp(0.0, 1.0);
            blend(image, x, y, [r, g, b], coverage * opacity * a as f32 / 255.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use sketchmap_core::{graph::Node, identifier::Id, style::StyleOptions};

    use super::*;

    fn exporter() -> PngExporter {
        PngExporter::new(Theme::from_style(&StyleOptions::default()).unwrap(), 200, 100)
    }

    fn pair() -> Graph {
        let mut graph = Graph::new();
        graph.add_node(Node::new(Id::new("1"), "A").with_position(Point::new(40.0, 50.0)));
        graph.add_node(Node::new(Id::new("2"), "B").with_position(Point::new(160.0, 50.0)));
        graph.add_edge(Id::new("1"), Id::new("2")).unwrap();
        graph
    }

    #[test]
    fn test_node_and_link_pixels() {
        let image = exporter().render_image(&pair()).unwrap();
        assert_eq!(image.dimensions(), (200, 100));

        // Inside the first circle, away from the label
        assert_eq!(image.get_pixel(40, 35).0, [0x3b, 0x82, 0xf6, 255]);

        // Link midpoint is tinted but not opaque link color
        let link = image.get_pixel(100, 50).0;
        assert_ne!(link, PAPER.0);
        assert_ne!(link, [0x8b, 0x5c, 0xf6, 255]);

        // Corner stays paper
        assert_eq!(image.get_pixel(0, 0).0, PAPER.0);
    }

    #[test]
    fn test_png_bytes_decode() {
        let bytes = exporter().export(&pair()).unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 100));
    }

    #[test]
    fn test_off_canvas_nodes_are_clipped() {
        let mut graph = Graph::new();
        graph.add_node(Node::new(Id::new("1"), "Far").with_position(Point::new(-500.0, 900.0)));
        let image = exporter().render_image(&graph).unwrap();
        assert!(image.pixels().all(|pixel| *pixel == PAPER));
    }

    #[test]
    fn test_zero_canvas_is_rejected() {
        let exporter = PngExporter::new(Theme::from_style(&StyleOptions::default()).unwrap(), 0, 10);
        assert!(matches!(exporter.render_image(&pair()), Err(Error::Render(_))));
    }
}
