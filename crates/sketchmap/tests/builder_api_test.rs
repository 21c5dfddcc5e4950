//! Integration tests for the SketchPipeline API
//!
//! Sketches are drawn in memory with the `image` crate and run through the
//! public pipeline end to end.

use std::{io::Cursor, sync::Arc};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{GrayImage, ImageFormat, Luma};

use sketchmap::{
    SketchError, SketchPipeline,
    config::AppConfig,
    extract::TextRecognizer,
    geometry::{Bounds, Point},
    graph::Role,
    ingest::Bitmap,
    style::StyleOptions,
};

/// White canvas with helpers for pen-like marks.
struct Sketch {
    image: GrayImage,
}

impl Sketch {
    fn new(width: u32, height: u32) -> Self {
        Self {
            image: GrayImage::from_pixel(width, height, Luma([255])),
        }
    }

    fn paint(&mut self, inked: impl Fn(f32, f32) -> bool) -> &mut Self {
        let (width, height) = self.image.dimensions();
        for y in 0..height {
            for x in 0..width {
                if inked(x as f32 + 0.5, y as f32 + 0.5) {
                    self.image.put_pixel(x, y, Luma([20]));
                }
            }
        }
        self
    }

    fn ring(&mut self, cx: f32, cy: f32, radius: f32) -> &mut Self {
        self.paint(|x, y| ((x - cx).hypot(y - cy) - radius).abs() <= 1.5)
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32)) -> &mut Self {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let length_sq = dx * dx + dy * dy;
        self.paint(move |x, y| {
            let t = (((x - from.0) * dx + (y - from.1) * dy) / length_sq).clamp(0.0, 1.0);
            (x - from.0 - t * dx).hypot(y - from.1 - t * dy) <= 1.5
        })
    }

    /// A connector between two circles, leaving a gap at each end.
    fn connect(&mut self, a: (f32, f32, f32), b: (f32, f32, f32)) -> &mut Self {
        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let length = dx.hypot(dy);
        let (ux, uy) = (dx / length, dy / length);
        let gap = 10.0;
        self.line(
            (a.0 + ux * (a.2 + gap), a.1 + uy * (a.2 + gap)),
            (b.0 - ux * (b.2 + gap), b.1 - uy * (b.2 + gap)),
        )
    }

    fn block(&mut self, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        self.paint(|px, py| px >= x && px < x + width && py >= y && py < y + height)
    }

    fn speckle(&mut self, step: u32) -> &mut Self {
        let (width, height) = self.image.dimensions();
        for y in (0..height).step_by(step as usize) {
            for x in (0..width).step_by(step as usize) {
                self.image.put_pixel(x, y, Luma([0]));
            }
        }
        self
    }

    fn png(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("Failed to encode PNG");
        bytes
    }
}

const ROOT: (f32, f32, f32) = (300.0, 70.0, 40.0);
const LEFT: (f32, f32, f32) = (150.0, 200.0, 30.0);
const RIGHT: (f32, f32, f32) = (450.0, 200.0, 30.0);
const LEFT_LEAF: (f32, f32, f32) = (150.0, 330.0, 25.0);
const RIGHT_LEAF: (f32, f32, f32) = (450.0, 330.0, 25.0);

/// Root with two children, each with one child.
fn tree_sketch() -> Sketch {
    let mut sketch = Sketch::new(600, 400);
    for (cx, cy, r) in [ROOT, LEFT, RIGHT, LEFT_LEAF, RIGHT_LEAF] {
        sketch.ring(cx, cy, r);
    }
    sketch
        .connect(ROOT, LEFT)
        .connect(ROOT, RIGHT)
        .connect(LEFT, LEFT_LEAF)
        .connect(RIGHT, RIGHT_LEAF);
    sketch
}

/// Reads every region as the same word.
struct FixedRecognizer(&'static str);

impl TextRecognizer for FixedRecognizer {
    fn recognize(&self, _bitmap: &Bitmap, _region: Bounds) -> Option<String> {
        Some(self.0.to_string())
    }
}

#[test]
fn test_builder_api_exists() {
    let _pipeline = SketchPipeline::default();
    let _pipeline = SketchPipeline::new(AppConfig::default());
}

#[test]
fn test_tree_sketch_becomes_laid_out_tree() {
    let pipeline = SketchPipeline::default();
    let sketch = pipeline
        .process(&tree_sketch().png(), "image/png")
        .expect("Failed to process sketch");
    let graph = sketch.graph();

    assert_eq!(graph.node_count(), 5);
    assert_eq!(graph.edge_count(), 4);
    assert_eq!(graph.components().len(), 1);

    let root = graph.root().expect("Graph should have a root");
    assert_eq!(graph.out_degree(root.id()), 2);
    assert_eq!(graph.in_degree(root.id()), 0);
    for node in graph.nodes().filter(|node| node.id() != root.id()) {
        assert_eq!(graph.in_degree(node.id()), 1, "node {}", node.id());
        assert_ne!(node.role(), Role::Root);
    }

    assert!(sketch.is_stable(), "report: {:?}", sketch.report());
    let positions: Vec<Point> = graph.nodes().filter_map(|node| node.position()).collect();
    assert_eq!(positions.len(), 5);
    let min_gap = 2.0 * pipeline.config().style().node_size();
    for (i, a) in positions.iter().enumerate() {
        for b in &positions[i + 1..] {
            assert!(a.distance(*b) >= min_gap);
        }
    }
}

#[test]
fn test_edges_reference_existing_nodes() {
    let graph = SketchPipeline::default()
        .process(&tree_sketch().png(), "image/png")
        .expect("Failed to process sketch")
        .into_graph();

    for edge in graph.edges() {
        assert!(graph.contains_node(edge.source()));
        assert!(graph.contains_node(edge.target()));
    }
}

#[test]
fn test_unlabeled_containers_are_untitled() {
    let graph = SketchPipeline::default()
        .process(&tree_sketch().png(), "image/png")
        .expect("Failed to process sketch")
        .into_graph();
    assert!(graph.nodes().all(|node| node.label() == "Untitled"));
}

#[test]
fn test_recognized_text_labels_its_container() {
    let mut sketch = tree_sketch();
    sketch.block(290.0, 65.0, 20.0, 10.0);

    let pipeline =
        SketchPipeline::default().with_recognizer(Arc::new(FixedRecognizer("Goals")));
    let graph = pipeline
        .process(&sketch.png(), "image/png")
        .expect("Failed to process sketch")
        .into_graph();

    assert_eq!(graph.node_count(), 5);
    assert_eq!(graph.root().unwrap().label(), "Goals");
    assert_eq!(
        graph.nodes().filter(|node| node.label() == "Untitled").count(),
        4
    );
}

#[test]
fn test_noise_only_is_empty_sketch() {
    let mut sketch = Sketch::new(200, 200);
    sketch.speckle(9);

    let result = SketchPipeline::default().process(&sketch.png(), "image/png");
    assert!(matches!(result, Err(SketchError::EmptySketch)));

    let blank = Sketch::new(64, 64).png();
    let result = SketchPipeline::default().process(&blank, "image/png");
    assert!(matches!(result, Err(SketchError::EmptySketch)));
}

#[test]
fn test_processing_is_deterministic() {
    let bytes = tree_sketch().png();
    let pipeline = SketchPipeline::default();
    let first = pipeline.process(&bytes, "image/png").unwrap().into_graph();
    let second = pipeline.process(&bytes, "image/png").unwrap().into_graph();
    assert_eq!(first, second);
}

#[test]
fn test_json_round_trip() {
    let pipeline = SketchPipeline::default();
    let graph = pipeline
        .process(&tree_sketch().png(), "image/png")
        .unwrap()
        .into_graph();

    let json = pipeline.export_json(&graph).expect("Failed to export JSON");
    let restored = pipeline.import_json(&json).expect("Failed to import JSON");
    assert!(restored.approx_eq(&graph, 1e-3));
    assert_eq!(pipeline.export_json(&restored).unwrap(), json);
}

#[test]
fn test_render_svg_and_png() {
    let pipeline = SketchPipeline::default();
    let graph = pipeline
        .process(&tree_sketch().png(), "image/png")
        .unwrap()
        .into_graph();

    let svg = pipeline.render_svg(&graph).expect("Failed to render SVG");
    assert!(svg.contains("<svg"), "Output should contain SVG tag");
    assert!(svg.contains("</svg>"), "Output should be complete SVG");
    assert_eq!(svg.matches("<circle").count(), 5);
    assert_eq!(svg.matches("<line").count(), 4);

    let png = pipeline.render_png(&graph).expect("Failed to render PNG");
    let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (600, 400));
}

#[test]
fn test_invalid_style_is_rejected_before_rendering() {
    let defaults = SketchPipeline::default();
    let graph = defaults
        .process(&tree_sketch().png(), "image/png")
        .unwrap()
        .into_graph();

    for style in [
        StyleOptions::default().with_node_color("blue"),
        StyleOptions::default().with_link_color("#12345"),
        StyleOptions::default().with_node_size(50.0),
        StyleOptions::default().with_font_size(4),
    ] {
        let pipeline = SketchPipeline::new(AppConfig::default().with_style(style));
        assert!(matches!(
            pipeline.render_svg(&graph),
            Err(SketchError::Style(_))
        ));
    }
}

#[test]
fn test_data_url_matches_bytes() {
    let bytes = tree_sketch().png();
    let url = format!("data:image/png;base64,{}", STANDARD.encode(&bytes));

    let pipeline = SketchPipeline::default();
    let from_url = pipeline.ingest_data_url(&url).expect("Failed to ingest URL");
    let from_bytes = pipeline.ingest(&bytes, "image/png").unwrap();
    assert_eq!(from_url, from_bytes);
}

#[test]
fn test_ingest_errors() {
    let pipeline = SketchPipeline::default();
    assert!(matches!(
        pipeline.ingest(b"GIF89a", "image/webp"),
        Err(SketchError::UnsupportedFormat { .. })
    ));
    assert!(matches!(
        pipeline.ingest(b"not a png", "image/png"),
        Err(SketchError::Decode(_))
    ));
}
