//! SketchMap - turns a photo or scan of a hand-drawn mind map into a clean,
//! laid-out graph.
//!
//! The pipeline runs in fixed stages: ingest the image, extract shape
//! primitives, infer a graph of labeled nodes and directed edges, lay it out
//! with a deterministic force simulation, and export it as SVG, PNG or a
//! structured JSON dump. [`session::Session`] wraps the pipeline for callers
//! that submit sketches repeatedly and only care about the newest result.

pub mod config;
pub mod error;
pub mod export;
pub mod extract;
pub mod infer;
pub mod ingest;
pub mod layout;
pub mod project;
pub mod session;

pub use sketchmap_core::{color, draw, geometry, graph, identifier, primitive, style};

pub use error::SketchError;

use std::sync::Arc;

use log::{debug, info, trace};

use sketchmap_core::{graph::Graph, primitive::Primitive};

use config::AppConfig;
use export::{
    Exporter, Theme,
    dump::{Dump, DumpExporter},
    raster::PngExporter,
    svg::SvgExporter,
};
use extract::{NoRecognizer, TextRecognizer};
use ingest::Bitmap;
use layout::{Engine, LayoutReport};

/// Builder for running sketches through the pipeline.
///
/// # Examples
///
/// ```rust,no_run
/// use sketchmap::{SketchPipeline, config::AppConfig};
///
/// let bytes = std::fs::read("whiteboard.png").expect("Failed to read");
///
/// let pipeline = SketchPipeline::new(AppConfig::default());
/// let sketch = pipeline.process(&bytes, "image/png").expect("Failed to process");
///
/// let svg = pipeline.render_svg(sketch.graph()).expect("Failed to render");
/// println!("{svg}");
/// ```
#[derive(Clone)]
pub struct SketchPipeline {
    config: AppConfig,
    recognizer: Arc<dyn TextRecognizer>,
}

impl Default for SketchPipeline {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl SketchPipeline {
    /// Creates a pipeline that leaves text unrecognized.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            recognizer: Arc::new(NoRecognizer),
        }
    }

    /// Uses `recognizer` to read text candidates.
    pub fn with_recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.recognizer = recognizer;
        self
    }

    /// Returns the pipeline configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Validates and decodes an uploaded image.
    ///
    /// # Errors
    ///
    /// Returns an ingest error for an unsupported format, an oversized
    /// payload or undecodable bytes.
    pub fn ingest(&self, bytes: &[u8], mime: &str) -> Result<Bitmap, SketchError> {
        ingest::ingest(bytes, mime, self.config.ingest())
    }

    /// Same as [`Self::ingest`] for a `data:` URL.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::Decode`] for a malformed URL, otherwise as
    /// [`Self::ingest`].
    pub fn ingest_data_url(&self, url: &str) -> Result<Bitmap, SketchError> {
        ingest::ingest_data_url(url, self.config.ingest())
    }

    /// Segments the bitmap into primitives.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::EmptySketch`] when nothing but noise is found.
    pub fn extract(&self, bitmap: &Bitmap) -> Result<Vec<Primitive>, SketchError> {
        extract::extract(bitmap, self.config.extract(), self.recognizer.as_ref())
    }

    /// Builds the unpositioned graph.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::EmptySketch`] when no node can be formed.
    pub fn infer(&self, primitives: &[Primitive]) -> Result<Graph, SketchError> {
        infer::infer(primitives, self.config.infer())
    }

    /// Positions every node of `graph`.
    pub fn layout(&self, graph: &mut Graph) -> LayoutReport {
        Engine::new(self.config.layout().clone(), self.config.style().node_size()).apply(graph)
    }

    /// Runs ingest, extraction, inference and layout.
    ///
    /// # Errors
    ///
    /// Returns the first stage error.
    pub fn process(&self, bytes: &[u8], mime: &str) -> Result<ProcessedSketch, SketchError> {
        info!(mime, size = bytes.len(); "Processing sketch");

        let bitmap = self.ingest(bytes, mime)?;
        let primitives = self.extract(&bitmap)?;
        debug!(primitives = primitives.len(); "Primitives extracted");
        trace!(primitives:?; "Extracted primitives");

        let mut graph = self.infer(&primitives)?;
        let report = self.layout(&mut graph);

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            converged = report.converged();
            "Sketch processed"
        );
        Ok(ProcessedSketch { graph, report })
    }

    /// Renders a positioned graph to an SVG string.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::Style`] for invalid style options and
    /// [`SketchError::Export`] for an unpositioned graph.
    pub fn render_svg(&self, graph: &Graph) -> Result<String, SketchError> {
        let layout = self.config.layout();
        let exporter = SvgExporter::new(
            self.theme()?,
            layout.canvas_width(),
            layout.canvas_height(),
        );
        let bytes = exporter.export(graph)?;
        String::from_utf8(bytes)
            .map_err(|err| SketchError::Export(export::Error::Render(err.to_string())))
    }

    /// Renders a positioned graph to PNG bytes.
    ///
    /// # Errors
    ///
    /// As [`Self::render_svg`], plus encoding failures.
    pub fn render_png(&self, graph: &Graph) -> Result<Vec<u8>, SketchError> {
        let layout = self.config.layout();
        let exporter = PngExporter::new(
            self.theme()?,
            layout.canvas_width().round().max(0.0) as u32,
            layout.canvas_height().round().max(0.0) as u32,
        );
        Ok(exporter.export(graph)?)
    }

    /// Serializes a positioned graph as the structured JSON dump.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::Export`] for an unpositioned graph.
    pub fn export_json(&self, graph: &Graph) -> Result<String, SketchError> {
        Ok(Dump::from_graph(graph)?.to_json()?)
    }

    /// Rebuilds a graph from a structured JSON dump.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::Dump`] for malformed JSON.
    pub fn import_json(&self, json: &str) -> Result<Graph, SketchError> {
        Ok(Dump::from_json(json)?.into_graph())
    }

    /// Writes `graph` with the dump exporter; used by the CLI for `.json` output.
    ///
    /// # Errors
    ///
    /// As [`Self::export_json`].
    pub fn render_json(&self, graph: &Graph) -> Result<Vec<u8>, SketchError> {
        Ok(DumpExporter.export(graph)?)
    }

    fn theme(&self) -> Result<Theme, SketchError> {
        Ok(Theme::from_style(self.config.style())?)
    }
}

/// A laid-out graph together with its layout report.
#[derive(Debug, Clone)]
pub struct ProcessedSketch {
    graph: Graph,
    report: LayoutReport,
}

impl ProcessedSketch {
    /// Returns the positioned graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Returns the layout report.
    pub fn report(&self) -> &LayoutReport {
        &self.report
    }

    /// Whether the layout settled within its step budget.
    pub fn is_stable(&self) -> bool {
        self.report.converged()
    }

    /// Consumes the result, returning the graph.
    pub fn into_graph(self) -> Graph {
        self.graph
    }
}
