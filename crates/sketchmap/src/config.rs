//! Configuration types for the sketch pipeline.
//!
//! Every stage reads its thresholds from a section of [`AppConfig`]. All types
//! implement [`serde::Deserialize`] with per-field defaults, so a partial TOML
//! file only overrides what it names.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining all sections.
//! - [`IngestConfig`] - Accepted MIME types and the payload ceiling.
//! - [`ExtractConfig`] - Binarization, noise and classification thresholds.
//! - [`InferConfig`] - Label attachment and edge detection distances.
//! - [`ForceSettings`] - Force simulation parameters and canvas size.
//! - [`StyleOptions`] - Presentation options, re-exported from `sketchmap-core`.
//!
//! # Example
//!
//! ```
//! # use sketchmap::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.ingest().max_bytes(), 5 * 1024 * 1024);
//! assert_eq!(config.layout().max_steps(), 300);
//! assert!(config.style().validate().is_ok());
//! ```

use serde::Deserialize;

pub use sketchmap_core::style::{FontFamily, StyleOptions};

/// Top-level configuration, one section per pipeline stage.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    ingest: IngestConfig,

    #[serde(default)]
    extract: ExtractConfig,

    #[serde(default)]
    infer: InferConfig,

    #[serde(default)]
    layout: ForceSettings,

    #[serde(default)]
    style: StyleOptions,
}

impl AppConfig {
    /// Returns the ingest configuration.
    pub fn ingest(&self) -> &IngestConfig {
        &self.ingest
    }

    /// Returns the extraction configuration.
    pub fn extract(&self) -> &ExtractConfig {
        &self.extract
    }

    /// Returns the inference configuration.
    pub fn infer(&self) -> &InferConfig {
        &self.infer
    }

    /// Returns the layout settings.
    pub fn layout(&self) -> &ForceSettings {
        &self.layout
    }

    /// Returns the style options.
    pub fn style(&self) -> &StyleOptions {
        &self.style
    }

    /// Replaces the ingest section (builder style).
    pub fn with_ingest(mut self, ingest: IngestConfig) -> Self {
        self.ingest = ingest;
        self
    }

    /// Replaces the extract section (builder style).
    pub fn with_extract(mut self, extract: ExtractConfig) -> Self {
        self.extract = extract;
        self
    }

    /// Replaces the infer section (builder style).
    pub fn with_infer(mut self, infer: InferConfig) -> Self {
        self.infer = infer;
        self
    }

    /// Replaces the layout section (builder style).
    pub fn with_layout(mut self, layout: ForceSettings) -> Self {
        self.layout = layout;
        self
    }

    /// Replaces the style section (builder style).
    pub fn with_style(mut self, style: StyleOptions) -> Self {
        self.style = style;
        self
    }
}

/// Accepted input formats and size ceiling.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Allowed MIME types, compared case-insensitively.
    allowed_formats: Vec<String>,

    /// Maximum payload size in bytes.
    max_bytes: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            allowed_formats: vec![
                "image/png".to_string(),
                "image/jpeg".to_string(),
                "image/gif".to_string(),
            ],
            max_bytes: 5 * 1024 * 1024,
        }
    }
}

impl IngestConfig {
    /// Creates an ingest configuration.
    pub fn new(allowed_formats: Vec<String>, max_bytes: usize) -> Self {
        Self {
            allowed_formats,
            max_bytes,
        }
    }

    /// Returns the accepted MIME types.
    pub fn allowed_formats(&self) -> &[String] {
        &self.allowed_formats
    }

    /// Returns the payload ceiling in bytes.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Sets the payload ceiling (builder style).
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

/// Thresholds for turning a bitmap into primitives.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Half-width of the local mean window.
    window_radius: u32,
    /// How far below the local mean a pixel must be to count as ink.
    threshold_offset: f32,
    /// Pixels at or above this luminance are never ink.
    background_level: u8,
    /// Components with fewer ink pixels are noise.
    min_area: u32,
    fill_ratio_threshold: f32,
    enclosure_ratio: f32,
    /// Smallest bounding box side of a container shape.
    blob_min_size: u32,
    text_max_size: u32,
    text_max_aspect: f32,
    /// Horizontal gap under which neighbouring text candidates merge.
    text_merge_gap: u32,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            window_radius: 7,
            threshold_offset: 10.0,
            background_level: 250,
            min_area: 12,
            fill_ratio_threshold: 0.35,
            enclosure_ratio: 0.25,
            blob_min_size: 24,
            text_max_size: 48,
            text_max_aspect: 4.0,
            text_merge_gap: 12,
        }
    }
}

impl ExtractConfig {
    /// Returns the local-mean window radius.
    pub fn window_radius(&self) -> u32 {
        self.window_radius
    }

    /// Returns how far below the local mean a pixel must be to count as ink.
    pub fn threshold_offset(&self) -> f32 {
        self.threshold_offset
    }

    /// Returns the luminance at or above which a pixel is always background.
    pub fn background_level(&self) -> u8 {
        self.background_level
    }

    /// Returns the minimum ink pixels of a kept component.
    pub fn min_area(&self) -> u32 {
        self.min_area
    }

    /// Returns the fill ratio separating outlines from solid marks.
    pub fn fill_ratio_threshold(&self) -> f32 {
        self.fill_ratio_threshold
    }

    /// Returns the share of enclosed background that makes a container.
    pub fn enclosure_ratio(&self) -> f32 {
        self.enclosure_ratio
    }

    /// Returns the minimum container side in pixels.
    pub fn blob_min_size(&self) -> u32 {
        self.blob_min_size
    }

    /// Returns the largest side of a small text candidate.
    pub fn text_max_size(&self) -> u32 {
        self.text_max_size
    }

    /// Returns the largest aspect ratio of a text candidate.
    pub fn text_max_aspect(&self) -> f32 {
        self.text_max_aspect
    }

    /// Returns the horizontal gap bridged when merging text.
    pub fn text_merge_gap(&self) -> u32 {
        self.text_merge_gap
    }

    /// Sets the noise floor (builder style).
    pub fn with_min_area(mut self, min_area: u32) -> Self {
        self.min_area = min_area;
        self
    }

    /// Sets the fill ratio separating text from containers (builder style).
    pub fn with_fill_ratio_threshold(mut self, threshold: f32) -> Self {
        self.fill_ratio_threshold = threshold;
        self
    }

    /// Sets the text merge gap (builder style).
    pub fn with_text_merge_gap(mut self, gap: u32) -> Self {
        self.text_merge_gap = gap;
        self
    }
}

/// Distances used to build the graph from primitives.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InferConfig {
    /// Maximum center distance between a text primitive and its container.
    label_distance: f32,
    /// Maximum distance between a stroke endpoint and a container's bounds.
    stroke_tolerance: f32,
}

impl Default for InferConfig {
    fn default() -> Self {
        Self {
            label_distance: 80.0,
            stroke_tolerance: 12.0,
        }
    }
}

impl InferConfig {
    /// Creates an inference configuration.
    pub fn new(label_distance: f32, stroke_tolerance: f32) -> Self {
        Self {
            label_distance,
            stroke_tolerance,
        }
    }

    /// Returns how far text may sit from a container's center.
    pub fn label_distance(&self) -> f32 {
        self.label_distance
    }

    /// Returns how close a stroke end must come to a container.
    pub fn stroke_tolerance(&self) -> f32 {
        self.stroke_tolerance
    }
}

/// Force simulation parameters.
///
/// Positions live on a canvas of `canvas_width` x `canvas_height` whose
/// center is the attraction point of the centering force.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ForceSettings {
    canvas_width: f32,
    canvas_height: f32,
    max_steps: usize,
    time_step: f32,
    spring_constant: f32,
    rest_length: f32,
    repulsion_constant: f32,
    /// Distance floor of the repulsion term.
    min_distance: f32,
    centering_strength: f32,
    damping: f32,
    max_speed: f32,
    /// Kinetic energy under which the simulation counts as converged.
    energy_threshold: f32,
}

impl Default for ForceSettings {
    fn default() -> Self {
        Self {
            canvas_width: 600.0,
            canvas_height: 400.0,
            max_steps: 300,
            time_step: 1.0,
            spring_constant: 0.05,
            rest_length: 100.0,
            repulsion_constant: 20_000.0,
            min_distance: 10.0,
            centering_strength: 0.01,
            damping: 0.85,
            max_speed: 50.0,
            energy_threshold: 0.01,
        }
    }
}

impl ForceSettings {
    /// Returns the canvas width.
    pub fn canvas_width(&self) -> f32 {
        self.canvas_width
    }

    /// Returns the canvas height.
    pub fn canvas_height(&self) -> f32 {
        self.canvas_height
    }

    /// Returns the step budget.
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Returns the integration time step.
    pub fn time_step(&self) -> f32 {
        self.time_step
    }

    /// Returns the spring constant.
    pub fn spring_constant(&self) -> f32 {
        self.spring_constant
    }

    /// Returns the spring rest length.
    pub fn rest_length(&self) -> f32 {
        self.rest_length
    }

    /// Returns the repulsion constant.
    pub fn repulsion_constant(&self) -> f32 {
        self.repulsion_constant
    }

    /// Returns the distance repulsion is clamped at.
    pub fn min_distance(&self) -> f32 {
        self.min_distance
    }

    /// Returns the pull toward the canvas center.
    pub fn centering_strength(&self) -> f32 {
        self.centering_strength
    }

    /// Returns the velocity damping factor.
    pub fn damping(&self) -> f32 {
        self.damping
    }

    /// Returns the speed limit per step.
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Returns the kinetic energy that counts as converged.
    pub fn energy_threshold(&self) -> f32 {
        self.energy_threshold
    }

    /// Sets the canvas size (builder style).
    pub fn with_canvas(mut self, width: f32, height: f32) -> Self {
        self.canvas_width = width;
        self.canvas_height = height;
        self
    }

    /// Sets the step budget (builder style).
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Sets the convergence threshold (builder style).
    pub fn with_energy_threshold(mut self, threshold: f32) -> Self {
        self.energy_threshold = threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let json = r##"{ "layout": { "max_steps": 50 }, "style": { "nodeColor": "#000" } }"##;
        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.layout().max_steps(), 50);
        assert_eq!(config.layout().rest_length(), 100.0);
        assert_eq!(config.style().node_size(), 20.0);
        assert_eq!(config.extract().min_area(), 12);
        assert_eq!(config.ingest().allowed_formats().len(), 3);
    }

    #[test]
    fn test_builders_replace_sections() {
        let config = AppConfig::default()
            .with_ingest(IngestConfig::default().with_max_bytes(10))
            .with_infer(InferConfig::new(40.0, 6.0));

        assert_eq!(config.ingest().max_bytes(), 10);
        assert_eq!(config.infer().label_distance(), 40.0);
        assert_eq!(config.infer().stroke_tolerance(), 6.0);
    }
}
