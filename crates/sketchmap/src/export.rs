//! Export of positioned graphs.
//!
//! Every backend implements [`Exporter`] and renders into memory:
//!
//! - [`svg::SvgExporter`] - vector document
//! - [`raster::PngExporter`] - PNG image
//! - [`dump::DumpExporter`] - structured JSON dump, the round-trip format

pub mod dump;
pub mod raster;
pub mod svg;

use std::fmt;

use sketchmap_core::{
    color::Color,
    draw::{StrokeCap, StrokeDefinition, TextDefinition},
    geometry::Point,
    graph::Graph,
    style::{StyleError, StyleOptions},
};

/// Link stroke opacity.
const LINK_OPACITY: f32 = 0.6;

/// Link stroke width.
const LINK_WIDTH: f32 = 2.0;

/// Label color drawn on top of node circles.
const LABEL_COLOR: &str = "#ffffff";

/// A single exporter trait shared by all output formats
pub trait Exporter {
    /// Renders a fully positioned graph to the output format's bytes.
    fn export(&self, graph: &Graph) -> Result<Vec<u8>, Error>;
}

/// Why an export failed.
#[derive(Debug)]
pub enum Error {
    Render(String),
    Encode(image::ImageError),
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Render(msg) => write!(f, "Render error: {msg}"),
            Self::Encode(err) => write!(f, "Image encoding error: {err}"),
            Self::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Render(_) => None,
            Self::Encode(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

/// Style options resolved into drawing definitions.
#[derive(Debug, Clone)]
pub struct Theme {
    node_size: f32,
    node_fill: Color,
    link: StrokeDefinition,
    label: TextDefinition,
}

impl Theme {
    /// Validates `style` and resolves it.
    ///
    /// # Errors
    ///
    /// Returns the first invalid option.
    pub fn from_style(style: &StyleOptions) -> Result<Self, StyleError> {
        style.validate()?;
        let label_color = Color::from_hex(LABEL_COLOR).map_err(|message| StyleError::InvalidColor {
            field: "labelColor",
            message,
        })?;

        Ok(Self {
            node_size: style.node_size(),
            node_fill: style.node_color()?,
            link: StrokeDefinition::new(style.link_color()?, LINK_WIDTH)
                .with_opacity(LINK_OPACITY)
                .with_cap(StrokeCap::Round),
            label: TextDefinition::new(style.font_family().name(), style.font_size())
                .with_color(label_color),
        })
    }

    /// Returns the node radius.
    pub fn node_size(&self) -> f32 {
        self.node_size
    }

    /// Returns the node fill color.
    pub fn node_fill(&self) -> Color {
        self.node_fill
    }

    /// Returns the link stroke.
    pub fn link(&self) -> &StrokeDefinition {
        &self.link
    }

    /// Returns the label text definition.
    pub fn label(&self) -> &TextDefinition {
        &self.label
    }
}

/// Node positions in insertion order.
///
/// Fails when the layout has not run yet.
fn node_positions(graph: &Graph) -> Result<Vec<Point>, Error> {
    graph
        .nodes()
        .map(|node| {
            node.position()
                .ok_or_else(|| Error::Render(format!("node `{}` has no position", node.id())))
        })
        .collect()
}
