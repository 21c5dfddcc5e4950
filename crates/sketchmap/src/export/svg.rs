//! SVG export.

use log::{debug, info};
use svg::{Document, node::element as svg_element};

use sketchmap_core::{
    draw::{Drawable, LayeredOutput, Link, NodeShape, RenderLayer},
    graph::Graph,
};

use super::{Error, Exporter, Theme, node_positions};

/// Renders the positioned graph as an SVG document of the canvas size.
pub struct SvgExporter {
    theme: Theme,
    width: f32,
    height: f32,
}

impl SvgExporter {
    /// Creates an exporter with a `width` by `height` view box.
    pub fn new(theme: Theme, width: f32, height: f32) -> Self {
        Self {
            theme,
            width,
            height,
        }
    }

    /// Builds the document: background, then links, then nodes, then labels.
    pub fn render_document(&self, graph: &Graph) -> Result<Document, Error> {
        let positions = node_positions(graph)?;
        let mut output = LayeredOutput::new();

        let background = svg_element::Rectangle::new()
            .set("x", 0)
            .set("y", 0)
            .set("width", self.width)
            .set("height", self.height)
            .set("fill", "white");
        output.add_to_layer(RenderLayer::Background, Box::new(background));

        for (source, target) in graph.edge_indices() {
            let link = Link::new(self.theme.link(), positions[source], positions[target]);
            output.merge(link.render_to_layers());
        }

        for (node, &position) in graph.nodes().zip(&positions) {
            let shape = NodeShape::new(
                self.theme.node_size(),
                self.theme.node_fill(),
                self.theme.label(),
                node.label(),
            );
            output.merge(shape.render_to_layers(position));
        }

        let mut doc = Document::new()
            .set("viewBox", (0, 0, self.width, self.height))
            .set("width", self.width)
            .set("height", self.height);
        for node in output.render() {
            doc = doc.add(node);
        }

        debug!(nodes = graph.node_count(), edges = graph.edge_count(); "SVG document rendered");
        Ok(doc)
    }
}

impl Exporter for SvgExporter {
    fn export(&self, graph: &Graph) -> Result<Vec<u8>, Error> {
        info!("Exporting SVG");
        let doc = self.render_document(graph)?;
        Ok(doc.to_string().into_bytes())
    }
}
