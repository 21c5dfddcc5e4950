//! Layer-based rendering for SVG output.
//!
//! Drawables push SVG nodes into a [`LayeredOutput`] tagged with a
//! [`RenderLayer`]; rendering sorts them so links always sit under nodes and
//! labels always sit on top, regardless of the order nodes and edges were
//! visited in.
//!
//! # Example
//!
//! ```
//! # use sketchmap_core::draw::{RenderLayer, LayeredOutput};
//! # use svg::node::element::{Circle, Line};
//! let mut output = LayeredOutput::new();
//! output.add_to_layer(RenderLayer::Node, Box::new(Circle::new()));
//! output.add_to_layer(RenderLayer::Link, Box::new(Line::new()));
//!
//! // Link group first, then node group
//! let svg_nodes = output.render();
//! assert_eq!(svg_nodes.len(), 2);
//! ```

use svg::node::element as svg_element;

/// Type alias for boxed SVG nodes.
pub type SvgNode = Box<dyn svg::Node>;

/// Rendering layers, bottom to top in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderLayer {
    /// Canvas background
    Background,
    /// Edges between nodes
    Link,
    /// Node circles
    Node,
    /// Node labels
    Text,
}

impl RenderLayer {
    /// Returns a human-readable name for this layer.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Background => "background",
            Self::Link => "link",
            Self::Node => "node",
            Self::Text => "text",
        }
    }
}

/// SVG nodes grouped by rendering layer.
#[derive(Debug, Default)]
pub struct LayeredOutput {
    items: Vec<(RenderLayer, SvgNode)>,
}

impl LayeredOutput {
    /// Creates a new empty `LayeredOutput`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a single node to the specified layer.
    pub fn add_to_layer(&mut self, layer: RenderLayer, node: SvgNode) {
        self.items.push((layer, node));
    }

    /// Merges all layers from another `LayeredOutput` into this one.
    pub fn merge(&mut self, other: LayeredOutput) {
        self.items.extend(other.items);
    }

    /// Returns `true` if there are no nodes in any layer.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Renders all layers to SVG groups, consuming the output.
    ///
    /// Each non-empty layer becomes one `<g data-layer="...">` element. Within
    /// a layer, nodes keep the order they were added in.
    pub fn render(mut self) -> Vec<SvgNode> {
        if self.is_empty() {
            return Vec::new();
        }

        // Stable sort keeps insertion order inside a layer
        self.items.sort_by_key(|(layer, _)| *layer);

        let mut result = Vec::new();
        let mut current_layer = self.items[0].0;
        let mut current_group = svg_element::Group::new().set("data-layer", current_layer.name());

        for (layer, node) in self.items {
            if layer != current_layer {
                result.push(Box::new(current_group) as SvgNode);
                current_layer = layer;
                current_group = svg_element::Group::new().set("data-layer", layer.name());
            }
            current_group = current_group.add(node);
        }

        result.push(Box::new(current_group) as SvgNode);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svg::node::element::{Circle, Line};

    #[test]
    fn test_layered_output_new() {
        assert!(LayeredOutput::new().is_empty());
        assert!(LayeredOutput::new().render().is_empty());
    }

    #[test]
    fn test_layered_output_orders_layers() {
        let mut output = LayeredOutput::new();
        output.add_to_layer(RenderLayer::Text, Box::new(Line::new()));
        output.add_to_layer(RenderLayer::Link, Box::new(Line::new()));

        let rendered: Vec<String> = output.render().iter().map(|n| n.to_string()).collect();
        assert_eq!(rendered.len(), 2);
        assert!(rendered[0].contains("data-layer=\"link\""));
        assert!(rendered[1].contains("data-layer=\"text\""));
    }

    #[test]
    fn test_layered_output_merge_same_layer() {
        let mut output1 = LayeredOutput::new();
        output1.add_to_layer(RenderLayer::Node, Box::new(Circle::new()));

        let mut output2 = LayeredOutput::new();
        output2.add_to_layer(RenderLayer::Node, Box::new(Circle::new()));

        output1.merge(output2);
        assert_eq!(output1.render().len(), 1);
    }
}
