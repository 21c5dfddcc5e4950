//! Node shape: a filled circle with its label centered on top.

use svg::node::element as svg_element;

use crate::{
    color::Color,
    draw::{Drawable, LayeredOutput, RenderLayer, Text, TextDefinition},
    geometry::{Point, Size},
};

/// A mind-map node ready to draw.
///
/// The circle goes on [`RenderLayer::Node`] and the label on
/// [`RenderLayer::Text`], so labels are never hidden by neighbouring circles.
#[derive(Debug, Clone)]
pub struct NodeShape<'a> {
    radius: f32,
    fill: Color,
    label: Text<'a>,
}

impl<'a> NodeShape<'a> {
    /// Creates a node shape with a centered label.
    pub fn new(radius: f32, fill: Color, text_def: &'a TextDefinition, label: &'a str) -> Self {
        Self {
            radius,
            fill,
            label: Text::new(text_def, label),
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn fill(&self) -> Color {
        self.fill
    }

    pub fn label(&self) -> &Text<'a> {
        &self.label
    }
}

impl Drawable for NodeShape<'_> {
    fn render_to_layers(&self, position: Point) -> LayeredOutput {
        let mut output = LayeredOutput::new();

        let circle = svg_element::Circle::new()
            .set("cx", position.x())
            .set("cy", position.y())
            .set("r", self.radius)
            .set("fill", self.fill);
        output.add_to_layer(RenderLayer::Node, Box::new(circle));

        output.merge(self.label.render_to_layers(position));
        output
    }

    fn size(&self) -> Size {
        let diameter = self.radius * 2.0;
        Size::new(diameter, diameter)
    }
}
