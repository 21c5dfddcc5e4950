//! Straight link between two node centers.

use svg::node::element as svg_element;

use crate::{
    apply_stroke,
    draw::{LayeredOutput, RenderLayer, StrokeDefinition},
    geometry::Point,
};

/// A straight line segment drawn with a [`StrokeDefinition`].
#[derive(Debug, Clone)]
pub struct Link<'a> {
    stroke: &'a StrokeDefinition,
    from: Point,
    to: Point,
}

impl<'a> Link<'a> {
    /// Creates a link between two points.
    pub fn new(stroke: &'a StrokeDefinition, from: Point, to: Point) -> Self {
        Self { stroke, from, to }
    }

    pub fn stroke(&self) -> &StrokeDefinition {
        self.stroke
    }

    pub fn from(&self) -> Point {
        self.from
    }

    pub fn to(&self) -> Point {
        self.to
    }

    pub fn length(&self) -> f32 {
        self.from.distance(self.to)
    }

    /// Renders the line on [`RenderLayer::Link`].
    pub fn render_to_layers(&self) -> LayeredOutput {
        let mut output = LayeredOutput::new();
        let line = svg_element::Line::new()
            .set("x1", self.from.x())
            .set("y1", self.from.y())
            .set("x2", self.to.x())
            .set("y2", self.to.y());
        output.add_to_layer(RenderLayer::Link, Box::new(apply_stroke!(line, self.stroke)));
        output
    }
}
