//! Visual building blocks shared by the exporters.
//!
//! Everything drawable implements [`Drawable`]: it knows its own size and
//! can render itself, centered on a position, into a [`LayeredOutput`].

mod layer;
mod link;
mod node;
mod stroke;
mod text;

pub use layer::{LayeredOutput, RenderLayer, SvgNode};
pub use link::Link;
pub use node::NodeShape;
pub use stroke::{StrokeCap, StrokeDefinition};
pub use text::{Text, TextDefinition};

use crate::geometry::Size;

/// Something that can be rendered centered on a point.
pub trait Drawable: std::fmt::Debug {
    /// Renders into layers with `position` as the center.
    fn render_to_layers(&self, position: crate::geometry::Point) -> LayeredOutput;

    /// Size of the rendered element.
    fn size(&self) -> Size;
}
