//! SketchMap core types
//!
//! This crate provides the foundational types shared by the sketch pipeline
//! and its exporters. It includes:
//!
//! - **Identifiers**: String-interned node identifiers ([`identifier::Id`])
//! - **Colors**: Hex color handling ([`color::Color`])
//! - **Geometry**: Points, sizes and bounds ([`geometry`] module)
//! - **Primitives**: Shapes detected in a sketch ([`primitive`] module)
//! - **Graph**: The mind-map graph model ([`graph`] module)
//! - **Style**: Presentation options ([`style::StyleOptions`])
//! - **Draw**: Visual definitions for nodes, links and labels ([`draw`] module)

pub mod color;
pub mod draw;
pub mod geometry;
pub mod graph;
pub mod identifier;
pub mod primitive;
pub mod style;
