//! Ink primitives detected in a sketch.
//!
//! A [`Primitive`] is one connected ink shape (or a merged block of text-like
//! shapes) described by its bounding region and a few shape statistics. The
//! extractor creates primitives; the inference engine consumes them once.
//! Primitives are immutable after construction.

use std::fmt;

use crate::geometry::{Bounds, Point};

/// Identifier of a primitive within one extraction run.
pub type PrimitiveId = u32;

/// Classification of a detected ink shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// An open line or curve, a candidate connector between two blobs.
    Stroke,
    /// A closed, container-like outline such as a drawn circle or box.
    Blob,
    /// A compact, dense shape that is probably handwriting.
    TextCandidate,
}

impl PrimitiveKind {
    /// Returns a human-readable name for this kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Stroke => "stroke",
            Self::Blob => "blob",
            Self::TextCandidate => "text",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A detected ink shape.
///
/// # Examples
///
/// ```
/// # use sketchmap_core::geometry::{Bounds, Point, Size};
/// # use sketchmap_core::primitive::{Primitive, PrimitiveKind};
/// let bounds = Bounds::new_from_top_left(Point::new(10.0, 10.0), Size::new(40.0, 30.0));
/// let blob = Primitive::new(0, PrimitiveKind::Blob, bounds, 180);
///
/// assert!(blob.is_blob());
/// assert_eq!(blob.center(), Point::new(30.0, 25.0));
/// assert!(blob.text().is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    id: PrimitiveId,
    kind: PrimitiveKind,
    bounds: Bounds,
    ink_area: u32,
    endpoints: Option<(Point, Point)>,
    text: Option<String>,
}

impl Primitive {
    /// Creates a primitive without endpoints or recognized text.
    pub fn new(id: PrimitiveId, kind: PrimitiveKind, bounds: Bounds, ink_area: u32) -> Self {
        Self {
            id,
            kind,
            bounds,
            ink_area,
            endpoints: None,
            text: None,
        }
    }

    /// Attaches the two endpoints of a stroke (builder style).
    ///
    /// Endpoints are stored top-most first, ties broken left-most first, so
    /// the same stroke always yields the same pair.
    pub fn with_endpoints(mut self, a: Point, b: Point) -> Self {
        let ordered = if (a.y(), a.x()) <= (b.y(), b.x()) {
            (a, b)
        } else {
            (b, a)
        };
        self.endpoints = Some(ordered);
        self
    }

    /// Attaches recognized text (builder style). Blank text is ignored.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.text = (!text.trim().is_empty()).then(|| text.trim().to_string());
        self
    }

    /// Returns the primitive identifier.
    pub fn id(&self) -> PrimitiveId {
        self.id
    }

    /// Returns the primitive kind.
    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    /// Bounding region in sketch pixel coordinates
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Number of ink pixels in the shape
    pub fn ink_area(&self) -> u32 {
        self.ink_area
    }

    /// Ink pixels divided by bounding-box area, in `[0, 1]`
    pub fn fill_ratio(&self) -> f32 {
        let area = self.bounds.area();
        if area <= 0.0 {
            return 0.0;
        }
        (self.ink_area as f32 / area).min(1.0)
    }

    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    /// Stroke endpoints, ordered top-most first
    pub fn endpoints(&self) -> Option<(Point, Point)> {
        self.endpoints
    }

    /// Recognized text, if any recognizer produced some
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_blob(&self) -> bool {
        self.kind == PrimitiveKind::Blob
    }

    pub fn is_stroke(&self) -> bool {
        self.kind == PrimitiveKind::Stroke
    }

    pub fn is_text(&self) -> bool {
        self.kind == PrimitiveKind::TextCandidate
    }
}
