//! Stroke and shape extraction.
//!
//! Turns a [`Bitmap`] into an ordered list of [`Primitive`]s:
//!
//! 1. adaptive binarization against the local mean ([`binarize`])
//! 2. 8-connected component labeling ([`components`])
//! 3. noise rejection by ink area
//! 4. classification into containers, text and strokes ([`classify`])
//! 5. merging of text candidates that sit on one line
//! 6. optional text recognition through a [`TextRecognizer`]
//!
//! The result only depends on the bitmap and the configuration.

mod binarize;
mod classify;
mod components;

use log::{debug, info, trace};

use sketchmap_core::{
    geometry::{Bounds, Point, Size},
    primitive::{Primitive, PrimitiveKind},
};

use crate::{config::ExtractConfig, error::SketchError, ingest::Bitmap};

use components::Component;

/// Reads the text inside a region of the sketch.
///
/// Implementations must be deterministic for the extraction to stay
/// deterministic.
pub trait TextRecognizer: Send + Sync {
    /// Returns the text in `region`, or `None` when nothing is legible.
    fn recognize(&self, bitmap: &Bitmap, region: Bounds) -> Option<String>;
}

/// Recognizes nothing; every text candidate stays unlabeled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRecognizer;

impl TextRecognizer for NoRecognizer {
    fn recognize(&self, _bitmap: &Bitmap, _region: Bounds) -> Option<String> {
        None
    }
}

/// A classified region before ids are assigned.
#[derive(Debug, Clone)]
struct Region {
    kind: PrimitiveKind,
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    ink_area: u32,
    endpoints: Option<(Point, Point)>,
    label: usize,
}

impl Region {
    fn from_component(component: &Component, kind: PrimitiveKind) -> Self {
        let endpoints =
            (kind == PrimitiveKind::Stroke).then(|| classify::stroke_endpoints(component));
        Self {
            kind,
            min_x: component.min_x(),
            min_y: component.min_y(),
            max_x: component.min_x() + component.width() - 1,
            max_y: component.min_y() + component.height() - 1,
            ink_area: component.area(),
            endpoints,
            label: component.label(),
        }
    }

    fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    fn bounds(&self) -> Bounds {
        Bounds::new_from_top_left(
            Point::new(self.min_x as f32, self.min_y as f32),
            Size::new(
                (self.max_x - self.min_x + 1) as f32,
                (self.max_y - self.min_y + 1) as f32,
            ),
        )
    }

    /// Same text line, and at most `gap` pixels apart horizontally.
    fn is_text_neighbour(&self, other: &Region, gap: u32) -> bool {
        let overlap_top = self.min_y.max(other.min_y);
        let overlap_bottom = self.max_y.min(other.max_y);
        if overlap_top > overlap_bottom {
            return false;
        }
        let overlap = overlap_bottom - overlap_top + 1;
        if overlap * 2 < self.height().min(other.height()) {
            return false;
        }

        let left_end = self.max_x.min(other.max_x);
        let right_start = self.min_x.max(other.min_x);
        right_start <= left_end || right_start - left_end - 1 <= gap
    }

    fn absorb(&mut self, other: Region) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
        self.ink_area += other.ink_area;
        self.label = self.label.min(other.label);
    }
}

/// Merges text candidates on the same line into blocks.
///
/// Candidates are swept left to right. A block stays open while a later
/// candidate could still start within `gap` pixels of its right edge, so each
/// candidate is only compared against the blocks near it.
fn merge_text_lines(mut texts: Vec<Region>, gap: u32) -> Vec<Region> {
    texts.sort_by_key(|text| (text.min_x, text.min_y, text.label));

    let mut closed = Vec::with_capacity(texts.len());
    let mut open: Vec<Region> = Vec::new();
    for text in texts {
        let (reachable, finished): (Vec<Region>, Vec<Region>) = open
            .drain(..)
            .partition(|block| block.max_x.saturating_add(gap).saturating_add(1) >= text.min_x);
        closed.extend(finished);
        open = reachable;

        let mut merged = text;
        // A grown block may now reach blocks it missed before
        while let Some(idx) = open
            .iter()
            .position(|block| block.is_text_neighbour(&merged, gap))
        {
            merged.absorb(open.swap_remove(idx));
        }
        open.push(merged);
    }
    closed.extend(open);
    closed
}

/// Extracts primitives from a bitmap.
///
/// Primitive ids follow reading order of the bounding boxes (top, then
/// left, then discovery order), starting at 0.
///
/// # Errors
///
/// Returns [`SketchError::EmptySketch`] when no component survives noise
/// rejection.
pub fn extract(
    bitmap: &Bitmap,
    config: &ExtractConfig,
    recognizer: &dyn TextRecognizer,
) -> Result<Vec<Primitive>, SketchError> {
    info!(width = bitmap.width(), height = bitmap.height(); "Extracting primitives");

    let mask = binarize::binarize(
        bitmap,
        config.window_radius(),
        config.threshold_offset(),
        config.background_level(),
    );
    let components = components::label_components(&mask);
    debug!(
        ink_pixels = mask.ink_count(),
        components = components.len();
        "Labeled ink components"
    );

    let mut regions = Vec::new();
    let mut texts = Vec::new();
    let mut noise = 0usize;
    for component in &components {
        if component.area() < config.min_area() {
            noise += 1;
            continue;
        }
        let kind = classify::classify(component, config);
        trace!(
            label = component.label(),
            kind:% = kind,
            area = component.area(),
            width = component.width(),
            height = component.height();
            "Classified component"
        );
        let region = Region::from_component(component, kind);
        if kind == PrimitiveKind::TextCandidate {
            texts.push(region);
        } else {
            regions.push(region);
        }
    }

    let text_count = texts.len();
    regions.extend(merge_text_lines(texts, config.text_merge_gap()));
    debug!(
        noise,
        text_candidates = text_count,
        surviving = regions.len();
        "Filtered components"
    );

    if regions.is_empty() {
        return Err(SketchError::EmptySketch);
    }

    regions.sort_by_key(|region| (region.min_y, region.min_x, region.label));

    let primitives: Vec<Primitive> = regions
        .into_iter()
        .enumerate()
        .map(|(idx, region)| {
            let bounds = region.bounds();
            let mut primitive = Primitive::new(idx as u32, region.kind, bounds, region.ink_area);
            if let Some((a, b)) = region.endpoints {
                primitive = primitive.with_endpoints(a, b);
            }
            if region.kind == PrimitiveKind::TextCandidate {
                if let Some(text) = recognizer.recognize(bitmap, bounds) {
                    primitive = primitive.with_text(text);
                }
            }
            primitive
        })
        .collect();

    info!(primitives = primitives.len(); "Primitives extracted");
    Ok(primitives)
}
