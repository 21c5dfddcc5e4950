//! Shape heuristics: container, text or stroke.

use std::collections::VecDeque;

use sketchmap_core::{geometry::Point, primitive::PrimitiveKind};

use super::components::Component;
use crate::config::ExtractConfig;

/// Fraction of the bounding box that is background sealed off by the ink.
///
/// Background is flooded from the bounding box border with 4-connectivity,
/// the dual of the 8-connected ink, so a diagonal gap still seals.
pub fn enclosure_ratio(component: &Component) -> f32 {
    let width = component.width() as usize;
    let height = component.height() as usize;
    let mut wall = vec![false; width * height];
    for &(x, y) in component.pixels() {
        let lx = (x - component.min_x()) as usize;
        let ly = (y - component.min_y()) as usize;
        wall[ly * width + lx] = true;
    }

    let mut reached = vec![false; width * height];
    let mut queue = VecDeque::new();
    let seed = |x: usize, y: usize, reached: &mut Vec<bool>, queue: &mut VecDeque<(usize, usize)>| {
        let idx = y * width + x;
        if !wall[idx] && !reached[idx] {
            reached[idx] = true;
            queue.push_back((x, y));
        }
    };

    for x in 0..width {
        seed(x, 0, &mut reached, &mut queue);
        seed(x, height - 1, &mut reached, &mut queue);
    }
    for y in 0..height {
        seed(0, y, &mut reached, &mut queue);
        seed(width - 1, y, &mut reached, &mut queue);
    }

    while let Some((x, y)) = queue.pop_front() {
        if x > 0 {
            seed(x - 1, y, &mut reached, &mut queue);
        }
        if x + 1 < width {
            seed(x + 1, y, &mut reached, &mut queue);
        }
        if y > 0 {
            seed(x, y - 1, &mut reached, &mut queue);
        }
        if y + 1 < height {
            seed(x, y + 1, &mut reached, &mut queue);
        }
    }

    let outside = reached.iter().filter(|&&r| r).count();
    let enclosed = width * height - outside - component.pixels().len();
    enclosed as f32 / (width * height) as f32
}

/// Classifies a component.
///
/// - `Blob`: large enough, seals off enough background, thin ink
/// - `TextCandidate`: not elongated, and dense or small
/// - `Stroke`: anything else
pub fn classify(component: &Component, config: &ExtractConfig) -> PrimitiveKind {
    let width = component.width();
    let height = component.height();
    let fill_ratio = component.area() as f32 / component.bbox_area() as f32;

    let large = width >= config.blob_min_size() && height >= config.blob_min_size();
    if large
        && fill_ratio < config.fill_ratio_threshold()
        && enclosure_ratio(component) >= config.enclosure_ratio()
    {
        return PrimitiveKind::Blob;
    }

    let aspect = width.max(height) as f32 / width.min(height) as f32;
    let compact = width <= config.text_max_size() && height <= config.text_max_size();
    if aspect <= config.text_max_aspect()
        && (fill_ratio >= config.fill_ratio_threshold() || compact)
    {
        return PrimitiveKind::TextCandidate;
    }

    PrimitiveKind::Stroke
}

/// The two far ends of a stroke.
///
/// Picks the farthest pair among the pixels extreme along the axes and both
/// diagonals. Pixel centers are used, so a one-pixel stroke has equal ends.
pub fn stroke_endpoints(component: &Component) -> (Point, Point) {
    let pixels = component.pixels();
    let mut extremes: [(u32, u32); 8] = [pixels[0]; 8];
    let keys: [fn((u32, u32)) -> i64; 4] = [
        |(x, _)| x as i64,
        |(_, y)| y as i64,
        |(x, y)| x as i64 + y as i64,
        |(x, y)| x as i64 - y as i64,
    ];

    for &pixel in pixels {
        for (k, key) in keys.iter().enumerate() {
            if key(pixel) < key(extremes[2 * k]) {
                extremes[2 * k] = pixel;
            }
            if key(pixel) > key(extremes[2 * k + 1]) {
                extremes[2 * k + 1] = pixel;
            }
        }
    }

    let center = |(x, y): (u32, u32)| Point::new(x as f32 + 0.5, y as f32 + 0.5);
    let mut best = (center(extremes[0]), center(extremes[1]));
    let mut best_distance = -1.0f32;
    for i in 0..extremes.len() {
        for j in (i + 1)..extremes.len() {
            let (a, b) = (center(extremes[i]), center(extremes[j]));
            let distance = a.distance(b);
            if distance > best_distance {
                best_distance = distance;
                best = (a, b);
            }
        }
    }
    best
}
