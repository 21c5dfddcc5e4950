//! Connected-component labeling of an ink mask.
//!
//! Ink pixels are joined with 8-connectivity through a union-find over ink
//! pixel ordinals. Components are returned in the raster order of their
//! first pixel.

use std::collections::HashMap;

use petgraph::unionfind::UnionFind;

use super::binarize::InkMask;

/// One connected group of ink pixels.
#[derive(Debug, Clone)]
pub struct Component {
    label: usize,
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    pixels: Vec<(u32, u32)>,
}

impl Component {
    fn new(label: usize, x: u32, y: u32) -> Self {
        Self {
            label,
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
            pixels: Vec::new(),
        }
    }

    fn push(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.pixels.push((x, y));
    }

    /// Raster order of the component's first pixel
    pub fn label(&self) -> usize {
        self.label
    }

    pub fn min_x(&self) -> u32 {
        self.min_x
    }

    pub fn min_y(&self) -> u32 {
        self.min_y
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    pub fn area(&self) -> u32 {
        self.pixels.len() as u32
    }

    pub fn bbox_area(&self) -> u32 {
        self.width() * self.height()
    }

    /// Ink pixels in raster order.
    pub fn pixels(&self) -> &[(u32, u32)] {
        &self.pixels
    }
}

/// Labels 8-connected ink regions.
pub fn label_components(mask: &InkMask) -> Vec<Component> {
    let width = mask.width();
    let height = mask.height();

    let mut ordinals: HashMap<(u32, u32), u32> = HashMap::new();
    let mut coords: Vec<(u32, u32)> = Vec::new();
    for y in 0..height {
        for x in 0..width {
            if mask.is_ink(x, y) {
                ordinals.insert((x, y), coords.len() as u32);
                coords.push((x, y));
            }
        }
    }

    let mut sets = UnionFind::<u32>::new(coords.len());
    for (ordinal, &(x, y)) in coords.iter().enumerate() {
        // Already-visited neighbours: west, north-west, north, north-east
        let neighbours = [
            (x.checked_sub(1), Some(y)),
            (x.checked_sub(1), y.checked_sub(1)),
            (Some(x), y.checked_sub(1)),
            (x.checked_add(1), y.checked_sub(1)),
        ];
        for (nx, ny) in neighbours {
            let (Some(nx), Some(ny)) = (nx, ny) else {
                continue;
            };
            if let Some(&other) = ordinals.get(&(nx, ny)) {
                sets.union(ordinal as u32, other);
            }
        }
    }

    let roots = sets.into_labeling();
    let mut by_root: HashMap<u32, usize> = HashMap::new();
    let mut components: Vec<Component> = Vec::new();
    for (&(x, y), root) in coords.iter().zip(roots) {
        let index = *by_root.entry(root).or_insert_with(|| {
            components.push(Component::new(components.len(), x, y));
            components.len() - 1
        });
        components[index].push(x, y);
    }

    components
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{extract::binarize::binarize, ingest::Bitmap};

    fn mask_from(rows: &[&str]) -> InkMask {
        let height = rows.len() as u32;
        let width = rows[0].len() as u32;
        let pixels = rows
            .iter()
            .flat_map(|row| row.bytes().map(|b| if b == b'#' { 0 } else { 255 }))
            .collect();
        binarize(&Bitmap::from_luma(width, height, pixels).unwrap(), 2, 10.0, 250)
    }

    #[test]
    fn test_diagonal_pixels_join() {
        let mask = mask_from(&["#....", ".#...", "..#..", ".....", "....."]);
        let components = label_components(&mask);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].area(), 3);
        assert_eq!(components[0].width(), 3);
    }

    #[test]
    fn test_separate_regions_in_raster_order() {
        let mask = mask_from(&["....#", "....#", ".....", "##...", "....."]);
        let components = label_components(&mask);
        assert_eq!(components.len(), 2);
        assert_eq!((components[0].min_x(), components[0].min_y()), (4, 0));
        assert_eq!(components[0].height(), 2);
        assert_eq!((components[1].min_x(), components[1].min_y()), (0, 3));
        assert_eq!(components[1].label(), 1);
    }

    #[test]
    fn test_u_shape_merges_late() {
        // Two arms only meet on the last row
        let mask = mask_from(&["#...#", "#...#", "#...#", "#####", "....."]);
        let components = label_components(&mask);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].area(), 11);
        assert_eq!(components[0].bbox_area(), 20);
    }
}
