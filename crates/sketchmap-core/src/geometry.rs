//! Geometric primitives for sketch analysis and graph layout.
//!
//! This module provides the fundamental geometric types shared by the
//! extractor (pixel-space bounding regions), the inference engine (proximity
//! tests) and the layout engine (node positions).
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - An axis-aligned rectangle defined by minimum and maximum coordinates
//!
//! # Coordinate System
//!
//! SketchMap uses the image/SVG coordinate system everywhere:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! Sketch pixels, layout positions and exported documents all share it, so no
//! axis flipping happens between pipeline stages.

/// A 2D point.
///
/// # Examples
///
/// ```
/// # use sketchmap_core::geometry::Point;
/// let p1 = Point::new(10.0, 20.0);
/// let p2 = Point::new(5.0, 5.0);
///
/// let sum = p1.add_point(p2);
/// assert_eq!(sum.x(), 15.0);
/// assert_eq!(sum.y(), 25.0);
///
/// assert_eq!(Point::new(3.0, 4.0).hypot(), 5.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Checks that both coordinates are finite numbers
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Adds another point to this point, returning a new point.
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Calculates the hypotenuse (Euclidean distance from origin)
    pub fn hypot(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance between two points
    pub fn distance(self, other: Point) -> f32 {
        self.sub_point(other).hypot()
    }

    /// Multiplies both coordinates by the given factor.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sketchmap_core::geometry::Point;
    /// let point = Point::new(10.0, 20.0);
    ///
    /// let halved = point.scale(0.5);
    /// assert_eq!(halved.x(), 5.0);
    /// assert_eq!(halved.y(), 10.0);
    /// ```
    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    /// Creates a new size.
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns true if both width and height are zero
    pub fn is_zero(self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

/// Represents a rectangular bounding box with minimum and maximum coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates a new bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the area of the bounds
    pub fn area(self) -> f32 {
        self.width() * self.height()
    }

    /// Checks whether a point lies inside the bounds, edges included
    pub fn contains(self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    /// Distance from a point to the closest point of the bounds.
    ///
    /// Zero for points inside the bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sketchmap_core::geometry::{Bounds, Point, Size};
    /// let bounds = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
    ///
    /// assert_eq!(bounds.distance_to(Point::new(5.0, 5.0)), 0.0);
    /// assert_eq!(bounds.distance_to(Point::new(13.0, 14.0)), 5.0);
    /// ```
    pub fn distance_to(self, point: Point) -> f32 {
        let dx = (self.min_x - point.x).max(0.0).max(point.x - self.max_x);
        let dy = (self.min_y - point.y).max(0.0).max(point.y - self.max_y);
        dx.hypot(dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_new() {
        let point = Point::new(3.5, 4.2);
        assert_eq!(point.x(), 3.5);
        assert_eq!(point.y(), 4.2);
    }

    #[test]
    fn test_point_scale_and_add() {
        let point = Point::new(2.0, -4.0).scale(1.5).add_point(Point::new(1.0, 1.0));
        assert_eq!(point, Point::new(4.0, -5.0));
    }

    #[test]
    fn test_point_sub() {
        let p1 = Point::new(5.0, 8.0);
        let p2 = Point::new(2.0, 3.0);
        let result = p1.sub_point(p2);
        assert_eq!(result.x(), 3.0);
        assert_eq!(result.y(), 5.0);
    }

    #[test]
    fn test_point_distance() {
        let p1 = Point::new(1.0, 1.0);
        let p2 = Point::new(4.0, 5.0);
        assert_eq!(p1.distance(p2), 5.0);
        assert_eq!(p2.distance(p1), 5.0);
    }

    #[test]
    fn test_point_is_finite() {
        assert!(Point::new(1.0, -2.0).is_finite());
        assert!(!Point::new(f32::NAN, 0.0).is_finite());
        assert!(!Point::new(0.0, f32::INFINITY).is_finite());
    }

    #[test]
    fn test_size_is_zero() {
        assert!(Size::default().is_zero());
        assert!(!Size::new(0.0, 1.0).is_zero());
    }

    #[test]
    fn test_bounds_from_top_left() {
        let bounds = Bounds::new_from_top_left(Point::new(8.0, 7.0), Size::new(4.0, 6.0));
        assert_eq!(bounds.max_x(), 12.0);
        assert_eq!(bounds.max_y(), 13.0);
        assert_eq!(bounds.width(), 4.0);
        assert_eq!(bounds.area(), 24.0);
        assert_eq!(bounds.center(), Point::new(10.0, 10.0));
    }

    #[test]
    fn test_bounds_contains_edges() {
        let bounds = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(10.0, 5.0));
        assert!(bounds.contains(Point::new(0.0, 0.0)));
        assert!(bounds.contains(Point::new(10.0, 5.0)));
        assert!(!bounds.contains(Point::new(10.1, 5.0)));
    }

    #[test]
    fn test_bounds_distance_to_axis_aligned() {
        let bounds = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
        assert_eq!(bounds.distance_to(Point::new(-3.0, 5.0)), 3.0);
        assert_eq!(bounds.distance_to(Point::new(5.0, 12.0)), 2.0);
    }
}

#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    fn bounds_strategy() -> impl Strategy<Value = Bounds> {
        (
            -1000.0f32..1000.0,
            -1000.0f32..1000.0,
            1.0f32..500.0,
            1.0f32..500.0,
        )
            .prop_map(|(x, y, w, h)| Bounds::new_from_top_left(Point::new(x, y), Size::new(w, h)))
    }

    fn point_strategy() -> impl Strategy<Value = Point> {
        (-1000.0f32..1000.0, -1000.0f32..1000.0).prop_map(|(x, y)| Point::new(x, y))
    }

    /// Bounds contain their own center and corners.
    fn check_bounds_contain_center(bounds: Bounds) -> Result<(), TestCaseError> {
        prop_assert!(bounds.contains(bounds.center()));
        prop_assert!(bounds.contains(Point::new(bounds.min_x(), bounds.min_y())));
        prop_assert!(bounds.contains(Point::new(bounds.max_x(), bounds.max_y())));
        Ok(())
    }

    /// Distance is zero exactly for contained points and never exceeds the center distance.
    fn check_distance_to_is_consistent(bounds: Bounds, p: Point) -> Result<(), TestCaseError> {
        let distance = bounds.distance_to(p);
        prop_assert!(distance >= 0.0);
        if bounds.contains(p) {
            prop_assert!(approx_eq!(f32, distance, 0.0));
        }
        prop_assert!(distance <= bounds.center().distance(p) + 1e-3);
        Ok(())
    }

    proptest! {
        #[test]
        fn bounds_contain_center(bounds in bounds_strategy()) {
            check_bounds_contain_center(bounds)?;
        }

        #[test]
        fn distance_to_is_consistent(bounds in bounds_strategy(), p in point_strategy()) {
            check_distance_to_is_consistent(bounds, p)?;
        }
    }
}
