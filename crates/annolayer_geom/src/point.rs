//! Points and axis-aligned boxes in image coordinates.

use serde::{Deserialize, Serialize};

/// A 2D point in logical image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// This point shifted by `(dx, dy)`.
    pub fn offset(&self, dx: f64, dy: f64) -> Point {
        Point::new(self.x + dx, self.y + dy)
    }

    /// Both coordinates within `epsilon` of the other point.
    pub fn approx_eq(&self, other: &Point, epsilon: f64) -> bool {
        (self.x - other.x).abs() < epsilon && (self.y - other.y).abs() < epsilon
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

/// An axis-aligned bounding box stored as min/max corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Smallest box containing every point. `None` for an empty slice.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = BoundingBox::new(first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            bbox.min_x = bbox.min_x.min(p.x);
            bbox.min_y = bbox.min_y.min(p.y);
            bbox.max_x = bbox.max_x.max(p.x);
            bbox.max_y = bbox.max_y.max(p.y);
        }
        Some(bbox)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn diagonal(&self) -> f64 {
        (self.width() * self.width() + self.height() * self.height()).sqrt()
    }

    /// Check if a point lies inside the box (edges included).
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.min_x && point.x <= self.max_x && point.y >= self.min_y && point.y <= self.max_y
    }

    /// Boxes overlap or lie within `tolerance` of touching.
    pub fn overlaps(&self, other: &BoundingBox, tolerance: f64) -> bool {
        !(self.max_x < other.min_x - tolerance
            || other.max_x < self.min_x - tolerance
            || self.max_y < other.min_y - tolerance
            || other.max_y < self.min_y - tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert!((p1.distance_to(&p2) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounding_box_from_points() {
        let bbox = BoundingBox::from_points(&[
            Point::new(50.0, 80.0),
            Point::new(10.0, 20.0),
            Point::new(30.0, 90.0),
        ])
        .unwrap();
        assert_eq!(bbox, BoundingBox::new(10.0, 20.0, 50.0, 90.0));
        assert_eq!(bbox.area(), 40.0 * 70.0);
        assert!(BoundingBox::from_points(&[]).is_none());
    }

    #[test]
    fn test_bounding_box_contains() {
        let bbox = BoundingBox::new(10.0, 10.0, 110.0, 110.0);
        assert!(bbox.contains(&Point::new(50.0, 50.0)));
        assert!(bbox.contains(&Point::new(10.0, 10.0))); // Edge
        assert!(!bbox.contains(&Point::new(5.0, 50.0)));
    }

    #[test]
    fn test_bounding_box_overlap_tolerance() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let touching = BoundingBox::new(10.0, 0.0, 20.0, 10.0);
        let apart = BoundingBox::new(10.1, 0.0, 20.0, 10.0);
        assert!(a.overlaps(&touching, 1e-6));
        assert!(!a.overlaps(&apart, 1e-6));
    }
}
