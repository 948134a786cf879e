//! Shape normalisation and size estimates.

use std::f64::consts::TAU;

use crate::{BoundingBox, Point};

/// Radius reported for annotations with fewer than two vertices.
pub const DEFAULT_POINT_RADIUS: f64 = 5.0;

/// Bounding boxes closer than this count as adjacent.
pub const ADJACENCY_TOLERANCE: f64 = 1e-6;

/// Convert the corners of a (possibly rotated) ellipse bounding rectangle
/// into a polygon ring with `segments` vertices.
///
/// Corners are expected in drawing order. The first edge gives the major
/// axis direction. Fewer than three corners or segments leaves the input
/// untouched.
pub fn ellipse_to_polygon(corners: &[Point], segments: usize) -> Vec<Point> {
    if corners.len() < 3 || segments < 3 {
        return corners.to_vec();
    }
    let n = corners.len().min(4) as f64;
    let (sx, sy) = corners
        .iter()
        .take(4)
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    let (cx, cy) = (sx / n, sy / n);

    let (c0, c1, c2) = (corners[0], corners[1], corners[2]);
    let semi_a = c0.distance_to(&c1) / 2.0;
    let semi_b = c1.distance_to(&c2) / 2.0;
    let rotation = (c1.y - c0.y).atan2(c1.x - c0.x);
    let (sin_r, cos_r) = rotation.sin_cos();

    (0..segments)
        .map(|i| {
            let t = TAU * i as f64 / segments as f64;
            let (sin_t, cos_t) = t.sin_cos();
            let ex = semi_a * cos_t;
            let ey = semi_b * sin_t;
            Point::new(cx + ex * cos_r - ey * sin_r, cy + ex * sin_r + ey * cos_r)
        })
        .collect()
}

/// Half the bounding-box diagonal of the coordinates.
pub fn estimate_annotation_radius(coordinates: &[Point]) -> f64 {
    if coordinates.len() <= 1 {
        return DEFAULT_POINT_RADIUS;
    }
    BoundingBox::from_points(coordinates).map_or(DEFAULT_POINT_RADIUS, |bbox| bbox.diagonal() / 2.0)
}

/// Cheap pre-check for combining two polygons: their bounding boxes overlap
/// or touch.
pub fn polygons_overlap_or_adjacent(a: &[Point], b: &[Point]) -> bool {
    match (BoundingBox::from_points(a), BoundingBox::from_points(b)) {
        (Some(ba), Some(bb)) => ba.overlaps(&bb, ADJACENCY_TOLERANCE),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ellipse_axis_aligned() {
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(20.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        let ring = ellipse_to_polygon(&corners, 4);
        assert_eq!(ring.len(), 4);
        assert!(ring[0].approx_eq(&Point::new(20.0, 5.0), 1e-9));
        assert!(ring[1].approx_eq(&Point::new(10.0, 10.0), 1e-9));
        assert!(ring[2].approx_eq(&Point::new(0.0, 5.0), 1e-9));
        assert!(ring[3].approx_eq(&Point::new(10.0, 0.0), 1e-9));
    }

    #[test]
    fn test_ellipse_keeps_degenerate_input() {
        let corners = [Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        assert_eq!(ellipse_to_polygon(&corners, 32), corners.to_vec());
    }

    #[test]
    fn test_estimate_radius() {
        assert_eq!(estimate_annotation_radius(&[Point::new(1.0, 1.0)]), 5.0);
        let r = estimate_annotation_radius(&[Point::new(0.0, 0.0), Point::new(6.0, 8.0)]);
        assert!((r - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_polygons_overlap_or_adjacent() {
        let a = [Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0)];
        let b = [Point::new(10.0, 0.0), Point::new(20.0, 0.0), Point::new(20.0, 10.0)];
        let c = [Point::new(50.0, 50.0), Point::new(60.0, 50.0), Point::new(60.0, 60.0)];
        assert!(polygons_overlap_or_adjacent(&a, &b));
        assert!(!polygons_overlap_or_adjacent(&a, &c));
        assert!(!polygons_overlap_or_adjacent(&a, &[]));
    }
}
