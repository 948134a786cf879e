//! Distance and containment predicates.

use crate::Point;

/// Euclidean distance between two points.
pub fn point_distance(a: &Point, b: &Point) -> f64 {
    a.distance_to(b)
}

/// Squared distance from `p` to the segment `a`-`b`.
///
/// The projection is clamped to the segment, so points past either end are
/// measured to the nearest endpoint. A zero-length segment degenerates to a
/// point distance.
pub fn distance_to_segment_squared(p: &Point, a: &Point, b: &Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    let (cx, cy) = if len_sq == 0.0 {
        (a.x, a.y)
    } else {
        let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
        (a.x + t * dx, a.y + t * dy)
    };
    let ex = p.x - cx;
    let ey = p.y - cy;
    ex * ex + ey * ey
}

/// Point-in-polygon test using ray casting.
///
/// The ring is implicitly closed; rings with fewer than three vertices
/// contain nothing.
pub fn point_in_polygon(point: &Point, ring: &[Point]) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let (x, y) = (point.x, point.y);
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = (ring[i].x, ring[i].y);
        let (xj, yj) = (ring[j].x, ring[j].y);
        if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Arithmetic mean of the vertices. A single vertex is returned as is.
pub fn simple_centroid(coordinates: &[Point]) -> Option<Point> {
    match coordinates {
        [] => None,
        [only] => Some(*only),
        _ => {
            let n = coordinates.len() as f64;
            let (sx, sy) = coordinates
                .iter()
                .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
            Some(Point::new(sx / n, sy / n))
        }
    }
}
