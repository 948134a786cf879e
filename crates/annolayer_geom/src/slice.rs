//! Carving a polygon with a freehand line.
//!
//! The line replaces the part of the polygon boundary between the first and
//! last places where it crosses that boundary.

use crate::Point;

/// Denominators below this are treated as parallel lines.
const PARALLEL_EPSILON: f64 = 1e-10;

/// Tolerance used when checking whether a ring is closed.
const CLOSE_EPSILON: f64 = 1e-10;

/// A crossing between one segment of the drawn line and one polygon edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Where the two segments cross.
    pub point: Point,
    /// Index in the polygon at which the crossing would be inserted
    /// (the end vertex of the crossed edge).
    pub index: usize,
    /// Index of the line segment that produced the crossing.
    pub line_segment_index: usize,
}

/// Intersection point of segment `line_start`-`line_end` with segment
/// `seg_start`-`seg_end`, if they cross.
pub fn find_intersection(
    line_start: &Point,
    line_end: &Point,
    seg_start: &Point,
    seg_end: &Point,
) -> Option<Point> {
    let denom = (seg_end.y - seg_start.y) * (line_end.x - line_start.x)
        - (seg_end.x - seg_start.x) * (line_end.y - line_start.y);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }

    let ua = ((seg_end.x - seg_start.x) * (line_start.y - seg_start.y)
        - (seg_end.y - seg_start.y) * (line_start.x - seg_start.x))
        / denom;
    let ub = ((line_end.x - line_start.x) * (line_start.y - seg_start.y)
        - (line_end.y - line_start.y) * (line_start.x - seg_start.x))
        / denom;

    if !(0.0..=1.0).contains(&ua) || !(0.0..=1.0).contains(&ub) {
        return None;
    }

    Some(Point::new(
        line_start.x + ua * (line_end.x - line_start.x),
        line_start.y + ua * (line_end.y - line_start.y),
    ))
}

/// Every crossing between the drawn line and the polygon's consecutive edges,
/// ordered by line segment, then by polygon edge.
pub fn find_all_intersections(polygon: &[Point], line: &[Point]) -> Vec<Intersection> {
    let mut intersections = Vec::new();
    for (i, pair) in line.windows(2).enumerate() {
        for (j, edge) in polygon.windows(2).enumerate() {
            if let Some(point) = find_intersection(&pair[0], &pair[1], &edge[0], &edge[1]) {
                intersections.push(Intersection {
                    point,
                    index: j + 1,
                    line_segment_index: i,
                });
            }
        }
    }
    intersections
}

/// Refit `polygon` so that its boundary follows `line` between the first and
/// last crossings.
///
/// When the line runs against the polygon's winding, its vertices are
/// reversed before splicing. The result is always a closed ring. A line that
/// never crosses the boundary leaves the polygon unchanged.
pub fn edit_polygon(polygon: &[Point], line: &[Point]) -> Vec<Point> {
    if line.len() < 2 {
        return polygon.to_vec();
    }

    let intersections = find_all_intersections(polygon, line);
    let (Some(first), Some(last)) = (intersections.first(), intersections.last()) else {
        return polygon.to_vec();
    };

    let reverse = first.index > last.index;
    let mut spliced: Vec<Point> =
        line[first.line_segment_index + 1..last.line_segment_index + 1].to_vec();
    if reverse {
        spliced.reverse();
    }
    let (entry, exit) = if reverse {
        (last.point, first.point)
    } else {
        (first.point, last.point)
    };

    let head = first.index.min(last.index);
    let tail = first.index.max(last.index);

    let mut coordinates = Vec::with_capacity(polygon.len() + spliced.len() + 3);
    coordinates.extend_from_slice(&polygon[..head]);
    coordinates.push(entry);
    coordinates.extend(spliced);
    coordinates.push(exit);
    coordinates.extend_from_slice(&polygon[tail..]);

    if let (Some(start), Some(end)) = (coordinates.first().copied(), coordinates.last()) {
        if !start.approx_eq(end, CLOSE_EPSILON) {
            coordinates.push(start);
        }
    }
    coordinates
}
