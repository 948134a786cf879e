//! Hit testing gestures against drawn annotations.

use std::collections::HashSet;

use annolayer_geom::{
    Point, distance_to_segment_squared, find_all_intersections, point_distance, point_in_polygon,
};

use crate::gesture::{Gesture, GestureMode};
use crate::model::{Annotation, AnnotationId, AnnotationShape};
use crate::style::AnnotationStyle;
use crate::viewport::Viewport;

/// A drawn annotation and the style it was drawn with.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub annotation: &'a Annotation,
    pub style: &'a AnnotationStyle,
}

// ============================================================================
// Primitive predicates
// ============================================================================

/// Whether `p` lands on a point marker. A zero radius is never hit.
pub fn point_near_point(
    p: &Point,
    target: &Point,
    radius: f64,
    stroke_width: f64,
    units_per_pixel: f64,
) -> bool {
    if radius <= 0.0 {
        return false;
    }
    point_distance(p, target) <= (radius + stroke_width / 2.0) * units_per_pixel
}

/// Whether `p` lands on a polyline drawn with `stroke_width`.
pub fn point_near_line(p: &Point, line: &[Point], stroke_width: f64, units_per_pixel: f64) -> bool {
    let tolerance = stroke_width * units_per_pixel;
    let tolerance_sq = tolerance * tolerance;

    let near_segment = line
        .windows(2)
        .any(|pair| distance_to_segment_squared(p, &pair[0], &pair[1]) <= tolerance_sq);
    if near_segment {
        return true;
    }
    line.last()
        .is_some_and(|last| point_distance(p, last) <= tolerance)
}

fn closed_ring(ring: &[Point]) -> Vec<Point> {
    let mut closed = ring.to_vec();
    if let (Some(first), Some(last)) = (ring.first(), ring.last())
        && first != last
    {
        closed.push(*first);
    }
    closed
}

/// Whether a line crosses into or through an area ring.
fn line_touches_area(line: &[Point], ring: &[Point]) -> bool {
    line.iter().any(|p| point_in_polygon(p, ring))
        || !find_all_intersections(&closed_ring(ring), line).is_empty()
}

// ============================================================================
// Gesture tests
// ============================================================================

/// Decide whether a gesture selects one annotation.
pub fn should_select(
    mode: GestureMode,
    gesture: &[Point],
    annotation: &Annotation,
    style: &AnnotationStyle,
    units_per_pixel: f64,
) -> bool {
    let Some(anchor) = gesture.first() else {
        return false;
    };
    let coords = &annotation.coordinates;

    match mode {
        GestureMode::Point => match annotation.shape {
            AnnotationShape::Point => coords.first().is_some_and(|target| {
                point_near_point(anchor, target, style.radius, style.stroke_width, units_per_pixel)
            }),
            AnnotationShape::Line => {
                point_near_line(anchor, coords, style.stroke_width, units_per_pixel)
            }
            AnnotationShape::Polygon | AnnotationShape::Rectangle => {
                point_in_polygon(anchor, coords)
            }
        },
        GestureMode::Line => match annotation.shape {
            AnnotationShape::Polygon | AnnotationShape::Rectangle => {
                line_touches_area(gesture, coords)
            }
            AnnotationShape::Point => coords
                .first()
                .is_some_and(|p| point_near_line(p, gesture, style.stroke_width, units_per_pixel)),
            AnnotationShape::Line => !find_all_intersections(coords, gesture).is_empty(),
        },
        GestureMode::Polygon | GestureMode::Rectangle | GestureMode::Ellipse => {
            coords.iter().any(|p| point_in_polygon(p, gesture))
        }
    }
}

/// Every drawn annotation the gesture selects, deduplicated, in drawn order.
///
/// An annotation drawn on several layers is tested once per layer but listed
/// once.
pub fn select_from_gesture<'a>(
    gesture: &Gesture,
    candidates: impl IntoIterator<Item = Candidate<'a>>,
    viewport: &Viewport,
) -> Vec<AnnotationId> {
    let mut seen = HashSet::new();
    let mut matches = Vec::new();
    for candidate in candidates {
        let id = &candidate.annotation.id;
        if seen.contains(id.as_str()) {
            continue;
        }
        let upp = candidate.style.units_per_pixel(viewport);
        if should_select(gesture.mode, &gesture.coordinates, candidate.annotation, candidate.style, upp) {
            seen.insert(id.clone());
            matches.push(id.clone());
        }
    }
    log::debug!("🖱️ {:?} gesture matched {} annotations", gesture.mode, matches.len());
    matches
}

// ============================================================================
// Distances
// ============================================================================

/// Distance between two annotations.
///
/// Point-point is the plain distance, point-to-other the distance to the
/// nearest vertex, line/polygon pairs the centroid distance.
pub fn annotation_distance(a: &Annotation, b: &Annotation) -> f64 {
    use AnnotationShape::{Line, Point as PointShape, Polygon, Rectangle};

    let nearest_vertex = |p: &Point, other: &Annotation| {
        other
            .coordinates
            .iter()
            .map(|v| point_distance(p, v))
            .fold(f64::INFINITY, f64::min)
    };

    match (a.shape, b.shape) {
        (PointShape, PointShape) => match (a.coordinates.first(), b.coordinates.first()) {
            (Some(pa), Some(pb)) => point_distance(pa, pb),
            _ => f64::INFINITY,
        },
        (PointShape, _) => a
            .coordinates
            .first()
            .map_or(f64::INFINITY, |p| nearest_vertex(p, b)),
        (_, PointShape) => b
            .coordinates
            .first()
            .map_or(f64::INFINITY, |p| nearest_vertex(p, a)),
        (Line | Polygon | Rectangle, Line | Polygon | Rectangle) => {
            match (a.centroid(), b.centroid()) {
                (Some(ca), Some(cb)) => point_distance(&ca, &cb),
                _ => f64::INFINITY,
            }
        }
    }
}

/// The annotation closest to a point, among `ids`.
pub fn closest_to<'a>(
    at: &Point,
    ids: &'a [AnnotationId],
    lookup: impl Fn(&str) -> Option<&'a Annotation>,
) -> Option<&'a AnnotationId> {
    let probe = Annotation::new("", AnnotationShape::Point, vec![*at]);
    ids.iter()
        .filter_map(|id| lookup(id).map(|annotation| (id, annotation_distance(&probe, annotation))))
        .min_by(|(_, da), (_, db)| da.total_cmp(db))
        .map(|(id, _)| id)
}
