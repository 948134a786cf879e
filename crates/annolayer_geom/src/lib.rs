//! Geometry primitives for the annotation layer engine.
//!
//! All functions are pure: they take coordinates in the logical image space
//! and return distances, containment answers or new vertex rings.
//!
//! - [`Point`] and [`BoundingBox`]: the basic types
//! - [`predicates`]: distance and containment tests used by hit-testing
//! - [`shapes`]: shape normalisation and size estimates
//! - [`slice`]: carving a polygon with a freehand line (blob edit)

mod point;
pub mod predicates;
pub mod shapes;
pub mod slice;

pub use point::{BoundingBox, Point};
pub use predicates::{
    distance_to_segment_squared, point_distance, point_in_polygon, simple_centroid,
};
pub use shapes::{ellipse_to_polygon, estimate_annotation_radius, polygons_overlap_or_adjacent};
pub use slice::{Intersection, edit_polygon, find_all_intersections, find_intersection};
