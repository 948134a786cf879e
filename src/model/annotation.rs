//! Annotation types and data structures.

use std::collections::BTreeSet;

use annolayer_geom::{Point, simple_centroid};
use serde::{Deserialize, Serialize};

/// Unique identifier for an annotation.
pub type AnnotationId = String;

/// Geometric kind of an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationShape {
    /// Single point marker.
    Point,
    /// Open polyline.
    Line,
    /// Closed polygon.
    Polygon,
    /// Axis-aligned rectangle stored as its four corners.
    Rectangle,
}

impl AnnotationShape {
    /// Get the display name for this shape.
    pub fn name(&self) -> &'static str {
        match self {
            AnnotationShape::Point => "point",
            AnnotationShape::Line => "line",
            AnnotationShape::Polygon => "polygon",
            AnnotationShape::Rectangle => "rectangle",
        }
    }

    /// Shapes that enclose an area (containment tests apply).
    pub fn is_area(&self) -> bool {
        matches!(self, AnnotationShape::Polygon | AnnotationShape::Rectangle)
    }
}

/// One of the three slice axes an annotation is located on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Xy,
    Z,
    Time,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Xy, Axis::Z, Axis::Time];
}

/// Position of an annotation along the XY/Z/Time axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "XY")]
    pub xy: u32,
    #[serde(rename = "Z")]
    pub z: u32,
    #[serde(rename = "Time")]
    pub time: u32,
}

impl Location {
    pub const fn new(xy: u32, z: u32, time: u32) -> Self {
        Self { xy, z, time }
    }

    /// Index along the given axis.
    pub fn get(&self, axis: Axis) -> u32 {
        match axis {
            Axis::Xy => self.xy,
            Axis::Z => self.z,
            Axis::Time => self.time,
        }
    }
}

/// An annotation as delivered by the data store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// Unique identifier.
    pub id: AnnotationId,
    /// The shape geometry kind.
    pub shape: AnnotationShape,
    /// Image channel the annotation was drawn on.
    pub channel: u32,
    /// Slice the annotation belongs to.
    pub location: Location,
    /// Vertices in logical image coordinates.
    pub coordinates: Vec<Point>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Explicit colour overriding the layer colour.
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub dataset_id: String,
}

impl Annotation {
    /// Create an annotation on channel 0 at the origin slice.
    pub fn new(id: impl Into<AnnotationId>, shape: AnnotationShape, coordinates: Vec<Point>) -> Self {
        Self {
            id: id.into(),
            shape,
            channel: 0,
            location: Location::default(),
            coordinates,
            tags: BTreeSet::new(),
            color: None,
            dataset_id: String::new(),
        }
    }

    pub fn with_channel(mut self, channel: u32) -> Self {
        self.channel = channel;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Mean of the vertices, used as the anchor for connections and tracks.
    pub fn centroid(&self) -> Option<Point> {
        simple_centroid(&self.coordinates)
    }

    /// Check whether the annotation carries a tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_axis_lookup() {
        let loc = Location::new(1, 2, 3);
        assert_eq!(loc.get(Axis::Xy), 1);
        assert_eq!(loc.get(Axis::Z), 2);
        assert_eq!(loc.get(Axis::Time), 3);
    }

    #[test]
    fn test_annotation_centroid() {
        let ann = Annotation::new(
            "a1",
            AnnotationShape::Polygon,
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)],
        );
        assert_eq!(ann.centroid(), Some(Point::new(5.0, 5.0)));
        assert!(Annotation::new("a2", AnnotationShape::Point, vec![]).centroid().is_none());
    }

    #[test]
    fn test_annotation_deserializes_store_json() {
        let json = r#"{
            "id": "a1",
            "shape": "polygon",
            "channel": 2,
            "location": {"XY": 0, "Z": 3, "Time": 7},
            "coordinates": [{"x": 1.0, "y": 2.0}],
            "tags": ["nucleus"],
            "datasetId": "ds"
        }"#;
        let ann: Annotation = serde_json::from_str(json).unwrap();
        assert_eq!(ann.shape, AnnotationShape::Polygon);
        assert_eq!(ann.location, Location::new(0, 3, 7));
        assert!(ann.has_tag("nucleus"));
        assert!(ann.color.is_none());
    }
}
