//! Completed pointer gestures.

use annolayer_geom::Point;
use serde::{Deserialize, Serialize};

use crate::render::PrimitiveHandle;

/// Shape the host captures for the active tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureMode {
    Point,
    Line,
    Polygon,
    Rectangle,
    /// Four corners of the bounding rectangle.
    Ellipse,
}

impl GestureMode {
    /// Modes whose coordinates enclose an area.
    pub fn is_area(&self) -> bool {
        matches!(
            self,
            GestureMode::Polygon | GestureMode::Rectangle | GestureMode::Ellipse
        )
    }
}

/// A gesture the host finished capturing.
#[derive(Debug, Clone, PartialEq)]
pub struct Gesture {
    pub mode: GestureMode,
    /// Logical coordinates.
    pub coordinates: Vec<Point>,
    /// Transient primitive the host drew while capturing, removed once handled.
    pub primitive: Option<PrimitiveHandle>,
}

impl Gesture {
    pub fn new(mode: GestureMode, coordinates: Vec<Point>) -> Self {
        Self {
            mode,
            coordinates,
            primitive: None,
        }
    }

    pub fn point(at: Point) -> Self {
        Self::new(GestureMode::Point, vec![at])
    }

    pub fn with_primitive(mut self, handle: PrimitiveHandle) -> Self {
        self.primitive = Some(handle);
        self
    }

    /// First coordinate, if any.
    pub fn anchor(&self) -> Option<Point> {
        self.coordinates.first().copied()
    }
}
