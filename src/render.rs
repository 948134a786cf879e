//! Renderer collaborator.
//!
//! The engine never draws anything itself. It describes primitives and hands
//! them to a host-provided [`Renderer`], keeping only the returned handles.

use annolayer_geom::Point;

use crate::model::{AnnotationId, AnnotationShape, ConnectionId, LayerId};
use crate::style::AnnotationStyle;

/// Opaque handle of a primitive created by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimitiveHandle(pub u64);

/// Drawing surfaces owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    /// Annotations, connections and segmentation overlays.
    Annotations,
    /// Transient gesture feedback (selection paths, drag ghosts).
    Interaction,
    /// Timelapse tracks.
    Timelapse,
}

/// What a primitive represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Annotation,
    Connection,
    Ghost,
    SelectionPath,
    SamOutput,
    SamLivePreview,
    SamPrompt,
    TrackLine,
    TrackPoint,
}

/// Everything the renderer needs to create one primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveSpec {
    pub surface: Surface,
    pub kind: PrimitiveKind,
    pub shape: AnnotationShape,
    /// Display coordinates.
    pub coordinates: Vec<Point>,
    pub style: AnnotationStyle,
    pub layer_id: Option<LayerId>,
    pub annotation_id: Option<AnnotationId>,
    pub connection_id: Option<ConnectionId>,
    pub label: Option<String>,
}

impl PrimitiveSpec {
    pub fn new(
        surface: Surface,
        kind: PrimitiveKind,
        shape: AnnotationShape,
        coordinates: Vec<Point>,
        style: AnnotationStyle,
    ) -> Self {
        Self {
            surface,
            kind,
            shape,
            coordinates,
            style,
            layer_id: None,
            annotation_id: None,
            connection_id: None,
            label: None,
        }
    }

    /// Tag the primitive with the layer and annotation it shows.
    pub fn for_annotation(mut self, layer_id: &str, annotation_id: &str) -> Self {
        self.layer_id = Some(layer_id.to_string());
        self.annotation_id = Some(annotation_id.to_string());
        self
    }

    pub fn for_connection(mut self, connection_id: &str) -> Self {
        self.connection_id = Some(connection_id.to_string());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Host drawing backend.
pub trait Renderer {
    fn create_primitive(&mut self, spec: PrimitiveSpec) -> PrimitiveHandle;

    /// Removing an unknown handle must be harmless.
    fn remove_primitive(&mut self, handle: PrimitiveHandle);

    fn restyle_primitive(&mut self, handle: PrimitiveHandle, style: &AnnotationStyle);

    fn set_primitive_coordinates(&mut self, handle: PrimitiveHandle, coordinates: &[Point]);

    /// Remove every primitive on a surface, including ones the engine did not create.
    fn clear_surface(&mut self, surface: Surface);

    /// Flush pending changes on a surface.
    fn draw(&mut self, surface: Surface);

    fn display_to_logical(&self, point: Point) -> Point {
        point
    }

    fn logical_to_display(&self, point: Point) -> Point {
        point
    }
}

/// Map logical coordinates to display coordinates.
pub(crate) fn to_display(renderer: &dyn Renderer, coordinates: &[Point]) -> Vec<Point> {
    coordinates
        .iter()
        .map(|p| renderer.logical_to_display(*p))
        .collect()
}
