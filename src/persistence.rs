//! Persistence collaborator.
//!
//! Everything the engine wants changed in the data store goes through
//! [`Persistence`]. Calls are fire-and-forget: a failure is logged and the
//! engine carries on with its local state untouched.

use std::collections::BTreeSet;

use annolayer_geom::Point;
use serde::{Deserialize, Serialize};

use crate::error::CollaboratorError;
use crate::model::{
    Annotation, AnnotationId, AnnotationShape, ConnectionId, Location, NewConnection, TagEdit,
};

/// An annotation the host is asked to create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnnotation {
    pub shape: AnnotationShape,
    pub coordinates: Vec<Point>,
    pub channel: u32,
    pub location: Location,
    pub tags: BTreeSet<String>,
}

/// A change applied to every annotation of an update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationEdit {
    /// Replace the vertices.
    SetCoordinates(Vec<Point>),
    /// Change the tags.
    Tags(TagEdit),
}

impl AnnotationEdit {
    /// Apply the edit to a local copy, for hosts updating optimistically.
    pub fn apply(&self, annotation: &mut Annotation) {
        match self {
            AnnotationEdit::SetCoordinates(coordinates) => {
                annotation.coordinates = coordinates.clone();
            }
            AnnotationEdit::Tags(edit) => edit.apply(&mut annotation.tags),
        }
    }
}

/// Host data store.
pub trait Persistence {
    fn create_annotation(&mut self, annotation: NewAnnotation) -> Result<(), CollaboratorError>;

    fn update_annotations(
        &mut self,
        ids: &[AnnotationId],
        edit: &AnnotationEdit,
    ) -> Result<(), CollaboratorError>;

    fn delete_annotations(&mut self, ids: &[AnnotationId]) -> Result<(), CollaboratorError>;

    fn create_connection(&mut self, connection: NewConnection) -> Result<(), CollaboratorError>;

    fn delete_connections(&mut self, ids: &[ConnectionId]) -> Result<(), CollaboratorError>;

    /// Connect the given annotations to each other, as the backend sees fit.
    fn create_all_connections(
        &mut self,
        ids: &[AnnotationId],
        tags: &BTreeSet<String>,
    ) -> Result<(), CollaboratorError>;

    /// Remove every connection between the given annotations.
    fn delete_all_connections(&mut self, ids: &[AnnotationId]) -> Result<(), CollaboratorError>;

    /// Merge two polygons into one.
    fn combine_annotations(
        &mut self,
        first: &AnnotationId,
        second: &AnnotationId,
        tolerance: f64,
    ) -> Result<(), CollaboratorError>;
}

/// Log a failed collaborator call. Returns whether the call succeeded.
pub(crate) fn report(operation: &str, result: Result<(), CollaboratorError>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            log::warn!("⚠️ {} failed: {}", operation, e);
            false
        }
    }
}
