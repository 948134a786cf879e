//! Recording collaborators for tests.
//!
//! Built for unit tests, and for integration tests and hosts through the
//! `test-support` feature.

use std::collections::{BTreeMap, BTreeSet};

use annolayer_geom::Point;

use crate::error::CollaboratorError;
use crate::model::{AnnotationId, ConnectionId, NewConnection};
use crate::persistence::{AnnotationEdit, NewAnnotation, Persistence};
use crate::render::{PrimitiveHandle, PrimitiveSpec, Renderer, Surface};
use crate::style::AnnotationStyle;

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    next: u64,
    pub live: BTreeMap<PrimitiveHandle, PrimitiveSpec>,
    pub created: usize,
    pub removed: usize,
    pub restyled: usize,
    pub moved: usize,
    pub cleared: Vec<Surface>,
    pub draws: Vec<Surface>,
}

impl RecordingRenderer {
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn live_on(&self, surface: Surface) -> Vec<&PrimitiveSpec> {
        self.live.values().filter(|spec| spec.surface == surface).collect()
    }
}

impl Renderer for RecordingRenderer {
    fn create_primitive(&mut self, spec: PrimitiveSpec) -> PrimitiveHandle {
        self.next += 1;
        let handle = PrimitiveHandle(self.next);
        self.live.insert(handle, spec);
        self.created += 1;
        handle
    }

    fn remove_primitive(&mut self, handle: PrimitiveHandle) {
        if self.live.remove(&handle).is_some() {
            self.removed += 1;
        }
    }

    fn restyle_primitive(&mut self, handle: PrimitiveHandle, style: &AnnotationStyle) {
        if let Some(spec) = self.live.get_mut(&handle) {
            spec.style = *style;
            self.restyled += 1;
        }
    }

    fn set_primitive_coordinates(&mut self, handle: PrimitiveHandle, coordinates: &[Point]) {
        if let Some(spec) = self.live.get_mut(&handle) {
            spec.coordinates = coordinates.to_vec();
            self.moved += 1;
        }
    }

    fn clear_surface(&mut self, surface: Surface) {
        self.live.retain(|_, spec| spec.surface != surface);
        self.cleared.push(surface);
    }

    fn draw(&mut self, surface: Surface) {
        self.draws.push(surface);
    }
}

/// Every call the engine made, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateAnnotation(NewAnnotation),
    UpdateAnnotations(Vec<AnnotationId>, AnnotationEdit),
    DeleteAnnotations(Vec<AnnotationId>),
    CreateConnection(NewConnection),
    DeleteConnections(Vec<ConnectionId>),
    CreateAllConnections(Vec<AnnotationId>, BTreeSet<String>),
    DeleteAllConnections(Vec<AnnotationId>),
    Combine(AnnotationId, AnnotationId, f64),
}

#[derive(Debug, Default)]
pub struct RecordingPersistence {
    pub calls: Vec<Call>,
    pub fail: bool,
}

impl RecordingPersistence {
    fn record(&mut self, call: Call) -> Result<(), CollaboratorError> {
        self.calls.push(call);
        if self.fail {
            return Err(CollaboratorError::Unavailable("offline".into()));
        }
        Ok(())
    }
}

impl Persistence for RecordingPersistence {
    fn create_annotation(&mut self, annotation: NewAnnotation) -> Result<(), CollaboratorError> {
        self.record(Call::CreateAnnotation(annotation))
    }

    fn update_annotations(
        &mut self,
        ids: &[AnnotationId],
        edit: &AnnotationEdit,
    ) -> Result<(), CollaboratorError> {
        self.record(Call::UpdateAnnotations(ids.to_vec(), edit.clone()))
    }

    fn delete_annotations(&mut self, ids: &[AnnotationId]) -> Result<(), CollaboratorError> {
        self.record(Call::DeleteAnnotations(ids.to_vec()))
    }

    fn create_connection(&mut self, connection: NewConnection) -> Result<(), CollaboratorError> {
        self.record(Call::CreateConnection(connection))
    }

    fn delete_connections(&mut self, ids: &[ConnectionId]) -> Result<(), CollaboratorError> {
        self.record(Call::DeleteConnections(ids.to_vec()))
    }

    fn create_all_connections(
        &mut self,
        ids: &[AnnotationId],
        tags: &BTreeSet<String>,
    ) -> Result<(), CollaboratorError> {
        self.record(Call::CreateAllConnections(ids.to_vec(), tags.clone()))
    }

    fn delete_all_connections(&mut self, ids: &[AnnotationId]) -> Result<(), CollaboratorError> {
        self.record(Call::DeleteAllConnections(ids.to_vec()))
    }

    fn combine_annotations(
        &mut self,
        first: &AnnotationId,
        second: &AnnotationId,
        tolerance: f64,
    ) -> Result<(), CollaboratorError> {
        self.record(Call::Combine(first.clone(), second.clone(), tolerance))
    }
}
