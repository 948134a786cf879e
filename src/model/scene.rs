//! Immutable snapshot of everything one engine pass reads.

use std::collections::HashMap;

use annolayer_geom::Point;

use super::{Annotation, Connection, Layer, LayerRange, SliceIndices, UnrollFlags};
use crate::error::EngineError;
use crate::unroll::{UnrollLayout, unrolled_coordinates};

/// Annotations, connections, layers and viewing state at one instant.
///
/// Every derived computation in a pass (visibility, reconciliation, hit
/// testing, timelapse) reads the same `Scene`, so no pass sees a mix of old
/// and new data.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    annotations: Vec<Annotation>,
    index: HashMap<String, usize>,
    pub connections: Vec<Connection>,
    pub layers: Vec<Layer>,
    pub indices: SliceIndices,
    pub unroll: UnrollFlags,
    pub layer_range: LayerRange,
    pub show_hidden_layers: bool,
    pub unroll_layout: Option<UnrollLayout>,
}

impl Scene {
    /// Build a snapshot. Later duplicates of an id shadow earlier ones in lookups.
    pub fn new(annotations: Vec<Annotation>, connections: Vec<Connection>, layers: Vec<Layer>) -> Self {
        let index = annotations
            .iter()
            .enumerate()
            .map(|(i, annotation)| (annotation.id.clone(), i))
            .collect();
        Self {
            annotations,
            index,
            connections,
            layers,
            ..Default::default()
        }
    }

    pub fn with_indices(mut self, indices: SliceIndices) -> Self {
        self.indices = indices;
        self
    }

    pub fn with_unroll(mut self, unroll: UnrollFlags) -> Self {
        self.unroll = unroll;
        self
    }

    pub fn with_layer_range(mut self, range: LayerRange) -> Self {
        self.layer_range = range;
        self
    }

    pub fn with_show_hidden_layers(mut self, show: bool) -> Self {
        self.show_hidden_layers = show;
        self
    }

    pub fn with_unroll_layout(mut self, layout: UnrollLayout) -> Self {
        self.unroll_layout = Some(layout);
        self
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn annotation(&self, id: &str) -> Option<&Annotation> {
        self.index.get(id).and_then(|&i| self.annotations.get(i))
    }

    /// Like [`Scene::annotation`], but a missing id is an error.
    pub fn require_annotation(&self, id: &str) -> Result<&Annotation, EngineError> {
        self.annotation(id).ok_or_else(|| EngineError::annotation_not_found(id))
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    pub fn require_layer(&self, id: &str) -> Result<&Layer, EngineError> {
        self.layer(id).ok_or_else(|| EngineError::layer_not_found(id))
    }

    /// Layers inside the scene's layer range.
    pub fn valid_layers(&self) -> &[Layer] {
        self.layer_range.valid_layers(&self.layers)
    }

    /// Coordinates of an annotation as presented, including tile offsets.
    pub fn display_coordinates(&self, annotation: &Annotation) -> Vec<Point> {
        unrolled_coordinates(
            &annotation.coordinates,
            &annotation.location,
            self.unroll_layout.as_ref(),
            self.unroll,
        )
    }

    /// Centroid of the presented coordinates.
    pub fn display_centroid(&self, annotation: &Annotation) -> Option<Point> {
        annolayer_geom::simple_centroid(&self.display_coordinates(annotation))
    }
}
