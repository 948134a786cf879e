//! Data models for the annotation engine.

mod annotation;
mod connection;
mod layer;
mod scene;
mod tag;

pub use annotation::{Annotation, AnnotationId, AnnotationShape, Axis, Location};
pub use connection::{Connection, ConnectionId, NewConnection};
pub use layer::{Layer, LayerId, LayerRange, SliceIndices, SliceSpec, UnrollFlags};
pub use scene::Scene;
pub use tag::{TagEdit, TagFilter, tag_cloud_filter, tag_filter};
