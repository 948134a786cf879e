//! Annolayer - annotation layer engine
//!
//! Decides which annotations show on which layer for the current slice,
//! keeps drawn primitives in step with the data, and turns pointer gestures
//! into tool actions. Drawing and storage belong to the host, reached through
//! the [`Renderer`] and [`Persistence`] traits.
//!
//! | Module | Role |
//! |---|---|
//! | [`model`] | annotations, connections, layers and the scene snapshot |
//! | [`filter`] | per-layer visibility for the current slice |
//! | [`reconcile`] | diff drawn primitives against the desired set |
//! | [`hit`] | gesture hit-testing |
//! | [`tools`] | tool configurations and gesture dispatch |
//! | [`engine`] | [`AnnotationEngine`], the entry point |

pub mod color;
pub mod config;
pub mod connectivity;
pub mod constants;
pub mod drag;
pub mod engine;
pub mod error;
pub mod filter;
pub mod gesture;
pub mod hit;
pub mod input;
pub mod model;
pub mod persistence;
pub mod reconcile;
pub mod render;
pub mod selection;
pub mod style;
pub mod timelapse;
pub mod tools;
pub mod unroll;
pub mod viewport;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use annolayer_geom as geom;
pub use annolayer_geom::Point;

pub use color::Color;
pub use config::{ConfigError, EngineConfig, LogLevel};
pub use engine::AnnotationEngine;
pub use error::{CollaboratorError, EngineError};
pub use gesture::{Gesture, GestureMode};
pub use input::{Modifiers, PointerEvent};
pub use model::{Annotation, AnnotationId, AnnotationShape, Connection, Layer, Scene};
pub use persistence::{AnnotationEdit, NewAnnotation, Persistence};
pub use render::{PrimitiveHandle, PrimitiveKind, PrimitiveSpec, Renderer, Surface};
pub use selection::{Selection, SelectionMode};
pub use tools::{DispatchOutcome, ToolConfiguration, ToolKind};
pub use viewport::Viewport;
