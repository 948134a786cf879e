//! Error types for the annotation layer engine.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised by engine helpers that validate caller input.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Tolerance text from a tool configuration is not a usable number
    #[error("Invalid tolerance '{value}': {reason}")]
    InvalidTolerance {
        /// The text that failed to parse
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// Colour text is neither hex nor a known colour name
    #[error("Invalid color '{value}'")]
    InvalidColor {
        /// The text that failed to parse
        value: String,
    },

    /// Layer id not present in the scene
    #[error("Layer not found: {id}")]
    LayerNotFound {
        /// The missing layer id
        id: String,
    },

    /// Annotation id not present in the scene
    #[error("Annotation not found: {id}")]
    AnnotationNotFound {
        /// The missing annotation id
        id: String,
    },

    /// Configuration could not be loaded or saved
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// Create an invalid tolerance error.
    pub fn invalid_tolerance(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTolerance {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid colour error.
    pub fn invalid_color(value: impl Into<String>) -> Self {
        Self::InvalidColor {
            value: value.into(),
        }
    }

    pub fn layer_not_found(id: impl Into<String>) -> Self {
        Self::LayerNotFound { id: id.into() }
    }

    pub fn annotation_not_found(id: impl Into<String>) -> Self {
        Self::AnnotationNotFound { id: id.into() }
    }
}

/// Failures reported by host collaborators.
///
/// The engine logs these and moves on. It never retries and never rolls
/// back local state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    /// The backend refused the operation
    #[error("{operation} rejected: {message}")]
    Rejected {
        /// Name of the refused operation
        operation: String,
        /// Backend-supplied reason
        message: String,
    },

    /// The backend could not be reached
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

impl CollaboratorError {
    /// Create a rejected-operation error.
    pub fn rejected(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            operation: operation.into(),
            message: message.into(),
        }
    }
}
