//! Directed connections between annotations.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::AnnotationId;

/// Unique identifier for a connection.
pub type ConnectionId = String;

/// A directed parent -> child edge between two annotations.
///
/// Endpoints may reference annotations that no longer exist; those
/// connections are skipped wherever they are drawn or grouped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    pub parent_id: AnnotationId,
    pub child_id: AnnotationId,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub label: String,
}

impl Connection {
    /// Create a connection. Returns `None` for a self-loop.
    pub fn new(
        id: impl Into<ConnectionId>,
        parent_id: impl Into<AnnotationId>,
        child_id: impl Into<AnnotationId>,
    ) -> Option<Self> {
        let parent_id = parent_id.into();
        let child_id = child_id.into();
        if parent_id == child_id {
            return None;
        }
        Some(Self {
            id: id.into(),
            parent_id,
            child_id,
            tags: BTreeSet::new(),
            label: String::new(),
        })
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Check if either endpoint is `id`.
    pub fn touches(&self, id: &str) -> bool {
        self.parent_id == id || self.child_id == id
    }

    /// Check if the connection joins `a` and `b`, in either direction.
    pub fn joins(&self, a: &str, b: &str) -> bool {
        (self.parent_id == a && self.child_id == b) || (self.parent_id == b && self.child_id == a)
    }
}

/// A connection the host is asked to create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewConnection {
    pub parent_id: AnnotationId,
    pub child_id: AnnotationId,
    pub tags: BTreeSet<String>,
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_loop_rejected() {
        assert!(Connection::new("c1", "a1", "a1").is_none());
        assert!(Connection::new("c1", "a1", "a2").is_some());
    }

    #[test]
    fn test_joins_either_direction() {
        let c = Connection::new("c1", "a1", "a2").unwrap();
        assert!(c.joins("a1", "a2"));
        assert!(c.joins("a2", "a1"));
        assert!(!c.joins("a1", "a3"));
        assert!(c.touches("a2"));
        assert!(!c.touches("a3"));
    }
}
