//! Tool configurations, per-tool state and gesture mode resolution.

mod dispatch;
mod sam;

pub use dispatch::{DispatchContext, DispatchOutcome, DispatcherState, ToolDispatcher, parse_tolerance};
pub use sam::{SamOverlay, SamPrompt, SamUpdate};

use serde::{Deserialize, Serialize};

use crate::gesture::GestureMode;
use crate::model::{AnnotationId, LayerId, TagFilter};

/// Stable identity of a configured tool.
pub type ToolId = String;

/// A tool as configured by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfiguration {
    pub id: ToolId,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub kind: ToolKind,
}

impl ToolConfiguration {
    pub fn new(id: impl Into<ToolId>, kind: ToolKind) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            kind,
        }
    }
}

/// Tool type and its values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "camelCase")]
pub enum ToolKind {
    Create(CreateTool),
    Tagging(TaggingTool),
    Connection(ConnectionTool),
    Select(SelectTool),
    Edit(EditTool),
    SamAnnotation,
    Segmentation,
}

/// Shape drawn by a create tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreateShape {
    Point,
    Line,
    Polygon,
    Rectangle,
    Circle,
    Ellipse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTool {
    pub shape: CreateShape,
    /// Channel new annotations are created on.
    #[serde(default)]
    pub channel: u32,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaggingAction {
    TagClick,
    TagLasso,
    UntagClick,
    UntagLasso,
}

impl TaggingAction {
    pub fn is_lasso(&self) -> bool {
        matches!(self, TaggingAction::TagLasso | TaggingAction::UntagLasso)
    }

    pub fn removes(&self) -> bool {
        matches!(self, TaggingAction::UntagClick | TaggingAction::UntagLasso)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggingTool {
    pub action: TaggingAction,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Replace existing tags instead of merging.
    #[serde(default)]
    pub remove_existing: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionAction {
    AddClick,
    AddLasso,
    DeleteClick,
    DeleteLasso,
}

impl ConnectionAction {
    pub fn is_lasso(&self) -> bool {
        matches!(self, ConnectionAction::AddLasso | ConnectionAction::DeleteLasso)
    }
}

/// Which annotations may serve as one end of a connection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointFilter {
    #[serde(default)]
    pub tags: TagFilter,
    /// Restrict to annotations on this layer's channel.
    #[serde(default)]
    pub layer: Option<LayerId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionTool {
    pub action: ConnectionAction,
    #[serde(default)]
    pub parent: EndpointFilter,
    #[serde(default)]
    pub child: EndpointFilter,
    /// Tags given to new connections.
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectTool {
    Pointer,
    Lasso,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EditTool {
    CombineClick { tolerance: f64 },
    BlobEdit,
}

// ============================================================================
// Tool state
// ============================================================================

/// Multi-step progress of the active tool.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ToolState {
    #[default]
    Base,
    Connection {
        selected_annotation_id: Option<AnnotationId>,
    },
    Combine {
        selected_annotation_id: Option<AnnotationId>,
    },
    SamAnnotation(SamOverlay),
}

impl ToolState {
    /// Fresh state for a newly selected tool.
    pub fn initial_for(kind: &ToolKind) -> Self {
        match kind {
            ToolKind::Connection(_) => ToolState::Connection {
                selected_annotation_id: None,
            },
            ToolKind::Edit(EditTool::CombineClick { .. }) => ToolState::Combine {
                selected_annotation_id: None,
            },
            ToolKind::SamAnnotation => ToolState::SamAnnotation(SamOverlay::default()),
            _ => ToolState::Base,
        }
    }

    /// Stored first-click annotation of a two-step tool.
    pub fn stored_annotation(&self) -> Option<&AnnotationId> {
        match self {
            ToolState::Connection {
                selected_annotation_id,
            }
            | ToolState::Combine {
                selected_annotation_id,
            } => selected_annotation_id.as_ref(),
            _ => None,
        }
    }
}

// ============================================================================
// Gesture mode resolution
// ============================================================================

/// Gesture the tool captures, or `None` for tools without one.
pub fn tool_gesture_mode(kind: &ToolKind) -> Option<GestureMode> {
    match kind {
        ToolKind::Create(create) => Some(match create.shape {
            CreateShape::Point => GestureMode::Point,
            CreateShape::Line => GestureMode::Line,
            CreateShape::Polygon => GestureMode::Polygon,
            CreateShape::Rectangle => GestureMode::Rectangle,
            CreateShape::Circle | CreateShape::Ellipse => GestureMode::Ellipse,
        }),
        ToolKind::Tagging(tagging) => Some(if tagging.action.is_lasso() {
            GestureMode::Polygon
        } else {
            GestureMode::Point
        }),
        ToolKind::Connection(connection) => Some(if connection.action.is_lasso() {
            GestureMode::Polygon
        } else {
            GestureMode::Point
        }),
        ToolKind::Select(SelectTool::Pointer) => Some(GestureMode::Point),
        ToolKind::Select(SelectTool::Lasso) => Some(GestureMode::Polygon),
        ToolKind::Edit(EditTool::CombineClick { .. }) => Some(GestureMode::Point),
        ToolKind::Edit(EditTool::BlobEdit) => Some(GestureMode::Line),
        ToolKind::SamAnnotation | ToolKind::Segmentation => None,
    }
}

/// Result of resolving the interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeResolution {
    pub mode: Option<GestureMode>,
    /// The active tool must be deselected.
    pub deselect_tool: bool,
}

/// Resolve the gesture mode: unrolling disables capture, a pending ROI filter
/// forces a polygon, otherwise the tool decides.
pub fn resolve_gesture_mode(
    tool: Option<&ToolConfiguration>,
    unrolling: bool,
    roi_pending: bool,
) -> ModeResolution {
    if unrolling {
        return ModeResolution {
            mode: None,
            deselect_tool: false,
        };
    }
    if roi_pending {
        return ModeResolution {
            mode: Some(GestureMode::Polygon),
            deselect_tool: tool.is_some(),
        };
    }
    ModeResolution {
        mode: tool.and_then(|tool| tool_gesture_mode(&tool.kind)),
        deselect_tool: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagging(action: TaggingAction) -> ToolKind {
        ToolKind::Tagging(TaggingTool {
            action,
            tags: vec![],
            remove_existing: false,
        })
    }

    #[test]
    fn test_mode_table() {
        let create = |shape| ToolKind::Create(CreateTool { shape, channel: 0, tags: vec![] });
        assert_eq!(tool_gesture_mode(&create(CreateShape::Circle)), Some(GestureMode::Ellipse));
        assert_eq!(tool_gesture_mode(&create(CreateShape::Line)), Some(GestureMode::Line));
        assert_eq!(tool_gesture_mode(&tagging(TaggingAction::UntagLasso)), Some(GestureMode::Polygon));
        assert_eq!(tool_gesture_mode(&tagging(TaggingAction::TagClick)), Some(GestureMode::Point));
        assert_eq!(tool_gesture_mode(&ToolKind::Edit(EditTool::BlobEdit)), Some(GestureMode::Line));
        assert_eq!(tool_gesture_mode(&ToolKind::SamAnnotation), None);
        assert_eq!(tool_gesture_mode(&ToolKind::Segmentation), None);
    }

    #[test]
    fn test_unrolling_disables_capture() {
        let tool = ToolConfiguration::new("t", ToolKind::Select(SelectTool::Lasso));
        let resolved = resolve_gesture_mode(Some(&tool), true, true);
        assert_eq!(resolved.mode, None);
        assert!(!resolved.deselect_tool);
    }

    #[test]
    fn test_roi_forces_polygon_and_deselects() {
        let tool = ToolConfiguration::new("t", ToolKind::Select(SelectTool::Pointer));
        let resolved = resolve_gesture_mode(Some(&tool), false, true);
        assert_eq!(resolved.mode, Some(GestureMode::Polygon));
        assert!(resolved.deselect_tool);
    }

    #[test]
    fn test_initial_states() {
        assert_eq!(
            ToolState::initial_for(&ToolKind::Edit(EditTool::CombineClick { tolerance: 2.0 })),
            ToolState::Combine { selected_annotation_id: None }
        );
        assert_eq!(ToolState::initial_for(&tagging(TaggingAction::TagClick)), ToolState::Base);
        assert!(matches!(
            ToolState::initial_for(&ToolKind::SamAnnotation),
            ToolState::SamAnnotation(_)
        ));
    }

    #[test]
    fn test_tool_configuration_json() {
        let json = r#"{
            "id": "tag1",
            "name": "Tag nuclei",
            "type": "tagging",
            "values": {"action": "tag_lasso", "tags": ["nucleus"], "remove_existing": true}
        }"#;
        let tool: ToolConfiguration = serde_json::from_str(json).unwrap();
        assert_eq!(
            tool.kind,
            ToolKind::Tagging(TaggingTool {
                action: TaggingAction::TagLasso,
                tags: vec!["nucleus".to_string()],
                remove_existing: true,
            })
        );
    }
}
