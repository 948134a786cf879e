//! Routing completed gestures to the active tool.

use std::collections::BTreeSet;

use annolayer_geom::{Point, edit_polygon, ellipse_to_polygon};

use super::{
    ConnectionAction, ConnectionTool, CreateShape, CreateTool, EditTool, EndpointFilter, SelectTool,
    TaggingTool, ToolConfiguration, ToolKind, ToolState, resolve_gesture_mode,
};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::filter::layer_displays_annotation;
use crate::gesture::{Gesture, GestureMode};
use crate::hit::{Candidate, closest_to, select_from_gesture};
use crate::model::{Annotation, AnnotationId, AnnotationShape, ConnectionId, NewConnection, Scene, TagEdit};
use crate::persistence::{AnnotationEdit, NewAnnotation, Persistence, report};
use crate::render::{Renderer, Surface};
use crate::selection::Selection;
use crate::viewport::Viewport;

/// Parse a user-entered combine tolerance.
pub fn parse_tolerance(text: &str) -> Result<f64, EngineError> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| EngineError::invalid_tolerance(text, "not a number"))?;
    if !value.is_finite() {
        return Err(EngineError::invalid_tolerance(text, "must be finite"));
    }
    if value < 0.0 {
        return Err(EngineError::invalid_tolerance(text, "must not be negative"));
    }
    Ok(value)
}

/// Coarse state of the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    /// No tool and nothing to capture.
    Idle,
    /// The host should capture a gesture of this mode.
    AwaitingGesture(GestureMode),
    /// A tool is active but captures no gestures (segmentation, or unrolled view).
    ToolActive,
}

/// What a handled gesture did.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Nothing to do for this gesture.
    Ignored,
    /// The gesture hit nothing usable.
    NoMatch,
    AnnotationRequested(NewAnnotation),
    Tagged {
        ids: Vec<AnnotationId>,
        edit: TagEdit,
    },
    Selected(Vec<AnnotationId>),
    /// First click of a two-step tool.
    EndpointStored(AnnotationId),
    Connected {
        parent: AnnotationId,
        child: AnnotationId,
    },
    ConnectionsRemoved(Vec<ConnectionId>),
    ConnectedAll(Vec<AnnotationId>),
    DisconnectedAll(Vec<AnnotationId>),
    CombineRequested {
        first: AnnotationId,
        second: AnnotationId,
        tolerance: f64,
    },
    Edited(Vec<AnnotationId>),
    /// The boundary of a pending region-of-interest filter, for validation.
    RoiFilterDrawn {
        filter_id: String,
        boundary: Vec<Point>,
    },
}

/// Everything a gesture handler reads or writes.
pub struct DispatchContext<'a> {
    pub scene: &'a Scene,
    /// Drawn annotations eligible for hit testing.
    pub candidates: Vec<Candidate<'a>>,
    pub viewport: &'a Viewport,
    pub config: &'a EngineConfig,
    pub selection: &'a mut Selection,
    pub persistence: &'a mut dyn Persistence,
    pub renderer: &'a mut dyn Renderer,
}

impl DispatchContext<'_> {
    fn hits(&self, gesture: &Gesture) -> Vec<AnnotationId> {
        select_from_gesture(gesture, self.candidates.iter().copied(), self.viewport)
    }

    fn closest(&self, at: &Point, ids: &[AnnotationId]) -> Option<AnnotationId> {
        closest_to(at, ids, |id| self.scene.annotation(id)).cloned()
    }

    fn passes(&self, filter: &EndpointFilter, annotation: &Annotation) -> bool {
        if !filter.tags.matches(&annotation.tags) {
            return false;
        }
        match &filter.layer {
            None => true,
            Some(layer_id) => self
                .scene
                .layer(layer_id)
                .is_some_and(|layer| layer_displays_annotation(layer, annotation, self.scene)),
        }
    }
}

/// The active tool, its state and the gesture mode it asks for.
#[derive(Debug, Default)]
pub struct ToolDispatcher {
    tool: Option<ToolConfiguration>,
    state: ToolState,
    pending_roi_filter: Option<String>,
    unrolling: bool,
    mode: Option<GestureMode>,
}

impl ToolDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(&self) -> Option<&ToolConfiguration> {
        self.tool.as_ref()
    }

    pub fn tool_state(&self) -> &ToolState {
        &self.state
    }

    pub fn tool_state_mut(&mut self) -> &mut ToolState {
        &mut self.state
    }

    /// Gesture mode the host should capture.
    pub fn mode(&self) -> Option<GestureMode> {
        self.mode
    }

    pub fn state(&self) -> DispatcherState {
        match (self.mode, &self.tool) {
            (Some(mode), _) => DispatcherState::AwaitingGesture(mode),
            (None, Some(_)) => DispatcherState::ToolActive,
            (None, None) => DispatcherState::Idle,
        }
    }

    pub fn pending_roi_filter(&self) -> Option<&str> {
        self.pending_roi_filter.as_deref()
    }

    /// Annotations highlighted by a stored first click.
    pub fn tool_highlighted_ids(&self) -> BTreeSet<AnnotationId> {
        self.state.stored_annotation().cloned().into_iter().collect()
    }

    // ========================================================================
    // Tool and mode changes
    // ========================================================================

    /// Select a tool. Returns true when the tool state was reset.
    ///
    /// Editing the configuration of the active tool keeps its state; a
    /// different tool starts fresh.
    pub fn set_tool(&mut self, tool: Option<ToolConfiguration>, renderer: &mut dyn Renderer) -> bool {
        let same_identity = match (&self.tool, &tool) {
            (Some(current), Some(next)) => current.id == next.id,
            _ => false,
        };

        let reset = !same_identity;
        if reset {
            self.discard_state(renderer);
            self.state = tool
                .as_ref()
                .map_or(ToolState::Base, |tool| ToolState::initial_for(&tool.kind));
            log::debug!(
                "🔧 Tool switched to {}",
                tool.as_ref().map_or("none", |tool| tool.id.as_str())
            );
        }
        self.tool = tool;
        self.refresh_mode(renderer);
        reset
    }

    pub fn set_unrolling(&mut self, unrolling: bool, renderer: &mut dyn Renderer) {
        self.unrolling = unrolling;
        self.refresh_mode(renderer);
    }

    pub fn is_unrolling(&self) -> bool {
        self.unrolling
    }

    /// Start or cancel drawing a region-of-interest filter.
    pub fn set_pending_roi_filter(&mut self, filter_id: Option<String>, renderer: &mut dyn Renderer) {
        self.pending_roi_filter = filter_id;
        self.refresh_mode(renderer);
    }

    fn refresh_mode(&mut self, renderer: &mut dyn Renderer) {
        let resolution = resolve_gesture_mode(
            self.tool.as_ref(),
            self.unrolling,
            self.pending_roi_filter.is_some(),
        );
        if resolution.deselect_tool {
            log::debug!("🔧 Deselecting tool for region-of-interest drawing");
            self.discard_state(renderer);
            self.tool = None;
            self.state = ToolState::Base;
        }
        self.mode = resolution.mode;
    }

    fn discard_state(&mut self, renderer: &mut dyn Renderer) {
        if let ToolState::SamAnnotation(overlay) = &mut self.state {
            overlay.clear(renderer);
            renderer.draw(Surface::Annotations);
        }
    }

    // ========================================================================
    // Gesture handling
    // ========================================================================

    /// Route a completed gesture. The gesture's transient primitive is always removed.
    pub fn handle_gesture(&mut self, gesture: Gesture, ctx: &mut DispatchContext<'_>) -> DispatchOutcome {
        let outcome = self.route(&gesture, ctx);
        if let Some(handle) = gesture.primitive {
            ctx.renderer.remove_primitive(handle);
            ctx.renderer.draw(Surface::Interaction);
        }
        log::debug!("🖱️ Gesture outcome: {:?}", outcome);
        outcome
    }

    fn route(&mut self, gesture: &Gesture, ctx: &mut DispatchContext<'_>) -> DispatchOutcome {
        let Some(tool) = self.tool.clone() else {
            return match self.pending_roi_filter.take() {
                Some(filter_id) => {
                    self.refresh_mode(ctx.renderer);
                    DispatchOutcome::RoiFilterDrawn {
                        filter_id,
                        boundary: gesture.coordinates.clone(),
                    }
                }
                None => DispatchOutcome::Ignored,
            };
        };

        match &tool.kind {
            ToolKind::Create(create) => self.create(create, gesture, ctx),
            ToolKind::Tagging(tagging) => self.tag(tagging, gesture, ctx),
            ToolKind::Connection(connection) if connection.action.is_lasso() => {
                self.connect_lasso(connection, gesture, ctx)
            }
            ToolKind::Connection(connection) => self.connect_click(connection, gesture, ctx),
            ToolKind::Select(select) => self.select(*select, gesture, ctx),
            ToolKind::Edit(EditTool::CombineClick { tolerance }) => {
                self.combine_click(*tolerance, gesture, ctx)
            }
            ToolKind::Edit(EditTool::BlobEdit) => self.blob_edit(gesture, ctx),
            ToolKind::SamAnnotation | ToolKind::Segmentation => DispatchOutcome::Ignored,
        }
    }

    fn create(&self, tool: &CreateTool, gesture: &Gesture, ctx: &mut DispatchContext<'_>) -> DispatchOutcome {
        if gesture.coordinates.is_empty() {
            return DispatchOutcome::Ignored;
        }
        let (shape, coordinates) = match tool.shape {
            CreateShape::Point => (AnnotationShape::Point, gesture.coordinates.clone()),
            CreateShape::Line => (AnnotationShape::Line, gesture.coordinates.clone()),
            CreateShape::Polygon => (AnnotationShape::Polygon, gesture.coordinates.clone()),
            CreateShape::Rectangle => (AnnotationShape::Rectangle, gesture.coordinates.clone()),
            CreateShape::Circle | CreateShape::Ellipse => (
                AnnotationShape::Polygon,
                ellipse_to_polygon(&gesture.coordinates, ctx.config.ellipse_polygon_segments),
            ),
        };
        let request = NewAnnotation {
            shape,
            coordinates,
            channel: tool.channel,
            location: ctx.scene.indices,
            tags: tool.tags.iter().cloned().collect(),
        };
        report("create annotation", ctx.persistence.create_annotation(request.clone()));
        DispatchOutcome::AnnotationRequested(request)
    }

    fn tag(&self, tool: &TaggingTool, gesture: &Gesture, ctx: &mut DispatchContext<'_>) -> DispatchOutcome {
        let ids = ctx.hits(gesture);
        if ids.is_empty() {
            return DispatchOutcome::NoMatch;
        }
        let edit = if tool.action.removes() {
            TagEdit::Remove(tool.tags.clone())
        } else if tool.remove_existing {
            TagEdit::Replace(tool.tags.clone())
        } else {
            TagEdit::Add(tool.tags.clone())
        };
        report(
            "update tags",
            ctx.persistence
                .update_annotations(&ids, &AnnotationEdit::Tags(edit.clone())),
        );
        if let [only] = ids.as_slice() {
            ctx.selection.set_hovered(Some(only.clone()));
        }
        DispatchOutcome::Tagged { ids, edit }
    }

    fn connect_click(
        &mut self,
        tool: &ConnectionTool,
        gesture: &Gesture,
        ctx: &mut DispatchContext<'_>,
    ) -> DispatchOutcome {
        let Some(anchor) = gesture.anchor() else {
            return DispatchOutcome::Ignored;
        };
        let ids = ctx.hits(gesture);

        let Some(parent) = self.state.stored_annotation().cloned() else {
            let eligible: Vec<AnnotationId> = ids
                .into_iter()
                .filter(|id| {
                    ctx.scene
                        .annotation(id)
                        .is_some_and(|a| ctx.passes(&tool.parent, a))
                })
                .collect();
            return match ctx.closest(&anchor, &eligible) {
                Some(id) => {
                    self.state = ToolState::Connection {
                        selected_annotation_id: Some(id.clone()),
                    };
                    DispatchOutcome::EndpointStored(id)
                }
                None => DispatchOutcome::NoMatch,
            };
        };

        let eligible: Vec<AnnotationId> = ids
            .into_iter()
            .filter(|id| *id != parent)
            .filter(|id| {
                ctx.scene
                    .annotation(id)
                    .is_some_and(|a| ctx.passes(&tool.child, a))
            })
            .collect();
        let Some(child) = ctx.closest(&anchor, &eligible) else {
            return DispatchOutcome::Ignored;
        };

        self.state = ToolState::Connection {
            selected_annotation_id: None,
        };

        if tool.action == ConnectionAction::DeleteClick {
            let doomed: Vec<ConnectionId> = ctx
                .scene
                .connections
                .iter()
                .filter(|c| c.joins(&parent, &child))
                .map(|c| c.id.clone())
                .collect();
            if !doomed.is_empty() {
                report("delete connections", ctx.persistence.delete_connections(&doomed));
            }
            return DispatchOutcome::ConnectionsRemoved(doomed);
        }

        let request = NewConnection {
            parent_id: parent.clone(),
            child_id: child.clone(),
            tags: tool.tags.iter().cloned().collect(),
            label: String::new(),
        };
        report("create connection", ctx.persistence.create_connection(request));
        DispatchOutcome::Connected { parent, child }
    }

    fn connect_lasso(
        &self,
        tool: &ConnectionTool,
        gesture: &Gesture,
        ctx: &mut DispatchContext<'_>,
    ) -> DispatchOutcome {
        let ids = ctx.hits(gesture);
        if ids.is_empty() {
            return DispatchOutcome::NoMatch;
        }
        if tool.action == ConnectionAction::DeleteLasso {
            report("delete all connections", ctx.persistence.delete_all_connections(&ids));
            return DispatchOutcome::DisconnectedAll(ids);
        }
        let tags: BTreeSet<String> = tool.tags.iter().cloned().collect();
        report(
            "create all connections",
            ctx.persistence.create_all_connections(&ids, &tags),
        );
        DispatchOutcome::ConnectedAll(ids)
    }

    fn select(&self, _tool: SelectTool, gesture: &Gesture, ctx: &mut DispatchContext<'_>) -> DispatchOutcome {
        let ids = ctx.hits(gesture);
        if ids.is_empty() {
            return DispatchOutcome::NoMatch;
        }
        ctx.selection.apply(ctx.config.selection_mode, &ids);
        DispatchOutcome::Selected(ids)
    }

    fn polygon_hits(&self, gesture: &Gesture, ctx: &DispatchContext<'_>) -> Vec<AnnotationId> {
        ctx.hits(gesture)
            .into_iter()
            .filter(|id| {
                ctx.scene
                    .annotation(id)
                    .is_some_and(|a| a.shape == AnnotationShape::Polygon)
            })
            .collect()
    }

    fn combine_click(&mut self, tolerance: f64, gesture: &Gesture, ctx: &mut DispatchContext<'_>) -> DispatchOutcome {
        let Some(anchor) = gesture.anchor() else {
            return DispatchOutcome::Ignored;
        };
        let polygons = self.polygon_hits(gesture, ctx);

        let Some(first) = self.state.stored_annotation().cloned() else {
            return match ctx.closest(&anchor, &polygons) {
                Some(id) => {
                    self.state = ToolState::Combine {
                        selected_annotation_id: Some(id.clone()),
                    };
                    DispatchOutcome::EndpointStored(id)
                }
                None => DispatchOutcome::NoMatch,
            };
        };

        let others: Vec<AnnotationId> = polygons.into_iter().filter(|id| *id != first).collect();
        let Some(second) = ctx.closest(&anchor, &others) else {
            return DispatchOutcome::Ignored;
        };

        self.state = ToolState::Combine {
            selected_annotation_id: None,
        };
        report(
            "combine annotations",
            ctx.persistence.combine_annotations(&first, &second, tolerance),
        );
        DispatchOutcome::CombineRequested {
            first,
            second,
            tolerance,
        }
    }

    fn blob_edit(&self, gesture: &Gesture, ctx: &mut DispatchContext<'_>) -> DispatchOutcome {
        let mut edited = Vec::new();
        for id in self.polygon_hits(gesture, ctx) {
            let Some(annotation) = ctx.scene.annotation(&id) else {
                continue;
            };
            let refit = edit_polygon(&annotation.coordinates, &gesture.coordinates);
            if refit == annotation.coordinates {
                continue;
            }
            report(
                "update coordinates",
                ctx.persistence.update_annotations(
                    std::slice::from_ref(&id),
                    &AnnotationEdit::SetCoordinates(refit),
                ),
            );
            edited.push(id);
        }
        if edited.is_empty() {
            return DispatchOutcome::NoMatch;
        }
        DispatchOutcome::Edited(edited)
    }
}
