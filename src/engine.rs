//! The annotation engine: one entry point over filter, reconciler, tools,
//! drag and timelapse.
//!
//! The host owns the data and the drawing backend. It calls into the engine
//! with a [`Scene`] snapshot plus its [`Renderer`] and [`Persistence`]
//! implementations whenever data, slice or pointer state changes.

use std::collections::BTreeSet;

use crate::config::EngineConfig;
use crate::drag::{DragCommit, DragController};
use crate::filter::layer_annotations;
use crate::gesture::{Gesture, GestureMode};
use crate::hit::select_from_gesture;
use crate::input::{MousePath, PointerEvent};
use crate::model::{AnnotationId, Scene};
use crate::persistence::{NewAnnotation, Persistence, report};
use crate::reconcile::{ReconcilePlan, Reconciler, StyleContext};
use crate::render::{Renderer, Surface};
use crate::selection::Selection;
use crate::style::BaseStyle;
use crate::timelapse::draw_timelapse;
use crate::tools::{
    DispatchContext, DispatchOutcome, DispatcherState, SamUpdate, ToolConfiguration, ToolDispatcher,
    ToolState,
};
use crate::viewport::Viewport;

/// Engine state that outlives a single scene snapshot.
#[derive(Debug)]
pub struct AnnotationEngine {
    config: EngineConfig,
    base: BaseStyle,
    viewport: Viewport,
    selection: Selection,
    reconciler: Reconciler,
    dispatcher: ToolDispatcher,
    drag: DragController,
    mouse_path: MousePath,
}

impl AnnotationEngine {
    pub fn new(config: EngineConfig) -> Self {
        config.apply_log_level();
        log::debug!("🚀 Annotation engine created");
        Self {
            base: BaseStyle::from_config(&config),
            config,
            viewport: Viewport::default(),
            selection: Selection::new(),
            reconciler: Reconciler::new(),
            dispatcher: ToolDispatcher::new(),
            drag: DragController::new(),
            mouse_path: MousePath::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the configuration and redraw everything with the new styles.
    pub fn set_config(&mut self, config: EngineConfig, scene: &Scene, renderer: &mut dyn Renderer) {
        config.apply_log_level();
        self.base = BaseStyle::from_config(&config);
        self.config = config;
        self.reconciler.clear(renderer, false);
        self.draw_annotations(scene, renderer);
        self.draw_timelapse(scene, renderer);
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut Selection {
        &mut self.selection
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    // ========================================================================
    // Drawing
    // ========================================================================

    /// Bring drawn annotations and connections in line with the scene.
    pub fn draw_annotations(&mut self, scene: &Scene, renderer: &mut dyn Renderer) -> ReconcilePlan {
        if !self.config.draw_annotations {
            self.reconciler.clear(renderer, false);
            renderer.draw(Surface::Annotations);
            return ReconcilePlan::default();
        }

        let desired = layer_annotations(scene);
        let highlighted = self.dispatcher.tool_highlighted_ids();
        let ctx = StyleContext {
            base: &self.base,
            selection: &self.selection,
            tool_highlighted: &highlighted,
        };
        let plan = self.reconciler.reconcile(&desired, scene, &ctx, renderer, false);

        if self.config.draw_connections {
            self.reconciler
                .reconcile_connections(scene, &desired.displayed_ids, &self.base, renderer);
        } else {
            self.reconciler.clear_connections(renderer);
        }

        renderer.draw(Surface::Annotations);
        plan
    }

    /// Unrolling moves every primitive, so drawing starts over.
    pub fn on_unroll_changed(&mut self, scene: &Scene, renderer: &mut dyn Renderer) -> ReconcilePlan {
        log::debug!("🧩 Unroll changed (any axis unrolled: {})", scene.unroll.any());
        self.dispatcher.set_unrolling(scene.unroll.any(), renderer);
        self.drag.cancel(renderer);
        self.mouse_path.cancel(renderer);
        self.reconciler.clear(renderer, false);
        self.draw_annotations(scene, renderer)
    }

    pub fn draw_timelapse(&self, scene: &Scene, renderer: &mut dyn Renderer) -> usize {
        draw_timelapse(scene, &self.config, renderer)
    }

    // ========================================================================
    // Tools
    // ========================================================================

    pub fn set_tool(&mut self, tool: Option<ToolConfiguration>, scene: &Scene, renderer: &mut dyn Renderer) {
        if self.dispatcher.set_tool(tool, renderer) {
            self.mouse_path.cancel(renderer);
            self.draw_annotations(scene, renderer);
        }
    }

    pub fn set_pending_roi_filter(&mut self, filter_id: Option<String>, renderer: &mut dyn Renderer) {
        self.dispatcher.set_pending_roi_filter(filter_id, renderer);
    }

    /// Gesture the host should capture next.
    pub fn interaction_mode(&self) -> Option<GestureMode> {
        self.dispatcher.mode()
    }

    pub fn dispatcher_state(&self) -> DispatcherState {
        self.dispatcher.state()
    }

    pub fn tool_highlighted_ids(&self) -> BTreeSet<AnnotationId> {
        self.dispatcher.tool_highlighted_ids()
    }

    /// Route a completed gesture to the active tool, then restyle.
    pub fn handle_gesture(
        &mut self,
        gesture: Gesture,
        scene: &Scene,
        renderer: &mut dyn Renderer,
        persistence: &mut dyn Persistence,
    ) -> DispatchOutcome {
        let outcome = {
            let mut ctx = DispatchContext {
                scene,
                candidates: self.reconciler.hit_candidates(scene),
                viewport: &self.viewport,
                config: &self.config,
                selection: &mut self.selection,
                persistence,
                renderer: &mut *renderer,
            };
            self.dispatcher.handle_gesture(gesture, &mut ctx)
        };
        self.draw_annotations(scene, renderer);
        outcome
    }

    // ========================================================================
    // Dragging
    // ========================================================================

    /// Start an alt-drag. Refused while any axis is unrolled, since tiles are offset copies.
    pub fn drag_start(&mut self, event: &PointerEvent, scene: &Scene, renderer: &mut dyn Renderer) -> bool {
        if scene.unroll.any() || self.dispatcher.is_unrolling() {
            log::debug!("🧩 Drag ignored in unrolled view");
            return false;
        }
        let candidates = self.reconciler.hit_candidates(scene);
        self.drag.start(event, &candidates, &self.viewport, renderer)
    }

    pub fn drag_move(&mut self, event: &PointerEvent, renderer: &mut dyn Renderer) {
        self.drag.update(event, renderer);
    }

    pub fn drag_end(
        &mut self,
        event: &PointerEvent,
        renderer: &mut dyn Renderer,
        persistence: &mut dyn Persistence,
    ) -> Option<DragCommit> {
        self.drag.finish(event, renderer, persistence)
    }

    pub fn drag_cancel(&mut self, renderer: &mut dyn Renderer) {
        self.drag.cancel(renderer);
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    // ========================================================================
    // Shift-drag selection path
    // ========================================================================

    /// Start a shift-drag selection path. Refused in unrolled view.
    pub fn mouse_down(&mut self, event: &PointerEvent, renderer: &dyn Renderer) -> bool {
        if self.dispatcher.is_unrolling() {
            return false;
        }
        self.mouse_path.press(event, renderer)
    }

    pub fn mouse_move(&mut self, event: &PointerEvent, renderer: &mut dyn Renderer) {
        self.mouse_path.motion(event, &self.base, renderer);
    }

    /// Finish a selection path and select what it covers.
    ///
    /// Returns `None` when no path was in progress.
    pub fn mouse_up(&mut self, scene: &Scene, renderer: &mut dyn Renderer) -> Option<DispatchOutcome> {
        let gesture = self.mouse_path.release(renderer)?;
        let ids = select_from_gesture(
            &gesture,
            self.reconciler.hit_candidates(scene),
            &self.viewport,
        );
        if ids.is_empty() {
            return Some(DispatchOutcome::NoMatch);
        }
        self.selection.apply(self.config.selection_mode, &ids);
        self.draw_annotations(scene, renderer);
        Some(DispatchOutcome::Selected(ids))
    }

    // ========================================================================
    // Segmentation overlay
    // ========================================================================

    /// Show new segmentation output. Ignored unless the SAM tool is active.
    pub fn update_sam(&mut self, update: SamUpdate, renderer: &mut dyn Renderer) -> bool {
        let ToolState::SamAnnotation(overlay) = self.dispatcher.tool_state_mut() else {
            log::debug!("Segmentation update without an active segmentation tool");
            return false;
        };
        overlay.update(
            update,
            &self.base,
            &self.viewport,
            self.config.sam_preview_max_viewport_fraction,
            renderer,
        );
        true
    }

    /// Turn the main segmentation output into an annotation.
    pub fn submit_sam(
        &mut self,
        scene: &Scene,
        channel: u32,
        tags: BTreeSet<String>,
        renderer: &mut dyn Renderer,
        persistence: &mut dyn Persistence,
    ) -> Option<NewAnnotation> {
        let ToolState::SamAnnotation(overlay) = self.dispatcher.tool_state_mut() else {
            return None;
        };
        let request = overlay.submission(channel, scene.indices, tags)?;
        report("create annotation", persistence.create_annotation(request.clone()));
        overlay.clear(renderer);
        renderer.draw(Surface::Annotations);
        Some(request)
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn set_hovered(&mut self, id: Option<AnnotationId>, scene: &Scene, renderer: &mut dyn Renderer) {
        self.selection.set_hovered(id);
        self.draw_annotations(scene, renderer);
    }

    /// Delete the selected annotations. Returns the ids requested.
    pub fn delete_selected(&mut self, persistence: &mut dyn Persistence) -> Vec<AnnotationId> {
        let ids = self.selection.take();
        if !ids.is_empty() {
            log::debug!("🗑️ Deleting {} selected annotations", ids.len());
            report("delete annotations", persistence.delete_annotations(&ids));
        }
        ids
    }
}

impl Default for AnnotationEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Annotation, AnnotationShape, Layer};
    use crate::test_support::{Call, RecordingPersistence, RecordingRenderer};
    use crate::tools::{SelectTool, ToolKind};
    use annolayer_geom::Point;

    fn scene() -> Scene {
        Scene::new(
            vec![
                Annotation::new("a1", AnnotationShape::Point, vec![Point::new(0.0, 0.0)]),
                Annotation::new("a2", AnnotationShape::Point, vec![Point::new(100.0, 0.0)]),
            ],
            vec![],
            vec![Layer::new("layer1", 0, "#00ff00")],
        )
    }

    #[test]
    fn test_draw_disabled_removes_annotations() {
        let mut engine = AnnotationEngine::default();
        let mut renderer = RecordingRenderer::default();
        engine.draw_annotations(&scene(), &mut renderer);
        assert_eq!(engine.reconciler().len(), 2);

        let mut config = EngineConfig::default();
        config.draw_annotations = false;
        engine.set_config(config, &scene(), &mut renderer);
        assert!(engine.reconciler().is_empty());
        assert!(renderer.cleared.is_empty());
        assert!(renderer.live_on(Surface::Annotations).is_empty());
    }

    #[test]
    fn test_draw_disabled_keeps_sam_overlay() {
        let mut engine = AnnotationEngine::default();
        let mut renderer = RecordingRenderer::default();
        let scene = scene();
        engine.set_tool(
            Some(ToolConfiguration::new("sam", ToolKind::SamAnnotation)),
            &scene,
            &mut renderer,
        );
        let square = vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(4.0, 4.0), Point::new(0.0, 4.0)];
        assert!(engine.update_sam(SamUpdate { output: Some(square), ..Default::default() }, &mut renderer));

        let mut config = EngineConfig::default();
        config.draw_annotations = false;
        engine.set_config(config, &scene, &mut renderer);

        let live = renderer.live_on(Surface::Annotations);
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].kind, crate::render::PrimitiveKind::SamOutput);

        // The overlay still owns a valid handle and clears cleanly.
        engine.set_tool(None, &scene, &mut renderer);
        assert!(renderer.live_on(Surface::Annotations).is_empty());
    }

    #[test]
    fn test_unrolled_view_refuses_drag_and_path() {
        let mut engine = AnnotationEngine::default();
        let mut renderer = RecordingRenderer::default();
        let scene = scene().with_unroll(crate::model::UnrollFlags { xy: false, z: true, time: false });
        engine.on_unroll_changed(&scene, &mut renderer);

        let alt = PointerEvent::at(0.0, 0.0).with_modifiers(crate::input::Modifiers::ALT);
        assert!(!engine.drag_start(&alt, &scene, &mut renderer));
        assert!(!engine.is_dragging());
        assert!(renderer.live_on(Surface::Interaction).is_empty());

        let shift = PointerEvent::at(0.0, 0.0).with_modifiers(crate::input::Modifiers::SHIFT);
        assert!(!engine.mouse_down(&shift, &renderer));
        assert!(engine.mouse_up(&scene, &mut renderer).is_none());

        let rolled = scene.with_unroll(crate::model::UnrollFlags::default());
        engine.on_unroll_changed(&rolled, &mut renderer);
        assert!(engine.drag_start(&alt, &rolled, &mut renderer));
    }

    #[test]
    fn test_select_gesture_restyles() {
        let mut engine = AnnotationEngine::default();
        let mut renderer = RecordingRenderer::default();
        let mut persistence = RecordingPersistence::default();
        let scene = scene();
        engine.draw_annotations(&scene, &mut renderer);
        engine.set_tool(
            Some(ToolConfiguration::new("sel", ToolKind::Select(SelectTool::Pointer))),
            &scene,
            &mut renderer,
        );

        let outcome = engine.handle_gesture(Gesture::point(Point::new(1.0, 1.0)), &scene, &mut renderer, &mut persistence);
        assert_eq!(outcome, DispatchOutcome::Selected(vec!["a1".into()]));
        assert!(engine.selection().is_selected("a1"));
        assert_eq!(renderer.restyled, 1);
    }

    #[test]
    fn test_mouse_path_selects() {
        let mut engine = AnnotationEngine::default();
        let mut renderer = RecordingRenderer::default();
        let scene = scene();
        engine.draw_annotations(&scene, &mut renderer);

        let shift = crate::input::Modifiers::SHIFT;
        assert!(engine.mouse_down(&PointerEvent::at(-5.0, -5.0).with_modifiers(shift), &renderer));
        engine.mouse_move(&PointerEvent::at(5.0, -5.0), &mut renderer);
        engine.mouse_move(&PointerEvent::at(5.0, 5.0), &mut renderer);
        engine.mouse_move(&PointerEvent::at(-5.0, 5.0), &mut renderer);

        let outcome = engine.mouse_up(&scene, &mut renderer);
        assert_eq!(outcome, Some(DispatchOutcome::Selected(vec!["a1".into()])));
        assert!(renderer.live_on(Surface::Interaction).is_empty());
        assert!(engine.mouse_up(&scene, &mut renderer).is_none());
    }

    #[test]
    fn test_delete_selected() {
        let mut engine = AnnotationEngine::default();
        let mut persistence = RecordingPersistence::default();
        assert!(engine.delete_selected(&mut persistence).is_empty());
        assert!(persistence.calls.is_empty());

        engine
            .selection_mut()
            .apply(crate::selection::SelectionMode::Add, &["a1".to_string()]);
        assert_eq!(engine.delete_selected(&mut persistence), vec!["a1".to_string()]);
        assert_eq!(persistence.calls, vec![Call::DeleteAnnotations(vec!["a1".into()])]);
    }

    #[test]
    fn test_sam_update_requires_tool() {
        let mut engine = AnnotationEngine::default();
        let mut renderer = RecordingRenderer::default();
        assert!(!engine.update_sam(SamUpdate::default(), &mut renderer));

        engine.set_tool(
            Some(ToolConfiguration::new("sam", ToolKind::SamAnnotation)),
            &scene(),
            &mut renderer,
        );
        let square = vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(4.0, 4.0), Point::new(0.0, 4.0)];
        let update = SamUpdate { output: Some(square), ..Default::default() };
        assert!(engine.update_sam(update, &mut renderer));

        let mut persistence = RecordingPersistence::default();
        let request = engine
            .submit_sam(&scene(), 0, BTreeSet::new(), &mut renderer, &mut persistence)
            .unwrap();
        assert_eq!(request.shape, AnnotationShape::Polygon);
        assert_eq!(persistence.calls.len(), 1);

        // Switching away clears the overlay.
        engine.update_sam(
            SamUpdate { output: Some(vec![Point::new(0.0, 0.0); 3]), ..Default::default() },
            &mut renderer,
        );
        engine.set_tool(None, &scene(), &mut renderer);
        assert!(
            renderer
                .live_on(Surface::Annotations)
                .iter()
                .all(|spec| spec.annotation_id.is_some())
        );
    }
}
