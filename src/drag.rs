//! Alt-drag of a single annotation.
//!
//! While dragging, only a ghost primitive on the interaction surface moves.
//! The annotation itself is updated once, when the drag ends.

use annolayer_geom::Point;

use crate::gesture::Gesture;
use crate::hit::{Candidate, select_from_gesture};
use crate::input::PointerEvent;
use crate::model::AnnotationId;
use crate::persistence::{AnnotationEdit, Persistence, report};
use crate::render::{PrimitiveHandle, PrimitiveKind, PrimitiveSpec, Renderer, Surface, to_display};
use crate::style::AnnotationStyle;
use crate::viewport::Viewport;

/// An annotation being dragged.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub annotation_id: AnnotationId,
    /// Logical position where the drag started.
    pub start: Point,
    pub original_coordinates: Vec<Point>,
    pub ghost: PrimitiveHandle,
}

impl DragSession {
    /// Original coordinates shifted by `position - start`.
    pub fn moved_to(&self, position: Point) -> Vec<Point> {
        let (dx, dy) = (position.x - self.start.x, position.y - self.start.y);
        self.original_coordinates
            .iter()
            .map(|p| p.offset(dx, dy))
            .collect()
    }
}

/// The coordinate update issued when a drag ends.
#[derive(Debug, Clone, PartialEq)]
pub struct DragCommit {
    pub annotation_id: AnnotationId,
    pub coordinates: Vec<Point>,
}

/// Idle or dragging one annotation.
#[derive(Debug, Default)]
pub struct DragController {
    session: Option<DragSession>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Start dragging the first annotation under an alt-click.
    pub fn start(
        &mut self,
        event: &PointerEvent,
        candidates: &[Candidate<'_>],
        viewport: &Viewport,
        renderer: &mut dyn Renderer,
    ) -> bool {
        if self.session.is_some() || !event.modifiers.alt {
            return false;
        }
        let Some(position) = event.logical_position(renderer) else {
            return false;
        };

        let hits = select_from_gesture(&Gesture::point(position), candidates.iter().copied(), viewport);
        let Some(candidate) = hits
            .first()
            .and_then(|id| candidates.iter().find(|c| &c.annotation.id == id))
        else {
            return false;
        };

        let annotation = candidate.annotation;
        let mut spec = PrimitiveSpec::new(
            Surface::Interaction,
            PrimitiveKind::Ghost,
            annotation.shape,
            to_display(renderer, &annotation.coordinates),
            AnnotationStyle::ghost(candidate.style),
        );
        spec.annotation_id = Some(annotation.id.clone());
        let ghost = renderer.create_primitive(spec);
        renderer.draw(Surface::Interaction);

        log::debug!("✋ Drag started on {}", annotation.id);
        self.session = Some(DragSession {
            annotation_id: annotation.id.clone(),
            start: position,
            original_coordinates: annotation.coordinates.clone(),
            ghost,
        });
        true
    }

    /// Move the ghost to follow the pointer.
    pub fn update(&mut self, event: &PointerEvent, renderer: &mut dyn Renderer) {
        let Some(session) = &self.session else {
            return;
        };
        let Some(position) = event.logical_position(renderer) else {
            return;
        };
        let coordinates = to_display(renderer, &session.moved_to(position));
        renderer.set_primitive_coordinates(session.ghost, &coordinates);
        renderer.draw(Surface::Interaction);
    }

    /// Commit the drag with one coordinate update.
    pub fn finish(
        &mut self,
        event: &PointerEvent,
        renderer: &mut dyn Renderer,
        persistence: &mut dyn Persistence,
    ) -> Option<DragCommit> {
        let position = event.logical_position(renderer)?;
        let session = self.session.take()?;

        let coordinates = session.moved_to(position);
        report(
            "update coordinates",
            persistence.update_annotations(
                std::slice::from_ref(&session.annotation_id),
                &AnnotationEdit::SetCoordinates(coordinates.clone()),
            ),
        );
        renderer.remove_primitive(session.ghost);
        renderer.draw(Surface::Interaction);

        log::debug!("✋ Drag finished on {}", session.annotation_id);
        Some(DragCommit {
            annotation_id: session.annotation_id,
            coordinates,
        })
    }

    /// Drop the ghost without committing.
    pub fn cancel(&mut self, renderer: &mut dyn Renderer) {
        if let Some(session) = self.session.take() {
            renderer.remove_primitive(session.ghost);
            renderer.draw(Surface::Interaction);
            log::debug!("✋ Drag cancelled on {}", session.annotation_id);
        }
    }
}
