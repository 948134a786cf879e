//! Pointer input and the shift-drag selection path.

use annolayer_geom::Point;

use crate::gesture::{Gesture, GestureMode};
use crate::model::AnnotationShape;
use crate::render::{PrimitiveHandle, PrimitiveKind, PrimitiveSpec, Renderer, Surface, to_display};
use crate::style::{AnnotationStyle, BaseStyle};

/// Keyboard modifiers held during a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };
}

/// A pointer event from the host.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerEvent {
    /// Display coordinates; `None` when the pointer left the view.
    pub position: Option<Point>,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: Some(Point::new(x, y)),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Event without a position.
    pub fn outside() -> Self {
        Self::default()
    }

    /// Position in logical coordinates.
    pub fn logical_position(&self, renderer: &dyn Renderer) -> Option<Point> {
        self.position.map(|p| renderer.display_to_logical(p))
    }
}

/// Free-hand selection path drawn with shift held.
#[derive(Debug, Default)]
pub struct MousePath {
    points: Option<Vec<Point>>,
    preview: Option<PrimitiveHandle>,
}

impl MousePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.points.is_some()
    }

    pub fn len(&self) -> usize {
        self.points.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start a path on shift + mouse-down. Returns whether one started.
    pub fn press(&mut self, event: &PointerEvent, renderer: &dyn Renderer) -> bool {
        if !event.modifiers.shift {
            return false;
        }
        let Some(position) = event.logical_position(renderer) else {
            return false;
        };
        self.points = Some(vec![position]);
        true
    }

    /// Append the pointer position and refresh the preview line.
    pub fn motion(&mut self, event: &PointerEvent, base: &BaseStyle, renderer: &mut dyn Renderer) {
        let Some(position) = event.logical_position(renderer) else {
            return;
        };
        let Some(points) = self.points.as_mut() else {
            return;
        };
        points.push(position);
        if points.len() < 2 {
            return;
        }

        let coordinates = to_display(renderer, points);
        match self.preview {
            Some(handle) => renderer.set_primitive_coordinates(handle, &coordinates),
            None => {
                let spec = PrimitiveSpec::new(
                    Surface::Interaction,
                    PrimitiveKind::SelectionPath,
                    AnnotationShape::Line,
                    coordinates,
                    AnnotationStyle::preview(base),
                );
                self.preview = Some(renderer.create_primitive(spec));
            }
        }
        renderer.draw(Surface::Interaction);
    }

    /// Finish the path on mouse-up and turn it into a selection gesture.
    ///
    /// One vertex selects like a click, more like a lasso.
    pub fn release(&mut self, renderer: &mut dyn Renderer) -> Option<Gesture> {
        let points = self.points.take()?;
        self.remove_preview(renderer);
        match points.len() {
            0 => None,
            1 => Some(Gesture::new(GestureMode::Point, points)),
            _ => Some(Gesture::new(GestureMode::Polygon, points)),
        }
    }

    pub fn cancel(&mut self, renderer: &mut dyn Renderer) {
        self.points = None;
        self.remove_preview(renderer);
    }

    fn remove_preview(&mut self, renderer: &mut dyn Renderer) {
        if let Some(handle) = self.preview.take() {
            renderer.remove_primitive(handle);
            renderer.draw(Surface::Interaction);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingRenderer;

    #[test]
    fn test_press_needs_shift_and_position() {
        let renderer = RecordingRenderer::default();
        let mut path = MousePath::new();
        assert!(!path.press(&PointerEvent::at(1.0, 1.0), &renderer));
        assert!(!path.press(&PointerEvent::outside().with_modifiers(Modifiers::SHIFT), &renderer));
        assert!(path.press(&PointerEvent::at(1.0, 1.0).with_modifiers(Modifiers::SHIFT), &renderer));
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_single_point_is_a_click() {
        let mut renderer = RecordingRenderer::default();
        let mut path = MousePath::new();
        path.press(&PointerEvent::at(1.0, 2.0).with_modifiers(Modifiers::SHIFT), &renderer);
        let gesture = path.release(&mut renderer).unwrap();
        assert_eq!(gesture.mode, GestureMode::Point);
        assert_eq!(gesture.coordinates, vec![Point::new(1.0, 2.0)]);
        assert_eq!(renderer.created, 0);
    }

    #[test]
    fn test_path_becomes_lasso_with_preview() {
        let mut renderer = RecordingRenderer::default();
        let base = BaseStyle::default();
        let mut path = MousePath::new();
        path.press(&PointerEvent::at(0.0, 0.0).with_modifiers(Modifiers::SHIFT), &renderer);
        path.motion(&PointerEvent::at(10.0, 0.0), &base, &mut renderer);
        path.motion(&PointerEvent::outside(), &base, &mut renderer);
        path.motion(&PointerEvent::at(10.0, 10.0), &base, &mut renderer);
        assert_eq!(renderer.created, 1);
        assert_eq!(renderer.moved, 1);

        let gesture = path.release(&mut renderer).unwrap();
        assert_eq!(gesture.mode, GestureMode::Polygon);
        assert_eq!(gesture.coordinates.len(), 3);
        assert_eq!(renderer.live_count(), 0);
        assert!(!path.is_active());
    }

    #[test]
    fn test_release_without_path() {
        let mut renderer = RecordingRenderer::default();
        let mut path = MousePath::new();
        assert!(path.release(&mut renderer).is_none());
    }
}
