//! Segmentation overlay: prompts, main output and live preview.

use std::collections::BTreeSet;

use annolayer_geom::{BoundingBox, Point};
use serde::{Deserialize, Serialize};

use crate::model::{AnnotationShape, Location};
use crate::persistence::NewAnnotation;
use crate::render::{PrimitiveHandle, PrimitiveKind, PrimitiveSpec, Renderer, Surface, to_display};
use crate::style::{AnnotationStyle, BaseStyle};
use crate::viewport::Viewport;

/// A user prompt guiding the segmentation model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SamPrompt {
    /// Foreground (positive) or background click.
    Point { point: Point, positive: bool },
    /// Box around the object.
    Box { min: Point, max: Point },
}

/// New overlay content from the segmentation pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SamUpdate {
    pub prompts: Vec<SamPrompt>,
    /// Polygon for the current prompts.
    pub output: Option<Vec<Point>>,
    /// Polygon following the pointer before it is committed as a prompt.
    pub live_preview: Option<Vec<Point>>,
}

/// Overlay content and the primitives drawn for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SamOverlay {
    pub prompts: Vec<SamPrompt>,
    pub output: Option<Vec<Point>>,
    pub live_preview: Option<Vec<Point>>,
    handles: Vec<PrimitiveHandle>,
}

impl SamOverlay {
    /// Replace the overlay content and redraw it.
    ///
    /// A live preview covering more than `max_fraction` of the viewport is
    /// skipped; the model likely segmented the background.
    pub fn update(
        &mut self,
        update: SamUpdate,
        base: &BaseStyle,
        viewport: &Viewport,
        max_fraction: f64,
        renderer: &mut dyn Renderer,
    ) {
        self.remove_primitives(renderer);
        self.prompts = update.prompts;
        self.output = update.output;
        self.live_preview = update.live_preview;

        if let Some(output) = &self.output {
            let spec = PrimitiveSpec::new(
                Surface::Annotations,
                PrimitiveKind::SamOutput,
                AnnotationShape::Polygon,
                to_display(renderer, output),
                AnnotationStyle::sam_output(base),
            );
            self.handles.push(renderer.create_primitive(spec));
        }

        if let Some(preview) = &self.live_preview {
            let coverage = BoundingBox::from_points(preview).map_or(0.0, |b| viewport.coverage(&b));
            if coverage > max_fraction {
                log::debug!("Skipping live preview covering {:.0}% of the view", coverage * 100.0);
            } else {
                let spec = PrimitiveSpec::new(
                    Surface::Annotations,
                    PrimitiveKind::SamLivePreview,
                    AnnotationShape::Polygon,
                    to_display(renderer, preview),
                    AnnotationStyle::preview(base),
                );
                self.handles.push(renderer.create_primitive(spec));
            }
        }

        for prompt in &self.prompts {
            let (shape, coordinates, positive) = match *prompt {
                SamPrompt::Point { point, positive } => (AnnotationShape::Point, vec![point], positive),
                SamPrompt::Box { min, max } => (
                    AnnotationShape::Rectangle,
                    vec![min, Point::new(max.x, min.y), max, Point::new(min.x, max.y)],
                    true,
                ),
            };
            let spec = PrimitiveSpec::new(
                Surface::Annotations,
                PrimitiveKind::SamPrompt,
                shape,
                to_display(renderer, &coordinates),
                AnnotationStyle::sam_prompt(base, positive),
            );
            self.handles.push(renderer.create_primitive(spec));
        }

        renderer.draw(Surface::Annotations);
    }

    /// Remove every overlay primitive and forget the content.
    pub fn clear(&mut self, renderer: &mut dyn Renderer) {
        self.remove_primitives(renderer);
        self.prompts.clear();
        self.output = None;
        self.live_preview = None;
    }

    fn remove_primitives(&mut self, renderer: &mut dyn Renderer) {
        for handle in self.handles.drain(..) {
            renderer.remove_primitive(handle);
        }
    }

    /// Creation request for the main output, if it is a usable polygon.
    pub fn submission(&self, channel: u32, location: Location, tags: BTreeSet<String>) -> Option<NewAnnotation> {
        let output = self.output.as_ref().filter(|output| output.len() >= 3)?;
        Some(NewAnnotation {
            shape: AnnotationShape::Polygon,
            coordinates: output.clone(),
            channel,
            location,
            tags,
        })
    }

    pub fn primitive_count(&self) -> usize {
        self.handles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingRenderer;

    fn square(size: f64) -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(size, 0.0),
            Point::new(size, size),
            Point::new(0.0, size),
        ]
    }

    #[test]
    fn test_large_live_preview_skipped() {
        let mut overlay = SamOverlay::default();
        let mut renderer = RecordingRenderer::default();
        let viewport = Viewport::identity(1000.0, 800.0);

        let update = SamUpdate {
            live_preview: Some(square(900.0)),
            ..Default::default()
        };
        overlay.update(update, &BaseStyle::default(), &viewport, 0.7, &mut renderer);
        assert_eq!(overlay.primitive_count(), 0);

        let update = SamUpdate {
            live_preview: Some(square(100.0)),
            ..Default::default()
        };
        overlay.update(update, &BaseStyle::default(), &viewport, 0.7, &mut renderer);
        assert_eq!(overlay.primitive_count(), 1);
    }

    #[test]
    fn test_update_replaces_primitives() {
        let mut overlay = SamOverlay::default();
        let mut renderer = RecordingRenderer::default();
        let viewport = Viewport::default();
        let update = SamUpdate {
            prompts: vec![
                SamPrompt::Point { point: Point::new(1.0, 1.0), positive: true },
                SamPrompt::Box { min: Point::new(0.0, 0.0), max: Point::new(5.0, 5.0) },
            ],
            output: Some(square(10.0)),
            live_preview: None,
        };
        overlay.update(update.clone(), &BaseStyle::default(), &viewport, 0.7, &mut renderer);
        overlay.update(update, &BaseStyle::default(), &viewport, 0.7, &mut renderer);
        assert_eq!(renderer.live_count(), 3);

        overlay.clear(&mut renderer);
        assert_eq!(renderer.live_count(), 0);
        assert!(overlay.output.is_none());
    }

    #[test]
    fn test_submission_needs_polygon() {
        let mut overlay = SamOverlay::default();
        assert!(overlay.submission(0, Location::default(), BTreeSet::new()).is_none());
        overlay.output = Some(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        assert!(overlay.submission(0, Location::default(), BTreeSet::new()).is_none());
        overlay.output = Some(square(4.0));
        let request = overlay.submission(2, Location::new(0, 1, 3), BTreeSet::new()).unwrap();
        assert_eq!(request.shape, AnnotationShape::Polygon);
        assert_eq!(request.channel, 2);
        assert_eq!(request.location, Location::new(0, 1, 3));
    }
}
