//! Reconciliation of desired annotations against drawn primitives.
//!
//! The reconciler owns the cache of what has been handed to the renderer,
//! keyed by `(layer_id, annotation_id)`. Each pass computes a pure
//! [`ReconcilePlan`] and then applies it, so a second pass over unchanged
//! inputs emits nothing.

use std::collections::{BTreeMap, BTreeSet};

use annolayer_geom::Point;

use crate::color::Color;
use crate::filter::LayerAnnotationMap;
use crate::hit::Candidate;
use crate::model::{Annotation, AnnotationId, AnnotationShape, ConnectionId, Layer, LayerId, Scene};
use crate::render::{PrimitiveHandle, PrimitiveKind, PrimitiveSpec, Renderer, Surface, to_display};
use crate::selection::Selection;
use crate::style::{AnnotationStyle, BaseStyle, resolve_style};

/// Key of a drawn annotation primitive.
pub type PrimitiveKey = (LayerId, AnnotationId);

/// Inputs of style resolution besides the annotation itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyleFlags {
    pub hovered: bool,
    pub selected: bool,
    pub tool_highlighted: bool,
    /// Annotation colour, else layer colour.
    pub color: Option<String>,
}

impl StyleFlags {
    /// Resolve the style these flags describe.
    pub fn style(&self, base: &BaseStyle) -> AnnotationStyle {
        let color = self.color.as_deref().and_then(|text| match Color::parse(text) {
            Ok(color) => Some(color),
            Err(e) => {
                log::warn!("⚠️ {}", e);
                None
            }
        });
        resolve_style(
            base,
            color.as_ref(),
            self.hovered || self.tool_highlighted,
            self.selected,
        )
    }
}

/// Per-pass view of hover, selection and tool highlights.
#[derive(Debug, Clone, Copy)]
pub struct StyleContext<'a> {
    pub base: &'a BaseStyle,
    pub selection: &'a Selection,
    pub tool_highlighted: &'a BTreeSet<AnnotationId>,
}

impl StyleContext<'_> {
    pub fn flags(&self, annotation: &Annotation, layer: &Layer) -> StyleFlags {
        StyleFlags {
            hovered: self.selection.hovered() == Some(annotation.id.as_str()),
            selected: self.selection.is_selected(&annotation.id),
            tool_highlighted: self.tool_highlighted.contains(&annotation.id),
            color: annotation.color.clone().or_else(|| Some(layer.color.clone())),
        }
    }
}

/// One annotation primitive handed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawnPrimitive {
    pub handle: PrimitiveHandle,
    pub layer_id: LayerId,
    pub annotation_id: AnnotationId,
    pub flags: StyleFlags,
    pub style: AnnotationStyle,
    pub shape: AnnotationShape,
    /// Logical coordinates after unroll offsets, before the renderer transform.
    pub coordinates: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq)]
struct DrawnConnection {
    handle: PrimitiveHandle,
    endpoints: (Point, Point),
}

/// Commands a reconcile pass will issue.
///
/// A shape change shows up in both `to_remove` and `to_create`. Removals are
/// applied first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    pub to_create: Vec<PrimitiveKey>,
    pub to_remove: Vec<PrimitiveKey>,
    pub to_restyle: Vec<(PrimitiveKey, StyleFlags)>,
    /// New logical coordinates for primitives whose shape is unchanged.
    pub to_move: Vec<(PrimitiveKey, Vec<Point>)>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty()
            && self.to_remove.is_empty()
            && self.to_restyle.is_empty()
            && self.to_move.is_empty()
    }
}

fn same_coordinates(a: &[Point], b: &[Point]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(p, q)| p.approx_eq(q, EPSILON))
}

/// Connection lines changed by a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionDiff {
    pub created: Vec<ConnectionId>,
    pub removed: Vec<ConnectionId>,
}

impl ConnectionDiff {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.removed.is_empty()
    }
}

const EPSILON: f64 = 1e-9;

/// Cache of drawn annotation and connection primitives.
#[derive(Debug, Default)]
pub struct Reconciler {
    drawn: BTreeMap<PrimitiveKey, DrawnPrimitive>,
    connections: BTreeMap<ConnectionId, DrawnConnection>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Annotations
    // ========================================================================

    /// Compute the commands needed to reach `desired`. Pure.
    pub fn plan(&self, desired: &LayerAnnotationMap, scene: &Scene, ctx: &StyleContext<'_>) -> ReconcilePlan {
        let mut plan = ReconcilePlan::default();

        for (layer_id, annotation_id) in desired.pairs() {
            let key = (layer_id.clone(), annotation_id.clone());
            match self.drawn.get(&key) {
                None => plan.to_create.push(key),
                Some(drawn) => {
                    let (Some(annotation), Some(layer)) =
                        (scene.annotation(annotation_id), scene.layer(layer_id))
                    else {
                        continue;
                    };
                    if annotation.shape != drawn.shape {
                        plan.to_remove.push(key.clone());
                        plan.to_create.push(key);
                        continue;
                    }
                    let coordinates = scene.display_coordinates(annotation);
                    if !same_coordinates(&coordinates, &drawn.coordinates) {
                        plan.to_move.push((key.clone(), coordinates));
                    }
                    let flags = ctx.flags(annotation, layer);
                    if flags != drawn.flags {
                        plan.to_restyle.push((key, flags));
                    }
                }
            }
        }

        plan.to_remove.extend(
            self.drawn
                .keys()
                .filter(|(layer_id, annotation_id)| !desired.contains(layer_id, annotation_id))
                .cloned(),
        );

        plan
    }

    /// Issue a plan's commands and update the cache.
    pub fn apply(
        &mut self,
        plan: &ReconcilePlan,
        scene: &Scene,
        ctx: &StyleContext<'_>,
        renderer: &mut dyn Renderer,
    ) {
        for key in &plan.to_remove {
            if let Some(drawn) = self.drawn.remove(key) {
                renderer.remove_primitive(drawn.handle);
            }
        }

        for key in &plan.to_create {
            let (layer_id, annotation_id) = key;
            let (Some(annotation), Some(layer)) = (scene.annotation(annotation_id), scene.layer(layer_id))
            else {
                log::debug!("Skipping {}/{}: no longer in scene", layer_id, annotation_id);
                continue;
            };
            let flags = ctx.flags(annotation, layer);
            let style = flags.style(ctx.base);
            let coordinates = scene.display_coordinates(annotation);
            let spec = PrimitiveSpec::new(
                Surface::Annotations,
                PrimitiveKind::Annotation,
                annotation.shape,
                to_display(renderer, &coordinates),
                style,
            )
            .for_annotation(layer_id, annotation_id);
            let handle = renderer.create_primitive(spec);
            self.drawn.insert(
                key.clone(),
                DrawnPrimitive {
                    handle,
                    layer_id: layer_id.clone(),
                    annotation_id: annotation_id.clone(),
                    flags,
                    style,
                    shape: annotation.shape,
                    coordinates,
                },
            );
        }

        for (key, coordinates) in &plan.to_move {
            if let Some(drawn) = self.drawn.get_mut(key) {
                renderer.set_primitive_coordinates(drawn.handle, &to_display(renderer, coordinates));
                drawn.coordinates = coordinates.clone();
            }
        }

        for (key, flags) in &plan.to_restyle {
            if let Some(drawn) = self.drawn.get_mut(key) {
                let style = flags.style(ctx.base);
                renderer.restyle_primitive(drawn.handle, &style);
                drawn.flags = flags.clone();
                drawn.style = style;
            }
        }
    }

    /// Plan and apply in one pass. `redraw = false` leaves flushing to the caller.
    pub fn reconcile(
        &mut self,
        desired: &LayerAnnotationMap,
        scene: &Scene,
        ctx: &StyleContext<'_>,
        renderer: &mut dyn Renderer,
        redraw: bool,
    ) -> ReconcilePlan {
        let plan = self.plan(desired, scene, ctx);
        if !plan.is_empty() {
            log::debug!(
                "🎨 Reconcile: {} create, {} remove, {} restyle, {} move",
                plan.to_create.len(),
                plan.to_remove.len(),
                plan.to_restyle.len(),
                plan.to_move.len()
            );
            self.apply(&plan, scene, ctx, renderer);
        }
        if redraw {
            renderer.draw(Surface::Annotations);
        }
        plan
    }

    /// Remove every drawn annotation and connection primitive.
    pub fn clear(&mut self, renderer: &mut dyn Renderer, redraw: bool) {
        for drawn in std::mem::take(&mut self.drawn).into_values() {
            renderer.remove_primitive(drawn.handle);
        }
        self.clear_connections(renderer);
        if redraw {
            renderer.draw(Surface::Annotations);
        }
    }

    pub fn drawn(&self) -> impl Iterator<Item = &DrawnPrimitive> {
        self.drawn.values()
    }

    pub fn is_drawn(&self, layer_id: &str, annotation_id: &str) -> bool {
        self.drawn
            .contains_key(&(layer_id.to_string(), annotation_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.drawn.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drawn.is_empty()
    }

    /// Drawn annotations still present in `scene`, for hit testing.
    pub fn hit_candidates<'a>(&'a self, scene: &'a Scene) -> Vec<Candidate<'a>> {
        self.drawn
            .values()
            .filter_map(|drawn| {
                scene.annotation(&drawn.annotation_id).map(|annotation| Candidate {
                    annotation,
                    style: &drawn.style,
                })
            })
            .collect()
    }

    // ========================================================================
    // Connections
    // ========================================================================

    /// Draw a line for every connection whose endpoints are both displayed.
    pub fn reconcile_connections(
        &mut self,
        scene: &Scene,
        displayed: &BTreeSet<AnnotationId>,
        base: &BaseStyle,
        renderer: &mut dyn Renderer,
    ) -> ConnectionDiff {
        let mut desired: BTreeMap<&ConnectionId, (Point, Point)> = BTreeMap::new();
        for connection in &scene.connections {
            if !displayed.contains(&connection.parent_id) || !displayed.contains(&connection.child_id) {
                log::trace!("Connection {} has an endpoint off screen", connection.id);
                continue;
            }
            let endpoints = scene
                .annotation(&connection.parent_id)
                .and_then(|a| scene.display_centroid(a))
                .zip(
                    scene
                        .annotation(&connection.child_id)
                        .and_then(|a| scene.display_centroid(a)),
                );
            match endpoints {
                Some(endpoints) => {
                    desired.insert(&connection.id, endpoints);
                }
                None => log::trace!("Connection {} has a dangling endpoint", connection.id),
            }
        }

        let mut diff = ConnectionDiff::default();

        let stale: Vec<ConnectionId> = self
            .connections
            .iter()
            .filter(|(id, drawn)| {
                desired.get(id).is_none_or(|(a, b)| {
                    !drawn.endpoints.0.approx_eq(a, EPSILON) || !drawn.endpoints.1.approx_eq(b, EPSILON)
                })
            })
            .map(|(id, _)| id.clone())
            .collect();
        for id in stale {
            if let Some(drawn) = self.connections.remove(&id) {
                renderer.remove_primitive(drawn.handle);
                diff.removed.push(id);
            }
        }

        for (id, (parent, child)) in desired {
            if self.connections.contains_key(id) {
                continue;
            }
            let coordinates = to_display(renderer, &[parent, child]);
            let spec = PrimitiveSpec::new(
                Surface::Annotations,
                PrimitiveKind::Connection,
                AnnotationShape::Line,
                coordinates,
                AnnotationStyle::connection(base),
            )
            .for_connection(id);
            let handle = renderer.create_primitive(spec);
            self.connections.insert(
                id.clone(),
                DrawnConnection {
                    handle,
                    endpoints: (parent, child),
                },
            );
            diff.created.push(id.clone());
        }

        if !diff.is_empty() {
            log::debug!(
                "🔗 Connections: {} created, {} removed",
                diff.created.len(),
                diff.removed.len()
            );
        }
        diff
    }

    pub fn clear_connections(&mut self, renderer: &mut dyn Renderer) {
        for drawn in std::mem::take(&mut self.connections).into_values() {
            renderer.remove_primitive(drawn.handle);
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}
