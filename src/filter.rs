//! Dimension filter: which annotations each layer displays.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Annotation, AnnotationId, Axis, Layer, LayerId, Scene, SliceIndices, SliceSpec, UnrollFlags};

// ============================================================================
// Visibility predicate
// ============================================================================

/// Per-axis rule: unrolled axes and max-merge match everything.
fn axis_matches(spec: SliceSpec, unrolled: bool, annotation_index: u32, global_index: u32) -> bool {
    if unrolled {
        return true;
    }
    match spec {
        SliceSpec::MaxMerge => true,
        SliceSpec::FixedValue(value) => annotation_index == value,
        SliceSpec::Current => annotation_index == global_index,
    }
}

/// Whether `layer` displays `annotation` at the given slice.
pub fn visible(
    annotation: &Annotation,
    layer: &Layer,
    indices: &SliceIndices,
    unroll: UnrollFlags,
    show_hidden: bool,
) -> bool {
    if !layer.visible && !show_hidden {
        return false;
    }
    if annotation.channel != layer.channel {
        return false;
    }
    Axis::ALL.iter().all(|&axis| {
        axis_matches(
            layer.spec(axis),
            unroll.get(axis),
            annotation.location.get(axis),
            indices.get(axis),
        )
    })
}

/// [`visible`] using the scene's slice, unroll flags and hidden-layer setting.
pub fn layer_displays_annotation(layer: &Layer, annotation: &Annotation, scene: &Scene) -> bool {
    visible(annotation, layer, &scene.indices, scene.unroll, scene.show_hidden_layers)
}

// ============================================================================
// Layer to annotation mapping
// ============================================================================

/// Which annotations each in-range layer displays, with the reverse index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayerAnnotationMap {
    pub by_layer: BTreeMap<LayerId, BTreeSet<AnnotationId>>,
    pub by_annotation: BTreeMap<AnnotationId, BTreeSet<LayerId>>,
    /// Union of every layer's annotations.
    pub displayed_ids: BTreeSet<AnnotationId>,
}

impl LayerAnnotationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `layer_id` displays `annotation_id`.
    pub fn insert(&mut self, layer_id: &str, annotation_id: &str) {
        self.by_layer
            .entry(layer_id.to_string())
            .or_default()
            .insert(annotation_id.to_string());
        self.by_annotation
            .entry(annotation_id.to_string())
            .or_default()
            .insert(layer_id.to_string());
        self.displayed_ids.insert(annotation_id.to_string());
    }

    pub fn contains(&self, layer_id: &str, annotation_id: &str) -> bool {
        self.by_layer
            .get(layer_id)
            .is_some_and(|ids| ids.contains(annotation_id))
    }

    /// Every (layer, annotation) pair, ordered by layer then annotation.
    pub fn pairs(&self) -> impl Iterator<Item = (&LayerId, &AnnotationId)> {
        self.by_layer
            .iter()
            .flat_map(|(layer, ids)| ids.iter().map(move |id| (layer, id)))
    }

    pub fn len(&self) -> usize {
        self.by_layer.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.displayed_ids.is_empty()
    }
}

fn collect_map(scene: &Scene, unroll: UnrollFlags) -> LayerAnnotationMap {
    let mut map = LayerAnnotationMap::new();
    for layer in scene.valid_layers() {
        for annotation in scene.annotations() {
            if visible(annotation, layer, &scene.indices, unroll, scene.show_hidden_layers) {
                map.insert(&layer.id, &annotation.id);
            }
        }
    }
    map
}

/// Annotations displayed by each layer in the scene's layer range.
pub fn layer_annotations(scene: &Scene) -> LayerAnnotationMap {
    let map = collect_map(scene, scene.unroll);
    log::trace!(
        "🔍 {} annotations displayed on {} layers",
        map.displayed_ids.len(),
        map.by_layer.len()
    );
    map
}

/// Annotations displayed at any time index, other axes unchanged.
pub fn displayed_annotation_ids_across_time(scene: &Scene) -> BTreeSet<AnnotationId> {
    let unroll = UnrollFlags {
        time: true,
        ..scene.unroll
    };
    collect_map(scene, unroll).displayed_ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnnotationShape, LayerRange, Location};
    use annolayer_geom::Point;

    fn point(id: &str, channel: u32, location: Location) -> Annotation {
        Annotation::new(id, AnnotationShape::Point, vec![Point::new(0.0, 0.0)])
            .with_channel(channel)
            .with_location(location)
    }

    #[test]
    fn test_current_slice_matches_global_index() {
        let layer = Layer::new("l", 0, "#fff");
        let ann = point("a", 0, Location::new(0, 2, 0));
        assert!(visible(&ann, &layer, &Location::new(0, 2, 0), UnrollFlags::default(), false));
        assert!(!visible(&ann, &layer, &Location::new(0, 3, 0), UnrollFlags::default(), false));
    }

    #[test]
    fn test_fixed_value_ignores_global_index() {
        let layer = Layer::new("l", 0, "#fff").with_spec(Axis::Z, SliceSpec::FixedValue(3));
        let ann = point("a", 0, Location::new(0, 3, 0));
        assert!(visible(&ann, &layer, &Location::new(0, 0, 0), UnrollFlags::default(), false));
        let other = point("b", 0, Location::new(0, 0, 0));
        assert!(!visible(&other, &layer, &Location::new(0, 0, 0), UnrollFlags::default(), false));
    }

    #[test]
    fn test_max_merge_and_unroll_match_everything() {
        let layer = Layer::new("l", 0, "#fff").with_spec(Axis::Time, SliceSpec::MaxMerge);
        let ann = point("a", 0, Location::new(0, 0, 9));
        assert!(visible(&ann, &layer, &Location::new(0, 0, 0), UnrollFlags::default(), false));

        let layer = Layer::new("l", 0, "#fff");
        let unroll = UnrollFlags { xy: false, z: false, time: true };
        assert!(visible(&ann, &layer, &Location::new(0, 0, 0), unroll, false));
    }

    #[test]
    fn test_channel_must_match() {
        let layer = Layer::new("l", 1, "#fff");
        let ann = point("a", 0, Location::default());
        assert!(!visible(&ann, &layer, &Location::default(), UnrollFlags::default(), false));
    }

    #[test]
    fn test_hidden_layer_contributes_nothing() {
        let layer = Layer::new("l", 0, "#fff").hidden();
        let ann = point("a", 0, Location::default());
        assert!(!visible(&ann, &layer, &Location::default(), UnrollFlags::default(), false));
        assert!(visible(&ann, &layer, &Location::default(), UnrollFlags::default(), true));
    }

    #[test]
    fn test_layer_annotations_respects_layer_range() {
        let scene = Scene::new(
            vec![point("a0", 0, Location::default()), point("a1", 1, Location::default())],
            vec![],
            vec![Layer::new("l0", 0, "#fff"), Layer::new("l1", 1, "#fff")],
        )
        .with_layer_range(LayerRange::new(1, 1));

        let map = layer_annotations(&scene);
        assert!(!map.by_layer.contains_key("l0"));
        assert!(map.contains("l1", "a1"));
        assert_eq!(map.displayed_ids.len(), 1);
        assert_eq!(map.by_annotation["a1"].len(), 1);
    }

    #[test]
    fn test_annotation_on_two_layers() {
        let scene = Scene::new(
            vec![point("a", 0, Location::default())],
            vec![],
            vec![Layer::new("l0", 0, "#fff"), Layer::new("l1", 0, "#000")],
        );
        let map = layer_annotations(&scene);
        assert_eq!(map.len(), 2);
        assert_eq!(map.displayed_ids.len(), 1);
        assert_eq!(map.by_annotation["a"].len(), 2);
    }

    #[test]
    fn test_displayed_across_time() {
        let scene = Scene::new(
            vec![
                point("t0", 0, Location::new(0, 0, 0)),
                point("t5", 0, Location::new(0, 0, 5)),
                point("z1", 0, Location::new(0, 1, 5)),
            ],
            vec![],
            vec![Layer::new("l", 0, "#fff")],
        );
        let ids = displayed_annotation_ids_across_time(&scene);
        assert!(ids.contains("t0"));
        assert!(ids.contains("t5"));
        assert!(!ids.contains("z1"));
        assert_eq!(layer_annotations(&scene).displayed_ids.len(), 1);
    }
}
