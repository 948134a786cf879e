//! Property tests for visibility, connectivity and reconciliation.

use std::collections::{BTreeSet, HashMap};

use annolayer::connectivity::components;
use annolayer::filter::{layer_annotations, visible};
use annolayer::hit::point_near_point;
use annolayer::model::{Location, SliceSpec, UnrollFlags};
use annolayer::reconcile::{Reconciler, StyleContext};
use annolayer::style::BaseStyle;
use annolayer::{Annotation, AnnotationShape, Connection, Layer, Point, Scene, Selection, SelectionMode};
use annolayer::test_support::RecordingRenderer;
use proptest::prelude::*;

fn slice_spec() -> impl Strategy<Value = SliceSpec> {
    prop_oneof![
        Just(SliceSpec::Current),
        Just(SliceSpec::MaxMerge),
        (0u32..4).prop_map(SliceSpec::FixedValue),
    ]
}

fn location() -> impl Strategy<Value = Location> {
    (0u32..4, 0u32..4, 0u32..4).prop_map(|(xy, z, time)| Location::new(xy, z, time))
}

fn unroll_flags() -> impl Strategy<Value = UnrollFlags> {
    (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(xy, z, time)| UnrollFlags { xy, z, time })
}

fn layer(xy: SliceSpec, z: SliceSpec, time: SliceSpec) -> Layer {
    let mut layer = Layer::new("layer", 0, "#ffffff");
    layer.xy = xy;
    layer.z = z;
    layer.time = time;
    layer
}

fn axis_rule(spec: SliceSpec, unrolled: bool, at: u32, current: u32) -> bool {
    unrolled
        || match spec {
            SliceSpec::MaxMerge => true,
            SliceSpec::FixedValue(value) => at == value,
            SliceSpec::Current => at == current,
        }
}

proptest! {
    #[test]
    fn visibility_is_the_conjunction_of_axis_rules(
        specs in (slice_spec(), slice_spec(), slice_spec()),
        at in location(),
        indices in location(),
        unroll in unroll_flags(),
    ) {
        let layer = layer(specs.0, specs.1, specs.2);
        let annotation = Annotation::new("a", AnnotationShape::Point, vec![Point::new(0.0, 0.0)])
            .with_location(at);
        let expected = axis_rule(specs.0, unroll.xy, at.xy, indices.xy)
            && axis_rule(specs.1, unroll.z, at.z, indices.z)
            && axis_rule(specs.2, unroll.time, at.time, indices.time);
        prop_assert_eq!(visible(&annotation, &layer, &indices, unroll, false), expected);
    }

    #[test]
    fn unrolling_never_hides(
        specs in (slice_spec(), slice_spec(), slice_spec()),
        at in location(),
        indices in location(),
        unroll in unroll_flags(),
    ) {
        let layer = layer(specs.0, specs.1, specs.2);
        let annotation = Annotation::new("a", AnnotationShape::Point, vec![Point::new(0.0, 0.0)])
            .with_location(at);

        let rolled = visible(&annotation, &layer, &indices, UnrollFlags::default(), false);
        let unrolled = visible(&annotation, &layer, &indices, unroll, false);
        prop_assert!(!rolled || unrolled);

        let everything = UnrollFlags { xy: true, z: true, time: true };
        prop_assert!(visible(&annotation, &layer, &indices, everything, false));
    }

    #[test]
    fn other_channels_and_hidden_layers_show_nothing(
        at in location(),
        indices in location(),
        unroll in unroll_flags(),
    ) {
        let merged = layer(SliceSpec::MaxMerge, SliceSpec::MaxMerge, SliceSpec::MaxMerge);
        let annotation = Annotation::new("a", AnnotationShape::Point, vec![Point::new(0.0, 0.0)])
            .with_location(at);
        prop_assert!(visible(&annotation, &merged, &indices, unroll, false));
        prop_assert!(!visible(&annotation.clone().with_channel(1), &merged, &indices, unroll, false));
        prop_assert!(!visible(&annotation, &merged.clone().hidden(), &indices, unroll, false));
        prop_assert!(visible(&annotation, &merged.hidden(), &indices, unroll, true));
    }

    #[test]
    fn components_partition_connections(
        edges in prop::collection::vec((0u8..8, 0u8..8), 0..20),
    ) {
        let connections: Vec<Connection> = edges
            .iter()
            .enumerate()
            .filter_map(|(i, (a, b))| Connection::new(format!("c{i}"), format!("a{a}"), format!("a{b}")))
            .collect();
        let found = components(&connections);

        let total: usize = found.iter().map(|c| c.connections.len()).sum();
        prop_assert_eq!(total, connections.len());

        let endpoints: BTreeSet<String> = connections
            .iter()
            .flat_map(|c| [c.parent_id.clone(), c.child_id.clone()])
            .collect();
        let sizes: usize = found.iter().map(|c| c.annotations.len()).sum();
        prop_assert_eq!(sizes, endpoints.len());

        let mut owner = HashMap::new();
        for (index, component) in found.iter().enumerate() {
            for id in &component.annotations {
                prop_assert!(owner.insert(id.clone(), index).is_none());
            }
            for connection in &component.connections {
                prop_assert!(component.annotations.contains(&connection.parent_id));
                prop_assert!(component.annotations.contains(&connection.child_id));
            }
            prop_assert!(component.connections.len() + 1 >= component.annotations.len());
            if component.has_cycle() {
                prop_assert!(component.connections.len() >= component.annotations.len());
            }
        }
    }

    #[test]
    fn second_reconcile_is_a_no_op(
        locations in prop::collection::vec(location(), 1..12),
        indices in location(),
        selected in prop::collection::btree_set(0usize..12, 0..4),
    ) {
        let annotations: Vec<Annotation> = locations
            .iter()
            .enumerate()
            .map(|(i, at)| {
                Annotation::new(format!("a{i}"), AnnotationShape::Point, vec![Point::new(i as f64, 0.0)])
                    .with_location(*at)
            })
            .collect();
        let layers = vec![
            Layer::new("current", 0, "#ff0000"),
            layer(SliceSpec::Current, SliceSpec::MaxMerge, SliceSpec::FixedValue(1)),
        ];
        let scene = Scene::new(annotations, vec![], layers).with_indices(indices);

        let base = BaseStyle::default();
        let mut selection = Selection::new();
        let ids: Vec<String> = selected.iter().map(|i| format!("a{i}")).collect();
        selection.apply(SelectionMode::Add, &ids);
        let highlighted = BTreeSet::new();
        let ctx = StyleContext { base: &base, selection: &selection, tool_highlighted: &highlighted };

        let desired = layer_annotations(&scene);
        let mut reconciler = Reconciler::new();
        let mut renderer = RecordingRenderer::default();
        reconciler.reconcile(&desired, &scene, &ctx, &mut renderer, true);

        prop_assert_eq!(reconciler.len(), desired.len());
        prop_assert_eq!(renderer.live.len(), desired.len());
        prop_assert!(reconciler.plan(&desired, &scene, &ctx).is_empty());
    }

    #[test]
    fn point_hits_are_symmetric(
        ax in -100.0f64..100.0, ay in -100.0f64..100.0,
        bx in -100.0f64..100.0, by in -100.0f64..100.0,
        radius in 0.0f64..20.0,
        upp in 0.1f64..4.0,
    ) {
        let (a, b) = (Point::new(ax, ay), Point::new(bx, by));
        prop_assert_eq!(
            point_near_point(&a, &b, radius, 4.0, upp),
            point_near_point(&b, &a, radius, 4.0, upp)
        );
        prop_assert_eq!(point_near_point(&a, &a, radius, 4.0, upp), radius > 0.0);
    }

    #[test]
    fn toggle_twice_restores_selection(
        initial in prop::collection::btree_set("[a-d]", 0..4),
        toggled in prop::collection::btree_set("[a-f]", 0..6),
    ) {
        let mut selection = Selection::new();
        let initial: Vec<String> = initial.into_iter().collect();
        let toggled: Vec<String> = toggled.into_iter().collect();
        selection.apply(SelectionMode::Add, &initial);
        let before = selection.selected().clone();

        selection.apply(SelectionMode::Toggle, &toggled);
        selection.apply(SelectionMode::Toggle, &toggled);
        prop_assert_eq!(selection.selected(), &before);
    }
}
