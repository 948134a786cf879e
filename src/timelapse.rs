//! Timelapse tracks.
//!
//! A track is a connected component of connections around the current time
//! index, drawn as centroids ordered by time and the lines between them.

use std::collections::BTreeSet;

use annolayer_geom::Point;

use crate::color::Color;
use crate::config::EngineConfig;
use crate::connectivity::components;
use crate::constants::TRACK_HUE_STEP;
use crate::filter::displayed_annotation_ids_across_time;
use crate::model::{AnnotationId, AnnotationShape, Connection, ConnectionId, Scene, tag_cloud_filter};
use crate::render::{PrimitiveKind, PrimitiveSpec, Renderer, Surface, to_display};
use crate::style::{AnnotationStyle, BaseStyle};

/// One annotation of a track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackPoint {
    pub annotation_id: AnnotationId,
    pub time: u32,
    pub position: Point,
}

/// A drawable track.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Ordered by time, then id.
    pub points: Vec<TrackPoint>,
    /// Parent and child centroids of each connection.
    pub segments: Vec<(Point, Point)>,
    pub connection_ids: Vec<ConnectionId>,
}

/// Assemble the tracks around the scene's current time index.
pub fn timelapse_tracks(scene: &Scene, window: u32, tags: &[String]) -> Vec<Track> {
    let present = displayed_annotation_ids_across_time(scene);
    let now = scene.indices.time;
    let (start, end) = (now.saturating_sub(window), now.saturating_add(window));

    let in_window = |id: &str| {
        scene.annotation(id).is_some_and(|annotation| {
            let time = annotation.location.time;
            time >= start
                && time <= end
                && (tags.is_empty() || tag_cloud_filter(&annotation.tags, tags, false))
        })
    };

    let kept: Vec<Connection> = scene
        .connections
        .iter()
        .filter(|c| present.contains(&c.parent_id) && present.contains(&c.child_id))
        .filter(|c| in_window(&c.parent_id) && in_window(&c.child_id))
        .cloned()
        .collect();

    components(&kept)
        .into_iter()
        .filter_map(|component| build_track(scene, &component.annotations, &component.connections))
        .collect()
}

fn build_track(scene: &Scene, members: &BTreeSet<AnnotationId>, connections: &[Connection]) -> Option<Track> {
    let mut points: Vec<TrackPoint> = members
        .iter()
        .filter_map(|id| {
            let annotation = scene.annotation(id)?;
            Some(TrackPoint {
                annotation_id: id.clone(),
                time: annotation.location.time,
                position: scene.display_centroid(annotation)?,
            })
        })
        .collect();
    if points.is_empty() {
        return None;
    }
    points.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.annotation_id.cmp(&b.annotation_id)));

    let position_of = |id: &str| points.iter().find(|p| p.annotation_id == id).map(|p| p.position);
    let mut segments = Vec::new();
    let mut connection_ids = Vec::new();
    for connection in connections {
        if let (Some(a), Some(b)) = (position_of(&connection.parent_id), position_of(&connection.child_id)) {
            segments.push((a, b));
            connection_ids.push(connection.id.clone());
        }
    }

    Some(Track {
        points,
        segments,
        connection_ids,
    })
}

/// Distinct colour for the n-th track.
pub fn track_color(index: usize) -> Color {
    Color::from_hsv(index as f64 * TRACK_HUE_STEP, 0.8, 1.0)
}

/// Draw tracks on the timelapse surface, replacing whatever was there.
///
/// Returns the number of tracks drawn.
pub fn draw_timelapse(scene: &Scene, config: &EngineConfig, renderer: &mut dyn Renderer) -> usize {
    renderer.clear_surface(Surface::Timelapse);
    if !config.show_timelapse_mode {
        renderer.draw(Surface::Timelapse);
        return 0;
    }

    let base = BaseStyle::from_config(config);
    let tracks = timelapse_tracks(scene, config.timelapse_window, &config.timelapse_tags);

    for (index, track) in tracks.iter().enumerate() {
        let color = track_color(index);

        for ((a, b), id) in track.segments.iter().zip(&track.connection_ids) {
            let spec = PrimitiveSpec::new(
                Surface::Timelapse,
                PrimitiveKind::TrackLine,
                AnnotationShape::Line,
                to_display(renderer, &[*a, *b]),
                AnnotationStyle::track_line(&base, color),
            )
            .for_connection(id);
            renderer.create_primitive(spec);
        }

        for point in &track.points {
            let mut spec = PrimitiveSpec::new(
                Surface::Timelapse,
                PrimitiveKind::TrackPoint,
                AnnotationShape::Point,
                to_display(renderer, &[point.position]),
                AnnotationStyle::track_point(&base, color),
            );
            spec.annotation_id = Some(point.annotation_id.clone());
            if config.show_timelapse_labels {
                spec = spec.with_label(format!("t={}", point.time));
            }
            renderer.create_primitive(spec);
        }
    }

    log::debug!("⏱️ Drew {} timelapse tracks", tracks.len());
    renderer.draw(Surface::Timelapse);
    tracks.len()
}
