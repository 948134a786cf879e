//! Global constants for the annotation engine

/// Default point annotation radius
pub const DEFAULT_ANNOTATIONS_RADIUS: f64 = 10.0;

/// Default fill opacity for area annotations
pub const DEFAULT_ANNOTATION_OPACITY: f64 = 0.5;

/// Default half-width of the timelapse time window
pub const DEFAULT_TIMELAPSE_WINDOW: u32 = 5;

/// Default cap on live segmentation preview size, as a share of the viewport
pub const DEFAULT_SAM_PREVIEW_MAX_VIEWPORT_FRACTION: f64 = 0.7;

/// Default vertex count for circles and ellipses turned into polygons
pub const DEFAULT_ELLIPSE_POLYGON_SEGMENTS: usize = 64;

/// Stroke width of an unselected annotation
pub const STROKE_WIDTH: f64 = 4.0;

/// Stroke width of a hovered annotation
pub const HOVERED_STROKE_WIDTH: f64 = 5.0;

/// Stroke width of a selected annotation
pub const SELECTED_STROKE_WIDTH: f64 = 6.0;

/// Stroke darkening applied to explicitly coloured annotations
pub const STROKE_DARKEN_FACTOR: f64 = 0.75;

/// Stroke width of connection lines
pub const CONNECTION_STROKE_WIDTH: f64 = 2.0;

/// Stroke width of timelapse track lines
pub const TRACK_STROKE_WIDTH: f64 = 3.0;

/// Radius of timelapse track points
pub const TRACK_POINT_RADIUS: f64 = 4.0;

/// Opacity of the drag ghost
pub const GHOST_OPACITY: f64 = 0.5;

/// Radius of segmentation prompt markers
pub const SAM_PROMPT_RADIUS: f64 = 6.0;

/// Hue step between successive timelapse tracks (golden angle, degrees)
pub const TRACK_HUE_STEP: f64 = 137.508;
