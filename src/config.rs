//! Engine configuration.
//!
//! Settings the host exposes to users: drawing toggles, base style values,
//! timelapse parameters and the global selection mode. Serialized as JSON so
//! hosts can persist them next to their own preferences.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::selection::SelectionMode;

/// Log level setting for the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Engine configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// Base radius of point annotations
    #[serde(default = "default_annotations_radius")]
    pub annotations_radius: f64,

    /// Base fill opacity of area annotations
    #[serde(default = "default_annotation_opacity")]
    pub annotation_opacity: f64,

    /// Sizes are screen pixels and hit tolerances follow the zoom level
    #[serde(default = "default_true")]
    pub scale_annotations_with_zoom: bool,

    /// Draw annotations at all
    #[serde(default = "default_true")]
    pub draw_annotations: bool,

    /// Draw connection lines between annotations
    #[serde(default = "default_true")]
    pub draw_connections: bool,

    /// Draw timelapse tracks
    #[serde(default)]
    pub show_timelapse_mode: bool,

    /// Half-width of the time window around the current Time index
    #[serde(default = "default_timelapse_window")]
    pub timelapse_window: u32,

    /// Track members must carry one of these tags (empty: no restriction)
    #[serde(default)]
    pub timelapse_tags: Vec<String>,

    /// Label track points with their time index
    #[serde(default = "default_true")]
    pub show_timelapse_labels: bool,

    /// Largest share of the viewport a live segmentation preview may cover
    #[serde(default = "default_sam_preview_fraction")]
    pub sam_preview_max_viewport_fraction: f64,

    /// Vertex count used when circles and ellipses become polygons
    #[serde(default = "default_ellipse_segments")]
    pub ellipse_polygon_segments: usize,

    /// How select gestures change the current selection
    #[serde(default)]
    pub selection_mode: SelectionMode,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_annotations_radius() -> f64 {
    crate::constants::DEFAULT_ANNOTATIONS_RADIUS
}

fn default_annotation_opacity() -> f64 {
    crate::constants::DEFAULT_ANNOTATION_OPACITY
}

fn default_true() -> bool {
    true
}

fn default_timelapse_window() -> u32 {
    crate::constants::DEFAULT_TIMELAPSE_WINDOW
}

fn default_sam_preview_fraction() -> f64 {
    crate::constants::DEFAULT_SAM_PREVIEW_MAX_VIEWPORT_FRACTION
}

fn default_ellipse_segments() -> usize {
    crate::constants::DEFAULT_ELLIPSE_POLYGON_SEGMENTS
}

impl EngineConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            annotations_radius: default_annotations_radius(),
            annotation_opacity: default_annotation_opacity(),
            scale_annotations_with_zoom: true,
            draw_annotations: true,
            draw_connections: true,
            show_timelapse_mode: false,
            timelapse_window: default_timelapse_window(),
            timelapse_tags: Vec::new(),
            show_timelapse_labels: true,
            sam_preview_max_viewport_fraction: default_sam_preview_fraction(),
            ellipse_polygon_segments: default_ellipse_segments(),
            selection_mode: SelectionMode::default(),
            log_level: LogLevel::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Get the default filename for config export.
    pub fn default_filename() -> &'static str {
        "annolayer-config.json"
    }

    /// Load configuration from a JSON file.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Save configuration to a JSON file, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }

    /// Cap the `log` facade at the configured level.
    pub fn apply_log_level(&self) {
        log::set_max_level(self.log_level.to_level_filter());
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
