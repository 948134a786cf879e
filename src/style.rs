//! Annotation styles.
//!
//! Styles are derived from the engine configuration and per-annotation flags.
//! The renderer receives a fully resolved [`AnnotationStyle`]; it never has
//! to know about hover or selection.

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::config::EngineConfig;
use crate::constants::{
    CONNECTION_STROKE_WIDTH, GHOST_OPACITY, HOVERED_STROKE_WIDTH, SAM_PROMPT_RADIUS,
    SELECTED_STROKE_WIDTH, STROKE_DARKEN_FACTOR, STROKE_WIDTH, TRACK_POINT_RADIUS,
    TRACK_STROKE_WIDTH,
};
use crate::viewport::Viewport;

/// Unit of style sizes (radius, stroke width).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StyleScale {
    /// Constant on screen; hit tolerances scale with units per pixel.
    #[default]
    ScreenPixels,
    /// Fixed in image units.
    ImageUnits,
}

/// Values shared by every annotation style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseStyle {
    pub radius: f64,
    pub fill_opacity: f64,
    pub scale: StyleScale,
}

impl BaseStyle {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            radius: config.annotations_radius,
            fill_opacity: config.annotation_opacity,
            scale: if config.scale_annotations_with_zoom {
                StyleScale::ScreenPixels
            } else {
                StyleScale::ImageUnits
            },
        }
    }
}

impl Default for BaseStyle {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// A fully resolved style handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationStyle {
    pub stroke_color: Color,
    pub stroke_opacity: f64,
    pub stroke_width: f64,
    pub fill_color: Color,
    pub fill_opacity: f64,
    pub radius: f64,
    pub scale: StyleScale,
}

impl AnnotationStyle {
    /// Multiplier turning style sizes into logical hit tolerances.
    pub fn units_per_pixel(&self, viewport: &Viewport) -> f64 {
        match self.scale {
            StyleScale::ScreenPixels => viewport.units_per_pixel,
            StyleScale::ImageUnits => 1.0,
        }
    }

    /// Line between two connected annotations.
    pub fn connection(base: &BaseStyle) -> Self {
        Self {
            stroke_color: Color::WHITE,
            stroke_opacity: 1.0,
            stroke_width: CONNECTION_STROKE_WIDTH,
            fill_color: Color::WHITE,
            fill_opacity: 0.0,
            radius: 0.0,
            scale: base.scale,
        }
    }

    /// Translucent copy following the pointer during a drag.
    pub fn ghost(source: &AnnotationStyle) -> Self {
        Self {
            stroke_opacity: GHOST_OPACITY,
            fill_opacity: source.fill_opacity * GHOST_OPACITY,
            ..*source
        }
    }

    /// Transient gesture preview (selection path, live segmentation).
    pub fn preview(base: &BaseStyle) -> Self {
        Self {
            stroke_color: Color::WHITE,
            stroke_opacity: 1.0,
            stroke_width: STROKE_WIDTH / 2.0,
            fill_color: Color::WHITE,
            fill_opacity: 0.0,
            radius: base.radius,
            scale: base.scale,
        }
    }

    /// Main segmentation output awaiting submission.
    pub fn sam_output(base: &BaseStyle) -> Self {
        resolve_style(base, Some(&Color::rgb(0.0, 1.0, 1.0)), false, false)
    }

    /// Segmentation prompt marker; positive prompts are green.
    pub fn sam_prompt(base: &BaseStyle, positive: bool) -> Self {
        let color = if positive {
            Color::rgb(0.0, 1.0, 0.0)
        } else {
            Color::rgb(1.0, 0.0, 0.0)
        };
        Self {
            radius: SAM_PROMPT_RADIUS,
            ..resolve_style(base, Some(&color), false, false)
        }
    }

    /// Timelapse track line.
    pub fn track_line(base: &BaseStyle, color: Color) -> Self {
        Self {
            stroke_color: color,
            stroke_opacity: 1.0,
            stroke_width: TRACK_STROKE_WIDTH,
            fill_color: color,
            fill_opacity: 0.0,
            radius: 0.0,
            scale: base.scale,
        }
    }

    /// Timelapse track point.
    pub fn track_point(base: &BaseStyle, color: Color) -> Self {
        Self {
            stroke_color: color.scaled(STROKE_DARKEN_FACTOR),
            stroke_opacity: 1.0,
            stroke_width: TRACK_STROKE_WIDTH / 2.0,
            fill_color: color,
            fill_opacity: 1.0,
            radius: TRACK_POINT_RADIUS,
            scale: base.scale,
        }
    }
}

/// Resolve the style of an annotation from its colour and flags.
///
/// Hover wins over selection for the stroke; selection only widens and
/// recolours the stroke of a non-hovered annotation.
pub fn resolve_style(
    base: &BaseStyle,
    color: Option<&Color>,
    hovered: bool,
    selected: bool,
) -> AnnotationStyle {
    let mut style = AnnotationStyle {
        stroke_color: Color::BLACK,
        stroke_opacity: 1.0,
        stroke_width: STROKE_WIDTH,
        fill_color: Color::WHITE,
        fill_opacity: base.fill_opacity,
        radius: base.radius,
        scale: base.scale,
    };

    if let Some(color) = color {
        style.fill_color = *color;
        style.stroke_color = color.scaled(STROKE_DARKEN_FACTOR);
    }

    if selected {
        style.stroke_width = SELECTED_STROKE_WIDTH;
        if let Some(color) = color {
            style.stroke_color = *color;
        }
    }

    if hovered {
        style.fill_opacity = 0.0;
        style.stroke_width = HOVERED_STROKE_WIDTH;
        style.stroke_color = Color::HOVER;
    }

    style
}
