//! Viewport geometry.
//!
//! The host owns pan and zoom. The engine only needs to know how many logical
//! image units one screen pixel covers, and how large the visible area is.

use annolayer_geom::BoundingBox;

/// Size of the visible area and its current zoom factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Width in screen pixels.
    pub width: f64,
    /// Height in screen pixels.
    pub height: f64,
    /// Logical image units covered by one screen pixel.
    pub units_per_pixel: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, units_per_pixel: f64) -> Self {
        Self {
            width,
            height,
            units_per_pixel,
        }
    }

    /// Create a viewport at zoom 1 (one unit per pixel).
    pub fn identity(width: f64, height: f64) -> Self {
        Self::new(width, height, 1.0)
    }

    /// Return a copy zoomed by `factor` (greater than 1 zooms in).
    pub fn zoomed(&self, factor: f64) -> Viewport {
        if factor <= 0.0 {
            return *self;
        }
        Viewport {
            units_per_pixel: self.units_per_pixel / factor,
            ..*self
        }
    }

    /// Visible area in logical units squared.
    pub fn logical_area(&self) -> f64 {
        (self.width * self.units_per_pixel) * (self.height * self.units_per_pixel)
    }

    /// Share of the visible area covered by a bounding box (0 for an empty viewport).
    pub fn coverage(&self, bounds: &BoundingBox) -> f64 {
        let area = self.logical_area();
        if area <= 0.0 {
            return 0.0;
        }
        bounds.area() / area
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::identity(1000.0, 800.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_logical_area_scales_with_zoom() {
        let viewport = Viewport::identity(1000.0, 800.0);
        assert!((viewport.logical_area() - 800_000.0).abs() < EPSILON);

        let zoomed = viewport.zoomed(2.0);
        assert!((zoomed.units_per_pixel - 0.5).abs() < EPSILON);
        assert!((zoomed.logical_area() - 200_000.0).abs() < EPSILON);
    }

    #[test]
    fn test_invalid_zoom_factor_ignored() {
        let viewport = Viewport::default();
        assert_eq!(viewport.zoomed(0.0), viewport);
        assert_eq!(viewport.zoomed(-1.0), viewport);
    }

    #[test]
    fn test_coverage() {
        let viewport = Viewport::identity(1000.0, 800.0);
        let bounds = BoundingBox::new(0.0, 0.0, 800.0, 800.0);
        assert!((viewport.coverage(&bounds) - 0.8).abs() < EPSILON);
        assert_eq!(Viewport::identity(0.0, 0.0).coverage(&bounds), 0.0);
    }
}
