//! Tile offsets for unrolled display.
//!
//! When an axis is unrolled, every index along it is shown side by side as a
//! grid of tiles. Annotations keep their logical coordinates; the offset of
//! their tile is added only when they are presented.

use annolayer_geom::Point;
use serde::{Deserialize, Serialize};

use crate::model::{Location, UnrollFlags};

/// One tile of the unrolled grid and the slice it shows.
///
/// Absent indices match any value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameTile {
    #[serde(default)]
    pub xy: Option<u32>,
    #[serde(default)]
    pub z: Option<u32>,
    #[serde(default)]
    pub time: Option<u32>,
    /// Position of the tile in the grid
    pub key_offset: u32,
}

impl FrameTile {
    pub fn new(key_offset: u32) -> Self {
        Self {
            xy: None,
            z: None,
            time: None,
            key_offset,
        }
    }

    pub fn with_xy(mut self, xy: u32) -> Self {
        self.xy = Some(xy);
        self
    }

    pub fn with_z(mut self, z: u32) -> Self {
        self.z = Some(z);
        self
    }

    pub fn with_time(mut self, time: u32) -> Self {
        self.time = Some(time);
        self
    }

    /// Every present index equals the location's.
    pub fn matches(&self, location: &Location) -> bool {
        self.xy.is_none_or(|xy| xy == location.xy)
            && self.z.is_none_or(|z| z == location.z)
            && self.time.is_none_or(|time| time == location.time)
    }
}

/// Grid geometry of the unrolled view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnrollLayout {
    pub columns: u32,
    pub tile_width: f64,
    pub tile_height: f64,
    pub frames: Vec<FrameTile>,
}

impl UnrollLayout {
    pub fn new(columns: u32, tile_width: f64, tile_height: f64, frames: Vec<FrameTile>) -> Self {
        Self {
            columns,
            tile_width,
            tile_height,
            frames,
        }
    }

    /// Grid position of the first frame showing `location`, or 0.
    pub fn tile_index(&self, location: &Location) -> u32 {
        self.frames
            .iter()
            .find(|frame| frame.matches(location))
            .map_or(0, |frame| frame.key_offset)
    }

    /// Offset of the tile showing `location`.
    pub fn tile_offset(&self, location: &Location) -> (f64, f64) {
        let columns = self.columns.max(1);
        let index = self.tile_index(location);
        (
            self.tile_width * f64::from(index % columns),
            self.tile_height * f64::from(index / columns),
        )
    }
}

/// Shift coordinates into their tile when any axis is unrolled.
pub fn unrolled_coordinates(
    coordinates: &[Point],
    location: &Location,
    layout: Option<&UnrollLayout>,
    unroll: UnrollFlags,
) -> Vec<Point> {
    match layout {
        Some(layout) if unroll.any() => {
            let (dx, dy) = layout.tile_offset(location);
            coordinates.iter().map(|p| p.offset(dx, dy)).collect()
        }
        _ => coordinates.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> UnrollLayout {
        UnrollLayout::new(
            3,
            100.0,
            80.0,
            (0..6).map(|t| FrameTile::new(t).with_time(t)).collect(),
        )
    }

    #[test]
    fn test_tile_index_first_match_or_zero() {
        let layout = layout();
        assert_eq!(layout.tile_index(&Location::new(0, 0, 4)), 4);
        assert_eq!(layout.tile_index(&Location::new(0, 0, 42)), 0);
    }

    #[test]
    fn test_tile_offset_wraps_rows() {
        let layout = layout();
        assert_eq!(layout.tile_offset(&Location::new(0, 0, 1)), (100.0, 0.0));
        assert_eq!(layout.tile_offset(&Location::new(0, 0, 4)), (100.0, 80.0));
    }

    #[test]
    fn test_unrolled_coordinates_only_when_unrolling() {
        let layout = layout();
        let coords = [Point::new(1.0, 2.0)];
        let location = Location::new(0, 0, 5);

        let rolled = unrolled_coordinates(&coords, &location, Some(&layout), UnrollFlags::default());
        assert_eq!(rolled, coords.to_vec());

        let unrolled = unrolled_coordinates(
            &coords,
            &location,
            Some(&layout),
            UnrollFlags { xy: false, z: false, time: true },
        );
        assert_eq!(unrolled, vec![Point::new(201.0, 82.0)]);

        let no_layout = unrolled_coordinates(
            &coords,
            &location,
            None,
            UnrollFlags { xy: true, z: false, time: false },
        );
        assert_eq!(no_layout, coords.to_vec());
    }
}
