//! Display layers and slice selection.
//!
//! Layers are configuration owned by the host application; the engine only
//! reads them.

use serde::{Deserialize, Serialize};

use super::{Axis, Location};

/// Unique identifier for a display layer.
pub type LayerId = String;

/// How a layer picks its index along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum SliceSpec {
    /// Follow the global slice index.
    #[default]
    Current,
    /// Always show one fixed index.
    #[serde(rename = "constant")]
    FixedValue(u32),
    /// Union of every index along the axis.
    MaxMerge,
}

/// A display layer: one channel with a slice selection per axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: LayerId,
    pub channel: u32,
    #[serde(default)]
    pub xy: SliceSpec,
    #[serde(default)]
    pub z: SliceSpec,
    #[serde(default)]
    pub time: SliceSpec,
    pub visible: bool,
    /// Colour used for annotations without their own colour.
    pub color: String,
}

impl Layer {
    /// Create a visible layer following the current slice on every axis.
    pub fn new(id: impl Into<LayerId>, channel: u32, color: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            channel,
            xy: SliceSpec::Current,
            z: SliceSpec::Current,
            time: SliceSpec::Current,
            visible: true,
            color: color.into(),
        }
    }

    pub fn with_spec(mut self, axis: Axis, spec: SliceSpec) -> Self {
        match axis {
            Axis::Xy => self.xy = spec,
            Axis::Z => self.z = spec,
            Axis::Time => self.time = spec,
        }
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Slice spec for an axis.
    pub fn spec(&self, axis: Axis) -> SliceSpec {
        match axis {
            Axis::Xy => self.xy,
            Axis::Z => self.z,
            Axis::Time => self.time,
        }
    }
}

/// The current global viewing position.
pub type SliceIndices = Location;

/// Axes displayed all at once as tiles instead of one index at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UnrollFlags {
    pub xy: bool,
    pub z: bool,
    pub time: bool,
}

impl UnrollFlags {
    pub fn get(&self, axis: Axis) -> bool {
        match axis {
            Axis::Xy => self.xy,
            Axis::Z => self.z,
            Axis::Time => self.time,
        }
    }

    /// True when at least one axis is unrolled.
    pub fn any(&self) -> bool {
        self.xy || self.z || self.time
    }
}

/// Contiguous window `[lowest, lowest + count)` of layers handled by one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerRange {
    pub lowest: usize,
    pub count: usize,
}

impl LayerRange {
    pub const fn new(lowest: usize, count: usize) -> Self {
        Self { lowest, count }
    }

    /// A range covering every layer.
    pub const fn all() -> Self {
        Self {
            lowest: 0,
            count: usize::MAX,
        }
    }

    /// The layers inside this range, clamped to the slice bounds.
    pub fn valid_layers<'a>(&self, layers: &'a [Layer]) -> &'a [Layer] {
        let start = self.lowest.min(layers.len());
        let end = self.lowest.saturating_add(self.count).min(layers.len());
        &layers[start..end]
    }

    /// Check whether a layer id falls inside the range.
    pub fn is_layer_id_valid(&self, layers: &[Layer], id: &str) -> bool {
        self.valid_layers(layers).iter().any(|layer| layer.id == id)
    }

    /// First in-range layer showing `channel`.
    pub fn any_layer_for_channel<'a>(&self, layers: &'a [Layer], channel: u32) -> Option<&'a Layer> {
        self.valid_layers(layers).iter().find(|layer| layer.channel == channel)
    }
}

impl Default for LayerRange {
    fn default() -> Self {
        Self::all()
    }
}
