//! Compile-time constants and the runtime [`ZoningSettings`] resource.

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::preference::ZoningPreference;
use crate::saved_resources::SavedResource;

/// Depth, in cells, of a fully grown zoning block.
pub const STANDARD_BLOCK_DEPTH: i32 = 6;

/// World size of one zoning cell along either axis.
pub const CELL_SIZE: f32 = 8.0;

/// Endpoints within this distance on both axes are treated as the same point
/// when matching deleted and created segments.
pub const ENDPOINT_TOLERANCE: f32 = 0.001;

/// Uniform samples used to bracket the closest point on a curve.
pub const CLOSEST_POINT_SAMPLES: usize = 16;

/// Golden-section iterations run inside the bracketing interval.
pub const CLOSEST_POINT_REFINE_STEPS: usize = 24;

/// Maximum cursor distance (world units) for picking a road segment.
pub const PICK_RADIUS: f32 = 12.0;

/// What happens to a block on a side the preference excludes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode,
)]
pub enum ExcludedSideAction {
    /// Collapse the block to zero depth. The block entity survives so it can
    /// grow back when the preference changes.
    #[default]
    Shrink,
    /// Mark the block deleted. The host regenerates blocks on the next road edit.
    Delete,
}

/// Runtime tunables for the zoning toolkit.
///
/// Persisted through the save file's extension map so overrides survive
/// save/load cycles.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
#[serde(default)]
pub struct ZoningSettings {
    /// Depth applied to blocks on an included side.
    pub block_depth: i32,
    /// Allow the host's upgrade path to inherit by endpoint and to resize
    /// blocks that already hold buildings.
    pub upgrade_enabled: bool,
    pub excluded_side_action: ExcludedSideAction,
    /// Mode the UI panel starts in.
    pub initial_mode: ZoningPreference,
}

impl Default for ZoningSettings {
    fn default() -> Self {
        Self {
            block_depth: STANDARD_BLOCK_DEPTH,
            upgrade_enabled: false,
            excluded_side_action: ExcludedSideAction::Shrink,
            initial_mode: ZoningPreference::Default,
        }
    }
}

impl ZoningSettings {
    /// Block depth clamped to a sane range. A negative depth from a hand-edited
    /// settings file would otherwise produce negative block sizes.
    pub fn effective_depth(&self) -> i32 {
        self.block_depth.clamp(0, 64)
    }
}

impl SavedResource for ZoningSettings {
    const SAVE_KEY: &'static str = "zoning_settings";
}
