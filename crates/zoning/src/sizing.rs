//! Per-block sizing rules.
//!
//! Everything here works on plain values so it can run in parallel over
//! blocks and be tested without a `World`. The systems in
//! [`orchestrator`](crate::orchestrator) gather the inputs and push the
//! resulting commands.

use bevy::prelude::*;

use crate::blocks::BlockSnapshot;
use crate::commands::ZoningCommand;
use crate::config::{ExcludedSideAction, ZoningSettings};
use crate::geometry::{classify_block, Bezier2, BlockSide};
use crate::preference::ZoningPreference;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The host is removing the block this tick.
    Deleted,
    /// A building stands inside the active area.
    Occupied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingOutcome {
    Skipped(SkipReason),
    Resized { side: BlockSide, depth: i32 },
    Removed { side: BlockSide },
}

/// Depth and removal policy, read from [`ZoningSettings`] once per pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizingRules {
    pub depth: i32,
    pub excluded_side_action: ExcludedSideAction,
}

impl Default for SizingRules {
    fn default() -> Self {
        Self::from(&ZoningSettings::default())
    }
}

impl From<&ZoningSettings> for SizingRules {
    fn from(settings: &ZoningSettings) -> Self {
        Self {
            depth: settings.effective_depth(),
            excluded_side_action: settings.excluded_side_action,
        }
    }
}

/// Inputs for one block.
#[derive(Debug, Clone, Copy)]
pub struct SizingInput<'a> {
    pub block: &'a BlockSnapshot,
    pub curve: &'a Bezier2,
    pub preference: ZoningPreference,
    pub occupied: bool,
    /// Upgrade path: resize even when buildings stand on the block.
    pub allow_occupied_override: bool,
}

/// Depth a block on `side` should have: zero on an excluded side, the
/// standard depth otherwise.
pub fn target_depth(side: BlockSide, preference: ZoningPreference, depth: i32) -> i32 {
    if preference.excludes(side) {
        0
    } else {
        depth
    }
}

pub fn plan_block(input: &SizingInput<'_>, rules: &SizingRules) -> SizingOutcome {
    if input.block.deleted {
        return SizingOutcome::Skipped(SkipReason::Deleted);
    }

    let side = classify_block(input.curve, input.block);

    if input.occupied && !input.allow_occupied_override {
        return SizingOutcome::Skipped(SkipReason::Occupied);
    }

    let excluded = input.preference.excludes(side);
    if excluded && rules.excluded_side_action == ExcludedSideAction::Delete {
        return SizingOutcome::Removed { side };
    }

    SizingOutcome::Resized {
        side,
        depth: target_depth(side, input.preference, rules.depth),
    }
}

/// Commands realizing `outcome`. Skipped blocks produce none, not even the
/// preference write-back.
pub fn emit_commands(
    block: &BlockSnapshot,
    preference: ZoningPreference,
    outcome: SizingOutcome,
    out: &mut Vec<ZoningCommand>,
) {
    match outcome {
        SizingOutcome::Skipped(_) => return,
        SizingOutcome::Resized { depth, .. } => {
            out.push(ZoningCommand::SetValidArea {
                block: block.entity,
                area: block.valid_area.with_depth(depth),
            });
            out.push(ZoningCommand::SetBlockSize {
                block: block.entity,
                size: IVec2::new(block.size.x, depth),
            });
        }
        SizingOutcome::Removed { .. } => {
            out.push(ZoningCommand::MarkDeleted(block.entity));
        }
    }
    out.push(ZoningCommand::SetPreference {
        segment: block.owner,
        preference,
    });
}
