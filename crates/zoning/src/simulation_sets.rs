//! Ordering of the zoning systems via `SystemSet` phases.
//!
//! # FixedUpdate phases (`ZoningSet`)
//!
//! ```text
//! Collect  →  Resolve  →  Size  →  Apply  →  Cleanup
//! ```
//!
//! * **Collect** – Build the endpoint index from segments deleted this tick.
//! * **Resolve** – Decide one preference per owning segment of the update set.
//!   Reads the index, so it must run after `Collect`.
//! * **Size** – Emit block commands: reconciled pass first, then the
//!   direct-lookup pass for blocks the tool or a load flagged.
//! * **Apply** – Flush the command buffer. The only writer of block geometry
//!   and preferences.
//! * **Cleanup** – Drop the endpoint index.
//!
//! The host's own end-of-tick work (despawning deleted entities, clearing
//! lifecycle markers) runs after `Cleanup`.
//!
//! # Update phases (`ZoningUpdateSet`)
//!
//! ```text
//! Input  →  Tool  →  Apply
//! ```
//!
//! * **Input** – UI commands and host tool changes.
//! * **Tool** – Selection state machine and its transition actions.
//! * **Apply** – Flush the commands the tool staged.

use bevy::prelude::*;

/// Ordered phases for zoning systems in the `FixedUpdate` schedule.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ZoningSet {
    Collect,
    Resolve,
    Size,
    Apply,
    Cleanup,
}

/// Ordered phases for zoning systems in the `Update` schedule.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ZoningUpdateSet {
    Input,
    Tool,
    Apply,
}

/// Runs after every zoning phase of the tick. Host lifecycle cleanup lives here.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostEndOfTick;

pub(crate) fn configure(app: &mut App) {
    app.configure_sets(
        FixedUpdate,
        (
            ZoningSet::Collect,
            ZoningSet::Resolve,
            ZoningSet::Size,
            ZoningSet::Apply,
            ZoningSet::Cleanup,
            HostEndOfTick,
        )
            .chain(),
    )
    .configure_sets(
        Update,
        (
            ZoningUpdateSet::Input,
            ZoningUpdateSet::Tool,
            ZoningUpdateSet::Apply,
        )
            .chain(),
    );
}
