//! Deferred mutations and the single flush that applies them.
//!
//! Sizing, the tool and the loader never touch block geometry or preferences
//! directly. They push [`ZoningCommand`]s into the [`ZoningCommandBuffer`] and
//! [`apply_zoning_commands`] applies the whole batch in order at a fixed point
//! of the schedule.

use bevy::prelude::*;

use crate::blocks::{ValidArea, ZoneBlock};
use crate::host::{Deleted, Highlighted};
use crate::orchestrator::ZoningResolutionRequired;
use crate::preference::ZoningPreference;

/// One staged mutation against the host entity store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoningCommand {
    SetBlockSize { block: Entity, size: IVec2 },
    SetValidArea { block: Entity, area: ValidArea },
    SetPreference { segment: Entity, preference: ZoningPreference },
    MarkDeleted(Entity),
    Highlight(Entity),
    Unhighlight(Entity),
    /// Flag a block for a direct-lookup sizing pass next tick.
    RequestResolution(Entity),
    ClearResolution(Entity),
}

impl ZoningCommand {
    pub fn target(&self) -> Entity {
        match *self {
            Self::SetBlockSize { block, .. } | Self::SetValidArea { block, .. } => block,
            Self::SetPreference { segment, .. } => segment,
            Self::MarkDeleted(e)
            | Self::Highlight(e)
            | Self::Unhighlight(e)
            | Self::RequestResolution(e)
            | Self::ClearResolution(e) => e,
        }
    }
}

/// Pending commands, applied in insertion order.
#[derive(Resource, Debug, Default)]
pub struct ZoningCommandBuffer {
    commands: Vec<ZoningCommand>,
}

impl ZoningCommandBuffer {
    pub fn push(&mut self, command: ZoningCommand) {
        self.commands.push(command);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ZoningCommand> {
        self.commands.iter()
    }

    /// Remove and return everything staged so far.
    pub fn take(&mut self) -> Vec<ZoningCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Extend<ZoningCommand> for ZoningCommandBuffer {
    fn extend<T: IntoIterator<Item = ZoningCommand>>(&mut self, iter: T) {
        self.commands.extend(iter);
    }
}

/// Exclusive flush of the command buffer.
///
/// Commands whose target no longer exists are dropped. A command whose target
/// lacks the component it sets is also dropped, since the toolkit never adds
/// block geometry the host did not create.
pub fn apply_zoning_commands(world: &mut World) {
    let commands = match world.get_resource_mut::<ZoningCommandBuffer>() {
        Some(mut buffer) if !buffer.is_empty() => buffer.take(),
        _ => return,
    };

    let total = commands.len();
    let mut dropped = 0usize;
    for command in commands {
        if !apply_one(world, command) {
            dropped += 1;
        }
    }
    debug!(
        "Zoning: applied {} commands ({} dropped)",
        total - dropped,
        dropped
    );
}

fn apply_one(world: &mut World, command: ZoningCommand) -> bool {
    let target = command.target();
    if !world.entities().contains(target) {
        trace!("Zoning: {:?} targets a despawned entity", command);
        return false;
    }
    let mut entity = world.entity_mut(target);

    match command {
        ZoningCommand::SetBlockSize { size, .. } => match entity.get_mut::<ZoneBlock>() {
            Some(mut block) => {
                block.size = size;
                true
            }
            None => false,
        },
        ZoningCommand::SetValidArea { area, .. } => match entity.get_mut::<ValidArea>() {
            Some(mut current) => {
                *current = area;
                true
            }
            None => false,
        },
        ZoningCommand::SetPreference { preference, .. } => {
            // Insert overwrites, so a segment never holds two preferences.
            entity.insert(preference);
            true
        }
        ZoningCommand::MarkDeleted(_) => {
            entity.insert(Deleted);
            true
        }
        ZoningCommand::Highlight(_) => {
            entity.insert(Highlighted);
            true
        }
        ZoningCommand::Unhighlight(_) => {
            entity.remove::<Highlighted>();
            true
        }
        ZoningCommand::RequestResolution(_) => {
            entity.insert(ZoningResolutionRequired);
            true
        }
        ZoningCommand::ClearResolution(_) => {
            entity.remove::<ZoningResolutionRequired>();
            true
        }
    }
}
