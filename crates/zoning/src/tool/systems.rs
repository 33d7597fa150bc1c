//! Tool working state and the per-frame system driving the state machine.

use std::collections::HashSet;

use bevy::prelude::*;

use crate::blocks::{Owner, ZoneBlock};
use crate::commands::{ZoningCommand, ZoningCommandBuffer};
use crate::host::{CursorHit, RoadCurve};
use crate::preference::ZoningPreference;

use super::state_machine::{ToolInput, ToolStateMachine, TransitionAction};

/// State owned by the tool while it is enabled. Inserted on enable, removed on
/// disable.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct ToolWorkingState {
    pub last_hovered: Option<Entity>,
    /// Selected segments in the order they were picked.
    pub selection: Vec<Entity>,
    /// Preference written on commit.
    pub mode: ZoningPreference,
}

impl ToolWorkingState {
    pub fn new(mode: ZoningPreference) -> Self {
        Self {
            last_hovered: None,
            selection: Vec::new(),
            mode,
        }
    }

    /// Add to the selection if not already present. Returns whether it was added.
    pub fn select(&mut self, segment: Entity) -> bool {
        if self.selection.contains(&segment) {
            return false;
        }
        self.selection.push(segment);
        true
    }

    pub fn is_selected(&self, segment: Entity) -> bool {
        self.selection.contains(&segment)
    }
}

/// Run condition: the tool is enabled.
pub fn tool_enabled(working: Option<Res<ToolWorkingState>>) -> bool {
    working.is_some()
}

/// Start a fresh tool session.
pub fn enable_tool(commands: &mut Commands, machine: &mut ToolStateMachine, mode: ZoningPreference) {
    machine.reset();
    commands.insert_resource(ToolWorkingState::new(mode));
    info!("Zoning tool enabled (mode {})", mode);
}

/// End the session: everything the tool highlighted is cleared and the working
/// state dropped.
pub fn disable_tool(
    commands: &mut Commands,
    machine: &mut ToolStateMachine,
    working: &ToolWorkingState,
    buffer: &mut ZoningCommandBuffer,
) {
    buffer.extend(
        working
            .selection
            .iter()
            .chain(working.last_hovered.iter())
            .map(|&e| ZoningCommand::Unhighlight(e)),
    );
    machine.reset();
    commands.remove_resource::<ToolWorkingState>();
    info!("Zoning tool disabled");
}

fn hover(working: &mut ToolWorkingState, hovered: Option<Entity>, buffer: &mut ZoningCommandBuffer) {
    if working.last_hovered == hovered {
        return;
    }
    if let Some(previous) = working.last_hovered {
        // Selected segments stay lit until commit or abort.
        if !working.is_selected(previous) {
            buffer.push(ZoningCommand::Unhighlight(previous));
        }
    }
    if let Some(entity) = hovered {
        buffer.push(ZoningCommand::Highlight(entity));
    }
    working.last_hovered = hovered;
}

fn drag(working: &mut ToolWorkingState, hovered: Option<Entity>, buffer: &mut ZoningCommandBuffer) {
    if let Some(entity) = hovered {
        if working.select(entity) {
            debug!("Zoning tool: selected {:?}", entity);
            buffer.push(ZoningCommand::Highlight(entity));
        }
    }
}

fn commit<'a>(
    working: &mut ToolWorkingState,
    buffer: &mut ZoningCommandBuffer,
    blocks: impl Iterator<Item = (Entity, &'a Owner)>,
) {
    if working.selection.is_empty() {
        return;
    }
    let selected: HashSet<Entity> = working.selection.iter().copied().collect();
    for &segment in &working.selection {
        buffer.push(ZoningCommand::SetPreference {
            segment,
            preference: working.mode,
        });
        buffer.push(ZoningCommand::Unhighlight(segment));
    }
    let mut flagged = 0usize;
    for (block, owner) in blocks {
        if selected.contains(&owner.0) {
            buffer.push(ZoningCommand::RequestResolution(block));
            flagged += 1;
        }
    }
    info!(
        "Zoning tool: committed {} to {} segments ({} blocks)",
        working.mode,
        working.selection.len(),
        flagged
    );
    working.selection.clear();
    if working.last_hovered.is_some_and(|e| selected.contains(&e)) {
        working.last_hovered = None;
    }
}

fn abort(working: &mut ToolWorkingState, buffer: &mut ZoningCommandBuffer) {
    buffer.extend(
        working
            .selection
            .drain(..)
            .map(ZoningCommand::Unhighlight),
    );
    if let Some(previous) = working.last_hovered.take() {
        buffer.push(ZoningCommand::Unhighlight(previous));
    }
    debug!("Zoning tool: selection aborted");
}

/// Advance the state machine one frame and run the bound action.
pub fn run_selection_tool(
    input: Res<ToolInput>,
    cursor: Res<CursorHit>,
    mut machine: ResMut<ToolStateMachine>,
    mut working: ResMut<ToolWorkingState>,
    mut buffer: ResMut<ZoningCommandBuffer>,
    segments: Query<(), With<RoadCurve>>,
    blocks: Query<(Entity, &Owner), With<ZoneBlock>>,
) {
    // Only road segments can be picked.
    let hovered = cursor.0.filter(|&e| segments.contains(e));

    let (_, _, action) = machine.step(&input);
    let Some(action) = action else {
        return;
    };

    match action {
        TransitionAction::Hover => hover(&mut working, hovered, &mut buffer),
        TransitionAction::StartDrag | TransitionAction::ContinueDrag => {
            drag(&mut working, hovered, &mut buffer)
        }
        TransitionAction::Commit => commit(&mut working, &mut buffer, blocks.iter()),
        TransitionAction::Tap => {
            drag(&mut working, hovered, &mut buffer);
            commit(&mut working, &mut buffer, blocks.iter());
        }
        TransitionAction::Abort => abort(&mut working, &mut buffer),
    }
}
