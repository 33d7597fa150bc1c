//! Driving the schedules and reading state back out of a `TestTown`.

use bevy::prelude::*;

use crate::blocks::{BlockSnapshot, Owner, ValidArea, ZoneBlock};
use crate::geometry::{classify_block, BlockSide};
use crate::host::{CursorHit, Highlighted, HostToolChanged, RoadCurve};
use crate::preference::ZoningPreference;
use crate::reconciliation::UpgradeMode;
use crate::tool::{ButtonSignal, ToolInput, ToolState, ToolStateMachine, ToolWorkingState};
use crate::ui_bridge::{ZoningUiCommand, ZoningUiState};

use super::TestTown;

impl TestTown {
    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Run N fixed-update ticks by executing the `FixedUpdate` schedule
    /// directly, bypassing Bevy's virtual time.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.world_mut().run_schedule(FixedUpdate);
        }
    }

    /// Run one `Update` frame with the given button input and cursor hit.
    pub fn frame(&mut self, apply: ButtonSignal, hit: Option<Entity>) {
        self.frame_with(ToolInput::apply(apply), hit);
    }

    pub fn frame_with(&mut self, input: ToolInput, hit: Option<Entity>) {
        let world = self.app.world_mut();
        world.insert_resource(input);
        world.insert_resource(CursorHit(hit));
        world.run_schedule(Update);
    }

    pub fn send_ui(&mut self, command: ZoningUiCommand) {
        self.app.world_mut().send_event(command);
    }

    /// Switch the host to a tool that does or does not place zoned roads.
    pub fn switch_host_tool(&mut self, zoning_capable: bool) {
        self.app
            .world_mut()
            .send_event(HostToolChanged { zoning_capable });
        self.frame(ButtonSignal::IDLE, None);
    }

    /// Enable the selection tool in `mode` and run one idle frame.
    pub fn enable_tool(&mut self, mode: ZoningPreference) {
        self.send_ui(ZoningUiCommand::SetMode(mode));
        self.send_ui(ZoningUiCommand::SetToolEnabled(true));
        self.frame(ButtonSignal::IDLE, None);
    }

    pub fn disable_tool(&mut self) {
        self.send_ui(ZoningUiCommand::SetToolEnabled(false));
        self.frame(ButtonSignal::IDLE, None);
    }

    /// Press over the first road, drag across the rest, release over the last.
    /// Needs at least one road.
    pub fn drag_over(&mut self, roads: &[Entity]) {
        let Some((&first, rest)) = roads.split_first() else {
            return;
        };
        self.frame(ButtonSignal::PRESSED, Some(first));
        for &road in rest {
            self.frame(ButtonSignal::HELD, Some(road));
        }
        self.frame(ButtonSignal::RELEASED, roads.last().copied());
        // Selected always falls back to Default on the following frame.
        self.frame(ButtonSignal::IDLE, None);
    }

    /// Press and release over `road` within a single frame.
    pub fn tap(&mut self, road: Entity) {
        self.frame(ButtonSignal::TAPPED, Some(road));
        self.frame(ButtonSignal::IDLE, None);
    }

    /// Report `road` as the segment being upgraded by the host.
    pub fn set_upgrade_target(&mut self, road: Option<Entity>) {
        self.app.world_mut().resource_mut::<UpgradeMode>().target = road;
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn exists(&self, entity: Entity) -> bool {
        self.world().entities().contains(entity)
    }

    pub fn curve(&self, road: Entity) -> RoadCurve {
        *self
            .world()
            .get::<RoadCurve>(road)
            .unwrap_or_else(|| panic!("{road:?} is not a road"))
    }

    pub fn preference(&self, road: Entity) -> Option<ZoningPreference> {
        self.world().get::<ZoningPreference>(road).copied()
    }

    /// Blocks owned by `road`, in spawn order.
    pub fn blocks_of(&mut self, road: Entity) -> Vec<Entity> {
        let world = self.app.world_mut();
        let mut q = world.query_filtered::<(Entity, &Owner), With<ZoneBlock>>();
        let mut blocks: Vec<Entity> = q
            .iter(world)
            .filter(|(_, owner)| owner.0 == road)
            .map(|(e, _)| e)
            .collect();
        blocks.sort();
        blocks
    }

    /// Blocks of `road` on `side`.
    pub fn blocks_on(&mut self, road: Entity, side: BlockSide) -> Vec<Entity> {
        self.blocks_of(road)
            .into_iter()
            .filter(|&b| self.block_side(b) == side)
            .collect()
    }

    pub fn block(&self, block: Entity) -> ZoneBlock {
        *self
            .world()
            .get::<ZoneBlock>(block)
            .unwrap_or_else(|| panic!("{block:?} is not a zone block"))
    }

    pub fn valid_area(&self, block: Entity) -> ValidArea {
        *self
            .world()
            .get::<ValidArea>(block)
            .unwrap_or_else(|| panic!("{block:?} has no valid area"))
    }

    pub fn block_depth(&self, block: Entity) -> i32 {
        self.block(block).size.y
    }

    /// Side of its owning road that `block` sits on.
    pub fn block_side(&self, block: Entity) -> BlockSide {
        let owner = self
            .world()
            .get::<Owner>(block)
            .unwrap_or_else(|| panic!("{block:?} has no owner"))
            .0;
        let snapshot = BlockSnapshot::new(
            block,
            owner,
            &self.block(block),
            self.valid_area(block),
            false,
        );
        classify_block(&self.curve(owner).ground(), &snapshot)
    }

    pub fn is_highlighted(&self, entity: Entity) -> bool {
        self.world().get::<Highlighted>(entity).is_some()
    }

    pub fn tool_state(&self) -> ToolState {
        self.world().resource::<ToolStateMachine>().state()
    }

    pub fn working_state(&self) -> Option<&ToolWorkingState> {
        self.world().get_resource::<ToolWorkingState>()
    }

    pub fn ui_state(&self) -> ZoningUiState {
        *self.world().resource::<ZoningUiState>()
    }
}
