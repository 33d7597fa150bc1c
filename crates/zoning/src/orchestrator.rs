//! Per-tick driver: decides which blocks need work, builds the endpoint index,
//! resolves one preference per segment and runs the sizing passes.
//!
//! Two passes feed the command buffer each tick:
//!
//! 1. blocks carrying a host lifecycle marker (`Created`, `Updated`, `Applied`,
//!    `Deleted`) are sized with a preference reconciled against the segments
//!    deleted this tick;
//! 2. blocks flagged [`ZoningResolutionRequired`] (by a tool commit or a load)
//!    are sized with a direct lookup of their segment's preference.

use std::collections::HashMap;

use bevy::prelude::*;
use bevy::utils::Parallel;

use crate::blocks::{any_cell_occupied, BlockSnapshot, Owner, ValidArea, ZoneBlock, ZoneCells};
use crate::commands::{ZoningCommand, ZoningCommandBuffer};
use crate::config::ZoningSettings;
use crate::host::{Applied, Created, Deleted, RoadCurve, Updated};
use crate::preference::{SegmentPreferences, ZoningPreference};
use crate::reconciliation::{
    resolve_preference, DeletedSegment, EndpointIndex, PreferenceSource, Resolution,
    ResolutionContext, UpgradeMode,
};
use crate::sizing::{
    emit_commands, plan_block, SizingInput, SizingOutcome, SizingRules, SkipReason,
};

/// Block needs a direct-lookup sizing pass on the next tick.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct ZoningResolutionRequired;

/// Blocks the host touched this tick.
pub type HostUpdateFilter = Or<(
    With<Created>,
    With<Updated>,
    With<Applied>,
    With<Deleted>,
)>;

/// One decided preference per owning segment of the update set. Rebuilt every
/// tick in `ZoningSet::Resolve`.
#[derive(Resource, Debug, Default)]
pub struct ResolvedPreferences {
    by_segment: HashMap<Entity, Resolution>,
}

impl ResolvedPreferences {
    pub fn get(&self, segment: Entity) -> Option<Resolution> {
        self.by_segment.get(&segment).copied()
    }

    pub fn len(&self) -> usize {
        self.by_segment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_segment.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_segment.clear();
    }
}

/// Run condition: some block carries a lifecycle marker or a resolution request.
#[allow(clippy::type_complexity)]
pub fn zoning_work_pending(
    pending: Query<
        (),
        (
            With<ZoneBlock>,
            Or<(
                With<Created>,
                With<Updated>,
                With<Applied>,
                With<Deleted>,
                With<ZoningResolutionRequired>,
            )>,
        ),
    >,
) -> bool {
    !pending.is_empty()
}

/// Keep the upgrade switch in step with the settings.
pub fn sync_upgrade_mode(settings: Res<ZoningSettings>, mut upgrade: ResMut<UpgradeMode>) {
    if settings.is_changed() && upgrade.enabled != settings.upgrade_enabled {
        upgrade.enabled = settings.upgrade_enabled;
        debug!("Zoning: upgrade path {}", if upgrade.enabled { "on" } else { "off" });
    }
}

/// Index every segment removed this tick: segments flagged `Deleted` and the
/// owners of deleted blocks.
pub fn build_endpoint_index(
    mut index: ResMut<EndpointIndex>,
    deleted_segments: Query<(Entity, &RoadCurve, Option<&ZoningPreference>), With<Deleted>>,
    deleted_blocks: Query<&Owner, (With<ZoneBlock>, With<Deleted>)>,
    segments: Query<(&RoadCurve, Option<&ZoningPreference>)>,
) {
    index.clear();

    let record = |entity: Entity, curve: &RoadCurve, preference: Option<&ZoningPreference>| {
        DeletedSegment {
            entity,
            start: curve.start(),
            end: curve.end(),
            preference: preference.copied(),
        }
    };

    for (entity, curve, preference) in &deleted_segments {
        index.insert(record(entity, curve, preference));
    }
    for owner in &deleted_blocks {
        if let Ok((curve, preference)) = segments.get(owner.0) {
            index.insert(record(owner.0, curve, preference));
        }
    }

    if !index.is_empty() {
        debug!("Zoning: indexed {} deleted segment endpoints", index.len());
    }
}

/// Decide the preference of every segment owning a block in the update set.
pub fn resolve_segment_preferences(
    index: Res<EndpointIndex>,
    upgrade: Res<UpgradeMode>,
    mut resolved: ResMut<ResolvedPreferences>,
    blocks: Query<&Owner, (With<ZoneBlock>, Without<Deleted>, HostUpdateFilter)>,
    segments: Query<(&RoadCurve, Option<&ZoningPreference>, Has<Applied>)>,
) {
    resolved.clear();

    for owner in &blocks {
        let segment = owner.0;
        if resolved.by_segment.contains_key(&segment) {
            continue;
        }
        let Ok((curve, existing, applied)) = segments.get(segment) else {
            debug!("Zoning: owner {:?} has no curve, skipping its blocks", segment);
            continue;
        };

        let resolution = resolve_preference(ResolutionContext {
            segment,
            start: curve.start(),
            end: curve.end(),
            existing: existing.copied(),
            applied,
            upgrade: *upgrade,
            index: &index,
        });
        match resolution.source {
            PreferenceSource::Inherited(how) => debug!(
                "Zoning: {:?} inherits {} ({:?})",
                segment, resolution.preference, how
            ),
            source => trace!(
                "Zoning: {:?} resolves to {} ({:?})",
                segment, resolution.preference, source
            ),
        }
        resolved.by_segment.insert(segment, resolution);
    }
}

fn occupied(cells: &ZoneCells, block: &ZoneBlock, area: &ValidArea) -> bool {
    any_cell_occupied(&cells.0, block.size.x, area)
}

/// Reconciled sizing pass over the update set. Blocks are independent, so the
/// pass runs in parallel and each thread collects its commands locally.
#[allow(clippy::too_many_arguments, clippy::type_complexity)]
pub fn size_updated_blocks(
    mut buffer: ResMut<ZoningCommandBuffer>,
    resolved: Res<ResolvedPreferences>,
    settings: Res<ZoningSettings>,
    upgrade: Res<UpgradeMode>,
    blocks: Query<
        (Entity, &ZoneBlock, &ValidArea, &Owner, Option<&ZoneCells>, Has<Deleted>),
        HostUpdateFilter,
    >,
    curves: Query<&RoadCurve>,
    mut staged: Local<Parallel<Vec<ZoningCommand>>>,
) {
    let rules = SizingRules::from(&*settings);

    blocks
        .par_iter()
        .for_each(|(entity, block, area, owner, cells, deleted)| {
            if deleted {
                return;
            }
            let Some(resolution) = resolved.get(owner.0) else {
                return;
            };
            let Ok(curve) = curves.get(owner.0) else {
                return;
            };
            let Some(cells) = cells else {
                debug!("Zoning: block {:?} has no cell buffer, skipping", entity);
                return;
            };

            let snapshot = BlockSnapshot::new(entity, owner.0, block, *area, deleted);
            let ground = curve.ground();
            let outcome = plan_block(
                &SizingInput {
                    block: &snapshot,
                    curve: &ground,
                    preference: resolution.preference,
                    occupied: occupied(cells, block, area),
                    allow_occupied_override: upgrade.allows_occupied_override(owner.0),
                },
                &rules,
            );
            if outcome == SizingOutcome::Skipped(SkipReason::Occupied) {
                trace!("Zoning: block {:?} is occupied, left untouched", entity);
            }
            staged.scope(|out| emit_commands(&snapshot, resolution.preference, outcome, out));
        });

    let mut commands = Vec::new();
    staged.drain_into(&mut commands);
    buffer.extend(commands);
}

/// Direct-lookup pass over blocks flagged [`ZoningResolutionRequired`]. The
/// flag is cleared whether or not the block could be sized.
#[allow(clippy::type_complexity)]
pub fn size_requested_blocks(
    mut buffer: ResMut<ZoningCommandBuffer>,
    settings: Res<ZoningSettings>,
    preferences: SegmentPreferences,
    blocks: Query<
        (Entity, &ZoneBlock, &ValidArea, &Owner, Option<&ZoneCells>, Has<Deleted>),
        With<ZoningResolutionRequired>,
    >,
    curves: Query<&RoadCurve>,
) {
    let rules = SizingRules::from(&*settings);
    let mut out = Vec::new();

    for (entity, block, area, owner, cells, deleted) in &blocks {
        out.push(ZoningCommand::ClearResolution(entity));

        let Ok(curve) = curves.get(owner.0) else {
            debug!("Zoning: requested block {:?} lost its owner", entity);
            continue;
        };
        let Some(cells) = cells else {
            continue;
        };

        let preference = preferences.get_or_default(owner.0);
        let snapshot = BlockSnapshot::new(entity, owner.0, block, *area, deleted);
        let ground = curve.ground();
        let outcome = plan_block(
            &SizingInput {
                block: &snapshot,
                curve: &ground,
                preference,
                occupied: occupied(cells, block, area),
                allow_occupied_override: false,
            },
            &rules,
        );
        emit_commands(&snapshot, preference, outcome, &mut out);
    }

    buffer.extend(out);
}

pub fn discard_endpoint_index(
    mut index: ResMut<EndpointIndex>,
    mut resolved: ResMut<ResolvedPreferences>,
) {
    if !index.is_empty() {
        index.clear();
    }
    if !resolved.is_empty() {
        resolved.clear();
    }
}
