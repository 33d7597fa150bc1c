//! Preference inheritance across road edits: splits, merges, replacements and
//! the endpoint tolerance.

use bevy::prelude::*;

use crate::config::ZoningSettings;
use crate::geometry::BlockSide;
use crate::preference::ZoningPreference;
use crate::test_harness::TestTown;

const WEST: Vec2 = Vec2::new(0.0, 0.0);
const MID: Vec2 = Vec2::new(64.0, 0.0);
const EAST: Vec2 = Vec2::new(128.0, 0.0);

// ====================================================================
// Splits and replacements
// ====================================================================

#[test]
fn test_split_halves_keep_parent_preference() {
    let mut town = TestTown::new();
    let road = town.spawn_settled_road(WEST, EAST, ZoningPreference::Left);

    let (a, b) = town.split_road(road, 0.5);
    town.tick(1);

    town.assert_despawned(road);
    for half in [a, b] {
        town.assert_preference(half, ZoningPreference::Left);
        town.assert_side_depth(half, BlockSide::SideA, 6);
        town.assert_side_depth(half, BlockSide::SideB, 0);
    }
}

#[test]
fn test_uneven_split_keeps_parent_preference() {
    let mut town = TestTown::new();
    let road = town.spawn_settled_road(WEST, EAST, ZoningPreference::None);

    let (a, b) = town.split_road(road, 0.3);
    town.tick(1);

    town.assert_preference(a, ZoningPreference::None);
    town.assert_preference(b, ZoningPreference::None);
    town.assert_both_sides_depth(a, 0);
}

#[test]
fn test_replacement_with_same_endpoints_keeps_preference() {
    let mut town = TestTown::new();
    let road = town.spawn_settled_road(WEST, EAST, ZoningPreference::Right);

    let new = town.replace_road(road, WEST, EAST);
    town.tick(1);

    town.assert_preference(new, ZoningPreference::Right);
    town.assert_side_depth(new, BlockSide::SideA, 0);
}

#[test]
fn test_reversed_replacement_keeps_preference() {
    let mut town = TestTown::new();
    let road = town.spawn_settled_road(WEST, EAST, ZoningPreference::Left);

    let new = town.replace_road(road, EAST, WEST);
    town.tick(1);

    town.assert_preference(new, ZoningPreference::Left);
}

#[test]
fn test_shortened_road_inherits_through_its_end() {
    let mut town = TestTown::new();
    let road = town.spawn_settled_road(WEST, EAST, ZoningPreference::Right);

    // Only the end coordinate survives the edit.
    let new = town.replace_road(road, Vec2::new(40.0, 0.0), EAST);
    town.tick(1);

    town.assert_preference(new, ZoningPreference::Right);
}

// ====================================================================
// Merges
// ====================================================================

#[test]
fn test_merge_of_matching_parents_keeps_preference() {
    let mut town = TestTown::new();
    let a = town.spawn_settled_road(WEST, MID, ZoningPreference::Left);
    let b = town.spawn_settled_road(MID, EAST, ZoningPreference::Left);

    let merged = town.merge_roads(a, b);
    town.tick(1);

    town.assert_preference(merged, ZoningPreference::Left);
    town.assert_side_depth(merged, BlockSide::SideB, 0);
}

#[test]
fn test_merge_of_conflicting_parents_falls_back_to_default() {
    let mut town = TestTown::new();
    let a = town.spawn_settled_road(WEST, MID, ZoningPreference::Left);
    let b = town.spawn_settled_road(MID, EAST, ZoningPreference::Right);

    let merged = town.merge_roads(a, b);
    town.tick(1);

    town.assert_preference(merged, ZoningPreference::Default);
    town.assert_both_sides_depth(merged, 6);
}

#[test]
fn test_unrelated_deletions_do_not_combine() {
    let mut town = TestTown::new();
    let a = town.spawn_settled_road(Vec2::ZERO, Vec2::new(0.0, 64.0), ZoningPreference::Left);
    let b = town.spawn_settled_road(
        Vec2::new(100.0, 0.0),
        Vec2::new(100.0, 64.0),
        ZoningPreference::Left,
    );

    // Head touches `a`, tail touches `b`, but `a` and `b` never met.
    town.bulldoze(a);
    town.bulldoze(b);
    let new = town.spawn_road(Vec2::ZERO, Vec2::new(100.0, 64.0));
    town.tick(1);

    town.assert_preference(new, ZoningPreference::Default);
}

// ====================================================================
// Precedence
// ====================================================================

#[test]
fn test_existing_preference_beats_inheritance() {
    let mut town = TestTown::new();
    let road = town.spawn_settled_road(WEST, EAST, ZoningPreference::Right);

    let new = town.replace_road(road, WEST, EAST);
    town.world_mut().entity_mut(new).insert(ZoningPreference::Left);
    town.tick(1);

    town.assert_preference(new, ZoningPreference::Left);
}

#[test]
fn test_preview_road_never_inherits() {
    let mut town = TestTown::new();
    let road = town.spawn_settled_road(WEST, EAST, ZoningPreference::Right);

    town.bulldoze(road);
    let preview = town.spawn_preview_road(WEST, EAST);
    town.tick(1);

    town.assert_preference(preview, ZoningPreference::Default);
    town.assert_both_sides_depth(preview, 6);
}

#[test]
fn test_inheritance_only_within_the_same_tick() {
    let mut town = TestTown::new();
    let road = town.spawn_settled_road(WEST, EAST, ZoningPreference::Right);

    town.bulldoze(road);
    town.tick(1);
    let later = town.spawn_road(WEST, EAST);
    town.tick(1);

    town.assert_preference(later, ZoningPreference::Default);
}

#[test]
fn test_upgrade_target_ignores_existing_preference() {
    let mut town = TestTown::new().with_settings(ZoningSettings {
        upgrade_enabled: true,
        ..Default::default()
    });
    let road = town.spawn_settled_road(WEST, EAST, ZoningPreference::Right);

    // The host copies the old component onto the upgraded segment.
    let upgraded = town.replace_road(road, WEST, EAST);
    town.world_mut()
        .entity_mut(upgraded)
        .insert(ZoningPreference::Left);
    town.set_upgrade_target(Some(upgraded));
    town.tick(1);

    town.assert_preference(upgraded, ZoningPreference::Right);
}

#[test]
fn test_upgrade_target_is_inert_when_disabled() {
    let mut town = TestTown::new();
    let road = town.spawn_settled_road(WEST, EAST, ZoningPreference::Right);

    let upgraded = town.replace_road(road, WEST, EAST);
    town.world_mut()
        .entity_mut(upgraded)
        .insert(ZoningPreference::Left);
    town.set_upgrade_target(Some(upgraded));
    town.tick(1);

    town.assert_preference(upgraded, ZoningPreference::Left);
}

// ====================================================================
// Endpoint tolerance
// ====================================================================

#[test]
fn test_endpoints_within_tolerance_match() {
    let mut town = TestTown::new();
    let road = town.spawn_settled_road(WEST, EAST, ZoningPreference::Left);

    let jitter = Vec2::new(0.0004, -0.0003);
    let new = town.replace_road(road, WEST + jitter, EAST - jitter);
    town.tick(1);

    town.assert_preference(new, ZoningPreference::Left);
}

#[test]
fn test_endpoints_beyond_tolerance_do_not_match() {
    let mut town = TestTown::new();
    let road = town.spawn_settled_road(WEST, EAST, ZoningPreference::Left);

    let offset = Vec2::new(0.01, 0.01);
    let new = town.replace_road(road, WEST + offset, EAST + offset);
    town.tick(1);

    town.assert_preference(new, ZoningPreference::Default);
}
