//! Selection tool driven frame by frame through the UI bridge.

use bevy::prelude::*;

use crate::geometry::BlockSide;
use crate::orchestrator::ZoningResolutionRequired;
use crate::preference::ZoningPreference;
use crate::test_harness::TestTown;
use crate::tool::{ButtonSignal, ToolInput, ToolState};
use crate::ui_bridge::ZoningUiCommand;

fn three_roads(town: &mut TestTown) -> [Entity; 3] {
    [0.0, 100.0, 200.0].map(|z| {
        town.spawn_settled_road(
            Vec2::new(0.0, z),
            Vec2::new(128.0, z),
            ZoningPreference::Default,
        )
    })
}

// ====================================================================
// Commit paths
// ====================================================================

#[test]
fn test_drag_commits_mode_to_every_selected_road() {
    let mut town = TestTown::new();
    let [a, b, c] = three_roads(&mut town);

    town.enable_tool(ZoningPreference::Left);
    town.drag_over(&[a, b]);

    // The preference lands in the frame's flush, the blocks on the next tick.
    town.assert_preference(a, ZoningPreference::Left);
    town.assert_preference(b, ZoningPreference::Left);
    town.assert_side_depth(a, BlockSide::SideB, 6);
    town.tick(1);

    for road in [a, b] {
        town.assert_side_depth(road, BlockSide::SideA, 6);
        town.assert_side_depth(road, BlockSide::SideB, 0);
        town.assert_not_highlighted(road);
    }
    town.assert_preference(c, ZoningPreference::Default);
    town.assert_both_sides_depth(c, 6);
}

#[test]
fn test_resolution_flags_are_cleared_after_sizing() {
    let mut town = TestTown::new();
    let [a, _, _] = three_roads(&mut town);

    town.enable_tool(ZoningPreference::None);
    town.tap(a);
    let blocks = town.blocks_of(a);
    assert!(blocks
        .iter()
        .all(|&b| town.world().get::<ZoningResolutionRequired>(b).is_some()));

    town.tick(1);
    assert!(blocks
        .iter()
        .all(|&b| town.world().get::<ZoningResolutionRequired>(b).is_none()));
    town.assert_both_sides_depth(a, 0);
}

#[test]
fn test_tap_commits_the_hovered_road() {
    let mut town = TestTown::new();
    let [a, b, _] = three_roads(&mut town);

    town.enable_tool(ZoningPreference::Right);
    town.tap(b);
    town.tick(1);

    town.assert_preference(b, ZoningPreference::Right);
    town.assert_side_depth(b, BlockSide::SideA, 0);
    town.assert_preference(a, ZoningPreference::Default);
    assert_eq!(town.tool_state(), ToolState::Default);
}

#[test]
fn test_dragging_over_the_same_road_twice_selects_it_once() {
    let mut town = TestTown::new();
    let [a, b, _] = three_roads(&mut town);

    town.enable_tool(ZoningPreference::Left);
    town.frame(ButtonSignal::PRESSED, Some(a));
    town.frame(ButtonSignal::HELD, Some(b));
    town.frame(ButtonSignal::HELD, Some(a));
    let selection = town
        .working_state()
        .map(|w| w.selection.clone())
        .unwrap_or_default();
    assert_eq!(selection, vec![a, b]);
}

#[test]
fn test_mode_change_mid_session_applies_to_next_commit() {
    let mut town = TestTown::new();
    let [a, _, _] = three_roads(&mut town);

    town.enable_tool(ZoningPreference::Left);
    town.send_ui(ZoningUiCommand::SetModeByName("right".into()));
    town.frame(ButtonSignal::IDLE, None);
    town.tap(a);

    town.assert_preference(a, ZoningPreference::Right);
}

// ====================================================================
// Highlighting and cancel
// ====================================================================

#[test]
fn test_hover_moves_the_highlight() {
    let mut town = TestTown::new();
    let [a, b, _] = three_roads(&mut town);
    town.enable_tool(ZoningPreference::Left);

    town.frame(ButtonSignal::IDLE, Some(a));
    town.assert_highlighted(a);

    town.frame(ButtonSignal::IDLE, Some(b));
    town.assert_not_highlighted(a);
    town.assert_highlighted(b);

    town.frame(ButtonSignal::IDLE, None);
    town.assert_not_highlighted(b);
}

#[test]
fn test_selected_roads_stay_lit_while_dragging() {
    let mut town = TestTown::new();
    let [a, b, _] = three_roads(&mut town);
    town.enable_tool(ZoningPreference::Left);

    town.frame(ButtonSignal::PRESSED, Some(a));
    town.frame(ButtonSignal::HELD, Some(b));
    town.frame(ButtonSignal::HELD, None);

    town.assert_highlighted(a);
    town.assert_highlighted(b);
    assert_eq!(town.tool_state(), ToolState::Selecting);
}

#[test]
fn test_cancel_during_drag_commits_nothing() {
    let mut town = TestTown::new();
    let [a, b, _] = three_roads(&mut town);
    town.enable_tool(ZoningPreference::None);

    town.frame(ButtonSignal::PRESSED, Some(a));
    town.frame(ButtonSignal::HELD, Some(b));
    town.frame_with(
        ToolInput {
            apply: ButtonSignal::HELD,
            cancel: ButtonSignal::PRESSED,
        },
        Some(b),
    );
    assert_eq!(town.tool_state(), ToolState::Default);

    town.frame(ButtonSignal::IDLE, None);
    town.tick(1);

    for road in [a, b] {
        town.assert_preference(road, ZoningPreference::Default);
        town.assert_not_highlighted(road);
        town.assert_both_sides_depth(road, 6);
    }
}

#[test]
fn test_non_road_hits_are_ignored() {
    let mut town = TestTown::new();
    let [a, _, _] = three_roads(&mut town);
    let block = town.blocks_of(a)[0];
    town.enable_tool(ZoningPreference::None);

    town.tap(block);
    town.tick(1);

    town.assert_not_highlighted(block);
    town.assert_preference(a, ZoningPreference::Default);
}

// ====================================================================
// Enable / disable through the UI bridge
// ====================================================================

#[test]
fn test_tool_does_nothing_while_disabled() {
    let mut town = TestTown::new();
    let [a, _, _] = three_roads(&mut town);

    town.tap(a);
    town.frame(ButtonSignal::IDLE, Some(a));

    town.assert_not_highlighted(a);
    town.assert_preference(a, ZoningPreference::Default);
    assert!(town.working_state().is_none());
}

#[test]
fn test_disable_mid_drag_clears_highlights() {
    let mut town = TestTown::new();
    let [a, b, _] = three_roads(&mut town);
    town.enable_tool(ZoningPreference::Left);

    town.frame(ButtonSignal::PRESSED, Some(a));
    town.frame(ButtonSignal::HELD, Some(b));
    town.disable_tool();

    town.assert_not_highlighted(a);
    town.assert_not_highlighted(b);
    assert!(town.working_state().is_none());
    assert_eq!(town.tool_state(), ToolState::Default);
    assert!(!town.ui_state().tool_enabled);
    town.assert_preference(a, ZoningPreference::Default);
}

#[test]
fn test_enable_reports_mode_to_ui() {
    let mut town = TestTown::new();
    town.enable_tool(ZoningPreference::None);

    let ui = town.ui_state();
    assert!(ui.tool_enabled);
    assert_eq!(ui.mode, ZoningPreference::None);
    assert_eq!(
        town.working_state().map(|w| w.mode),
        Some(ZoningPreference::None)
    );
}

#[test]
fn test_unknown_mode_name_selects_default() {
    let mut town = TestTown::new();
    town.send_ui(ZoningUiCommand::SetMode(ZoningPreference::Left));
    town.send_ui(ZoningUiCommand::SetModeByName("diagonal".into()));
    town.frame(ButtonSignal::IDLE, None);

    assert_eq!(town.ui_state().mode, ZoningPreference::Default);
}

#[test]
fn test_panel_visibility_follows_host_tool() {
    let mut town = TestTown::new();
    assert!(!town.ui_state().visible);

    town.switch_host_tool(true);
    assert!(town.ui_state().visible);

    town.switch_host_tool(false);
    assert!(!town.ui_state().visible);
}
