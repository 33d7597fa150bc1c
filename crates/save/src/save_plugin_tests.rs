//! Full save/load round trips through `SavePlugin` in a headless App.

use std::path::PathBuf;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use zoning::blocks::{BlockSnapshot, Owner, ValidArea, ZoneBlock};
use zoning::geometry::{classify_block, BlockSide};
use zoning::host::{spawn_segment, HostLifecyclePlugin, RoadCurve, SegmentKey};
use zoning::preference::ZoningPreference;
use zoning::ZoningPlugin;

use crate::{LoadZoningEvent, SaveFilePath, SavePlugin, SaveStatus, SaveZoningEvent};

fn temp_save(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("zoning_save_test_{name}.bin"));
    let _ = std::fs::remove_file(&path);
    path
}

fn town_app(path: &PathBuf) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(StatesPlugin)
        .add_plugins(ZoningPlugin)
        .add_plugins(HostLifecyclePlugin)
        .add_plugins(SavePlugin);
    app.insert_resource(SaveFilePath(path.clone()));
    app.update();
    app
}

/// Segments keyed 1..=n, laid out as parallel east-west roads.
fn spawn_roads(app: &mut App, n: u64) -> Vec<Entity> {
    let roads = (1..=n)
        .map(|k| {
            let z = k as f32 * 100.0;
            spawn_segment(
                app.world_mut(),
                RoadCurve::straight(Vec2::new(0.0, z), Vec2::new(128.0, z)),
                SegmentKey(k),
                false,
                6,
            )
        })
        .collect();
    app.world_mut().run_schedule(FixedUpdate);
    roads
}

/// Detect the event in one frame, run the exclusive system on the next.
fn run_save_or_load(app: &mut App) {
    app.update();
    app.update();
}

fn set_preference(app: &mut App, road: Entity, preference: ZoningPreference) {
    app.world_mut().entity_mut(road).insert(preference);
}

fn preference(app: &App, road: Entity) -> Option<ZoningPreference> {
    app.world().get::<ZoningPreference>(road).copied()
}

fn side_depths(app: &mut App, road: Entity) -> Vec<(BlockSide, i32)> {
    let world = app.world_mut();
    let curve = world
        .get::<RoadCurve>(road)
        .map(RoadCurve::ground)
        .expect("road has a curve");
    let mut q = world.query::<(Entity, &ZoneBlock, &ValidArea, &Owner)>();
    q.iter(world)
        .filter(|(_, _, _, owner)| owner.0 == road)
        .map(|(e, block, area, owner)| {
            let snapshot = BlockSnapshot::new(e, owner.0, block, *area, false);
            (classify_block(&curve, &snapshot), block.size.y)
        })
        .collect()
}

#[test]
fn test_save_then_load_restores_preferences() {
    let path = temp_save("roundtrip");
    let mut app = town_app(&path);
    let roads = spawn_roads(&mut app, 3);
    set_preference(&mut app, roads[0], ZoningPreference::Left);
    set_preference(&mut app, roads[2], ZoningPreference::None);

    app.world_mut().send_event(SaveZoningEvent);
    run_save_or_load(&mut app);
    assert!(path.exists(), "save file should be written");
    assert!(!app.world().resource::<SaveStatus>().failed);

    for &road in &roads {
        set_preference(&mut app, road, ZoningPreference::Right);
    }

    app.world_mut().send_event(LoadZoningEvent);
    run_save_or_load(&mut app);

    assert_eq!(preference(&app, roads[0]), Some(ZoningPreference::Left));
    assert_eq!(preference(&app, roads[1]), Some(ZoningPreference::Default));
    assert_eq!(preference(&app, roads[2]), Some(ZoningPreference::None));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_load_resizes_blocks_on_next_tick() {
    let path = temp_save("resize");
    let mut app = town_app(&path);
    let roads = spawn_roads(&mut app, 1);
    set_preference(&mut app, roads[0], ZoningPreference::None);

    app.world_mut().send_event(SaveZoningEvent);
    run_save_or_load(&mut app);

    set_preference(&mut app, roads[0], ZoningPreference::Default);
    app.world_mut().send_event(LoadZoningEvent);
    run_save_or_load(&mut app);
    app.world_mut().run_schedule(FixedUpdate);

    let depths = side_depths(&mut app, roads[0]);
    assert!(!depths.is_empty());
    assert!(depths.iter().all(|&(_, depth)| depth == 0), "{depths:?}");

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_preferences_follow_segment_keys_into_a_fresh_town() {
    let path = temp_save("fresh_town");
    let mut first = town_app(&path);
    let roads = spawn_roads(&mut first, 2);
    set_preference(&mut first, roads[1], ZoningPreference::Right);
    first.world_mut().send_event(SaveZoningEvent);
    run_save_or_load(&mut first);

    // Same keys, different entities.
    let mut second = town_app(&path);
    second.world_mut().spawn_empty();
    let rebuilt = spawn_roads(&mut second, 2);
    second.world_mut().send_event(LoadZoningEvent);
    run_save_or_load(&mut second);

    assert_eq!(preference(&second, rebuilt[1]), Some(ZoningPreference::Right));
    assert_eq!(preference(&second, rebuilt[0]), Some(ZoningPreference::Default));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_corrupted_file_is_rejected_and_world_untouched() {
    let path = temp_save("corrupt");
    let mut app = town_app(&path);
    let roads = spawn_roads(&mut app, 1);
    set_preference(&mut app, roads[0], ZoningPreference::Left);
    app.world_mut().send_event(SaveZoningEvent);
    run_save_or_load(&mut app);

    let mut bytes = std::fs::read(&path).expect("save file");
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    std::fs::write(&path, &bytes).expect("rewrite");

    set_preference(&mut app, roads[0], ZoningPreference::Right);
    app.world_mut().send_event(LoadZoningEvent);
    run_save_or_load(&mut app);

    let status = app.world().resource::<SaveStatus>();
    assert!(status.failed);
    assert!(
        status.message.as_deref().is_some_and(|m| m.contains("checksum")),
        "{status:?}"
    );
    assert_eq!(preference(&app, roads[0]), Some(ZoningPreference::Right));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_missing_file_reports_failure() {
    let path = temp_save("missing");
    let mut app = town_app(&path);
    app.world_mut().send_event(LoadZoningEvent);
    app.update();

    let status = app.world().resource::<SaveStatus>();
    assert!(status.failed);
    assert!(status.message.as_deref().is_some_and(|m| m.contains("I/O")));
}
