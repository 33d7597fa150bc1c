//! Headless `--agent` mode: a blocking loop that reads JSON commands from
//! stdin and writes JSON responses to stdout.
//!
//! When the `--agent` flag is passed the app skips rendering and UI and runs
//! this loop instead of `app.run()`. See [`crate::agent_protocol`] for the
//! schema.

use std::io::{BufRead, Write};
use std::path::Path;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use zoning::blocks::{Owner, ZoneBlock};
use zoning::commands::{apply_zoning_commands, ZoningCommand, ZoningCommandBuffer};
use zoning::geometry::{side_of, BlockSide};
use zoning::host::{Deleted, HostLifecyclePlugin, RoadCurve, SegmentKey};
use zoning::preference::ZoningPreference;
use zoning::{HostEndOfTick, ZoningPlugin};

use crate::agent_protocol::{
    make_response, AgentCommand, AgentResponse, ResponsePayload, SegmentObservation,
    PROTOCOL_VERSION,
};
use crate::host_edits::{
    bulldoze_road, clear_upgrade_target, find_segment, rebuild_road, spawn_road, split_road,
    SegmentKeyAllocator,
};
use crate::settings_file::{load_settings_or_default, SETTINGS_FILE};

pub fn build_headless_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(StatesPlugin)
        .insert_resource(load_settings_or_default(Path::new(SETTINGS_FILE)))
        .init_resource::<SegmentKeyAllocator>()
        .add_plugins((ZoningPlugin, HostLifecyclePlugin, save::SavePlugin))
        .add_systems(FixedUpdate, clear_upgrade_target.after(HostEndOfTick));

    // Initial update so Startup systems execute and resources initialize.
    app.update();
    app
}

pub fn run_agent_mode() {
    let mut app = build_headless_app();

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout().lock();

    write_response(&mut stdout, &make_response(ResponsePayload::Ready));
    // Log to stderr so it does not interfere with the JSON protocol on stdout.
    eprintln!("zoning agent mode v{PROTOCOL_VERSION} ready, waiting for commands on stdin");

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("stdin read error: {e}");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<AgentCommand>(&line) {
            Ok(cmd) => process_command(cmd, &mut app),
            Err(e) => make_response(ResponsePayload::Error {
                message: format!("Parse error: {e}"),
            }),
        };
        let is_goodbye = matches!(response.payload, ResponsePayload::Goodbye);
        write_response(&mut stdout, &response);
        if is_goodbye {
            break;
        }
    }

    eprintln!("zoning agent mode shutting down");
}

fn write_response(out: &mut impl Write, response: &AgentResponse) {
    match serde_json::to_string(response) {
        Ok(json) => {
            let _ = writeln!(out, "{json}");
        }
        Err(e) => {
            let _ = writeln!(
                out,
                r#"{{"protocol_version":{PROTOCOL_VERSION},"type":"error","message":"serialize failed: {e}"}}"#
            );
        }
    }
    let _ = out.flush();
}

fn error(message: impl Into<String>) -> AgentResponse {
    make_response(ResponsePayload::Error {
        message: message.into(),
    })
}

fn unknown_key(key: u64) -> AgentResponse {
    error(format!("no live segment with key {key}"))
}

fn key_of(world: &World, segment: Entity) -> Option<u64> {
    world.get::<SegmentKey>(segment).map(|k| k.0)
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

pub fn process_command(cmd: AgentCommand, app: &mut App) -> AgentResponse {
    let world = app.world_mut();
    let payload = match cmd {
        AgentCommand::SpawnRoad { from, to, applied } => {
            let curve = RoadCurve::straight(Vec2::from(from), Vec2::from(to));
            let (_, key) = spawn_road(world, curve, applied);
            ResponsePayload::Spawned { keys: vec![key.0] }
        }
        AgentCommand::Split { key, t } => {
            let Some(road) = find_segment(world, SegmentKey(key)) else {
                return unknown_key(key);
            };
            let Some((a, b)) = split_road(world, road, t) else {
                return unknown_key(key);
            };
            ResponsePayload::Spawned {
                keys: [a, b].iter().filter_map(|&e| key_of(world, e)).collect(),
            }
        }
        AgentCommand::Rebuild { key } => {
            let Some(road) = find_segment(world, SegmentKey(key)) else {
                return unknown_key(key);
            };
            match rebuild_road(world, road).and_then(|e| key_of(world, e)) {
                Some(new_key) => ResponsePayload::Spawned {
                    keys: vec![new_key],
                },
                None => return unknown_key(key),
            }
        }
        AgentCommand::Bulldoze { key } => match find_segment(world, SegmentKey(key)) {
            Some(road) if bulldoze_road(world, road) => ResponsePayload::Ok,
            _ => return unknown_key(key),
        },
        AgentCommand::SetMode { keys, mode } => {
            let mode = ZoningPreference::parse_lenient(&mode);
            let mut segments = Vec::with_capacity(keys.len());
            for key in keys {
                match find_segment(world, SegmentKey(key)) {
                    Some(segment) => segments.push(segment),
                    None => return unknown_key(key),
                }
            }
            commit_mode(world, &segments, mode);
            ResponsePayload::Ok
        }
        AgentCommand::Step { ticks } => {
            for _ in 0..ticks {
                world.run_schedule(FixedUpdate);
            }
            ResponsePayload::StepComplete { ticks }
        }
        AgentCommand::Observe { keys } => ResponsePayload::Observation {
            segments: observe(world, keys.as_deref()),
        },
        AgentCommand::Save { path } => match save::save_to_path(world, Path::new(&path)) {
            Ok(bytes) => ResponsePayload::Saved { bytes },
            Err(e) => return error(format!("save failed: {e}")),
        },
        AgentCommand::Load { path } => {
            let bytes = match std::fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => return error(format!("load failed: {e}")),
            };
            match save::load_from_bytes(world, &bytes) {
                Ok(report) => ResponsePayload::Loaded {
                    restored: report.restored,
                    defaulted: report.defaulted,
                    orphaned: report.orphaned,
                },
                Err(e) => return error(format!("load failed: {e}")),
            }
        }
        AgentCommand::Quit => ResponsePayload::Goodbye,
    };
    make_response(payload)
}

/// Write `mode` onto `segments` and flag their blocks, the same commands a
/// selection tool commit stages.
fn commit_mode(world: &mut World, segments: &[Entity], mode: ZoningPreference) {
    let mut blocks = world.query_filtered::<(Entity, &Owner), With<ZoneBlock>>();
    let mut staged: Vec<ZoningCommand> = segments
        .iter()
        .map(|&segment| ZoningCommand::SetPreference {
            segment,
            preference: mode,
        })
        .collect();
    staged.extend(
        blocks
            .iter(world)
            .filter(|(_, owner)| segments.contains(&owner.0))
            .map(|(block, _)| ZoningCommand::RequestResolution(block)),
    );
    world.resource_mut::<ZoningCommandBuffer>().extend(staged);
    apply_zoning_commands(world);
}

fn observe(world: &mut World, keys: Option<&[u64]>) -> Vec<SegmentObservation> {
    let mut segments = world.query_filtered::<
        (Entity, &SegmentKey, &RoadCurve, Option<&ZoningPreference>),
        Without<Deleted>,
    >();
    let mut observed: Vec<(Entity, SegmentObservation, RoadCurve)> = segments
        .iter(world)
        .filter(|(_, key, _, _)| keys.map_or(true, |keys| keys.contains(&key.0)))
        .map(|(entity, key, curve, preference)| {
            (
                entity,
                SegmentObservation {
                    key: key.0,
                    preference: preference.copied().unwrap_or_default(),
                    side_a_depths: Vec::new(),
                    side_b_depths: Vec::new(),
                },
                *curve,
            )
        })
        .collect();

    let mut blocks = world.query_filtered::<(Entity, &ZoneBlock, &Owner), Without<Deleted>>();
    let mut owned: Vec<(Entity, ZoneBlock, Entity)> = blocks
        .iter(world)
        .map(|(entity, block, owner)| (entity, *block, owner.0))
        .collect();
    owned.sort_by_key(|(entity, _, _)| *entity);

    for (segment, observation, curve) in &mut observed {
        let ground = curve.ground();
        for (_, block, _) in owned.iter().filter(|(_, _, owner)| owner == segment) {
            match side_of(&ground, block.ground_position(), block.direction) {
                BlockSide::SideA => observation.side_a_depths.push(block.size.y),
                BlockSide::SideB => observation.side_b_depths.push(block.size.y),
            }
        }
    }

    let mut result: Vec<SegmentObservation> = observed.into_iter().map(|(_, o, _)| o).collect();
    result.sort_by_key(|o| o.key);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(app: &mut App, json: &str) -> ResponsePayload {
        let cmd: AgentCommand = serde_json::from_str(json).unwrap();
        process_command(cmd, app).payload
    }

    fn spawned_keys(payload: ResponsePayload) -> Vec<u64> {
        match payload {
            ResponsePayload::Spawned { keys } => keys,
            other => panic!("expected Spawned, got {other:?}"),
        }
    }

    fn observe_one(app: &mut App, key: u64) -> SegmentObservation {
        match run(app, &format!(r#"{{"cmd":"observe","keys":[{key}]}}"#)) {
            ResponsePayload::Observation { mut segments } => {
                assert_eq!(segments.len(), 1);
                segments.remove(0)
            }
            other => panic!("expected Observation, got {other:?}"),
        }
    }

    #[test]
    fn set_mode_then_step_sizes_blocks() {
        let mut app = build_headless_app();
        let keys = spawned_keys(run(
            &mut app,
            r#"{"cmd":"spawn_road","from":[0,0],"to":[0,64],"applied":false}"#,
        ));
        run(&mut app, r#"{"cmd":"step","ticks":1}"#);
        run(
            &mut app,
            &format!(r#"{{"cmd":"set_mode","keys":[{}],"mode":"left"}}"#, keys[0]),
        );
        run(&mut app, r#"{"cmd":"step","ticks":1}"#);

        let seen = observe_one(&mut app, keys[0]);
        assert_eq!(seen.preference, ZoningPreference::Left);
        assert!(!seen.side_a_depths.is_empty());
        assert!(seen.side_b_depths.iter().all(|&d| d == 0));
    }

    #[test]
    fn split_keeps_preference_on_both_halves() {
        let mut app = build_headless_app();
        let keys = spawned_keys(run(
            &mut app,
            r#"{"cmd":"spawn_road","from":[0,0],"to":[0,128]}"#,
        ));
        run(&mut app, r#"{"cmd":"step","ticks":1}"#);
        run(
            &mut app,
            &format!(r#"{{"cmd":"set_mode","keys":[{}],"mode":"right"}}"#, keys[0]),
        );
        run(&mut app, r#"{"cmd":"step","ticks":1}"#);

        let halves = spawned_keys(run(
            &mut app,
            &format!(r#"{{"cmd":"split","key":{},"t":0.5}}"#, keys[0]),
        ));
        assert_eq!(halves.len(), 2);
        run(&mut app, r#"{"cmd":"step","ticks":1}"#);
        for key in halves {
            assert_eq!(observe_one(&mut app, key).preference, ZoningPreference::Right);
        }
    }

    #[test]
    fn unknown_keys_are_errors() {
        let mut app = build_headless_app();
        for json in [
            r#"{"cmd":"split","key":99,"t":0.5}"#,
            r#"{"cmd":"bulldoze","key":99}"#,
            r#"{"cmd":"rebuild","key":99}"#,
            r#"{"cmd":"set_mode","keys":[99],"mode":"left"}"#,
        ] {
            assert!(
                matches!(run(&mut app, json), ResponsePayload::Error { .. }),
                "{json}"
            );
        }
    }

    #[test]
    fn bulldozed_road_disappears_after_step() {
        let mut app = build_headless_app();
        let keys = spawned_keys(run(
            &mut app,
            r#"{"cmd":"spawn_road","from":[0,0],"to":[64,0]}"#,
        ));
        let bulldoze = format!(r#"{{"cmd":"bulldoze","key":{}}}"#, keys[0]);
        assert!(matches!(run(&mut app, &bulldoze), ResponsePayload::Ok));
        run(&mut app, r#"{"cmd":"step","ticks":1}"#);
        match run(&mut app, r#"{"cmd":"observe"}"#) {
            ResponsePayload::Observation { segments } => assert!(segments.is_empty()),
            other => panic!("expected Observation, got {other:?}"),
        }
    }

    #[test]
    fn save_then_load_round_trips_preferences() {
        let path = std::env::temp_dir().join(format!("zoning_agent_{}.bin", std::process::id()));
        let path = path.to_string_lossy().replace('\\', "/");
        let mut app = build_headless_app();
        let keys = spawned_keys(run(
            &mut app,
            r#"{"cmd":"spawn_road","from":[0,0],"to":[0,64]}"#,
        ));
        run(&mut app, r#"{"cmd":"step","ticks":1}"#);
        run(
            &mut app,
            &format!(r#"{{"cmd":"set_mode","keys":[{}],"mode":"none"}}"#, keys[0]),
        );
        let saved = run(&mut app, &format!(r#"{{"cmd":"save","path":"{path}"}}"#));
        assert!(matches!(saved, ResponsePayload::Saved { bytes } if bytes > 0));

        run(
            &mut app,
            &format!(r#"{{"cmd":"set_mode","keys":[{}],"mode":"left"}}"#, keys[0]),
        );
        let loaded = run(&mut app, &format!(r#"{{"cmd":"load","path":"{path}"}}"#));
        assert!(matches!(loaded, ResponsePayload::Loaded { restored: 1, .. }));
        assert_eq!(observe_one(&mut app, keys[0]).preference, ZoningPreference::None);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn quit_says_goodbye() {
        let mut app = build_headless_app();
        assert!(matches!(
            run(&mut app, r#"{"cmd":"quit"}"#),
            ResponsePayload::Goodbye
        ));
    }
}
