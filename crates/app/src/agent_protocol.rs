//! Newline-delimited JSON protocol for the `--agent` headless mode.
//!
//! Each stdin line is one [`AgentCommand`] tagged by `cmd`; each stdout line is
//! an [`AgentResponse`] carrying `protocol_version` and a `type` tag.

use serde::{Deserialize, Serialize};

use zoning::preference::ZoningPreference;

// ---------------------------------------------------------------------------
// Commands (stdin → toolkit)
// ---------------------------------------------------------------------------

fn applied_by_default() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(tag = "cmd")]
pub enum AgentCommand {
    /// Spawn a straight road. `applied` (default true) makes it a committed
    /// edit that may inherit from roads deleted in the same tick.
    #[serde(rename = "spawn_road")]
    SpawnRoad {
        from: [f32; 2],
        to: [f32; 2],
        #[serde(default = "applied_by_default")]
        applied: bool,
    },

    #[serde(rename = "split")]
    Split { key: u64, t: f32 },

    /// Rebuild in place through the upgrade path.
    #[serde(rename = "rebuild")]
    Rebuild { key: u64 },

    #[serde(rename = "bulldoze")]
    Bulldoze { key: u64 },

    /// Commit a mode onto segments, as the selection tool does. Unknown mode
    /// names select `Default`.
    #[serde(rename = "set_mode")]
    SetMode { keys: Vec<u64>, mode: String },

    /// Advance `ticks` fixed-update ticks.
    #[serde(rename = "step")]
    Step { ticks: u64 },

    /// Report every live segment, or only `keys` when given.
    #[serde(rename = "observe")]
    Observe {
        #[serde(default)]
        keys: Option<Vec<u64>>,
    },

    #[serde(rename = "save")]
    Save { path: String },

    #[serde(rename = "load")]
    Load { path: String },

    #[serde(rename = "quit")]
    Quit,
}

// ---------------------------------------------------------------------------
// Responses (toolkit → stdout)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub protocol_version: u32,
    #[serde(flatten)]
    pub payload: ResponsePayload,
}

/// Block depths of one segment, split by side, in block spawn order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentObservation {
    pub key: u64,
    pub preference: ZoningPreference,
    pub side_a_depths: Vec<i32>,
    pub side_b_depths: Vec<i32>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ResponsePayload {
    #[serde(rename = "ready")]
    Ready,

    #[serde(rename = "spawned")]
    Spawned { keys: Vec<u64> },

    #[serde(rename = "step_complete")]
    StepComplete { ticks: u64 },

    #[serde(rename = "observation")]
    Observation { segments: Vec<SegmentObservation> },

    #[serde(rename = "saved")]
    Saved { bytes: usize },

    #[serde(rename = "loaded")]
    Loaded {
        restored: usize,
        defaulted: usize,
        orphaned: usize,
    },

    #[serde(rename = "ok")]
    Ok,

    #[serde(rename = "error")]
    Error { message: String },

    #[serde(rename = "goodbye")]
    Goodbye,
}

/// Bump when the command/response schema changes.
pub const PROTOCOL_VERSION: u32 = 1;

pub fn make_response(payload: ResponsePayload) -> AgentResponse {
    AgentResponse {
        protocol_version: PROTOCOL_VERSION,
        payload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_spawn_road_defaults_to_applied() {
        let json = r#"{"cmd":"spawn_road","from":[0,0],"to":[0,64]}"#;
        let cmd: AgentCommand = serde_json::from_str(json).unwrap();
        match cmd {
            AgentCommand::SpawnRoad { from, to, applied } => {
                assert_eq!(from, [0.0, 0.0]);
                assert_eq!(to, [0.0, 64.0]);
                assert!(applied);
            }
            other => panic!("expected SpawnRoad, got {other:?}"),
        }
    }

    #[test]
    fn deserialize_set_mode() {
        let json = r#"{"cmd":"set_mode","keys":[1,2],"mode":"left"}"#;
        let cmd: AgentCommand = serde_json::from_str(json).unwrap();
        assert!(matches!(cmd, AgentCommand::SetMode { ref keys, .. } if keys == &[1, 2]));
    }

    #[test]
    fn deserialize_observe_without_keys() {
        let cmd: AgentCommand = serde_json::from_str(r#"{"cmd":"observe"}"#).unwrap();
        assert!(matches!(cmd, AgentCommand::Observe { keys: None }));
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(serde_json::from_str::<AgentCommand>(r#"{"cmd":"fly"}"#).is_err());
    }

    #[test]
    fn serialize_response_flattens_payload() {
        let resp = make_response(ResponsePayload::StepComplete { ticks: 3 });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["protocol_version"], PROTOCOL_VERSION);
        assert_eq!(json["type"], "step_complete");
        assert_eq!(json["ticks"], 3);
    }

    #[test]
    fn serialize_observation() {
        let resp = make_response(ResponsePayload::Observation {
            segments: vec![SegmentObservation {
                key: 7,
                preference: ZoningPreference::Right,
                side_a_depths: vec![0],
                side_b_depths: vec![6],
            }],
        });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["segments"][0]["preference"], "Right");
        assert_eq!(json["segments"][0]["side_b_depths"][0], 6);
    }
}
