use cubecast_common::{BlockType, CubeId, Resolution};
use cubecast_world::{BehaviorState, CubeRecord, Sensor};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Sub-command for `ControlAiAgent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AgentAction {
    SetBehavior { state: BehaviorState },
    SetTarget { target: Vec3 },
    UpdateMemory { key: String, value: serde_json::Value },
    AddSensor { sensor: Sensor },
}

/// Sub-command for `ControlCamera`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CameraAction {
    Rotate { yaw_delta: f32, pitch_delta: f32 },
    MoveTo { position: Vec3 },
    PinTier { tier: Option<usize> },
}

/// One request from the external dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    CreateBlock {
        position: Vec3,
        block_type: BlockType,
        #[serde(default)]
        traversable: bool,
    },
    CreateCamera {
        position: Vec3,
        name: String,
        resolution: Option<Resolution>,
    },
    CreateAiAgent {
        position: Vec3,
        name: String,
        ai_type: String,
    },
    MoveCube {
        id: CubeId,
        position: Vec3,
    },
    RemoveCube {
        id: CubeId,
    },
    ControlAiAgent {
        id: CubeId,
        #[serde(flatten)]
        action: AgentAction,
    },
    ControlCamera {
        id: CubeId,
        #[serde(flatten)]
        action: CameraAction,
    },
    GetCameras,
    GetAiAgents,
    GetCubeInfo {
        id: CubeId,
    },
    SubscribeCamera {
        id: CubeId,
    },
    UnsubscribeCamera {
        id: CubeId,
    },
}

/// The single reply to a command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok,
    Created { id: CubeId },
    Cube { cube: CubeRecord },
    Cubes { cubes: Vec<CubeRecord> },
    Error { kind: String, message: String },
}

impl Response {
    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }
}
