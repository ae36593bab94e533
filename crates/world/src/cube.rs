use cubecast_common::{Aabb, BlockType, CubeId, Resolution, Rotation};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed humanoid extents used for every player cube.
pub const PLAYER_SIZE: Vec3 = Vec3::new(0.6, 1.8, 0.6);

/// Behavior state of an AI agent. No state is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorState {
    Idle,
    Moving,
    Observing,
    Interacting,
    Learning,
}

/// A sensor descriptor attached to an AI agent. The list is append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub kind: String,
    pub range: f32,
}

/// Camera-specific state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraState {
    pub name: String,
    pub rotation: Rotation,
    /// Field of view in degrees.
    pub field_of_view: f32,
    pub resolution: Resolution,
    /// Frames produced for this camera so far.
    pub frame_counter: u64,
    /// Optional pin to a single render tier index. When unset the pipeline
    /// re-attempts from the fastest tier on every frame.
    pub pinned_tier: Option<usize>,
}

impl CameraState {
    pub fn new(name: impl Into<String>, resolution: Resolution) -> Self {
        Self {
            name: name.into(),
            rotation: Rotation::default(),
            field_of_view: 70.0,
            resolution,
            frame_counter: 0,
            pinned_tier: None,
        }
    }
}

/// AI-agent-specific state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    pub name: String,
    pub ai_type: String,
    pub behavior_state: BehaviorState,
    pub target_position: Option<Vec3>,
    /// Free-form key/value store, mutated only through `update_memory`.
    pub memory: BTreeMap<String, serde_json::Value>,
    pub sensors: Vec<Sensor>,
}

impl AgentState {
    pub fn new(name: impl Into<String>, ai_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ai_type: ai_type.into(),
            behavior_state: BehaviorState::Idle,
            target_position: None,
            memory: BTreeMap::new(),
            sensors: Vec::new(),
        }
    }
}

/// Player-specific state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub player_id: String,
    pub name: String,
}

/// The closed set of cube specializations. Dispatch happens by matching on
/// this tag; there is no open-ended subclassing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Variant {
    Block,
    Camera(CameraState),
    Agent(AgentState),
    Player(PlayerState),
}

impl Variant {
    pub fn kind(&self) -> VariantKind {
        match self {
            Variant::Block => VariantKind::Block,
            Variant::Camera(_) => VariantKind::Camera,
            Variant::Agent(_) => VariantKind::Agent,
            Variant::Player(_) => VariantKind::Player,
        }
    }
}

/// Payload-free variant tag, used for collection selection and listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    Block,
    Camera,
    Agent,
    Player,
}

impl VariantKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantKind::Block => "block",
            VariantKind::Camera => "camera",
            VariantKind::Agent => "ai_agent",
            VariantKind::Player => "player",
        }
    }
}

/// A positioned, sized, typed volume in the world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cube {
    pub id: CubeId,
    pub position: Vec3,
    pub size: Vec3,
    pub block_type: BlockType,
    pub texture: Option<String>,
    /// A traversable cube never blocks placement or movement of others and
    /// is itself never blocked.
    pub traversable: bool,
    pub variant: Variant,
}

impl Cube {
    /// Plain terrain block of unit size.
    pub fn block(position: Vec3, block_type: BlockType, traversable: bool) -> Self {
        Self {
            id: CubeId::new(),
            position,
            size: Vec3::ONE,
            block_type,
            texture: None,
            traversable,
            variant: Variant::Block,
        }
    }

    pub fn camera(position: Vec3, name: impl Into<String>, resolution: Resolution) -> Self {
        Self {
            id: CubeId::new(),
            position,
            size: Vec3::ONE,
            block_type: BlockType::Camera,
            texture: None,
            traversable: false,
            variant: Variant::Camera(CameraState::new(name, resolution)),
        }
    }

    pub fn agent(position: Vec3, name: impl Into<String>, ai_type: impl Into<String>) -> Self {
        Self {
            id: CubeId::new(),
            position,
            size: Vec3::ONE,
            block_type: BlockType::AiAgent,
            texture: None,
            traversable: false,
            variant: Variant::Agent(AgentState::new(name, ai_type)),
        }
    }

    pub fn player(position: Vec3, player_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: CubeId::new(),
            position,
            size: PLAYER_SIZE,
            block_type: BlockType::Player,
            texture: None,
            traversable: false,
            variant: Variant::Player(PlayerState {
                player_id: player_id.into(),
                name: name.into(),
            }),
        }
    }

    pub fn kind(&self) -> VariantKind {
        self.variant.kind()
    }

    pub fn has_camera(&self) -> bool {
        matches!(self.variant, Variant::Camera(_))
    }

    /// Plain terrain blocks are fixed; every other variant can move.
    pub fn is_moveable(&self) -> bool {
        !matches!(self.variant, Variant::Block)
    }

    pub fn is_traversable(&self) -> bool {
        self.traversable
    }

    /// The volume this cube occupies.
    pub fn volume(&self) -> Aabb {
        Aabb::new(self.position, self.size)
    }

    /// The volume this cube would occupy at a candidate position.
    pub fn volume_at(&self, position: Vec3) -> Aabb {
        Aabb::new(position, self.size)
    }

    pub fn camera_state(&self) -> Option<&CameraState> {
        match &self.variant {
            Variant::Camera(state) => Some(state),
            _ => None,
        }
    }

    pub fn agent_state(&self) -> Option<&AgentState> {
        match &self.variant {
            Variant::Agent(state) => Some(state),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_flags_follow_variant() {
        let block = Cube::block(Vec3::ZERO, BlockType::Grass, false);
        assert!(!block.has_camera());
        assert!(!block.is_moveable());

        let cam = Cube::camera(Vec3::ZERO, "cam", Resolution::default());
        assert!(cam.has_camera());
        assert!(cam.is_moveable());

        let agent = Cube::agent(Vec3::ZERO, "bot", "basic");
        assert!(agent.is_moveable());
        assert_eq!(
            agent.agent_state().unwrap().behavior_state,
            BehaviorState::Idle
        );
    }

    #[test]
    fn player_has_fixed_humanoid_size() {
        let p = Cube::player(Vec3::ZERO, "p1", "Steve");
        assert_eq!(p.size, PLAYER_SIZE);
        assert_eq!(p.kind(), VariantKind::Player);
    }

    #[test]
    fn camera_defaults() {
        let cam = Cube::camera(Vec3::ZERO, "cam", Resolution::default());
        let state = cam.camera_state().unwrap();
        assert_eq!(state.field_of_view, 70.0);
        assert_eq!(state.frame_counter, 0);
        assert!(state.pinned_tier.is_none());
    }
}
