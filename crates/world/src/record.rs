use crate::cube::{BehaviorState, Cube, Sensor, Variant};
use cubecast_common::{BlockType, CubeId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Flat serialized view of a cube: all base fields plus the variant's extra
/// fields, using plain scalar/array types only. This is the record shape the
/// external dispatcher sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeRecord {
    pub id: CubeId,
    pub variant: String,
    pub position: [f32; 3],
    pub size: [f32; 3],
    pub block_type: BlockType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texture: Option<String>,
    pub has_camera: bool,
    pub is_moveable: bool,
    pub is_traversable: bool,

    // Camera fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_of_view: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<[u32; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_counter: Option<u64>,

    // AI agent fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behavior_state: Option<BehaviorState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_position: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensors: Option<Vec<Sensor>>,

    // Player fields
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_id: Option<String>,
}

impl From<&Cube> for CubeRecord {
    fn from(cube: &Cube) -> Self {
        let mut record = CubeRecord {
            id: cube.id,
            variant: cube.kind().as_str().to_string(),
            position: cube.position.to_array(),
            size: cube.size.to_array(),
            block_type: cube.block_type,
            texture: cube.texture.clone(),
            has_camera: cube.has_camera(),
            is_moveable: cube.is_moveable(),
            is_traversable: cube.is_traversable(),
            name: None,
            rotation: None,
            field_of_view: None,
            resolution: None,
            frame_counter: None,
            ai_type: None,
            behavior_state: None,
            target_position: None,
            memory: None,
            sensors: None,
            player_id: None,
        };
        match &cube.variant {
            Variant::Block => {}
            Variant::Camera(state) => {
                record.name = Some(state.name.clone());
                record.rotation = Some([state.rotation.yaw, state.rotation.pitch]);
                record.field_of_view = Some(state.field_of_view);
                record.resolution = Some([state.resolution.width, state.resolution.height]);
                record.frame_counter = Some(state.frame_counter);
            }
            Variant::Agent(state) => {
                record.name = Some(state.name.clone());
                record.ai_type = Some(state.ai_type.clone());
                record.behavior_state = Some(state.behavior_state);
                record.target_position = state.target_position.map(|t| t.to_array());
                record.memory = Some(state.memory.clone());
                record.sensors = Some(state.sensors.clone());
            }
            Variant::Player(state) => {
                record.name = Some(state.name.clone());
                record.player_id = Some(state.player_id.clone());
            }
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubecast_common::Resolution;
    use glam::Vec3;

    #[test]
    fn camera_record_is_flat() {
        let cube = Cube::camera(Vec3::new(10.0, 5.0, 10.0), "cam", Resolution::new(320, 240));
        let record = CubeRecord::from(&cube);
        assert_eq!(record.variant, "camera");
        assert_eq!(record.position, [10.0, 5.0, 10.0]);
        assert_eq!(record.resolution, Some([320, 240]));
        assert!(record.has_camera);
        assert!(record.ai_type.is_none());

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["field_of_view"], serde_json::json!(70.0));
        // Absent variant fields are omitted entirely, not null.
        assert!(json.get("player_id").is_none());
    }

    #[test]
    fn agent_record_carries_behavior() {
        let cube = Cube::agent(Vec3::new(5.0, 1.0, 5.0), "bot", "advanced");
        let record = CubeRecord::from(&cube);
        assert_eq!(record.variant, "ai_agent");
        assert_eq!(record.ai_type.as_deref(), Some("advanced"));
        assert_eq!(record.behavior_state, Some(BehaviorState::Idle));
        assert!(record.is_moveable);
    }

    #[test]
    fn block_record_has_no_variant_fields() {
        let cube = Cube::block(Vec3::ZERO, BlockType::Grass, false);
        let record = CubeRecord::from(&cube);
        assert_eq!(record.variant, "block");
        assert!(record.name.is_none());
        assert!(!record.is_moveable);
    }
}
