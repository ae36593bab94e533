use crate::cube::{BehaviorState, Cube, Sensor, Variant, VariantKind};
use crate::error::{PlacementReason, WorldError};
use cubecast_common::{Aabb, BlockType, CubeId, Resolution};
use glam::Vec3;
use std::collections::BTreeMap;

/// The authoritative world state.
///
/// Owns every cube entity exclusively, partitioned by variant into disjoint
/// collections keyed by id. All mutations go through explicit operations and
/// are validated against the bounds and collision invariants before any state
/// changes; the `version` counter increments only on successful structural
/// mutation (add, move, remove), so derived caches keyed to a version never
/// observe a partial change.
///
/// Uses BTreeMap for deterministic iteration order across all platforms.
#[derive(Debug, Clone)]
pub struct WorldModel {
    bounds: Aabb,
    blocks: BTreeMap<CubeId, Cube>,
    cameras: BTreeMap<CubeId, Cube>,
    agents: BTreeMap<CubeId, Cube>,
    players: BTreeMap<CubeId, Cube>,
    version: u64,
}

impl WorldModel {
    /// Create an empty world covering a cube of side `extent` centered at the
    /// origin (shifted up so y spans [-1, extent - 1], keeping a floor layer
    /// at y = 0 inside bounds).
    pub fn new(extent: f32) -> Self {
        let half = extent * 0.5;
        Self::with_bounds(Aabb::new(
            Vec3::new(0.0, half - 1.0, 0.0),
            Vec3::splat(extent),
        ))
    }

    pub fn with_bounds(bounds: Aabb) -> Self {
        Self {
            bounds,
            blocks: BTreeMap::new(),
            cameras: BTreeMap::new(),
            agents: BTreeMap::new(),
            players: BTreeMap::new(),
            version: 0,
        }
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Monotonic counter incremented on every structural mutation. Derived
    /// caches compare against this to detect staleness.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn entity_count(&self) -> usize {
        self.blocks.len() + self.cameras.len() + self.agents.len() + self.players.len()
    }

    pub fn blocks(&self) -> &BTreeMap<CubeId, Cube> {
        &self.blocks
    }

    pub fn cameras(&self) -> &BTreeMap<CubeId, Cube> {
        &self.cameras
    }

    pub fn agents(&self) -> &BTreeMap<CubeId, Cube> {
        &self.agents
    }

    pub fn players(&self) -> &BTreeMap<CubeId, Cube> {
        &self.players
    }

    /// Iterate over every cube in the world, blocks first.
    pub fn iter(&self) -> impl Iterator<Item = &Cube> {
        self.blocks
            .values()
            .chain(self.cameras.values())
            .chain(self.agents.values())
            .chain(self.players.values())
    }

    /// Read-only lookup across all collections.
    pub fn get(&self, id: CubeId) -> Option<&Cube> {
        self.blocks
            .get(&id)
            .or_else(|| self.cameras.get(&id))
            .or_else(|| self.agents.get(&id))
            .or_else(|| self.players.get(&id))
    }

    /// List all cubes of one variant.
    pub fn list(&self, kind: VariantKind) -> Vec<&Cube> {
        self.collection(kind).values().collect()
    }

    /// True iff any non-traversable cube (other than `excluding`) intersects
    /// the candidate volume.
    pub fn collides(&self, position: Vec3, size: Vec3, excluding: Option<CubeId>) -> bool {
        let candidate = Aabb::new(position, size);
        self.iter()
            .filter(|c| Some(c.id) != excluding)
            .filter(|c| !c.is_traversable())
            .any(|c| c.volume().intersects(&candidate))
    }

    /// Add a plain terrain block. Returns the new cube's id.
    pub fn add_block(
        &mut self,
        position: Vec3,
        block_type: BlockType,
        traversable: bool,
    ) -> Result<CubeId, WorldError> {
        self.insert(Cube::block(position, block_type, traversable))
    }

    /// Add a camera cube. Returns the new cube's id.
    pub fn add_camera(
        &mut self,
        position: Vec3,
        name: impl Into<String>,
        resolution: Resolution,
    ) -> Result<CubeId, WorldError> {
        self.insert(Cube::camera(position, name, resolution))
    }

    /// Add an AI agent cube. Returns the new cube's id.
    pub fn add_agent(
        &mut self,
        position: Vec3,
        name: impl Into<String>,
        ai_type: impl Into<String>,
    ) -> Result<CubeId, WorldError> {
        self.insert(Cube::agent(position, name, ai_type))
    }

    /// Add a player cube. Returns the new cube's id.
    pub fn add_player(
        &mut self,
        position: Vec3,
        player_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<CubeId, WorldError> {
        self.insert(Cube::player(position, player_id, name))
    }

    /// Validate placement and insert into the collection for the variant.
    fn insert(&mut self, cube: Cube) -> Result<CubeId, WorldError> {
        self.validate_placement(&cube, cube.position, None)?;
        let id = cube.id;
        let kind = cube.kind();
        self.collection_mut(kind).insert(id, cube);
        self.version += 1;
        tracing::debug!(%id, variant = kind.as_str(), version = self.version, "cube added");
        Ok(id)
    }

    /// Move a cube to a new position, re-running the same bounds/collision
    /// predicate as `add` (excluding the mover itself).
    pub fn move_cube(&mut self, id: CubeId, new_position: Vec3) -> Result<(), WorldError> {
        let cube = self.get(id).ok_or(WorldError::NotFound(id))?;
        if !cube.is_moveable() {
            return Err(WorldError::Immovable(id));
        }
        let candidate = cube.clone();
        self.validate_placement(&candidate, new_position, Some(id))?;

        let kind = candidate.kind();
        if let Some(cube) = self.collection_mut(kind).get_mut(&id) {
            cube.position = new_position;
        }
        self.version += 1;
        tracing::debug!(%id, ?new_position, version = self.version, "cube moved");
        Ok(())
    }

    /// Remove a cube. Its id becomes invalid for all future operations.
    pub fn remove(&mut self, id: CubeId) -> Result<Cube, WorldError> {
        let kind = self.get(id).ok_or(WorldError::NotFound(id))?.kind();
        let cube = self
            .collection_mut(kind)
            .remove(&id)
            .ok_or(WorldError::NotFound(id))?;
        self.version += 1;
        tracing::debug!(%id, variant = kind.as_str(), version = self.version, "cube removed");
        Ok(cube)
    }

    /// Apply a yaw/pitch delta to a camera cube.
    pub fn rotate_camera(
        &mut self,
        id: CubeId,
        yaw_delta: f32,
        pitch_delta: f32,
    ) -> Result<(), WorldError> {
        self.camera_state_mut(id)?
            .rotation
            .rotate(yaw_delta, pitch_delta);
        Ok(())
    }

    /// Increment and return a camera's frame counter.
    pub fn advance_camera_frame(&mut self, id: CubeId) -> Result<u64, WorldError> {
        let state = self.camera_state_mut(id)?;
        state.frame_counter += 1;
        Ok(state.frame_counter)
    }

    /// Pin (or unpin) a camera to a single render tier index.
    pub fn pin_camera_tier(&mut self, id: CubeId, tier: Option<usize>) -> Result<(), WorldError> {
        self.camera_state_mut(id)?.pinned_tier = tier;
        Ok(())
    }

    /// Set an agent's behavior state.
    pub fn set_agent_behavior(
        &mut self,
        id: CubeId,
        state: BehaviorState,
    ) -> Result<(), WorldError> {
        self.agent_state_mut(id)?.behavior_state = state;
        Ok(())
    }

    /// Set an agent's movement target. The agent begins moving immediately.
    pub fn set_agent_target(&mut self, id: CubeId, target: Vec3) -> Result<(), WorldError> {
        let state = self.agent_state_mut(id)?;
        state.target_position = Some(target);
        state.behavior_state = BehaviorState::Moving;
        Ok(())
    }

    /// Write one key into an agent's free-form memory.
    pub fn update_agent_memory(
        &mut self,
        id: CubeId,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Result<(), WorldError> {
        self.agent_state_mut(id)?.memory.insert(key.into(), value);
        Ok(())
    }

    /// Append a sensor descriptor to an agent.
    pub fn add_agent_sensor(&mut self, id: CubeId, sensor: Sensor) -> Result<(), WorldError> {
        self.agent_state_mut(id)?.sensors.push(sensor);
        Ok(())
    }

    fn validate_placement(
        &self,
        cube: &Cube,
        position: Vec3,
        excluding: Option<CubeId>,
    ) -> Result<(), WorldError> {
        let volume = cube.volume_at(position);
        if !self.bounds.contains(&volume) {
            return Err(WorldError::Placement {
                x: position.x,
                y: position.y,
                z: position.z,
                reason: PlacementReason::OutOfBounds,
            });
        }
        // A traversable cube is never blocked by others.
        if !cube.is_traversable() && self.collides(position, cube.size, excluding) {
            return Err(WorldError::Placement {
                x: position.x,
                y: position.y,
                z: position.z,
                reason: PlacementReason::Collision,
            });
        }
        Ok(())
    }

    fn collection(&self, kind: VariantKind) -> &BTreeMap<CubeId, Cube> {
        match kind {
            VariantKind::Block => &self.blocks,
            VariantKind::Camera => &self.cameras,
            VariantKind::Agent => &self.agents,
            VariantKind::Player => &self.players,
        }
    }

    fn collection_mut(&mut self, kind: VariantKind) -> &mut BTreeMap<CubeId, Cube> {
        match kind {
            VariantKind::Block => &mut self.blocks,
            VariantKind::Camera => &mut self.cameras,
            VariantKind::Agent => &mut self.agents,
            VariantKind::Player => &mut self.players,
        }
    }

    fn camera_state_mut(&mut self, id: CubeId) -> Result<&mut crate::cube::CameraState, WorldError> {
        if self.get(id).is_none() {
            return Err(WorldError::NotFound(id));
        }
        match self.cameras.get_mut(&id).map(|c| &mut c.variant) {
            Some(Variant::Camera(state)) => Ok(state),
            _ => Err(WorldError::Capability {
                id,
                operation: "camera control",
            }),
        }
    }

    fn agent_state_mut(&mut self, id: CubeId) -> Result<&mut crate::cube::AgentState, WorldError> {
        if self.get(id).is_none() {
            return Err(WorldError::NotFound(id));
        }
        match self.agents.get_mut(&id).map(|c| &mut c.variant) {
            Some(Variant::Agent(state)) => Ok(state),
            _ => Err(WorldError::Capability {
                id,
                operation: "agent control",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> WorldModel {
        WorldModel::new(32.0)
    }

    #[test]
    fn add_assigns_fresh_id_and_bumps_version() {
        let mut w = world();
        let v0 = w.version();
        let a = w.add_block(Vec3::new(0.0, 0.0, 0.0), BlockType::Grass, false).unwrap();
        let b = w.add_block(Vec3::new(2.0, 0.0, 0.0), BlockType::Stone, false).unwrap();
        assert_ne!(a, b);
        assert_eq!(w.version(), v0 + 2);
        assert_eq!(w.entity_count(), 2);
    }

    #[test]
    fn add_rejects_out_of_bounds_without_version_bump() {
        let mut w = world();
        let v0 = w.version();
        let err = w
            .add_block(Vec3::new(100.0, 0.0, 0.0), BlockType::Stone, false)
            .unwrap_err();
        assert!(matches!(
            err,
            WorldError::Placement {
                reason: PlacementReason::OutOfBounds,
                ..
            }
        ));
        assert_eq!(w.version(), v0);
    }

    #[test]
    fn add_rejects_blocking_collision_without_version_bump() {
        let mut w = world();
        w.add_block(Vec3::new(4.0, 0.0, 4.0), BlockType::Stone, false).unwrap();
        let v = w.version();
        let err = w
            .add_block(Vec3::new(4.0, 0.0, 4.0), BlockType::Grass, false)
            .unwrap_err();
        assert!(matches!(
            err,
            WorldError::Placement {
                reason: PlacementReason::Collision,
                ..
            }
        ));
        assert_eq!(w.version(), v);
    }

    #[test]
    fn traversable_cubes_never_block() {
        let mut w = world();
        w.add_block(Vec3::new(4.0, 0.0, 4.0), BlockType::Grass, true).unwrap();
        // A solid block can be placed through the traversable one.
        w.add_block(Vec3::new(4.0, 0.0, 4.0), BlockType::Stone, false).unwrap();
        // And a traversable one is itself never blocked.
        w.add_block(Vec3::new(4.0, 0.0, 4.0), BlockType::Grass, true).unwrap();
    }

    #[test]
    fn move_unknown_id_is_not_found() {
        let mut w = world();
        let err = w.move_cube(CubeId::new(), Vec3::ZERO).unwrap_err();
        assert!(matches!(err, WorldError::NotFound(_)));
    }

    #[test]
    fn move_block_is_immovable_and_position_unchanged() {
        let mut w = world();
        let id = w.add_block(Vec3::new(1.0, 0.0, 1.0), BlockType::Stone, false).unwrap();
        let err = w.move_cube(id, Vec3::new(2.0, 0.0, 2.0)).unwrap_err();
        assert!(matches!(err, WorldError::Immovable(_)));
        assert_eq!(w.get(id).unwrap().position, Vec3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn move_excludes_self_from_collision() {
        let mut w = world();
        let id = w.add_agent(Vec3::new(5.0, 1.0, 5.0), "bot", "basic").unwrap();
        // Overlaps its own current volume; must not self-collide.
        w.move_cube(id, Vec3::new(5.2, 1.0, 5.0)).unwrap();
        assert_eq!(w.get(id).unwrap().position, Vec3::new(5.2, 1.0, 5.0));
    }

    #[test]
    fn move_into_occupied_volume_is_rejected() {
        let mut w = world();
        w.add_block(Vec3::new(6.0, 1.0, 5.0), BlockType::Stone, false).unwrap();
        let id = w.add_agent(Vec3::new(5.0, 1.0, 5.0), "bot", "basic").unwrap();
        let err = w.move_cube(id, Vec3::new(6.0, 1.0, 5.0)).unwrap_err();
        assert!(matches!(
            err,
            WorldError::Placement {
                reason: PlacementReason::Collision,
                ..
            }
        ));
        assert_eq!(w.get(id).unwrap().position, Vec3::new(5.0, 1.0, 5.0));
    }

    #[test]
    fn remove_then_reference_is_not_found() {
        let mut w = world();
        let id = w.add_camera(Vec3::new(0.0, 3.0, 0.0), "cam", Resolution::default()).unwrap();
        w.remove(id).unwrap();
        assert!(w.get(id).is_none());
        assert!(matches!(w.move_cube(id, Vec3::ZERO), Err(WorldError::NotFound(_))));
        assert!(matches!(w.remove(id), Err(WorldError::NotFound(_))));
        assert!(matches!(
            w.rotate_camera(id, 1.0, 0.0),
            Err(WorldError::NotFound(_))
        ));
    }

    #[test]
    fn no_two_solid_volumes_overlap_after_mutations() {
        let mut w = world();
        for i in 0..8 {
            let _ = w.add_block(
                Vec3::new(i as f32 * 1.5 - 6.0, 0.0, 0.0),
                BlockType::Stone,
                false,
            );
        }
        let id = w.add_agent(Vec3::new(0.0, 4.0, 4.0), "bot", "basic").unwrap();
        let _ = w.move_cube(id, Vec3::new(0.0, 0.0, 0.0)); // may or may not collide

        let cubes: Vec<_> = w.iter().filter(|c| !c.is_traversable()).collect();
        for (i, a) in cubes.iter().enumerate() {
            for b in cubes.iter().skip(i + 1) {
                assert!(
                    !a.volume().intersects(&b.volume()),
                    "{} overlaps {}",
                    a.id,
                    b.id
                );
            }
        }
    }

    #[test]
    fn camera_control_on_agent_is_capability_error() {
        let mut w = world();
        let id = w.add_agent(Vec3::new(5.0, 1.0, 5.0), "bot", "basic").unwrap();
        let err = w.rotate_camera(id, 10.0, 0.0).unwrap_err();
        assert!(matches!(err, WorldError::Capability { .. }));
    }

    #[test]
    fn agent_target_starts_movement() {
        let mut w = world();
        let id = w.add_agent(Vec3::new(5.0, 1.0, 5.0), "bot", "basic").unwrap();
        w.set_agent_target(id, Vec3::new(5.0, 1.0, 15.0)).unwrap();
        let state = w.get(id).unwrap().agent_state().unwrap();
        assert_eq!(state.behavior_state, BehaviorState::Moving);
        assert_eq!(state.target_position, Some(Vec3::new(5.0, 1.0, 15.0)));
    }

    #[test]
    fn agent_memory_and_sensors() {
        let mut w = world();
        let id = w.add_agent(Vec3::new(5.0, 1.0, 5.0), "bot", "basic").unwrap();
        w.update_agent_memory(id, "seen", serde_json::json!(3)).unwrap();
        w.add_agent_sensor(
            id,
            Sensor {
                kind: "proximity".into(),
                range: 5.0,
            },
        )
        .unwrap();
        let state = w.get(id).unwrap().agent_state().unwrap();
        assert_eq!(state.memory["seen"], serde_json::json!(3));
        assert_eq!(state.sensors.len(), 1);
    }

    #[test]
    fn frame_counter_advances() {
        let mut w = world();
        let id = w.add_camera(Vec3::new(0.0, 3.0, 0.0), "cam", Resolution::default()).unwrap();
        assert_eq!(w.advance_camera_frame(id).unwrap(), 1);
        assert_eq!(w.advance_camera_frame(id).unwrap(), 2);
    }

    #[test]
    fn list_partitions_by_variant() {
        let mut w = world();
        w.add_block(Vec3::new(1.0, 0.0, 1.0), BlockType::Grass, false).unwrap();
        w.add_camera(Vec3::new(0.0, 3.0, 0.0), "cam", Resolution::default()).unwrap();
        w.add_agent(Vec3::new(5.0, 1.0, 5.0), "bot", "basic").unwrap();
        assert_eq!(w.list(VariantKind::Block).len(), 1);
        assert_eq!(w.list(VariantKind::Camera).len(), 1);
        assert_eq!(w.list(VariantKind::Agent).len(), 1);
        assert_eq!(w.list(VariantKind::Player).len(), 0);
    }
}
