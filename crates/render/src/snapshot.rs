use crate::color;
use cubecast_common::CubeId;
use cubecast_world::WorldModel;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One renderable volume: position, extents, and resolved flat color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderBlock {
    pub position: Vec3,
    pub size: Vec3,
    pub color: [u8; 3],
}

/// A consistent, version-tagged, read-only view of world geometry.
///
/// Captured under the world lock; the render pass that consumes it runs
/// outside the lock. Holds no references into the world, so a concurrent
/// mutation can never tear a frame.
#[derive(Debug, Clone)]
pub struct WorldSnapshot {
    pub version: u64,
    pub blocks: Vec<RenderBlock>,
}

impl WorldSnapshot {
    /// Capture all visible geometry. The observing camera itself is excluded
    /// so it does not occlude its own view.
    pub fn capture(world: &WorldModel, observer: Option<CubeId>) -> Self {
        let blocks = world
            .iter()
            .filter(|cube| Some(cube.id) != observer)
            .map(|cube| RenderBlock {
                position: cube.position,
                size: cube.size,
                color: color::block_color(cube.block_type),
            })
            .collect();
        Self {
            version: world.version(),
            blocks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubecast_common::{BlockType, Resolution};

    #[test]
    fn capture_tags_current_version() {
        let mut w = WorldModel::new(32.0);
        w.add_block(Vec3::new(1.0, 0.0, 1.0), BlockType::Grass, false).unwrap();
        let snap = WorldSnapshot::capture(&w, None);
        assert_eq!(snap.version, w.version());
        assert_eq!(snap.blocks.len(), 1);
        assert_eq!(snap.blocks[0].color, [34, 139, 34]);
    }

    #[test]
    fn observer_is_excluded() {
        let mut w = WorldModel::new(32.0);
        let cam = w.add_camera(Vec3::new(0.0, 3.0, 0.0), "cam", Resolution::default()).unwrap();
        w.add_block(Vec3::new(1.0, 0.0, 1.0), BlockType::Stone, false).unwrap();

        let snap = WorldSnapshot::capture(&w, Some(cam));
        assert_eq!(snap.blocks.len(), 1);

        let all = WorldSnapshot::capture(&w, None);
        assert_eq!(all.blocks.len(), 2);
    }

    #[test]
    fn snapshot_outlives_mutation() {
        let mut w = WorldModel::new(32.0);
        let id = w.add_block(Vec3::new(1.0, 0.0, 1.0), BlockType::Grass, false).unwrap();
        let snap = WorldSnapshot::capture(&w, None);
        w.remove(id).unwrap();
        // The snapshot still sees the pre-mutation geometry, at its version.
        assert_eq!(snap.blocks.len(), 1);
        assert_ne!(snap.version, w.version());
    }
}
