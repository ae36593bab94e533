use crate::buffer::FrameBuffer;
use crate::color;
use crate::snapshot::WorldSnapshot;
use crate::tier::{RenderTier, TierError};
use crate::view::CameraView;
use glam::Vec3;
use std::collections::HashMap;
use tracing::trace;

/// Rays give up beyond this distance.
const MAX_DISTANCE: f32 = 50.0;

fn cell_of(p: Vec3) -> (i32, i32, i32) {
    (p.x.round() as i32, p.y.round() as i32, p.z.round() as i32)
}

/// Tier 3: per-pixel unit-grid ray marcher.
///
/// The correctness baseline and the last tier in the chain. Geometry is
/// quantized to a unit cell grid; every pixel marches unit steps and shades
/// the first occupied cell. Slow, but has no environmental requirements and
/// never fails.
#[derive(Debug, Default)]
pub struct ReferenceRayMarcher {
    version: Option<u64>,
    cells: HashMap<(i32, i32, i32), [u8; 3]>,
    rebuilds: u64,
}

impl ReferenceRayMarcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    fn refresh_cells(&mut self, snapshot: &WorldSnapshot) {
        if self.version == Some(snapshot.version) {
            return;
        }
        self.cells.clear();
        for b in &snapshot.blocks {
            self.cells.insert(cell_of(b.position), b.color);
        }
        self.version = Some(snapshot.version);
        self.rebuilds += 1;
        trace!(version = snapshot.version, cells = self.cells.len(), "cell grid rebuilt");
    }

    fn march(&self, origin: Vec3, dir: Vec3) -> [u8; 3] {
        let mut t = 1.0;
        while t <= MAX_DISTANCE {
            let sample = origin + dir * t;
            if let Some(&shade) = self.cells.get(&cell_of(sample)) {
                return shade;
            }
            t += 1.0;
        }
        color::sky_color(dir.y)
    }
}

impl RenderTier for ReferenceRayMarcher {
    fn name(&self) -> &'static str {
        "reference_march"
    }

    fn render(
        &mut self,
        snapshot: &WorldSnapshot,
        view: &CameraView,
        buffer: &mut FrameBuffer,
    ) -> Result<(), TierError> {
        self.refresh_cells(snapshot);

        let width = buffer.width();
        let height = buffer.height();
        for py in 0..height {
            for px in 0..width {
                let dir = view.ray_direction(px, py, width, height);
                buffer.set(px, py, self.march(view.position, dir));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::RenderBlock;
    use cubecast_common::{Resolution, Rotation};

    fn view_at(position: Vec3) -> CameraView {
        CameraView {
            position,
            rotation: Rotation::default(),
            fov_degrees: 70.0,
            resolution: Resolution::new(32, 24),
            pinned_tier: None,
        }
    }

    fn cube(position: Vec3, color: [u8; 3]) -> RenderBlock {
        RenderBlock {
            position,
            size: Vec3::ONE,
            color,
        }
    }

    #[test]
    fn cube_straight_ahead_is_shaded() {
        let snap = WorldSnapshot {
            version: 1,
            blocks: vec![cube(Vec3::new(0.0, 2.0, 6.0), [90, 90, 200])],
        };
        let view = view_at(Vec3::new(0.0, 2.0, 0.0));
        let mut buf = FrameBuffer::new(Resolution::new(32, 24));
        let mut tier = ReferenceRayMarcher::new();
        tier.render(&snap, &view, &mut buf).unwrap();
        assert_eq!(buf.get(16, 12), Some([90, 90, 200]));
    }

    #[test]
    fn nearer_cell_occludes_farther() {
        let snap = WorldSnapshot {
            version: 1,
            blocks: vec![
                cube(Vec3::new(0.0, 2.0, 10.0), [1, 1, 1]),
                cube(Vec3::new(0.0, 2.0, 4.0), [2, 2, 2]),
            ],
        };
        let view = view_at(Vec3::new(0.0, 2.0, 0.0));
        let mut buf = FrameBuffer::new(Resolution::new(32, 24));
        let mut tier = ReferenceRayMarcher::new();
        tier.render(&snap, &view, &mut buf).unwrap();
        assert_eq!(buf.get(16, 12), Some([2, 2, 2]));
    }

    #[test]
    fn miss_is_sky_gradient() {
        let snap = WorldSnapshot { version: 1, blocks: vec![] };
        let view = view_at(Vec3::new(0.0, 2.0, 0.0));
        let mut buf = FrameBuffer::new(Resolution::new(32, 24));
        let mut tier = ReferenceRayMarcher::new();
        tier.render(&snap, &view, &mut buf).unwrap();
        assert_eq!(buf.get(16, 0), Some(color::SKY));
        assert_eq!(buf.get(16, 23), Some(color::SKY_BELOW));
    }

    #[test]
    fn cell_grid_rebuilds_on_version_change_only() {
        let snap = WorldSnapshot {
            version: 5,
            blocks: vec![cube(Vec3::new(0.0, 0.0, 3.0), [7, 7, 7])],
        };
        let view = view_at(Vec3::new(0.0, 2.0, 0.0));
        let mut buf = FrameBuffer::new(Resolution::new(8, 8));
        let mut tier = ReferenceRayMarcher::new();
        tier.render(&snap, &view, &mut buf).unwrap();
        tier.render(&snap, &view, &mut buf).unwrap();
        assert_eq!(tier.rebuild_count(), 1);

        let bumped = WorldSnapshot { version: 6, ..snap };
        tier.render(&bumped, &view, &mut buf).unwrap();
        assert_eq!(tier.rebuild_count(), 2);
    }
}
