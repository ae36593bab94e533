use cubecast_common::{Resolution, Rotation};
use cubecast_world::Cube;
use glam::Vec3;

/// Camera/view configuration for one render pass.
///
/// A plain value copied out of a camera cube under the world lock; the render
/// itself runs without touching the world again.
#[derive(Debug, Clone, Copy)]
pub struct CameraView {
    pub position: Vec3,
    /// Yaw/pitch in degrees.
    pub rotation: Rotation,
    /// Field of view in degrees.
    pub fov_degrees: f32,
    pub resolution: Resolution,
    /// Per-camera tier pin; `None` re-attempts from the fastest tier.
    pub pinned_tier: Option<usize>,
}

impl CameraView {
    /// Extract the view from a camera cube. Returns `None` for non-cameras.
    pub fn from_camera(cube: &Cube) -> Option<Self> {
        let state = cube.camera_state()?;
        Some(Self {
            position: cube.position,
            rotation: state.rotation,
            fov_degrees: state.field_of_view,
            resolution: state.resolution,
            pinned_tier: state.pinned_tier,
        })
    }

    pub fn aspect(&self) -> f32 {
        self.resolution.width as f32 / self.resolution.height as f32
    }

    /// Forward unit vector for the current yaw/pitch.
    pub fn forward(&self) -> Vec3 {
        let yaw = self.rotation.yaw.to_radians();
        let pitch = self.rotation.pitch.to_radians();
        Vec3::new(
            pitch.cos() * yaw.sin(),
            -pitch.sin(),
            pitch.cos() * yaw.cos(),
        )
    }

    /// Normalized ray direction through pixel (px, py) of a `width` x
    /// `height` target. Base direction looks toward +Z; yaw rotates around Y,
    /// then pitch around X.
    pub fn ray_direction(&self, px: u32, py: u32, width: u32, height: u32) -> Vec3 {
        let aspect = width as f32 / height as f32;
        let tan_half_fov = (self.fov_degrees.to_radians() * 0.5).tan();

        let screen_x = (2.0 * px as f32 / width as f32 - 1.0) * aspect;
        let screen_y = 1.0 - 2.0 * py as f32 / height as f32;

        let mut ray = Vec3::new(screen_x * tan_half_fov, screen_y * tan_half_fov, 1.0);

        let (sin_yaw, cos_yaw) = self.rotation.yaw.to_radians().sin_cos();
        let (sin_pitch, cos_pitch) = self.rotation.pitch.to_radians().sin_cos();

        let x = ray.x * cos_yaw - ray.z * sin_yaw;
        let z = ray.x * sin_yaw + ray.z * cos_yaw;
        ray.x = x;
        ray.z = z;

        let y = ray.y * cos_pitch - ray.z * sin_pitch;
        let z = ray.y * sin_pitch + ray.z * cos_pitch;
        ray.y = y;
        ray.z = z;

        ray.normalize()
    }

    /// Project a world point into screen space for a `width` x `height`
    /// target: yaw then pitch into camera space, perspective divide, then
    /// NDC to pixel coordinates. Returns `None` for points at or behind the
    /// near plane. The third component is the camera-space depth.
    pub fn project(&self, point: Vec3, width: u32, height: u32) -> Option<(f32, f32, f32)> {
        let rel = point - self.position;

        let (sin_yaw, cos_yaw) = self.rotation.yaw.to_radians().sin_cos();
        let (sin_pitch, cos_pitch) = self.rotation.pitch.to_radians().sin_cos();

        let rot_x = rel.x * cos_yaw - rel.z * sin_yaw;
        let rot_z = rel.x * sin_yaw + rel.z * cos_yaw;
        let rot_y = rel.y * cos_pitch + rot_z * sin_pitch;
        let depth = -rel.y * sin_pitch + rot_z * cos_pitch;

        if depth <= 0.1 {
            return None;
        }

        let aspect = width as f32 / height as f32;
        let focal = 1.0 / (self.fov_degrees.to_radians() * 0.5).tan();
        let ndc_x = (focal / aspect) * (rot_x / depth);
        let ndc_y = focal * (rot_y / depth);

        let sx = (ndc_x + 1.0) * 0.5 * width as f32;
        let sy = (1.0 - ndc_y) * 0.5 * height as f32;
        Some((sx, sy, depth))
    }
}
