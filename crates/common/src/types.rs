use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a cube entity in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CubeId(pub Uuid);

impl CubeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CubeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CubeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Enumerated block material tag. Determines the rendered color and whether
/// a plain terrain cube defaults to traversable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Grass,
    Stone,
    Dirt,
    Player,
    Camera,
    AiAgent,
    /// Catch-all for block type tags this build does not recognize.
    #[serde(other)]
    Unknown,
}

/// Camera orientation: yaw and pitch in degrees.
///
/// Pitch is clamped to [-90, 90] on every mutation; yaw wraps freely.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rotation {
    pub yaw: f32,
    pub pitch: f32,
}

impl Rotation {
    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self {
            yaw,
            pitch: pitch.clamp(-90.0, 90.0),
        }
    }

    /// Apply a yaw/pitch delta, keeping pitch within [-90, 90].
    pub fn rotate(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw += yaw_delta;
        self.pitch = (self.pitch + pitch_delta).clamp(-90.0, 90.0);
    }
}

/// Output frame dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of bytes in one RGB frame at this resolution.
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_id_uniqueness() {
        let a = CubeId::new();
        let b = CubeId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn rotation_clamps_pitch() {
        let mut r = Rotation::new(0.0, 0.0);
        r.rotate(10.0, 120.0);
        assert_eq!(r.pitch, 90.0);
        r.rotate(0.0, -300.0);
        assert_eq!(r.pitch, -90.0);
        assert_eq!(r.yaw, 10.0);
    }

    #[test]
    fn resolution_byte_len() {
        let res = Resolution::new(320, 240);
        assert_eq!(res.byte_len(), 230_400);
    }
}
