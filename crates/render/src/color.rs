use cubecast_common::BlockType;

/// Sky above the horizon.
pub const SKY: [u8; 3] = [135, 206, 235];
/// Darker sky when looking below the horizon with nothing hit.
pub const SKY_BELOW: [u8; 3] = [100, 149, 237];
/// Ground fill below the horizon line.
pub const GROUND: [u8; 3] = [34, 139, 34];
/// Fallback for unrecognized block types.
pub const NEUTRAL_GRAY: [u8; 3] = [110, 110, 110];

/// Fixed, tier-independent block color mapping.
pub fn block_color(block_type: BlockType) -> [u8; 3] {
    match block_type {
        BlockType::Grass => [34, 139, 34],
        BlockType::Stone => [128, 128, 128],
        BlockType::Dirt => [139, 69, 19],
        BlockType::Player => [0, 150, 255],
        BlockType::Camera => [255, 255, 0],
        BlockType::AiAgent => [255, 0, 255],
        BlockType::Unknown => NEUTRAL_GRAY,
    }
}

/// Sky gradient for a ray that hit nothing.
pub fn sky_color(ray_dy: f32) -> [u8; 3] {
    if ray_dy > 0.0 { SKY } else { SKY_BELOW }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_color_mapping() {
        assert_eq!(block_color(BlockType::Grass), [34, 139, 34]);
        assert_eq!(block_color(BlockType::Stone), [128, 128, 128]);
        assert_eq!(block_color(BlockType::Player), [0, 150, 255]);
        assert_eq!(block_color(BlockType::Camera), [255, 255, 0]);
        assert_eq!(block_color(BlockType::AiAgent), [255, 0, 255]);
        assert_eq!(block_color(BlockType::Unknown), NEUTRAL_GRAY);
    }
}
