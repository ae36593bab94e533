use crate::model::WorldModel;
use cubecast_common::BlockType;
use glam::Vec3;

/// Generate a demo world: a grass floor at y = 0 across the full extent plus
/// a handful of stone pillars of height 2..=5 at seeded positions.
///
/// Generation is deterministic: the same extent and seed always produce the
/// same world.
pub fn generate(extent: i32, seed: u64) -> WorldModel {
    let mut world = WorldModel::new((extent as f32) * 2.0 + 4.0);
    let mut state = seed;

    for x in -extent..extent {
        for z in -extent..extent {
            // The floor cannot collide with itself; failures here would
            // indicate a bounds bug, so surface them loudly in debug builds.
            let placed = world.add_block(
                Vec3::new(x as f32, 0.0, z as f32),
                BlockType::Grass,
                false,
            );
            debug_assert!(placed.is_ok(), "floor generation out of bounds");
        }
    }

    let span = (extent * 2 - 10).max(1) as u64;
    for _ in 0..10 {
        state = splitmix64(state);
        let x = (state % span) as i32 - (extent - 5);
        state = splitmix64(state);
        let z = (state % span) as i32 - (extent - 5);
        state = splitmix64(state);
        let height = 2 + (state % 4) as i32;

        for y in 1..height {
            // Pillars may land on each other; collisions are skipped.
            let _ = world.add_block(
                Vec3::new(x as f32, y as f32, z as f32),
                BlockType::Stone,
                false,
            );
        }
    }

    tracing::info!(
        blocks = world.blocks().len(),
        version = world.version(),
        "world generated"
    );
    world
}

/// Splitmix64 ... a fast, high-quality deterministic PRNG step function.
fn splitmix64(mut state: u64) -> u64 {
    state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
