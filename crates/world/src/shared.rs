use crate::model::WorldModel;
use std::sync::{Arc, Mutex};

/// Shared handle to the world: the single mutual-exclusion boundary around
/// all structural mutation and around the "read entities + version" step of
/// each render.
///
/// Rendering computation happens outside the lock on a snapshot captured
/// inside it, so a render observes the world either fully before or fully
/// after a mutation, never mid-move.
#[derive(Clone)]
pub struct SharedWorld {
    inner: Arc<Mutex<WorldModel>>,
}

impl SharedWorld {
    pub fn new(world: WorldModel) -> Self {
        Self {
            inner: Arc::new(Mutex::new(world)),
        }
    }

    /// Run a read-only closure under the lock.
    pub fn read<R>(&self, f: impl FnOnce(&WorldModel) -> R) -> R {
        let guard = self.inner.lock().expect("world mutex poisoned");
        f(&guard)
    }

    /// Run a mutating closure under the lock.
    pub fn write<R>(&self, f: impl FnOnce(&mut WorldModel) -> R) -> R {
        let mut guard = self.inner.lock().expect("world mutex poisoned");
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubecast_common::BlockType;
    use glam::Vec3;

    #[test]
    fn concurrent_mutations_are_serialized() {
        let shared = SharedWorld::new(WorldModel::new(64.0));
        let mut handles = Vec::new();
        for i in 0..8 {
            let shared = shared.clone();
            handles.push(std::thread::spawn(move || {
                for j in 0..10 {
                    let pos = Vec3::new(i as f32 * 2.0 - 8.0, 0.0, j as f32 * 2.0 - 8.0);
                    let _ = shared.write(|w| w.add_block(pos, BlockType::Stone, false));
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        let (count, version) = shared.read(|w| (w.entity_count(), w.version()));
        assert_eq!(count, 80);
        assert_eq!(version, 80);
    }
}
