use cubecast_world::{BehaviorState, SharedWorld, WorldError};

/// Tick engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum distance an agent covers in one tick.
    pub max_step: f32,
    /// Distance to the target below which movement counts as arrival.
    pub arrival_tolerance: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_step: 0.5,
            arrival_tolerance: 0.1,
        }
    }
}

/// Externally commanded transitions are legal between any two states; the
/// match keeps the pair set closed and enumerable. The only automatic
/// transition is `Moving -> Idle` on arrival, applied by the tick engine.
pub fn transition_allowed(from: BehaviorState, to: BehaviorState) -> bool {
    use BehaviorState::*;
    match (from, to) {
        (_, Idle) | (_, Moving) | (_, Observing) | (_, Interacting) | (_, Learning) => true,
    }
}

/// Per-tick statistics for instrumentation and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Agents that advanced toward their target this tick.
    pub moved: usize,
    /// Agents whose step was rejected by collision; they stay `Moving`.
    pub blocked: usize,
    /// Agents that reached their target and became `Idle`.
    pub arrived: usize,
}

/// Drives every agent's state machine by discrete ticks.
///
/// The engine holds no entity state of its own; it reads and mutates agents
/// through `SharedWorld` operations only, so a concurrently removed agent is
/// simply skipped at its next tick.
#[derive(Debug, Default)]
pub struct AgentEngine {
    config: EngineConfig,
}

impl AgentEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Advance every agent by one tick. Agents not in `Moving` state, or
    /// without a target, are untouched.
    pub fn tick(&self, world: &SharedWorld) -> TickStats {
        let _span = tracing::debug_span!("agent_tick").entered();
        let ids: Vec<_> = world.read(|w| w.agents().keys().copied().collect());
        let mut stats = TickStats::default();

        for id in ids {
            // Existence is re-checked under the lock: the agent may have been
            // removed between listing and stepping.
            world.write(|w| {
                let Some(cube) = w.get(id) else { return };
                let Some(state) = cube.agent_state() else { return };
                if state.behavior_state != BehaviorState::Moving {
                    return;
                }
                let Some(target) = state.target_position else {
                    return;
                };

                let position = cube.position;
                let delta = target - position;
                let distance = delta.length();
                if distance <= self.config.arrival_tolerance {
                    if w.set_agent_behavior(id, BehaviorState::Idle).is_ok() {
                        stats.arrived += 1;
                        tracing::debug!(%id, "agent arrived at target");
                    }
                    return;
                }

                let step = delta / distance * distance.min(self.config.max_step);
                match w.move_cube(id, position + step) {
                    Ok(()) => stats.moved += 1,
                    Err(WorldError::Placement { .. }) => {
                        // Stays Moving and retries the same step next tick.
                        stats.blocked += 1;
                        tracing::debug!(%id, "agent step blocked");
                    }
                    Err(err) => {
                        tracing::warn!(%id, %err, "agent step failed");
                    }
                }
            });
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubecast_common::BlockType;
    use cubecast_world::WorldModel;
    use glam::Vec3;

    fn shared() -> SharedWorld {
        SharedWorld::new(WorldModel::new(64.0))
    }

    #[test]
    fn all_command_transitions_are_allowed() {
        use BehaviorState::*;
        for from in [Idle, Moving, Observing, Interacting, Learning] {
            for to in [Idle, Moving, Observing, Interacting, Learning] {
                assert!(transition_allowed(from, to));
            }
        }
    }

    #[test]
    fn agent_walks_to_target_and_goes_idle() {
        let world = shared();
        let id = world
            .write(|w| w.add_agent(Vec3::new(5.0, 1.0, 5.0), "bot", "basic"))
            .unwrap();
        world
            .write(|w| w.set_agent_target(id, Vec3::new(5.0, 1.0, 15.0)))
            .unwrap();

        let engine = AgentEngine::default();
        let mut last_distance = f32::INFINITY;
        for _ in 0..40 {
            engine.tick(&world);
            let (position, state) = world.read(|w| {
                let cube = w.get(id).unwrap();
                (cube.position, cube.agent_state().unwrap().behavior_state)
            });
            let distance = (Vec3::new(5.0, 1.0, 15.0) - position).length();
            assert!(distance <= last_distance + 1e-4, "agent moved away");
            last_distance = distance;
            if state == BehaviorState::Idle {
                break;
            }
        }
        let state = world.read(|w| w.get(id).unwrap().agent_state().unwrap().behavior_state);
        assert_eq!(state, BehaviorState::Idle);
        assert!(last_distance <= EngineConfig::default().arrival_tolerance);
    }

    #[test]
    fn blocked_agent_stays_moving() {
        let world = shared();
        let id = world
            .write(|w| w.add_agent(Vec3::new(5.0, 1.0, 5.0), "bot", "basic"))
            .unwrap();
        // Wall one step away on the path to the target.
        world
            .write(|w| w.add_block(Vec3::new(5.0, 1.0, 6.0), BlockType::Stone, false))
            .unwrap();
        world
            .write(|w| w.set_agent_target(id, Vec3::new(5.0, 1.0, 10.0)))
            .unwrap();

        let engine = AgentEngine::default();
        for _ in 0..10 {
            engine.tick(&world);
        }
        let (position, state) = world.read(|w| {
            let cube = w.get(id).unwrap();
            (cube.position, cube.agent_state().unwrap().behavior_state)
        });
        // No rerouting: pinned against the wall, still Moving.
        assert_eq!(state, BehaviorState::Moving);
        assert!(position.z < 6.0);
    }

    #[test]
    fn idle_agent_is_untouched() {
        let world = shared();
        let id = world
            .write(|w| w.add_agent(Vec3::new(5.0, 1.0, 5.0), "bot", "basic"))
            .unwrap();
        let engine = AgentEngine::default();
        let stats = engine.tick(&world);
        assert_eq!(stats, TickStats::default());
        let position = world.read(|w| w.get(id).unwrap().position);
        assert_eq!(position, Vec3::new(5.0, 1.0, 5.0));
    }

    #[test]
    fn removed_agent_is_skipped() {
        let world = shared();
        let id = world
            .write(|w| w.add_agent(Vec3::new(5.0, 1.0, 5.0), "bot", "basic"))
            .unwrap();
        world
            .write(|w| w.set_agent_target(id, Vec3::new(5.0, 1.0, 15.0)))
            .unwrap();
        world.write(|w| w.remove(id)).unwrap();

        let engine = AgentEngine::default();
        let stats = engine.tick(&world);
        assert_eq!(stats, TickStats::default());
    }

    #[test]
    fn converging_agents_do_not_overlap() {
        let world = shared();
        let a = world
            .write(|w| w.add_agent(Vec3::new(2.0, 1.0, 8.0), "a", "basic"))
            .unwrap();
        let b = world
            .write(|w| w.add_agent(Vec3::new(14.0, 1.0, 8.0), "b", "basic"))
            .unwrap();
        let goal = Vec3::new(8.0, 1.0, 8.0);
        world.write(|w| w.set_agent_target(a, goal)).unwrap();
        world.write(|w| w.set_agent_target(b, goal)).unwrap();

        let engine = AgentEngine::default();
        for _ in 0..60 {
            engine.tick(&world);
        }
        world.read(|w| {
            let ca = w.get(a).unwrap();
            let cb = w.get(b).unwrap();
            assert!(!ca.volume().intersects(&cb.volume()));
            // One of the two is parked in Moving forever; no avoidance.
            let states = [
                ca.agent_state().unwrap().behavior_state,
                cb.agent_state().unwrap().behavior_state,
            ];
            assert!(states.contains(&BehaviorState::Moving));
        });
    }
}
