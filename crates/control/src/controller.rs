use crate::command::{AgentAction, CameraAction, Command, Response};
use cubecast_common::CubeId;
use cubecast_stream::{StreamError, StreamScheduler};
use cubecast_world::{CubeRecord, SharedWorld, VariantKind, WorldError};
use tracing::info_span;

/// Maps commands onto world and scheduler operations, one response each.
pub struct Controller {
    world: SharedWorld,
    scheduler: StreamScheduler,
}

impl Controller {
    pub fn new(world: SharedWorld, scheduler: StreamScheduler) -> Self {
        Self { world, scheduler }
    }

    pub fn world(&self) -> &SharedWorld {
        &self.world
    }

    pub fn scheduler(&self) -> &StreamScheduler {
        &self.scheduler
    }

    /// Execute one command. All failures come back as `Response::Error`.
    pub fn handle(&mut self, command: Command) -> Response {
        let _span = info_span!("command").entered();
        match command {
            Command::CreateBlock {
                position,
                block_type,
                traversable,
            } => created(self.world.write(|w| w.add_block(position, block_type, traversable))),
            Command::CreateCamera {
                position,
                name,
                resolution,
            } => created(self.world.write(|w| {
                w.add_camera(position, name, resolution.unwrap_or_default())
            })),
            Command::CreateAiAgent {
                position,
                name,
                ai_type,
            } => created(self.world.write(|w| w.add_agent(position, name, ai_type))),
            Command::MoveCube { id, position } => {
                ok(self.world.write(|w| w.move_cube(id, position)))
            }
            Command::RemoveCube { id } => ok(self.world.write(|w| w.remove(id).map(|_| ()))),
            Command::ControlAiAgent { id, action } => match action {
                AgentAction::SetBehavior { state } => {
                    ok(self.world.write(|w| w.set_agent_behavior(id, state)))
                }
                AgentAction::SetTarget { target } => {
                    ok(self.world.write(|w| w.set_agent_target(id, target)))
                }
                AgentAction::UpdateMemory { key, value } => {
                    ok(self.world.write(|w| w.update_agent_memory(id, key, value)))
                }
                AgentAction::AddSensor { sensor } => {
                    ok(self.world.write(|w| w.add_agent_sensor(id, sensor)))
                }
            },
            Command::ControlCamera { id, action } => match action {
                CameraAction::Rotate {
                    yaw_delta,
                    pitch_delta,
                } => ok(self
                    .world
                    .write(|w| w.rotate_camera(id, yaw_delta, pitch_delta))),
                CameraAction::MoveTo { position } => {
                    ok(self.world.write(|w| {
                        match w.get(id) {
                            None => Err(WorldError::NotFound(id)),
                            Some(c) if !c.has_camera() => Err(WorldError::Capability {
                                id,
                                operation: "camera move",
                            }),
                            Some(_) => w.move_cube(id, position),
                        }
                    }))
                }
                CameraAction::PinTier { tier } => {
                    ok(self.world.write(|w| w.pin_camera_tier(id, tier)))
                }
            },
            Command::GetCameras => self.list(VariantKind::Camera),
            Command::GetAiAgents => self.list(VariantKind::Agent),
            Command::GetCubeInfo { id } => self.world.read(|w| match w.get(id) {
                Some(cube) => Response::Cube {
                    cube: CubeRecord::from(cube),
                },
                None => world_error(WorldError::NotFound(id)),
            }),
            Command::SubscribeCamera { id } => stream_result(self.scheduler.start_camera(id)),
            Command::UnsubscribeCamera { id } => stream_result(self.scheduler.stop_camera(id)),
        }
    }

    fn list(&self, kind: VariantKind) -> Response {
        let cubes = self
            .world
            .read(|w| w.list(kind).into_iter().map(CubeRecord::from).collect());
        Response::Cubes { cubes }
    }
}

fn created(result: Result<CubeId, WorldError>) -> Response {
    match result {
        Ok(id) => Response::Created { id },
        Err(err) => world_error(err),
    }
}

fn ok(result: Result<(), WorldError>) -> Response {
    match result {
        Ok(()) => Response::Ok,
        Err(err) => world_error(err),
    }
}

fn world_error(err: WorldError) -> Response {
    Response::Error {
        kind: err.kind().to_string(),
        message: err.to_string(),
    }
}

fn stream_result(result: Result<(), StreamError>) -> Response {
    match result {
        Ok(()) => Response::Ok,
        Err(err) => {
            let kind = match err {
                StreamError::UnknownCamera(_) => "not_found",
                StreamError::AlreadyStreaming(_) | StreamError::NotStreaming(_) => "stream",
            };
            Response::Error {
                kind: kind.to_string(),
                message: err.to_string(),
            }
        }
    }
}
