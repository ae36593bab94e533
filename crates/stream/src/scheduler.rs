use crate::sink::{CameraFrame, FrameSink};
use crate::timing::FrameTimer;
use cubecast_common::CubeId;
use cubecast_render::{CameraView, RenderPipeline, WorldSnapshot};
use cubecast_world::SharedWorld;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("camera {0} is already streaming")]
    AlreadyStreaming(CubeId),
    #[error("camera {0} is not streaming")]
    NotStreaming(CubeId),
    #[error("cube {0} does not exist or is not a camera")]
    UnknownCamera(CubeId),
}

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Target interval between frames of one camera.
    pub period: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(500),
        }
    }
}

/// Published-frame counters for one streaming camera.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamStats {
    pub frames_published: u64,
    pub render_failures: u64,
}

#[derive(Default)]
struct WorkerCounters {
    frames_published: AtomicU64,
    render_failures: AtomicU64,
}

struct Worker {
    stop: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    counters: Arc<WorkerCounters>,
    handle: JoinHandle<()>,
}

type PipelineFactory = dyn Fn() -> RenderPipeline + Send + Sync;

/// Drives one worker thread per streaming camera.
///
/// Each cycle the worker re-checks that its camera still exists, captures a
/// snapshot and view under the world lock, renders outside it, and publishes
/// to the sink. A camera removed from the world ends its stream on the next
/// cycle without any explicit stop call.
pub struct StreamScheduler {
    world: SharedWorld,
    sink: Arc<dyn FrameSink>,
    config: StreamConfig,
    pipeline_factory: Arc<PipelineFactory>,
    workers: BTreeMap<CubeId, Worker>,
}

impl StreamScheduler {
    pub fn new(world: SharedWorld, sink: Arc<dyn FrameSink>) -> Self {
        Self::with_pipeline_factory(world, sink, Arc::new(RenderPipeline::with_default_tiers))
    }

    /// Use a custom pipeline per worker, e.g. to slot in an accelerated tier.
    pub fn with_pipeline_factory(
        world: SharedWorld,
        sink: Arc<dyn FrameSink>,
        pipeline_factory: Arc<PipelineFactory>,
    ) -> Self {
        Self {
            world,
            sink,
            config: StreamConfig::default(),
            pipeline_factory,
            workers: BTreeMap::new(),
        }
    }

    pub fn set_config(&mut self, config: StreamConfig) {
        self.config = config;
    }

    /// Begin streaming frames from `camera_id`.
    pub fn start_camera(&mut self, camera_id: CubeId) -> Result<(), StreamError> {
        self.prune_finished();
        if self.workers.contains_key(&camera_id) {
            return Err(StreamError::AlreadyStreaming(camera_id));
        }
        let is_camera = self
            .world
            .read(|w| w.get(camera_id).map(|c| c.has_camera()));
        if is_camera != Some(true) {
            return Err(StreamError::UnknownCamera(camera_id));
        }

        let stop = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        let counters = Arc::new(WorkerCounters::default());

        let world = self.world.clone();
        let sink = Arc::clone(&self.sink);
        let period = self.config.period;
        let factory = Arc::clone(&self.pipeline_factory);
        let thread_stop = Arc::clone(&stop);
        let thread_finished = Arc::clone(&finished);
        let thread_counters = Arc::clone(&counters);

        let handle = std::thread::spawn(move || {
            let mut pipeline = factory();
            let mut timer = FrameTimer::new(32);
            info!(camera = %camera_id, "stream started");
            while !thread_stop.load(Ordering::Relaxed) {
                let cycle_start = Instant::now();

                // Everything under the lock is cheap: existence check, view
                // copy, counter bump, geometry snapshot.
                let captured = world.write(|w| {
                    let cube = w.get(camera_id)?;
                    let view = CameraView::from_camera(cube)?;
                    let counter = w.advance_camera_frame(camera_id).ok()?;
                    Some((WorldSnapshot::capture(w, Some(camera_id)), view, counter))
                });
                let Some((snapshot, view, counter)) = captured else {
                    info!(camera = %camera_id, "camera left the world, stream ending");
                    break;
                };

                let render_start = Instant::now();
                match pipeline.render(&snapshot, &view, counter) {
                    Ok(pixels) => {
                        timer.record(render_start.elapsed());
                        thread_counters
                            .frames_published
                            .fetch_add(1, Ordering::Relaxed);
                        sink.publish(CameraFrame {
                            camera_id,
                            frame_counter: counter,
                            resolution: view.resolution,
                            pixels,
                        });
                        debug!(
                            camera = %camera_id,
                            frame = counter,
                            avg_render_ms = timer.average().as_millis() as u64,
                            "frame published"
                        );
                    }
                    Err(err) => {
                        thread_counters
                            .render_failures
                            .fetch_add(1, Ordering::Relaxed);
                        warn!(camera = %camera_id, error = %err, "frame dropped");
                    }
                }

                sleep_until_next(cycle_start, period, &thread_stop);
            }
            thread_finished.store(true, Ordering::Relaxed);
        });

        self.workers.insert(
            camera_id,
            Worker {
                stop,
                finished,
                counters,
                handle,
            },
        );
        Ok(())
    }

    /// Stop a stream and wait for its worker to exit.
    pub fn stop_camera(&mut self, camera_id: CubeId) -> Result<(), StreamError> {
        let worker = self
            .workers
            .remove(&camera_id)
            .ok_or(StreamError::NotStreaming(camera_id))?;
        worker.stop.store(true, Ordering::Relaxed);
        let _ = worker.handle.join();
        info!(camera = %camera_id, "stream stopped");
        Ok(())
    }

    pub fn stop_all(&mut self) {
        let ids: Vec<CubeId> = self.workers.keys().copied().collect();
        for id in ids {
            let _ = self.stop_camera(id);
        }
    }

    /// True while the camera has a live worker.
    pub fn is_streaming(&self, camera_id: CubeId) -> bool {
        self.workers
            .get(&camera_id)
            .is_some_and(|w| !w.finished.load(Ordering::Relaxed))
    }

    pub fn active_cameras(&self) -> Vec<CubeId> {
        self.workers
            .iter()
            .filter(|(_, w)| !w.finished.load(Ordering::Relaxed))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn stats(&self, camera_id: CubeId) -> Option<StreamStats> {
        self.workers.get(&camera_id).map(|w| StreamStats {
            frames_published: w.counters.frames_published.load(Ordering::Relaxed),
            render_failures: w.counters.render_failures.load(Ordering::Relaxed),
        })
    }

    fn prune_finished(&mut self) {
        let done: Vec<CubeId> = self
            .workers
            .iter()
            .filter(|(_, w)| w.finished.load(Ordering::Relaxed))
            .map(|(id, _)| *id)
            .collect();
        for id in done {
            if let Some(worker) = self.workers.remove(&id) {
                let _ = worker.handle.join();
            }
        }
    }
}

impl Drop for StreamScheduler {
    fn drop(&mut self) {
        self.stop_all();
    }
}

/// Sleep out the remainder of the cycle in short slices so a stop request
/// takes effect promptly.
fn sleep_until_next(cycle_start: Instant, period: Duration, stop: &AtomicBool) {
    let slice = Duration::from_millis(10);
    while cycle_start.elapsed() < period && !stop.load(Ordering::Relaxed) {
        let remaining = period.saturating_sub(cycle_start.elapsed());
        std::thread::sleep(remaining.min(slice));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CollectingSink;
    use cubecast_common::Resolution;
    use cubecast_world::WorldModel;
    use glam::Vec3;

    fn fast_config() -> StreamConfig {
        StreamConfig {
            period: Duration::from_millis(10),
        }
    }

    fn world_with_camera() -> (SharedWorld, CubeId) {
        let shared = SharedWorld::new(WorldModel::new(32.0));
        let cam = shared
            .write(|w| w.add_camera(Vec3::new(0.0, 3.0, 0.0), "cam", Resolution::new(32, 24)))
            .unwrap();
        (shared, cam)
    }

    #[test]
    fn frames_flow_to_the_sink() {
        let (world, cam) = world_with_camera();
        let sink = Arc::new(CollectingSink::new());
        let mut scheduler = StreamScheduler::new(world, sink.clone());
        scheduler.set_config(fast_config());

        scheduler.start_camera(cam).unwrap();
        std::thread::sleep(Duration::from_millis(120));
        scheduler.stop_camera(cam).unwrap();

        let frames = sink.frames_for(cam);
        assert!(!frames.is_empty());
        for frame in &frames {
            assert!(frame.is_well_formed());
            assert_eq!(frame.pixels.len(), 32 * 24 * 3);
        }
        // Counters are strictly increasing.
        for pair in frames.windows(2) {
            assert!(pair[1].frame_counter > pair[0].frame_counter);
        }
    }

    #[test]
    fn removed_camera_stops_streaming() {
        let (world, cam) = world_with_camera();
        let sink = Arc::new(CollectingSink::new());
        let mut scheduler = StreamScheduler::new(world.clone(), sink.clone());
        scheduler.set_config(fast_config());

        scheduler.start_camera(cam).unwrap();
        std::thread::sleep(Duration::from_millis(60));
        world.write(|w| w.remove(cam)).unwrap();
        std::thread::sleep(Duration::from_millis(60));

        let count = sink.frame_count();
        std::thread::sleep(Duration::from_millis(60));
        assert_eq!(sink.frame_count(), count);
        assert!(!scheduler.is_streaming(cam));
    }

    #[test]
    fn double_start_is_rejected() {
        let (world, cam) = world_with_camera();
        let sink = Arc::new(CollectingSink::new());
        let mut scheduler = StreamScheduler::new(world, sink);
        scheduler.set_config(fast_config());

        scheduler.start_camera(cam).unwrap();
        assert!(matches!(
            scheduler.start_camera(cam),
            Err(StreamError::AlreadyStreaming(_))
        ));
        scheduler.stop_camera(cam).unwrap();
    }

    #[test]
    fn non_camera_cannot_stream() {
        let shared = SharedWorld::new(WorldModel::new(32.0));
        let block = shared
            .write(|w| w.add_block(Vec3::new(1.0, 0.0, 1.0), cubecast_common::BlockType::Stone, false))
            .unwrap();
        let sink = Arc::new(CollectingSink::new());
        let mut scheduler = StreamScheduler::new(shared, sink);

        assert!(matches!(
            scheduler.start_camera(block),
            Err(StreamError::UnknownCamera(_))
        ));
        assert!(matches!(
            scheduler.start_camera(CubeId::new()),
            Err(StreamError::UnknownCamera(_))
        ));
    }

    #[test]
    fn two_cameras_stream_independently() {
        let (world, cam_a) = world_with_camera();
        let cam_b = world
            .write(|w| w.add_camera(Vec3::new(4.0, 3.0, 0.0), "cam-b", Resolution::new(32, 24)))
            .unwrap();
        let sink = Arc::new(CollectingSink::new());
        let mut scheduler = StreamScheduler::new(world, sink.clone());
        scheduler.set_config(fast_config());

        scheduler.start_camera(cam_a).unwrap();
        scheduler.start_camera(cam_b).unwrap();
        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(scheduler.active_cameras().len(), 2);
        scheduler.stop_all();

        assert!(!sink.frames_for(cam_a).is_empty());
        assert!(!sink.frames_for(cam_b).is_empty());
        let stats = scheduler.stats(cam_a);
        assert!(stats.is_none(), "stopped workers are pruned");
    }
}
