use anyhow::Context;
use clap::{Parser, Subcommand};
use cubecast_agent::{AgentEngine, EngineConfig};
use cubecast_common::{CubeId, Resolution};
use cubecast_control::{Command, Controller, Response};
use cubecast_render::{CameraView, RenderPipeline, RenderTier, WorldSnapshot};
use cubecast_render_wgpu::GpuTier;
use cubecast_stream::{CollectingSink, StreamConfig, StreamScheduler};
use cubecast_world::{worldgen, SharedWorld};
use glam::Vec3;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cubecast-cli", about = "Voxel world camera streaming demos")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a single camera frame to a PPM file
    Render {
        /// Output path (binary PPM)
        #[arg(short, long, default_value = "frame.ppm")]
        output: PathBuf,
        /// World half-extent in blocks
        #[arg(long, default_value = "16")]
        extent: i32,
        /// World generation seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Frame width in pixels
        #[arg(long, default_value = "320")]
        width: u32,
        /// Frame height in pixels
        #[arg(long, default_value = "240")]
        height: u32,
        /// Try the hardware render tier
        #[arg(long)]
        gpu: bool,
    },
    /// Stream frames from several cameras for a while and report stats
    Stream {
        /// Number of cameras to place
        #[arg(short, long, default_value = "2")]
        cameras: usize,
        /// How long to stream, in milliseconds
        #[arg(short, long, default_value = "3000")]
        duration_ms: u64,
        /// Frame period per camera, in milliseconds
        #[arg(short, long, default_value = "500")]
        period_ms: u64,
        /// Try the hardware render tier
        #[arg(long)]
        gpu: bool,
    },
    /// Walk an agent toward a target, tick by tick
    Agents {
        /// Number of engine ticks to run
        #[arg(short, long, default_value = "30")]
        ticks: usize,
        /// World generation seed
        #[arg(short, long, default_value = "42")]
        seed: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        Commands::Render {
            output,
            extent,
            seed,
            width,
            height,
            gpu,
        } => render_frame(output, extent, seed, width, height, gpu),
        Commands::Stream {
            cameras,
            duration_ms,
            period_ms,
            gpu,
        } => stream_demo(cameras, duration_ms, period_ms, gpu),
        Commands::Agents { ticks, seed } => agents_demo(ticks, seed),
    }
}

/// Build the default pipeline, with the hardware tier slotted in ahead of the
/// reference marcher when requested and available.
fn build_pipeline(gpu: bool) -> RenderPipeline {
    let mut pipeline = RenderPipeline::with_default_tiers();
    if gpu {
        match GpuTier::new() {
            Ok(tier) => {
                pipeline.insert_tier(2, Box::new(tier) as Box<dyn RenderTier>);
                info!("hardware tier registered");
            }
            Err(err) => warn!(error = %err, "hardware tier unavailable, using CPU tiers"),
        }
    }
    pipeline
}

fn render_frame(
    output: PathBuf,
    extent: i32,
    seed: u64,
    width: u32,
    height: u32,
    gpu: bool,
) -> anyhow::Result<()> {
    let mut world = worldgen::generate(extent, seed);
    let camera_id = world.add_camera(
        Vec3::new(0.0, 4.0, -8.0),
        "snapshot-cam",
        Resolution::new(width, height),
    )?;
    world.rotate_camera(camera_id, 0.0, -15.0)?;

    let snapshot = WorldSnapshot::capture(&world, Some(camera_id));
    let cube = world
        .get(camera_id)
        .context("camera vanished before render")?;
    let view = CameraView::from_camera(cube).context("cube is not a camera")?;

    let mut pipeline = build_pipeline(gpu);
    let pixels = pipeline.render(&snapshot, &view, 0)?;

    let mut file = std::fs::File::create(&output)
        .with_context(|| format!("creating {}", output.display()))?;
    write!(file, "P6\n{width} {height}\n255\n")?;
    file.write_all(&pixels)?;
    info!(path = %output.display(), bytes = pixels.len(), "frame written");
    Ok(())
}

fn stream_demo(cameras: usize, duration_ms: u64, period_ms: u64, gpu: bool) -> anyhow::Result<()> {
    let world = SharedWorld::new(worldgen::generate(16, 42));
    let sink = Arc::new(CollectingSink::new());
    let mut scheduler = StreamScheduler::with_pipeline_factory(
        world.clone(),
        sink.clone(),
        Arc::new(move || build_pipeline(gpu)),
    );
    scheduler.set_config(StreamConfig {
        period: Duration::from_millis(period_ms),
    });
    let mut controller = Controller::new(world, scheduler);

    let mut camera_ids = Vec::new();
    for i in 0..cameras {
        let angle = i as f32 / cameras.max(1) as f32 * std::f32::consts::TAU;
        let response = controller.handle(Command::CreateCamera {
            position: Vec3::new(angle.cos() * 10.0, 4.0, angle.sin() * 10.0),
            name: format!("cam-{i}"),
            resolution: Some(Resolution::default()),
        });
        let Response::Created { id } = response else {
            anyhow::bail!("camera creation failed: {response:?}");
        };
        let yaw = (angle.to_degrees() + 270.0) % 360.0;
        controller.handle(Command::ControlCamera {
            id,
            action: cubecast_control::CameraAction::Rotate {
                yaw_delta: yaw,
                pitch_delta: -10.0,
            },
        });
        camera_ids.push(id);
    }

    for &id in &camera_ids {
        let response = controller.handle(Command::SubscribeCamera { id });
        if response.is_error() {
            anyhow::bail!("subscribe failed: {response:?}");
        }
    }

    info!(cameras, duration_ms, "streaming");
    std::thread::sleep(Duration::from_millis(duration_ms));

    for &id in &camera_ids {
        report_camera(&controller, &sink, id);
        controller.handle(Command::UnsubscribeCamera { id });
    }
    println!("total frames: {}", sink.frame_count());
    Ok(())
}

fn report_camera(controller: &Controller, sink: &CollectingSink, id: CubeId) {
    let frames = sink.frames_for(id);
    let stats = controller.scheduler().stats(id);
    println!(
        "camera {id}: {} frames published{}",
        frames.len(),
        match stats {
            Some(s) if s.render_failures > 0 => format!(", {} dropped", s.render_failures),
            _ => String::new(),
        }
    );
}

fn agents_demo(ticks: usize, seed: u64) -> anyhow::Result<()> {
    let world = SharedWorld::new(worldgen::generate(16, seed));
    // Pillars are seeded; probe a few spots in case one is occupied.
    let agent_id = world
        .write(|w| {
            (-8..-4)
                .find_map(|x| w.add_agent(Vec3::new(x as f32, 1.0, -8.0), "walker", "basic").ok())
        })
        .context("agent placement failed")?;
    world
        .write(|w| w.set_agent_target(agent_id, Vec3::new(8.0, 1.0, 8.0)))
        .context("target assignment failed")?;

    let engine = AgentEngine::new(EngineConfig::default());
    for tick in 0..ticks {
        let stats = engine.tick(&world);
        let record = world.read(|w| {
            w.get(agent_id)
                .map(|c| serde_json::json!({
                    "tick": tick,
                    "position": c.position.to_array(),
                    "moved": stats.moved,
                    "blocked": stats.blocked,
                    "arrived": stats.arrived,
                }))
        });
        match record {
            Some(line) => println!("{line}"),
            None => break,
        }
        if stats.arrived > 0 {
            info!(tick, "agent arrived");
            break;
        }
    }
    Ok(())
}
