use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use sprig_input::{InputState, Key};
use sprig_render::{DrawPlan, MemoryBackend};
use sprig_scene::{Scene, SceneConfig, StepReport};
use sprig_tools::PoolInspector;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sprig-cli", about = "Headless scene inspection")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration (YAML). Defaults are used when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the effective scene configuration
    Info,
    /// Build the scene and print pool usage and pass draw counts
    Pools,
    /// Print the compiled draw plan of a pass
    Plan {
        /// Print the shadow pass instead of the main pass
        #[arg(long)]
        shadow: bool,
    },
    /// Step the scene headlessly and report what changed
    Step {
        /// Number of frames to simulate
        #[arg(short, long, default_value = "60")]
        frames: u32,
        /// Milliseconds per frame
        #[arg(long, default_value = "16.0")]
        dt: f32,
        /// Hold the forward key for every frame
        #[arg(long)]
        forward: bool,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<SceneConfig> {
    match path {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("failed to load scene config {}", path.display())),
        None => Ok(SceneConfig::default()),
    }
}

fn build_scene(config: &SceneConfig, backend: &MemoryBackend) -> anyhow::Result<Scene<MemoryBackend>> {
    Scene::build(config, backend).context("failed to build scene pools")
}

/// Run `frames` steps and sum their reports.
fn simulate(
    scene: &mut Scene<MemoryBackend>,
    backend: &MemoryBackend,
    frames: u32,
    dt: f32,
    forward: bool,
) -> StepReport {
    let mut input = InputState::new();
    input.keys.set(Key::Forward, forward);
    let mut total = StepReport::default();
    for _ in 0..frames {
        let report = scene.step(backend, &mut input, dt);
        total.uniform_writes += report.uniform_writes;
        total.expired += report.expired;
        total.grass_wrapped += report.grass_wrapped;
    }
    total
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Info => {
            println!("sprig-cli v{}", env!("CARGO_PKG_VERSION"));
            print!("{}", config.to_yaml()?);
        }
        Commands::Pools => {
            let backend = MemoryBackend::new();
            let scene = build_scene(&config, &backend)?;
            println!("{}", PoolInspector::scene(&scene));
            println!(
                "buffers: {}  uniform alignment: {}",
                backend.buffer_count(),
                sprig_render::DEFAULT_UNIFORM_ALIGNMENT
            );
        }
        Commands::Plan { shadow } => {
            let backend = MemoryBackend::new();
            let scene = build_scene(&config, &backend)?;
            let pools = if shadow {
                scene.shadow_casters()
            } else {
                scene.pools()
            };
            for (i, pool) in pools.iter().enumerate() {
                println!("pool {i}: {}", pool.label());
            }
            print!("{}", DrawPlan::compile(&pools));
        }
        Commands::Step {
            frames,
            dt,
            forward,
        } => {
            let backend = MemoryBackend::new();
            let mut scene = build_scene(&config, &backend)?;
            let writes_before = backend.write_count();
            let total = simulate(&mut scene, &backend, frames, dt, forward);
            let position = scene.player().position();
            println!("frames: {frames}  elapsed: {:.0}ms", scene.elapsed_ms());
            println!(
                "uniform writes: {}  buffer writes: {}",
                total.uniform_writes,
                backend.write_count() - writes_before
            );
            println!(
                "expired cubes: {}  live: {}/{}",
                total.expired,
                scene.live_cubes(),
                scene.cubes().len()
            );
            println!("grass tiles wrapped: {}", total.grass_wrapped);
            println!(
                "player: ({:.1}, {:.1}, {:.1})",
                position.x, position.y, position.z
            );
        }
    }

    Ok(())
}
