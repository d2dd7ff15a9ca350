use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec2;
use serde::Serialize;
use showroom_assets::{GltfLoader, HdrLoader, ModelLoader};
use showroom_common::Viewport;
use showroom_lifecycle::{
    FrameOutcome, HostCall, Loaders, ManualClock, RecordingHost, SceneConfig, Stage,
    dispatch_load,
};
use showroom_render::{DebugTextRenderer, RecordingRenderer, RenderError, Renderer};
use showroom_scene::Scene;
use showroom_tools::{NodeInfo, SceneInspector, SceneSummary, StageSummary};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "showroom-cli", about = "CLI tool for showroom operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and shader entry points
    Info,
    /// Print the scene configuration as YAML
    Config {
        /// Load and validate this file instead of printing the defaults
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
    /// Load a glTF model and print its node tree
    InspectModel {
        /// Model path, relative to the assets directory
        path: PathBuf,
        #[arg(long, default_value = ".")]
        assets_dir: PathBuf,
    },
    /// Sample the sphere shader's fragment color
    Shade {
        /// Horizontal texture coordinate
        #[arg(long, default_value = "0.5")]
        u: f32,
        /// Vertical texture coordinate; 0 at the south pole
        #[arg(long, default_value = "0.5")]
        v: f32,
        /// Seconds since mount
        #[arg(short, long, default_value = "0.0")]
        time: f32,
    },
    /// Run a headless mount cycle with a manual clock
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        frames: u64,
        /// Seconds the clock advances per frame
        #[arg(long, default_value = "0.016")]
        dt: f64,
        #[arg(long, default_value = "1280")]
        width: u32,
        #[arg(long, default_value = "720")]
        height: u32,
        #[arg(long, default_value = "1.0")]
        pixel_ratio: f64,
        /// Scene configuration (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(long, default_value = ".")]
        assets_dir: PathBuf,
        /// Wait for both loads before the first frame
        #[arg(long)]
        wait: bool,
        /// Print a text description of every frame
        #[arg(long)]
        dump: bool,
    },
}

#[derive(Serialize)]
struct ModelReport {
    scene: SceneSummary,
    nodes: Vec<NodeInfo>,
}

#[derive(Serialize)]
struct ShadeReport {
    uv: [f32; 2],
    time: f32,
    color: [f32; 3],
}

#[derive(Serialize)]
struct SimulationReport {
    frames_rendered: u64,
    frames_requested: usize,
    stage: StageSummary,
}

struct SimulateArgs {
    frames: u64,
    dt: f64,
    viewport: Viewport,
    config: SceneConfig,
    loaders: Loaders,
    wait: bool,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn inspect_model(path: &Path, assets_dir: &Path, json: bool) -> anyhow::Result<()> {
    let fragment = GltfLoader::new(assets_dir)
        .load_model(path)
        .with_context(|| format!("loading model {}", path.display()))?;

    let mut scene = Scene::new();
    scene.insert_fragment(fragment);
    let report = ModelReport {
        scene: SceneInspector::scene(&scene),
        nodes: SceneInspector::tree(&scene),
    };

    if json {
        return print_json(&report);
    }
    println!("{}", report.scene);
    for node in &report.nodes {
        println!("{node}");
    }
    Ok(())
}

/// Mount, feed loads and drive frames until `frames` have rendered or the
/// stage stops asking for more, then unmount.
fn simulate<R: Renderer>(
    args: SimulateArgs,
    make_renderer: impl FnOnce() -> R,
    mut on_output: impl FnMut(R::Output),
) -> anyhow::Result<SimulationReport> {
    let clock = ManualClock::new();
    let mut stage: Stage<RecordingHost, R> =
        Stage::new(RecordingHost::new(args.viewport), args.config);
    let requests = stage.mount(
        |_| Ok::<_, RenderError>(make_renderer()),
        Box::new(clock.clone()),
    )?;

    let (tx, rx) = mpsc::channel();
    for request in requests {
        let tx = tx.clone();
        dispatch_load(request, args.loaders.clone(), move |outcome| {
            let _ = tx.send(outcome);
        })?;
    }
    drop(tx);

    if args.wait {
        for outcome in rx.iter() {
            stage.apply_load(outcome);
        }
    }

    let mut rendered = 0;
    while rendered < args.frames {
        for outcome in rx.try_iter() {
            stage.apply_load(outcome);
        }
        if !stage.host_mut().take_frame_request() {
            break;
        }
        clock.advance(args.dt);
        match stage.frame() {
            FrameOutcome::Rendered { output, .. } => {
                rendered += 1;
                on_output(output);
            }
            FrameOutcome::Skipped => break,
        }
    }

    let summary = SceneInspector::stage(&stage);
    let frames_requested = stage.host().count(HostCall::RequestFrame);
    stage.unmount();
    tracing::info!(rendered, "simulation finished");

    Ok(SimulationReport {
        frames_rendered: rendered,
        frames_requested,
        stage: summary,
    })
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("showroom-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "shader: vertex={} fragment={}",
                showroom_shader::VERTEX_ENTRY,
                showroom_shader::FRAGMENT_ENTRY
            );
            let config = SceneConfig::default();
            println!(
                "default model: {} (scale {})",
                config.model.path.display(),
                config.model.scale
            );
            println!(
                "renderer: msaa={}x srgb={}",
                config.renderer.sample_count(),
                config.renderer.srgb
            );
        }
        Commands::Config { path } => {
            let config = match path {
                Some(path) => SceneConfig::load(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => SceneConfig::default(),
            };
            if cli.json {
                print_json(&config)?;
            } else {
                print!("{}", config.to_yaml()?);
            }
        }
        Commands::InspectModel { path, assets_dir } => {
            inspect_model(&path, &assets_dir, cli.json)?;
        }
        Commands::Shade { u, v, time } => {
            let color = showroom_shader::fragment_color(Vec2::new(u, v), time);
            let report = ShadeReport {
                uv: [u, v],
                time,
                color: color.to_array(),
            };
            if cli.json {
                print_json(&report)?;
            } else {
                println!(
                    "uv=({u:.3}, {v:.3}) t={time:.3} -> rgb=({:.4}, {:.4}, {:.4})",
                    color.x, color.y, color.z
                );
            }
        }
        Commands::Simulate {
            frames,
            dt,
            width,
            height,
            pixel_ratio,
            config,
            assets_dir,
            wait,
            dump,
        } => {
            let config = match config {
                Some(path) => SceneConfig::load(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => SceneConfig::default(),
            };
            let settings = config.renderer;
            let args = SimulateArgs {
                frames,
                dt,
                viewport: Viewport::new(width, height, pixel_ratio),
                config,
                loaders: Loaders::new(
                    GltfLoader::new(assets_dir.clone()),
                    HdrLoader::new(assets_dir),
                ),
                wait,
            };

            let report = if dump {
                simulate(args, DebugTextRenderer::new, |text| println!("{text}"))?
            } else {
                simulate(args, || RecordingRenderer::new(settings), |_| {})?
            };

            if cli.json {
                print_json(&report)?;
            } else {
                println!(
                    "Rendered {} frames ({} requested)",
                    report.frames_rendered, report.frames_requested
                );
                println!("{}", report.stage);
            }
        }
    }

    Ok(())
}
