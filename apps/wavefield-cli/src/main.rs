use anyhow::Context as _;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wavefield_config::SceneConfig;
use wavefield_field::BoxField;
use wavefield_render::{DebugTextRenderer, RenderView, Renderer};
use wavefield_tools::FieldInspector;

#[derive(Parser)]
#[command(name = "wavefield-cli", about = "Headless wavefield tool")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration (YAML); defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the active field layout
    Info,
    /// Step the field and print a summary
    Simulate {
        /// Number of frames to advance
        #[arg(short, long, default_value = "60")]
        frames: u64,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render the field as a text heightmap
    Snapshot {
        /// Frame to render
        #[arg(short, long, default_value = "0")]
        frame: u64,
        /// Camera preset used for the view header
        #[arg(short, long, default_value = "0")]
        preset: usize,
        /// Also print position and color of one box (row-major index)
        #[arg(long = "box")]
        box_index: Option<usize>,
    },
    /// Print the configuration as YAML, or write it to a file
    Config {
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<SceneConfig> {
    match path {
        Some(path) => {
            SceneConfig::load(path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(SceneConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Info => {
            let layout = &config.field.layout;
            let wave = &config.field.wave;
            println!("wavefield-cli v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "field: {}x{} boxes ({} total), box size {}",
                layout.side,
                layout.side,
                layout.box_count(),
                layout.box_size
            );
            println!(
                "wave: amplitude={} frequency={} speed={}",
                wave.amplitude, wave.frequency, wave.speed
            );
            println!(
                "camera: {} presets, fov {} deg",
                config.camera.presets.len(),
                config.camera.fov_degrees
            );
            println!("tick rate: {} Hz", config.scene.tick_rate_hz);
        }
        Commands::Simulate { frames, json } => {
            let mut field = BoxField::new(config.field)?;
            field.advance(frames);
            let summary = FieldInspector::summary(&field);
            tracing::debug!(frames, "simulation complete");
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("{summary}");
            }
        }
        Commands::Snapshot {
            frame,
            preset,
            box_index,
        } => {
            let presets = &config.camera.presets;
            let eye = presets
                .get(preset)
                .with_context(|| format!("preset {preset} out of range (0..{})", presets.len()))?;
            let view = RenderView {
                eye: glam::Vec3::from(*eye),
                target: glam::Vec3::from(config.camera.target),
                fov_degrees: config.camera.fov_degrees,
            };
            let mut field = BoxField::new(config.field)?;
            field.advance(frame);
            print!("{}", DebugTextRenderer::new().render(&field, &view));
            if let Some(index) = box_index {
                let info = FieldInspector::inspect_box(&field, index).with_context(|| {
                    format!("box {index} out of range (0..{})", field.len())
                })?;
                println!("{info}");
            }
        }
        Commands::Config { out } => match out {
            Some(path) => {
                config.save(&path)?;
                println!("wrote {}", path.display());
            }
            None => print!("{}", config.to_yaml()?),
        },
    }

    Ok(())
}
