use clap::{Parser, Subcommand};
use log::warn;
use std::path::PathBuf;
use webcollage::collage::{CollageRequest, compose_files, load_sources};
use webcollage::imaging::{RustBackend, expand_inputs};
use webcollage::types::{Color, LayoutMode};
use webcollage::{config, export, output};

#[derive(Parser)]
#[command(name = "webcollage")]
#[command(about = "Compose photos into a grid or a dense mosaic")]
#[command(long_about = "\
Compose photos into a grid or a dense mosaic

Two layouts:

  dense  Justified rows with no gaps. Every photo keeps its aspect ratio;
         the mosaic is trimmed of background margins and fitted to the
         requested size.
  grid   A near-square grid of equal cells, exactly the requested size.
         With --captions, each cell gets the theme stored in the image's
         generation metadata (PNG text chunk \"prompt\").

Inputs may be files or directories. A directory contributes its JPEG, PNG,
TIFF and WebP files in name order. Files that cannot be read are skipped
and listed in the report; they never abort the collage.

Settings come from config.toml in the --config directory, overridden by
flags. Run 'webcollage gen-config' to generate a documented config.toml.
Set RUST_LOG=debug to see layout decisions.")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

/// Flags that override config.toml for a single run.
#[derive(clap::Args, Clone)]
struct ComposeArgs {
    /// Image files or directories, in collage order
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output file (.jpg, .jpeg or .png)
    #[arg(short, long)]
    output: PathBuf,

    /// Target width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Target height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Background color (#RRGGBB or #RGB)
    #[arg(long)]
    background: Option<Color>,

    /// Layout mode
    #[arg(long, value_enum)]
    mode: Option<LayoutMode>,

    /// Draw captions from generation metadata (grid mode)
    #[arg(long)]
    captions: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Compose images into a collage file
    Compose(ComposeArgs),
    /// Print the caption extracted from each image's metadata
    Captions {
        /// Image files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Compose(args) => {
            let mut settings = config::load_config(&cli.config)?;
            apply_overrides(&mut settings, &args);
            settings.validate()?;

            let paths = expand_inputs(&args.inputs)?;
            if paths.is_empty() {
                return Err("no input images found".into());
            }
            if settings.layout.captions && settings.layout.mode == LayoutMode::Dense {
                warn!("Captions are only drawn in grid mode; ignoring --captions");
            }

            let request = CollageRequest {
                mode: settings.layout.mode,
                canvas: settings.canvas(),
                grid: settings.grid_params(),
                dense: settings.dense_params(),
                trim: settings.trim_params(),
            };
            let composition = compose_files(&RustBackend::new(), &paths, &request)?;
            export::save_collage(&composition.canvas, &args.output, settings.quality())?;

            let labels: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
            output::print_composition(&composition, &labels, &args.output);
        }
        Command::Captions { inputs } => {
            let settings = config::load_config(&cli.config)?;
            let paths = expand_inputs(&inputs)?;
            if paths.is_empty() {
                return Err("no input images found".into());
            }
            let params = settings.caption_params();
            let slots = load_sources(&RustBackend::new(), &paths, Some(&params.metadata_key));
            output::print_captions(&slots, &params);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Layer command-line flags over the loaded config.
fn apply_overrides(settings: &mut config::CollageConfig, args: &ComposeArgs) {
    if let Some(width) = args.width {
        settings.canvas.width = width;
    }
    if let Some(height) = args.height {
        settings.canvas.height = height;
    }
    if let Some(background) = args.background {
        settings.canvas.background = background;
    }
    if let Some(mode) = args.mode {
        settings.layout.mode = mode;
    }
    if args.captions {
        settings.layout.captions = true;
    }
}
