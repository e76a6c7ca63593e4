//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod cycle;
mod locate;
mod render;

use clap::{ArgAction, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::config::{check, find_config_for, load_config, merge_cli_overrides, CliOverrides, ConfigError, DmdConfig};
use crate::scene::Scene;

/// Exit codes shared by every subcommand
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// dmdc - Preview colorized DMD frames: locate sprites, composite layers and
/// animate color rotations
#[derive(Parser)]
#[command(name = "dmdc")]
#[command(about = "Preview colorized DMD frames from JSON scene fixtures")]
#[command(version)]
pub struct Cli {
    /// Configuration file (default: dmdcolor.toml next to the scene or in a parent directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Locate the sprites of each scene and print the matches as JSON
    Locate {
        /// Scene files (.json)
        #[arg(required = true)]
        scenes: Vec<PathBuf>,

        /// Maximum matches per frame (1-255)
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..=255))]
        max_matches: Option<u16>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Composite each scene and write it as PNG
    Render {
        /// Scene files (.json)
        #[arg(required = true)]
        scenes: Vec<PathBuf>,

        /// Output file or directory.
        /// If omitted: {scene}.png next to the scene
        /// If file (single scene): output.png
        /// If file (multiple): output_{scene}.png
        /// If directory (ends with /): dir/{scene}.png
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Render at the extra resolution
        #[arg(long)]
        extra: bool,

        /// Apply color rotations as displayed this many milliseconds after the frame appeared
        #[arg(long)]
        at_ms: Option<u32>,

        /// Scale output by integer factor (1-16)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=16))]
        scale: Option<u32>,

        /// Paint backgrounds over lit pixels too
        #[arg(long)]
        force_background: bool,

        /// Do not cast dynamic shadows
        #[arg(long)]
        no_shadows: bool,
    },

    /// Animate a scene's color rotations into a GIF
    Cycle {
        /// Scene file (.json)
        scene: PathBuf,

        /// Output GIF path (default: {scene}.gif next to the scene)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Length of the animation in milliseconds
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        duration_ms: Option<u32>,

        /// Render at the extra resolution
        #[arg(long)]
        extra: bool,

        /// Scale output by integer factor (1-16)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=16))]
        scale: Option<u32>,
    },
}

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins over the verbosity flag.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

/// Resolve the configuration for a scene: the explicit file, else the
/// nearest discovered one, else defaults; CLI overrides are applied last.
pub(crate) fn load_settings(
    explicit: Option<&Path>,
    scene: &Path,
    overrides: &CliOverrides,
) -> Result<DmdConfig, ConfigError> {
    let path = explicit.map(Path::to_path_buf).or_else(|| find_config_for(scene));
    let mut config = load_config(path.as_deref())?;
    merge_cli_overrides(&mut config, overrides);
    check(config)
}

/// Load a scene, reporting failures the way every subcommand does.
pub(crate) fn open_scene(path: &Path) -> Option<Scene> {
    match Scene::load(path) {
        Ok(scene) => Some(scene),
        Err(e) => {
            eprintln!("Error: {}: {}", path.display(), e);
            None
        }
    }
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Locate { scenes, max_matches, pretty } => {
            let overrides = CliOverrides { max_matches: max_matches.map(usize::from), ..Default::default() };
            locate::run_locate(&scenes, config, &overrides, pretty)
        }
        Commands::Render { scenes, output, extra, at_ms, scale, force_background, no_shadows } => {
            let overrides = CliOverrides {
                extra: extra.then_some(true),
                force_background: force_background.then_some(true),
                dyna_shadows: no_shadows.then_some(false),
                scale,
                ..Default::default()
            };
            render::run_render(&scenes, output.as_deref(), config, &overrides, at_ms)
        }
        Commands::Cycle { scene, output, duration_ms, extra, scale } => {
            let overrides =
                CliOverrides { extra: extra.then_some(true), scale, preview_ms: duration_ms, ..Default::default() };
            cycle::run_cycle(&scene, output.as_deref(), config, &overrides)
        }
    }
}
