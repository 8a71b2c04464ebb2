//! CanvasL CLI - 3D viewer for CanvasL graphs
//!
//! Projects a CanvasL file (or a named automaton file) into a 3D scene and
//! renders it in the terminal.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod commands;
mod config;
mod input;

use config::ViewerConfig;

/// CanvasL - view line-delimited graph records as a 3D scene
#[derive(Parser)]
#[command(name = "canvasl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored log output
    #[arg(long, global = true)]
    no_color: bool,

    /// Viewer config file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a CanvasL graph in the terminal
    View(commands::view::ViewArgs),

    /// Project a CanvasL graph and print the resulting scene
    Inspect {
        /// CanvasL file or automaton key; the built-in sample when absent
        input: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: InspectFormat,
    },

    /// List the automaton file paths
    Paths {
        /// Which group to list
        #[arg(value_enum, default_value = "all")]
        set: PathSet,

        /// Also list the deprecated aliases
        #[arg(long)]
        aliases: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, clap::ValueEnum)]
enum InspectFormat {
    /// Human-readable summary
    Text,
    /// Full scene as JSON
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, clap::ValueEnum)]
enum PathSet {
    /// A₀–A₁₁
    All,
    /// A₀–A₄
    Primary,
    /// A₅–A₁₁
    Extended,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is the display surface
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = ViewerConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::View(args) => {
            commands::view::run(args, config).await?;
        }

        Commands::Inspect { input, format } => {
            commands::inspect::run(input.as_deref(), format, &config).await?;
        }

        Commands::Paths { set, aliases } => {
            commands::paths::run(set, aliases, &config.registry());
        }
    }

    Ok(())
}
