//! Lattice CLI - render and check data-bound list hosts.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "lattice")]
#[command(about = "Render and check data-bound list hosts in static HTML")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to lattice.toml config file
    #[arg(short, long, default_value = "lattice.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default lattice.toml
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        yes: bool,
    },

    /// Render every host in an HTML page
    Render {
        /// Page to render
        input: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory local data locators resolve against
        #[arg(long)]
        base_dir: Option<PathBuf>,
    },

    /// Lint host blueprints in a file or directory
    Check {
        /// File or directory to check
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Sanitize a markup fragment
    Sanitize {
        /// File to read (defaults to stdin)
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so rendered output can be piped
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes).await?;
        }
        Commands::Render {
            input,
            output,
            base_dir,
        } => {
            let config = config::load_config(&cli.config)?;
            commands::render::run(&config, input, output, base_dir).await?;
        }
        Commands::Check { path } => {
            let config = config::load_config(&cli.config)?;
            commands::check::run(&config, path).await?;
        }
        Commands::Sanitize { file } => {
            commands::sanitize::run(file).await?;
        }
    }

    Ok(())
}
