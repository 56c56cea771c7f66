//! Sanitize a markup fragment.

use std::fs;
use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Run the sanitize command.
pub async fn run(file: Option<PathBuf>) -> Result<()> {
    let markup = match file {
        Some(path) => fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => io::read_to_string(io::stdin()).context("Failed to read stdin")?,
    };

    println!("{}", lattice_markup::sanitize(&markup));

    Ok(())
}
