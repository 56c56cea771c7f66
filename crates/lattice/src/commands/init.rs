//! Write a default configuration file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
        return Ok(());
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!("Created {}", config_path.display());
    tracing::info!("Run 'lattice render <page.html>' to render your hosts.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Lattice Configuration

[host]
# Tag name of list host elements
tag = "data-list"

# Item field used as identity when a host has no `key` attribute
identity_key = "id"

[fetch]
# Timeout for remote sources, in seconds
# timeout_secs = 10

# Directory local sources resolve against (defaults to the page's directory)
# base_dir = "public"
"#;
