//! Configuration file (lattice.toml).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use lattice_bind::HostOptions;
use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

#[derive(Debug, Deserialize)]
pub struct HostConfig {
    /// Tag name of host elements
    #[serde(default = "default_tag")]
    pub tag: String,
    /// Identity key for hosts without a `key` attribute
    #[serde(default = "default_identity_key")]
    pub identity_key: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            tag: default_tag(),
            identity_key: default_identity_key(),
        }
    }
}

impl HostConfig {
    pub fn options(&self) -> HostOptions {
        HostOptions {
            identity_key: self.identity_key.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FetchConfig {
    /// Whole-request timeout for remote sources
    pub timeout_secs: Option<u64>,
    /// Directory local locators resolve against
    pub base_dir: Option<PathBuf>,
}

impl FetchConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn default_tag() -> String {
    "data-list".to_string()
}
fn default_identity_key() -> String {
    lattice_bind::host::DEFAULT_IDENTITY_KEY.to_string()
}

/// Load configuration if the file exists.
/// Returns an error if the config file exists but is malformed.
pub fn load_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    // Parsed element names are lowercase
    config.host.tag = config.host.tag.to_ascii_lowercase();
    tracing::info!("Loaded config from {}", path.display());

    Ok(config)
}
