//! Lint host blueprints across a file or directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use lattice_bind::{decode_items, mount, HostOptions, Source};
use lattice_markup::Fragment;
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::ConfigFile;

/// Run the check command.
pub async fn run(config: &ConfigFile, path: PathBuf) -> Result<()> {
    let files = discover_pages(&path)?;
    tracing::info!("Checking {} files...", files.len());

    let options = config.host.options();
    let results: Vec<Result<Vec<String>>> = files
        .par_iter()
        .map(|file| check_file(file, &config.host.tag, &options))
        .collect();

    let mut total = 0;
    for (file, result) in files.iter().zip(results) {
        for issue in result? {
            tracing::warn!("{}: {}", file.display(), issue);
            total += 1;
        }
    }

    if total > 0 {
        bail!("Found {} issues", total);
    }

    tracing::info!("No issues found");
    Ok(())
}

/// HTML files at or under `path`, sorted.
fn discover_pages(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        bail!("Path not found: {}", path.display());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm")
        })
        .collect();
    files.sort();

    Ok(files)
}

fn check_file(file: &Path, tag: &str, options: &HostOptions) -> Result<Vec<String>> {
    let source =
        fs::read_to_string(file).with_context(|| format!("Failed to read {}", file.display()))?;
    check_page(&source, tag, options).with_context(|| format!("Failed to check {}", file.display()))
}

/// Issues in every host of a page.
pub fn check_page(source: &str, tag: &str, options: &HostOptions) -> Result<Vec<String>> {
    let page = Fragment::parse(source)?;
    let mut issues = Vec::new();

    for host in page.find_all(tag) {
        let (controller, data_source) = match mount(host, options) {
            Ok(mounted) => mounted,
            Err(e) => {
                issues.push(e.to_string());
                continue;
            }
        };

        issues.extend(controller.blueprint().lint().iter().map(|i| i.to_string()));

        if let Some(Source::Inline(json)) = data_source {
            if let Err(e) = decode_items(&json) {
                issues.push(format!("inline data: {e}"));
            }
        }
    }

    Ok(issues)
}
