//! Render every host element in a page.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use lattice_bind::{
    mount, project, Fetcher, FileFetcher, HostOptions, HttpFetcher, RenderState, SourceFetcher,
};
use lattice_markup::{Element, Fragment, Walk};

use crate::config::ConfigFile;

/// Counts from rendering one page.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub hosts: usize,
    pub instances: usize,
    pub errors: usize,
}

/// Run the render command.
pub async fn run(
    config: &ConfigFile,
    input: PathBuf,
    output: Option<PathBuf>,
    base_dir: Option<PathBuf>,
) -> Result<()> {
    let start = Instant::now();

    let source = fs::read_to_string(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let base_dir = base_dir
        .or_else(|| config.fetch.base_dir.clone())
        .unwrap_or_else(|| parent_dir(&input));
    let fetcher = SourceFetcher::new(
        HttpFetcher::new(config.fetch.timeout()),
        FileFetcher::new(base_dir),
    );

    let (html, summary) =
        render_page(&source, &config.host.tag, &config.host.options(), &fetcher).await?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(&path, html).with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!("Output: {}", path.display());
        }
        None => println!("{html}"),
    }

    tracing::info!(
        "Rendered {} hosts with {} instances ({} errors) in {}ms",
        summary.hosts,
        summary.instances,
        summary.errors,
        start.elapsed().as_millis()
    );

    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Render all `tag` hosts in an HTML page.
///
/// Hosts are loaded one after another in document order. A host that cannot
/// be mounted is left as it was.
pub async fn render_page<F: Fetcher>(
    source: &str,
    tag: &str,
    options: &HostOptions,
    fetcher: &F,
) -> Result<(String, RenderSummary)> {
    let mut page = Fragment::parse(source).context("Failed to parse page")?;

    // Hosts nested inside another host belong to its blueprint
    let mut hosts = Vec::new();
    page.walk_mut(&mut |element: &mut Element| {
        if element.name == tag {
            hosts.push(element.clone());
            Walk::Skip
        } else {
            Walk::Descend
        }
    });

    let mut summary = RenderSummary::default();
    let mut projected = Vec::with_capacity(hosts.len());

    for host in &hosts {
        let (mut controller, source) = match mount(host, options) {
            Ok(mounted) => mounted,
            Err(e) => {
                tracing::warn!("Skipping host: {}", e);
                projected.push(host.clone());
                continue;
            }
        };

        match source {
            Some(source) => controller.load(source, fetcher).await,
            None => tracing::debug!("<{}> has no data source", tag),
        }

        summary.hosts += 1;
        summary.instances += controller.instances().len();
        if controller.state() == RenderState::Errored {
            summary.errors += 1;
        }
        projected.push(project(host, &controller));
    }

    let mut replacements = projected.into_iter();
    page.walk_mut(&mut |element: &mut Element| {
        if element.name != tag {
            return Walk::Descend;
        }
        if let Some(replacement) = replacements.next() {
            *element = replacement;
        }
        Walk::Skip
    });

    Ok((page.to_html(), summary))
}
