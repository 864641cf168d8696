use crate::aggregator::AggregateOutcome;
use crate::types::{AggregatorError, ChannelCatalog, FailureRecord, Result, RunSummary};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, warn};

pub const DEFAULT_OUTPUT_PATH: &str = "remote/channels.json";
pub const DEFAULT_FAILURES_PATH: &str = "remote/failed_sources.json";

/// Write the catalog and, when there are failures, the failure log.
///
/// The catalog always replaces the previous file. A failure log from an
/// earlier run is left in place when this run had no failures.
pub fn publish(
    catalog: &ChannelCatalog,
    failures: &[FailureRecord],
    output_path: &Path,
    failures_path: &Path,
) -> Result<()> {
    write_json(output_path, catalog)?;
    info!(
        "Wrote {} channels in {} categories to {}",
        catalog.channel_count(),
        catalog.categories.len(),
        output_path.display()
    );

    if !failures.is_empty() {
        write_json(failures_path, failures)?;
        warn!("Wrote {} failed sources to {}", failures.len(), failures_path.display());
    }

    Ok(())
}

pub fn summarize(outcome: &AggregateOutcome, output_path: &Path) -> RunSummary {
    RunSummary {
        total_sources: outcome.total_sources,
        successful: outcome.successful(),
        failed: outcome.failures.len(),
        output_path: output_path.display().to_string(),
        total_channels: outcome.catalog.channel_count(),
    }
}

/// Total channels of an existing catalog, `None` when the file is absent.
pub fn read_channel_count(path: &Path) -> Result<Option<usize>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let catalog: ChannelCatalog = serde_json::from_str(&content)?;
    Ok(Some(catalog.channel_count()))
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    // serde_json leaves non-ASCII characters unescaped.
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Stages, commits and pushes the written files with git.
#[derive(Debug, Clone)]
pub struct GitPublisher {
    repo_dir: PathBuf,
    push: bool,
}

impl GitPublisher {
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            push: true,
        }
    }

    pub fn without_push(mut self) -> Self {
        self.push = false;
        self
    }

    /// `paths` may be relative to the process working directory; they are
    /// made absolute before git sees them, since git runs inside `repo_dir`.
    pub async fn publish(&self, paths: &[&Path], message: &str) -> Result<()> {
        let mut add = vec!["add".to_string(), "--".to_string()];
        for path in paths {
            add.push(std::path::absolute(path)?.display().to_string());
        }
        self.git(add.as_slice()).await?;

        let nothing_staged = self.git(&["diff", "--cached", "--quiet"]).await.is_ok();
        if nothing_staged {
            info!("Nothing to commit, skipping publish");
            return Ok(());
        }

        self.git(&["commit", "-m", message]).await?;

        if self.push {
            self.git(&["push"]).await?;
        }

        info!("Published channel catalog: {}", message);
        Ok(())
    }

    /// Like `publish`, but failures are logged and swallowed.
    pub async fn publish_best_effort(&self, paths: &[&Path], message: &str) {
        if let Err(e) = self.publish(paths, message).await {
            warn!("Publish step failed (ignored): {}", e);
        }
    }

    async fn git<S: AsRef<std::ffi::OsStr>>(&self, args: &[S]) -> Result<()> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_dir)
            .output()
            .await
            .map_err(|e| AggregatorError::Publish(format!("could not run git: {}", e)))?;

        if output.status.success() {
            debug!("git {} ok", display_args(args));
            Ok(())
        } else {
            Err(AggregatorError::Publish(format!(
                "git {} exited with {}: {}",
                display_args(args),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )))
        }
    }
}

pub fn commit_message(updated_at: &str) -> String {
    format!("Update channels {}", updated_at)
}

fn display_args<S: AsRef<std::ffi::OsStr>>(args: &[S]) -> String {
    args.iter()
        .map(|a| a.as_ref().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
