use anyhow::Context;
use clap::Parser;
use m3u_aggregator::logging::init_logging;
use m3u_aggregator::publisher::{self, commit_message, DEFAULT_FAILURES_PATH, DEFAULT_OUTPUT_PATH};
use m3u_aggregator::sources::{default_sources, DEFAULT_SOURCES_PATH};
use m3u_aggregator::{load_sources, ChannelAggregator, FetchConfig, Fetcher, GitPublisher};
use std::path::{Path, PathBuf};
use tracing::info;

/// Fetch the configured M3U playlists and write the categorized channel catalog.
#[derive(Parser, Debug)]
#[command(name = "m3u-aggregator", version)]
struct Cli {
    /// JSON array of playlist sources; created with defaults when missing
    #[arg(long, env = "M3U_SOURCES_PATH", default_value = DEFAULT_SOURCES_PATH)]
    config: PathBuf,

    /// Catalog output path
    #[arg(long, env = "M3U_CHANNELS_PATH", default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Failure log path, written only when some source fails
    #[arg(long, env = "M3U_FAILURES_PATH", default_value = DEFAULT_FAILURES_PATH)]
    failures: PathBuf,

    /// Per-source request timeout
    #[arg(long, default_value_t = 15)]
    timeout_secs: u64,

    /// Number of sources fetched at once
    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    /// Commit and push the written files with git
    #[arg(long)]
    publish: bool,

    /// With --publish, commit without pushing
    #[arg(long, requires = "publish")]
    no_push: bool,

    /// Repository used by --publish
    #[arg(long, default_value = ".")]
    repo_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    info!("Starting M3U aggregator");

    let sources = load_sources(&cli.config, &default_sources())
        .with_context(|| format!("creating sources config {}", cli.config.display()))?;

    let fetch_config = FetchConfig {
        timeout_seconds: cli.timeout_secs,
        ..FetchConfig::default()
    };
    let fetcher = Fetcher::new(fetch_config).context("building HTTP client")?;
    let aggregator = ChannelAggregator::new(fetcher).with_concurrency(cli.concurrency);

    let outcome = aggregator.aggregate(&sources).await;

    publisher::publish(&outcome.catalog, &outcome.failures, &cli.output, &cli.failures)
        .with_context(|| format!("writing catalog to {}", cli.output.display()))?;

    let summary = publisher::summarize(&outcome, &cli.output);
    println!("{}", summary);

    if cli.publish {
        let mut paths: Vec<&Path> = vec![cli.output.as_path()];
        if !outcome.failures.is_empty() {
            paths.push(cli.failures.as_path());
        }

        let mut git = GitPublisher::new(&cli.repo_dir);
        if cli.no_push {
            git = git.without_push();
        }
        git.publish_best_effort(&paths, &commit_message(&outcome.catalog.updated_at))
            .await;
    }

    info!("M3U aggregator finished");
    Ok(())
}
