use anyhow::Context;
use clap::Parser;
use m3u_aggregator::logging::init_logging;
use m3u_aggregator::publisher::{DEFAULT_FAILURES_PATH, DEFAULT_OUTPUT_PATH};
use m3u_aggregator::sources::DEFAULT_SOURCES_PATH;
use m3u_aggregator::watcher::{ConfigWatcher, UpdateCommand};
use std::path::PathBuf;
use std::time::Duration;

/// Re-run the aggregator whenever the sources file changes.
#[derive(Parser, Debug)]
#[command(name = "m3u-watch", version)]
struct Cli {
    /// Sources file to watch
    #[arg(long, env = "M3U_SOURCES_PATH", default_value = DEFAULT_SOURCES_PATH)]
    config: PathBuf,

    /// Catalog read after each run to report the channel count
    #[arg(long, env = "M3U_CHANNELS_PATH", default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Failure log path handed to the default update command
    #[arg(long, env = "M3U_FAILURES_PATH", default_value = DEFAULT_FAILURES_PATH)]
    failures: PathBuf,

    /// Minimum time between two runs
    #[arg(long, default_value_t = 2000)]
    debounce_ms: u64,

    /// Command run on change; defaults to the m3u-aggregator binary next to this one
    #[arg(long)]
    update_command: Option<PathBuf>,

    /// Extra arguments passed to --update-command
    #[arg(last = true)]
    update_args: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let update = match cli.update_command {
        Some(program) => cli
            .update_args
            .iter()
            .fold(UpdateCommand::new(program), |cmd, arg| cmd.arg(arg.as_str())),
        None => UpdateCommand::sibling_aggregator()?.with_paths(
            &cli.config,
            &cli.output,
            &cli.failures,
        ),
    };

    let mut watcher = ConfigWatcher::new(
        &cli.config,
        &cli.output,
        update,
        Duration::from_millis(cli.debounce_ms),
    )
    .with_context(|| format!("watching {}", cli.config.display()))?;

    watcher.run()?;
    Ok(())
}
