//! Re-runs the aggregation whenever the sources file changes.
//!
//! The watcher observes the directory holding the sources file (editors often
//! save through a temp file and a rename), filters events down to that one
//! file, and spawns the update command at most once per debounce window.

use crate::publisher::read_channel_count;
use crate::types::{AggregatorError, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::mpsc::{channel, Receiver};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(2);

/// Lets through at most one trigger per window.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    last_run: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_run: None,
        }
    }

    pub fn ready(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_run {
            if now.saturating_duration_since(last) < self.window {
                return false;
            }
        }
        self.last_run = Some(now);
        true
    }
}

/// External command that performs one full aggregation run.
#[derive(Debug, Clone)]
pub struct UpdateCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl UpdateCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// The `m3u-aggregator` binary installed next to the running executable.
    pub fn sibling_aggregator() -> Result<Self> {
        let exe = std::env::current_exe()?;
        let dir = exe
            .parent()
            .ok_or_else(|| AggregatorError::General("executable has no parent directory".to_string()))?;
        Ok(Self::new(dir.join(format!("m3u-aggregator{}", std::env::consts::EXE_SUFFIX))))
    }

    /// Forward the run's paths so the re-run writes where the watcher reads.
    pub fn with_paths(self, config: &Path, output: &Path, failures: &Path) -> Self {
        self.arg("--config")
            .arg(config.display().to_string())
            .arg("--output")
            .arg(output.display().to_string())
            .arg("--failures")
            .arg(failures.display().to_string())
    }

    pub fn run(&self) -> Result<bool> {
        let status = Command::new(&self.program).args(&self.args).status()?;
        if !status.success() {
            warn!("{} exited with {}", self.program.display(), status);
        }
        Ok(status.success())
    }
}

/// Whether `event` is a creation or modification of `target`.
pub fn is_config_change(event: &Event, target: &Path) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event.paths.iter().any(|p| absolutize(p) == target)
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    receiver: Receiver<notify::Result<Event>>,
    config_path: PathBuf,
    catalog_path: PathBuf,
    debouncer: Debouncer,
    update: UpdateCommand,
}

impl ConfigWatcher {
    pub fn new(
        config_path: &Path,
        catalog_path: &Path,
        update: UpdateCommand,
        debounce: Duration,
    ) -> Result<Self> {
        let config_path = absolutize(config_path);
        let watch_dir = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let (tx, rx) = channel();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let _ = tx.send(res);
            },
            Config::default(),
        )?;
        watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

        info!(
            "Watching {} (debounce {:?}), update command: {}",
            config_path.display(),
            debounce,
            update.program.display()
        );

        Ok(Self {
            _watcher: watcher,
            receiver: rx,
            config_path,
            catalog_path: catalog_path.to_path_buf(),
            debouncer: Debouncer::new(debounce),
            update,
        })
    }

    /// Block and handle events until the watcher channel closes.
    pub fn run(&mut self) -> Result<()> {
        while let Ok(res) = self.receiver.recv() {
            match res {
                Ok(event) => {
                    self.handle_event(&event);
                }
                Err(e) => warn!("Watch error: {}", e),
            }
        }
        Ok(())
    }

    /// Returns whether the event triggered an update run.
    pub fn handle_event(&mut self, event: &Event) -> bool {
        if !is_config_change(event, &self.config_path) {
            return false;
        }
        if !self.debouncer.ready(Instant::now()) {
            debug!("Change within debounce window, ignored");
            return false;
        }

        info!("Change detected in {}, running update", self.config_path.display());
        match self.update.run() {
            Ok(_) => self.report(),
            Err(e) => error!("Failed to run {}: {}", self.update.program.display(), e),
        }
        true
    }

    fn report(&self) {
        match read_channel_count(&self.catalog_path) {
            Ok(Some(total)) => info!("Update complete, total channels: {}", total),
            Ok(None) => warn!("{} not found after update", self.catalog_path.display()),
            Err(e) => error!("Failed to read {}: {}", self.catalog_path.display(), e),
        }
    }
}
