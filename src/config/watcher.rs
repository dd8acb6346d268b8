// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Hot reload of the settings file.
//!
//! Lets an operator change screen geometry or the split threshold during
//! an event without restarting. Writes are debounced, then the settings
//! file is parsed again and the outcome delivered as a [`ConfigEvent`].

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

use super::{ConfigFormat, EngineConfig};

const DEFAULT_DEBOUNCE_MS: u64 = 500;
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Outcome of a settings file change
#[derive(Debug, Clone)]
pub enum ConfigEvent {
    /// The file parsed; apply the new settings
    Reloaded {
        path: PathBuf,
        config: Box<EngineConfig>,
    },
    /// The file changed but does not parse; keep the current settings
    Invalid { path: PathBuf, message: String },
}

/// Paths touched since the last reload, released once writes go quiet
#[derive(Debug)]
struct PendingReloads {
    paths: Vec<PathBuf>,
    last_write: Option<Instant>,
    quiet_period: Duration,
}

impl PendingReloads {
    fn new(quiet_period: Duration) -> Self {
        Self {
            paths: Vec::new(),
            last_write: None,
            quiet_period,
        }
    }

    /// Record a write to any settings file among `paths`
    fn touch(&mut self, paths: Vec<PathBuf>) {
        let mut touched = false;
        for path in paths {
            if ConfigFormat::from_path(&path).is_none() {
                continue;
            }
            if !self.paths.contains(&path) {
                self.paths.push(path);
            }
            touched = true;
        }
        if touched {
            self.last_write = Some(Instant::now());
        }
    }

    /// Paths whose quiet period has elapsed
    fn take_due(&mut self) -> Vec<PathBuf> {
        match self.last_write {
            Some(at) if at.elapsed() >= self.quiet_period => {
                self.last_write = None;
                std::mem::take(&mut self.paths)
            }
            _ => Vec::new(),
        }
    }
}

fn reload(path: PathBuf) -> ConfigEvent {
    match EngineConfig::load(&path) {
        Ok(config) => {
            debug!(path = %path.display(), "settings reloaded");
            ConfigEvent::Reloaded {
                path,
                config: Box::new(config),
            }
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "settings rejected");
            ConfigEvent::Invalid {
                path,
                message: format!("{:#}", e),
            }
        }
    }
}

/// Runs until either channel end is dropped
fn reload_loop(changes: Receiver<Event>, events: Sender<ConfigEvent>, quiet_period: Duration) {
    let mut pending = PendingReloads::new(quiet_period);
    loop {
        match changes.recv_timeout(POLL_INTERVAL) {
            Ok(event) => {
                if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                    pending.touch(event.paths);
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                for path in pending.take_due() {
                    if events.send(reload(path)).is_err() {
                        return;
                    }
                }
            }
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

/// Watches a settings file, or a directory of them, for changes
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    events: Receiver<ConfigEvent>,
    watched_path: PathBuf,
}

impl ConfigWatcher {
    /// Start watching `path`. `debounce_ms` defaults to 500.
    pub fn new<P: AsRef<Path>>(path: P, debounce_ms: Option<u64>) -> Result<Self> {
        let watched_path = path.as_ref().to_path_buf();
        let quiet_period = Duration::from_millis(debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS));

        let (event_tx, event_rx) = mpsc::channel();
        let (change_tx, change_rx) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                if let Ok(event) = res {
                    let _ = change_tx.send(event);
                }
            },
            Config::default(),
        )
        .map_err(|e| anyhow!("Failed to create file watcher: {}", e))?;

        watcher
            .watch(&watched_path, RecursiveMode::NonRecursive)
            .map_err(|e| anyhow!("Failed to watch path {:?}: {}", watched_path, e))?;

        std::thread::spawn(move || reload_loop(change_rx, event_tx, quiet_period));

        Ok(Self {
            _watcher: watcher,
            events: event_rx,
            watched_path,
        })
    }

    /// Next event, if one is waiting
    pub fn try_recv(&self) -> Option<ConfigEvent> {
        self.events.try_recv().ok()
    }

    /// All waiting events
    pub fn recv_all(&self) -> Vec<ConfigEvent> {
        self.events.try_iter().collect()
    }

    /// Block until the next event
    pub fn recv(&self) -> Option<ConfigEvent> {
        self.events.recv().ok()
    }

    /// Path given to [`ConfigWatcher::new`]
    pub fn watched_path(&self) -> &Path {
        &self.watched_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_pending_ignores_other_files() {
        let mut pending = PendingReloads::new(Duration::ZERO);
        pending.touch(vec![PathBuf::from("notes.txt"), PathBuf::from("song.bak")]);
        assert!(pending.take_due().is_empty());
    }

    #[test]
    fn test_pending_collapses_repeated_writes() {
        let mut pending = PendingReloads::new(Duration::ZERO);
        pending.touch(vec![PathBuf::from("settings.yaml")]);
        pending.touch(vec![PathBuf::from("settings.yaml"), PathBuf::from("settings.toml")]);

        assert_eq!(
            pending.take_due(),
            vec![PathBuf::from("settings.yaml"), PathBuf::from("settings.toml")]
        );
        assert!(pending.take_due().is_empty());
    }

    #[test]
    fn test_pending_waits_for_quiet_period() {
        let mut pending = PendingReloads::new(Duration::from_secs(60));
        pending.touch(vec![PathBuf::from("settings.yml")]);
        assert!(pending.take_due().is_empty());
    }

    #[test]
    fn test_reload_event() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("settings.yaml");
        fs::write(&good, "viewport:\n  width: 1280\n  height: 720\n").unwrap();

        match reload(good.clone()) {
            ConfigEvent::Reloaded { path, config } => {
                assert_eq!(path, good);
                assert_eq!(config.viewport.width, 1280);
            }
            other => panic!("unexpected event {:?}", other),
        }

        let bad = dir.path().join("broken.yaml");
        fs::write(&bad, "viewport: [").unwrap();
        assert!(matches!(reload(bad), ConfigEvent::Invalid { .. }));
    }

    #[test]
    fn test_watcher_missing_path() {
        let dir = tempdir().unwrap();
        assert!(ConfigWatcher::new(dir.path().join("nope"), Some(100)).is_err());
    }

    #[test]
    fn test_watcher_reports_reload() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("settings.yaml");
        fs::write(&file_path, "font_size_step: 5\n").unwrap();

        let watcher = ConfigWatcher::new(dir.path(), Some(100)).unwrap();
        assert_eq!(watcher.watched_path(), dir.path());
        std::thread::sleep(Duration::from_millis(50));

        fs::write(&file_path, "font_size_step: 12\nviewport:\n  font_size_for_split: 50\n").unwrap();
        std::thread::sleep(Duration::from_millis(400));

        // Delivery depends on the platform backend; only check what arrived
        for event in watcher.recv_all() {
            if let ConfigEvent::Reloaded { config, .. } = event {
                if config.font_size_step == 12 {
                    assert_eq!(config.viewport.font_size_for_split, 50);
                }
            }
        }
    }
}
