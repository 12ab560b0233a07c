// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Inbox directory watcher

use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::Result;

/// Download managers park partial files under these suffixes
const PARTIAL_SUFFIXES: &[&str] = &[".tmp", ".part", ".crdownload", ".partial", ".download", ".!qb"];

const SYSTEM_FILES: &[&str] = &["desktop.ini", "thumbs.db", ".ds_store"];

/// inotify reports a rename into place as both `To` and `Both`
const DUPLICATE_WINDOW: Duration = Duration::from_secs(1);

/// Events emitted by the watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A file appeared in an inbox, either created there or renamed into
    /// its final name (how browsers and torrent clients finish downloads)
    FileArrived(PathBuf),
    /// Watcher error
    Error(String),
}

/// Watches inbox directories for new episodes
pub struct FileWatcher {
    watcher: RecommendedWatcher,
    mode: RecursiveMode,
    watched_paths: Vec<PathBuf>,
    event_rx: Receiver<notify::Result<Event>>,
    last_arrival: Option<(PathBuf, Instant)>,
}

impl FileWatcher {
    pub fn new(recursive: bool) -> Result<Self> {
        let (tx, rx) = channel();

        let config = Config::default()
            .with_poll_interval(Duration::from_secs(2));

        let watcher = RecommendedWatcher::new(tx, config)?;

        Ok(Self {
            watcher,
            mode: if recursive { RecursiveMode::Recursive } else { RecursiveMode::NonRecursive },
            watched_paths: Vec::new(),
            event_rx: rx,
            last_arrival: None,
        })
    }

    /// Start watching an inbox, creating it if needed
    pub fn watch(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::create_dir_all(path)?;
            info!("Created inbox directory: {:?}", path);
        }

        self.watcher.watch(path, self.mode)?;
        self.watched_paths.push(path.to_path_buf());
        info!("Watching: {:?}", path);

        Ok(())
    }

    /// Next event, or `None` after `timeout` with nothing to report
    pub fn next_event(&mut self, timeout: Duration) -> Option<WatchEvent> {
        match self.event_rx.recv_timeout(timeout) {
            Ok(Ok(event)) => match convert_event(event)? {
                WatchEvent::FileArrived(path) => {
                    if is_repeat(&self.last_arrival, &path, Instant::now()) {
                        debug!("Duplicate arrival for {:?}", path);
                        return None;
                    }
                    self.last_arrival = Some((path.clone(), Instant::now()));
                    Some(WatchEvent::FileArrived(path))
                }
                other => Some(other),
            },
            Ok(Err(e)) => Some(WatchEvent::Error(e.to_string())),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                Some(WatchEvent::Error("Watcher disconnected".to_string()))
            }
        }
    }

    pub fn watched_paths(&self) -> &[PathBuf] {
        &self.watched_paths
    }
}

fn convert_event(event: Event) -> Option<WatchEvent> {
    let arrived = match event.kind {
        EventKind::Create(_) | EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            event.paths.first()
        }
        // paths are [from, to]
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => event.paths.last(),
        _ => None,
    };
    arrived.map(|p| WatchEvent::FileArrived(p.clone()))
}

fn is_repeat(last: &Option<(PathBuf, Instant)>, path: &Path, now: Instant) -> bool {
    matches!(last, Some((prev, at)) if prev == path && now.duration_since(*at) < DUPLICATE_WINDOW)
}

/// The file an event asks us to rename, if any
pub fn arrived_file(event: &WatchEvent) -> Option<&Path> {
    match event {
        WatchEvent::FileArrived(path) if should_process(path) => Some(path),
        _ => None,
    }
}

/// Whether an inbox entry looks like a finished, user-visible file
pub fn should_process(path: &Path) -> bool {
    let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };

    if filename.starts_with('.') {
        return false;
    }

    let lower = filename.to_lowercase();
    if PARTIAL_SUFFIXES.iter().any(|s| lower.ends_with(s)) {
        return false;
    }

    !SYSTEM_FILES.contains(&lower.as_str())
}

/// Poll the file size until it stops growing.
///
/// Returns `false` if the file vanished; gives up waiting (and returns
/// `true`) after `max_wait`.
pub async fn wait_for_stable(path: &Path, max_wait: Duration) -> bool {
    wait_for_stable_every(path, max_wait, Duration::from_millis(500)).await
}

async fn wait_for_stable_every(path: &Path, max_wait: Duration, interval: Duration) -> bool {
    let start = std::time::Instant::now();

    let mut last_size = match std::fs::metadata(path) {
        Ok(m) => m.len(),
        Err(_) => return false,
    };

    loop {
        tokio::time::sleep(interval).await;

        if start.elapsed() > max_wait {
            warn!("File stability check timed out for {:?}", path);
            return true;
        }

        let current_size = match std::fs::metadata(path) {
            Ok(m) => m.len(),
            Err(_) => return false,
        };

        if current_size == last_size {
            return true;
        }

        last_size = current_size;
        debug!("File {:?} still being written, size: {}", path, current_size);
    }
}
