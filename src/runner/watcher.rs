// CartBuilder - Assembles Commodore 64 cartridge images from build lists
// Copyright (C) 2026  Marcel Joachim Kloubert <marcel@kloubert.dev>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Watching build inputs for rebuild-on-save.
//!
//! Editors save in different ways (direct write, write-and-rename, backup
//! and rewrite), so the parent directory of each input is watched and
//! events are filtered by path.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use super::RunnerError;

/// Changes closer together than this are reported once.
const DEBOUNCE_DURATION: Duration = Duration::from_millis(100);

/// Watches the build list and the files it reads.
pub struct InputWatcher {
    watcher: RecommendedWatcher,
    rx: Receiver<Result<Event, notify::Error>>,
    dirs: HashSet<PathBuf>,
    paths: HashSet<PathBuf>,
}

impl InputWatcher {
    /// Start watching `paths`.
    pub fn new(paths: &[PathBuf]) -> Result<Self, RunnerError> {
        let (tx, rx) = mpsc::channel();
        let watcher = notify::recommended_watcher(tx)
            .map_err(|e| RunnerError::WatchError(format!("Failed to create watcher: {}", e)))?;

        let mut this = Self {
            watcher,
            rx,
            dirs: HashSet::new(),
            paths: HashSet::new(),
        };
        this.set_paths(paths)?;
        Ok(this)
    }

    /// Replace the watched set, for example after a rebuild read other files.
    pub fn set_paths(&mut self, paths: &[PathBuf]) -> Result<(), RunnerError> {
        let mut canonical_paths = HashSet::new();
        for path in paths {
            let canonical = path.canonicalize().map_err(|e| {
                RunnerError::WatchError(format!("Cannot resolve path {}: {}", path.display(), e))
            })?;

            if let Some(parent) = canonical.parent() {
                if !self.dirs.contains(parent) {
                    self.watcher
                        .watch(parent, RecursiveMode::NonRecursive)
                        .map_err(|e| {
                            RunnerError::WatchError(format!(
                                "Failed to watch {}: {}",
                                parent.display(),
                                e
                            ))
                        })?;
                    self.dirs.insert(parent.to_path_buf());
                }
            }

            canonical_paths.insert(canonical);
        }

        tracing::debug!(files = canonical_paths.len(), dirs = self.dirs.len(), "watching inputs");
        self.paths = canonical_paths;
        Ok(())
    }

    /// Check whether a path is one of the watched inputs.
    pub fn is_watched(&self, path: &Path) -> bool {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.paths.contains(&canonical)
    }

    /// Block until a watched input changes and return its path.
    pub fn wait_for_change(&self) -> Result<PathBuf, RunnerError> {
        loop {
            let event = self
                .rx
                .recv()
                .map_err(|e| RunnerError::WatchError(format!("Watch channel closed: {}", e)))?
                .map_err(|e| RunnerError::WatchError(format!("Watch error: {}", e)))?;

            if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                continue;
            }

            if let Some(path) = event.paths.iter().find(|p| self.is_watched(p)) {
                std::thread::sleep(DEBOUNCE_DURATION);
                while self.rx.try_recv().is_ok() {}
                return Ok(path.clone());
            }
        }
    }
}
