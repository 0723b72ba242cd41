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

//! Emulator integration and input watching.
//!
//! This module provides functionality to:
//! - Find and launch the VICE emulator with a cartridge attached
//! - Watch the build list and every file it reads for changes

mod vice;
mod watcher;

pub use vice::{check_vice_version, find_vice, ViceRunner};
pub use watcher::InputWatcher;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while running or watching.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// VICE emulator was not found on the system.
    #[error("VICE emulator not found. Install VICE (x64sc) or specify path with --vice-path")]
    ViceNotFound,

    /// The specified VICE path does not exist.
    #[error("VICE path does not exist: {0}")]
    InvalidVicePath(PathBuf),

    /// VICE emulator failed to start.
    #[error("Failed to start VICE: {0}")]
    ViceStartFailed(#[from] io::Error),

    /// VICE version could not be determined.
    #[error("VICE version check failed: {0}")]
    VersionError(String),

    /// Error watching files.
    #[error("File watch error: {0}")]
    WatchError(String),
}
