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

//! Loading and preparing the bytes of each placement request.
//!
//! Preparation runs once per entry, before anything is queued:
//! pad or truncate to `length`, strip or add the load address header,
//! relink BASIC programs, then read back the effective load address.

pub mod basic;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BuildError, ErrorCode, Result};
use crate::settings::FileSettings;

pub use basic::{relocate, RelocateError};

/// What an entry's `source` refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// No source given; the content starts empty.
    Empty,
    /// A directory key such as `banklow:games`.
    Directory,
    /// Bytes read from a file.
    File { path: PathBuf, data: Vec<u8> },
}

/// Resolve `settings.source` relative to `base_dir`.
///
/// A source containing `:` is a directory key unless a file by that name
/// exists.
pub fn load_source(settings: &FileSettings, base_dir: &Path) -> Result<Source> {
    if settings.source.is_empty() {
        return Ok(Source::Empty);
    }

    let path = base_dir.join(&settings.source);
    if settings.source.contains(':') && !path.is_file() {
        return Ok(Source::Directory);
    }

    let data = fs::read(&path).map_err(|e| {
        BuildError::new(
            ErrorCode::SourceNotFound,
            format!("cannot read '{}': {}", path.display(), e),
            settings.span,
        )
    })?;
    tracing::debug!(path = %path.display(), len = data.len(), "read source");

    Ok(Source::File { path, data })
}

/// Apply the entry's content options to `data`.
///
/// Updates `has_load` and `load` in `settings` to describe the result.
pub fn prepare(settings: &mut FileSettings, mut data: Vec<u8>) -> Result<Vec<u8>> {
    if settings.length > 0 {
        data.resize(settings.length, settings.fill);
    }

    if settings.has_load && settings.remove_load && data.len() >= 2 {
        data.drain(..2);
        settings.has_load = false;
    }

    if !settings.has_load && settings.add_load {
        let mut with_header = settings.load.to_le_bytes().to_vec();
        with_header.append(&mut data);
        data = with_header;
        settings.has_load = true;
    }

    if settings.basic {
        data = relink(settings, &data)?;
    }

    if settings.has_load {
        let header = data.get(..2).ok_or_else(|| {
            BuildError::new(
                ErrorCode::MissingLoadAddress,
                format!(
                    "'{}' is marked 'hasload' but is shorter than 2 bytes",
                    settings.display_name()
                ),
                settings.span,
            )
        })?;
        settings.load = u16::from_le_bytes([header[0], header[1]]);
    }

    Ok(data)
}

/// Relink a BASIC program for `settings.load`.
///
/// Without `hasload` the first two bytes are still a header slot: they are
/// skipped and replaced by the load address.
fn relink(settings: &FileSettings, data: &[u8]) -> Result<Vec<u8>> {
    let truncated = |e: RelocateError| {
        BuildError::new(
            ErrorCode::TruncatedProgram,
            format!("'{}' is not a complete BASIC program: {}", settings.display_name(), e),
            settings.span,
        )
    };

    if settings.has_load {
        return relocate(data, settings.load, true).map_err(truncated);
    }

    let body = data
        .get(2..)
        .ok_or(RelocateError::Truncated { offset: data.len() })
        .map_err(truncated)?;
    let mut out = settings.load.to_le_bytes().to_vec();
    out.extend(relocate(body, settings.load, false).map_err(truncated)?);
    Ok(out)
}
