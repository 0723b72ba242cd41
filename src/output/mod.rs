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

//! Output module for cartridge images.
//!
//! This module handles writing built images to disk in various formats:
//! - BIN files (the flat image)
//! - CRT cartridge containers

mod bin;
pub mod crt;

pub use bin::write_bin;
pub use crt::{build_crt, write_crt};

use std::path::Path;

use crate::settings::BuildSettings;

/// Determine the output format from a file extension.
pub fn format_from_extension(path: &Path) -> Option<OutputFormat> {
    match path.extension()?.to_str()?.to_lowercase().as_str() {
        "bin" => Some(OutputFormat::Bin),
        "crt" => Some(OutputFormat::Crt),
        _ => None,
    }
}

/// The output format for cartridge images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Flat image, every chip in order.
    Bin,
    /// CRT container for emulators and flash tools.
    Crt,
}

/// Encode an image in the specified format without touching the disk.
pub fn encode_output(
    image: &[u8],
    settings: &BuildSettings,
    format: OutputFormat,
) -> std::io::Result<Vec<u8>> {
    match format {
        OutputFormat::Bin => Ok(image.to_vec()),
        OutputFormat::Crt => build_crt(settings, image),
    }
}

/// Write an image to a file in the specified format.
pub fn write_output(
    image: &[u8],
    settings: &BuildSettings,
    path: &Path,
    format: OutputFormat,
) -> std::io::Result<()> {
    match format {
        OutputFormat::Bin => write_bin(image, path),
        OutputFormat::Crt => write_crt(settings, image, path),
    }
}
