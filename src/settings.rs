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

//! Build-wide and per-file settings.
//!
//! [`BuildSettings`] comes from the `CARTRIDGE` section and is fixed for the
//! whole build. [`FileSettings`] describes one placement request; each
//! section starts from [`BuildSettings::file_defaults`] and `option:` entries
//! replace the defaults for the entries that follow.

use crate::cart::{Geometry, Offset, RomMode};
use crate::error::{BuildError, ErrorCode, Result, Span};

/// A CRT chip packet numbers banks with 16 bits.
pub const MAX_BANKS: usize = 0x10000;

/// Settings for the whole cartridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    /// Minimum number of banks in the image.
    pub banks: usize,
    /// Size of one bank in bytes.
    pub bank_size: usize,
    /// Number of chips per bank.
    pub chips_per_bank: usize,
    /// State of the EXROM line in the CRT header.
    pub exrom: bool,
    /// Value of every byte nothing was written to.
    pub fill: u8,
    /// State of the GAME line in the CRT header.
    pub game: bool,
    /// Store lengths in directories as two's complement.
    pub length_tc: bool,
    /// Default ROM windows for files.
    pub mode: RomMode,
    /// Cartridge name for the CRT header.
    pub name: String,
    /// CRT hardware type.
    pub hardware_type: u16,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            banks: 0,
            bank_size: Geometry::EASYFLASH.bank_size,
            chips_per_bank: Geometry::EASYFLASH.chips_per_bank,
            exrom: false,
            fill: 0xFF,
            game: false,
            length_tc: false,
            mode: RomMode::Both,
            name: String::new(),
            hardware_type: 0,
        }
    }
}

impl BuildSettings {
    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.bank_size, self.chips_per_bank)
    }

    /// Settings a section's entries start from.
    pub fn file_defaults(&self) -> FileSettings {
        FileSettings {
            fill: self.fill,
            mode: self.mode,
            ..FileSettings::default()
        }
    }
}

/// Settings for one patch, file or directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSettings {
    /// Prepend `load` as a 2-byte header.
    pub add_load: bool,
    /// Relocate the content as a tokenized BASIC program.
    pub basic: bool,
    /// Padding byte used when `length` extends the content.
    pub fill: u8,
    /// The content starts with a 2-byte load address.
    pub has_load: bool,
    /// Flag the file as hidden in file system directories.
    pub hidden: bool,
    /// Force the content to this length; 0 keeps it as is.
    pub length: usize,
    /// C64 load address.
    pub load: u16,
    /// ROM windows the content may occupy.
    pub mode: RomMode,
    /// Fixed address for patches and directories, lower bound for files.
    pub offset: Option<Offset>,
    /// Strip the 2-byte load address header.
    pub remove_load: bool,
    /// Name of the section the entry was declared in.
    pub section: String,
    /// File name, or directory key.
    pub source: String,
    /// Display name used in directories.
    pub target: String,
    /// Where the entry was declared.
    pub span: Span,
}

impl FileSettings {
    /// Resolve the requested offset, treating "none" as the start of the image.
    pub fn linear_offset(&self, geometry: Geometry) -> Result<usize> {
        let Some(offset) = self.offset else {
            return Ok(0);
        };
        let limit = geometry.bank_size.saturating_mul(MAX_BANKS);
        geometry.linear(offset).filter(|&linear| linear < limit).ok_or_else(|| {
            BuildError::new(
                ErrorCode::InvalidNumber,
                format!("offset {} is out of range", offset),
                self.span,
            )
            .with_hint("bank, chip and offset must describe an address inside the image")
        })
    }

    /// Name for log lines and error messages.
    pub fn display_name(&self) -> &str {
        if !self.target.is_empty() {
            &self.target
        } else if !self.source.is_empty() {
            &self.source
        } else {
            "<patch>"
        }
    }
}
