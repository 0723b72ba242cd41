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

//! Directory tables describing where files ended up.
//!
//! A directory is requested with a key such as `banklow:music` or
//! `name:3:music`: the kind comes first, the optional character index for
//! `name` second, and the last segment filters files by section (empty means
//! every file). Byte tables hold one byte per matching file; the `easyfs`
//! table holds one fixed-size record per file.

use thiserror::Error;

use super::cartridge::RomMode;
use crate::settings::BuildSettings;

/// Space reserved for one-byte-per-file tables.
pub const TABLE_SIZE: usize = 256;

/// Size of one EasyFS directory record.
pub const EASYFS_RECORD_SIZE: usize = 0x18;

/// Length of the name field in an EasyFS record.
const EASYFS_NAME_SIZE: usize = 16;

/// Errors raised while parsing or filling a directory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    #[error("unknown directory kind '{0}'")]
    UnknownKind(String),

    #[error("directory key '{0}' needs a character index, as in 'name:0:{0}'")]
    MissingNameIndex(String),

    #[error("invalid character index '{0}' in directory key")]
    InvalidNameIndex(String),

    #[error("{count} files do not fit in a {capacity}-entry directory")]
    Overflow { count: usize, capacity: usize },
}

/// What a directory table contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryKind {
    BankHigh,
    BankLow,
    OffsetHigh,
    OffsetLow,
    LengthHigh,
    LengthLow,
    LoadHigh,
    LoadLow,
    /// The n-th character of each file's display name.
    Name(usize),
    /// Full file system records.
    EasyFs,
}

/// A parsed directory key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySpec {
    pub kind: DirectoryKind,
    /// Lowercased section filter; empty matches every file.
    pub section: String,
}

/// What a directory needs to know about one placed file.
#[derive(Debug, Clone)]
pub struct DirectoryEntry<'a> {
    pub target: &'a str,
    pub section: &'a str,
    /// Linear offset of the first content byte, load header included.
    pub offset: usize,
    /// Content length, load header included.
    pub length: usize,
    pub has_load: bool,
    pub load: u16,
    pub mode: RomMode,
    pub hidden: bool,
}

impl DirectoryEntry<'_> {
    /// Offset of the data after any load address header.
    pub fn true_offset(&self) -> usize {
        if self.has_load {
            self.offset + 2
        } else {
            self.offset
        }
    }

    /// Length of the data without any load address header.
    pub fn true_length(&self) -> usize {
        if self.has_load {
            self.length.saturating_sub(2)
        } else {
            self.length
        }
    }
}

impl DirectorySpec {
    /// Parse a directory key.
    pub fn parse(key: &str) -> Result<Self, DirectoryError> {
        let segments: Vec<&str> = key.split(':').collect();
        let section = if segments.len() > 1 {
            segments[segments.len() - 1].to_lowercase()
        } else {
            String::new()
        };

        let kind = match segments[0].to_lowercase().as_str() {
            "bankhigh" => DirectoryKind::BankHigh,
            "banklow" => DirectoryKind::BankLow,
            "offsethigh" => DirectoryKind::OffsetHigh,
            "offsetlow" => DirectoryKind::OffsetLow,
            "lengthhigh" => DirectoryKind::LengthHigh,
            "lengthlow" => DirectoryKind::LengthLow,
            "loadhigh" => DirectoryKind::LoadHigh,
            "loadlow" => DirectoryKind::LoadLow,
            "easyfs" => DirectoryKind::EasyFs,
            "name" => {
                if segments.len() < 3 {
                    return Err(DirectoryError::MissingNameIndex(section));
                }
                let index = segments[1]
                    .trim()
                    .parse()
                    .map_err(|_| DirectoryError::InvalidNameIndex(segments[1].to_string()))?;
                DirectoryKind::Name(index)
            }
            other => return Err(DirectoryError::UnknownKind(other.to_string())),
        };

        Ok(Self { kind, section })
    }

    /// Whether a file from `section` contributes to this directory.
    pub fn matches(&self, section: &str) -> bool {
        self.section.is_empty() || self.section == section.to_lowercase()
    }

    /// Bytes to reserve for a directory listing `matching` files.
    pub fn reserved_size(&self, matching: usize) -> usize {
        match self.kind {
            DirectoryKind::EasyFs => EASYFS_RECORD_SIZE * (matching + 1),
            _ => TABLE_SIZE,
        }
    }

    /// Build the table contents for the placed files, in the order given.
    pub fn synthesize(
        &self,
        entries: &[DirectoryEntry<'_>],
        settings: &BuildSettings,
    ) -> Result<Vec<u8>, DirectoryError> {
        let matching: Vec<&DirectoryEntry<'_>> =
            entries.iter().filter(|e| self.matches(e.section)).collect();
        let mut data = vec![settings.fill; self.reserved_size(matching.len())];

        if self.kind == DirectoryKind::EasyFs {
            for (record, entry) in data.chunks_exact_mut(EASYFS_RECORD_SIZE).zip(&matching) {
                write_easyfs_record(record, entry, settings.bank_size);
            }
            return Ok(data);
        }

        if matching.len() > TABLE_SIZE {
            return Err(DirectoryError::Overflow {
                count: matching.len(),
                capacity: TABLE_SIZE,
            });
        }

        for (slot, entry) in data.iter_mut().zip(&matching) {
            *slot = self.table_byte(entry, settings);
        }

        Ok(data)
    }

    /// The byte a one-byte-per-file table stores for `entry`.
    fn table_byte(&self, entry: &DirectoryEntry<'_>, settings: &BuildSettings) -> u8 {
        let bank = entry.true_offset() / settings.bank_size;
        let length = if settings.length_tc {
            (entry.true_length() ^ 0xFFFF) + 1
        } else {
            entry.true_length()
        };

        match self.kind {
            DirectoryKind::BankHigh => ((bank >> 8) & 0xFF) as u8,
            DirectoryKind::BankLow => (bank & 0xFF) as u8,
            DirectoryKind::OffsetHigh => (((entry.true_offset() >> 8) & 0x3F) | 0x80) as u8,
            DirectoryKind::OffsetLow => (entry.true_offset() & 0xFF) as u8,
            DirectoryKind::LengthHigh => ((length >> 8) & 0xFF) as u8,
            DirectoryKind::LengthLow => (length & 0xFF) as u8,
            DirectoryKind::LoadHigh => (entry.load >> 8) as u8,
            DirectoryKind::LoadLow => (entry.load & 0xFF) as u8,
            DirectoryKind::Name(index) => encode_name(entry.target).get(index).copied().unwrap_or(0),
            DirectoryKind::EasyFs => settings.fill,
        }
    }
}

/// Encode a display name as bytes; characters outside ASCII become `?`.
pub fn encode_name(name: &str) -> Vec<u8> {
    name.chars()
        .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
        .collect()
}

fn write_easyfs_record(record: &mut [u8], entry: &DirectoryEntry<'_>, bank_size: usize) {
    let mut name = encode_name(entry.target);
    name.resize(EASYFS_NAME_SIZE, 0);
    record[..EASYFS_NAME_SIZE].copy_from_slice(&name);

    let mut flags = match entry.mode {
        RomMode::High => 0x03,
        RomMode::Low => 0x02,
        RomMode::Both => 0x01,
    };
    if entry.hidden {
        flags |= 0x80;
    }
    record[16] = flags | 0x60;
    record[17] = (entry.offset / bank_size) as u8;
    record[18] = 0;
    record[19] = (entry.offset & 0xFF) as u8;
    record[20] = ((entry.offset & 0x3F00) >> 8) as u8;
    record[21] = (entry.length & 0xFF) as u8;
    record[22] = ((entry.length >> 8) & 0xFF) as u8;
    record[23] = ((entry.length >> 16) & 0xFF) as u8;
}
