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

//! Placement queue and the update pipeline.
//!
//! Patches, files and directories are queued first and only placed when
//! [`Builder::update`] runs. The phases always run in this order:
//!
//! 1. patches, written unprotected at their fixed address
//! 2. directory reservations, so files are placed around them
//! 3. files, largest first, deduplicated by checksum, written protected
//! 4. directory contents, now that every file offset is known

use std::collections::HashMap;

use super::allocator::SpaceAllocator;
use super::cartridge::Cartridge;
use super::directory::{DirectoryEntry, DirectoryError, DirectorySpec};
use super::region::RegionError;
use crate::error::{BuildError, ErrorCode, Result};
use crate::settings::{BuildSettings, FileSettings};

/// Seed of the duplicate detection checksum.
const CHECKSUM_SEED: u32 = 0x1234_5678;

/// Order-sensitive fingerprint used to find identical files.
pub fn checksum(data: &[u8]) -> u32 {
    data.iter().fold(CHECKSUM_SEED, |sum, &byte| {
        let sum = (sum ^ u32::from(byte)) << 1;
        if sum & 0x8000_0000 != 0 {
            sum ^ 1
        } else {
            sum
        }
    })
}

/// What a queued item turns into.
#[derive(Debug, Clone)]
pub enum ItemKind {
    Patch,
    File,
    Directory(DirectorySpec),
}

#[derive(Debug, Clone)]
struct QueuedItem {
    kind: ItemKind,
    settings: FileSettings,
    data: Vec<u8>,
    checksum: u32,
}

/// Where a file ended up after an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub target: String,
    pub section: String,
    /// Linear offset in the image.
    pub offset: usize,
    pub length: usize,
    /// Position (among the queued files) of the identical file this one shares.
    pub duplicate_of: Option<usize>,
}

/// Queues placement requests and applies them to a cartridge.
#[derive(Debug)]
pub struct Builder {
    settings: BuildSettings,
    cart: Cartridge,
    queue: Vec<QueuedItem>,
}

impl Builder {
    /// Create a builder with an image of at least `settings.banks` banks.
    pub fn new(settings: BuildSettings) -> Self {
        let mut cart = Cartridge::new(settings.geometry());
        cart.reserve_banks(settings.banks);
        Self {
            settings,
            cart,
            queue: Vec::new(),
        }
    }

    pub fn settings(&self) -> &BuildSettings {
        &self.settings
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cart
    }

    /// Number of items waiting for the next update.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queue data for an unconditional write at a fixed offset.
    pub fn write_patch(&mut self, settings: FileSettings, data: Vec<u8>) {
        self.enqueue(ItemKind::Patch, settings, data);
    }

    /// Queue data for placement in free space.
    pub fn write_file(&mut self, settings: FileSettings, data: Vec<u8>) {
        self.enqueue(ItemKind::File, settings, data);
    }

    /// Queue a directory table; `settings.source` holds the directory key.
    pub fn write_dir(&mut self, settings: FileSettings) -> Result<()> {
        let spec = DirectorySpec::parse(&settings.source)
            .map_err(|e| directory_error(e, &settings))?;
        self.enqueue(ItemKind::Directory(spec), settings, Vec::new());
        Ok(())
    }

    fn enqueue(&mut self, kind: ItemKind, settings: FileSettings, data: Vec<u8>) {
        tracing::trace!(name = settings.display_name(), len = data.len(), ?kind, "queued");
        let checksum = checksum(&data);
        self.queue.push(QueuedItem {
            kind,
            settings,
            data,
            checksum,
        });
    }

    /// Apply every queued item and clear the queue.
    ///
    /// Returns one placement per queued file, in the order they were queued.
    /// With an empty queue this does nothing.
    pub fn update(&mut self) -> Result<Vec<Placement>> {
        let queue = std::mem::take(&mut self.queue);
        if queue.is_empty() {
            return Ok(Vec::new());
        }

        let mut patches = Vec::new();
        let mut dirs = Vec::new();
        let mut files = Vec::new();
        for item in &queue {
            match &item.kind {
                ItemKind::Patch => patches.push(item),
                ItemKind::File => files.push(item),
                ItemKind::Directory(spec) => dirs.push((item, spec)),
            }
        }

        tracing::info!(
            patches = patches.len(),
            directories = dirs.len(),
            files = files.len(),
            "updating cartridge"
        );

        // Largest first; the sort is stable so ties keep queue order.
        let mut order: Vec<usize> = (0..files.len()).collect();
        order.sort_by(|&a, &b| files[b].data.len().cmp(&files[a].data.len()));

        let mut canonical: Vec<usize> = (0..files.len()).collect();
        let mut seen: HashMap<u32, usize> = HashMap::new();
        for &i in &order {
            canonical[i] = *seen.entry(files[i].checksum).or_insert(i);
        }

        let geometry = self.settings.geometry();

        for patch in &patches {
            let offset = patch.settings.linear_offset(geometry)?;
            tracing::debug!(name = patch.settings.display_name(), offset, len = patch.data.len(), "patch");
            self.cart
                .write(offset, &patch.data, patch.settings.mode, false)
                .map_err(|e| overwrite_error(e, patch, &self.settings))?;
        }

        for (dir, spec) in &dirs {
            let matching = files.iter().filter(|f| spec.matches(&f.settings.section)).count();
            let size = spec.reserved_size(matching);
            let offset = dir.settings.linear_offset(geometry)?;
            tracing::debug!(key = dir.settings.source.as_str(), offset, size, "reserving directory");
            self.cart
                .write(offset, &vec![0; size], dir.settings.mode, false)
                .map_err(|e| overwrite_error(e, dir, &self.settings))?;
        }

        let mut offsets = vec![0; files.len()];
        for &i in &order {
            let file = files[i];
            if canonical[i] != i {
                offsets[i] = offsets[canonical[i]];
                tracing::debug!(
                    name = file.settings.display_name(),
                    offset = offsets[i],
                    "duplicate of {}",
                    files[canonical[i]].settings.display_name()
                );
                continue;
            }

            let min_start = file.settings.linear_offset(geometry)?;
            // With a restricted mode a no-fit address may sit in a disallowed
            // chip. The writer moves the data on, the placement keeps it.
            let offset = self
                .cart
                .find_space(min_start, file.data.len(), file.settings.mode);
            self.cart
                .write(offset, &file.data, file.settings.mode, true)
                .map_err(|e| overwrite_error(e, file, &self.settings))?;
            tracing::debug!(
                name = file.settings.display_name(),
                offset,
                at = %geometry.locate(offset),
                len = file.data.len(),
                "placed file"
            );
            offsets[i] = offset;
        }

        let entries: Vec<DirectoryEntry<'_>> = files
            .iter()
            .zip(&offsets)
            .map(|(file, &offset)| DirectoryEntry {
                target: &file.settings.target,
                section: &file.settings.section,
                offset,
                length: file.data.len(),
                has_load: file.settings.has_load,
                load: file.settings.load,
                mode: file.settings.mode,
                hidden: file.settings.hidden,
            })
            .collect();

        for (dir, spec) in &dirs {
            let data = spec
                .synthesize(&entries, &self.settings)
                .map_err(|e| directory_error(e, &dir.settings))?;
            let offset = dir.settings.linear_offset(geometry)?;
            self.cart
                .write(offset, &data, dir.settings.mode, false)
                .map_err(|e| overwrite_error(e, dir, &self.settings))?;
        }

        Ok(files
            .iter()
            .enumerate()
            .map(|(i, file)| Placement {
                target: file.settings.target.clone(),
                section: file.settings.section.clone(),
                offset: offsets[i],
                length: file.data.len(),
                duplicate_of: (canonical[i] != i).then_some(canonical[i]),
            })
            .collect())
    }

    /// Apply pending items and flatten the image.
    pub fn export(&mut self) -> Result<Vec<u8>> {
        self.update()?;
        Ok(self.cart.export(self.settings.fill))
    }
}

fn overwrite_error(error: RegionError, item: &QueuedItem, settings: &BuildSettings) -> BuildError {
    let RegionError::Overwrite { offset } = error;
    BuildError::new(
        ErrorCode::OverwriteConflict,
        format!(
            "'{}' overlaps data already placed at {}",
            item.settings.display_name(),
            settings.geometry().locate(offset)
        ),
        item.settings.span,
    )
    .with_hint("move the patch or give the file a higher 'offset'")
}

fn directory_error(error: DirectoryError, settings: &FileSettings) -> BuildError {
    let code = match error {
        DirectoryError::UnknownKind(_) => ErrorCode::UnknownDirectoryKind,
        DirectoryError::MissingNameIndex(_) | DirectoryError::InvalidNameIndex(_) => {
            ErrorCode::InvalidDirectoryKey
        }
        DirectoryError::Overflow { .. } => ErrorCode::DirectoryOverflow,
    };
    let error = BuildError::new(code, error.to_string(), settings.span);
    match code {
        ErrorCode::UnknownDirectoryKind => error.with_hint(
            "expected bankhigh, banklow, offsethigh, offsetlow, lengthhigh, lengthlow, loadhigh, loadlow, name or easyfs",
        ),
        _ => error,
    }
}
