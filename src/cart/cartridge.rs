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

//! The growing list of chips that makes up a cartridge image.

use super::offset::Geometry;
use super::region::{ChipRegion, RegionError};

/// Which ROM windows a chip or placement may use.
///
/// Chips alternate by index: even chips are ROML (`$8000`), odd chips are
/// ROMH (`$A000`/`$E000`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RomMode {
    /// ROML only (even chips).
    Low,
    /// ROMH only (odd chips).
    High,
    /// Either window.
    #[default]
    Both,
}

impl RomMode {
    pub fn lorom(self) -> bool {
        matches!(self, RomMode::Low | RomMode::Both)
    }

    pub fn hirom(self) -> bool {
        matches!(self, RomMode::High | RomMode::Both)
    }

    /// Whether a chip with this global index may hold data in this mode.
    pub fn allows_chip(self, index: usize) -> bool {
        let odd = index & 1 == 1;
        (self.lorom() || odd) && (self.hirom() || !odd)
    }

    /// Parse a `roms` value (`low`, `high`, `both`), case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "low" => Some(RomMode::Low),
            "high" => Some(RomMode::High),
            "both" => Some(RomMode::Both),
            _ => None,
        }
    }
}

/// Chip storage for a whole cartridge, grown a bank at a time.
#[derive(Debug, Clone)]
pub struct Cartridge {
    geometry: Geometry,
    chips: Vec<ChipRegion>,
}

impl Cartridge {
    /// Create an empty cartridge with no banks.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            chips: Vec::new(),
        }
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn chips(&self) -> &[ChipRegion] {
        &self.chips
    }

    pub fn bank_count(&self) -> usize {
        self.chips.len() / self.geometry.chips_per_bank
    }

    /// Total size of the image in bytes.
    pub fn capacity(&self) -> usize {
        self.chips.len() * self.geometry.chip_size()
    }

    /// Add one bank of empty chips.
    pub fn expand(&mut self) {
        let chip_size = self.geometry.chip_size();
        for _ in 0..self.geometry.chips_per_bank {
            self.chips.push(ChipRegion::new(chip_size));
        }
    }

    /// Grow until the cartridge has at least `banks` banks.
    pub fn reserve_banks(&mut self, banks: usize) {
        while self.bank_count() < banks {
            self.expand();
        }
    }

    /// The chip containing a linear address, growing the cartridge to reach it.
    fn chip_at(&mut self, linear: usize) -> &mut ChipRegion {
        let index = self.geometry.chip_index(linear);
        while self.chips.len() <= index {
            self.expand();
        }
        &mut self.chips[index]
    }

    /// Write `data` starting at a linear address, split across chips.
    ///
    /// The cursor walks forward one chip at a time. Chips that `mode` does not
    /// allow are stepped over without consuming any data, so a ROML-only
    /// placement lands in chips 0, 2, 4... Conflict offsets in the returned
    /// error are linear.
    pub fn write(
        &mut self,
        offset: usize,
        data: &[u8],
        mode: RomMode,
        protect: bool,
    ) -> Result<(), RegionError> {
        let chip_size = self.geometry.chip_size();
        let mut cursor = offset;
        let mut target = offset % chip_size;
        let mut source = 0;

        while source < data.len() {
            let index = self.geometry.chip_index(cursor);
            if mode.allows_chip(index) {
                let written = self
                    .chip_at(cursor)
                    .write(&data[source..], target, protect)
                    .map_err(|RegionError::Overwrite { offset }| RegionError::Overwrite {
                        offset: index * chip_size + offset,
                    })?;
                source += written;
                target = 0;
            }
            cursor += chip_size;
        }

        Ok(())
    }

    /// Flatten the cartridge, replacing unwritten bytes with `fill`.
    pub fn export(&self, fill: u8) -> Vec<u8> {
        let mut image = Vec::with_capacity(self.capacity());
        for chip in &self.chips {
            chip.export_into(&mut image, fill);
        }
        image
    }
}
