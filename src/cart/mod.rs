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

//! Cartridge storage and placement.
//!
//! - [`offset`] - bank/chip/offset addressing
//! - [`region`] - per-chip bytes and occupancy runs
//! - [`cartridge`] - the chip list and the cross-chip write splitter
//! - [`allocator`] - free space search
//! - [`directory`] - directory table synthesis
//! - [`builder`] - the placement queue and update pipeline

pub mod allocator;
pub mod builder;
pub mod cartridge;
pub mod directory;
pub mod offset;
pub mod region;

pub use allocator::SpaceAllocator;
pub use builder::{checksum, Builder, ItemKind, Placement};
pub use cartridge::{Cartridge, RomMode};
pub use directory::{DirectoryEntry, DirectoryError, DirectoryKind, DirectorySpec};
pub use offset::{Geometry, Offset};
pub use region::{ChipRegion, RegionError, Run, Runs};
