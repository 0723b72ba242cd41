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

//! Chip storage and used/free run scanning.
//!
//! A [`ChipRegion`] owns the bytes of one ROM chip together with a parallel
//! occupancy map. Runs are never stored; [`Runs`] derives them on demand by
//! walking the occupancy map and merging equal neighbours.

use thiserror::Error;

/// Errors raised by chip writes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    /// A protected write hit a byte that an earlier write already claimed.
    #[error("chip offset ${offset:04X} is already in use")]
    Overwrite { offset: usize },
}

/// A maximal span of one chip with uniform occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    /// First byte of the run, relative to the chip.
    pub start: usize,
    /// Number of bytes in the run.
    pub length: usize,
    /// Whether the bytes of the run are occupied.
    pub used: bool,
}

impl Run {
    /// One past the last byte of the run.
    pub fn end(&self) -> usize {
        self.start + self.length
    }
}

/// Iterator over the runs of an occupancy map.
pub struct Runs<'a> {
    used: &'a [bool],
    position: usize,
}

impl<'a> Runs<'a> {
    pub fn new(used: &'a [bool]) -> Self {
        Self { used, position: 0 }
    }
}

impl Iterator for Runs<'_> {
    type Item = Run;

    fn next(&mut self) -> Option<Run> {
        let state = *self.used.get(self.position)?;
        let start = self.position;
        while self.position < self.used.len() && self.used[self.position] == state {
            self.position += 1;
        }
        Some(Run {
            start,
            length: self.position - start,
            used: state,
        })
    }
}

/// The bytes of one chip plus which of them have been written.
#[derive(Debug, Clone)]
pub struct ChipRegion {
    data: Vec<u8>,
    used: Vec<bool>,
}

impl ChipRegion {
    /// Create an empty chip of the given size.
    pub fn new(length: usize) -> Self {
        Self {
            data: vec![0; length],
            used: vec![false; length],
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn used(&self) -> &[bool] {
        &self.used
    }

    /// All runs, in address order, covering the chip exactly once.
    pub fn runs(&self) -> Runs<'_> {
        Runs::new(&self.used)
    }

    /// Only the unoccupied runs.
    pub fn free_runs(&self) -> impl Iterator<Item = Run> + '_ {
        self.runs().filter(|run| !run.used)
    }

    /// Only the occupied runs.
    pub fn used_runs(&self) -> impl Iterator<Item = Run> + '_ {
        self.runs().filter(|run| run.used)
    }

    /// Write as much of `source` as fits, starting at `target`.
    ///
    /// Returns the number of bytes written; the caller continues with the
    /// remainder in the next chip. With `protect` set, the write is refused
    /// before any byte changes if it would touch an occupied byte.
    pub fn write(&mut self, source: &[u8], target: usize, protect: bool) -> Result<usize, RegionError> {
        let count = source.len().min(self.len().saturating_sub(target));
        if count == 0 {
            return Ok(0);
        }
        let range = target..target + count;

        if protect {
            if let Some(i) = self.used[range.clone()].iter().position(|&used| used) {
                return Err(RegionError::Overwrite { offset: target + i });
            }
        }

        self.data[range.clone()].copy_from_slice(&source[..count]);
        self.used[range].fill(true);
        Ok(count)
    }

    /// Append the chip contents to `out`, replacing unwritten bytes with `fill`.
    pub fn export_into(&self, out: &mut Vec<u8>, fill: u8) {
        out.extend(
            self.data
                .iter()
                .zip(&self.used)
                .map(|(&byte, &used)| if used { byte } else { fill }),
        );
    }
}
