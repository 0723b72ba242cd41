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

//! Conversion between linear image offsets and bank/chip/offset triples.

use std::fmt;

/// Cartridge layout: how banks divide into chips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Size of one bank in bytes.
    pub bank_size: usize,
    /// Number of chips per bank.
    pub chips_per_bank: usize,
}

impl Geometry {
    /// The standard EasyFlash layout: 16K banks split into ROML and ROMH.
    pub const EASYFLASH: Geometry = Geometry {
        bank_size: 0x4000,
        chips_per_bank: 2,
    };

    pub fn new(bank_size: usize, chips_per_bank: usize) -> Self {
        Self {
            bank_size,
            chips_per_bank,
        }
    }

    /// Size of one chip in bytes.
    pub fn chip_size(&self) -> usize {
        self.bank_size / self.chips_per_bank
    }

    /// Resolve an offset to a linear image address, or `None` if it does not
    /// fit in `usize`.
    pub fn linear(&self, offset: Offset) -> Option<usize> {
        offset
            .bank
            .checked_mul(self.bank_size)?
            .checked_add(offset.chip.checked_mul(self.chip_size())?)?
            .checked_add(offset.offset)
    }

    /// Split a linear image address into bank, chip and intra-chip offset.
    pub fn locate(&self, linear: usize) -> Offset {
        let chip_index = linear / self.chip_size();
        Offset::new(
            chip_index / self.chips_per_bank,
            chip_index % self.chips_per_bank,
            linear % self.chip_size(),
        )
    }

    /// Global index of the chip containing a linear address.
    pub fn chip_index(&self, linear: usize) -> usize {
        linear / self.chip_size()
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::EASYFLASH
    }
}

/// A location written as bank, chip and offset within the chip.
///
/// A bare linear address is kept as `(0, 0, address)` and resolves through
/// the same formula, so callers never need to know which form was written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Offset {
    pub bank: usize,
    pub chip: usize,
    pub offset: usize,
}

impl Offset {
    pub fn new(bank: usize, chip: usize, offset: usize) -> Self {
        Self { bank, chip, offset }
    }

    /// A plain linear address.
    pub fn linear(offset: usize) -> Self {
        Self::new(0, 0, offset)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}:{}:{:04X}", self.bank, self.chip, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chip_size() {
        assert_eq!(Geometry::EASYFLASH.chip_size(), 0x2000);
        assert_eq!(Geometry::new(0x2000, 1).chip_size(), 0x2000);
    }

    #[test]
    fn test_linear_from_triple() {
        let g = Geometry::EASYFLASH;
        assert_eq!(g.linear(Offset::new(0, 0, 0)), Some(0));
        assert_eq!(g.linear(Offset::new(0, 1, 0)), Some(0x2000));
        assert_eq!(g.linear(Offset::new(1, 0, 0x10)), Some(0x4010));
        assert_eq!(g.linear(Offset::new(2, 1, 0x1FFF)), Some(0xBFFF));
    }

    #[test]
    fn test_bare_linear_passes_through() {
        let g = Geometry::EASYFLASH;
        assert_eq!(g.linear(Offset::linear(0x12345)), Some(0x12345));
    }

    #[test]
    fn test_linear_overflow() {
        let g = Geometry::EASYFLASH;
        assert_eq!(g.linear(Offset::new(usize::MAX, 1, 0)), None);
        assert_eq!(g.linear(Offset::new(0, usize::MAX, 0)), None);
        assert_eq!(g.linear(Offset::new(0, 1, usize::MAX)), None);
    }

    #[test]
    fn test_locate_inverts_linear() {
        let g = Geometry::EASYFLASH;
        let offset = Offset::new(3, 1, 0x0123);
        assert_eq!(g.linear(offset).map(|linear| g.locate(linear)), Some(offset));
    }

    #[test]
    fn test_chip_index() {
        let g = Geometry::EASYFLASH;
        assert_eq!(g.chip_index(0x1FFF), 0);
        assert_eq!(g.chip_index(0x2000), 1);
        assert_eq!(g.chip_index(0x4000), 2);
    }

    #[test]
    fn test_display() {
        assert_eq!(Offset::new(1, 1, 0x20).to_string(), "01:1:0020");
    }
}
