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

//! Free space search across the chips of a cartridge.

use super::cartridge::{Cartridge, RomMode};

/// Trait for finding room for a block of data.
pub trait SpaceAllocator {
    /// Find a linear address where `size` bytes fit in chips allowed by `mode`,
    /// starting no lower than `min_start`.
    ///
    /// Free runs are chained across allowed chips into a running span; a used
    /// run closes the span. The scan stops after the first chip at whose end
    /// the open span is big enough, and the largest span seen so far wins.
    /// Layouts of existing images depend on this exact order, so it is not a
    /// global best fit. If nothing fits, the address just past the end of the
    /// cartridge (or `min_start`, if that is higher) is returned and the write
    /// that follows grows it.
    ///
    /// That address is not adjusted for `mode`. When it falls in a chip the
    /// mode disallows, [`Cartridge::write`] moves the data on to the next
    /// allowed chip, so the bytes land past the returned address.
    fn find_space(&self, min_start: usize, size: usize, mode: RomMode) -> usize;
}

impl SpaceAllocator for Cartridge {
    fn find_space(&self, min_start: usize, size: usize, mode: RomMode) -> usize {
        let chip_size = self.geometry().chip_size();

        let mut largest = 0;
        let mut largest_offset = self.capacity();
        let mut space = 0;
        let mut space_offset = 0;

        for (index, chip) in self.chips().iter().enumerate() {
            if mode.allows_chip(index) {
                let base = index * chip_size;
                for run in chip.runs() {
                    let start = base + run.start;
                    if start < min_start {
                        continue;
                    }

                    if !run.used {
                        if space == 0 {
                            space_offset = start;
                        }
                        space += run.length;
                    } else {
                        if space > largest {
                            largest = space;
                            largest_offset = space_offset;
                        }
                        space = 0;
                    }
                }
            }

            if space >= size {
                break;
            }
        }

        if space > largest {
            largest = space;
            largest_offset = space_offset;
        }

        if largest < size {
            largest_offset = self.capacity().max(min_start);
        }

        tracing::trace!(
            min_start,
            size,
            ?mode,
            offset = largest_offset,
            span = largest,
            "space search"
        );

        largest_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::offset::Geometry;

    fn cart(banks: usize) -> Cartridge {
        let mut cart = Cartridge::new(Geometry::new(16, 2));
        cart.reserve_banks(banks);
        cart
    }

    fn fill(cart: &mut Cartridge, offset: usize, len: usize) {
        cart.write(offset, &vec![0xEE; len], RomMode::Both, false)
            .unwrap();
    }

    #[test]
    fn test_empty_cartridge_appends() {
        let cart = cart(0);
        assert_eq!(cart.find_space(0, 10, RomMode::Both), 0);
    }

    #[test]
    fn test_fresh_bank_starts_at_zero() {
        let cart = cart(1);
        assert_eq!(cart.find_space(0, 10, RomMode::Both), 0);
    }

    #[test]
    fn test_places_after_used_bytes() {
        let mut cart = cart(1);
        fill(&mut cart, 0, 5);
        assert_eq!(cart.find_space(0, 4, RomMode::Both), 5);
    }

    #[test]
    fn test_span_continues_across_chips() {
        let mut cart = cart(1);
        fill(&mut cart, 0, 6);
        // 2 free bytes in chip 0 join the 8 in chip 1.
        assert_eq!(cart.find_space(0, 10, RomMode::Both), 6);
    }

    #[test]
    fn test_too_big_appends() {
        let mut cart = cart(1);
        fill(&mut cart, 4, 1);
        assert_eq!(cart.find_space(0, 20, RomMode::Both), 16);
    }

    #[test]
    fn test_min_start_past_the_end() {
        let cart = cart(1);
        assert_eq!(cart.find_space(40, 4, RomMode::Both), 40);
    }

    #[test]
    fn test_high_mode_no_fit_returns_disallowed_chip() {
        let mut cart = cart(1);
        fill(&mut cart, 8, 8);
        // Chip 2 starts at the end and is even; the writer skips to chip 3.
        assert_eq!(cart.find_space(0, 4, RomMode::High), 16);
    }

    #[test]
    fn test_min_start_skips_runs_below() {
        let mut cart = cart(1);
        fill(&mut cart, 4, 2);
        // The run at 0 starts below the bound; the run at 6 does not.
        assert_eq!(cart.find_space(1, 2, RomMode::Both), 6);
    }

    #[test]
    fn test_low_mode_uses_even_chips() {
        let mut cart = cart(2);
        fill(&mut cart, 0, 8);
        assert_eq!(cart.find_space(0, 4, RomMode::Low), 16);
    }

    #[test]
    fn test_high_mode_uses_odd_chips() {
        let cart = cart(1);
        assert_eq!(cart.find_space(0, 4, RomMode::High), 8);
    }

    #[test]
    fn test_largest_closed_span_wins_before_stop() {
        let mut cart = cart(2);
        // chip 0: free 0..2, used 2..3, free 3..8 (open at chip end)
        fill(&mut cart, 2, 1);
        // After chip 0 the open 5-byte span fits a 3-byte request, so the
        // scan stops and it beats the closed 2-byte span at 0.
        assert_eq!(cart.find_space(0, 3, RomMode::Both), 3);
    }

    #[test]
    fn test_early_stop_ignores_larger_later_span() {
        let mut cart = cart(2);
        // chip 0: free 0..4, used 4..5, free 5..8 (open, 3 bytes)
        fill(&mut cart, 4, 1);
        // The open span would chain into chip 1 and grow to 11 bytes, but it
        // already fits after chip 0, so the closed 4-byte span at 0 wins.
        assert_eq!(cart.find_space(0, 3, RomMode::Both), 0);
    }
}
