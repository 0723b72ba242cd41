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

//! Fuzz target for BASIC program relinking.
//!
//! Feeds arbitrary programs and load addresses to the relinker; malformed
//! programs must come back as errors, never as panics.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_relocate

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    address: u16,
    has_load: bool,
    program: Vec<u8>,
}

fuzz_target!(|input: Input| {
    if let Ok(once) = cartbuilder::content::relocate(&input.program, input.address, input.has_load) {
        // A relinked program relinks to itself.
        let twice = cartbuilder::content::relocate(&once, input.address, input.has_load)
            .expect("relinked program must stay valid");
        assert_eq!(once, twice);
    }
});
