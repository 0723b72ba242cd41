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

//! Fuzz target for the CartBuilder parser and placement pipeline.
//!
//! Random build list text is tokenized and parsed; lists that parse are
//! built with synthetic file contents in place of real inputs. Parsing and
//! building may fail, but must never panic.
//!
//! Run with:
//!   cargo +nightly fuzz run fuzz_parser
//!
//! Run for a specific duration:
//!   cargo +nightly fuzz run fuzz_parser -- -max_total_time=60

#![no_main]

use cartbuilder::Builder;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(tokens) = cartbuilder::lexer::tokenize(source) else {
        return;
    };
    let Ok(list) = cartbuilder::parser::parse(&tokens) else {
        return;
    };

    // Keep images small enough to build quickly.
    let settings = &list.settings;
    if settings.banks > 64 || settings.bank_size > 0x10000 {
        return;
    }
    let limit = settings.banks.max(1) * settings.bank_size * 4;
    if list
        .patches
        .iter()
        .chain(&list.files)
        .any(|f| {
            f.linear_offset(settings.geometry())
                .map_or(false, |offset| offset > limit)
                || f.length > limit
        })
    {
        return;
    }

    let mut builder = Builder::new(list.settings.clone());
    for (i, patch) in list.patches.iter().enumerate() {
        builder.write_patch(patch.clone(), vec![i as u8; (i * 37) % 512]);
    }
    for (i, file) in list.files.iter().enumerate() {
        if file.source.contains(':') {
            if builder.write_dir(file.clone()).is_err() {
                return;
            }
        } else {
            builder.write_file(file.clone(), vec![i as u8; 1 + (i * 53) % 700]);
        }
    }
    let _ = builder.export();
});
