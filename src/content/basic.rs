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

//! Relinking of tokenized BASIC programs.
//!
//! A BASIC program is a chain of lines, each stored as
//! `[next line pointer][line number][tokens...][0]`, with a zero pointer
//! after the last line. The pointers are absolute C64 addresses, so a program
//! loaded anywhere other than where it was saved needs them recomputed.

use thiserror::Error;

/// Errors raised while relinking a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelocateError {
    /// The program ended in the middle of a line or before the end marker.
    #[error("program ends unexpectedly at byte {offset}")]
    Truncated { offset: usize },
}

/// Reads little-endian values from a byte slice, tracking the position.
struct Reader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    fn byte(&mut self) -> Result<u8, RelocateError> {
        let byte = *self.data.get(self.position).ok_or(RelocateError::Truncated {
            offset: self.position,
        })?;
        self.position += 1;
        Ok(byte)
    }

    fn word(&mut self) -> Result<u16, RelocateError> {
        let low = self.byte()?;
        let high = self.byte()?;
        Ok(u16::from_le_bytes([low, high]))
    }
}

/// Relink `data` so its line pointers are valid when loaded at `address`.
///
/// With `has_load` the first two bytes are a load address header; they are
/// replaced by `address`. Line numbers and token bytes are copied unchanged.
/// Anything after the end marker is dropped.
pub fn relocate(data: &[u8], address: u16, has_load: bool) -> Result<Vec<u8>, RelocateError> {
    let mut reader = Reader::new(data);
    let mut out = Vec::with_capacity(data.len() + 2);
    let mut offset = address;

    if has_load {
        reader.word()?;
        out.extend_from_slice(&address.to_le_bytes());
    }

    loop {
        if reader.word()? == 0 {
            out.extend_from_slice(&[0, 0]);
            break;
        }

        let line_number = reader.word()?;
        let start = reader.position;
        while reader.byte()? != 0 {}
        let tokens = &data[start..reader.position];

        // 4 bytes for the pointer and line number
        let length = (tokens.len() + 4) as u16;
        offset = offset.wrapping_add(length);

        out.extend_from_slice(&offset.to_le_bytes());
        out.extend_from_slice(&line_number.to_le_bytes());
        out.extend_from_slice(tokens);
    }

    Ok(out)
}
