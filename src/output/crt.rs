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

//! CRT container writer.
//!
//! Layout (all multi-byte fields big-endian):
//! - 0x40-byte header: `C64 CARTRIDGE   `, header length, version 1.0,
//!   hardware type, EXROM, GAME, 6 reserved bytes, 32-byte name
//! - one CHIP packet per chip: `CHIP`, packet length, chip type, bank,
//!   load address, image size, then the chip bytes

use std::fs;
use std::io;
use std::path::Path;

use crate::cart::directory::encode_name;
use crate::settings::BuildSettings;

/// Signature at the start of every CRT file.
pub const CRT_SIGNATURE: &[u8; 16] = b"C64 CARTRIDGE   ";

/// Size of the CRT file header.
pub const HEADER_SIZE: usize = 0x40;

/// Size of a CHIP packet header.
pub const CHIP_HEADER_SIZE: usize = 0x10;

const CRT_VERSION: u16 = 0x0100;
const NAME_SIZE: usize = 0x20;

/// Chip type for flash ROM.
const CHIP_TYPE_FLASH: u16 = 0x0002;

/// The C64 cartridge window is 16K starting at $8000.
const WINDOW_SIZE: usize = 0x4000;
const WINDOW_BASE: u16 = 0x8000;

/// Wrap a flat image in a CRT container.
pub fn build_crt(settings: &BuildSettings, image: &[u8]) -> io::Result<Vec<u8>> {
    let chip_size = settings.geometry().chip_size();
    if chip_size == 0 || chip_size > WINDOW_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("chip size ${:X} does not fit the cartridge window", chip_size),
        ));
    }

    let chip_count = image.len().div_ceil(chip_size);
    let mut crt = Vec::with_capacity(HEADER_SIZE + chip_count * (CHIP_HEADER_SIZE + chip_size));

    crt.extend_from_slice(CRT_SIGNATURE);
    crt.extend_from_slice(&(HEADER_SIZE as u32).to_be_bytes());
    crt.extend_from_slice(&CRT_VERSION.to_be_bytes());
    crt.extend_from_slice(&settings.hardware_type.to_be_bytes());
    crt.push(u8::from(settings.exrom));
    crt.push(u8::from(settings.game));
    crt.extend_from_slice(&[0; 6]);

    let mut name = encode_name(&settings.name);
    name.resize(NAME_SIZE, 0);
    crt.extend_from_slice(&name);

    // Chips per window, which is not the same as chips per bank.
    let slots = WINDOW_SIZE / chip_size;
    for (index, chip) in image.chunks(chip_size).enumerate() {
        let bank = (index / slots) as u16;
        let address = WINDOW_BASE | ((index % slots) * chip_size) as u16;

        crt.extend_from_slice(b"CHIP");
        crt.extend_from_slice(&((chip_size + CHIP_HEADER_SIZE) as u32).to_be_bytes());
        crt.extend_from_slice(&CHIP_TYPE_FLASH.to_be_bytes());
        crt.extend_from_slice(&bank.to_be_bytes());
        crt.extend_from_slice(&address.to_be_bytes());
        crt.extend_from_slice(&(chip_size as u16).to_be_bytes());
        crt.extend_from_slice(chip);
        // A short final chip is padded to full size.
        crt.resize(crt.len() + chip_size - chip.len(), settings.fill);
    }

    Ok(crt)
}

/// Write a flat image as a CRT file.
pub fn write_crt(settings: &BuildSettings, image: &[u8], path: &Path) -> io::Result<()> {
    fs::write(path, build_crt(settings, image)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> BuildSettings {
        BuildSettings {
            name: "EF TEST".to_string(),
            hardware_type: 32,
            exrom: true,
            ..BuildSettings::default()
        }
    }

    #[test]
    fn test_header() {
        let crt = build_crt(&settings(), &[]).unwrap();
        assert_eq!(crt.len(), HEADER_SIZE);
        assert_eq!(&crt[..16], CRT_SIGNATURE);
        assert_eq!(&crt[0x10..0x14], &[0, 0, 0, 0x40]);
        assert_eq!(&crt[0x14..0x16], &[0x01, 0x00]);
        assert_eq!(&crt[0x16..0x18], &[0x00, 0x20]);
        assert_eq!(crt[0x18], 1);
        assert_eq!(crt[0x19], 0);
        assert!(crt[0x1A..0x20].iter().all(|&b| b == 0));
        assert_eq!(&crt[0x20..0x27], b"EF TEST");
        assert!(crt[0x27..0x40].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_chip_packets() {
        let image: Vec<u8> = (0..0x8000).map(|i| (i >> 13) as u8).collect();
        let crt = build_crt(&settings(), &image).unwrap();
        let packet = CHIP_HEADER_SIZE + 0x2000;
        assert_eq!(crt.len(), HEADER_SIZE + 4 * packet);

        let expected = [(0u16, 0x8000u16), (0, 0xA000), (1, 0x8000), (1, 0xA000)];
        for (i, (bank, address)) in expected.iter().enumerate() {
            let chip = &crt[HEADER_SIZE + i * packet..HEADER_SIZE + (i + 1) * packet];
            assert_eq!(&chip[..4], b"CHIP");
            assert_eq!(&chip[4..8], &[0, 0, 0x20, 0x10]);
            assert_eq!(&chip[8..10], &[0, 2]);
            assert_eq!(&chip[10..12], &bank.to_be_bytes());
            assert_eq!(&chip[12..14], &address.to_be_bytes());
            assert_eq!(&chip[14..16], &[0x20, 0x00]);
            assert!(chip[16..].iter().all(|&b| b == i as u8));
        }
    }

    #[test]
    fn test_single_chip_banks() {
        let settings = BuildSettings {
            bank_size: 0x2000,
            chips_per_bank: 1,
            ..BuildSettings::default()
        };
        let crt = build_crt(&settings, &[0; 0x4000]).unwrap();
        let second = HEADER_SIZE + CHIP_HEADER_SIZE + 0x2000;
        // Two 8K chips share one 16K window.
        assert_eq!(&crt[second + 10..second + 14], &[0, 0, 0xA0, 0x00]);
    }

    #[test]
    fn test_oversized_chip() {
        let settings = BuildSettings {
            bank_size: 0x8000,
            chips_per_bank: 1,
            ..BuildSettings::default()
        };
        assert!(build_crt(&settings, &[0; 16]).is_err());
    }

    #[test]
    fn test_write_crt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.crt");
        write_crt(&settings(), &[0xAA; 0x2000], &path).unwrap();
        let data = fs::read(&path).unwrap();
        assert_eq!(data.len(), HEADER_SIZE + CHIP_HEADER_SIZE + 0x2000);
    }
}
