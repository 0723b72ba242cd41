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

//! Parser module for build lists.
//!
//! A build list is a sequence of sections:
//!
//! ```text
//! CARTRIDGE {
//!     banks = 8;
//!     name = "MY CART";
//! }
//! PATCHES boot {
//!     00:0:0000 = boot.bin;
//! }
//! FILES games {
//!     option: hasload = true;
//!     file: INTRO = intro.prg;
//!     file: DIR = banklow:games, offset = 00:1:0000;
//! }
//! ```
//!
//! # Module Structure
//!
//! - `helpers` - Token stream navigation and error handling (ParserHelpers trait)
//! - `sections` - Section bodies (SectionParser trait)
//! - `values` - Numbers, booleans, offsets and strings (ValueParser trait)

// Submodules
pub mod helpers;
pub mod sections;
pub mod values;

use helpers::ParserHelpers;
use sections::SectionParser;

use crate::error::{BuildError, ErrorCode, Span};
use crate::lexer::Token;
use crate::settings::{BuildSettings, FileSettings};

/// A parsed build list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildList {
    /// Settings from the `CARTRIDGE` section.
    pub settings: BuildSettings,
    /// Entries of all `PATCHES` sections, in order.
    pub patches: Vec<FileSettings>,
    /// Entries of all `FILES` sections, in order.
    pub files: Vec<FileSettings>,
}

/// The parser state.
pub struct Parser<'a> {
    /// The token stream to parse.
    pub(crate) tokens: &'a [(Token, Span)],
    /// Current position in the token stream.
    pub(crate) position: usize,
    /// Cartridge settings, once the `CARTRIDGE` section has been read.
    pub(crate) settings: BuildSettings,
    cartridge_defined: bool,
    /// Lowercased names of the named sections seen so far.
    pub(crate) section_names: Vec<String>,
}

impl<'a> Parser<'a> {
    /// Create a new parser for the given token stream.
    pub fn new(tokens: &'a [(Token, Span)]) -> Self {
        Self {
            tokens,
            position: 0,
            settings: BuildSettings::default(),
            cartridge_defined: false,
            section_names: Vec::new(),
        }
    }

    /// Parse the complete build list.
    pub fn parse(&mut self) -> Result<BuildList, BuildError> {
        let mut list = BuildList::default();

        while !self.is_at_end() {
            let (keyword, span) = self.expect_word("expected a section keyword")?;

            match keyword.to_uppercase().as_str() {
                "CARTRIDGE" => {
                    if self.cartridge_defined {
                        return Err(BuildError::new(
                            ErrorCode::DuplicateCartridge,
                            "CARTRIDGE section is already defined",
                            span,
                        ));
                    }
                    self.parse_section_header()?;
                    self.settings = self.parse_cartridge()?;
                    self.validate_geometry(span)?;
                    self.cartridge_defined = true;
                }
                "PATCHES" => {
                    self.require_cartridge(&keyword, span)?;
                    let name = self.parse_section_header()?;
                    list.patches.extend(self.parse_patches(&name)?);
                }
                "FILES" => {
                    self.require_cartridge(&keyword, span)?;
                    let name = self.parse_section_header()?;
                    list.files.extend(self.parse_files(&name)?);
                }
                _ => {
                    return Err(BuildError::new(
                        ErrorCode::UnknownSection,
                        format!("unknown section '{}'", keyword),
                        span,
                    )
                    .with_hint("sections are CARTRIDGE, PATCHES and FILES"));
                }
            }
        }

        if !self.cartridge_defined {
            return Err(BuildError::new(
                ErrorCode::CartridgeNotDefined,
                "build list has no CARTRIDGE section",
                self.previous_span(),
            ));
        }

        list.settings = self.settings.clone();
        Ok(list)
    }

    fn require_cartridge(&self, keyword: &str, span: Span) -> Result<(), BuildError> {
        if self.cartridge_defined {
            Ok(())
        } else {
            Err(BuildError::new(
                ErrorCode::CartridgeNotDefined,
                format!("{} section appears before the CARTRIDGE section", keyword),
                span,
            ))
        }
    }

    fn validate_geometry(&self, span: Span) -> Result<(), BuildError> {
        let BuildSettings {
            bank_size,
            chips_per_bank,
            ..
        } = self.settings;
        if bank_size == 0 || chips_per_bank == 0 || bank_size % chips_per_bank != 0 {
            return Err(BuildError::new(
                ErrorCode::InvalidGeometry,
                format!(
                    "bank size {} cannot be split into {} chips",
                    bank_size, chips_per_bank
                ),
                span,
            )
            .with_hint("banksize must be a non-zero multiple of chipsperbank"));
        }
        Ok(())
    }
}

/// Parse a token stream into a build list.
pub fn parse(tokens: &[(Token, Span)]) -> Result<BuildList, BuildError> {
    let mut parser = Parser::new(tokens);
    parser.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::RomMode;
    use crate::lexer::tokenize;

    /// Helper to parse a build list directly.
    fn parse_source(source: &str) -> Result<BuildList, BuildError> {
        let tokens = tokenize(source)?;
        parse(&tokens)
    }

    #[test]
    fn test_minimal_list() {
        let list = parse_source("CARTRIDGE { }").unwrap();
        assert_eq!(list.settings, BuildSettings::default());
        assert!(list.patches.is_empty());
        assert!(list.files.is_empty());
    }

    #[test]
    fn test_full_list() {
        let source = r#"
            // EasyFlash cartridge
            CARTRIDGE {
                banks = 2;
                fill = $00;
                roms = low;
            }
            PATCHES boot {
                00:0:0000 = boot.bin;
            }
            FILES games {
                file: INTRO = intro.prg;
            }
            files more {
                file: OUTRO = outro.prg, roms = high;
            }
        "#;
        let list = parse_source(source).unwrap();
        assert_eq!(list.settings.banks, 2);
        assert_eq!(list.patches.len(), 1);
        assert_eq!(list.patches[0].section, "boot");
        assert_eq!(list.files.len(), 2);
        // Files inherit the cartridge fill and mode.
        assert_eq!(list.files[0].fill, 0);
        assert_eq!(list.files[0].mode, RomMode::Low);
        assert_eq!(list.files[1].mode, RomMode::High);
        assert_eq!(list.files[1].section, "more");
    }

    #[test]
    fn test_options_do_not_leak_between_sections() {
        let source = "CARTRIDGE { } FILES a { option: hidden=1; file: A = a; } \
                      FILES b { file: B = b; } PATCHES { 0 = c; }";
        let list = parse_source(source).unwrap();
        assert!(list.files[0].hidden);
        assert!(!list.files[1].hidden);
        assert!(!list.patches[0].hidden);
    }

    #[test]
    fn test_duplicate_cartridge() {
        let err = parse_source("CARTRIDGE { } cartridge { }").unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateCartridge);
        assert_eq!(err.span, Span::new(14, 23));
    }

    #[test]
    fn test_files_before_cartridge() {
        let err = parse_source("FILES { } CARTRIDGE { }").unwrap_err();
        assert_eq!(err.code, ErrorCode::CartridgeNotDefined);
    }

    #[test]
    fn test_missing_cartridge() {
        let err = parse_source("").unwrap_err();
        assert_eq!(err.code, ErrorCode::CartridgeNotDefined);
    }

    #[test]
    fn test_duplicate_section_name() {
        let err = parse_source("CARTRIDGE { } FILES games { } PATCHES Games { }").unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateSection);
    }

    #[test]
    fn test_unknown_section() {
        let err = parse_source("CARTRIDGE { } MUSIC { }").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownSection);
        assert!(err.hint.is_some());
    }

    #[test]
    fn test_invalid_geometry() {
        let err = parse_source("CARTRIDGE { banksize = $4000; chipsperbank = 3; }").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidGeometry);
        let err = parse_source("CARTRIDGE { chipsperbank = 0; }").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidGeometry);
    }

    #[test]
    fn test_missing_brace() {
        let err = parse_source("CARTRIDGE fill = 0; }").unwrap_err();
        assert_eq!(err.code, ErrorCode::UnexpectedToken);
    }
}
