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

//! Section parsing: `CARTRIDGE`, `PATCHES` and `FILES`.

use super::helpers::ParserHelpers;
use super::values::ValueParser;
use super::Parser;
use crate::error::{BuildError, ErrorCode, Span};
use crate::lexer::Token;
use crate::settings::{BuildSettings, FileSettings};

/// Trait for parsing build list sections.
pub trait SectionParser {
    /// Parse the optional name after a section keyword and the opening brace.
    fn parse_section_header(&mut self) -> Result<String, BuildError>;

    /// Parse the body of the `CARTRIDGE` section.
    fn parse_cartridge(&mut self) -> Result<BuildSettings, BuildError>;

    /// Parse the body of a `PATCHES` section.
    fn parse_patches(&mut self, section: &str) -> Result<Vec<FileSettings>, BuildError>;

    /// Parse the body of a `FILES` section.
    fn parse_files(&mut self, section: &str) -> Result<Vec<FileSettings>, BuildError>;

    /// Parse `key=value` settings separated by commas, on top of `settings`.
    fn parse_file_settings(&mut self, settings: FileSettings) -> Result<FileSettings, BuildError>;

    /// Parse a source followed by optional settings.
    fn parse_file_info(&mut self, defaults: FileSettings) -> Result<FileSettings, BuildError>;
}

impl SectionParser for Parser<'_> {
    fn parse_section_header(&mut self) -> Result<String, BuildError> {
        let name = match self.peek() {
            Some(Token::Word(_)) => {
                let (name, span) = self.expect_word("expected section name")?;
                let key = name.to_lowercase();
                if self.section_names.contains(&key) {
                    return Err(BuildError::new(
                        ErrorCode::DuplicateSection,
                        format!("section '{}' is already defined", name),
                        span,
                    ));
                }
                self.section_names.push(key);
                name
            }
            _ => String::new(),
        };
        self.expect(&Token::LeftBrace, "expected '{' after section header")?;
        Ok(name)
    }

    fn parse_cartridge(&mut self) -> Result<BuildSettings, BuildError> {
        let mut settings = BuildSettings::default();

        while !self.match_token(&Token::RightBrace) {
            let span = self.peek_span().unwrap_or_else(|| self.previous_span());
            if self.is_at_end() {
                return Err(self.unexpected("expected '}'"));
            }
            let key = self.parse_compound();
            self.expect(&Token::Equal, "expected '=' after key")?;

            match key.to_lowercase().as_str() {
                "banks" => settings.banks = self.parse_usize()?,
                "banksize" => settings.bank_size = self.parse_usize()?,
                "chipsperbank" => settings.chips_per_bank = self.parse_usize()?,
                "exrom" => settings.exrom = self.parse_bool()?,
                "fill" => settings.fill = self.parse_u8()?,
                "game" => settings.game = self.parse_bool()?,
                "lengthtc" => settings.length_tc = self.parse_bool()?,
                "name" => settings.name = self.parse_compound(),
                "roms" => settings.mode = self.parse_rom_mode()?,
                "type" => settings.hardware_type = self.parse_u16()?,
                "boot" => {
                    self.parse_offset()?;
                    ignored(&key);
                }
                "bootfile" => {
                    self.parse_compound();
                    ignored(&key);
                }
                "offsetbanked" => {
                    self.parse_bool()?;
                    ignored(&key);
                }
                _ => return Err(unknown_key(&key, "CARTRIDGE", span)),
            }

            self.expect(&Token::Semicolon, "expected ';' after setting")?;
        }

        Ok(settings)
    }

    fn parse_patches(&mut self, section: &str) -> Result<Vec<FileSettings>, BuildError> {
        let mut patches = Vec::new();

        while !self.match_token(&Token::RightBrace) {
            let start = self.peek_span().unwrap_or_else(|| self.previous_span());
            if self.is_at_end() {
                return Err(self.unexpected("expected '}'"));
            }
            let offset = self.parse_offset()?;
            self.expect(&Token::Equal, "expected '=' after patch offset")?;

            let mut patch = self.parse_file_info(self.settings.file_defaults())?;
            patch.offset = Some(offset);
            patch.target = String::new();
            patch.section = section.to_string();
            patch.span = start.merge(&self.previous_span());
            patches.push(patch);

            self.expect(&Token::Semicolon, "expected ';' after patch")?;
        }

        Ok(patches)
    }

    fn parse_files(&mut self, section: &str) -> Result<Vec<FileSettings>, BuildError> {
        let mut files = Vec::new();
        let mut defaults = self.settings.file_defaults();

        while !self.match_token(&Token::RightBrace) {
            let (kind, start) = self.expect_word("expected 'file' or 'option'")?;
            self.expect(&Token::Colon, "expected ':' after entry kind")?;

            match kind.to_lowercase().as_str() {
                "file" => {
                    let target = self.parse_compound();
                    self.expect(&Token::Equal, "expected '=' after file name")?;
                    let mut file = self.parse_file_info(defaults.clone())?;
                    file.target = target;
                    file.section = section.to_string();
                    file.span = start.merge(&self.previous_span());
                    files.push(file);
                }
                "option" => {
                    defaults = self.parse_file_settings(defaults)?;
                }
                _ => {
                    return Err(BuildError::new(
                        ErrorCode::UnknownEntryKind,
                        format!("unknown entry kind '{}'", kind),
                        start,
                    )
                    .with_hint("FILES entries start with 'file:' or 'option:'"));
                }
            }

            self.expect(&Token::Semicolon, "expected ';' after entry")?;
        }

        Ok(files)
    }

    fn parse_file_settings(&mut self, mut settings: FileSettings) -> Result<FileSettings, BuildError> {
        if self.check(&Token::Semicolon) {
            return Ok(settings);
        }

        loop {
            let (key, span) = self.expect_word("expected setting name")?;
            self.expect(&Token::Equal, "expected '=' after setting name")?;

            match key.to_lowercase().as_str() {
                "addload" => settings.add_load = self.parse_bool()?,
                "basic" => settings.basic = self.parse_bool()?,
                "fill" => settings.fill = self.parse_u8()?,
                "hasload" => settings.has_load = self.parse_bool()?,
                "hidden" => settings.hidden = self.parse_bool()?,
                "length" => settings.length = self.parse_usize()?,
                "load" => settings.load = self.parse_u16()?,
                "offset" => settings.offset = Some(self.parse_offset()?),
                "removeload" => settings.remove_load = self.parse_bool()?,
                "roms" => settings.mode = self.parse_rom_mode()?,
                "source" => settings.source = self.parse_compound(),
                "align" | "start" => {
                    self.parse_integer()?;
                    ignored(&key);
                }
                _ => return Err(unknown_key(&key, "file", span)),
            }

            if !self.match_token(&Token::Comma) {
                return Ok(settings);
            }
        }
    }

    fn parse_file_info(&mut self, defaults: FileSettings) -> Result<FileSettings, BuildError> {
        let source = self.parse_compound();
        let mut settings = defaults;
        if !source.is_empty() {
            settings.source = source;
        }

        if self.match_token(&Token::Comma) {
            settings = self.parse_file_settings(settings)?;
        }

        Ok(settings)
    }
}

fn ignored(key: &str) {
    tracing::warn!(key, "setting is accepted but has no effect");
}

fn unknown_key(key: &str, context: &str, span: Span) -> BuildError {
    BuildError::new(
        ErrorCode::UnknownKey,
        format!("unknown {} setting '{}'", context, key),
        span,
    )
}
