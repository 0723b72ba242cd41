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

//! Value parsing: numbers, booleans, offsets and compound strings.
//!
//! Numbers are decimal, `$` hex or `0x` hex. Offset parts written as
//! `bank:chip:offset` are always hex without a prefix.

use super::helpers::ParserHelpers;
use super::Parser;
use crate::cart::{Offset, RomMode};
use crate::error::{BuildError, ErrorCode, Span};
use crate::lexer::Token;

/// Parse a number literal.
pub fn parse_number(text: &str) -> Option<u64> {
    if let Some(hex) = text.strip_prefix('$') {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()
    } else {
        text.parse().ok()
    }
}

/// Trait for parsing setting values.
pub trait ValueParser {
    /// Parse an integer word.
    fn parse_integer(&mut self) -> Result<(u64, Span), BuildError>;

    /// Parse an integer that fits in `usize`.
    fn parse_usize(&mut self) -> Result<usize, BuildError>;

    /// Parse an integer in `0..=255`.
    fn parse_u8(&mut self) -> Result<u8, BuildError>;

    /// Parse an integer in `0..=65535`.
    fn parse_u16(&mut self) -> Result<u16, BuildError>;

    /// Parse `true`, `false` or an integer (non-zero is true).
    fn parse_bool(&mut self) -> Result<bool, BuildError>;

    /// Parse `bank:chip:offset` in hex, or a linear integer address.
    fn parse_offset(&mut self) -> Result<Offset, BuildError>;

    /// Parse words and colons up to the next other punctuation, joined.
    fn parse_compound(&mut self) -> String;

    /// Parse a `low`, `high` or `both` ROM mode.
    fn parse_rom_mode(&mut self) -> Result<RomMode, BuildError>;
}

impl ValueParser for Parser<'_> {
    fn parse_integer(&mut self) -> Result<(u64, Span), BuildError> {
        let (text, span) = self.expect_word("expected a number")?;
        let value = parse_number(&text).ok_or_else(|| {
            BuildError::new(
                ErrorCode::InvalidNumber,
                format!("'{}' is not a valid number", text),
                span,
            )
            .with_hint("write decimal, $hex or 0xhex")
        })?;
        Ok((value, span))
    }

    fn parse_usize(&mut self) -> Result<usize, BuildError> {
        let (value, span) = self.parse_integer()?;
        usize::try_from(value).map_err(|_| out_of_range(value, span, usize::MAX as u64))
    }

    fn parse_u8(&mut self) -> Result<u8, BuildError> {
        let (value, span) = self.parse_integer()?;
        u8::try_from(value).map_err(|_| out_of_range(value, span, u8::MAX.into()))
    }

    fn parse_u16(&mut self) -> Result<u16, BuildError> {
        let (value, span) = self.parse_integer()?;
        u16::try_from(value).map_err(|_| out_of_range(value, span, u16::MAX.into()))
    }

    fn parse_bool(&mut self) -> Result<bool, BuildError> {
        if let Some(Token::Word(word)) = self.peek() {
            if word.eq_ignore_ascii_case("true") {
                self.advance();
                return Ok(true);
            }
            if word.eq_ignore_ascii_case("false") {
                self.advance();
                return Ok(false);
            }
        }
        Ok(self.parse_integer()?.0 != 0)
    }

    fn parse_offset(&mut self) -> Result<Offset, BuildError> {
        let is_triple = self.check_word()
            && self.peek_ahead(1) == Some(&Token::Colon)
            && self.peek_ahead(2).and_then(Token::as_word).is_some()
            && self.peek_ahead(3) == Some(&Token::Colon)
            && self.peek_ahead(4).and_then(Token::as_word).is_some();

        if !is_triple {
            return Ok(Offset::linear(self.parse_usize()?));
        }

        let bank = self.parse_hex_part()?;
        self.expect(&Token::Colon, "expected ':'")?;
        let chip = self.parse_hex_part()?;
        self.expect(&Token::Colon, "expected ':'")?;
        let offset = self.parse_hex_part()?;
        Ok(Offset::new(bank, chip, offset))
    }

    fn parse_compound(&mut self) -> String {
        let mut result = String::new();
        while let Some(token) = self.peek() {
            match token {
                Token::Word(word) => result.push_str(word),
                Token::Colon => result.push(':'),
                _ => break,
            }
            self.position += 1;
        }
        result
    }

    fn parse_rom_mode(&mut self) -> Result<RomMode, BuildError> {
        let span = self.peek_span().unwrap_or_else(|| self.previous_span());
        let value = self.parse_compound();
        RomMode::parse(&value).ok_or_else(|| {
            BuildError::new(
                ErrorCode::InvalidRomMode,
                format!("invalid ROM mode '{}'", value),
                span.merge(&self.previous_span()),
            )
            .with_hint("use 'low', 'high' or 'both'")
        })
    }
}

impl Parser<'_> {
    fn parse_hex_part(&mut self) -> Result<usize, BuildError> {
        let (text, span) = self.expect_word("expected a hex number")?;
        usize::from_str_radix(&text, 16).map_err(|_| {
            BuildError::new(
                ErrorCode::InvalidNumber,
                format!("'{}' is not a valid hex number", text),
                span,
            )
            .with_hint("offsets are written as hex bank:chip:offset, for example 01:0:0100")
        })
    }
}

fn out_of_range(value: u64, span: Span, max: u64) -> BuildError {
    BuildError::new(
        ErrorCode::InvalidNumber,
        format!("{} is out of range (maximum {})", value, max),
        span,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn with_parser<T>(source: &str, f: impl FnOnce(&mut Parser<'_>) -> T) -> T {
        let tokens = tokenize(source).unwrap();
        let mut parser = Parser::new(&tokens);
        f(&mut parser)
    }

    #[test]
    fn test_parse_number_forms() {
        assert_eq!(parse_number("42"), Some(42));
        assert_eq!(parse_number("$ff"), Some(255));
        assert_eq!(parse_number("0x4000"), Some(0x4000));
        assert_eq!(parse_number("0XAbC"), Some(0xABC));
        assert_eq!(parse_number("0x"), None);
        assert_eq!(parse_number("12a"), None);
        assert_eq!(parse_number("-1"), None);
    }

    #[test]
    fn test_invalid_number() {
        let err = with_parser("zz", |p| p.parse_integer().unwrap_err());
        assert_eq!(err.code, ErrorCode::InvalidNumber);
        assert_eq!(err.span, Span::new(0, 2));
    }

    #[test]
    fn test_u8_range() {
        assert_eq!(with_parser("$FF", |p| p.parse_u8().unwrap()), 0xFF);
        let err = with_parser("256", |p| p.parse_u8().unwrap_err());
        assert_eq!(err.code, ErrorCode::InvalidNumber);
    }

    #[test]
    fn test_bool() {
        assert!(with_parser("TRUE", |p| p.parse_bool().unwrap()));
        assert!(!with_parser("false", |p| p.parse_bool().unwrap()));
        assert!(with_parser("2", |p| p.parse_bool().unwrap()));
        assert!(!with_parser("0", |p| p.parse_bool().unwrap()));
        assert!(with_parser("maybe", |p| p.parse_bool()).is_err());
    }

    #[test]
    fn test_offset_triple() {
        let offset = with_parser("01:1:0100;", |p| p.parse_offset().unwrap());
        assert_eq!(offset, Offset::new(1, 1, 0x100));
    }

    #[test]
    fn test_offset_linear() {
        let offset = with_parser("$4000;", |p| p.parse_offset().unwrap());
        assert_eq!(offset, Offset::linear(0x4000));
    }

    #[test]
    fn test_offset_triple_is_hex() {
        let offset = with_parser("10:0:10", |p| p.parse_offset().unwrap());
        assert_eq!(offset, Offset::new(0x10, 0, 0x10));
    }

    #[test]
    fn test_compound_joins_colons() {
        let (value, next) = with_parser("name:3:games, x", |p| (p.parse_compound(), p.peek().cloned()));
        assert_eq!(value, "name:3:games");
        assert_eq!(next, Some(Token::Comma));
    }

    #[test]
    fn test_compound_empty() {
        assert_eq!(with_parser(";", |p| p.parse_compound()), "");
    }

    #[test]
    fn test_rom_mode() {
        assert_eq!(with_parser("High", |p| p.parse_rom_mode().unwrap()), RomMode::High);
        let err = with_parser("middle;", |p| p.parse_rom_mode().unwrap_err());
        assert_eq!(err.code, ErrorCode::InvalidRomMode);
        assert_eq!(err.span, Span::new(0, 6));
    }
}
