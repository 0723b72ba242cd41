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

//! Lexer module for the build list language.
//!
//! This module tokenizes a build list into a stream of tokens.
//! It handles:
//! - Punctuation (`{ } ; = , :`)
//! - Words, including quoted runs that may contain spaces or punctuation
//! - Comments (starting with `//`)

mod tokens;

pub use tokens::Token;

use logos::Logos;

use crate::error::{BuildError, ErrorCode, Span};

/// Tokenize a build list into a vector of tokens with spans.
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>, BuildError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = Span::from(lexer.span());
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => return Err(lex_error(source, span)),
        }
    }

    Ok(tokens)
}

/// Classify a span the lexer could not match.
fn lex_error(source: &str, span: Span) -> BuildError {
    let rest = &source[span.start..];
    if rest.starts_with('"') || rest.starts_with('\'') {
        let end = rest.find('\n').map_or(source.len(), |i| span.start + i);
        return BuildError::new(
            ErrorCode::UnterminatedString,
            "Unterminated quoted string",
            Span::new(span.start, end),
        );
    }

    let found = rest.chars().next().unwrap_or(' ');
    let error = BuildError::new(
        ErrorCode::InvalidCharacter,
        format!("Unexpected character '{}'", found),
        span,
    );
    if found == '/' {
        error.with_hint("Words cannot start with '/'; quote paths such as \"/tmp/game.prg\"")
    } else {
        error
    }
}
