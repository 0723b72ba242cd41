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

//! Parser helper methods for token stream navigation and error handling.
//!
//! This module provides utility methods for the parser including:
//! - Token stream navigation (peek, advance, check)
//! - Token matching and expectation
//! - Error creation

use super::Parser;
use crate::error::{BuildError, ErrorCode, Span};
use crate::lexer::Token;

/// Trait for parser helper operations.
pub trait ParserHelpers<'a> {
    /// Check if we've reached the end of the token stream.
    fn is_at_end(&self) -> bool;

    /// Peek at the current token without advancing.
    fn peek(&self) -> Option<&Token>;

    /// Peek at the current token's span.
    fn peek_span(&self) -> Option<Span>;

    /// Peek at a token ahead by n positions.
    fn peek_ahead(&self, n: usize) -> Option<&Token>;

    /// Get the previous token's span (for error reporting).
    fn previous_span(&self) -> Span;

    /// Advance to the next token and return the current one.
    fn advance(&mut self) -> Option<(Token, Span)>;

    /// Check if the current token is exactly `expected`.
    fn check(&self, expected: &Token) -> bool;

    /// Check if the current token is a word.
    fn check_word(&self) -> bool;

    /// Consume the current token if it matches the expected one.
    fn match_token(&mut self, expected: &Token) -> bool;

    /// Expect the current token to match, or return an error.
    fn expect(&mut self, expected: &Token, message: &str) -> Result<Span, BuildError>;

    /// Expect a word and return its text and span.
    fn expect_word(&mut self, message: &str) -> Result<(String, Span), BuildError>;

    /// Create an error at the current position.
    fn error(&self, code: ErrorCode, message: impl Into<String>) -> BuildError;

    /// Create an "expected X" error describing the current token.
    fn unexpected(&self, message: &str) -> BuildError;
}

impl<'a> ParserHelpers<'a> for Parser<'a> {
    fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position).map(|(t, _)| t)
    }

    fn peek_span(&self) -> Option<Span> {
        self.tokens.get(self.position).map(|(_, s)| *s)
    }

    fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n).map(|(t, _)| t)
    }

    fn previous_span(&self) -> Span {
        if self.position > 0 {
            self.tokens[self.position - 1].1
        } else if let Some((_, span)) = self.tokens.first() {
            *span
        } else {
            Span::new(0, 0)
        }
    }

    fn advance(&mut self) -> Option<(Token, Span)> {
        let result = self.tokens.get(self.position).cloned();
        if result.is_some() {
            self.position += 1;
        }
        result
    }

    fn check(&self, expected: &Token) -> bool {
        self.peek() == Some(expected)
    }

    fn check_word(&self) -> bool {
        self.peek().and_then(Token::as_word).is_some()
    }

    fn match_token(&mut self, expected: &Token) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: &Token, message: &str) -> Result<Span, BuildError> {
        if self.check(expected) {
            let span = self.peek_span().unwrap_or_default();
            self.position += 1;
            Ok(span)
        } else {
            Err(self.unexpected(message))
        }
    }

    fn expect_word(&mut self, message: &str) -> Result<(String, Span), BuildError> {
        match self.tokens.get(self.position) {
            Some((Token::Word(word), span)) => {
                let result = (word.clone(), *span);
                self.position += 1;
                Ok(result)
            }
            _ => Err(self.unexpected(message)),
        }
    }

    fn error(&self, code: ErrorCode, message: impl Into<String>) -> BuildError {
        let span = self.peek_span().unwrap_or_else(|| self.previous_span());
        BuildError::new(code, message, span)
    }

    fn unexpected(&self, message: &str) -> BuildError {
        match self.peek() {
            Some(token) => self.error(
                ErrorCode::UnexpectedToken,
                format!("{}, found {}", message, token),
            ),
            None => BuildError::new(
                ErrorCode::UnexpectedEndOfFile,
                format!("{}, found end of file", message),
                self.previous_span(),
            ),
        }
    }
}
