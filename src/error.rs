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

//! Error types for the cartridge builder.
//!
//! Every failure in the pipeline, from a stray character in the build list
//! to a file overwriting another file's bytes, is a [`BuildError`]. Errors
//! carry the span of the build list entry that caused them so the CLI can
//! point at the offending line.

use std::ops::Range;

use ariadne::{Config, Label, Report, ReportKind, Source};
use thiserror::Error;

/// A source span representing a range in the build list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Create a new span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Get the length of this span.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Merge two spans into one that covers both.
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl From<Span> for Range<usize> {
    fn from(span: Span) -> Self {
        span.start..span.end
    }
}

/// Error codes for the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Lexical errors (E001-E010)
    InvalidCharacter,
    UnterminatedString,

    // Syntax errors (E100-E120)
    UnexpectedToken,
    UnexpectedEndOfFile,
    InvalidNumber,
    UnknownSection,
    UnknownKey,
    InvalidRomMode,
    DuplicateSection,
    DuplicateCartridge,
    CartridgeNotDefined,
    UnknownEntryKind,
    InvalidGeometry,

    // Build errors (E200-E220)
    OverwriteConflict,
    UnknownDirectoryKind,
    InvalidDirectoryKey,
    DirectoryOverflow,
    SourceNotFound,
    TruncatedProgram,
    MissingLoadAddress,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl ErrorCode {
    /// Get the numeric code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            // Lexical errors
            ErrorCode::InvalidCharacter => "E001",
            ErrorCode::UnterminatedString => "E010",

            // Syntax errors
            ErrorCode::UnexpectedToken => "E100",
            ErrorCode::UnexpectedEndOfFile => "E101",
            ErrorCode::InvalidNumber => "E102",
            ErrorCode::UnknownSection => "E110",
            ErrorCode::UnknownKey => "E111",
            ErrorCode::InvalidRomMode => "E112",
            ErrorCode::DuplicateSection => "E113",
            ErrorCode::DuplicateCartridge => "E114",
            ErrorCode::CartridgeNotDefined => "E115",
            ErrorCode::UnknownEntryKind => "E116",
            ErrorCode::InvalidGeometry => "E120",

            // Build errors
            ErrorCode::OverwriteConflict => "E200",
            ErrorCode::UnknownDirectoryKind => "E201",
            ErrorCode::InvalidDirectoryKey => "E202",
            ErrorCode::DirectoryOverflow => "E203",
            ErrorCode::SourceNotFound => "E210",
            ErrorCode::TruncatedProgram => "E211",
            ErrorCode::MissingLoadAddress => "E212",
        }
    }
}

/// A build error with source location.
#[derive(Debug, Error)]
#[error("[{code}] {message}")]
pub struct BuildError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// The build list span where the error occurred.
    pub span: Span,
    /// Optional hint for fixing the error.
    pub hint: Option<String>,
}

impl BuildError {
    /// Create a new build error.
    pub fn new(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        Self {
            code,
            message: message.into(),
            span,
            hint: None,
        }
    }

    /// Add a hint to this error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Get the error code string.
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }
}

/// Result type for builder operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Source location with line and column information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl SourceLocation {
    /// Calculate line and column from a byte offset in the build list.
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let offset = floor_char_boundary(source, offset.min(source.len()));
        let before = &source[..offset];

        let line = before.chars().filter(|&c| c == '\n').count() + 1;
        let last_newline = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[last_newline..].chars().count() + 1;

        Self { line, column }
    }
}

fn floor_char_boundary(source: &str, mut offset: usize) -> usize {
    while offset > 0 && !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Format an error with source context.
pub fn format_error(error: &BuildError, source: &str, filename: Option<&str>) -> String {
    render(error, source, filename, true)
}

/// Format an error without terminal colors.
pub fn format_error_plain(error: &BuildError, source: &str, filename: Option<&str>) -> String {
    render(error, source, filename, false)
}

fn render(error: &BuildError, source: &str, filename: Option<&str>, color: bool) -> String {
    let filename = filename.unwrap_or("<input>");
    let loc = SourceLocation::from_offset(source, error.span.start);

    let start = floor_char_boundary(source, error.span.start.min(source.len()));
    let end = floor_char_boundary(source, error.span.end.min(source.len())).max(start);

    let mut report = Report::build(ReportKind::Error, (), start)
        .with_config(Config::default().with_color(color))
        .with_code(error.code_str())
        .with_message(format!(
            "{} ({}:{}:{})",
            error.message, filename, loc.line, loc.column
        ))
        .with_label(Label::new(start..end).with_message(&error.message));

    if let Some(hint) = &error.hint {
        report = report.with_help(hint);
    }

    let mut output = Vec::new();
    if report
        .finish()
        .write(Source::from(source), &mut output)
        .is_err()
    {
        return format!(
            "error[{}]: {}\n  --> {}:{}:{}\n",
            error.code_str(),
            error.message,
            filename,
            loc.line,
            loc.column
        );
    }

    String::from_utf8_lossy(&output).into_owned()
}
