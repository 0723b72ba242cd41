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

//! Token definitions for the build list language.

use logos::Logos;

/// A token in a build list.
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    /// `{` - opens a section body.
    #[token("{")]
    LeftBrace,
    /// `}` - closes a section body.
    #[token("}")]
    RightBrace,
    /// `;` - ends an entry.
    #[token(";")]
    Semicolon,
    /// `=` - separates a key from its value.
    #[token("=")]
    Equal,
    /// `,` - separates settings.
    #[token(",")]
    Comma,
    /// `:` - separates offset parts and compound keys.
    #[token(":")]
    Colon,

    /// Anything else: keys, values, numbers, file names.
    /// Quoted runs keep their content and lose their quotes.
    #[regex(
        r#"([^\s{};=,:"'/]|"[^"\n]*"|'[^'\n]*')([^\s{};=,:"']|"[^"\n]*"|'[^'\n]*')*"#,
        unquote
    )]
    Word(String),
}

/// Strip quote characters from a word, keeping everything between them.
fn unquote(lex: &mut logos::Lexer<Token>) -> String {
    let mut value = String::with_capacity(lex.slice().len());
    let mut quote: Option<char> = None;

    for c in lex.slice().chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => value.push(c),
            None if c == '"' || c == '\'' => quote = Some(c),
            None => value.push(c),
        }
    }

    value
}

impl Token {
    /// Get the word text, if this is a word.
    pub fn as_word(&self) -> Option<&str> {
        match self {
            Token::Word(w) => Some(w),
            _ => None,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::LeftBrace => write!(f, "'{{'"),
            Token::RightBrace => write!(f, "'}}'"),
            Token::Semicolon => write!(f, "';'"),
            Token::Equal => write!(f, "'='"),
            Token::Comma => write!(f, "','"),
            Token::Colon => write!(f, "':'"),
            Token::Word(w) => write!(f, "'{}'", w),
        }
    }
}
