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

//! CartBuilder Library
//!
//! This library assembles Commodore 64 cartridge images from build lists:
//! fixed-address patches, files packed into free space, and directory tables
//! describing where the files landed.
//!
//! # Modules
//!
//! - [`error`] - Error types and error reporting
//! - [`lexer`] - Tokenization of build lists
//! - [`parser`] - Parsing tokens into settings and placement requests
//! - [`settings`] - Build-wide and per-file settings
//! - [`content`] - Loading and preparing file contents
//! - [`cart`] - Chip storage, space allocation and the placement pipeline
//! - [`output`] - BIN and CRT file writing
//! - [`runner`] - VICE integration and input watching
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! fn build(list: &Path) -> Result<(), Box<dyn std::error::Error>> {
//!     let source = std::fs::read_to_string(list)?;
//!     let base_dir = list.parent().unwrap_or(Path::new("."));
//!
//!     let output = cartbuilder::build(&source, base_dir)?;
//!     cartbuilder::output::write_bin(&output.image, Path::new("cart.bin"))?;
//!     std::fs::write("cart.crt", output.crt()?)?;
//!
//!     Ok(())
//! }
//! ```

pub mod cart;
pub mod content;
pub mod error;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod runner;
pub mod settings;

use std::path::{Path, PathBuf};

// Re-export commonly used types
pub use cart::{Builder, Placement};
pub use error::{format_error, BuildError, ErrorCode, Result, SourceLocation, Span};
pub use lexer::Token;
pub use parser::BuildList;
pub use settings::{BuildSettings, FileSettings};

use content::Source;

/// The version of CartBuilder.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of the tool.
pub const NAME: &str = "CartBuilder";

/// Everything a successful build produces.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// Settings from the `CARTRIDGE` section.
    pub settings: BuildSettings,
    /// The flat image.
    pub image: Vec<u8>,
    /// Where each file ended up, in list order.
    pub placements: Vec<Placement>,
    /// Every source file that was read.
    pub inputs: Vec<PathBuf>,
}

impl BuildOutput {
    /// The image wrapped in a CRT container.
    pub fn crt(&self) -> std::io::Result<Vec<u8>> {
        output::build_crt(&self.settings, &self.image)
    }
}

/// Build a cartridge image from build list text.
///
/// Source paths in the list are resolved against `base_dir`. Nothing is
/// written to disk; the first error aborts the build.
pub fn build(source: &str, base_dir: &Path) -> Result<BuildOutput> {
    let tokens = lexer::tokenize(source)?;
    let list = parser::parse(&tokens)?;
    tracing::info!(
        patches = list.patches.len(),
        files = list.files.len(),
        "parsed build list"
    );

    let mut builder = Builder::new(list.settings.clone());
    let mut inputs = Vec::new();

    for entry in &list.patches {
        if let Some((settings, data)) = load(&mut builder, entry, base_dir, &mut inputs)? {
            builder.write_patch(settings, data);
        }
    }
    for entry in &list.files {
        if let Some((settings, data)) = load(&mut builder, entry, base_dir, &mut inputs)? {
            builder.write_file(settings, data);
        }
    }

    let placements = builder.update()?;
    let image = builder.export()?;
    tracing::info!(bytes = image.len(), banks = builder.cartridge().bank_count(), "built image");

    Ok(BuildOutput {
        settings: list.settings,
        image,
        placements,
        inputs,
    })
}

/// Resolve and prepare one entry.
///
/// Directory entries are queued on the spot and yield `None`.
fn load(
    builder: &mut Builder,
    entry: &FileSettings,
    base_dir: &Path,
    inputs: &mut Vec<PathBuf>,
) -> Result<Option<(FileSettings, Vec<u8>)>> {
    let mut settings = entry.clone();
    let data = match content::load_source(&settings, base_dir)? {
        Source::Directory => {
            builder.write_dir(settings)?;
            return Ok(None);
        }
        Source::Empty => Vec::new(),
        Source::File { path, data } => {
            if !inputs.contains(&path) {
                inputs.push(path);
            }
            data
        }
    };

    let data = content::prepare(&mut settings, data)?;
    Ok(Some((settings, data)))
}
