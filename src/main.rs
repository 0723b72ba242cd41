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

//! CartBuilder CLI
//!
//! Builds Commodore 64 cartridge images from build lists.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use cartbuilder::error::format_error;
use cartbuilder::output::{encode_output, format_from_extension, write_output, OutputFormat};
use cartbuilder::runner::{check_vice_version, find_vice, InputWatcher, ViceRunner};
use cartbuilder::BuildOutput;
use tracing_subscriber::EnvFilter;

/// CartBuilder - Commodore 64 cartridge image builder
#[derive(Parser, Debug)]
#[command(name = "cartbuilder")]
#[command(author = "Marcel Joachim Kloubert")]
#[command(version)]
#[command(about = "Assembles Commodore 64 cartridge images from build lists")]
#[command(long_about = r#"
CartBuilder reads a build list describing a cartridge layout and produces
the finished image: patches at fixed addresses, files packed into the free
space, and directory tables describing where every file landed.

Without -o, two files are written next to the build list:
  @-output.bin  - the flat image
  @-output.crt  - the image in a CRT container

Example usage:
  cartbuilder list.txt
  cartbuilder list.txt -o game.crt
  cartbuilder list.txt -o game.bin -v

Run in VICE emulator:
  cartbuilder list.txt --run

Watch mode, rebuilding when the list or any input changes:
  cartbuilder list.txt --watch
"#)]
struct Cli {
    /// Build list to read
    list: PathBuf,

    /// Output file (.bin or .crt). Defaults to @-output.bin and @-output.crt.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose output; repeat for more log detail (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Run the cartridge in VICE after building
    #[arg(short, long)]
    run: bool,

    /// Watch the build list and its inputs and rebuild on changes (implies --run)
    #[arg(short, long)]
    watch: bool,

    /// Path to VICE emulator binary (auto-detected if not specified)
    #[arg(long)]
    vice_path: Option<PathBuf>,
}

/// Install the log subscriber; `RUST_LOG` takes precedence over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cartbuilder={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let base_dir = cli
        .list
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let targets = match &cli.output {
        Some(path) => match format_from_extension(path) {
            Some(format) => vec![(path.clone(), format)],
            None => {
                eprintln!("Error: Unknown output format. Use .bin or .crt extension.");
                return ExitCode::from(2);
            }
        },
        None => vec![
            (base_dir.join("@-output.bin"), OutputFormat::Bin),
            (base_dir.join("@-output.crt"), OutputFormat::Crt),
        ],
    };

    if cli.verbose > 0 {
        println!("{} v{}", cartbuilder::NAME, cartbuilder::VERSION);
        println!("Build list: {}", cli.list.display());
        for (path, format) in &targets {
            println!("Output: {} ({:?})", path.display(), format);
        }
        println!();
    }

    let output = match build_and_write(&cli, &base_dir, &targets) {
        Ok(output) => output,
        Err(code) => return code,
    };

    if !(cli.run || cli.watch) {
        return ExitCode::SUCCESS;
    }

    let vice_path = match &cli.vice_path {
        Some(path) => {
            if !path.exists() {
                eprintln!("Error: VICE path does not exist: {}", path.display());
                return ExitCode::from(4);
            }
            path.clone()
        }
        None => match find_vice() {
            Some(path) => path,
            None => {
                eprintln!("Error: VICE emulator not found.");
                eprintln!();
                eprintln!("Install VICE (x64sc) or specify the path with --vice-path:");
                eprintln!("  macOS:   brew install vice");
                eprintln!("  Ubuntu:  sudo apt install vice");
                eprintln!("  Manual:  --vice-path /path/to/x64sc");
                return ExitCode::from(4);
            }
        },
    };

    // VICE needs a CRT; build one on the side when only a BIN was requested.
    let crt_path = match targets.iter().find(|(_, f)| *f == OutputFormat::Crt) {
        Some((path, _)) => path.clone(),
        None => {
            let stem = cli
                .list
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("cartridge");
            let path = std::env::temp_dir().join(format!("{}.crt", stem));
            if let Err(e) = write_output(&output.image, &output.settings, &path, OutputFormat::Crt) {
                eprintln!("Error: Cannot write {}: {}", path.display(), e);
                return ExitCode::from(1);
            }
            path
        }
    };
    let crt_path = crt_path.canonicalize().unwrap_or(crt_path);

    if cli.verbose > 0 {
        println!();
        println!("VICE path: {}", vice_path.display());
        match check_vice_version(&vice_path) {
            Ok(version) => println!("VICE version: {}", version),
            Err(e) => tracing::warn!("{}", e),
        }
    }

    let mut runner = ViceRunner::new(vice_path);
    println!("Running in VICE...");
    if let Err(e) = runner.launch(&crt_path) {
        eprintln!("Error: {}", e);
        return ExitCode::from(5);
    }

    if cli.watch {
        return run_watch_loop(&cli, &base_dir, &targets, runner, &crt_path, output);
    }

    runner.wait();
    ExitCode::SUCCESS
}

/// Read the list, build the image and write every target.
///
/// Diagnostics are printed here; the error value is the exit code to use.
fn build_and_write(
    cli: &Cli,
    base_dir: &Path,
    targets: &[(PathBuf, OutputFormat)],
) -> Result<BuildOutput, ExitCode> {
    let source = std::fs::read_to_string(&cli.list).map_err(|e| {
        eprintln!("Error: Cannot read {}: {}", cli.list.display(), e);
        ExitCode::from(3)
    })?;

    let filename = cli
        .list
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("<input>");

    let output = cartbuilder::build(&source, base_dir).map_err(|e| {
        eprint!("{}", format_error(&e, &source, Some(filename)));
        ExitCode::from(1)
    })?;

    if cli.verbose > 0 {
        print_placements(&output);
    }

    // Encode every target first so a failing format leaves no files behind.
    let mut encoded = Vec::with_capacity(targets.len());
    for (path, format) in targets {
        match encode_output(&output.image, &output.settings, *format) {
            Ok(bytes) => encoded.push((path, bytes)),
            Err(e) => {
                eprintln!("Error: Cannot write {}: {}", path.display(), e);
                return Err(ExitCode::from(1));
            }
        }
    }

    for (path, bytes) in encoded {
        if let Err(e) = std::fs::write(path, bytes) {
            eprintln!("Error: Cannot write {}: {}", path.display(), e);
            return Err(ExitCode::from(1));
        }
    }

    println!(
        "Built {} -> {}",
        filename,
        targets
            .iter()
            .map(|(p, _)| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(output)
}

/// Print where every file ended up.
fn print_placements(output: &BuildOutput) {
    let geometry = output.settings.geometry();
    println!(
        "{} bytes, {} files",
        output.image.len(),
        output.placements.len()
    );
    for placement in &output.placements {
        let section = if placement.section.is_empty() {
            "-"
        } else {
            &placement.section
        };
        let duplicate = match placement.duplicate_of {
            Some(index) => format!("  (same as #{})", index),
            None => String::new(),
        };
        println!(
            "  {:<16} {:<12} {}  {:>6} bytes{}",
            placement.target,
            section,
            geometry.locate(placement.offset),
            placement.length,
            duplicate
        );
    }
    println!();
}

/// Rebuild whenever the list or one of its inputs changes.
fn run_watch_loop(
    cli: &Cli,
    base_dir: &Path,
    targets: &[(PathBuf, OutputFormat)],
    mut runner: ViceRunner,
    crt_path: &Path,
    output: BuildOutput,
) -> ExitCode {
    let mut watched = output.inputs;
    watched.push(cli.list.clone());

    let mut watcher = match InputWatcher::new(&watched) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error: Failed to create file watcher: {}", e);
            return ExitCode::from(6);
        }
    };

    println!();
    println!("Watching for changes... (Press Ctrl+C to stop)");

    loop {
        let changed = match watcher.wait_for_change() {
            Ok(path) => path,
            Err(e) => {
                eprintln!("Watch error: {}", e);
                continue;
            }
        };

        println!();
        if cli.verbose > 0 {
            println!("{} changed, rebuilding...", changed.display());
        } else {
            println!("Rebuilding...");
        }

        let output = match build_and_write(cli, base_dir, targets) {
            Ok(output) => output,
            Err(_) => {
                println!("Fix errors and save to retry.");
                continue;
            }
        };

        if !targets.iter().any(|(_, f)| *f == OutputFormat::Crt) {
            if let Err(e) = write_output(&output.image, &output.settings, crt_path, OutputFormat::Crt) {
                eprintln!("Error: Cannot write {}: {}", crt_path.display(), e);
                continue;
            }
        }

        let mut watched = output.inputs;
        watched.push(cli.list.clone());
        if let Err(e) = watcher.set_paths(&watched) {
            eprintln!("Warning: {}", e);
        }

        println!("Relaunching VICE...");
        if let Err(e) = runner.launch(crt_path) {
            eprintln!("Error: {}", e);
            println!("Fix errors and save to retry.");
            continue;
        }

        println!("Watching for changes...");
    }
}
