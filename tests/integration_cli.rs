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

//! End-to-end CLI integration tests.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn cargo_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_cartbuilder"))
}

const LIST: &str = r#"
CARTRIDGE { banks = 1; name = "CLI TEST"; }
PATCHES { 00:0:0000 = boot.bin; }
FILES { file: GAME = game.bin; }
"#;

/// Write the standard list and its inputs into `dir`.
fn setup(dir: &Path) -> std::path::PathBuf {
    fs::write(dir.join("boot.bin"), [0xEA; 8]).unwrap();
    fs::write(dir.join("game.bin"), [0x42; 32]).unwrap();
    let list = dir.join("list.txt");
    fs::write(&list, LIST).unwrap();
    list
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Test --help flag.
#[test]
fn test_help_flag() {
    let output = cargo_bin()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cartbuilder") || stdout.contains("CartBuilder"));
    assert!(stdout.contains("--output"));
    assert!(stdout.contains("--verbose"));
    assert!(stdout.contains("--watch"));
}

/// Test --version flag.
#[test]
fn test_version_flag() {
    let output = cargo_bin()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("cartbuilder"));
    assert!(stdout.contains("0.1.0"));
}

/// Test that both default outputs land next to the list.
#[test]
fn test_default_outputs() {
    let dir = tempdir().unwrap();
    let list = setup(dir.path());

    let output = cargo_bin().arg(&list).output().expect("Failed to execute command");
    assert!(output.status.success(), "Build failed: {}", stderr(&output));

    let bin = fs::read(dir.path().join("@-output.bin")).unwrap();
    assert_eq!(bin.len(), 0x4000);
    assert_eq!(&bin[..8], &[0xEA; 8]);
    assert_eq!(&bin[8..10], &[0x42, 0x42]);

    let crt = fs::read(dir.path().join("@-output.crt")).unwrap();
    assert_eq!(&crt[..16], b"C64 CARTRIDGE   ");
    assert_eq!(&crt[0x20..0x28], b"CLI TEST");
}

/// Test that a format that cannot be encoded leaves no outputs behind.
#[test]
fn test_unencodable_crt_writes_nothing() {
    let dir = tempdir().unwrap();
    let list = dir.path().join("list.txt");
    fs::write(&list, "CARTRIDGE { banks = 1; banksize = $10000; }").unwrap();

    let output = cargo_bin().arg(&list).output().expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("@-output.crt"));
    assert!(!dir.path().join("@-output.bin").exists());
    assert!(!dir.path().join("@-output.crt").exists());
}

/// Test that -o writes only the requested format.
#[test]
fn test_explicit_crt_output() {
    let dir = tempdir().unwrap();
    let list = setup(dir.path());
    let out = dir.path().join("game.crt");

    let output = cargo_bin()
        .arg(&list)
        .arg("-o")
        .arg(&out)
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success(), "Build failed: {}", stderr(&output));

    let crt = fs::read(&out).unwrap();
    assert_eq!(crt.len(), 0x40 + 2 * (0x10 + 0x2000));
    assert!(!dir.path().join("@-output.bin").exists());
    assert!(!dir.path().join("@-output.crt").exists());
}

/// Test BIN output through -o.
#[test]
fn test_explicit_bin_output() {
    let dir = tempdir().unwrap();
    let list = setup(dir.path());
    let out = dir.path().join("game.BIN");

    let output = cargo_bin()
        .arg(&list)
        .arg("--output")
        .arg(&out)
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success(), "Build failed: {}", stderr(&output));
    assert_eq!(fs::read(&out).unwrap().len(), 0x4000);
}

/// Test that an unknown output extension is a usage error.
#[test]
fn test_unknown_output_extension() {
    let dir = tempdir().unwrap();
    let list = setup(dir.path());

    let output = cargo_bin()
        .arg(&list)
        .arg("-o")
        .arg(dir.path().join("game.prg"))
        .output()
        .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Unknown output format"));
}

/// Test that a missing list is reported.
#[test]
fn test_missing_list() {
    let dir = tempdir().unwrap();

    let output = cargo_bin()
        .arg(dir.path().join("nothing.txt"))
        .output()
        .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("Cannot read"));
}

/// Test that build errors print a diagnostic and write nothing.
#[test]
fn test_build_error() {
    let dir = tempdir().unwrap();
    let list = dir.path().join("bad.txt");
    fs::write(&list, "CARTRIDGE { colour = 1; }").unwrap();

    let output = cargo_bin().arg(&list).output().expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(1));

    let err = stderr(&output);
    assert!(err.contains("E111"), "stderr: {}", err);
    assert!(err.contains("colour"));
    assert!(!dir.path().join("@-output.bin").exists());
    assert!(!dir.path().join("@-output.crt").exists());
}

/// Test that -v prints the placement map.
#[test]
fn test_verbose_placements() {
    let dir = tempdir().unwrap();
    let list = setup(dir.path());

    let output = cargo_bin()
        .arg(&list)
        .arg("-v")
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success(), "Build failed: {}", stderr(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("GAME"));
    assert!(stdout.contains("00:0:0008"));
    assert!(stdout.contains("32 bytes"));
}

/// Test that a bad VICE path fails after the build.
#[test]
fn test_run_with_invalid_vice_path() {
    let dir = tempdir().unwrap();
    let list = setup(dir.path());

    let output = cargo_bin()
        .arg(&list)
        .arg("--run")
        .arg("--vice-path")
        .arg(dir.path().join("no-such-vice"))
        .output()
        .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(4));
    assert!(dir.path().join("@-output.crt").exists());
}
