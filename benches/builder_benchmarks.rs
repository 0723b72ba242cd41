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

//! Performance benchmarks for CartBuilder.
//!
//! Run with: cargo bench
//!
//! Results are saved to target/criterion/ with HTML reports.

use cartbuilder::cart::{Builder, RomMode};
use cartbuilder::content::relocate;
use cartbuilder::{BuildSettings, FileSettings};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

// ============================================================================
// Benchmark Inputs
// ============================================================================

/// A build list with `files` entries and one directory per kind.
fn build_list(files: usize) -> String {
    let mut list = String::from("CARTRIDGE { banks = 8; name = \"BENCH\"; }\n");
    list.push_str("PATCHES boot { 00:0:0000 = boot.bin, fill = 0; }\n");
    list.push_str("FILES games {\n    option: hasload = true, roms = both;\n");
    list.push_str("    file: BANKS = banklow:games, offset = 00:1:0000;\n");
    list.push_str("    file: FS = easyfs:games, offset = 00:1:0100;\n");
    for i in 0..files {
        list.push_str(&format!("    file: \"GAME {}\" = game{}.prg, roms = low;\n", i, i));
    }
    list.push_str("}\n");
    list
}

/// File sizes that leave awkward gaps.
fn file_sizes(count: usize) -> Vec<usize> {
    (0..count).map(|i| 0x100 + (i * 0x2F3) % 0x1800).collect()
}

/// A BASIC program with `lines` lines of ten token bytes each.
fn basic_program(lines: usize) -> Vec<u8> {
    let mut data = vec![0x01, 0x08];
    for i in 0..lines {
        data.extend_from_slice(&[0x01, 0x01]);
        data.extend_from_slice(&(i as u16).to_le_bytes());
        data.extend_from_slice(&[0x99; 10]);
        data.push(0);
    }
    data.extend_from_slice(&[0, 0]);
    data
}

// ============================================================================
// Lexer and Parser Benchmarks
// ============================================================================

fn bench_frontend(c: &mut Criterion) {
    let mut group = c.benchmark_group("frontend");

    for files in [10, 100, 1000] {
        let source = build_list(files);
        group.throughput(Throughput::Bytes(source.len() as u64));

        group.bench_with_input(BenchmarkId::new("tokenize", files), &source, |b, src| {
            b.iter(|| cartbuilder::lexer::tokenize(black_box(src)))
        });

        let tokens = cartbuilder::lexer::tokenize(&source).unwrap();
        group.bench_with_input(BenchmarkId::new("parse", files), &tokens, |b, tokens| {
            b.iter(|| cartbuilder::parser::parse(black_box(tokens)))
        });
    }

    group.finish();
}

// ============================================================================
// Placement Benchmarks
// ============================================================================

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("update");

    for count in [16, 64, 256] {
        let sizes = file_sizes(count);
        group.throughput(Throughput::Bytes(sizes.iter().sum::<usize>() as u64));

        group.bench_with_input(BenchmarkId::new("files", count), &sizes, |b, sizes| {
            b.iter(|| {
                let mut builder = Builder::new(BuildSettings::default());
                for (i, &size) in sizes.iter().enumerate() {
                    let settings = FileSettings {
                        mode: if i % 3 == 0 { RomMode::Low } else { RomMode::Both },
                        ..FileSettings::default()
                    };
                    builder.write_file(settings, vec![i as u8; size]);
                }
                builder.export().unwrap()
            })
        });
    }

    group.finish();
}

// ============================================================================
// Content Benchmarks
// ============================================================================

fn bench_relocate(c: &mut Criterion) {
    let program = basic_program(1000);
    let mut group = c.benchmark_group("content");
    group.throughput(Throughput::Bytes(program.len() as u64));
    group.bench_function("relocate", |b| {
        b.iter(|| relocate(black_box(&program), 0x1001, true))
    });
    group.finish();
}

criterion_group!(benches, bench_frontend, bench_update, bench_relocate);
criterion_main!(benches);
