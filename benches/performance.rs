//! Performance benchmarks for cx-rules
//!
//! These benchmarks measure the performance of key operations:
//! - File walking over generated project trees
//! - Pattern compilation and matching
//! - Full resolution with attribution, end-to-end
//!
//! ## Running Benchmarks
//!
//! To run all benchmarks:
//! ```bash
//! cargo bench
//! ```
//!
//! To run specific benchmarks:
//! ```bash
//! cargo bench file_walking
//! cargo bench pattern_matching
//! cargo bench resolution
//! ```
//!
//! ## Expected Performance Characteristics
//!
//! ### File Walking
//! - Scales linearly with the number of files
//! - Only the directories inclusion patterns can reach are walked
//!
//! ### Pattern Matching
//! - Patterns are compiled once per resolution
//! - `**` patterns cost more than anchored single-segment globs
//!
//! ### Resolution
//! - Matching runs in parallel across files (rayon)
//! - Attribution is a single pass over the matched candidates

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use cx_rules::engine::NoGitignore;
use cx_rules::engine::file_walker::FileWalker;
use cx_rules::matcher::Pattern;
use cx_rules::{ContextEngine, StaticWorkspace};
use std::fs;
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

/// Create a project tree with `count` files spread over nested packages
fn create_project(count: usize) -> TempDir {
    let temp_dir = TempDir::new().unwrap();

    for i in 0..count {
        let dir = temp_dir
            .path()
            .join(format!("pkg{}", i % 10))
            .join(format!("sub{}", i % 3));
        fs::create_dir_all(&dir).unwrap();
        let name = if i % 4 == 0 {
            format!("file{}_test.go", i)
        } else {
            format!("file{}.go", i)
        };
        fs::write(dir.join(name), format!("package pkg\n\n// file {}\n", i)).unwrap();
    }
    fs::create_dir_all(temp_dir.path().join("docs")).unwrap();
    fs::write(temp_dir.path().join("docs/README.md"), "# docs\n").unwrap();

    temp_dir
}

fn sample_paths(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("pkg{}/sub{}/file{}.go", i % 10, i % 3, i))
        .collect()
}

// ============================================================================
// File Walking Benchmarks
// ============================================================================

fn bench_file_walking(c: &mut Criterion) {
    let mut group = c.benchmark_group("file_walking");

    for file_count in [100, 500, 1000].iter() {
        let temp_dir = create_project(*file_count);
        group.throughput(Throughput::Elements(*file_count as u64));

        group.bench_with_input(
            BenchmarkId::from_parameter(file_count),
            file_count,
            |b, _| {
                b.iter(|| {
                    let walker = FileWalker::new(temp_dir.path());
                    black_box(walker.collect_files().unwrap())
                });
            },
        );
    }

    group.finish();
}

// ============================================================================
// Pattern Matching Benchmarks
// ============================================================================

fn bench_pattern_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_matching");
    let paths = sample_paths(1000);
    group.throughput(Throughput::Elements(paths.len() as u64));

    for raw in ["*.go", "pkg1/sub1/*.go", "**/sub2/**/*_test.go", "pkg1"] {
        let pattern = Pattern::new(raw).unwrap();
        group.bench_with_input(BenchmarkId::new("match", raw), &pattern, |b, pattern| {
            b.iter(|| paths.iter().filter(|p| pattern.is_match(p)).count());
        });
    }

    group.bench_function("compile", |b| {
        b.iter(|| Pattern::new(black_box("src/**/handlers/*_test.go")).unwrap());
    });

    group.finish();
}

// ============================================================================
// Resolution Benchmarks
// ============================================================================

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");
    group.sample_size(10);

    let rules = "**/*.go\n!*_test.go\npkg1/**\n!pkg2\n---\ndocs/**\n";

    for file_count in [100, 500, 1000].iter() {
        let temp_dir = create_project(*file_count);
        let workspace = StaticWorkspace::default();
        let engine = ContextEngine::new(temp_dir.path(), &workspace)
            .with_oracle(Box::new(NoGitignore));

        group.throughput(Throughput::Elements(*file_count as u64));
        group.bench_with_input(
            BenchmarkId::new("with_attribution", file_count),
            file_count,
            |b, _| {
                b.iter(|| black_box(engine.resolve_files_with_attribution(rules).unwrap()));
            },
        );
        group.bench_with_input(
            BenchmarkId::new("context", file_count),
            file_count,
            |b, _| {
                b.iter(|| black_box(engine.resolve_context_text(rules).unwrap()));
            },
        );
    }

    group.finish();
}

criterion_group!(file_benches, bench_file_walking);

criterion_group!(matcher_benches, bench_pattern_matching);

criterion_group!(resolution_benches, bench_resolution);

criterion_main!(file_benches, matcher_benches, resolution_benches);
