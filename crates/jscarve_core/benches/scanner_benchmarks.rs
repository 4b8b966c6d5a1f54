use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use jscarve_core::extract::match_to_closing_brace;
use jscarve_core::scanner::Scanner;

const PLAYER: &str = include_str!("../tests/fixtures/player.js");

// ---------------------------------------------------------------------------
// Raw tokenisation throughput
// ---------------------------------------------------------------------------

fn bench_tokenize(c: &mut Criterion) {
    c.bench_function("tokenize_player_fixture", |b| {
        b.iter(|| Scanner::tokenize_all(black_box(PLAYER)).unwrap());
    });

    c.bench_function("balance_check_player_fixture", |b| {
        b.iter(|| Scanner::new(black_box(PLAYER)).is_balanced());
    });
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

fn bench_extract(c: &mut Criterion) {
    c.bench_function("extract_scramble_function", |b| {
        b.iter(|| match_to_closing_brace(black_box(PLAYER), black_box("Mda=function")).unwrap());
    });
}

// ---------------------------------------------------------------------------
// Group & main
// ---------------------------------------------------------------------------

criterion_group!(benches, bench_tokenize, bench_extract);
criterion_main!(benches);
