//! Benchmarks for the cube model and the layer-by-layer solver.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cubist::cube::{parse_moves, Cube};
use cubist::pieces::Color;
use cubist::solver::solve;

const SCRAMBLE: &str = "R U2 F' D B2 L U' R2 D' F L2 B U D2 R' F2 U2 L' B' D";

/// Benchmark a complete solve of a fixed 20-move scramble.
fn bench_solve(c: &mut Criterion) {
    let scramble = parse_moves(SCRAMBLE).unwrap();

    c.bench_function("solve_scramble", |b| {
        b.iter(|| {
            let mut cube = Cube::solved();
            cube.apply_all(black_box(&scramble));
            solve(&mut cube).unwrap()
        })
    });
}

/// Benchmark applying a batch of face turns.
fn bench_turns(c: &mut Criterion) {
    let moves = parse_moves(SCRAMBLE).unwrap();

    c.bench_function("apply_twenty_turns", |b| {
        b.iter(|| {
            let mut cube = Cube::solved();
            cube.apply_all(black_box(&moves));
            cube
        })
    });
}

/// Benchmark locating a piece by its color set.
fn bench_find_piece(c: &mut Criterion) {
    let mut cube = Cube::solved();
    cube.apply_all(&parse_moves(SCRAMBLE).unwrap());

    c.bench_function("find_piece", |b| {
        b.iter(|| {
            cube.find_piece(black_box(&[Color::Red, Color::Green, Color::Yellow]))
                .unwrap()
                .pos()
        })
    });
}

criterion_group!(benches, bench_solve, bench_turns, bench_find_piece);
criterion_main!(benches);
