use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tacview_common::Ecef;

fn setup() -> (Ecef, Vec<Ecef>) {
    let origin = Ecef::from_geodetic(48.573174, 2.319671, 1000.0);
    let field = (0..1000)
        .map(|i| {
            let i = i as f64;
            Ecef::from_geodetic(48.5 + i * 1e-4, 2.3 + i * 1e-4, 500.0 + i)
        })
        .collect();
    (origin, field)
}

fn ecef_from_geodetic(c: &mut Criterion) {
    c.bench_function("ecef::from_geodetic", |b| {
        b.iter(|| {
            black_box(Ecef::from_geodetic(
                black_box(48.573174),
                black_box(2.319671),
                black_box(1000.0),
            ));
        })
    });
}

fn ecef_dist(c: &mut Criterion) {
    let (origin, field) = setup();
    let other = field[500];

    c.bench_function("ecef::dist", |b| {
        b.iter(|| {
            black_box(origin.dist(black_box(&other)));
        })
    });
}

fn ecef_dist_arr(c: &mut Criterion) {
    let (origin, field) = setup();

    c.bench_function("ecef::dist_arr/1000", |b| {
        b.iter(|| {
            black_box(origin.dist_arr(black_box(&field)));
        })
    });
}

fn ecef_nearest(c: &mut Criterion) {
    let (origin, field) = setup();

    c.bench_function("ecef::nearest/1000", |b| {
        b.iter(|| {
            black_box(origin.nearest(black_box(&field)));
        })
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default();
    targets = ecef_from_geodetic, ecef_dist, ecef_dist_arr, ecef_nearest
}

criterion_main!(benches);
