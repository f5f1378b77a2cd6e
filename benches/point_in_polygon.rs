use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use aisgraph::{Domain, Zone};

/// Grid of `side × side` one-degree square zones starting at `(-30, 30)`.
fn grid_domain(side: usize) -> Domain {
    let zones = (0..side * side)
        .map(|k| {
            let x0 = -30.0 + (k % side) as f64;
            let y0 = 30.0 + (k / side) as f64;
            Zone::from_coords(
                format!("Z{}", k + 1),
                &[x0, x0, x0 + 1.0, x0 + 1.0],
                &[y0, y0 + 1.0, y0 + 1.0, y0],
            )
            .unwrap()
        })
        .collect();
    Domain::new("grid", zones).unwrap()
}

/// Containment queries over the domain extent, with half of the points outside.
fn bench_point_in_polygon(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_in_polygon");
    let samples = 10_000usize;

    for side in [1usize, 4, 16] {
        let domain = grid_domain(side);
        let extent = 2.0 * side as f64;
        let mut rng = StdRng::seed_from_u64(0xA15_6A7);

        group.bench_with_input(BenchmarkId::from_parameter(side * side), &domain, |b, d| {
            b.iter_batched(
                || {
                    (0..samples)
                        .map(|_| {
                            (
                                -30.0 + rng.random_range(0.0..extent),
                                30.0 + rng.random_range(0.0..extent),
                            )
                        })
                        .collect::<Vec<_>>()
                },
                |points| {
                    for (x, y) in points {
                        black_box(d.point_in_polygon(black_box(x), black_box(y)));
                    }
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_point_in_polygon);
criterion_main!(benches);
