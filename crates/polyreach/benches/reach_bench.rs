//! Criterion benchmarks for the tightening pipeline.
//! Focus: minrep on random 2D polygons with m in {8, 16, 32} rows, and the
//! full recursion on a deadbeat double integrator (horizon 3; the closed loop
//! is nilpotent, so longer horizons map `W` to the origin).

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use nalgebra::{dmatrix, dvector, DMatrix, DVector};
use polyreach::reach::{reachability_matrices, FixedGains, LinearSystem};
use polyreach::{Engine, Polyhedron};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn random_polygon(m: usize, seed: u64, eng: &Engine) -> Polyhedron {
    let mut rng = StdRng::seed_from_u64(seed);
    // bounding box rows first, then random cuts around the origin
    let mut a = DMatrix::zeros(m + 4, 2);
    let mut b = DVector::from_element(m + 4, 2.0);
    a[(0, 0)] = 1.0;
    a[(1, 1)] = 1.0;
    a[(2, 0)] = -1.0;
    a[(3, 1)] = -1.0;
    for i in 4..m + 4 {
        let theta: f64 = rng.gen::<f64>() * std::f64::consts::TAU;
        a[(i, 0)] = theta.cos();
        a[(i, 1)] = theta.sin();
        b[i] = rng.gen_range(0.5..1.5);
    }
    Polyhedron::from_hrep(a, b, eng).unwrap()
}

fn bench_minrep(c: &mut Criterion) {
    let eng = Engine::default();
    let mut group = c.benchmark_group("minrep");
    for &m in &[8usize, 16, 32] {
        group.bench_with_input(BenchmarkId::new("random_polygon", m), &m, |b, &m| {
            b.iter_batched(
                || random_polygon(m, 43, &eng),
                |p| {
                    let _r = p.minrep(&eng).unwrap();
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_reach(c: &mut Criterion) {
    let eng = Engine::default();
    let sys = LinearSystem::new(
        dmatrix![1.0, 1.0; 0.0, 1.0],
        dmatrix![0.0; 1.0],
        DMatrix::identity(2, 2),
        DMatrix::zeros(2, 1),
    )
    .unwrap();
    let k = dmatrix![-1.0, -2.0];
    let w = Polyhedron::from_box(dvector![-0.1, -0.1], dvector![0.1, 0.1], &eng).unwrap();
    let y0 = Polyhedron::from_box(dvector![-2.0, -2.0], dvector![2.0, 2.0], &eng).unwrap();
    let gains = FixedGains(vec![k; 2]);
    c.bench_function("reach/double_integrator_p3", |b| {
        b.iter(|| reachability_matrices(&sys, &w, &y0, &y0, 3, &gains, &eng).unwrap())
    });
}

criterion_group!(benches, bench_minrep, bench_reach);
criterion_main!(benches);
