//! Benchmarks for the CPU simulation hot path.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;

use plume::camera::{Camera, Viewport};
use plume::emitter::{EmitterConfig, ParticlePool};
use plume::field::{LatticeConfig, SpringLattice};

const DT: f32 = 1.0 / 60.0;

fn bench_lattice_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("lattice_step");

    for size in [8usize, 12, 16, 24] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            let mut lattice = SpringLattice::new(
                LatticeConfig {
                    size: (size, size, size),
                    ..Default::default()
                },
                0,
            );
            b.iter(|| {
                lattice.step(black_box(DT));
                black_box(lattice.max_displacement())
            })
        });
    }

    group.finish();
}

fn bench_field_sample(c: &mut Criterion) {
    let lattice = SpringLattice::new(LatticeConfig::default(), 0);

    c.bench_function("field_sample_4096", |b| {
        b.iter(|| {
            let mut acc = Vec3::ZERO;
            for i in 0..4096 {
                let t = i as f32 * 0.37;
                acc += lattice.sample(black_box(Vec3::new(t, t * 1.3, t * 0.7)));
            }
            black_box(acc)
        })
    });
}

fn bench_pool_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_update");

    for capacity in [1024usize, 4096, 16384] {
        group.bench_with_input(
            BenchmarkId::from_parameter(capacity),
            &capacity,
            |b, &capacity| {
                let camera = Camera::new(Viewport::new(1280.0, 720.0), 1.2);
                let lattice = SpringLattice::new(LatticeConfig::default(), 0);
                let mut pool = ParticlePool::new(
                    EmitterConfig {
                        capacity,
                        ..Default::default()
                    },
                    0,
                );
                // Fill the pool so the update walks live particles.
                for _ in 0..240 {
                    pool.update(DT, Some(&lattice), &camera);
                }
                b.iter(|| pool.update(black_box(DT), Some(&lattice), &camera))
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_lattice_step,
    bench_field_sample,
    bench_pool_update
);
criterion_main!(benches);
