//! Group-law benchmarks on a 35-bit test curve.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use num_bigint::BigInt;
use weierstrass::{AffinePoint, Curve, Scratch};

fn test_curve() -> (Curve, AffinePoint) {
    let curve = Curve::new(
        BigInt::from(894),
        BigInt::from(25),
        "34359738319".parse().unwrap(),
    );
    let base = AffinePoint::new(
        "33330187885".parse().unwrap(),
        "31061820662".parse().unwrap(),
    );
    (curve, base)
}

fn bench_point(c: &mut Criterion) {
    let (curve, base) = test_curve();
    let other = curve.double_and_add(&base, &BigInt::from(12_345u32));
    let mut scratch = Scratch::new();
    let mut out = AffinePoint::identity();

    let mut group = c.benchmark_group("point");

    group.bench_function("add", |b| {
        b.iter(|| {
            curve.add_into(&mut out, black_box(&base), black_box(&other), &mut scratch);
        })
    });

    let k: BigInt = "34359484338".parse().unwrap();
    group.bench_function("double_and_add", |b| {
        b.iter(|| {
            curve.double_and_add_into(&mut out, black_box(&base), black_box(&k), &mut scratch);
        })
    });

    group.finish();
}

criterion_group!(benches, bench_point);
criterion_main!(benches);
