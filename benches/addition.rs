use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::{SeedableRng, rngs::StdRng};
use tensoradd::{Strategies, Tensor};

fn workload(length: usize) -> (Tensor, Tensor) {
    let mut rng = StdRng::seed_from_u64(0);
    let mut a = Tensor::create(&[length as i64]).expect("create failed");
    let mut b = Tensor::create(&[length as i64]).expect("create failed");
    a.random_fill_with(&mut rng).expect("fill failed");
    b.random_fill_with(&mut rng).expect("fill failed");
    (a, b)
}

fn bench_addition(c: &mut Criterion) {
    let mut group = c.benchmark_group("addition");

    for &length in &[1_000usize, 100_000, 1_000_000] {
        let (a, b) = workload(length);

        for strategy in Strategies::all(None) {
            // Skip strategies that cannot run here, e.g. the native kernel without a C compiler
            if strategy.add(a.buffer(), b.buffer()).is_err() {
                continue;
            }

            group.bench_with_input(
                BenchmarkId::new(strategy.name(), length),
                &(&a, &b),
                |bench, (a, b)| {
                    bench.iter(|| {
                        strategy
                            .add(black_box(a.buffer()), black_box(b.buffer()))
                            .expect("add failed")
                    })
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_addition);
criterion_main!(benches);
