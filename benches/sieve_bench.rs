use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use primesieve::bootstrap::SmallPrimes;
use primesieve::sieve::SegmentSieve;
use primesieve::sink::Count;
use primesieve::{count_up_to, list_first_n, nth_prime};

fn bench_count_up_to_1m(c: &mut Criterion) {
    c.bench_function("count_up_to(1_000_000)", |b| {
        b.iter(|| count_up_to(black_box(1_000_000)));
    });
}

fn bench_list_first_10k(c: &mut Criterion) {
    c.bench_function("list_first_n(10_000)", |b| {
        b.iter(|| list_first_n(black_box(10_000)));
    });
}

fn bench_nth_prime_100k(c: &mut Criterion) {
    c.bench_function("nth_prime(100_000)", |b| {
        b.iter(|| nth_prime(black_box(100_000)));
    });
}

fn bench_segment_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("count 10M by segment size");
    group.sample_size(10);
    for segment_size in [4_096usize, 32_768, 262_144] {
        group.bench_with_input(
            BenchmarkId::from_parameter(segment_size),
            &segment_size,
            |b, &size| {
                b.iter(|| {
                    let mut sink = Count::default();
                    SegmentSieve::new(size).run(black_box(10_000_000), &mut sink);
                    sink.count()
                });
            },
        );
    }
    group.finish();
}

fn bench_bootstrap_growth(c: &mut Criterion) {
    c.bench_function("SmallPrimes grow to 1_000_000", |b| {
        b.iter(|| {
            let mut small = SmallPrimes::new();
            small.ensure_sieved_to(black_box(1_000_000), 0).len()
        });
    });
}

criterion_group!(
    benches,
    bench_count_up_to_1m,
    bench_list_first_10k,
    bench_nth_prime_100k,
    bench_segment_sizes,
    bench_bootstrap_growth,
);
criterion_main!(benches);
