//! Benchmarks for the FIFO allocator.
//!
//! ```bash
//! # Run all benchmarks
//! cargo bench
//!
//! # Run one group
//! cargo bench -- range_matcher
//! ```
//!
//! Results are saved to `target/criterion/` with HTML reports.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput};
use std::time::Duration;

use fifo_allocator::pipeline::{build_running_totals, match_partition, split_partition};
use fifo_allocator::types::quantity::SCALE;
use fifo_allocator::{AllocatorConfig, Event, FifoAllocator, StreamKind, StreamingAllocator};

// ============================================================================
// HELPER FUNCTIONS - Deterministic stream generation
// ============================================================================

/// Generate interleaved-identity streams with a seeded RNG.
fn generate_streams(count: usize, identities: usize, seed: u64) -> (Vec<Event>, Vec<Event>) {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut inputs = Vec::with_capacity(count);
    let mut outputs = Vec::with_capacity(count);

    for i in 0..count {
        let identity = format!("sku-{}", i % identities);
        let t = (i / identities) as i64;
        // Inputs slightly larger on average so most outputs are covered
        inputs.push(Event::new(identity.clone(), t, rng.gen_range(SCALE..=20 * SCALE)));
        outputs.push(Event::new(identity, t, rng.gen_range(SCALE..=18 * SCALE)));
    }

    (inputs, outputs)
}

// ============================================================================
// BENCHMARK: Pipeline stages on one identity
// ============================================================================

fn bench_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_matcher");
    group.measurement_time(Duration::from_secs(5));

    let (inputs, outputs) = generate_streams(10_000, 1, 42);
    let input_totals = build_running_totals(&inputs, StreamKind::Inputs).unwrap();
    let output_totals = build_running_totals(&outputs, StreamKind::Outputs).unwrap();

    group.bench_function("running_totals_10k", |b| {
        b.iter(|| black_box(build_running_totals(&inputs, StreamKind::Inputs).unwrap()))
    });

    group.bench_function("match_10k", |b| {
        b.iter(|| black_box(match_partition(&input_totals, &output_totals)))
    });

    let pairs = match_partition(&input_totals, &output_totals);
    group.bench_function("split_10k", |b| b.iter(|| black_box(split_partition(&pairs))));

    group.finish();
}

// ============================================================================
// BENCHMARK: Throughput
// ============================================================================

fn bench_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("throughput");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(30);

    for size in [1_000usize, 10_000, 100_000] {
        let (inputs, outputs) = generate_streams(size, 100, 7);
        group.throughput(Throughput::Elements((2 * size) as u64));

        group.bench_with_input(BenchmarkId::new("batch", size), &size, |b, _| {
            let allocator = FifoAllocator::new(AllocatorConfig::default());
            b.iter(|| black_box(allocator.allocate(&inputs, &outputs).unwrap()))
        });

        group.bench_with_input(BenchmarkId::new("streaming", size), &size, |b, &size| {
            b.iter_batched(
                || (inputs.clone(), outputs.clone()),
                |(inputs, outputs)| {
                    let mut ledger = StreamingAllocator::with_capacity(AllocatorConfig::default(), size);
                    let mut facts = 0usize;
                    for (input, output) in inputs.into_iter().zip(outputs) {
                        facts += ledger.push_input(input).unwrap().len();
                        facts += ledger.push_output(output).unwrap().len();
                    }
                    black_box(facts)
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

// ============================================================================
// CRITERION ENTRY POINT
// ============================================================================

criterion_group!(benches, bench_stages, bench_throughput);
criterion_main!(benches);
