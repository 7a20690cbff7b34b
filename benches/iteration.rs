// Loop style benchmarks under criterion
//
// Each experiment group gets one benchmark group. Every variant is measured at
// 100k, 1M and 3M records, on a dataset regenerated outside the timed section.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use iterbench::dataset;
use iterbench::experiments::{self, ExperimentGroup};
use std::hint::black_box;

const SIZES: [usize; 3] = [100_000, 1_000_000, 3_000_000];

fn bench_group(c: &mut Criterion, experiment: &ExperimentGroup) {
    let mut group = c.benchmark_group(experiment.name());
    group.sample_size(10);

    for size in SIZES {
        if size > dataset::MAX_DATASET_LEN {
            eprintln!("skipping {} at size {size}: above dataset limit", experiment.name());
            continue;
        }
        group.throughput(Throughput::Elements(size as u64));

        for variant in experiment.variants() {
            group.bench_with_input(BenchmarkId::new(variant.label(), size), &size, |b, &size| {
                b.iter_batched_ref(
                    || dataset::generate(size),
                    |customers| match customers {
                        Ok(customers) => black_box(variant.run(black_box(customers))),
                        Err(e) => Err(e.clone()),
                    },
                    BatchSize::LargeInput,
                );
            });
        }
    }

    group.finish();
}

fn bench_all_groups(c: &mut Criterion) {
    for experiment in experiments::all_groups() {
        bench_group(c, &experiment);
    }
}

criterion_group!(benches, bench_all_groups);
criterion_main!(benches);
