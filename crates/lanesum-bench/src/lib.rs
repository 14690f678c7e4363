//! Criterion benchmark cases for the lanesum summation kernels.
//!
//! One [`SumCase`] per kernel, registered in a fixed order (`sum`,
//! `sum_vec`, `sum_vec_helper`) so that a fixed seed reproduces the same
//! input bytes for every case:
//!
//! - [`sum_kernels`]: registers all three cases in one Criterion group
//! - [`SeedConfig`]: optional seed from `LANESUM_RAND_SEED`
//! - [`init_tracing`]: stderr `tracing` subscriber filtered by `RUST_LOG`

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod case;
pub mod config;
mod telemetry;

use criterion::measurement::Measurement;
use criterion::{BenchmarkGroup, Criterion, Throughput};
use lanesum_core::{BufferFiller, Kernel, Scalar, Vector, VectorHelper};
use tracing::debug;

pub use case::{BlackBox, Retain, SumCase};
pub use config::{BenchConfig, ConfigError, SeedConfig};
pub use telemetry::init_tracing;

/// Register one kernel's case with `group`.
///
/// The case is built once, outside the timed region; each measured
/// iteration is exactly one [`SumCase::iterate`]. Buffers are freed when
/// this function returns.
pub fn bench_case<K, M>(group: &mut BenchmarkGroup<'_, M>, kernel: K, filler: &mut BufferFiller)
where
    K: Kernel,
    M: Measurement,
{
    let name = kernel.name();
    let mut case = SumCase::new(kernel, filler);
    group.bench_function(name, |b| b.iter(|| case.iterate(&mut BlackBox)));
    debug!(kernel = name, observed = ?case.observed(), "case finished");
}

/// Register the scalar, vector, and vector-via-helper cases.
pub fn sum_kernels(c: &mut Criterion, config: &BenchConfig) {
    let mut filler = config.seed.filler();
    let mut group = c.benchmark_group(config.group_name.as_str());
    group.throughput(Throughput::Bytes(config.bytes_per_iteration()));

    bench_case(&mut group, Scalar, &mut filler);
    bench_case(&mut group, Vector, &mut filler);
    bench_case(&mut group, VectorHelper, &mut filler);

    group.finish();
}
