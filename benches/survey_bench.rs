//! Survey engine benchmarks
//!
//! Run with: cargo bench --bench survey_bench
//!
//! - survey_forward: MD/AZ/INCL to MD/X/Y/TVD over growing station counts
//! - survey_inverse: TVD/DX/DY back to MD/AZ/INCL
//! - sort_rows: ordering trace-header key tuples

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use geostore::sort::sort_rows;
use geostore::survey::{md_az_incl_to_md_x_y_tvd, tvd_dx_dy_to_md_az_incl};
use geostore::AngleUnit;
use ndarray::Array2;
use std::hint::black_box;

const STATIONS: [usize; 3] = [100, 1_000, 10_000];

fn build_and_turn(n: usize) -> Array2<f64> {
    Array2::from_shape_fn((n, 3), |(i, c)| {
        let t = i as f64 / (n - 1) as f64;
        match c {
            0 => 3000.0 * t,
            1 => 30.0 + 30.0 * t,
            _ => 30.0 * t,
        }
    })
}

fn bench_forward(c: &mut Criterion) {
    let mut group = c.benchmark_group("survey_forward");
    for n in STATIONS {
        let m = build_and_turn(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &m, |b, m| {
            b.iter(|| md_az_incl_to_md_x_y_tvd(black_box(m.view()), 0.0, 0.0, AngleUnit::Degree, false))
        });
    }
    group.finish();
}

fn bench_inverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("survey_inverse");
    for n in STATIONS {
        let fwd = md_az_incl_to_md_x_y_tvd(build_and_turn(n).view(), 0.0, 0.0, AngleUnit::Degree, false);
        let mut tvd_dx_dy = Array2::<f64>::zeros((n, 3));
        tvd_dx_dy.column_mut(0).assign(&fwd.column(3));
        tvd_dx_dy.column_mut(1).assign(&fwd.column(1));
        tvd_dx_dy.column_mut(2).assign(&fwd.column(2));

        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &tvd_dx_dy, |b, m| {
            b.iter(|| tvd_dx_dy_to_md_az_incl(black_box(m.view()), false))
        });
    }
    group.finish();
}

fn bench_sort_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("sort_rows");
    for n in STATIONS {
        let rows: Vec<Vec<f64>> = (0..n)
            .map(|i| vec![(i % 97) as f64, (i * 7 % 13) as f64, (i % 5) as f64])
            .collect();
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), &rows, |b, rows| {
            b.iter(|| sort_rows(black_box(rows)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_forward, bench_inverse, bench_sort_rows);
criterion_main!(benches);
