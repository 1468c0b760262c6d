//! # Allocation Path Benchmark
//!
//! Measures the cost of each allocation path for one value:
//! 1. `Box` (global allocator baseline)
//! 2. `Exclusive` on a default-alignment-safe type (default path)
//! 3. `Exclusive` / `AlignedBox` on an over-aligned type (aligned path)
//! 4. Raw `allocate_aligned` / `free_aligned` at growing alignments

#![allow(missing_docs)]
#![allow(unsafe_code)]

use aligned_memory::{allocate_aligned, free_aligned, AlignedBox, Exclusive, Shared};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

#[derive(Clone, Copy, Default)]
#[repr(C)]
struct Vec4 {
    v: [f32; 4],
}

#[derive(Clone, Copy, Default)]
#[repr(C, align(64))]
struct CacheLine {
    v: [f32; 16],
}

fn bench_handles(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_value");

    group.bench_function("box_vec4", |b| {
        b.iter(|| black_box(Box::new(black_box(Vec4::default()))));
    });

    group.bench_function("exclusive_vec4", |b| {
        b.iter(|| black_box(Exclusive::new(black_box(Vec4::default()))));
    });

    group.bench_function("exclusive_cache_line", |b| {
        b.iter(|| black_box(Exclusive::new(black_box(CacheLine::default()))));
    });

    group.bench_function("aligned_box_vec4", |b| {
        b.iter(|| black_box(AlignedBox::new(black_box(Vec4::default()))));
    });

    group.bench_function("shared_cache_line", |b| {
        b.iter(|| black_box(Shared::new(black_box(CacheLine::default()))));
    });

    group.finish();
}

fn bench_raw(c: &mut Criterion) {
    let mut group = c.benchmark_group("raw_allocate_aligned");

    for align in [16usize, 64, 256, 4096] {
        group.bench_with_input(BenchmarkId::new("alloc_free", align), &align, |b, &align| {
            b.iter(|| {
                let p = allocate_aligned(black_box(256), align, 1);
                // SAFETY: `p` came from allocate_aligned just above.
                unsafe { free_aligned(black_box(p)) };
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_handles, bench_raw);
criterion_main!(benches);
