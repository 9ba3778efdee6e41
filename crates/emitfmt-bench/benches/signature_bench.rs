//! Signature extraction and checking benchmarks.

use criterion::{Criterion, criterion_group, criterion_main};
use emitfmt_core::{check_signature, extract_signature};

const FMT: &str = "[%s] %*d of %lld at %.2f (%p) %c%%";

fn bench_extract(c: &mut Criterion) {
    c.bench_function("signature_extract", |b| {
        b.iter(|| criterion::black_box(extract_signature(FMT, 16)));
    });
}

fn bench_check(c: &mut Criterion) {
    let expected = match extract_signature(FMT, 16) {
        Ok(tags) => tags,
        Err(err) => panic!("benchmark format must be valid: {err}"),
    };
    c.bench_function("signature_check", |b| {
        b.iter(|| criterion::black_box(check_signature(FMT, &expected)));
    });
}

criterion_group!(benches, bench_extract, bench_check);
criterion_main!(benches);
