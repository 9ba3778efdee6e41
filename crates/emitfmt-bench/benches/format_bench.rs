//! Rendering benchmarks.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use emitfmt_core::{Arg, ArgCursor, BufferSink, StringSink, measure, render};

const MIXED: &str = "%s: %5d items, %08.3f avg, %#x flags, %-10s|";

fn mixed_args() -> [Arg<'static>; 5] {
    [
        Arg::Str(b"queue"),
        Arg::Int(1234),
        Arg::Double(-17.625),
        Arg::Int(0xbeef),
        Arg::Str(b"ok"),
    ]
}

fn bench_integers(c: &mut Criterion) {
    let mut group = c.benchmark_group("integer");
    for (name, fmt) in [("decimal", "%d"), ("hex_alt", "%#x"), ("octal", "%o"), ("binary", "%b")] {
        group.bench_with_input(BenchmarkId::new(name, fmt), &fmt, |b, fmt| {
            let args = [Arg::Int(-123_456_789)];
            b.iter(|| {
                let mut sink = StringSink::new();
                let len = render(&mut sink, fmt, &mut ArgCursor::new(&args));
                criterion::black_box((len, sink));
            });
        });
    }
    group.finish();
}

fn bench_floats(c: &mut Criterion) {
    let values: &[f64] = &[0.5, 3.141_592_653_589_793, 6.02e23, 1e-300];
    let mut group = c.benchmark_group("float");
    for fmt in ["%f", "%.3e", "%g"] {
        for &v in values {
            group.bench_with_input(BenchmarkId::new(fmt, v), &v, |b, &v| {
                let args = [Arg::Double(v)];
                b.iter(|| {
                    let mut sink = StringSink::new();
                    let len = render(&mut sink, fmt, &mut ArgCursor::new(&args));
                    criterion::black_box((len, sink));
                });
            });
        }
    }
    group.finish();
}

fn bench_sinks(c: &mut Criterion) {
    let args = mixed_args();
    let mut group = c.benchmark_group("sink");

    group.bench_function("string", |b| {
        b.iter(|| {
            let mut sink = StringSink::new();
            let len = render(&mut sink, MIXED, &mut ArgCursor::new(&args));
            criterion::black_box((len, sink));
        });
    });

    group.bench_function("buffer_truncating", |b| {
        let mut storage = [0u8; 16];
        b.iter(|| {
            let mut sink = BufferSink::new(&mut storage);
            let len = render(&mut sink, MIXED, &mut ArgCursor::new(&args));
            criterion::black_box(len);
        });
    });

    group.bench_function("measure", |b| {
        b.iter(|| criterion::black_box(measure(MIXED, &args)));
    });

    group.finish();
}

criterion_group!(benches, bench_integers, bench_floats, bench_sinks);
criterion_main!(benches);
