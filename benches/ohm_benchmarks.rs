use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ohmcalc::*;

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for input in ["4700", "4K7", "1.5m", "250mA", "4.7 kΩ", "1,000,000"] {
        group.bench_with_input(BenchmarkId::from_parameter(input), input, |b, input| {
            b.iter(|| parse(black_box(input)).unwrap());
        });
    }

    group.finish();
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve");

    let two_known = KnownSet::new()
        .with(Quantity::Voltage, 5.0)
        .with(Quantity::Resistance, 10.0);
    let branching = KnownSet::new()
        .with(Quantity::Resistance, 10.0)
        .with(Quantity::Power, 2.5);
    let all_known = KnownSet {
        voltage: Some(5.0),
        current: Some(0.5),
        resistance: Some(10.0),
        power: Some(2.5),
    };

    group.bench_function("two_known", |b| b.iter(|| solve(black_box(&two_known)).unwrap()));
    group.bench_function("resistance_power", |b| b.iter(|| solve(black_box(&branching)).unwrap()));
    group.bench_function("all_known", |b| b.iter(|| solve(black_box(&all_known)).unwrap()));

    group.finish();
}

fn bench_format(c: &mut Criterion) {
    let mut group = c.benchmark_group("format");

    group.bench_function("engineering", |b| b.iter(|| format_engineering(black_box(4700.0), 4)));
    group.bench_function("current_smart", |b| b.iter(|| format_current_smart(black_box(0.0005))));
    group.bench_function("watts_decimal", |b| b.iter(|| format_watts_decimal(black_box(0.5))));

    group.finish();
}

criterion_group!(benches, bench_parse, bench_solve, bench_format);
criterion_main!(benches);
