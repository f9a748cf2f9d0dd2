use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use twoscale::*;

fn derive(id: &str) -> CoefficientSet {
    let spec = ProblemLibrary::builtin().spec(id).unwrap();
    Derivation::new(&NativeEngine::new(), &spec)
        .derive()
        .unwrap()
}

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("derive quadratic_1d", |b| {
        b.iter(|| black_box(derive(black_box("quadratic_1d"))))
    });
    c.bench_function("derive triple_well_2d", |b| {
        b.iter(|| black_box(derive(black_box("triple_well_2d"))))
    });

    let spec = ProblemLibrary::builtin().spec("triple_well_2d").unwrap();
    c.bench_function("generate triple_well_2d", |b| {
        b.iter(|| black_box(generate(black_box(&spec)).unwrap()))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
