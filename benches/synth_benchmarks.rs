use bildklang::{synthesize, FrequencyTable, PixelMatrix, SessionConfig, SineTable};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

pub fn criterion_benchmark(c: &mut Criterion) {
    let config = SessionConfig::default();
    let freqs = FrequencyTable::compute(config.num_rows, config.min_frequency, config.max_frequency).unwrap();

    c.bench_function("SineTable::build() 64x64 @ 44.1kHz", |b| {
        b.iter(|| {
            SineTable::build(
                black_box(&freqs),
                config.num_cols,
                config.samples_per_frame(),
                config.sample_rate,
            )
        })
    });

    let table = SineTable::build(&freqs, config.num_cols, config.samples_per_frame(), config.sample_rate);
    let data = (0..64 * 64).map(|i| (i % 16) as u16).collect();
    let matrix = PixelMatrix::from_flat(64, 64, data).unwrap();

    c.bench_function("synthesize() 64x64 @ 44.1kHz", |b| {
        b.iter(|| synthesize(black_box(&matrix), &table, 1.0 / 15.0))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
