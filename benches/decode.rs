use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use rg16_rs::synth::{ChannelSetSpec, FileSpec, build_file};
use rg16_rs::{DecodeOptions, SampleFormat, decode, decode_with, probe};

const CHANNELS: u32 = 24;
const SAMPLES: usize = 1000;

/// 24 channels of 1000 samples in a single channel set.
fn make_file(format: SampleFormat) -> Vec<u8> {
    let spec = FileSpec {
        extended_headers: 3,
        channel_sets: vec![ChannelSetSpec {
            format,
            ..ChannelSetSpec::float32(CHANNELS, SAMPLES)
        }],
        ..FileSpec::default()
    };
    build_file(&spec)
}

fn bench_decode(c: &mut Criterion) {
    let float32 = make_file(SampleFormat::Float32);
    let int24 = make_file(SampleFormat::Int24);
    let int32 = make_file(SampleFormat::Int32);
    let packed20 = make_file(SampleFormat::Packed20);

    let mut group = c.benchmark_group("decode");

    group.throughput(Throughput::Elements(CHANNELS as u64 * SAMPLES as u64));

    group.bench_function("float32/24x1000", |b| {
        b.iter(|| decode(black_box(&float32)).unwrap())
    });
    group.bench_function("int24/24x1000", |b| {
        b.iter(|| decode(black_box(&int24)).unwrap())
    });
    group.bench_function("int32/24x1000", |b| {
        b.iter(|| decode(black_box(&int32)).unwrap())
    });
    group.bench_function("packed20/24x1000", |b| {
        b.iter(|| decode(black_box(&packed20)).unwrap())
    });

    group.finish();
}

fn bench_headers(c: &mut Criterion) {
    let data = make_file(SampleFormat::Float32);
    let head_only = DecodeOptions::new().with_head_only(true);

    let mut group = c.benchmark_group("headers");

    group.throughput(Throughput::Elements(CHANNELS as u64));

    group.bench_function("head_only/24", |b| {
        b.iter(|| decode_with(black_box(&data), &head_only).unwrap())
    });
    group.bench_function("probe", |b| b.iter(|| probe(black_box(&data))));

    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let data = make_file(SampleFormat::Int32);
    let merge = DecodeOptions::new().with_merge(true);

    let mut group = c.benchmark_group("merge");

    group.bench_function("int32/24x1000", |b| {
        b.iter(|| decode_with(black_box(&data), &merge).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_decode, bench_headers, bench_merge);
criterion_main!(benches);
