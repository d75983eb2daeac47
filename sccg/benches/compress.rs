use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use sccg::_internal_test_data::{mutate, random_sequence};
use sccg::compressor::{Compressor, CompressorParams};
use sccg::decompressor::Decompressor;
use sccg::fasta::FastaRecord;
use sccg::matching::mode::SegmentPolicy;

const SEQ_LEN: usize = 1_000_000;

fn make_records() -> (FastaRecord, FastaRecord) {
    let reference = random_sequence(SEQ_LEN, 1337);
    let target = mutate(&reference, 0.001, 42);

    (
        FastaRecord::new("target", 60, target),
        FastaRecord::new("reference", 60, reference),
    )
}

fn compress_1m_local(c: &mut Criterion) {
    let (target, reference) = make_records();
    let params = CompressorParams::builder()
        .small_input_len(0)
        .medium_policy(SegmentPolicy::MEDIUM)
        .build();

    c.bench_function("Compress 1M bases in local mode", |b| {
        b.iter_batched_ref(
            Vec::new,
            |data| {
                Compressor::with_params(params.clone())
                    .compress(&target, &reference, data)
                    .unwrap();
            },
            BatchSize::LargeInput,
        )
    });
}

fn compress_1m_global(c: &mut Criterion) {
    let (target, reference) = make_records();
    let params = CompressorParams::builder()
        .small_input_len(usize::MAX)
        .build();

    c.bench_function("Compress 1M bases in global mode", |b| {
        b.iter_batched_ref(
            Vec::new,
            |data| {
                Compressor::with_params(params.clone())
                    .compress(&target, &reference, data)
                    .unwrap();
            },
            BatchSize::LargeInput,
        )
    });
}

fn decompress_1m(c: &mut Criterion) {
    let (target, reference) = make_records();
    let mut transcript = Vec::new();
    Compressor::new()
        .compress(&target, &reference, &mut transcript)
        .unwrap();

    c.bench_function("Decompress 1M bases", |b| {
        b.iter(|| {
            let record = Decompressor::new()
                .decompress(transcript.as_slice(), &reference)
                .unwrap();
            assert_eq!(record.len(), target.len());
        })
    });
}

criterion_group!(benches, compress_1m_local, compress_1m_global, decompress_1m);
criterion_main!(benches);
