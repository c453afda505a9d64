//! Codec benchmarks for ripple-events.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use ripple_events::{codec, ChangeEvent, Table};
use serde_json::json;

fn post_event() -> ChangeEvent {
    ChangeEvent::insert(
        Table::Posts,
        json!({
            "id": "post-0001",
            "author_id": "user-0042",
            "content": "a".repeat(140),
            "like_count": 12,
            "comment_count": 3,
            "created_at": 1_700_000_000_000u64,
        }),
    )
}

fn bench_encode(c: &mut Criterion) {
    let event = post_event();
    let size = codec::encode(&event).unwrap().len();

    let mut group = c.benchmark_group("encode");
    group.throughput(Throughput::Bytes(size as u64));
    group.bench_function("post_insert", |b| {
        b.iter(|| codec::encode(black_box(&event)))
    });
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let encoded = codec::encode(&post_event()).unwrap();

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(encoded.len() as u64));
    group.bench_function("post_insert", |b| {
        b.iter(|| codec::decode(black_box(&encoded)))
    });
    group.finish();
}

fn bench_roundtrip(c: &mut Criterion) {
    let event = post_event();

    c.bench_function("roundtrip_post_insert", |b| {
        b.iter(|| {
            let encoded = codec::encode(black_box(&event)).unwrap();
            codec::decode(black_box(&encoded)).unwrap()
        })
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_roundtrip);
criterion_main!(benches);
