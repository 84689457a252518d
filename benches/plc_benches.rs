use criterion::{black_box, criterion_group, criterion_main, Criterion};

use omron_fins_channel::{bcd, FinsRequest, FinsResponse, MemoryArea, NodeIdentity};

fn read_response(words: usize) -> Vec<u8> {
    let mut raw = vec![0xC0, 0x00, 0x02, 0x00, 0x21, 0x00, 0x00, 0x0A, 0x00, 0x05, 0x01, 0x01, 0x00, 0x00];
    raw.extend((0..words).flat_map(|i| (i as u16).to_be_bytes()));
    raw
}

fn bench_encode(c: &mut Criterion) {
    let nodes = NodeIdentity::new(0x21, 0x0A);
    let values: Vec<i16> = (0..996).map(|i| i as i16).collect();

    c.bench_function("encode read_words", |b| {
        b.iter(|| FinsRequest::read_words(MemoryArea::DM, black_box(100), 999).to_bytes(nodes, 5))
    });
    c.bench_function("encode write_words 996", |b| {
        b.iter(|| FinsRequest::write_words(MemoryArea::DM, 0, black_box(&values)).to_bytes(nodes, 5))
    });
}

fn bench_decode(c: &mut Criterion) {
    let request = FinsRequest::read_words(MemoryArea::DM, 0, 999);
    let raw = read_response(999);

    c.bench_function("decode read 999 words", |b| {
        b.iter(|| {
            let response = FinsResponse::decode(black_box(&raw), &request, Some(5)).unwrap();
            response.to_words(999).unwrap()
        })
    });
}

fn bench_bcd(c: &mut Criterion) {
    c.bench_function("bcd decode 4 bytes", |b| {
        b.iter(|| bcd::decode(black_box(&[0x78, 0x56, 0x34, 0x12])).unwrap())
    });
    c.bench_function("bcd encode 4 bytes", |b| {
        b.iter(|| bcd::encode(black_box(12_345_678), 4))
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_bcd);
criterion_main!(benches);
