use criterion::{black_box, criterion_group, criterion_main, Criterion};
use geecache::byte_view::ByteView;
use geecache::lru::ByteLru;

fn fill(cache: &mut ByteLru<String, ByteView>, n: usize) {
    for i in 0..n {
        cache.add(format!("key-{i}"), ByteView::new(b"some cached value"));
    }
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("ByteLru");

    group.bench_function("add under budget", |b| {
        b.iter(|| {
            let mut cache: ByteLru<String, ByteView> = ByteLru::new(1 << 20);
            fill(&mut cache, black_box(1000));
        });
    });

    group.bench_function("add with steady eviction", |b| {
        b.iter(|| {
            let mut cache: ByteLru<String, ByteView> = ByteLru::new(4096);
            fill(&mut cache, black_box(1000));
        });
    });

    group.bench_function("get hit", |b| {
        let mut cache: ByteLru<String, ByteView> = ByteLru::new(1 << 20);
        fill(&mut cache, 1000);
        b.iter(|| black_box(cache.get(black_box("key-500"))));
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
