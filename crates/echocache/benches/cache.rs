use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use echocache::{InstrumentedCache, Result, WebCache};
use echostore::MemoryStore;

fn bench_instrumented_store(c: &mut Criterion) {
    let mut group = c.benchmark_group("instrumented_store");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("store_1kb", |b| {
        let cache = InstrumentedCache::new(MemoryStore::new()).unwrap();
        let data = vec![b'x'; 1024];

        b.iter(|| {
            black_box(cache.store(data.clone()).unwrap());
        });
    });

    group.finish();
}

fn bench_retrieve(c: &mut Criterion) {
    let mut group = c.benchmark_group("retrieve");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("retrieve_text", |b| {
        let cache = InstrumentedCache::new(MemoryStore::new()).unwrap();

        let keys: Vec<String> = (0..100)
            .map(|i| cache.store(format!("value {}", i)).unwrap())
            .collect();

        let mut counter = 0;
        b.iter(|| {
            black_box(cache.retrieve_text(&keys[counter % 100]).unwrap());
            counter += 1;
        });
    });

    group.finish();
}

fn bench_cached_page(c: &mut Criterion) {
    let mut group = c.benchmark_group("web_cache");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_page_hit", |b| {
        let body = "x".repeat(4096);
        let web = WebCache::new(MemoryStore::new(), move |_: &str| -> Result<String> {
            Ok(body.clone())
        });

        // Warm the cache
        web.get_page("http://bench").unwrap();

        b.iter(|| {
            black_box(web.get_page("http://bench").unwrap());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_instrumented_store,
    bench_retrieve,
    bench_cached_page
);
criterion_main!(benches);
