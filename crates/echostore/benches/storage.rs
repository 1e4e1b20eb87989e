use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use echostore::{KvStore, MemoryStore};

fn bench_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("set");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("set_1kb", |b| {
        let store = MemoryStore::new();
        let data = vec![b'x'; 1024];

        let mut counter = 0u64;
        b.iter(|| {
            black_box(store.set(&format!("key:{}", counter % 1000), &data).unwrap());
            counter += 1;
        });
    });
    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("get_1kb", |b| {
        let store = MemoryStore::new();
        let data = vec![b'x'; 1024];

        for i in 0..100 {
            store.set(&format!("key:{}", i), &data).unwrap();
        }

        b.iter(|| {
            black_box(store.get("key:50").unwrap());
        });
    });
    group.finish();
}

fn bench_incr_and_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("instrumentation");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("incr_then_rpush_pair", |b| {
        let store = MemoryStore::new();

        b.iter(|| {
            black_box(store.incr("op").unwrap());
            store
                .rpush_pair("op:inputs", b"(1,)", "op:outputs", b"key")
                .unwrap();
        });
    });
    group.finish();
}

criterion_group!(benches, bench_set, bench_get, bench_incr_and_push);
criterion_main!(benches);
