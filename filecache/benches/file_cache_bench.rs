use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use filecache::FileCache;
use std::fs;
use std::hint::black_box;
use std::sync::Arc;
use tempfile::TempDir;

const THRESHOLD: u64 = 2 * 1024 * 1024;

fn bench_update(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(FileCache::new(THRESHOLD));

    let mut group = c.benchmark_group("file_cache_update");
    for size in [1024usize, 64 * 1024, 1024 * 1024] {
        let path = dir.path().join(format!("update-{size}"));
        fs::write(&path, vec![0u8; size]).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), &path, |b, path| {
            b.to_async(&rt).iter(|| async {
                cache.update(black_box(path)).await.unwrap();
            });
        });
    }
    group.finish();
}

fn bench_get_buffered(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(FileCache::new(THRESHOLD));
    let path = dir.path().join("buffered");
    fs::write(&path, vec![1u8; 64 * 1024]).unwrap();
    rt.block_on(cache.update(&path)).unwrap();

    c.bench_function("file_cache_get_buffered", |b| {
        b.to_async(&rt).iter(|| async {
            let (reader, _) = cache.get(black_box(&path)).await.unwrap();
            reader.read_to_vec().await.unwrap();
        });
    });
}

fn bench_get_streamed(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(FileCache::new(THRESHOLD));
    let path = dir.path().join("streamed");
    fs::write(&path, vec![2u8; 4 * 1024 * 1024]).unwrap();
    rt.block_on(cache.update(&path)).unwrap();

    c.bench_function("file_cache_get_streamed", |b| {
        b.to_async(&rt).iter(|| async {
            let (reader, _) = cache.get(black_box(&path)).await.unwrap();
            reader.read_to_vec().await.unwrap();
        });
    });
}

fn bench_identify(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let dir = TempDir::new().unwrap();
    let cache = Arc::new(FileCache::new(THRESHOLD));

    let paths: Vec<_> = (0..100)
        .map(|i| {
            let path = dir.path().join(format!("file-{i}"));
            fs::write(&path, b"content").unwrap();
            path
        })
        .collect();
    rt.block_on(async {
        for path in &paths {
            cache.update(path).await.unwrap();
        }
    });

    c.bench_function("file_cache_identify", |b| {
        b.to_async(&rt).iter(|| async {
            cache.identify(black_box(&paths[42])).await;
        });
    });
}

criterion_group!(
    benches,
    bench_update,
    bench_get_buffered,
    bench_get_streamed,
    bench_identify
);
criterion_main!(benches);
