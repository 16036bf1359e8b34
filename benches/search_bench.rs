use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tempfile::TempDir;

use lexis::{Index, IndexSearcher, IndexWriter};

const WORDS: [&str; 16] = [
    "muscle", "pain", "ache", "schwann", "cell", "epidemic", "nerve", "tissue", "chronic",
    "acute", "fiber", "sheath", "myelin", "axon", "cramp", "spasm",
];

fn make_docs(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            format!(
                "{} {} {} report {}",
                WORDS[i % WORDS.len()],
                WORDS[(i * 7 + 3) % WORDS.len()],
                WORDS[(i * 11 + 5) % WORDS.len()],
                i
            )
        })
        .collect()
}

fn build_index(count: usize) -> Index {
    IndexWriter::default().build(make_docs(count)).unwrap()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for &count in &[1_000usize, 10_000] {
        let docs = make_docs(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &docs, |b, docs| {
            b.iter(|| IndexWriter::default().build(black_box(docs)).unwrap());
        });
    }
    group.finish();
}

fn bench_entry_points(c: &mut Criterion) {
    let counts = [1_000usize, 10_000, 50_000];
    let indexes: Vec<(usize, Index)> = counts.iter().map(|&n| (n, build_index(n))).collect();

    let mut group = c.benchmark_group("search");
    for (count, index) in &indexes {
        let searcher = IndexSearcher::new(index);

        group.bench_with_input(BenchmarkId::new("prefix", count), count, |b, _| {
            b.iter(|| searcher.prefix_search(black_box("my")).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("wildcard", count), count, |b, _| {
            b.iter(|| searcher.wildcard_search(black_box("s?ea")).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("query", count), count, |b, _| {
            b.iter(|| {
                searcher
                    .query_search(black_box("(muscle OR nerve) AND pain -chronic"))
                    .unwrap()
            });
        });
        group.bench_with_input(BenchmarkId::new("fuzzy", count), count, |b, _| {
            b.iter(|| searcher.fuzzy_search(black_box("miscle")).unwrap());
        });
    }
    group.finish();
}

fn bench_snapshot(c: &mut Criterion) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bench.lexis");
    let index = build_index(10_000);
    index.save(&path).unwrap();

    let mut group = c.benchmark_group("snapshot");
    group.bench_function("save_10000", |b| {
        b.iter(|| index.save(black_box(&path)).unwrap());
    });
    group.bench_function("open_10000", |b| {
        b.iter(|| Index::open(black_box(&path)).unwrap());
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_entry_points, bench_snapshot);
criterion_main!(benches);
