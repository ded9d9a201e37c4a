use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mw_core::Record;
use mw_dedup::{find_duplicates, levenshtein, normalize_url};
use rand::seq::SliceRandom;
use rand::Rng;

const WORDS: &[&str] = &[
    "rust", "async", "runtime", "graph", "layout", "bookmark", "recipe", "travel", "kernel",
    "network", "storage", "design", "music", "tutorial", "guide", "release", "compiler",
];

fn generate_records(n: usize) -> Vec<Record> {
    let mut rng = rand::thread_rng();
    (0..n)
        .map(|i| {
            let title: Vec<&str> = (0..6).map(|_| *WORDS.choose(&mut rng).unwrap()).collect();
            let host = rng.gen_range(0..40);
            let page = if rng.gen_bool(0.1) { 0 } else { i };
            Record::new(format!("r{i}"), title.join(" "))
                .with_url(format!("https://www.site{host}.example.com/articles/{page}?utm_source=feed"))
        })
        .collect()
}

fn bench_find_duplicates(c: &mut Criterion) {
    let records_500 = generate_records(500);
    let records_2k = generate_records(2000);
    c.bench_function("find_duplicates_500", |b| {
        b.iter(|| black_box(find_duplicates(black_box(&records_500), 85, 80)))
    });
    c.bench_function("find_duplicates_2000", |b| {
        b.iter(|| black_box(find_duplicates(black_box(&records_2k), 85, 80)))
    });
}

fn bench_helpers(c: &mut Criterion) {
    c.bench_function("normalize_url", |b| {
        b.iter(|| black_box(normalize_url(black_box("https://www.example.com/a/b/c/?utm_source=x&q=1"))))
    });
    c.bench_function("levenshtein_64_chars", |b| {
        let a = "blog.example.com/posts/rust-ownership-guide-part-1-with-more-text";
        let z = "blog.example.com/posts/rust-borrowing-guide-part-2-with-less-text";
        b.iter(|| black_box(levenshtein(black_box(a), black_box(z))))
    });
}

criterion_group!(benches, bench_find_duplicates, bench_helpers);
criterion_main!(benches);
