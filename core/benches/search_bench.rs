use bm25f::{Document, Engine, PrepTarget, PrepTask, RawConfig};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const WORDS: &[&str] = &[
    "index", "search", "engine", "rust", "memory", "query", "score", "field", "title", "body",
    "token", "vector", "segment", "merge", "cache", "thread", "lock", "page", "disk", "stream",
];

fn synthetic_docs(n: usize) -> Vec<Document> {
    (0..n)
        .map(|i| {
            let title: Vec<&str> = (0..3).map(|j| WORDS[(i * 7 + j) % WORDS.len()]).collect();
            let body: Vec<&str> = (0..40).map(|j| WORDS[(i * 13 + j * 3) % WORDS.len()]).collect();
            Document::new().with_field("title", title.join(" ")).with_field("body", body.join(" "))
        })
        .collect()
}

fn configured() -> Engine<usize> {
    let mut e = Engine::new();
    e.define_config(RawConfig::new().field_weight("title", 4.0).field_weight("body", 1.0))
        .expect("config");
    e.define_prep_tasks(
        vec![PrepTask::tokenize(|s| s.split_whitespace().map(str::to_string).collect())],
        PrepTarget::Default,
    )
    .expect("prep tasks");
    e
}

fn build(docs: &[Document]) -> Engine<usize> {
    let mut e = configured();
    for (i, d) in docs.iter().enumerate() {
        e.add_doc(d, i).expect("add");
    }
    e.consolidate(None).expect("consolidate");
    e
}

fn bench_build(c: &mut Criterion) {
    let docs = synthetic_docs(2_000);
    c.bench_function("ingest_and_consolidate_2k", |b| b.iter(|| build(black_box(&docs))));
}

fn bench_search(c: &mut Criterion) {
    let e = build(&synthetic_docs(10_000));
    c.bench_function("search_3_terms_10k", |b| {
        b.iter(|| e.search(black_box("rust memory cache"), Some(10)).expect("search"))
    });
}

criterion_group!(benches, bench_build, bench_search);
criterion_main!(benches);
