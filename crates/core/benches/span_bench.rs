//! Benchmarks for nonce evaluation and range search

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use spanpow_core::{
    Blake2sKeyed, CancelToken, NonceEvaluator, ReducerBank, SearchRange, StringCorpus,
    nonce_search_loop, search,
};

fn corpus() -> StringCorpus {
    StringCorpus::new([
        "GET", "PUT", "POST", "HEAD", "DELETE", "PATCH", "OPTIONS", "TRACE",
    ])
    .expect("benchmark corpus is valid")
}

fn bench_evaluate(c: &mut Criterion) {
    let corpus = corpus();
    let bank = ReducerBank::standard();
    let evaluator = NonceEvaluator::new(&Blake2sKeyed, &corpus, &bank);
    let mut scratch = evaluator.scratch();

    c.bench_function("evaluate_single", |b| {
        let mut nonce: u32 = 0x9000_0000;
        b.iter(|| {
            nonce = nonce.wrapping_add(1);
            evaluator.evaluate_with(black_box(nonce), &mut scratch)
        })
    });
}

fn bench_range(c: &mut Criterion) {
    let corpus = corpus();
    let bank = ReducerBank::standard();
    let evaluator = NonceEvaluator::new(&Blake2sKeyed, &corpus, &bank);
    let range = SearchRange::new(0x9000_0000, 0x9000_0400).expect("range is valid");
    let cancel = CancelToken::new();

    c.bench_function("scan_1024_sequential", |b| {
        b.iter(|| nonce_search_loop(&evaluator, black_box(range), &cancel))
    });

    c.bench_function("scan_1024_parallel", |b| {
        b.iter(|| search(&Blake2sKeyed, &corpus, &bank, black_box(range), 4, &cancel))
    });
}

criterion_group!(benches, bench_evaluate, bench_range);
criterion_main!(benches);
