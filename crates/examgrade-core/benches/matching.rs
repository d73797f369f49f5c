use criterion::{black_box, criterion_group, criterion_main, Criterion};

use examgrade_core::matcher::{is_speech_correct, levenshtein, normalize_transcript};

fn bench_levenshtein(c: &mut Criterion) {
    let mut group = c.benchmark_group("levenshtein");

    group.bench_function("word", |b| {
        b.iter(|| levenshtein(black_box("seven"), black_box("sevn")))
    });

    group.bench_function("phrase", |b| {
        b.iter(|| {
            levenshtein(
                black_box("the quick brown fox jumps over the lazy dog"),
                black_box("the quik brown fox jumped over a lazy dog"),
            )
        })
    });

    let long_a = "she sells sea shells by the sea shore ".repeat(8);
    let long_b = "she sell see shells by the sea shor ".repeat(8);
    group.bench_function("paragraph", |b| {
        b.iter(|| levenshtein(black_box(&long_a), black_box(&long_b)))
    });

    group.finish();
}

fn bench_speech_match(c: &mut Criterion) {
    let mut group = c.benchmark_group("is_speech_correct");

    group.bench_function("exact", |b| {
        b.iter(|| is_speech_correct(black_box("three"), black_box("three")))
    });

    group.bench_function("numeral", |b| {
        b.iter(|| is_speech_correct(black_box("I have 20 cats."), black_box("i have twenty cats")))
    });

    group.bench_function("normalize", |b| {
        b.iter(|| normalize_transcript(black_box("  The 3 Little-Pigs (and 100 wolves)!  ")))
    });

    group.finish();
}

criterion_group!(benches, bench_levenshtein, bench_speech_match);
criterion_main!(benches);
