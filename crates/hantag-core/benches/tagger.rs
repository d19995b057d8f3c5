use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use hantag_core::params::Preanalyzed;
use hantag_core::{ParameterStore, Search, Tagger};

fn bench_params() -> ParameterStore {
    let words: &[(&str, &str, f64)] = &[
        ("Noun", "이것", 1.0),
        ("Noun", "예문", 1.5),
        ("Noun", "학교", 2.0),
        ("Noun", "오늘", 1.8),
        ("Noun", "날씨", 1.7),
        ("Noun", "친구", 1.6),
        ("Josa", "은", 1.0),
        ("Josa", "는", 1.0),
        ("Josa", "에", 1.2),
        ("Josa", "가", 0.9),
        ("Josa", "와", 0.8),
        ("Adjective", "이", 0.5),
        ("Adjective", "좋", 1.1),
        ("Verb", "가", 0.8),
        ("Verb", "먹", 1.0),
        ("Verb", "하", 0.9),
        ("Eomi", "ㅂ니다", 1.0),
        ("Eomi", "다", 0.5),
        ("Eomi", "았다", 1.0),
        ("Eomi", "네요", 0.7),
        ("Eomi", "어요", 0.9),
    ];
    let mut builder = ParameterStore::builder()
        .transition("BOS", "Noun", 0.6)
        .transition("Noun", "Josa", 1.0)
        .transition("Josa", "Noun", 0.5)
        .transition("Josa", "Verb", 0.7)
        .transition("Josa", "Adjective", 0.4)
        .transition("Adjective", "Eomi", 1.0)
        .transition("Verb", "Eomi", 1.0)
        .transition("Eomi", "EOS", 0.8)
        .preanalyzed(
            "갔다",
            Preanalyzed {
                stem: "가".into(),
                ending: "았다".into(),
                stem_tag: "Verb".into(),
                ending_tag: "Eomi".into(),
            },
        );
    for &(tag, word, weight) in words {
        builder = builder.word(tag, word, weight);
    }
    builder.build().expect("bench model")
}

static INPUTS: &[(&str, &str)] = &[
    ("short", "예문입니다"),
    ("medium", "오늘은 날씨가 좋네요"),
    ("long", "이것은 예문입니다 오늘은 친구와 학교에 갔다 날씨가 좋네요"),
];

fn bench_exact(c: &mut Criterion) {
    let tagger = Tagger::with_search(bench_params(), Search::Exact);
    let mut group = c.benchmark_group("tagger/exact");
    for &(label, sentence) in INPUTS {
        group.bench_with_input(
            BenchmarkId::new(label, sentence.chars().count()),
            &sentence,
            |b, &sentence| {
                b.iter(|| tagger.tag(sentence, true));
            },
        );
    }
    group.finish();
}

fn bench_beam(c: &mut Criterion) {
    let tagger = Tagger::with_search(bench_params(), Search::Beam(5));
    let mut group = c.benchmark_group("tagger/beam");
    for &(label, sentence) in INPUTS {
        group.bench_with_input(
            BenchmarkId::new(label, sentence.chars().count()),
            &sentence,
            |b, &sentence| {
                b.iter(|| tagger.tag(sentence, true));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_exact, bench_beam);
criterion_main!(benches);
