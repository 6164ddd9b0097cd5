//! Benchmarks for pattern compilation and matching

use arex::{Regexp, Span};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_compile_simple(c: &mut Criterion) {
    c.bench_function("compile_literal", |b| {
        b.iter(|| Regexp::new(black_box("hello world")).unwrap())
    });
}

fn bench_compile_structured(c: &mut Criterion) {
    let pattern = r"\(?([0-9]{3})\)?[ -]?([0-9]{3})-?([0-9]{4})";
    c.bench_function("compile_phone_pattern", |b| {
        b.iter(|| Regexp::new(black_box(pattern)).unwrap())
    });
}

fn bench_match_literal(c: &mut Criterion) {
    let re = Regexp::new("status_[0-9]+").unwrap();
    // Fresh String per iteration defeats the cache; this measures the
    // executor itself.
    let candidates: Vec<String> = (0..64).map(|i| format!("status_{}", i)).collect();

    c.bench_function("match_uncached", |b| {
        let mut i = 0;
        b.iter(|| {
            let candidate = &candidates[i % candidates.len()];
            i += 1;
            re.matches(black_box(candidate))
        })
    });
}

fn bench_match_cached(c: &mut Criterion) {
    let re = Regexp::new("([a-z]+)@([a-z]+)\\.([a-z]+)").unwrap();
    let candidate = String::from("alice@example.com");
    re.matches(&candidate); // warm

    c.bench_function("subexpression_queries_cached", |b| {
        b.iter(|| {
            let user = re.subexpression_range(1, black_box(&candidate));
            let host = re.subexpression_range(2, black_box(&candidate));
            (user, host)
        })
    });
}

fn bench_match_units(c: &mut Criterion) {
    let re = Regexp::new("[0-9]{4}-[0-9]{2}-[0-9]{2}").unwrap();
    let units: Vec<u16> = "2026-08-27".encode_utf16().collect();
    let range = Span::new(0, units.len());

    c.bench_function("match_units", |b| {
        b.iter(|| re.matches_units(black_box(&units), range))
    });
}

fn bench_scan_with_prefix_primitive(c: &mut Criterion) {
    // Free search built on the anchored primitive, the way callers do it.
    let re = Regexp::new("[0-9]+").unwrap();
    let text = "the 3 quick foxes jumped over 17 lazy dogs in 2026";
    let units: Vec<u16> = text.encode_utf16().collect();

    c.bench_function("scan_anchored_offsets", |b| {
        b.iter(|| {
            let mut hits = 0;
            let mut start = 0;
            while start < units.len() {
                match re.match_at(black_box(&units), Span::new(start, units.len() - start)) {
                    Some(spans) => {
                        let whole = spans[0].unwrap();
                        hits += 1;
                        start = whole.end().max(start + 1);
                    }
                    None => start += 1,
                }
            }
            hits
        })
    });
}

fn bench_backtracking_alternation(c: &mut Criterion) {
    let re = Regexp::new("(foo|bar|baz|qux)+-end").unwrap();
    let candidate = "foobarbazquxfoobar-end";

    c.bench_function("alternation_backtracking", |b| {
        b.iter(|| {
            let units: Vec<u16> = candidate.encode_utf16().collect();
            re.matches_units(black_box(&units), Span::new(0, units.len()))
        })
    });
}

fn bench_ignore_case(c: &mut Criterion) {
    let re = Regexp::with_ignore_case("[a-z]+ [a-z]+ [a-z]+", true).unwrap();
    let units: Vec<u16> = "MiXeD CaSe TeXt".encode_utf16().collect();
    let range = Span::new(0, units.len());

    c.bench_function("match_ignore_case", |b| {
        b.iter(|| re.matches_units(black_box(&units), range))
    });
}

criterion_group!(
    benches,
    bench_compile_simple,
    bench_compile_structured,
    bench_match_literal,
    bench_match_cached,
    bench_match_units,
    bench_scan_with_prefix_primitive,
    bench_backtracking_alternation,
    bench_ignore_case,
);
criterion_main!(benches);
