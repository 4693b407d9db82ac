//! Benchmarks for parse, transform and render.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use markup_rewriter::parser::parse;
use markup_rewriter::selector::Selector;
use markup_rewriter::transform::transform_sync;
use markup_rewriter::transformers::{SanitizeOptions, SwapComponents, sanitize, swap};

/// Generate a document with `sections` articles of `items` list entries each.
fn generate_markup(sections: usize, items: usize) -> String {
    let mut html = String::with_capacity(sections * (120 + items * 40));
    html.push_str("<!DOCTYPE html><html><body>");
    for i in 0..sections {
        html.push_str(&format!("<article id=\"s{i}\"><h1 class=\"title\">Section {i}</h1><ul>"));
        for j in 0..items {
            html.push_str(&format!("<li class=\"item\" data-n=\"{j}\">entry <b>{j}</b></li>"));
        }
        html.push_str("</ul><script>track()</script></article>");
    }
    html.push_str("</body></html>");
    html
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_by_size");
    for (sections, items) in [(5, 5), (50, 10), (200, 20)] {
        let html = generate_markup(sections, items);
        group.throughput(Throughput::Bytes(html.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("markup", format!("{sections}s_{items}i")),
            &html,
            |b, html| b.iter(|| parse(black_box(html))),
        );
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let tree = parse(&generate_markup(50, 10));
    let selector = Selector::parse("article > ul li.item:not(:first-child)").unwrap();
    c.bench_function("select_all_complex", |b| {
        b.iter(|| selector.select_all(&tree, tree.root()));
    });
}

fn bench_transform(c: &mut Criterion) {
    let html = generate_markup(50, 10);
    c.bench_function("sanitize_swap_render", |b| {
        b.iter(|| {
            let transformers = [
                sanitize(SanitizeOptions::default()),
                swap(SwapComponents::new().with("h1", "h2").with("b", "strong")),
            ];
            transform_sync(black_box(html.as_str()), &transformers).unwrap()
        });
    });
}

criterion_group!(benches, bench_parse, bench_query, bench_transform);
criterion_main!(benches);
