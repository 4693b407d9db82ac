use std::env;
use std::time::Instant;

use markup_rewriter::parser::parse;
use markup_rewriter::render::render_sync;
use markup_rewriter::transform::apply_sync;
use markup_rewriter::transformers::{SanitizeOptions, SwapComponents, sanitize, swap};

#[derive(Clone, Copy)]
struct RunConfig {
    warmup: usize,
    iterations: usize,
}

#[derive(Clone)]
struct Sample {
    name: &'static str,
    html: String,
    target_label: &'static str,
}

#[derive(Default, Clone)]
struct Stats {
    avg_ms: f64,
    p50_ms: f64,
    p95_ms: f64,
    p99_ms: f64,
    input_mb_per_s: f64,
}

#[derive(Default, Clone)]
struct BreakdownSummary {
    parse_ms: f64,
    transform_ms: f64,
    render_ms: f64,
    total_ms: f64,
}

const SEED: &str = concat!(
    "<article class=\"post\" data-id=\"42\">",
    "<h1>Release notes</h1>",
    "<p>Lorem <b>ipsum</b> dolor <a href=\"/x\" onclick=\"track()\">sit</a> amet.</p>",
    "<ul><li>one</li><li>two<li>three</ul>",
    "<script>window.analytics = {};</script>",
    "<custom-card><img src=\"a.png\"><span>caption</span></custom-card>",
    "<svg viewBox=\"0 0 10 10\"><path d=\"M0 0L10 10\" /></svg>",
    "<!-- generated -->",
    "</article>",
);

fn percentile_ms(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() - 1) as f64 * p).round() as usize;
    sorted[idx]
}

fn summarize(durations_s: &[f64], input_bytes: usize) -> Stats {
    let mut ms: Vec<f64> = durations_s.iter().map(|d| d * 1000.0).collect();
    ms.sort_by(|a, b| a.total_cmp(b));
    let total_s: f64 = durations_s.iter().sum();
    let avg_ms = if durations_s.is_empty() {
        0.0
    } else {
        total_s * 1000.0 / durations_s.len() as f64
    };
    let input_mb_per_s = if total_s > 0.0 {
        (input_bytes as f64 * durations_s.len() as f64) / (1024.0 * 1024.0) / total_s
    } else {
        0.0
    };

    Stats {
        avg_ms,
        p50_ms: percentile_ms(&ms, 0.50),
        p95_ms: percentile_ms(&ms, 0.95),
        p99_ms: percentile_ms(&ms, 0.99),
        input_mb_per_s,
    }
}

fn repeat_to_size(seed: &str, target_size: usize) -> String {
    let mut out = String::with_capacity(target_size + 256);
    out.push_str("<!DOCTYPE html><html><head><meta charset=\"UTF-8\"><title>bench</title></head><body>\n");
    while out.len() + seed.len() + 32 < target_size {
        out.push_str(seed);
        out.push('\n');
    }
    out.push_str("\n</body></html>\n");
    out
}

fn build_samples() -> Vec<Sample> {
    vec![
        Sample {
            name: "small",
            html: SEED.to_string(),
            target_label: "~0.4KB",
        },
        Sample {
            name: "medium",
            html: repeat_to_size(SEED, 10 * 1024),
            target_label: "~10KB",
        },
        Sample {
            name: "large",
            html: repeat_to_size(SEED, 1024 * 1024),
            target_label: "~1MB",
        },
    ]
}

fn config_for(name: &str) -> RunConfig {
    match name {
        "small" => RunConfig {
            warmup: 100,
            iterations: 3000,
        },
        "medium" => RunConfig {
            warmup: 50,
            iterations: 1000,
        },
        _ => RunConfig {
            warmup: 5,
            iterations: 40,
        },
    }
}

fn components() -> SwapComponents {
    SwapComponents::new().with("h1", "h2").with("custom-card", "div")
}

fn run_breakdown(sample: &Sample, cfg: RunConfig) -> (Stats, BreakdownSummary) {
    let transformers = [sanitize(SanitizeOptions::default()), swap(components())];

    let mut durations = Vec::with_capacity(cfg.iterations);
    let mut parse_s = 0.0;
    let mut transform_s = 0.0;
    let mut render_s = 0.0;

    for i in 0..cfg.warmup + cfg.iterations {
        let t0 = Instant::now();
        let tree = parse(&sample.html);
        let t1 = Instant::now();
        let tree = apply_sync(tree, &transformers).expect("transform failed");
        let t2 = Instant::now();
        let output = render_sync(&tree, tree.root()).expect("render failed");
        let t3 = Instant::now();
        assert!(!output.contains("<script"));

        if i >= cfg.warmup {
            parse_s += (t1 - t0).as_secs_f64();
            transform_s += (t2 - t1).as_secs_f64();
            render_s += (t3 - t2).as_secs_f64();
            durations.push((t3 - t0).as_secs_f64());
        }
    }

    let n = cfg.iterations.max(1) as f64;
    let breakdown = BreakdownSummary {
        parse_ms: parse_s * 1000.0 / n,
        transform_ms: transform_s * 1000.0 / n,
        render_ms: render_s * 1000.0 / n,
        total_ms: (parse_s + transform_s + render_s) * 1000.0 / n,
    };
    (summarize(&durations, sample.html.len()), breakdown)
}

fn print_table(results: &[(Sample, Stats, BreakdownSummary)]) {
    println!("# Pipeline Baseline (local build)");
    println!();
    println!("| Sample | Bytes | Avg ms | P50 ms | P95 ms | P99 ms | Input MB/s | parse | transform | render |");
    println!("|--------|-------|--------|--------|--------|--------|------------|-------|-----------|--------|");
    for (s, stats, b) in results {
        println!(
            "| {} ({}) | {} | {:.3} | {:.3} | {:.3} | {:.3} | {:.2} | {:.3} | {:.3} | {:.3} |",
            s.name,
            s.target_label,
            s.html.len(),
            stats.avg_ms,
            stats.p50_ms,
            stats.p95_ms,
            stats.p99_ms,
            stats.input_mb_per_s,
            b.parse_ms,
            b.transform_ms,
            b.render_ms
        );
    }
    println!();
}

fn to_json(results: &[(Sample, Stats, BreakdownSummary)]) -> serde_json::Value {
    let samples: Vec<serde_json::Value> = results
        .iter()
        .map(|(s, stats, b)| {
            serde_json::json!({
                "name": s.name,
                "bytes": s.html.len(),
                "avg_ms": stats.avg_ms,
                "p50_ms": stats.p50_ms,
                "p95_ms": stats.p95_ms,
                "p99_ms": stats.p99_ms,
                "input_mb_per_s": stats.input_mb_per_s,
                "stages": {
                    "parse_ms": b.parse_ms,
                    "transform_ms": b.transform_ms,
                    "render_ms": b.render_ms,
                    "total_ms": b.total_ms,
                },
            })
        })
        .collect();
    serde_json::json!({ "samples": samples })
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let json = args.iter().any(|a| a == "--json");
    let only = args
        .iter()
        .position(|a| a == "--single")
        .and_then(|i| args.get(i + 1).cloned());

    let mut results = Vec::new();
    for sample in build_samples() {
        if only.as_deref().is_some_and(|name| name != sample.name) {
            continue;
        }
        let (stats, breakdown) = run_breakdown(&sample, config_for(sample.name));
        results.push((sample, stats, breakdown));
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&to_json(&results)).expect("serializable")
        );
    } else {
        print_table(&results);
    }
}
