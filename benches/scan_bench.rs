// Copyright (c) 2026 Bountyy Oy. All rights reserved.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kehys::dom::parse_html;
use kehys::{find_frame_locators, BrowserConfig, ScanInput, Scanner};

/// Page with `depth` levels of srcdoc frames, three siblings per level
fn nested_page(depth: usize) -> String {
    let mut html = String::from("<p>Quarterly <b>WMS</b> report</p>");
    for level in (1..=depth).rev() {
        let escaped = html.replace('&', "&amp;").replace('"', "&quot;");
        html = format!(
            r#"<div><h2>Level {level}</h2><iframe id="f{level}" srcdoc="{inner}"></iframe><iframe title="ad {level}"></iframe><iframe name="n{level}" srcdoc="<p>filler</p>"></iframe></div>"#,
            level = level,
            inner = escaped
        );
    }
    html
}

fn html_parsing_benchmark(c: &mut Criterion) {
    let html = nested_page(6);

    c.bench_function("parse_nested_page", |b| {
        b.iter(|| black_box(parse_html(black_box(&html)).map(|doc| doc.frames().len())))
    });
}

fn scan_benchmark(c: &mut Criterion) {
    let Ok(rt) = tokio::runtime::Runtime::new() else {
        return;
    };
    let input = ScanInput::Html(nested_page(6));

    c.bench_function("scan_and_search_nested_page", |b| {
        b.iter(|| {
            rt.block_on(async {
                let Ok(mut scanner) = Scanner::native(BrowserConfig::for_testing()) else {
                    return;
                };
                let report = scanner.scan(&input, Some("WMS")).await;
                black_box(report.map(|r| r.total_matches()).unwrap_or(0));
                scanner.close().await;
            })
        })
    });
}

fn markup_benchmark(c: &mut Criterion) {
    let html = nested_page(6);

    c.bench_function("static_frame_lookup", |b| {
        b.iter(|| black_box(find_frame_locators(&html, "wms").map(|p| p.len())))
    });
}

criterion_group!(benches, html_parsing_benchmark, scan_benchmark, markup_benchmark);
criterion_main!(benches);
