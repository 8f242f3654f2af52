use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use erd_renderer::config::LayoutConfig;
use erd_renderer::graph::SchemaGraph;
use erd_renderer::layout::compute_layout;
use erd_renderer::render::render_svg;
use erd_renderer::schema::parse_schema;
use erd_renderer::theme::Theme;

fn fixture(name: &str) -> &'static str {
    match name {
        "bookstore" => include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/benches/fixtures/bookstore.json"
        )),
        "saas_large" => include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/benches/fixtures/saas_large.json"
        )),
        _ => panic!("unknown fixture"),
    }
}

const FIXTURES: [&str; 2] = ["bookstore", "saas_large"];

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for name in FIXTURES {
        let input = fixture(name);
        group.bench_with_input(BenchmarkId::from_parameter(name), input, |b, data| {
            b.iter(|| {
                let schema = parse_schema(black_box(data)).expect("parse failed");
                black_box(schema.apps.len());
            });
        });
    }
    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let config = LayoutConfig::default();
    for name in FIXTURES {
        let schema = parse_schema(fixture(name)).expect("parse failed");
        let graph = SchemaGraph::build(&schema);
        group.bench_with_input(BenchmarkId::from_parameter(name), &graph, |b, graph| {
            b.iter(|| {
                let layout = compute_layout(black_box(graph), &config);
                black_box(layout.routes.len());
            });
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_svg");
    let theme = Theme::modern();
    let config = LayoutConfig::default();
    for name in FIXTURES {
        let schema = parse_schema(fixture(name)).expect("parse failed");
        let graph = SchemaGraph::build(&schema);
        let layout = compute_layout(&graph, &config);
        group.bench_with_input(BenchmarkId::from_parameter(name), &layout, |b, layout| {
            b.iter(|| {
                let svg = render_svg(&graph, black_box(layout), &theme, &config);
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

fn bench_end_to_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_to_end");
    let theme = Theme::modern();
    let config = LayoutConfig::default();
    for name in FIXTURES {
        let input = fixture(name);
        group.bench_with_input(BenchmarkId::from_parameter(name), input, |b, data| {
            b.iter(|| {
                let schema = parse_schema(black_box(data)).expect("parse failed");
                let graph = SchemaGraph::build(&schema);
                let layout = compute_layout(&graph, &config);
                let svg = render_svg(&graph, &layout, &theme, &config);
                black_box(svg.len());
            });
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_parse, bench_layout, bench_render, bench_end_to_end
);
criterion_main!(benches);
