use commons_graph::graph::{LiveGraphStore, Node, RawEdge, RawGraph};
use commons_graph::merge::{MergeEngine, MultiEdgeLayout};
use commons_graph::resolve::resolve_sources;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

const EDGE_TYPES: [&str; 4] = ["knows", "maintainer", "contributor", "memberOf"];

/// People, projects and a ring of typed edges, several per pair
fn synthetic_graph(size: usize, offset: usize) -> RawGraph {
    let mut nodes = Vec::with_capacity(size);
    for i in 0..size {
        let id = if i % 3 == 0 {
            format!("project:{}", i + offset)
        } else {
            format!("person:{}", i + offset)
        };
        nodes.push(Node::new(id, format!("Entity{}", i + offset)));
    }

    let mut links = Vec::with_capacity(size * 2);
    for i in 0..size {
        let source = &nodes[i].id;
        let target = &nodes[(i + 1) % size].id;
        links.push(RawEdge::new(source.clone(), target.clone(), EDGE_TYPES[i % 4]));
        links.push(RawEdge::new(target.clone(), source.clone(), EDGE_TYPES[(i + 1) % 4]));
    }
    RawGraph::new(nodes, links)
}

/// Benchmark a merge into an empty store
fn bench_initial_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("initial_merge");

    for size in [100, 1000, 10_000].iter() {
        let candidate = synthetic_graph(*size, 0);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let mut store = LiveGraphStore::new();
                let report = MergeEngine::new().merge(&mut store, &candidate);
                criterion::black_box(report);
            });
        });
    }
    group.finish();
}

/// Benchmark re-merging an unchanged candidate (the steady state)
fn bench_noop_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("noop_merge");

    for size in [100, 1000, 10_000].iter() {
        let candidate = synthetic_graph(*size, 0);
        let engine = MergeEngine::new();
        let mut store = LiveGraphStore::new();
        engine.merge(&mut store, &candidate);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                criterion::black_box(engine.merge(&mut store, &candidate));
            });
        });
    }
    group.finish();
}

/// Benchmark toggling a second source on and off
fn bench_source_toggle(c: &mut Criterion) {
    let mut group = c.benchmark_group("source_toggle");

    for size in [100, 1000].iter() {
        let a = synthetic_graph(*size, 0);
        let b = synthetic_graph(*size, *size / 2);
        let both = resolve_sources([&a, &b]);
        let only_a = resolve_sources([&a]);
        let engine = MergeEngine::new();
        let mut store = LiveGraphStore::new();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |bench, _| {
            bench.iter(|| {
                engine.merge(&mut store, &both);
                engine.merge(&mut store, &only_a);
            });
        });
    }
    group.finish();
}

/// Benchmark the multi-edge layout pass
fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("multi_edge_layout");

    for size in [100, 1000, 10_000].iter() {
        let mut store = LiveGraphStore::new();
        MergeEngine::new().merge(&mut store, &synthetic_graph(*size, 0));
        let layout = MultiEdgeLayout::default();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                criterion::black_box(layout.apply(&mut store));
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_initial_merge,
    bench_noop_merge,
    bench_source_toggle,
    bench_layout
);
criterion_main!(benches);
