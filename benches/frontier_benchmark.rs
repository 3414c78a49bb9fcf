use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use lanepipe::apps::{bfs, pagerank, PageRankConfig};
use lanepipe::{CsrGraph, GhostToken, LaunchConfig, NodeId, Pipe};

/// Power-law-ish graph: node `i` gets roughly `n / (i + 1)` out-edges.
fn skewed_graph(n: usize) -> CsrGraph {
    let mut adjacency = vec![Vec::new(); n];
    for (i, nbrs) in adjacency.iter_mut().enumerate() {
        let degree = (n / (i + 1)).clamp(1, n);
        for j in 0..degree {
            nbrs.push((i * 31 + j * 17 + 1) % n);
        }
    }
    CsrGraph::from_adjacency(&adjacency)
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipe_compress");
    for teams in [1usize, 4, 16] {
        let config = LaunchConfig::for_lanes(teams, 32, 8);
        group.bench_with_input(BenchmarkId::from_parameter(teams), &teams, |b, &teams| {
            GhostToken::new(|mut token| {
                let pipe = Pipe::new(&config, 1 << 16, 1 << 14);
                b.iter(|| {
                    pipe.initialize(&mut token);
                    for i in 0..(1 << 15) {
                        let node: NodeId = (i * 7) % (1 << 14);
                        pipe.push(&token, i % teams, node);
                    }
                    black_box(pipe.compress(&mut token));
                });
            });
        });
    }
    group.finish();
}

fn bench_bfs(c: &mut Criterion) {
    let graph = skewed_graph(4096);
    let mut group = c.benchmark_group("bfs_skewed_4096");
    group.sample_size(10);
    for (name, config) in [
        ("fine_only", LaunchConfig::for_lanes(4, 32, 8).with_thresholds(usize::MAX, usize::MAX)),
        ("three_tier", LaunchConfig::for_lanes(4, 32, 8)),
    ] {
        group.bench_function(name, |b| b.iter(|| black_box(bfs(&graph, 0, config).unwrap())));
    }
    group.finish();
}

fn bench_pagerank(c: &mut Criterion) {
    let graph = skewed_graph(1024);
    let mut group = c.benchmark_group("pagerank_skewed_1024");
    group.sample_size(10);
    let params = PageRankConfig {
        max_iterations: Some(10),
        ..PageRankConfig::default()
    };
    group.bench_function("ten_levels", |b| {
        b.iter(|| black_box(pagerank(&graph, LaunchConfig::for_lanes(4, 16, 4), params).unwrap()));
    });
    group.finish();
}

criterion_group!(benches, bench_compress, bench_bfs, bench_pagerank);
criterion_main!(benches);
