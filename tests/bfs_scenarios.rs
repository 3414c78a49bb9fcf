use lanepipe::apps::{bfs, bfs_with_capacity, reference_bfs};
use lanepipe::{CsrGraph, FrontierError, GhostToken, LaunchConfig, LevelDriver, NodeId};
use proptest::prelude::*;

fn diamond() -> CsrGraph {
    CsrGraph::from_edges(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]).unwrap()
}

#[test]
fn tiny_bfs_fine_tier_only_any_grid_shape() {
    let graph = diamond();
    for (teams, team_size, subgroup_size) in [(1, 1, 1), (1, 2, 1), (2, 2, 2), (3, 4, 2), (4, 8, 4), (2, 32, 8)] {
        for fine in [1, 2, 5] {
            let config = LaunchConfig::for_lanes(teams, team_size, subgroup_size)
                .with_thresholds(100, 100)
                .with_fine_grain_capacity(fine);
            let run = bfs(&graph, 0, config).unwrap();
            assert_eq!(
                run.levels,
                vec![Some(0), Some(1), Some(1), Some(2)],
                "teams={teams} team_size={team_size} fine={fine}"
            );
        }
    }
}

#[test]
fn hub_and_spokes_through_every_tier() {
    // 0 -> 1..=40 (team tier), each spoke -> 6 second-ring nodes (sub-group tier),
    // second ring -> one sink each (fine tier).
    let mut edges: Vec<(NodeId, NodeId)> = (1..=40).map(|v| (0, v)).collect();
    for spoke in 1..=40 {
        for k in 0..6 {
            edges.push((spoke, 41 + (spoke * 6 + k) % 120));
        }
    }
    for ring in 41..161 {
        edges.push((ring, 161 + ring % 7));
    }
    let graph = CsrGraph::from_edges(168, &edges).unwrap();
    let config = LaunchConfig::for_lanes(3, 8, 4).with_thresholds(4, 8);
    let run = bfs(&graph, 0, config).unwrap();
    assert_eq!(run.levels, reference_bfs(&graph, 0));
    assert_eq!(run.depth(), Some(3));
}

#[test]
fn undersized_frontier_matches_unbounded_run() {
    let edges: Vec<(NodeId, NodeId)> = (1..=12).map(|v| (0, v)).chain((1..=12).map(|v| (v, 13))).collect();
    let graph = CsrGraph::from_edges(14, &edges).unwrap();
    let config = LaunchConfig::for_lanes(2, 4, 2);

    let unbounded = bfs_with_capacity(&graph, 0, config, 64).unwrap();
    let tight = bfs_with_capacity(&graph, 0, config, 11).unwrap();
    assert_eq!(unbounded.stats.retries, 0);
    assert!(tight.stats.retries > 0);
    assert_eq!(tight.levels, unbounded.levels);
    assert_eq!(tight.stats.levels, unbounded.stats.levels);
}

fn star(spokes: usize) -> CsrGraph {
    let edges: Vec<(NodeId, NodeId)> = (1..=spokes).map(|v| (0, v)).collect();
    CsrGraph::from_edges(spokes + 1, &edges).unwrap()
}

#[test]
fn single_hub_completes_under_default_launch_config() {
    for spokes in [100, 1000] {
        let graph = star(spokes);
        let run = bfs(&graph, 0, LaunchConfig::default()).unwrap();
        assert_eq!(run.levels, reference_bfs(&graph, 0), "spokes={spokes}");
        assert!(run.stats.retries > LaunchConfig::default().max_retries);
    }
}

#[test]
fn wide_grid_single_hub_completes() {
    let graph = star(1000);
    let run = bfs(&graph, 0, LaunchConfig::for_lanes(8, 32, 8)).unwrap();
    assert_eq!(run.reached(), 1001);
}

#[test]
fn power_law_graph_completes_in_every_tier_mix() {
    // Node `i` has about `n / (i + 1)` out-edges, so node 0 reaches every node.
    let n = 4096;
    let adjacency: Vec<Vec<NodeId>> = (0..n)
        .map(|i| (0..(n / (i + 1)).max(1)).map(|j| (i * 31 + j * 17 + 1) % n).collect())
        .collect();
    let graph = CsrGraph::from_adjacency(&adjacency);
    let expected = reference_bfs(&graph, 0);
    for config in [
        LaunchConfig::for_lanes(4, 32, 8),
        LaunchConfig::for_lanes(4, 32, 8).with_thresholds(usize::MAX, usize::MAX),
    ] {
        assert_eq!(bfs(&graph, 0, config).unwrap().levels, expected);
    }
}

#[test]
fn exhausted_retries_surface_as_an_error() {
    let edges: Vec<(NodeId, NodeId)> = (1..=30).map(|v| (0, v)).collect();
    let graph = CsrGraph::from_edges(31, &edges).unwrap();
    let config = LaunchConfig::for_lanes(2, 4, 2).with_max_retries(0);
    assert_eq!(
        bfs_with_capacity(&graph, 0, config, 4),
        Err(FrontierError::RetryLimit { level: 0, retries: 0 })
    );
}

#[test]
fn driver_level_cap_is_reported() {
    struct Nothing;
    impl<'brand> lanepipe::LevelProgram<'brand> for Nothing {
        fn run_level(
            &mut self,
            _: usize,
            _: &GhostToken<'brand>,
            _: &lanepipe::Pipe<'brand>,
        ) -> lanepipe::Result<lanepipe::PassOutcome> {
            Ok(lanepipe::PassOutcome::Complete)
        }
    }
    let config = LaunchConfig::for_lanes(1, 2, 1);
    GhostToken::new(|mut token| {
        let pipe = lanepipe::Pipe::new(&config, 2, 2);
        pipe.initialize(&mut token);
        pipe.seed(&mut token, &[1]).unwrap();
        let stats = LevelDriver::new(&config)
            .with_max_levels(0)
            .run(&mut token, &pipe, &mut Nothing)
            .unwrap();
        assert!(stats.hit_level_cap);
        assert_eq!(stats.passes, 0);
    });
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn matches_serial_bfs_on_random_graphs(
        (n, edges) in (1usize..60).prop_flat_map(|n| (Just(n), proptest::collection::vec((0..n, 0..n), 0..300))),
        start_pick in any::<usize>(),
        teams in 1usize..4,
        shortfall in 0usize..2,
    ) {
        let graph = CsrGraph::from_edges(n, &edges).unwrap();
        let start = start_pick % n;
        let config = LaunchConfig::for_lanes(teams, 4, 2).with_max_retries(64);
        let expected = reference_bfs(&graph, start);
        // Every level must fit; how it splits across partitions is up to the retries.
        let mut widths = vec![0usize; n];
        for level in expected.iter().flatten() {
            widths[*level] += 1;
        }
        let widest = widths.into_iter().max().unwrap_or(1);
        let run = bfs_with_capacity(&graph, start, config, widest.saturating_sub(shortfall)).unwrap();
        prop_assert_eq!(run.levels, expected);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn hub_graphs_match_serial_bfs_with_default_retry_budget(
        (n, hub_edges, edges) in (8usize..200).prop_flat_map(|n| (
            Just(n),
            proptest::collection::vec(1..n, 0..n),
            proptest::collection::vec((0..n, 0..n), 0..100),
        )),
        teams in 1usize..5,
    ) {
        let all: Vec<(NodeId, NodeId)> = hub_edges.iter().map(|&v| (0, v)).chain(edges).collect();
        let graph = CsrGraph::from_edges(n, &all).unwrap();
        let config = LaunchConfig::for_lanes(teams, 4, 2);
        prop_assert_eq!(config.max_retries, LaunchConfig::default().max_retries);
        let run = bfs(&graph, 0, config).unwrap();
        prop_assert_eq!(run.levels, reference_bfs(&graph, 0));
    }
}
