use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use lanepipe::{CsrGraph, EdgeId, GhostToken, GraphView, Lane, LaunchConfig, NodeId, Pipe, Scheduler};
use proptest::prelude::*;

fn arb_graph() -> impl Strategy<Value = CsrGraph> {
    (1usize..40).prop_flat_map(|n| {
        proptest::collection::vec((0..n, 0..n), 0..240)
            .prop_map(move |edges| CsrGraph::from_edges(n, &edges).unwrap())
    })
}

fn arb_config() -> impl Strategy<Value = LaunchConfig> {
    (1usize..4, prop_oneof![Just((2usize, 1usize)), Just((4, 2)), Just((8, 4)), Just((8, 8))], 1usize..12, 0usize..12, 1usize..10)
        .prop_map(|(teams, (team_size, subgroup_size), min_sub, extra, fine)| {
            LaunchConfig::for_lanes(teams, team_size, subgroup_size)
                .with_thresholds(min_sub, min_sub + extra)
                .with_fine_grain_capacity(fine)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn every_frontier_edge_is_applied_once(
        graph in arb_graph(),
        config in arb_config(),
        picks in proptest::collection::vec(any::<usize>(), 0..60),
    ) {
        let frontier: Vec<NodeId> = picks.iter().map(|p| p % graph.node_count()).collect();
        let mut expected = vec![0usize; graph.edge_count()];
        for &node in &frontier {
            for edge in graph.out_edge_range(node) {
                expected[edge] += 1;
            }
        }

        let visits: Vec<AtomicUsize> = (0..graph.edge_count()).map(|_| AtomicUsize::new(0)).collect();
        let calls: Vec<AtomicUsize> = (0..config.total_lanes()).map(|_| AtomicUsize::new(0)).collect();
        GhostToken::new(|mut token| {
            let pipe = Pipe::new(&config, frontier.len(), graph.node_count());
            pipe.initialize(&mut token);
            pipe.seed(&mut token, &frontier).unwrap();
            let scheduler = Scheduler::new(config, &graph).unwrap();
            let op = |lane: &Lane<'_, '_>, src: NodeId, edge: EdgeId| {
                calls[lane.global_id()].fetch_add(1, Ordering::Relaxed);
                if graph.is_valid_edge(edge) {
                    assert!(graph.out_edge_range(src).contains(&edge));
                    visits[edge].fetch_add(1, Ordering::Relaxed);
                }
            };
            scheduler.run_pass(&token, &pipe, &op).unwrap();
        });

        let visits: Vec<usize> = visits.into_iter().map(AtomicUsize::into_inner).collect();
        prop_assert_eq!(visits, expected);
        let calls: Vec<usize> = calls.into_iter().map(AtomicUsize::into_inner).collect();
        for team in calls.chunks(config.team_size) {
            prop_assert!(team.iter().all(|&c| c == team[0]), "lanes out of lockstep: {:?}", team);
        }
    }
}

#[test]
fn overflowing_pass_recovers_after_compress_and_rerun() {
    // Twelve distinct next-frontier nodes, capacity for eleven.
    let edges: Vec<(NodeId, NodeId)> = (1..=12).map(|v| (0, v)).collect();
    let graph = CsrGraph::from_edges(13, &edges).unwrap();
    let config = LaunchConfig::for_lanes(2, 4, 2);
    let visited: Vec<AtomicBool> = (0..13).map(|n| AtomicBool::new(n == 0)).collect();

    GhostToken::new(|mut token| {
        let pipe = Pipe::new(&config, 11, graph.node_count());
        pipe.initialize(&mut token);
        pipe.seed(&mut token, &[0]).unwrap();
        let scheduler = Scheduler::new(config, &graph).unwrap();
        let op = |lane: &Lane<'_, '_>, _: NodeId, edge: EdgeId| {
            if !graph.is_valid_edge(edge) {
                return;
            }
            let dst = graph.edge_destination(edge);
            if !visited[dst].load(Ordering::Relaxed) && lane.push(dst) {
                visited[dst].store(true, Ordering::Relaxed);
            }
        };

        let mut outcomes = Vec::new();
        loop {
            let outcome = scheduler.run_pass(&token, &pipe, &op).unwrap();
            pipe.compress(&mut token);
            outcomes.push(outcome);
            if !outcome.needs_retry() {
                break;
            }
            assert!(outcomes.len() < 8, "no progress: {outcomes:?}");
        }
        assert!(outcomes[0].needs_retry());

        pipe.swap_slots(&mut token);
        let mut next = pipe.in_frontier(&token);
        next.sort_unstable();
        assert_eq!(next, (1..=12).collect::<Vec<_>>());
    });
}

#[test]
fn lane_fault_in_one_team_does_not_hang_the_others() {
    let graph = CsrGraph::from_adjacency(&[vec![1; 16], vec![0; 16]]);
    let config = LaunchConfig::for_lanes(2, 4, 2).with_thresholds(1, 1);
    GhostToken::new(|mut token| {
        let pipe = Pipe::new(&config, 8, 2);
        pipe.initialize(&mut token);
        pipe.seed(&mut token, &[0, 0, 0, 0, 1]).unwrap();
        let scheduler = Scheduler::new(config, &graph).unwrap();
        let op = |lane: &Lane<'_, '_>, src: NodeId, edge: EdgeId| {
            assert!(!(src == 1 && edge == 20), "injected fault");
            lane.barrier();
        };
        let err = scheduler.run_pass(&token, &pipe, &op).unwrap_err();
        assert_eq!(err, lanepipe::FrontierError::LaneFault { team: 1 });
    });
}
