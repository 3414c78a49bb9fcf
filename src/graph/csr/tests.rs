//! Tests for the CSR graph.

use super::*;

#[test]
fn from_adjacency_builds_ranges() {
    // 0 -> 1, 2
    // 1 -> 3
    // 2 -> 3
    // 3 ->
    let graph = CsrGraph::from_adjacency(&[vec![1, 2], vec![3], vec![3], vec![]]);

    assert_eq!(graph.node_count(), 4);
    assert_eq!(graph.edge_count(), 4);
    assert_eq!(graph.out_edge_range(0), 0..2);
    assert_eq!(graph.out_edge_range(3), 4..4);
    assert_eq!(graph.out_degree(1), 1);
    assert_eq!(graph.edge_destination(3), 3);
    assert_eq!(graph.neighbors(0).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(graph.max_out_degree(), 2);
}

#[test]
fn from_csr_parts_round_trips_adjacency() {
    let adjacency = vec![vec![1, 2], vec![2], vec![]];
    let built = CsrGraph::from_adjacency(&adjacency);
    let parts = CsrGraph::from_csr_parts(vec![0, 2, 3, 3], vec![1, 2, 2]).unwrap();
    assert_eq!(built, parts);
}

#[test]
fn from_csr_parts_rejects_bad_offsets() {
    assert!(CsrGraph::from_csr_parts(vec![], vec![]).is_err());
    assert!(CsrGraph::from_csr_parts(vec![1, 1], vec![0]).is_err());
    assert!(CsrGraph::from_csr_parts(vec![0, 2, 1], vec![0, 0]).is_err());
    assert!(CsrGraph::from_csr_parts(vec![0, 1, 2], vec![0]).is_err());
}

#[test]
fn from_csr_parts_rejects_out_of_range_destination() {
    let err = CsrGraph::from_csr_parts(vec![0, 1], vec![5]).unwrap_err();
    assert!(matches!(err, FrontierError::InvalidGraph(_)));
}

#[test]
fn from_edges_validates_endpoints() {
    let graph = CsrGraph::from_edges(3, &[(0, 1), (0, 2), (2, 0)]).unwrap();
    assert_eq!(graph.neighbors(0).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(
        CsrGraph::from_edges(2, &[(0, 2)]),
        Err(FrontierError::NodeOutOfRange { node: 2, node_count: 2 })
    );
}

#[test]
fn empty_graph() {
    let graph = CsrGraph::from_adjacency(&[]);
    assert_eq!(graph.node_count(), 0);
    assert_eq!(graph.edge_count(), 0);
    assert_eq!(graph.max_out_degree(), 0);
    assert!(!graph.is_valid_node(0));
    assert!(!graph.is_valid_edge(0));
}

#[test]
#[should_panic(expected = "out of bounds")]
fn from_adjacency_panics_on_dangling_edge() {
    let _ = CsrGraph::from_adjacency(&[vec![1]]);
}
