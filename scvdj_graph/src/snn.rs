// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

// Shared nearest neighbor graph.
//
// For each cell i, kNN(i) is the set of its k nearest other cells, ties broken by position.
// Pairs without a distance are never neighbors.  Let N(i) = {i} ∪ kNN(i).  There is an edge
// between i and j if either is a nearest neighbor of the other, and its weight is |N(i) ∩ N(j)|.

use log::info;
use petgraph::graph::{NodeIndex, UnGraph};
use rayon::prelude::*;
use scvdj_core::errors::{VdjError, VdjResult};
use scvdj_core::graph_structs::{DistanceMatrix, NeighborGraph};

// Nearest neighbors of every cell, each list sorted by position.

pub fn nearest_neighbors(dm: &DistanceMatrix, k: usize) -> Vec<Vec<usize>> {
    let n = dm.n();
    let mut results = Vec::<(usize, Vec<usize>)>::new();
    for i in 0..n {
        results.push((i, Vec::new()));
    }
    results.par_iter_mut().for_each(|res| {
        let i = res.0;
        let mut cand = Vec::<(u32, usize)>::new();
        for j in 0..n {
            if j != i {
                if let Some(d) = dm.get(i, j) {
                    cand.push((d, j));
                }
            }
        }
        cand.sort_unstable();
        cand.truncate(k);
        res.1 = cand.iter().map(|x| x.1).collect();
        res.1.sort_unstable();
    });
    results.into_iter().map(|r| r.1).collect()
}

fn shared(a: &[usize], b: &[usize]) -> u32 {
    let (mut i, mut j, mut n) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        if a[i] < b[j] {
            i += 1;
        } else if a[i] > b[j] {
            j += 1;
        } else {
            n += 1;
            i += 1;
            j += 1;
        }
    }
    n
}

// Build the graph.  k larger than the number of other cells is clamped.

pub fn build_neighbor_graph(dm: &DistanceMatrix, k: usize) -> VdjResult<NeighborGraph> {
    if k == 0 {
        return Err(VdjError::config("the number of neighbors K must be positive"));
    }
    let n = dm.n();
    let k = k.min(n.saturating_sub(1));
    let knn = nearest_neighbors(dm, k);
    let mut nbhd = Vec::<Vec<usize>>::with_capacity(n);
    for i in 0..n {
        let mut x = knn[i].clone();
        x.push(i);
        x.sort_unstable();
        nbhd.push(x);
    }
    let mut pairs = Vec::<(usize, usize)>::new();
    for i in 0..n {
        for &j in knn[i].iter() {
            pairs.push((i.min(j), i.max(j)));
        }
    }
    pairs.sort_unstable();
    pairs.dedup();

    let mut graph = UnGraph::<String, u32>::with_capacity(n, pairs.len());
    for id in dm.cells.iter() {
        graph.add_node(id.clone());
    }
    for &(i, j) in pairs.iter() {
        let w = shared(&nbhd[i], &nbhd[j]);
        graph.add_edge(NodeIndex::new(i), NodeIndex::new(j), w);
    }
    info!(
        "built neighbor graph with {} nodes and {} edges, k = {}",
        graph.node_count(),
        graph.edge_count(),
        k
    );
    Ok(NeighborGraph { k, graph })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Four cells on a line at positions 0, 1, 2, 10.

    fn line() -> DistanceMatrix {
        let pos = [0_i64, 1, 2, 10];
        let mut upper = Vec::<Option<u32>>::new();
        for i in 0..4 {
            for j in i + 1..4 {
                upper.push(Some((pos[j] - pos[i]) as u32));
            }
        }
        let cells = (0..4).map(|i| format!("c{}", i)).collect::<Vec<_>>();
        let keys = cells.clone();
        DistanceMatrix::new(cells, keys, upper)
    }

    #[test]
    fn test_knn() {
        let dm = line();
        let knn = nearest_neighbors(&dm, 1);
        assert_eq!(knn, vec![vec![1], vec![0], vec![1], vec![2]]);
        let knn = nearest_neighbors(&dm, 2);
        assert_eq!(knn, vec![vec![1, 2], vec![0, 2], vec![0, 1], vec![1, 2]]);
    }

    #[test]
    fn test_snn_weights() {
        let dm = line();
        let g = build_neighbor_graph(&dm, 1).unwrap();
        assert_eq!(g.k, 1);
        assert_eq!(g.edges(), vec![(0, 1, 2), (1, 2, 1), (2, 3, 1)]);
        let g = build_neighbor_graph(&dm, 2).unwrap();
        assert_eq!(
            g.edges(),
            vec![(0, 1, 3), (0, 2, 3), (1, 2, 3), (1, 3, 2), (2, 3, 2)]
        );
        for (_, _, w) in g.edges().iter() {
            assert!(*w >= 1);
        }
        let g = build_neighbor_graph(&dm, 50).unwrap();
        assert_eq!(g.k, 3);
        assert_eq!(g.n_edges(), 6);
        assert!(build_neighbor_graph(&dm, 0).is_err());
    }
}
