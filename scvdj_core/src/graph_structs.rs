// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

// Distance matrix, neighbor graph and cluster assignment.  These are produced by scvdj_graph and
// scvdj_cluster, but live here so that the record store can hold them.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde_derive::{Deserialize, Serialize};

// Symmetric cell x cell matrix over the cells that have a chain of an included type.  Only the
// upper triangle is stored.  An entry is None if the two cells share no included chain type.

#[derive(Clone, Debug, PartialEq)]
pub struct DistanceMatrix {
    pub cells: Vec<String>, // included cells, in store order
    pub keys: Vec<String>,  // canonical keys (parallel to cells)
    upper: Vec<Option<u32>>,
}

fn upper_index(n: usize, i: usize, j: usize) -> usize {
    i * n - i * (i + 1) / 2 + (j - i - 1)
}

impl DistanceMatrix {
    // The upper triangle is given row by row: (0,1), (0,2), ..., (1,2), ...

    pub fn new(cells: Vec<String>, keys: Vec<String>, upper: Vec<Option<u32>>) -> DistanceMatrix {
        let n = cells.len();
        assert_eq!(keys.len(), n);
        assert_eq!(upper.len(), n * n.saturating_sub(1) / 2);
        DistanceMatrix { cells, keys, upper }
    }

    pub fn n(&self) -> usize {
        self.cells.len()
    }

    pub fn get(&self, i: usize, j: usize) -> Option<u32> {
        if i == j {
            Some(0)
        } else if i < j {
            self.upper[upper_index(self.n(), i, j)]
        } else {
            self.upper[upper_index(self.n(), j, i)]
        }
    }

    pub fn position(&self, cell_id: &str) -> Option<usize> {
        self.cells.iter().position(|c| c == cell_id)
    }

    // Distance between two cells named by id.  The outer None means one of the cells is not in
    // the matrix.

    pub fn get_by_id(&self, a: &str, b: &str) -> Option<Option<u32>> {
        let i = self.position(a)?;
        let j = self.position(b)?;
        Some(self.get(i, j))
    }
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

// Shared-nearest-neighbor graph.  Node i carries the id of the i-th included cell; edge weights
// are shared neighbor counts.  This is what gets handed to a projection service.

#[derive(Clone, Debug)]
pub struct NeighborGraph {
    pub k: usize, // number of neighbors actually used, after clamping
    pub graph: UnGraph<String, u32>,
}

impl NeighborGraph {
    pub fn n_nodes(&self) -> usize {
        self.graph.node_count()
    }

    pub fn n_edges(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn cell_ids(&self) -> Vec<String> {
        self.graph.node_weights().cloned().collect()
    }

    pub fn node_position(&self, cell_id: &str) -> Option<usize> {
        self.graph.node_indices().find(|&v| self.graph[v] == cell_id).map(|v| v.index())
    }

    pub fn weight(&self, a: &str, b: &str) -> Option<u32> {
        let i = NodeIndex::new(self.node_position(a)?);
        let j = NodeIndex::new(self.node_position(b)?);
        let e = self.graph.find_edge(i, j)?;
        Some(self.graph[e])
    }

    // Edges as (node, node, weight), lower node first, sorted.

    pub fn edges(&self) -> Vec<(usize, usize, u32)> {
        let mut edges = Vec::<(usize, usize, u32)>::new();
        for e in self.graph.edge_references() {
            let (a, b) = (e.source().index(), e.target().index());
            edges.push((a.min(b), a.max(b), *e.weight()));
        }
        edges.sort_unstable();
        edges
    }

    pub fn edge_list(&self) -> Vec<(String, String, u32)> {
        self.edges()
            .iter()
            .map(|&(a, b, w)| {
                (
                    self.graph[NodeIndex::new(a)].clone(),
                    self.graph[NodeIndex::new(b)].clone(),
                    w,
                )
            })
            .collect()
    }
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

// Cluster label per cell, in store order.  None is the missing label.

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub column: String,
    pub labels: Vec<(String, Option<String>)>,
}

impl ClusterAssignment {
    pub fn get(&self, cell_id: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|x| x.0 == cell_id)
            .and_then(|x| x.1.as_deref())
    }

    pub fn n_clusters(&self) -> usize {
        let mut labels = self
            .labels
            .iter()
            .filter_map(|x| x.1.as_ref())
            .collect::<Vec<&String>>();
        labels.sort();
        labels.dedup();
        labels.len()
    }

    // Cells of each cluster, clusters in label order "0", "1", ...

    pub fn clusters(&self) -> Vec<Vec<String>> {
        let mut clusters = Vec::<Vec<String>>::new();
        for (cell, label) in self.labels.iter() {
            if let Some(label) = label {
                if let Ok(c) = label.parse::<usize>() {
                    if clusters.len() <= c {
                        clusters.resize(c + 1, Vec::new());
                    }
                    clusters[c].push(cell.clone());
                }
            }
        }
        clusters
    }
}
