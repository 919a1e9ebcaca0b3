// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

// Cluster cells by their chains: distances, neighbor graph, then Louvain.  Cluster labels are
// written to <prefix>cluster and the graph is kept on the store as <prefix>graph.

pub mod louvain;

use log::{info, warn};
use louvain::{louvain, WeightedGraph};
use petgraph::visit::EdgeRef;
use scvdj_core::defs::VdjControl;
use scvdj_core::errors::{VdjError, VdjResult};
use scvdj_core::proc_args_check::check_args;
use scvdj_core::graph_structs::{ClusterAssignment, DistanceMatrix, NeighborGraph};
use scvdj_core::store::RecordStore;
use scvdj_graph::neighbor_graph;
use serde_derive::Serialize;
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct ClusterRun {
    pub assignment: ClusterAssignment,
    pub graph: NeighborGraph,
    pub distances: DistanceMatrix,
    pub warning: Option<VdjError>, // EmptyGraph
    pub modularity: f64,
}

// What gets exported for a run.

#[derive(Clone, Debug, Serialize)]
pub struct ClusterSummary {
    pub column: String,
    pub n_cells: usize,
    pub n_clustered: usize,
    pub n_clusters: usize,
    pub sizes: Vec<usize>,
    pub modularity: f64,
    pub warning: Option<String>,
}

impl ClusterRun {
    pub fn summary(&self) -> ClusterSummary {
        let sizes = self
            .assignment
            .clusters()
            .iter()
            .map(|c| c.len())
            .collect::<Vec<_>>();
        ClusterSummary {
            column: self.assignment.column.clone(),
            n_cells: self.assignment.labels.len(),
            n_clustered: sizes.iter().sum(),
            n_clusters: sizes.len(),
            sizes,
            modularity: self.modularity,
            warning: self.warning.as_ref().map(|e| e.to_string()),
        }
    }
}

// Label each node by the rank of its community, larger communities first, ties by first member.

pub fn size_ranked_labels(community: &[usize]) -> Vec<usize> {
    let nc = community.iter().map(|c| c + 1).max().unwrap_or(0);
    let mut size = vec![0_usize; nc];
    let mut first = vec![usize::MAX; nc];
    for (i, &c) in community.iter().enumerate() {
        size[c] += 1;
        first[c] = first[c].min(i);
    }
    let mut order = (0..nc).collect::<Vec<usize>>();
    order.sort_by(|&a, &b| size[b].cmp(&size[a]).then(first[a].cmp(&first[b])));
    let mut rank = vec![0; nc];
    for (r, &c) in order.iter().enumerate() {
        rank[c] = r;
    }
    community.iter().map(|&c| rank[c]).collect()
}

pub fn cluster_cells(store: &mut RecordStore, ctl: &VdjControl) -> VdjResult<ClusterRun> {
    check_args(ctl)?;
    let gamma = ctl.cluster_opt.resolution;
    let (distances, graph) = neighbor_graph(store, ctl)?;
    let column = ctl.column("cluster");

    let mut node_label = Vec::<usize>::new();
    let mut warning = None;
    let mut modularity = 0.0;
    if graph.n_nodes() == 0 {
        warn!(
            "no cell has an included chain, so there is nothing to cluster; {} is all missing",
            column
        );
        warning = Some(VdjError::EmptyGraph);
    } else {
        let mut edges = Vec::<(usize, usize, f64)>::new();
        for e in graph.graph.edge_references() {
            edges.push((e.source().index(), e.target().index(), *e.weight() as f64));
        }
        let g = WeightedGraph::from_edges(graph.n_nodes(), &edges);
        let p = louvain(&g, gamma);
        node_label = size_ranked_labels(&p.community);
        modularity = p.modularity;
    }

    let mut pos = HashMap::<&str, usize>::new();
    for (i, id) in distances.cells.iter().enumerate() {
        pos.insert(id.as_str(), i);
    }
    let mut labels = Vec::<(String, Option<String>)>::with_capacity(store.len());
    for cell in store.cells().iter() {
        let label = pos
            .get(cell.cell_id.as_str())
            .map(|&i| node_label[i].to_string());
        labels.push((cell.cell_id.clone(), label));
    }
    let assignment = ClusterAssignment {
        column: column.clone(),
        labels,
    };
    store.commit(&column, assignment.labels.iter().map(|x| x.1.clone()).collect())?;
    store.set_graph(&ctl.column("graph"), graph.clone());
    info!(
        "found {} clusters among {} cells at resolution {}, modularity {:.3}",
        assignment.n_clusters(),
        graph.n_nodes(),
        gamma,
        modularity
    );
    Ok(ClusterRun {
        assignment,
        graph,
        distances,
        warning,
        modularity,
    })
}
