// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

// Distances between cells and the neighbor graph built from them.

pub mod canon;
pub mod distance;
pub mod snn;

pub use canon::canonical_key;
pub use distance::distance_matrix;
pub use snn::build_neighbor_graph;

use scvdj_core::defs::VdjControl;
use scvdj_core::errors::VdjResult;
use scvdj_core::graph_structs::{DistanceMatrix, NeighborGraph};
use scvdj_core::store::RecordStore;

// Distance matrix and graph for a store, as configured.

pub fn neighbor_graph(
    store: &RecordStore,
    ctl: &VdjControl,
) -> VdjResult<(DistanceMatrix, NeighborGraph)> {
    let dm = distance_matrix(store, &ctl.graph_opt);
    let g = build_neighbor_graph(&dm, ctl.graph_opt.k)?;
    Ok((dm, g))
}
