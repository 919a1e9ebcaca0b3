// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

// Pairwise edit distances between canonical keys.

use crate::canon::{canonical_chains, canonical_key, type_mask};
use log::info;
use rayon::prelude::*;
use scvdj_core::defs::GraphOpt;
use scvdj_core::graph_structs::DistanceMatrix;
use scvdj_core::store::RecordStore;
use triple_accel::levenshtein;

// Compute the distance matrix over the cells having at least one included chain.  Each row of
// the upper triangle is computed by its own worker.  A pair of cells sharing no included chain
// type gets no distance.

pub fn distance_matrix(store: &RecordStore, opt: &GraphOpt) -> DistanceMatrix {
    let mut cells = Vec::<String>::new();
    let mut keys = Vec::<String>::new();
    let mut masks = Vec::<u16>::new();
    for cell in store.cells().iter() {
        let chains = canonical_chains(&cell.chains, opt);
        if chains.is_empty() {
            continue;
        }
        cells.push(cell.cell_id.clone());
        keys.push(canonical_key(&cell.chains, opt));
        masks.push(type_mask(&chains));
    }
    let n = cells.len();
    let mut results = Vec::<(usize, Vec<Option<u32>>)>::new();
    for i in 0..n {
        results.push((i, Vec::new()));
    }
    results.par_iter_mut().for_each(|res| {
        let i = res.0;
        let ki = keys[i].as_bytes();
        for j in i + 1..n {
            if masks[i] & masks[j] == 0 {
                res.1.push(None);
            } else {
                res.1.push(Some(levenshtein(ki, keys[j].as_bytes())));
            }
        }
    });
    let mut upper = Vec::<Option<u32>>::with_capacity(n * n.saturating_sub(1) / 2);
    for r in results.iter_mut() {
        upper.append(&mut r.1);
    }
    info!(
        "computed distances between {} cells, {} without an included chain",
        n,
        store.len() - n
    );
    DistanceMatrix::new(cells, keys, upper)
}
