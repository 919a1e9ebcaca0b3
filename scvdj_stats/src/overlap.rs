// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

// Jaccard overlap of the clonotype sets of groups.

use crate::groups::group_cells;
use scvdj_core::defs::VdjControl;
use scvdj_core::errors::{VdjError, VdjResult};
use scvdj_core::store::RecordStore;
use serde_derive::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OverlapMatrix {
    pub groups: Vec<String>,
    pub jaccard: Vec<Vec<Option<f64>>>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OverlapRow {
    pub reference: String,
    pub group: String,
    pub jaccard: Option<f64>,
}

// |A ∩ B| / |A ∪ B| for sorted, deduplicated sets.  Missing if either set is empty.

pub fn jaccard(a: &[String], b: &[String]) -> Option<f64> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let (mut i, mut j, mut shared) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        if a[i] < b[j] {
            i += 1;
        } else if a[i] > b[j] {
            j += 1;
        } else {
            shared += 1;
            i += 1;
            j += 1;
        }
    }
    Some(shared as f64 / (a.len() + b.len() - shared) as f64)
}

pub fn overlap(store: &RecordStore, ctl: &VdjControl) -> VdjResult<OverlapMatrix> {
    let groups = group_cells(store, ctl)?;
    let sets = groups.iter().map(|g| g.clone_set()).collect::<Vec<_>>();
    let n = groups.len();
    let mut m = vec![vec![None; n]; n];
    for i in 0..n {
        for j in i..n {
            let x = jaccard(&sets[i], &sets[j]);
            m[i][j] = x;
            m[j][i] = x;
        }
    }
    Ok(OverlapMatrix {
        groups: groups.into_iter().map(|g| g.name).collect(),
        jaccard: m,
    })
}

// Overlap of one group with each of the others.

pub fn overlap_with(
    store: &RecordStore,
    ctl: &VdjControl,
    reference: &str,
) -> VdjResult<Vec<OverlapRow>> {
    let groups = group_cells(store, ctl)?;
    let r = groups
        .iter()
        .position(|g| g.name == reference)
        .ok_or_else(|| VdjError::config(&format!("unknown reference group {}", reference)))?;
    let rset = groups[r].clone_set();
    let mut rows = Vec::<OverlapRow>::new();
    for (i, g) in groups.iter().enumerate() {
        if i != r {
            rows.push(OverlapRow {
                reference: reference.to_string(),
                group: g.name.clone(),
                jaccard: jaccard(&rset, &g.clone_set()),
            });
        }
    }
    Ok(rows)
}
