// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

// Partition cells into groups and read their clonotypes.

use itertools::Itertools;
use scvdj_core::chain::ChainAttr;
use scvdj_core::defs::{MISSING, MULTI_SEP, VdjControl};
use scvdj_core::errors::{VdjError, VdjResult};
use scvdj_core::proc_args_check::check_args;
use scvdj_core::store::RecordStore;
use std::collections::BTreeMap;
use vector_utils::{next_diff, unique_sort};

// Name of the single group used when no grouping column is given.

pub const ALL_CELLS: &str = "all";

#[derive(Clone, Debug, PartialEq)]
pub struct CellGroup {
    pub name: String,
    pub cells: Vec<usize>,                // store positions
    pub clonotypes: Vec<Option<String>>, // parallel to cells, None = unclassified
}

impl CellGroup {
    pub fn n_classified(&self) -> usize {
        self.clonotypes.iter().filter(|c| c.is_some()).count()
    }

    // Clonotype counts as (clonotype, count), sorted by clonotype.

    pub fn clone_counts(&self) -> Vec<(String, usize)> {
        let mut ids = self.clonotypes.iter().filter_map(|c| c.clone()).collect::<Vec<_>>();
        ids.sort();
        let mut counts = Vec::<(String, usize)>::new();
        let mut i = 0;
        while i < ids.len() {
            let j = next_diff(&ids, i);
            counts.push((ids[i].clone(), j - i));
            i = j;
        }
        counts
    }

    // Distinct clonotypes, sorted.

    pub fn clone_set(&self) -> Vec<String> {
        let mut ids = self.clonotypes.iter().filter_map(|c| c.clone()).collect::<Vec<_>>();
        unique_sort(&mut ids);
        ids
    }
}

// Value of a column for one cell.  For a chain-level column, the distinct non-missing entries
// are joined, so that a cell whose chains all carry clonotype7 reads as clonotype7.

pub fn cell_value(store: &RecordStore, i: usize, column: &str) -> Option<String> {
    let v = store.column_value(i, column)?;
    if ChainAttr::from_name(column).is_none() {
        return Some(v);
    }
    let mut x = v
        .split(MULTI_SEP)
        .filter(|s| !s.is_empty() && *s != MISSING)
        .collect::<Vec<&str>>();
    unique_sort(&mut x);
    if x.is_empty() {
        None
    } else {
        Some(x.iter().format(MULTI_SEP).to_string())
    }
}

pub fn check_column(store: &RecordStore, column: &str) -> VdjResult<()> {
    if store.has_column(column) {
        Ok(())
    } else {
        Err(VdjError::config(&format!("unknown column {}", column)))
    }
}

// Groups in name order.  Cells with a missing group are left out.

pub fn group_cells(store: &RecordStore, ctl: &VdjControl) -> VdjResult<Vec<CellGroup>> {
    check_args(ctl)?;
    let clone_col = &ctl.stats_opt.clone_col;
    check_column(store, clone_col)?;
    if let Some(g) = &ctl.stats_opt.group_col {
        check_column(store, g)?;
    }
    let mut groups = BTreeMap::<String, CellGroup>::new();
    for i in 0..store.len() {
        let name = match &ctl.stats_opt.group_col {
            Some(g) => match cell_value(store, i, g) {
                Some(name) => name,
                None => continue,
            },
            None => ALL_CELLS.to_string(),
        };
        let group = groups.entry(name.clone()).or_insert_with(|| CellGroup {
            name,
            cells: Vec::new(),
            clonotypes: Vec::new(),
        });
        group.cells.push(i);
        group.clonotypes.push(cell_value(store, i, clone_col));
    }
    Ok(groups.into_iter().map(|x| x.1).collect())
}
