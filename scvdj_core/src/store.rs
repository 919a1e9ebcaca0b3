// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

// The record store: cells, their chains, external fields and core-derived columns.

use crate::chain::{ChainAttr, ChainRecord};
use crate::defs::{MISSING, MULTI_SEP};
use crate::errors::{VdjError, VdjResult};
use crate::graph_structs::NeighborGraph;
use itertools::Itertools;
use std::collections::HashMap;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellRecord {
    pub cell_id: String,
    pub chains: Vec<ChainRecord>,        // in detection order
    pub fields: HashMap<String, String>, // owned by the external table, never written here
    pub derived: HashMap<String, Option<String>>, // written by the core, None = missing
}

impl CellRecord {
    pub fn new(cell_id: &str, chains: Vec<ChainRecord>) -> CellRecord {
        CellRecord {
            cell_id: cell_id.to_string(),
            chains,
            fields: HashMap::new(),
            derived: HashMap::new(),
        }
    }

    pub fn with_field(mut self, name: &str, value: &str) -> CellRecord {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }

    pub fn n_chains(&self) -> usize {
        self.chains.len()
    }

    pub fn is_vdj(&self) -> bool {
        !self.chains.is_empty()
    }

    // Per-chain values of one attribute, aligned with the chain order.

    pub fn chain_values(&self, attr: ChainAttr) -> Vec<Option<String>> {
        self.chains.iter().map(|c| c.attr_string(attr)).collect()
    }

    // Serialized form of a chain attribute: entries joined by MULTI_SEP, absent or empty entries
    // written as MISSING.  None for a cell without chains.

    pub fn chain_column(&self, attr: ChainAttr) -> Option<String> {
        if self.chains.is_empty() {
            return None;
        }
        Some(
            self.chains
                .iter()
                .map(|c| match c.attr_string(attr) {
                    Some(x) if !x.is_empty() => x,
                    _ => MISSING.to_string(),
                })
                .format(MULTI_SEP)
                .to_string(),
        )
    }
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

#[derive(Clone, Debug, Default)]
pub struct RecordStore {
    cells: Vec<CellRecord>,
    index: HashMap<String, usize>, // cell_id -> position in cells
    graphs: HashMap<String, NeighborGraph>,
}

impl RecordStore {
    // Build a store.  Cell ids must be unique.  The n_chains column is derived here.

    pub fn new(mut cells: Vec<CellRecord>) -> VdjResult<RecordStore> {
        let mut index = HashMap::<String, usize>::new();
        for i in 0..cells.len() {
            if index.insert(cells[i].cell_id.clone(), i).is_some() {
                return Err(VdjError::malformed(
                    &cells[i].cell_id,
                    "cell_id",
                    "cell id occurs more than once",
                ));
            }
            let n = cells[i].n_chains();
            let v = if n > 0 { Some(n.to_string()) } else { None };
            cells[i].derived.insert("n_chains".to_string(), v);
        }
        Ok(RecordStore {
            cells,
            index,
            graphs: HashMap::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[CellRecord] {
        &self.cells
    }

    pub fn cell_ids(&self) -> Vec<&str> {
        self.cells.iter().map(|c| c.cell_id.as_str()).collect()
    }

    pub fn position(&self, cell_id: &str) -> Option<usize> {
        self.index.get(cell_id).copied()
    }

    pub fn cell(&self, cell_id: &str) -> VdjResult<&CellRecord> {
        match self.position(cell_id) {
            Some(i) => Ok(&self.cells[i]),
            None => Err(VdjError::config(&format!("unknown cell {}", cell_id))),
        }
    }

    pub fn get_chains(&self, cell_id: &str) -> VdjResult<&[ChainRecord]> {
        Ok(&self.cell(cell_id)?.chains)
    }

    pub fn n_vdj(&self) -> usize {
        self.cells.iter().filter(|c| c.is_vdj()).count()
    }

    pub fn set_derived(
        &mut self,
        cell_id: &str,
        column: &str,
        value: Option<String>,
    ) -> VdjResult<()> {
        let i = self
            .position(cell_id)
            .ok_or_else(|| VdjError::config(&format!("unknown cell {}", cell_id)))?;
        self.cells[i].derived.insert(column.to_string(), value);
        Ok(())
    }

    pub fn derived(&self, cell_id: &str, column: &str) -> Option<&str> {
        let i = self.position(cell_id)?;
        self.cells[i].derived.get(column)?.as_deref()
    }

    // Replace a whole derived column, one value per cell in store order.  Engines compute every
    // value first and then call this, so a failed operation never leaves a partial column.

    pub fn commit(&mut self, column: &str, values: Vec<Option<String>>) -> VdjResult<()> {
        if values.len() != self.cells.len() {
            return Err(VdjError::config(&format!(
                "column {} has {} values for {} cells",
                column,
                values.len(),
                self.cells.len()
            )));
        }
        for (cell, v) in self.cells.iter_mut().zip(values.into_iter()) {
            cell.derived.insert(column.to_string(), v);
        }
        Ok(())
    }

    // Resolve a named column for the i-th cell: chain attribute first, then derived column,
    // then external field.

    pub fn column_value(&self, i: usize, name: &str) -> Option<String> {
        let cell = &self.cells[i];
        if let Some(attr) = ChainAttr::from_name(name) {
            return cell.chain_column(attr);
        }
        if let Some(v) = cell.derived.get(name) {
            return v.clone();
        }
        match cell.fields.get(name) {
            Some(v) if !v.is_empty() && v != MISSING => Some(v.clone()),
            _ => None,
        }
    }

    pub fn has_column(&self, name: &str) -> bool {
        ChainAttr::from_name(name).is_some()
            || self
                .cells
                .iter()
                .any(|c| c.derived.contains_key(name) || c.fields.contains_key(name))
    }

    pub fn set_graph(&mut self, name: &str, graph: NeighborGraph) {
        self.graphs.insert(name.to_string(), graph);
    }

    pub fn graph(&self, name: &str) -> Option<&NeighborGraph> {
        self.graphs.get(name)
    }

    // ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

    pub fn view_all(&self) -> StoreView {
        StoreView {
            store: self,
            idx: (0..self.cells.len()).collect(),
        }
    }

    pub fn filter_cells<F: Fn(&str) -> bool>(&self, pred: F) -> StoreView {
        let mut idx = Vec::<usize>::new();
        for i in 0..self.cells.len() {
            if pred(&self.cells[i].cell_id) {
                idx.push(i);
            }
        }
        StoreView { store: self, idx }
    }

    // View from positions, which must be increasing and in range.

    pub fn view_of(&self, idx: Vec<usize>) -> StoreView {
        debug_assert!(idx.windows(2).all(|w| w[0] < w[1]));
        debug_assert!(idx.iter().all(|&i| i < self.cells.len()));
        StoreView { store: self, idx }
    }

    // Materialize a view as a new store.  Derived columns come along; graphs do not, since
    // they describe the cells of the parent.

    pub fn restrict(&self, view: &StoreView) -> RecordStore {
        let cells = view.idx.iter().map(|&i| self.cells[i].clone()).collect::<Vec<_>>();
        let mut index = HashMap::<String, usize>::new();
        for (i, c) in cells.iter().enumerate() {
            index.insert(c.cell_id.clone(), i);
        }
        RecordStore {
            cells,
            index,
            graphs: HashMap::new(),
        }
    }
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

// A subset of the cells of a store, as positions.  No chain data are copied.

#[derive(Clone, Debug)]
pub struct StoreView<'a> {
    store: &'a RecordStore,
    idx: Vec<usize>,
}

impl<'a> StoreView<'a> {
    pub fn len(&self) -> usize {
        self.idx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idx.is_empty()
    }

    pub fn positions(&self) -> &[usize] {
        &self.idx
    }

    pub fn cell_ids(&self) -> Vec<&'a str> {
        let store = self.store;
        self.idx
            .iter()
            .map(|&i| store.cells[i].cell_id.as_str())
            .collect()
    }

    pub fn contains(&self, cell_id: &str) -> bool {
        match self.store.position(cell_id) {
            Some(i) => self.idx.binary_search(&i).is_ok(),
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a CellRecord> + '_ {
        let store = self.store;
        self.idx.iter().map(move |&i| &store.cells[i])
    }
}
