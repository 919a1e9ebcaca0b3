// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

// Build a record store from upstream data.  Two paths: rows of the cell metadata table, in which
// chain-level columns are MULTI_SEP-joined strings, and per-contig annotation rows as written by
// the sequencing pipeline.

use crate::chain::{ChainAttr, ChainRecord, ChainType, CHAIN_ATTRS};
use crate::defs::{MISSING, MULTI_SEP};
use crate::errors::{VdjError, VdjResult};
use crate::store::{CellRecord, RecordStore};
use itertools::Itertools;
use log::{debug, info};
use serde_derive::{Deserialize, Serialize};
use std::collections::HashMap;

// One row of the cell metadata table.

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    pub cell_id: String,
    pub columns: Vec<(String, String)>,
}

impl TableRow {
    pub fn new(cell_id: &str) -> TableRow {
        TableRow {
            cell_id: cell_id.to_string(),
            columns: Vec::new(),
        }
    }

    pub fn col(mut self, name: &str, value: &str) -> TableRow {
        self.columns.push((name.to_string(), value.to_string()));
        self
    }
}

fn is_missing(x: &str) -> bool {
    x.is_empty() || x == MISSING
}

// Split a multi-valued entry.  A missing entry has no values.

fn split_multi(x: &str) -> Vec<&str> {
    if is_missing(x) {
        Vec::new()
    } else {
        x.split(MULTI_SEP).collect()
    }
}

fn opt_entry(x: &str) -> Option<String> {
    if is_missing(x) {
        None
    } else {
        Some(x.to_string())
    }
}

fn parse_bool(x: &str) -> Option<bool> {
    match x {
        "true" | "TRUE" | "True" | "T" => Some(true),
        "false" | "FALSE" | "False" | "F" => Some(false),
        _ => None,
    }
}

// Build the chains of one table row.  Every chain column present must have exactly as many
// entries as chain_type, or be missing altogether.

fn chains_of_row(
    cell_id: &str,
    chain_cols: &HashMap<ChainAttr, &str>,
) -> VdjResult<Vec<ChainRecord>> {
    let types = split_multi(chain_cols.get(&ChainAttr::ChainType).copied().unwrap_or(""));
    let n = types.len();
    let mut vals = HashMap::<ChainAttr, Vec<&str>>::new();
    for attr in CHAIN_ATTRS.iter() {
        if *attr == ChainAttr::ChainType {
            continue;
        }
        if let Some(x) = chain_cols.get(attr) {
            // A column that is missing as a whole means missing for every chain.
            let v = if is_missing(x) { vec![MISSING; n] } else { split_multi(x) };
            if v.len() != n {
                return Err(VdjError::malformed(
                    cell_id,
                    attr.name(),
                    &format!("{} entries for {} chains", v.len(), n),
                ));
            }
            vals.insert(*attr, v);
        }
    }
    let get = |attr: ChainAttr, j: usize| vals.get(&attr).map(|v| v[j]);
    let mut chains = Vec::<ChainRecord>::new();
    for j in 0..n {
        let mut c = ChainRecord::new(ChainType::parse(types[j]), "");
        if let Some(x) = get(ChainAttr::Cdr3Aa, j) {
            c.cdr3_aa = opt_entry(x).unwrap_or_default();
        }
        if let Some(x) = get(ChainAttr::Cdr3Nt, j) {
            c.cdr3_nt = opt_entry(x).unwrap_or_default();
        }
        c.v_gene = get(ChainAttr::VGene, j).and_then(opt_entry);
        c.d_gene = get(ChainAttr::DGene, j).and_then(opt_entry);
        c.j_gene = get(ChainAttr::JGene, j).and_then(opt_entry);
        c.c_gene = get(ChainAttr::CGene, j).and_then(opt_entry);
        for attr in [ChainAttr::Reads, ChainAttr::Umis].iter() {
            if let Some(x) = get(*attr, j) {
                let count = if is_missing(x) {
                    0
                } else {
                    x.parse::<u64>().map_err(|_| {
                        let msg = format!("\"{}\" is not a count", x);
                        VdjError::malformed(cell_id, attr.name(), &msg)
                    })?
                };
                if *attr == ChainAttr::Reads {
                    c.reads = count;
                } else {
                    c.umis = count;
                }
            }
        }
        if let Some(x) = get(ChainAttr::Productive, j) {
            if !is_missing(x) {
                c.productive = parse_bool(x).ok_or_else(|| {
                    let msg = format!("\"{}\" is not a boolean", x);
                    VdjError::malformed(cell_id, "productive", &msg)
                })?;
            }
        }
        if let Some(x) = get(ChainAttr::ClonotypeId, j) {
            c.clonotype_id = opt_entry(x).unwrap_or_default();
        }
        chains.push(c);
    }
    Ok(chains)
}

impl RecordStore {
    // Import rows of the metadata table.  Chain-level columns become chains, everything else is
    // kept as an opaque external field.

    pub fn from_table(rows: &[TableRow]) -> VdjResult<RecordStore> {
        let mut cells = Vec::<CellRecord>::new();
        for row in rows.iter() {
            let mut chain_cols = HashMap::<ChainAttr, &str>::new();
            let mut fields = HashMap::<String, String>::new();
            for (name, value) in row.columns.iter() {
                match ChainAttr::from_name(name) {
                    Some(attr) => {
                        chain_cols.insert(attr, value.as_str());
                    }
                    None => {
                        fields.insert(name.clone(), value.clone());
                    }
                }
            }
            let mut cell = CellRecord::new(&row.cell_id, chains_of_row(&row.cell_id, &chain_cols)?);
            cell.fields = fields;
            cells.push(cell);
        }
        let store = RecordStore::new(cells)?;
        info!(
            "imported {} cells from table, {} with VDJ data",
            store.len(),
            store.n_vdj()
        );
        Ok(store)
    }

    // Export to the metadata table convention: chain columns joined, derived and external
    // columns in name order, missing written as MISSING.

    pub fn to_table(&self) -> Vec<TableRow> {
        let mut rows = Vec::<TableRow>::new();
        for cell in self.cells().iter() {
            let mut row = TableRow::new(&cell.cell_id);
            for attr in CHAIN_ATTRS.iter() {
                let v = cell.chain_column(*attr).unwrap_or_else(|| MISSING.to_string());
                row.columns.push((attr.name().to_string(), v));
            }
            for name in cell.derived.keys().sorted() {
                let v = cell.derived[name].clone().unwrap_or_else(|| MISSING.to_string());
                row.columns.push((name.clone(), v));
            }
            for name in cell.fields.keys().sorted() {
                row.columns.push((name.clone(), cell.fields[name].clone()));
            }
            rows.push(row);
        }
        rows
    }
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

// One annotated contig, with field names as in the pipeline's contig annotation output.

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContigAnnotation {
    pub barcode: String,
    #[serde(default)]
    pub contig_id: String,
    pub chain: ChainType,
    #[serde(default)]
    pub v_gene: Option<String>,
    #[serde(default)]
    pub d_gene: Option<String>,
    #[serde(default)]
    pub j_gene: Option<String>,
    #[serde(default)]
    pub c_gene: Option<String>,
    #[serde(default)]
    pub productive: Option<bool>,
    #[serde(default)]
    pub cdr3: Option<String>,
    #[serde(default)]
    pub cdr3_nt: Option<String>,
    #[serde(default)]
    pub reads: u64,
    #[serde(default)]
    pub umis: u64,
    #[serde(default)]
    pub raw_clonotype_id: Option<String>,
}

pub fn read_contig_json(json: &str) -> VdjResult<Vec<ContigAnnotation>> {
    serde_json::from_str::<Vec<ContigAnnotation>>(json)
        .map_err(|e| VdjError::malformed("?", "contig", &format!("{}", e)))
}

fn gene(x: &Option<String>) -> Option<String> {
    match x {
        Some(g) if !is_missing(g) && g != "None" => Some(g.clone()),
        _ => None,
    }
}

impl ContigAnnotation {
    pub fn to_chain(&self) -> ChainRecord {
        ChainRecord {
            chain_type: self.chain,
            cdr3_nt: self.cdr3_nt.clone().unwrap_or_default(),
            cdr3_aa: self.cdr3.clone().unwrap_or_default(),
            v_gene: gene(&self.v_gene),
            d_gene: gene(&self.d_gene),
            j_gene: gene(&self.j_gene),
            c_gene: gene(&self.c_gene),
            reads: self.reads,
            umis: self.umis,
            productive: self.productive.unwrap_or(false),
            clonotype_id: self.raw_clonotype_id.clone().unwrap_or_default(),
        }
    }
}

impl RecordStore {
    // Attach contigs to the cells of the metadata table.  All columns of the rows are external
    // fields here.  Contig order is detection order.  Contigs on barcodes that are not cells are
    // ignored.

    pub fn from_contigs(
        rows: &[TableRow],
        contigs: &[ContigAnnotation],
        productive_only: bool,
    ) -> VdjResult<RecordStore> {
        let mut cells = Vec::<CellRecord>::new();
        let mut pos = HashMap::<&str, usize>::new();
        for row in rows.iter() {
            pos.insert(row.cell_id.as_str(), cells.len());
            let mut cell = CellRecord::new(&row.cell_id, Vec::new());
            for (name, value) in row.columns.iter() {
                cell.fields.insert(name.clone(), value.clone());
            }
            cells.push(cell);
        }
        let (mut ignored, mut unproductive) = (0, 0);
        for x in contigs.iter() {
            if productive_only && x.productive != Some(true) {
                unproductive += 1;
                continue;
            }
            match pos.get(x.barcode.as_str()) {
                Some(&i) => cells[i].chains.push(x.to_chain()),
                None => ignored += 1,
            }
        }
        if ignored > 0 {
            debug!("ignored {} contigs on barcodes that are not cells", ignored);
        }
        if unproductive > 0 {
            debug!("skipped {} unproductive contigs", unproductive);
        }
        let store = RecordStore::new(cells)?;
        info!(
            "imported {} contigs onto {} cells, {} with VDJ data",
            contigs.len() - ignored - unproductive,
            store.len(),
            store.n_vdj()
        );
        Ok(store)
    }
}
