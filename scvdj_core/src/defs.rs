// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

use crate::chain::{ChainType, SeqColumn};

// Separator for multi-valued (one entry per chain) columns in the metadata table.

pub const MULTI_SEP: &str = ";";

// How the metadata table spells a missing value.

pub const MISSING: &str = "NA";

// Separator between "<chain_type>:<sequence>" tokens of a canonical key.

pub const KEY_SEP: &str = "|";

// Default number of nearest neighbors per cell.  Twenty is what single-cell tools commonly use
// to get a graph that is connected within clonotype families but not across them.

pub const DEFAULT_K: usize = 20;

pub const DEFAULT_RESOLUTION: f64 = 1.0;

pub const DEFAULT_CLONE_COLUMN: &str = "clonotype_id";

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

// General options.

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeneralOpt {
    pub prefix: String,     // prepended to every output column and graph name
    pub drop_non_vdj: bool, // drop cells lacking chains when filtering
}

// Options for distance computation and graph construction.

#[derive(Clone, Debug, PartialEq)]
pub struct GraphOpt {
    pub chains: Option<Vec<ChainType>>, // included chain types, None = all
    pub seq_col: SeqColumn,
    pub k: usize,
}

impl Default for GraphOpt {
    fn default() -> GraphOpt {
        GraphOpt {
            chains: None,
            seq_col: SeqColumn::Cdr3Aa,
            k: DEFAULT_K,
        }
    }
}

impl GraphOpt {
    pub fn includes(&self, t: ChainType) -> bool {
        match &self.chains {
            None => true,
            Some(c) => c.contains(&t),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClusterOpt {
    pub resolution: f64,
}

impl Default for ClusterOpt {
    fn default() -> ClusterOpt {
        ClusterOpt {
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatsOpt {
    pub group_col: Option<String>,
    pub clone_col: String,
}

impl Default for StatsOpt {
    fn default() -> StatsOpt {
        StatsOpt {
            group_col: None,
            clone_col: DEFAULT_CLONE_COLUMN.to_string(),
        }
    }
}

// Set up control datastructure (ctl).  This is stuff that is constant for a given run.

#[derive(Clone, Debug, Default, PartialEq)]
pub struct VdjControl {
    pub gen_opt: GeneralOpt,
    pub graph_opt: GraphOpt,
    pub cluster_opt: ClusterOpt,
    pub stats_opt: StatsOpt,
}

impl VdjControl {
    pub fn column(&self, name: &str) -> String {
        format!("{}{}", self.gen_opt.prefix, name)
    }
}
