// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

pub mod chain;
pub mod defs;
pub mod errors;
pub mod graph_structs;
pub mod import;
pub mod proc_args;
pub mod proc_args_check;
pub mod store;

pub use chain::{ChainAttr, ChainRecord, ChainType, SeqColumn};
pub use defs::VdjControl;
pub use errors::{VdjError, VdjResult};
pub use graph_structs::{ClusterAssignment, DistanceMatrix, NeighborGraph};
pub use import::{read_contig_json, ContigAnnotation, TableRow};
pub use store::{CellRecord, RecordStore, StoreView};
