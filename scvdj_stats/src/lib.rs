// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

// Repertoire statistics over groups of cells: clonotype abundance, inverse Simpson diversity,
// Jaccard overlap between groups, and per-cell clone sizes.

pub mod abundance;
pub mod clone_size;
pub mod groups;
pub mod overlap;

pub use abundance::{abundance, diversity, CloneCount, GroupAbundance, GroupDiversity};
pub use clone_size::annotate_clone_sizes;
pub use groups::{group_cells, CellGroup};
pub use overlap::{overlap, overlap_with, OverlapMatrix, OverlapRow};
