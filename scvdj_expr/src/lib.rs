// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

// Per-cell expressions over cells carrying a variable number of chains.

pub mod engine;
pub mod eval;
pub mod expr;
pub mod value;

pub use engine::{derive_column, evaluate_cells, filter_cells_by_expr, Expression};
pub use value::{Scalar, Value};
