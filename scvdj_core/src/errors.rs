// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

// Error taxonomy shared by all scvdj crates.

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum VdjError {
    // Import data violate the one-entry-per-chain invariant, or a chain field cannot be parsed.
    #[error("malformed record for cell {cell}, column {column}: {detail}")]
    MalformedRecord {
        cell: String,
        column: String,
        detail: String,
    },

    #[error("unknown identifier \"{0}\" in expression")]
    UnknownIdentifier(String),

    #[error("type mismatch in operator {operator}: {detail}")]
    TypeMismatch { operator: String, detail: String },

    #[error("could not parse expression: {0}")]
    ExpressionSyntax(String),

    // Non-fatal: carried as a warning by clustering, never returned as Err by it.
    #[error("no cell has a chain of an included type, so the neighbor graph is empty")]
    EmptyGraph,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl VdjError {
    pub fn malformed(cell: &str, column: &str, detail: &str) -> VdjError {
        VdjError::MalformedRecord {
            cell: cell.to_string(),
            column: column.to_string(),
            detail: detail.to_string(),
        }
    }

    pub fn mismatch(operator: &str, detail: &str) -> VdjError {
        VdjError::TypeMismatch {
            operator: operator.to_string(),
            detail: detail.to_string(),
        }
    }

    pub fn config(msg: &str) -> VdjError {
        VdjError::InvalidConfiguration(msg.to_string())
    }
}

pub type VdjResult<T> = Result<T, VdjError>;
