// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

// Values seen by the expression engine.  A value is either a scalar or a per-chain sequence of
// scalars.  Nothing converts a sequence into a scalar except an aggregate function, or the
// implicit any() applied at boolean combinators.

use itertools::Itertools;
use scvdj_core::chain::{ChainAttr, ChainRecord};
use scvdj_core::defs::{MISSING, MULTI_SEP};
use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Missing,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    // Type a value read from the metadata table: integer, else finite float, else boolean, else
    // string.  "inf" and "NaN" stay strings.

    pub fn from_table(x: &str) -> Scalar {
        if x.is_empty() || x == MISSING {
            Scalar::Missing
        } else if let Ok(n) = x.parse::<i64>() {
            Scalar::Int(n)
        } else if let Some(f) = x.parse::<f64>().ok().filter(|f| f.is_finite()) {
            Scalar::Float(f)
        } else if x == "true" {
            Scalar::Bool(true)
        } else if x == "false" {
            Scalar::Bool(false)
        } else {
            Scalar::Str(x.to_string())
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Scalar::Missing => "missing",
            Scalar::Bool(_) => "boolean",
            Scalar::Int(_) => "integer",
            Scalar::Float(_) => "float",
            Scalar::Str(_) => "string",
        }
    }

    pub fn is_missing(&self) -> bool {
        *self == Scalar::Missing
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(n) => Some(*n as f64),
            Scalar::Float(f) => Some(*f),
            _ => None,
        }
    }

    // The string stored in a derived column.

    pub fn to_stored(&self) -> Option<String> {
        match self {
            Scalar::Missing => None,
            x => Some(x.to_string()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Scalar::Missing => write!(f, "{}", MISSING),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(n) => write!(f, "{}", n),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Str(s) => write!(f, "{}", s),
        }
    }
}

// Per-chain values of a chain attribute, typed.

pub fn chain_scalars(chains: &[ChainRecord], attr: ChainAttr) -> Vec<Scalar> {
    let mut v = Vec::<Scalar>::with_capacity(chains.len());
    for c in chains.iter() {
        let x = match attr {
            ChainAttr::Reads => Scalar::Int(c.reads as i64),
            ChainAttr::Umis => Scalar::Int(c.umis as i64),
            ChainAttr::Productive => Scalar::Bool(c.productive),
            _ => match c.attr_string(attr) {
                Some(s) => Scalar::Str(s),
                None => Scalar::Missing,
            },
        };
        v.push(x);
    }
    v
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Scalar(Scalar),
    Chains(Vec<Scalar>),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Scalar(x) => x.kind(),
            Value::Chains(_) => "chain sequence",
        }
    }

    // What gets written to a derived column.  A sequence is joined in chain order; an empty
    // sequence is missing.

    pub fn to_stored(&self) -> Option<String> {
        match self {
            Value::Scalar(x) => x.to_stored(),
            Value::Chains(v) => {
                if v.is_empty() {
                    None
                } else {
                    Some(v.iter().format(MULTI_SEP).to_string())
                }
            }
        }
    }

    // Elements, with a scalar treated as a sequence of one.

    pub fn elements(&self) -> Vec<Scalar> {
        match self {
            Value::Scalar(x) => vec![x.clone()],
            Value::Chains(v) => v.clone(),
        }
    }
}
