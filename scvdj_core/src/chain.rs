// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

// Receptor chain types and per-chain records.

use serde_derive::{Deserialize, Serialize};
use std::fmt;

// Chain types.  The declaration order is the fixed priority order used to canonicalize the
// chains of a cell: heavy before light for BCR, then the TCR chains.

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ChainType {
    IGH,
    IGK,
    IGL,
    TRA,
    TRB,
    TRD,
    TRG,
    Other,
}

pub const CHAIN_TYPES: [ChainType; 8] = [
    ChainType::IGH,
    ChainType::IGK,
    ChainType::IGL,
    ChainType::TRA,
    ChainType::TRB,
    ChainType::TRD,
    ChainType::TRG,
    ChainType::Other,
];

impl ChainType {
    pub fn name(&self) -> &'static str {
        match self {
            ChainType::IGH => "IGH",
            ChainType::IGK => "IGK",
            ChainType::IGL => "IGL",
            ChainType::TRA => "TRA",
            ChainType::TRB => "TRB",
            ChainType::TRD => "TRD",
            ChainType::TRG => "TRG",
            ChainType::Other => "other",
        }
    }

    // Strict parse, used for user-requested chain filters.

    pub fn from_name(s: &str) -> Option<ChainType> {
        let u = s.trim().to_uppercase();
        for t in CHAIN_TYPES.iter() {
            if t.name().to_uppercase() == u {
                return Some(*t);
            }
        }
        None
    }

    // Lenient parse, used on import: anything unrecognized is Other.

    pub fn parse(s: &str) -> ChainType {
        ChainType::from_name(s).unwrap_or(ChainType::Other)
    }

    pub fn priority(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ChainType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<String> for ChainType {
    fn from(s: String) -> ChainType {
        ChainType::parse(&s)
    }
}

impl From<ChainType> for String {
    fn from(t: ChainType) -> String {
        t.name().to_string()
    }
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

// One detected receptor chain.  Created at import and never modified afterwards.

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainRecord {
    pub chain_type: ChainType,
    pub cdr3_nt: String,
    pub cdr3_aa: String,
    pub v_gene: Option<String>,
    pub d_gene: Option<String>,
    pub j_gene: Option<String>,
    pub c_gene: Option<String>,
    pub reads: u64,
    pub umis: u64,
    pub productive: bool,
    pub clonotype_id: String, // assigned upstream
}

impl ChainRecord {
    pub fn new(chain_type: ChainType, cdr3_aa: &str) -> ChainRecord {
        ChainRecord {
            chain_type,
            cdr3_nt: String::new(),
            cdr3_aa: cdr3_aa.to_string(),
            v_gene: None,
            d_gene: None,
            j_gene: None,
            c_gene: None,
            reads: 0,
            umis: 0,
            productive: true,
            clonotype_id: String::new(),
        }
    }

    // String form of one attribute, as stored in the metadata table.  None for an absent gene.

    pub fn attr_string(&self, attr: ChainAttr) -> Option<String> {
        match attr {
            ChainAttr::ChainType => Some(self.chain_type.name().to_string()),
            ChainAttr::Cdr3Nt => Some(self.cdr3_nt.clone()),
            ChainAttr::Cdr3Aa => Some(self.cdr3_aa.clone()),
            ChainAttr::VGene => self.v_gene.clone(),
            ChainAttr::DGene => self.d_gene.clone(),
            ChainAttr::JGene => self.j_gene.clone(),
            ChainAttr::CGene => self.c_gene.clone(),
            ChainAttr::Reads => Some(self.reads.to_string()),
            ChainAttr::Umis => Some(self.umis.to_string()),
            ChainAttr::Productive => Some(self.productive.to_string()),
            ChainAttr::ClonotypeId => Some(self.clonotype_id.clone()),
        }
    }

    pub fn seq(&self, col: SeqColumn) -> &str {
        match col {
            SeqColumn::Cdr3Aa => &self.cdr3_aa,
            SeqColumn::Cdr3Nt => &self.cdr3_nt,
        }
    }
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

// Chain-level attributes.  These are the multi-valued columns of the metadata table.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChainAttr {
    ChainType,
    Cdr3Nt,
    Cdr3Aa,
    VGene,
    DGene,
    JGene,
    CGene,
    Reads,
    Umis,
    Productive,
    ClonotypeId,
}

pub const CHAIN_ATTRS: [ChainAttr; 11] = [
    ChainAttr::ChainType,
    ChainAttr::Cdr3Nt,
    ChainAttr::Cdr3Aa,
    ChainAttr::VGene,
    ChainAttr::DGene,
    ChainAttr::JGene,
    ChainAttr::CGene,
    ChainAttr::Reads,
    ChainAttr::Umis,
    ChainAttr::Productive,
    ChainAttr::ClonotypeId,
];

impl ChainAttr {
    pub fn name(&self) -> &'static str {
        match self {
            ChainAttr::ChainType => "chain_type",
            ChainAttr::Cdr3Nt => "cdr3_nt",
            ChainAttr::Cdr3Aa => "cdr3_aa",
            ChainAttr::VGene => "v_gene",
            ChainAttr::DGene => "d_gene",
            ChainAttr::JGene => "j_gene",
            ChainAttr::CGene => "c_gene",
            ChainAttr::Reads => "reads",
            ChainAttr::Umis => "umis",
            ChainAttr::Productive => "productive",
            ChainAttr::ClonotypeId => "clonotype_id",
        }
    }

    pub fn from_name(s: &str) -> Option<ChainAttr> {
        CHAIN_ATTRS.iter().copied().find(|a| a.name() == s)
    }
}

// Which per-chain sequence is compared or exposed as ".seqs".

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeqColumn {
    Cdr3Aa,
    Cdr3Nt,
}

impl SeqColumn {
    pub fn attr(&self) -> ChainAttr {
        match self {
            SeqColumn::Cdr3Aa => ChainAttr::Cdr3Aa,
            SeqColumn::Cdr3Nt => ChainAttr::Cdr3Nt,
        }
    }

    pub fn from_name(s: &str) -> Option<SeqColumn> {
        match s {
            "cdr3_aa" => Some(SeqColumn::Cdr3Aa),
            "cdr3_nt" => Some(SeqColumn::Cdr3Nt),
            _ => None,
        }
    }
}

impl Default for SeqColumn {
    fn default() -> SeqColumn {
        SeqColumn::Cdr3Aa
    }
}
