// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

// Canonical chain keys.  The chains of a cell are reordered by chain type priority and then by
// sequence, so that the order in which chains were detected does not matter.

use itertools::Itertools;
use scvdj_core::chain::{ChainRecord, ChainType};
use scvdj_core::defs::{GraphOpt, KEY_SEP};

// Included chains with a sequence, as (type, sequence), in canonical order.

pub fn canonical_chains<'a>(
    chains: &'a [ChainRecord],
    opt: &GraphOpt,
) -> Vec<(ChainType, &'a str)> {
    let mut x = Vec::<(ChainType, &str)>::new();
    for c in chains.iter() {
        let seq = c.seq(opt.seq_col);
        if opt.includes(c.chain_type) && !seq.is_empty() {
            x.push((c.chain_type, seq));
        }
    }
    x.sort_by(|a, b| (a.0.priority(), a.1).cmp(&(b.0.priority(), b.1)));
    x
}

// For example IGH:CARDYW|IGK:CQQYNSW.  Empty if the cell has no included chain.

pub fn canonical_key(chains: &[ChainRecord], opt: &GraphOpt) -> String {
    canonical_chains(chains, opt)
        .iter()
        .map(|(t, s)| format!("{}:{}", t.name(), s))
        .format(KEY_SEP)
        .to_string()
}

// Bit set of the chain types present in a canonical chain list.

pub fn type_mask(chains: &[(ChainType, &str)]) -> u16 {
    let mut m = 0_u16;
    for (t, _) in chains.iter() {
        m |= 1 << t.priority();
    }
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use scvdj_core::chain::SeqColumn;

    fn chain(t: ChainType, aa: &str, nt: &str) -> ChainRecord {
        let mut c = ChainRecord::new(t, aa);
        c.cdr3_nt = nt.to_string();
        c
    }

    #[test]
    fn test_canonical_key() {
        let chains = vec![
            chain(ChainType::IGK, "CQQS", "TGTCAG"),
            chain(ChainType::IGH, "CART", "TGTGCG"),
            chain(ChainType::IGH, "CARS", "TGTGCA"),
        ];
        let mut opt = GraphOpt::default();
        assert_eq!(canonical_key(&chains, &opt), "IGH:CARS|IGH:CART|IGK:CQQS");
        opt.seq_col = SeqColumn::Cdr3Nt;
        assert_eq!(canonical_key(&chains, &opt), "IGH:TGTGCA|IGH:TGTGCG|IGK:TGTCAG");
        opt.chains = Some(vec![ChainType::IGK]);
        assert_eq!(canonical_key(&chains, &opt), "IGK:TGTCAG");
        opt.chains = Some(vec![ChainType::TRB]);
        assert_eq!(canonical_key(&chains, &opt), "");
        assert_eq!(canonical_key(&[], &GraphOpt::default()), "");
        let opt = GraphOpt::default();
        let x = canonical_chains(&chains, &opt);
        assert_eq!(type_mask(&x), 0b11);
    }
}
