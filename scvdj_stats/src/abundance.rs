// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

// Clonotype abundance and diversity per group.

use crate::groups::{group_cells, CellGroup};
use scvdj_core::defs::VdjControl;
use scvdj_core::errors::VdjResult;
use scvdj_core::store::RecordStore;
use serde_derive::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CloneCount {
    pub clonotype: String,
    pub count: usize,
    pub percent: f64, // of the classified cells of the group
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupAbundance {
    pub group: String,
    pub n_cells: usize,
    pub n_classified: usize,
    pub clones: Vec<CloneCount>, // largest first, ties by clonotype
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupDiversity {
    pub group: String,
    pub n_classified: usize,
    pub n_clonotypes: usize,
    pub inverse_simpson: Option<f64>,
}

pub fn group_abundance(g: &CellGroup) -> GroupAbundance {
    let n = g.n_classified();
    let mut counts = g.clone_counts();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let clones = counts
        .into_iter()
        .map(|(clonotype, count)| CloneCount {
            clonotype,
            count,
            percent: 100.0 * count as f64 / n as f64,
        })
        .collect();
    GroupAbundance {
        group: g.name.clone(),
        n_cells: g.cells.len(),
        n_classified: n,
        clones,
    }
}

// Inverse Simpson index 1 / Σ p_i², where p_i is the fraction of classified cells in
// clonotype i.

pub fn inverse_simpson(counts: &[usize]) -> Option<f64> {
    let n = counts.iter().sum::<usize>();
    if n == 0 {
        return None;
    }
    let mut s = 0.0;
    for &c in counts.iter() {
        let p = c as f64 / n as f64;
        s += p * p;
    }
    Some(1.0 / s)
}

pub fn group_diversity(g: &CellGroup) -> GroupDiversity {
    let counts = g.clone_counts().iter().map(|x| x.1).collect::<Vec<_>>();
    GroupDiversity {
        group: g.name.clone(),
        n_classified: g.n_classified(),
        n_clonotypes: counts.len(),
        inverse_simpson: inverse_simpson(&counts),
    }
}

pub fn abundance(store: &RecordStore, ctl: &VdjControl) -> VdjResult<Vec<GroupAbundance>> {
    Ok(group_cells(store, ctl)?.iter().map(group_abundance).collect())
}

pub fn diversity(store: &RecordStore, ctl: &VdjControl) -> VdjResult<Vec<GroupDiversity>> {
    Ok(group_cells(store, ctl)?.iter().map(group_diversity).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_simpson() {
        assert_eq!(inverse_simpson(&[7]), Some(1.0));
        assert!((inverse_simpson(&[1, 1, 1, 1, 1]).unwrap() - 5.0).abs() < 1.0e-9);
        assert_eq!(inverse_simpson(&[]), None);
        let x = inverse_simpson(&[2, 1, 1]).unwrap();
        assert!((x - 16.0 / 6.0).abs() < 1.0e-12);
    }

    #[test]
    fn test_ranking() {
        let g = CellGroup {
            name: "s1".to_string(),
            cells: vec![0, 1, 2, 3, 4, 5],
            clonotypes: vec![
                Some("c9".to_string()),
                Some("c2".to_string()),
                None,
                Some("c9".to_string()),
                Some("c1".to_string()),
                Some("c2".to_string()),
            ],
        };
        let a = group_abundance(&g);
        assert_eq!(a.n_cells, 6);
        assert_eq!(a.n_classified, 5);
        let order = a.clones.iter().map(|c| c.clonotype.as_str()).collect::<Vec<_>>();
        assert_eq!(order, vec!["c2", "c9", "c1"]);
        assert_eq!(a.clones[0].count, 2);
        assert!((a.clones[2].percent - 20.0).abs() < 1.0e-12);
    }
}
