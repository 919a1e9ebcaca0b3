// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

// Annotate each cell with the size of its clonotype: <prefix>clone_freq is the number of cells
// in the clonotype and <prefix>clone_frac that number over the classified cells.  Both are
// counted within the cell's group when a grouping column is given.

use crate::groups::group_cells;
use log::info;
use scvdj_core::defs::VdjControl;
use scvdj_core::errors::VdjResult;
use scvdj_core::store::RecordStore;
use std::collections::HashMap;

pub fn annotate_clone_sizes(store: &mut RecordStore, ctl: &VdjControl) -> VdjResult<()> {
    let groups = group_cells(store, ctl)?;
    let mut freq = vec![None; store.len()];
    let mut frac = vec![None; store.len()];
    let cells = store.cells();
    for g in groups.iter() {
        let n = g.n_classified();
        let counts = g.clone_counts().into_iter().collect::<HashMap<String, usize>>();
        for (k, &i) in g.cells.iter().enumerate() {
            if !cells[i].is_vdj() {
                continue;
            }
            if let Some(c) = &g.clonotypes[k] {
                let f = counts[c];
                freq[i] = Some(f.to_string());
                frac[i] = Some((f as f64 / n as f64).to_string());
            }
        }
    }
    let n = freq.iter().filter(|x| x.is_some()).count();
    store.commit(&ctl.column("clone_freq"), freq)?;
    store.commit(&ctl.column("clone_frac"), frac)?;
    info!("annotated clone sizes for {} cells", n);
    Ok(())
}
