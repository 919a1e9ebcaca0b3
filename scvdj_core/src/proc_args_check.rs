// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

// Check lots of arguments.  Everything here runs before any computation starts.

use crate::defs::VdjControl;
use crate::errors::{VdjError, VdjResult};

pub fn check_args(ctl: &VdjControl) -> VdjResult<()> {
    if ctl.graph_opt.k == 0 {
        return Err(VdjError::config("K must be positive"));
    }
    let r = ctl.cluster_opt.resolution;
    if !r.is_finite() || r <= 0.0 {
        return Err(VdjError::config(&format!(
            "RESOLUTION must be a positive number, not {}",
            r
        )));
    }
    if let Some(chains) = &ctl.graph_opt.chains {
        if chains.is_empty() {
            return Err(VdjError::config("CHAINS must name at least one chain type"));
        }
    }
    if ctl.stats_opt.clone_col.is_empty() {
        return Err(VdjError::config("CLONE must name a column"));
    }
    if let Some(g) = &ctl.stats_opt.group_col {
        if g.is_empty() {
            return Err(VdjError::config("GROUP must name a column"));
        }
    }
    Ok(())
}
