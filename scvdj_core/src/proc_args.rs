// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

// Process KEY=VALUE arguments into a VdjControl.

use crate::chain::{ChainType, SeqColumn};
use crate::defs::VdjControl;
use crate::errors::{VdjError, VdjResult};
use crate::proc_args_check::check_args;
use string_utils::TextUtils;

// Simple arguments.  We test for e.g. DROP_NON_VDJ or DROP_NON_VDJ=, the latter to allow for
// the case where the argument has been set by an environment variable.

pub fn is_simple_arg(arg: &str, x: &str) -> VdjResult<bool> {
    if arg == x || arg == format!("{}=", x) {
        Ok(true)
    } else if arg.starts_with(&format!("{}=", x)) {
        Err(VdjError::config(&format!(
            "\"{}\" is not a valid argument, perhaps you meant \"{}\"",
            arg, x
        )))
    } else {
        Ok(false)
    }
}

fn parse_chains(val: &str) -> VdjResult<Option<Vec<ChainType>>> {
    if val == "all" || val == "ALL" {
        return Ok(None);
    }
    let mut chains = Vec::<ChainType>::new();
    for x in val.split(',') {
        match ChainType::from_name(x) {
            Some(t) => {
                if !chains.contains(&t) {
                    chains.push(t);
                }
            }
            None => {
                return Err(VdjError::config(&format!(
                    "unknown chain type \"{}\" in CHAINS={}",
                    x, val
                )));
            }
        }
    }
    Ok(Some(chains))
}

pub fn proc_args(ctl: &mut VdjControl, args: &[String]) -> VdjResult<()> {
    for arg in args.iter() {
        let arg = arg.as_str();
        if arg.is_empty() {
            continue;
        }
        if is_simple_arg(arg, "DROP_NON_VDJ")? {
            ctl.gen_opt.drop_non_vdj = true;
        } else if arg.starts_with("CHAINS=") {
            ctl.graph_opt.chains = parse_chains(arg.after("CHAINS="))?;
        } else if arg.starts_with("SEQ=") {
            let val = arg.after("SEQ=");
            ctl.graph_opt.seq_col = SeqColumn::from_name(val).ok_or_else(|| {
                VdjError::config(&format!("SEQ must be cdr3_aa or cdr3_nt, not \"{}\"", val))
            })?;
        } else if arg.starts_with("K=") {
            let val = arg.after("K=");
            ctl.graph_opt.k = val.parse::<usize>().map_err(|_| {
                VdjError::config(&format!("K must be a nonnegative integer, not \"{}\"", val))
            })?;
        } else if arg.starts_with("RESOLUTION=") {
            let val = arg.after("RESOLUTION=");
            ctl.cluster_opt.resolution = val.parse::<f64>().map_err(|_| {
                VdjError::config(&format!("RESOLUTION must be a number, not \"{}\"", val))
            })?;
        } else if arg.starts_with("GROUP=") {
            ctl.stats_opt.group_col = Some(arg.after("GROUP=").to_string());
        } else if arg.starts_with("CLONE=") {
            ctl.stats_opt.clone_col = arg.after("CLONE=").to_string();
        } else if arg.starts_with("PREFIX=") {
            ctl.gen_opt.prefix = arg.after("PREFIX=").to_string();
        } else {
            return Err(VdjError::config(&format!("unrecognized argument \"{}\"", arg)));
        }
    }
    check_args(ctl)
}

impl VdjControl {
    pub fn from_args(args: &[String]) -> VdjResult<VdjControl> {
        let mut ctl = VdjControl::default();
        proc_args(&mut ctl, args)?;
        Ok(ctl)
    }
}
