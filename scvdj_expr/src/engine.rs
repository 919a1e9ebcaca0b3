// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

// Filter and derive over a record store.  The expression is parsed once, its identifiers are
// checked against the store, and then every cell is evaluated in parallel.  Nothing is written
// unless every cell evaluates.

use crate::eval::Evaluator;
use crate::expr::{parse_expr, Expr, CHAINS_ALIAS, SEQS_ALIAS};
use crate::value::Value;
use log::{debug, info};
use rayon::prelude::*;
use scvdj_core::chain::ChainAttr;
use scvdj_core::defs::VdjControl;
use scvdj_core::errors::{VdjError, VdjResult};
use scvdj_core::proc_args_check::check_args;
use scvdj_core::store::{RecordStore, StoreView};

#[derive(Clone, Debug)]
pub struct Expression {
    pub text: String,
    pub tree: Expr,
}

impl Expression {
    pub fn parse(text: &str, ctl: &VdjControl) -> VdjResult<Expression> {
        Ok(Expression {
            text: text.to_string(),
            tree: parse_expr(text, ctl.graph_opt.seq_col)?,
        })
    }

    // Every scalar identifier has to be a column of some cell.

    pub fn check_identifiers(&self, store: &RecordStore) -> VdjResult<()> {
        for name in self.tree.fields().iter() {
            if !store.has_column(name) {
                return Err(VdjError::UnknownIdentifier(name.clone()));
            }
        }
        Ok(())
    }
}

// Evaluate for every cell, in store order.  The first failing cell in store order determines
// the error.

pub fn evaluate_cells(store: &RecordStore, expr: &Expression) -> VdjResult<Vec<Value>> {
    expr.check_identifiers(store)?;
    let cells = store.cells();
    let mut results = Vec::<(usize, VdjResult<Value>, bool)>::new();
    for i in 0..cells.len() {
        results.push((i, Ok(Value::Chains(Vec::new())), false));
    }
    results.par_iter_mut().for_each(|res| {
        let i = res.0;
        let mut ev = Evaluator::default();
        res.1 = ev.eval(&expr.tree, &cells[i]);
        res.2 = ev.implicit_any;
    });
    if results.iter().any(|r| r.2) {
        debug!(
            "a chain sequence was reduced by an implicit any() in \"{}\"",
            expr.text
        );
    }
    let mut values = Vec::<Value>::with_capacity(results.len());
    for r in results.into_iter() {
        values.push(r.1?);
    }
    Ok(values)
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

// Keep the cells for which the expression is true.  Cells without chains are kept unless
// DROP_NON_VDJ was given, in which case they are dropped whatever the expression says.

pub fn filter_cells_by_expr<'a>(
    store: &'a RecordStore,
    text: &str,
    ctl: &VdjControl,
) -> VdjResult<StoreView<'a>> {
    check_args(ctl)?;
    let expr = Expression::parse(text, ctl)?;
    let values = evaluate_cells(store, &expr)?;
    let cells = store.cells();
    let mut keep = Vec::<usize>::new();
    let mut ev = Evaluator::default();
    for i in 0..cells.len() {
        let pass = if !cells[i].is_vdj() {
            !ctl.gen_opt.drop_non_vdj
        } else {
            ev.truth("filter", &values[i])?
        };
        if pass {
            keep.push(i);
        }
    }
    if ev.implicit_any {
        debug!(
            "filter \"{}\" yields a chain sequence, reduced by an implicit any()",
            text
        );
    }
    info!(
        "filter \"{}\" kept {} of {} cells",
        text,
        keep.len(),
        cells.len()
    );
    Ok(store.view_of(keep))
}

// A derived column may not shadow a chain attribute or an alias, since those are resolved first.

fn check_derived_name(column: &str) -> VdjResult<()> {
    if column.is_empty() {
        return Err(VdjError::config("derived column name is empty"));
    }
    if column == CHAINS_ALIAS || column == SEQS_ALIAS || ChainAttr::from_name(column).is_some() {
        return Err(VdjError::config(&format!(
            "derived column name {} is reserved for chain attributes",
            column
        )));
    }
    Ok(())
}

// Write the expression value of every cell to a derived column.

pub fn derive_column(
    store: &mut RecordStore,
    column: &str,
    text: &str,
    ctl: &VdjControl,
) -> VdjResult<()> {
    check_args(ctl)?;
    check_derived_name(column)?;
    let expr = Expression::parse(text, ctl)?;
    let values = evaluate_cells(store, &expr)?;
    let stored = values.iter().map(|v| v.to_stored()).collect::<Vec<_>>();
    let n = stored.iter().filter(|v| v.is_some()).count();
    store.commit(column, stored)?;
    info!(
        "derived column {} from \"{}\", {} of {} cells non-missing",
        column,
        text,
        n,
        store.len()
    );
    Ok(())
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

#[cfg(test)]
mod tests {
    use super::*;
    use scvdj_core::chain::{ChainRecord, ChainType};
    use scvdj_core::store::CellRecord;

    #[test]
    fn test_first_error_wins() {
        let store = RecordStore::new(vec![
            CellRecord::new("c1", vec![ChainRecord::new(ChainType::IGH, "CARS")])
                .with_field("x", "abc"),
            CellRecord::new("c2", Vec::new()).with_field("x", "7"),
        ])
        .unwrap();
        let ctl = VdjControl::default();
        let e = Expression::parse("x > 3", &ctl).unwrap();
        match evaluate_cells(&store, &e) {
            Err(VdjError::TypeMismatch { operator, .. }) => assert_eq!(operator, ">"),
            r => panic!("unexpected {:?}", r),
        }
        let e = Expression::parse("y > 3", &ctl).unwrap();
        assert_eq!(
            evaluate_cells(&store, &e).unwrap_err(),
            VdjError::UnknownIdentifier("y".to_string())
        );
    }
}
