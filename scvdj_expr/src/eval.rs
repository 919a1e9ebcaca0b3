// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

// Evaluate an expression tree against one cell.
//
// Rules:
// 1. Comparisons and arithmetic between a chain sequence and a scalar are applied element-wise,
//    giving a sequence as long as the cell's chain list.
// 2. Aggregates (all, any, unique, length, in, sum, min, max) are the way to turn a sequence
//    into a scalar.  On an empty sequence: all = true, any = false, length = 0, in = true,
//    sum = 0, min = max = missing.
// 3. &&, || and ! need scalar booleans.  A sequence reaching one of them is reduced by any(),
//    and the evaluator records that this happened.  A missing scalar counts as false.
// 4. A comparison involving a missing value is false, except != which is true, and missing ==
//    missing which is true.

use crate::expr::{BinOp, Expr, Func, UnOp};
use crate::value::{chain_scalars, Scalar, Value};
use scvdj_core::errors::{VdjError, VdjResult};
use scvdj_core::store::CellRecord;
use std::cmp::Ordering;

#[derive(Default)]
pub struct Evaluator {
    pub implicit_any: bool, // a sequence was reduced by the implicit any()
}

fn mismatch(op: &str, detail: String) -> VdjError {
    VdjError::mismatch(op, &detail)
}

// Field lookup: derived column first, then external field.

fn field_value(cell: &CellRecord, name: &str) -> Scalar {
    if let Some(v) = cell.derived.get(name) {
        return match v {
            Some(x) => Scalar::from_table(x),
            None => Scalar::Missing,
        };
    }
    match cell.fields.get(name) {
        Some(x) => Scalar::from_table(x),
        None => Scalar::Missing,
    }
}

fn compare(op: BinOp, a: &Scalar, b: &Scalar) -> VdjResult<Scalar> {
    if a.is_missing() || b.is_missing() {
        let both = a.is_missing() && b.is_missing();
        return Ok(Scalar::Bool(match op {
            BinOp::Eq => both,
            BinOp::Neq => !both,
            _ => false,
        }));
    }
    let ord = match (a, b) {
        (Scalar::Int(x), Scalar::Int(y)) => Some(x.cmp(y)),
        (Scalar::Str(x), Scalar::Str(y)) => Some(x.cmp(y)),
        (Scalar::Bool(x), Scalar::Bool(y)) if op == BinOp::Eq || op == BinOp::Neq => {
            Some(x.cmp(y))
        }
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => {
                return Err(mismatch(
                    op.symbol(),
                    format!("cannot compare {} with {}", a.kind(), b.kind()),
                ));
            }
        },
    };
    let r = match ord {
        None => op == BinOp::Neq,
        Some(o) => match op {
            BinOp::Eq => o == Ordering::Equal,
            BinOp::Neq => o != Ordering::Equal,
            BinOp::Lt => o == Ordering::Less,
            BinOp::Leq => o != Ordering::Greater,
            BinOp::Gt => o == Ordering::Greater,
            _ => o != Ordering::Less,
        },
    };
    Ok(Scalar::Bool(r))
}

fn arithmetic(op: BinOp, a: &Scalar, b: &Scalar) -> VdjResult<Scalar> {
    if let (BinOp::Add, Scalar::Str(x), Scalar::Str(y)) = (op, a, b) {
        return Ok(Scalar::Str(format!("{}{}", x, y)));
    }
    if a.is_missing() || b.is_missing() {
        return Ok(Scalar::Missing);
    }
    if let (Scalar::Int(x), Scalar::Int(y)) = (a, b) {
        let r = match op {
            BinOp::Add => x.checked_add(*y),
            BinOp::Sub => x.checked_sub(*y),
            BinOp::Mul => x.checked_mul(*y),
            _ => None,
        };
        if op != BinOp::Div {
            return Ok(r.map(Scalar::Int).unwrap_or(Scalar::Missing));
        }
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => Ok(match op {
            BinOp::Add => Scalar::Float(x + y),
            BinOp::Sub => Scalar::Float(x - y),
            BinOp::Mul => Scalar::Float(x * y),
            _ => {
                if y == 0.0 {
                    Scalar::Missing
                } else {
                    Scalar::Float(x / y)
                }
            }
        }),
        _ => Err(mismatch(
            op.symbol(),
            format!("cannot apply to {} and {}", a.kind(), b.kind()),
        )),
    }
}

fn scalar_binary(op: BinOp, a: &Scalar, b: &Scalar) -> VdjResult<Scalar> {
    if op.is_comparison() {
        compare(op, a, b)
    } else {
        arithmetic(op, a, b)
    }
}

// Apply an element operation, broadcasting a scalar over a sequence.

fn broadcast(op: BinOp, l: &Value, r: &Value) -> VdjResult<Value> {
    match (l, r) {
        (Value::Scalar(a), Value::Scalar(b)) => Ok(Value::Scalar(scalar_binary(op, a, b)?)),
        (Value::Chains(u), Value::Scalar(b)) => {
            let mut v = Vec::<Scalar>::with_capacity(u.len());
            for a in u.iter() {
                v.push(scalar_binary(op, a, b)?);
            }
            Ok(Value::Chains(v))
        }
        (Value::Scalar(a), Value::Chains(u)) => {
            let mut v = Vec::<Scalar>::with_capacity(u.len());
            for b in u.iter() {
                v.push(scalar_binary(op, a, b)?);
            }
            Ok(Value::Chains(v))
        }
        (Value::Chains(u), Value::Chains(w)) => {
            if u.len() != w.len() {
                return Err(mismatch(
                    op.symbol(),
                    format!("sequences of lengths {} and {}", u.len(), w.len()),
                ));
            }
            let mut v = Vec::<Scalar>::with_capacity(u.len());
            for j in 0..u.len() {
                v.push(scalar_binary(op, &u[j], &w[j])?);
            }
            Ok(Value::Chains(v))
        }
    }
}

// Truth of one scalar in a boolean context.

fn scalar_truth(op: &str, x: &Scalar) -> VdjResult<bool> {
    match x {
        Scalar::Bool(b) => Ok(*b),
        Scalar::Missing => Ok(false),
        _ => Err(mismatch(op, format!("expected a boolean, found {}", x.kind()))),
    }
}

fn numbers(f: Func, v: &[Scalar]) -> VdjResult<Vec<Scalar>> {
    let mut x = Vec::<Scalar>::new();
    for s in v.iter() {
        match s {
            Scalar::Missing => {}
            Scalar::Int(_) | Scalar::Float(_) => x.push(s.clone()),
            _ => {
                return Err(mismatch(
                    f.name(),
                    format!("expected numbers, found {}", s.kind()),
                ));
            }
        }
    }
    Ok(x)
}

impl Evaluator {
    // Reduce a value to a boolean, applying the implicit any() to a sequence.

    pub fn truth(&mut self, op: &str, v: &Value) -> VdjResult<bool> {
        match v {
            Value::Scalar(x) => scalar_truth(op, x),
            Value::Chains(u) => {
                self.implicit_any = true;
                let mut any = false;
                for x in u.iter() {
                    if scalar_truth(op, x)? {
                        any = true;
                    }
                }
                Ok(any)
            }
        }
    }

    fn call(&mut self, f: Func, args: &[Expr], cell: &CellRecord) -> VdjResult<Value> {
        let x = self.eval(&args[0], cell)?;
        let v = x.elements();
        let r = match f {
            Func::All | Func::Any => {
                let mut t = Vec::<bool>::with_capacity(v.len());
                for s in v.iter() {
                    t.push(scalar_truth(f.name(), s)?);
                }
                if f == Func::All {
                    Scalar::Bool(t.iter().all(|b| *b))
                } else {
                    Scalar::Bool(t.iter().any(|b| *b))
                }
            }
            Func::Unique => {
                return Ok(match x {
                    Value::Chains(u) => {
                        let mut w = Vec::<Scalar>::new();
                        for s in u.into_iter() {
                            if !w.contains(&s) {
                                w.push(s);
                            }
                        }
                        Value::Chains(w)
                    }
                    x => x,
                });
            }
            Func::Length => match x {
                Value::Chains(u) => Scalar::Int(u.len() as i64),
                Value::Scalar(Scalar::Missing) => Scalar::Int(0),
                Value::Scalar(_) => Scalar::Int(1),
            },
            Func::In => {
                let mut coll = Vec::<Scalar>::new();
                for a in args[1..].iter() {
                    coll.append(&mut self.eval(a, cell)?.elements());
                }
                let mut all_in = true;
                for s in v.iter() {
                    let mut found = false;
                    for c in coll.iter() {
                        if compare(BinOp::Eq, s, c)? == Scalar::Bool(true) {
                            found = true;
                            break;
                        }
                    }
                    if !found {
                        all_in = false;
                    }
                }
                Scalar::Bool(all_in)
            }
            Func::Sum => {
                let x = numbers(f, &v)?;
                let mut int_sum = Some(0_i64);
                let mut float_sum = 0.0;
                for s in x.iter() {
                    if let Scalar::Int(n) = s {
                        int_sum = int_sum.and_then(|t| t.checked_add(*n));
                    } else {
                        int_sum = None;
                    }
                    float_sum += s.as_f64().unwrap_or(0.0);
                }
                match int_sum {
                    Some(t) => Scalar::Int(t),
                    None => Scalar::Float(float_sum),
                }
            }
            Func::Min | Func::Max => {
                let x = numbers(f, &v)?;
                let mut best: Option<Scalar> = None;
                for s in x.into_iter() {
                    best = match best {
                        None => Some(s),
                        Some(b) => {
                            let less = compare(BinOp::Lt, &s, &b)? == Scalar::Bool(true);
                            if less == (f == Func::Min) && s != b {
                                Some(s)
                            } else {
                                Some(b)
                            }
                        }
                    };
                }
                best.unwrap_or(Scalar::Missing)
            }
        };
        Ok(Value::Scalar(r))
    }

    pub fn eval(&mut self, expr: &Expr, cell: &CellRecord) -> VdjResult<Value> {
        match expr {
            Expr::Const(x) => Ok(Value::Scalar(x.clone())),
            Expr::Chains(attr) => Ok(Value::Chains(chain_scalars(&cell.chains, *attr))),
            Expr::Field(name) => Ok(Value::Scalar(field_value(cell, name))),
            Expr::List(items) => {
                let mut v = Vec::<Scalar>::new();
                for x in items.iter() {
                    v.append(&mut self.eval(x, cell)?.elements());
                }
                Ok(Value::Chains(v))
            }
            Expr::Unary(UnOp::Not, x) => {
                let v = self.eval(x, cell)?;
                Ok(Value::Scalar(Scalar::Bool(!self.truth("!", &v)?)))
            }
            Expr::Unary(UnOp::Neg, x) => {
                let v = self.eval(x, cell)?;
                let zero = Value::Scalar(Scalar::Int(0));
                broadcast(BinOp::Sub, &zero, &v).map_err(|_| {
                    mismatch("-", format!("cannot negate {}", v.kind()))
                })
            }
            Expr::Binary(op, x, y) => {
                let l = self.eval(x, cell)?;
                let r = self.eval(y, cell)?;
                match op {
                    BinOp::And | BinOp::Or => {
                        let a = self.truth(op.symbol(), &l)?;
                        let b = self.truth(op.symbol(), &r)?;
                        let t = if *op == BinOp::And { a && b } else { a || b };
                        Ok(Value::Scalar(Scalar::Bool(t)))
                    }
                    _ => broadcast(*op, &l, &r),
                }
            }
            Expr::Call(f, args) => self.call(*f, args, cell),
        }
    }
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
