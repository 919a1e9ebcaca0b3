// Copyright (c) 2021 10X Genomics, Inc. All rights reserved.

// Typed expression tree.  Expression text is parsed by evalexpr into an operator tree once per
// call, and the operator tree is translated here, binding every identifier to either a chain
// attribute or a scalar column.

use crate::value::Scalar;
use evalexpr::{build_operator_tree, Node, Operator};
use scvdj_core::chain::{ChainAttr, SeqColumn};
use scvdj_core::errors::{VdjError, VdjResult};

// Reserved identifiers.

pub const CHAINS_ALIAS: &str = ".chains"; // chain types of the cell
pub const SEQS_ALIAS: &str = ".seqs"; // selected sequence column of the cell

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Eq,
    Neq,
    Lt,
    Leq,
    Gt,
    Geq,
    Add,
    Sub,
    Mul,
    Div,
    And,
    Or,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Eq => "==",
            BinOp::Neq => "!=",
            BinOp::Lt => "<",
            BinOp::Leq => "<=",
            BinOp::Gt => ">",
            BinOp::Geq => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::Neq | BinOp::Lt | BinOp::Leq | BinOp::Gt | BinOp::Geq
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Func {
    All,
    Any,
    Unique,
    Length,
    In,
    Sum,
    Min,
    Max,
}

impl Func {
    pub fn from_name(s: &str) -> Option<Func> {
        match s {
            "all" => Some(Func::All),
            "any" => Some(Func::Any),
            "unique" => Some(Func::Unique),
            "length" => Some(Func::Length),
            "in" => Some(Func::In),
            "sum" => Some(Func::Sum),
            "min" => Some(Func::Min),
            "max" => Some(Func::Max),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Func::All => "all",
            Func::Any => "any",
            Func::Unique => "unique",
            Func::Length => "length",
            Func::In => "in",
            Func::Sum => "sum",
            Func::Min => "min",
            Func::Max => "max",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Const(Scalar),
    Chains(ChainAttr), // per-chain sequence of the cell
    Field(String),     // scalar column of the cell
    List(Vec<Expr>),   // literal tuple, evaluates to a sequence
    Unary(UnOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Call(Func, Vec<Expr>),
}

impl Expr {
    // Names of the scalar columns referenced.

    pub fn fields(&self) -> Vec<String> {
        let mut names = Vec::<String>::new();
        self.collect_fields(&mut names);
        names.sort();
        names.dedup();
        names
    }

    fn collect_fields(&self, names: &mut Vec<String>) {
        match self {
            Expr::Field(name) => names.push(name.clone()),
            Expr::Const(_) | Expr::Chains(_) => {}
            Expr::List(v) | Expr::Call(_, v) => {
                for x in v.iter() {
                    x.collect_fields(names);
                }
            }
            Expr::Unary(_, x) => x.collect_fields(names),
            Expr::Binary(_, x, y) => {
                x.collect_fields(names);
                y.collect_fields(names);
            }
        }
    }
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓

fn syntax(msg: &str) -> VdjError {
    VdjError::ExpressionSyntax(msg.to_string())
}

fn bind_identifier(id: &str, seq_col: SeqColumn) -> Expr {
    if id == CHAINS_ALIAS {
        Expr::Chains(ChainAttr::ChainType)
    } else if id == SEQS_ALIAS {
        Expr::Chains(seq_col.attr())
    } else if let Some(attr) = ChainAttr::from_name(id) {
        Expr::Chains(attr)
    } else {
        Expr::Field(id.to_string())
    }
}

fn constant(value: &evalexpr::Value) -> VdjResult<Expr> {
    Ok(match value {
        evalexpr::Value::String(s) => Expr::Const(Scalar::Str(s.clone())),
        evalexpr::Value::Int(n) => Expr::Const(Scalar::Int(*n)),
        evalexpr::Value::Float(x) => Expr::Const(Scalar::Float(*x)),
        evalexpr::Value::Boolean(b) => Expr::Const(Scalar::Bool(*b)),
        evalexpr::Value::Empty => Expr::Const(Scalar::Missing),
        evalexpr::Value::Tuple(t) => {
            let mut items = Vec::<Expr>::new();
            for x in t.iter() {
                match constant(x)? {
                    Expr::List(_) => return Err(syntax("nested tuples are not allowed")),
                    e => items.push(e),
                }
            }
            Expr::List(items)
        }
    })
}

// Tuple items.  "a, b, c" may come back from evalexpr as one tuple or as nested tuples; both
// give the same items.

fn tuple_items(node: &Node, seq_col: SeqColumn, items: &mut Vec<Expr>) -> VdjResult<()> {
    if let Operator::Tuple = node.operator() {
        for x in node.children().iter() {
            tuple_items(x, seq_col, items)?;
        }
    } else {
        items.push(translate(node, seq_col)?);
    }
    Ok(())
}

// Function arguments: the parenthesized group following the function name.

fn function_args(node: &Node, seq_col: SeqColumn, args: &mut Vec<Expr>) -> VdjResult<()> {
    match node.operator() {
        Operator::RootNode => {
            for x in node.children().iter() {
                function_args(x, seq_col, args)?;
            }
            Ok(())
        }
        Operator::Tuple => tuple_items(node, seq_col, args),
        _ => {
            args.push(translate(node, seq_col)?);
            Ok(())
        }
    }
}

fn binary(op: BinOp, node: &Node, seq_col: SeqColumn) -> VdjResult<Expr> {
    let kids = node.children();
    if kids.len() != 2 {
        return Err(syntax(&format!("operator {} needs two operands", op.symbol())));
    }
    Ok(Expr::Binary(
        op,
        Box::new(translate(&kids[0], seq_col)?),
        Box::new(translate(&kids[1], seq_col)?),
    ))
}

fn unary(op: UnOp, node: &Node, seq_col: SeqColumn) -> VdjResult<Expr> {
    let kids = node.children();
    if kids.len() != 1 {
        return Err(syntax("unary operator needs one operand"));
    }
    Ok(Expr::Unary(op, Box::new(translate(&kids[0], seq_col)?)))
}

fn translate(node: &Node, seq_col: SeqColumn) -> VdjResult<Expr> {
    let kids = node.children();
    match node.operator() {
        Operator::RootNode => match kids.len() {
            0 => Err(syntax("empty expression")),
            1 => translate(&kids[0], seq_col),
            _ => Err(syntax("unexpected expression structure")),
        },
        Operator::Const { value } => constant(value),
        Operator::VariableIdentifier { identifier } => Ok(bind_identifier(identifier, seq_col)),
        Operator::FunctionIdentifier { identifier } => {
            let f = Func::from_name(identifier)
                .ok_or_else(|| VdjError::UnknownIdentifier(identifier.clone()))?;
            let mut args = Vec::<Expr>::new();
            for x in kids.iter() {
                function_args(x, seq_col, &mut args)?;
            }
            let ok = match f {
                Func::In => args.len() >= 2,
                _ => args.len() == 1,
            };
            if !ok {
                return Err(syntax(&format!(
                    "function {} called with {} arguments",
                    f.name(),
                    args.len()
                )));
            }
            Ok(Expr::Call(f, args))
        }
        Operator::Tuple => {
            let mut items = Vec::<Expr>::new();
            tuple_items(node, seq_col, &mut items)?;
            Ok(Expr::List(items))
        }
        Operator::Eq => binary(BinOp::Eq, node, seq_col),
        Operator::Neq => binary(BinOp::Neq, node, seq_col),
        Operator::Lt => binary(BinOp::Lt, node, seq_col),
        Operator::Leq => binary(BinOp::Leq, node, seq_col),
        Operator::Gt => binary(BinOp::Gt, node, seq_col),
        Operator::Geq => binary(BinOp::Geq, node, seq_col),
        Operator::Add => binary(BinOp::Add, node, seq_col),
        Operator::Sub => binary(BinOp::Sub, node, seq_col),
        Operator::Mul => binary(BinOp::Mul, node, seq_col),
        Operator::Div => binary(BinOp::Div, node, seq_col),
        Operator::And => binary(BinOp::And, node, seq_col),
        Operator::Or => binary(BinOp::Or, node, seq_col),
        Operator::Neg => unary(UnOp::Neg, node, seq_col),
        Operator::Not => unary(UnOp::Not, node, seq_col),
        op => Err(syntax(&format!("operator {:?} is not supported", op))),
    }
}

pub fn parse_expr(text: &str, seq_col: SeqColumn) -> VdjResult<Expr> {
    let node = build_operator_tree(text).map_err(|e| syntax(&format!("{}: {}", text, e)))?;
    translate(&node, seq_col)
}

// ▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓▓
