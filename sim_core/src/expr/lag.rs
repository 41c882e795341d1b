//! Lag extraction (C5, consumed by C8).
//!
//! Walks an already rewritten expression tree and records, for every
//! negative-index subscript on a plain variable or instance attribute,
//! the pair `(store_key, k)`. The loader takes the maximum `k` per key
//! across the whole program to size each ring buffer.

use std::collections::HashMap;

use super::ast::{Expr, Stmt};

pub fn extract_lags(stmt: &Stmt, out: &mut HashMap<String, i64>) {
    walk(stmt.rhs(), out);
}

fn walk(expr: &Expr, out: &mut HashMap<String, i64>) {
    match expr {
        Expr::Number(_) | Expr::Name(_) => {}
        Expr::Attribute { value, .. } => walk(value, out),
        Expr::Subscript { value, index } => {
            if *index <= 0 {
                let k = -index;
                if let Some(key) = subscript_key(value) {
                    let entry = out.entry(key).or_insert(0);
                    if k > *entry {
                        *entry = k;
                    }
                }
            }
            walk(value, out);
        }
        Expr::UnaryOp { operand, .. } => walk(operand, out),
        Expr::BinOp { left, right, .. } => {
            walk(left, out);
            walk(right, out);
        }
        Expr::Call { func, args, kwargs } => {
            walk(func, out);
            for a in args {
                walk(a, out);
            }
            for (_, v) in kwargs {
                walk(v, out);
            }
        }
    }
}

fn subscript_key(value: &Expr) -> Option<String> {
    match value {
        Expr::Name(n) => Some(n.clone()),
        Expr::Attribute { value, attr } => match value.as_ref() {
            Expr::Name(i) => Some(format!("{i}.{attr}")),
            _ => None,
        },
        _ => None,
    }
}
