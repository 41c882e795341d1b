//! Tree-walking evaluator (C5).
//!
//! No ambient globals, no inherited scope: the environment is exactly
//! the store, the live instance map, and the stateless function
//! registry, all borrowed for the duration of a single `evaluate` call.

use std::collections::HashMap;

use super::ast::{BinOp, Expr, UnaryOp};
use super::error::ExprErrorKind;
use super::proxy::{AttributeProxy, InstanceProxy, VariableAccessor};
use crate::algorithms::Algorithm;
use crate::registry::Registry;
use crate::store::VariableStore;

/// The evaluation environment for one `evaluate` call: a flat binding
/// from name to instance, store, and function registry. Built fresh
/// per call and discarded afterward, per the no-caching-across-cycles
/// design note.
pub struct Env<'a> {
    pub store: &'a VariableStore,
    pub instances: &'a HashMap<String, &'a dyn Algorithm>,
    pub registry: &'a Registry,
}

pub fn evaluate(expr: &Expr, env: &Env) -> Result<f64, ExprErrorKind> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Name(name) => {
            let accessor = VariableAccessor::new(name, env.store);
            Ok(accessor.value())
        }
        Expr::Attribute { value, attr } => {
            let proxy = resolve_instance_proxy(value, attr, env)?;
            Ok(proxy.value())
        }
        Expr::Subscript { value, index } => {
            if *index > 0 {
                return Err(ExprErrorKind::Type(
                    "subscript index must not be positive".into(),
                ));
            }
            let k = (-index) as usize;
            match value.as_ref() {
                Expr::Name(name) => {
                    let accessor = VariableAccessor::new(name, env.store);
                    Ok(accessor.lag(k, 0.0))
                }
                Expr::Attribute { value: inner, attr } => {
                    let proxy = resolve_instance_proxy(inner, attr, env)?;
                    Ok(proxy.lag(k, 0.0))
                }
                other => Err(ExprErrorKind::Type(format!(
                    "cannot subscript {other:?}"
                ))),
            }
        }
        Expr::UnaryOp { op, operand } => {
            let v = evaluate(operand, env)?;
            Ok(match op {
                UnaryOp::Pos => v,
                UnaryOp::Neg => -v,
            })
        }
        Expr::BinOp { left, op, right } => {
            let l = evaluate(left, env)?;
            let r = evaluate(right, env)?;
            apply_binop(*op, l, r)
        }
        Expr::Call { func, args, kwargs } => {
            if !kwargs.is_empty() {
                return Err(ExprErrorKind::Type(
                    "stateless functions accept positional arguments only".into(),
                ));
            }
            let name = match func.as_ref() {
                Expr::Name(n) => n,
                other => {
                    return Err(ExprErrorKind::Type(format!(
                        "cannot call {other:?} as a function"
                    )))
                }
            };
            let entry = env
                .registry
                .function(name)
                .ok_or_else(|| ExprErrorKind::Name(format!("unknown function `{name}`")))?;
            let resolved: Vec<f64> = args
                .iter()
                .map(|a| evaluate(a, env))
                .collect::<Result<_, _>>()?;
            (entry.func)(&resolved)
        }
    }
}

fn resolve_instance_proxy<'a>(
    value: &Expr,
    attr: &str,
    env: &Env<'a>,
) -> Result<AttributeProxy<'a>, ExprErrorKind> {
    let name = match value {
        Expr::Name(n) => n,
        other => {
            return Err(ExprErrorKind::Type(format!(
                "attribute access requires a bare name, found {other:?}"
            )))
        }
    };
    let instance = resolve_instance(name, env)?;
    Ok(InstanceProxy::new(name, env.store, instance).attribute(attr))
}

fn resolve_instance<'a>(name: &str, env: &Env<'a>) -> Result<&'a dyn Algorithm, ExprErrorKind> {
    env.instances
        .get(name)
        .copied()
        .ok_or_else(|| ExprErrorKind::Name(format!("unknown instance `{name}`")))
}

fn apply_binop(op: BinOp, l: f64, r: f64) -> Result<f64, ExprErrorKind> {
    match op {
        BinOp::Add => Ok(l + r),
        BinOp::Sub => Ok(l - r),
        BinOp::Mul => Ok(l * r),
        BinOp::Div => {
            if r == 0.0 {
                Err(ExprErrorKind::Arithmetic("division by zero".into()))
            } else {
                Ok(l / r)
            }
        }
        BinOp::FloorDiv => {
            if r == 0.0 {
                Err(ExprErrorKind::Arithmetic("floor division by zero".into()))
            } else {
                Ok((l / r).floor())
            }
        }
        BinOp::Mod => {
            if r == 0.0 {
                Err(ExprErrorKind::Arithmetic("modulo by zero".into()))
            } else {
                Ok(l % r)
            }
        }
        BinOp::Pow => Ok(l.powf(r)),
    }
}
