//! Instance-name rewrite (C5).
//!
//! Rewrites a bare reference to a registered instance name into
//! `name.out`, everywhere except where that name is itself the subject
//! of an attribute access, the target of a call, or an assignment
//! target — those positions already mean something else and must pass
//! through untouched.

use std::collections::HashSet;

use super::ast::{Expr, Stmt};

pub fn rewrite_stmt(stmt: Stmt, instances: &HashSet<String>) -> Stmt {
    match stmt {
        Stmt::Assign { target, value } => Stmt::Assign {
            target,
            value: rewrite_expr(value, instances),
        },
        Stmt::Expr(e) => Stmt::Expr(rewrite_expr(e, instances)),
    }
}

pub fn rewrite_expr(expr: Expr, instances: &HashSet<String>) -> Expr {
    match expr {
        Expr::Name(name) => {
            if instances.contains(&name) {
                Expr::Attribute {
                    value: Box::new(Expr::Name(name)),
                    attr: "out".to_string(),
                }
            } else {
                Expr::Name(name)
            }
        }
        Expr::Attribute { value, attr } => {
            // `value` is protected: a bare instance name here means
            // "this instance", not "this instance's out attribute".
            let value = match *value {
                Expr::Name(n) => Expr::Name(n),
                other => rewrite_expr(other, instances),
            };
            Expr::Attribute {
                value: Box::new(value),
                attr,
            }
        }
        Expr::Subscript { value, index } => Expr::Subscript {
            value: Box::new(rewrite_expr(*value, instances)),
            index,
        },
        Expr::UnaryOp { op, operand } => Expr::UnaryOp {
            op,
            operand: Box::new(rewrite_expr(*operand, instances)),
        },
        Expr::BinOp { left, op, right } => Expr::BinOp {
            left: Box::new(rewrite_expr(*left, instances)),
            op,
            right: Box::new(rewrite_expr(*right, instances)),
        },
        Expr::Call { func, args, kwargs } => {
            // `func` is protected: `x(...)` means "call x", not
            // "call x.out" — and `instance.execute` already has its
            // own protected Attribute value, handled above.
            let func = match *func {
                Expr::Name(n) => Expr::Name(n),
                other => rewrite_expr(other, instances),
            };
            Expr::Call {
                func: Box::new(func),
                args: args
                    .into_iter()
                    .map(|a| rewrite_expr(a, instances))
                    .collect(),
                kwargs: kwargs
                    .into_iter()
                    .map(|(k, v)| (k, rewrite_expr(v, instances)))
                    .collect(),
            }
        }
        Expr::Number(n) => Expr::Number(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parser::parse;

    fn instances(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_name_is_rewritten() {
        let stmt = rewrite_stmt(parse("x = s").unwrap(), &instances(&["s"]));
        match stmt {
            Stmt::Assign { value, .. } => assert_eq!(
                value,
                Expr::Attribute {
                    value: Box::new(Expr::Name("s".into())),
                    attr: "out".into()
                }
            ),
            _ => unreachable!(),
        }
    }

    #[test]
    fn subscript_target_is_rewritten() {
        let stmt = rewrite_stmt(parse("d = x[-1]").unwrap(), &instances(&["x"]));
        match stmt {
            Stmt::Assign { value, .. } => match value {
                Expr::Subscript { value, .. } => assert_eq!(
                    *value,
                    Expr::Attribute {
                        value: Box::new(Expr::Name("x".into())),
                        attr: "out".into()
                    }
                ),
                other => panic!("{other:?}"),
            },
            _ => unreachable!(),
        }
    }

    #[test]
    fn attribute_value_and_call_target_and_assign_target_are_protected() {
        let stmt = rewrite_stmt(parse("x.execute(k=1)").unwrap(), &instances(&["x"]));
        match stmt {
            Stmt::Expr(Expr::Call { func, .. }) => assert_eq!(
                *func,
                Expr::Attribute {
                    value: Box::new(Expr::Name("x".into())),
                    attr: "execute".into()
                }
            ),
            other => panic!("{other:?}"),
        }

        let stmt = rewrite_stmt(parse("y.x").unwrap(), &instances(&["x"]));
        assert_eq!(
            stmt,
            Stmt::Expr(Expr::Attribute {
                value: Box::new(Expr::Name("y".into())),
                attr: "x".into()
            })
        );

        let stmt = rewrite_stmt(parse("x = 1").unwrap(), &instances(&["x"]));
        assert_eq!(
            stmt,
            Stmt::Assign {
                target: "x".into(),
                value: Expr::Number(1.0)
            }
        );
    }
}
