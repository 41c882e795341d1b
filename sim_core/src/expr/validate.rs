//! Rejects attribute-call expressions outside the one place they are
//! allowed: the top-level `instance.execute(...)` form recognized
//! directly by [`crate::node::AlgorithmNode`], which never routes that
//! call through the general evaluator. Everywhere else — a pure-variable
//! right-hand side, or any kwarg sub-expression of an algorithm node —
//! calling through an attribute is rejected, since "only `instance.execute`
//! is reached via a proxy; `execute` is not a free function."

use super::ast::Expr;
use super::error::ExprErrorKind;

pub fn validate(expr: &Expr) -> Result<(), ExprErrorKind> {
    match expr {
        Expr::Number(_) | Expr::Name(_) => Ok(()),
        Expr::Attribute { value, .. } => validate(value),
        Expr::Subscript { value, .. } => validate(value),
        Expr::UnaryOp { operand, .. } => validate(operand),
        Expr::BinOp { left, right, .. } => {
            validate(left)?;
            validate(right)
        }
        Expr::Call { func, args, kwargs } => {
            if matches!(func.as_ref(), Expr::Attribute { .. }) {
                return Err(ExprErrorKind::Syntax(
                    "calls through an attribute are not permitted here".into(),
                ));
            }
            validate(func)?;
            for a in args {
                validate(a)?;
            }
            for (_, v) in kwargs {
                validate(v)?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parser::parse_expr_standalone;

    #[test]
    fn rejects_attribute_call() {
        let e = parse_expr_standalone("v.execute(x=1)").unwrap();
        assert!(validate(&e).is_err());
    }

    #[test]
    fn accepts_plain_function_call() {
        let e = parse_expr_standalone("clamp(x, 0, 1)").unwrap();
        assert!(validate(&e).is_ok());
    }

    #[test]
    fn accepts_attribute_read_without_call() {
        let e = parse_expr_standalone("s.out + r[-1]").unwrap();
        assert!(validate(&e).is_ok());
    }
}
