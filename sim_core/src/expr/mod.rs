//! The restricted expression language and safe evaluator (C5) — the
//! hardest subsystem in the crate. A small hand-rolled tree interpreter
//! walks a whitelist grammar; there is no host-language eval anywhere
//! in this module, and nothing here reads process environment or
//! filesystem state.
//!
//! Pipeline for a configured expression string: [`parser::parse`] →
//! (node-kind-specific shape check) → [`validate::validate`] (reject
//! attribute-calls in every sub-expression except the one `AlgorithmNode`
//! already consumed by matching its top-level shape) →
//! [`rewrite::rewrite_stmt`]/[`rewrite::rewrite_expr`] (bare instance
//! names become `name.out`) → [`lag::extract_lags`] (used once, at load
//! time, by the configuration loader) → per-cycle [`eval::evaluate`].

pub mod ast;
pub mod error;
pub mod eval;
pub mod lag;
pub mod lexer;
pub mod parser;
pub mod proxy;
pub mod rewrite;
pub mod validate;

use ast::Stmt;
use error::ExprError;

/// Parses an expression string, wrapping a syntax failure with the
/// original text. Node construction inspects the returned statement's
/// shape before deciding whether it's an assignment (`ExpressionNode`)
/// or an `instance.execute(...)` call (`AlgorithmNode`).
pub fn parse(text: &str) -> Result<Stmt, ExprError> {
    parser::parse(text).map_err(|kind| ExprError::new(text, kind))
}

/// Validates a sub-expression, rejecting any nested attribute-call.
/// Called on an `ExpressionNode`'s right-hand side and on each of an
/// `AlgorithmNode`'s extracted keyword-argument sub-expressions — never
/// on the `instance.execute(...)` call itself, which `AlgorithmNode`
/// recognizes directly rather than routing through the evaluator.
pub fn validate(expr: &ast::Expr, text: &str) -> Result<(), ExprError> {
    validate::validate(expr).map_err(|kind| ExprError::new(text, kind))
}

pub fn eval_to_scalar(
    expr: &ast::Expr,
    env: &eval::Env,
    original_text: &str,
) -> Result<f64, ExprError> {
    eval::evaluate(expr, env).map_err(|kind| ExprError::new(original_text, kind))
}
