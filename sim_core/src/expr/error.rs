//! Expression error taxonomy (C5).
//!
//! Every failure inside the evaluator is reported as a single
//! [`ExprError`] carrying the offending expression text and a
//! subcategorized cause, never a bare panic or an opaque string.

use thiserror::Error;

/// The cause of an [`ExprError`], independent of the expression text it
/// occurred in.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprErrorKind {
    /// Malformed token stream or an unsupported grammar construct.
    #[error("syntax error: {0}")]
    Syntax(String),
    /// Reference to a name not bound in the evaluation environment.
    #[error("undefined name: {0}")]
    Name(String),
    /// An operand or call argument had the wrong shape.
    #[error("type error: {0}")]
    Type(String),
    /// Division or modulo by zero.
    #[error("arithmetic error: {0}")]
    Arithmetic(String),
    /// Any other evaluation-time failure not covered above.
    #[error("evaluation error: {0}")]
    Evaluation(String),
}

/// An expression failure, always tagged with the original source text.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("in expression `{expr}`: {kind}")]
pub struct ExprError {
    /// The expression text as it appeared in configuration.
    pub expr: String,
    /// The underlying cause.
    pub kind: ExprErrorKind,
}

impl ExprError {
    pub fn new(expr: impl Into<String>, kind: ExprErrorKind) -> Self {
        Self {
            expr: expr.into(),
            kind,
        }
    }
}
