//! Abstract syntax for the restricted expression grammar.
//!
//! Every variant here is admitted by the whitelist; there is no node
//! kind capable of representing loops, imports, lambdas, or conditionals.
//! Safety comes from the parser simply never constructing anything else,
//! not from a separate rejection list.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Pos,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

/// A node of the expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Name(String),
    /// `value.attr` — `value` is restricted to a bare `Name` by the parser.
    Attribute { value: Box<Expr>, attr: String },
    /// `value[index]`. `index` is the literal signed integer written in
    /// source; only `index <= 0` (a lag `k = -index`) is meaningful.
    Subscript { value: Box<Expr>, index: i64 },
    UnaryOp { op: UnaryOp, operand: Box<Expr> },
    BinOp {
        left: Box<Expr>,
        op: BinOp,
        right: Box<Expr>,
    },
    /// `func(args..., key=kwargs...)`.
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        kwargs: Vec<(String, Expr)>,
    },
}

/// The top-level form of a configured expression: either a pure
/// right-hand-side expression, or a single `name = expression` assignment
/// (admitted only at the top level).
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign { target: String, value: Expr },
    Expr(Expr),
}

impl Stmt {
    /// The expression to evaluate, stripping an assignment target if present.
    pub fn rhs(&self) -> &Expr {
        match self {
            Stmt::Assign { value, .. } => value,
            Stmt::Expr(e) => e,
        }
    }
}
