use core::fmt;
use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;

/// Unary operators a deferred expression can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Pos,
    Abs,
}

/// Binary arithmetic operators.
///
/// Reflected forms (`5 // X`) are not separate operators. Swapping the
/// operand sides at construction time produces the same node shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Rem,
    DivMod,
    Pow,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Rem => "%",
            BinaryOp::DivMod => "divmod",
            BinaryOp::Pow => "**",
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl CmpOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CmpOp::Eq => "==",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Gt => ">",
            CmpOp::Le => "<=",
            CmpOp::Ge => ">=",
        }
    }
}

/// A named host function that can participate in a deferred expression.
///
/// The wrapped closure is shared, so cloning an expression tree never
/// duplicates the function itself.
#[derive(Clone)]
pub struct ExternalFn {
    name: String,
    func: Arc<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>,
}

impl ExternalFn {
    pub fn new(
        name: &str,
        func: impl Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.to_string(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn invoke(&self, args: &[Value]) -> Result<Value> {
        (self.func)(args)
    }
}

impl fmt::Debug for ExternalFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name)
    }
}

/// One node of a deferred expression tree.
///
/// Trees are pure data: building one performs no evaluation and cannot
/// fail. Every occurrence of [`Expr::Placeholder`] in a tree resolves to
/// the same runtime input when the tree is evaluated.
#[derive(Debug, Clone)]
pub enum Expr {
    /// The eventual input.
    Placeholder,
    /// A captured literal or externally bound value.
    Constant(Value),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Compare(CmpOp, Box<Expr>, Box<Expr>),
    /// Field access on the evaluated target.
    GetAttr(Box<Expr>, String),
    /// Key or index access on the evaluated target.
    GetItem(Box<Expr>, Box<Expr>),
    /// A bound-method reference awaiting `.call(...)`.
    MethodRef(Box<Expr>, String),
    /// Invocation of a method reference or an external function.
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        kwargs: Vec<(String, Expr)>,
    },
    /// An external host function, see [`ExternalFn`].
    External(ExternalFn),
    /// Containment test. `in_` puts the placeholder on the element side,
    /// `has` puts it on the collection side.
    Membership {
        elem: Box<Expr>,
        collection: Box<Expr>,
        negate: bool,
    },
}
