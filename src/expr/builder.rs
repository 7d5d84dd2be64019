use anyhow::Result;
use serde_json::Value;

use super::node::{BinaryOp, CmpOp, Expr, ExternalFn, UnaryOp};
use crate::row::Row;

/// The placeholder value standing in for the eventual input.
///
/// `X` starts every deferred expression. Operators and [`Operations`]
/// methods on it return a [`Lambda`] holding the growing tree:
///
/// ```
/// let bmi = X.attr("weight") / (X.attr("height") / 100).pow(2);
/// let heavy = bmi.gt(25);
/// ```
///
/// `X` carries no state, so sharing it across call sites is always safe.
#[derive(Debug, Clone, Copy)]
pub struct X;

/// A deferred expression under construction.
///
/// Building a `Lambda` never evaluates anything. Evaluation happens when
/// [`Lambda::eval`] runs against a concrete input, or when the lambda is
/// handed to a stream stage.
#[derive(Debug, Clone)]
pub struct Lambda(Expr);

impl Lambda {
    pub(crate) fn new(expr: Expr) -> Self {
        Self(expr)
    }

    pub fn expr(&self) -> &Expr {
        &self.0
    }

    pub fn into_expr(self) -> Expr {
        self.0
    }

    /// Evaluate against a concrete input. Stateless, so the same lambda
    /// may be evaluated repeatedly with different inputs.
    pub fn eval(&self, input: &Value) -> Result<Value> {
        self.0.eval(input)
    }

    /// Compile into a plain closure.
    pub fn into_fn(self) -> impl Fn(&Value) -> Result<Value> + Send + Sync {
        let expr = self.0;
        move |input| expr.eval(input)
    }

    /// Invoke a method reference or external function with positional
    /// arguments. Arguments may themselves be placeholder expressions.
    pub fn call(self, args: Vec<Expr>) -> Lambda {
        self.call_with(args, vec![])
    }

    pub fn call_with(self, args: Vec<Expr>, kwargs: Vec<(String, Expr)>) -> Lambda {
        Lambda(Expr::Call {
            callee: Box::new(self.0),
            args,
            kwargs,
        })
    }
}

impl From<X> for Lambda {
    fn from(_: X) -> Self {
        Lambda(Expr::Placeholder)
    }
}

/// Wrap a value as a constant expression, for reflected forms that have
/// no native operator: `lit(5).floordiv(X)` builds `5 // X`.
pub fn lit(value: impl Into<Value>) -> Lambda {
    Lambda(Expr::Constant(value.into()))
}

/// Conversion into an expression node. Non-node operands are wrapped as
/// [`Expr::Constant`] so `X + 3` and `lit(3) + X` both build valid trees.
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl IntoExpr for Lambda {
    fn into_expr(self) -> Expr {
        self.0
    }
}

impl IntoExpr for &Lambda {
    fn into_expr(self) -> Expr {
        self.0.clone()
    }
}

impl IntoExpr for X {
    fn into_expr(self) -> Expr {
        Expr::Placeholder
    }
}

impl IntoExpr for Row {
    fn into_expr(self) -> Expr {
        Expr::Constant(self.into())
    }
}

macro_rules! impl_into_expr {
    ($($ty:ty),*) => {
        $(
            impl IntoExpr for $ty {
                fn into_expr(self) -> Expr {
                    Expr::Constant(Value::from(self))
                }
            }
        )*
    };
}

impl_into_expr!(Value, bool, i32, i64, u32, u64, f32, f64, &str, String);

fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Lambda {
    Lambda(Expr::Binary(op, Box::new(lhs), Box::new(rhs)))
}

fn compare(op: CmpOp, lhs: Expr, rhs: Expr) -> Lambda {
    Lambda(Expr::Compare(op, Box::new(lhs), Box::new(rhs)))
}

/// Builder methods shared by [`X`] and [`Lambda`].
///
/// Every method returns a fresh [`Lambda`]; existing nodes are never
/// mutated, so a partially built expression can be reused as the prefix
/// of several larger ones.
pub trait Operations: IntoExpr + Sized {
    fn eq(self, other: impl IntoExpr) -> Lambda {
        compare(CmpOp::Eq, self.into_expr(), other.into_expr())
    }
    fn ne(self, other: impl IntoExpr) -> Lambda {
        compare(CmpOp::Ne, self.into_expr(), other.into_expr())
    }
    fn gt(self, other: impl IntoExpr) -> Lambda {
        compare(CmpOp::Gt, self.into_expr(), other.into_expr())
    }
    fn lt(self, other: impl IntoExpr) -> Lambda {
        compare(CmpOp::Lt, self.into_expr(), other.into_expr())
    }
    fn ge(self, other: impl IntoExpr) -> Lambda {
        compare(CmpOp::Ge, self.into_expr(), other.into_expr())
    }
    fn le(self, other: impl IntoExpr) -> Lambda {
        compare(CmpOp::Le, self.into_expr(), other.into_expr())
    }

    fn floordiv(self, other: impl IntoExpr) -> Lambda {
        binary(BinaryOp::FloorDiv, self.into_expr(), other.into_expr())
    }
    fn divmod(self, other: impl IntoExpr) -> Lambda {
        binary(BinaryOp::DivMod, self.into_expr(), other.into_expr())
    }
    fn pow(self, other: impl IntoExpr) -> Lambda {
        binary(BinaryOp::Pow, self.into_expr(), other.into_expr())
    }

    fn abs(self) -> Lambda {
        Lambda(Expr::Unary(UnaryOp::Abs, Box::new(self.into_expr())))
    }
    fn pos(self) -> Lambda {
        Lambda(Expr::Unary(UnaryOp::Pos, Box::new(self.into_expr())))
    }

    /// Field access on the evaluated target. Chains: `X.attr("a").attr("b")`.
    fn attr(self, name: &str) -> Lambda {
        Lambda(Expr::GetAttr(Box::new(self.into_expr()), name.to_string()))
    }

    /// Key or index access on the evaluated target.
    fn item(self, key: impl IntoExpr) -> Lambda {
        Lambda(Expr::GetItem(
            Box::new(self.into_expr()),
            Box::new(key.into_expr()),
        ))
    }

    /// A bound-method reference. Becomes a call once `.call(...)` runs:
    /// `X.method("upper").call(args![])`.
    fn method(self, name: &str) -> Lambda {
        Lambda(Expr::MethodRef(Box::new(self.into_expr()), name.to_string()))
    }

    /// Membership test with self as the element: `X.in_(json!([1, 2, 3]))`.
    fn in_(self, collection: impl IntoExpr) -> Lambda {
        Lambda(Expr::Membership {
            elem: Box::new(self.into_expr()),
            collection: Box::new(collection.into_expr()),
            negate: false,
        })
    }

    fn not_in(self, collection: impl IntoExpr) -> Lambda {
        Lambda(Expr::Membership {
            elem: Box::new(self.into_expr()),
            collection: Box::new(collection.into_expr()),
            negate: true,
        })
    }

    /// Membership test with self as the container: `X.has("age")`.
    fn has(self, key: impl IntoExpr) -> Lambda {
        Lambda(Expr::Membership {
            elem: Box::new(key.into_expr()),
            collection: Box::new(self.into_expr()),
            negate: false,
        })
    }
}

impl Operations for X {}
impl Operations for Lambda {}

macro_rules! impl_std_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl<R: IntoExpr> std::ops::$trait<R> for X {
            type Output = Lambda;
            fn $method(self, rhs: R) -> Lambda {
                binary($op, Expr::Placeholder, rhs.into_expr())
            }
        }
        impl<R: IntoExpr> std::ops::$trait<R> for Lambda {
            type Output = Lambda;
            fn $method(self, rhs: R) -> Lambda {
                binary($op, self.0, rhs.into_expr())
            }
        }
    };
}

impl_std_op!(Add, add, BinaryOp::Add);
impl_std_op!(Sub, sub, BinaryOp::Sub);
impl_std_op!(Mul, mul, BinaryOp::Mul);
impl_std_op!(Div, div, BinaryOp::Div);
impl_std_op!(Rem, rem, BinaryOp::Rem);

macro_rules! impl_reflected_op {
    ($lhs:ty, $trait:ident, $method:ident, $op:expr) => {
        impl std::ops::$trait<X> for $lhs {
            type Output = Lambda;
            fn $method(self, _: X) -> Lambda {
                binary($op, Expr::Constant(Value::from(self)), Expr::Placeholder)
            }
        }
        impl std::ops::$trait<Lambda> for $lhs {
            type Output = Lambda;
            fn $method(self, rhs: Lambda) -> Lambda {
                binary($op, Expr::Constant(Value::from(self)), rhs.0)
            }
        }
    };
}

macro_rules! impl_reflected_ops {
    ($($lhs:ty),*) => {
        $(
            impl_reflected_op!($lhs, Add, add, BinaryOp::Add);
            impl_reflected_op!($lhs, Sub, sub, BinaryOp::Sub);
            impl_reflected_op!($lhs, Mul, mul, BinaryOp::Mul);
            impl_reflected_op!($lhs, Div, div, BinaryOp::Div);
            impl_reflected_op!($lhs, Rem, rem, BinaryOp::Rem);
        )*
    };
}

impl_reflected_ops!(i64, f64);

impl std::ops::Neg for X {
    type Output = Lambda;
    fn neg(self) -> Lambda {
        Lambda(Expr::Unary(UnaryOp::Neg, Box::new(Expr::Placeholder)))
    }
}

impl std::ops::Neg for Lambda {
    type Output = Lambda;
    fn neg(self) -> Lambda {
        Lambda(Expr::Unary(UnaryOp::Neg, Box::new(self.0)))
    }
}

/// Wraps an external host function so it can participate in a deferred
/// expression: `Xcall::new("hypot", ...).call(args![X.attr("a"), 3])`.
#[derive(Debug, Clone)]
pub struct Xcall(ExternalFn);

impl Xcall {
    pub fn new(
        name: &str,
        func: impl Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Self(ExternalFn::new(name, func))
    }

    pub fn call(&self, args: Vec<Expr>) -> Lambda {
        Lambda(Expr::Call {
            callee: Box::new(Expr::External(self.0.clone())),
            args,
            kwargs: vec![],
        })
    }
}

/// Builds a `Vec<Expr>` argument list, wrapping literals as constants:
/// `args![X, 3, X.attr("y")]`.
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        vec![ $( $crate::expr::IntoExpr::into_expr($arg) ),* ]
    };
}

/// Builds a keyword-argument list: `kwargs![default = 0]`.
#[macro_export]
macro_rules! kwargs {
    ($($name:ident = $value:expr),* $(,)?) => {
        vec![ $( (
            stringify!($name).to_string(),
            $crate::expr::IntoExpr::into_expr($value),
        ) ),* ]
    };
}
