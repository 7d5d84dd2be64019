use core::fmt;
use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;

use crate::expr::{Expr, Lambda, Xcall, X};

/// A stage function: either a deferred expression tree or a plain host
/// function. Streams accept both interchangeably.
#[derive(Clone)]
pub enum Callable {
    Expr(Expr),
    Func(Arc<dyn Fn(&Value) -> Result<Value> + Send + Sync>),
}

impl Callable {
    /// Wrap a host function that can fail.
    pub fn fallible(func: impl Fn(&Value) -> Result<Value> + Send + Sync + 'static) -> Self {
        Callable::Func(Arc::new(func))
    }

    pub fn invoke(&self, input: &Value) -> Result<Value> {
        match self {
            Callable::Expr(expr) => expr.eval(input),
            Callable::Func(func) => func(input),
        }
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Expr(expr) => f.debug_tuple("Expr").field(expr).finish(),
            Callable::Func(_) => f.write_str("Func(<closure>)"),
        }
    }
}

impl From<Lambda> for Callable {
    fn from(lambda: Lambda) -> Self {
        Callable::Expr(lambda.into_expr())
    }
}

impl From<&Lambda> for Callable {
    fn from(lambda: &Lambda) -> Self {
        Callable::Expr(lambda.expr().clone())
    }
}

impl From<X> for Callable {
    fn from(_: X) -> Self {
        Callable::Expr(Expr::Placeholder)
    }
}

impl From<Expr> for Callable {
    fn from(expr: Expr) -> Self {
        Callable::Expr(expr)
    }
}

impl From<&Xcall> for Callable {
    fn from(xcall: &Xcall) -> Self {
        use crate::args;
        Callable::Expr(xcall.call(args![X]).into_expr())
    }
}

impl<F> From<F> for Callable
where
    F: Fn(&Value) -> Value + Send + Sync + 'static,
{
    fn from(func: F) -> Self {
        Callable::Func(Arc::new(move |input| Ok(func(input))))
    }
}
