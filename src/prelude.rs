pub use crate::callable::Callable;
pub use crate::collections::{Array, Map};
pub use crate::expr::{lit, Expr, IntoExpr, Lambda, Operations, Xcall, X};
pub use crate::optional::Optional;
pub use crate::row::Row;
pub use crate::stream::Stream;
pub use crate::table::StreamTable;
pub use crate::{args, fields, kwargs, row};
