//! Recursive evaluation of expression trees against a runtime input.
//!
//! Evaluation is pure: no node is mutated, no state is kept between
//! invocations. Errors carry the failing operator and operand types and
//! propagate to the caller unchanged.

use anyhow::{anyhow, bail, Result};
use serde_json::{Number, Value};

use super::node::{BinaryOp, CmpOp, Expr, UnaryOp};

impl Expr {
    /// Evaluate this tree against a concrete input.
    ///
    /// Every [`Expr::Placeholder`] occurrence resolves to the same
    /// `input` value.
    pub fn eval(&self, input: &Value) -> Result<Value> {
        match self {
            Expr::Placeholder => Ok(input.clone()),
            Expr::Constant(value) => Ok(value.clone()),
            Expr::Unary(op, operand) => unary(*op, &operand.eval(input)?),
            Expr::Binary(op, lhs, rhs) => binary(*op, &lhs.eval(input)?, &rhs.eval(input)?),
            Expr::Compare(op, lhs, rhs) => compare(*op, &lhs.eval(input)?, &rhs.eval(input)?),
            Expr::GetAttr(target, name) => get_attr(&target.eval(input)?, name),
            Expr::GetItem(target, key) => get_item(&target.eval(input)?, &key.eval(input)?),
            Expr::MethodRef(_, name) => {
                bail!("method '{}' must be invoked with .call(...)", name)
            }
            Expr::External(func) => {
                bail!("external fn '{}' must be invoked with .call(...)", func.name())
            }
            Expr::Call {
                callee,
                args,
                kwargs,
            } => {
                let args = args
                    .iter()
                    .map(|arg| arg.eval(input))
                    .collect::<Result<Vec<_>>>()?;
                let kwargs = kwargs
                    .iter()
                    .map(|(name, arg)| Ok((name.clone(), arg.eval(input)?)))
                    .collect::<Result<Vec<_>>>()?;

                match callee.as_ref() {
                    Expr::MethodRef(target, name) => {
                        call_method(&target.eval(input)?, name, &args, &kwargs)
                    }
                    Expr::External(func) => {
                        if !kwargs.is_empty() {
                            bail!("external fn '{}' takes no keyword arguments", func.name());
                        }
                        func.invoke(&args)
                    }
                    other => bail!("expression is not callable: {:?}", other),
                }
            }
            Expr::Membership {
                elem,
                collection,
                negate,
            } => {
                let found = contains(&collection.eval(input)?, &elem.eval(input)?)?;
                Ok(Value::Bool(found != *negate))
            }
        }
    }
}

/// Human-readable type tag used in error messages.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Predicate truthiness: null is false, numbers are nonzero, containers
/// and strings are nonempty.
pub(crate) fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

enum Num {
    Int(i64),
    Float(f64),
}

fn as_num(value: &Value) -> Option<Num> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Num::Int(i))
            } else {
                n.as_f64().map(Num::Float)
            }
        }
        _ => None,
    }
}

/// Equality with numeric cross-type comparison, so `1 == 1.0`.
pub(crate) fn value_eq(a: &Value, b: &Value) -> bool {
    match (as_num(a), as_num(b)) {
        (Some(Num::Int(x)), Some(Num::Int(y))) => x == y,
        (Some(x), Some(y)) => to_f64(x) == to_f64(y),
        _ => a == b,
    }
}

fn to_f64(n: Num) -> f64 {
    match n {
        Num::Int(i) => i as f64,
        Num::Float(f) => f,
    }
}

fn float_value(f: f64) -> Result<Value> {
    Number::from_f64(f)
        .map(Value::Number)
        .ok_or_else(|| anyhow!("operation produced a non-finite float"))
}

fn unary(op: UnaryOp, operand: &Value) -> Result<Value> {
    let num = as_num(operand)
        .ok_or_else(|| anyhow!("unary operator on non-numeric {}", type_name(operand)))?;
    match (op, num) {
        (UnaryOp::Neg, Num::Int(i)) => i
            .checked_neg()
            .map(Value::from)
            .ok_or_else(|| anyhow!("integer overflow in negation")),
        (UnaryOp::Neg, Num::Float(f)) => float_value(-f),
        (UnaryOp::Pos, Num::Int(i)) => Ok(Value::from(i)),
        (UnaryOp::Pos, Num::Float(f)) => float_value(f),
        (UnaryOp::Abs, Num::Int(i)) => i
            .checked_abs()
            .map(Value::from)
            .ok_or_else(|| anyhow!("integer overflow in abs")),
        (UnaryOp::Abs, Num::Float(f)) => float_value(f.abs()),
    }
}

// Floor division and remainder round toward negative infinity, so
// `-7 // 2 == -4` and `-7 % 2 == 1`.
fn floor_div_int(a: i64, b: i64) -> Result<i64> {
    if b == 0 {
        bail!("division by zero");
    }
    let q = a / b;
    if a % b != 0 && (a < 0) != (b < 0) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

fn floor_rem_int(a: i64, b: i64) -> Result<i64> {
    if b == 0 {
        bail!("division by zero");
    }
    let r = a % b;
    if r != 0 && (r < 0) != (b < 0) {
        Ok(r + b)
    } else {
        Ok(r)
    }
}

fn floor_rem_float(a: f64, b: f64) -> Result<f64> {
    if b == 0.0 {
        bail!("division by zero");
    }
    Ok(a - b * (a / b).floor())
}

fn int_binary(op: BinaryOp, a: i64, b: i64) -> Result<Value> {
    let overflow = || anyhow!("integer overflow in {}", op.symbol());
    match op {
        BinaryOp::Add => a.checked_add(b).map(Value::from).ok_or_else(overflow),
        BinaryOp::Sub => a.checked_sub(b).map(Value::from).ok_or_else(overflow),
        BinaryOp::Mul => a.checked_mul(b).map(Value::from).ok_or_else(overflow),
        BinaryOp::Div => {
            if b == 0 {
                bail!("division by zero");
            }
            float_value(a as f64 / b as f64)
        }
        BinaryOp::FloorDiv => floor_div_int(a, b).map(Value::from),
        BinaryOp::Rem => floor_rem_int(a, b).map(Value::from),
        BinaryOp::DivMod => Ok(Value::from(vec![
            Value::from(floor_div_int(a, b)?),
            Value::from(floor_rem_int(a, b)?),
        ])),
        BinaryOp::Pow => {
            if b < 0 {
                return float_value((a as f64).powi(b as i32));
            }
            let exp = u32::try_from(b).map_err(|_| overflow())?;
            a.checked_pow(exp).map(Value::from).ok_or_else(overflow)
        }
    }
}

fn float_binary(op: BinaryOp, a: f64, b: f64) -> Result<Value> {
    match op {
        BinaryOp::Add => float_value(a + b),
        BinaryOp::Sub => float_value(a - b),
        BinaryOp::Mul => float_value(a * b),
        BinaryOp::Div => {
            if b == 0.0 {
                bail!("division by zero");
            }
            float_value(a / b)
        }
        BinaryOp::FloorDiv => {
            if b == 0.0 {
                bail!("division by zero");
            }
            float_value((a / b).floor())
        }
        BinaryOp::Rem => float_value(floor_rem_float(a, b)?),
        BinaryOp::DivMod => {
            if b == 0.0 {
                bail!("division by zero");
            }
            Ok(Value::from(vec![
                float_value((a / b).floor())?,
                float_value(floor_rem_float(a, b)?)?,
            ]))
        }
        BinaryOp::Pow => float_value(a.powf(b)),
    }
}

fn binary(op: BinaryOp, a: &Value, b: &Value) -> Result<Value> {
    if let (Some(x), Some(y)) = (as_num(a), as_num(b)) {
        return match (x, y) {
            (Num::Int(i), Num::Int(j)) => int_binary(op, i, j),
            (x, y) => float_binary(op, to_f64(x), to_f64(y)),
        };
    }

    if op == BinaryOp::Add {
        match (a, b) {
            (Value::String(x), Value::String(y)) => {
                return Ok(Value::String(format!("{}{}", x, y)));
            }
            (Value::Array(x), Value::Array(y)) => {
                let mut out = x.clone();
                out.extend(y.iter().cloned());
                return Ok(Value::Array(out));
            }
            _ => {}
        }
    }

    bail!(
        "unsupported operands for {}: {} and {}",
        op.symbol(),
        type_name(a),
        type_name(b)
    )
}

fn compare(op: CmpOp, a: &Value, b: &Value) -> Result<Value> {
    use std::cmp::Ordering;

    match op {
        CmpOp::Eq => return Ok(Value::Bool(value_eq(a, b))),
        CmpOp::Ne => return Ok(Value::Bool(!value_eq(a, b))),
        _ => {}
    }

    let ordering: Option<Ordering> = match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => match (as_num(a), as_num(b)) {
            (Some(x), Some(y)) => to_f64(x).partial_cmp(&to_f64(y)),
            _ => None,
        },
    };

    let ordering = ordering.ok_or_else(|| {
        anyhow!(
            "cannot order {} and {} with {}",
            type_name(a),
            type_name(b),
            op.symbol()
        )
    })?;

    let result = match op {
        CmpOp::Lt => ordering == Ordering::Less,
        CmpOp::Gt => ordering == Ordering::Greater,
        CmpOp::Le => ordering != Ordering::Greater,
        CmpOp::Ge => ordering != Ordering::Less,
        CmpOp::Eq | CmpOp::Ne => unreachable!(),
    };
    Ok(Value::Bool(result))
}

fn get_attr(target: &Value, name: &str) -> Result<Value> {
    match target {
        Value::Object(map) => map
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("no field '{}'", name)),
        other => bail!("cannot access field '{}' on {}", name, type_name(other)),
    }
}

fn array_index(items: &[Value], index: i64) -> Result<Value> {
    let len = items.len() as i64;
    let resolved = if index < 0 { index + len } else { index };
    if resolved < 0 || resolved >= len {
        bail!("index {} out of range for array of {}", index, items.len());
    }
    Ok(items[resolved as usize].clone())
}

fn get_item(target: &Value, key: &Value) -> Result<Value> {
    match (target, key) {
        (Value::Object(map), Value::String(name)) => map
            .get(name)
            .cloned()
            .ok_or_else(|| anyhow!("no key '{}'", name)),
        (Value::Array(items), Value::Number(_)) => {
            let index = key
                .as_i64()
                .ok_or_else(|| anyhow!("array index must be an integer"))?;
            array_index(items, index)
        }
        (target, key) => bail!(
            "cannot index {} with {}",
            type_name(target),
            type_name(key)
        ),
    }
}

fn contains(collection: &Value, elem: &Value) -> Result<bool> {
    match collection {
        Value::Array(items) => Ok(items.iter().any(|item| value_eq(item, elem))),
        Value::Object(map) => match elem {
            Value::String(key) => Ok(map.contains_key(key)),
            other => bail!("object membership needs a string key, got {}", type_name(other)),
        },
        Value::String(s) => match elem {
            Value::String(sub) => Ok(s.contains(sub.as_str())),
            other => bail!("string membership needs a string, got {}", type_name(other)),
        },
        other => bail!("{} does not support membership tests", type_name(other)),
    }
}

fn kwarg<'a>(kwargs: &'a [(String, Value)], name: &str) -> Option<&'a Value> {
    kwargs.iter().find(|(k, _)| k == name).map(|(_, v)| v)
}

fn expect_no_kwargs(method: &str, kwargs: &[(String, Value)]) -> Result<()> {
    if let Some((name, _)) = kwargs.first() {
        bail!("{}() got an unexpected keyword argument '{}'", method, name);
    }
    Ok(())
}

fn expect_args(method: &str, args: &[Value], count: usize) -> Result<()> {
    if args.len() != count {
        bail!("{}() takes {} argument(s), got {}", method, count, args.len());
    }
    Ok(())
}

fn str_arg<'a>(method: &str, args: &'a [Value], index: usize) -> Result<&'a str> {
    args.get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("{}() expects a string argument", method))
}

fn string_method(s: &str, name: &str, args: &[Value], kwargs: &[(String, Value)]) -> Result<Value> {
    expect_no_kwargs(name, kwargs)?;
    match name {
        "upper" => {
            expect_args(name, args, 0)?;
            Ok(Value::from(s.to_uppercase()))
        }
        "lower" => {
            expect_args(name, args, 0)?;
            Ok(Value::from(s.to_lowercase()))
        }
        "strip" => {
            expect_args(name, args, 0)?;
            Ok(Value::from(s.trim()))
        }
        "len" => {
            expect_args(name, args, 0)?;
            Ok(Value::from(s.chars().count() as i64))
        }
        "startswith" => {
            expect_args(name, args, 1)?;
            Ok(Value::Bool(s.starts_with(str_arg(name, args, 0)?)))
        }
        "endswith" => {
            expect_args(name, args, 1)?;
            Ok(Value::Bool(s.ends_with(str_arg(name, args, 0)?)))
        }
        "contains" => {
            expect_args(name, args, 1)?;
            Ok(Value::Bool(s.contains(str_arg(name, args, 0)?)))
        }
        "replace" => {
            expect_args(name, args, 2)?;
            let from = str_arg(name, args, 0)?;
            let to = str_arg(name, args, 1)?;
            Ok(Value::from(s.replace(from, to)))
        }
        "split" => {
            let parts: Vec<Value> = if args.is_empty() {
                s.split_whitespace().map(Value::from).collect()
            } else {
                expect_args(name, args, 1)?;
                s.split(str_arg(name, args, 0)?).map(Value::from).collect()
            };
            Ok(Value::Array(parts))
        }
        other => bail!("string has no method '{}'", other),
    }
}

fn array_method(
    items: &[Value],
    name: &str,
    args: &[Value],
    kwargs: &[(String, Value)],
) -> Result<Value> {
    match name {
        "len" => {
            expect_no_kwargs(name, kwargs)?;
            expect_args(name, args, 0)?;
            Ok(Value::from(items.len() as i64))
        }
        "contains" => {
            expect_no_kwargs(name, kwargs)?;
            expect_args(name, args, 1)?;
            Ok(Value::Bool(items.iter().any(|item| value_eq(item, &args[0]))))
        }
        "first" => {
            expect_no_kwargs(name, kwargs)?;
            expect_args(name, args, 0)?;
            Ok(items.first().cloned().unwrap_or(Value::Null))
        }
        "last" => {
            expect_no_kwargs(name, kwargs)?;
            expect_args(name, args, 0)?;
            Ok(items.last().cloned().unwrap_or(Value::Null))
        }
        "get" => {
            let default = args.get(1).or_else(|| kwarg(kwargs, "default"));
            let index = args
                .first()
                .and_then(Value::as_i64)
                .ok_or_else(|| anyhow!("get() expects an integer index"))?;
            match array_index(items, index) {
                Ok(value) => Ok(value),
                Err(_) => Ok(default.cloned().unwrap_or(Value::Null)),
            }
        }
        other => bail!("array has no method '{}'", other),
    }
}

fn object_method(
    map: &serde_json::Map<String, Value>,
    name: &str,
    args: &[Value],
    kwargs: &[(String, Value)],
) -> Result<Value> {
    match name {
        "len" => {
            expect_no_kwargs(name, kwargs)?;
            expect_args(name, args, 0)?;
            Ok(Value::from(map.len() as i64))
        }
        "keys" => {
            expect_no_kwargs(name, kwargs)?;
            expect_args(name, args, 0)?;
            Ok(Value::Array(map.keys().map(|k| Value::from(k.as_str())).collect()))
        }
        "values" => {
            expect_no_kwargs(name, kwargs)?;
            expect_args(name, args, 0)?;
            Ok(Value::Array(map.values().cloned().collect()))
        }
        "has" => {
            expect_no_kwargs(name, kwargs)?;
            expect_args(name, args, 1)?;
            let key = str_arg(name, args, 0)?;
            Ok(Value::Bool(map.contains_key(key)))
        }
        "get" => {
            let default = args.get(1).or_else(|| kwarg(kwargs, "default"));
            let key = str_arg(name, args, 0)?;
            Ok(map
                .get(key)
                .cloned()
                .or_else(|| default.cloned())
                .unwrap_or(Value::Null))
        }
        other => bail!("object has no method '{}'", other),
    }
}

fn call_method(
    receiver: &Value,
    name: &str,
    args: &[Value],
    kwargs: &[(String, Value)],
) -> Result<Value> {
    match receiver {
        Value::String(s) => string_method(s, name, args, kwargs),
        Value::Array(items) => array_method(items, name, args, kwargs),
        Value::Object(map) => object_method(map, name, args, kwargs),
        other => bail!("{} has no methods", type_name(other)),
    }
}

#[cfg(test)]
mod tests {
    use crate::args;
    use crate::expr::{lit, Operations, Xcall, X};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn eval(lambda: crate::expr::Lambda, input: Value) -> Value {
        lambda.eval(&input).unwrap()
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval(X + 3, json!(5)), json!(8));
        assert_eq!(eval(X - 2, json!(6)), json!(4));
        assert_eq!(eval(X * 3, json!(4)), json!(12));
        assert_eq!(eval(X / 2, json!(9)), json!(4.5));
        assert_eq!(eval(X.floordiv(2), json!(9)), json!(4));
        assert_eq!(eval(X % 3, json!(5)), json!(2));
        assert_eq!(eval(X.divmod(3), json!(5)), json!([1, 2]));
        assert_eq!(eval(X.pow(2), json!(4)), json!(16));
    }

    #[test]
    fn test_reflected() {
        assert_eq!(eval(3i64 + X, json!(5)), json!(8));
        assert_eq!(eval(2i64 - X, json!(6)), json!(-4));
        assert_eq!(eval(3i64 * X, json!(4)), json!(12));
        assert_eq!(eval(9i64 / X, json!(2)), json!(4.5));
        assert_eq!(eval(lit(9).floordiv(X), json!(2)), json!(4));
        assert_eq!(eval(5i64 % X, json!(3)), json!(2));
        assert_eq!(eval(lit(5).divmod(X), json!(3)), json!([1, 2]));
        assert_eq!(eval(lit(2).pow(X), json!(3)), json!(8));
    }

    #[test]
    fn test_floor_semantics() {
        assert_eq!(eval(X.floordiv(2), json!(-7)), json!(-4));
        assert_eq!(eval(X % 2, json!(-7)), json!(1));
        assert_eq!(eval(X.floordiv(-2), json!(7)), json!(-4));
        assert_eq!(eval(X % -2, json!(7)), json!(-1));
    }

    #[test]
    fn test_unary() {
        assert_eq!(eval(-X, json!(5)), json!(-5));
        assert_eq!(eval(X.abs(), json!(-5)), json!(5));
        assert_eq!(eval(X.pos(), json!(-5)), json!(-5));
        assert_eq!(eval((-X).abs(), json!(-2.5)), json!(2.5));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval(X.eq(5), json!(5)), json!(true));
        assert_eq!(eval(X.ne(4), json!(5)), json!(true));
        assert_eq!(eval(X.gt(3), json!(5)), json!(true));
        assert_eq!(eval(X.lt(3), json!(5)), json!(false));
        assert_eq!(eval(X.ge(5), json!(5)), json!(true));
        assert_eq!(eval(X.le(4), json!(5)), json!(false));
        assert_eq!(eval(lit(3).lt(X), json!(5)), json!(true));
        assert_eq!(eval(X.eq(5.0), json!(5)), json!(true));
        assert_eq!(eval(X.lt("banana"), json!("apple")), json!(true));
    }

    #[test]
    fn test_getattr_getitem() {
        let row = json!({"x": 2, "y": 3});
        assert_eq!(eval(X.attr("y"), row.clone()), json!(3));
        assert_eq!(eval(X.item("x"), row), json!(2));
        assert_eq!(eval(X.item(1), json!([10, 20, 30])), json!(20));
        assert_eq!(eval(X.item(-1), json!([10, 20, 30])), json!(30));

        let nested = json!({"point": {"x": 3, "y": 4}});
        assert_eq!(eval(X.attr("point").attr("x"), nested), json!(3));
    }

    #[test]
    fn test_multiple_placeholder_occurrences() {
        let row = json!({"height": 170, "width": 80});
        assert_eq!(
            eval(X.attr("height") + X.attr("width"), row),
            json!(250)
        );
        assert_eq!(eval(X * X, json!(5)), json!(25));
        assert_eq!(eval(X.pow(X), json!(3)), json!(27));
    }

    #[test]
    fn test_string_and_array_add() {
        assert_eq!(eval(X + "!", json!("hi")), json!("hi!"));
        assert_eq!(eval(X + json!([3]), json!([1, 2])), json!([1, 2, 3]));
    }

    #[test]
    fn test_method_calls() {
        assert_eq!(eval(X.method("upper").call(args![]), json!("joe")), json!("JOE"));
        assert_eq!(
            eval(X.method("replace").call(args!["a", "o"]), json!("banana")),
            json!("bonono")
        );
        assert_eq!(
            eval(X.method("split").call(args![","]), json!("a,b,c")),
            json!(["a", "b", "c"])
        );
        assert_eq!(
            eval(X.attr("name").method("startswith").call(args!["jo"]), json!({"name": "joe"})),
            json!(true)
        );
        assert_eq!(eval(X.method("len").call(args![]), json!([1, 2, 3])), json!(3));
        assert_eq!(
            eval(X.method("keys").call(args![]), json!({"a": 1, "b": 2})),
            json!(["a", "b"])
        );
    }

    #[test]
    fn test_method_call_with_kwargs() {
        use crate::kwargs;
        assert_eq!(
            eval(
                X.method("get").call_with(args!["z"], kwargs![default = 0]),
                json!({"a": 1})
            ),
            json!(0)
        );
    }

    #[test]
    fn test_method_argument_can_reference_placeholder() {
        // both the receiver and the argument resolve to the same input
        let row = json!({"name": "abcabc", "prefix": "abc"});
        assert_eq!(
            eval(
                X.attr("name")
                    .method("startswith")
                    .call(args![X.attr("prefix")]),
                row
            ),
            json!(true)
        );
    }

    #[test]
    fn test_membership() {
        assert_eq!(eval(X.in_(json!([1, 2, 3])), json!(2)), json!(true));
        assert_eq!(eval(X.in_(json!([1, 2, 3])), json!(9)), json!(false));
        assert_eq!(eval(X.not_in(json!([1, 2, 3])), json!(9)), json!(true));
        assert_eq!(eval(X.has("age"), json!({"age": 30})), json!(true));
        assert_eq!(eval(X.has("name"), json!({"age": 30})), json!(false));
        assert_eq!(eval(X.in_("banana"), json!("nan")), json!(true));
    }

    #[test]
    fn test_xcall() {
        let hypot = Xcall::new("hypot", |args| {
            let a = args[0].as_f64().unwrap_or_default();
            let b = args[1].as_f64().unwrap_or_default();
            Ok(json!((a * a + b * b).sqrt()))
        });
        let row = json!({"a": 3, "b": 4});
        assert_eq!(
            eval(hypot.call(args![X.attr("a"), X.attr("b")]), row),
            json!(5.0)
        );
        // plain literals mix with deferred arguments
        assert_eq!(eval(hypot.call(args![X, 4]), json!(3)), json!(5.0));
    }

    #[test]
    fn test_errors_propagate() {
        assert!((X / 0).eval(&json!(1)).is_err());
        assert!(X.attr("missing").eval(&json!({"a": 1})).is_err());
        assert!(X.item(5).eval(&json!([1, 2])).is_err());
        assert!((X + 1).eval(&json!("text")).is_err());
        assert!(X.method("nope").call(args![]).eval(&json!("s")).is_err());
        // a bare method reference is not a value
        assert!(X.method("upper").eval(&json!("s")).is_err());
    }

    #[test]
    fn test_into_fn_is_reusable() {
        let f = (X + 1).into_fn();
        assert_eq!(f(&json!(1)).unwrap(), json!(2));
        assert_eq!(f(&json!(41)).unwrap(), json!(42));
    }

    #[test]
    fn test_truthiness() {
        use super::truthy;
        assert!(!truthy(&json!(null)));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(!truthy(&json!([])));
        assert!(truthy(&json!(0.5)));
        assert!(truthy(&json!("x")));
        assert!(truthy(&json!([0])));
    }
}
