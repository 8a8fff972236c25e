//! Caller-facing constructors for `Expr` trees: column references, operators,
//! function calls, placeholders, session-variable references, and typed
//! octet literals (JSON/XML/geometry). These are the public surface the
//! `Update`/`Delete` criteria closures and `insert_row` chaining are built
//! from — internally they all resolve to [`crate::value::ExprFn`] closures
//! boxed as [`BoxedExpr`].

use crate::error::Error;
use crate::proto::scalar::ContentType;
use crate::proto::{expr as wire_expr};
use crate::value::{AppendExpr, BoxedExpr, ExprFn};

/// Lifts any concrete [`AppendExpr`] value (integers, strings, timestamps,
/// …) into a [`BoxedExpr`] so it can be passed as an operator/function-call
/// parameter alongside column references and nested operator trees.
pub fn lit<T: AppendExpr + 'static>(value: T) -> BoxedExpr {
    Box::new(value)
}

/// A column reference `{name}`. Schema/table qualifiers are not supported —
/// matching the reference encoder, which only ever binds bare column names
/// in this position.
pub fn column(name: impl Into<String>) -> BoxedExpr {
    let name = name.into();
    Box::new(ExprFn(move |buf: &mut Vec<u8>, tag: u8| {
        wire_expr::append_column_identifier(buf, tag, &name);
        Ok(())
    }))
}

/// A back-reference to a SQL session variable, e.g. one previously assigned
/// via `SET @id$n = LAST_INSERT_ID()` by [`crate::builder::Builder::insert_row`].
pub fn variable(name: impl Into<String>) -> BoxedExpr {
    let name = name.into();
    Box::new(ExprFn(move |buf: &mut Vec<u8>, tag: u8| {
        wire_expr::append_variable(buf, tag, &name);
        Ok(())
    }))
}

/// A bound-parameter placeholder ordinal.
pub fn placeholder(position: u32) -> BoxedExpr {
    Box::new(ExprFn(move |buf: &mut Vec<u8>, tag: u8| {
        wire_expr::append_placeholder(buf, tag, position);
        Ok(())
    }))
}

/// A plain-content opaque octet literal. Use [`json`]/[`xml`]/[`geometry`]
/// when the value carries one of those content types.
pub fn octets(bytes: impl Into<Vec<u8>>) -> BoxedExpr {
    octets_typed(bytes, ContentType::Plain)
}

pub fn json(bytes: impl Into<Vec<u8>>) -> BoxedExpr {
    octets_typed(bytes, ContentType::Json)
}

pub fn xml(bytes: impl Into<Vec<u8>>) -> BoxedExpr {
    octets_typed(bytes, ContentType::Xml)
}

pub fn geometry(bytes: impl Into<Vec<u8>>) -> BoxedExpr {
    octets_typed(bytes, ContentType::Geometry)
}

fn octets_typed(bytes: impl Into<Vec<u8>>, content_type: ContentType) -> BoxedExpr {
    let bytes = bytes.into();
    Box::new(ExprFn(move |buf: &mut Vec<u8>, tag: u8| {
        wire_expr::append_octets_typed(buf, tag, &bytes, content_type);
        Ok(())
    }))
}

/// A named operator node, e.g. `operator("==", vec![lhs, rhs])`. Exposed so
/// callers can reach operators this module does not name a helper for.
pub fn operator(name: impl Into<String>, params: Vec<BoxedExpr>) -> BoxedExpr {
    let name = name.into();
    Box::new(ExprFn(move |buf: &mut Vec<u8>, tag: u8| -> Result<(), Error> {
        wire_expr::append_operator(buf, tag, &name, &params)
    }))
}

/// A named function-call node, e.g. `function_call("date_add", vec![...])`.
pub fn function_call(name: impl Into<String>, params: Vec<BoxedExpr>) -> BoxedExpr {
    let name = name.into();
    Box::new(ExprFn(move |buf: &mut Vec<u8>, tag: u8| -> Result<(), Error> {
        wire_expr::append_function_call(buf, tag, &name, &params)
    }))
}

macro_rules! binary_op {
    ($fn_name:ident, $op:expr) => {
        pub fn $fn_name(lhs: BoxedExpr, rhs: BoxedExpr) -> BoxedExpr {
            operator($op, vec![lhs, rhs])
        }
    };
}

binary_op!(eq, "==");
binary_op!(ne, "!=");
binary_op!(lt, "<");
binary_op!(le, "<=");
binary_op!(gt, ">");
binary_op!(ge, ">=");
binary_op!(and, "&&");
binary_op!(or, "||");
binary_op!(like, "like");
binary_op!(is, "is");

/// Logical negation, `!expr`.
pub fn not(expr: BoxedExpr) -> BoxedExpr {
    operator("!", vec![expr])
}

/// `REGEXP` match. The reference client's operator table spells this
/// `"rexgexp"` (sic) and this crate preserves that misspelling verbatim for
/// wire compatibility — see the Open Questions note in DESIGN.md. Correcting
/// the spelling here would silently break against servers/clients that still
/// expect it.
pub fn regexp(lhs: BoxedExpr, rhs: BoxedExpr) -> BoxedExpr {
    operator("rexgexp", vec![lhs, rhs])
}

/// `now()`, no arguments.
pub fn now() -> BoxedExpr {
    function_call("now", vec![])
}

/// `date_add(date, amount, unit)`, with `unit` (e.g. `"HOUR"`) sent as a
/// plain octets literal rather than a quoted string.
pub fn date_add(date: BoxedExpr, amount: BoxedExpr, unit: &str) -> BoxedExpr {
    function_call("date_add", vec![date, amount, octets(unit.as_bytes())])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_of_column_and_literal_encodes_without_error() {
        let mut buf = Vec::new();
        let e = eq(column("id"), lit(1i64));
        e.append_expr(&mut buf, 6).unwrap();
        assert!(!buf.is_empty());
    }

    #[test]
    fn date_add_nests_now_and_unit_params() {
        let mut buf = Vec::new();
        let e = date_add(now(), lit(100i64), "HOUR");
        e.append_expr(&mut buf, 6).unwrap();
        assert!(!buf.is_empty());
    }
}
