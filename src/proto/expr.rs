//! `Expr` envelope: a `Scalar` literal, or an operator/function-call/column/
//! variable/placeholder node, wrapped in a type-tagged union. Used for CRUD
//! row fields, update values, and criteria/operator trees.

use crate::proto::scalar::{self, ContentType};
use crate::proto::tags::{
    column_identifier_field, expr_field, expr_type, function_call_field, identifier_field,
    operator_field,
};
use crate::wire::{self, WIRE_BYTES};

fn append_expr_body(buf: &mut Vec<u8>, tag: u8, f: impl FnOnce(&mut Vec<u8>)) {
    let mut body = Vec::new();
    f(&mut body);
    buf.push(wire::key(tag, WIRE_BYTES));
    wire::append_uvarint(buf, body.len() as u64);
    buf.extend_from_slice(&body);
}

fn append_literal(buf: &mut Vec<u8>, f: impl FnOnce(&mut Vec<u8>, u8)) {
    wire::append_varint_field(buf, expr_field::TYPE, expr_type::LITERAL);
    f(buf, expr_field::LITERAL);
}

pub fn append_null(buf: &mut Vec<u8>, tag: u8) {
    append_expr_body(buf, tag, |body| append_literal(body, scalar::append_null));
}

pub fn append_bool(buf: &mut Vec<u8>, tag: u8, v: bool) {
    append_expr_body(buf, tag, |body| {
        append_literal(body, |b, t| scalar::append_bool(b, t, v))
    });
}

pub fn append_sint(buf: &mut Vec<u8>, tag: u8, v: i64) {
    append_expr_body(buf, tag, |body| {
        append_literal(body, |b, t| scalar::append_sint(b, t, v))
    });
}

pub fn append_sint_isize(buf: &mut Vec<u8>, tag: u8, v: isize) {
    append_sint(buf, tag, v as i64);
}

pub fn append_uint(buf: &mut Vec<u8>, tag: u8, v: u64) {
    append_expr_body(buf, tag, |body| {
        append_literal(body, |b, t| scalar::append_uint(b, t, v))
    });
}

pub fn append_uint_usize(buf: &mut Vec<u8>, tag: u8, v: usize) {
    append_uint(buf, tag, v as u64);
}

pub fn append_float(buf: &mut Vec<u8>, tag: u8, v: f32) {
    append_expr_body(buf, tag, |body| {
        append_literal(body, |b, t| scalar::append_float(b, t, v))
    });
}

pub fn append_double(buf: &mut Vec<u8>, tag: u8, v: f64) {
    append_expr_body(buf, tag, |body| {
        append_literal(body, |b, t| scalar::append_double(b, t, v))
    });
}

pub fn append_string(buf: &mut Vec<u8>, tag: u8, s: &str, collation: u64) {
    append_expr_body(buf, tag, |body| {
        append_literal(body, |b, t| scalar::append_string(b, t, s, collation))
    });
}

pub fn append_octets(buf: &mut Vec<u8>, tag: u8, bytes: &[u8]) {
    append_expr_body(buf, tag, |body| {
        append_literal(body, |b, t| scalar::append_octets(b, t, bytes, ContentType::Plain))
    });
}

pub fn append_octets_typed(buf: &mut Vec<u8>, tag: u8, bytes: &[u8], content_type: ContentType) {
    append_expr_body(buf, tag, |body| {
        append_literal(body, |b, t| scalar::append_octets(b, t, bytes, content_type))
    });
}

pub fn append_timestamp(buf: &mut Vec<u8>, tag: u8, secs_since_epoch: i64, nanos: u32) {
    append_expr_body(buf, tag, |body| {
        append_literal(body, |b, t| scalar::append_timestamp(b, t, secs_since_epoch, nanos))
    });
}

pub fn append_duration(buf: &mut Vec<u8>, tag: u8, total_seconds: i64) {
    append_expr_body(buf, tag, |body| {
        append_literal(body, |b, t| scalar::append_duration(b, t, total_seconds))
    });
}

/// Appends a column reference `{name}` at `tag`. Schema/table qualifiers are
/// intentionally unsupported — the reference client only ever binds bare
/// column names in this position.
pub fn append_column_identifier(buf: &mut Vec<u8>, tag: u8, name: &str) {
    append_expr_body(buf, tag, |body| {
        wire::append_varint_field(body, expr_field::TYPE, expr_type::IDENT);
        wire::append_bytes_field(body, expr_field::IDENTIFIER, &column_identifier_bytes(name));
    });
}

/// Appends a bare `Mysqlx.Expr.ColumnIdentifier{name}` message at `tag`,
/// *not* wrapped in the `Expr` union — used by `UpdateOperation.source`,
/// which names the message type directly rather than through an `Expr`.
pub fn append_column_identifier_raw(buf: &mut Vec<u8>, tag: u8, name: &str) {
    wire::append_bytes_field(buf, tag, &column_identifier_bytes(name));
}

fn column_identifier_bytes(name: &str) -> Vec<u8> {
    let mut ident = Vec::with_capacity(name.len() + 4);
    wire::append_string_field(&mut ident, column_identifier_field::NAME, name);
    ident
}

/// Appends a session-variable back-reference `{name}` at `tag`, e.g. one
/// previously assigned via `SET @id$n = LAST_INSERT_ID()`.
pub fn append_variable(buf: &mut Vec<u8>, tag: u8, name: &str) {
    append_expr_body(buf, tag, |body| {
        wire::append_varint_field(body, expr_field::TYPE, expr_type::VARIABLE);
        wire::append_string_field(body, expr_field::VARIABLE, name);
    });
}

/// Appends a placeholder ordinal `{position}` at `tag`.
pub fn append_placeholder(buf: &mut Vec<u8>, tag: u8, position: u32) {
    append_expr_body(buf, tag, |body| {
        wire::append_varint_field(body, expr_field::TYPE, expr_type::PLACEHOLDER);
        wire::append_varint_field(body, expr_field::POSITION, position as u64);
    });
}

/// Appends an operator node `{name, params[]}` at `tag`. Params are rendered
/// first so their combined length is known before the operator header
/// (`Mysqlx.Expr.Operator.name`, a bare string field) is inserted ahead of
/// them — avoiding a second serialisation pass over the params.
///
/// The reference client's operator table spells `REGEXP` as `"rexgexp"`; this
/// crate preserves that verbatim for wire compatibility rather than silently
/// "fixing" it (see DESIGN.md).
pub fn append_operator(
    buf: &mut Vec<u8>,
    tag: u8,
    name: &str,
    params: &[Box<dyn crate::value::AppendExpr>],
) -> crate::error::Result<()> {
    append_op_or_func(buf, tag, expr_type::OPERATOR, expr_field::OPERATOR, operator_field::PARAM,
        params, |hdr| wire::append_string_field(hdr, operator_field::NAME, name))
}

/// Appends a function-call node `{name, params[]}` at `tag`. `name` is
/// wrapped in a nested `Identifier{name}` message, unlike `Operator.name`
/// which is a bare string field.
pub fn append_function_call(
    buf: &mut Vec<u8>,
    tag: u8,
    name: &str,
    params: &[Box<dyn crate::value::AppendExpr>],
) -> crate::error::Result<()> {
    append_op_or_func(buf, tag, expr_type::FUNC_CALL, expr_field::FUNCTION_CALL,
        function_call_field::PARAM, params, |hdr| {
            let mut ident = Vec::with_capacity(name.len() + 4);
            wire::append_string_field(&mut ident, identifier_field::NAME, name);
            wire::append_bytes_field(hdr, function_call_field::NAME, &ident);
        })
}

/// Shared strategy for `Operator`/`FunctionCall`: serialise `params` (each an
/// `Expr` at `param_field`) first, then build the name header separately and
/// splice it in ahead of the params once both lengths are known, then wrap
/// the whole thing in the outer `Expr{type, outer_field}` framing at `tag`.
fn append_op_or_func(
    buf: &mut Vec<u8>,
    tag: u8,
    type_val: u64,
    outer_field: u8,
    param_field: u8,
    params: &[Box<dyn crate::value::AppendExpr>],
    build_name_header: impl FnOnce(&mut Vec<u8>),
) -> crate::error::Result<()> {
    let start = buf.len();
    wire::append_varint_field(buf, expr_field::TYPE, type_val);
    buf.push(wire::key(outer_field, WIRE_BYTES));
    let len_at = buf.len();

    let params_start = buf.len();
    for p in params {
        p.append_expr(buf, param_field)?;
    }
    let params_len = buf.len() - params_start;

    let mut name_hdr = Vec::new();
    build_name_header(&mut name_hdr);
    wire::insert(buf, params_start, &name_hdr);

    let inner_len = name_hdr.len() + params_len;
    let mut len_buf = [0u8; 10];
    let n = wire::put_uvarint(&mut len_buf, inner_len as u64);
    wire::insert(buf, len_at, &len_buf[..n]);

    let body_len = buf.len() - start;
    let mut len_buf2 = [0u8; 10];
    let n2 = wire::put_uvarint(&mut len_buf2, body_len as u64);
    let mut header = Vec::with_capacity(1 + n2);
    header.push(wire::key(tag, WIRE_BYTES));
    header.extend_from_slice(&len_buf2[..n2]);
    wire::insert(buf, start, &header);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_identifier_round_trips_name() {
        let mut buf = Vec::new();
        append_column_identifier(&mut buf, 2, "id");
        assert_eq!(buf[0], wire::key(2, WIRE_BYTES));
    }

    #[test]
    fn placeholder_encodes_position() {
        let mut buf = Vec::new();
        append_placeholder(&mut buf, 4, 7);
        assert!(!buf.is_empty());
    }
}
