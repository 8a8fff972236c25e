//! `Mysqlx.Crud.{Insert,Update,Delete}` — table-mode CRUD messages. Only the
//! `TABLE` data model is supported; the document-store `DOCUMENT` model is
//! out of scope.

use crate::error::{encode_err, Result};
use crate::proto::expr;
use crate::proto::message::{begin_frame, finish_frame};
use crate::proto::tags::{
    client_message, collection_field, data_model, delete_field, insert_field, typed_row_field,
    update_field, update_operation_field, update_type,
};
use crate::value::AppendExpr;
use crate::wire::{self, WIRE_BYTES};

fn append_name_message(buf: &mut Vec<u8>, tag: u8, inner_field: u8, name: &str) {
    let mut inner = Vec::with_capacity(name.len() + 4);
    wire::append_string_field(&mut inner, inner_field, name);
    wire::append_bytes_field(buf, tag, &inner);
}

/// Begins a `CRUD_INSERT` frame: collection name, `DataModel::TABLE`, and one
/// projection `Column{name}` per entry in `columns`. The frame is left open —
/// the caller must follow with zero or more [`insert_row`] calls and finally
/// [`insert_finish`] once all rows are appended, so the outer length can be
/// back-patched once.
pub fn insert_begin(buf: &mut Vec<u8>, table: &str, columns: &[&str]) -> usize {
    let start = begin_frame(buf, client_message::CRUD_INSERT);
    append_name_message(buf, insert_field::COLLECTION, collection_field::NAME, table);
    wire::append_varint_field(buf, insert_field::DATA_MODEL, data_model::TABLE);
    for col in columns {
        append_name_message(buf, insert_field::PROJECTION, collection_field::NAME, col);
    }
    start
}

/// Appends one `TypedRow` to an insert frame opened by [`insert_begin`]. Each
/// field is encoded as an `Expr`. The row's length prefix is speculatively
/// reserved as 2 bytes and widened only if the row turns out to need more —
/// the common case (a handful of scalar columns) never does.
pub fn insert_row(buf: &mut Vec<u8>, num_columns: usize, row: &[Box<dyn AppendExpr>]) -> Result<()> {
    if row.len() != num_columns {
        return Err(encode_err!(
            "insert row has {} fields, expected {} to match columns",
            row.len(),
            num_columns
        ));
    }

    buf.push(wire::key(insert_field::ROW, WIRE_BYTES));
    let len_at = wire::reserve(buf, 2);
    let body_start = buf.len();
    for field in row {
        field.append_expr(buf, typed_row_field::FIELD)?;
    }
    let body_len = buf.len() - body_start;

    let needed = wire::size_varint(body_len as u64);
    if needed == 2 {
        wire::put_uvarint(&mut buf[len_at..len_at + 2], body_len as u64);
    } else {
        let mut correct = vec![0u8; needed];
        wire::put_uvarint(&mut correct, body_len as u64);
        buf.splice(len_at..len_at + 2, correct);
    }
    Ok(())
}

/// Back-patches the outer frame length opened by [`insert_begin`].
pub fn insert_finish(buf: &mut Vec<u8>, start: usize) {
    finish_frame(buf, start);
}

/// Begins a `CRUD_UPDATE` frame: collection/data-model header and optional
/// WHERE criteria. Mirrors [`insert_begin`] — the caller follows with zero or
/// more [`update_append_set`] calls and finally [`update_finish`].
pub fn update_begin(buf: &mut Vec<u8>, table: &str, criteria: Option<&dyn AppendExpr>) -> Result<usize> {
    let start = begin_frame(buf, client_message::CRUD_UPDATE);
    append_name_message(buf, update_field::COLLECTION, collection_field::NAME, table);
    wire::append_varint_field(buf, update_field::DATA_MODEL, data_model::TABLE);
    if let Some(criteria) = criteria {
        criteria.append_expr(buf, update_field::CRITERIA)?;
    }
    Ok(start)
}

/// Appends one `SET column = value` operation to an update frame opened by
/// [`update_begin`].
pub fn update_append_set(buf: &mut Vec<u8>, column: &str, value: &dyn AppendExpr) -> Result<()> {
    let mut op = Vec::new();
    expr::append_column_identifier_raw(&mut op, update_operation_field::SOURCE, column);
    wire::append_varint_field(&mut op, update_operation_field::OPERATION, update_type::SET);
    value.append_expr(&mut op, update_operation_field::VALUE)?;
    wire::append_bytes_field(buf, update_field::OPERATION, &op);
    Ok(())
}

/// Back-patches the outer frame length opened by [`update_begin`].
pub fn update_finish(buf: &mut Vec<u8>, start: usize) {
    finish_frame(buf, start);
}

/// Appends a complete `CRUD_UPDATE` frame in one call: collection/data-model
/// header, optional WHERE criteria, then zero or more `SET` operations.
pub fn update(
    buf: &mut Vec<u8>,
    table: &str,
    criteria: Option<&dyn AppendExpr>,
    sets: &[(String, Box<dyn AppendExpr>)],
) -> Result<()> {
    let start = update_begin(buf, table, criteria)?;
    for (column, value) in sets {
        update_append_set(buf, column, value.as_ref())?;
    }
    update_finish(buf, start);
    Ok(())
}

/// Appends a complete `CRUD_DELETE` frame: collection/data-model header and
/// optional WHERE criteria.
pub fn delete(buf: &mut Vec<u8>, table: &str, criteria: Option<&dyn AppendExpr>) -> Result<()> {
    let start = begin_frame(buf, client_message::CRUD_DELETE);
    append_name_message(buf, delete_field::COLLECTION, collection_field::NAME, table);
    wire::append_varint_field(buf, delete_field::DATA_MODEL, data_model::TABLE);
    if let Some(criteria) = criteria {
        criteria.append_expr(buf, delete_field::CRITERIA)?;
    }
    finish_frame(buf, start);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_rejects_row_column_mismatch() {
        let mut buf = Vec::new();
        let start = insert_begin(&mut buf, "foo", &["id", "val"]);
        let row: Vec<Box<dyn AppendExpr>> = vec![Box::new(1i64)];
        let err = insert_row(&mut buf, 2, &row).unwrap_err();
        assert!(matches!(err, crate::error::Error::Encode(_)));
        insert_finish(&mut buf, start);
    }

    #[test]
    fn delete_with_no_criteria_has_no_criteria_field() {
        let mut buf = Vec::new();
        delete(&mut buf, "foo", None).unwrap();
        assert_eq!(buf[4], client_message::CRUD_DELETE);
    }
}
