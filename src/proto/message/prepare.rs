//! `Mysqlx.Prepare.{Prepare,Execute,Deallocate}` — prepared-statement
//! lifecycle. Statement ids are chosen by the caller; this crate never tracks
//! them, it only encodes what the caller asked for.

use crate::error::Result;
use crate::proto::message::{begin_frame, finish_frame, sql};
use crate::proto::tags::{
    client_message, deallocate_field, execute_field, one_of_message_field, one_of_message_type,
    prepare_field,
};
use crate::value::AppendAny;
use crate::wire::{self, WIRE_BYTES};

/// Appends a `PREPARE_PREPARE` frame wrapping a `StmtExecute`-shaped payload
/// inside `Prepare.OneOfMessage{type: STMT}`.
pub fn prepare(buf: &mut Vec<u8>, stmt_id: u32, stmt: &str) -> Result<()> {
    let start = begin_frame(buf, client_message::PREPARE_PREPARE);
    wire::append_varint_field(buf, prepare_field::STMT_ID, stmt_id as u64);

    let mut one_of = Vec::new();
    wire::append_varint_field(&mut one_of, one_of_message_field::TYPE, one_of_message_type::STMT);
    let mut inner = Vec::new();
    sql::append_body(&mut inner, stmt, &[])?;
    wire::append_bytes_field(&mut one_of, one_of_message_field::STMT_EXECUTE, &inner);

    buf.push(wire::key(prepare_field::STMT, WIRE_BYTES));
    wire::append_uvarint(buf, one_of.len() as u64);
    buf.extend_from_slice(&one_of);

    finish_frame(buf, start);
    Ok(())
}

/// Appends a `PREPARE_EXECUTE` frame: the prepared statement id followed by
/// its bound arguments, each as an `Any`.
pub fn execute(buf: &mut Vec<u8>, stmt_id: u32, args: &[Box<dyn AppendAny>]) -> Result<()> {
    let start = begin_frame(buf, client_message::PREPARE_EXECUTE);
    wire::append_varint_field(buf, execute_field::STMT_ID, stmt_id as u64);
    for arg in args {
        arg.append_any(buf, execute_field::ARGS)?;
    }
    finish_frame(buf, start);
    Ok(())
}

/// Appends a `PREPARE_DEALLOCATE` frame.
pub fn deallocate(buf: &mut Vec<u8>, stmt_id: u32) {
    let start = begin_frame(buf, client_message::PREPARE_DEALLOCATE);
    wire::append_varint_field(buf, deallocate_field::STMT_ID, stmt_id as u64);
    finish_frame(buf, start);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepare_then_execute_frame_types() {
        let mut buf = Vec::new();
        prepare(&mut buf, 1, "INSERT INTO foo(id, val) VALUES(?, ?)").unwrap();
        let prepare_len = u32::from_le_bytes(buf[0..4].try_into().unwrap()) as usize;
        assert_eq!(buf[4], client_message::PREPARE_PREPARE);

        let after_prepare = 4 + prepare_len;
        let args: Vec<Box<dyn AppendAny>> =
            vec![Box::new(0u64), Box::new("zero".to_string())];
        execute(&mut buf, 1, &args).unwrap();
        assert_eq!(buf[after_prepare + 4], client_message::PREPARE_EXECUTE);
    }

    #[test]
    fn deallocate_is_id_only() {
        let mut buf = Vec::new();
        deallocate(&mut buf, 9);
        assert_eq!(buf[4], client_message::PREPARE_DEALLOCATE);
    }
}
