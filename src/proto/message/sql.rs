//! `Mysqlx.Sql.StmtExecute` — run a SQL statement, optionally with `Any`-typed
//! arguments bound to `?` placeholders.

use crate::error::Result;
use crate::proto::message::{begin_frame, finish_frame};
use crate::proto::tags::{client_message, stmt_execute_field};
use crate::value::AppendAny;
use crate::wire;

/// Appends the raw `Mysqlx.Sql.StmtExecute` fields (no frame header). Shared
/// with [`crate::proto::message::prepare`], which nests this same shape
/// inside a `Prepare.OneOfMessage`.
pub fn append_body(buf: &mut Vec<u8>, stmt: &str, args: &[Box<dyn AppendAny>]) -> Result<()> {
    wire::append_string_field(buf, stmt_execute_field::STMT, stmt);
    for arg in args {
        arg.append_any(buf, stmt_execute_field::ARGS)?;
    }
    Ok(())
}

/// Appends a full `SQL_STMT_EXECUTE` frame. The namespace field is omitted,
/// which the server defaults to `"sql"`; there is no compact-metadata flag —
/// this client always wants full column metadata back.
pub fn append(buf: &mut Vec<u8>, stmt: &str, args: &[Box<dyn AppendAny>]) -> Result<()> {
    let start = begin_frame(buf, client_message::SQL_STMT_EXECUTE);
    append_body(buf, stmt, args)?;
    finish_frame(buf, start);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_prefix_matches_frame_size() {
        let mut buf = Vec::new();
        append(&mut buf, "SELECT 1", &[]).unwrap();
        let declared = u32::from_le_bytes(buf[0..4].try_into().unwrap());
        assert_eq!(declared as usize, buf.len() - 4);
        assert_eq!(buf[4], client_message::SQL_STMT_EXECUTE);
    }
}
