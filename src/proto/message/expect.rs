//! `Mysqlx.Expect.{Open,Close}` — expectation blocks: a server-side scope
//! inside which a configured invariant gates subsequent frames.

use crate::proto::message::{begin_frame, finish_frame};
use crate::proto::tags::{client_message, expect_condition_field, expect_ctx_operation, expect_open_field};

/// `Expect.Open.CtxOperation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CtxOp {
    CopyPrev,
    Empty,
}

impl CtxOp {
    fn as_u64(self) -> u64 {
        match self {
            CtxOp::CopyPrev => expect_ctx_operation::EXPECT_CTX_COPY_PREV,
            CtxOp::Empty => expect_ctx_operation::EXPECT_CTX_EMPTY,
        }
    }
}

/// One `Expect.Open.Condition`, distinguished by the value shape its
/// `condition_key` takes on the wire.
pub enum Condition {
    /// `EXPECT_NO_ERROR`: a single ASCII `'1'`/`'0'` byte.
    NoError(bool),
    /// `EXPECT_FIELD_EXIST`: a field-path string.
    FieldExist(String),
}

fn append_condition(buf: &mut Vec<u8>, cond: &Condition) {
    let mut inner = Vec::new();
    let (key, value): (u32, Vec<u8>) = match cond {
        Condition::NoError(ok) => {
            (crate::proto::tags::EXPECT_NO_ERROR, vec![if *ok { b'1' } else { b'0' }])
        }
        Condition::FieldExist(path) => {
            (crate::proto::tags::EXPECT_FIELD_EXIST, path.clone().into_bytes())
        }
    };
    crate::wire::append_varint_field(&mut inner, expect_condition_field::CONDITION_KEY, key as u64);
    crate::wire::append_bytes_field(&mut inner, expect_condition_field::CONDITION_VALUE, &value);
    crate::wire::append_bytes_field(buf, expect_open_field::CONDITION, &inner);
}

/// Appends an `EXPECT_OPEN` frame.
pub fn open(buf: &mut Vec<u8>, op: CtxOp, conditions: &[Condition]) {
    let start = begin_frame(buf, client_message::EXPECT_OPEN);
    for cond in conditions {
        append_condition(buf, cond);
    }
    crate::wire::append_varint_field(buf, expect_open_field::OP, op.as_u64());
    finish_frame(buf, start);
}

/// Appends an `EXPECT_CLOSE` frame (no payload beyond the frame header).
pub fn close(buf: &mut Vec<u8>) {
    let start = begin_frame(buf, client_message::EXPECT_CLOSE);
    finish_frame(buf, start);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_then_close_frame_types() {
        let mut buf = Vec::new();
        open(&mut buf, CtxOp::Empty, &[Condition::NoError(true)]);
        assert_eq!(buf[4], client_message::EXPECT_OPEN);
        let open_len = u32::from_le_bytes(buf[0..4].try_into().unwrap()) as usize;

        let close_start = 4 + open_len;
        close(&mut buf);
        assert_eq!(buf[close_start + 4], client_message::EXPECT_CLOSE);
    }
}
