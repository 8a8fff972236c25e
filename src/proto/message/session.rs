//! `Mysqlx.Session.{Reset,AuthenticateStart,AuthenticateContinue}`.

use crate::proto::message::{begin_frame, finish_frame};
use crate::proto::tags::{authenticate_continue_field, authenticate_start_field, client_message, reset_field};
use crate::wire;

/// Appends a `SESS_RESET` frame. `keep_open` requests that the server keep
/// the underlying connection/session alive rather than fully closing it.
pub fn reset(buf: &mut Vec<u8>, keep_open: bool) {
    let start = begin_frame(buf, client_message::SESS_RESET);
    wire::append_varint_field(buf, reset_field::KEEP_OPEN, keep_open as u64);
    finish_frame(buf, start);
}

/// Appends a `SESS_AUTHENTICATE_START` frame naming the mechanism, with an
/// optional initial auth payload (`PLAIN`'s `db\0user\0password` goes here;
/// `MYSQL41`/`SHA256_MEMORY` send no initial payload and wait for the
/// server's nonce via `AuthenticateContinue`).
pub fn authenticate_start(buf: &mut Vec<u8>, mechanism: &str, auth_data: Option<&[u8]>) {
    let start = begin_frame(buf, client_message::SESS_AUTHENTICATE_START);
    wire::append_string_field(buf, authenticate_start_field::MECH_NAME, mechanism);
    if let Some(data) = auth_data {
        wire::append_bytes_field(buf, authenticate_start_field::AUTH_DATA, data);
    }
    finish_frame(buf, start);
}

/// Appends a `SESS_AUTHENTICATE_CONTINUE` frame carrying the scrambled
/// response to the server's nonce.
pub fn authenticate_continue(buf: &mut Vec<u8>, auth_data: &[u8]) {
    let start = begin_frame(buf, client_message::SESS_AUTHENTICATE_CONTINUE);
    wire::append_bytes_field(buf, authenticate_continue_field::AUTH_DATA, auth_data);
    finish_frame(buf, start);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_keep_open_encodes_as_single_varint_field() {
        let mut buf = Vec::new();
        reset(&mut buf, true);
        assert_eq!(buf[4], client_message::SESS_RESET);
    }
}
