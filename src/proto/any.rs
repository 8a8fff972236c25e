//! `Any` envelope: a `Scalar` wrapped in a type-tagged union, used wherever the
//! wire format calls for a self-describing argument value — `StmtExecute` and
//! `Execute` arguments.

use crate::proto::scalar::{self, ContentType};
use crate::proto::tags::{any_field, any_type};
use crate::wire::{self, WIRE_BYTES};

fn append_any_body(buf: &mut Vec<u8>, tag: u8, f: impl FnOnce(&mut Vec<u8>)) {
    let mut body = Vec::new();
    wire::append_varint_field(&mut body, any_field::TYPE, any_type::SCALAR);
    f(&mut body);
    buf.push(wire::key(tag, WIRE_BYTES));
    wire::append_uvarint(buf, body.len() as u64);
    buf.extend_from_slice(&body);
}

pub fn append_null(buf: &mut Vec<u8>, tag: u8) {
    append_any_body(buf, tag, |body| scalar::append_null(body, any_field::SCALAR));
}

pub fn append_bool(buf: &mut Vec<u8>, tag: u8, v: bool) {
    append_any_body(buf, tag, |body| scalar::append_bool(body, any_field::SCALAR, v));
}

pub fn append_sint(buf: &mut Vec<u8>, tag: u8, v: i64) {
    append_any_body(buf, tag, |body| scalar::append_sint(body, any_field::SCALAR, v));
}

pub fn append_sint_isize(buf: &mut Vec<u8>, tag: u8, v: isize) {
    append_sint(buf, tag, v as i64);
}

pub fn append_uint(buf: &mut Vec<u8>, tag: u8, v: u64) {
    append_any_body(buf, tag, |body| scalar::append_uint(body, any_field::SCALAR, v));
}

pub fn append_uint_usize(buf: &mut Vec<u8>, tag: u8, v: usize) {
    append_uint(buf, tag, v as u64);
}

pub fn append_float(buf: &mut Vec<u8>, tag: u8, v: f32) {
    append_any_body(buf, tag, |body| scalar::append_float(body, any_field::SCALAR, v));
}

pub fn append_double(buf: &mut Vec<u8>, tag: u8, v: f64) {
    append_any_body(buf, tag, |body| scalar::append_double(body, any_field::SCALAR, v));
}

pub fn append_string(buf: &mut Vec<u8>, tag: u8, s: &str, collation: u64) {
    append_any_body(buf, tag, |body| {
        scalar::append_string(body, any_field::SCALAR, s, collation)
    });
}

pub fn append_octets(buf: &mut Vec<u8>, tag: u8, bytes: &[u8]) {
    append_any_body(buf, tag, |body| {
        scalar::append_octets(body, any_field::SCALAR, bytes, ContentType::Plain)
    });
}

pub fn append_octets_typed(buf: &mut Vec<u8>, tag: u8, bytes: &[u8], content_type: ContentType) {
    append_any_body(buf, tag, |body| {
        scalar::append_octets(body, any_field::SCALAR, bytes, content_type)
    });
}

pub fn append_timestamp(buf: &mut Vec<u8>, tag: u8, secs_since_epoch: i64, nanos: u32) {
    append_any_body(buf, tag, |body| {
        scalar::append_timestamp(body, any_field::SCALAR, secs_since_epoch, nanos)
    });
}

pub fn append_duration(buf: &mut Vec<u8>, tag: u8, total_seconds: i64) {
    append_any_body(buf, tag, |body| {
        scalar::append_duration(body, any_field::SCALAR, total_seconds)
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_any_wraps_scalar_with_type_tag() {
        let mut buf = Vec::new();
        append_bool(&mut buf, 3, true);
        // outer key for tag 3, length-delimited
        assert_eq!(buf[0], wire::key(3, WIRE_BYTES));
        // body = type varint field + scalar field
        let len = buf[1] as usize;
        assert_eq!(buf.len(), 2 + len);
    }

    #[test]
    fn null_is_distinct_from_empty_octets() {
        let mut null_buf = Vec::new();
        append_null(&mut null_buf, 1);
        let mut empty_buf = Vec::new();
        append_octets(&mut empty_buf, 1, &[]);
        assert_ne!(null_buf, empty_buf);
    }
}
