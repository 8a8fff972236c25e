//! Scalar envelope: the innermost value representation shared by `Any` and
//! `Expr`. A `Scalar` is a type-tagged union of null/bool/signed/unsigned/float
//! widths, string, and octets.

use crate::proto::tags::{content_type, scalar_field, scalar_octets_field, scalar_string_field,
    scalar_type};
use crate::wire::{self, WIRE_BYTES};

/// Content type carried alongside an octet (binary) scalar. Mirrors
/// `Mysqlx.Datatypes.Scalar.Octets.ContentType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Plain,
    Geometry,
    Json,
    Xml,
}

impl ContentType {
    fn as_u32(self) -> u32 {
        match self {
            ContentType::Plain => content_type::PLAIN,
            ContentType::Geometry => content_type::GEOMETRY,
            ContentType::Json => content_type::JSON,
            ContentType::Xml => content_type::XML,
        }
    }
}

/// Appends a length-delimited `Scalar` message field at `tag`, containing the
/// null variant.
pub fn append_null(buf: &mut Vec<u8>, tag: u8) {
    append_scalar_body(buf, tag, |body| {
        wire::append_varint_field(body, scalar_field::TYPE, scalar_type::V_NULL);
    });
}

pub fn append_bool(buf: &mut Vec<u8>, tag: u8, v: bool) {
    append_scalar_body(buf, tag, |body| {
        wire::append_varint_field(body, scalar_field::TYPE, scalar_type::V_BOOL);
        wire::append_varint_field(body, scalar_field::V_BOOL, v as u64);
    });
}

pub fn append_sint(buf: &mut Vec<u8>, tag: u8, v: i64) {
    append_scalar_body(buf, tag, |body| {
        wire::append_varint_field(body, scalar_field::TYPE, scalar_type::V_SINT);
        wire::append_varint_field(body, scalar_field::V_SINT, wire::zigzag_encode(v));
    });
}

pub fn append_uint(buf: &mut Vec<u8>, tag: u8, v: u64) {
    append_scalar_body(buf, tag, |body| {
        wire::append_varint_field(body, scalar_field::TYPE, scalar_type::V_UINT);
        wire::append_varint_field(body, scalar_field::V_UINT, v);
    });
}

pub fn append_float(buf: &mut Vec<u8>, tag: u8, v: f32) {
    append_scalar_body(buf, tag, |body| {
        wire::append_varint_field(body, scalar_field::TYPE, scalar_type::V_FLOAT);
        wire::append_fixed32_field(body, scalar_field::V_FLOAT, v.to_bits());
    });
}

pub fn append_double(buf: &mut Vec<u8>, tag: u8, v: f64) {
    append_scalar_body(buf, tag, |body| {
        wire::append_varint_field(body, scalar_field::TYPE, scalar_type::V_DOUBLE);
        wire::append_fixed64_field(body, scalar_field::V_DOUBLE, v.to_bits());
    });
}

/// Appends a string scalar. `collation` of `0` is the "unspecified" default
/// and, matching the reference encoder, is omitted entirely rather than
/// written as an explicit zero.
pub fn append_string(buf: &mut Vec<u8>, tag: u8, s: &str, collation: u64) {
    append_scalar_body(buf, tag, |body| {
        wire::append_varint_field(body, scalar_field::TYPE, scalar_type::V_STRING);
        let mut inner = Vec::with_capacity(s.len() + 8);
        wire::append_bytes_field(&mut inner, scalar_string_field::VALUE, s.as_bytes());
        if collation != 0 {
            wire::append_varint_field(&mut inner, scalar_string_field::COLLATION, collation);
        }
        body.push(wire::key(scalar_field::V_STRING, WIRE_BYTES));
        wire::append_uvarint(body, inner.len() as u64);
        body.extend_from_slice(&inner);
    });
}

/// Appends an octets (binary) scalar. A `None` byte slice at the call site
/// must be routed to [`append_null`] instead — an absent value and an empty
/// octet string are different things on the wire.
pub fn append_octets(buf: &mut Vec<u8>, tag: u8, bytes: &[u8], content_type: ContentType) {
    append_scalar_body(buf, tag, |body| {
        wire::append_varint_field(body, scalar_field::TYPE, scalar_type::V_OCTETS);
        let mut inner = Vec::with_capacity(bytes.len() + 8);
        wire::append_bytes_field(&mut inner, scalar_octets_field::VALUE, bytes);
        let ct = content_type.as_u32();
        if ct != 0 {
            wire::append_varint_field(&mut inner, scalar_octets_field::CONTENT_TYPE, ct as u64);
        }
        body.push(wire::key(scalar_field::V_OCTETS, WIRE_BYTES));
        wire::append_uvarint(body, inner.len() as u64);
        body.extend_from_slice(&inner);
    });
}

/// Formats a timestamp as `YYYY-MM-DD HH:MM:SS.nnnnnnnnn` and appends it as a
/// plain-content octets scalar.
pub fn append_timestamp(buf: &mut Vec<u8>, tag: u8, secs_since_epoch: i64, nanos: u32) {
    let s = format_timestamp(secs_since_epoch, nanos);
    append_octets(buf, tag, s.as_bytes(), ContentType::Plain);
}

/// Formats a duration as `[-]H:MM:SS` and appends it as a plain-content
/// octets scalar. Hours are unbounded width; minutes and seconds are always
/// two digits.
pub fn append_duration(buf: &mut Vec<u8>, tag: u8, total_seconds: i64) {
    let s = format_duration(total_seconds);
    append_octets(buf, tag, s.as_bytes(), ContentType::Plain);
}

fn append_scalar_body(buf: &mut Vec<u8>, tag: u8, f: impl FnOnce(&mut Vec<u8>)) {
    let mut body = Vec::new();
    f(&mut body);
    buf.push(wire::key(tag, WIRE_BYTES));
    wire::append_uvarint(buf, body.len() as u64);
    buf.extend_from_slice(&body);
}

/// Two-digit decimal lookup, avoiding a division per digit pair when
/// formatting minutes/seconds.
const SMALLS: &str =
    "00010203040506070809101112131415161718192021222324252627282930313233343536373839\
     40414243444546474849505152535455565758596061626364656667686970717273747576777879\
     8081828384858687888990919293949596979899";

fn two_digits(n: u32) -> &'static str {
    let n = n as usize;
    &SMALLS[n * 2..n * 2 + 2]
}

fn format_timestamp(secs_since_epoch: i64, nanos: u32) -> String {
    let days = secs_since_epoch.div_euclid(86_400);
    let secs_of_day = secs_since_epoch.rem_euclid(86_400) as u32;
    let (y, m, d) = civil_from_days(days);
    let hh = secs_of_day / 3600;
    let mm = (secs_of_day / 60) % 60;
    let ss = secs_of_day % 60;
    format!(
        "{:04}-{:02}-{:02} {}:{}:{}.{:09}",
        y,
        m,
        d,
        two_digits(hh),
        two_digits(mm),
        two_digits(ss),
        nanos
    )
}

fn format_duration(total_seconds: i64) -> String {
    let negative = total_seconds < 0;
    let abs = total_seconds.unsigned_abs();
    let hh = abs / 3600;
    let mm = (abs / 60) % 60;
    let ss = abs % 60;
    format!(
        "{}{}:{}:{}",
        if negative { "-" } else { "" },
        hh,
        two_digits(mm as u32),
        two_digits(ss as u32)
    )
}

/// Howard Hinnant's civil-from-days algorithm, used so this crate does not
/// need a calendar dependency just to stamp `YYYY-MM-DD`.
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    (if m <= 2 { y + 1 } else { y }, m, d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_scalar_has_no_payload_beyond_type() {
        let mut buf = Vec::new();
        append_null(&mut buf, 1);
        assert_eq!(buf, vec![0x0A, 0x02, 0x08, scalar_type::V_NULL as u8]);
    }

    #[test]
    fn duration_formats_sign_and_width() {
        assert_eq!(format_duration(-42), "-0:00:42");
        assert_eq!(format_duration(0), "0:00:00");
        assert_eq!(format_duration(3661), "1:01:01");
    }

    #[test]
    fn civil_from_days_epoch() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
    }
}
