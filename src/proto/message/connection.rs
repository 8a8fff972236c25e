//! `Mysqlx.Connection.CapabilitiesSet` — used in this crate exclusively to
//! negotiate the TLS upgrade (`CapabilitySet("tls", true)`).

use crate::proto::message::{begin_frame, finish_frame};
use crate::proto::tags::{capabilities_set_field, capability_field, client_message};
use crate::wire;

/// Appends a `CON_CAPABILITIES_SET` frame setting a single boolean
/// capability.
pub fn capability_set(buf: &mut Vec<u8>, name: &str, enabled: bool) {
    let start = begin_frame(buf, client_message::CON_CAPABILITIES_SET);

    // `Capability.value` is an `Any`, so a bool capability value is encoded
    // the same way an `Any`-typed argument would be.
    let mut capability = Vec::new();
    wire::append_string_field(&mut capability, capability_field::NAME, name);
    crate::proto::any::append_bool(&mut capability, capability_field::VALUE, enabled);

    let mut capabilities = Vec::new();
    wire::append_bytes_field(&mut capabilities, crate::proto::tags::capabilities_field::CAPABILITIES, &capability);

    wire::append_bytes_field(buf, capabilities_set_field::CAPABILITIES, &capabilities);
    finish_frame(buf, start);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_set_tls_frame_type() {
        let mut buf = Vec::new();
        capability_set(&mut buf, "tls", true);
        assert_eq!(buf[4], client_message::CON_CAPABILITIES_SET);
    }
}
