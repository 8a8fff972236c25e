//! SASL-like authentication mechanisms: `MYSQL41`, `SHA256_MEMORY`, `PLAIN`.
//!
//! Each mechanism produces the payload for `AuthenticateStart` and,
//! optionally, `AuthenticateContinue` once the server has sent back a nonce
//! (`auth_data`). The wire payload shape is always `database \0 username \0
//! …` — what follows the second NUL differs per mechanism.

use sha1::Sha1;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Credentials used to authenticate a connection. The password is held in a
/// [`Zeroizing`] wrapper so it is overwritten on drop rather than left
/// sitting in memory after use.
#[derive(Clone)]
pub struct Credentials {
    pub database: String,
    pub username: String,
    pub password: Zeroizing<String>,
}

impl Credentials {
    pub fn new(database: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            database: database.into(),
            username: username.into(),
            password: Zeroizing::new(password.into()),
        }
    }
}

fn payload_prefix(creds: &Credentials) -> Vec<u8> {
    let mut buf = Vec::with_capacity(creds.database.len() + creds.username.len() + 2);
    buf.extend_from_slice(creds.database.as_bytes());
    buf.push(0);
    buf.extend_from_slice(creds.username.as_bytes());
    buf.push(0);
    buf
}

/// An authentication mechanism: the `Start`/`Continue` half of the SASL-like
/// handshake in [`crate::connection::Connection::authenticate`].
pub trait AuthMechanism {
    /// The name sent in `AuthenticateStart.mech_name`, e.g. `"MYSQL41"`.
    fn name(&self) -> &'static str;

    /// The initial payload, if any, sent alongside `AuthenticateStart`.
    fn start(&self, creds: &Credentials) -> Option<Vec<u8>>;

    /// Whether this mechanism expects a server nonce and a follow-up
    /// `AuthenticateContinue`.
    fn supports_continue(&self) -> bool {
        false
    }

    /// Computes the `AuthenticateContinue` payload from the server's nonce.
    /// Mechanisms that don't support continuation never have this called.
    fn continue_(&self, _creds: &Credentials, _auth_data: &[u8]) -> Result<Vec<u8>> {
        Err(crate::error::protocol_err!(
            "{} does not support AuthenticateContinue",
            self.name()
        ))
    }
}

/// `PLAIN`: sends `db\0user\0password` up front, no continuation. Only safe
/// over a secure transport (TLS or a Unix domain socket) — the caller, not
/// this module, is responsible for that check (see
/// [`crate::connection::Connection::is_secure`]).
pub struct Plain;

impl AuthMechanism for Plain {
    fn name(&self) -> &'static str {
        "PLAIN"
    }

    fn start(&self, creds: &Credentials) -> Option<Vec<u8>> {
        let mut buf = payload_prefix(creds);
        buf.extend_from_slice(creds.password.as_bytes());
        Some(buf)
    }
}

/// `MYSQL41`: sends only the mechanism name up front, then scrambles the
/// password against the server's nonce on `Continue`.
pub struct Mysql41;

impl AuthMechanism for Mysql41 {
    fn name(&self) -> &'static str {
        "MYSQL41"
    }

    fn start(&self, _creds: &Credentials) -> Option<Vec<u8>> {
        None
    }

    fn supports_continue(&self) -> bool {
        true
    }

    fn continue_(&self, creds: &Credentials, auth_data: &[u8]) -> Result<Vec<u8>> {
        let mut buf = payload_prefix(creds);
        if !creds.password.is_empty() {
            let scramble = scramble_sha1(creds.password.as_bytes(), auth_data);
            buf.push(b'*');
            buf.extend_from_slice(hex::encode(scramble).as_bytes());
        }
        Ok(buf)
    }
}

/// `SHA256_MEMORY`: same shape as `MYSQL41` but with SHA-256 and no leading
/// `*` on the scramble.
pub struct Sha256Memory;

impl AuthMechanism for Sha256Memory {
    fn name(&self) -> &'static str {
        "SHA256_MEMORY"
    }

    fn start(&self, _creds: &Credentials) -> Option<Vec<u8>> {
        None
    }

    fn supports_continue(&self) -> bool {
        true
    }

    fn continue_(&self, creds: &Credentials, auth_data: &[u8]) -> Result<Vec<u8>> {
        let mut buf = payload_prefix(creds);
        let scramble = scramble_sha256(creds.password.as_bytes(), auth_data);
        buf.extend_from_slice(hex::encode(scramble).as_bytes());
        Ok(buf)
    }
}

/// `SHA1(password) XOR SHA1(nonce || SHA1(SHA1(password)))`.
fn scramble_sha1(password: &[u8], nonce: &[u8]) -> [u8; 20] {
    let pw_hash = Sha1::digest(password);
    let pw_hash_hash = Sha1::digest(pw_hash);

    let mut ctx = Sha1::new();
    ctx.update(nonce);
    ctx.update(pw_hash_hash);
    let pw_seed_hash_hash = ctx.finalize();

    let mut out = [0u8; 20];
    for i in 0..20 {
        out[i] = pw_hash[i] ^ pw_seed_hash_hash[i];
    }
    out
}

/// `SHA256(password) XOR SHA256(SHA256(SHA256(password)) || nonce)`.
fn scramble_sha256(password: &[u8], nonce: &[u8]) -> [u8; 32] {
    let pw_hash = Sha256::digest(password);
    let pw_hash_hash = Sha256::digest(pw_hash);

    let mut ctx = Sha256::new();
    ctx.update(pw_hash_hash);
    ctx.update(nonce);
    let pw_seed_hash_hash = ctx.finalize();

    let mut out = [0u8; 32];
    for i in 0..32 {
        out[i] = pw_hash[i] ^ pw_seed_hash_hash[i];
    }
    out
}

/// Resolves a mechanism name (`MYSQL41`, `SHA256_MEMORY`, `PLAIN`) to its
/// implementation.
pub fn by_name(name: &str) -> Result<Box<dyn AuthMechanism + Send + Sync>> {
    match name {
        "MYSQL41" => Ok(Box::new(Mysql41)),
        "SHA256_MEMORY" => Ok(Box::new(Sha256Memory)),
        "PLAIN" => Ok(Box::new(Plain)),
        other => Err(Error::Authentication(format!("unknown authentication mechanism: {other}").into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mysql41_omits_scramble_for_empty_password() {
        let creds = Credentials::new("db", "user", "");
        let payload = Mysql41.continue_(&creds, b"01234567890123456789").unwrap();
        assert_eq!(payload, b"db\0user\0");
    }

    #[test]
    fn mysql41_scramble_is_forty_hex_chars() {
        let creds = Credentials::new("db", "user", "secret");
        let payload = Mysql41.continue_(&creds, b"01234567890123456789").unwrap();
        let star = payload.iter().position(|&b| b == b'*').unwrap();
        assert_eq!(payload.len() - star - 1, 40);
    }

    #[test]
    fn sha256_memory_scramble_is_sixty_four_hex_chars_no_star() {
        let creds = Credentials::new("db", "user", "secret");
        let payload = Sha256Memory.continue_(&creds, b"nonce-value-needs-bytes").unwrap();
        assert!(!payload.contains(&b'*'));
        let prefix_len = "db\0user\0".len();
        assert_eq!(payload.len() - prefix_len, 64);
    }

    #[test]
    fn plain_sends_password_immediately() {
        let creds = Credentials::new("db", "user", "secret");
        let payload = Plain.start(&creds).unwrap();
        assert_eq!(payload, b"db\0user\0secret");
    }
}
