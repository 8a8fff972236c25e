//! A single X Protocol connection: socket, buffered frame reader, and the
//! TLS-upgrade/authenticate handshake.
//!
//! One transport enum starts as a plain TCP (or Unix) socket and is
//! replaced in place by a TLS-wrapped stream after `CapabilitySet("tls",
//! true)` succeeds, so the rest of the connection's code never has to care
//! which one it's holding.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::TcpStream;

use crate::auth;
use crate::connect::{Endpoint, MySqlXConnectOptions};
use crate::error::{protocol_err, Error, Result, ER_ACCESS_DENIED_ERROR};
use crate::proto::message::{connection as msg_connection, session};
use crate::proto::tags::client_message;
use crate::reader::{self, PipelineError, ReadOutcome, Response};

/// The underlying transport: plaintext until (and unless) a TLS upgrade
/// succeeds. `Closed` is a transient placeholder, never observed outside
/// [`Connection::upgrade_tls`]'s move-out-then-replace — `Stream` has no
/// real "no transport yet" state otherwise.
enum Stream {
    Plain(TcpStream),
    #[cfg(feature = "_tls-native-tls")]
    NativeTls(tokio_native_tls::TlsStream<TcpStream>),
    #[cfg(feature = "_tls-rustls")]
    Rustls(Box<tokio_rustls::client::TlsStream<TcpStream>>),
    Closed,
}

impl Default for Stream {
    fn default() -> Self {
        Stream::Closed
    }
}

impl Stream {
    fn is_tls(&self) -> bool {
        match self {
            Stream::Plain(_) | Stream::Closed => false,
            #[cfg(feature = "_tls-native-tls")]
            Stream::NativeTls(_) => true,
            #[cfg(feature = "_tls-rustls")]
            Stream::Rustls(_) => true,
        }
    }
}

macro_rules! delegate_poll {
    ($self:ident, $cx:ident, $method:ident $(, $arg:expr)*) => {
        match $self.get_mut() {
            Stream::Plain(s) => Pin::new(s).$method($cx $(, $arg)*),
            #[cfg(feature = "_tls-native-tls")]
            Stream::NativeTls(s) => Pin::new(s).$method($cx $(, $arg)*),
            #[cfg(feature = "_tls-rustls")]
            Stream::Rustls(s) => Pin::new(s.as_mut()).$method($cx $(, $arg)*),
            Stream::Closed => Poll::Ready(Err(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "connection has no transport (mid TLS-upgrade or already closed)",
            ))),
        }
    };
}

impl AsyncRead for Stream {
    fn poll_read(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<std::io::Result<()>> {
        delegate_poll!(self, cx, poll_read, buf)
    }
}

impl AsyncWrite for Stream {
    fn poll_write(self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<std::io::Result<usize>> {
        delegate_poll!(self, cx, poll_write, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        delegate_poll!(self, cx, poll_flush)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        delegate_poll!(self, cx, poll_shutdown)
    }
}

/// A live, possibly-authenticated connection to an X Protocol server.
pub struct Connection {
    stream: Stream,
    scratch: BytesMut,
}

impl Connection {
    pub(crate) async fn dial(options: &MySqlXConnectOptions) -> Result<Self> {
        let stream = match options.endpoint() {
            Endpoint::Tcp { host, port } => {
                let addr = format!("{host}:{port}");
                let tcp = tokio::time::timeout(options.connect_timeout, TcpStream::connect(&addr))
                    .await
                    .map_err(|_| protocol_err!("connect to {addr} timed out"))??;
                tcp.set_nodelay(true).ok();
                Stream::Plain(tcp)
            }
            #[cfg(unix)]
            Endpoint::Unix(_path) => {
                return Err(protocol_err!("unix domain sockets are not yet wired up for this transport"));
            }
        };

        Ok(Connection { stream, scratch: BytesMut::with_capacity(4096) })
    }

    /// True iff the handshake hasn't happened yet and the transport is a
    /// plain TCP socket (so a TLS upgrade is meaningful).
    pub(crate) fn can_upgrade_tls(&self) -> bool {
        matches!(self.stream, Stream::Plain(_))
    }

    /// `CapabilitySet("tls", true)` followed by the client TLS handshake,
    /// replacing the plaintext transport in place.
    pub(crate) async fn upgrade_tls(&mut self, options: &MySqlXConnectOptions) -> Result<()> {
        let mut buf = Vec::new();
        msg_connection::capability_set(&mut buf, "tls", true);
        let response = self.write_one(&buf, client_message::CON_CAPABILITIES_SET).await?;
        if let Some(err) = response.error {
            return Err(Error::Server(err));
        }

        let tcp = match std::mem::take(&mut self.stream) {
            Stream::Plain(tcp) => tcp,
            other => {
                self.stream = other;
                return Err(protocol_err!("TLS upgrade requested on an already-upgraded connection"));
            }
        };

        self.stream = tls_connect(tcp, options).await?;
        Ok(())
    }

    /// True iff the transport is TLS — callers use this to decide whether a
    /// secure-fallback to `PLAIN` is safe (see [`Connection::authenticate`]).
    pub fn is_secure(&self) -> bool {
        self.stream.is_tls()
    }

    /// Runs the `AuthenticateStart`/`AuthenticateContinue` handshake for
    /// `mechanism_name`, falling back to `PLAIN` if the server reports
    /// `ACCESS_DENIED` and the transport is secure.
    pub async fn authenticate(&mut self, creds: &auth::Credentials, mechanism_name: &str) -> Result<()> {
        match self.run_authenticate(creds, mechanism_name).await {
            Ok(()) => Ok(()),
            Err(Error::Server(err)) if err.code == ER_ACCESS_DENIED_ERROR && self.is_secure() && mechanism_name != "PLAIN" => {
                log::warn!("access denied with {mechanism_name}, retrying with PLAIN over a secure transport");
                self.run_authenticate(creds, "PLAIN").await
            }
            Err(e) => Err(e),
        }
    }

    /// Drives one mechanism's `Start`/`Continue` handshake to completion:
    /// sends `AuthenticateStart`, then answers as many
    /// `AuthenticateContinue` round trips as the mechanism needs before the
    /// server emits `OK` or `ERROR`.
    async fn run_authenticate(&mut self, creds: &auth::Credentials, mechanism_name: &str) -> Result<()> {
        let mechanism = auth::by_name(mechanism_name)?;

        let mut buf = Vec::new();
        let initial = mechanism.start(creds);
        session::authenticate_start(&mut buf, mechanism.name(), initial.as_deref());
        self.stream.write_all(&buf).await?;
        self.stream.flush().await?;

        loop {
            match reader::read_one(&mut self.stream, &mut self.scratch, client_message::SESS_AUTHENTICATE_START).await? {
                ReadOutcome::Response(r) => {
                    return match r.error {
                        Some(err) => Err(Error::Server(err)),
                        None => Ok(()),
                    };
                }
                ReadOutcome::AuthenticateContinue(nonce) => {
                    if !mechanism.supports_continue() {
                        return Err(protocol_err!("{} received an unexpected AuthenticateContinue", mechanism.name()));
                    }
                    let payload = mechanism.continue_(creds, &nonce)?;
                    let mut cont_buf = Vec::new();
                    session::authenticate_continue(&mut cont_buf, &payload);
                    self.stream.write_all(&cont_buf).await?;
                    self.stream.flush().await?;
                }
            }
        }
    }

    /// Sends `SESS_RESET`. `keep_open` requests the server keep the
    /// underlying connection alive for reauthentication rather than closing
    /// it outright. Distinct from the transport swap `upgrade_tls` performs
    /// internally — this is the protocol-level session reset.
    pub async fn session_reset(&mut self, keep_open: bool) -> Result<()> {
        let mut buf = Vec::new();
        session::reset(&mut buf, keep_open);
        let response = self.write_one(&buf, client_message::SESS_RESET).await?;
        match response.error {
            Some(err) => Err(Error::Server(err)),
            None => Ok(()),
        }
    }

    /// Writes a single pre-framed client message and reads back its one
    /// response.
    async fn write_one(&mut self, buf: &[u8], originating_type: u8) -> Result<Response> {
        self.stream.write_all(buf).await?;
        self.stream.flush().await?;
        match reader::read_one(&mut self.stream, &mut self.scratch, originating_type).await? {
            ReadOutcome::Response(r) => Ok(r),
            ReadOutcome::AuthenticateContinue(_) => {
                Err(protocol_err!("unexpected AuthenticateContinue outside of authentication"))
            }
        }
    }

    /// Writes every frame in `buf` (a finished [`crate::builder::Builder`]
    /// buffer) in one call, then reads exactly one response per frame.
    /// `originating_types` is derived by walking `buf`'s own frame headers —
    /// the type byte at each frame's offset five bytes before its payload —
    /// rather than tracked separately by the builder.
    pub async fn send(&mut self, buf: &[u8]) -> std::result::Result<Vec<Response>, PipelineError> {
        let types = frame_types(buf).map_err(|error| PipelineError { responses: Vec::new(), error })?;

        if let Err(error) = self.stream.write_all(buf).await {
            return Err(PipelineError { responses: Vec::new(), error: error.into() });
        }
        if let Err(error) = self.stream.flush().await {
            return Err(PipelineError { responses: Vec::new(), error: error.into() });
        }

        reader::read_responses(&mut self.stream, &mut self.scratch, &types).await
    }
}

/// Walks a builder's finished buffer frame by frame (using each frame's own
/// 32-bit length prefix) and collects the client message type byte of each
/// one, without the builder needing to track that separately.
fn frame_types(buf: &[u8]) -> Result<Vec<u8>> {
    let mut types = Vec::new();
    let mut offset = 0usize;
    while offset < buf.len() {
        if buf.len() - offset < 5 {
            return Err(protocol_err!("truncated frame header in pipeline buffer"));
        }
        let len = u32::from_le_bytes(buf[offset..offset + 4].try_into().unwrap()) as usize;
        types.push(buf[offset + 4]);
        offset += 4 + len;
    }
    Ok(types)
}

#[cfg(feature = "_tls-native-tls")]
async fn tls_connect(tcp: TcpStream, options: &MySqlXConnectOptions) -> Result<Stream> {
    let mut builder = native_tls::TlsConnector::builder();
    if let Some(tls) = &options.tls {
        if tls.accept_invalid_certs {
            builder.danger_accept_invalid_certs(true);
        }
    }
    let connector: tokio_native_tls::TlsConnector = builder
        .build()
        .map_err(|e| Error::Tls(Box::new(e)))?
        .into();
    let tls_stream = connector
        .connect(&options.host, tcp)
        .await
        .map_err(|e| Error::Tls(Box::new(e)))?;
    Ok(Stream::NativeTls(tls_stream))
}

#[cfg(all(feature = "_tls-rustls", not(feature = "_tls-native-tls")))]
async fn tls_connect(tcp: TcpStream, options: &MySqlXConnectOptions) -> Result<Stream> {
    use std::sync::Arc;

    let mut roots = rustls::RootCertStore::empty();
    roots.add_trust_anchors(webpki_roots::TLS_SERVER_ROOTS.0.iter().map(|ta| {
        rustls::OwnedTrustAnchor::from_subject_spki_name_constraints(ta.subject, ta.spki, ta.name_constraints)
    }));
    let config = rustls::ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(roots)
        .with_no_client_auth();
    let connector = tokio_rustls::TlsConnector::from(Arc::new(config));
    let server_name = rustls::ServerName::try_from(options.host.as_str())
        .map_err(|e| Error::Tls(Box::new(e)))?;
    let tls_stream = connector.connect(server_name, tcp).await.map_err(|e| Error::Tls(Box::new(e)))?;
    Ok(Stream::Rustls(Box::new(tls_stream)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_types_walks_multiple_frames() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.push(client_message::SESS_RESET);
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.push(client_message::SQL_STMT_EXECUTE);

        let types = frame_types(&buf).unwrap();
        assert_eq!(types, vec![client_message::SESS_RESET, client_message::SQL_STMT_EXECUTE]);
    }

    #[test]
    fn frame_types_rejects_truncated_header() {
        let buf = vec![1, 0, 0];
        assert!(frame_types(&buf).is_err());
    }
}
