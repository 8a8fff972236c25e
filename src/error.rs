//! Error and Result types.

use std::fmt::{self, Debug, Display};
use std::io;

/// A specialized `Result` type for this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A generic error that represents all the ways a pipeline, connection, or pool
/// operation can fail.
#[derive(Debug)]
pub enum Error {
    /// Error communicating with the server.
    Io(io::Error),

    /// A value could not be encoded into any of the wire envelopes, or a builder
    /// invariant (row/column count, scope nesting) was violated. Latches the
    /// [`Builder`](crate::builder::Builder) that produced it.
    Encode(Box<str>),

    /// An error returned by the server, carrying its severity/code/sqlstate/message.
    Server(MySqlXError),

    /// Unexpected or invalid data was encountered on the wire: a message arrived
    /// out of sequence, or a frame failed to parse. Indicates either a server
    /// incompatibility or a bug in this crate.
    Protocol(Box<str>),

    /// An error occurred during the TLS upgrade handshake.
    Tls(Box<dyn std::error::Error + Send + Sync>),

    /// Authentication failed and no further mechanism could be tried.
    Authentication(Box<str>),

    /// [`Pool::close`](crate::pool::Pool::close) was called, or the pool was
    /// already closed when `acquire`/`send` was attempted.
    PoolClosed,
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(error) => Some(error),
            Error::Server(error) => Some(error),
            Error::Tls(error) => Some(&**error),
            _ => None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(error) => write!(f, "{}", error),
            Error::Encode(msg) => f.write_str(msg),
            Error::Server(error) => Display::fmt(error, f),
            Error::Protocol(msg) => f.write_str(msg),
            Error::Tls(error) => write!(f, "error during TLS upgrade: {}", error),
            Error::Authentication(msg) => write!(f, "authentication failed: {}", msg),
            Error::PoolClosed => f.write_str("attempted to use a connection pool that is closed"),
        }
    }
}

impl From<io::Error> for Error {
    #[inline]
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<MySqlXError> for Error {
    #[inline]
    fn from(err: MySqlXError) -> Self {
        Error::Server(err)
    }
}

/// The severity/code/sqlstate/message quadruple carried by a server `ERROR` notice.
#[derive(Debug, Clone)]
pub struct MySqlXError {
    pub severity: Severity,
    pub code: u32,
    pub sql_state: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Fatal,
}

impl MySqlXError {
    /// A fatal-severity error means the server has, or is about to, close the
    /// connection; callers must not reuse it.
    pub fn is_fatal(&self) -> bool {
        self.severity == Severity::Fatal
    }
}

impl Display for MySqlXError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.code, self.sql_state, self.message)
    }
}

impl std::error::Error for MySqlXError {}

/// Reported by the server when an `ERROR` frame's code matches the well-known
/// `ER_ACCESS_DENIED_ERROR`, used to decide whether to retry with `PLAIN` over a
/// secure transport.
pub const ER_ACCESS_DENIED_ERROR: u32 = 1045;

/// Used by the `protocol_err!()` macro for a lazily evaluated conversion to
/// [`Error::Protocol`].
pub(crate) struct ProtocolError<'a> {
    pub args: fmt::Arguments<'a>,
}

impl From<ProtocolError<'_>> for Error {
    #[inline]
    fn from(err: ProtocolError<'_>) -> Self {
        Error::Protocol(err.args.to_string().into_boxed_str())
    }
}

macro_rules! protocol_err (
    ($($args:tt)*) => {
        $crate::error::Error::from($crate::error::ProtocolError { args: format_args!($($args)*) })
    }
);

pub(crate) use protocol_err;

macro_rules! encode_err (
    ($($args:tt)*) => {
        $crate::error::Error::Encode(format!($($args)*).into_boxed_str())
    }
);

pub(crate) use encode_err;
