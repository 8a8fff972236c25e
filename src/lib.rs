//! A client library for the MySQL X Protocol.
//!
//! The entry points are [`MySqlXConnectOptions`] for a single authenticated
//! [`Connection`], or [`Pool`] for a FIFO pool of them. Requests are built
//! with [`Builder`] and sent with `Connection::send`/`PooledConnection::send`,
//! which return one [`Response`] per pipelined frame.

#![forbid(unsafe_code)]

mod error;

mod auth;
mod connect;
mod connection;
mod proto;
mod reader;
mod wire;

pub mod builder;
pub mod collation;
pub mod decimal;
pub mod expr;
pub mod pool;
pub mod value;

pub use auth::Credentials;
pub use builder::{Builder, Condition, CtxOp, Isolation};
pub use collation::{Collation, CollatedStr};
pub use connect::{MySqlXConnectOptions, TlsConfig, DEFAULT_PORT};
pub use connection::Connection;
pub use decimal::{decode_packed as decode_decimal, Decoded as DecodedDecimal, U256};
pub use error::{Error, MySqlXError, Result, Severity};
pub use pool::{Pool, PooledConnection};
pub use reader::{PipelineError, ReadOutcome, Response};
pub use value::{AppendAny, AppendExpr, BoxedAny, BoxedExpr};
