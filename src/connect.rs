//! Connection options and the `Connector` that turns them into a live,
//! authenticated [`Connection`](crate::connection::Connection).
//!
//! A plain data struct with a fluent `.host(..)` builder, default port
//! 33060 (the X Protocol port, not the classic `3306`), and a `connect()`
//! that performs dial → optional TLS upgrade → authenticate in one call.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::auth::Credentials;
use crate::connection::Connection;
use crate::error::Result;

/// Default port for the MySQL X Protocol (distinct from the classic
/// protocol's `3306`).
pub const DEFAULT_PORT: u16 = 33060;

/// Network endpoint: TCP host/port, or a Unix domain socket path.
#[derive(Debug, Clone)]
pub(crate) enum Endpoint {
    Tcp { host: String, port: u16 },
    #[cfg(unix)]
    Unix(PathBuf),
}

/// TLS configuration for the upgrade handshake. An absent config means the
/// connection stays plaintext even if the server advertises TLS support.
#[derive(Debug, Clone, Default)]
pub struct TlsConfig {
    /// PEM-encoded root certificate(s) to trust, in addition to the
    /// platform's default trust store. `None` uses the platform defaults
    /// only.
    pub root_cert_path: Option<PathBuf>,
    /// Skip server certificate verification. Dangerous; intended only for
    /// connecting to a server with a self-signed certificate in a trusted
    /// network.
    pub accept_invalid_certs: bool,
}

/// Connection options, configured fluently and turned into a live connection
/// via [`MySqlXConnectOptions::connect`].
#[derive(Debug, Clone)]
pub struct MySqlXConnectOptions {
    pub(crate) host: String,
    pub(crate) port: u16,
    pub(crate) socket: Option<PathBuf>,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) database: String,
    pub(crate) auth_mechanism: Option<String>,
    pub(crate) tls: Option<TlsConfig>,
    pub(crate) connect_timeout: Duration,
}

impl Default for MySqlXConnectOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl MySqlXConnectOptions {
    /// Creates a new, default set of options ready for configuration:
    /// `localhost:33060`, user `root`, no password, no default schema.
    pub fn new() -> Self {
        MySqlXConnectOptions {
            host: String::from("localhost"),
            port: DEFAULT_PORT,
            socket: None,
            username: String::from("root"),
            password: String::new(),
            database: String::new(),
            auth_mechanism: None,
            tls: Some(TlsConfig::default()),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Sets the host to connect to.
    pub fn host(mut self, host: &str) -> Self {
        self.host = host.to_owned();
        self
    }

    /// Sets the port to connect to at the server host. Default `33060`.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Connects over a Unix domain socket instead of TCP.
    pub fn socket(mut self, path: impl AsRef<Path>) -> Self {
        self.socket = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn username(mut self, username: &str) -> Self {
        self.username = username.to_owned();
        self
    }

    pub fn password(mut self, password: &str) -> Self {
        self.password = password.to_owned();
        self
    }

    pub fn database(mut self, database: &str) -> Self {
        self.database = database.to_owned();
        self
    }

    /// Forces a specific authentication mechanism (`MYSQL41`, `SHA256_MEMORY`,
    /// `PLAIN`) instead of the default `MYSQL41`.
    pub fn auth_mechanism(mut self, mechanism: &str) -> Self {
        self.auth_mechanism = Some(mechanism.to_owned());
        self
    }

    /// Disables TLS entirely; the connection stays plaintext.
    pub fn disable_tls(mut self) -> Self {
        self.tls = None;
        self
    }

    /// Sets TLS configuration (trusted root, certificate verification mode).
    pub fn tls_config(mut self, config: TlsConfig) -> Self {
        self.tls = Some(config);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub(crate) fn endpoint(&self) -> Endpoint {
        #[cfg(unix)]
        if let Some(path) = &self.socket {
            return Endpoint::Unix(path.clone());
        }
        Endpoint::Tcp { host: self.host.clone(), port: self.port }
    }

    pub(crate) fn credentials(&self) -> Credentials {
        Credentials::new(self.database.clone(), self.username.clone(), self.password.clone())
    }

    /// Dials, optionally upgrades to TLS, and authenticates, returning a
    /// ready-to-use connection.
    pub async fn connect(&self) -> Result<Connection> {
        Connector::new(self.clone()).connect().await
    }
}

/// Performs the dial → TLS upgrade → authenticate sequence described by
/// [`MySqlXConnectOptions::connect`]. Split out as its own type so a
/// [`crate::pool::Pool`] can hold one factory and call `connect` repeatedly.
#[derive(Clone)]
pub(crate) struct Connector {
    options: MySqlXConnectOptions,
}

impl Connector {
    pub(crate) fn new(options: MySqlXConnectOptions) -> Self {
        Connector { options }
    }

    pub(crate) async fn connect(&self) -> Result<Connection> {
        log::debug!("connecting to {:?}", self.options.endpoint());
        let mut conn = Connection::dial(&self.options).await?;

        if self.options.tls.is_some() && conn.can_upgrade_tls() {
            log::trace!("upgrading connection to TLS");
            conn.upgrade_tls(&self.options).await?;
        }

        let mechanism_name = self.options.auth_mechanism.as_deref().unwrap_or("MYSQL41");
        conn.authenticate(&self.options.credentials(), mechanism_name).await?;
        log::debug!("connection established and authenticated");

        Ok(conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_localhost_and_x_protocol_port() {
        let opts = MySqlXConnectOptions::new();
        assert_eq!(opts.host, "localhost");
        assert_eq!(opts.port, DEFAULT_PORT);
        assert_eq!(opts.username, "root");
    }

    #[test]
    fn fluent_builder_overrides_fields() {
        let opts = MySqlXConnectOptions::new()
            .host("db.internal")
            .port(1234)
            .username("alice")
            .password("secret")
            .database("shop");
        assert_eq!(opts.host, "db.internal");
        assert_eq!(opts.port, 1234);
        assert_eq!(opts.username, "alice");
        assert_eq!(opts.password, "secret");
        assert_eq!(opts.database, "shop");
    }

    #[test]
    fn disable_tls_clears_config() {
        let opts = MySqlXConnectOptions::new().disable_tls();
        assert!(opts.tls.is_none());
    }
}
