//! A FIFO pool of ready X Protocol connections.
//!
//! Idle connections sit in a bounded ring buffer; `acquire` never blocks —
//! it either pops one off immediately or dials a fresh one. No waiter
//! channel and no cap on in-flight connections, only on how many may sit
//! idle at once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_queue::ArrayQueue;

use crate::connect::{Connector, MySqlXConnectOptions};
use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::reader::{PipelineError, Response};

struct PoolInner {
    idle: ArrayQueue<Connection>,
    connector: Connector,
    closed: AtomicBool,
}

/// A FIFO pool of connections to one X Protocol server. Cheap to clone —
/// clones share the same idle queue and connector.
#[derive(Clone)]
pub struct Pool {
    inner: Arc<PoolInner>,
}

impl Pool {
    /// Creates a pool backed by `options`, holding at most `capacity` idle
    /// connections (the pool does not cap connections actively in use —
    /// only how many may sit idle waiting for the next `acquire`).
    pub fn new(options: MySqlXConnectOptions, capacity: usize) -> Self {
        Pool {
            inner: Arc::new(PoolInner {
                idle: ArrayQueue::new(capacity.max(1)),
                connector: Connector::new(options),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Closes the pool: subsequent `acquire` calls fail with
    /// [`Error::PoolClosed`], and the current idle connections are dropped
    /// (closing their sockets).
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        while self.inner.idle.pop().is_some() {}
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Number of connections currently sitting idle in the pool.
    pub fn num_idle(&self) -> usize {
        self.inner.idle.len()
    }

    /// Hands out a connection: an idle one if the queue has one ready,
    /// otherwise dials a fresh connection through the pool's connector.
    pub async fn acquire(&self) -> Result<PooledConnection> {
        if self.is_closed() {
            return Err(Error::PoolClosed);
        }

        let conn = match self.inner.idle.pop() {
            Some(conn) => conn,
            None => {
                log::trace!("pool idle queue empty, dialing a new connection");
                self.inner.connector.connect().await?
            }
        };

        Ok(PooledConnection { conn: Some(conn), pool: Arc::clone(&self.inner), failed: false })
    }
}

/// A connection checked out from a [`Pool`]. Returned to the pool's idle
/// queue on drop unless a `send` on it errored (the connection can no
/// longer be trusted to be in sync with the server) or the pool is closed
/// (in which case it's simply dropped, closing its socket) or the idle
/// queue is already full (same outcome).
pub struct PooledConnection {
    conn: Option<Connection>,
    pool: Arc<PoolInner>,
    failed: bool,
}

impl PooledConnection {
    /// Sends a finished pipeline buffer and reads back its responses. Any
    /// failure marks this connection so it is closed rather than returned
    /// to the pool on drop.
    pub async fn send(&mut self, buf: &[u8]) -> std::result::Result<Vec<Response>, PipelineError> {
        let result = self.conn.as_mut().expect("connection taken").send(buf).await;
        if result.is_err() {
            self.failed = true;
        }
        result
    }
}

impl std::ops::Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn.as_ref().expect("connection taken")
    }
}

impl std::ops::DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Connection {
        self.conn.as_mut().expect("connection taken")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let Some(conn) = self.conn.take() else { return };
        if self.failed || self.pool.closed.load(Ordering::SeqCst) {
            return;
        }
        if let Err(conn) = self.pool.idle.push(conn) {
            drop(conn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_pool_starts_with_no_idle_connections_and_is_open() {
        let pool = Pool::new(MySqlXConnectOptions::new(), 4);
        assert_eq!(pool.num_idle(), 0);
        assert!(!pool.is_closed());
    }

    #[tokio::test]
    async fn acquire_on_a_closed_pool_errors() {
        let pool = Pool::new(MySqlXConnectOptions::new(), 4);
        pool.close();
        assert!(matches!(pool.acquire().await, Err(Error::PoolClosed)));
    }
}
