//! Listener wrapper that absorbs transient accept errors.
//!
//! # Responsibilities
//! - Delegate accept and address queries to the wrapped listener
//! - Retry accept immediately when the error self-reports as transient
//! - Notify a caller-supplied observer of every absorbed error

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::panic::{self, AssertUnwindSafe};

use tokio::net::{TcpListener, TcpStream};

/// Capability for errors that can self-report as transient.
///
/// A transient error is expected to clear on its own if the failed operation
/// is simply tried again. Error types that do not override the default are
/// treated as never transient.
pub trait Transient {
    /// Whether retrying the failed operation can be expected to succeed.
    fn is_transient(&self) -> bool {
        false
    }
}

/// Accept-time conditions that clear on their own: the peer aborted or reset
/// before the connection was handed over, the call was interrupted, the
/// readiness event was stale, or the handshake timed out.
impl Transient for io::Error {
    fn is_transient(&self) -> bool {
        matches!(
            self.kind(),
            io::ErrorKind::ConnectionAborted
                | io::ErrorKind::ConnectionReset
                | io::ErrorKind::Interrupted
                | io::ErrorKind::WouldBlock
                | io::ErrorKind::TimedOut
        )
    }
}

/// A connection-accepting listener.
///
/// This is the polymorphic seam for [`RetryListener`]: anything that can
/// accept connections and report its local address can be wrapped. Closing
/// is ownership: dropping the listener closes it.
pub trait Listener {
    /// What a successful accept yields.
    type Conn;
    /// The accept error type.
    type Error;

    /// Wait for and return the next connection.
    fn accept(&self) -> impl Future<Output = Result<Self::Conn, Self::Error>> + Send;

    /// The local address the listener is bound to.
    fn local_addr(&self) -> io::Result<SocketAddr>;
}

impl Listener for TcpListener {
    type Conn = (TcpStream, SocketAddr);
    type Error = io::Error;

    async fn accept(&self) -> io::Result<Self::Conn> {
        TcpListener::accept(self).await
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        TcpListener::local_addr(self)
    }
}

type Observer<E> = Box<dyn Fn(&E) + Send + Sync>;

/// Listener decorator that retries accept on transient errors.
///
/// Non-transient errors surface unchanged after a single underlying call.
/// Transient ones are reported to the observer and retried immediately,
/// without delay or cap: a persistent transient condition keeps retrying for
/// as long as it persists. Successful accepts pass through unchanged; no
/// connection validation is performed.
pub struct RetryListener<L: Listener> {
    inner: L,
    on_transient: Observer<L::Error>,
}

impl<L> RetryListener<L>
where
    L: Listener,
    L::Error: Transient,
{
    /// Wrap `inner`, reporting absorbed errors to `on_transient`.
    ///
    /// The observer is a side-channel only: its return value is ignored, it
    /// is never invoked for non-transient errors, and a panic inside it is
    /// contained rather than unwinding into the accept caller.
    pub fn with_observer(
        inner: L,
        on_transient: impl Fn(&L::Error) + Send + Sync + 'static,
    ) -> Self {
        Self {
            inner,
            on_transient: Box::new(on_transient),
        }
    }

    /// Accept the next connection, absorbing transient errors.
    pub async fn accept(&self) -> Result<L::Conn, L::Error> {
        loop {
            match self.inner.accept().await {
                Ok(conn) => return Ok(conn),
                Err(err) if err.is_transient() => self.observe(&err),
                Err(err) => return Err(err),
            }
        }
    }

    /// The wrapped listener's local address.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    /// Hand back the wrapped listener. Dropping it closes it.
    pub fn into_inner(self) -> L {
        self.inner
    }

    fn observe(&self, err: &L::Error) {
        // An observer panic must not unwind into the accept caller.
        if panic::catch_unwind(AssertUnwindSafe(|| (self.on_transient)(err))).is_err() {
            tracing::error!("transient-error observer panicked");
        }
    }
}

impl<L> RetryListener<L>
where
    L: Listener,
    L::Error: Transient + std::fmt::Display,
{
    /// Wrap `inner`, logging absorbed errors at WARN.
    pub fn new(inner: L) -> Self {
        Self::with_observer(inner, |err: &L::Error| {
            tracing::warn!(error = %err, "transient accept error, retrying");
        })
    }
}
