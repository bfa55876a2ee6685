//! Error types.
//!
//! Two kinds of failure exist, and they never mix:
//!
//! - [`Error`] — infrastructure failures (binding a port, accepting a
//!   connection). Returned by [`Server::serve`](crate::Server::serve).
//! - [`HandlerError`] — a failure reported by a fallible handler, middleware,
//!   or param guard. phoebe never constructs one of these itself; it only
//!   carries the value, untouched, to the router's error stage.

use std::fmt;

/// The failure value produced by a fallible handler.
///
/// Anything that converts into a boxed error works, so handlers can use `?`
/// on their own error types or fail with a plain message:
///
/// ```rust
/// use phoebe::{HandlerError, Request, Response};
///
/// async fn lookup(_req: Request) -> Result<Response, HandlerError> {
///     Err("user not found".into())
/// }
/// ```
///
/// The value is forwarded to the error stage as-is — phoebe does not inspect,
/// classify, or log it. See [`catch`](crate::catch) for the built-in stages.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// The error type returned by phoebe's fallible infrastructure operations.
///
/// Application-level failures travel separately, as [`HandlerError`] values
/// routed through the error stage. This type surfaces only what the server
/// itself can hit: binding to a port or accepting a connection.
#[derive(Debug)]
pub struct Error(std::io::Error);

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "io: {}", self.0)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self(e)
    }
}
