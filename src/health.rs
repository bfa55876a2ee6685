//! Built-in Kubernetes health-check handlers.
//!
//! Kubernetes asks two questions. phoebe answers them.
//!
//! | Probe | Path | Question |
//! |---|---|---|
//! | **Liveness** | `/healthz` | Is the process alive? Failure → restart. |
//! | **Readiness** | `/readyz` | Can the pod serve traffic? Failure → pulled from load-balancer. |
//!
//! Register them on your router:
//!
//! ```rust,no_run
//! use phoebe::{Router, health};
//!
//! let app = Router::new()
//!     .get("/healthz", health::liveness)
//!     .get("/readyz", health::readiness);
//! ```
//!
//! Override `readiness` with a fallible handler if you need to gate on
//! dependency availability — a probe failure is just another handler failure,
//! so it flows through the error stage like any other:
//!
//! ```rust,no_run
//! use phoebe::{HandlerError, Request, Response};
//!
//! async fn readiness(_req: Request) -> Result<Response, HandlerError> {
//!     dependencies_are_healthy().await?;
//!     Ok(Response::text("ready"))
//! }
//!
//! async fn dependencies_are_healthy() -> Result<(), HandlerError> { Ok(()) }
//! ```

use crate::{Request, Response};

/// Kubernetes liveness probe handler.
///
/// Always returns `200 OK` with body `"ok"`. If the process can respond to
/// HTTP at all, it is alive — this handler intentionally has no dependencies.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// Kubernetes readiness probe handler (default implementation).
///
/// Returns `200 OK` with body `"ready"`. Replace this with your own handler
/// if your application needs a warm-up period or must verify dependency health
/// before accepting traffic.
pub async fn readiness(_req: Request) -> Response {
    Response::text("ready")
}
