//! Ready-made error stages.
//!
//! An error stage is any `Fn(HandlerError) -> Response`. It is the last stop
//! for every failure a fallible handler, middleware, or param guard reports:
//! the stage alone decides status, headers, and body. This module ships the
//! two obvious ones; install your own with [`Router::catch`](crate::Router::catch)
//! when you need different behavior.
//!
//! ```rust,no_run
//! use phoebe::{Response, Router, StatusCode, catch};
//!
//! // the default, spelled out:
//! let app = Router::new().catch(catch::json);
//!
//! // or roll your own:
//! let app = Router::new().catch(|err| {
//!     Response::builder()
//!         .status(StatusCode::BAD_GATEWAY)
//!         .text(err.to_string())
//! });
//! ```

use http::StatusCode;

use crate::error::HandlerError;
use crate::response::Response;

/// The default stage: `500 Internal Server Error` with the failure's display
/// form as a JSON body, `{"error":"<message>"}`.
pub fn json(err: HandlerError) -> Response {
    let body = serde_json::to_vec(&serde_json::json!({ "error": err.to_string() }))
        .unwrap_or_default();
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .json(body)
}

/// `500 Internal Server Error` with the failure's display form as plain text.
pub fn text(err: HandlerError) -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .text(err.to_string())
}
