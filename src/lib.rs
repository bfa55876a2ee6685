//! # phoebe
//!
//! A minimal error-forwarding router for async Rust services.
//! Your handlers return `Result`; phoebe makes sure the `Err` arm goes
//! somewhere sensible.
//!
//! ## The contract
//!
//! A fallible handler should not have to render its own failures. phoebe's
//! [`Router`] accepts handlers that return `Result` and carries every failure
//! — whether produced before the first await point or after — to a single
//! **error stage**, exactly once, with the value untouched. Handlers that
//! return a plain response are registered on the underlying [`Mux`] exactly
//! as written; phoebe does not second-guess a handler that chose to render
//! its own errors.
//!
//! What phoebe leaves to others, on purpose:
//!
//! - **Path matching** — [`matchit`]'s radix tree, O(path-length) lookup
//! - **HTTP transport** — hyper, HTTP/1.1 and HTTP/2, graceful shutdown
//! - **Failure policy** — the error stage you install; the default one
//!   answers `500` with `{"error":"<message>"}`
//!
//! There is no retry, no fallback, and no inspection of failure values.
//! Forwarding is the whole feature.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use phoebe::{HandlerError, Request, Response, Router, Server, StatusCode};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .get("/users/{id}", get_user)
//!         .post("/users", create_user)
//!         .into_mux();
//!
//!     Server::bind("0.0.0.0:3000").serve(app).await.unwrap();
//! }
//!
//! async fn get_user(req: Request) -> Result<Response, HandlerError> {
//!     // `?` just works — parse failures land in the error stage.
//!     let id: u64 = req.param("id").unwrap_or_default().parse()?;
//!     # let bytes: Vec<u8> = vec![];
//!     Ok(Response::json(bytes))
//! }
//!
//! // A plain handler is left exactly as written.
//! async fn create_user(req: Request) -> Response {
//!     if req.body().is_empty() {
//!         return Response::status(StatusCode::BAD_REQUEST);
//!     }
//!     # let bytes: Vec<u8> = vec![];
//!     Response::builder()
//!         .status(StatusCode::CREATED)
//!         .header("location", "/users/99")
//!         .json(bytes)
//! }
//! ```

mod error;
mod handler;
mod middleware;
mod mux;
mod request;
mod response;
mod router;
mod server;

pub mod catch;
pub mod health;

pub use error::{Error, HandlerError};
pub use handler::{Handler, marker};
pub use http::{Method, StatusCode};
pub use middleware::{Middleware, ParamGuard};
pub use mux::{Mux, RouterConfig};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
