//! Middleware and param guards.
//!
//! Middleware intercepts every request entering a [`Mux`](crate::Mux) —
//! before route lookup, so it also runs for requests that end in 404. It is
//! the right place for cross-cutting concerns: request-id injection,
//! authentication-header inspection, per-request state.
//!
//! A middleware receives the [`Request`], may mutate it (typically via
//! [`Request::extensions_mut`]), and hands it back to continue the pipeline.
//! The same [`Plain`](crate::marker::Plain) / [`Fallible`](crate::marker::Fallible)
//! classification as for handlers applies: a middleware returning
//! `Result<Request, E>` is upgraded so its `Err` goes to the error stage,
//! one returning `Request` is registered untouched.
//!
//! ```rust
//! use phoebe::{HandlerError, Request, Router};
//!
//! #[derive(Clone)]
//! struct RequestId(u64);
//!
//! async fn tag(mut req: Request) -> Request {
//!     req.extensions_mut().insert(RequestId(7));
//!     req
//! }
//!
//! async fn gate(req: Request) -> Result<Request, HandlerError> {
//!     if req.header("authorization").is_none() {
//!         return Err("missing credentials".into());
//!     }
//!     Ok(req)
//! }
//!
//! let app = Router::new().middleware(tag).middleware(gate);
//! ```
//!
//! Param guards are the narrower cousin: registered against a path-parameter
//! name, run only when a matched route captured that name, always fallible.
//! See [`Router::param`](crate::Router::param).

use std::future::Future;
use std::sync::Arc;

use crate::error::HandlerError;
use crate::handler::{BoxFuture, marker};
use crate::request::Request;

// ── Type erasure ──────────────────────────────────────────────────────────────

/// Internal dispatch interface for middleware. Same story as
/// `ErasedHandler`: `#[doc(hidden)] pub` because it leaks into `erase`'s
/// return type.
#[doc(hidden)]
pub trait ErasedMiddleware {
    fn call(&self, req: Request) -> BoxFuture<Result<Request, HandlerError>>;
}

#[doc(hidden)]
pub type BoxedMiddleware = Arc<dyn ErasedMiddleware + Send + Sync + 'static>;

#[doc(hidden)]
pub trait ErasedParamGuard {
    fn call(&self, req: Request, value: String) -> BoxFuture<Result<Request, HandlerError>>;
}

#[doc(hidden)]
pub type BoxedParamGuard = Arc<dyn ErasedParamGuard + Send + Sync + 'static>;

// ── Middleware trait ──────────────────────────────────────────────────────────

/// Implemented for every valid middleware function.
///
/// Automatically satisfied for any `async fn` with one of the signatures:
///
/// ```text
/// async fn name(req: Request) -> Request                 // Plain
/// async fn name(req: Request) -> Result<Request, E>      // Fallible
/// ```
///
/// Sealed like [`Handler`](crate::Handler).
pub trait Middleware<M>: private::Sealed<M> + Send + Sync + 'static {
    #[doc(hidden)]
    fn erase(self) -> BoxedMiddleware;
}

/// Implemented for every valid param guard.
///
/// Automatically satisfied for `async fn(Request, String) -> Result<Request, E>`.
/// Guards exist to validate or resolve a path parameter, so the fallible
/// shape is the only one.
pub trait ParamGuard: private::SealedGuard + Send + Sync + 'static {
    #[doc(hidden)]
    fn erase(self) -> BoxedParamGuard;
}

mod private {
    pub trait Sealed<M> {}
    pub trait SealedGuard {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut> private::Sealed<marker::Plain> for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Request> + Send + 'static,
{
}

impl<F, Fut> Middleware<marker::Plain> for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Request> + Send + 'static,
{
    fn erase(self) -> BoxedMiddleware {
        Arc::new(PlainMw(self))
    }
}

impl<F, Fut, E> private::Sealed<marker::Fallible> for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Request, E>> + Send + 'static,
    E: Into<HandlerError> + Send + 'static,
{
}

impl<F, Fut, E> Middleware<marker::Fallible> for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Request, E>> + Send + 'static,
    E: Into<HandlerError> + Send + 'static,
{
    fn erase(self) -> BoxedMiddleware {
        Arc::new(FallibleMw(self))
    }
}

impl<F, Fut, E> private::SealedGuard for F
where
    F: Fn(Request, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Request, E>> + Send + 'static,
    E: Into<HandlerError> + Send + 'static,
{
}

impl<F, Fut, E> ParamGuard for F
where
    F: Fn(Request, String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Request, E>> + Send + 'static,
    E: Into<HandlerError> + Send + 'static,
{
    fn erase(self) -> BoxedParamGuard {
        Arc::new(GuardFn(self))
    }
}

// ── Concrete wrappers ─────────────────────────────────────────────────────────

struct PlainMw<F>(F);

impl<F, Fut> ErasedMiddleware for PlainMw<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Request> + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<Result<Request, HandlerError>> {
        let fut = (self.0)(req);
        Box::pin(async move { Ok(fut.await) })
    }
}

struct FallibleMw<F>(F);

impl<F, Fut, E> ErasedMiddleware for FallibleMw<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Request, E>> + Send + 'static,
    E: Into<HandlerError> + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<Result<Request, HandlerError>> {
        let fut = (self.0)(req);
        Box::pin(async move { fut.await.map_err(Into::into) })
    }
}

struct GuardFn<F>(F);

impl<F, Fut, E> ErasedParamGuard for GuardFn<F>
where
    F: Fn(Request, String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Request, E>> + Send + 'static,
    E: Into<HandlerError> + Send + 'static,
{
    fn call(&self, req: Request, value: String) -> BoxFuture<Result<Request, HandlerError>> {
        let fut = (self.0)(req, value);
        Box::pin(async move { fut.await.map_err(Into::into) })
    }
}

#[cfg(test)]
mod tests {
    use http::Method;

    use super::*;

    #[derive(Clone, PartialEq, Debug)]
    struct Seen(&'static str);

    #[tokio::test]
    async fn plain_middleware_passes_the_request_through() {
        async fn mw(mut req: Request) -> Request {
            req.extensions_mut().insert(Seen("mw"));
            req
        }
        let req = mw.erase().call(Request::new(Method::GET, "/")).await.unwrap();
        assert_eq!(req.extensions().get::<Seen>(), Some(&Seen("mw")));
    }

    #[tokio::test]
    async fn fallible_middleware_err_surfaces() {
        async fn mw(_req: Request) -> Result<Request, HandlerError> {
            Err("denied".into())
        }
        let err = mw.erase().call(Request::new(Method::GET, "/")).await.unwrap_err();
        assert_eq!(err.to_string(), "denied");
    }

    #[tokio::test]
    async fn guard_receives_the_parameter_value() {
        async fn guard(req: Request, value: String) -> Result<Request, HandlerError> {
            if value == "0" {
                return Err("zero is reserved".into());
            }
            Ok(req)
        }
        let erased = guard.erase();
        assert!(erased.call(Request::new(Method::GET, "/"), "42".into()).await.is_ok());
        let err = erased.call(Request::new(Method::GET, "/"), "0".into()).await.unwrap_err();
        assert_eq!(err.to_string(), "zero is reserved");
    }
}
