//! Handler traits, failure classification, and type erasure.
//!
//! # How handlers are stored
//!
//! The route table needs to hold handlers of *different* types in a single
//! `HashMap<Method, Tree>`. Rust collections can only hold one concrete type,
//! so we use **trait objects** (`dyn ErasedHandler`) to hide the concrete
//! handler type behind a common interface and store everything uniformly.
//!
//! The chain from user code to vtable call is:
//!
//! ```text
//! async fn hello(req: Request) -> Result<Response, HandlerError> { … }
//!        ↓ router.get("/", hello)
//! hello.erase()                                    ← Handler blanket impl
//!        ↓
//! Arc::new(FallibleFn(hello))                      ← heap-allocated wrapper
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(req)  at request time               ← one vtable dispatch
//!        ↓
//! Box::pin(async { … })                            ← BoxFuture
//! ```
//!
//! The only runtime cost per request is one Arc clone (atomic inc) plus one
//! virtual call.
//!
//! # How failure reporting is classified
//!
//! [`Handler`] carries a marker type parameter recording, at compile time,
//! how the function reports failure:
//!
//! - [`marker::Plain`] — the function returns a response directly. It is
//!   erased to a call that can never surface an error; registering it through
//!   [`Router`](crate::Router) is observably identical to registering it on
//!   the [`Mux`](crate::Mux) natively.
//! - [`marker::Fallible`] — the function returns `Result`. Its `Err` value is
//!   surfaced on the error channel, and dispatch hands it to the router's
//!   error stage exactly once.
//!
//! The boundary is the return *type*, nothing else. A plain handler that
//! builds a 500 response by hand is not upgraded, and a fallible handler
//! that always returns `Ok` never touches the stage. The erased shape is the
//! same either way, so a failure produced before a handler's first await
//! point travels the identical path as one produced after it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::HandlerError;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

// ── Internal types ────────────────────────────────────────────────────────────

/// A heap-allocated, type-erased future.
///
/// `Pin<Box<…>>` is required because the async runtime must be able to poll
/// the future in-place — it cannot move it in memory after the first poll.
/// `Send + 'static` let tokio move the future across threads safely.
pub(crate) type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `erase` method. External
/// crates cannot usefully interact with this trait.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture<Result<Response, HandlerError>>;
}

/// A heap-allocated, type-erased handler shared across concurrent requests.
///
/// `#[doc(hidden)] pub` for the same reason as `ErasedHandler`.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

// ── Markers ───────────────────────────────────────────────────────────────────

/// Marker types recording how a handler or middleware reports failure.
///
/// You never name these directly — type inference picks the right one from
/// the function's return type at the registration call site.
pub mod marker {
    /// The function returns its output directly and cannot fail.
    pub enum Plain {}

    /// The function returns `Result`; its `Err` goes to the error stage.
    pub enum Fallible {}
}

// ── Public Handler trait ──────────────────────────────────────────────────────

/// Implemented for every valid route handler.
///
/// You never implement this yourself. It is automatically satisfied for any
/// `async fn` with one of the two signatures:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse                // Plain
/// async fn name(req: Request) -> Result<impl IntoResponse, E>    // Fallible
/// ```
///
/// where `E: Into<HandlerError>`.
///
/// The trait is **sealed** (via the private `Sealed` supertrait): only the
/// blanket impls below can satisfy it. This prevents accidental misuse and
/// keeps the API surface stable across versions.
pub trait Handler<M>: private::Sealed<M> + Send + Sync + 'static {
    #[doc(hidden)]
    fn erase(self) -> BoxedHandler;
}

/// The sealing module. Because `Sealed` is private, external crates cannot
/// name it and therefore cannot implement `Handler` on their own types.
mod private {
    pub trait Sealed<M> {}
}

// ── Blanket implementations ───────────────────────────────────────────────────

impl<F, Fut, R> private::Sealed<marker::Plain> for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

/// Plain handlers: erased to a call that always yields `Ok`.
impl<F, Fut, R> Handler<marker::Plain> for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn erase(self) -> BoxedHandler {
        Arc::new(PlainFn(self))
    }
}

impl<F, Fut, R, E> private::Sealed<marker::Fallible> for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: IntoResponse + Send + 'static,
    E: Into<HandlerError> + Send + 'static,
{
}

/// Fallible handlers: the `Err` value is surfaced, unmodified, on the error
/// channel. There is no retry, no fallback, and no inspection of the value.
impl<F, Fut, R, E> Handler<marker::Fallible> for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: IntoResponse + Send + 'static,
    E: Into<HandlerError> + Send + 'static,
{
    fn erase(self) -> BoxedHandler {
        Arc::new(FallibleFn(self))
    }
}

// ── Concrete wrappers ─────────────────────────────────────────────────────────

/// Newtype wrapper for a plain handler `F`, bridging the typed world to the
/// trait-object world.
struct PlainFn<F>(F);

impl<F, Fut, R> ErasedHandler for PlainFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<Result<Response, HandlerError>> {
        let fut = (self.0)(req);
        Box::pin(async move { Ok(fut.await.into_response()) })
    }
}

/// Newtype wrapper for a fallible handler `F`.
struct FallibleFn<F>(F);

impl<F, Fut, R, E> ErasedHandler for FallibleFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
    R: IntoResponse + Send + 'static,
    E: Into<HandlerError> + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<Result<Response, HandlerError>> {
        let fut = (self.0)(req);
        Box::pin(async move {
            match fut.await {
                Ok(r) => Ok(r.into_response()),
                Err(e) => Err(e.into()),
            }
        })
    }
}
