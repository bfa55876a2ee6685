//! The registration layer that upgrades fallible handlers.
//!
//! [`Router`] wraps a [`Mux`] and exposes the same registration surface: one
//! method per HTTP verb, [`all`](Router::all) for match-all routes,
//! [`middleware`](Router::middleware), and [`param`](Router::param). The
//! difference is what it accepts: every entry point takes *either* a plain
//! handler — forwarded to the mux untouched, exactly as if registered there
//! natively — or a fallible one, which is adapted so that its `Err` value is
//! carried to the error stage instead of being the handler's problem to
//! render.
//!
//! The router never reaches into the mux's tables; it adapts the callable
//! argument, forwards the call, and at the end hands the finished mux back
//! through [`into_mux`](Router::into_mux).
//!
//! ```rust
//! use phoebe::{HandlerError, Request, Response, Router};
//!
//! async fn get_user(req: Request) -> Result<Response, HandlerError> {
//!     let id: u64 = req.param("id").unwrap_or("0").parse()?;
//!     Ok(Response::json(format!(r#"{{"id":{id}}}"#).into_bytes()))
//! }
//!
//! let app = Router::new()
//!     .get("/users/{id}", get_user)
//!     .into_mux();
//! ```

use http::Method;

use crate::error::HandlerError;
use crate::handler::Handler;
use crate::middleware::{Middleware, ParamGuard};
use crate::mux::{Mux, RouterConfig};
use crate::response::Response;

/// The application router.
///
/// Each registration method consumes and returns `self`, so registrations
/// chain naturally; finish the chain with [`into_mux`](Router::into_mux) and
/// mount the result.
pub struct Router {
    mux: Mux,
}

impl Router {
    pub fn new() -> Self {
        Self { mux: Mux::new() }
    }

    /// Builds the underlying mux with explicit matching options. The options
    /// are handed to the [`Mux`] constructor as-is; the router itself ignores
    /// them.
    pub fn with_config(config: RouterConfig) -> Self {
        Self { mux: Mux::with_config(config) }
    }

    // ── Verb registrations ───────────────────────────────────────────────────

    pub fn get<M>(self, path: &str, handler: impl Handler<M>) -> Self {
        self.route(Method::GET, path, handler)
    }

    pub fn post<M>(self, path: &str, handler: impl Handler<M>) -> Self {
        self.route(Method::POST, path, handler)
    }

    pub fn put<M>(self, path: &str, handler: impl Handler<M>) -> Self {
        self.route(Method::PUT, path, handler)
    }

    pub fn delete<M>(self, path: &str, handler: impl Handler<M>) -> Self {
        self.route(Method::DELETE, path, handler)
    }

    pub fn patch<M>(self, path: &str, handler: impl Handler<M>) -> Self {
        self.route(Method::PATCH, path, handler)
    }

    pub fn head<M>(self, path: &str, handler: impl Handler<M>) -> Self {
        self.route(Method::HEAD, path, handler)
    }

    pub fn options<M>(self, path: &str, handler: impl Handler<M>) -> Self {
        self.route(Method::OPTIONS, path, handler)
    }

    fn route<M>(mut self, method: Method, path: &str, handler: impl Handler<M>) -> Self {
        self.mux.insert(method, path, handler.erase());
        self
    }

    // ── Generic registrations ────────────────────────────────────────────────

    /// Registers a handler for every HTTP method on `path`. A verb-specific
    /// route on the same path wins over the match-all one.
    pub fn all<M>(mut self, path: &str, handler: impl Handler<M>) -> Self {
        self.mux.insert_any(path, handler.erase());
        self
    }

    /// Registers a middleware. Middleware runs in registration order for
    /// every request entering the mux, before route lookup.
    pub fn middleware<M>(mut self, mw: impl Middleware<M>) -> Self {
        self.mux.push_middleware(mw.erase());
        self
    }

    /// Registers a guard for the path parameter `name`.
    ///
    /// The guard runs after route lookup and before the handler, once per
    /// matched occurrence of the name, in registration order. It receives the
    /// captured value and may mutate the request (load the referenced entity
    /// into the extensions, say) or fail, which sends the failure to the
    /// error stage without invoking the handler.
    pub fn param(mut self, name: &str, guard: impl ParamGuard) -> Self {
        self.mux.push_guard(name.to_owned(), guard.erase());
        self
    }

    /// Installs the error stage: the single place every handler, middleware,
    /// and guard failure lands.
    ///
    /// The stage receives the failure value as its sole argument, untouched,
    /// and decides the entire user-visible outcome. The default is
    /// [`catch::json`](crate::catch::json). Installing a stage replaces the
    /// previous one.
    pub fn catch(mut self, stage: impl Fn(HandlerError) -> Response + Send + Sync + 'static) -> Self {
        self.mux.set_stage(std::sync::Arc::new(stage));
        self
    }

    /// Mounts `child` under `prefix`. The prefix may itself carry parameters
    /// (`/tenants/{tenant}`); whether those are visible inside the child is
    /// the child's [`RouterConfig::merge_params`] decision.
    pub fn nest(mut self, prefix: &str, child: Router) -> Self {
        self.mux.mount(prefix, child.mux);
        self
    }

    /// Hands back the finished mux for mounting. This is the only way out —
    /// the router holds no other state.
    pub fn into_mux(self) -> Mux {
        self.mux
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, StatusCode};

    use super::*;
    use crate::request::Request;

    async fn plain(_req: Request) -> Response {
        Response::text("plain")
    }

    async fn failing(_req: Request) -> Result<Response, HandlerError> {
        Err("boom".into())
    }

    #[tokio::test]
    async fn plain_handlers_match_native_mux_registration() {
        // Same handler, registered both ways; responses must be identical.
        let via_router = Router::new().get("/h", plain).into_mux();
        let native = Mux::new().on(Method::GET, "/h", plain);

        let a = via_router.dispatch(Request::new(Method::GET, "/h")).await;
        let b = native.dispatch(Request::new(Method::GET, "/h")).await;
        assert_eq!(a.status_code(), b.status_code());
        assert_eq!(a.body(), b.body());
        assert_eq!(a.header("content-type"), b.header("content-type"));
    }

    #[tokio::test]
    async fn installed_stage_replaces_the_default() {
        let mux = Router::new()
            .get("/fail", failing)
            .catch(|err| {
                Response::builder()
                    .status(StatusCode::SERVICE_UNAVAILABLE)
                    .text(format!("custom: {err}"))
            })
            .into_mux();

        let resp = mux.dispatch(Request::new(Method::GET, "/fail")).await;
        assert_eq!(resp.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(resp.body(), b"custom: boom");
    }

    #[tokio::test]
    async fn registrations_chain_across_the_whole_surface() {
        async fn guard(req: Request, _value: String) -> Result<Request, HandlerError> {
            Ok(req)
        }
        async fn mw(req: Request) -> Request {
            req
        }
        let mux = Router::new()
            .get("/a/{id}", plain)
            .post("/a", plain)
            .put("/a", plain)
            .delete("/a", plain)
            .patch("/a", plain)
            .head("/a", plain)
            .options("/a", plain)
            .all("/b", plain)
            .middleware(mw)
            .param("id", guard)
            .into_mux();

        for method in [
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::HEAD,
            Method::OPTIONS,
        ] {
            let resp = mux.dispatch(Request::new(method.clone(), "/a")).await;
            assert_eq!(resp.status_code(), StatusCode::OK, "{method} /a");
        }
        assert_eq!(mux.dispatch(Request::new(Method::GET, "/a/1")).await.body(), b"plain");
        assert_eq!(mux.dispatch(Request::new(Method::PATCH, "/b")).await.body(), b"plain");
    }
}
