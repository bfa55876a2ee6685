//! Radix-tree dispatch object.
//!
//! The [`Mux`] is what actually owns routes and answers requests: one
//! [`matchit`] tree per HTTP method, O(path-length) lookup. The tree matching
//! itself is matchit's business — this module only wraps it with the pipeline
//! that runs around a matched handler: middleware, param guards, mounted
//! sub-muxes, and the error stage.
//!
//! You normally build a `Mux` through [`Router`](crate::Router), which layers
//! the fallible-handler upgrade on top. [`Mux::on`] is the native registration
//! path and accepts plain handlers only.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use http::{Method, StatusCode};
use matchit::Router as MatchitRouter;

use crate::catch;
use crate::error::HandlerError;
use crate::handler::{BoxedHandler, Handler, marker};
use crate::middleware::{BoxedMiddleware, BoxedParamGuard};
use crate::request::Request;
use crate::response::Response;

/// Parameter name reserved for the remainder segment of a mount pattern.
const MOUNT_REST: &str = "__rest";

pub(crate) type Stage = Arc<dyn Fn(HandlerError) -> Response + Send + Sync + 'static>;

// ── Config ───────────────────────────────────────────────────────────────────

/// Matching options, forwarded verbatim to the [`Mux`] constructor.
///
/// Everything defaults to the relaxed value.
#[derive(Clone, Copy, Debug, Default)]
pub struct RouterConfig {
    /// Match literal path segments case-sensitively. When off (default),
    /// `/Users` and `/users` are the same route, and paths are reported in
    /// their ASCII-lowercased form.
    pub case_sensitive: bool,
    /// Treat a trailing slash as significant. When off (default), `/users`
    /// and `/users/` are the same route.
    pub strict: bool,
    /// In a mux mounted under a parameterised prefix, merge the parent's
    /// prefix parameters into the request parameters (this mux's own
    /// parameters win on a name conflict). When off (default), parent
    /// parameters are dropped before this mux dispatches.
    pub merge_params: bool,
}

// ── Mux ──────────────────────────────────────────────────────────────────────

/// The dispatch object.
///
/// Holds the route trees, the middleware chain, param guards, mounted
/// sub-muxes, and the error stage. Built once at startup, then shared
/// read-only across every in-flight request; pass it to
/// [`Server::serve`](crate::Server::serve), or drive it directly with
/// [`dispatch`](Mux::dispatch).
pub struct Mux {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    any: MatchitRouter<BoxedHandler>,
    middleware: Vec<BoxedMiddleware>,
    guards: Vec<(String, BoxedParamGuard)>,
    mounts: Vec<Mux>,
    mount_tree: MatchitRouter<usize>,
    stage: Stage,
    config: RouterConfig,
}

impl Mux {
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            routes: HashMap::new(),
            any: MatchitRouter::new(),
            middleware: Vec::new(),
            guards: Vec::new(),
            mounts: Vec::new(),
            mount_tree: MatchitRouter::new(),
            stage: Arc::new(catch::json),
            config,
        }
    }

    /// Native registration: a plain handler for a method + path pair.
    /// Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax — `req.param("name")` retrieves
    /// them. Fallible handlers go through [`Router`](crate::Router), which
    /// adapts them before they land here.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler<marker::Plain>) -> Self {
        self.insert(method, path, handler.erase());
        self
    }

    // ── Registration (called by Router, and by `on` above) ───────────────────

    pub(crate) fn insert(&mut self, method: Method, path: &str, handler: BoxedHandler) {
        let pattern = self.normalize_pattern(path);
        self.routes
            .entry(method)
            .or_default()
            .insert(pattern, handler)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
    }

    pub(crate) fn insert_any(&mut self, path: &str, handler: BoxedHandler) {
        let pattern = self.normalize_pattern(path);
        self.any
            .insert(pattern, handler)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
    }

    pub(crate) fn push_middleware(&mut self, mw: BoxedMiddleware) {
        self.middleware.push(mw);
    }

    pub(crate) fn push_guard(&mut self, name: String, guard: BoxedParamGuard) {
        self.guards.push((name, guard));
    }

    pub(crate) fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
    }

    pub(crate) fn mount(&mut self, prefix: &str, child: Mux) {
        let prefix = self.normalize_pattern(prefix);
        let base = if prefix == "/" { String::new() } else { prefix.clone() };
        let idx = self.mounts.len();
        self.mounts.push(child);
        self.mount_tree
            .insert(&prefix, idx)
            .unwrap_or_else(|e| panic!("invalid mount `{prefix}`: {e}"));
        self.mount_tree
            .insert(format!("{base}/{{*{MOUNT_REST}}}"), idx)
            .unwrap_or_else(|e| panic!("invalid mount `{prefix}`: {e}"));
    }

    // ── Dispatch ─────────────────────────────────────────────────────────────

    /// Routes one request through the full pipeline and produces a response.
    ///
    /// Order: middleware (registration order, even for requests that end in
    /// 404) → route lookup (method tree, then match-all tree, then mounts) →
    /// param guards for the matched parameters → handler. A failure surfaced
    /// at any step goes to the error stage, exactly once; no route means 404.
    pub async fn dispatch(&self, req: Request) -> Response {
        self.dispatch_nested(req, HashMap::new()).await
    }

    // Boxed because mounts recurse: a child mux dispatches inside its parent's
    // dispatch call.
    fn dispatch_nested<'a>(
        &'a self,
        req: Request,
        parent_params: HashMap<String, String>,
    ) -> Pin<Box<dyn Future<Output = Response> + Send + 'a>> {
        Box::pin(async move {
            let mut req = req;
            for mw in &self.middleware {
                req = match mw.call(req).await {
                    Ok(r) => r,
                    Err(e) => return (self.stage)(e),
                };
            }

            let path = self.normalize_path(req.path());

            if let Some((handler, mut params)) = self.lookup(req.method(), &path) {
                if self.config.merge_params {
                    for (k, v) in parent_params {
                        params.entry(k).or_insert(v);
                    }
                }
                req.set_params(params.clone());

                for (name, guard) in &self.guards {
                    let Some(value) = params.get(name).cloned() else { continue };
                    req = match guard.call(req, value).await {
                        Ok(r) => r,
                        Err(e) => return (self.stage)(e),
                    };
                }

                return match handler.call(req).await {
                    Ok(resp) => resp,
                    Err(e) => (self.stage)(e),
                };
            }

            if let Ok(matched) = self.mount_tree.at(&path) {
                let idx = *matched.value;
                let mut prefix_params = HashMap::new();
                let mut rest = String::from("/");
                for (k, v) in matched.params.iter() {
                    if k == MOUNT_REST {
                        rest = format!("/{v}");
                    } else {
                        prefix_params.insert(k.to_owned(), v.to_owned());
                    }
                }
                if self.config.merge_params {
                    for (k, v) in parent_params {
                        prefix_params.entry(k).or_insert(v);
                    }
                }
                req.set_path(rest);
                return self.mounts[idx].dispatch_nested(req, prefix_params).await;
            }

            Response::status(StatusCode::NOT_FOUND)
        })
    }

    fn lookup(&self, method: &Method, path: &str) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let matched = self
            .routes
            .get(method)
            .and_then(|tree| tree.at(path).ok())
            .or_else(|| self.any.at(path).ok())?;
        let handler = Arc::clone(matched.value);
        let params = matched
            .params
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }

    // ── Path normalisation ───────────────────────────────────────────────────

    fn normalize_pattern(&self, pattern: &str) -> String {
        let pattern = if self.config.case_sensitive {
            pattern.to_owned()
        } else {
            lowercase_literals(pattern)
        };
        if self.config.strict { pattern } else { trim_trailing_slash(&pattern).to_owned() }
    }

    fn normalize_path(&self, path: &str) -> String {
        let path = if self.config.case_sensitive {
            path.to_owned()
        } else {
            path.to_ascii_lowercase()
        };
        if self.config.strict { path } else { trim_trailing_slash(&path).to_owned() }
    }
}

impl Default for Mux {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercases literal characters of a route pattern, leaving parameter names
/// (anything between braces) intact so `req.param("userId")` keeps working.
fn lowercase_literals(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut depth = 0usize;
    for c in pattern.chars() {
        match c {
            '{' => {
                depth += 1;
                out.push(c);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                out.push(c);
            }
            c if depth == 0 => out.push(c.to_ascii_lowercase()),
            c => out.push(c),
        }
    }
    out
}

fn trim_trailing_slash(p: &str) -> &str {
    let trimmed = p.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}
