//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http::{Extensions, HeaderMap, HeaderName, HeaderValue, Method};

/// An incoming HTTP request.
///
/// Handlers receive it by value — each in-flight request owns its own
/// `Request`, so there is no shared state between concurrent invocations.
/// Middleware passes ownership down the pipeline and may mutate the request
/// on the way (see [`extensions_mut`](Request::extensions_mut) for
/// request-scoped state).
///
/// A `Request` can also be built directly, which is how you exercise a
/// [`Mux`](crate::Mux) in tests without opening a socket:
///
/// ```rust
/// use phoebe::{Method, Request};
///
/// let req = Request::new(Method::POST, "/users")
///     .with_header("content-type", "application/json")
///     .with_body(r#"{"name":"alice"}"#);
/// assert_eq!(req.path(), "/users");
/// ```
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Bytes,
    params: HashMap<String, String>,
    extensions: Extensions,
}

impl Request {
    /// Builds a request from a method and a path (without query string).
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
            params: HashMap::new(),
            extensions: Extensions::new(),
        }
    }

    /// Adds a header.
    ///
    /// # Panics
    ///
    /// Panics if `name` or `value` is not a valid HTTP header. Intended for
    /// literal strings in tests and tools; requests arriving over the wire
    /// carry pre-validated headers.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        let name: HeaderName = name.parse().expect("invalid header name");
        let value: HeaderValue = value.parse().expect("invalid header value");
        self.headers.append(name, value);
        self
    }

    /// Sets the body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds a `Request` from hyper's decomposed parts. The query string is
    /// not carried — phoebe routes on the path alone.
    pub(crate) fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        Self {
            method: parts.method,
            path: parts.uri.path().to_owned(),
            headers: parts.headers,
            body,
            params: HashMap::new(),
            extensions: parts.extensions,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Case-insensitive header lookup. Returns `None` for headers whose value
    /// is not visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns
    /// `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Request-scoped state, typed by the value's type.
    ///
    /// This is how middleware communicates with downstream handlers: insert a
    /// value in the middleware, read it back in the handler.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Mutable access to request-scoped state.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    pub(crate) fn set_path(&mut self, path: String) {
        self.path = path;
    }
}
