//! Request routing.
//!
//! A [`Router`] is an ordered list of bindings, each binding being a method, a
//! [`PathMatcher`] and a [`Handler`]. Dispatch scans the bindings in
//! registration order and returns the first one whose method equals the request
//! method and whose matcher accepts the request path. There is no best-match
//! ranking: when two bindings accept the same request, the earlier one wins.
//!
//! Routers are assembled with [`RouterBuilder`] and are immutable once built,
//! so a single `Arc<Router>` can be read by every connection thread without
//! locking.
//!
//! # Example
//!
//! ```
//! use std::convert::Infallible;
//! use http::Method;
//! use jwp_http::protocol::{Request, Response};
//! use jwp_web::handler_fn;
//! use jwp_web::router::{get, Router};
//!
//! let router = Router::builder()
//!     .route("/", get(handler_fn(|_req: Request| Ok::<_, Infallible>(Response::ok()))))
//!     .register(Method::GET, "/users/{id}", handler_fn(|_req: Request| Ok::<_, Infallible>(Response::ok())))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(router.len(), 2);
//! ```

mod matcher;

pub use matcher::PathMatcher;

use std::fmt;

use http::Method;
use jwp_http::protocol::{Params, Request};
use thiserror::Error;
use tracing::trace;

use crate::handler::Handler;

#[derive(Error, Debug)]
pub enum RouteError {
    #[error("no route matches {method} {path}")]
    NoMatchingRoute { method: Method, path: String },

    #[error("invalid route pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl RouteError {
    pub fn no_matching_route(method: &Method, path: &str) -> Self {
        Self::NoMatchingRoute { method: method.clone(), path: path.to_string() }
    }

    pub fn invalid_pattern<S: ToString>(pattern: &str, reason: S) -> Self {
        Self::InvalidPattern { pattern: pattern.to_string(), reason: reason.to_string() }
    }
}

/// One registered `(method, path matcher, handler)` triple.
pub struct Binding {
    method: Method,
    matcher: PathMatcher,
    handler: Box<dyn Handler>,
}

impl Binding {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn matcher(&self) -> &PathMatcher {
        &self.matcher
    }

    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding").field("method", &self.method).field("matcher", &self.matcher).finish_non_exhaustive()
    }
}

/// Result of a successful dispatch: the selected handler and the captured path parameters.
pub struct RouteMatch<'router> {
    handler: &'router dyn Handler,
    params: Params,
}

impl<'router> RouteMatch<'router> {
    pub fn handler(&self) -> &'router dyn Handler {
        self.handler
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn into_parts(self) -> (&'router dyn Handler, Params) {
        (self.handler, self.params)
    }
}

impl fmt::Debug for RouteMatch<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch").field("params", &self.params).finish_non_exhaustive()
    }
}

/// Main router structure that selects the handler of a request
#[derive(Debug)]
pub struct Router {
    bindings: Vec<Binding>,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Selects the handler for `request`, see [`Router::at`].
    pub fn dispatch(&self, request: &Request) -> Result<RouteMatch<'_>, RouteError> {
        self.at(request.method(), request.path())
    }

    /// Returns the first binding accepting `method` and `path`, in registration order.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::NoMatchingRoute`] if no binding accepts the pair.
    pub fn at(&self, method: &Method, path: &str) -> Result<RouteMatch<'_>, RouteError> {
        self.bindings
            .iter()
            .enumerate()
            .filter(|(_, binding)| binding.method == *method)
            .find_map(|(index, binding)| {
                binding.matcher.matches(path).map(|params| {
                    trace!(index, route = binding.matcher.as_str(), "route matched");
                    RouteMatch { handler: binding.handler.as_ref(), params }
                })
            })
            .ok_or_else(|| RouteError::no_matching_route(method, path))
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Collects bindings in order, then compiles them into a [`Router`].
pub struct RouterBuilder {
    routes: Vec<(Method, String, Box<dyn Handler>)>,
}

impl RouterBuilder {
    fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Appends a binding.
    pub fn register<H: Handler + 'static>(mut self, method: Method, path: impl Into<String>, handler: H) -> Self {
        self.routes.push((method, path.into(), Box::new(handler)));
        self
    }

    /// Appends a binding built by one of the method helpers, e.g. `route("/login", post(handler))`.
    pub fn route(mut self, path: impl Into<String>, method_handler: MethodHandler) -> Self {
        let MethodHandler { method, handler } = method_handler;
        self.routes.push((method, path.into(), handler));
        self
    }

    /// Builds the router from the accumulated routes, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] for the first route whose path can't be compiled.
    pub fn build(self) -> Result<Router, RouteError> {
        let bindings = self
            .routes
            .into_iter()
            .map(|(method, path, handler)| PathMatcher::parse(&path).map(|matcher| Binding { method, matcher, handler }))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Router { bindings })
    }
}

impl fmt::Debug for RouterBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterBuilder").field("routes", &self.routes.len()).finish()
    }
}

/// A handler paired with the method it serves, produced by [`get`], [`post`], ...
pub struct MethodHandler {
    method: Method,
    handler: Box<dyn Handler>,
}

impl fmt::Debug for MethodHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodHandler").field("method", &self.method).finish_non_exhaustive()
    }
}

macro_rules! method_handler {
    ($method:ident, $upper_case_method:ident) => {
        #[doc = concat!("Binds a handler to HTTP ", stringify!($upper_case_method), " requests.")]
        pub fn $method<H: Handler + 'static>(handler: H) -> MethodHandler {
            MethodHandler { method: Method::$upper_case_method, handler: Box::new(handler) }
        }
    };
}

method_handler!(get, GET);
method_handler!(post, POST);
method_handler!(put, PUT);
method_handler!(delete, DELETE);
method_handler!(head, HEAD);
method_handler!(options, OPTIONS);
method_handler!(connect, CONNECT);
method_handler!(patch, PATCH);
method_handler!(trace, TRACE);
