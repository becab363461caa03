use std::error::Error;

use jwp_http::protocol::{Request, Response};

/// Error type a handler may fail with.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// The single capability a route target provides: turn a request into a response.
///
/// Handlers are shared by every connection thread, hence `Send + Sync`.
#[cfg_attr(test, mockall::automock)]
pub trait Handler: Send + Sync {
    fn handle(&self, request: Request) -> Result<Response, BoxError>;
}

/// A [`Handler`] backed by a function or closure.
#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F, Err> Handler for HandlerFn<F>
where
    F: Fn(Request) -> Result<Response, Err> + Send + Sync,
    Err: Into<BoxError>,
{
    fn handle(&self, request: Request) -> Result<Response, BoxError> {
        (self.f)(request).map_err(Into::into)
    }
}

pub fn handler_fn<F, Err>(f: F) -> HandlerFn<F>
where
    F: Fn(Request) -> Result<Response, Err> + Send + Sync,
    Err: Into<BoxError>,
{
    HandlerFn { f }
}

impl<H: Handler + ?Sized> Handler for Box<H> {
    fn handle(&self, request: Request) -> Result<Response, BoxError> {
        (**self).handle(request)
    }
}

impl<H: Handler + ?Sized> Handler for std::sync::Arc<H> {
    fn handle(&self, request: Request) -> Result<Response, BoxError> {
        (**self).handle(request)
    }
}
