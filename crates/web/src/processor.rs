//! Stream-facing entry point.
//!
//! [`RequestProcessor`] drives one request from raw bytes to a complete
//! response: read header lines, parse them, read the body, route, handle,
//! serialize. It is fail-closed. Whatever goes wrong along the way, the caller
//! gets the default page of the matching status and never an error.

use std::any::Any;
use std::io::BufRead;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use http::Method;
use jwp_http::codec::{ReaderConfig, RequestReader};
use jwp_http::protocol::Response;
use tracing::{debug, error, info};

use crate::error::ProcessError;
use crate::resource::{ResourceError, StaticResources};
use crate::router::{RouteError, Router};

#[derive(Debug, Clone)]
pub struct RequestProcessor {
    router: Arc<Router>,
    resources: Arc<StaticResources>,
    config: ReaderConfig,
}

impl RequestProcessor {
    pub fn new(router: Arc<Router>, resources: Arc<StaticResources>) -> Self {
        Self { router, resources, config: ReaderConfig::default() }
    }

    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn resources(&self) -> &StaticResources {
        &self.resources
    }

    /// Consumes one request from `reader` and produces its response.
    ///
    /// A GET without a matching route is served from the static resources.
    /// Failures are logged and replaced by the default page for
    /// [`ProcessError::status`]. A panicking handler counts as a handler failure.
    pub fn respond<R: BufRead>(&self, reader: R) -> Response {
        match self.try_respond(reader) {
            Ok(response) => response,
            Err(e) => {
                log_failure(&e);
                self.resources.default_page_for(e.status())
            }
        }
    }

    /// Same as [`respond`](Self::respond), rendered to wire text.
    pub fn process<R: BufRead>(&self, reader: R) -> String {
        self.respond(reader).to_wire()
    }

    fn try_respond<R: BufRead>(&self, reader: R) -> Result<Response, ProcessError> {
        let request = RequestReader::with_config(reader, self.config).read_request()?;
        debug!(method = %request.method(), path = request.path(), body_size = request.body().len(), "request received");

        match self.router.dispatch(&request) {
            Ok(route) => {
                let (handler, params) = route.into_parts();
                let request = request.with_path_params(params);
                panic::catch_unwind(AssertUnwindSafe(|| handler.handle(request)))
                    .map_err(|payload| ProcessError::handler(format!("handler panicked: {}", panic_message(payload.as_ref()))))?
                    .map_err(ProcessError::handler)
            }
            Err(RouteError::NoMatchingRoute { .. }) if *request.method() == Method::GET => {
                Ok(self.resources.resolve_static(request.path())?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic payload"
    }
}

fn log_failure(e: &ProcessError) {
    let status = e.status().as_u16();
    match e {
        ProcessError::Read { source } if source.is_stream_failure() => {
            error!(status, cause = %source, "failed to read request from stream");
        }
        ProcessError::Read { source } => info!(status, cause = %source, "invalid request"),
        ProcessError::Route { source } => debug!(status, cause = %source, "no route"),
        ProcessError::Resource { source: source @ ResourceError::NotFound { .. } } => {
            debug!(status, cause = %source, "no static resource");
        }
        ProcessError::Resource { source } => error!(status, cause = %source, "failed to load static resource"),
        ProcessError::Handler { source } => error!(status, cause = %source, "handler failed"),
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::fs;
    use std::io::{self, BufReader, Cursor, Read};
    use std::path::Path;

    use http::header::{CONTENT_LENGTH, LOCATION};
    use http::{HeaderValue, StatusCode};
    use indoc::indoc;
    use jwp_http::codec::TruncatedBodyPolicy;
    use jwp_http::protocol::Request;

    use super::*;
    use crate::handler::{BoxError, Handler, MockHandler, handler_fn};
    use crate::router::{get, post};

    const STATIC_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

    fn page(path: &str) -> String {
        fs::read_to_string(Path::new(STATIC_ROOT).join(path)).unwrap()
    }

    fn login(resources: Arc<StaticResources>) -> impl Handler {
        handler_fn(move |request: Request| -> Result<Response, BoxError> {
            let form = request.form_params()?;
            if form.get("account") == Some("gugu") && form.get("password") == Some("password") {
                let response = resources.resolve_static("/index.html")?;
                Ok(response.with_status(StatusCode::FOUND).with_header(LOCATION, HeaderValue::from_static("/index.html")))
            } else {
                Ok(resources.default_page_for(StatusCode::UNAUTHORIZED))
            }
        })
    }

    fn echo_body(request: Request) -> Result<Response, Infallible> {
        let body = match request.body().as_str() {
            Some(body) => format!("body: {body}"),
            None => "no body".to_string(),
        };
        Ok(Response::ok().with_body(HeaderValue::from_static("text/plain"), body))
    }

    fn processor() -> RequestProcessor {
        let resources = Arc::new(StaticResources::with_default_pages(STATIC_ROOT));
        let router = Router::builder()
            .route("/login", post(login(Arc::clone(&resources))))
            .route("/echo", post(handler_fn(echo_body)))
            .route(
                "/users/{id}",
                get(handler_fn(|request: Request| {
                    let id = request.path_param("id").unwrap_or_default().to_string();
                    Ok::<_, Infallible>(Response::ok().with_body(HeaderValue::from_static("text/plain"), id))
                })),
            )
            .route("/broken", get(handler_fn(|_request: Request| Err::<Response, _>(io::Error::other("repository is down")))))
            .route(
                "/panic",
                get(handler_fn(|request: Request| {
                    let id = request.query_param("id").unwrap();
                    Ok::<_, Infallible>(Response::ok().with_body(HeaderValue::from_static("text/plain"), id.to_string()))
                })),
            )
            .build()
            .unwrap();

        RequestProcessor::new(Arc::new(router), resources)
    }

    fn respond(processor: &RequestProcessor, raw: &str) -> Response {
        processor.respond(Cursor::new(raw.as_bytes()))
    }

    #[test]
    fn static_fallback_for_get() {
        let response = respond(&processor(), "GET /index.html HTTP/1.1\r\nHost: localhost:8080\r\n\r\n");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), page("index.html"));
    }

    #[test]
    fn login_success() {
        let raw = indoc! {"
            POST /login HTTP/1.1
            Host: localhost:8080
            Content-Type: application/x-www-form-urlencoded
            Content-Length: 30

            account=gugu&password=password"};

        let response = respond(&processor(), raw);

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.body(), page("index.html"));
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/index.html");
    }

    #[test]
    fn login_failure() {
        let raw = indoc! {"
            POST /login HTTP/1.1
            Host: localhost:8080
            Content-Length: 27

            account=gugu&password=wrong"};

        let response = respond(&processor(), raw);

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.body(), page("401.html"));
    }

    #[test]
    fn two_token_request_line() {
        let response = respond(&processor(), "GET /\r\n\r\n");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body(), page("500.html"));
    }

    #[test]
    fn unknown_method() {
        let response = respond(&processor(), "BREW /pot HTTP/1.1\r\n\r\n");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn empty_stream() {
        let response = respond(&processor(), "");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body(), page("500.html"));
    }

    #[test]
    fn unknown_path() {
        let processor = processor();

        let response = respond(&processor, "GET /nothing.html HTTP/1.1\r\n\r\n");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body(), page("404.html"));

        // no static fallback for other methods
        let response = respond(&processor, "DELETE /index.html HTTP/1.1\r\n\r\n");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.body(), page("404.html"));
    }

    #[test]
    fn path_params_reach_handler() {
        let response = respond(&processor(), "GET /users/42?verbose=true HTTP/1.1\r\n\r\n");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), "42");
    }

    #[test]
    fn body_spans_lines() {
        let raw = "POST /echo HTTP/1.1\r\nContent-Length: 12\r\n\r\nfirst\nsecond";

        let response = respond(&processor(), raw);
        assert_eq!(response.body(), "body: first\nsecond");
    }

    #[test]
    fn zero_content_length() {
        let response = respond(&processor(), "POST /echo HTTP/1.1\r\nContent-Length: 0\r\n\r\n");
        assert_eq!(response.body(), "no body");
    }

    #[test]
    fn truncated_body_rejected() {
        let raw = "POST /echo HTTP/1.1\r\nContent-Length: 30\r\n\r\naccount=gugu";

        let response = respond(&processor(), raw);

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body(), page("500.html"));
    }

    #[test]
    fn truncated_body_discarded() {
        let raw = "POST /echo HTTP/1.1\r\nContent-Length: 30\r\n\r\naccount=gugu";
        let processor = processor().with_config(ReaderConfig::default().with_truncated_body(TruncatedBodyPolicy::Discard));

        let response = respond(&processor, raw);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), "no body");
    }

    #[test]
    fn too_large_body() {
        let raw = "POST /echo HTTP/1.1\r\nContent-Length: 64\r\n\r\n";
        let processor = processor().with_config(ReaderConfig::default().with_max_body_bytes(16));

        assert_eq!(respond(&processor, raw).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn handler_failure() {
        let response = respond(&processor(), "GET /broken HTTP/1.1\r\n\r\n");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body(), page("500.html"));
    }

    #[test]
    fn handler_panic() {
        let processor = processor();

        let response = respond(&processor, "GET /panic HTTP/1.1\r\n\r\n");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body(), page("500.html"));

        // the processor stays usable afterwards
        let response = respond(&processor, "GET /panic?id=7 HTTP/1.1\r\n\r\n");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), "7");
    }

    #[test]
    fn stream_failure() {
        struct FailingRead;

        impl Read for FailingRead {
            fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::from(io::ErrorKind::ConnectionReset))
            }
        }

        let response = processor().respond(BufReader::new(FailingRead));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body(), page("500.html"));
    }

    #[test]
    fn handler_sees_parsed_request() {
        let mut handler = MockHandler::new();
        handler
            .expect_handle()
            .withf(|request| {
                request.path() == "/search"
                    && request.query_param("q") == Some("rust")
                    && request.header_value("user-agent") == Some("curl/7.79.1")
                    && request.body().is_empty()
            })
            .times(1)
            .returning(|_| Ok(Response::new(StatusCode::NO_CONTENT)));

        let router = Router::builder().route("/search", get(handler)).build().unwrap();
        let processor = RequestProcessor::new(Arc::new(router), Arc::new(StaticResources::with_default_pages(STATIC_ROOT)));

        let response = respond(&processor, "GET /search?q=rust HTTP/1.1\r\nUser-Agent: curl/7.79.1\r\n\r\n");
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn wire_output() {
        let wire = processor().process(Cursor::new(b"GET /index.html HTTP/1.1\r\n\r\n"));

        let index = page("index.html");
        assert!(wire.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(wire.contains(&format!("{CONTENT_LENGTH}: {}\r\n", index.len())));
        assert!(wire.ends_with(&format!("\r\n\r\n{index}")));
    }

    #[test]
    fn wire_output_of_failure() {
        let wire = processor().process(Cursor::new(b"GET /\r\n\r\n"));

        assert!(wire.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
        assert!(wire.ends_with(&page("500.html")));
    }
}
