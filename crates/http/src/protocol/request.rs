//! The request handed to handlers.
//!
//! A [`Request`] is the read-only composition of a parsed [`RequestHeader`], the
//! [`RequestBody`] read after it, and the path parameters a route captured.

use http::{HeaderMap, Method};
use serde::de::DeserializeOwned;

use crate::protocol::{ParseError, Params, RequestBody, RequestHeader};

#[derive(Debug, Clone)]
pub struct Request {
    header: RequestHeader,
    body: RequestBody,
    path_params: Params,
}

impl Request {
    pub fn new(header: RequestHeader, body: RequestBody) -> Self {
        Self { header, body, path_params: Params::empty() }
    }

    /// Attaches the parameters captured while matching the request path.
    ///
    /// This consumes the request, it is meant to be called once between routing
    /// and handling.
    pub fn with_path_params(self, path_params: Params) -> Self {
        Self { path_params, ..self }
    }

    pub fn header(&self) -> &RequestHeader {
        &self.header
    }

    pub fn method(&self) -> &Method {
        self.header.method()
    }

    pub fn path(&self) -> &str {
        self.header.path()
    }

    pub fn version(&self) -> &str {
        self.header.version()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.header.headers()
    }

    /// Returns a header value when it is present and visible ASCII.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers().get(name).and_then(|value| value.to_str().ok())
    }

    pub fn query(&self) -> &Params {
        self.header.query()
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.header.query().get(name)
    }

    pub fn path_params(&self) -> &Params {
        &self.path_params
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name)
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Parses the body as url-encoded form parameters, empty when there is no body.
    pub fn form_params(&self) -> Result<Params, ParseError> {
        match self.body.as_str() {
            Some(raw) => Params::parse_urlencoded(raw).map_err(|e| ParseError::invalid_body(e.to_string())),
            None => Ok(Params::empty()),
        }
    }

    /// Deserializes the url-encoded body into `T`.
    pub fn form<T: DeserializeOwned>(&self) -> Result<T, ParseError> {
        serde_urlencoded::from_str::<T>(self.body.as_str().unwrap_or_default()).map_err(ParseError::invalid_body)
    }
}
