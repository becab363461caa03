//! HTTP response model and its wire rendering.
//!
//! A [`Response`] is built once by a handler (or by the static page table),
//! serialized once and then dropped.
//!
//! The wire format is always
//!
//! ```text
//! HTTP/1.1 <code> <reason phrase>\r\n
//! (<header-name>: <value>\r\n)*
//! \r\n
//! <body>
//! ```
//!
//! with `content-length` set to the exact byte length of the body.

use bytes::BufMut;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};

/// Reason phrase used for status codes without a canonical one.
const UNKNOWN_REASON: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl Response {
    /// A response with the given status, no headers and an empty body.
    pub fn new(status: StatusCode) -> Self {
        Self { status, headers: HeaderMap::new(), body: String::new() }
    }

    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    /// Replaces the status, keeping headers and body.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Sets a header, replacing any previous value of the same name.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the body and its `content-type`.
    pub fn with_body(mut self, content_type: HeaderValue, body: impl Into<String>) -> Self {
        self.headers.insert(CONTENT_TYPE, content_type);
        self.body = body.into();
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Writes the response in wire format into `dst`.
    ///
    /// Any `content-length` header set by the producer is ignored and replaced by
    /// the actual body length.
    pub fn write_to<B: BufMut>(&self, dst: &mut B) {
        dst.put_slice(b"HTTP/1.1 ");
        dst.put_slice(self.status.as_str().as_bytes());
        dst.put_u8(b' ');
        dst.put_slice(self.status.canonical_reason().unwrap_or(UNKNOWN_REASON).as_bytes());
        dst.put_slice(b"\r\n");

        for (header_name, header_value) in self.headers.iter().filter(|(name, _)| **name != CONTENT_LENGTH) {
            dst.put_slice(header_name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(header_value.as_ref());
            dst.put_slice(b"\r\n");
        }

        dst.put_slice(CONTENT_LENGTH.as_ref());
        dst.put_slice(b": ");
        dst.put_slice(self.body.len().to_string().as_bytes());
        dst.put_slice(b"\r\n");

        dst.put_slice(b"\r\n");
        dst.put_slice(self.body.as_bytes());
    }

    /// Renders the response as wire text.
    pub fn to_wire(&self) -> String {
        let mut buf = Vec::with_capacity(self.wire_len_hint());
        self.write_to(&mut buf);
        // only opaque header values can carry non utf-8 bytes
        String::from_utf8(buf).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
    }

    pub(crate) fn wire_len_hint(&self) -> usize {
        const STATUS_LINE_AND_LENGTH: usize = 64;
        let headers: usize = self.headers.iter().map(|(name, value)| name.as_str().len() + value.len() + 4).sum();
        STATUS_LINE_AND_LENGTH + headers + self.body.len()
    }
}
