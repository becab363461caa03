//! HTTP request header parsing.
//!
//! A request header is built from the lines that precede the blank line of a
//! request: the request-line first, then one header field per line.
//!
//! Parsing of the request-line is strict, a line that does not carry exactly a
//! method, a target and a version is rejected. Parsing of the header fields is
//! tolerant, a field line that can't be understood is skipped and the rest of
//! the block is still used.

use http::header::CONTENT_LENGTH;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use tracing::debug;

use crate::ensure;
use crate::protocol::{ParseError, Params};

/// The request-line and header block of an HTTP request.
#[derive(Debug, Clone)]
pub struct RequestHeader {
    method: Method,
    path: String,
    query: Params,
    version: String,
    headers: HeaderMap,
    content_length: usize,
}

impl RequestHeader {
    /// Parses the header lines of a request, terminators already stripped.
    ///
    /// # Errors
    ///
    /// - [`ParseError::MalformedRequestLine`] if `lines` is empty or the first line
    ///   does not split into exactly method, target and version
    /// - [`ParseError::InvalidMethod`] if the method is not a standard HTTP method
    /// - [`ParseError::InvalidQuery`] if the query string can't be decoded
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<Self, ParseError> {
        let Some((request_line, field_lines)) = lines.split_first() else {
            return Err(ParseError::malformed_request_line(""));
        };
        let request_line = request_line.as_ref();

        let mut tokens = request_line.split_whitespace();
        let (Some(method), Some(target), Some(version), None) = (tokens.next(), tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(ParseError::malformed_request_line(request_line));
        };

        let method = parse_method(method)?;

        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Params::parse_urlencoded(query)?),
            None => (target, Params::empty()),
        };
        ensure!(!path.is_empty(), ParseError::malformed_request_line(request_line));

        let headers = parse_fields(field_lines);
        let content_length = parse_content_length(&headers);

        Ok(Self { method, path: path.to_string(), query, version: version.to_string(), headers, content_length })
    }

    /// Returns a reference to the request's HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path, without the query string.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the query parameters parsed off the request target.
    pub fn query(&self) -> &Params {
        &self.query
    }

    /// Returns the protocol version token as sent, e.g. `HTTP/1.1`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns a reference to the request's headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the declared body length, 0 when absent or unparsable.
    pub fn content_length(&self) -> usize {
        self.content_length
    }
}

fn parse_method(token: &str) -> Result<Method, ParseError> {
    let method = match token {
        "GET" => Method::GET,
        "HEAD" => Method::HEAD,
        "POST" => Method::POST,
        "PUT" => Method::PUT,
        "DELETE" => Method::DELETE,
        "CONNECT" => Method::CONNECT,
        "OPTIONS" => Method::OPTIONS,
        "TRACE" => Method::TRACE,
        "PATCH" => Method::PATCH,
        other => return Err(ParseError::invalid_method(other)),
    };
    Ok(method)
}

fn parse_fields<S: AsRef<str>>(lines: &[S]) -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(lines.len());

    for line in lines {
        let line = line.as_ref();
        let Some((name, value)) = line.split_once(':') else {
            debug!(line, "skip header line without colon");
            continue;
        };

        let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.trim().as_bytes()), HeaderValue::from_str(value.trim()))
        else {
            debug!(line, "skip header line with illegal name or value");
            continue;
        };

        // insert replaces any previous value, the last occurrence wins
        headers.insert(name, value);
    }

    headers
}

fn parse_content_length(headers: &HeaderMap) -> usize {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0)
}
