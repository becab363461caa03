use std::io;
use thiserror::Error;

/// Failure while turning the raw stream into a [`Request`](crate::protocol::Request).
///
/// `Parse` covers protocol violations in the received text, `Stream` and
/// `TruncatedBody` cover the stream itself misbehaving.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("request parse error: {source}")]
    Parse {
        #[from]
        source: ParseError,
    },

    #[error("stream read failure: {source}")]
    Stream {
        #[from]
        source: io::Error,
    },

    #[error("truncated body, content-length is {expected} but stream ended after {actual} bytes")]
    TruncatedBody { expected: usize, actual: usize },
}

impl ReadError {
    pub fn truncated_body(expected: usize, actual: usize) -> Self {
        Self::TruncatedBody { expected, actual }
    }

    /// Returns true if the failure came from the stream rather than from its content.
    #[inline]
    pub fn is_stream_failure(&self) -> bool {
        matches!(self, ReadError::Stream { .. } | ReadError::TruncatedBody { .. })
    }
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed request line: {line:?}")]
    MalformedRequestLine { line: String },

    #[error("invalid http method: {method:?}")]
    InvalidMethod { method: String },

    #[error("invalid query string: {reason}")]
    InvalidQuery { reason: String },

    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("body size {size} exceed the limit {max_size}")]
    TooLargeBody { size: usize, max_size: usize },

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },
}

impl ParseError {
    pub fn malformed_request_line<S: ToString>(line: S) -> Self {
        Self::MalformedRequestLine { line: line.to_string() }
    }

    pub fn invalid_method<S: ToString>(method: S) -> Self {
        Self::InvalidMethod { method: method.to_string() }
    }

    pub fn invalid_query<S: ToString>(str: S) -> Self {
        Self::InvalidQuery { reason: str.to_string() }
    }

    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn too_large_body(size: usize, max_size: usize) -> Self {
        Self::TooLargeBody { size, max_size }
    }

    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }
}
