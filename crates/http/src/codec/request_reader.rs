//! Blocking request reader
//!
//! The reader works in two phases, and the split is the core protocol rule:
//! 1. Header phase: lines are read one by one until a blank line or end of stream.
//!    A line may be terminated by `\r\n` or `\n`.
//! 2. Body phase: exactly `Content-Length` bytes are read, never line buffered,
//!    so the body may freely contain line terminators.
//!
//! Both phases are bounded by [`ReaderConfig`].

use std::io::{BufRead, Read};

use tracing::{trace, warn};

use crate::ensure;
use crate::protocol::{ParseError, ReadError, Request, RequestBody, RequestHeader};

/// Maximum number of header fields allowed in a request
const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes allowed for the request-line plus header section
const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Maximum declared body size
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// What to do when the stream ends before `Content-Length` bytes were read.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum TruncatedBodyPolicy {
    /// Fail the read with [`ReadError::TruncatedBody`].
    #[default]
    Reject,
    /// Drop the partial payload and continue with an absent body.
    Discard,
}

/// Limits and policies applied while reading a request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    max_header_bytes: usize,
    max_headers: usize,
    max_body_bytes: usize,
    truncated_body: TruncatedBodyPolicy,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            max_header_bytes: MAX_HEADER_BYTES,
            max_headers: MAX_HEADER_NUM,
            max_body_bytes: MAX_BODY_BYTES,
            truncated_body: TruncatedBodyPolicy::default(),
        }
    }
}

impl ReaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit for the request-line and header fields, terminators included.
    ///
    /// The blank line ending the header block is not counted.
    pub fn with_max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        self.max_header_bytes = max_header_bytes;
        self
    }

    pub fn with_max_headers(mut self, max_headers: usize) -> Self {
        self.max_headers = max_headers;
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn with_truncated_body(mut self, policy: TruncatedBodyPolicy) -> Self {
        self.truncated_body = policy;
        self
    }

    pub fn max_header_bytes(&self) -> usize {
        self.max_header_bytes
    }

    pub fn max_headers(&self) -> usize {
        self.max_headers
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    pub fn truncated_body(&self) -> TruncatedBodyPolicy {
        self.truncated_body
    }
}

/// Reads one request from a blocking, buffered stream.
#[derive(Debug)]
pub struct RequestReader<R> {
    reader: R,
    config: ReaderConfig,
}

impl<R: BufRead> RequestReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_config(reader, ReaderConfig::default())
    }

    pub fn with_config(reader: R, config: ReaderConfig) -> Self {
        Self { reader, config }
    }

    /// Reads header and body, then composes the request.
    pub fn read_request(&mut self) -> Result<Request, ReadError> {
        let lines = self.read_header_lines()?;
        let header = RequestHeader::parse(&lines)?;
        let body = self.read_body(header.content_length())?;
        Ok(Request::new(header, body))
    }

    /// Reads lines up to the first blank line, or up to the end of the stream.
    ///
    /// The blank line is consumed but not returned, terminators are stripped.
    pub fn read_header_lines(&mut self) -> Result<Vec<String>, ReadError> {
        let max_bytes = self.config.max_header_bytes;
        // the request-line is not a header field
        let max_lines = self.config.max_headers + 1;

        let mut lines = Vec::new();
        let mut consumed = 0_usize;

        loop {
            let mut line = String::new();
            // room for a trailing "\r\n" blank line, and one byte more flags an oversized field
            let budget = (max_bytes - consumed) as u64 + 2;
            let read = (&mut self.reader).take(budget).read_line(&mut line)?;

            if read == 0 {
                trace!(line_count = lines.len(), "end of stream while reading header");
                break;
            }

            strip_line_terminator(&mut line);
            if line.is_empty() {
                break;
            }

            consumed += read;
            ensure!(consumed <= max_bytes, ParseError::too_large_header(consumed, max_bytes).into());
            ensure!(lines.len() < max_lines, ParseError::too_many_headers(self.config.max_headers).into());
            lines.push(line);
        }

        trace!(header_size = consumed, line_count = lines.len(), "read header lines");
        Ok(lines)
    }

    /// Reads a body of exactly `content_length` bytes, nothing when it is 0.
    pub fn read_body(&mut self, content_length: usize) -> Result<RequestBody, ReadError> {
        if content_length == 0 {
            return Ok(RequestBody::empty());
        }

        let max_bytes = self.config.max_body_bytes;
        ensure!(content_length <= max_bytes, ParseError::too_large_body(content_length, max_bytes).into());

        let mut buf = Vec::with_capacity(content_length);
        let read = (&mut self.reader).take(content_length as u64).read_to_end(&mut buf)?;

        if read < content_length {
            match self.config.truncated_body {
                TruncatedBodyPolicy::Reject => return Err(ReadError::truncated_body(content_length, read)),
                TruncatedBodyPolicy::Discard => {
                    warn!(expected = content_length, actual = read, "discard truncated body");
                    return Ok(RequestBody::empty());
                }
            }
        }

        trace!(body_size = read, "read body");
        let raw = String::from_utf8(buf).map_err(ParseError::invalid_body)?;
        Ok(RequestBody::new(raw))
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

fn strip_line_terminator(line: &mut String) {
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
}
