//! A line oriented HTTP/1.1 request reader and response renderer
//!
//! This crate provides the protocol half of a small, blocking HTTP/1.1 server:
//! it turns the text of one request into a structured [`protocol::Request`] and
//! renders a [`protocol::Response`] back into wire format.
//!
//! # Features
//!
//! - Request-line, header block and `Content-Length` delimited body parsing
//! - Tolerant header field parsing, strict request-line parsing
//! - Query and url-encoded form parameters
//! - Header and body size limits
//! - A `tokio_util` encoder for writing responses to async streams
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use http::{HeaderValue, StatusCode};
//! use jwp_http::codec::RequestReader;
//! use jwp_http::protocol::Response;
//!
//! let raw = "GET /hello?name=gugu HTTP/1.1\r\nHost: localhost\r\n\r\n";
//! let request = RequestReader::new(Cursor::new(raw)).read_request().unwrap();
//!
//! let greeting = format!("hello {}", request.query_param("name").unwrap_or("world"));
//! let response = Response::new(StatusCode::OK)
//!     .with_body(HeaderValue::from_static("text/plain;charset=utf-8"), greeting);
//!
//! assert!(response.to_wire().starts_with("HTTP/1.1 200 OK\r\n"));
//! assert!(response.to_wire().ends_with("\r\n\r\nhello gugu"));
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: request and response data model, errors
//! - [`codec`]: the stream reader and the response encoder
//!
//! # Limitations
//!
//! - HTTP/1.1 wire format only, no HTTP/2
//! - No chunked transfer encoding, bodies must declare `Content-Length`
//! - One request per stream, no keep-alive
//! - No TLS support (use a reverse proxy for HTTPS)
//! - Maximum header size: 8KB, maximum number of headers: 64 (configurable)

pub mod codec;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
