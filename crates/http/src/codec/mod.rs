//! Reading requests from, and writing responses to, byte streams
//!
//! - Request side:
//!   - [`RequestReader`]: reads the header lines and the length delimited body
//!     from a blocking [`std::io::BufRead`] and composes a
//!     [`Request`](crate::protocol::Request)
//!   - [`ReaderConfig`] / [`TruncatedBodyPolicy`]: size limits and the policy for
//!     bodies shorter than their declared length
//!
//! - Response side:
//!   - [`ResponseEncoder`]: a [`tokio_util::codec::Encoder`] writing complete
//!     responses in wire format
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use jwp_http::codec::RequestReader;
//!
//! let raw = "POST /login HTTP/1.1\r\nContent-Length: 12\r\n\r\naccount=gugu";
//! let request = RequestReader::new(Cursor::new(raw)).read_request().unwrap();
//!
//! assert_eq!(request.path(), "/login");
//! assert_eq!(request.body().as_str(), Some("account=gugu"));
//! ```

mod request_reader;
mod response_encoder;

pub use request_reader::ReaderConfig;
pub use request_reader::RequestReader;
pub use request_reader::TruncatedBodyPolicy;
pub use response_encoder::ResponseEncoder;
