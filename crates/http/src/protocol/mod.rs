//! Core HTTP request and response data model.
//!
//! # Architecture
//!
//! - **Request side**
//!   - [`RequestHeader`]: request-line and header block, parsed from text lines
//!   - [`RequestBody`]: the length delimited payload, absent when none was declared
//!   - [`Request`]: the immutable composition handed to handlers
//!   - [`Params`]: query, form and path parameters
//!
//! - **Response side**
//!   - [`Response`]: status, headers and body, rendered with [`Response::to_wire`]
//!
//! - **Error Handling**
//!   - [`ReadError`]: anything that prevents building a [`Request`] from a stream
//!   - [`ParseError`]: protocol violations found in the received text
//!
//! Status codes and their reason phrases come from [`http::StatusCode`].

mod body;
pub use body::RequestBody;

mod params;
pub use params::Params;

mod request_header;
pub use request_header::RequestHeader;

mod request;
pub use request::Request;

mod response;
pub use response::Response;

mod error;
pub use error::ParseError;
pub use error::ReadError;
