//! Response encoder for framed writers
//!
//! Plugs [`Response::write_to`] into a [`tokio_util::codec::FramedWrite`] so a
//! finished response can be sent over an async stream.

use std::io;

use bytes::BytesMut;
use tokio_util::codec::Encoder;
use tracing::trace;

use crate::protocol::Response;

/// Encoder writing whole [`Response`]s in HTTP/1.1 wire format.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseEncoder;

impl ResponseEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder<Response> for ResponseEncoder {
    type Error = io::Error;

    fn encode(&mut self, item: Response, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(item.wire_len_hint());
        item.write_to(dst);
        trace!(status = item.status().as_u16(), encoded_size = dst.len(), "encoded response");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use http::{HeaderValue, StatusCode};

    use super::*;

    #[test]
    fn encode_matches_wire_text() {
        let response =
            Response::new(StatusCode::UNAUTHORIZED).with_body(HeaderValue::from_static("text/html;charset=utf-8"), "<h1>401</h1>");
        let expected = response.to_wire();

        let mut buf = BytesMut::new();
        ResponseEncoder.encode(response, &mut buf).unwrap();

        assert_eq!(&buf[..], expected.as_bytes());
    }

    #[test]
    fn encode_appends() {
        let mut buf = BytesMut::from(&b"previous"[..]);
        ResponseEncoder.encode(Response::ok(), &mut buf).unwrap();

        assert_eq!(&buf[..], &b"previousHTTP/1.1 200 OK\r\ncontent-length: 0\r\n\r\n"[..]);
    }
}
