/// The raw payload of a request.
///
/// A body is present only when the request declared a positive
/// `Content-Length` and exactly that many bytes were read from the stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestBody {
    raw: Option<String>,
}

impl RequestBody {
    #[inline]
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: Some(raw.into()) }
    }

    /// A request without payload.
    #[inline]
    pub fn empty() -> Self {
        Self { raw: None }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.raw.is_none()
    }

    /// Body length in bytes, 0 when absent.
    #[inline]
    pub fn len(&self) -> usize {
        self.raw.as_ref().map_or(0, String::len)
    }

    pub fn into_inner(self) -> Option<String> {
        self.raw
    }
}

impl From<Option<String>> for RequestBody {
    fn from(raw: Option<String>) -> Self {
        Self { raw }
    }
}
