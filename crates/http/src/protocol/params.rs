//! Name/value parameters carried by a request.
//!
//! The same type backs the three parameter sources a handler can see:
//! - query parameters parsed off the request target,
//! - form parameters parsed from an `application/x-www-form-urlencoded` body,
//! - path parameters captured by a parametrized route.
//!
//! The sources are kept apart; a handler asks for the one it wants.

use std::collections::HashMap;

use crate::protocol::ParseError;

/// A string to string map where the last occurrence of a key wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    inner: HashMap<String, String>,
}

impl Params {
    /// Creates an empty parameter set.
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a url-encoded `a=1&b=2` string.
    ///
    /// Keys and values are percent-decoded, `+` decodes to a space, a pair
    /// without `=` yields an empty value and duplicate keys keep the last value.
    pub fn parse_urlencoded(input: &str) -> Result<Self, ParseError> {
        let pairs = serde_urlencoded::from_str::<Vec<(String, String)>>(input).map_err(ParseError::invalid_query)?;
        Ok(pairs.into_iter().collect())
    }

    /// Gets the value of a parameter by its name
    #[inline]
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        self.inner.get(key.as_ref()).map(String::as_str)
    }

    #[inline]
    pub fn contains(&self, key: impl AsRef<str>) -> bool {
        self.inner.contains_key(key.as_ref())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut inner = HashMap::new();
        for (key, value) in iter {
            inner.insert(key.into(), value.into());
        }
        Self { inner }
    }
}
