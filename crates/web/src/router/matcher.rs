//! Path matchers used by router bindings.
//!
//! A matcher is either an exact path (`/login`) or a pattern with parametrized
//! segments (`/users/{id}`, `/assets/{*file}`) in `matchit` syntax. A path is
//! treated as a pattern as soon as it contains a `{`.

use std::fmt;

use jwp_http::protocol::Params;

use crate::router::RouteError;

pub enum PathMatcher {
    Exact(String),
    Pattern { pattern: String, inner: matchit::Router<()> },
}

impl PathMatcher {
    /// Compiles `path` into a matcher.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] when a parametrized path is not a
    /// valid pattern, e.g. an unclosed `{` or an empty parameter name.
    pub fn parse(path: &str) -> Result<Self, RouteError> {
        if !path.contains('{') {
            return Ok(PathMatcher::Exact(path.to_string()));
        }

        let mut inner = matchit::Router::new();
        inner.insert(path, ()).map_err(|e| RouteError::invalid_pattern(path, e))?;
        Ok(PathMatcher::Pattern { pattern: path.to_string(), inner })
    }

    /// Returns the captured parameters when `path` is accepted.
    pub fn matches(&self, path: &str) -> Option<Params> {
        match self {
            PathMatcher::Exact(exact) => (exact == path).then(Params::empty),
            PathMatcher::Pattern { inner, .. } => inner.at(path).ok().map(|matched| matched.params.iter().collect()),
        }
    }

    /// The path or pattern this matcher was built from.
    pub fn as_str(&self) -> &str {
        match self {
            PathMatcher::Exact(exact) => exact,
            PathMatcher::Pattern { pattern, .. } => pattern,
        }
    }
}

impl fmt::Debug for PathMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathMatcher::Exact(exact) => f.debug_tuple("Exact").field(exact).finish(),
            PathMatcher::Pattern { pattern, .. } => f.debug_tuple("Pattern").field(pattern).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact() {
        let matcher = PathMatcher::parse("/login").unwrap();

        assert!(matches!(matcher, PathMatcher::Exact(_)));
        assert_eq!(matcher.matches("/login"), Some(Params::empty()));
        assert_eq!(matcher.matches("/login/"), None);
        assert_eq!(matcher.matches("/Login"), None);
        assert_eq!(matcher.matches("/"), None);
    }

    #[test]
    fn named_segment() {
        let matcher = PathMatcher::parse("/users/{id}").unwrap();

        let params = matcher.matches("/users/42").unwrap();
        assert_eq!(params.get("id"), Some("42"));

        assert_eq!(matcher.matches("/users"), None);
        assert_eq!(matcher.matches("/users/42/posts"), None);
    }

    #[test]
    fn catch_all_segment() {
        let matcher = PathMatcher::parse("/assets/{*file}").unwrap();

        let params = matcher.matches("/assets/css/styles.css").unwrap();
        assert_eq!(params.get("file"), Some("css/styles.css"));
    }

    #[test]
    fn invalid_pattern() {
        let result = PathMatcher::parse("/users/{id");
        assert!(matches!(result, Err(RouteError::InvalidPattern { .. })));
    }

    #[test]
    fn debug_shows_source() {
        assert_eq!(format!("{:?}", PathMatcher::parse("/users/{id}").unwrap()), r#"Pattern("/users/{id}")"#);
        assert_eq!(PathMatcher::parse("/login").unwrap().as_str(), "/login");
    }
}
