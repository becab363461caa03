//! Static files and default pages.
//!
//! [`StaticResources`] serves two purposes:
//! - resolving a literal request path (`/index.html`) to a file below a root
//!   directory, wrapped in a `200 OK` response;
//! - handing out the canned page associated with a status code, which is what
//!   every failure in the pipeline ends up rendering.
//!
//! Default pages are loaded once when the value is built. Afterwards the value
//! is never mutated and can be shared between threads through an `Arc`.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use http::{HeaderValue, StatusCode};
use jwp_http::protocol::Response;
use mime::Mime;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("static resource not found: {path}")]
    NotFound { path: String },

    #[error("static resource {path} can't be read: {source}")]
    Unreadable { path: String, source: io::Error },
}

impl ResourceError {
    pub fn not_found<S: ToString>(path: S) -> Self {
        Self::NotFound { path: path.to_string() }
    }

    pub fn unreadable<S: ToString>(path: S, source: io::Error) -> Self {
        Self::Unreadable { path: path.to_string(), source }
    }
}

pub struct StaticResources {
    root: PathBuf,
    default_pages: HashMap<StatusCode, Response>,
}

impl StaticResources {
    pub fn builder(root: impl Into<PathBuf>) -> StaticResourcesBuilder {
        StaticResourcesBuilder { root: root.into(), pages: Vec::new() }
    }

    /// Static resources below `root` with the usual error pages:
    /// `401.html`, `404.html` and `500.html`.
    pub fn with_default_pages(root: impl Into<PathBuf>) -> Self {
        Self::builder(root)
            .default_page(StatusCode::UNAUTHORIZED, "/401.html")
            .default_page(StatusCode::NOT_FOUND, "/404.html")
            .default_page(StatusCode::INTERNAL_SERVER_ERROR, "/500.html")
            .build()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads the file at the literal `path` below the root.
    ///
    /// # Errors
    ///
    /// - [`ResourceError::NotFound`] if the path doesn't start with `/`, tries to
    ///   leave the root, or names something that is not a regular file
    /// - [`ResourceError::Unreadable`] if the file can't be read or isn't UTF-8 text
    pub fn resolve_static(&self, path: &str) -> Result<Response, ResourceError> {
        let (content_type, body) = load_file(&self.root, path)?;
        debug!(path, size = body.len(), "resolved static resource");
        Ok(Response::new(StatusCode::OK).with_body(content_type, body))
    }

    /// Returns the page associated with `status`.
    ///
    /// Never fails: a status without an associated page gets a plain text body
    /// made of its code and reason phrase.
    pub fn default_page_for(&self, status: StatusCode) -> Response {
        match self.default_pages.get(&status) {
            Some(page) => page.clone(),
            None => plain_text_page(status),
        }
    }

    pub fn has_default_page(&self, status: StatusCode) -> bool {
        self.default_pages.contains_key(&status)
    }
}

impl fmt::Debug for StaticResources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut statuses = self.default_pages.keys().map(StatusCode::as_u16).collect::<Vec<_>>();
        statuses.sort_unstable();
        f.debug_struct("StaticResources").field("root", &self.root).field("default_pages", &statuses).finish()
    }
}

#[derive(Debug)]
pub struct StaticResourcesBuilder {
    root: PathBuf,
    pages: Vec<(StatusCode, String)>,
}

impl StaticResourcesBuilder {
    /// Associates the file at `path` (below the root) with `status`.
    pub fn default_page(mut self, status: StatusCode, path: impl Into<String>) -> Self {
        self.pages.push((status, path.into()));
        self
    }

    /// Loads and pre-renders every associated page.
    ///
    /// A page that can't be loaded is left out and reported; lookups for its
    /// status then use the plain text fallback.
    pub fn build(self) -> StaticResources {
        let mut default_pages = HashMap::with_capacity(self.pages.len());

        for (status, path) in self.pages {
            match load_file(&self.root, &path) {
                Ok((content_type, body)) => {
                    default_pages.insert(status, Response::new(status).with_body(content_type, body));
                }
                Err(e) => {
                    warn!(status = status.as_u16(), path = %path, cause = %e, "default page unavailable, fallback to plain text");
                }
            }
        }

        StaticResources { root: self.root, default_pages }
    }
}

fn plain_text_page(status: StatusCode) -> Response {
    let body = format!("{} {}", status.as_str(), status.canonical_reason().unwrap_or("Unknown"));
    Response::new(status).with_body(header_value(&mime::TEXT_PLAIN_UTF_8), body)
}

fn load_file(root: &Path, path: &str) -> Result<(HeaderValue, String), ResourceError> {
    let file = locate(root, path).ok_or_else(|| ResourceError::not_found(path))?;
    if !file.is_file() {
        return Err(ResourceError::not_found(path));
    }

    let bytes = fs::read(&file).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ResourceError::not_found(path),
        _ => ResourceError::unreadable(path, e),
    })?;
    let body = String::from_utf8(bytes).map_err(|e| ResourceError::unreadable(path, io::Error::new(io::ErrorKind::InvalidData, e)))?;

    Ok((header_value(&content_type(&file)), body))
}

/// Maps a request path onto the file system, refusing anything that could leave `root`.
fn locate(root: &Path, path: &str) -> Option<PathBuf> {
    let relative = path.strip_prefix('/')?;

    let mut file = root.to_path_buf();
    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            segment if segment.contains(|c: char| matches!(c, '\\' | ':' | '\0')) => return None,
            segment => file.push(segment),
        }
    }
    Some(file)
}

fn content_type(file: &Path) -> Mime {
    match file.extension().and_then(OsStr::to_str) {
        Some("html" | "htm") => mime::TEXT_HTML_UTF_8,
        Some("css") => mime::TEXT_CSS_UTF_8,
        Some("js") => mime::APPLICATION_JAVASCRIPT_UTF_8,
        Some("json") => mime::APPLICATION_JSON,
        Some("svg") => mime::IMAGE_SVG,
        Some("txt") => mime::TEXT_PLAIN_UTF_8,
        Some("csv") => mime::TEXT_CSV_UTF_8,
        Some("xml") => mime::TEXT_XML,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

fn header_value(mime: &Mime) -> HeaderValue {
    HeaderValue::from_str(mime.as_ref()).unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"))
}

#[cfg(test)]
mod tests {
    use http::header::CONTENT_TYPE;

    use super::*;

    const STATIC_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

    fn resources() -> StaticResources {
        StaticResources::with_default_pages(STATIC_ROOT)
    }

    fn file(path: &str) -> String {
        fs::read_to_string(Path::new(STATIC_ROOT).join(path)).unwrap()
    }

    #[test]
    fn resolve_index() {
        let response = resources().resolve_static("/index.html").unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), file("index.html"));
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "text/html; charset=utf-8");
    }

    #[test]
    fn resolve_nested_css() {
        let response = resources().resolve_static("/css/styles.css").unwrap();

        assert_eq!(response.body(), file("css/styles.css"));
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "text/css; charset=utf-8");
    }

    #[test]
    fn resolve_missing() {
        let resources = resources();

        assert!(matches!(resources.resolve_static("/nothing.html"), Err(ResourceError::NotFound { .. })));
        assert!(matches!(resources.resolve_static("/"), Err(ResourceError::NotFound { .. })));
        assert!(matches!(resources.resolve_static("/css"), Err(ResourceError::NotFound { .. })));
        assert!(matches!(resources.resolve_static("index.html"), Err(ResourceError::NotFound { .. })));
    }

    #[test]
    fn refuse_leaving_root() {
        let resources = StaticResources::with_default_pages(concat!(env!("CARGO_MANIFEST_DIR"), "/static/css"));

        assert!(matches!(resources.resolve_static("/../index.html"), Err(ResourceError::NotFound { .. })));
        assert!(matches!(resources.resolve_static("/./styles.css"), Ok(_)));
    }

    #[test]
    fn default_pages() {
        let resources = resources();

        for (status, page) in [
            (StatusCode::UNAUTHORIZED, "401.html"),
            (StatusCode::NOT_FOUND, "404.html"),
            (StatusCode::INTERNAL_SERVER_ERROR, "500.html"),
        ] {
            assert!(resources.has_default_page(status));

            let response = resources.default_page_for(status);
            assert_eq!(response.status(), status);
            assert_eq!(response.body(), file(page));
        }
    }

    #[test]
    fn default_page_never_fails() {
        let resources = resources();

        let response = resources.default_page_for(StatusCode::IM_A_TEAPOT);
        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(response.body(), "418 I'm a teapot");
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "text/plain; charset=utf-8");

        let response = resources.default_page_for(StatusCode::from_u16(599).unwrap());
        assert_eq!(response.body(), "599 Unknown");
    }

    #[test]
    fn missing_page_files_fall_back_to_plain_text() {
        let resources = StaticResources::with_default_pages("/path/that/does/not/exist");

        assert!(!resources.has_default_page(StatusCode::INTERNAL_SERVER_ERROR));

        let response = resources.default_page_for(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.body(), "500 Internal Server Error");
    }

    #[test]
    fn custom_page_association() {
        let resources = StaticResources::builder(STATIC_ROOT).default_page(StatusCode::FORBIDDEN, "/401.html").build();

        assert_eq!(resources.default_page_for(StatusCode::FORBIDDEN).body(), file("401.html"));
        assert_eq!(resources.default_page_for(StatusCode::FORBIDDEN).status(), StatusCode::FORBIDDEN);
        assert!(!resources.has_default_page(StatusCode::NOT_FOUND));
    }
}
