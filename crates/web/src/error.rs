use http::StatusCode;
use jwp_http::protocol::ReadError;
use thiserror::Error;

use crate::handler::BoxError;
use crate::resource::ResourceError;
use crate::router::RouteError;

/// Every way producing a response for one stream can fail.
///
/// The processor maps each failure to a status code with [`ProcessError::status`]
/// and renders the default page of that status instead of the response.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("read request error: {source}")]
    Read {
        #[from]
        source: ReadError,
    },

    #[error("route error: {source}")]
    Route {
        #[from]
        source: RouteError,
    },

    #[error("resource error: {source}")]
    Resource {
        #[from]
        source: ResourceError,
    },

    #[error("handler error: {source}")]
    Handler { source: BoxError },
}

impl ProcessError {
    pub fn handler<E: Into<BoxError>>(e: E) -> Self {
        Self::Handler { source: e.into() }
    }

    /// The status the client sees for this failure.
    ///
    /// An unknown path is an expected outcome and maps to `404 Not Found`, any
    /// other failure is internal and maps to `500 Internal Server Error`.
    pub fn status(&self) -> StatusCode {
        match self {
            ProcessError::Route { source: RouteError::NoMatchingRoute { .. } }
            | ProcessError::Resource { source: ResourceError::NotFound { .. } } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
