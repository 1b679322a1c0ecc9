//! Unified error type.

use http::StatusCode;
use tracing::error;

use crate::response::{IntoResponse, Response};

/// The error type returned by the flash accessor.
///
/// None of these are recovered locally. Returned from a handler, an error
/// becomes a `500 Internal Server Error` through [`IntoResponse`], which is
/// the host's generic failure path.
#[derive(Debug, thiserror::Error)]
pub enum FlashError {
    /// The request carried no session when the accessor was used.
    #[error("no session attached to the request")]
    MissingSession,

    /// `queue` was called with an empty message kind or template.
    #[error("flash {0} must not be empty")]
    EmptyArgument(&'static str),

    /// The session's flash field does not hold a flash store.
    #[error("flash store in session is malformed: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("flash store could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),
}

impl IntoResponse for FlashError {
    fn into_response(self) -> Response {
        error!(error = %self, "flash accessor failed");
        Response::status(StatusCode::INTERNAL_SERVER_ERROR)
    }
}
