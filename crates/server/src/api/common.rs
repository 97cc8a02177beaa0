// Shared response types for page handlers
//
// Handlers turn expected failures (bad credentials, anonymous visitors) into
// redirects or re-rendered forms themselves. Anything else bubbles up as a
// `PageError` and is answered with the error view.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hushboard_core::Error;

use crate::views::render_error_page;

/// Error returned from page handlers
#[derive(Debug)]
pub struct PageError(pub Error);

impl PageError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::UpstreamFailure(_) => StatusCode::BAD_GATEWAY,
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::InvalidCredentials | Error::DuplicateUsername | Error::DuplicateKey(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for PageError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl From<anyhow::Error> for PageError {
    fn from(err: anyhow::Error) -> Self {
        Self(Error::Internal(err))
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (title, message) = if self.0.is_client_error() {
            tracing::warn!(%status, "Request failed: {}", self.0);
            ("Request failed", self.0.to_string())
        } else if status == StatusCode::BAD_GATEWAY {
            tracing::error!(%status, "Upstream failure: {}", self.0);
            (
                "Service unavailable",
                "A service we depend on is not responding. Please try again later.".to_string(),
            )
        } else {
            tracing::error!(%status, "Request failed: {:#}", self.0);
            (
                "Something went wrong",
                "An unexpected error occurred. Please try again later.".to_string(),
            )
        };

        (status, render_error_page(title, &message)).into_response()
    }
}
