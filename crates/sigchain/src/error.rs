use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Domain error taxonomy. The HTTP boundary translates each kind to a
/// status code; everything below the boundary propagates these unchanged.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    BadInput(String),
    #[error("no device found with id {0}")]
    NotFound(String),
    #[error("device with id {0} already exists")]
    Conflict(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::BadInput(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Trait implementation to convert this error into an axum http response
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let mut errors = vec![status.canonical_reason().unwrap_or("error").to_owned()];
        match self {
            // Internal details stay out of responses.
            Error::Internal(_) => {}
            other => errors.push(other.to_string()),
        }
        (status, Json(json!({ "errors": errors }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_input_returns_400() {
        let error = Error::BadInput("id must be specified".into());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_returns_404() {
        let error = Error::NotFound("device-1".into());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn conflict_returns_409() {
        let error = Error::Conflict("device-1".into());
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn internal_returns_500() {
        let error = Error::Internal(anyhow::anyhow!("lock poisoned"));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_message_names_the_id() {
        let error = Error::NotFound("device-1".into());
        assert_eq!(error.to_string(), "no device found with id device-1");
    }
}
