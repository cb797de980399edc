use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mailbox_core::MailboxError;

// ---------------------------------------------------------------------------
// Internal sentinels for explicit status codes
// ---------------------------------------------------------------------------

/// Carries an explicit HTTP 400 through the `anyhow::Error` chain.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct BadRequestError(String);

/// Carries an explicit HTTP 501 through the `anyhow::Error` chain.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct NotImplementedError(String);

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 400 Bad Request error with the given message.
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self(BadRequestError(msg.into()).into())
    }

    /// Construct a 501 Not Implemented error.
    pub fn not_implemented(msg: impl Into<String>) -> Self {
        Self(NotImplementedError(msg.into()).into())
    }

    pub fn status(&self) -> StatusCode {
        if self.0.downcast_ref::<BadRequestError>().is_some() {
            return StatusCode::BAD_REQUEST;
        }
        if self.0.downcast_ref::<NotImplementedError>().is_some() {
            return StatusCode::NOT_IMPLEMENTED;
        }
        match self.0.downcast_ref::<MailboxError>() {
            Some(MailboxError::MissingField(_) | MailboxError::EmptyIdentity) => {
                StatusCode::BAD_REQUEST
            }
            Some(
                MailboxError::ConfigNotFound(_)
                | MailboxError::InvalidConfig(_)
                | MailboxError::Io(_)
                | MailboxError::Yaml(_),
            )
            | None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() && status != StatusCode::NOT_IMPLEMENTED {
            tracing::error!("request failed: {:#}", self.0);
        }
        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_maps_to_400() {
        let err = AppError(MailboxError::MissingField("actionUrl").into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn empty_identity_maps_to_400() {
        let err = AppError(MailboxError::EmptyIdentity.into());
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn io_error_maps_to_500() {
        let err = AppError(MailboxError::Io(std::io::Error::other("disk full")).into());
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn non_mailbox_error_maps_to_500() {
        let err = AppError(anyhow::anyhow!("something unexpected"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn bad_request_constructor_maps_to_400() {
        let err = AppError::bad_request("appVersion is required");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_implemented_constructor_maps_to_501() {
        let err = AppError::not_implemented("delete");
        assert_eq!(err.into_response().status(), StatusCode::NOT_IMPLEMENTED);
    }

    #[test]
    fn response_body_contains_error_field() {
        let response = AppError::bad_request("nope").into_response();
        let ct = response
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .expect("should have content-type");
        assert!(ct.to_str().unwrap().contains("application/json"));
    }
}
