use crate::api::payload::{ErrorBody, ErrorDetail};
use crate::error::AuditError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// HTTP 层错误
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Audit(#[from] AuditError),

    #[error("malformed request body: {0}")]
    MalformedRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Audit(err) => err.code(),
            Self::MalformedRequest(_) => "MALFORMED_REQUEST",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Audit(AuditError::UnknownProcedureCode(_)) => StatusCode::NOT_FOUND,
            Self::Audit(AuditError::BatchTooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Audit(
                AuditError::InvalidZip(_) | AuditError::InvalidPrice(_) | AuditError::EmptyBatch,
            )
            | Self::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), "{}", self);
        } else {
            tracing::warn!(code = self.code(), "{}", self);
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_client_statuses() {
        let cases = [
            (AuditError::UnknownProcedureCode("D9999".into()), StatusCode::NOT_FOUND),
            (AuditError::InvalidZip("ABCDE".into()), StatusCode::BAD_REQUEST),
            (AuditError::InvalidPrice("-1".into()), StatusCode::BAD_REQUEST),
            (AuditError::EmptyBatch, StatusCode::BAD_REQUEST),
            (
                AuditError::BatchTooLarge { count: 60, max: 50 },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
        ];
        for (err, status) in cases {
            let api = ApiError::from(err);
            assert_eq!(api.status(), status);
            assert!(api.status().is_client_error());
        }
    }

    #[test]
    fn transparent_message_for_audit_errors() {
        let api = ApiError::from(AuditError::InvalidZip("ABCDE".into()));
        assert_eq!(api.to_string(), "zip code 'ABCDE' is not a 5-digit number");
        assert_eq!(api.code(), "INVALID_ZIP");
    }
}
