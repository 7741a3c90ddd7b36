//! HTTP error handling
//!
//! Every failed request answers with the same JSON body:
//! `{ "message": ..., "code": ..., "details"?: ... }`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use viewtree_core::ViewServiceError;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpError {
    /// User-facing error message
    pub message: String,
    /// Machine-readable error code
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl HttpError {
    pub fn new(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: None,
        }
    }

    pub fn with_details(
        message: impl Into<String>,
        code: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            code: code.into(),
            details: Some(details.into()),
        }
    }

    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::new(format!("Not found: {}", what), "NOT_FOUND")
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" | "INVALID_PARENT" | "INVALID_INPUT" => StatusCode::BAD_REQUEST,
            "CYCLE_DETECTED" => StatusCode::CONFLICT,
            "READ_ONLY" => StatusCode::FORBIDDEN,
            "PERSISTENCE_FAILURE" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<ViewServiceError> for HttpError {
    fn from(err: ViewServiceError) -> Self {
        let code = err.code();
        match &err {
            ViewServiceError::PersistenceFailure(inner) => {
                tracing::warn!("Mutation not persisted: {}", inner);
                HttpError::with_details(err.to_string(), code, format!("{:?}", inner))
            }
            ViewServiceError::IntegrityError(_) => {
                tracing::error!("{}", err);
                HttpError::new(err.to_string(), code)
            }
            _ => HttpError::new(err.to_string(), code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewtree_core::ValidationError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ViewServiceError::node_not_found("x"), StatusCode::NOT_FOUND),
            (
                ViewServiceError::from(ValidationError::HasChildren("x".to_string())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ViewServiceError::CycleDetected {
                    node_id: "a".to_string(),
                    parent_id: "b".to_string(),
                },
                StatusCode::CONFLICT,
            ),
            (ViewServiceError::ReadOnly, StatusCode::FORBIDDEN),
            (
                ViewServiceError::integrity("broken"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(HttpError::from(err).status(), status);
        }
    }
}
