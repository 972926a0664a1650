//! Error-to-HTTP mapping
//!
//! Wraps `DiamondError` for actix-web (orphan rules prevent a direct
//! `ResponseError` impl on the foreign type) and renders the taxonomy
//! as the structured JSON envelope the AJAX callers expect.

use std::fmt::{Display, Formatter};

use actix_web::{HttpResponse, http::StatusCode};
use serde_json::json;
use tracing::error;

use diamond_common::DiamondError;

#[derive(Debug)]
pub struct AppError {
    inner: DiamondError,
}

impl AppError {
    pub fn inner(&self) -> &DiamondError {
        &self.inner
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<DiamondError> for AppError {
    fn from(value: DiamondError) -> Self {
        AppError { inner: value }
    }
}

impl actix_web::error::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match &self.inner {
            DiamondError::Unauthenticated => StatusCode::UNAUTHORIZED,
            DiamondError::Forbidden(_) => StatusCode::FORBIDDEN,
            DiamondError::InvalidInput(_)
            | DiamondError::InvalidTransition(_)
            | DiamondError::PrerequisiteMissing(_) => StatusCode::BAD_REQUEST,
            DiamondError::NotFound(_) => StatusCode::NOT_FOUND,
            DiamondError::Conflict(_) => StatusCode::CONFLICT,
            DiamondError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match &self.inner {
            DiamondError::Internal(detail) => {
                error!(detail = %detail, "internal error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = match &self.inner {
            // Form-level failures surface as per-field errors
            DiamondError::InvalidInput(_) => json!({
                "success": false,
                "errors": { "__all__": [message] },
            }),
            _ => json!({
                "success": false,
                "message": message,
            }),
        };

        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::error::ResponseError;

    #[test]
    fn test_status_codes() {
        let cases = [
            (DiamondError::Unauthenticated, 401),
            (DiamondError::Forbidden("x".into()), 403),
            (DiamondError::InvalidInput("x".into()), 400),
            (DiamondError::InvalidTransition("x".into()), 400),
            (DiamondError::PrerequisiteMissing("x".into()), 400),
            (DiamondError::NotFound("x".into()), 404),
            (DiamondError::Conflict("x".into()), 409),
            (DiamondError::Internal("x".into()), 500),
        ];
        for (err, code) in cases {
            assert_eq!(AppError::from(err).status_code().as_u16(), code);
        }
    }

    #[test]
    fn test_internal_detail_is_not_leaked() {
        let err = AppError::from(DiamondError::Internal("password in query".into()));
        let response = err.error_response();
        assert_eq!(response.status().as_u16(), 500);
    }
}
