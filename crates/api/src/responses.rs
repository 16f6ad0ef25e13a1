//! Response helpers mapping the shared error taxonomy to HTTP.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use gestra_shared::AppError;

/// Renders an `AppError` as a JSON error response.
///
/// Validation errors carry their field map; everything else carries the
/// error code and message. Integrity and database failures are logged and
/// reported without internal detail.
pub fn error_response(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let body = match err {
        AppError::Validation(fields) => json!({
            "error": err.error_code(),
            "message": err.to_string(),
            "fields": fields,
        }),
        AppError::Integrity(_) | AppError::Database(_) | AppError::Internal(_) => {
            tracing::error!(error = %err, code = err.error_code(), "request failed");
            json!({
                "error": err.error_code(),
                "message": "An internal error occurred",
            })
        }
        _ => json!({
            "error": err.error_code(),
            "message": err.to_string(),
        }),
    };

    (status, Json(body)).into_response()
}

/// Shorthand used by handlers: convert any repository error and render it.
pub fn fail(err: impl Into<AppError>) -> Response {
    error_response(&err.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gestra_shared::FieldErrors;

    #[test]
    fn test_validation_maps_to_400() {
        let err = AppError::Validation(FieldErrors::single("amount", "must be positive"));
        let response = error_response(&err);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_maps_to_404() {
        let response = error_response(&AppError::NotFound("installment x".into()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_integrity_maps_to_500() {
        let response = error_response(&AppError::Integrity("missing scope".into()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
