//! API error type and status mapping.
//!
//! Two rules shape the mapping: a caller outside a workspace must never be
//! able to distinguish "exists but private" from "does not exist" (both are
//! 404), and upstream-provider failures keep their cause (429, 402, 502)
//! instead of collapsing into a generic 500.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::error;

/// API-level error with an HTTP status.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    /// Provider quota exhausted (402).
    PaymentRequired(String),
    /// Upstream content not usable (422).
    Unprocessable(String),
    /// Rate limited, locally or by a provider (429).
    RateLimited(String),
    /// Missing provider configuration; the message names the connector.
    Config(String),
    /// Upstream provider failed or returned garbage (502).
    BadGateway(String),
    /// Anything unexpected; logged, returned without internal detail.
    Internal(horizon_core::Error),
}

impl From<horizon_core::Error> for ApiError {
    fn from(err: horizon_core::Error) -> Self {
        use horizon_core::Error as E;
        match err {
            E::NotFound(msg) => ApiError::NotFound(format!("{} not found", msg)),
            E::InvalidInput(msg) => ApiError::BadRequest(msg),
            E::ContentTooShort(_) => ApiError::BadRequest(err.to_string()),
            E::Unauthorized(msg) => ApiError::Unauthorized(msg),
            E::Forbidden(msg) => ApiError::Forbidden(msg),
            E::Config(msg) => ApiError::Config(msg),
            E::RateLimited(msg) => ApiError::RateLimited(msg),
            E::QuotaExhausted(msg) => ApiError::PaymentRequired(msg),
            E::NoContent(msg) => ApiError::Unprocessable(msg),
            E::MalformedResponse(msg) => ApiError::BadGateway(format!("malformed provider response: {}", msg)),
            E::Scrape(msg) => ApiError::BadGateway(format!("scrape failed: {}", msg)),
            E::Inference(msg) => ApiError::BadGateway(format!("analysis failed: {}", msg)),
            E::Database(ref sqlx_err) => {
                let msg = sqlx_err.to_string();
                if msg.contains("duplicate key") || msg.contains("unique constraint") {
                    return ApiError::Conflict("resource already exists".to_string());
                }
                if msg.contains("foreign key") {
                    return ApiError::BadRequest("referenced resource does not exist".to_string());
                }
                ApiError::Internal(err)
            }
            _ => ApiError::Internal(err),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::PaymentRequired(_) => StatusCode::PAYMENT_REQUIRED,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Config(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = match self {
            // Internal details are logged, not returned.
            ApiError::Internal(err) => {
                error!(subsystem = "api", error = %err, "Unexpected internal error");
                "internal error".to_string()
            }
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::PaymentRequired(msg)
            | ApiError::Unprocessable(msg)
            | ApiError::RateLimited(msg)
            | ApiError::Config(msg)
            | ApiError::BadGateway(msg) => msg,
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_core::Error;

    #[test]
    fn test_not_found_maps_to_404() {
        let err: ApiError = Error::NotFound("workspace".into()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_forbidden_maps_to_403() {
        let err: ApiError = Error::Forbidden("viewer".into()).into();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_validation_maps_to_400() {
        let err: ApiError = Error::InvalidInput("title is required".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let err: ApiError = Error::ContentTooShort(12).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_provider_causes_keep_distinct_statuses() {
        let err: ApiError = Error::RateLimited("x".into()).into();
        assert_eq!(err.status(), StatusCode::TOO_MANY_REQUESTS);
        let err: ApiError = Error::QuotaExhausted("x".into()).into();
        assert_eq!(err.status(), StatusCode::PAYMENT_REQUIRED);
        let err: ApiError = Error::MalformedResponse("x".into()).into();
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        let err: ApiError = Error::Config("FIRECRAWL_API_KEY is not set".into()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_no_content_maps_to_422() {
        let err: ApiError = Error::NoContent("nothing extracted".into()).into();
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
