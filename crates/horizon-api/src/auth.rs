//! Identity extraction.
//!
//! Requests authenticate with `Authorization: Bearer <api-key>`; the key is
//! hashed and resolved to a profile. The resolved identity is then passed
//! explicitly into every repository call; handlers never read the current
//! user from anywhere else.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use horizon_core::{Profile, ProfileRepository};

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller.
pub struct Identity(pub Profile);

/// Parse the bearer token out of an Authorization header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing Authorization header".to_string()))?;

        let token = bearer_token(value)
            .ok_or_else(|| ApiError::Unauthorized("expected a Bearer token".to_string()))?;

        let profile = state
            .db
            .profiles
            .find_by_api_key(token)
            .await
            .map_err(ApiError::from)?
            .ok_or_else(|| ApiError::Unauthorized("unknown API key".to_string()))?;

        Ok(Identity(profile))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_parses() {
        assert_eq!(bearer_token("Bearer hz_key_abc"), Some("hz_key_abc"));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
        assert_eq!(bearer_token("hz_key_abc"), None);
    }

    #[test]
    fn test_bearer_token_rejects_empty() {
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer    "), None);
    }
}
