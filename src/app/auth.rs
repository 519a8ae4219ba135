use crate::app::error::ApiError;
use crate::app::state::AppState;
use crate::utils::error::{ProxyError, Result};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

/// Extractor guarding mutating routes with a static bearer token.
///
/// Handlers list it before any other extractor, so a rejected request never
/// reads its body or reaches the upstream.
#[derive(Debug, Clone, Copy)]
pub struct Authorized;

impl FromRequestParts<AppState> for Authorized {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        if !state.config.require_auth {
            return Ok(Self);
        }

        check_bearer(&parts.headers, &state.config.auth_token)?;
        Ok(Self)
    }
}

pub fn check_bearer(headers: &HeaderMap, expected: &str) -> Result<()> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ProxyError::auth("Missing token"))?;

    if token != expected {
        return Err(ProxyError::auth("Invalid token"));
    }
    Ok(())
}
