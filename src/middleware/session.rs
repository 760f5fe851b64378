use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::auth::{validate_jwt, SessionContext};
use crate::server::AppState;

/// Extract a bearer token from the Authorization header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Missing or invalid credentials resolve to an anonymous session; gating
/// decisions are left to the caller.
#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let (Some(token), Some(secret)) = (
            bearer_token(&parts.headers),
            state.config.security.jwt_secret.as_deref(),
        ) else {
            return Ok(SessionContext::anonymous());
        };

        match validate_jwt(token, secret) {
            Ok(claims) => Ok(SessionContext::from(claims)),
            Err(e) => {
                tracing::debug!("Ignoring session token: {}", e);
                Ok(SessionContext::anonymous())
            }
        }
    }
}
