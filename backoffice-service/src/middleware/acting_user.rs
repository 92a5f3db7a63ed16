use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use service_core::error::AppError;
use std::convert::Infallible;

pub const ACTING_USER_HEADER: &str = "x-acting-user";

/// Recorded as the executor of commerce writes when the caller names nobody.
pub const DEFAULT_ACTOR: &str = "sistema";

fn header_actor(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(ACTING_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Username recorded as executor of a write, from `X-Acting-User`, defaulting to `sistema`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = header_actor(parts).unwrap_or_else(|| DEFAULT_ACTOR.to_string());
        tracing::Span::current().record("actor", actor.as_str());
        Ok(ActingUser(actor))
    }
}

/// Like [`ActingUser`] but without a default; administration writes must name their executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredActingUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for RequiredActingUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = header_actor(parts)
            .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Acting user is required")))?;
        tracing::Span::current().record("actor", actor.as_str());
        Ok(RequiredActingUser(actor))
    }
}
