//! Actor resolution from gateway headers.
//!
//! Authentication happens upstream. The gateway forwards the resolved caller
//! as `x-actor-id`, `x-actor-role`, and a comma-separated
//! `x-actor-capabilities` list; anything missing or malformed is a 401.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use haulbook_core::access::{Actor, Capability, UserRole};
use haulbook_shared::AppError;
use uuid::Uuid;

use crate::error::ApiError;

/// Header carrying the caller's user id.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
/// Header carrying the caller's role.
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
/// Header carrying the caller's capabilities.
pub const ACTOR_CAPABILITIES_HEADER: &str = "x-actor-capabilities";

/// Extractor for the calling actor.
///
/// ```ignore
/// async fn handler(CurrentActor(actor): CurrentActor) -> impl IntoResponse {
///     let user_id = actor.id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        actor_from_headers(&parts.headers).map(Self).map_err(|reason| {
            tracing::debug!(reason, "Actor headers rejected");
            ApiError(AppError::Unauthorized(reason.to_string()))
        })
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, &'static str> {
    headers
        .get(name)
        .map(|v| v.to_str().map_err(|_| "actor header is not valid text"))
        .transpose()
}

/// Builds an actor from the gateway headers.
///
/// An absent role means `viewer`; an absent capability header means none.
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, &'static str> {
    let id = header(headers, ACTOR_ID_HEADER)?
        .ok_or("missing actor id")?
        .trim()
        .parse::<Uuid>()
        .map_err(|_| "malformed actor id")?;

    let role = match header(headers, ACTOR_ROLE_HEADER)? {
        Some(raw) => UserRole::parse(raw).ok_or("unknown actor role")?,
        None => UserRole::Viewer,
    };

    let capabilities = match header(headers, ACTOR_CAPABILITIES_HEADER)? {
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Capability::parse(s).ok_or("unknown capability"))
            .collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };

    Ok(Actor::new(id, role, capabilities))
}
