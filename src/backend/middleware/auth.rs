/**
 * Bearer-token guard
 *
 * Protects the `/api` routes. The token is read from the
 * `Authorization: Bearer <token>` header, or from an `access_token` query
 * parameter for clients that cannot set headers (browser `EventSource`).
 * The verified user is attached to the request extensions and handlers
 * read it back with the `AuthUser` extractor.
 */
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::backend::auth::sessions::verify_token;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Caller identity taken from a verified token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: Option<String>,
}

fn bearer_token(request: &Request) -> Option<String> {
    let from_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string());
    from_header.or_else(|| {
        request.uri().query().and_then(|query| {
            query.split('&').find_map(|pair| {
                pair.strip_prefix("access_token=")
                    .map(|token| token.to_string())
            })
        })
    })
}

/// Rejects `/api` requests without a valid token
///
/// Returns 401 if the token is missing, malformed, expired or signed with
/// another secret.
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = bearer_token(&request).ok_or_else(|| {
        tracing::warn!("[Auth] Missing bearer token for {}", request.uri().path());
        BackendError::unauthorized("Authentication required")
    })?;

    let claims = verify_token(&app_state.config.jwt_secret, &token).map_err(|e| {
        tracing::warn!("[Auth] Invalid token: {:?}", e);
        BackendError::unauthorized("Invalid or expired token")
    })?;

    let user_id = claims.user_id().map_err(|e| {
        tracing::warn!("[Auth] Invalid user id in token: {:?}", e);
        BackendError::unauthorized("Invalid or expired token")
    })?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id,
        email: claims.email,
    });

    Ok(next.run(request).await)
}

/// Axum extractor for the user set by `auth_middleware`
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                tracing::warn!("[Auth] AuthenticatedUser not found in request extensions");
                BackendError::unauthorized("Authentication required")
            })
    }
}
