use auth::TokenKind;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header::COOKIE;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;
use crate::user::errors::UserError;

/// Whether a route needs a valid access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    Authenticated,
}

/// User resolved from a session cookie, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// Access guard: resolves the user behind the `Authentication` cookie.
///
/// Public routes pass through untouched. Every failure on an authenticated
/// route is reported as the same 401.
pub async fn require_access_token<US>(
    State((state, access)): State<(AppState<US>, RouteAccess)>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    US: UserServicePort,
{
    let token = session_token(&req, TokenKind::Access);

    if access == RouteAccess::Public {
        return Ok(next.run(req).await);
    }

    let token = token.ok_or_else(ApiError::unauthorized)?;

    let claims = state
        .authenticator
        .validate_access_token(&token)
        .map_err(|e| {
            tracing::debug!(error = %e, "Access token rejected");
            ApiError::unauthorized()
        })?;

    let user = state
        .user_service
        .get_user(&UserId(claims.user_id))
        .await
        .map_err(|e| reject("Access token", claims.user_id, e))?;

    req.extensions_mut().insert(AuthenticatedUser(user));

    Ok(next.run(req).await)
}

/// Refresh guard: accepts only the refresh token whose hash is currently stored.
pub async fn require_refresh_token<US>(
    State(state): State<AppState<US>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError>
where
    US: UserServicePort,
{
    let token = session_token(&req, TokenKind::Refresh).ok_or_else(ApiError::unauthorized)?;

    let claims = state
        .authenticator
        .validate_refresh_token(&token)
        .map_err(|e| {
            tracing::debug!(error = %e, "Refresh token rejected");
            ApiError::unauthorized()
        })?;

    let user = state
        .user_service
        .get_user_if_refresh_token_matches(&UserId(claims.user_id), &token)
        .await
        .map_err(|e| reject("Refresh token", claims.user_id, e))?;

    req.extensions_mut().insert(AuthenticatedUser(user));

    Ok(next.run(req).await)
}

fn session_token(req: &Request, kind: TokenKind) -> Option<String> {
    cookie_value(req.headers(), kind.cookie_name())
}

/// Value of the cookie called `name`; empty values count as absent.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn reject(token: &str, user_id: i64, err: UserError) -> ApiError {
    match err {
        UserError::DatabaseError(_) | UserError::Unknown(_) => {
            tracing::error!(user_id, error = %err, "{} check failed", token);
        }
        _ => tracing::debug!(user_id, error = %err, "{} rejected", token),
    }
    ApiError::unauthorized()
}
