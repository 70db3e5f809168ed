use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::response::AppendHeaders;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;

/// Check the email/password pair and open a session.
///
/// Sets both session cookies and stores the hash of the new refresh token,
/// which supersedes any refresh token issued before.
pub async fn sign_in<US: UserServicePort>(
    State(state): State<AppState<US>>,
    body: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<(AppendHeaders<[(HeaderName, String); 2]>, ApiSuccess<UserData>), ApiError> {
    let Json(body) = body.map_err(|e| {
        tracing::debug!(error = %e, "Sign-in body rejected");
        ApiError::unauthorized()
    })?;

    // A malformed email cannot belong to anyone; answer like any other miss.
    let email = EmailAddress::new(body.email).map_err(|_| ApiError::unauthorized())?;

    let user = state
        .user_service
        .authenticate(&email, &body.password)
        .await?;

    let access_cookie = state.authenticator.access_token_cookie(user.id.0)?;
    let refresh = state.authenticator.refresh_token_cookie(user.id.0)?;

    state
        .user_service
        .rotate_refresh_token(&user.id, &refresh.token)
        .await?;

    tracing::info!(user_id = %user.id, "User signed in");

    Ok((
        AppendHeaders([(SET_COOKIE, access_cookie), (SET_COOKIE, refresh.cookie)]),
        ApiSuccess::new(StatusCode::OK, (&user).into()),
    ))
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct SignInRequest {
    email: String,
    password: String,
}
