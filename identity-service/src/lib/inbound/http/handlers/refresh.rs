use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::response::AppendHeaders;
use axum::Extension;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

/// Issue a fresh access cookie for the holder of the current refresh token.
pub async fn refresh<US: UserServicePort>(
    State(state): State<AppState<US>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Result<(AppendHeaders<[(HeaderName, String); 1]>, ApiSuccess<UserData>), ApiError> {
    let access_cookie = state.authenticator.access_token_cookie(user.id.0)?;

    tracing::debug!(user_id = %user.id, "Access token refreshed");

    Ok((
        AppendHeaders([(SET_COOKIE, access_cookie)]),
        ApiSuccess::new(StatusCode::OK, (&user).into()),
    ))
}
