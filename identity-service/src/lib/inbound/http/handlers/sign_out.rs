use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::response::AppendHeaders;
use axum::Extension;

use super::ApiError;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

/// Close the session: forget the refresh hash and expire both cookies.
pub async fn sign_out<US: UserServicePort>(
    State(state): State<AppState<US>>,
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> Result<(AppendHeaders<[(HeaderName, String); 2]>, StatusCode), ApiError> {
    state.user_service.revoke_refresh_token(&user.id).await?;

    tracing::info!(user_id = %user.id, "User signed out");

    let [access_cookie, refresh_cookie] = state.authenticator.logout_cookies();
    Ok((
        AppendHeaders([(SET_COOKIE, access_cookie), (SET_COOKIE, refresh_cookie)]),
        StatusCode::NO_CONTENT,
    ))
}
