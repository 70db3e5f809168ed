use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::handlers::change_password::change_password;
use super::handlers::current_user::current_user;
use super::handlers::health::health;
use super::handlers::refresh::refresh;
use super::handlers::register::register;
use super::handlers::sign_in::sign_in;
use super::handlers::sign_out::sign_out;
use super::middleware::require_access_token;
use super::middleware::require_refresh_token;
use super::middleware::RouteAccess;
use crate::config::ServerConfig;
use crate::domain::user::ports::UserServicePort;

pub struct AppState<US: UserServicePort> {
    pub user_service: Arc<US>,
    pub authenticator: Arc<Authenticator>,
}

impl<US: UserServicePort> Clone for AppState<US> {
    fn clone(&self) -> Self {
        Self {
            user_service: Arc::clone(&self.user_service),
            authenticator: Arc::clone(&self.authenticator),
        }
    }
}

pub fn create_router<US: UserServicePort>(
    user_service: Arc<US>,
    authenticator: Arc<Authenticator>,
    server: &ServerConfig,
) -> Router {
    let state = AppState {
        user_service,
        authenticator,
    };

    let public_routes = Router::new()
        .route("/auth/register", post(register::<US>))
        .route("/auth/sign-in", post(sign_in::<US>))
        .route("/health", get(health::<US>))
        .route_layer(middleware::from_fn_with_state(
            (state.clone(), RouteAccess::Public),
            require_access_token::<US>,
        ));

    let authenticated_routes = Router::new()
        .route("/auth", get(current_user))
        .route("/auth/sign-out", post(sign_out::<US>))
        .route("/auth/password", post(change_password::<US>))
        .route_layer(middleware::from_fn_with_state(
            (state.clone(), RouteAccess::Authenticated),
            require_access_token::<US>,
        ));

    let refresh_routes = Router::new()
        .route("/auth/refresh", get(refresh::<US>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_refresh_token::<US>,
        ));

    let routes = Router::new()
        .merge(public_routes)
        .merge(authenticated_routes)
        .merge(refresh_routes);

    let routes = match api_prefix(&server.api_prefix) {
        Some(prefix) => Router::new().nest(&prefix, routes),
        None => routes,
    };

    // Headers stay out of the span: they carry the session cookies.
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    routes
        .layer(trace_layer)
        .layer(cors_layer(server.cors_origin.as_deref()))
        .with_state(state)
}

/// Normalize the configured prefix to `/segment`; `None` when routes stay at the root.
fn api_prefix(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        None
    } else {
        Some(format!("/{}", trimmed))
    }
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let Some(origin) = origin.filter(|o| !o.trim().is_empty()) else {
        return CorsLayer::permissive();
    };

    match HeaderValue::from_str(origin.trim()) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([CONTENT_TYPE]),
        Err(e) => {
            tracing::warn!(origin, error = %e, "Ignoring unusable CORS origin");
            CorsLayer::permissive()
        }
    }
}
