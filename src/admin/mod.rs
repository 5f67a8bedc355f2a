//! Admin API.
//!
//! # Routes
//! - `GET /admin/status`: channel state and serializer counters
//! - `POST /admin/reconnect`: replace the backend connection after a failure
//!
//! All routes require `Authorization: Bearer <admin.api_key>`.

pub mod auth;
pub mod handlers;

use axum::routing::{get, post};
use axum::{middleware, Router};

use crate::http::server::AppState;

/// Admin routes, to be nested under `/admin`.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/status", get(handlers::get_status))
        .route("/reconnect", post(handlers::reconnect))
        .route_layer(middleware::from_fn_with_state(state, auth::admin_auth_middleware))
}
