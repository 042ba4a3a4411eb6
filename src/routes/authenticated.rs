use crate::{AppState, handlers};
use axum::{Router, routing::post};

/// Authenticated Router Module
///
/// Every handler here receives a validated `AuthUser`; the identity it
/// carries is what route initialization runs as.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /route/init
        // Resolves the caller's auth routes in the configured mode and returns
        // the session's menus, search entries and keep-alive list.
        .route("/route/init", post(handlers::init_auth_route))
}
