use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without credentials.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /getUserRoutes
        // The route service: authorized routes and home route for a user id.
        // Dynamic-mode clients call this once per sign-in.
        .route("/getUserRoutes", post(handlers::get_user_routes))
}
