use crate::{
    AppState,
    auth::AuthUser,
    error::RouteError,
    models::{RouteSnapshot, ServiceResponse, UserRoutes, UserRoutesRequest},
    registry::{InMemoryRouter, TabStore},
    store::RouteStore,
};
use axum::{Json, extract::State};
use std::sync::Arc;

// --- Handlers ---

/// get_user_routes
///
/// [Public Route] The route service: answers with the routes granted to the
/// requested user. Unknown users get a successful envelope with `data: null`,
/// which clients treat as "nothing to initialize".
#[utoipa::path(
    post,
    path = "/getUserRoutes",
    request_body = UserRoutesRequest,
    responses((status = 200, description = "Granted routes", body = ServiceResponse<UserRoutes>))
)]
pub async fn get_user_routes(
    State(state): State<AppState>,
    Json(payload): Json<UserRoutesRequest>,
) -> Json<ServiceResponse<UserRoutes>> {
    let granted = state.catalog.user_routes(&payload.user_id);
    tracing::debug!(
        user_id = %payload.user_id,
        granted = granted.is_some(),
        "serving user routes"
    );
    Json(ServiceResponse::ok(granted))
}

/// init_auth_route
///
/// [Authenticated Route] Runs auth route initialization for the caller in the
/// configured mode against a fresh session and returns the resulting state:
/// menus, search entries, keep-alive names, registered routes and open tabs.
#[utoipa::path(
    post,
    path = "/route/init",
    responses(
        (status = 200, description = "Initialized session", body = RouteSnapshot),
        (status = 401, description = "Unauthenticated"),
        (status = 502, description = "Route service failure")
    )
)]
pub async fn init_auth_route(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<RouteSnapshot>, RouteError> {
    let tabs = Arc::new(TabStore::new());
    let mut router = InMemoryRouter::new();

    let mut store = RouteStore::from_config(
        &state.config,
        Arc::new(auth_user),
        state.source.clone(),
        tabs.clone(),
    );

    let outcome = store.init_auth_route(&mut router).await?;
    tracing::info!(session = %store.session_id(), ?outcome, "auth route init finished");

    Ok(Json(store.snapshot(&router, tabs.tabs())))
}
