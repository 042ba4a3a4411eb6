use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Route-authorization core.
pub mod catalog;
pub mod error;
pub mod models;
pub mod registry;
pub mod source;
pub mod store;
pub mod transform;

// Service shell around the core.
pub mod auth;
pub mod config;
pub mod handlers;

// Module for routing segregation (Public, Authenticated).
pub mod routes;
use auth::AuthUser;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use catalog::RouteCatalog;
pub use config::AppConfig;
pub use error::{RouteError, RouteResult};
pub use registry::{InMemoryRouter, RouteRegistry, TabInitializer, TabStore};
pub use source::{
    CatalogRouteSource, HttpRouteSource, MockRouteSource, RouteSource, RouteSourceState,
};
pub use store::{RouteState, RouteStore, SharedRouteStore};

/// CatalogState
///
/// Shared, read-only handle to the route catalog (users, grants, routes).
pub type CatalogState = Arc<RouteCatalog>;

/// ApiDoc
///
/// OpenAPI document for the route API, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(handlers::get_user_routes, handlers::init_auth_route),
    components(
        schemas(
            models::AuthorizedRoute, models::RouteMeta, models::RouteComponent,
            models::UserRoutes, models::UserRoutesRequest, models::MenuOption,
            models::SearchMenu, models::NativeRoute, models::NativeComponent,
            models::RouteSnapshot, models::AuthRouteMode, models::InitPhase, models::Tab,
        )
    ),
    tags(
        (name = "auth-route", description = "Authorization-driven route resolution")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single container of shared services every request sees.
#[derive(Clone)]
pub struct AppState {
    /// Loaded, immutable configuration.
    pub config: AppConfig,
    /// Users, grants and routes the route service hands out.
    pub catalog: CatalogState,
    /// Where `/route/init` fetches grants from in dynamic mode.
    pub source: RouteSourceState,
}

impl AppState {
    /// Wires the state for a config: the remote route service when one is
    /// configured, the in-process catalog otherwise.
    pub fn from_config(config: AppConfig, catalog: CatalogState) -> Self {
        let source: RouteSourceState = match &config.route_service_url {
            Some(url) => Arc::new(HttpRouteSource::new(url)),
            None => Arc::new(CatalogRouteSource::new(catalog.clone())),
        };
        Self {
            config,
            catalog,
            source,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for CatalogState {
    fn from_ref(app_state: &AppState) -> CatalogState {
        app_state.catalog.clone()
    }
}

impl FromRef<AppState> for RouteSourceState {
    fn from_ref(app_state: &AppState) -> RouteSourceState {
        app_state.source.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Rejects the request with 401 unless an `AuthUser` can be extracted.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles routes, scoped middleware, state and the observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` so every log
/// line of one request correlates.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
