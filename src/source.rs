use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    catalog::RouteCatalog,
    error::{RouteError, RouteResult},
    models::{ServiceResponse, UserRoutes, UserRoutesRequest},
};

// 1. RouteSource Contract
/// RouteSource
///
/// Defines the contract for obtaining the authorized routes of one user in
/// dynamic mode. The store only ever sees this trait, so the remote service
/// (HttpRouteSource), the in-process catalog (CatalogRouteSource) and the test
/// double (MockRouteSource) are interchangeable.
#[async_trait]
pub trait RouteSource: Send + Sync {
    /// Fetches the routes granted to `user_id`.
    ///
    /// `Ok(None)` means the source answered but granted nothing. Transport or
    /// service failures come back as errors and are never retried here.
    async fn fetch_user_routes(&self, user_id: &str) -> RouteResult<Option<UserRoutes>>;
}

/// RouteSourceState
///
/// The shared handle the application state and the store hold.
pub type RouteSourceState = Arc<dyn RouteSource>;

// 2. The Remote Implementation
/// HttpRouteSource
///
/// Calls the route service over HTTP: `POST {base_url}/getUserRoutes` with a
/// `{"userId": ...}` body, expecting a `ServiceResponse<UserRoutes>` envelope.
#[derive(Clone)]
pub struct HttpRouteSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRouteSource {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/getUserRoutes", self.base_url)
    }
}

#[async_trait]
impl RouteSource for HttpRouteSource {
    async fn fetch_user_routes(&self, user_id: &str) -> RouteResult<Option<UserRoutes>> {
        let request = UserRoutesRequest {
            user_id: user_id.to_string(),
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await?;

        // An error status still carries the service's envelope when it sent one.
        let status_error = response.error_for_status_ref().err();
        let body = response.bytes().await?;
        let decoded = serde_json::from_slice::<ServiceResponse<UserRoutes>>(&body);
        let envelope = match (decoded, status_error) {
            (Ok(envelope), None) => envelope,
            (Ok(ServiceResponse { code, message, .. }), Some(_)) if code != 0 => {
                return Err(RouteError::Service { code, message });
            }
            (_, Some(e)) => return Err(RouteError::Transport(e)),
            (Err(e), None) => return Err(RouteError::Decode(e)),
        };

        if envelope.code != 0 {
            return Err(RouteError::Service {
                code: envelope.code,
                message: envelope.message,
            });
        }

        tracing::debug!(
            user_id,
            granted = envelope.data.as_ref().map(|d| d.routes.len()).unwrap_or(0),
            "route service answered"
        );
        Ok(envelope.data)
    }
}

// 3. The In-Process Implementation
/// CatalogRouteSource
///
/// Resolves grants straight from a `RouteCatalog`, skipping the network. Used by
/// the server when it is its own route service.
#[derive(Clone)]
pub struct CatalogRouteSource {
    catalog: Arc<RouteCatalog>,
}

impl CatalogRouteSource {
    pub fn new(catalog: Arc<RouteCatalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl RouteSource for CatalogRouteSource {
    async fn fetch_user_routes(&self, user_id: &str) -> RouteResult<Option<UserRoutes>> {
        Ok(self.catalog.user_routes(user_id))
    }
}

// 4. The Mock Implementation (For Tests)
/// MockRouteSource
///
/// Returns a canned payload (or a simulated failure) and counts how often it
/// was asked.
#[derive(Default)]
pub struct MockRouteSource {
    /// The payload every fetch answers with.
    pub payload: Option<UserRoutes>,
    /// When true, every fetch returns a simulated service failure.
    pub should_fail: bool,
    calls: AtomicUsize,
}

impl MockRouteSource {
    pub fn new(payload: Option<UserRoutes>) -> Self {
        Self {
            payload,
            ..Self::default()
        }
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Number of fetches made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RouteSource for MockRouteSource {
    async fn fetch_user_routes(&self, _user_id: &str) -> RouteResult<Option<UserRoutes>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.should_fail {
            return Err(RouteError::Service {
                code: 500,
                message: "Mock Route Service Error: Simulation requested".to_string(),
            });
        }

        Ok(self.payload.clone())
    }
}
