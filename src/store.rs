use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    auth::IdentityAccessor,
    catalog::{DEFAULT_HOME, static_routes},
    config::AppConfig,
    error::{RouteError, RouteResult},
    models::{
        AuthRouteMode, AuthorizedRoute, InitOutcome, InitPhase, MenuOption, RouteSnapshot,
        SearchMenu, Tab,
    },
    registry::{RouteRegistry, TabInitializer},
    source::RouteSourceState,
    transform,
};

/// IdentityState
///
/// Shared handle to the identity accessor of a session.
pub type IdentityState = Arc<dyn IdentityAccessor>;

/// TabState
///
/// Shared handle to the tab initializer of a session.
pub type TabState = Arc<dyn TabInitializer>;

/// SharedRouteStore
///
/// A store shared between tasks. The mutex serializes `init_auth_route`
/// callers, so a caller arriving while another is initializing waits and then
/// observes `InitOutcome::AlreadyInitialized`.
pub type SharedRouteStore = Arc<tokio::sync::Mutex<RouteStore>>;

/// RouteState
///
/// The route-authorization state of one session. Everything except `mode`
/// is rewritten by the store's actions; `cache_routes` is only ever derived
/// from the native routes the store registered.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteState {
    /// Set once at creation from configuration.
    pub mode: AuthRouteMode,
    pub phase: InitPhase,
    /// Landing route. The dynamic source overrides it when it answers.
    pub route_home_name: String,
    pub menus: Vec<MenuOption>,
    pub search_menus: Vec<SearchMenu>,
    pub cache_routes: Vec<String>,
}

impl RouteState {
    pub fn new(mode: AuthRouteMode, home: &str) -> Self {
        Self {
            mode,
            phase: InitPhase::Uninitialized,
            route_home_name: home.to_string(),
            menus: Vec::new(),
            search_menus: Vec::new(),
            cache_routes: Vec::new(),
        }
    }

    pub fn is_inited_auth_route(&self) -> bool {
        self.phase == InitPhase::Initialized
    }
}

/// RouteStore
///
/// Owns one session's `RouteState` and drives its one-time auth route
/// initialization: pick the route source by mode, run the transformation
/// pipeline, register native routes with the router, open the home tab.
///
/// A store is created at sign-in and dropped (or `reset`) at sign-out. It is
/// passed explicitly to whoever needs it; there is no process-wide instance.
pub struct RouteStore {
    session_id: Uuid,
    created_at: DateTime<Utc>,
    inited_at: Option<DateTime<Utc>>,
    default_home: String,
    state: RouteState,
    identity: IdentityState,
    source: RouteSourceState,
    tabs: TabState,
    static_routes: Vec<AuthorizedRoute>,
}

impl RouteStore {
    /// Creates a store for a fresh session, with the built-in static routes
    /// and the default home route.
    pub fn new(
        mode: AuthRouteMode,
        identity: IdentityState,
        source: RouteSourceState,
        tabs: TabState,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            created_at: Utc::now(),
            inited_at: None,
            default_home: DEFAULT_HOME.to_string(),
            state: RouteState::new(mode, DEFAULT_HOME),
            identity,
            source,
            tabs,
            static_routes: static_routes(),
        }
    }

    /// Creates a store using the mode and home route from configuration.
    pub fn from_config(
        config: &AppConfig,
        identity: IdentityState,
        source: RouteSourceState,
        tabs: TabState,
    ) -> Self {
        Self::new(config.auth_route_mode, identity, source, tabs).with_home(&config.route_home)
    }

    /// Overrides the default home route.
    pub fn with_home(mut self, home: &str) -> Self {
        self.default_home = home.to_string();
        self.state.route_home_name = home.to_string();
        self
    }

    /// Overrides the compiled-in route list used in static mode.
    pub fn with_static_routes(mut self, routes: Vec<AuthorizedRoute>) -> Self {
        self.static_routes = routes;
        self
    }

    pub fn into_shared(self) -> SharedRouteStore {
        Arc::new(tokio::sync::Mutex::new(self))
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn state(&self) -> &RouteState {
        &self.state
    }

    pub fn is_inited_auth_route(&self) -> bool {
        self.state.is_inited_auth_route()
    }

    /// Runs the transformation pipeline over `routes` and registers the
    /// resulting top-level native routes with `router`, in priority order.
    ///
    /// Siblings are ordered by `meta.order` first; routes without one keep
    /// their incoming position. Nothing here checks the init phase: calling it
    /// twice registers every route twice. Router errors propagate unchanged and
    /// leave the session state untouched; routes the router accepted before the
    /// failure stay with the router.
    ///
    /// Returns the number of top-level routes registered.
    pub fn handle_auth_routes(
        &mut self,
        routes: &[AuthorizedRoute],
        router: &mut dyn RouteRegistry,
    ) -> RouteResult<usize> {
        let routes = transform::sort_routes(routes);

        let menus = transform::to_menus(&routes);
        let search_menus = transform::to_search_menus(&routes);
        let native_routes = transform::to_native_routes(&routes);
        let cache_routes = transform::cache_route_names(&native_routes);

        for route in &native_routes {
            router.add_route(route.clone())?;
        }

        self.state.menus = menus;
        self.state.search_menus = search_menus;
        self.state.cache_routes = cache_routes;

        tracing::debug!(
            registered = native_routes.len(),
            cached = self.state.cache_routes.len(),
            "auth routes registered"
        );
        Ok(native_routes.len())
    }

    /// Fetches the current user's routes from the route source and applies them.
    ///
    /// An empty answer is a silent no-op: no state change, no registration.
    /// Source failures propagate to the caller.
    pub async fn init_dynamic_route(
        &mut self,
        router: &mut dyn RouteRegistry,
    ) -> RouteResult<usize> {
        let user_id = self.identity.user_info().user_id;
        let granted = self.source.fetch_user_routes(&user_id).await?;

        let Some(granted) = granted else {
            tracing::info!(user_id = %user_id, "route source granted no routes");
            return Ok(0);
        };

        let registered = self.handle_auth_routes(&granted.routes, router)?;
        self.state.route_home_name = granted.home;
        Ok(registered)
    }

    /// Applies the compiled-in static route list.
    pub fn init_static_route(&mut self, router: &mut dyn RouteRegistry) -> RouteResult<usize> {
        // TODO: filter static routes by the current user's role once the
        // per-route permission schema is settled; every identity gets the full list today.
        let routes = self.static_routes.clone();
        self.handle_auth_routes(&routes, router)
    }

    /// Entry point: resolves and registers the session's auth routes once.
    ///
    /// - No identity: returns `NoIdentity` without touching anything.
    /// - Already initialized: returns `AlreadyInitialized` without registering.
    /// - A previous attempt never finished (its future was dropped): returns
    ///   `RouteError::InitInProgress` until the session is `reset`.
    /// - A failing branch restores the state it started from (`Uninitialized`)
    ///   and propagates the error.
    ///
    /// On success the home tab is opened and the phase becomes `Initialized`.
    pub async fn init_auth_route(
        &mut self,
        router: &mut dyn RouteRegistry,
    ) -> RouteResult<InitOutcome> {
        let user_id = self.identity.user_info().user_id;
        if user_id.is_empty() {
            tracing::debug!("no identity on session; skipping auth route init");
            return Ok(InitOutcome::NoIdentity);
        }

        match self.state.phase {
            InitPhase::Initialized => return Ok(InitOutcome::AlreadyInitialized),
            InitPhase::Initializing => return Err(RouteError::InitInProgress),
            InitPhase::Uninitialized => {}
        }

        let previous = self.state.clone();
        self.state.phase = InitPhase::Initializing;
        tracing::info!(
            session = %self.session_id,
            user_id = %user_id,
            mode = ?self.state.mode,
            "initializing auth routes"
        );

        let branch = match self.state.mode {
            AuthRouteMode::Dynamic => self.init_dynamic_route(router).await,
            AuthRouteMode::Static => self.init_static_route(router),
        };

        let registered = match branch {
            Ok(registered) => registered,
            Err(e) => {
                tracing::error!(session = %self.session_id, error = %e, "auth route init failed");
                self.state = previous;
                return Err(e);
            }
        };

        self.tabs.init_home_tab(&self.state.route_home_name, &*router);
        self.state.phase = InitPhase::Initialized;
        self.inited_at = Some(Utc::now());

        Ok(InitOutcome::Initialized {
            home: self.state.route_home_name.clone(),
            registered,
        })
    }

    /// Sign-out teardown: back to a fresh, uninitialized state under a new
    /// session id. Routes already pushed into a router are the router's to drop.
    pub fn reset(&mut self) {
        self.state = RouteState::new(self.state.mode, &self.default_home);
        self.session_id = Uuid::new_v4();
        self.created_at = Utc::now();
        self.inited_at = None;
    }

    /// Serializable view of the session for the route API.
    pub fn snapshot(&self, router: &dyn RouteRegistry, tabs: Vec<Tab>) -> RouteSnapshot {
        RouteSnapshot {
            session_id: self.session_id,
            mode: self.state.mode,
            phase: self.state.phase,
            is_inited_auth_route: self.state.is_inited_auth_route(),
            route_home_name: self.state.route_home_name.clone(),
            menus: self.state.menus.clone(),
            search_menus: self.state.search_menus.clone(),
            cache_routes: self.state.cache_routes.clone(),
            registered_routes: router.route_names(),
            tabs,
            created_at: self.created_at,
            inited_at: self.inited_at,
        }
    }
}
