use async_trait::async_trait;
use auth_route::{
    MockRouteSource, RouteError, RouteRegistry, RouteResult, RouteSource, RouteStore,
    TabInitializer,
    auth::StaticIdentity,
    catalog::{DEFAULT_HOME, static_routes},
    models::{
        AuthRouteMode, AuthorizedRoute, InitOutcome, InitPhase, NativeRoute, RouteComponent,
        RouteMeta, UserRoutes,
    },
    transform,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// --- Recording Collaborators ---

/// Router double that records every registration and never rejects one.
#[derive(Default)]
struct RecordingRouter {
    added: Vec<NativeRoute>,
}

impl RecordingRouter {
    fn added_names(&self) -> Vec<String> {
        self.added.iter().map(|r| r.name.clone()).collect()
    }
}

impl RouteRegistry for RecordingRouter {
    fn add_route(&mut self, route: NativeRoute) -> RouteResult<()> {
        self.added.push(route);
        Ok(())
    }

    fn resolve_name(&self, name: &str) -> Option<&NativeRoute> {
        self.added.iter().find(|r| r.name == name)
    }

    fn route_names(&self) -> Vec<String> {
        self.added_names()
    }
}

/// Router double that rejects everything.
struct RejectingRouter;

impl RouteRegistry for RejectingRouter {
    fn add_route(&mut self, route: NativeRoute) -> RouteResult<()> {
        Err(RouteError::InvalidRoute {
            name: route.name,
            reason: "rejected by test".to_string(),
        })
    }

    fn resolve_name(&self, _name: &str) -> Option<&NativeRoute> {
        None
    }

    fn route_names(&self) -> Vec<String> {
        vec![]
    }
}

/// Router double that accepts the first route and rejects every later one.
#[derive(Default)]
struct FirstOnlyRouter {
    added: Vec<NativeRoute>,
}

impl RouteRegistry for FirstOnlyRouter {
    fn add_route(&mut self, route: NativeRoute) -> RouteResult<()> {
        if !self.added.is_empty() {
            return Err(RouteError::InvalidRoute {
                name: route.name,
                reason: "router is full".to_string(),
            });
        }
        self.added.push(route);
        Ok(())
    }

    fn resolve_name(&self, name: &str) -> Option<&NativeRoute> {
        self.added.iter().find(|r| r.name == name)
    }

    fn route_names(&self) -> Vec<String> {
        self.added.iter().map(|r| r.name.clone()).collect()
    }
}

/// Tab initializer double that records each home it was asked to open.
#[derive(Default)]
struct RecordingTabs {
    homes: Mutex<Vec<String>>,
}

impl RecordingTabs {
    fn homes(&self) -> Vec<String> {
        self.homes.lock().unwrap().clone()
    }
}

impl TabInitializer for RecordingTabs {
    fn init_home_tab(&self, home: &str, _router: &dyn RouteRegistry) {
        self.homes.lock().unwrap().push(home.to_string());
    }
}

/// Route source whose fetch never completes.
struct StalledSource;

#[async_trait]
impl RouteSource for StalledSource {
    async fn fetch_user_routes(&self, _user_id: &str) -> RouteResult<Option<UserRoutes>> {
        std::future::pending().await
    }
}

// --- Helpers ---

fn leaf(name: &str, keep_alive: bool) -> AuthorizedRoute {
    AuthorizedRoute {
        name: name.to_string(),
        path: format!("/{}", name.replace('_', "/")),
        component: Some(RouteComponent::View),
        meta: RouteMeta {
            title: name.to_string(),
            keep_alive,
            ..RouteMeta::default()
        },
        children: vec![],
    }
}

fn granted_routes() -> Vec<AuthorizedRoute> {
    vec![
        AuthorizedRoute {
            name: "home".to_string(),
            path: "/home".to_string(),
            component: Some(RouteComponent::Basic),
            meta: RouteMeta {
                title: "Home".to_string(),
                ..RouteMeta::default()
            },
            children: vec![leaf("home_overview", true), leaf("home_reports", false)],
        },
        leaf("settings", true),
    ]
}

struct Harness {
    store: RouteStore,
    source: Arc<MockRouteSource>,
    tabs: Arc<RecordingTabs>,
}

fn harness(mode: AuthRouteMode, user_id: &str, source: MockRouteSource) -> Harness {
    let source = Arc::new(source);
    let tabs = Arc::new(RecordingTabs::default());
    let store = RouteStore::new(
        mode,
        Arc::new(StaticIdentity::user(user_id)),
        source.clone(),
        tabs.clone(),
    );
    Harness { store, source, tabs }
}

// --- Tests ---

#[tokio::test]
async fn test_no_identity_leaves_state_untouched() {
    let mut h = harness(
        AuthRouteMode::Dynamic,
        "",
        MockRouteSource::new(Some(UserRoutes {
            home: "settings".to_string(),
            routes: granted_routes(),
        })),
    );
    let before = h.store.state().clone();
    let mut router = RecordingRouter::default();

    let outcome = h.store.init_auth_route(&mut router).await.unwrap();

    assert_eq!(outcome, InitOutcome::NoIdentity);
    assert_eq!(h.store.state(), &before);
    assert!(router.added.is_empty());
    assert!(h.tabs.homes().is_empty());
    assert_eq!(h.source.calls(), 0);
}

#[tokio::test]
async fn test_dynamic_empty_payload_initializes_without_routes() {
    let mut h = harness(AuthRouteMode::Dynamic, "1", MockRouteSource::new(None));
    let mut router = RecordingRouter::default();

    let outcome = h.store.init_auth_route(&mut router).await.unwrap();

    assert_eq!(
        outcome,
        InitOutcome::Initialized {
            home: DEFAULT_HOME.to_string(),
            registered: 0
        }
    );
    let state = h.store.state();
    assert!(state.menus.is_empty());
    assert!(state.search_menus.is_empty());
    assert!(state.cache_routes.is_empty());
    assert_eq!(state.route_home_name, DEFAULT_HOME);
    assert!(h.store.is_inited_auth_route());
    assert!(router.added.is_empty());
    assert_eq!(h.tabs.homes(), vec![DEFAULT_HOME.to_string()]);
}

#[tokio::test]
async fn test_dynamic_payload_drives_state_and_registration() {
    let routes = granted_routes();
    let mut h = harness(
        AuthRouteMode::Dynamic,
        "1",
        MockRouteSource::new(Some(UserRoutes {
            home: "settings".to_string(),
            routes: routes.clone(),
        })),
    );
    let mut router = RecordingRouter::default();

    h.store.init_auth_route(&mut router).await.unwrap();

    let state = h.store.state();
    assert_eq!(state.route_home_name, "settings");
    assert_eq!(state.menus, transform::to_menus(&routes));
    assert_eq!(state.search_menus, transform::to_search_menus(&routes));
    assert_eq!(
        state.cache_routes,
        transform::cache_route_names(&transform::to_native_routes(&routes))
    );
    assert_eq!(state.cache_routes, vec!["home_overview", "settings"]);
    assert_eq!(router.added_names(), vec!["home", "settings"]);
    assert_eq!(h.tabs.homes(), vec!["settings".to_string()]);
    assert_eq!(h.source.calls(), 1);
}

#[tokio::test]
async fn test_static_mode_registers_compiled_routes_for_any_identity() {
    for user_id in ["1", "3", "someone-unknown"] {
        let mut h = harness(AuthRouteMode::Static, user_id, MockRouteSource::new(None));
        let mut router = RecordingRouter::default();

        h.store.init_auth_route(&mut router).await.unwrap();

        let expected: Vec<String> = transform::sort_routes(&static_routes())
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(router.added_names(), expected);
        assert_eq!(h.source.calls(), 0, "static mode must not hit the route source");
    }
}

#[tokio::test]
async fn test_static_routes_can_be_overridden() {
    let h = harness(AuthRouteMode::Static, "1", MockRouteSource::new(None));
    let mut store = h.store.with_static_routes(granted_routes()).with_home("settings");
    let mut router = RecordingRouter::default();

    let outcome = store.init_auth_route(&mut router).await.unwrap();

    assert_eq!(
        outcome,
        InitOutcome::Initialized {
            home: "settings".to_string(),
            registered: 2
        }
    );
    assert_eq!(router.added_names(), vec!["home", "settings"]);
}

#[tokio::test]
async fn test_second_init_is_coalesced_into_a_no_op() {
    let mut h = harness(
        AuthRouteMode::Dynamic,
        "1",
        MockRouteSource::new(Some(UserRoutes {
            home: "settings".to_string(),
            routes: granted_routes(),
        })),
    );
    let mut router = RecordingRouter::default();

    h.store.init_auth_route(&mut router).await.unwrap();
    let second = h.store.init_auth_route(&mut router).await.unwrap();

    assert_eq!(second, InitOutcome::AlreadyInitialized);
    assert_eq!(router.added_names(), vec!["home", "settings"]);
    assert_eq!(h.source.calls(), 1);
    assert_eq!(h.tabs.homes().len(), 1);
}

#[tokio::test]
async fn test_handle_auth_routes_is_unguarded_and_registers_twice() {
    // Direct calls bypass the init phase: the router sees every route twice.
    let mut h = harness(AuthRouteMode::Static, "1", MockRouteSource::new(None));
    let mut router = RecordingRouter::default();
    let routes = granted_routes();

    h.store.handle_auth_routes(&routes, &mut router).unwrap();
    h.store.handle_auth_routes(&routes, &mut router).unwrap();

    assert_eq!(
        router.added_names(),
        vec!["home", "settings", "home", "settings"]
    );
    assert!(!h.store.is_inited_auth_route());
}

#[tokio::test]
async fn test_source_failure_propagates_and_allows_retry() {
    let mut h = harness(AuthRouteMode::Dynamic, "1", MockRouteSource::new_failing());
    let mut router = RecordingRouter::default();

    let result = h.store.init_auth_route(&mut router).await;

    assert!(matches!(result, Err(RouteError::Service { code: 500, .. })));
    assert_eq!(h.store.state().phase, InitPhase::Uninitialized);
    assert!(h.tabs.homes().is_empty());

    // Not wedged: a second attempt reaches the source again.
    let _ = h.store.init_auth_route(&mut router).await;
    assert_eq!(h.source.calls(), 2);
}

#[tokio::test]
async fn test_router_rejection_propagates_unchanged() {
    let mut h = harness(AuthRouteMode::Static, "1", MockRouteSource::new(None));
    let before = h.store.state().clone();

    let result = h.store.init_auth_route(&mut RejectingRouter).await;

    assert!(matches!(result, Err(RouteError::InvalidRoute { .. })));
    assert!(!h.store.is_inited_auth_route());
    assert_eq!(h.store.state(), &before);
    assert!(h.tabs.homes().is_empty());
}

#[tokio::test]
async fn test_partial_registration_failure_keeps_previous_state() {
    let mut h = harness(
        AuthRouteMode::Dynamic,
        "1",
        MockRouteSource::new(Some(UserRoutes {
            home: "settings".to_string(),
            routes: granted_routes(),
        })),
    );
    let before = h.store.state().clone();
    let mut router = FirstOnlyRouter::default();

    let result = h.store.init_auth_route(&mut router).await;

    assert!(matches!(
        result,
        Err(RouteError::InvalidRoute { ref name, .. }) if name == "settings"
    ));
    assert_eq!(router.route_names(), vec!["home"]);

    let state = h.store.state();
    assert_eq!(state, &before);
    assert_eq!(state.phase, InitPhase::Uninitialized);
    assert_eq!(state.route_home_name, DEFAULT_HOME);
    assert!(state.menus.is_empty());
    assert!(state.search_menus.is_empty());
    assert!(state.cache_routes.is_empty());
}

#[test]
fn test_handle_auth_routes_failure_leaves_menus_untouched() {
    let mut h = harness(AuthRouteMode::Static, "1", MockRouteSource::new(None));
    let mut router = RecordingRouter::default();
    h.store.handle_auth_routes(&[leaf("about", true)], &mut router).unwrap();
    let applied = h.store.state().clone();

    let result = h
        .store
        .handle_auth_routes(&granted_routes(), &mut FirstOnlyRouter::default());

    assert!(result.is_err());
    assert_eq!(h.store.state(), &applied);
    assert_eq!(h.store.state().cache_routes, vec!["about"]);
}

#[tokio::test]
async fn test_explicit_order_decides_registration_order() {
    let mut routes = granted_routes();
    routes[1].meta.order = Some(1);
    routes[0].meta.order = Some(2);
    let mut h = harness(
        AuthRouteMode::Dynamic,
        "1",
        MockRouteSource::new(Some(UserRoutes {
            home: "home".to_string(),
            routes,
        })),
    );
    let mut router = RecordingRouter::default();

    h.store.init_auth_route(&mut router).await.unwrap();

    assert_eq!(router.added_names(), vec!["settings", "home"]);
    assert_eq!(h.store.state().menus[0].key, "settings");
}

#[tokio::test]
async fn test_reset_returns_to_a_fresh_session() {
    let mut h = harness(
        AuthRouteMode::Dynamic,
        "1",
        MockRouteSource::new(Some(UserRoutes {
            home: "settings".to_string(),
            routes: granted_routes(),
        })),
    );
    let mut router = RecordingRouter::default();
    let first_session = h.store.session_id();

    h.store.init_auth_route(&mut router).await.unwrap();
    h.store.reset();

    assert_ne!(h.store.session_id(), first_session);
    assert_eq!(h.store.state().phase, InitPhase::Uninitialized);
    assert_eq!(h.store.state().route_home_name, DEFAULT_HOME);
    assert!(h.store.state().menus.is_empty());
    assert_eq!(h.store.state().mode, AuthRouteMode::Dynamic);

    let outcome = h.store.init_auth_route(&mut router).await.unwrap();
    assert!(matches!(outcome, InitOutcome::Initialized { .. }));
}

#[tokio::test]
async fn test_shared_store_coalesces_concurrent_callers() {
    let h = harness(
        AuthRouteMode::Dynamic,
        "1",
        MockRouteSource::new(Some(UserRoutes {
            home: "settings".to_string(),
            routes: granted_routes(),
        })),
    );
    let source = h.source.clone();
    let shared = h.store.into_shared();
    let router = Arc::new(tokio::sync::Mutex::new(RecordingRouter::default()));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let shared = shared.clone();
        let router = router.clone();
        handles.push(tokio::spawn(async move {
            let mut store = shared.lock().await;
            let mut router = router.lock().await;
            store.init_auth_route(&mut *router).await.unwrap()
        }));
    }

    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }

    let initialized = outcomes
        .iter()
        .filter(|o| matches!(o, InitOutcome::Initialized { .. }))
        .count();
    assert_eq!(initialized, 1);
    assert_eq!(source.calls(), 1);
    assert_eq!(router.lock().await.added_names(), vec!["home", "settings"]);
}

#[tokio::test]
async fn test_cache_routes_are_deterministic_across_sessions() {
    let mut first = harness(AuthRouteMode::Static, "1", MockRouteSource::new(None));
    let mut second = harness(AuthRouteMode::Static, "1", MockRouteSource::new(None));

    first
        .store
        .init_auth_route(&mut RecordingRouter::default())
        .await
        .unwrap();
    second
        .store
        .init_auth_route(&mut RecordingRouter::default())
        .await
        .unwrap();

    assert_eq!(first.store.state().cache_routes, second.store.state().cache_routes);
    assert_eq!(
        first.store.state().cache_routes,
        vec!["dashboard_analysis", "multi_menu_first_second"]
    );
}

#[tokio::test]
async fn test_interrupted_init_is_rejected_until_reset() {
    let tabs = Arc::new(RecordingTabs::default());
    let mut store = RouteStore::new(
        AuthRouteMode::Dynamic,
        Arc::new(StaticIdentity::user("1")),
        Arc::new(StalledSource),
        tabs.clone(),
    );
    let mut router = RecordingRouter::default();

    // The stalled fetch is abandoned mid-flight.
    let timed_out =
        tokio::time::timeout(Duration::from_millis(20), store.init_auth_route(&mut router)).await;
    assert!(timed_out.is_err());
    assert_eq!(store.state().phase, InitPhase::Initializing);

    let retry = store.init_auth_route(&mut router).await;
    assert!(matches!(retry, Err(RouteError::InitInProgress)));

    store.reset();
    assert_eq!(store.state().phase, InitPhase::Uninitialized);
    assert!(tabs.homes().is_empty());
}
