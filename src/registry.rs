use std::sync::Mutex;

use crate::{
    error::{RouteError, RouteResult},
    models::{NativeRoute, Tab},
};

/// RouteRegistry
///
/// The live routing table of one session. Route registration is an in-place
/// mutation; conflict handling belongs to the implementation.
pub trait RouteRegistry: Send {
    /// Inserts one top-level route.
    fn add_route(&mut self, route: NativeRoute) -> RouteResult<()>;

    /// Looks up a registered route by name, searching nested children too.
    fn resolve_name(&self, name: &str) -> Option<&NativeRoute>;

    /// Names of the top-level routes currently held, in table order.
    fn route_names(&self) -> Vec<String>;
}

/// InMemoryRouter
///
/// A routing table kept in memory.
///
/// - Registering a name that already exists replaces the old entry in place.
/// - Path lookups return the first registered match.
/// - Every `add_route` call, replaced or not, is appended to the registration log.
#[derive(Debug, Default)]
pub struct InMemoryRouter {
    routes: Vec<NativeRoute>,
    log: Vec<String>,
}

impl InMemoryRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every registration received, in call order.
    pub fn registration_log(&self) -> &[String] {
        &self.log
    }

    /// Resolves a full path to the first registered route that owns it.
    pub fn resolve_path(&self, path: &str) -> Option<&NativeRoute> {
        find_route(&self.routes, &|route: &NativeRoute| route.path == path)
    }
}

fn find_route<'a>(
    routes: &'a [NativeRoute],
    matches: &dyn Fn(&NativeRoute) -> bool,
) -> Option<&'a NativeRoute> {
    for route in routes {
        if matches(route) {
            return Some(route);
        }
        if let Some(found) = find_route(&route.children, matches) {
            return Some(found);
        }
    }
    None
}

impl RouteRegistry for InMemoryRouter {
    fn add_route(&mut self, route: NativeRoute) -> RouteResult<()> {
        if route.name.is_empty() {
            return Err(RouteError::InvalidRoute {
                name: route.path.clone(),
                reason: "route name must not be empty".to_string(),
            });
        }
        if !route.path.starts_with('/') {
            return Err(RouteError::InvalidRoute {
                name: route.name.clone(),
                reason: format!("top-level path '{}' must start with '/'", route.path),
            });
        }

        self.log.push(route.name.clone());

        match self.routes.iter_mut().find(|existing| existing.name == route.name) {
            Some(existing) => {
                tracing::debug!(route = %route.name, "replacing registered route");
                *existing = route;
            }
            None => self.routes.push(route),
        }
        Ok(())
    }

    fn resolve_name(&self, name: &str) -> Option<&NativeRoute> {
        find_route(&self.routes, &|route: &NativeRoute| route.name == name)
    }

    fn route_names(&self) -> Vec<String> {
        self.routes.iter().map(|route| route.name.clone()).collect()
    }
}

/// TabInitializer
///
/// Opens the initial navigation tab once routes are in place. Implementations
/// must tolerate repeated calls.
pub trait TabInitializer: Send + Sync {
    fn init_home_tab(&self, home: &str, router: &dyn RouteRegistry);
}

/// TabStore
///
/// Holds the open tabs of a session. Opening the home tab twice keeps a single tab.
#[derive(Debug, Default)]
pub struct TabStore {
    tabs: Mutex<Vec<Tab>>,
}

impl TabStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open tabs, first to last. A poisoned lock still yields the tabs it guards.
    pub fn tabs(&self) -> Vec<Tab> {
        self.tabs
            .lock()
            .unwrap_or_else(|poisoned| {
                tracing::warn!("tab store lock poisoned; reading recovered tabs");
                poisoned.into_inner()
            })
            .clone()
    }
}

impl TabInitializer for TabStore {
    fn init_home_tab(&self, home: &str, router: &dyn RouteRegistry) {
        let full_path = router
            .resolve_name(home)
            .map(|route| route.path.clone())
            .unwrap_or_else(|| "/".to_string());

        let mut tabs = self.tabs.lock().unwrap_or_else(|poisoned| {
            tracing::warn!(home, "tab store lock poisoned; recovering tabs");
            poisoned.into_inner()
        });

        if tabs.iter().any(|tab| tab.route_name == home) {
            return;
        }

        tracing::debug!(home, full_path = %full_path, "opening home tab");
        tabs.insert(
            0,
            Tab {
                route_name: home.to_string(),
                full_path,
            },
        );
    }
}
