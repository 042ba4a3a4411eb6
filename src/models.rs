use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Route Source Schemas (Authorized Routes) ---

/// RouteComponent
///
/// The layout kind an authorized route declares. The wire names match the
/// route service payload (`"self"` marks a route that renders its own view).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub enum RouteComponent {
    #[serde(rename = "basic")]
    Basic,
    #[serde(rename = "blank")]
    Blank,
    /// Parent of a multi-level menu; owns no component of its own.
    #[serde(rename = "multi")]
    Multi,
    #[serde(rename = "self")]
    View,
}

/// RouteMeta
///
/// Display metadata and behavior hints carried by every authorized route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RouteMeta {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_icon: Option<String>,
    #[serde(default)]
    pub requires_auth: bool,
    /// Caching hint: keep the rendered component alive when navigating away.
    #[serde(default)]
    pub keep_alive: bool,
    /// Hidden routes stay registered but are flagged so menus can skip them.
    #[serde(default)]
    pub hide: bool,
    /// Explicit sibling priority. Lower registers first; unset sorts last.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

/// AuthorizedRoute
///
/// A route definition as granted to one identity. Tree-shaped: the parent owns
/// its children by value, so no back-references (and no cycles) can exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AuthorizedRoute {
    /// Unique route key.
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<RouteComponent>,
    pub meta: RouteMeta,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[schema(no_recursion)]
    pub children: Vec<AuthorizedRoute>,
}

/// UserRoutes
///
/// Payload of the dynamic route source: the authorized routes for one user
/// plus the route key the session should land on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserRoutes {
    pub home: String,
    pub routes: Vec<AuthorizedRoute>,
}

/// ServiceResponse
///
/// The envelope every route service reply is wrapped in. `code == 0` is
/// success; an absent `data` on success means "nothing granted".
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ServiceResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ServiceResponse<T> {
    pub fn ok(data: Option<T>) -> Self {
        Self {
            code: 0,
            message: "ok".to_string(),
            data,
        }
    }
}

/// UserRoutesRequest
///
/// Input payload for the route service (POST /getUserRoutes).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserRoutesRequest {
    #[schema(example = "1")]
    pub user_id: String,
}

/// UserInfo
///
/// The identity the current session runs as. An empty `user_id` means
/// "no identity" and short-circuits route initialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UserInfo {
    pub user_id: String,
    pub user_name: String,
    pub user_role: String,
}

// --- Derived Schemas (Transformation Pipeline Output) ---

/// MenuOption
///
/// UI-facing mirror of one authorized route node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MenuOption {
    pub key: String,
    pub label: String,
    pub route_name: String,
    pub route_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_icon: Option<String>,
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(no_recursion)]
    pub children: Option<Vec<MenuOption>>,
}

/// SearchMenu
///
/// Flat search-index entry; one per authorized route at any depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SearchMenu {
    pub name: String,
    pub path: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Nesting depth of the source route; top-level routes are 0.
    pub depth: u32,
}

/// NativeComponent
///
/// What the router mounts for a native route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase", tag = "type", content = "name")]
#[ts(export)]
pub enum NativeComponent {
    BasicLayout,
    BlankLayout,
    /// The page view registered under the route's own name.
    View(String),
}

/// NativeRoute
///
/// Router-native route object, derived 1:1 (children included) from an
/// authorized route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NativeRoute {
    pub name: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<NativeComponent>,
    /// First non-multi child path, set on every route that has children.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    /// True for multi-level parents that mount nothing themselves.
    pub multi: bool,
    pub meta: RouteMeta,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[schema(no_recursion)]
    pub children: Vec<NativeRoute>,
}

// --- Session Schemas ---

/// AuthRouteMode
///
/// Where authorized routes come from: compiled into the app, or fetched per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum AuthRouteMode {
    #[default]
    Static,
    Dynamic,
}

impl AuthRouteMode {
    /// Parses the configured mode; anything other than `dynamic` is static.
    pub fn from_setting(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "dynamic" => AuthRouteMode::Dynamic,
            _ => AuthRouteMode::Static,
        }
    }
}

/// InitPhase
///
/// Monotonic initialization state of one session's auth routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum InitPhase {
    #[default]
    Uninitialized,
    Initializing,
    Initialized,
}

/// InitOutcome
///
/// What a call to `init_auth_route` ended up doing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", tag = "outcome")]
#[ts(export)]
pub enum InitOutcome {
    /// No identity on the session; nothing was touched.
    NoIdentity,
    /// The session was already initialized; nothing was registered again.
    AlreadyInitialized,
    /// Routes were resolved (possibly none) and the home tab opened.
    Initialized { home: String, registered: usize },
}

/// Tab
///
/// A navigation tab opened by the tab initializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Tab {
    pub route_name: String,
    pub full_path: String,
}

/// RouteSnapshot
///
/// Read-only view of a session's route state, returned by POST /route/init.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RouteSnapshot {
    pub session_id: Uuid,
    pub mode: AuthRouteMode,
    pub phase: InitPhase,
    pub is_inited_auth_route: bool,
    pub route_home_name: String,
    pub menus: Vec<MenuOption>,
    pub search_menus: Vec<SearchMenu>,
    pub cache_routes: Vec<String>,
    /// Names of the top-level routes the router holds, in registration order.
    pub registered_routes: Vec<String>,
    pub tabs: Vec<Tab>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string | null")]
    pub inited_at: Option<DateTime<Utc>>,
}
