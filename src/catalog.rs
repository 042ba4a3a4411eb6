//! Built-in route definitions and the role grants the route service hands out.

use std::collections::HashMap;

use crate::models::{AuthorizedRoute, RouteComponent, RouteMeta, UserInfo, UserRoutes};

/// Route key the session lands on when no source overrides it.
pub const DEFAULT_HOME: &str = "dashboard_analysis";

fn route(
    name: &str,
    path: &str,
    component: RouteComponent,
    meta: RouteMeta,
    children: Vec<AuthorizedRoute>,
) -> AuthorizedRoute {
    AuthorizedRoute {
        name: name.to_string(),
        path: path.to_string(),
        component: Some(component),
        meta,
        children,
    }
}

fn meta(title: &str, icon: &str) -> RouteMeta {
    RouteMeta {
        title: title.to_string(),
        icon: Some(icon.to_string()),
        requires_auth: true,
        ..RouteMeta::default()
    }
}

fn page(name: &str, path: &str, title: &str, icon: &str) -> AuthorizedRoute {
    route(name, path, RouteComponent::View, meta(title, icon), vec![])
}

/// The route list compiled into the application and used in static mode.
pub fn static_routes() -> Vec<AuthorizedRoute> {
    vec![
        route(
            "dashboard",
            "/dashboard",
            RouteComponent::Basic,
            RouteMeta {
                order: Some(1),
                ..meta("Dashboard", "mdi:monitor-dashboard")
            },
            vec![
                route(
                    "dashboard_analysis",
                    "/dashboard/analysis",
                    RouteComponent::View,
                    RouteMeta {
                        keep_alive: true,
                        ..meta("Analysis", "icon-park-outline:analysis")
                    },
                    vec![],
                ),
                page(
                    "dashboard_workbench",
                    "/dashboard/workbench",
                    "Workbench",
                    "icon-park-outline:workbench",
                ),
            ],
        ),
        route(
            "document",
            "/document",
            RouteComponent::Basic,
            RouteMeta {
                order: Some(2),
                ..meta("Document", "carbon:document")
            },
            vec![
                page("document_vue", "/document/vue", "Vue Docs", "logos:vue"),
                page("document_vite", "/document/vite", "Vite Docs", "logos:vitejs"),
            ],
        ),
        route(
            "exception",
            "/exception",
            RouteComponent::Basic,
            RouteMeta {
                order: Some(7),
                ..meta("Exception", "ant-design:exception-outlined")
            },
            vec![
                page("exception_403", "/exception/403", "403", "ic:baseline-block"),
                page("exception_404", "/exception/404", "404", "ic:baseline-web-asset-off"),
                page("exception_500", "/exception/500", "500", "ic:baseline-wifi-off"),
            ],
        ),
        route(
            "multi_menu",
            "/multi-menu",
            RouteComponent::Basic,
            RouteMeta {
                order: Some(8),
                ..meta("Multi Menu", "carbon:menu")
            },
            vec![
                route(
                    "multi_menu_first",
                    "/multi-menu/first",
                    RouteComponent::Multi,
                    meta("First Level", "mdi:menu"),
                    vec![route(
                        "multi_menu_first_second",
                        "/multi-menu/first/second",
                        RouteComponent::View,
                        RouteMeta {
                            keep_alive: true,
                            ..meta("Second Level", "mdi:menu")
                        },
                        vec![],
                    )],
                ),
                page(
                    "multi_menu_second",
                    "/multi-menu/second",
                    "First Level Page",
                    "mdi:menu",
                ),
            ],
        ),
        route(
            "about",
            "/about",
            RouteComponent::View,
            RouteMeta {
                order: Some(10),
                ..meta("About", "fluent:book-information-24-regular")
            },
            vec![],
        ),
    ]
}

/// CatalogUser
///
/// A user the route service knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogUser {
    pub id: String,
    pub name: String,
    pub role: String,
}

/// RoleGrant
///
/// What a role may see: its landing route and the top-level routes granted.
/// `routes: None` grants the whole catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrant {
    pub home: String,
    pub routes: Option<Vec<String>>,
}

/// RouteCatalog
///
/// The route service's view of the world: every route it can hand out, the
/// users it knows and which role sees what.
#[derive(Debug, Clone)]
pub struct RouteCatalog {
    routes: Vec<AuthorizedRoute>,
    users: Vec<CatalogUser>,
    grants: HashMap<String, RoleGrant>,
}

impl RouteCatalog {
    pub fn new(
        routes: Vec<AuthorizedRoute>,
        users: Vec<CatalogUser>,
        grants: HashMap<String, RoleGrant>,
    ) -> Self {
        Self {
            routes,
            users,
            grants,
        }
    }

    /// The catalog served out of the box: the static routes, three demo users
    /// and the `super` / `admin` / `user` grants.
    pub fn builtin() -> Self {
        let user = |id: &str, name: &str, role: &str| CatalogUser {
            id: id.to_string(),
            name: name.to_string(),
            role: role.to_string(),
        };
        let names = |list: &[&str]| -> Option<Vec<String>> {
            Some(list.iter().map(|n| n.to_string()).collect())
        };

        let grants = HashMap::from([
            (
                "super".to_string(),
                RoleGrant {
                    home: DEFAULT_HOME.to_string(),
                    routes: None,
                },
            ),
            (
                "admin".to_string(),
                RoleGrant {
                    home: DEFAULT_HOME.to_string(),
                    routes: names(&["dashboard", "document", "exception", "about"]),
                },
            ),
            (
                "user".to_string(),
                RoleGrant {
                    home: "dashboard_workbench".to_string(),
                    routes: names(&["dashboard", "about"]),
                },
            ),
        ]);

        Self::new(
            static_routes(),
            vec![
                user("1", "Soybean", "super"),
                user("2", "Admin", "admin"),
                user("3", "User", "user"),
            ],
            grants,
        )
    }

    pub fn find_user(&self, id: &str) -> Option<&CatalogUser> {
        self.users.iter().find(|user| user.id == id)
    }

    /// Identity record for a known user.
    pub fn user_info(&self, id: &str) -> Option<UserInfo> {
        self.find_user(id).map(|user| UserInfo {
            user_id: user.id.clone(),
            user_name: user.name.clone(),
            user_role: user.role.clone(),
        })
    }

    /// Routes granted to `user_id`, or `None` when the user is unknown or
    /// their role has no grant.
    pub fn user_routes(&self, user_id: &str) -> Option<UserRoutes> {
        let user = self.find_user(user_id)?;
        let grant = self.grants.get(&user.role)?;

        let routes = match &grant.routes {
            None => self.routes.clone(),
            Some(allowed) => self
                .routes
                .iter()
                .filter(|route| allowed.contains(&route.name))
                .cloned()
                .collect(),
        };

        Some(UserRoutes {
            home: grant.home.clone(),
            routes,
        })
    }
}
