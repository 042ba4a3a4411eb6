//! Transformation pipeline: pure, order-preserving projections of an
//! authorized route tree into menus, search entries, router-native routes and
//! the keep-alive name list.

use crate::models::{
    AuthorizedRoute, MenuOption, NativeComponent, NativeRoute, RouteComponent, SearchMenu,
};

/// Orders every sibling list by `meta.order`.
///
/// The sort is stable: routes sharing an order, or carrying none, keep their
/// incoming relative position. Unordered routes land after ordered ones.
pub fn sort_routes(routes: &[AuthorizedRoute]) -> Vec<AuthorizedRoute> {
    let mut sorted: Vec<AuthorizedRoute> = routes
        .iter()
        .map(|route| AuthorizedRoute {
            children: sort_routes(&route.children),
            ..route.clone()
        })
        .collect();
    sorted.sort_by_key(|route| route.meta.order.unwrap_or(u32::MAX));
    sorted
}

/// Mirrors the route tree as a menu tree, one option per route.
pub fn to_menus(routes: &[AuthorizedRoute]) -> Vec<MenuOption> {
    routes
        .iter()
        .map(|route| MenuOption {
            key: route.name.clone(),
            label: route.meta.title.clone(),
            route_name: route.name.clone(),
            route_path: route.path.clone(),
            icon: route.meta.icon.clone(),
            local_icon: route.meta.local_icon.clone(),
            hidden: route.meta.hide,
            children: (!route.children.is_empty()).then(|| to_menus(&route.children)),
        })
        .collect()
}

/// Flattens the route tree depth-first (parent before children) into search
/// entries. Every node yields exactly one entry.
pub fn to_search_menus(routes: &[AuthorizedRoute]) -> Vec<SearchMenu> {
    let mut entries = Vec::new();
    collect_search_menus(routes, 0, &mut entries);
    entries
}

fn collect_search_menus(routes: &[AuthorizedRoute], depth: u32, entries: &mut Vec<SearchMenu>) {
    for route in routes {
        entries.push(SearchMenu {
            name: route.name.clone(),
            path: route.path.clone(),
            title: route.meta.title.clone(),
            icon: route.meta.icon.clone(),
            depth,
        });
        collect_search_menus(&route.children, depth + 1, entries);
    }
}

/// Converts each authorized route into its router-native form, recursively.
pub fn to_native_routes(routes: &[AuthorizedRoute]) -> Vec<NativeRoute> {
    routes.iter().map(to_native_route).collect()
}

fn to_native_route(route: &AuthorizedRoute) -> NativeRoute {
    let component = match route.component {
        Some(RouteComponent::Basic) => Some(NativeComponent::BasicLayout),
        Some(RouteComponent::Blank) => Some(NativeComponent::BlankLayout),
        Some(RouteComponent::View) => Some(NativeComponent::View(route.name.clone())),
        Some(RouteComponent::Multi) | None => None,
    };
    let children = to_native_routes(&route.children);

    let redirect = if children.is_empty() {
        None
    } else {
        let target = children
            .iter()
            .find(|child| !child.multi)
            .map(|child| child.path.clone());
        if target.is_none() {
            tracing::warn!(route = %route.name, "multi-level route has no navigable child path");
        }
        Some(target.unwrap_or_else(|| "/".to_string()))
    };

    NativeRoute {
        name: route.name.clone(),
        path: route.path.clone(),
        component,
        redirect,
        multi: route.component == Some(RouteComponent::Multi),
        meta: route.meta.clone(),
        children,
    }
}

/// Names of every keep-alive route, walking the native tree depth-first with
/// parents before their children.
pub fn cache_route_names(routes: &[NativeRoute]) -> Vec<String> {
    let mut names = Vec::new();
    collect_cache_names(routes, &mut names);
    names
}

fn collect_cache_names(routes: &[NativeRoute], names: &mut Vec<String>) {
    for route in routes {
        if route.meta.keep_alive {
            names.push(route.name.clone());
        }
        collect_cache_names(&route.children, names);
    }
}
