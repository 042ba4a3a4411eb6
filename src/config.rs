use std::env;

use crate::{catalog::DEFAULT_HOME, models::AuthRouteMode};

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at
/// startup and immutable afterwards; in particular the auth route mode never
/// changes for the lifetime of the process.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the local `x-user-id` bypass and log format.
    pub env: Env,
    // Where authorized routes come from: compiled-in or fetched per user.
    pub auth_route_mode: AuthRouteMode,
    // Landing route used until a dynamic source overrides it.
    pub route_home: String,
    // Base URL of the remote route service. `None` serves grants from the in-process catalog.
    pub route_service_url: Option<String>,
    // Secret key used to validate incoming JWTs.
    pub jwt_secret: String,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
}

/// Env
///
/// The runtime context: local development or hardened production.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe, non-panicking configuration for tests.
    fn default() -> Self {
        Self {
            env: Env::Local,
            auth_route_mode: AuthRouteMode::Static,
            route_home: DEFAULT_HOME.to_string(),
            route_service_url: None,
            jwt_secret: "super-secure-test-secret-value-local".to_string(),
            bind_addr: "0.0.0.0:3200".to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every setting from the environment (call `dotenv` first).
    ///
    /// # Panics
    /// Panics in production when `JWT_SECRET` is missing, so the service never
    /// starts with a guessable signing key.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match env {
            Env::Production => {
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production.")
            }
            Env::Local => env::var("JWT_SECRET")
                .unwrap_or_else(|_| "super-secure-test-secret-value-local".to_string()),
        };

        let auth_route_mode = env::var("AUTH_ROUTE_MODE")
            .map(|value| AuthRouteMode::from_setting(&value))
            .unwrap_or_default();

        Self {
            env,
            auth_route_mode,
            route_home: env::var("ROUTE_HOME")
                .ok()
                .filter(|home| !home.is_empty())
                .unwrap_or_else(|| DEFAULT_HOME.to_string()),
            route_service_url: env::var("ROUTE_SERVICE_URL")
                .ok()
                .filter(|url| !url.is_empty()),
            jwt_secret,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3200".to_string()),
        }
    }
}
