pub mod cache;
pub mod config;
pub mod filters;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod region;
pub mod services;
pub mod session;
pub mod startup;
pub mod storage;
pub mod utils;

use config::Settings;
use middleware::route_guard::RouteRules;
use std::sync::Arc;

/// Shared state of the front server.
#[derive(Clone)]
pub struct AppState {
    pub route_rules: Arc<RouteRules>,
    /// Resolved `max-age` for the auth cookie, in seconds.
    pub cookie_max_age: i64,
}

impl AppState {
    pub fn new(route_rules: Arc<RouteRules>, cookie_max_age: i64) -> Self {
        Self {
            route_rules,
            cookie_max_age,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Arc::new(RouteRules::from_settings(&settings.routes)),
            settings.auth_cookie.max_age_seconds(),
        )
    }
}
