use secrecy::Secret;
use serde::Deserialize;
use service_core::error::AppError;

use crate::session::cookie::resolve_max_age;

pub const CRATE_DIR: &str = "marketplace-frontend";

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    #[serde(default)]
    pub auth_cookie: AuthCookieSettings,
    #[serde(default)]
    pub routes: RouteSettings,
    #[serde(default)]
    pub observability: ObservabilitySettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Directory holding the compiled web client.
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
}

fn default_public_dir() -> String {
    "marketplace-frontend/public".to_string()
}

#[derive(Deserialize, Clone, Debug)]
pub struct BackendSettings {
    /// Base URL of the BuyOrSell REST API.
    pub url: String,
    /// Sent as `x-api-key` when present.
    #[serde(default)]
    pub api_key: Option<Secret<String>>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    15
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct AuthCookieSettings {
    /// Raw so that a malformed value degrades to the default instead of
    /// failing the whole configuration load.
    #[serde(default)]
    pub max_age: Option<String>,
}

impl AuthCookieSettings {
    pub fn max_age_seconds(&self) -> i64 {
        resolve_max_age(self.max_age.as_deref())
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct RouteSettings {
    #[serde(default = "default_auth_routes")]
    pub auth_routes: Vec<String>,
    #[serde(default = "default_protected_routes")]
    pub protected_routes: Vec<String>,
    #[serde(default = "default_excluded_prefixes")]
    pub excluded_prefixes: Vec<String>,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    #[serde(default = "default_home_path")]
    pub home_path: String,
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            auth_routes: default_auth_routes(),
            protected_routes: default_protected_routes(),
            excluded_prefixes: default_excluded_prefixes(),
            login_path: default_login_path(),
            home_path: default_home_path(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_auth_routes() -> Vec<String> {
    strings(&[
        "/login",
        "/signup",
        "/forgot-password",
        "/reset-password",
        "/verify-email",
    ])
}

fn default_protected_routes() -> Vec<String> {
    strings(&[
        "/user",
        "/post-ad",
        "/chat",
        "/my-ads",
        "/favorites",
        "/notifications",
        "/payments",
        "/organizations/manage",
    ])
}

fn default_excluded_prefixes() -> Vec<String> {
    strings(&[
        "/_next/static",
        "/_next/image",
        "/static",
        "/api",
        "/favicon.ico",
        "/health",
        "/metrics",
    ])
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_home_path() -> String {
    "/".to_string()
}

#[derive(Deserialize, Clone, Debug)]
pub struct ObservabilitySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for ObservabilitySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

pub fn get_configuration() -> Result<Settings, AppError> {
    service_core::config::load_settings(CRATE_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_max_age_defaults_when_unset_or_invalid() {
        assert_eq!(AuthCookieSettings::default().max_age_seconds(), 86_400);

        let invalid = AuthCookieSettings {
            max_age: Some("tomorrow".to_string()),
        };
        assert_eq!(invalid.max_age_seconds(), 86_400);

        let configured = AuthCookieSettings {
            max_age: Some("604800".to_string()),
        };
        assert_eq!(configured.max_age_seconds(), 604_800);
    }

    #[test]
    fn partial_route_settings_keep_defaults() {
        let routes: RouteSettings =
            serde_json::from_str(r#"{"protected_routes": ["/dashboard"]}"#).unwrap();

        assert_eq!(routes.protected_routes, vec!["/dashboard".to_string()]);
        assert_eq!(routes.auth_routes, default_auth_routes());
        assert_eq!(routes.login_path, "/login");
    }
}
