use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

use crate::config::RouteSettings;
use crate::session::cookie::read_auth_cookie;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Only meaningful without a session (login, signup, ...).
    AuthOnly,
    /// Requires a session.
    Protected,
    Unrestricted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect {
        target: String,
        query: Option<(String, String)>,
    },
}

impl GuardDecision {
    /// `Location` header value for a redirect.
    pub fn location(&self) -> Option<String> {
        match self {
            GuardDecision::Allow => None,
            GuardDecision::Redirect {
                target,
                query: None,
            } => Some(target.clone()),
            GuardDecision::Redirect {
                target,
                query: Some((key, value)),
            } => Some(format!("{}?{}={}", target, key, urlencoding::encode(value))),
        }
    }
}

/// Static route classification driving the guard.
#[derive(Debug, Clone)]
pub struct RouteRules {
    auth_routes: Vec<String>,
    protected_routes: Vec<String>,
    excluded_prefixes: Vec<String>,
    login_path: String,
    home_path: String,
}

impl RouteRules {
    pub fn from_settings(settings: &RouteSettings) -> Self {
        Self {
            auth_routes: settings.auth_routes.clone(),
            protected_routes: settings.protected_routes.clone(),
            excluded_prefixes: settings.excluded_prefixes.clone(),
            login_path: settings.login_path.clone(),
            home_path: settings.home_path.clone(),
        }
    }

    /// Assets, API calls and the like bypass the guard entirely.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.excluded_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        if self.auth_routes.iter().any(|route| matches_route(path, route)) {
            RouteClass::AuthOnly
        } else if self
            .protected_routes
            .iter()
            .any(|route| matches_route(path, route))
        {
            RouteClass::Protected
        } else {
            RouteClass::Unrestricted
        }
    }

    pub fn evaluate(&self, path: &str, authenticated: bool) -> GuardDecision {
        match (self.classify(path), authenticated) {
            (RouteClass::AuthOnly, true) => GuardDecision::Redirect {
                target: self.home_path.clone(),
                query: None,
            },
            (RouteClass::Protected, false) => GuardDecision::Redirect {
                target: self.login_path.clone(),
                query: Some(("redirect".to_string(), path.to_string())),
            },
            _ => GuardDecision::Allow,
        }
    }
}

impl Default for RouteRules {
    fn default() -> Self {
        Self::from_settings(&RouteSettings::default())
    }
}

/// `route` matches itself and anything below it: `/user` covers
/// `/user/profile` but not `/users`.
fn matches_route(path: &str, route: &str) -> bool {
    let route = route.trim_end_matches('/');
    if route.is_empty() {
        return path == "/";
    }
    match path.strip_prefix(route) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

pub async fn route_guard_middleware(
    State(rules): State<Arc<RouteRules>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if rules.is_excluded(&path) {
        return next.run(request).await;
    }

    let authenticated = read_auth_cookie(request.headers()).is_some();
    let decision = rules.evaluate(&path, authenticated);

    match decision.location() {
        Some(location) => {
            tracing::debug!(path = %path, authenticated, location = %location, "Route guard redirect");
            Redirect::temporary(&location).into_response()
        }
        None => next.run(request).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RouteRules {
        RouteRules::default()
    }

    #[test]
    fn classifies_by_path_prefix() {
        let rules = rules();
        assert_eq!(rules.classify("/login"), RouteClass::AuthOnly);
        assert_eq!(rules.classify("/reset-password/abc"), RouteClass::AuthOnly);
        assert_eq!(rules.classify("/user/profile"), RouteClass::Protected);
        assert_eq!(rules.classify("/post-ad"), RouteClass::Protected);
        assert_eq!(rules.classify("/users"), RouteClass::Unrestricted);
        assert_eq!(rules.classify("/ads/cars"), RouteClass::Unrestricted);
        assert_eq!(rules.classify("/"), RouteClass::Unrestricted);
    }

    #[test]
    fn anonymous_visitor_is_sent_to_login_with_return_path() {
        let decision = rules().evaluate("/user/profile", false);
        assert_eq!(
            decision.location().as_deref(),
            Some("/login?redirect=%2Fuser%2Fprofile")
        );
    }

    #[test]
    fn signed_in_user_is_sent_home_from_auth_pages() {
        let decision = rules().evaluate("/login", true);
        assert_eq!(
            decision,
            GuardDecision::Redirect {
                target: "/".to_string(),
                query: None
            }
        );
        assert_eq!(decision.location().as_deref(), Some("/"));
    }

    #[test]
    fn everything_else_passes() {
        let rules = rules();
        assert_eq!(rules.evaluate("/login", false), GuardDecision::Allow);
        assert_eq!(rules.evaluate("/user/profile", true), GuardDecision::Allow);
        assert_eq!(rules.evaluate("/ads/123", false), GuardDecision::Allow);
        assert_eq!(rules.evaluate("/ads/123", true), GuardDecision::Allow);
    }

    #[test]
    fn exclusions_are_prefix_matches() {
        let rules = rules();
        assert!(rules.is_excluded("/_next/static/chunks/main.js"));
        assert!(rules.is_excluded("/api/session/cookie"));
        assert!(rules.is_excluded("/favicon.ico"));
        assert!(rules.is_excluded("/metrics"));
        assert!(!rules.is_excluded("/user/profile"));
    }

    #[test]
    fn trailing_slash_routes_match() {
        assert!(matches_route("/chat/42", "/chat/"));
        assert!(!matches_route("/chatter", "/chat"));
        assert!(matches_route("/", "/"));
        assert!(!matches_route("/ads", "/"));
    }
}
