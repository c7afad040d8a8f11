//! Backend endpoint table.
//!
//! Each entry maps a key to a URL template and, for cacheable reads, the
//! query namespace its responses are cached under plus the invalidation
//! group that namespace belongs to.

use crate::cache::{InvalidationGroup, QueryCache, QueryKey};
use crate::services::api_client::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Endpoint {
    pub key: &'static str,
    pub method: HttpMethod,
    pub template: &'static str,
    pub namespace: Option<&'static str>,
    pub group: Option<InvalidationGroup>,
}

const fn command(key: &'static str, method: HttpMethod, template: &'static str) -> Endpoint {
    Endpoint {
        key,
        method,
        template,
        namespace: None,
        group: None,
    }
}

const fn query(
    key: &'static str,
    template: &'static str,
    namespace: &'static str,
    group: Option<InvalidationGroup>,
) -> Endpoint {
    Endpoint {
        key,
        method: HttpMethod::Get,
        template,
        namespace: Some(namespace),
        group,
    }
}

const REGION: Option<InvalidationGroup> = Some(InvalidationGroup::RegionScoped);
const USER: Option<InvalidationGroup> = Some(InvalidationGroup::UserScoped);

pub const AUTH_LOGIN: &str = "auth.login";
pub const AUTH_SIGNUP: &str = "auth.signup";
pub const AUTH_SOCIAL_LOGIN: &str = "auth.social_login";
pub const AUTH_REFRESH: &str = "auth.refresh";
pub const AUTH_LOGOUT: &str = "auth.logout";
pub const AUTH_FORGOT_PASSWORD: &str = "auth.forgot_password";
pub const AUTH_RESET_PASSWORD: &str = "auth.reset_password";
pub const USER_PROFILE: &str = "user.profile";
pub const HOME_SECTIONS: &str = "home.sections";
pub const ADS_LIST: &str = "ads.list";
pub const ADS_BY_CATEGORY: &str = "ads.by_category";
pub const AD_DETAIL: &str = "ad.detail";

pub static ENDPOINTS: &[Endpoint] = &[
    command(AUTH_LOGIN, HttpMethod::Post, "/auth/login"),
    command(AUTH_SIGNUP, HttpMethod::Post, "/auth/signup"),
    command(AUTH_SOCIAL_LOGIN, HttpMethod::Post, "/auth/social-login"),
    command(AUTH_REFRESH, HttpMethod::Post, "/auth/refresh-token"),
    command(AUTH_LOGOUT, HttpMethod::Post, "/auth/logout"),
    command(AUTH_FORGOT_PASSWORD, HttpMethod::Post, "/auth/forgot-password"),
    command(AUTH_RESET_PASSWORD, HttpMethod::Post, "/auth/reset-password/{token}"),
    query(USER_PROFILE, "/user/profile", "user", USER),
    command("user.update_profile", HttpMethod::Patch, "/user/profile"),
    query(HOME_SECTIONS, "/home", "home", REGION),
    query(ADS_LIST, "/ads", "ads", REGION),
    query(ADS_BY_CATEGORY, "/ads/category/{slug}", "ads", REGION),
    query("ads.mine", "/ads/my-ads", "my-ads", USER),
    query(AD_DETAIL, "/ads/{id}", "ad", REGION),
    command("ad.create", HttpMethod::Post, "/ads"),
    command("ad.update", HttpMethod::Put, "/ads/{id}"),
    command("ad.delete", HttpMethod::Delete, "/ads/{id}"),
    query("categories.list", "/categories", "categories", None),
    query("jobs.list", "/jobs", "jobs", None),
    query("organizations.detail", "/organizations/{id}", "organization", None),
    query("chat.conversations", "/chat/conversations", "chat", USER),
    query("favorites.list", "/favorites", "favorites", USER),
];

pub fn lookup(key: &str) -> Result<&'static Endpoint, ApiError> {
    ENDPOINTS
        .iter()
        .find(|endpoint| endpoint.key == key)
        .ok_or_else(|| ApiError::UnknownEndpoint(key.to_string()))
}

/// Distinct namespaces declared for `group`, in table order.
pub fn group_namespaces(group: InvalidationGroup) -> Vec<&'static str> {
    let mut namespaces = Vec::new();
    for endpoint in ENDPOINTS.iter().filter(|e| e.group == Some(group)) {
        if let Some(namespace) = endpoint.namespace {
            if !namespaces.contains(&namespace) {
                namespaces.push(namespace);
            }
        }
    }
    namespaces
}

/// Register every declared namespace with its invalidation group.
pub fn register_invalidation_groups(cache: &QueryCache) {
    for endpoint in ENDPOINTS {
        if let (Some(namespace), Some(group)) = (endpoint.namespace, endpoint.group) {
            cache.register_group(group, QueryKey::new([namespace]));
        }
    }
}

impl Endpoint {
    /// Substitute `{name}` placeholders with URL-encoded values.
    pub fn render(&self, params: &[(&str, &str)]) -> Result<String, ApiError> {
        let mut path = String::with_capacity(self.template.len());
        let mut rest = self.template;

        while let Some(start) = rest.find('{') {
            let end = rest[start..]
                .find('}')
                .map(|offset| start + offset)
                .ok_or_else(|| ApiError::MissingParam {
                    endpoint: self.key.to_string(),
                    param: rest[start + 1..].to_string(),
                })?;
            let name = &rest[start + 1..end];
            let value = params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
                .ok_or_else(|| ApiError::MissingParam {
                    endpoint: self.key.to_string(),
                    param: name.to_string(),
                })?;

            path.push_str(&rest[..start]);
            path.push_str(&urlencoding::encode(value));
            rest = &rest[end + 1..];
        }
        path.push_str(rest);
        Ok(path)
    }

    /// Cache key for a read of this endpoint: namespace then the values
    /// that distinguish one request from another.
    pub fn query_key(&self, parts: &[&str]) -> Option<QueryKey> {
        let namespace = self.namespace?;
        Some(QueryKey::new(
            std::iter::once(namespace).chain(parts.iter().copied()),
        ))
    }
}
