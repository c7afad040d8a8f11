use reqwest::{header::HeaderMap, Client, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::BackendSettings;
use crate::models::envelope::{ApiResponse, ErrorEnvelope};
use crate::region::EmirateStore;
use crate::services::endpoints;
use crate::session::TokenStore;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const EMIRATE_HEADER: &str = "x-emirate";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Backend responded with {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Failed to decode response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    #[error("Unknown endpoint '{0}'")]
    UnknownEndpoint(String),

    #[error("Endpoint '{endpoint}' needs parameter '{param}'")]
    MissingParam { endpoint: String, param: String },
}

impl ApiError {
    /// The backend refused the credentials attached to the request.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(
            self,
            ApiError::Status { status, .. }
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
        )
    }

    /// Message suitable for inline error text.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status {
                message: Some(message),
                ..
            } => message.clone(),
            ApiError::Transport(_) => "Network error, please try again".to_string(),
            _ => "Something went wrong, please try again".to_string(),
        }
    }
}

/// Thin client for the BuyOrSell REST API.
///
/// Attaches the API key, the session's bearer token and the selected
/// emirate to every request.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    settings: BackendSettings,
    session: Option<Arc<TokenStore>>,
    region: Option<Arc<EmirateStore>>,
}

impl ApiClient {
    pub fn new(settings: BackendSettings) -> Result<Self, ApiError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;
        Ok(Self::with_client(client, settings))
    }

    pub fn with_client(client: Client, settings: BackendSettings) -> Self {
        Self {
            client,
            settings,
            session: None,
            region: None,
        }
    }

    pub fn with_session(mut self, session: Arc<TokenStore>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn with_region(mut self, region: Arc<EmirateStore>) -> Self {
        self.region = Some(region);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.settings.url
    }

    pub fn http_client(&self) -> &Client {
        &self.client
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        key: &str,
        params: &[(&str, &str)],
    ) -> Result<ApiResponse<T>, ApiError> {
        self.call::<(), T>(key, params, &[], None).await
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        key: &str,
        params: &[(&str, &str)],
        query: &[(String, String)],
    ) -> Result<ApiResponse<T>, ApiError> {
        self.call::<(), T>(key, params, query, None).await
    }

    pub async fn send<B, T>(
        &self,
        key: &str,
        params: &[(&str, &str)],
        body: &B,
    ) -> Result<ApiResponse<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call(key, params, &[], Some(body)).await
    }

    async fn call<B, T>(
        &self,
        key: &str,
        params: &[(&str, &str)],
        query: &[(String, String)],
        body: Option<&B>,
    ) -> Result<ApiResponse<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let endpoint = endpoints::lookup(key)?;
        let url = format!(
            "{}{}",
            self.settings.url.trim_end_matches('/'),
            endpoint.render(params)?
        );

        let mut request = self
            .client
            .request(endpoint.method.as_reqwest(), &url)
            .headers(self.default_headers().await);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = self.dispatch(request, &url).await?;
        let status = response.status();

        if !status.is_success() {
            let envelope = response.json::<ErrorEnvelope>().await.unwrap_or_default();
            let message = envelope.message_text();
            tracing::warn!(endpoint = %key, status = %status, message = ?message, "Backend request rejected");
            return Err(ApiError::Status { status, message });
        }

        response
            .json::<ApiResponse<T>>()
            .await
            .map_err(|e| ApiError::Decode {
                endpoint: key.to_string(),
                reason: e.to_string(),
            })
    }

    async fn dispatch(&self, request: RequestBuilder, url: &str) -> Result<reqwest::Response, ApiError> {
        request.send().await.map_err(|e| {
            tracing::error!("Failed to send request to {}: {}", url, e);
            ApiError::Transport(e)
        })
    }

    async fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Some(api_key) = &self.settings.api_key {
            if let Ok(value) = api_key.expose_secret().parse() {
                headers.insert(API_KEY_HEADER, value);
            }
        }

        if let Some(session) = &self.session {
            if let Some(token) = session.access_token().await {
                if let Ok(value) = format!("Bearer {}", token).parse() {
                    headers.insert(reqwest::header::AUTHORIZATION, value);
                }
            }
        }

        if let Some(region) = &self.region {
            let emirate = region.selected();
            if !emirate.is_empty() {
                if let Ok(value) = emirate.parse() {
                    headers.insert(EMIRATE_HEADER, value);
                }
            }
        }

        headers
    }
}
