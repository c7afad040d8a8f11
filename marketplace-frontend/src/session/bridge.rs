//! Client half of the cookie bridge.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;

pub const COOKIE_BRIDGE_PATH: &str = "/api/session/cookie";

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Cookie bridge request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Cookie bridge rejected the request with status {0}")]
    Rejected(StatusCode),
}

/// Mirrors the access token into the HTTP-only auth cookie.
///
/// A successful `write` guarantees the cookie accompanies the next request,
/// not the one currently in flight.
#[async_trait]
pub trait CookieBridge: Send + Sync {
    async fn write(&self, access_token: &str) -> Result<(), BridgeError>;
    async fn delete(&self) -> Result<(), BridgeError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WriteCookieRequest<'a> {
    access_token: &'a str,
}

/// Calls the front server's cookie endpoints. Share the client with the
/// rest of the app so the cookie lands in the same cookie store.
#[derive(Clone)]
pub struct HttpCookieBridge {
    client: Client,
    endpoint: String,
}

impl HttpCookieBridge {
    pub fn new(client: Client, frontend_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", frontend_url.trim_end_matches('/'), COOKIE_BRIDGE_PATH),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CookieBridge for HttpCookieBridge {
    async fn write(&self, access_token: &str) -> Result<(), BridgeError> {
        let response = self
            .client
            .put(&self.endpoint)
            .json(&WriteCookieRequest { access_token })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(BridgeError::Rejected(response.status()));
        }
        Ok(())
    }

    async fn delete(&self) -> Result<(), BridgeError> {
        let response = self.client.delete(&self.endpoint).send().await?;

        if !response.status().is_success() {
            return Err(BridgeError::Rejected(response.status()));
        }
        Ok(())
    }
}
