//! Login, signup, refresh and logout flows on top of [`ApiClient`] and
//! [`TokenStore`].

use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

use crate::models::auth::{
    AuthPayload, LoginRequest, RefreshPayload, RefreshRequest, SignupRequest, SocialLoginRequest,
};
use crate::services::api_client::{ApiClient, ApiError};
use crate::services::endpoints;
use crate::session::{SessionUser, TokenPair, TokenStore};
use crate::storage::StorageError;
use crate::utils::jwt::expires_within;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Failed to persist session: {0}")]
    Storage(#[from] StorageError),

    #[error("No active session")]
    NotAuthenticated,
}

pub struct SessionService {
    api: Arc<ApiClient>,
    tokens: Arc<TokenStore>,
}

impl SessionService {
    pub fn new(api: Arc<ApiClient>, tokens: Arc<TokenStore>) -> Self {
        Self { api, tokens }
    }

    pub fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    pub async fn login(&self, request: LoginRequest) -> Result<SessionUser, SessionError> {
        let response = self
            .api
            .send::<_, AuthPayload>(endpoints::AUTH_LOGIN, &[], &request)
            .await?;
        self.establish(response.data).await
    }

    pub async fn social_login(
        &self,
        provider: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<SessionUser, SessionError> {
        let request = SocialLoginRequest {
            provider: provider.into(),
            token: token.into(),
        };
        let response = self
            .api
            .send::<_, AuthPayload>(endpoints::AUTH_SOCIAL_LOGIN, &[], &request)
            .await?;
        self.establish(response.data).await
    }

    pub async fn signup(&self, request: SignupRequest) -> Result<SessionUser, SessionError> {
        let response = self
            .api
            .send::<_, AuthPayload>(endpoints::AUTH_SIGNUP, &[], &request)
            .await?;
        self.establish(response.data).await
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// A rejected refresh token ends the session.
    pub async fn refresh(&self) -> Result<(), SessionError> {
        let refresh_token = self
            .tokens
            .refresh_token()
            .await
            .ok_or(SessionError::NotAuthenticated)?;

        let result = self
            .api
            .send::<_, RefreshPayload>(
                endpoints::AUTH_REFRESH,
                &[],
                &RefreshRequest {
                    refresh_token: &refresh_token,
                },
            )
            .await;

        match result {
            Ok(response) => {
                self.tokens.refresh(response.data.access_token).await?;
                Ok(())
            }
            Err(e) if e.is_auth_rejection() => {
                tracing::warn!(error = %e, "Refresh token rejected, ending session");
                self.tokens.logout().await?;
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Refresh only when the access token expires within `leeway`.
    /// Returns whether a refresh happened.
    pub async fn refresh_if_expiring(&self, leeway: chrono::Duration) -> Result<bool, SessionError> {
        let access_token = self
            .tokens
            .access_token()
            .await
            .ok_or(SessionError::NotAuthenticated)?;

        if !expires_within(&access_token, leeway, Utc::now()) {
            return Ok(false);
        }
        self.refresh().await?;
        Ok(true)
    }

    /// Revoke on the backend if possible, then clear local credentials
    /// regardless of the outcome.
    pub async fn logout(&self) -> Result<(), SessionError> {
        if self.tokens.is_authenticated().await {
            if let Err(e) = self
                .api
                .send::<_, Option<serde_json::Value>>(endpoints::AUTH_LOGOUT, &[], &serde_json::json!({}))
                .await
            {
                tracing::warn!(error = %e, "Backend logout failed, clearing local session anyway");
            }
        }

        self.tokens.logout().await?;
        Ok(())
    }

    async fn establish(&self, payload: AuthPayload) -> Result<SessionUser, SessionError> {
        let user = payload.user;
        self.tokens
            .login(
                TokenPair {
                    access_token: payload.access_token,
                    refresh_token: payload.refresh_token,
                },
                user.clone(),
            )
            .await?;
        Ok(user)
    }
}
