use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::bridge::CookieBridge;
use super::model::{Session, SessionUser, TokenPair};
use crate::storage::{DurableStorage, StorageError, StorageExt};

pub const SESSION_STORAGE_KEY: &str = "auth-storage";

/// Owner of the client session.
///
/// Every mutation writes durable storage while holding the write lock and
/// only then swaps the in-memory copy, so readers never observe one without
/// the other. The auth cookie is mirrored afterwards through the
/// [`CookieBridge`]; a failed mirror is logged and otherwise ignored.
///
/// Token-changing operations are serialized end to end by `cookie_sync`, so
/// the last cookie written always carries the current access token.
pub struct TokenStore {
    session: RwLock<Session>,
    storage: Arc<dyn DurableStorage>,
    bridge: Arc<dyn CookieBridge>,
    cookie_sync: Mutex<()>,
}

impl TokenStore {
    /// Build the store from whatever session durable storage holds.
    pub async fn hydrate(storage: Arc<dyn DurableStorage>, bridge: Arc<dyn CookieBridge>) -> Self {
        let session = storage
            .get::<Session>(SESSION_STORAGE_KEY)
            .await
            .unwrap_or_default();

        tracing::debug!(
            authenticated = session.is_authenticated(),
            "Hydrated session store"
        );

        Self {
            session: RwLock::new(session),
            storage,
            bridge,
            cookie_sync: Mutex::new(()),
        }
    }

    pub async fn snapshot(&self) -> Session {
        self.session.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_authenticated()
    }

    pub async fn access_token(&self) -> Option<String> {
        self.session.read().await.access_token.clone()
    }

    pub async fn refresh_token(&self) -> Option<String> {
        self.session.read().await.refresh_token.clone()
    }

    pub async fn user(&self) -> Option<SessionUser> {
        self.session.read().await.user.clone()
    }

    pub async fn login(&self, tokens: TokenPair, user: SessionUser) -> Result<(), StorageError> {
        let _sync = self.cookie_sync.lock().await;
        let access_token = tokens.access_token.clone();
        let user_id = user.id.clone();

        self.replace(Session {
            access_token: Some(tokens.access_token),
            refresh_token: tokens.refresh_token,
            user: Some(user),
        })
        .await?;

        tracing::info!(user_id = %user_id, "User logged in");
        self.mirror_cookie(&access_token).await;
        Ok(())
    }

    /// Swap in a new access token, keeping the refresh token and user.
    pub async fn refresh(&self, access_token: String) -> Result<(), StorageError> {
        let _sync = self.cookie_sync.lock().await;
        {
            let mut session = self.session.write().await;
            let mut next = session.clone();
            next.access_token = Some(access_token.clone());
            self.storage.set(SESSION_STORAGE_KEY, &next).await?;
            *session = next;
        }

        tracing::debug!("Access token refreshed");
        self.mirror_cookie(&access_token).await;
        Ok(())
    }

    pub async fn update_user(&self, user: SessionUser) -> Result<(), StorageError> {
        let mut session = self.session.write().await;
        let mut next = session.clone();
        next.user = Some(user);
        self.storage.set(SESSION_STORAGE_KEY, &next).await?;
        *session = next;
        Ok(())
    }

    /// Drop all credentials. Safe to call when already logged out.
    pub async fn logout(&self) -> Result<(), StorageError> {
        let _sync = self.cookie_sync.lock().await;
        {
            let mut session = self.session.write().await;
            self.storage.remove(SESSION_STORAGE_KEY).await?;
            *session = Session::default();
        }

        tracing::info!("User logged out");
        if let Err(e) = self.bridge.delete().await {
            tracing::warn!(error = %e, "Failed to delete auth cookie");
        }
        Ok(())
    }

    async fn replace(&self, next: Session) -> Result<(), StorageError> {
        let mut session = self.session.write().await;
        self.storage.set(SESSION_STORAGE_KEY, &next).await?;
        *session = next;
        Ok(())
    }

    async fn mirror_cookie(&self, access_token: &str) {
        if let Err(e) = self.bridge.write(access_token).await {
            tracing::warn!(error = %e, "Failed to write auth cookie");
        }
    }
}
