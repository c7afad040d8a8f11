//! Selected emirate and the cache invalidation it drives.
//!
//! Listing requests carry the selected emirate at the transport layer, so a
//! change silently invalidates every region-scoped cached result.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::cache::{InvalidationGroup, QueryCache};
use crate::storage::{DurableStorage, StorageError, StorageExt};

pub const EMIRATE_STORAGE_KEY: &str = "emirate-storage";

pub const EMIRATES: [&str; 7] = [
    "Abu Dhabi",
    "Dubai",
    "Sharjah",
    "Ajman",
    "Umm Al Quwain",
    "Ras Al Khaimah",
    "Fujairah",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmirateSelection {
    /// Empty means no region filter.
    pub selected_emirate: String,
}

/// Persisted region selection. Changes are published on a watch channel.
pub struct EmirateStore {
    storage: Arc<dyn DurableStorage>,
    sender: watch::Sender<String>,
}

impl EmirateStore {
    /// Load the persisted selection. The watch channel is created from the
    /// hydrated value, so subscribers never see a pre-hydration value.
    pub async fn hydrate(storage: Arc<dyn DurableStorage>) -> Self {
        let selection = storage
            .get::<EmirateSelection>(EMIRATE_STORAGE_KEY)
            .await
            .unwrap_or_default();

        tracing::debug!(emirate = %selection.selected_emirate, "Hydrated emirate selection");

        let (sender, _) = watch::channel(selection.selected_emirate);
        Self { storage, sender }
    }

    pub fn selected(&self) -> String {
        self.sender.borrow().clone()
    }

    pub async fn set_selected_emirate(&self, value: impl Into<String>) -> Result<(), StorageError> {
        let value = value.into();
        self.storage
            .set(
                EMIRATE_STORAGE_KEY,
                &EmirateSelection {
                    selected_emirate: value.clone(),
                },
            )
            .await?;

        tracing::info!(emirate = %value, "Emirate selected");
        self.sender.send_replace(value);
        Ok(())
    }

    pub async fn reset(&self) -> Result<(), StorageError> {
        self.storage.remove(EMIRATE_STORAGE_KEY).await?;
        self.sender.send_replace(String::new());
        Ok(())
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.sender.subscribe()
    }
}

/// Invalidates region-scoped queries when the emirate changes.
///
/// The first value observed is only recorded: it is the hydrated selection,
/// not a user change.
pub struct EmirateInvalidator {
    cache: Arc<QueryCache>,
    last_seen: Option<String>,
}

impl EmirateInvalidator {
    pub fn new(cache: Arc<QueryCache>) -> Self {
        Self {
            cache,
            last_seen: None,
        }
    }

    /// Returns true when this observation triggered an invalidation.
    pub fn observe(&mut self, emirate: &str) -> bool {
        let Some(previous) = self.last_seen.replace(emirate.to_string()) else {
            return false;
        };
        if previous == emirate {
            return false;
        }

        let count = self.cache.invalidate_group(InvalidationGroup::RegionScoped);
        tracing::info!(
            from = %previous,
            to = %emirate,
            invalidated = count,
            "Emirate changed, invalidated region-scoped queries"
        );
        true
    }
}

/// Run an [`EmirateInvalidator`] for as long as `store` lives.
pub fn spawn_invalidation_observer(store: &EmirateStore, cache: Arc<QueryCache>) -> JoinHandle<()> {
    let mut receiver = store.subscribe();
    let mut invalidator = EmirateInvalidator::new(cache);

    let initial = receiver.borrow_and_update().clone();
    invalidator.observe(&initial);

    tokio::spawn(async move {
        while receiver.changed().await.is_ok() {
            let current = receiver.borrow_and_update().clone();
            invalidator.observe(&current);
        }
        tracing::debug!("Emirate store dropped, stopping invalidation observer");
    })
}
