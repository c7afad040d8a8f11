//! Client query cache with prefix invalidation.
//!
//! Keys are segment lists (`["ads", "cars", "page=2"]`). Invalidation marks
//! entries stale rather than dropping them, so the last good data stays
//! readable until the refetch lands. Every key also carries a generation
//! that invalidation bumps; a fetch that started before an invalidation
//! stores its result as stale.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn namespace(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Segment-wise prefix test: `["ad"]` covers `["ad", "42"]` but not
    /// `["ads"]`.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.len() >= prefix.0.len() && self.0.iter().zip(&prefix.0).all(|(a, b)| a == b)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// Named set of query namespaces that go stale together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InvalidationGroup {
    /// Listings implicitly filtered by the selected emirate.
    RegionScoped,
    /// Data tied to the signed-in user.
    UserScoped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedQuery {
    pub data: Value,
    pub updated_at: DateTime<Utc>,
    pub stale: bool,
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: DashMap<QueryKey, CachedQuery>,
    generations: DashMap<QueryKey, u64>,
    groups: DashMap<InvalidationGroup, BTreeSet<QueryKey>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that queries under `prefix` belong to `group`.
    pub fn register_group(&self, group: InvalidationGroup, prefix: QueryKey) {
        self.groups.entry(group).or_default().insert(prefix);
    }

    pub fn group_prefixes(&self, group: InvalidationGroup) -> Vec<QueryKey> {
        self.groups
            .get(&group)
            .map(|prefixes| prefixes.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn set(&self, key: QueryKey, data: Value) {
        self.store(key, data, false);
    }

    fn store(&self, key: QueryKey, data: Value, stale: bool) {
        self.entries.insert(
            key,
            CachedQuery {
                data,
                updated_at: Utc::now(),
                stale,
            },
        );
    }

    fn generation(&self, key: &QueryKey) -> u64 {
        self.generations.get(key).map(|g| *g).unwrap_or_default()
    }

    pub fn get(&self, key: &QueryKey) -> Option<CachedQuery> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    pub fn is_stale(&self, key: &QueryKey) -> Option<bool> {
        self.entries.get(key).map(|entry| entry.stale)
    }

    /// Return fresh cached data or run `fetch` and cache its result.
    /// Failed fetches leave any previous entry untouched. A result whose key
    /// was invalidated while the fetch was in flight is returned to the
    /// caller but cached as stale, so the next read refetches.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: QueryKey, fetch: F) -> Result<Value, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, E>>,
    {
        if let Some(entry) = self.entries.get(&key) {
            if !entry.stale {
                return Ok(entry.data.clone());
            }
        }

        let started = *self.generations.entry(key.clone()).or_insert(0);

        tracing::debug!(key = %key, "Fetching query");
        let data = fetch().await?;

        let superseded = self.generation(&key) != started;
        if superseded {
            tracing::debug!(key = %key, "Query invalidated during fetch, caching result as stale");
        }
        self.store(key, data.clone(), superseded);
        Ok(data)
    }

    /// Mark every entry whose key starts with `prefix` stale. Returns how
    /// many entries were marked.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut count = 0;
        for mut entry in self.entries.iter_mut() {
            if entry.key().starts_with(prefix) {
                entry.stale = true;
                count += 1;
            }
        }
        for mut generation in self.generations.iter_mut() {
            if generation.key().starts_with(prefix) {
                *generation += 1;
            }
        }
        tracing::debug!(prefix = %prefix, count, "Invalidated queries");
        count
    }

    pub fn invalidate_group(&self, group: InvalidationGroup) -> usize {
        let prefixes = self.group_prefixes(group);
        if prefixes.is_empty() {
            tracing::warn!(group = ?group, "Invalidation group has no registered queries");
        }
        prefixes.iter().map(|prefix| self.invalidate(prefix)).sum()
    }

    pub fn remove(&self, key: &QueryKey) -> Option<CachedQuery> {
        self.entries.remove(key).map(|(_, entry)| entry)
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key(segments: &[&str]) -> QueryKey {
        QueryKey::new(segments.iter().copied())
    }

    #[test]
    fn prefix_match_is_segment_wise() {
        assert!(key(&["ad", "42"]).starts_with(&key(&["ad"])));
        assert!(key(&["ads"]).starts_with(&key(&["ads"])));
        assert!(!key(&["ads"]).starts_with(&key(&["ad"])));
        assert!(!key(&["ad"]).starts_with(&key(&["ad", "42"])));
    }

    #[test]
    fn invalidate_marks_matching_entries_stale() {
        let cache = QueryCache::new();
        cache.set(key(&["ads", "cars"]), json!([1]));
        cache.set(key(&["ads", "jobs", "page=2"]), json!([2]));
        cache.set(key(&["categories"]), json!([3]));

        assert_eq!(cache.invalidate(&key(&["ads"])), 2);
        assert_eq!(cache.is_stale(&key(&["ads", "cars"])), Some(true));
        assert_eq!(cache.is_stale(&key(&["categories"])), Some(false));
        assert_eq!(cache.get(&key(&["ads", "cars"])).unwrap().data, json!([1]));
    }

    #[test]
    fn groups_invalidate_all_registered_prefixes() {
        let cache = QueryCache::new();
        cache.register_group(InvalidationGroup::RegionScoped, key(&["home"]));
        cache.register_group(InvalidationGroup::RegionScoped, key(&["ad"]));
        cache.set(key(&["home"]), json!({}));
        cache.set(key(&["ad", "7"]), json!({}));
        cache.set(key(&["user", "profile"]), json!({}));

        assert_eq!(cache.invalidate_group(InvalidationGroup::RegionScoped), 2);
        assert_eq!(cache.is_stale(&key(&["user", "profile"])), Some(false));
        assert_eq!(cache.invalidate_group(InvalidationGroup::UserScoped), 0);
    }

    #[tokio::test]
    async fn get_or_fetch_refetches_only_when_needed() {
        let cache = QueryCache::new();
        let k = key(&["home"]);

        let first: Result<Value, ()> = cache.get_or_fetch(k.clone(), || async { Ok(json!(1)) }).await;
        assert_eq!(first, Ok(json!(1)));

        let fetches = AtomicUsize::new(0);
        let cached: Result<Value, ()> = cache
            .get_or_fetch(k.clone(), || async {
                fetches.fetch_add(1, Ordering::SeqCst);
                Ok(json!(99))
            })
            .await;
        assert_eq!(cached, Ok(json!(1)));
        assert_eq!(fetches.load(Ordering::SeqCst), 0);

        cache.invalidate(&k);
        let refreshed: Result<Value, ()> =
            cache.get_or_fetch(k.clone(), || async { Ok(json!(2)) }).await;
        assert_eq!(refreshed, Ok(json!(2)));
        assert_eq!(cache.is_stale(&k), Some(false));
    }

    #[tokio::test]
    async fn invalidation_during_fetch_caches_result_as_stale() {
        let cache = QueryCache::new();
        let k = key(&["ads", "all"]);

        let fetch = cache.get_or_fetch(k.clone(), || async {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            Ok::<_, ()>(json!("dubai-listings"))
        });
        let switch_region = async {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            cache.invalidate(&key(&["ads"]))
        };
        let (fetched, _) = tokio::join!(fetch, switch_region);

        assert_eq!(fetched, Ok(json!("dubai-listings")));
        assert_eq!(cache.is_stale(&k), Some(true));

        let refetched: Result<Value, ()> = cache
            .get_or_fetch(k.clone(), || async { Ok(json!("sharjah-listings")) })
            .await;
        assert_eq!(refetched, Ok(json!("sharjah-listings")));
        assert_eq!(cache.is_stale(&k), Some(false));
    }

    #[tokio::test]
    async fn unrelated_invalidation_during_fetch_keeps_result_fresh() {
        let cache = QueryCache::new();
        let k = key(&["ads", "all"]);

        let fetch = cache.get_or_fetch(k.clone(), || async {
            tokio::time::sleep(std::time::Duration::from_millis(30)).await;
            Ok::<_, ()>(json!([1]))
        });
        let other = async {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            cache.invalidate(&key(&["categories"]))
        };
        let _ = tokio::join!(fetch, other);

        assert_eq!(cache.is_stale(&k), Some(false));
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_entry() {
        let cache = QueryCache::new();
        let k = key(&["ads"]);
        cache.set(k.clone(), json!("old"));
        cache.invalidate(&k);

        let result: Result<Value, &str> = cache.get_or_fetch(k.clone(), || async { Err("offline") }).await;
        assert_eq!(result, Err("offline"));
        assert_eq!(cache.get(&k).unwrap().data, json!("old"));
    }
}
