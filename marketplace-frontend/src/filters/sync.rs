use std::collections::BTreeMap;

use super::{decode, parse_pairs, serialize_pairs, FilterState, ParamValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Preserve,
    Reset,
}

/// History integration. Implementations replace the current entry rather
/// than pushing a new one.
pub trait Navigator {
    fn replace(&self, url: &str, scroll: ScrollBehavior);
}

/// Path plus ordered query pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub pairs: Vec<(String, String)>,
}

impl Location {
    pub fn parse(url: &str) -> Self {
        let url = url.split('#').next().unwrap_or_default();
        let (path, query) = url.split_once('?').unwrap_or((url, ""));
        Self {
            path: if path.is_empty() { "/".to_string() } else { path.to_string() },
            pairs: parse_pairs(query),
        }
    }

    pub fn query(&self) -> String {
        serialize_pairs(&self.pairs)
    }

    pub fn to_url(&self) -> String {
        let query = self.query();
        if query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, query)
        }
    }

    /// Replace the first occurrence in place and drop duplicates, or append.
    fn set(&mut self, key: &str, value: String) {
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(index) => {
                self.pairs[index].1 = value;
                let mut seen = false;
                self.pairs.retain(|(k, _)| {
                    if k != key {
                        return true;
                    }
                    let keep = !seen;
                    seen = true;
                    keep
                });
            }
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    fn delete(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }
}

/// Keeps filter state and the URL query string in step.
///
/// The URL is the only state: every read decodes it, every write produces a
/// new URL and hands it to the [`Navigator`].
pub struct FilterSync<N: Navigator> {
    navigator: N,
    location: Location,
}

impl<N: Navigator> FilterSync<N> {
    pub fn new(navigator: N, url: &str) -> Self {
        Self {
            navigator,
            location: Location::parse(url),
        }
    }

    pub fn state(&self) -> FilterState {
        decode(&self.location.query())
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn current_url(&self) -> String {
        self.location.to_url()
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Adopt a URL reached by some other navigation (back button, link).
    pub fn sync_from_url(&mut self, url: &str) {
        self.location = Location::parse(url);
    }

    /// Set present values and delete absent ones, then navigate once.
    pub fn update_params<K, I>(&mut self, updates: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ParamValue)>,
    {
        let mut batch = self.batch();
        for (key, value) in updates {
            batch.set(key, value);
        }
        batch.commit();
    }

    /// Drop every query parameter, keeping the path.
    pub fn clear(&mut self) {
        let next = Location {
            path: self.location.path.clone(),
            pairs: Vec::new(),
        };
        self.navigate(next);
    }

    /// Collect updates from several sources into a single navigation.
    pub fn batch(&mut self) -> ParamBatch<'_, N> {
        ParamBatch {
            sync: self,
            updates: BTreeMap::new(),
        }
    }

    fn apply(&mut self, updates: BTreeMap<String, ParamValue>) {
        if updates.is_empty() {
            return;
        }

        let mut next = self.location.clone();
        for (key, value) in updates {
            match value.serialize() {
                Some(serialized) => next.set(&key, serialized),
                None => next.delete(&key),
            }
        }
        self.navigate(next);
    }

    fn navigate(&mut self, next: Location) {
        if next == self.location {
            tracing::trace!(url = %next.to_url(), "Filter URL unchanged, skipping navigation");
            return;
        }

        let url = next.to_url();
        tracing::debug!(url = %url, "Replacing filter URL");
        self.location = next;
        self.navigator.replace(&url, ScrollBehavior::Preserve);
    }
}

/// Pending parameter updates. The last value set for a key wins; nothing
/// happens until [`commit`](ParamBatch::commit).
#[must_use = "a batch does nothing until committed"]
pub struct ParamBatch<'a, N: Navigator> {
    sync: &'a mut FilterSync<N>,
    updates: BTreeMap<String, ParamValue>,
}

impl<N: Navigator> ParamBatch<'_, N> {
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.updates.insert(key.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn commit(self) {
        self.sync.apply(self.updates);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{ExtraFields, ExtraValue};
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingNavigator {
        visits: RefCell<Vec<(String, ScrollBehavior)>>,
    }

    impl RecordingNavigator {
        fn urls(&self) -> Vec<String> {
            self.visits.borrow().iter().map(|(url, _)| url.clone()).collect()
        }
    }

    impl Navigator for RecordingNavigator {
        fn replace(&self, url: &str, scroll: ScrollBehavior) {
            self.visits.borrow_mut().push((url.to_string(), scroll));
        }
    }

    fn sync(url: &str) -> FilterSync<RecordingNavigator> {
        FilterSync::new(RecordingNavigator::default(), url)
    }

    #[test]
    fn sets_and_deletes_params() {
        let mut sync = sync("/ads/cars?page=2&price=100");

        sync.update_params([
            ("price", ParamValue::from("200")),
            ("page", ParamValue::Absent),
            ("body", ParamValue::from(vec!["suv", "sedan"])),
            ("search", ParamValue::from("")),
        ]);

        assert_eq!(sync.current_url(), "/ads/cars?price=200&body=suv%2Csedan");
        let visits = sync.navigator().visits.borrow().clone();
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].1, ScrollBehavior::Preserve);

        let state = sync.state();
        assert_eq!(state.get("body"), Some("suv,sedan"));
        assert_eq!(state.get("page"), None);
    }

    #[test]
    fn repeated_update_yields_same_url() {
        let mut once = sync("/ads?category=cars");
        once.update_params([("price", ParamValue::from(500i64))]);

        let mut twice = sync("/ads?category=cars");
        twice.update_params([("price", ParamValue::from(500i64))]);
        twice.update_params([("price", ParamValue::from(500i64))]);

        assert_eq!(once.current_url(), twice.current_url());
        assert_eq!(twice.navigator().urls().len(), 1);
    }

    #[test]
    fn batch_coalesces_into_one_navigation() {
        let mut sync = sync("/ads");

        let mut batch = sync.batch();
        batch.set("price", "100");
        batch.set("location", "Dubai");
        batch.set("price", "150");
        assert_eq!(batch.len(), 2);
        batch.commit();

        assert_eq!(sync.navigator().urls(), vec!["/ads?location=Dubai&price=150"]);
    }

    #[test]
    fn clear_keeps_path() {
        let mut sync = sync("/jobs?search=driver&location=Ajman");
        sync.clear();

        assert_eq!(sync.current_url(), "/jobs");
        assert_eq!(sync.state(), FilterState::default());

        sync.clear();
        assert_eq!(sync.navigator().urls().len(), 1);
    }

    #[test]
    fn extra_fields_travel_as_json() {
        let mut sync = sync("/ads/cars");
        let mut fields = ExtraFields::new();
        fields.insert("color".to_string(), ExtraValue::from("red"));

        sync.update_params([("extraFields", ParamValue::from(&fields))]);

        let state = sync.state();
        assert_eq!(state.extra_fields, fields);
        assert!(state.query.is_empty());

        sync.update_params([("extraFields", ParamValue::from(&ExtraFields::new()))]);
        assert_eq!(sync.current_url(), "/ads/cars");
    }

    #[test]
    fn duplicate_keys_collapse_on_set() {
        let mut sync = sync("/ads?tag=a&x=1&tag=b");
        sync.update_params([("tag", ParamValue::from("c"))]);

        assert_eq!(sync.current_url(), "/ads?tag=c&x=1");
    }

    #[test]
    fn sync_from_url_adopts_external_navigation() {
        let mut sync = sync("/ads?price=1");
        sync.sync_from_url("/ads?price=9#top");

        assert_eq!(sync.state().get("price"), Some("9"));
        assert!(sync.navigator().urls().is_empty());
    }
}
