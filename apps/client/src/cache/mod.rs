//! Key-addressed cache of server responses, shared by every page-level
//! flow. Explicitly owned and passed by reference to handlers; there is no
//! ambient global cache.
//!
//! Invalidation marks an entry stale: readers treat it as a miss and
//! refetch, but the value stays restorable so a snapshot taken earlier can
//! reinstate the key exactly as it was, freshness included.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

use uuid::Uuid;

use crate::models::memory::{Memory, MemoryKey};
use crate::payments::PaymentSettings;

/// The memory lists backing browse and moderation views.
pub type MemoryCache = QueryCache<MemoryKey, Vec<Memory>>;
/// Payment settings per school.
pub type PaymentsCache = QueryCache<Uuid, PaymentSettings>;

#[derive(Debug, Clone, PartialEq)]
struct Entry<V> {
    value: V,
    fresh: bool,
}

/// Captured state of one key: presence, value and freshness. Restoring it
/// reinstates exactly what was captured, including absence. No partial
/// merge ever happens.
#[derive(Debug, Clone)]
pub struct Snapshot<K, V> {
    key: K,
    entry: Option<Entry<V>>,
}

#[derive(Debug)]
pub struct QueryCache<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        QueryCache {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fresh value for the key, if any. A stale entry is a miss: the
    /// caller is expected to refetch and `put` the authoritative result.
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.lock().expect("cache lock poisoned");
        entries
            .get(key)
            .filter(|entry| entry.fresh)
            .map(|entry| entry.value.clone())
    }

    /// Stores an authoritative server response for the key.
    pub fn put(&self, key: K, value: V) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(key, Entry { value, fresh: true });
    }

    /// Marks the key stale so the next read refetches. The value is kept
    /// only so outstanding snapshots remain meaningful.
    pub fn invalidate(&self, key: &K) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        if let Some(entry) = entries.get_mut(key) {
            entry.fresh = false;
        }
    }

    /// Captures the key's current state for a later `restore`.
    pub fn snapshot(&self, key: &K) -> Snapshot<K, V> {
        let entries = self.entries.lock().expect("cache lock poisoned");
        Snapshot {
            key: key.clone(),
            entry: entries.get(key).cloned(),
        }
    }

    /// Reinstates a snapshot wholesale. A snapshot of an absent key removes
    /// whatever is there now.
    pub fn restore(&self, snapshot: Snapshot<K, V>) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match snapshot.entry {
            Some(entry) => {
                entries.insert(snapshot.key, entry);
            }
            None => {
                entries.remove(&snapshot.key);
            }
        }
    }

    /// Whether a fresh entry exists. Display logic uses this to decide
    /// between cached data and a loading state.
    pub fn is_fresh(&self, key: &K) -> bool {
        let entries = self.entries.lock().expect("cache lock poisoned");
        entries.get(key).map(|entry| entry.fresh).unwrap_or(false)
    }
}

impl<K, T> QueryCache<K, Vec<T>>
where
    K: Eq + Hash + Clone,
    T: Clone,
{
    /// Prepends an item to the cached list, creating the list when the key
    /// is absent. Used for optimistic placeholders, which always show at
    /// the head. The entry is marked fresh so the placeholder is visible
    /// immediately, even over a previously invalidated list.
    pub fn insert_head(&self, key: K, item: T) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let entry = entries.entry(key).or_insert_with(|| Entry {
            value: Vec::new(),
            fresh: true,
        });
        entry.value.insert(0, item);
        entry.fresh = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestCache = QueryCache<u32, Vec<String>>;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_get_miss_then_hit() {
        let cache = TestCache::new();
        assert_eq!(cache.get(&1), None);
        cache.put(1, list(&["a"]));
        assert_eq!(cache.get(&1), Some(list(&["a"])));
    }

    #[test]
    fn test_invalidate_makes_entry_a_miss() {
        let cache = TestCache::new();
        cache.put(1, list(&["a"]));
        cache.invalidate(&1);
        assert_eq!(cache.get(&1), None);
        assert!(!cache.is_fresh(&1));
    }

    #[test]
    fn test_restore_reinstates_exact_state() {
        let cache = TestCache::new();
        cache.put(1, list(&["a", "b"]));
        let snap = cache.snapshot(&1);

        cache.insert_head(1, "optimistic".to_string());
        cache.invalidate(&1);
        cache.restore(snap);

        assert_eq!(cache.get(&1), Some(list(&["a", "b"])));
        assert!(cache.is_fresh(&1));
    }

    #[test]
    fn test_restore_of_absent_key_removes_current_entry() {
        let cache = TestCache::new();
        let snap = cache.snapshot(&1); // key absent at capture time

        cache.insert_head(1, "optimistic".to_string());
        cache.restore(snap);

        assert_eq!(cache.get(&1), None);
        assert!(!cache.is_fresh(&1));
    }

    #[test]
    fn test_restore_preserves_staleness() {
        let cache = TestCache::new();
        cache.put(1, list(&["a"]));
        cache.invalidate(&1);
        let snap = cache.snapshot(&1); // stale at capture time

        cache.put(1, list(&["b"]));
        cache.restore(snap);

        // Entry is back but still stale: readers must refetch.
        assert_eq!(cache.get(&1), None);
        assert!(!cache.is_fresh(&1));
    }

    #[test]
    fn test_insert_head_creates_list_when_absent() {
        let cache = TestCache::new();
        cache.insert_head(1, "first".to_string());
        assert_eq!(cache.get(&1), Some(list(&["first"])));
    }

    #[test]
    fn test_insert_head_prepends() {
        let cache = TestCache::new();
        cache.put(1, list(&["old"]));
        cache.insert_head(1, "new".to_string());
        assert_eq!(cache.get(&1), Some(list(&["new", "old"])));
    }
}
