use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use tokio::time::Instant;

pub const RESPONSE_TTL: Duration = Duration::from_secs(300);

struct CacheEntry<T> {
    data: T,
    expires_at: Instant,
}

impl<T> CacheEntry<T> {
    fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_fresh(&self) -> bool {
        self.expires_at > Instant::now()
    }
}

/// Single-level expiring map keyed by request signature.
///
/// Entries are only invalidated by their TTL. There is no capacity bound and
/// concurrent writers race with last-write-wins.
pub struct ResponseCache<T> {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
}

impl<T: Clone> ResponseCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<T> {
        self.entries
            .read()
            .ok()?
            .get(key)
            .filter(|e| e.is_fresh())
            .map(|e| e.data.clone())
    }

    pub fn insert(&self, key: String, data: T) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key, CacheEntry::new(data, self.ttl));
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }
}

impl<T: Clone> Default for ResponseCache<T> {
    fn default() -> Self {
        Self::new(RESPONSE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn entry_is_served_until_ttl_elapses() {
        let cache = ResponseCache::new(Duration::from_secs(10));
        cache.insert("k".into(), 7u32);

        tokio::time::advance(Duration::from_secs(9)).await;
        assert_eq!(cache.get("k"), Some(7));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("k"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entries_are_not_evicted_only_ignored() {
        let cache = ResponseCache::new(Duration::from_secs(1));
        cache.insert("a".into(), 1u32);
        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.len(), 1);

        cache.insert("a".into(), 2);
        assert_eq!(cache.get("a"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn last_write_wins() {
        let cache = ResponseCache::default();
        cache.insert("k".into(), "first");
        cache.insert("k".into(), "second");
        assert_eq!(cache.get("k"), Some("second"));
    }
}
