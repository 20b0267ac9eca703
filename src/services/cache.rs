use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// In-process cache with a fixed TTL and a size cap.
///
/// Owned explicitly by whichever service needs one (geocoding, routing,
/// invoicing tokens) rather than living in module-level statics, so each
/// cache has a visible key type, TTL and eviction policy. Expired entries
/// are dropped lazily on read; inserts past the cap sweep expired entries
/// first and then evict the oldest live entry.
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CachedEntry<V>>>,
    ttl: Duration,
    max_entries: usize,
}

struct CachedEntry<V> {
    inserted_at: Instant,
    value: V,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            max_entries,
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.inserted_at.elapsed() < self.ttl => {
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }
        // Stale on the read pass. Re-check under the write lock: another
        // task may have refreshed the key between the two locks, and that
        // fresh value must not be discarded.
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub async fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.write().await;
        // Overwriting an existing key does not grow the map, so the
        // eviction pass only runs for inserts of new keys at capacity.
        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let ttl = self.ttl;
            entries.retain(|_, e| e.inserted_at.elapsed() < ttl);
            if entries.len() >= self.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, e)| e.inserted_at)
                    .map(|(k, _)| k.clone());
                if let Some(k) = oldest {
                    entries.remove(&k);
                }
            }
        }
        entries.insert(
            key,
            CachedEntry {
                inserted_at: Instant::now(),
                value,
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_inserted_value_before_expiry() {
        let cache = TtlCache::new(Duration::from_secs(60), 10);
        cache.insert("key".to_string(), 42u32).await;
        assert_eq!(cache.get(&"key".to_string()).await, Some(42));
    }

    #[tokio::test]
    async fn miss_on_absent_key() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60), 10);
        assert_eq!(cache.get(&"missing".to_string()).await, None);
    }

    #[tokio::test]
    async fn expired_entry_is_dropped() {
        let cache = TtlCache::new(Duration::from_millis(10), 10);
        cache.insert("key".to_string(), 1u32).await;
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert_eq!(cache.get(&"key".to_string()).await, None);
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test]
    async fn insert_past_cap_evicts_oldest() {
        let cache = TtlCache::new(Duration::from_secs(60), 2);
        cache.insert("a".to_string(), 1u32).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        cache.insert("b".to_string(), 2u32).await;
        cache.insert("c".to_string(), 3u32).await;

        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.get(&"a".to_string()).await, None);
        assert_eq!(cache.get(&"b".to_string()).await, Some(2));
        assert_eq!(cache.get(&"c".to_string()).await, Some(3));
    }

    #[tokio::test]
    async fn overwrite_at_capacity_keeps_other_entries() {
        let cache = TtlCache::new(Duration::from_secs(60), 2);
        cache.insert("a".to_string(), 1u32).await;
        cache.insert("b".to_string(), 2u32).await;
        // Map is full, but overwriting "a" does not grow it, so "b" stays.
        cache.insert("a".to_string(), 10u32).await;

        assert_eq!(cache.get(&"a".to_string()).await, Some(10));
        assert_eq!(cache.get(&"b".to_string()).await, Some(2));
        assert_eq!(cache.len().await, 2);
    }

    #[tokio::test]
    async fn stale_read_does_not_discard_concurrent_refresh() {
        let cache = std::sync::Arc::new(TtlCache::new(Duration::from_millis(10), 10));
        cache.insert("key".to_string(), 1u32).await;
        tokio::time::sleep(Duration::from_millis(25)).await;

        // A reader seeing the stale entry races a writer refreshing it.
        let reader = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get(&"key".to_string()).await })
        };
        let writer = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.insert("key".to_string(), 2u32).await })
        };
        let _ = reader.await;
        let _ = writer.await;

        // Whatever the interleaving, the refreshed value survives.
        assert_eq!(cache.get(&"key".to_string()).await, Some(2));
    }

    #[tokio::test]
    async fn overwrite_refreshes_value() {
        let cache = TtlCache::new(Duration::from_secs(60), 10);
        cache.insert("key".to_string(), 1u32).await;
        cache.insert("key".to_string(), 2u32).await;
        assert_eq!(cache.get(&"key".to_string()).await, Some(2));
        assert_eq!(cache.len().await, 1);
    }
}
