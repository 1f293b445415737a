use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// Memo table keyed on the exact input of an upstream call.
///
/// `ttl = None` keeps entries for the life of the process. Expired entries are
/// dropped lazily on lookup and on insert.
#[derive(Clone, Debug)]
pub struct TtlCache<K, V> {
    entries: Arc<RwLock<HashMap<K, (Instant, V)>>>,
    ttl: Option<Duration>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub fn insert(&self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    /// Number of live entries; expired ones awaiting eviction are not counted.
    pub fn len(&self) -> usize {
        self.len_at(Instant::now())
    }

    fn len_at(&self, now: Instant) -> usize {
        self.entries
            .read()
            .map(|m| m.values().filter(|(at, _)| self.is_fresh(*at, now)).count())
            .unwrap_or(0)
    }

    fn is_fresh(&self, stored_at: Instant, now: Instant) -> bool {
        match self.ttl {
            Some(ttl) => now.saturating_duration_since(stored_at) < ttl,
            None => true,
        }
    }

    fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        let hit = {
            let map = self.entries.read().ok()?;
            map.get(key).map(|(at, v)| (*at, v.clone()))
        };
        match hit {
            Some((at, v)) if self.is_fresh(at, now) => Some(v),
            Some(_) => {
                if let Ok(mut map) = self.entries.write() {
                    map.remove(key);
                }
                None
            }
            None => None,
        }
    }

    fn insert_at(&self, key: K, value: V, now: Instant) {
        if let Ok(mut map) = self.entries.write() {
            if let Some(ttl) = self.ttl {
                map.retain(|_, (at, _)| now.saturating_duration_since(*at) < ttl);
            }
            map.insert(key, (now, value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_within_ttl() {
        let cache = TtlCache::new(Some(Duration::from_secs(3600)));
        cache.insert("Pune, Maharashtra".to_string(), 42);
        assert_eq!(cache.get(&"Pune, Maharashtra".to_string()), Some(42));
        assert_eq!(cache.get(&"pune, maharashtra".to_string()), None);
    }

    #[test]
    fn test_expired_entry_is_dropped() {
        let cache = TtlCache::new(Some(Duration::from_secs(60)));
        let t0 = Instant::now();
        cache.insert_at(1u32, "a", t0);

        assert_eq!(cache.get_at(&1, t0 + Duration::from_secs(59)), Some("a"));
        assert_eq!(cache.get_at(&1, t0 + Duration::from_secs(61)), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_insert_evicts_stale_entries() {
        let cache = TtlCache::new(Some(Duration::from_secs(10)));
        let t0 = Instant::now();
        cache.insert_at(1u32, 1, t0);
        cache.insert_at(2u32, 2, t0 + Duration::from_secs(20));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_len_skips_expired_entries() {
        let cache = TtlCache::new(Some(Duration::from_secs(60)));
        let t0 = Instant::now();
        cache.insert_at(1u32, 1, t0);
        cache.insert_at(2u32, 2, t0 + Duration::from_secs(30));

        assert_eq!(cache.len_at(t0 + Duration::from_secs(45)), 2);
        assert_eq!(cache.len_at(t0 + Duration::from_secs(75)), 1);
        assert_eq!(cache.len_at(t0 + Duration::from_secs(120)), 0);
    }

    #[test]
    fn test_no_ttl_keeps_entries() {
        let cache = TtlCache::new(None);
        let t0 = Instant::now();
        cache.insert_at(1u32, 1, t0);
        assert_eq!(cache.get_at(&1, t0 + Duration::from_secs(86_400 * 365)), Some(1));
    }

    #[test]
    fn test_clones_share_entries() {
        let cache: TtlCache<u32, u32> = TtlCache::new(None);
        let other = cache.clone();
        other.insert(7, 49);
        assert_eq!(cache.get(&7), Some(49));
    }
}
