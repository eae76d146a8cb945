// geos/cache.rs
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

struct Cached<T> {
    value: Arc<T>,
    loaded_at: DateTime<Utc>,
}

/// Time-to-live cache for read-only reference data.
///
/// Callers get an `Arc` snapshot, so a refresh never pulls data out from under
/// a reader. Loads for the same cache are serialized; a failed load evicts the
/// stale entry rather than serving it.
pub struct LayerCache<T> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, Cached<T>>>,
}

impl<T> LayerCache<T> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_or_load<F, E>(&self, key: &str, loader: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let now = self.clock.now();

        if let Some(cached) = entries.get(key) {
            if now - cached.loaded_at < self.ttl {
                return Ok(Arc::clone(&cached.value));
            }
            tracing::debug!(key, "cached layer expired");
        }

        match loader() {
            Ok(value) => {
                let value = Arc::new(value);
                entries.insert(
                    key.to_string(),
                    Cached {
                        value: Arc::clone(&value),
                        loaded_at: now,
                    },
                );
                Ok(value)
            }
            Err(e) => {
                entries.remove(key);
                Err(e)
            }
        }
    }
}

/// Clock that only moves when told to.
#[cfg(test)]
pub struct ManualClock(Mutex<DateTime<Utc>>);

#[cfg(test)]
impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self(Mutex::new(start))
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::cell::Cell;

    fn cache(clock: Arc<ManualClock>) -> LayerCache<String> {
        LayerCache::new(Duration::hours(24), clock)
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()))
    }

    #[test]
    fn fresh_entries_skip_the_loader() {
        let clock = clock();
        let cache = cache(clock.clone());
        let loads = Cell::new(0);
        let load = || -> Result<String, ()> {
            loads.set(loads.get() + 1);
            Ok(format!("v{}", loads.get()))
        };

        assert_eq!(*cache.get_or_load("zoning", load).unwrap(), "v1");
        clock.advance(Duration::hours(23));
        assert_eq!(*cache.get_or_load("zoning", load).unwrap(), "v1");
        assert_eq!(loads.get(), 1);
    }

    #[test]
    fn expired_entries_reload() {
        let clock = clock();
        let cache = cache(clock.clone());
        let loads = Cell::new(0);
        let load = || -> Result<String, ()> {
            loads.set(loads.get() + 1);
            Ok(format!("v{}", loads.get()))
        };

        let first = cache.get_or_load("coast", load).unwrap();
        clock.advance(Duration::hours(24));
        let second = cache.get_or_load("coast", load).unwrap();

        assert_eq!(*first, "v1");
        assert_eq!(*second, "v2");
    }

    #[test]
    fn failed_reload_does_not_serve_stale_data() {
        let clock = clock();
        let cache = cache(clock.clone());

        cache
            .get_or_load("zoning", || Ok::<_, &str>("old".to_string()))
            .unwrap();
        clock.advance(Duration::hours(25));

        let err = cache
            .get_or_load("zoning", || Err::<String, _>("offline"))
            .unwrap_err();
        assert_eq!(err, "offline");

        // Nothing stale left behind: the next call must load again.
        let loaded = cache
            .get_or_load("zoning", || Ok::<_, &str>("new".to_string()))
            .unwrap();
        assert_eq!(*loaded, "new");
    }

    #[test]
    fn keys_are_independent() {
        let cache = cache(clock());
        let a = cache.get_or_load("a", || Ok::<_, ()>("A".to_string())).unwrap();
        let b = cache.get_or_load("b", || Ok::<_, ()>("B".to_string())).unwrap();
        assert_ne!(a, b);
    }
}
