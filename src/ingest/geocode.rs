//! Address geocoding wrapper with an explicit rate limiter and a TTL cache.
//!
//! Both are owned by the [`CachedGeocoder`] that performs the lookups, so
//! two geocoders never share a request budget by accident.

use crate::{
    core::geo::LatLng,
    data::model::LocationRecord,
    prelude::{Duration, Instant},
    MapError, Result,
};
use async_trait::async_trait;
use lru::LruCache;
use std::{collections::VecDeque, num::NonZeroUsize, sync::Mutex};

pub const DEFAULT_RATE_LIMIT: usize = 20;
pub const DEFAULT_RATE_WINDOW: Duration = Duration::from_millis(1000);
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);
const DEFAULT_CACHE_CAPACITY: usize = 4096;

/// Resolves a postal address to a coordinate
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the address is unknown
    async fn geocode(&self, address: &str) -> Result<Option<LatLng>>;
}

/// Trims and collapses runs of whitespace
pub fn normalize_address(address: &str) -> String {
    address.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Sliding-window request limiter
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: usize,
    window: Duration,
    timestamps: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            timestamps: Mutex::new(VecDeque::new()),
        }
    }

    /// Records a request at `now` if the window still has room
    pub fn try_acquire(&self, now: Instant) -> bool {
        if let Ok(mut timestamps) = self.timestamps.lock() {
            while let Some(oldest) = timestamps.front() {
                if now.saturating_duration_since(*oldest) >= self.window {
                    timestamps.pop_front();
                } else {
                    break;
                }
            }
            if timestamps.len() < self.max_requests {
                timestamps.push_back(now);
                return true;
            }
        }
        false
    }

    /// Requests counted in the window ending at `now`
    pub fn in_window(&self, now: Instant) -> usize {
        self.timestamps
            .lock()
            .map(|timestamps| {
                timestamps
                    .iter()
                    .filter(|t| now.saturating_duration_since(**t) < self.window)
                    .count()
            })
            .unwrap_or(0)
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_RATE_LIMIT, DEFAULT_RATE_WINDOW)
    }
}

/// LRU cache of resolved addresses whose entries expire after `ttl`
#[derive(Debug)]
pub struct GeocodeCache {
    entries: Mutex<LruCache<String, (LatLng, Instant)>>,
    ttl: Duration,
}

impl GeocodeCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl,
        }
    }

    pub fn get(&self, address: &str, now: Instant) -> Option<LatLng> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(address) {
            Some((position, stored)) if now.saturating_duration_since(*stored) <= self.ttl => {
                Some(*position)
            }
            Some(_) => {
                entries.pop(address);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, address: &str, position: LatLng, now: Instant) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.put(address.to_string(), (position, now));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for GeocodeCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL)
    }
}

/// Puts a cache and a rate limiter in front of another geocoder.
/// Cache hits do not count against the rate limit.
pub struct CachedGeocoder<G> {
    inner: G,
    limiter: RateLimiter,
    cache: GeocodeCache,
}

impl<G: Geocoder> CachedGeocoder<G> {
    pub fn new(inner: G) -> Self {
        Self::with_parts(inner, RateLimiter::default(), GeocodeCache::default())
    }

    pub fn with_parts(inner: G, limiter: RateLimiter, cache: GeocodeCache) -> Self {
        Self {
            inner,
            limiter,
            cache,
        }
    }

    pub fn cache(&self) -> &GeocodeCache {
        &self.cache
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

#[async_trait]
impl<G: Geocoder> Geocoder for CachedGeocoder<G> {
    async fn geocode(&self, address: &str) -> Result<Option<LatLng>> {
        let key = normalize_address(address);
        if let Some(position) = self.cache.get(&key, Instant::now()) {
            log::trace!("geocode cache hit for '{}'", key);
            return Ok(Some(position));
        }

        if !self.limiter.try_acquire(Instant::now()) {
            log::warn!("geocoding rate limit reached, '{}' skipped", key);
            return Err(MapError::Ingestion("geocoding rate limit exceeded".to_string()).into());
        }

        let resolved = self.inner.geocode(&key).await?;
        if let Some(position) = resolved {
            self.cache.put(&key, position, Instant::now());
        }
        Ok(resolved)
    }
}

/// Fills coordinates of records that have an address but no position.
/// Failures only leave the record ungeocoded. Returns how many were filled.
pub async fn geocode_missing<G>(records: &mut [LocationRecord], geocoder: &G) -> usize
where
    G: Geocoder + ?Sized,
{
    let mut filled = 0;
    for record in records.iter_mut() {
        if record.has_coordinates() || record.address.trim().is_empty() {
            continue;
        }
        match geocoder.geocode(&record.address).await {
            Ok(Some(position)) if position.is_valid() => {
                record.lat = Some(position.lat);
                record.lon = Some(position.lng);
                filled += 1;
            }
            Ok(_) => log::debug!("no coordinates for '{}'", record.address),
            Err(e) => log::warn!("geocoding '{}' failed: {}", record.address, e),
        }
    }
    if filled > 0 {
        log::info!("geocoded {} of {} records", filled, records.len());
    }
    filled
}
