use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::{
    entities::Coordinates,
    error::{provider_unavailable_error, Error},
    external::{DynRouteProvider, ProviderRoute},
};

/// Routes kept before the oldest cached entry is evicted.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

#[derive(Default)]
struct RouteCache {
    routes: HashMap<String, ProviderRoute>,
    insertion_order: VecDeque<String>,
}

impl RouteCache {
    fn insert(&mut self, key: String, route: ProviderRoute, capacity: usize) {
        if capacity == 0 {
            return;
        }

        if self.routes.insert(key.clone(), route).is_none() {
            self.insertion_order.push_back(key);
        }

        while self.routes.len() > capacity {
            match self.insertion_order.pop_front() {
                Some(oldest) => {
                    self.routes.remove(&oldest);
                }
                None => break,
            }
        }
    }

    fn clear(&mut self) {
        self.routes.clear();
        self.insertion_order.clear();
    }
}

/// Owns a route provider together with a bounded result cache and an
/// upstream call counter. Constructed explicitly and handed to whoever needs
/// routes.
pub struct RouteService {
    provider: DynRouteProvider,
    cache: Mutex<RouteCache>,
    capacity: usize,
    api_calls: AtomicU64,
}

fn cache_key(origin: Coordinates, destination: Coordinates) -> String {
    format!(
        "{:.5},{:.5}|{:.5},{:.5}",
        origin.latitude, origin.longitude, destination.latitude, destination.longitude
    )
}

impl RouteService {
    pub fn new(provider: DynRouteProvider) -> Self {
        Self::with_capacity(provider, DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(provider: DynRouteProvider, capacity: usize) -> Self {
        Self {
            provider,
            cache: Mutex::new(RouteCache::default()),
            capacity,
            api_calls: AtomicU64::new(0),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.provider.is_loaded()
    }

    /// Number of requests that reached the provider.
    pub fn api_calls(&self) -> u64 {
        self.api_calls.load(Ordering::Relaxed)
    }

    pub fn cached_routes(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .routes
            .len()
    }

    pub fn clear_cache(&self) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<ProviderRoute, Error> {
        if !self.provider.is_loaded() {
            return Err(provider_unavailable_error());
        }

        let key = cache_key(origin, destination);

        let cached = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .routes
            .get(&key)
            .cloned();

        if let Some(route) = cached {
            tracing::debug!("route cache hit");
            return Ok(route);
        }

        self.api_calls.fetch_add(1, Ordering::Relaxed);
        let route = self.provider.get_route(origin, destination).await?;

        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, route.clone(), self.capacity);

        Ok(route)
    }
}
