use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::{num::NonZeroU32, sync::Arc};

/// Mapbox's default geocoding quota.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 600;

/// Request budget shared by every call made through one provider. Clones
/// draw from the same budget.
#[derive(Clone)]
pub struct RequestLimiter {
    inner: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    per_minute: NonZeroU32,
}

impl RequestLimiter {
    pub fn per_minute(per_minute: NonZeroU32) -> Self {
        Self {
            inner: Arc::new(RateLimiter::direct(Quota::per_minute(per_minute))),
            per_minute,
        }
    }

    pub fn quota(&self) -> u32 {
        self.per_minute.get()
    }

    /// Takes a permit without waiting, if one is free.
    pub fn try_acquire(&self) -> bool {
        self.inner.check().is_ok()
    }

    /// Waits until a permit is free and takes it.
    pub async fn acquire(&self) {
        if self.try_acquire() {
            return;
        }
        log::debug!("Request budget of {}/min used up, waiting", self.quota());
        self.inner.until_ready().await;
    }
}
