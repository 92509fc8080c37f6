//! Local IPv4 address lookup for the interface-derived development candidate.

use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, warn};

#[async_trait]
pub trait AddressSource: Send + Sync {
    /// The device's current LAN IPv4 address, if one can be determined.
    async fn local_ipv4(&self) -> Option<Ipv4Addr>;

    /// Drop any memoized address. No-op for uncached sources.
    fn clear(&self) {}
}

#[async_trait]
impl<A: AddressSource + ?Sized> AddressSource for Arc<A> {
    async fn local_ipv4(&self) -> Option<Ipv4Addr> {
        (**self).local_ipv4().await
    }

    fn clear(&self) {
        (**self).clear();
    }
}

/// Reads the primary address from the OS interface table.
#[derive(Debug, Default, Clone, Copy)]
pub struct InterfaceAddressSource;

#[async_trait]
impl AddressSource for InterfaceAddressSource {
    async fn local_ipv4(&self) -> Option<Ipv4Addr> {
        match tokio::task::spawn_blocking(netinfo::primary_ipv4).await {
            Ok(Ok(ip)) => ip,
            Ok(Err(e)) => {
                warn!("local IP lookup failed: {e}");
                None
            }
            Err(e) => {
                warn!("local IP lookup task failed: {e}");
                None
            }
        }
    }
}

/// Memoizes a successful lookup for `ttl`.
///
/// Failed lookups are not cached, so the next call retries the source.
pub struct CachedAddressSource<S> {
    inner: S,
    ttl: Duration,
    cached: Mutex<Option<(Ipv4Addr, Instant)>>,
}

impl<S> CachedAddressSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cached: Mutex::new(None),
        }
    }

    fn fresh(&self) -> Option<Ipv4Addr> {
        let entry = *self.cached.lock().ok()?;
        entry
            .filter(|(_, at)| at.elapsed() < self.ttl)
            .map(|(ip, _)| ip)
    }

    fn store(&self, ip: Ipv4Addr) {
        if let Ok(mut guard) = self.cached.lock() {
            *guard = Some((ip, Instant::now()));
        }
    }
}

#[async_trait]
impl<S: AddressSource> AddressSource for CachedAddressSource<S> {
    async fn local_ipv4(&self) -> Option<Ipv4Addr> {
        if let Some(ip) = self.fresh() {
            debug!(%ip, "using cached local IP");
            return Some(ip);
        }
        let ip = self.inner.local_ipv4().await?;
        debug!(%ip, "detected local IP");
        self.store(ip);
        Some(ip)
    }

    fn clear(&self) {
        if let Ok(mut guard) = self.cached.lock() {
            *guard = None;
        }
        self.inner.clear();
        debug!("local IP cache cleared");
    }
}
