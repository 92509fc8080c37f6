//! Backend base URL resolution.
//!
//! Production and staging resolve to their configured URLs without touching
//! the network. Development probes candidates strictly in order and takes the
//! first one that answers its health check; when none answer, the remote
//! deployment is used. Results are cached per environment until
//! [`EndpointResolver::invalidate_cache`] is called.

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::address::{AddressSource, CachedAddressSource, InterfaceAddressSource};
use crate::cache::ResolutionCache;
use crate::candidates::development_candidates;
use crate::config::ResolverConfig;
use crate::endpoints::{EndpointMap, static_endpoints};
use crate::environment::{Environment, EnvironmentInfo};
use crate::error::{ConfigError, Result};
use crate::probe::{HttpProbe, Probe};

/// Default wiring: HTTP health probes and the OS interface table.
pub type DefaultResolver = EndpointResolver<HttpProbe, CachedAddressSource<InterfaceAddressSource>>;

pub struct EndpointResolver<P, A> {
    config: ResolverConfig,
    probe: P,
    addresses: A,
    active: RwLock<Environment>,
    // Only ever locked briefly; never held across an await.
    cache: Mutex<ResolutionCache>,
    // Held for a whole development probe run so concurrent development
    // callers share one run. Static environments never touch it.
    discovery: tokio::sync::Mutex<()>,
}

impl DefaultResolver {
    pub fn from_config(config: ResolverConfig) -> Result<Self> {
        let probe = HttpProbe::new(&config.probe).map_err(ConfigError::Client)?;
        let addresses = CachedAddressSource::new(InterfaceAddressSource, config.local_ip_ttl());
        Ok(Self::new(config, probe, addresses))
    }
}

impl<P: Probe, A: AddressSource> EndpointResolver<P, A> {
    pub fn new(config: ResolverConfig, probe: P, addresses: A) -> Self {
        let active = RwLock::new(config.environment);
        Self {
            config,
            probe,
            addresses,
            active,
            cache: Mutex::new(ResolutionCache::default()),
            discovery: tokio::sync::Mutex::new(()),
        }
    }

    fn cache(&self) -> MutexGuard<'_, ResolutionCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn cached(&self, env: Environment) -> Option<String> {
        let url = self.cache().get(env).map(str::to_string);
        if let Some(url) = &url {
            debug!(environment = %env, %url, "using cached base URL");
        }
        url
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The environment used by [`Self::base_url`] and [`Self::endpoints`].
    pub fn environment(&self) -> Environment {
        *self.active.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn environment_info(&self) -> EnvironmentInfo {
        self.environment().into()
    }

    /// Resolve the base URL for `env`. Never fails; the first successful
    /// resolution is reused until the cache is invalidated.
    ///
    /// Production and staging return immediately, even while a development
    /// probe run is in flight.
    pub async fn resolve_base_url(&self, env: Environment) -> String {
        if let Some(url) = self.config.static_url(env) {
            let mut cache = self.cache();
            if cache.get(env).is_none() {
                info!(environment = %env, %url, "resolved base URL");
                cache.insert(env, url.to_string());
            }
            return url.to_string();
        }

        if let Some(url) = self.cached(env) {
            return url;
        }
        let _discovery = self.discovery.lock().await;
        // Another caller may have finished a run while we waited.
        if let Some(url) = self.cached(env) {
            return url;
        }

        let generation = self.cache().generation();
        let url = self.discover().await;
        if self.cache().insert_if_current(generation, env, url.clone()) {
            info!(environment = %env, %url, "resolved base URL");
        } else {
            debug!(environment = %env, %url, "cache cleared during discovery, result not stored");
        }
        url
    }

    /// Base URL for the active environment.
    pub async fn base_url(&self) -> String {
        self.resolve_base_url(self.environment()).await
    }

    pub async fn endpoint_map(&self, env: Environment) -> EndpointMap {
        EndpointMap::new(&self.resolve_base_url(env).await)
    }

    /// Endpoint map for the active environment.
    pub async fn endpoints(&self) -> EndpointMap {
        self.endpoint_map(self.environment()).await
    }

    /// Endpoint map for the active environment without any probing.
    pub fn static_endpoints(&self) -> EndpointMap {
        static_endpoints(&self.config, self.environment())
    }

    /// Development candidates in the order they would be probed.
    pub async fn candidates(&self) -> Vec<String> {
        let local_ip = self.addresses.local_ipv4().await;
        development_candidates(&self.config, local_ip)
    }

    /// Forget every resolved base URL so the next call re-resolves.
    ///
    /// Does not wait for an in-flight probe run; that run's result is
    /// returned to its caller but not cached.
    pub async fn invalidate_cache(&self) {
        self.cache().clear();
        info!("base URL cache cleared");
    }

    /// Call when the device changes networks: drops resolved URLs and the
    /// memoized local address.
    pub async fn on_network_change(&self) {
        self.addresses.clear();
        self.invalidate_cache().await;
    }

    /// Make `name` the active environment and clear the cache.
    ///
    /// Unknown names are logged and ignored. Returns whether the switch
    /// happened.
    pub async fn switch_environment(&self, name: &str) -> bool {
        let env = match name.parse::<Environment>() {
            Ok(env) => env,
            Err(e) => {
                warn!("environment switch ignored: {e}");
                return false;
            }
        };
        let previous = {
            let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *active, env)
        };
        self.invalidate_cache().await;
        info!(from = %previous, to = %env, "switched environment");
        true
    }

    /// Current network snapshot; empty when nothing can be determined.
    pub async fn network_info(&self) -> netinfo::NetworkInfo {
        tokio::task::spawn_blocking(netinfo::snapshot)
            .await
            .unwrap_or_else(|e| {
                warn!("network info task failed: {e}");
                netinfo::NetworkInfo::default()
            })
    }

    /// Probe development candidates in order. When none answers, the result
    /// is `development.remote_url` (the deployment probed first), not
    /// `production_url`.
    async fn discover(&self) -> String {
        let start = Instant::now();
        let candidates = self.candidates().await;
        debug!(?candidates, "probing development candidates");

        for url in candidates {
            if self.probe.is_reachable(&url).await {
                info!(%url, elapsed_ms = start.elapsed().as_millis() as u64, "found reachable server");
                return url;
            }
        }

        let fallback = self.config.development.remote_url.clone();
        warn!(
            %fallback,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "no servers reachable, using remote deployment"
        );
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::net::Ipv4Addr;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct StubProbe {
        up: HashSet<String>,
        delay: Duration,
        probed: std::sync::Mutex<Vec<String>>,
    }

    impl StubProbe {
        fn up(urls: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                up: urls.iter().map(|u| u.to_string()).collect(),
                ..Self::default()
            })
        }

        fn slow(urls: &[&str], delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                up: urls.iter().map(|u| u.to_string()).collect(),
                delay,
                ..Self::default()
            })
        }

        fn probed(&self) -> Vec<String> {
            self.probed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Probe for StubProbe {
        async fn is_reachable(&self, base_url: &str) -> bool {
            self.probed.lock().unwrap().push(base_url.to_string());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.up.contains(base_url)
        }
    }

    struct FixedAddress(Option<Ipv4Addr>);

    /// Hands out 192.168.1.5, then .6, ... on successive lookups.
    #[derive(Default)]
    struct MovingAddress {
        lookups: AtomicUsize,
    }

    impl MovingAddress {
        fn lookups(&self) -> usize {
            self.lookups.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AddressSource for MovingAddress {
        async fn local_ipv4(&self) -> Option<Ipv4Addr> {
            let n = self.lookups.fetch_add(1, Ordering::SeqCst);
            Some(Ipv4Addr::new(192, 168, 1, 5 + n as u8))
        }
    }

    #[async_trait]
    impl AddressSource for FixedAddress {
        async fn local_ipv4(&self) -> Option<Ipv4Addr> {
            self.0
        }
    }

    const REMOTE: &str = "https://prod.example.com";
    const LAN: &str = "http://192.168.1.5:5000";
    const LOCALHOST: &str = "http://localhost:5000";
    const LAN_AFTER_MOVE: &str = "http://192.168.1.6:5000";

    fn config(env: Environment) -> ResolverConfig {
        let mut config = ResolverConfig {
            environment: env,
            ..ResolverConfig::default()
        };
        config.development.remote_url = REMOTE.into();
        config.development.loopback_hosts = vec!["localhost".into()];
        config
    }

    fn resolver(
        env: Environment,
        probe: Arc<StubProbe>,
    ) -> EndpointResolver<Arc<StubProbe>, FixedAddress> {
        EndpointResolver::new(
            config(env),
            probe,
            FixedAddress(Some(Ipv4Addr::new(192, 168, 1, 5))),
        )
    }

    #[tokio::test]
    async fn operator_environments_never_probe() {
        let probe = StubProbe::up(&[]);
        let r = resolver(Environment::Production, probe.clone());

        assert_eq!(
            r.resolve_base_url(Environment::Production).await,
            r.config().production_url
        );
        assert_eq!(
            r.resolve_base_url(Environment::Staging).await,
            r.config().staging_url
        );
        assert!(probe.probed().is_empty());
    }

    #[tokio::test]
    async fn first_reachable_candidate_wins() {
        let probe = StubProbe::up(&[LAN, LOCALHOST]);
        let r = resolver(Environment::Development, probe.clone());

        assert_eq!(r.resolve_base_url(Environment::Development).await, LAN);
        assert_eq!(probe.probed(), vec![REMOTE.to_string(), LAN.to_string()]);
    }

    #[tokio::test]
    async fn remote_short_circuits_local_candidates() {
        let probe = StubProbe::up(&[REMOTE, LAN]);
        let r = resolver(Environment::Development, probe.clone());

        assert_eq!(r.base_url().await, REMOTE);
        assert_eq!(probe.probed(), vec![REMOTE.to_string()]);
    }

    #[tokio::test]
    async fn nothing_reachable_falls_back_to_remote() {
        let probe = StubProbe::up(&[]);
        let r = resolver(Environment::Development, probe.clone());

        assert_eq!(r.resolve_base_url(Environment::Development).await, REMOTE);
        assert_eq!(
            probe.probed(),
            vec![REMOTE.to_string(), LAN.to_string(), LOCALHOST.to_string()]
        );
    }

    #[tokio::test]
    async fn second_call_is_served_from_cache() {
        let probe = StubProbe::up(&[LAN]);
        let r = resolver(Environment::Development, probe.clone());

        let first = r.resolve_base_url(Environment::Development).await;
        let probes_after_first = probe.probed().len();
        let second = r.resolve_base_url(Environment::Development).await;

        assert_eq!(first, second);
        assert_eq!(probe.probed().len(), probes_after_first);
    }

    #[tokio::test]
    async fn invalidate_forces_reprobe() {
        let probe = StubProbe::up(&[LAN]);
        let r = resolver(Environment::Development, probe.clone());

        r.resolve_base_url(Environment::Development).await;
        r.invalidate_cache().await;
        r.resolve_base_url(Environment::Development).await;

        assert_eq!(probe.probed().len(), 4);
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_probe_run() {
        let probe = StubProbe::up(&[LAN]);
        let r = Arc::new(resolver(Environment::Development, probe.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let r = r.clone();
                tokio::spawn(async move { r.resolve_base_url(Environment::Development).await })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.await.unwrap(), LAN);
        }
        assert_eq!(probe.probed().len(), 2);
    }

    #[tokio::test]
    async fn missing_local_ip_probes_fallback_host() {
        let probe = StubProbe::up(&["http://10.0.2.2:5000"]);
        let r = EndpointResolver::new(
            config(Environment::Development),
            probe.clone(),
            FixedAddress(None),
        );

        assert_eq!(r.base_url().await, "http://10.0.2.2:5000");
        assert_eq!(probe.probed().get(1).map(String::as_str), Some("http://10.0.2.2:5000"));
    }

    #[tokio::test]
    async fn endpoint_map_derives_from_resolved_base() {
        let probe = StubProbe::up(&[LAN]);
        let r = resolver(Environment::Development, probe);

        let map = r.endpoints().await;
        assert_eq!(map.base_url(), LAN);
        assert_eq!(map.submit_report(), format!("{LAN}/api/mobile/report-garbage"));
        assert_eq!(map.dashboard(), format!("{LAN}/api/mobile/dashboard"));
        assert_eq!(map.get_image("abc123"), format!("{LAN}/api/requests/abc123/image"));
    }

    #[tokio::test]
    async fn switch_environment_changes_active_and_clears_cache() {
        let probe = StubProbe::up(&[LAN]);
        let r = resolver(Environment::Development, probe.clone());

        r.base_url().await;
        assert!(r.switch_environment("staging").await);
        assert_eq!(r.environment(), Environment::Staging);
        assert!(r.environment_info().is_staging);
        assert_eq!(r.base_url().await, r.config().staging_url);

        assert!(r.switch_environment("development").await);
        r.base_url().await;
        assert_eq!(probe.probed().len(), 4);
    }

    #[tokio::test]
    async fn unknown_environment_is_a_no_op() {
        let probe = StubProbe::up(&[LAN]);
        let r = resolver(Environment::Development, probe.clone());

        r.base_url().await;
        assert!(!r.switch_environment("qa").await);
        assert_eq!(r.environment(), Environment::Development);
        r.base_url().await;
        assert_eq!(probe.probed().len(), 2);
    }

    #[tokio::test]
    async fn resolution_is_deterministic_across_fresh_resolvers() {
        let mut winners = HashSet::new();
        for _ in 0..5 {
            let r = resolver(Environment::Development, StubProbe::up(&[LAN, LOCALHOST]));
            winners.insert(r.base_url().await);
        }
        assert_eq!(winners.len(), 1);
        assert!(winners.contains(LAN));
    }

    #[tokio::test]
    async fn static_environments_do_not_wait_for_discovery() {
        // Three unreachable candidates at 300ms each.
        let probe = StubProbe::slow(&[], Duration::from_millis(300));
        let r = Arc::new(resolver(Environment::Development, probe));

        let dev = tokio::spawn({
            let r = r.clone();
            async move { r.resolve_base_url(Environment::Development).await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let production = tokio::time::timeout(
            Duration::from_millis(100),
            r.resolve_base_url(Environment::Production),
        )
        .await
        .expect("production resolve waited on discovery");
        assert_eq!(production, r.config().production_url);

        let staging = tokio::time::timeout(
            Duration::from_millis(100),
            r.resolve_base_url(Environment::Staging),
        )
        .await
        .expect("staging resolve waited on discovery");
        assert_eq!(staging, r.config().staging_url);

        assert_eq!(dev.await.unwrap(), REMOTE);
    }

    #[tokio::test]
    async fn invalidate_during_discovery_does_not_wait_or_keep_stale_result() {
        let probe = StubProbe::slow(&[LAN], Duration::from_millis(200));
        let r = Arc::new(resolver(Environment::Development, probe.clone()));

        let dev = tokio::spawn({
            let r = r.clone();
            async move { r.resolve_base_url(Environment::Development).await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        tokio::time::timeout(Duration::from_millis(100), r.invalidate_cache())
            .await
            .expect("invalidate waited on discovery");
        assert_eq!(dev.await.unwrap(), LAN);

        // The run that straddled the clear was not cached, so discovery runs again.
        r.resolve_base_url(Environment::Development).await;
        assert_eq!(probe.probed().len(), 4);
    }

    #[tokio::test]
    async fn network_change_refreshes_local_address() {
        let probe = StubProbe::up(&[LAN, LAN_AFTER_MOVE]);
        let addresses = Arc::new(MovingAddress::default());
        let r = EndpointResolver::new(
            config(Environment::Development),
            probe.clone(),
            CachedAddressSource::new(addresses.clone(), Duration::from_secs(300)),
        );

        assert_eq!(r.base_url().await, LAN);

        // Plain invalidation keeps the memoized address.
        r.invalidate_cache().await;
        assert_eq!(r.base_url().await, LAN);
        assert_eq!(addresses.lookups(), 1);

        r.on_network_change().await;
        assert_eq!(r.base_url().await, LAN_AFTER_MOVE);
        assert_eq!(addresses.lookups(), 2);
        assert_eq!(probe.probed().last().map(String::as_str), Some(LAN_AFTER_MOVE));
    }
}
