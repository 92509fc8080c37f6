//! Reachability probing of candidate base URLs.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::ProbeConfig;
use crate::http;

/// Answers whether a backend is currently serving traffic at a base URL.
///
/// Implementations never fail: every error is a `false`.
#[async_trait]
pub trait Probe: Send + Sync {
    async fn is_reachable(&self, base_url: &str) -> bool;
}

#[async_trait]
impl<P: Probe + ?Sized> Probe for Arc<P> {
    async fn is_reachable(&self, base_url: &str) -> bool {
        (**self).is_reachable(base_url).await
    }
}

/// GETs `{base_url}{health_path}` and accepts any 2xx within the deadline.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    timeout: Duration,
    health_path: String,
}

impl HttpProbe {
    pub fn new(config: &ProbeConfig) -> reqwest::Result<Self> {
        Ok(Self {
            client: http::probe_client(config.timeout())?,
            timeout: config.timeout(),
            health_path: config.health_path.clone(),
        })
    }

    pub fn health_url(&self, base_url: &str) -> String {
        format!("{base_url}{}", self.health_path)
    }
}

#[async_trait]
impl Probe for HttpProbe {
    async fn is_reachable(&self, base_url: &str) -> bool {
        let url = self.health_url(base_url);
        let start = Instant::now();
        // The client carries the same timeout; the outer deadline also covers
        // time spent before the request is dispatched.
        let outcome = tokio::time::timeout(self.timeout, self.client.get(&url).send()).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match outcome {
            Ok(Ok(resp)) if resp.status().is_success() => {
                debug!(%url, elapsed_ms, "health check ok");
                true
            }
            Ok(Ok(resp)) => {
                info!(%url, status = resp.status().as_u16(), elapsed_ms, "health check failed");
                false
            }
            Ok(Err(e)) if e.is_timeout() => {
                info!(%url, elapsed_ms, "server timeout");
                false
            }
            Ok(Err(e)) => {
                info!(%url, elapsed_ms, error = %e, "server not reachable");
                false
            }
            Err(_) => {
                info!(%url, elapsed_ms, "server timeout");
                false
            }
        }
    }
}
