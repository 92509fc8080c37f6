//! HTTP client construction.
//!
//! reqwest is built without a bundled crypto provider, so the `ring`
//! provider is installed process-wide before the first client is created.

use std::sync::Once;
use std::time::Duration;

static INIT: Once = Once::new();

fn ensure_provider() {
    INIT.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Build a client for health probes: bounded connect and total time, no
/// redirects (a redirecting health endpoint is not the backend we want).
pub fn probe_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    ensure_provider();
    reqwest::Client::builder()
        .connect_timeout(timeout)
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::none())
        .build()
}
