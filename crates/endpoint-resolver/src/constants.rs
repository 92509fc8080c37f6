//! Constants.

// ---------------------------------------------------------------------------
// Deployments
// ---------------------------------------------------------------------------

/// Operator-controlled production deployment.
pub const PRODUCTION_URL: &str = "https://waste-segregation-production.up.railway.app";

/// Operator-controlled staging deployment.
pub const STAGING_URL: &str = "https://your-staging-backend.herokuapp.com";

/// Always-reachable deployment probed first in development so a device on
/// mobile data still gets a working backend.
pub const DEVELOPMENT_REMOTE_URL: &str = "https://waste-segregation-dz7r.onrender.com";

/// Base URL used by the non-probing endpoint map in development.
pub const DEFAULT_LOCAL_URL: &str = "http://localhost:5000";

// ---------------------------------------------------------------------------
// Local discovery
// ---------------------------------------------------------------------------

/// Conventional backend port on a developer machine.
pub const DEV_PORT: u16 = 5000;

/// Android emulator alias for the host machine's loopback.
pub const ANDROID_EMULATOR_HOST: &str = "10.0.2.2";

/// Loopback / emulator hosts probed after the interface-derived candidate.
pub const LOOPBACK_HOSTS: [&str; 3] = ["localhost", ANDROID_EMULATOR_HOST, "127.0.0.1"];

/// How long a detected local IPv4 address is reused, in seconds.
pub const LOCAL_IP_TTL_SECS: u64 = 300;

// ---------------------------------------------------------------------------
// Probing
// ---------------------------------------------------------------------------

/// Per-candidate reachability timeout in milliseconds.
pub const PROBE_TIMEOUT_MS: u64 = 2000;

/// Upper bound accepted for a configured probe timeout.
pub const PROBE_TIMEOUT_MAX_MS: u64 = 30_000;

/// Health endpoint path probed on each candidate.
pub const HEALTH_PATH: &str = "/api/health";
