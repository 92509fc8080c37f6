//! Resolver configuration, loaded from YAML.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! stock deployment URLs. Loaded configs are validated and normalized before
//! use: URLs must be bare `http(s)://host[:port]` origins and lose any
//! trailing slash.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::environment::Environment;
use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    /// Active environment at startup.
    pub environment: Environment,
    pub production_url: String,
    pub staging_url: String,
    pub development: DevelopmentConfig,
    pub probe: ProbeConfig,
    /// How long a detected local IPv4 address is reused.
    pub local_ip_ttl_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DevelopmentConfig {
    /// Deployment probed first, and returned when nothing answers.
    pub remote_url: String,
    pub port: u16,
    /// Host used for the interface-derived candidate when no address is found.
    pub fallback_host: String,
    pub loopback_hosts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    pub timeout_ms: u64,
    pub health_path: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            production_url: constants::PRODUCTION_URL.to_string(),
            staging_url: constants::STAGING_URL.to_string(),
            development: DevelopmentConfig::default(),
            probe: ProbeConfig::default(),
            local_ip_ttl_secs: constants::LOCAL_IP_TTL_SECS,
        }
    }
}

impl Default for DevelopmentConfig {
    fn default() -> Self {
        Self {
            remote_url: constants::DEVELOPMENT_REMOTE_URL.to_string(),
            port: constants::DEV_PORT,
            fallback_host: constants::ANDROID_EMULATOR_HOST.to_string(),
            loopback_hosts: constants::LOOPBACK_HOSTS
                .iter()
                .map(|h| h.to_string())
                .collect(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: constants::PROBE_TIMEOUT_MS,
            health_path: constants::HEALTH_PATH.to_string(),
        }
    }
}

impl ProbeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ResolverConfig {
    /// URL for an operator-controlled environment. Development has none.
    pub fn static_url(&self, env: Environment) -> Option<&str> {
        match env {
            Environment::Production => Some(&self.production_url),
            Environment::Staging => Some(&self.staging_url),
            Environment::Development => None,
        }
    }

    pub fn local_ip_ttl(&self) -> Duration {
        Duration::from_secs(self.local_ip_ttl_secs)
    }

    /// Validate every field and normalize URLs in place.
    pub fn validate(mut self) -> Result<Self> {
        self.production_url = normalize_origin("production_url", &self.production_url)?;
        self.staging_url = normalize_origin("staging_url", &self.staging_url)?;
        self.development.remote_url =
            normalize_origin("development.remote_url", &self.development.remote_url)?;

        if self.development.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "development.port",
                reason: "must be non-zero".into(),
            });
        }
        check_host("development.fallback_host", &self.development.fallback_host)?;
        for host in &self.development.loopback_hosts {
            check_host("development.loopback_hosts", host)?;
        }

        if !(1..=constants::PROBE_TIMEOUT_MAX_MS).contains(&self.probe.timeout_ms) {
            return Err(ConfigError::InvalidValue {
                field: "probe.timeout_ms",
                reason: format!(
                    "{} is outside 1..={}",
                    self.probe.timeout_ms,
                    constants::PROBE_TIMEOUT_MAX_MS
                ),
            });
        }
        if !self.probe.health_path.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "probe.health_path",
                reason: format!("{:?} must start with '/'", self.probe.health_path),
            });
        }

        Ok(self)
    }
}

/// Trim and strip trailing slashes, then require a bare http(s) origin.
fn normalize_origin(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim().trim_end_matches('/');
    let invalid = |reason: &str| ConfigError::InvalidUrl {
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    };
    let parsed = url::Url::parse(trimmed).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host"));
    }
    if parsed.path() != "/" || parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("must not contain a path, query or fragment"));
    }
    Ok(trimmed.to_string())
}

fn check_host(field: &'static str, host: &str) -> Result<()> {
    let probe = format!("http://{host}:{}", constants::DEV_PORT);
    let ok = !host.is_empty()
        && !host.contains(['/', '?', '#', '@'])
        && url::Url::parse(&probe).is_ok_and(|u| u.host_str().is_some());
    if ok {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            field,
            reason: format!("{host:?} is not a valid host"),
        })
    }
}

/// Parse a YAML document into a validated config.
pub fn parse(content: &str, origin: &str) -> Result<ResolverConfig> {
    // An empty document deserializes as unit, not as a defaulted struct.
    if content.trim().is_empty() {
        return ResolverConfig::default().validate();
    }
    let config: ResolverConfig =
        serde_yaml_ng::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })?;
    config.validate()
}

/// Load and validate a config file.
pub async fn load(path: &Path) -> Result<ResolverConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
    parse(&content, &path.display().to_string())
}
