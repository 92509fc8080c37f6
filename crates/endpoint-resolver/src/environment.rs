//! Deployment environments.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseEnvironmentError;

/// Deployment context selecting how the backend base URL is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Probe candidates to find a reachable backend.
    Development,
    Staging,
    #[default]
    Production,
}

impl Environment {
    pub const ALL: [Environment; 3] = [
        Environment::Development,
        Environment::Staging,
        Environment::Production,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    pub fn is_development(self) -> bool {
        matches!(self, Environment::Development)
    }

    pub fn is_staging(self) -> bool {
        matches!(self, Environment::Staging)
    }

    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ParseEnvironmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Environment::ALL
            .into_iter()
            .find(|env| env.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| ParseEnvironmentError(s.to_string()))
    }
}

/// Snapshot of the active environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EnvironmentInfo {
    pub current: Environment,
    pub is_development: bool,
    pub is_staging: bool,
    pub is_production: bool,
}

impl From<Environment> for EnvironmentInfo {
    fn from(current: Environment) -> Self {
        Self {
            current,
            is_development: current.is_development(),
            is_staging: current.is_staging(),
            is_production: current.is_production(),
        }
    }
}
