//! Named backend operation URLs derived from a resolved base URL.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::config::ResolverConfig;
use crate::constants;
use crate::environment::Environment;

// ---------------------------------------------------------------------------
// Path suffixes
// ---------------------------------------------------------------------------

pub const WASTE_DETECTION_PATH: &str = "/api/mobile/detect";
pub const GEMINI_CLASSIFICATION_PATH: &str = "/api/gemini-classify";
pub const SUBMIT_REPORT_PATH: &str = "/api/mobile/report-garbage";
pub const DASHBOARD_PATH: &str = "/api/mobile/dashboard";
pub const UPDATE_STATUS_PATH: &str = "/api/mobile/update-status";
pub const YOUTUBE_SUGGESTIONS_PATH: &str = "/api/youtube-suggestions";
pub const HEALTH_PATH: &str = "/api/health";

/// Fully-qualified URLs for every backend operation.
///
/// Only constructible from a base URL, so every entry always agrees with
/// [`EndpointMap::base_url`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointMap {
    base_url: String,
    waste_detection: String,
    gemini_classification: String,
    submit_report: String,
    dashboard: String,
    update_status: String,
    youtube_suggestions: String,
    health: String,
}

impl EndpointMap {
    pub fn new(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let join = |path: &str| format!("{base}{path}");
        Self {
            base_url: base.to_string(),
            waste_detection: join(WASTE_DETECTION_PATH),
            gemini_classification: join(GEMINI_CLASSIFICATION_PATH),
            submit_report: join(SUBMIT_REPORT_PATH),
            dashboard: join(DASHBOARD_PATH),
            update_status: join(UPDATE_STATUS_PATH),
            youtube_suggestions: join(YOUTUBE_SUGGESTIONS_PATH),
            health: join(HEALTH_PATH),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
    pub fn waste_detection(&self) -> &str {
        &self.waste_detection
    }
    pub fn gemini_classification(&self) -> &str {
        &self.gemini_classification
    }
    pub fn submit_report(&self) -> &str {
        &self.submit_report
    }
    pub fn dashboard(&self) -> &str {
        &self.dashboard
    }
    pub fn update_status(&self) -> &str {
        &self.update_status
    }
    pub fn youtube_suggestions(&self) -> &str {
        &self.youtube_suggestions
    }
    pub fn health(&self) -> &str {
        &self.health
    }

    /// Image URL for one report.
    pub fn get_image(&self, report_id: &str) -> String {
        format!("{}/api/requests/{report_id}/image", self.base_url)
    }

    /// Flat entries keyed by their contract names, in display order.
    /// `GET_IMAGE` is rendered as a template with an `{id}` placeholder.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("BASE_URL", self.base_url.clone()),
            ("WASTE_DETECTION", self.waste_detection.clone()),
            ("GEMINI_CLASSIFICATION", self.gemini_classification.clone()),
            ("SUBMIT_REPORT", self.submit_report.clone()),
            ("DASHBOARD", self.dashboard.clone()),
            ("UPDATE_STATUS", self.update_status.clone()),
            ("YOUTUBE_SUGGESTIONS", self.youtube_suggestions.clone()),
            ("GET_IMAGE", self.get_image("{id}")),
            ("HEALTH", self.health.clone()),
        ]
    }
}

impl Serialize for EndpointMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.entries();
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, value) in &entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Endpoint map built without any probing: the static URL of `env`, or the
/// local default for development.
pub fn static_endpoints(config: &ResolverConfig, env: Environment) -> EndpointMap {
    EndpointMap::new(
        config
            .static_url(env)
            .unwrap_or(constants::DEFAULT_LOCAL_URL),
    )
}
