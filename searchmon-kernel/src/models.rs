//! Data model shared by the prober, the collector and the renderers.
//!
//! Everything here is created fresh for a monitoring run and dropped once the
//! report has been printed and delivered.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;

/// Connection parameters for one monitored store instance.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct InstanceConfig {
    pub host: String,
    pub port: u16,
    #[serde(skip)] // Never serialize passwords
    pub credential: Option<String>,
}

impl InstanceConfig {
    pub fn new(host: impl Into<String>, port: u16, credential: Option<String>) -> Self {
        Self {
            host: host.into(),
            port,
            credential,
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for InstanceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("credential", &self.credential.as_ref().map(|_| "***"))
            .finish()
    }
}

/// A search index to inspect: display name shown in reports, physical index id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexTarget {
    pub name: String,
    pub index: String,
}

impl IndexTarget {
    pub fn new(name: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: index.into(),
        }
    }
}

/// The standard index set probed on every instance.
pub fn default_indexes() -> Vec<IndexTarget> {
    vec![
        IndexTarget::new("POI Index", "poi-idx"),
        IndexTarget::new("Entry POI Index", "entry-poi-idx"),
        IndexTarget::new("EVSE Power Index", "evse-power-idx"),
    ]
}

/// Store-reported value passed through without interpretation (memory usage).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Metric {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Default for Metric {
    fn default() -> Self {
        Metric::Int(0)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Int(v) => write!(f, "{v}"),
            Metric::Float(v) => write!(f, "{v}"),
            Metric::Text(v) => f.write_str(v),
        }
    }
}

/// Figures extracted from a healthy `FT.INFO` reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexStats {
    pub num_docs: u64,
    pub total_indexing_time_secs: f64,
    pub memory_used_mb: Metric,
    pub indexing_failures: u64,
}

/// Outcome of inspecting one index on one instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IndexStatus {
    Active(IndexStats),
    NotFound,
    ModuleUnavailable,
    Unsupported { message: String },
    Failed { message: String },
}

impl IndexStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, IndexStatus::Active(_))
    }

    /// Short human-readable status line.
    pub fn describe(&self) -> String {
        match self {
            IndexStatus::Active(_) => "active".to_string(),
            IndexStatus::NotFound => "index not found".to_string(),
            IndexStatus::ModuleUnavailable => "RediSearch module not loaded".to_string(),
            IndexStatus::Unsupported { message } | IndexStatus::Failed { message } => {
                format!("error: {message}")
            }
        }
    }
}

/// One inspected index inside a successful instance probe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexReport {
    pub name: String,
    pub index: String,
    #[serde(flatten)]
    pub status: IndexStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceErrorKind {
    ConnectionFailure,
    AuthFailure,
    Unexpected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProbeOutcome {
    Success { indexes: Vec<IndexReport> },
    Error { kind: InstanceErrorKind, message: String },
}

/// Result of probing one instance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceResult {
    pub label: String,
    pub outcome: ProbeOutcome,
    pub elapsed_secs: f64,
}

impl InstanceResult {
    pub fn label_for(position: usize, config: &InstanceConfig) -> String {
        format!("Redis Instance {} ({})", position, config.host)
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, ProbeOutcome::Success { .. })
    }
}

/// Everything a monitoring run produced, as handed to the renderers.
#[derive(Debug, Clone, Serialize)]
pub struct FleetReport {
    pub build_number: String,
    pub generated_at: DateTime<Local>,
    pub results: Vec<InstanceResult>,
    pub total_elapsed_secs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_is_redacted_in_debug() {
        let config = InstanceConfig::new("10.0.0.1", 6379, Some("hunter2".into()));
        let debug = format!("{config:?}");
        assert!(debug.contains("10.0.0.1"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_status_descriptions() {
        assert_eq!(IndexStatus::NotFound.describe(), "index not found");
        assert_eq!(IndexStatus::ModuleUnavailable.describe(), "RediSearch module not loaded");
        assert_eq!(
            IndexStatus::Unsupported { message: "ERR wrong arity".into() }.describe(),
            "error: ERR wrong arity"
        );
    }

    #[test]
    fn test_label_uses_one_based_position() {
        let config = InstanceConfig::new("192.168.8.226", 6379, None);
        assert_eq!(InstanceResult::label_for(1, &config), "Redis Instance 1 (192.168.8.226)");
    }

    #[test]
    fn test_metric_passthrough_display() {
        assert_eq!(Metric::Int(12).to_string(), "12");
        assert_eq!(Metric::Text("0.4520".into()).to_string(), "0.4520");
        assert_eq!(Metric::default(), Metric::Int(0));
    }

    #[test]
    fn test_status_serializes_with_tag() {
        let json = serde_json::to_value(IndexStatus::NotFound).unwrap();
        assert_eq!(json["status"], "not_found");
    }
}
