//! Configuration management
//!
//! Handles:
//! - YAML file discovery (`--config`, `SEARCHMON_CONFIG`, `searchmon.yaml`)
//! - Instance list and index set
//! - Probe timeouts / parallelism
//! - Webhook settings

use searchmon_kernel::{default_indexes, ConnectOptions, IndexTarget, InstanceConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const CONFIG_ENV: &str = "SEARCHMON_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "searchmon.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub instances: Vec<InstanceConf>,
    #[serde(default = "default_index_confs")]
    pub indexes: Vec<IndexConf>,
    #[serde(default)]
    pub probe: ProbeConf,
    #[serde(default)]
    pub notifier: NotifierConf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceConf {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default, skip_serializing)] // Never serialize passwords
    pub password: Option<String>,
    /// Environment variable holding the password.
    #[serde(default)]
    pub password_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConf {
    pub name: String,
    pub index: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConf {
    pub connect_timeout_secs: u64,
    pub operation_timeout_secs: u64,
    pub keepalive: bool,
    pub retry_on_timeout: bool,
    pub max_retries: usize,
    pub max_concurrent_probes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConf {
    pub webhook_url: Option<String>,
    pub timeout_secs: u64,
}

fn default_port() -> u16 {
    6379
}

fn default_index_confs() -> Vec<IndexConf> {
    default_indexes()
        .into_iter()
        .map(|t| IndexConf {
            name: t.name,
            index: t.index,
        })
        .collect()
}

impl Default for ProbeConf {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            operation_timeout_secs: 30,
            keepalive: true,
            retry_on_timeout: true,
            max_retries: 2,
            max_concurrent_probes: 1,
        }
    }
}

impl Default for NotifierConf {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: 10,
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            instances: vec![InstanceConf {
                host: "127.0.0.1".to_string(),
                port: default_port(),
                password: None,
                password_env: None,
            }],
            indexes: default_index_confs(),
            probe: ProbeConf::default(),
            notifier: NotifierConf::default(),
        }
    }
}

impl MonitorConfig {
    /// Resolve the config file path: explicit flag, then env var, then the default name.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Load and validate the config. A missing file falls back to defaults.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            warn!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let config = Self::from_yaml(&text).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        info!(
            "Loaded config {} ({} instances, {} indexes)",
            path.display(),
            config.instances.len(),
            config.indexes.len()
        );
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.instances.is_empty() {
            return Err(ConfigError::Invalid("no instances configured".into()));
        }
        if let Some(i) = self.instances.iter().position(|i| i.host.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("instance {} has an empty host", i + 1)));
        }
        if self.indexes.is_empty() {
            return Err(ConfigError::Invalid("no indexes configured".into()));
        }
        let mut seen = HashSet::new();
        for index in &self.indexes {
            if !seen.insert(index.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate index name '{}'",
                    index.name
                )));
            }
        }
        if self.probe.connect_timeout_secs == 0 || self.probe.operation_timeout_secs == 0 {
            return Err(ConfigError::Invalid("probe timeouts must be greater than zero".into()));
        }
        if self.notifier.timeout_secs == 0 {
            return Err(ConfigError::Invalid("notifier timeout must be greater than zero".into()));
        }
        Ok(())
    }

    /// Instance list handed to the collector, with passwords resolved.
    pub fn instance_configs(&self) -> Result<Vec<InstanceConfig>, ConfigError> {
        self.instances
            .iter()
            .map(|conf| -> Result<InstanceConfig, ConfigError> {
                let credential = match &conf.password_env {
                    Some(var) => Some(std::env::var(var).map_err(|_| {
                        ConfigError::Invalid(format!(
                            "password_env {var} for {} is not set",
                            conf.host
                        ))
                    })?),
                    None => conf.password.clone(),
                };
                Ok(InstanceConfig::new(conf.host.clone(), conf.port, credential))
            })
            .collect()
    }

    pub fn index_targets(&self) -> Vec<IndexTarget> {
        self.indexes
            .iter()
            .map(|i| IndexTarget::new(i.name.clone(), i.index.clone()))
            .collect()
    }

    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            connect_timeout: Duration::from_secs(self.probe.connect_timeout_secs),
            operation_timeout: Duration::from_secs(self.probe.operation_timeout_secs),
            keepalive: self.probe.keepalive,
            retry_on_timeout: self.probe.retry_on_timeout,
            max_retries: self.probe.max_retries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = MonitorConfig::from_yaml("instances:\n  - host: 10.0.0.1\n").unwrap();
        assert_eq!(config.instances[0].port, 6379);
        assert_eq!(config.indexes.len(), 3);
        assert_eq!(config.indexes[0].index, "poi-idx");
        assert_eq!(config.probe.connect_timeout_secs, 5);
        assert_eq!(config.probe.operation_timeout_secs, 30);
        assert_eq!(config.probe.max_concurrent_probes, 1);
        assert_eq!(config.notifier.timeout_secs, 10);
        assert!(config.notifier.webhook_url.is_none());
    }

    #[test]
    fn test_full_config() {
        let yaml = r#"
instances:
  - host: 192.168.8.226
    port: 6380
    password: s3cret
  - host: 192.168.8.211
indexes:
  - name: Places
    index: places-idx
probe:
  connect_timeout_secs: 2
  max_concurrent_probes: 4
notifier:
  webhook_url: https://hooks.example.com/abc
"#;
        let config = MonitorConfig::from_yaml(yaml).unwrap();
        let instances = config.instance_configs().unwrap();
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[0].port, 6380);
        assert_eq!(instances[0].credential.as_deref(), Some("s3cret"));
        assert_eq!(instances[1].credential, None);
        assert_eq!(config.index_targets(), vec![IndexTarget::new("Places", "places-idx")]);

        let options = config.connect_options();
        assert_eq!(options.connect_timeout, Duration::from_secs(2));
        assert_eq!(options.operation_timeout, Duration::from_secs(30));
        assert_eq!(config.probe.max_concurrent_probes, 4);
        assert_eq!(
            config.notifier.webhook_url.as_deref(),
            Some("https://hooks.example.com/abc")
        );
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(
            MonitorConfig::from_yaml("instances: []\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            MonitorConfig::from_yaml("instances:\n  - host: ''\n"),
            Err(ConfigError::Invalid(_))
        ));
        let duplicate = "instances:\n  - host: a\nindexes:\n  - {name: X, index: x}\n  - {name: X, index: y}\n";
        assert!(matches!(
            MonitorConfig::from_yaml(duplicate),
            Err(ConfigError::Invalid(_))
        ));
        let zero = "instances:\n  - host: a\nprobe:\n  operation_timeout_secs: 0\n";
        assert!(matches!(MonitorConfig::from_yaml(zero), Err(ConfigError::Invalid(_))));
        assert!(matches!(
            MonitorConfig::from_yaml("instances: [[["),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_password_from_environment() {
        std::env::set_var("SEARCHMON_TEST_PW", "from-env");
        let yaml = "instances:\n  - host: a\n    password: ignored\n    password_env: SEARCHMON_TEST_PW\n  - host: b\n    password_env: SEARCHMON_TEST_PW_UNSET\n";
        let config = MonitorConfig::from_yaml(yaml).unwrap();
        let err = config.instance_configs().unwrap_err();
        assert!(err.to_string().contains("SEARCHMON_TEST_PW_UNSET"));

        let first_only = MonitorConfig {
            instances: config.instances[..1].to_vec(),
            ..config.clone()
        };
        let instances = first_only.instance_configs().unwrap();
        assert_eq!(instances[0].credential.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_password_is_not_serialized() {
        let config = MonitorConfig::from_yaml("instances:\n  - host: a\n    password: hunter2\n").unwrap();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("hunter2"));
    }

    #[tokio::test]
    async fn test_missing_file_falls_back_to_defaults() {
        let config = MonitorConfig::load(Path::new("/nonexistent/searchmon.yaml")).await.unwrap();
        assert_eq!(config.instances[0].host, "127.0.0.1");
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = MonitorConfig::resolve_path(Some(Path::new("custom.yaml")));
        assert_eq!(path, PathBuf::from("custom.yaml"));
    }
}
