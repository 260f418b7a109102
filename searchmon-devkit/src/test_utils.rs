/*!
Test harness for fleet-level scenarios.

Wires a [`MockStore`] into a real [`FleetCollector`] so tests exercise the
production prober, inspector and renderers against scripted instances.
*/

use crate::store_stub::{InstanceScript, MockStore};
use anyhow::Result;
use searchmon_kernel::{
    default_indexes, ConnectOptions, FleetCollector, FleetReport, IndexReport, IndexTarget,
    InstanceConfig, InstanceErrorKind, InstanceProber, ProbeOutcome,
};
use std::sync::Arc;

pub const DEFAULT_PORT: u16 = 6379;

/// Scripted fleet plus the collector that probes it.
pub struct FleetHarness {
    pub store: MockStore,
    configs: Vec<InstanceConfig>,
    indexes: Vec<IndexTarget>,
    max_concurrent: usize,
}

impl FleetHarness {
    pub fn new() -> Self {
        env_logger::try_init().ok(); // Init logging pour tests

        Self {
            store: MockStore::new(),
            configs: Vec::new(),
            indexes: default_indexes(),
            max_concurrent: 1,
        }
    }

    /// Append an instance on the default port with the given behaviour.
    pub fn instance(self, host: &str, script: InstanceScript) -> Self {
        self.instance_at(host, DEFAULT_PORT, script)
    }

    pub fn instance_at(mut self, host: &str, port: u16, script: InstanceScript) -> Self {
        let config = InstanceConfig::new(host, port, Some("test-password".into()));
        self.store.script(config.address(), script);
        self.configs.push(config);
        self
    }

    pub fn with_indexes(mut self, indexes: Vec<IndexTarget>) -> Self {
        self.indexes = indexes;
        self
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    pub fn configs(&self) -> &[InstanceConfig] {
        &self.configs
    }

    pub fn connector(&self) -> Arc<MockStore> {
        Arc::new(self.store.clone())
    }

    pub fn collector(&self) -> FleetCollector {
        let prober = InstanceProber::new(
            self.connector(),
            self.indexes.clone(),
            ConnectOptions::default(),
        );
        FleetCollector::new(prober).with_max_concurrent(self.max_concurrent)
    }

    /// Probe the whole scripted fleet.
    pub async fn run(&self, build_number: &str) -> FleetReport {
        log::info!("Running harness over {} instance(s)", self.configs.len());
        self.collector().report(&self.configs, build_number).await
    }
}

impl Default for FleetHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Index reports of a successful probe at 1-based `position`.
pub fn expect_success(report: &FleetReport, position: usize) -> Result<&[IndexReport]> {
    let result = position
        .checked_sub(1)
        .and_then(|i| report.results.get(i))
        .ok_or_else(|| anyhow::anyhow!("no result at position {}", position))?;
    match &result.outcome {
        ProbeOutcome::Success { indexes } => Ok(indexes.as_slice()),
        ProbeOutcome::Error { message, .. } => {
            anyhow::bail!("{} failed unexpectedly: {}", result.label, message)
        }
    }
}

/// Error kind and message of a failed probe at 1-based `position`.
pub fn expect_error(report: &FleetReport, position: usize) -> Result<(InstanceErrorKind, &str)> {
    let result = position
        .checked_sub(1)
        .and_then(|i| report.results.get(i))
        .ok_or_else(|| anyhow::anyhow!("no result at position {}", position))?;
    match &result.outcome {
        ProbeOutcome::Error { kind, message } => Ok((*kind, message.as_str())),
        ProbeOutcome::Success { .. } => anyhow::bail!("{} succeeded unexpectedly", result.label),
    }
}
