//! Fleet-wide collection of per-instance results.

use crate::models::{FleetReport, InstanceConfig, InstanceResult};
use crate::prober::InstanceProber;
use chrono::Local;
use futures::stream::{self, StreamExt};
use std::time::Instant;
use tracing::info;

pub struct FleetCollector {
    prober: InstanceProber,
    max_concurrent: usize,
}

impl FleetCollector {
    /// Sequential collector: one probe at a time, in configuration order.
    pub fn new(prober: InstanceProber) -> Self {
        Self {
            prober,
            max_concurrent: 1,
        }
    }

    /// Allow up to `max_concurrent` probes in flight. Values below 2 keep sequential mode.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Probe every instance; results come back in the same order as `configs`.
    pub async fn collect(&self, configs: &[InstanceConfig]) -> Vec<InstanceResult> {
        info!(
            "Probing {} instance(s), {} index(es) each",
            configs.len(),
            self.prober.indexes().len()
        );

        if self.max_concurrent <= 1 {
            let mut results = Vec::with_capacity(configs.len());
            for (i, config) in configs.iter().enumerate() {
                results.push(self.prober.probe(config, i + 1).await);
            }
            return results;
        }

        // `buffered` yields in submission order, whatever order probes finish in.
        stream::iter(configs.iter().enumerate())
            .map(|(i, config)| self.prober.probe(config, i + 1))
            .buffered(self.max_concurrent)
            .collect()
            .await
    }

    /// Collect the whole fleet and wrap the results with run metadata.
    pub async fn report(&self, configs: &[InstanceConfig], build_number: &str) -> FleetReport {
        let start = Instant::now();
        let generated_at = Local::now();
        let results = self.collect(configs).await;
        FleetReport {
            build_number: build_number.to_string(),
            generated_at,
            results,
            total_elapsed_secs: start.elapsed().as_secs_f64(),
        }
    }
}
