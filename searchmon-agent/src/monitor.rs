//! One monitoring pass: load config, probe the fleet, print, notify.

use crate::cli::Cli;
use crate::config::{MonitorConfig, NotifierConf};
use crate::notifier::WebhookNotifier;
use anyhow::{Context, Result};
use searchmon_kernel::report::{render_card, render_console, MessageCard};
use searchmon_kernel::{FleetCollector, FleetReport, InstanceProber, StoreConnector};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// What happened to the webhook notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    Skipped(&'static str),
    Failed(String),
}

/// Probe every configured instance.
pub async fn collect_report(
    config: &MonitorConfig,
    connector: Arc<dyn StoreConnector>,
    build_number: &str,
) -> Result<FleetReport> {
    let instances = config
        .instance_configs()
        .context("Failed to resolve instance credentials")?;
    let prober = InstanceProber::new(connector, config.index_targets(), config.connect_options());
    let collector =
        FleetCollector::new(prober).with_max_concurrent(config.probe.max_concurrent_probes);

    Ok(collector.report(&instances, build_number).await)
}

/// Post the card if a webhook is configured. Failures are logged, never returned.
pub async fn deliver(notifier: &NotifierConf, card: &MessageCard, enabled: bool) -> Delivery {
    if !enabled {
        info!("Notification disabled by --no-notify");
        return Delivery::Skipped("disabled");
    }
    let Some(url) = notifier.webhook_url.as_deref() else {
        warn!("No webhook_url configured, skipping notification");
        return Delivery::Skipped("no webhook configured");
    };

    let result = match WebhookNotifier::new(url, Duration::from_secs(notifier.timeout_secs)) {
        Ok(client) => client.send(card).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => Delivery::Delivered,
        Err(e) => {
            error!("Failed to send notification: {e}");
            Delivery::Failed(e.to_string())
        }
    }
}

/// Full run as driven by the binary; report text goes to `out`.
pub async fn run<W: Write>(
    cli: &Cli,
    connector: Arc<dyn StoreConnector>,
    out: &mut W,
) -> Result<Delivery> {
    let path = MonitorConfig::resolve_path(cli.config.as_deref());
    let config = MonitorConfig::load(&path)
        .await
        .with_context(|| format!("Failed to load config {}", path.display()))?;

    info!("Starting RediSearch index monitoring (build {})...", cli.build_number);
    let report = collect_report(&config, connector, &cli.build_number).await?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        writeln!(out, "{json}")?;
    } else {
        write!(out, "{}", render_console(&report))?;
    }

    let delivery = deliver(&config.notifier, &render_card(&report), !cli.no_notify).await;
    match &delivery {
        Delivery::Delivered => writeln!(out, "Successfully sent notification")?,
        Delivery::Failed(reason) => writeln!(out, "Failed to send notification: {reason}")?,
        Delivery::Skipped(_) => {}
    }
    Ok(delivery)
}
