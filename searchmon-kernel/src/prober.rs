//! Per-instance probing: connect, ping, inspect every configured index.

use crate::inspector;
use crate::models::{
    IndexReport, IndexTarget, InstanceConfig, InstanceErrorKind, InstanceResult, ProbeOutcome,
};
use crate::store::{ConnectOptions, StoreConnection, StoreConnector, StoreError};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub const AUTH_FAILED_MESSAGE: &str = "Authentication failed";

/// Probes one instance at a time with a fixed index set and connection options.
#[derive(Clone)]
pub struct InstanceProber {
    connector: Arc<dyn StoreConnector>,
    indexes: Vec<IndexTarget>,
    options: ConnectOptions,
}

impl InstanceProber {
    pub fn new(
        connector: Arc<dyn StoreConnector>,
        indexes: Vec<IndexTarget>,
        options: ConnectOptions,
    ) -> Self {
        Self {
            connector,
            indexes,
            options,
        }
    }

    pub fn indexes(&self) -> &[IndexTarget] {
        &self.indexes
    }

    /// Probe `config`, numbered `position` (1-based) in the fleet.
    ///
    /// Never fails: connection, authentication and other errors end up in the
    /// returned [`ProbeOutcome`].
    pub async fn probe(&self, config: &InstanceConfig, position: usize) -> InstanceResult {
        let label = InstanceResult::label_for(position, config);
        let start = Instant::now();
        debug!("Probing {label} at {}", config.address());

        let outcome = match self.connector.connect(config, &self.options).await {
            Ok(mut conn) => {
                let outcome = self.run_checks(conn.as_mut()).await;
                release(conn, &label).await;
                outcome
            }
            Err(err) => connect_failure(err),
        };

        let elapsed_secs = start.elapsed().as_secs_f64();
        match &outcome {
            ProbeOutcome::Success { indexes } => {
                let active = indexes.iter().filter(|i| i.status.is_active()).count();
                info!("{label}: {active}/{} indexes active ({elapsed_secs:.2}s)", indexes.len());
            }
            ProbeOutcome::Error { message, .. } => {
                warn!("{label}: {message} ({elapsed_secs:.2}s)");
            }
        }

        InstanceResult {
            label,
            outcome,
            elapsed_secs,
        }
    }

    async fn run_checks(&self, conn: &mut dyn StoreConnection) -> ProbeOutcome {
        if let Err(err) = conn.ping().await {
            return ping_failure(err);
        }

        let mut indexes = Vec::with_capacity(self.indexes.len());
        for target in &self.indexes {
            let status = inspector::inspect(conn, &target.index).await;
            indexes.push(IndexReport {
                name: target.name.clone(),
                index: target.index.clone(),
                status,
            });
        }
        ProbeOutcome::Success { indexes }
    }
}

async fn release(conn: Box<dyn StoreConnection>, label: &str) {
    if let Err(err) = conn.close().await {
        debug!("{label}: ignoring error while closing connection: {err}");
    }
}

fn connect_failure(err: StoreError) -> ProbeOutcome {
    match err {
        StoreError::Connection(detail) => error_outcome(
            InstanceErrorKind::ConnectionFailure,
            format!("Connection error: {detail}"),
        ),
        StoreError::Auth(_) => auth_failure(),
        StoreError::Rejected(detail) | StoreError::Other(detail) => error_outcome(
            InstanceErrorKind::Unexpected,
            format!("Unexpected error: {detail}"),
        ),
    }
}

fn ping_failure(err: StoreError) -> ProbeOutcome {
    match err {
        StoreError::Auth(_) => auth_failure(),
        other => error_outcome(
            InstanceErrorKind::ConnectionFailure,
            format!("Connection error: {other}"),
        ),
    }
}

fn auth_failure() -> ProbeOutcome {
    error_outcome(InstanceErrorKind::AuthFailure, AUTH_FAILED_MESSAGE.to_string())
}

fn error_outcome(kind: InstanceErrorKind, message: String) -> ProbeOutcome {
    ProbeOutcome::Error { kind, message }
}
