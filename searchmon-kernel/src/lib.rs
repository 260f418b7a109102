//! searchmon kernel - probing and reporting core
//!
//! Pipeline: [`collector::FleetCollector`] → [`prober::InstanceProber`] →
//! [`inspector::inspect`] for each configured index, then [`report`] renders the
//! resulting [`models::FleetReport`] for the console and for the webhook.
//!
//! Store errors are converted into status values at the inspector (per index)
//! and prober (per instance) boundaries; the collector and renderers only ever
//! see data.

pub mod collector;
pub mod inspector;
pub mod models;
pub mod prober;
pub mod report;
pub mod store;

pub use collector::FleetCollector;
pub use models::{
    default_indexes, FleetReport, IndexReport, IndexStats, IndexStatus, IndexTarget,
    InstanceConfig, InstanceErrorKind, InstanceResult, Metric, ProbeOutcome,
};
pub use prober::InstanceProber;
pub use store::{ConnectOptions, RedisConnector, Reply, StoreConnection, StoreConnector, StoreError};
