//! Store connection boundary.
//!
//! The inspector and the prober only talk to the store through
//! [`StoreConnector`] and [`StoreConnection`], so a probe can run against Redis
//! in production and against a scripted connector in tests.

pub mod redis;

use crate::models::InstanceConfig;
use async_trait::async_trait;
use std::time::Duration;

pub use self::redis::RedisConnector;

/// Errors surfaced by a store connection, already classified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{0}")]
    Connection(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    /// The server answered the command with an error reply.
    #[error("{0}")]
    Rejected(String),
    #[error("{0}")]
    Other(String),
}

/// Reply to a store command, decoupled from any client library.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Nil,
    Int(i64),
    Double(f64),
    Text(String),
    Bytes(Vec<u8>),
    Array(Vec<Reply>),
}

impl Reply {
    /// Text form of a scalar reply, decoding binary payloads.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Reply::Text(s) => Some(s.clone()),
            Reply::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
            Reply::Int(i) => Some(i.to_string()),
            Reply::Double(d) => Some(d.to_string()),
            Reply::Nil | Reply::Array(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Reply::Nil => true,
            Reply::Array(items) => items.is_empty(),
            Reply::Text(s) => s.is_empty(),
            Reply::Bytes(b) => b.is_empty(),
            Reply::Int(_) | Reply::Double(_) => false,
        }
    }
}

/// Connection tuning applied to every probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub connect_timeout: Duration,
    pub operation_timeout: Duration,
    pub keepalive: bool,
    pub retry_on_timeout: bool,
    pub max_retries: usize,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            operation_timeout: Duration::from_secs(30),
            keepalive: true,
            retry_on_timeout: true,
            max_retries: 2,
        }
    }
}

/// Opens connections to store instances.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    async fn connect(
        &self,
        config: &InstanceConfig,
        options: &ConnectOptions,
    ) -> Result<Box<dyn StoreConnection>, StoreError>;
}

/// An open connection to one store instance.
#[async_trait]
pub trait StoreConnection: Send {
    /// Liveness check.
    async fn ping(&mut self) -> Result<(), StoreError>;

    /// Run a raw command and return its reply.
    async fn execute(&mut self, command: &str, args: &[&str]) -> Result<Reply, StoreError>;

    /// Release the connection. Consumes it so it can only happen once.
    async fn close(self: Box<Self>) -> Result<(), StoreError>;
}
