/*!
Scripted store connector for tests without a Redis server.

Each instance address gets an [`InstanceScript`] describing how connect, ping,
`FT.INFO` and close behave. Every call is recorded so tests can assert on what
the prober actually did.
*/

use async_trait::async_trait;
use parking_lot::Mutex;
use searchmon_kernel::store::{ConnectOptions, Reply, StoreConnection, StoreConnector, StoreError};
use searchmon_kernel::InstanceConfig;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Rejection text RediSearch sends for a missing index.
pub const UNKNOWN_INDEX: &str = "Unknown Index name";
/// Rejection text Redis sends when the search module is not loaded.
pub const UNKNOWN_COMMAND: &str = "ERR unknown command 'FT.INFO', with args beginning with: ";

/// How a scripted instance answers.
#[derive(Debug, Clone)]
pub struct InstanceScript {
    connect: Result<(), StoreError>,
    ping: Result<(), StoreError>,
    replies: HashMap<String, Result<Reply, StoreError>>,
    close: Result<(), StoreError>,
    connect_delay: Option<Duration>,
}

impl InstanceScript {
    /// Reachable instance with no indexes; every `FT.INFO` is rejected as unknown.
    pub fn healthy() -> Self {
        Self {
            connect: Ok(()),
            ping: Ok(()),
            replies: HashMap::new(),
            close: Ok(()),
            connect_delay: None,
        }
    }

    pub fn unreachable(detail: &str) -> Self {
        Self {
            connect: Err(StoreError::Connection(detail.to_string())),
            ..Self::healthy()
        }
    }

    pub fn auth_rejected() -> Self {
        Self {
            connect: Err(StoreError::Auth("WRONGPASS invalid username-password pair".into())),
            ..Self::healthy()
        }
    }

    pub fn failing_connect(err: StoreError) -> Self {
        Self {
            connect: Err(err),
            ..Self::healthy()
        }
    }

    pub fn with_ping(mut self, result: Result<(), StoreError>) -> Self {
        self.ping = result;
        self
    }

    pub fn with_index(mut self, index: &str, reply: Reply) -> Self {
        self.replies.insert(index.to_string(), Ok(reply));
        self
    }

    pub fn with_index_error(mut self, index: &str, err: StoreError) -> Self {
        self.replies.insert(index.to_string(), Err(err));
        self
    }

    pub fn with_close(mut self, result: Result<(), StoreError>) -> Self {
        self.close = result;
        self
    }

    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = Some(delay);
        self
    }
}

impl Default for InstanceScript {
    fn default() -> Self {
        Self::healthy()
    }
}

/// One recorded interaction with the scripted store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Connect { address: String },
    Ping { address: String },
    Command { address: String, command: String, args: Vec<String> },
    Close { address: String },
}

/// Scripted [`StoreConnector`]. Unscripted addresses refuse connections.
#[derive(Clone, Default)]
pub struct MockStore {
    scripts: Arc<Mutex<HashMap<String, InstanceScript>>>,
    events: Arc<Mutex<Vec<StoreEvent>>>,
    open: Arc<AtomicUsize>,
    peak_open: Arc<AtomicUsize>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the behaviour of `host:port`.
    pub fn script(&self, address: impl Into<String>, script: InstanceScript) {
        self.scripts.lock().insert(address.into(), script);
    }

    pub fn events(&self) -> Vec<StoreEvent> {
        self.events.lock().clone()
    }

    /// Events recorded for one address, in order.
    pub fn events_for(&self, address: &str) -> Vec<StoreEvent> {
        self.events
            .lock()
            .iter()
            .filter(|event| event_address(event) == address)
            .cloned()
            .collect()
    }

    pub fn close_count(&self, address: &str) -> usize {
        self.events_for(address)
            .iter()
            .filter(|event| matches!(event, StoreEvent::Close { .. }))
            .count()
    }

    /// Connections currently open.
    pub fn open_connections(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    /// Highest number of connections that were open at the same time.
    pub fn peak_open_connections(&self) -> usize {
        self.peak_open.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.events.lock().clear();
        self.peak_open.store(self.open.load(Ordering::SeqCst), Ordering::SeqCst);
    }

    fn record(&self, event: StoreEvent) {
        log::debug!("[MOCK] {event:?}");
        self.events.lock().push(event);
    }
}

fn event_address(event: &StoreEvent) -> &str {
    match event {
        StoreEvent::Connect { address }
        | StoreEvent::Ping { address }
        | StoreEvent::Command { address, .. }
        | StoreEvent::Close { address } => address,
    }
}

#[async_trait]
impl StoreConnector for MockStore {
    async fn connect(
        &self,
        config: &InstanceConfig,
        _options: &ConnectOptions,
    ) -> Result<Box<dyn StoreConnection>, StoreError> {
        let address = config.address();
        self.record(StoreEvent::Connect { address: address.clone() });

        let script = self.scripts.lock().get(&address).cloned();
        let script = script.ok_or_else(|| {
            StoreError::Connection(format!("Error connecting to {address}: connection refused"))
        })?;

        if let Some(delay) = script.connect_delay {
            tokio::time::sleep(delay).await;
        }
        script.connect.clone()?;

        let now_open = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_open.fetch_max(now_open, Ordering::SeqCst);

        Ok(Box::new(MockConnection {
            address,
            script,
            store: self.clone(),
        }))
    }
}

struct MockConnection {
    address: String,
    script: InstanceScript,
    store: MockStore,
}

#[async_trait]
impl StoreConnection for MockConnection {
    async fn ping(&mut self) -> Result<(), StoreError> {
        self.store.record(StoreEvent::Ping { address: self.address.clone() });
        self.script.ping.clone()
    }

    async fn execute(&mut self, command: &str, args: &[&str]) -> Result<Reply, StoreError> {
        self.store.record(StoreEvent::Command {
            address: self.address.clone(),
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        });

        let index = args.first().copied().unwrap_or_default();
        match self.script.replies.get(index) {
            Some(result) => result.clone(),
            None => Err(StoreError::Rejected(UNKNOWN_INDEX.to_string())),
        }
    }

    async fn close(self: Box<Self>) -> Result<(), StoreError> {
        self.store.record(StoreEvent::Close { address: self.address.clone() });
        self.store.open.fetch_sub(1, Ordering::SeqCst);
        self.script.close.clone()
    }
}
