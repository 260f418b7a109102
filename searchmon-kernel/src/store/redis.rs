//! Redis implementation of the store boundary.
//!
//! Uses the `redis` crate's `ConnectionManager`, which carries the bounded
//! connect/response timeouts and the client-side reconnect retries. TCP
//! keepalive is applied by the client's `keep-alive` feature on every socket.

use super::{ConnectOptions, Reply, StoreConnection, StoreConnector, StoreError};
use crate::models::InstanceConfig;
use ::redis::aio::{ConnectionManager, ConnectionManagerConfig};
use ::redis::{
    Client, ConnectionAddr, ConnectionInfo, ErrorKind, RedisConnectionInfo, RedisError, Value,
};
use async_trait::async_trait;
use tracing::{debug, warn};

/// Connects to Redis instances over TCP.
#[derive(Debug, Clone, Default)]
pub struct RedisConnector;

impl RedisConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StoreConnector for RedisConnector {
    async fn connect(
        &self,
        config: &InstanceConfig,
        options: &ConnectOptions,
    ) -> Result<Box<dyn StoreConnection>, StoreError> {
        let info = ConnectionInfo {
            addr: ConnectionAddr::Tcp(config.host.clone(), config.port),
            redis: RedisConnectionInfo {
                password: config.credential.clone(),
                ..Default::default()
            },
        };
        let client = Client::open(info).map_err(classify)?;

        if !options.keepalive {
            warn!("keepalive cannot be disabled per connection, ignoring for {}", config.address());
        }
        let retries = if options.retry_on_timeout { options.max_retries } else { 0 };
        let manager_config = ConnectionManagerConfig::new()
            .set_connection_timeout(options.connect_timeout)
            .set_response_timeout(options.operation_timeout)
            .set_number_of_retries(retries);

        debug!("Connecting to {} (retries: {})", config.address(), retries);
        let manager = ConnectionManager::new_with_config(client, manager_config)
            .await
            .map_err(classify)?;

        Ok(Box::new(RedisConnection { manager }))
    }
}

struct RedisConnection {
    manager: ConnectionManager,
}

#[async_trait]
impl StoreConnection for RedisConnection {
    async fn ping(&mut self) -> Result<(), StoreError> {
        let response: String = ::redis::cmd("PING")
            .query_async(&mut self.manager)
            .await
            .map_err(classify)?;
        if response == "PONG" {
            Ok(())
        } else {
            Err(StoreError::Connection(format!(
                "PING returned unexpected response: {response}"
            )))
        }
    }

    async fn execute(&mut self, command: &str, args: &[&str]) -> Result<Reply, StoreError> {
        let mut cmd = ::redis::cmd(command);
        for arg in args {
            cmd.arg(*arg);
        }
        let value: Value = cmd.query_async(&mut self.manager).await.map_err(classify)?;
        Ok(to_reply(value))
    }

    async fn close(self: Box<Self>) -> Result<(), StoreError> {
        // Dropping the last manager handle shuts the multiplexed connection down.
        drop(self.manager);
        Ok(())
    }
}

/// Map a client error onto the store error taxonomy.
fn classify(err: RedisError) -> StoreError {
    if err.kind() == ErrorKind::AuthenticationFailed
        || matches!(err.code(), Some("NOAUTH") | Some("WRONGPASS"))
    {
        return StoreError::Auth(err.to_string());
    }
    if err.is_io_error()
        || err.is_timeout()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
    {
        return StoreError::Connection(err.to_string());
    }
    if let Some(code) = err.code() {
        // Rebuild the raw server line so callers can match on its text.
        let text = match err.detail() {
            Some(detail) => format!("{code} {detail}"),
            None => code.to_string(),
        };
        return StoreError::Rejected(text);
    }
    StoreError::Other(err.to_string())
}

fn to_reply(value: Value) -> Reply {
    match value {
        Value::Nil => Reply::Nil,
        Value::Int(i) => Reply::Int(i),
        Value::Double(d) => Reply::Double(d),
        Value::Boolean(b) => Reply::Int(i64::from(b)),
        Value::BulkString(bytes) => Reply::Bytes(bytes),
        Value::SimpleString(s) => Reply::Text(s),
        Value::Okay => Reply::Text("OK".to_string()),
        Value::VerbatimString { text, .. } => Reply::Text(text),
        Value::Array(items) | Value::Set(items) => {
            Reply::Array(items.into_iter().map(to_reply).collect())
        }
        Value::Map(pairs) => Reply::Array(
            pairs
                .into_iter()
                .flat_map(|(k, v)| [to_reply(k), to_reply(v)])
                .collect(),
        ),
        other => Reply::Text(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_is_classified() {
        let err = RedisError::from((ErrorKind::AuthenticationFailed, "Password authentication failed"));
        assert!(matches!(classify(err), StoreError::Auth(_)));
    }

    #[test]
    fn test_io_error_is_connection_failure() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(matches!(classify(RedisError::from(io)), StoreError::Connection(_)));
    }

    #[test]
    fn test_map_reply_is_flattened() {
        let value = Value::Map(vec![(
            Value::SimpleString("num_docs".into()),
            Value::Int(3),
        )]);
        assert_eq!(
            to_reply(value),
            Reply::Array(vec![Reply::Text("num_docs".into()), Reply::Int(3)])
        );
    }

    #[test]
    fn test_bulk_strings_stay_binary() {
        assert_eq!(
            to_reply(Value::BulkString(b"poi-idx".to_vec())),
            Reply::Bytes(b"poi-idx".to_vec())
        );
    }
}
