//! Index inspection through `FT.INFO`.
//!
//! Every failure is turned into an [`IndexStatus`] here; nothing above this
//! module has to deal with store errors for a single index.

use crate::models::{IndexStats, IndexStatus, Metric};
use crate::store::{Reply, StoreConnection, StoreError};
use std::collections::HashMap;
use tracing::debug;

pub const INFO_COMMAND: &str = "FT.INFO";

const FIELD_NUM_DOCS: &str = "num_docs";
const FIELD_INDEXING_TIME_MS: &str = "total_indexing_time_ms";
const FIELD_MEMORY_MB: &str = "inverted_sz_mb";
const FIELD_INDEXING_FAILURES: &str = "indexing_failures";

/// Query the status of one index on an open connection.
pub async fn inspect(conn: &mut dyn StoreConnection, index: &str) -> IndexStatus {
    match conn.execute(INFO_COMMAND, &[index]).await {
        Ok(reply) if reply.is_empty() => IndexStatus::NotFound,
        Ok(reply) => {
            let fields = decode_info(reply);
            match extract_stats(&fields) {
                Ok(stats) => IndexStatus::Active(stats),
                Err(message) => IndexStatus::Failed { message },
            }
        }
        Err(StoreError::Rejected(message)) => {
            debug!("{INFO_COMMAND} {index} rejected: {message}");
            classify_rejection(&message)
        }
        Err(err) => IndexStatus::Failed {
            message: err.to_string(),
        },
    }
}

/// Classify a server error reply by its text.
pub fn classify_rejection(message: &str) -> IndexStatus {
    let lower = message.to_lowercase();
    if lower.contains("unknown command") {
        IndexStatus::ModuleUnavailable
    } else if lower.contains("unknown index name") {
        IndexStatus::NotFound
    } else {
        IndexStatus::Unsupported {
            message: message.to_string(),
        }
    }
}

/// Turn the flat `name, value, name, value, ...` reply into a map.
///
/// Names that are not scalars are skipped; a trailing name without a value is dropped.
pub fn decode_info(reply: Reply) -> HashMap<String, Reply> {
    let items = match reply {
        Reply::Array(items) => items,
        _ => return HashMap::new(),
    };

    let mut fields = HashMap::with_capacity(items.len() / 2);
    let mut iter = items.into_iter();
    while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
        if let Some(name) = key.as_text() {
            let value = match value {
                Reply::Bytes(bytes) => Reply::Text(String::from_utf8_lossy(&bytes).into_owned()),
                other => other,
            };
            fields.insert(name, value);
        }
    }
    fields
}

/// Pull the reported figures out of decoded `FT.INFO` fields.
///
/// Missing fields default to zero; a field present with a non-numeric value is an error.
pub fn extract_stats(fields: &HashMap<String, Reply>) -> Result<IndexStats, String> {
    let num_docs = match fields.get(FIELD_NUM_DOCS) {
        Some(value) => parse_count(FIELD_NUM_DOCS, value)?,
        None => 0,
    };
    let indexing_time_ms = match fields.get(FIELD_INDEXING_TIME_MS) {
        Some(value) => parse_float(FIELD_INDEXING_TIME_MS, value)?,
        None => 0.0,
    };
    let memory_used_mb = fields
        .get(FIELD_MEMORY_MB)
        .map(to_metric)
        .unwrap_or_default();
    let indexing_failures = match fields.get(FIELD_INDEXING_FAILURES) {
        Some(value) => parse_count(FIELD_INDEXING_FAILURES, value)?,
        None => 0,
    };

    Ok(IndexStats {
        num_docs,
        total_indexing_time_secs: indexing_time_ms / 1000.0,
        memory_used_mb,
        indexing_failures,
    })
}

fn parse_count(field: &str, value: &Reply) -> Result<u64, String> {
    match value {
        Reply::Int(i) => u64::try_from(*i).map_err(|_| format!("negative value for {field}: {i}")),
        Reply::Double(d) if d.is_finite() && *d >= 0.0 => Ok(d.trunc() as u64),
        other => {
            let text = other.as_text().unwrap_or_default();
            text.trim()
                .parse::<u64>()
                .map_err(|_| format!("invalid value for {field}: '{text}'"))
        }
    }
}

fn parse_float(field: &str, value: &Reply) -> Result<f64, String> {
    let parsed = match value {
        Reply::Int(i) => Some(*i as f64),
        Reply::Double(d) => Some(*d),
        other => other.as_text().and_then(|text| text.trim().parse::<f64>().ok()),
    };
    match parsed {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => {
            let text = value.as_text().unwrap_or_default();
            Err(format!("invalid value for {field}: '{text}'"))
        }
    }
}

fn to_metric(value: &Reply) -> Metric {
    match value {
        Reply::Int(i) => Metric::Int(*i),
        Reply::Double(d) => Metric::Float(*d),
        other => Metric::Text(other.as_text().unwrap_or_default()),
    }
}
