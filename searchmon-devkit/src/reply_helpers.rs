/*!
Builders for `FT.INFO` replies shaped like the ones RediSearch sends over RESP2:
a flat array alternating field names and values, mostly as bulk strings.
*/

use searchmon_kernel::Reply;

/// Builds a flat `FT.INFO` reply.
#[derive(Debug, Clone)]
pub struct FtInfoReply {
    fields: Vec<(String, Reply)>,
}

impl FtInfoReply {
    /// Reply carrying only the index name and its definition block.
    pub fn new(index: &str) -> Self {
        Self {
            fields: vec![
                ("index_name".to_string(), bulk(index)),
                (
                    "index_definition".to_string(),
                    Reply::Array(vec![bulk("key_type"), bulk("HASH")]),
                ),
            ],
        }
    }

    /// Typical healthy index with all four reported figures.
    pub fn active(index: &str, num_docs: u64, indexing_time_ms: u64, memory_mb: &str, failures: u64) -> Self {
        Self::new(index)
            .num_docs(num_docs)
            .indexing_time_ms(indexing_time_ms)
            .memory_mb(memory_mb)
            .indexing_failures(failures)
    }

    pub fn num_docs(self, value: u64) -> Self {
        self.field("num_docs", bulk(&value.to_string()))
    }

    pub fn indexing_time_ms(self, value: u64) -> Self {
        self.field("total_indexing_time_ms", bulk(&value.to_string()))
    }

    pub fn memory_mb(self, value: &str) -> Self {
        self.field("inverted_sz_mb", bulk(value))
    }

    pub fn indexing_failures(self, value: u64) -> Self {
        self.field("indexing_failures", Reply::Int(value as i64))
    }

    /// Set or replace any field with a raw reply value.
    pub fn field(mut self, name: &str, value: Reply) -> Self {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name.to_string(), value)),
        }
        self
    }

    pub fn without(mut self, name: &str) -> Self {
        self.fields.retain(|(n, _)| n != name);
        self
    }

    pub fn build(self) -> Reply {
        Reply::Array(
            self.fields
                .into_iter()
                .flat_map(|(name, value)| [bulk(&name), value])
                .collect(),
        )
    }
}

/// Bulk string reply.
pub fn bulk(text: &str) -> Reply {
    Reply::Bytes(text.as_bytes().to_vec())
}
