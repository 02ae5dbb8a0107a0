//! Extracted record batch cache

use crate::error::Result;
use crate::types::{Context, Record};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

/// Stable fingerprint of an extraction context.
///
/// `Context` is a `BTreeMap`, so its JSON serialization has a fixed key
/// order and equal contexts always hash to the same digest.
pub fn context_fingerprint(context: &Context) -> String {
    let serialized = serde_json::to_string(context).unwrap_or_default();
    format!("{:x}", md5::compute(serialized.as_bytes()))
}

/// Record batches keyed by stream name and context fingerprint.
///
/// Guarantees at most one physical extraction per (stream, context)
/// pair within a run. A stream extracted with an empty context and the
/// same stream extracted per-location are distinct entries.
#[derive(Debug, Default)]
pub struct RecordCache {
    entries: HashMap<String, HashMap<String, Arc<Vec<Record>>>>,
}

impl RecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached batch for (stream, context), running `extract`
    /// on a miss. Failed extractions are not cached.
    pub async fn get_or_extract<F>(
        &mut self,
        stream: &str,
        context: &Context,
        extract: F,
    ) -> Result<Arc<Vec<Record>>>
    where
        F: Future<Output = Result<Vec<Record>>>,
    {
        let fingerprint = context_fingerprint(context);

        if let Some(records) = self
            .entries
            .get(stream)
            .and_then(|batches| batches.get(&fingerprint))
        {
            debug!("Record cache hit for stream {stream} (context {fingerprint})");
            return Ok(records.clone());
        }

        debug!("Record cache miss for stream {stream} (context {fingerprint})");
        let records = Arc::new(extract.await?);
        self.entries
            .entry(stream.to_string())
            .or_default()
            .insert(fingerprint, records.clone());
        Ok(records)
    }

    /// Whether a batch for (stream, context) is already cached
    pub fn contains(&self, stream: &str, context: &Context) -> bool {
        let fingerprint = context_fingerprint(context);
        self.entries
            .get(stream)
            .is_some_and(|batches| batches.contains_key(&fingerprint))
    }

    /// Drop all cached batches for one stream
    pub fn clear_stream(&mut self, stream: &str) {
        if self.entries.remove(stream).is_some() {
            info!("Cleared record cache for stream {stream}");
        }
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached batches across all streams
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
