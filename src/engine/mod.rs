//! Extraction engine
//!
//! Drives one run: for each stream, resolve the latest date folder per
//! configured location, fetch and decode the stream's files, and emit
//! flat records stamped with `location_id` and `date`. The engine owns
//! the in-run caches, so repeated extractions of the same stream and
//! context, or of different streams sharing a file, hit the network
//! only once.
//!
//! Error handling follows the run-to-completion rule: fatal credential
//! errors and connect exhaustion propagate, everything else degrades to
//! skipping the affected file, folder, or record.

mod types;

pub use types::ExtractStats;

use crate::cache::{ContentCache, RecordCache};
use crate::catalog::{SourceKind, StreamDescriptor};
use crate::config::TapConfig;
use crate::decode::{CsvDecoder, JsonDecoder, SheetDecoder};
use crate::error::{Error, Result};
use crate::flatten::validate_primary_keys;
use crate::folders::{folder_date, resolve_latest};
use crate::pattern::wildcard_match;
use crate::sftp::RemoteFs;
use crate::types::{Context, Record, DATE_FIELD, LOCATION_ID_FIELD};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

#[cfg(test)]
mod tests;

/// One extraction run over a remote filesystem
pub struct ExtractEngine<F: RemoteFs> {
    fs: Arc<F>,
    config: TapConfig,
    content_cache: ContentCache,
    record_cache: RecordCache,
    stats: ExtractStats,
}

impl<F: RemoteFs> ExtractEngine<F> {
    pub fn new(fs: Arc<F>, config: TapConfig) -> Self {
        Self {
            fs,
            config,
            content_cache: ContentCache::new(),
            record_cache: RecordCache::new(),
            stats: ExtractStats::new(),
        }
    }

    /// Counters accumulated so far
    pub fn stats(&self) -> &ExtractStats {
        &self.stats
    }

    /// Drop both caches, forcing the next extraction to hit the remote
    pub fn clear_caches(&mut self) {
        self.content_cache.clear();
        self.record_cache.clear();
    }

    /// Extract every record of `stream` across all configured locations
    pub async fn extract_stream(&mut self, stream: &StreamDescriptor) -> Result<Vec<Record>> {
        let records = self.extract_with_context(stream, &Context::new()).await?;
        Ok(records.as_ref().clone())
    }

    /// Extract `stream` scoped to an extraction context.
    ///
    /// At most one physical extraction happens per (stream, context)
    /// pair; repeat calls are served from the record cache.
    pub async fn extract_with_context(
        &mut self,
        stream: &StreamDescriptor,
        context: &Context,
    ) -> Result<Arc<Vec<Record>>> {
        let records = self
            .record_cache
            .get_or_extract(
                stream.name,
                context,
                extract_physical(
                    self.fs.as_ref(),
                    &mut self.content_cache,
                    &mut self.stats,
                    &self.config,
                    stream,
                    context,
                ),
            )
            .await?;
        Ok(records)
    }

    /// Contexts for child extractions, one per record of `stream`.
    ///
    /// Each context carries ancestor identifiers only (`location_id`,
    /// `date`, and the guid chain down to the record itself), never the
    /// record. Only flattened streams parent other streams.
    pub async fn child_contexts(
        &mut self,
        stream: &StreamDescriptor,
        context: &Context,
    ) -> Result<Vec<Context>> {
        let SourceKind::Flattened { flattener, .. } = &stream.source else {
            return Err(Error::config(format!(
                "stream '{}' does not provide child contexts",
                stream.name
            )));
        };

        let records = self.extract_with_context(stream, context).await?;
        Ok(records.iter().map(|r| flattener.child_context(r)).collect())
    }
}

// ============================================================================
// Physical extraction
// ============================================================================

/// Run one uncached extraction. A free function so the record cache can
/// hold its own borrow of the engine while this future runs.
async fn extract_physical<F: RemoteFs>(
    fs: &F,
    content_cache: &mut ContentCache,
    stats: &mut ExtractStats,
    config: &TapConfig,
    stream: &StreamDescriptor,
    context: &Context,
) -> Result<Vec<Record>> {
    let start = Instant::now();
    stats.extractions += 1;
    info!("Extracting stream {} (context: {context:?})", stream.name);

    // A context produced by a parent extraction pins the location
    let locations: Vec<String> = match context.get(LOCATION_ID_FIELD) {
        Some(id) => vec![id.clone()],
        None => config.location_ids().iter().map(|s| s.to_string()).collect(),
    };

    let mut records = Vec::new();
    for location_id in &locations {
        // The context's date folder was already resolved and verified by
        // the parent extraction
        let date = match context.get(DATE_FIELD) {
            Some(date) => Some(date.clone()),
            None => resolve_latest(fs, location_id).await?,
        };
        let Some(date) = date else {
            stats.folders_skipped += 1;
            continue;
        };

        if let (Some(cutoff), Some(folder)) = (config.start_date, folder_date(&date)) {
            if folder < cutoff {
                info!(
                    "Skipping folder {date} for location {location_id}: before start date {cutoff}"
                );
                stats.folders_skipped += 1;
                continue;
            }
        }

        stats.folders_processed += 1;
        extract_folder(
            fs,
            content_cache,
            stats,
            stream,
            context,
            location_id,
            &date,
            &mut records,
        )
        .await?;
    }

    if matches!(stream.source, SourceKind::Flattened { .. }) {
        let before = records.len();
        records.retain_mut(|record| {
            validate_primary_keys(
                record,
                stream.primary_keys,
                stream.generate_unique_ids,
                stream.name,
            )
        });
        stats.records_dropped += (before - records.len()) as u64;
    }

    stats.records_emitted += records.len() as u64;
    stats.add_duration(start.elapsed().as_millis() as u64);
    info!("Extracted {} records for stream {}", records.len(), stream.name);
    Ok(records)
}

/// Extract one stream from one location/date folder
#[allow(clippy::too_many_arguments)]
async fn extract_folder<F: RemoteFs>(
    fs: &F,
    content_cache: &mut ContentCache,
    stats: &mut ExtractStats,
    stream: &StreamDescriptor,
    context: &Context,
    location_id: &str,
    date: &str,
    out: &mut Vec<Record>,
) -> Result<()> {
    match &stream.source {
        SourceKind::Csv {
            file_name,
            delimiter,
            quote,
        } => {
            let path = format!("/{location_id}/{date}/{file_name}");
            let Some(content) =
                fetch(fs, content_cache, stats, location_id, date, &path).await?
            else {
                return Ok(());
            };
            let decoder = CsvDecoder::new(*delimiter, *quote);
            match decoder.decode(&content) {
                Ok(decoded) => out.extend(stamped(decoded, location_id, date)),
                Err(e) => {
                    stats.files_failed += 1;
                    error!("Error processing file {path}: {e}");
                }
            }
        }
        SourceKind::Sheet {
            file_name,
            selector,
            header_row,
        } => {
            let path = format!("/{location_id}/{date}/{file_name}");
            let Some(content) =
                fetch(fs, content_cache, stats, location_id, date, &path).await?
            else {
                return Ok(());
            };
            let decoder = SheetDecoder {
                selector: selector.clone(),
                header_row: *header_row,
            };
            match decoder.decode(&content) {
                Ok(decoded) => out.extend(stamped(decoded, location_id, date)),
                Err(e) => {
                    stats.files_failed += 1;
                    error!("Error processing file {path}: {e}");
                }
            }
        }
        SourceKind::Json {
            file_pattern,
            records_path,
        } => {
            let decoder = JsonDecoder::new(records_path.map(str::to_string));
            for path in
                matching_files(fs, location_id, date, file_pattern).await?
            {
                let Some(content) =
                    fetch(fs, content_cache, stats, location_id, date, &path).await?
                else {
                    continue;
                };
                match decoder.decode(&content) {
                    Ok(decoded) => out.extend(stamped(decoded, location_id, date)),
                    Err(e) => {
                        stats.files_failed += 1;
                        error!("Error processing file {path}: {e}");
                    }
                }
            }
        }
        SourceKind::Flattened {
            file_pattern,
            flattener,
        } => {
            for path in
                matching_files(fs, location_id, date, file_pattern).await?
            {
                let Some(content) =
                    fetch(fs, content_cache, stats, location_id, date, &path).await?
                else {
                    continue;
                };
                match serde_json::from_slice(&content) {
                    Ok(payload) => {
                        out.extend(flattener.flatten(&payload, location_id, date, context));
                    }
                    Err(e) => {
                        stats.files_failed += 1;
                        error!("Error processing file {path}: {e}");
                    }
                }
            }
        }
    }
    Ok(())
}

/// Fetch file content through the cache; `None` means missing or empty
async fn fetch<F: RemoteFs>(
    fs: &F,
    content_cache: &mut ContentCache,
    stats: &mut ExtractStats,
    location_id: &str,
    date: &str,
    path: &str,
) -> Result<Option<Arc<Vec<u8>>>> {
    let cached = content_cache.get(location_id, date, path).is_some();
    let content = content_cache
        .get_or_fetch(location_id, date, path, fs.read_file(path))
        .await?;
    if content.is_empty() {
        // Count a missing file once, not on every cache hit
        if !cached {
            stats.files_read += 1;
            stats.files_missing += 1;
            info!("File {path} not found or empty. Skipping.");
        }
        return Ok(None);
    }
    if !cached {
        stats.files_read += 1;
    }
    Ok(Some(content))
}

/// List the date folder and keep file names matching `pattern`
async fn matching_files<F: RemoteFs>(
    fs: &F,
    location_id: &str,
    date: &str,
    pattern: &str,
) -> Result<Vec<String>> {
    let folder = format!("/{location_id}/{date}");
    let entries = fs.list_dir(&folder).await?;
    let matching: Vec<String> = entries
        .into_iter()
        .filter(|name| wildcard_match(pattern, name))
        .map(|name| format!("{folder}/{name}"))
        .collect();
    if matching.is_empty() {
        warn!("No files matching pattern {pattern} found in {folder}");
    }
    Ok(matching)
}

/// Stamp decoded records with the folder they came from
fn stamped(records: Vec<Record>, location_id: &str, date: &str) -> Vec<Record> {
    records
        .into_iter()
        .map(|mut record| {
            record.insert(
                LOCATION_ID_FIELD.to_string(),
                serde_json::json!(location_id),
            );
            record.insert(DATE_FIELD.to_string(), serde_json::json!(date));
            record
        })
        .collect()
}
