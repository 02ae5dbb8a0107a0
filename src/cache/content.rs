//! Raw file content cache

use crate::error::Result;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

/// File bytes keyed by location, then date folder, then remote path.
///
/// Content is stored behind `Arc` so callers can hold on to a file while
/// the cache is later cleared. Failed fetches are not cached; the next
/// caller tries again.
#[derive(Debug, Default)]
pub struct ContentCache {
    entries: HashMap<String, HashMap<String, HashMap<String, Arc<Vec<u8>>>>>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return cached content for `path`, running `fetch` on a miss
    pub async fn get_or_fetch<F>(
        &mut self,
        location: &str,
        date: &str,
        path: &str,
        fetch: F,
    ) -> Result<Arc<Vec<u8>>>
    where
        F: Future<Output = Result<Vec<u8>>>,
    {
        if let Some(content) = self
            .entries
            .get(location)
            .and_then(|dates| dates.get(date))
            .and_then(|files| files.get(path))
        {
            debug!("Content cache hit for {path} (location {location}, date {date})");
            return Ok(content.clone());
        }

        debug!("Content cache miss for {path} (location {location}, date {date})");
        let content = Arc::new(fetch.await?);
        self.entries
            .entry(location.to_string())
            .or_default()
            .entry(date.to_string())
            .or_default()
            .insert(path.to_string(), content.clone());
        Ok(content)
    }

    /// Peek without fetching
    pub fn get(&self, location: &str, date: &str, path: &str) -> Option<Arc<Vec<u8>>> {
        self.entries
            .get(location)?
            .get(date)?
            .get(path)
            .cloned()
    }

    /// Drop all content cached for one date folder of one location
    pub fn clear_date(&mut self, location: &str, date: &str) {
        if let Some(dates) = self.entries.get_mut(location) {
            if dates.remove(date).is_some() {
                info!("Cleared content cache for location {location}, date {date}");
            }
        }
    }

    /// Drop all content cached for one location
    pub fn clear_location(&mut self, location: &str) {
        if self.entries.remove(location).is_some() {
            info!("Cleared content cache for location {location}");
        }
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached files across all locations and dates
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .flat_map(|dates| dates.values())
            .map(|files| files.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
