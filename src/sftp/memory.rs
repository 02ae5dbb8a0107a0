//! In-memory remote filesystem for tests

use super::RemoteFs;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
struct Inner {
    dirs: HashSet<String>,
    files: HashMap<String, Vec<u8>>,
    reads: HashMap<String, usize>,
}

/// An in-memory [`RemoteFs`] with read counting, so tests can assert
/// that caching actually prevents repeat fetches.
#[derive(Debug, Default, Clone)]
pub struct MemoryFs {
    inner: Arc<Mutex<Inner>>,
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

fn parent(path: &str) -> Option<String> {
    let idx = path.rfind('/')?;
    if idx == 0 {
        Some("/".to_string())
    } else {
        Some(path[..idx].to_string())
    }
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a directory (parents are created implicitly)
    pub fn add_dir(&self, path: &str) {
        let mut inner = self.inner.lock().unwrap();
        let mut current = normalize(path);
        loop {
            let up = parent(&current);
            inner.dirs.insert(current);
            match up {
                Some(p) if p != "/" => current = p,
                _ => break,
            }
        }
    }

    /// Register a file with its content; parent directories are created
    pub fn add_file(&self, path: &str, content: impl Into<Vec<u8>>) {
        let path = normalize(path);
        if let Some(dir) = parent(&path) {
            self.add_dir(&dir);
        }
        self.inner.lock().unwrap().files.insert(path, content.into());
    }

    /// How many times `path` has been read
    pub fn read_count(&self, path: &str) -> usize {
        self.inner
            .lock()
            .unwrap()
            .reads
            .get(&normalize(path))
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl RemoteFs for MemoryFs {
    async fn list_dir(&self, path: &str) -> Result<Vec<String>> {
        let path = normalize(path);
        let inner = self.inner.lock().unwrap();
        let mut entries: Vec<String> = inner
            .dirs
            .iter()
            .chain(inner.files.keys())
            .filter(|candidate| parent(candidate).as_deref() == Some(path.as_str()))
            .filter_map(|candidate| candidate.rsplit('/').next().map(str::to_string))
            .collect();
        entries.sort();
        entries.dedup();
        Ok(entries)
    }

    async fn is_directory(&self, path: &str) -> Result<bool> {
        Ok(self.inner.lock().unwrap().dirs.contains(&normalize(path)))
    }

    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let path = normalize(path);
        let mut inner = self.inner.lock().unwrap();
        *inner.reads.entry(path.clone()).or_insert(0) += 1;
        Ok(inner.files.get(&path).cloned().unwrap_or_default())
    }
}
