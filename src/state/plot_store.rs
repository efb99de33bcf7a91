use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;
use uuid::Uuid;

/// File extension of stored charts.
pub const PLOT_EXTENSION: &str = "jpeg";

/// Identifier of a stored chart; also the file stem on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlotId(Uuid);

impl PlotId {
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Only UUID text parses, so an id can never name another path.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::try_parse(raw).ok().map(Self)
    }
}

impl fmt::Display for PlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("plot store I/O failed for {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("plot store lock poisoned")]
    Poisoned,
}

/// Write-once storage for rendered charts.
pub trait PlotStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    /// Store an image under a fresh identifier.
    fn put(&self, image: Vec<u8>) -> Result<PlotId, StoreError>;

    /// Fetch an image; `Ok(None)` when nothing is stored under `id`.
    fn get(&self, id: &str) -> Result<Option<Vec<u8>>, StoreError>;
}

/// Charts as `<root>/<uuid>.jpeg` files.
pub struct LocalPlotStore {
    root: PathBuf,
}

impl LocalPlotStore {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn plot_path(&self, id: &PlotId) -> PathBuf {
        self.root.join(format!("{id}.{PLOT_EXTENSION}"))
    }
}

impl PlotStore for LocalPlotStore {
    fn backend_tag(&self) -> &'static str {
        "disk"
    }

    fn put(&self, image: Vec<u8>) -> Result<PlotId, StoreError> {
        fs::create_dir_all(&self.root).map_err(|source| StoreError::Io {
            path: self.root.clone(),
            source,
        })?;

        let id = PlotId::new_random();
        let path = self.plot_path(&id);
        let io_err = |source| StoreError::Io {
            path: path.clone(),
            source,
        };
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(io_err)?;
        file.write_all(&image).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        Ok(id)
    }

    fn get(&self, id: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let Some(id) = PlotId::parse(id) else {
            return Ok(None);
        };
        let path = self.plot_path(&id);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

/// Process-local store, gone on restart.
#[derive(Default)]
pub struct MemoryPlotStore {
    plots: Mutex<HashMap<PlotId, Vec<u8>>>,
}

impl MemoryPlotStore {
    pub fn len(&self) -> usize {
        self.plots.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PlotStore for MemoryPlotStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    fn put(&self, image: Vec<u8>) -> Result<PlotId, StoreError> {
        let id = PlotId::new_random();
        self.plots
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .insert(id, image);
        Ok(id)
    }

    fn get(&self, id: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let Some(id) = PlotId::parse(id) else {
            return Ok(None);
        };
        let plots = self.plots.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(plots.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn local_store_writes_named_files() {
        let dir = tempdir().expect("tempdir");
        let store = LocalPlotStore::new(dir.path().join("plots"));
        let id = store.put(vec![1, 2, 3]).expect("put");

        let path = dir.path().join("plots").join(format!("{id}.jpeg"));
        assert_eq!(fs::read(path).expect("file on disk"), vec![1, 2, 3]);
        assert_eq!(store.get(&id.to_string()).expect("get"), Some(vec![1, 2, 3]));
    }

    #[test]
    fn local_store_reports_absent_ids() {
        let dir = tempdir().expect("tempdir");
        let store = LocalPlotStore::new(dir.path().to_path_buf());
        let unknown = PlotId::new_random().to_string();
        assert_eq!(store.get(&unknown).expect("get"), None);
    }

    #[test]
    fn non_uuid_ids_never_touch_the_filesystem() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("secret.jpeg"), b"x").expect("seed");
        let store = LocalPlotStore::new(dir.path().join("plots"));
        assert_eq!(store.get("../secret").expect("get"), None);
        assert_eq!(store.get("secret").expect("get"), None);
    }

    #[test]
    fn ids_are_unique() {
        let store = MemoryPlotStore::default();
        let a = store.put(vec![1]).expect("put");
        let b = store.put(vec![2]).expect("put");
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&b.to_string()).expect("get"), Some(vec![2]));
        assert_eq!(store.get("nope").expect("get"), None);
    }
}
