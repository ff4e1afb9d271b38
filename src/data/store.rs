//! Object storage the datasets are read from.

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read object {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("object key {0:?} is not a plain relative name")]
    InvalidKey(String),
}

/// `Ok(None)` means the object does not exist.
pub type StoreResult = Result<Option<String>, StoreError>;

/// Read-only key/value object storage.
pub trait ObjectStore: Send + Sync + 'static {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StoreResult>;
}

/// Objects are files under a root directory.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(key);
        let plain = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !plain {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

impl ObjectStore for FsStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StoreResult> {
        async move {
            let path = self.object_path(key)?;
            match tokio::fs::read_to_string(&path).await {
                Ok(body) => Ok(Some(body)),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(source) => Err(StoreError::Io {
                    key: key.to_string(),
                    source,
                }),
            }
        }
        .boxed()
    }
}

/// In-process object map. Counts fetches and can simulate storage latency.
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<String, String>>,
    fetches: AtomicUsize,
    latency: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn insert(&self, key: impl Into<String>, body: impl Into<String>) {
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), body.into());
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.objects
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
    }

    /// Number of `get` calls served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl ObjectStore for MemoryStore {
    fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, StoreResult> {
        async move {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            let objects = self.objects.read().unwrap_or_else(PoisonError::into_inner);
            Ok(objects.get(key).cloned())
        }
        .boxed()
    }
}
