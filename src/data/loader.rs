//! Load each dataset from storage once per process and share the result.
//!
//! The first caller for a key claims a slot holding a shared future; every
//! caller that arrives while it is in flight awaits that same future, so a
//! cold start triggers a single fetch per key. Successful loads stay resident
//! for the life of the process. Failed loads are evicted so a later request
//! can retry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures_util::future::{BoxFuture, Shared};
use futures_util::FutureExt;
use thiserror::Error;
use tracing::{info, warn};

use crate::data::feature::{Dataset, DatasetParseError};
use crate::data::store::ObjectStore;

#[derive(Debug, Clone, Error)]
pub enum LoadError {
    #[error("dataset object {key} not found in storage")]
    NotFound { key: String },
    #[error("failed to fetch dataset {key}: {message}")]
    Storage { key: String, message: String },
    #[error("failed to parse dataset {key}: {message}")]
    Parse { key: String, message: String },
    #[error("invalid dataset {key}: missing features array")]
    MissingFeatures { key: String },
    #[error("fetching dataset {key} timed out after {after:?}")]
    Timeout { key: String, after: Duration },
}

impl LoadError {
    pub fn key(&self) -> &str {
        match self {
            Self::NotFound { key }
            | Self::Storage { key, .. }
            | Self::Parse { key, .. }
            | Self::MissingFeatures { key }
            | Self::Timeout { key, .. } => key,
        }
    }
}

pub type LoadResult = Result<Arc<Dataset>, LoadError>;

type PendingLoad = Shared<BoxFuture<'static, LoadResult>>;

pub struct DatasetLoader {
    store: Arc<dyn ObjectStore>,
    fetch_timeout: Option<Duration>,
    slots: Mutex<HashMap<String, PendingLoad>>,
}

impl DatasetLoader {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        DatasetLoader {
            store,
            fetch_timeout: None,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Deadline for a single storage fetch. `None` waits indefinitely.
    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub async fn load(&self, key: &str) -> LoadResult {
        let pending = self.claim(key);
        let result = pending.clone().await;
        if result.is_err() {
            self.evict(key, &pending);
        }
        result
    }

    /// Load every key up front. Failures are logged and left retryable.
    pub async fn warm(&self, keys: &[&str]) {
        for key in keys {
            if let Err(err) = self.load(key).await {
                warn!(key = %key, error = %err, "dataset warm-up failed");
            }
        }
    }

    /// True once `key` has loaded successfully.
    pub fn is_resident(&self, key: &str) -> bool {
        self.lock_slots()
            .get(key)
            .and_then(Shared::peek)
            .is_some_and(Result::is_ok)
    }

    fn claim(&self, key: &str) -> PendingLoad {
        let mut slots = self.lock_slots();
        if let Some(pending) = slots.get(key) {
            return pending.clone();
        }

        let pending = fetch_dataset(Arc::clone(&self.store), key.to_string(), self.fetch_timeout)
            .boxed()
            .shared();
        slots.insert(key.to_string(), pending.clone());
        pending
    }

    /// Drop the slot only if it still holds the attempt that failed; a newer
    /// attempt claimed by someone else stays.
    fn evict(&self, key: &str, failed: &PendingLoad) {
        let mut slots = self.lock_slots();
        if slots.get(key).is_some_and(|current| current.ptr_eq(failed)) {
            slots.remove(key);
        }
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<String, PendingLoad>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn fetch_dataset(
    store: Arc<dyn ObjectStore>,
    key: String,
    fetch_timeout: Option<Duration>,
) -> LoadResult {
    info!(key = %key, "loading dataset");

    let fetch = store.get(&key);
    let fetched = match fetch_timeout {
        Some(after) => tokio::time::timeout(after, fetch)
            .await
            .map_err(|_| LoadError::Timeout {
                key: key.clone(),
                after,
            })?,
        None => fetch.await,
    };

    let body = fetched
        .map_err(|err| LoadError::Storage {
            key: key.clone(),
            message: err.to_string(),
        })?
        .ok_or_else(|| LoadError::NotFound { key: key.clone() })?;
    let bytes = body.len();

    let dataset = Dataset::parse(body).map_err(|err| match err {
        DatasetParseError::Json(err) => LoadError::Parse {
            key: key.clone(),
            message: err.to_string(),
        },
        DatasetParseError::MissingFeatures => LoadError::MissingFeatures { key: key.clone() },
    })?;

    info!(key = %key, features = dataset.features().len(), bytes, "dataset loaded");
    Ok(Arc::new(dataset))
}
