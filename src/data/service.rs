//! Dataset payloads: load, filter by year, join stations to active lines, cache.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

use crate::data::activity::{active_line_names, filter_by_year, restrict_to_lines, FilterYear};
use crate::data::cache::{CachedPayload, FilteredResponseCache};
use crate::data::feature::{Dataset, DatasetKind};
use crate::data::loader::{DatasetLoader, LoadError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to load dataset: {0}")]
    Load(#[source] LoadError),
    #[error("failed to load rail dataset for station filtering: {0}")]
    CrossReference(#[source] LoadError),
    #[error("failed to serialize filtered dataset: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Body and feature count for one response.
#[derive(Debug, Clone)]
pub struct DatasetPayload {
    pub body: Bytes,
    pub count: usize,
    pub year: FilterYear,
}

pub struct FeatureService {
    loader: DatasetLoader,
    cache: FilteredResponseCache,
    computations: AtomicU64,
}

impl FeatureService {
    pub fn new(loader: DatasetLoader) -> Self {
        FeatureService {
            loader,
            cache: FilteredResponseCache::new(),
            computations: AtomicU64::new(0),
        }
    }

    pub fn loader(&self) -> &DatasetLoader {
        &self.loader
    }

    pub fn cache(&self) -> &FilteredResponseCache {
        &self.cache
    }

    /// Filtered payloads computed so far (cache misses).
    pub fn computations(&self) -> u64 {
        self.computations.load(Ordering::Relaxed)
    }

    pub async fn dataset(&self, kind: DatasetKind) -> Result<Arc<Dataset>, ServiceError> {
        self.loader
            .load(kind.storage_key())
            .await
            .map_err(ServiceError::Load)
    }

    /// Payload for `dataset` (already loaded for `kind`) at `year`.
    pub async fn payload(
        &self,
        kind: DatasetKind,
        dataset: &Dataset,
        year: FilterYear,
    ) -> Result<DatasetPayload, ServiceError> {
        let FilterYear::Year(target) = year else {
            return Ok(DatasetPayload {
                body: dataset.original().clone(),
                count: dataset.features().len(),
                year,
            });
        };

        if let Some(hit) = self.cache.get(kind.path(), target) {
            debug!(path = kind.path(), year = target, count = hit.count, "filtered cache hit");
            return Ok(DatasetPayload {
                body: hit.body,
                count: hit.count,
                year,
            });
        }

        let computed = self.compute(kind, dataset, target).await?;
        let stored = self.cache.insert(kind.path(), target, computed);
        Ok(DatasetPayload {
            body: stored.body,
            count: stored.count,
            year,
        })
    }

    /// Load `kind` and build its payload in one call.
    pub async fn respond(
        &self,
        kind: DatasetKind,
        year: FilterYear,
    ) -> Result<DatasetPayload, ServiceError> {
        let dataset = self.dataset(kind).await?;
        self.payload(kind, &dataset, year).await
    }

    async fn compute(
        &self,
        kind: DatasetKind,
        dataset: &Dataset,
        target: i32,
    ) -> Result<CachedPayload, ServiceError> {
        self.computations.fetch_add(1, Ordering::Relaxed);
        let year = FilterYear::Year(target);
        let mut features = filter_by_year(dataset.features(), year);

        if kind == DatasetKind::Stations {
            let rail = self
                .loader
                .load(DatasetKind::Railroads.storage_key())
                .await
                .map_err(ServiceError::CrossReference)?;
            let lines = active_line_names(filter_by_year(rail.features(), year));
            features = restrict_to_lines(features, &lines);
        }

        let body = dataset.render(&features)?;
        debug!(path = kind.path(), year = target, count = features.len(), "filtered payload computed");
        Ok(CachedPayload {
            body: Bytes::from(body),
            count: features.len(),
        })
    }
}
