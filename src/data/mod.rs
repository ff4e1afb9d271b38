//! Dataset pipeline: storage, loading, year filtering and result caching.

pub mod activity;
pub mod cache;
pub mod feature;
pub mod loader;
pub mod service;
pub mod store;
pub mod year;

pub use activity::{filter_by_year, is_active, FilterYear};
pub use feature::{Dataset, DatasetKind, Feature};
pub use loader::{DatasetLoader, LoadError};
pub use service::{DatasetPayload, FeatureService, ServiceError};
pub use store::{FsStore, MemoryStore, ObjectStore, StoreError};
