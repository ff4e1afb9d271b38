use thiserror::Error;
use tracing::error;

use crate::data::{DatasetKind, DatasetPayload, FeatureService, FilterYear, ServiceError};

pub const GEOJSON_CONTENT_TYPE: &str = "application/geo+json";
pub const CACHE_CONTROL: &str = "public, max-age=300";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("method not allowed")]
    MethodNotAllowed,
    #[error("invalid date format, use YYYY-MM-DD")]
    InvalidDate,
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MethodNotAllowed => 405,
            Self::InvalidDate => 400,
            Self::Service(_) => 500,
        }
    }

    /// Body text shown to clients; internal details stay in the logs.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MethodNotAllowed => "method not allowed",
            Self::InvalidDate => "invalid date format, use YYYY-MM-DD",
            Self::Service(ServiceError::Load(_)) => "failed to load dataset",
            Self::Service(ServiceError::CrossReference(_)) => "failed to evaluate station dataset",
            Self::Service(ServiceError::Serialize(_)) => "failed to build filtered dataset",
        }
    }
}

/// A dataset payload plus whether the body is to be sent.
#[derive(Debug, Clone)]
pub struct DatasetResponse {
    pub payload: DatasetPayload,
    pub head_only: bool,
}

/// GET/HEAD on a dataset path. The dataset is loaded before the date is
/// validated, so a broken store reports 500 even for a bad `date`.
pub async fn dataset_payload(
    service: &FeatureService,
    method: &str,
    kind: DatasetKind,
    date: Option<&str>,
) -> Result<DatasetResponse, ApiError> {
    let head_only = match method {
        "GET" => false,
        "HEAD" => true,
        _ => return Err(ApiError::MethodNotAllowed),
    };

    let dataset = service
        .dataset(kind)
        .await
        .map_err(|err| logged(kind, err))?;

    let year = FilterYear::from_date_param(date.unwrap_or("")).ok_or(ApiError::InvalidDate)?;

    let payload = service
        .payload(kind, &dataset, year)
        .await
        .map_err(|err| logged(kind, err))?;

    Ok(DatasetResponse { payload, head_only })
}

fn logged(kind: DatasetKind, err: ServiceError) -> ApiError {
    match &err {
        ServiceError::Load(load) => {
            error!(key = load.key(), error = %load, "failed to load dataset");
        }
        ServiceError::CrossReference(load) => {
            error!(
                path = kind.path(),
                key = load.key(),
                error = %load,
                "failed to load rail dataset for station filtering"
            );
        }
        ServiceError::Serialize(inner) => {
            error!(path = kind.path(), error = %inner, "failed to build filtered dataset");
        }
    }
    ApiError::Service(err)
}
