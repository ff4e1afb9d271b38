//! GeoJSON features and datasets. Geometry and envelope members are opaque
//! JSON and round-trip untouched.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::data::year::{property_string, year_field, END_YEAR_KEY, LINE_NAME_KEY, START_YEAR_KEY};

/// The two datasets this server knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    Railroads,
    Stations,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 2] = [DatasetKind::Railroads, DatasetKind::Stations];

    /// Object key in the backing store.
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Railroads => "N05-24_RailroadSection2.geojson",
            Self::Stations => "N05-24_Station2.geojson",
        }
    }

    /// Request path serving this dataset.
    pub fn path(self) -> &'static str {
        match self {
            Self::Railroads => "/api/railroads",
            Self::Stations => "/api/stations",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Railroads => "railroads",
            Self::Stations => "stations",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.path() == path)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// One GeoJSON feature, kept as raw JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feature(Value);

impl Feature {
    pub fn new(value: Value) -> Self {
        Feature(value)
    }

    /// The attribute map, if the feature carries one.
    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.0.get("properties").and_then(Value::as_object)
    }

    pub fn start_year(&self) -> Option<i32> {
        year_field(self.properties(), START_YEAR_KEY)
    }

    pub fn end_year(&self) -> Option<i32> {
        year_field(self.properties(), END_YEAR_KEY)
    }

    /// Trimmed line name, `""` when absent.
    pub fn line_name(&self) -> &str {
        property_string(self.properties(), LINE_NAME_KEY)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

#[derive(Debug, Error)]
pub enum DatasetParseError {
    #[error("invalid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid dataset: missing features array")]
    MissingFeatures,
}

/// An immutable, fully parsed dataset.
///
/// `original` is the body exactly as stored and is served as-is for
/// unfiltered requests. `envelope` holds every top-level member except
/// `features`, so a filtered collection can be rebuilt around a subset.
#[derive(Debug)]
pub struct Dataset {
    original: Bytes,
    envelope: Map<String, Value>,
    features: Vec<Feature>,
}

#[derive(Serialize)]
struct FilteredCollection<'a> {
    #[serde(flatten)]
    envelope: &'a Map<String, Value>,
    features: &'a [&'a Feature],
}

impl Dataset {
    pub fn parse(body: String) -> Result<Self, DatasetParseError> {
        let mut envelope: Map<String, Value> = serde_json::from_str(&body)?;
        let features = match envelope.remove("features") {
            Some(Value::Array(items)) => items.into_iter().map(Feature).collect(),
            _ => return Err(DatasetParseError::MissingFeatures),
        };

        Ok(Dataset {
            original: Bytes::from(body),
            envelope,
            features,
        })
    }

    pub fn original(&self) -> &Bytes {
        &self.original
    }

    pub fn envelope(&self) -> &Map<String, Value> {
        &self.envelope
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    /// Serialize a collection with this dataset's envelope and `features` replaced.
    pub fn render(&self, features: &[&Feature]) -> serde_json::Result<String> {
        serde_json::to_string(&FilteredCollection {
            envelope: &self.envelope,
            features,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const BODY: &str = r#"{
        "type": "FeatureCollection",
        "name": "N05-24_Station2",
        "crs": { "type": "name", "properties": { "name": "urn:ogc:def:crs:OGC:1.3:CRS84" } },
        "features": [
            { "type": "Feature", "properties": { "N05_002": "Main Line", "N05_005b": "1900" },
              "geometry": { "type": "Point", "coordinates": [139.7, 35.6] } },
            { "type": "Feature", "properties": null, "geometry": null, "id": 7 }
        ]
    }"#;

    #[test]
    fn parse_keeps_original_bytes_and_envelope() {
        let dataset = Dataset::parse(BODY.to_string()).expect("dataset should parse");

        assert_eq!(dataset.original().as_ref(), BODY.as_bytes());
        assert_eq!(dataset.features().len(), 2);
        assert_eq!(dataset.envelope()["name"], "N05-24_Station2");
        assert!(dataset.envelope().get("features").is_none());
    }

    #[test]
    fn feature_accessors_read_properties() {
        let dataset = Dataset::parse(BODY.to_string()).expect("dataset should parse");
        let first = &dataset.features()[0];
        let second = &dataset.features()[1];

        assert_eq!(first.line_name(), "Main Line");
        assert_eq!(first.start_year(), Some(1900));
        assert_eq!(first.end_year(), None);
        assert!(second.properties().is_none());
        assert_eq!(second.line_name(), "");
    }

    #[test]
    fn render_replaces_features_and_keeps_members() {
        let dataset = Dataset::parse(BODY.to_string()).expect("dataset should parse");
        let subset = vec![&dataset.features()[1]];

        let rendered = dataset.render(&subset).expect("render should succeed");
        let value: Value = serde_json::from_str(&rendered).expect("render emits json");

        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["crs"]["properties"]["name"], "urn:ogc:def:crs:OGC:1.3:CRS84");
        assert_eq!(
            value["features"],
            json!([{ "type": "Feature", "properties": null, "geometry": null, "id": 7 }])
        );
    }

    #[test]
    fn parse_rejects_bad_documents() {
        assert!(matches!(
            Dataset::parse("not json".to_string()),
            Err(DatasetParseError::Json(_))
        ));
        assert!(matches!(
            Dataset::parse("[1, 2]".to_string()),
            Err(DatasetParseError::Json(_))
        ));
        assert!(matches!(
            Dataset::parse(r#"{"type":"FeatureCollection"}"#.to_string()),
            Err(DatasetParseError::MissingFeatures)
        ));
        assert!(matches!(
            Dataset::parse(r#"{"type":"FeatureCollection","features":{}}"#.to_string()),
            Err(DatasetParseError::MissingFeatures)
        ));
    }

    #[test]
    fn dataset_kind_lookups() {
        assert_eq!(DatasetKind::from_path("/api/stations"), Some(DatasetKind::Stations));
        assert_eq!(DatasetKind::from_path("/api/other"), None);
        assert_eq!(DatasetKind::from_name("Railroads"), Some(DatasetKind::Railroads));
        assert_eq!(
            DatasetKind::Railroads.storage_key(),
            "N05-24_RailroadSection2.geojson"
        );
    }
}
