use serde::{Deserialize, Serialize, Serializer};

use crate::fix::Fix;

/// Body of one upload request:
///
/// ```json
/// { "timestamp": ["2024-03-02T15:30:45Z"], "lat": [49.274167], "long": [-123.185333] }
/// ```
///
/// Every field is a single-element array, as the collector expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadPayload {
    pub timestamp: [String; 1],
    #[serde(serialize_with = "six_decimals")]
    pub lat: [f64; 1],
    #[serde(serialize_with = "six_decimals")]
    pub long: [f64; 1],
}

impl UploadPayload {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl From<&Fix> for UploadPayload {
    fn from(fix: &Fix) -> Self {
        Self {
            timestamp: [fix.timestamp.clone()],
            lat: [fix.latitude],
            long: [fix.longitude],
        }
    }
}

/// Rounds a coordinate to 6 decimal places, roughly 0.1 m.
pub fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

fn six_decimals<S: Serializer>(value: &[f64; 1], serializer: S) -> Result<S::Ok, S::Error> {
    [round6(value[0])].serialize(serializer)
}
