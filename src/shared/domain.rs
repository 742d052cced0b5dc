use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::season::Season;

// ============================================================================
// Sensor Models
// ============================================================================

/// Raw sensor values as received from the caller.
///
/// Every field is optional: a value that is absent, `null`, or not a JSON
/// number deserializes to `None` so the validator can report it instead of
/// the whole request failing to parse.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SensorData {
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub ph: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub soil_moisture: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl SensorData {
    pub fn new(ph: f64, soil_moisture: f64, temperature: f64) -> Self {
        Self {
            ph: Some(ph),
            soil_moisture: Some(soil_moisture),
            temperature: Some(temperature),
        }
    }

    /// Convert to a complete reading, or `None` if any value is absent
    pub fn to_reading(&self, timestamp: DateTime<Utc>) -> Option<SensorReading> {
        Some(SensorReading {
            ph: self.ph?,
            soil_moisture: self.soil_moisture?,
            temperature: self.temperature?,
            timestamp,
        })
    }
}

/// A complete soil reading: pH, soil moisture (0-100 %) and temperature (°C)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub ph: f64,
    pub soil_moisture: f64,
    pub temperature: f64,
    pub timestamp: DateTime<Utc>,
}

impl SensorReading {
    pub fn sensor_data(&self) -> SensorData {
        SensorData::new(self.ph, self.soil_moisture, self.temperature)
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()))
}

// ============================================================================
// Species Models
// ============================================================================

/// Species reference record from the dataset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesRecord {
    pub scientific_name: String,
    pub common_name: String,
    #[serde(rename = "pHMin")]
    pub ph_min: f64,
    #[serde(rename = "pHMax")]
    pub ph_max: f64,
    pub moisture_min: f64,
    pub moisture_max: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    /// Historical planting success, 0-100
    pub success_rate: f64,
    /// 0-100
    pub adaptability_score: f64,
    pub is_native: bool,
    pub category: String,
}

/// A species record together with its scores for one reading
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoredSpecies {
    #[serde(flatten)]
    pub species: SpeciesRecord,
    #[serde(rename = "pHCompatibility")]
    pub ph_compatibility: f64,
    pub moisture_compatibility: f64,
    pub temp_compatibility: f64,
    pub confidence_score: f64,
    pub overall_score: f64,
    pub native_bonus: f64,
}

// ============================================================================
// Recommendation Models
// ============================================================================

/// Caller-facing recommendation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub sensor_id: String,
    #[serde(default)]
    pub sensor_data: SensorData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<serde_json::Value>,
}

/// Ranked recommendations for one reading, handed to the persistence layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
    pub sensor_id: String,
    pub sensor_data: SensorReading,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<serde_json::Value>,
    pub recommendations: Vec<ScoredSpecies>,
    pub season: Season,
    pub generated_at: DateTime<Utc>,
    /// Top recommendation's confidence as a percentage, 2 decimals
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Caller-facing recommendation response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub recommendation_id: String,
    pub recommendations: Vec<ScoredSpecies>,
    pub sensor_data: SensorData,
    pub season: Season,
    pub generated_at: DateTime<Utc>,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl RecommendationResponse {
    pub fn from_result(recommendation_id: impl Into<String>, result: RecommendationResult) -> Self {
        Self {
            recommendation_id: recommendation_id.into(),
            sensor_data: result.sensor_data.sensor_data(),
            recommendations: result.recommendations,
            season: result.season,
            generated_at: result.generated_at,
            confidence: result.confidence,
            warnings: result.warnings,
        }
    }
}

/// Express a [0,1] confidence as a percentage rounded to 2 decimals
pub fn confidence_percentage(confidence: f64) -> f64 {
    (confidence * 10_000.0).round() / 100.0
}
