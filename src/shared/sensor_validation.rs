use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::SensorData;

pub const PH_MIN: f64 = 0.0;
pub const PH_MAX: f64 = 14.0;
pub const SOIL_MOISTURE_MIN_PCT: f64 = 0.0;
pub const SOIL_MOISTURE_MAX_PCT: f64 = 100.0;
pub const TEMP_MIN_C: f64 = -10.0;
pub const TEMP_MAX_C: f64 = 60.0;

pub const PH_OPTIMAL_MIN: f64 = 6.0;
pub const PH_OPTIMAL_MAX: f64 = 8.0;
pub const SOIL_MOISTURE_OPTIMAL_MIN_PCT: f64 = 30.0;
pub const SOIL_MOISTURE_OPTIMAL_MAX_PCT: f64 = 70.0;
pub const TEMP_OPTIMAL_MIN_C: f64 = 20.0;
pub const TEMP_OPTIMAL_MAX_C: f64 = 35.0;

/// The sensor attributes the engine understands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SensorField {
    Ph,
    SoilMoisture,
    Temperature,
}

impl SensorField {
    pub const ALL: [SensorField; 3] = [
        SensorField::Ph,
        SensorField::SoilMoisture,
        SensorField::Temperature,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SensorField::Ph => "ph",
            SensorField::SoilMoisture => "soilMoisture",
            SensorField::Temperature => "temperature",
        }
    }

    /// Absolute range a physical sensor can report
    pub fn valid_range(&self) -> (f64, f64) {
        match self {
            SensorField::Ph => (PH_MIN, PH_MAX),
            SensorField::SoilMoisture => (SOIL_MOISTURE_MIN_PCT, SOIL_MOISTURE_MAX_PCT),
            SensorField::Temperature => (TEMP_MIN_C, TEMP_MAX_C),
        }
    }

    /// Band outside of which a value is usable but worth flagging
    pub fn optimal_range(&self) -> (f64, f64) {
        match self {
            SensorField::Ph => (PH_OPTIMAL_MIN, PH_OPTIMAL_MAX),
            SensorField::SoilMoisture => {
                (SOIL_MOISTURE_OPTIMAL_MIN_PCT, SOIL_MOISTURE_OPTIMAL_MAX_PCT)
            }
            SensorField::Temperature => (TEMP_OPTIMAL_MIN_C, TEMP_OPTIMAL_MAX_C),
        }
    }

    pub fn value_of(&self, data: &SensorData) -> Option<f64> {
        match self {
            SensorField::Ph => data.ph,
            SensorField::SoilMoisture => data.soil_moisture,
            SensorField::Temperature => data.temperature,
        }
    }
}

/// Outcome of checking a single sensor value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueStatus {
    Ok,
    Missing,
    OutOfRange,
    Suboptimal,
}

pub fn check_value(field: SensorField, value: Option<f64>) -> ValueStatus {
    let (min, max) = field.valid_range();
    let (optimal_min, optimal_max) = field.optimal_range();
    match value {
        None => ValueStatus::Missing,
        Some(v) if !v.is_finite() => ValueStatus::Missing,
        Some(v) if v < min || v > max => ValueStatus::OutOfRange,
        Some(v) if v < optimal_min || v > optimal_max => ValueStatus::Suboptimal,
        Some(_) => ValueStatus::Ok,
    }
}

/// Result of validating one set of sensor values
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub has_warnings: bool,
}

/// Validate sensor values against domain and optimal ranges.
///
/// Never fails: missing or out-of-range values become `errors`, values outside
/// the optimal band become `warnings`. Only errors make the report invalid.
pub fn validate(data: &SensorData) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for field in SensorField::ALL {
        let value = field.value_of(data);
        match check_value(field, value) {
            ValueStatus::Ok => {}
            ValueStatus::Missing => {
                errors.push(format!("{} is missing or invalid", field.as_str()));
            }
            ValueStatus::OutOfRange => {
                let (min, max) = field.valid_range();
                errors.push(format!(
                    "{} ({}) is outside valid range ({}-{})",
                    field.as_str(),
                    value.unwrap_or_default(),
                    min,
                    max
                ));
            }
            ValueStatus::Suboptimal => {
                let (min, max) = field.optimal_range();
                warnings.push(format!(
                    "{} ({}) is outside optimal range ({}-{})",
                    field.as_str(),
                    value.unwrap_or_default(),
                    min,
                    max
                ));
            }
        }
    }

    debug!(
        errors = errors.len(),
        warnings = warnings.len(),
        "Validated sensor data"
    );

    ValidationReport {
        is_valid: errors.is_empty(),
        has_warnings: !warnings.is_empty(),
        errors,
        warnings,
    }
}
