//! Multi-day trend detection over a sensor's reading history.
//!
//! A report needs a minimum number of readings. Below that the analysis
//! still succeeds but answers `insufficient_data` with zero confidence.

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::sensor_validation::SensorField;

/// A stored value that may not be numeric.
///
/// History comes from storage written by other components, so a value can
/// arrive as a number, as numeric text, or as something unusable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Measurement {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl Measurement {
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Measurement::Number(v) => *v,
            Measurement::Text(text) => text.trim().parse::<f64>().ok()?,
            Measurement::Other(_) => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl From<f64> for Measurement {
    fn from(value: f64) -> Self {
        Measurement::Number(value)
    }
}

/// One entry of a sensor's reading history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalReading {
    /// RFC 3339 text or epoch milliseconds on input, RFC 3339 on output
    #[serde(deserialize_with = "flexible_timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ph: Option<Measurement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_moisture: Option<Measurement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Measurement>,
}

impl HistoricalReading {
    pub fn new(timestamp: DateTime<Utc>, ph: f64, soil_moisture: f64, temperature: f64) -> Self {
        Self {
            timestamp,
            ph: Some(ph.into()),
            soil_moisture: Some(soil_moisture.into()),
            temperature: Some(temperature.into()),
        }
    }

    /// Numeric value of a field, `None` when absent or unparsable
    pub fn value(&self, field: SensorField) -> Option<f64> {
        let measurement = match field {
            SensorField::Ph => self.ph.as_ref(),
            SensorField::SoilMoisture => self.soil_moisture.as_ref(),
            SensorField::Temperature => self.temperature.as_ref(),
        };
        measurement.and_then(Measurement::as_f64)
    }
}

fn flexible_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Millis(i64),
        Text(String),
    }

    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Millis(millis) => DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| de::Error::custom(format!("timestamp {} is out of range", millis))),
        RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(text.trim())
            .map(|t| t.with_timezone(&Utc))
            .map_err(de::Error::custom),
    }
}

/// Decode caller-supplied history entries one by one.
///
/// An entry that is not a reading (no usable timestamp, wrong shape) is
/// dropped so the rest of the batch can still be analyzed.
pub fn decode_history(entries: Vec<serde_json::Value>) -> Vec<HistoricalReading> {
    let total = entries.len();
    let readings: Vec<HistoricalReading> = entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(reading) => Some(reading),
            Err(e) => {
                debug!(error = %e, "Dropped malformed history entry");
                None
            }
        })
        .collect();

    if readings.len() < total {
        debug!(
            received = total,
            kept = readings.len(),
            "Decoded reading history with dropped entries"
        );
    }

    readings
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Rising,
    Falling,
    Stable,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttributeTrend {
    pub slope: f64,
    pub direction: TrendDirection,
    pub net_change: f64,
}

/// Per-attribute trends; an attribute with no usable values has none
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trends {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ph: Option<AttributeTrend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soil_moisture: Option<AttributeTrend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<AttributeTrend>,
}

impl Trends {
    pub fn get(&self, field: SensorField) -> Option<&AttributeTrend> {
        match field {
            SensorField::Ph => self.ph.as_ref(),
            SensorField::SoilMoisture => self.soil_moisture.as_ref(),
            SensorField::Temperature => self.temperature.as_ref(),
        }
    }

    fn set(&mut self, field: SensorField, trend: Option<AttributeTrend>) {
        match field {
            SensorField::Ph => self.ph = trend,
            SensorField::SoilMoisture => self.soil_moisture = trend,
            SensorField::Temperature => self.temperature = trend,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    LowMoistureTrend,
    HighPhTrend,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub message: String,
    pub current_value: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrendStatus {
    InsufficientData,
    AnalysisComplete,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    pub trends: Option<Trends>,
    pub alerts: Vec<Alert>,
    pub confidence: f64,
    pub message: TrendStatus,
    pub readings_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_readings: Option<usize>,
}

/// Thresholds for trend classification and alerting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendSettings {
    pub min_readings: usize,
    /// A slope beyond ±this value counts as rising/falling
    pub slope_threshold: f64,
    /// Confidence reported once `min_readings` is met
    pub confidence: f64,
    pub low_moisture_pct: f64,
    pub high_ph: f64,
}

impl Default for TrendSettings {
    fn default() -> Self {
        Self {
            min_readings: 7,
            slope_threshold: 0.5,
            confidence: 0.8,
            low_moisture_pct: 30.0,
            high_ph: 8.0,
        }
    }
}

pub fn classify_slope(slope: f64, threshold: f64) -> TrendDirection {
    if slope > threshold {
        TrendDirection::Rising
    } else if slope < -threshold {
        TrendDirection::Falling
    } else {
        TrendDirection::Stable
    }
}

/// Trend of a time-ordered series, `None` for an empty series
pub fn series_trend(series: &[f64], threshold: f64) -> Option<AttributeTrend> {
    let (first, last) = (series.first()?, series.last()?);
    let net_change = last - first;
    let slope = net_change / series.len() as f64;

    Some(AttributeTrend {
        slope,
        direction: classify_slope(slope, threshold),
        net_change,
    })
}

/// Analyze a reading history for trends and alerts
pub fn analyze(readings: &[HistoricalReading], settings: &TrendSettings) -> TrendReport {
    let readings_count = readings.len();

    if readings_count < settings.min_readings {
        debug!(
            readings = readings_count,
            required = settings.min_readings,
            "Not enough readings for trend analysis"
        );
        return TrendReport {
            trends: None,
            alerts: Vec::new(),
            confidence: 0.0,
            message: TrendStatus::InsufficientData,
            readings_count,
            required_readings: Some(settings.min_readings),
        };
    }

    let mut ordered: Vec<&HistoricalReading> = readings.iter().collect();
    ordered.sort_by_key(|reading| reading.timestamp);

    let mut trends = Trends::default();
    for field in SensorField::ALL {
        let series: Vec<f64> = ordered.iter().filter_map(|r| r.value(field)).collect();
        let dropped = readings_count - series.len();
        if dropped > 0 {
            debug!(
                field = field.as_str(),
                dropped, "Dropped unparsable history entries"
            );
        }
        trends.set(field, series_trend(&series, settings.slope_threshold));
    }

    let alerts = match ordered.last() {
        Some(latest) => detect_alerts(&trends, latest, settings),
        None => Vec::new(),
    };

    debug!(
        readings = readings_count,
        alerts = alerts.len(),
        "Trend analysis complete"
    );

    TrendReport {
        trends: Some(trends),
        alerts,
        confidence: settings.confidence,
        message: TrendStatus::AnalysisComplete,
        readings_count,
        required_readings: None,
    }
}

fn detect_alerts(
    trends: &Trends,
    latest: &HistoricalReading,
    settings: &TrendSettings,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    let direction = |field| trends.get(field).map(|t| t.direction);

    if direction(SensorField::SoilMoisture) == Some(TrendDirection::Falling) {
        if let Some(moisture) = latest.value(SensorField::SoilMoisture) {
            if moisture < settings.low_moisture_pct {
                alerts.push(Alert {
                    alert_type: AlertType::LowMoistureTrend,
                    severity: AlertSeverity::Warning,
                    message: format!(
                        "Soil moisture is falling and is now {}%, below {}%",
                        moisture, settings.low_moisture_pct
                    ),
                    current_value: moisture,
                });
            }
        }
    }

    if direction(SensorField::Ph) == Some(TrendDirection::Rising) {
        if let Some(ph) = latest.value(SensorField::Ph) {
            if ph > settings.high_ph {
                alerts.push(Alert {
                    alert_type: AlertType::HighPhTrend,
                    severity: AlertSeverity::Warning,
                    message: format!("Soil pH is rising and is now {}, above {}", ph, settings.high_ph),
                    current_value: ph,
                });
            }
        }
    }

    alerts
}
