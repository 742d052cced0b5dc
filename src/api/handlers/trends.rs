use lambda_http::{Body, Request, RequestExt, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{json_response, parse_json_body};
use crate::error::{ApiError, ValidationError};
use crate::repo::ReadingHistory;
use reforest_engine::{
    decode_history, validate_history_days, validate_sensor_id, Clock, RecommendationEngine,
    TrendReport,
};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Request payload for ad-hoc trend analysis.
///
/// Entries stay raw JSON until [`decode_history`] so one malformed entry
/// does not reject the whole batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendsRequest {
    #[serde(default)]
    pub readings: Vec<serde_json::Value>,
}

/// Trend report for a stored sensor history
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorTrendsResponse {
    pub sensor_id: String,
    pub days: u32,
    #[serde(flatten)]
    pub report: TrendReport,
}

/// Handle POST /trends: analyze a caller-supplied reading history
pub async fn handle_analyze_trends(
    event: Request,
    request_id: &str,
    engine: &RecommendationEngine,
) -> Result<Response<Body>, ApiError> {
    let request: TrendsRequest = parse_json_body(&event, request_id)?;

    let received = request.readings.len();
    let readings = decode_history(request.readings);
    if readings.len() < received {
        debug!(
            request_id = %request_id,
            received,
            dropped = received - readings.len(),
            "Dropped malformed history entries"
        );
    }

    let report = engine.analyze_trends(&readings);

    info!(
        request_id = %request_id,
        readings = report.readings_count,
        alerts = report.alerts.len(),
        "Trend analysis completed"
    );

    json_response(&report)
}

/// Handle GET /sensors/{sensor_id}/trends?days=N
///
/// Loads the last `days` days (default 7, at most 90) of the sensor's
/// readings and analyzes them.
pub async fn handle_sensor_trends<H: ReadingHistory>(
    event: Request,
    request_id: &str,
    sensor_id: &str,
    engine: &RecommendationEngine,
    history: &H,
    clock: &dyn Clock,
) -> Result<Response<Body>, ApiError> {
    validate_sensor_id(sensor_id).map_err(|e| ValidationError::InvalidSensorId(e.message))?;

    let query_params = event.query_string_parameters();
    let days = validate_history_days(query_params.first("days"))
        .map_err(|e| ValidationError::InvalidQuery(e.message))?;

    let to_ms = clock.now_epoch_millis();
    let from_ms = to_ms - i64::from(days) * MILLIS_PER_DAY;

    info!(
        request_id = %request_id,
        sensor_id = %sensor_id,
        days,
        from_ms,
        to_ms,
        "Loading reading history"
    );

    let readings = history.readings_between(sensor_id, from_ms, to_ms).await?;
    let report = engine.analyze_trends(&readings);

    info!(
        request_id = %request_id,
        sensor_id = %sensor_id,
        readings = report.readings_count,
        alerts = report.alerts.len(),
        "Sensor trend analysis completed"
    );

    json_response(&SensorTrendsResponse {
        sensor_id: sensor_id.to_string(),
        days,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DatabaseError;
    use crate::handlers::test_support::{body_json, request};
    use chrono::Duration;
    use lambda_http::http::Method;
    use reforest_engine::{EngineConfig, FixedClock, HistoricalReading, InMemoryDatasetProvider};
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Serves a fixed history and records the requested window
    struct MemoryHistory {
        readings: Vec<HistoricalReading>,
        last_query: Mutex<Option<(String, i64, i64)>>,
    }

    impl MemoryHistory {
        fn new(readings: Vec<HistoricalReading>) -> Self {
            Self {
                readings,
                last_query: Mutex::new(None),
            }
        }
    }

    impl ReadingHistory for MemoryHistory {
        async fn readings_between(
            &self,
            sensor_id: &str,
            from_ms: i64,
            to_ms: i64,
        ) -> Result<Vec<HistoricalReading>, DatabaseError> {
            *self.last_query.lock().unwrap() = Some((sensor_id.to_string(), from_ms, to_ms));
            Ok(self
                .readings
                .iter()
                .filter(|r| (from_ms..=to_ms).contains(&r.timestamp.timestamp_millis()))
                .cloned()
                .collect())
        }
    }

    fn engine() -> RecommendationEngine {
        RecommendationEngine::new(
            EngineConfig::default(),
            Arc::new(InMemoryDatasetProvider::empty()),
        )
    }

    fn clock() -> FixedClock {
        FixedClock::from_rfc3339("2024-07-15T00:00:00Z").unwrap()
    }

    /// One reading per day ending at the clock's instant, moisture falling
    fn drying_history(days: usize) -> Vec<HistoricalReading> {
        let now = clock().now();
        (0..days)
            .map(|i| {
                let age = (days - 1 - i) as i64;
                HistoricalReading::new(
                    now - Duration::days(age),
                    6.8,
                    65.0 - 6.0 * i as f64,
                    27.0,
                )
            })
            .collect()
    }

    fn with_days(days: &str) -> Request {
        let mut query = HashMap::new();
        query.insert("days".to_string(), days.to_string());
        request(Method::GET, "/sensors/sensor-001/trends", None).with_query_string_parameters(query)
    }

    #[tokio::test]
    async fn test_analyze_trends_body() {
        let body = r#"{"readings": [
            {"timestamp": "2024-07-01T00:00:00Z", "ph": 6.8, "soilMoisture": 50, "temperature": 27},
            {"timestamp": "2024-07-02T00:00:00Z", "ph": "6.9", "soilMoisture": 49, "temperature": 27}
        ]}"#;

        let response = handle_analyze_trends(
            request(Method::POST, "/trends", Some(body)),
            "req-1",
            &engine(),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), 200);
        let body = body_json(&response);
        assert_eq!(body["message"], "insufficient_data");
        assert_eq!(body["readingsCount"], 2);
        assert_eq!(body["requiredReadings"], 7);
        assert_eq!(body["confidence"], 0.0);
    }

    /// Seven usable daily entries with falling moisture, plus the given extras
    fn trends_body(extra: &[serde_json::Value]) -> String {
        let mut readings: Vec<serde_json::Value> = (0..7)
            .map(|day| {
                serde_json::json!({
                    "timestamp": format!("2024-07-{:02}T06:00:00Z", day + 1),
                    "ph": 6.8,
                    "soilMoisture": 60 - 6 * day,
                    "temperature": 27
                })
            })
            .collect();
        readings.extend_from_slice(extra);
        serde_json::json!({ "readings": readings }).to_string()
    }

    #[tokio::test]
    async fn test_analyze_trends_skips_unreadable_timestamp() {
        let body = trends_body(&[serde_json::json!({
            "timestamp": "yesterday",
            "ph": 9.5,
            "soilMoisture": 10,
            "temperature": 27
        })]);

        let response = handle_analyze_trends(
            request(Method::POST, "/trends", Some(body.as_str())),
            "req-6",
            &engine(),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), 200);
        let body = body_json(&response);
        assert_eq!(body["message"], "analysis_complete");
        assert_eq!(body["readingsCount"], 7);
        assert_eq!(body["trends"]["soilMoisture"]["direction"], "falling");
        assert_eq!(body["alerts"][0]["currentValue"], 24.0);
    }

    #[tokio::test]
    async fn test_analyze_trends_dropped_entries_do_not_count() {
        let mut body: serde_json::Value = serde_json::from_str(&trends_body(&[
            serde_json::json!({"timestamp": null, "ph": 6.8}),
            serde_json::json!(42),
        ]))
        .unwrap();
        // Leave six usable entries
        body["readings"].as_array_mut().unwrap().remove(0);

        let response = handle_analyze_trends(
            request(Method::POST, "/trends", Some(body.to_string().as_str())),
            "req-7",
            &engine(),
        )
        .await
        .unwrap();

        let body = body_json(&response);
        assert_eq!(body["message"], "insufficient_data");
        assert_eq!(body["readingsCount"], 6);
    }

    #[tokio::test]
    async fn test_analyze_trends_accepts_epoch_millis() {
        let body = trends_body(&[serde_json::json!({
            "timestamp": 1720850400000i64,
            "ph": 6.8,
            "soilMoisture": 20,
            "temperature": 27
        })]);

        let response = handle_analyze_trends(
            request(Method::POST, "/trends", Some(body.as_str())),
            "req-8",
            &engine(),
        )
        .await
        .unwrap();

        let body = body_json(&response);
        assert_eq!(body["readingsCount"], 8);
        assert_eq!(body["alerts"][0]["currentValue"], 20.0);
    }

    #[tokio::test]
    async fn test_sensor_trends_default_window() {
        let history = MemoryHistory::new(drying_history(10));

        let response = handle_sensor_trends(
            request(Method::GET, "/sensors/sensor-001/trends", None),
            "req-2",
            "sensor-001",
            &engine(),
            &history,
            &clock(),
        )
        .await
        .unwrap();

        let body = body_json(&response);
        assert_eq!(body["sensorId"], "sensor-001");
        assert_eq!(body["days"], 7);
        // Days 0..=7 back from now fall inside a 7 day window
        assert_eq!(body["readingsCount"], 8);
        assert_eq!(body["message"], "analysis_complete");
        assert_eq!(body["trends"]["soilMoisture"]["direction"], "falling");
        assert_eq!(body["alerts"][0]["type"], "low_moisture_trend");

        let (sensor_id, from_ms, to_ms) = history.last_query.lock().unwrap().clone().unwrap();
        assert_eq!(sensor_id, "sensor-001");
        assert_eq!(to_ms, clock().now_epoch_millis());
        assert_eq!(to_ms - from_ms, 7 * MILLIS_PER_DAY);
    }

    #[tokio::test]
    async fn test_sensor_trends_custom_window() {
        let history = MemoryHistory::new(drying_history(10));

        let response = handle_sensor_trends(
            with_days("3"),
            "req-3",
            "sensor-001",
            &engine(),
            &history,
            &clock(),
        )
        .await
        .unwrap();

        let body = body_json(&response);
        assert_eq!(body["days"], 3);
        assert_eq!(body["readingsCount"], 4);
        assert_eq!(body["message"], "insufficient_data");
    }

    #[tokio::test]
    async fn test_sensor_trends_rejects_bad_days() {
        let history = MemoryHistory::new(Vec::new());

        let err = handle_sensor_trends(
            with_days("365"),
            "req-4",
            "sensor-001",
            &engine(),
            &history,
            &clock(),
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            ApiError::Validation(ValidationError::InvalidQuery(_))
        ));
        assert!(history.last_query.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sensor_trends_rejects_bad_sensor_id() {
        let err = handle_sensor_trends(
            request(Method::GET, "/sensors/bad%20id/trends", None),
            "req-5",
            "bad id",
            &engine(),
            &MemoryHistory::new(Vec::new()),
            &clock(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_http_response("req-5").status(), 400);
    }
}
