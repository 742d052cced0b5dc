use lambda_http::http::Method;
use lambda_http::{Body, Request, Response};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::handlers::recommendations::handle_create_recommendation;
use crate::handlers::trends::{handle_analyze_trends, handle_sensor_trends};
use crate::repo::{ReadingHistory, RecommendationStore};
use reforest_engine::{Clock, IdGenerator, RecommendationEngine};

pub const SERVICE_NAME: &str = "reforest-recommendation-api";

/// Route a health check request (no config needed)
pub fn route_request_health(request_id: &str) -> Result<Response<Body>, ApiError> {
    handle_health(request_id)
}

/// Everything a routed request may need besides the request itself
pub struct Services<'a, S, H> {
    pub engine: &'a RecommendationEngine,
    pub store: &'a S,
    pub history: &'a H,
    pub clock: &'a dyn Clock,
    pub id_generator: &'a dyn IdGenerator,
}

/// Route an incoming request to the appropriate handler
///
/// Normalizes the path (trailing slashes), matches on method and path
/// segments, and returns 404 for unknown routes.
pub async fn route_request<S, H>(
    event: Request,
    request_id: &str,
    services: &Services<'_, S, H>,
) -> Result<Response<Body>, ApiError>
where
    S: RecommendationStore,
    H: ReadingHistory,
{
    let method = event.method().clone();
    let path = normalize_path(event.uri().path());

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Routing request"
    );

    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

    match (&method, segments.as_slice()) {
        (&Method::GET, ["health"]) => handle_health(request_id),

        (&Method::POST, ["recommendations"]) => {
            info!(request_id = %request_id, "Recommendations endpoint");
            handle_create_recommendation(
                event,
                request_id,
                services.engine,
                services.store,
                services.clock,
                services.id_generator,
            )
            .await
        }

        (&Method::POST, ["trends"]) => {
            info!(request_id = %request_id, "Trend analysis endpoint");
            handle_analyze_trends(event, request_id, services.engine).await
        }

        (&Method::GET, ["sensors", sensor_id, "trends"]) => {
            info!(request_id = %request_id, sensor_id = %sensor_id, "Sensor trends endpoint");
            let sensor_id = sensor_id.to_string();
            handle_sensor_trends(
                event,
                request_id,
                &sensor_id,
                services.engine,
                services.history,
                services.clock,
            )
            .await
        }

        _ => {
            warn!(
                request_id = %request_id,
                method = %method,
                path = %path,
                "Unknown route"
            );
            handle_not_found(request_id, &method, &path)
        }
    }
}

/// Normalize a path by removing trailing slashes
///
/// This ensures that /trends and /trends/ are treated the same.
/// The root path "/" is preserved as-is.
pub fn normalize_path(path: &str) -> String {
    if path == "/" {
        return path.to_string();
    }

    path.trim_end_matches('/').to_string()
}

fn handle_health(request_id: &str) -> Result<Response<Body>, ApiError> {
    let body = serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "request_id": request_id
    });

    Response::builder()
        .status(200)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}

fn handle_not_found(
    request_id: &str,
    method: &Method,
    path: &str,
) -> Result<Response<Body>, ApiError> {
    let body = serde_json::json!({
        "error": "NOT_FOUND",
        "message": format!("Route {} {} not found", method, path),
        "request_id": request_id
    });

    Response::builder()
        .status(404)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DatabaseError;
    use crate::handlers::test_support::{body_json, request};
    use reforest_engine::{
        EngineConfig, FixedClock, FixedIdGenerator, HistoricalReading, InMemoryDatasetProvider,
        RecommendationResult, SpeciesDataset, SpeciesRecord,
    };
    use std::sync::Arc;

    struct NullStore;

    impl RecommendationStore for NullStore {
        async fn save(&self, _: &str, _: &RecommendationResult) -> Result<(), DatabaseError> {
            Ok(())
        }
    }

    struct EmptyHistory;

    impl ReadingHistory for EmptyHistory {
        async fn readings_between(
            &self,
            _: &str,
            _: i64,
            _: i64,
        ) -> Result<Vec<HistoricalReading>, DatabaseError> {
            Ok(Vec::new())
        }
    }

    fn engine() -> RecommendationEngine {
        let species = SpeciesRecord {
            scientific_name: "Vitex parviflora".to_string(),
            common_name: "Molave".to_string(),
            ph_min: 5.5,
            ph_max: 8.0,
            moisture_min: 25.0,
            moisture_max: 55.0,
            temp_min: 22.0,
            temp_max: 36.0,
            success_rate: 70.0,
            adaptability_score: 88.0,
            is_native: true,
            category: "hardwood".to_string(),
        };
        RecommendationEngine::new(
            EngineConfig::default(),
            Arc::new(InMemoryDatasetProvider::new(
                SpeciesDataset::new(vec![species]).unwrap(),
            )),
        )
    }

    async fn route(method: Method, uri: &str, body: Option<&str>) -> Response<Body> {
        let engine = engine();
        let clock = FixedClock::from_rfc3339("2024-03-01T00:00:00Z").unwrap();
        let ids = FixedIdGenerator::single("7c9e6679-7425-40de-944b-e07fc1f90ae7");
        let services = Services {
            engine: &engine,
            store: &NullStore,
            history: &EmptyHistory,
            clock: &clock,
            id_generator: &ids,
        };

        match route_request(request(method, uri, body), "test-req", &services).await {
            Ok(response) => response,
            Err(e) => e.to_http_response("test-req"),
        }
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/trends"), "/trends");
        assert_eq!(normalize_path("/trends/"), "/trends");
        assert_eq!(normalize_path("/recommendations///"), "/recommendations");
        assert_eq!(
            normalize_path("/sensors/sensor-001/trends/"),
            "/sensors/sensor-001/trends"
        );
    }

    #[test]
    fn test_handle_health() {
        let response = route_request_health("test-req-123").unwrap();

        assert_eq!(response.status(), 200);
        let body = body_json(&response);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], SERVICE_NAME);
        assert_eq!(body["request_id"], "test-req-123");
    }

    #[tokio::test]
    async fn test_route_recommendations() {
        let body = r#"{"sensorId": "sensor-001",
            "sensorData": {"ph": 6.8, "soilMoisture": 40, "temperature": 28}}"#;
        let response = route(Method::POST, "/recommendations/", Some(body)).await;

        assert_eq!(response.status(), 200);
        let body = body_json(&response);
        assert_eq!(body["season"], "dry");
        assert_eq!(
            body["recommendations"][0]["scientificName"],
            "Vitex parviflora"
        );
    }

    #[tokio::test]
    async fn test_route_trends() {
        let response = route(Method::POST, "/trends", Some(r#"{"readings": []}"#)).await;

        assert_eq!(response.status(), 200);
        assert_eq!(body_json(&response)["readingsCount"], 0);
    }

    #[tokio::test]
    async fn test_route_sensor_trends() {
        let response = route(Method::GET, "/sensors/sensor-001/trends", None).await;

        assert_eq!(response.status(), 200);
        assert_eq!(body_json(&response)["sensorId"], "sensor-001");
    }

    #[tokio::test]
    async fn test_route_not_found() {
        let response = route(Method::GET, "/unknown", None).await;

        assert_eq!(response.status(), 404);
        let body = body_json(&response);
        assert_eq!(body["error"], "NOT_FOUND");
        assert_eq!(body["message"], "Route GET /unknown not found");
    }

    #[tokio::test]
    async fn test_route_wrong_method() {
        let response = route(Method::DELETE, "/recommendations", None).await;
        assert_eq!(response.status(), 404);

        let response = route(Method::POST, "/sensors/sensor-001/trends", None).await;
        assert_eq!(response.status(), 404);
    }
}
