use lambda_http::{Body, Request, Response};
use tracing::{info, warn};

use super::{json_response, parse_json_body};
use crate::error::{ApiError, ValidationError};
use crate::repo::RecommendationStore;
use reforest_engine::{
    validate_sensor_id, Clock, IdGenerator, RecommendationEngine, RecommendationRequest,
    RecommendationResponse,
};

/// Handle POST /recommendations
///
/// Validates the sensor id, runs the engine on the submitted reading, stores
/// the result under a fresh recommendation id and answers with the ranked
/// species. Sensor values outside their optimal band are reported as
/// `warnings` without failing the request.
pub async fn handle_create_recommendation<S: RecommendationStore>(
    event: Request,
    request_id: &str,
    engine: &RecommendationEngine,
    store: &S,
    clock: &dyn Clock,
    id_generator: &dyn IdGenerator,
) -> Result<Response<Body>, ApiError> {
    let request: RecommendationRequest = parse_json_body(&event, request_id)?;

    validate_sensor_id(&request.sensor_id)
        .map_err(|e| ValidationError::InvalidSensorId(e.message))?;

    info!(
        request_id = %request_id,
        sensor_id = %request.sensor_id,
        "Processing recommendation request"
    );

    let result = engine.recommend(&request, clock)?;

    if !result.warnings.is_empty() {
        warn!(
            request_id = %request_id,
            sensor_id = %result.sensor_id,
            warnings = ?result.warnings,
            "Sensor data outside optimal range"
        );
    }

    let recommendation_id = id_generator.recommendation_id();
    store.save(&recommendation_id, &result).await?;

    info!(
        request_id = %request_id,
        sensor_id = %result.sensor_id,
        recommendation_id = %recommendation_id,
        count = result.recommendations.len(),
        "Recommendation completed successfully"
    );

    json_response(&RecommendationResponse::from_result(recommendation_id, result))
}
