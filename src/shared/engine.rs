use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::dataset::DatasetProvider;
use crate::domain::{confidence_percentage, RecommendationRequest, RecommendationResult};
use crate::ranking::RankingPolicy;
use crate::scoring::{score, ScoringError, ScoringWeights};
use crate::season::{current_season, SeasonalFactorTable};
use crate::sensor_validation::validate;
use crate::time::Clock;
use crate::trend::{analyze, HistoricalReading, TrendReport, TrendSettings};

pub const DEFAULT_TOP_K: usize = 3;

/// Tunables for a recommendation engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub weights: ScoringWeights,
    pub seasonal_factors: SeasonalFactorTable,
    pub ranking: RankingPolicy,
    /// Number of ranked species returned per request
    pub top_k: usize,
    pub trends: TrendSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            seasonal_factors: SeasonalFactorTable::default(),
            ranking: RankingPolicy::default(),
            top_k: DEFAULT_TOP_K,
            trends: TrendSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Sensor data failed validation: {}", .errors.join("; "))]
    Validation { errors: Vec<String> },

    #[error("Species dataset is empty or unavailable")]
    DatasetUnavailable,
}

impl From<ScoringError> for EngineError {
    fn from(err: ScoringError) -> Self {
        match err {
            ScoringError::DatasetUnavailable => EngineError::DatasetUnavailable,
        }
    }
}

/// Validates, scores and ranks species for a single reading
pub struct RecommendationEngine {
    config: EngineConfig,
    dataset: Arc<dyn DatasetProvider>,
}

impl RecommendationEngine {
    pub fn new(config: EngineConfig, dataset: Arc<dyn DatasetProvider>) -> Self {
        Self { config, dataset }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Produce ranked recommendations for a request.
    ///
    /// The clock is read once; that instant stamps the reading, picks the
    /// season and becomes `generated_at`.
    pub fn recommend(
        &self,
        request: &RecommendationRequest,
        clock: &dyn Clock,
    ) -> Result<RecommendationResult, EngineError> {
        let report = validate(&request.sensor_data);
        if !report.is_valid {
            warn!(
                sensor_id = %request.sensor_id,
                errors = ?report.errors,
                "Sensor data rejected"
            );
            return Err(EngineError::Validation {
                errors: report.errors,
            });
        }

        let now = clock.now();
        let reading =
            request
                .sensor_data
                .to_reading(now)
                .ok_or_else(|| EngineError::Validation {
                    errors: vec!["sensor data is incomplete".to_string()],
                })?;

        let season = current_season(now);
        let factors = self.config.seasonal_factors.factors(season);

        let snapshot = self.dataset.snapshot();
        let scored = score(&reading, &snapshot, &factors, &self.config.weights)?;

        let mut recommendations = self.config.ranking.rank(scored);
        recommendations.truncate(self.config.top_k);

        let confidence = recommendations
            .first()
            .map(|top| confidence_percentage(top.confidence_score))
            .unwrap_or(0.0);

        info!(
            sensor_id = %request.sensor_id,
            season = %season,
            candidates = snapshot.len(),
            returned = recommendations.len(),
            confidence,
            "Generated species recommendations"
        );

        Ok(RecommendationResult {
            sensor_id: request.sensor_id.clone(),
            sensor_data: reading,
            location: request.location.clone(),
            coordinates: request.coordinates.clone(),
            recommendations,
            season,
            generated_at: now,
            confidence,
            warnings: report.warnings,
        })
    }

    pub fn analyze_trends(&self, readings: &[HistoricalReading]) -> TrendReport {
        analyze(readings, &self.config.trends)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{InMemoryDatasetProvider, SpeciesDataset};
    use crate::domain::{SensorData, SpeciesRecord};
    use crate::season::Season;
    use crate::time::FixedClock;
    use crate::trend::TrendStatus;

    fn species(name: &str, is_native: bool, success_rate: f64) -> SpeciesRecord {
        SpeciesRecord {
            scientific_name: name.to_string(),
            common_name: name.to_string(),
            ph_min: 5.5,
            ph_max: 7.5,
            moisture_min: 35.0,
            moisture_max: 65.0,
            temp_min: 22.0,
            temp_max: 32.0,
            success_rate,
            adaptability_score: 75.0,
            is_native,
            category: "hardwood".to_string(),
        }
    }

    fn engine(records: Vec<SpeciesRecord>) -> RecommendationEngine {
        let dataset = SpeciesDataset::new(records).unwrap();
        RecommendationEngine::new(
            EngineConfig::default(),
            Arc::new(InMemoryDatasetProvider::new(dataset)),
        )
    }

    fn request(sensor_data: SensorData) -> RecommendationRequest {
        RecommendationRequest {
            sensor_id: "sensor-001".to_string(),
            sensor_data,
            location: Some(serde_json::json!("Plot 7")),
            coordinates: None,
        }
    }

    fn july_clock() -> FixedClock {
        FixedClock::from_rfc3339("2024-07-15T08:00:00Z").unwrap()
    }

    #[test]
    fn test_recommend_returns_top_k() {
        let engine = engine(vec![
            species("a", false, 60.0),
            species("b", true, 70.0),
            species("c", false, 80.0),
            species("d", true, 90.0),
        ]);

        let result = engine
            .recommend(&request(SensorData::new(6.5, 50.0, 27.0)), &july_clock())
            .unwrap();

        assert_eq!(result.recommendations.len(), 3);
        assert_eq!(result.season, Season::Wet);
        assert_eq!(result.sensor_id, "sensor-001");
        assert_eq!(result.location, Some(serde_json::json!("Plot 7")));
        assert_eq!(result.generated_at, july_clock().now());
        assert_eq!(result.sensor_data.timestamp, july_clock().now());
        assert!(result.warnings.is_empty());
        assert_eq!(
            result.confidence,
            confidence_percentage(result.recommendations[0].confidence_score)
        );
    }

    #[test]
    fn test_recommend_fewer_species_than_top_k() {
        let engine = engine(vec![species("only", true, 70.0)]);

        let result = engine
            .recommend(&request(SensorData::new(6.5, 50.0, 27.0)), &july_clock())
            .unwrap();

        assert_eq!(result.recommendations.len(), 1);
    }

    #[test]
    fn test_recommend_rejects_invalid_data() {
        let engine = engine(vec![species("a", true, 70.0)]);
        let data = SensorData {
            ph: None,
            soil_moisture: Some(50.0),
            temperature: Some(27.0),
        };

        let err = engine.recommend(&request(data), &july_clock()).unwrap_err();

        assert_eq!(
            err,
            EngineError::Validation {
                errors: vec!["ph is missing or invalid".to_string()]
            }
        );
    }

    #[test]
    fn test_recommend_empty_dataset() {
        let engine = RecommendationEngine::new(
            EngineConfig::default(),
            Arc::new(InMemoryDatasetProvider::empty()),
        );

        let err = engine
            .recommend(&request(SensorData::new(6.5, 50.0, 27.0)), &july_clock())
            .unwrap_err();

        assert_eq!(err, EngineError::DatasetUnavailable);
    }

    #[test]
    fn test_recommend_carries_warnings() {
        let engine = engine(vec![species("a", true, 70.0)]);

        let result = engine
            .recommend(&request(SensorData::new(8.5, 50.0, 27.0)), &july_clock())
            .unwrap();

        assert_eq!(
            result.warnings,
            vec!["ph (8.5) is outside optimal range (6-8)".to_string()]
        );
    }

    #[test]
    fn test_season_follows_clock() {
        let engine = engine(vec![species("a", true, 70.0)]);
        let january = FixedClock::from_rfc3339("2024-01-10T00:00:00Z").unwrap();

        let result = engine
            .recommend(&request(SensorData::new(6.5, 50.0, 27.0)), &january)
            .unwrap();

        assert_eq!(result.season, Season::Dry);
    }

    #[test]
    fn test_analyze_trends_uses_configured_minimum() {
        let engine = engine(vec![species("a", true, 70.0)]);

        let report = engine.analyze_trends(&[]);

        assert_eq!(report.message, TrendStatus::InsufficientData);
        assert_eq!(report.required_readings, Some(7));
    }

    #[test]
    fn test_engine_error_messages() {
        let err = EngineError::Validation {
            errors: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "Sensor data failed validation: a; b");
        assert_eq!(
            EngineError::from(ScoringError::DatasetUnavailable),
            EngineError::DatasetUnavailable
        );
    }
}
