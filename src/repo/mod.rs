pub mod readings;
pub mod recommendations;
pub mod species;

use std::future::Future;

use reforest_engine::{HistoricalReading, RecommendationResult};

use crate::error::DatabaseError;

/// Persists generated recommendations
pub trait RecommendationStore: Send + Sync {
    fn save(
        &self,
        recommendation_id: &str,
        result: &RecommendationResult,
    ) -> impl Future<Output = Result<(), DatabaseError>> + Send;
}

/// Read access to a sensor's reading history
pub trait ReadingHistory: Send + Sync {
    /// Readings with `from_ms <= timestamp_ms <= to_ms`, oldest first
    fn readings_between(
        &self,
        sensor_id: &str,
        from_ms: i64,
        to_ms: i64,
    ) -> impl Future<Output = Result<Vec<HistoricalReading>, DatabaseError>> + Send;
}
