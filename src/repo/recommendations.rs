use aws_sdk_dynamodb::Client as DynamoDbClient;
use serde::Serialize;
use serde_dynamo::aws_sdk_dynamodb_1::to_item;
use tracing::info;

use super::RecommendationStore;
use crate::error::DatabaseError;
use reforest_engine::{RecommendationResult, Season};

/// Item layout of the recommendations table
#[derive(Debug, Serialize)]
pub struct RecommendationItem<'a> {
    /// Partition key
    pub recommendation_id: &'a str,
    pub sensor_id: &'a str,
    pub season: Season,
    pub confidence: f64,
    /// RFC3339
    pub created_at: String,
    pub result: &'a RecommendationResult,
}

impl<'a> RecommendationItem<'a> {
    pub fn new(recommendation_id: &'a str, result: &'a RecommendationResult) -> Self {
        Self {
            recommendation_id,
            sensor_id: &result.sensor_id,
            season: result.season,
            confidence: result.confidence,
            created_at: result.generated_at.to_rfc3339(),
            result,
        }
    }
}

/// Recommendation store backed by a DynamoDB table
#[derive(Debug, Clone)]
pub struct DynamoRecommendationStore {
    client: DynamoDbClient,
    table_name: String,
}

impl DynamoRecommendationStore {
    pub fn new(client: DynamoDbClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

impl RecommendationStore for DynamoRecommendationStore {
    async fn save(
        &self,
        recommendation_id: &str,
        result: &RecommendationResult,
    ) -> Result<(), DatabaseError> {
        let item = to_item(RecommendationItem::new(recommendation_id, result))?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| DatabaseError::DynamoDb(format!("{:?}", e)))?;

        info!(
            recommendation_id = %recommendation_id,
            sensor_id = %result.sensor_id,
            "Stored recommendation"
        );

        Ok(())
    }
}
