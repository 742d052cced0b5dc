use std::future::Future;

use aws_sdk_dynamodb::Client as DynamoDbClient;
use serde_dynamo::aws_sdk_dynamodb_1::from_items;
use tracing::{info, warn};

use crate::error::DatabaseError;
use reforest_engine::{DatasetProvider, InMemoryDatasetProvider, SpeciesDataset, SpeciesRecord};

/// Load the full species reference table.
///
/// Follows scan pagination until the table is exhausted, then validates
/// every record. A single invalid record fails the whole load.
pub async fn load_species(
    client: &DynamoDbClient,
    table_name: &str,
) -> Result<SpeciesDataset, DatabaseError> {
    let mut records: Vec<SpeciesRecord> = Vec::new();
    let mut start_key = None;
    let mut pages = 0;

    loop {
        let output = client
            .scan()
            .table_name(table_name)
            .set_exclusive_start_key(start_key)
            .send()
            .await
            .map_err(|e| DatabaseError::DynamoDb(format!("{:?}", e)))?;

        pages += 1;

        let page: Vec<SpeciesRecord> = from_items(output.items.unwrap_or_default())?;
        records.extend(page);

        start_key = output.last_evaluated_key;
        if start_key.is_none() {
            break;
        }
    }

    info!(
        table = %table_name,
        species = records.len(),
        pages,
        "Loaded species dataset"
    );

    SpeciesDataset::new(records).map_err(|e| DatabaseError::InvalidSpecies(e.to_string()))
}

/// Fill `provider` from `load` while it holds no species.
///
/// Returns whether the provider has species afterwards. A failed load
/// leaves the provider empty so the next call tries again.
pub async fn ensure_species_loaded<F, Fut>(provider: &InMemoryDatasetProvider, load: F) -> bool
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<SpeciesDataset, DatabaseError>>,
{
    if !provider.snapshot().is_empty() {
        return true;
    }

    match load().await {
        Ok(dataset) => {
            let loaded = !dataset.is_empty();
            provider.replace(dataset);
            loaded
        }
        Err(e) => {
            warn!(error = %e, "Species dataset could not be loaded");
            false
        }
    }
}
