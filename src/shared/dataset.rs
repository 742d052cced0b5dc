use std::sync::{Arc, RwLock};

use thiserror::Error;
use tracing::info;

use crate::domain::SpeciesRecord;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Species '{name}' has {attribute} min ({min}) greater than max ({max})")]
    InvertedRange {
        name: String,
        attribute: &'static str,
        min: f64,
        max: f64,
    },

    #[error("Species '{name}' has {attribute} ({value}) outside 0-100")]
    ScoreOutOfRange {
        name: String,
        attribute: &'static str,
        value: f64,
    },

    #[error("Species '{name}' has a non-finite {attribute}")]
    NonFinite { name: String, attribute: &'static str },

    #[error("Failed to parse species dataset: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Check the invariants of a single species record
pub fn validate_species(record: &SpeciesRecord) -> Result<(), DatasetError> {
    let name = || record.scientific_name.clone();

    let ranges = [
        ("pH", record.ph_min, record.ph_max),
        ("moisture", record.moisture_min, record.moisture_max),
        ("temperature", record.temp_min, record.temp_max),
    ];
    for (attribute, min, max) in ranges {
        if !min.is_finite() || !max.is_finite() {
            return Err(DatasetError::NonFinite {
                name: name(),
                attribute,
            });
        }
        if min > max {
            return Err(DatasetError::InvertedRange {
                name: name(),
                attribute,
                min,
                max,
            });
        }
    }

    let scores = [
        ("successRate", record.success_rate),
        ("adaptabilityScore", record.adaptability_score),
    ];
    for (attribute, value) in scores {
        if !(0.0..=100.0).contains(&value) {
            return Err(DatasetError::ScoreOutOfRange {
                name: name(),
                attribute,
                value,
            });
        }
    }

    Ok(())
}

/// Validated, immutable species dataset
#[derive(Debug, Clone)]
pub struct SpeciesDataset {
    records: Arc<[SpeciesRecord]>,
}

impl SpeciesDataset {
    pub fn new(records: Vec<SpeciesRecord>) -> Result<Self, DatasetError> {
        records.iter().try_for_each(validate_species)?;
        Ok(Self {
            records: records.into(),
        })
    }

    /// Parse a JSON array of species records
    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        let records: Vec<SpeciesRecord> = serde_json::from_str(json)?;
        Self::new(records)
    }

    pub fn empty() -> Self {
        Self {
            records: Arc::from(Vec::new()),
        }
    }

    pub fn records(&self) -> &[SpeciesRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Source of the species dataset.
///
/// Each call hands out an immutable snapshot; a provider may swap its data
/// between calls without affecting snapshots already taken.
pub trait DatasetProvider: Send + Sync {
    fn snapshot(&self) -> Arc<[SpeciesRecord]>;
}

/// Dataset held in memory and replaceable at runtime
#[derive(Debug)]
pub struct InMemoryDatasetProvider {
    current: RwLock<Arc<[SpeciesRecord]>>,
}

impl InMemoryDatasetProvider {
    pub fn new(dataset: SpeciesDataset) -> Self {
        Self {
            current: RwLock::new(dataset.records),
        }
    }

    pub fn empty() -> Self {
        Self::new(SpeciesDataset::empty())
    }

    /// Swap in a new dataset for subsequent snapshots
    pub fn replace(&self, dataset: SpeciesDataset) {
        let count = dataset.len();
        let mut current = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = dataset.records;
        info!(species = count, "Species dataset replaced");
    }
}

impl DatasetProvider for InMemoryDatasetProvider {
    fn snapshot(&self) -> Arc<[SpeciesRecord]> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}
