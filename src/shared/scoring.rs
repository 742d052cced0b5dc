use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{ScoredSpecies, SensorReading, SpeciesRecord};
use crate::season::SeasonalFactors;

/// Smallest band width used when scaling out-of-band distance, so that a
/// species with `min == max` still decays smoothly instead of dividing by zero
pub const MIN_BAND_WIDTH: f64 = 0.5;

/// Lower bound for a species' confidence score
pub const MIN_CONFIDENCE: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    #[error("Species dataset is empty or unavailable")]
    DatasetUnavailable,
}

/// Fixed weights combining attribute compatibilities and historical metrics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub ph: f64,
    pub moisture: f64,
    pub temperature: f64,
    pub success_rate: f64,
    pub adaptability: f64,
    pub native_bonus: f64,
    /// Share of the overall score taken by the confidence score
    pub overall_confidence: f64,
    pub overall_success_rate: f64,
    pub overall_adaptability: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            ph: 0.25,
            moisture: 0.30,
            temperature: 0.25,
            success_rate: 0.10,
            adaptability: 0.10,
            native_bonus: 0.10,
            overall_confidence: 0.6,
            overall_success_rate: 0.2,
            overall_adaptability: 0.2,
        }
    }
}

/// Compatibility of `value` with the preferred band `[min, max]`.
///
/// Inside the band the score is 1.0. Outside, it decays exponentially with
/// the distance to the nearest boundary, measured in units of
/// `band width × factor`: a factor above 1 stretches the tolerance so the
/// same deviation scores higher, a factor below 1 shrinks it.
/// Non-finite values score 0.
pub fn range_compatibility(value: f64, min: f64, max: f64, factor: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    if value >= min && value <= max {
        return 1.0;
    }

    let distance = if value < min { min - value } else { value - max };
    let tolerance = (max - min).max(MIN_BAND_WIDTH) * factor.max(f64::EPSILON);

    (-distance / tolerance).exp().clamp(0.0, 1.0)
}

/// Score a single species for one reading
pub fn score_species(
    reading: &SensorReading,
    species: &SpeciesRecord,
    factors: &SeasonalFactors,
    weights: &ScoringWeights,
) -> ScoredSpecies {
    let ph_compatibility =
        range_compatibility(reading.ph, species.ph_min, species.ph_max, factors.ph());
    let moisture_compatibility = range_compatibility(
        reading.soil_moisture,
        species.moisture_min,
        species.moisture_max,
        factors.moisture(),
    );
    let temp_compatibility = range_compatibility(
        reading.temperature,
        species.temp_min,
        species.temp_max,
        factors.temperature(),
    );

    let success = (species.success_rate / 100.0).clamp(0.0, 1.0);
    let adaptability = (species.adaptability_score / 100.0).clamp(0.0, 1.0);

    let base_confidence = weights.ph * ph_compatibility
        + weights.moisture * moisture_compatibility
        + weights.temperature * temp_compatibility
        + weights.success_rate * success
        + weights.adaptability * adaptability;

    let native_bonus = if species.is_native {
        weights.native_bonus
    } else {
        0.0
    };

    let confidence_score = (base_confidence + native_bonus).clamp(MIN_CONFIDENCE, 1.0);

    let overall_score = (weights.overall_confidence * confidence_score
        + weights.overall_success_rate * success
        + weights.overall_adaptability * adaptability)
        .clamp(0.0, 1.0);

    ScoredSpecies {
        species: species.clone(),
        ph_compatibility,
        moisture_compatibility,
        temp_compatibility,
        confidence_score,
        overall_score,
        native_bonus,
    }
}

/// Score every species in the dataset for one reading.
///
/// The output follows dataset order; ordering by fitness is the ranker's job.
pub fn score(
    reading: &SensorReading,
    dataset: &[SpeciesRecord],
    factors: &SeasonalFactors,
    weights: &ScoringWeights,
) -> Result<Vec<ScoredSpecies>, ScoringError> {
    if dataset.is_empty() {
        warn!("Scoring requested with an empty species dataset");
        return Err(ScoringError::DatasetUnavailable);
    }

    let scored: Vec<ScoredSpecies> = dataset
        .iter()
        .map(|species| score_species(reading, species, factors, weights))
        .collect();

    debug!(species = scored.len(), "Scored species dataset");

    Ok(scored)
}
