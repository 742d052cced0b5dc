//! Test utilities for property-based testing
//!
//! Generators for sensor data, species records, scored candidates and
//! reading histories, used by the proptest suites under `tests/`.

pub mod generators {
    use chrono::{DateTime, Duration, Utc};
    use proptest::prelude::*;

    use crate::domain::{ScoredSpecies, SensorData, SensorReading, SpeciesRecord};
    use crate::trend::HistoricalReading;

    /// Sensor values inside the optimal band of every field
    pub fn optimal_sensor_data() -> impl Strategy<Value = SensorData> {
        (6.0..=8.0f64, 30.0..=70.0f64, 20.0..=35.0f64)
            .prop_map(|(ph, moisture, temp)| SensorData::new(ph, moisture, temp))
    }

    /// Sensor values inside the valid range of every field
    pub fn valid_sensor_data() -> impl Strategy<Value = SensorData> {
        (0.0..=14.0f64, 0.0..=100.0f64, -10.0..=60.0f64)
            .prop_map(|(ph, moisture, temp)| SensorData::new(ph, moisture, temp))
    }

    /// A value that is missing, non-finite or outside the valid range
    fn bad_value(min: f64, max: f64) -> impl Strategy<Value = Option<f64>> {
        prop_oneof![
            Just(None),
            Just(Some(f64::NAN)),
            Just(Some(f64::INFINITY)),
            (1.0..1000.0f64).prop_map(move |d| Some(min - d)),
            (1.0..1000.0f64).prop_map(move |d| Some(max + d)),
        ]
    }

    /// Sensor data where at least the pH value is unusable
    pub fn sensor_data_with_bad_ph() -> impl Strategy<Value = SensorData> {
        (bad_value(0.0, 14.0), 0.0..=100.0f64, -10.0..=60.0f64).prop_map(
            |(ph, moisture, temp)| SensorData {
                ph,
                soil_moisture: Some(moisture),
                temperature: Some(temp),
            },
        )
    }

    /// Sensor data with an unusable value in any one field
    pub fn invalid_sensor_data() -> impl Strategy<Value = SensorData> {
        prop_oneof![
            sensor_data_with_bad_ph(),
            (6.0..=8.0f64, bad_value(0.0, 100.0), 20.0..=35.0f64).prop_map(
                |(ph, soil_moisture, temp)| SensorData {
                    ph: Some(ph),
                    soil_moisture,
                    temperature: Some(temp),
                }
            ),
            (6.0..=8.0f64, 30.0..=70.0f64, bad_value(-10.0, 60.0)).prop_map(
                |(ph, moisture, temperature)| SensorData {
                    ph: Some(ph),
                    soil_moisture: Some(moisture),
                    temperature,
                }
            ),
        ]
    }

    /// Epoch milliseconds between 2020-01-01 and 2030-12-31
    pub fn timestamp_ms() -> impl Strategy<Value = i64> {
        1_577_836_800_000i64..1_924_991_999_000i64
    }

    /// Epoch milliseconds that are negative or outside 2000-2100
    pub fn invalid_timestamp_ms() -> impl Strategy<Value = i64> {
        prop_oneof![
            i64::MIN..0i64,
            0i64..946_684_800_000i64,
            4_102_444_800_001i64..i64::MAX,
        ]
    }

    pub fn timestamp() -> impl Strategy<Value = DateTime<Utc>> {
        timestamp_ms().prop_map(|ms| DateTime::from_timestamp_millis(ms).unwrap_or_default())
    }

    pub fn sensor_id() -> impl Strategy<Value = String> {
        prop::string::string_regex("[A-Za-z0-9_.:-]{1,128}").expect("Valid regex for sensor_id")
    }

    /// Empty, too long, or containing a character outside the allowed set
    pub fn invalid_sensor_id() -> impl Strategy<Value = String> {
        prop_oneof![
            Just(String::new()),
            prop::string::string_regex("[a-z0-9]{129,200}").expect("Valid regex"),
            (
                prop::string::string_regex("[a-z0-9]{0,20}").expect("Valid regex"),
                prop::sample::select(vec![' ', '/', '#', '?', '%', '\n', 'é']),
                prop::string::string_regex("[a-z0-9]{0,20}").expect("Valid regex"),
            )
                .prop_map(|(head, bad, tail)| format!("{}{}{}", head, bad, tail)),
        ]
    }

    /// Any finite reading, including ones far outside valid ranges
    pub fn sensor_reading() -> impl Strategy<Value = SensorReading> {
        (-50.0..50.0f64, -200.0..300.0f64, -100.0..150.0f64, timestamp()).prop_map(
            |(ph, soil_moisture, temperature, timestamp)| SensorReading {
                ph,
                soil_moisture,
                temperature,
                timestamp,
            },
        )
    }

    fn ordered_pair(low: f64, high: f64) -> impl Strategy<Value = (f64, f64)> {
        (low..=high, low..=high).prop_map(|(a, b)| if a <= b { (a, b) } else { (b, a) })
    }

    /// A species record satisfying the dataset invariants
    pub fn species_record() -> impl Strategy<Value = SpeciesRecord> {
        (
            "[A-Z][a-z]{3,10} [a-z]{4,12}",
            ordered_pair(3.0, 10.0),
            ordered_pair(0.0, 100.0),
            ordered_pair(5.0, 45.0),
            0.0..=100.0f64,
            0.0..=100.0f64,
            any::<bool>(),
            prop::sample::select(vec!["hardwood", "fruit", "bamboo", "mangrove"]),
        )
            .prop_map(
                |(name, ph, moisture, temp, success_rate, adaptability_score, is_native, category)| {
                    SpeciesRecord {
                        common_name: name.clone(),
                        scientific_name: name,
                        ph_min: ph.0,
                        ph_max: ph.1,
                        moisture_min: moisture.0,
                        moisture_max: moisture.1,
                        temp_min: temp.0,
                        temp_max: temp.1,
                        success_rate,
                        adaptability_score,
                        is_native,
                        category: category.to_string(),
                    }
                },
            )
    }

    pub fn species_dataset(
        size: std::ops::Range<usize>,
    ) -> impl Strategy<Value = Vec<SpeciesRecord>> {
        prop::collection::vec(species_record(), size)
    }

    /// A ranking candidate with arbitrary scores; names are made unique
    /// by the caller through `candidates`
    fn scored_species() -> impl Strategy<Value = ScoredSpecies> {
        (species_record(), 0.0..=1.0f64, 0.05..=1.0f64).prop_map(
            |(species, overall_score, confidence_score)| ScoredSpecies {
                native_bonus: if species.is_native { 0.1 } else { 0.0 },
                species,
                ph_compatibility: 1.0,
                moisture_compatibility: 1.0,
                temp_compatibility: 1.0,
                confidence_score,
                overall_score,
            },
        )
    }

    /// Ranking candidates with unique scientific names
    pub fn candidates(size: std::ops::Range<usize>) -> impl Strategy<Value = Vec<ScoredSpecies>> {
        prop::collection::vec(scored_species(), size).prop_map(|mut list| {
            for (i, candidate) in list.iter_mut().enumerate() {
                candidate.species.scientific_name = format!("species-{}", i);
            }
            list
        })
    }

    /// A daily reading history starting at `start`
    pub fn history(
        start: DateTime<Utc>,
        size: std::ops::Range<usize>,
    ) -> impl Strategy<Value = Vec<HistoricalReading>> {
        prop::collection::vec((4.0..9.0f64, 10.0..90.0f64, 15.0..40.0f64), size).prop_map(
            move |values| {
                values
                    .into_iter()
                    .enumerate()
                    .map(|(day, (ph, moisture, temp))| {
                        HistoricalReading::new(
                            start + Duration::days(day as i64),
                            ph,
                            moisture,
                            temp,
                        )
                    })
                    .collect()
            },
        )
    }
}

pub mod helpers {
    use crate::domain::ScoredSpecies;

    /// Scientific names in ranked order
    pub fn names(ranked: &[ScoredSpecies]) -> Vec<String> {
        ranked
            .iter()
            .map(|s| s.species.scientific_name.clone())
            .collect()
    }
}
