use std::cmp::Ordering;

use tracing::debug;

use crate::domain::ScoredSpecies;

/// Absorbs floating point noise when comparing a difference to a tolerance
const TOLERANCE_EPSILON: f64 = 1e-9;

pub const OVERALL_SCORE_TOLERANCE: f64 = 0.05;
pub const CONFIDENCE_TOLERANCE: f64 = 0.03;

/// One level of the ranking policy.
///
/// Each step orders candidates by a single key, descending. Two candidates
/// whose keys differ by no more than the step's tolerance are tied at this
/// level and are left for the next step to order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RankStep {
    OverallScore { tolerance: f64 },
    NativeFirst,
    Confidence { tolerance: f64 },
    SuccessRate,
}

impl RankStep {
    fn key(&self, species: &ScoredSpecies) -> f64 {
        match self {
            RankStep::OverallScore { .. } => species.overall_score,
            RankStep::NativeFirst => {
                if species.species.is_native {
                    1.0
                } else {
                    0.0
                }
            }
            RankStep::Confidence { .. } => species.confidence_score,
            RankStep::SuccessRate => species.species.success_rate,
        }
    }

    fn tolerance(&self) -> f64 {
        match self {
            RankStep::OverallScore { tolerance } | RankStep::Confidence { tolerance } => {
                *tolerance
            }
            RankStep::NativeFirst | RankStep::SuccessRate => 0.0,
        }
    }

    /// Order two candidates by this step alone. `Less` means `a` ranks first.
    pub fn compare(&self, a: &ScoredSpecies, b: &ScoredSpecies) -> Ordering {
        let (key_a, key_b) = (self.key(a), self.key(b));
        if (key_a - key_b).abs() <= self.tolerance() + TOLERANCE_EPSILON {
            Ordering::Equal
        } else {
            key_b.total_cmp(&key_a)
        }
    }

    /// Split candidates into tie bands, best band first.
    ///
    /// Candidates are sorted by key (stable, descending) and a new band starts
    /// whenever a key falls more than the tolerance below the first key of the
    /// current band. Anchoring on the band's first key keeps the grouping
    /// independent of input order even though tolerance ties are not
    /// transitive.
    fn bands(&self, mut candidates: Vec<ScoredSpecies>) -> Vec<Vec<ScoredSpecies>> {
        candidates.sort_by(|a, b| self.key(b).total_cmp(&self.key(a)));

        let limit = self.tolerance() + TOLERANCE_EPSILON;
        let mut bands: Vec<Vec<ScoredSpecies>> = Vec::new();
        let mut anchor = f64::NAN;

        for candidate in candidates {
            let key = self.key(&candidate);
            match bands.last_mut() {
                Some(band) if anchor - key <= limit => band.push(candidate),
                _ => {
                    anchor = key;
                    bands.push(vec![candidate]);
                }
            }
        }

        bands
    }
}

/// Ordered chain of ranking steps
#[derive(Debug, Clone, PartialEq)]
pub struct RankingPolicy {
    steps: Vec<RankStep>,
}

impl RankingPolicy {
    pub fn new(steps: Vec<RankStep>) -> Self {
        Self { steps }
    }

    /// Pairwise cascade: the first step that is not a tie decides
    pub fn compare(&self, a: &ScoredSpecies, b: &ScoredSpecies) -> Ordering {
        self.steps
            .iter()
            .map(|step| step.compare(a, b))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }

    /// Order scored species best first.
    ///
    /// Candidates that tie on every step keep their input order.
    pub fn rank(&self, scored: Vec<ScoredSpecies>) -> Vec<ScoredSpecies> {
        let count = scored.len();
        let ranked = rank_with(&self.steps, scored);
        debug!(candidates = count, "Ranked scored species");
        ranked
    }
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self::new(vec![
            RankStep::OverallScore {
                tolerance: OVERALL_SCORE_TOLERANCE,
            },
            RankStep::NativeFirst,
            RankStep::Confidence {
                tolerance: CONFIDENCE_TOLERANCE,
            },
            RankStep::SuccessRate,
        ])
    }
}

fn rank_with(steps: &[RankStep], candidates: Vec<ScoredSpecies>) -> Vec<ScoredSpecies> {
    match steps.split_first() {
        Some((step, rest)) if candidates.len() > 1 => step
            .bands(candidates)
            .into_iter()
            .flat_map(|band| rank_with(rest, band))
            .collect(),
        _ => candidates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SpeciesRecord;

    fn candidate(
        name: &str,
        overall_score: f64,
        confidence_score: f64,
        success_rate: f64,
        is_native: bool,
    ) -> ScoredSpecies {
        ScoredSpecies {
            species: SpeciesRecord {
                scientific_name: name.to_string(),
                common_name: name.to_string(),
                ph_min: 5.5,
                ph_max: 7.5,
                moisture_min: 30.0,
                moisture_max: 70.0,
                temp_min: 18.0,
                temp_max: 32.0,
                success_rate,
                adaptability_score: 70.0,
                is_native,
                category: "test".to_string(),
            },
            ph_compatibility: 1.0,
            moisture_compatibility: 1.0,
            temp_compatibility: 1.0,
            confidence_score,
            overall_score,
            native_bonus: if is_native { 0.1 } else { 0.0 },
        }
    }

    fn names(ranked: &[ScoredSpecies]) -> Vec<&str> {
        ranked
            .iter()
            .map(|s| s.species.scientific_name.as_str())
            .collect()
    }

    #[test]
    fn test_overall_step_tolerance() {
        let step = RankStep::OverallScore { tolerance: 0.05 };
        let a = candidate("a", 0.70, 0.8, 70.0, false);
        let b = candidate("b", 0.65, 0.8, 70.0, false);
        let c = candidate("c", 0.64, 0.8, 70.0, false);

        assert_eq!(step.compare(&a, &b), Ordering::Equal);
        assert_eq!(step.compare(&a, &c), Ordering::Less);
        assert_eq!(step.compare(&c, &a), Ordering::Greater);
    }

    #[test]
    fn test_native_step() {
        let native = candidate("native", 0.5, 0.5, 50.0, true);
        let exotic = candidate("exotic", 0.9, 0.9, 90.0, false);

        assert_eq!(RankStep::NativeFirst.compare(&native, &exotic), Ordering::Less);
        assert_eq!(RankStep::NativeFirst.compare(&native, &native), Ordering::Equal);
    }

    #[test]
    fn test_confidence_step_tolerance() {
        let step = RankStep::Confidence { tolerance: 0.03 };
        let a = candidate("a", 0.7, 0.80, 70.0, false);
        let b = candidate("b", 0.7, 0.78, 70.0, false);
        let c = candidate("c", 0.7, 0.76, 70.0, false);

        assert_eq!(step.compare(&a, &b), Ordering::Equal);
        assert_eq!(step.compare(&a, &c), Ordering::Less);
    }

    #[test]
    fn test_success_rate_step() {
        let a = candidate("a", 0.7, 0.8, 71.0, false);
        let b = candidate("b", 0.7, 0.8, 70.0, false);

        assert_eq!(RankStep::SuccessRate.compare(&a, &b), Ordering::Less);
        assert_eq!(RankStep::SuccessRate.compare(&b, &a), Ordering::Greater);
    }

    #[test]
    fn test_clear_score_gap_wins_over_nativity() {
        let policy = RankingPolicy::default();
        let exotic = candidate("exotic", 0.80, 0.80, 60.0, false);
        let native = candidate("native", 0.70, 0.90, 90.0, true);

        let ranked = policy.rank(vec![native, exotic]);
        assert_eq!(names(&ranked), vec!["exotic", "native"]);
    }

    #[test]
    fn test_native_breaks_score_tie() {
        let policy = RankingPolicy::default();
        let exotic = candidate("exotic", 0.72, 0.85, 90.0, false);
        let native = candidate("native", 0.70, 0.80, 60.0, true);

        let ranked = policy.rank(vec![exotic.clone(), native.clone()]);
        assert_eq!(names(&ranked), vec!["native", "exotic"]);
        assert_eq!(policy.compare(&native, &exotic), Ordering::Less);
    }

    #[test]
    fn test_confidence_then_success_rate() {
        let policy = RankingPolicy::default();
        let low_conf = candidate("low_conf", 0.71, 0.70, 95.0, false);
        let high_conf = candidate("high_conf", 0.70, 0.80, 50.0, false);
        let close_conf_better_success = candidate("close", 0.70, 0.79, 80.0, false);

        let ranked = policy.rank(vec![low_conf, close_conf_better_success, high_conf]);
        assert_eq!(names(&ranked), vec!["close", "high_conf", "low_conf"]);
    }

    #[test]
    fn test_identical_keys_keep_input_order() {
        let policy = RankingPolicy::default();
        let first = candidate("first", 0.7, 0.8, 70.0, true);
        let second = candidate("second", 0.7, 0.8, 70.0, true);
        let third = candidate("third", 0.7, 0.8, 70.0, true);

        let ranked = policy.rank(vec![first, second, third]);
        assert_eq!(names(&ranked), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_band_anchoring_is_order_independent() {
        let policy = RankingPolicy::default();
        // 0.70 and 0.66 tie, 0.66 and 0.62 tie, 0.70 and 0.62 do not.
        let a = candidate("a", 0.70, 0.70, 50.0, false);
        let b = candidate("b", 0.66, 0.70, 60.0, true);
        let c = candidate("c", 0.62, 0.70, 70.0, true);

        let forward = policy.rank(vec![a.clone(), b.clone(), c.clone()]);
        let backward = policy.rank(vec![c, b, a]);

        assert_eq!(names(&forward), names(&backward));
        assert_eq!(names(&forward), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_rank_empty_and_single() {
        let policy = RankingPolicy::default();
        assert!(policy.rank(Vec::new()).is_empty());

        let ranked = policy.rank(vec![candidate("only", 0.5, 0.5, 50.0, false)]);
        assert_eq!(names(&ranked), vec!["only"]);
    }
}
