use serde::Deserialize;

use super::domain::Reading;

/// Optional bounds applied to a reading collection. Absent fields constrain nothing; present
/// fields are AND-combined, and a missing measurement never satisfies a bound on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    pub min_ph: Option<f64>,
    pub max_ph: Option<f64>,
    pub max_turbidity: Option<f64>,
    pub min_dissolved_oxygen: Option<f64>,
    pub safe_for_swimming: Option<bool>,
    pub safe_for_fishing: Option<bool>,
    #[serde(alias = "minWaterQualityScore")]
    pub min_quality_score: Option<f64>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Bounds on the four measured parameters only.
    pub fn physical_only(&self) -> Self {
        Self {
            min_temp: self.min_temp,
            max_temp: self.max_temp,
            min_ph: self.min_ph,
            max_ph: self.max_ph,
            max_turbidity: self.max_turbidity,
            min_dissolved_oxygen: self.min_dissolved_oxygen,
            ..Self::default()
        }
    }

    /// Bounds on the derived safety flags and quality score only.
    pub fn derived_only(&self) -> Self {
        Self {
            safe_for_swimming: self.safe_for_swimming,
            safe_for_fishing: self.safe_for_fishing,
            min_quality_score: self.min_quality_score,
            ..Self::default()
        }
    }

    pub fn matches(&self, reading: &Reading) -> bool {
        at_least(reading.temperature(), self.min_temp)
            && at_most(reading.temperature(), self.max_temp)
            && at_least(reading.ph(), self.min_ph)
            && at_most(reading.ph(), self.max_ph)
            && at_most(reading.turbidity(), self.max_turbidity)
            && at_least(reading.dissolved_oxygen(), self.min_dissolved_oxygen)
            && flag_matches(reading.safe_for_swimming(), self.safe_for_swimming)
            && flag_matches(reading.safe_for_fishing(), self.safe_for_fishing)
            && at_least(Some(reading.quality_score()), self.min_quality_score)
    }
}

/// Keeps the readings matching every present bound, in input order.
pub fn filter_readings(readings: Vec<Reading>, criteria: &FilterCriteria) -> Vec<Reading> {
    if criteria.is_empty() {
        return readings;
    }
    readings
        .into_iter()
        .filter(|reading| criteria.matches(reading))
        .collect()
}

fn at_least(value: Option<f64>, bound: Option<f64>) -> bool {
    match bound {
        None => true,
        Some(bound) => value.is_some_and(|value| value >= bound),
    }
}

fn at_most(value: Option<f64>, bound: Option<f64>) -> bool {
    match bound {
        None => true,
        Some(bound) => value.is_some_and(|value| value <= bound),
    }
}

fn flag_matches(value: bool, expected: Option<bool>) -> bool {
    expected.map_or(true, |expected| value == expected)
}
