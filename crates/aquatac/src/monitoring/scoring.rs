//! Composite water-quality score.
//!
//! Each parameter is normalized to 0..=100 by piecewise-linear interpolation against its ideal
//! band, then the four sub-scores are averaged with equal weights. A missing parameter scores 0
//! and still counts as one of the four terms.

use serde::Serialize;

const PARAMETER_WEIGHT: f64 = 0.25;
const FULL_SCORE: f64 = 100.0;

/// Plateau band scored 100 with linear ramps down to 0 at the outer limits.
struct Band {
    floor: f64,
    ideal_low: f64,
    ideal_high: f64,
    ceiling: f64,
}

const TEMPERATURE_BAND: Band = Band {
    floor: 10.0,
    ideal_low: 18.0,
    ideal_high: 22.0,
    ceiling: 30.0,
};

const PH_BAND: Band = Band {
    floor: 4.0,
    ideal_low: 6.5,
    ideal_high: 8.5,
    ceiling: 10.0,
};

const TURBIDITY_IDEAL_MAX: f64 = 5.0;
const TURBIDITY_LIMIT: f64 = 50.0;
const OXYGEN_IDEAL_MIN: f64 = 8.0;
const OXYGEN_LIMIT: f64 = 2.0;

impl Band {
    fn score(&self, value: f64) -> f64 {
        if value >= self.ideal_low && value <= self.ideal_high {
            FULL_SCORE
        } else if value < self.floor || value > self.ceiling {
            0.0
        } else if value < self.ideal_low {
            FULL_SCORE * (value - self.floor) / (self.ideal_low - self.floor)
        } else {
            FULL_SCORE * (self.ceiling - value) / (self.ceiling - self.ideal_high)
        }
    }
}

/// NaN fails every band comparison, so it is scored like a missing value.
fn measured(value: Option<f64>) -> Option<f64> {
    value.filter(|value| !value.is_nan())
}

pub fn temperature_score(temperature: Option<f64>) -> f64 {
    measured(temperature).map_or(0.0, |value| TEMPERATURE_BAND.score(value))
}

pub fn ph_score(ph: Option<f64>) -> f64 {
    measured(ph).map_or(0.0, |value| PH_BAND.score(value))
}

/// Lower is better.
pub fn turbidity_score(turbidity: Option<f64>) -> f64 {
    match measured(turbidity) {
        None => 0.0,
        Some(value) if value <= TURBIDITY_IDEAL_MAX => FULL_SCORE,
        Some(value) if value >= TURBIDITY_LIMIT => 0.0,
        Some(value) => {
            FULL_SCORE * (TURBIDITY_LIMIT - value) / (TURBIDITY_LIMIT - TURBIDITY_IDEAL_MAX)
        }
    }
}

pub fn dissolved_oxygen_score(dissolved_oxygen: Option<f64>) -> f64 {
    match measured(dissolved_oxygen) {
        None => 0.0,
        Some(value) if value >= OXYGEN_IDEAL_MIN => FULL_SCORE,
        Some(value) if value <= OXYGEN_LIMIT => 0.0,
        Some(value) => FULL_SCORE * (value - OXYGEN_LIMIT) / (OXYGEN_IDEAL_MIN - OXYGEN_LIMIT),
    }
}

/// Composite score in `0.0..=100.0`.
pub fn quality_score(
    temperature: Option<f64>,
    ph: Option<f64>,
    turbidity: Option<f64>,
    dissolved_oxygen: Option<f64>,
) -> f64 {
    let composite = temperature_score(temperature) * PARAMETER_WEIGHT
        + ph_score(ph) * PARAMETER_WEIGHT
        + turbidity_score(turbidity) * PARAMETER_WEIGHT
        + dissolved_oxygen_score(dissolved_oxygen) * PARAMETER_WEIGHT;

    composite.clamp(0.0, FULL_SCORE)
}

/// Display bucket for a composite score. Each band includes its lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QualityLevel {
    Excellent,
    Good,
    Fair,
    Poor,
    #[serde(rename = "Very Poor")]
    VeryPoor,
}

impl QualityLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            QualityLevel::Excellent
        } else if score >= 75.0 {
            QualityLevel::Good
        } else if score >= 50.0 {
            QualityLevel::Fair
        } else if score >= 25.0 {
            QualityLevel::Poor
        } else {
            QualityLevel::VeryPoor
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            QualityLevel::Excellent => "Excellent",
            QualityLevel::Good => "Good",
            QualityLevel::Fair => "Fair",
            QualityLevel::Poor => "Poor",
            QualityLevel::VeryPoor => "Very Poor",
        }
    }
}
