//! Swimming and fishing safety bands. Every check is inclusive, and a missing measurement fails
//! the whole conjunction.

use std::ops::RangeInclusive;

struct SafetyBands {
    temperature: RangeInclusive<f64>,
    ph: RangeInclusive<f64>,
    max_turbidity: f64,
    min_dissolved_oxygen: f64,
}

const SWIMMING: SafetyBands = SafetyBands {
    temperature: 18.0..=30.0,
    ph: 6.5..=8.5,
    max_turbidity: 5.0,
    min_dissolved_oxygen: 5.0,
};

// Fishing tolerates wider ranges than swimming.
const FISHING: SafetyBands = SafetyBands {
    temperature: 15.0..=25.0,
    ph: 6.0..=9.0,
    max_turbidity: 10.0,
    min_dissolved_oxygen: 4.0,
};

impl SafetyBands {
    fn admits(
        &self,
        temperature: Option<f64>,
        ph: Option<f64>,
        turbidity: Option<f64>,
        dissolved_oxygen: Option<f64>,
    ) -> bool {
        let (Some(temperature), Some(ph), Some(turbidity), Some(dissolved_oxygen)) =
            (temperature, ph, turbidity, dissolved_oxygen)
        else {
            return false;
        };

        self.temperature.contains(&temperature)
            && self.ph.contains(&ph)
            && turbidity <= self.max_turbidity
            && dissolved_oxygen >= self.min_dissolved_oxygen
    }
}

pub fn is_safe_for_swimming(
    temperature: Option<f64>,
    ph: Option<f64>,
    turbidity: Option<f64>,
    dissolved_oxygen: Option<f64>,
) -> bool {
    SWIMMING.admits(temperature, ph, turbidity, dissolved_oxygen)
}

pub fn is_safe_for_fishing(
    temperature: Option<f64>,
    ph: Option<f64>,
    turbidity: Option<f64>,
    dissolved_oxygen: Option<f64>,
) -> bool {
    FISHING.admits(temperature, ph, turbidity, dissolved_oxygen)
}
