use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::safety;
use super::scoring::{self, QualityLevel};

/// Format every stored timestamp follows. Lexicographic order on this format is chronological.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One stored reading document as the store hands it back: field name to scalar value.
pub type RawDocument = Map<String, Value>;

/// Store-assigned push key identifying a reading.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReadingId(pub String);

impl ReadingId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ReadingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Materialized two-level snapshot: location nodes in store order, each holding its readings in
/// store order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationTree {
    pub locations: Vec<LocationNode>,
}

impl LocationTree {
    pub fn is_empty(&self) -> bool {
        self.locations.iter().all(|node| node.readings.is_empty())
    }

    pub fn reading_count(&self) -> usize {
        self.locations.iter().map(|node| node.readings.len()).sum()
    }

    /// Looks a reading up by push key across every location node.
    pub fn find(&self, reading_id: &ReadingId) -> Option<&RawDocument> {
        self.locations.iter().find_map(|node| {
            node.readings
                .iter()
                .find(|(key, _)| key == reading_id)
                .map(|(_, document)| document)
        })
    }

    /// Returns the node stored under `key`, creating it at the end when absent.
    pub fn node_mut(&mut self, key: &str) -> &mut LocationNode {
        let index = match self.locations.iter().position(|node| node.key == key) {
            Some(index) => index,
            None => {
                self.locations.push(LocationNode {
                    key: key.to_string(),
                    readings: Vec::new(),
                });
                self.locations.len() - 1
            }
        };
        &mut self.locations[index]
    }
}

/// A location node of the tree and the readings pushed beneath it.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationNode {
    pub key: String,
    pub readings: Vec<(ReadingId, RawDocument)>,
}

/// The four physical measurements of a reading. Missing values stay `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterSample {
    pub temperature: Option<f64>,
    pub ph: Option<f64>,
    pub turbidity: Option<f64>,
    pub dissolved_oxygen: Option<f64>,
}

impl WaterSample {
    pub fn new(
        temperature: Option<f64>,
        ph: Option<f64>,
        turbidity: Option<f64>,
        dissolved_oxygen: Option<f64>,
    ) -> Self {
        Self {
            temperature,
            ph,
            turbidity,
            dissolved_oxygen,
        }
    }

    pub fn quality_score(&self) -> f64 {
        scoring::quality_score(
            self.temperature,
            self.ph,
            self.turbidity,
            self.dissolved_oxygen,
        )
    }

    pub fn safety(&self) -> SafetyFlags {
        SafetyFlags {
            safe_for_swimming: safety::is_safe_for_swimming(
                self.temperature,
                self.ph,
                self.turbidity,
                self.dissolved_oxygen,
            ),
            safe_for_fishing: safety::is_safe_for_fishing(
                self.temperature,
                self.ph,
                self.turbidity,
                self.dissolved_oxygen,
            ),
        }
    }
}

/// Sensor observation with its derived safety flags and quality score.
///
/// Fields are private so the derived values can only come from [`Reading::new`] or
/// [`Reading::with_sample`], both of which recompute score and flags together.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    reading_id: ReadingId,
    location: String,
    temperature: Option<f64>,
    ph: Option<f64>,
    turbidity: Option<f64>,
    dissolved_oxygen: Option<f64>,
    timestamp: String,
    legacy_id: Option<i64>,
    safe_for_swimming: bool,
    safe_for_fishing: bool,
    quality_score: f64,
}

impl Reading {
    pub fn new(
        reading_id: ReadingId,
        location: impl Into<String>,
        sample: WaterSample,
        timestamp: impl Into<String>,
        legacy_id: Option<i64>,
    ) -> Self {
        let flags = sample.safety();
        Self {
            reading_id,
            location: location.into(),
            temperature: sample.temperature,
            ph: sample.ph,
            turbidity: sample.turbidity,
            dissolved_oxygen: sample.dissolved_oxygen,
            timestamp: timestamp.into(),
            legacy_id,
            safe_for_swimming: flags.safe_for_swimming,
            safe_for_fishing: flags.safe_for_fishing,
            quality_score: sample.quality_score(),
        }
    }

    /// Returns a copy carrying new measurements, with score and flags re-derived.
    pub fn with_sample(&self, sample: WaterSample) -> Self {
        Self::new(
            self.reading_id.clone(),
            self.location.clone(),
            sample,
            self.timestamp.clone(),
            self.legacy_id,
        )
    }

    pub fn reading_id(&self) -> &ReadingId {
        &self.reading_id
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    pub fn ph(&self) -> Option<f64> {
        self.ph
    }

    pub fn turbidity(&self) -> Option<f64> {
        self.turbidity
    }

    pub fn dissolved_oxygen(&self) -> Option<f64> {
        self.dissolved_oxygen
    }

    pub fn sample(&self) -> WaterSample {
        WaterSample::new(
            self.temperature,
            self.ph,
            self.turbidity,
            self.dissolved_oxygen,
        )
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Parsed form of the timestamp, `None` when it does not follow [`TIMESTAMP_FORMAT`].
    pub fn recorded_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT).ok()
    }

    pub fn legacy_id(&self) -> Option<i64> {
        self.legacy_id
    }

    pub fn safe_for_swimming(&self) -> bool {
        self.safe_for_swimming
    }

    pub fn safe_for_fishing(&self) -> bool {
        self.safe_for_fishing
    }

    pub fn safety(&self) -> SafetyFlags {
        SafetyFlags {
            safe_for_swimming: self.safe_for_swimming,
            safe_for_fishing: self.safe_for_fishing,
        }
    }

    pub fn quality_score(&self) -> f64 {
        self.quality_score
    }

    pub fn quality_level(&self) -> QualityLevel {
        QualityLevel::from_score(self.quality_score)
    }

    pub fn summary(&self) -> SafetySummary {
        SafetySummary {
            reading_id: self.reading_id.clone(),
            location: self.location.clone(),
            safe_for_swimming: self.safe_for_swimming,
            safe_for_fishing: self.safe_for_fishing,
            quality_score: self.quality_score,
            timestamp: self.timestamp.clone(),
        }
    }

    pub fn quality_report(&self) -> QualityReport {
        QualityReport {
            reading_id: self.reading_id.clone(),
            quality_score: self.quality_score,
            quality_level: self.quality_level(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyFlags {
    pub safe_for_swimming: bool,
    pub safe_for_fishing: bool,
}

/// Row of the safety-analysis and top-readings views.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetySummary {
    pub reading_id: ReadingId,
    pub location: String,
    pub safe_for_swimming: bool,
    pub safe_for_fishing: bool,
    pub quality_score: f64,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub reading_id: ReadingId,
    pub quality_score: f64,
    pub quality_level: QualityLevel,
}

/// Write payload for a new reading. Derived fields are never accepted from callers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReading {
    pub location: String,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub ph: Option<f64>,
    #[serde(default)]
    pub turbidity: Option<f64>,
    #[serde(default)]
    pub dissolved_oxygen: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
}

/// Node key a location's readings are pushed under: trimmed, lowercased, whitespace runs as `_`.
pub fn location_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}
