//! Loading a [`LocationTree`] from an exported snapshot, either the store's JSON export or a flat
//! CSV file with one reading per row.

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::domain::{location_key, LocationNode, LocationTree, RawDocument, ReadingId};
use super::mapper::{
    insert_number, FIELD_DISSOLVED_OXYGEN, FIELD_ID, FIELD_LOCATION, FIELD_PH, FIELD_TEMPERATURE,
    FIELD_TIMESTAMP, FIELD_TURBIDITY,
};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid snapshot CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected snapshot shape at `{path}`: {detail}")]
    Shape { path: String, detail: &'static str },
}

pub struct SnapshotImporter;

impl SnapshotImporter {
    /// Picks the format from the file extension: `.csv` is read as CSV, anything else as JSON.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<LocationTree, ImportError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let is_csv = path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case("csv"));

        if is_csv {
            Self::from_csv_reader(file)
        } else {
            Self::from_json_reader(file)
        }
    }

    pub fn from_json_reader<R: Read>(reader: R) -> Result<LocationTree, ImportError> {
        let value: Value = serde_json::from_reader(reader)?;
        Self::from_json_value(value)
    }

    /// Expects `{ "<location key>": { "<push key>": { ...fields } } }`, optionally wrapped in a
    /// top-level `locations` object.
    pub fn from_json_value(value: Value) -> Result<LocationTree, ImportError> {
        let root = match value {
            Value::Object(root) if is_wrapped(&root) => match root.into_iter().next() {
                Some((_, Value::Object(inner))) => inner,
                _ => Map::new(),
            },
            Value::Object(root) => root,
            Value::Null => return Ok(LocationTree::default()),
            _ => {
                return Err(ImportError::Shape {
                    path: "/".to_string(),
                    detail: "root must be an object of location nodes",
                })
            }
        };

        let mut tree = LocationTree::default();
        for (location, node) in root {
            let Value::Object(children) = node else {
                return Err(ImportError::Shape {
                    path: format!("/{location}"),
                    detail: "location node must be an object of readings",
                });
            };

            let mut readings = Vec::with_capacity(children.len());
            for (key, document) in children {
                let Value::Object(document) = document else {
                    return Err(ImportError::Shape {
                        path: format!("/{location}/{key}"),
                        detail: "reading must be an object of fields",
                    });
                };
                readings.push((ReadingId(key), document));
            }

            tree.locations.push(LocationNode {
                key: location,
                readings,
            });
        }

        Ok(tree)
    }

    /// Columns: `location,temperature,ph,turbidity,dissolved_oxygen,timestamp[,id]`. Rows are
    /// grouped under the node derived from their location name, keeping file order.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<LocationTree, ImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut tree = LocationTree::default();

        for (index, record) in csv_reader.deserialize::<CsvRow>().enumerate() {
            let row = record?;
            let node_key = location_key(&row.location);
            let key = ReadingId(format!("-C{index:016}"));
            tree.node_mut(&node_key)
                .readings
                .push((key, row.into_document()));
        }

        Ok(tree)
    }
}

fn is_wrapped(root: &Map<String, Value>) -> bool {
    root.len() == 1 && matches!(root.get("locations"), Some(Value::Object(_)))
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    location: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    temperature: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    ph: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    turbidity: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    dissolved_oxygen: Option<f64>,
    timestamp: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    id: Option<i64>,
}

impl CsvRow {
    fn into_document(self) -> RawDocument {
        let mut document = RawDocument::new();
        document.insert(FIELD_LOCATION.to_string(), Value::String(self.location));
        insert_number(&mut document, FIELD_TEMPERATURE, self.temperature);
        insert_number(&mut document, FIELD_PH, self.ph);
        insert_number(&mut document, FIELD_TURBIDITY, self.turbidity);
        insert_number(&mut document, FIELD_DISSOLVED_OXYGEN, self.dissolved_oxygen);
        document.insert(FIELD_TIMESTAMP.to_string(), Value::String(self.timestamp));
        if let Some(id) = self.id {
            document.insert(FIELD_ID.to_string(), Value::Number(id.into()));
        }
        document
    }
}

fn empty_string_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
