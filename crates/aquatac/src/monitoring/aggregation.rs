//! Flattening of the location → reading tree into ordered reading collections.
//!
//! Timestamps share one fixed `yyyy-MM-dd HH:mm:ss` format, so plain string comparison orders
//! them chronologically. All sorts are stable.

use std::cmp::Ordering;

use super::domain::{LocationTree, Reading};
use super::mapper::{map_document, MalformedDocument};

/// Every reading of every location, in store order: location nodes as stored, then each node's
/// readings oldest-first. No re-sort happens here.
pub fn flatten_all(tree: &LocationTree) -> Result<Vec<Reading>, MalformedDocument> {
    let mut readings = Vec::with_capacity(tree.reading_count());
    for node in &tree.locations {
        for (key, document) in &node.readings {
            readings.push(map_document(document, key)?);
        }
    }
    Ok(readings)
}

/// Readings whose `location` field equals `name` ignoring case, newest first. The node a reading
/// is stored under plays no part in the match. Every document is mapped, so a malformed one fails
/// the lookup even when it belongs to another location.
pub fn flatten_by_location(
    tree: &LocationTree,
    name: &str,
) -> Result<Vec<Reading>, MalformedDocument> {
    let wanted = name.to_lowercase();
    let mut readings = Vec::new();
    for node in &tree.locations {
        for (key, document) in &node.readings {
            let reading = map_document(document, key)?;
            if reading.location().to_lowercase() == wanted {
                readings.push(reading);
            }
        }
    }
    Ok(sort_by_timestamp_descending(readings))
}

/// Highest quality scores first, truncated to `n`. Equal scores keep their input order.
pub fn top_n(mut readings: Vec<Reading>, n: usize) -> Vec<Reading> {
    readings.sort_by(by_score_descending);
    readings.truncate(n);
    readings
}

pub fn sort_by_timestamp_descending(mut readings: Vec<Reading>) -> Vec<Reading> {
    readings.sort_by(|a, b| b.timestamp().cmp(a.timestamp()));
    readings
}

fn by_score_descending(a: &Reading, b: &Reading) -> Ordering {
    b.quality_score().total_cmp(&a.quality_score())
}
