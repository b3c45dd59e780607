//! JSON cache files: an array of compact item objects

use serde_json::Value;

use super::{ItemRecord, Parsed};
use crate::item::Item;

/// Serialize items into a JSON array
pub fn build(items: &[Item]) -> Result<String, serde_json::Error> {
    let records: Vec<ItemRecord> = items.iter().map(ItemRecord::from).collect();
    serde_json::to_string_pretty(&records)
}

/// Parse a JSON array of items.
///
/// Elements that are not valid items are skipped. Content that is not a JSON array is an error.
pub fn parse(content: &str) -> Result<Parsed, String> {
    let elements: Vec<Value> = serde_json::from_str(content)
        .map_err(|err| format!("not a JSON array of items: {}", err))?;

    let mut parsed = Parsed::default();
    for element in elements {
        let record = serde_json::from_value::<ItemRecord>(element)
            .map_err(|err| err.to_string());
        parsed.push_record(record);
    }
    Ok(parsed)
}
