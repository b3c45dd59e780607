//! This module handles conversion between cache files and internal representations
//!
//! Two file formats are supported: [`json`] and [`csv`].
//! Both formats read and write the same [`ItemRecord`], and both follow the same policy regarding malformed records:
//! a record that cannot be turned into a valid [`Item`] is skipped (and counted), while a file whose overall structure
//! cannot be understood is rejected as a whole.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::item::{Importance, Item, ItemId};
use crate::timestamp::Timestamp;

pub mod csv;
pub mod json;


/// The format of a cache file
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Csv,
}

impl FileFormat {
    /// Guess the format from the file extension. Anything that is not `.csv` is JSON.
    pub fn for_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => FileFormat::Csv,
            _ => FileFormat::Json,
        }
    }

    /// Serialize items in this format
    pub fn build(&self, items: &[Item]) -> Result<String, serde_json::Error> {
        match self {
            FileFormat::Json => json::build(items),
            FileFormat::Csv => Ok(csv::build(items)),
        }
    }

    /// Parse the content of a file of this format
    pub fn parse(&self, content: &str) -> Result<Parsed, String> {
        match self {
            FileFormat::Json => json::parse(content),
            FileFormat::Csv => csv::parse(content),
        }
    }
}


/// The result of parsing a whole file
#[derive(Debug, Default)]
pub struct Parsed {
    pub items: Vec<Item>,
    /// How many malformed records have been skipped
    pub skipped: usize,
}

impl Parsed {
    fn push_record(&mut self, record: Result<ItemRecord, String>) {
        match record.and_then(ItemRecord::into_item) {
            Ok(item) => self.items.push(item),
            Err(err) => {
                log::debug!("Skipping a malformed record: {}", err);
                self.skipped += 1;
            },
        }
    }
}


/// An item, as written in a cache file.
///
/// Optional fields are omitted from JSON when they are absent, and so is a `regular` importance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Timestamp>,
    pub is_done: bool,
    pub creation_date: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modification_date: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
}

impl From<&Item> for ItemRecord {
    fn from(item: &Item) -> Self {
        let importance = match item.importance() {
            Importance::Regular => None,
            other => Some(other.as_str().to_string()),
        };
        Self {
            id: item.id().to_string(),
            text: item.text().to_string(),
            importance,
            deadline: item.deadline(),
            is_done: item.is_done(),
            creation_date: item.creation_date(),
            modification_date: item.modification_date(),
            text_color: item.text_color().map(|c| c.to_string()),
        }
    }
}

impl ItemRecord {
    /// Validate every field of this record, and build the matching item
    pub fn into_item(self) -> Result<Item, String> {
        let id: ItemId = self.id.parse()
            .map_err(|err| format!("invalid id {:?}: {}", self.id, err))?;

        let importance = match self.importance.as_deref() {
            None | Some("") => Importance::Regular,
            Some(name) => name.parse::<Importance>()
                .map_err(|err| format!("item {}: {}", id, err))?,
        };

        let item = Item::new_with_parameters(id, self.text, importance, self.deadline, self.is_done,
            self.creation_date, self.modification_date, self.text_color);
        item.validate()
            .map_err(|reason| format!("item {}: {}", id, reason))?;
        Ok(item)
    }
}
