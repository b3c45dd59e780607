//! The JSON documents exchanged with the to-do service

use serde::{Deserialize, Serialize};

use crate::format::ItemRecord;
use crate::item::Item;
use crate::timestamp::Timestamp;

/// An item, as sent and received over the wire
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    pub text: String,
    pub importance: String,
    /// Seconds since the epoch
    pub deadline: Option<i64>,
    pub done: bool,
    pub color: Option<String>,
    #[serde(rename = "created_at")]
    pub creation_date: i64,
    #[serde(rename = "changed_at")]
    pub modification_date: i64,
    pub last_updated_by: String,
}

impl Element {
    pub fn from_item(item: &Item, device_id: &str) -> Self {
        let creation_date = item.creation_date().as_epoch_seconds();
        Self {
            id: item.id().to_string(),
            text: item.text().to_string(),
            importance: item.importance().as_str().to_string(),
            deadline: item.deadline().map(|d| d.as_epoch_seconds()),
            done: item.is_done(),
            color: item.text_color().map(|c| c.to_string()),
            creation_date,
            // The service requires this field, let's use the creation date for items that have never been modified
            modification_date: item.modification_date()
                .map(|d| d.as_epoch_seconds())
                .unwrap_or(creation_date),
            last_updated_by: device_id.to_string(),
        }
    }

    /// Validate this element, and build the matching item
    pub fn into_item(self) -> Result<Item, String> {
        ItemRecord {
            id: self.id,
            text: self.text,
            importance: Some(self.importance),
            deadline: self.deadline.map(Timestamp::from_epoch_seconds),
            is_done: self.done,
            creation_date: Timestamp::from_epoch_seconds(self.creation_date),
            modification_date: Some(Timestamp::from_epoch_seconds(self.modification_date)),
            text_color: self.color,
        }.into_item()
    }
}


/// A reply (or a request) that contains a whole list
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListResponse {
    pub status: String,
    pub list: Vec<Element>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<i64>,
}

/// A reply (or a request) that contains a single item
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElementResponse {
    pub status: String,
    pub element: Element,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<i64>,
}

pub const STATUS_OK: &str = "ok";

impl ListResponse {
    pub fn request(items: &[Item], device_id: &str) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            list: items.iter().map(|item| Element::from_item(item, device_id)).collect(),
            revision: None,
        }
    }
}

impl ElementResponse {
    pub fn request(item: &Item, device_id: &str) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            element: Element::from_item(item, device_id),
            revision: None,
        }
    }
}
