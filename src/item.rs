//! To-do items

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::timestamp::Timestamp;


/// The unique identifier of an [`Item`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ItemId {
    content: Uuid,
}
impl ItemId {
    /// Generate a random ItemId.
    pub fn random() -> Self {
        Self { content: Uuid::new_v4() }
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.content
    }
}
impl From<Uuid> for ItemId {
    fn from(uuid: Uuid) -> Self {
        Self { content: uuid }
    }
}
impl FromStr for ItemId {
    type Err = uuid::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let u = Uuid::parse_str(s)?;
        Ok(Self::from(u))
    }
}
impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.content.to_hyphenated())
    }
}

/// Used to support serde
impl Serialize for ItemId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
/// Used to support serde
impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> Result<ItemId, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}



/// How important an item is
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Unimportant,
    Regular,
    Important,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::Unimportant => "unimportant",
            Importance::Regular => "regular",
            Importance::Important => "important",
        }
    }
}

impl Default for Importance {
    fn default() -> Self {
        Importance::Regular
    }
}

impl FromStr for Importance {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unimportant" => Ok(Importance::Unimportant),
            "regular" => Ok(Importance::Regular),
            "important" => Ok(Importance::Important),
            other => Err(format!("unknown importance {:?}", other)),
        }
    }
}

impl Display for Importance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}


/// Parse a CSS color, and return its normalized hex form (`#rrggbb`, or `#rrggbbaa` for translucent colors)
pub fn normalize_color(color: &str) -> Result<String, csscolorparser::ParseColorError> {
    csscolorparser::parse(color).map(|c| c.to_hex_string())
}


/// A to-do item
#[derive(Clone, Debug, PartialEq)]
pub struct Item {
    /// The item unique ID. It never changes
    id: ItemId,
    /// The user-visible description of the task
    text: String,
    importance: Importance,
    /// An optional due date
    deadline: Option<Timestamp>,
    is_done: bool,
    /// Set once, when the item is created
    creation_date: Timestamp,
    /// The last time the content of this item has changed, if ever
    modification_date: Option<Timestamp>,
    /// The display color of the text, in its normalized hex form
    text_color: Option<String>,
}

impl Item {
    /// Create a brand new item, that is not done yet.
    /// This will pick a new (random) item ID.
    pub fn new(text: String, importance: Importance, deadline: Option<Timestamp>) -> Self {
        Self::new_with_parameters(ItemId::random(), text, importance, deadline, false, Timestamp::now(), None, None)
    }

    /// Create a new Item instance, e.g. from a cache file or from the server.
    ///
    /// A valid text color is stored in its normalized hex form. Nothing else is checked here, see [`Self::validate`]
    pub fn new_with_parameters(id: ItemId, text: String, importance: Importance,
                               deadline: Option<Timestamp>, is_done: bool,
                               creation_date: Timestamp, modification_date: Option<Timestamp>,
                               text_color: Option<String>,
                            ) -> Self
    {
        Self {
            id,
            text,
            importance,
            deadline,
            is_done,
            creation_date,
            modification_date,
            text_color: text_color.map(|color| normalize_color(&color).unwrap_or(color)),
        }
    }

    /// Check this item can be stored, and read back from a file unchanged.
    ///
    /// Returns the reason why it cannot otherwise
    pub fn validate(&self) -> Result<(), String> {
        if self.text.is_empty() {
            return Err("empty text".to_string());
        }
        if self.creation_date.to_datetime().is_none() {
            return Err("invalid creation date".to_string());
        }
        if let Some(deadline) = self.deadline {
            if deadline.to_datetime().is_none() {
                return Err("invalid deadline".to_string());
            }
        }
        if let Some(modification) = self.modification_date {
            if modification.to_datetime().is_none() || modification < self.creation_date {
                return Err("invalid modification date".to_string());
            }
        }
        if let Some(color) = &self.text_color {
            match normalize_color(color) {
                Ok(normalized) if &normalized == color => (),
                _ => return Err(format!("invalid color {:?}", color)),
            }
        }
        Ok(())
    }

    pub fn id(&self) -> &ItemId                  { &self.id }
    pub fn text(&self) -> &str                   { &self.text }
    pub fn importance(&self) -> Importance       { self.importance }
    pub fn deadline(&self) -> Option<Timestamp>  { self.deadline }
    pub fn is_done(&self) -> bool                { self.is_done }
    pub fn creation_date(&self) -> Timestamp     { self.creation_date }
    pub fn modification_date(&self) -> Option<Timestamp> { self.modification_date }
    pub fn text_color(&self) -> Option<&str>     { self.text_color.as_deref() }

    fn update_modification_date(&mut self) {
        let now = Timestamp::now();
        // A clock that went backwards must not break `creation_date <= modification_date`
        self.modification_date = if now < self.creation_date {
            Some(self.creation_date)
        } else {
            Some(now)
        };
    }

    pub fn set_text(&mut self, new_text: String) {
        self.update_modification_date();
        self.text = new_text;
    }

    pub fn set_importance(&mut self, new_importance: Importance) {
        self.update_modification_date();
        self.importance = new_importance;
    }

    pub fn set_deadline(&mut self, new_deadline: Option<Timestamp>) {
        self.update_modification_date();
        self.deadline = new_deadline;
    }

    pub fn set_done(&mut self, done: bool) {
        self.update_modification_date();
        self.is_done = done;
    }

    pub fn toggle_done(&mut self) {
        self.set_done(!self.is_done);
    }

    /// Set (or remove) the text color.
    ///
    /// The color can be given in any CSS syntax; it is stored in its normalized hex form.
    pub fn set_text_color(&mut self, color: Option<&str>) -> Result<(), csscolorparser::ParseColorError> {
        let normalized = color.map(normalize_color).transpose()?;
        self.update_modification_date();
        self.text_color = normalized;
        Ok(())
    }
}
