//! This module provides a local cache for to-do items
//!
//! The whole collection is kept in memory, and is written to a single file (JSON or CSV, see [`crate::format`]) on request.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::CacheError;
use crate::format::FileFormat;
use crate::item::{Item, ItemId};
use crate::utils::keys_are_the_same;

/// The name of the backing file when none is given
pub const DEFAULT_CACHE_FILE: &str = "items.json";

/// What a successful load has found in a file
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// How many items are now in the cache
    pub loaded: usize,
    /// How many malformed records have been ignored
    pub skipped: usize,
}


/// A store of items, that is backed by a local file
#[derive(Debug)]
pub struct Cache {
    folder: PathBuf,
    backing_file: String,
    items: HashMap<ItemId, Item>,
    /// Whether the in-memory content has changed since the last save or load
    modified: bool,
    /// Incremented on every change of the in-memory content
    generation: u64,
}

impl PartialEq for Cache {
    fn eq(&self, other: &Self) -> bool {
        self.folder == other.folder
            && self.backing_file == other.backing_file
            && self.items == other.items
    }
}

impl Cache {
    /// The default folder for cache files, in the user's private data directory
    pub fn default_folder() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("todo-sync"))
    }

    /// Initialize an empty cache. Nothing is read from or written to the disk yet.
    pub fn new(folder: &Path, backing_file: &str) -> Self {
        Self {
            folder: PathBuf::from(folder),
            backing_file: sanitize_filename::sanitize(backing_file),
            items: HashMap::new(),
            modified: false,
            generation: 0,
        }
    }

    /// Initialize a cache from the content of a valid backing file if it exists.
    /// Returns an error otherwise
    pub fn from_file(folder: &Path, backing_file: &str) -> Result<(Self, LoadReport), CacheError> {
        let mut cache = Self::new(folder, backing_file);
        let report = cache.load()?;
        Ok((cache, report))
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// The full path of the backing file
    pub fn backing_file(&self) -> PathBuf {
        self.folder.join(&self.backing_file)
    }

    fn path_of(&self, file_name: &str) -> PathBuf {
        self.folder.join(sanitize_filename::sanitize(file_name))
    }


    /// Insert an item, or replace the item that has the same ID.
    /// Returns the item that has been replaced, if any
    pub fn add_item(&mut self, item: Item) -> Option<Item> {
        self.mark_modified();
        self.items.insert(*item.id(), item)
    }

    /// Remove an item. This is a no-op if this ID is not in the cache
    pub fn delete_item(&mut self, id: &ItemId) -> Option<Item> {
        let removed = self.items.remove(id);
        if removed.is_some() {
            self.mark_modified();
        }
        removed
    }

    /// Replace the whole content of the cache
    pub fn replace_all(&mut self, items: Vec<Item>) {
        self.items = items.into_iter()
            .map(|item| (*item.id(), item))
            .collect();
        self.mark_modified();
    }

    pub fn get_item(&self, id: &ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    pub fn get_item_mut(&mut self, id: &ItemId) -> Option<&mut Item> {
        if self.items.contains_key(id) {
            self.mark_modified();
        }
        self.items.get_mut(id)
    }

    pub fn items(&self) -> &HashMap<ItemId, Item> {
        &self.items
    }

    /// A copy of every item, the oldest first
    pub fn sorted_items(&self) -> Vec<Item> {
        let mut items: Vec<Item> = self.items.values().cloned().collect();
        items.sort_by(|a, b| {
            a.creation_date().as_seconds().total_cmp(&b.creation_date().as_seconds())
                .then_with(|| a.id().as_uuid().cmp(b.id().as_uuid()))
        });
        items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn mark_modified(&mut self) {
        self.modified = true;
        self.generation += 1;
    }

    /// Whether the content has changed since the last time it has been saved or loaded
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// A counter that changes whenever the in-memory content changes.
    /// Comparing two values tells whether something has changed in between
    pub fn generation(&self) -> u64 {
        self.generation
    }


    /// Store the current content to the backing file
    pub fn save(&mut self) -> Result<(), CacheError> {
        let file_name = self.backing_file.clone();
        self.save_to(&file_name)
    }

    /// Store the current content to a file of the cache folder.
    ///
    /// The format depends on the file extension. The file is replaced atomically: a failed save leaves the previous file untouched.
    pub fn save_to(&mut self, file_name: &str) -> Result<(), CacheError> {
        let path = self.path_of(file_name);
        let content = FileFormat::for_path(&path).build(&self.sorted_items())?;

        std::fs::create_dir_all(&self.folder)
            .map_err(|err| CacheError::io(&self.folder, err))?;
        let mut temp_file = NamedTempFile::new_in(&self.folder)
            .map_err(|err| CacheError::io(&self.folder, err))?;
        temp_file.write_all(content.as_bytes())
            .and_then(|_| temp_file.as_file().sync_all())
            .map_err(|err| CacheError::io(temp_file.path(), err))?;
        temp_file.persist(&path)
            .map_err(|err| CacheError::io(&path, err.error))?;

        log::debug!("Saved {} items to {:?}", self.items.len(), path);
        self.modified = false;
        Ok(())
    }

    /// Replace the current content with the content of the backing file
    pub fn load(&mut self) -> Result<LoadReport, CacheError> {
        let file_name = self.backing_file.clone();
        self.load_from(&file_name)
    }

    /// Replace the current content with the content of a file of the cache folder.
    ///
    /// Malformed records are skipped, and counted in the returned report.
    /// The current content is left untouched in case of an error.
    pub fn load_from(&mut self, file_name: &str) -> Result<LoadReport, CacheError> {
        let path = self.path_of(file_name);
        let content = std::fs::read_to_string(&path)
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::InvalidData => CacheError::parse(&path, "file is not valid UTF-8"),
                _ => CacheError::io(&path, err),
            })?;

        let parsed = FileFormat::for_path(&path).parse(&content)
            .map_err(|reason| CacheError::parse(&path, reason))?;
        if parsed.skipped > 0 {
            log::warn!("{} malformed records have been ignored while loading {:?}", parsed.skipped, path);
        }

        self.replace_all(parsed.items);
        self.modified = false;
        let report = LoadReport { loaded: self.items.len(), skipped: parsed.skipped };
        log::debug!("Loaded {} items from {:?}", report.loaded, path);
        Ok(report)
    }


    /// Compares two Caches to check they have the same current content
    ///
    /// This is not a complete equality test: the backing files may differ
    pub fn has_same_contents_than(&self, other: &Self) -> bool {
        if keys_are_the_same(&self.items, &other.items) == false {
            return false;
        }

        for (id, item_l) in &self.items {
            match other.items.get(id) {
                Some(item_r) if item_r == item_l => continue,
                _ => {
                    log::debug!("Items {} differ", id);
                    return false;
                }
            }
        }
        true
    }
}
