//! This modules keeps a local cache and a remote to-do service in sync
//!
//! Every change is applied to the local cache first, so that it survives any network failure.
//! It is then forwarded to the remote end. When a forward has failed, the local and remote lists may have diverged:
//! the next change will reconcile the whole list instead of being forwarded alone.

use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::cache::Cache;
use crate::error::{CacheError, SyncError};
use crate::item::{Item, ItemId};
use crate::traits::TodoRemote;

pub mod sync_progress;
use sync_progress::SyncProgress;
use sync_progress::{FeedbackSender, SyncEvent};

pub mod queue;

/// A cache that can be used by a [`Provider`] and by its callers at the same time
pub type SharedCache = Arc<Mutex<Cache>>;

/// Lock a shared cache.
///
/// A panic while the lock was held cannot leave the cache half-modified, so a poisoned lock is still usable
pub fn lock(cache: &SharedCache) -> MutexGuard<'_, Cache> {
    cache.lock().unwrap_or_else(PoisonError::into_inner)
}


/// A change requested by the user
#[derive(Clone, Debug, PartialEq)]
pub enum LocalChange {
    /// Create an item, or update the item that has the same ID
    Save(Item),
    Delete(ItemId),
    ToggleDone(ItemId),
}

/// A change that has been applied locally, and that must be forwarded to the remote end
#[derive(Clone, Debug, PartialEq)]
pub enum PendingChange {
    Create(Item),
    Update(Item),
    Delete(ItemId),
}

impl Display for PendingChange {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::Create(item) => write!(f, "creation of {}", item.id()),
            Self::Update(item) => write!(f, "update of {}", item.id()),
            Self::Delete(id) => write!(f, "deletion of {}", id),
        }
    }
}

/// Apply a change to a cache, and persist it.
///
/// Returns the change that should be forwarded to the remote end, or `None` in case this was a no-op (e.g. deleting an unknown item). \
/// An item that could not be read back from the file is rejected with [`CacheError::InvalidItem`], and nothing changes. \
/// In case the cache cannot be saved, the in-memory change is kept nonetheless, and the error is returned.
pub fn apply_locally(cache: &mut Cache, change: LocalChange) -> Result<Option<PendingChange>, CacheError> {
    let pending = match change {
        LocalChange::Save(item) => {
            item.validate()
                .map_err(|reason| CacheError::InvalidItem { id: *item.id(), reason })?;
            match cache.add_item(item.clone()) {
                Some(_previous) => Some(PendingChange::Update(item)),
                None => Some(PendingChange::Create(item)),
            }
        },
        LocalChange::Delete(id) => {
            cache.delete_item(&id).map(|_| PendingChange::Delete(id))
        },
        LocalChange::ToggleDone(id) => {
            cache.get_item_mut(&id).map(|item| {
                item.toggle_done();
                PendingChange::Update(item.clone())
            })
        },
    };

    if pending.is_some() {
        cache.save()?;
    }
    Ok(pending)
}



/// A data source that combines a local [`Cache`] and a remote service (usually a [`Client`](crate::client::Client)).
///
/// The remote end is authoritative: after a reconciliation, the local cache mirrors whatever the remote has merged.
pub struct Provider<R: TodoRemote> {
    /// The remote source (usually a server)
    remote: R,
    /// The local cache
    local: SharedCache,
    /// Whether the local and remote lists may have diverged since the last successful exchange
    dirty: bool,
    progress: SyncProgress,
}

impl<R: TodoRemote> Provider<R> {
    /// Create a provider.
    ///
    /// `remote` is usually a [`Client`](crate::client::Client). Nothing is exchanged with it yet, see [`Self::load_items`]
    pub fn new(remote: R, local: Cache) -> Self {
        Self::from_shared(remote, Arc::new(Mutex::new(local)))
    }

    /// Create a provider around a cache that may also be used elsewhere
    pub fn from_shared(remote: R, local: SharedCache) -> Self {
        Self { remote, local, dirty: false, progress: SyncProgress::new() }
    }

    /// Start with a known divergence state, e.g. the one a previous session has ended with
    pub fn with_dirty(mut self, dirty: bool) -> Self {
        self.dirty = dirty;
        self
    }

    /// Send [`SyncEvent`]s to this channel from now on
    pub fn set_feedback_channel(&mut self, sender: FeedbackSender) {
        self.progress.set_feedback_channel(sender);
    }

    /// Returns the local cache
    pub fn local(&self) -> &SharedCache { &self.local }
    /// Returns the remote source.
    ///
    /// Apart from tests, there are very few (if any) reasons to access `remote` directly.
    pub fn remote(&self) -> &R { &self.remote }
    /// See [`Self::remote`]
    pub fn remote_mut(&mut self) -> &mut R { &mut self.remote }

    /// Whether the local and remote lists may have diverged.
    /// In this case, the next change will trigger a whole-list reconciliation
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// How many errors and warnings have been reported since this provider was created
    pub fn n_errors(&self) -> u32 {
        self.progress.n_errors()
    }

    /// Flag the local and remote lists as possibly diverged
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// A snapshot of the local items, the oldest first
    pub fn items(&self) -> Vec<Item> {
        lock(&self.local).sorted_items()
    }

    /// Load the local file, then fetch the remote list and adopt it.
    ///
    /// A missing local file is not an error. In case the remote cannot be reached, the local items are kept and returned in the error path
    /// (they can still be read with [`Self::items`]), and the provider becomes dirty.
    /// In case the provider was already dirty, the local items are reconciled with the remote ones instead of being overwritten.
    pub async fn load_items(&mut self) -> Result<Vec<Item>, SyncError> {
        let loaded = lock(&self.local).load();
        match loaded {
            Ok(report) => self.progress.debug(&format!("Loaded {} local items", report.loaded)),
            Err(err) if err.is_not_found() => self.progress.debug("No local file yet, starting with an empty list"),
            Err(err) => self.progress.warn(&format!("Unable to load the local items, keeping the current ones: {}", err)),
        }
        self.notify_items_updated();

        if self.dirty {
            self.progress.info("The previous session has not been fully synced, reconciling the whole list");
            self.reconcile().await?;
            return Ok(self.items());
        }

        let generation = lock(&self.local).generation();
        match self.remote.get_list().await {
            Err(err) => {
                self.report_failure("Unable to fetch the remote list", &err);
                Err(err.into())
            },
            Ok(remote_items) => {
                self.adopt_remote_list(remote_items, generation)?;
                Ok(self.items())
            },
        }
    }

    /// Create an item, or update the item that has the same ID
    pub async fn save_item(&mut self, item: Item) -> Result<(), SyncError> {
        self.apply(LocalChange::Save(item)).await
    }

    /// Delete an item. Deleting an unknown item does nothing
    pub async fn delete_item(&mut self, id: &ItemId) -> Result<(), SyncError> {
        self.apply(LocalChange::Delete(*id)).await
    }

    /// Mark an item as completed if it was not, and vice versa. Toggling an unknown item does nothing
    pub async fn toggle_is_done(&mut self, id: &ItemId) -> Result<(), SyncError> {
        self.apply(LocalChange::ToggleDone(*id)).await
    }

    async fn apply(&mut self, change: LocalChange) -> Result<(), SyncError> {
        let applied = {
            let mut cache = lock(&self.local);
            apply_locally(&mut cache, change)
        };

        match applied {
            Ok(None) => {
                self.progress.debug("Nothing to change");
                Ok(())
            },
            Ok(Some(pending)) => {
                self.notify_items_updated();
                self.push(pending).await
            },
            Err(err) if err.is_invalid_item() => {
                self.progress.warn(&format!("Rejecting a change: {}", err));
                Err(err.into())
            },
            Err(err) => {
                // The change has been kept in memory, but the remote end will not get it
                self.notify_items_updated();
                self.report_failure("Unable to save the local items", &err);
                Err(err.into())
            },
        }
    }

    /// Forward a change that has already been applied locally.
    ///
    /// In case the provider is dirty, the whole list is reconciled instead.
    /// A failure never rolls back the local change. It makes the provider dirty instead.
    pub async fn push(&mut self, change: PendingChange) -> Result<(), SyncError> {
        if self.dirty {
            self.progress.debug(&format!("Local and remote lists may differ, reconciling instead of pushing the {}", change));
            return self.reconcile().await;
        }

        let result = match &change {
            PendingChange::Create(item) => self.remote.create_item(item).await.map(|_| ()),
            PendingChange::Update(item) => self.remote.update_item(item).await.map(|_| ()),
            PendingChange::Delete(id) => self.remote.delete_item(id).await,
        };

        match result {
            Ok(()) => {
                self.progress.debug(&format!("Pushed the {}", change));
                self.progress.feedback(SyncEvent::Pushed{ details: change.to_string() });
                Ok(())
            },
            Err(err) => {
                self.report_failure(&format!("Unable to push the {}", change), &err);
                Err(err.into())
            },
        }
    }

    /// Send the whole local list to the remote end, and adopt the list it has merged.
    ///
    /// The local items are left untouched in case of a failure
    pub async fn reconcile(&mut self) -> Result<(), SyncError> {
        let (local_items, generation) = {
            let cache = lock(&self.local);
            (cache.sorted_items(), cache.generation())
        };
        self.progress.info(&format!("Reconciling {} items with the remote list", local_items.len()));

        match self.remote.replace_list(local_items).await {
            Err(err) => {
                self.report_failure("Unable to reconcile with the remote list", &err);
                Err(err.into())
            },
            Ok(merged) => self.adopt_remote_list(merged, generation),
        }
    }

    /// Replace the local items with a list from the remote end, unless they have changed since `generation`.
    fn adopt_remote_list(&mut self, remote_items: Vec<Item>, generation: u64) -> Result<(), SyncError> {
        let count = remote_items.len();
        let saved = {
            let mut cache = lock(&self.local);
            if cache.generation() != generation {
                None
            } else {
                cache.replace_all(remote_items);
                Some(cache.save())
            }
        };

        match saved {
            None => {
                // The remote list has been merged from an outdated snapshot
                self.dirty = true;
                self.progress.info("Local items have changed in the meantime, they will be reconciled at the next change");
                Ok(())
            },
            Some(Err(err)) => {
                self.dirty = false;
                self.notify_items_updated();
                self.progress.error(&format!("Unable to save the items from the remote list: {}", err));
                self.progress.feedback(SyncEvent::Failed{ error: err.to_string() });
                Err(err.into())
            },
            Some(Ok(())) => {
                self.dirty = false;
                self.notify_items_updated();
                self.progress.info(&format!("Local items now mirror the {} remote ones", count));
                self.progress.feedback(SyncEvent::Reconciled{ count });
                Ok(())
            },
        }
    }

    fn report_failure(&mut self, context: &str, err: &dyn std::error::Error) {
        self.dirty = true;
        self.progress.warn(&format!("{}: {}", context, err));
        self.progress.feedback(SyncEvent::Failed{ error: err.to_string() });
    }

    fn notify_items_updated(&mut self) {
        let count = lock(&self.local).len();
        self.progress.feedback(SyncEvent::ItemsUpdated{ count });
    }
}
