//! Run a [`Provider`] on its own task, so that remote operations never overlap
//!
//! Local changes are applied right away by a [`SyncHandle`], on the caller's side.
//! Their remote counterparts are queued, and executed one at a time, in order.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::CacheError;
use crate::item::{Item, ItemId};
use crate::traits::TodoRemote;
use super::{apply_locally, lock, LocalChange, PendingChange, Provider, SharedCache};

enum Command {
    Push(PendingChange),
    MarkDirty,
    Reconcile,
    Flush(oneshot::Sender<bool>),
}

/// The worker side of the queue
pub struct SyncQueue<R: TodoRemote> {
    provider: Provider<R>,
    receiver: mpsc::UnboundedReceiver<Command>,
}

impl<R> SyncQueue<R>
where
    R: TodoRemote + Send + 'static,
{
    /// Move a provider to a new task.
    ///
    /// The task ends when every [`SyncHandle`] has been dropped, and gives the provider back.
    pub fn spawn(provider: Provider<R>) -> (SyncHandle, JoinHandle<Provider<R>>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = SyncHandle {
            local: provider.local().clone(),
            sender,
        };
        let queue = Self { provider, receiver };
        (handle, tokio::spawn(queue.run()))
    }

    async fn run(mut self) -> Provider<R> {
        while let Some(command) = self.receiver.recv().await {
            match command {
                // Failures have already been reported by the provider, and have made it dirty
                Command::Push(change) => { let _ = self.provider.push(change).await; },
                Command::Reconcile => { let _ = self.provider.reconcile().await; },
                Command::MarkDirty => self.provider.mark_dirty(),
                Command::Flush(reply) => { let _ = reply.send(self.provider.is_dirty()); },
            }
        }
        log::debug!("Every sync handle has been dropped, stopping the sync queue");
        self.provider
    }
}


/// A cheap, clonable way to change the items of a [`Provider`] that runs in a [`SyncQueue`]
#[derive(Clone)]
pub struct SyncHandle {
    local: SharedCache,
    sender: mpsc::UnboundedSender<Command>,
}

impl SyncHandle {
    /// Create an item, or update the item that has the same ID.
    ///
    /// This returns as soon as the local cache has been saved. The remote end will be updated later on.
    pub fn save_item(&self, item: Item) -> Result<(), CacheError> {
        self.apply(LocalChange::Save(item))
    }

    /// See [`Self::save_item`]
    pub fn delete_item(&self, id: &ItemId) -> Result<(), CacheError> {
        self.apply(LocalChange::Delete(*id))
    }

    /// See [`Self::save_item`]
    pub fn toggle_is_done(&self, id: &ItemId) -> Result<(), CacheError> {
        self.apply(LocalChange::ToggleDone(*id))
    }

    /// Ask for a whole-list reconciliation, after the commands that are already queued
    pub fn reconcile(&self) {
        self.send(Command::Reconcile);
    }

    /// Wait for every queued command to complete.
    ///
    /// Returns whether the local and remote lists may have diverged.
    /// This is `true` if the worker is not running anymore, since nothing guarantees the last changes have been sent.
    pub async fn flush(&self) -> bool {
        let (reply, response) = oneshot::channel();
        self.send(Command::Flush(reply));
        response.await.unwrap_or(true)
    }

    /// A snapshot of the local items, the oldest first
    pub fn items(&self) -> Vec<Item> {
        lock(&self.local).sorted_items()
    }

    pub fn local(&self) -> &SharedCache {
        &self.local
    }

    fn apply(&self, change: LocalChange) -> Result<(), CacheError> {
        let applied = {
            let mut cache = lock(&self.local);
            apply_locally(&mut cache, change)
        };

        match applied {
            Ok(Some(pending)) => {
                self.send(Command::Push(pending));
                Ok(())
            },
            Ok(None) => Ok(()),
            Err(err) if err.is_invalid_item() => Err(err),
            Err(err) => {
                self.send(Command::MarkDirty);
                Err(err)
            },
        }
    }

    fn send(&self, command: Command) {
        if self.sender.send(command).is_err() {
            log::warn!("The sync queue has stopped. Local changes will only reach the remote end after the next reconciliation");
        }
    }
}
