use async_trait::async_trait;

use crate::error::RemoteError;
use crate::item::{Item, ItemId};

/// A remote to-do list service (usually a [`Client`](crate::client::Client)).
///
/// The remote is authoritative: when a whole list is sent to it, it returns the merged list that the local store must adopt.
#[async_trait]
pub trait TodoRemote {
    /// Returns the current list of items of the remote service
    async fn get_list(&mut self) -> Result<Vec<Item>, RemoteError>;

    /// Send the whole local list to the remote service, and returns the list it has merged
    async fn replace_list(&mut self, items: Vec<Item>) -> Result<Vec<Item>, RemoteError>;

    /// Add an item on the remote end. Returns the item, as stored by the remote
    async fn create_item(&mut self, item: &Item) -> Result<Item, RemoteError>;

    /// Update an existing item on the remote end. Returns the item, as stored by the remote
    async fn update_item(&mut self, item: &Item) -> Result<Item, RemoteError>;

    async fn delete_item(&mut self, id: &ItemId) -> Result<(), RemoteError>;
}
