//! This crate provides an offline-first to-do list, that is synced with a REST service.
//!
//! Items are kept in a local [`cache`], backed by a JSON or a CSV file (see [`format`]), so that they are available even without any network connection. \
//! A REST client is provided in the [`client`] module, that can be used as a stand-alone module.
//!
//! These two "data sources" can be used together in a [`Provider`](provider::Provider). \
//! Every change is first applied to the local cache, then forwarded to the server. \
//! When a forward fails, the provider remembers the two lists may have diverged, and reconciles them as a whole at the next opportunity.

pub mod traits;

pub mod item;
pub use item::{Importance, Item, ItemId};
pub mod timestamp;
pub use timestamp::Timestamp;
pub mod provider;
pub use provider::Provider;
pub mod error;
pub use error::{CacheError, ConfigError, RemoteError, SyncError};

pub mod format;
pub mod client;
pub mod cache;
pub mod resource;

pub mod config;
pub mod utils;
