//! Error types of this crate
//!
//! Local persistence errors and remote errors are kept apart, since they lead to different recoveries:
//! a [`RemoteError`] only means the remote end may now differ from the local store (see [`Provider`](crate::Provider)),
//! while a [`CacheError`] means the on-disk file may be behind the in-memory contents.

use std::path::PathBuf;

use thiserror::Error;

use crate::item::ItemId;

/// An error that happens when reading or writing the local cache file
#[derive(Debug, Error)]
pub enum CacheError {
    /// The file cannot be opened, read, or written (missing file, permissions, full disk...)
    #[error("unable to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is readable, but its overall structure cannot be understood
    #[error("unable to parse {path:?}: {reason}")]
    Parse {
        path: PathBuf,
        reason: String,
    },

    #[error("unable to serialize items: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The item could not be read back from the file, so it has not been stored
    #[error("item {id} cannot be stored: {reason}")]
    InvalidItem {
        id: ItemId,
        reason: String,
    },
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Parse { path: path.into(), reason: reason.to_string() }
    }

    /// Whether this error is caused by a file that does not exist (yet)
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Whether this error has been returned before anything has changed
    pub fn is_invalid_item(&self) -> bool {
        matches!(self, Self::InvalidItem { .. })
    }
}


/// An error that happens when talking to the remote to-do service
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("could not build a request URL: {0}")]
    Url(#[from] url::ParseError),

    /// Connectivity failure, timeout...
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("redirect")]
    Redirect,

    #[error("bad request")]
    BadRequest,

    #[error("server error")]
    ServerError,

    #[error("unexpected status code: {0}")]
    UnexpectedStatusCode(u16),

    #[error("unable to decode the response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("unexpected response from server: {0}")]
    UnexpectedResponse(String),
}

impl RemoteError {
    /// Map an HTTP status code to an error, or to `Ok` for informational and success codes
    pub fn check_status(code: u16) -> Result<(), Self> {
        match code {
            100..=299 => Ok(()),
            300..=399 => Err(Self::Redirect),
            400..=499 => Err(Self::BadRequest),
            500..=599 => Err(Self::ServerError),
            other => Err(Self::UnexpectedStatusCode(other)),
        }
    }
}


/// An error in the settings, see [`Settings::from_env`](crate::config::Settings::from_env)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingVariable(&'static str),

    #[error("invalid {variable} {value:?}: {source}")]
    InvalidUrl {
        variable: &'static str,
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("no data directory on this platform, please set {0}")]
    NoDataDirectory(&'static str),
}


/// An error returned by the operations of a [`Provider`](crate::Provider)
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("local store: {0}")]
    Cache(#[from] CacheError),

    #[error("remote: {0}")]
    Remote(#[from] RemoteError),
}

impl SyncError {
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}
