//! Support for library configuration options

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::Lazy;
use url::Url;

use crate::cache::{Cache, DEFAULT_CACHE_FILE};
use crate::error::ConfigError;
use crate::resource::Resource;

/// The name of this device, that the server records as the author of every change (`last_updated_by`).
/// Feel free to override it when initing this library.
pub static DEVICE_ID: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("todo-sync".to_string())));

/// The current value of [`DEVICE_ID`]
pub fn device_id() -> String {
    DEVICE_ID.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

pub const ENV_URL: &str = "TODO_SYNC_URL";
pub const ENV_TOKEN: &str = "TODO_SYNC_TOKEN";
pub const ENV_DATA_DIR: &str = "TODO_SYNC_DATA_DIR";
pub const ENV_CACHE_FILE: &str = "TODO_SYNC_CACHE_FILE";


/// Where the items are stored, locally and remotely
#[derive(Clone, Debug)]
pub struct Settings {
    /// The base URL of the to-do service, and its token
    pub server: Resource,
    /// The folder that contains the cache file
    pub data_folder: PathBuf,
    /// The name of the cache file. Its extension tells its format
    pub cache_file: String,
}

impl Settings {
    pub fn new(server: Resource, data_folder: PathBuf) -> Self {
        Self { server, data_folder, cache_file: DEFAULT_CACHE_FILE.to_string() }
    }

    /// Read the settings from the environment.
    ///
    /// The server URL and token are mandatory. The data folder defaults to [`Cache::default_folder`], and the cache file to `items.json`
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = std::env::var(ENV_URL)
            .map_err(|_| ConfigError::MissingVariable(ENV_URL))?;
        let url: Url = url.parse()
            .map_err(|source| ConfigError::InvalidUrl { variable: ENV_URL, value: url.clone(), source })?;
        let token = std::env::var(ENV_TOKEN)
            .map_err(|_| ConfigError::MissingVariable(ENV_TOKEN))?;

        let data_folder = match std::env::var_os(ENV_DATA_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => Cache::default_folder()
                .ok_or(ConfigError::NoDataDirectory(ENV_DATA_DIR))?,
        };
        let cache_file = std::env::var(ENV_CACHE_FILE)
            .unwrap_or_else(|_| DEFAULT_CACHE_FILE.to_string());

        Ok(Self {
            server: Resource::new(url, token),
            data_folder,
            cache_file,
        })
    }

    /// An empty cache that uses these settings. Nothing is read from the disk
    pub fn empty_cache(&self) -> Cache {
        Cache::new(&self.data_folder, &self.cache_file)
    }
}
