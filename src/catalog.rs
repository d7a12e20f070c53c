//! The read-only data every request is served from.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};
use crate::lists::ListStore;

/// Ubuntu's stock hosts file, prepended to every generated block list.
pub const UBUNTU_DEFAULT_HOSTS: &str = include_str!("hosts.default");

/// Immutable snapshot of the loaded lists and the default hosts preamble.
///
/// Built completely before the server starts accepting, then shared by
/// reference across all workers.
#[derive(Debug)]
pub struct Catalog {
    lists: ListStore,
    default_hosts: String,
}

impl Catalog {
    pub fn new(lists: ListStore, default_hosts: impl Into<String>) -> Self {
        Self {
            lists,
            default_hosts: default_hosts.into(),
        }
    }

    pub fn lists(&self) -> &ListStore {
        &self.lists
    }

    pub fn default_hosts(&self) -> &str {
        &self.default_hosts
    }
}

/// Read the default hosts preamble, falling back to the built-in one.
pub fn load_default_hosts(path: Option<&Path>) -> Result<String> {
    info!("loading default hosts");
    match path {
        Some(path) => fs::read_to_string(path).map_err(|source| Error::ReadDefaultHosts {
            path: path.to_path_buf(),
            source,
        }),
        None => Ok(UBUNTU_DEFAULT_HOSTS.to_string()),
    }
}
