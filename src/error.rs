//! Errors that abort startup.
//!
//! Per-request failures never surface here; they are handled inside the
//! request handler for the connection they belong to.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The directory holding the source lists does not exist.
    #[error("lists directory {0:?} doesn't exist")]
    ListsDirMissing(PathBuf),

    #[error("failed to read block list {path:?}: {source}")]
    ReadList {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read default hosts {path:?}: {source}")]
    ReadDefaultHosts {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}
