//! hosts-server - Serves combined hosts-file block lists over HTTP.
//!
//! Block lists are loaded once at startup. A request for `/<id>-<id>...`
//! gets the default hosts preamble followed by the sorted, deduplicated
//! union of the selected lists.

pub mod catalog;
pub mod combine;
pub mod error;
pub mod lists;
pub mod selector;
pub mod server;

pub use catalog::Catalog;
pub use error::{Error, Result};
