//! Loads block lists from a directory of hosts files.
//!
//! Every regular file whose name starts with `<digits>_` becomes one list,
//! keyed by those digits. Everything else in the directory is ignored.

use std::fs;
use std::path::Path;

use rustc_hash::FxHashMap;
use tracing::{info, warn};

use super::{DomainSet, ListId, ListStore};
use crate::error::{Error, Result};

/// Load every list file in `dir` into a [`ListStore`].
///
/// Files are visited in file-name order, so when two names map to the same
/// id (`1_a` and `01_b`) the later one wins.
pub fn load_lists(dir: &Path) -> Result<ListStore> {
    if !dir.is_dir() {
        return Err(Error::ListsDirMissing(dir.to_path_buf()));
    }

    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort();

    let mut lists: FxHashMap<ListId, DomainSet> = FxHashMap::default();

    for path in entries {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(digits) = list_id_prefix(name) else {
            continue;
        };
        if !path.is_file() {
            continue;
        }
        let Ok(id) = digits.parse::<ListId>() else {
            warn!(path = %path.display(), "list id out of range, skipping");
            continue;
        };

        info!(path = %path.display(), id, "loading block list");
        let bytes = fs::read(&path).map_err(|source| Error::ReadList {
            path: path.clone(),
            source,
        })?;
        let domains = DomainSet::from_hosts(&String::from_utf8_lossy(&bytes));

        if lists.insert(id, domains).is_some() {
            warn!(path = %path.display(), id, "list id loaded twice, keeping the later file");
        }
    }

    let store = ListStore::from(lists);
    info!(
        lists = store.len(),
        domains = store.domain_count(),
        "block lists loaded"
    );

    Ok(store)
}

/// Returns the leading digits of `name` when they are followed by `_`.
fn list_id_prefix(name: &str) -> Option<&str> {
    let digits_end = name
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(name.len());
    if digits_end == 0 || !name[digits_end..].starts_with('_') {
        return None;
    }
    Some(&name[..digits_end])
}
