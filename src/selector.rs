//! Request path decoding.
//!
//! A selector path is `/` followed by one or more decimal list ids joined
//! with `-`, e.g. `/1`, `/3-1-12`. Repeated ids collapse into one.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

use crate::lists::{ListId, ListStore};

/// Why a path was rejected. The `Display` output is the response body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("invalid identifier")]
    Malformed,

    #[error("invalid list id: {0}")]
    UnknownListId(String),
}

/// The set of list ids requested by one path, in ascending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    ids: BTreeSet<ListId>,
}

impl Selector {
    /// Decode `path` and check every id against `store`.
    ///
    /// Ids are checked in ascending order, so the smallest missing id is
    /// the one reported.
    pub fn resolve(path: &str, store: &ListStore) -> Result<Self, SelectorError> {
        let tokens = split_path(path).ok_or(SelectorError::Malformed)?;

        let mut ids = BTreeSet::new();
        let mut overflowed: Option<&str> = None;
        for token in tokens {
            match token.parse::<ListId>() {
                Ok(id) => {
                    ids.insert(id);
                }
                // Too large to be a loaded id. Keep going so that a smaller
                // missing id still takes precedence.
                Err(_) => {
                    overflowed.get_or_insert(token);
                }
            }
        }

        if let Some(missing) = ids.iter().find(|id| !store.contains(**id)) {
            return Err(SelectorError::UnknownListId(missing.to_string()));
        }
        if let Some(token) = overflowed {
            let digits = token.trim_start_matches('0');
            return Err(SelectorError::UnknownListId(digits.to_string()));
        }

        Ok(Self { ids })
    }

    pub fn ids(&self) -> impl Iterator<Item = ListId> + '_ {
        self.ids.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Canonical name of this combination: ids ascending, joined with `-`.
    pub fn combination_id(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.ids.iter().enumerate() {
            if i > 0 {
                f.write_str("-")?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}

/// Match `^/[0-9]+(-[0-9]+)*$` and return the digit runs.
fn split_path(path: &str) -> Option<Vec<&str>> {
    let rest = path.strip_prefix('/')?;
    let tokens: Vec<&str> = rest.split('-').collect();
    let well_formed = tokens
        .iter()
        .all(|t| !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit()));

    well_formed.then_some(tokens)
}
