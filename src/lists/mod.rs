//! Block lists loaded at startup.
//!
//! A [`ListStore`] maps numeric list ids to the set of domains each list
//! blocks. It is built once by the [`loader`] and never mutated afterwards,
//! so request handlers share it by reference without any locking.

mod hosts;
pub mod loader;

use rustc_hash::{FxHashMap, FxHashSet};

pub use hosts::{EXCLUDED_DOMAINS, parse_line};
pub use loader::load_lists;

/// Identifier of one loaded block list, taken from its file name.
pub type ListId = u64;

/// Lowercase domains blocked by a single list.
///
/// Never contains an entry from [`EXCLUDED_DOMAINS`] or an empty string.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DomainSet {
    domains: FxHashSet<String>,
}

impl DomainSet {
    /// Parse every block rule out of hosts-file text.
    ///
    /// Lines that are not block rules are skipped.
    pub fn from_hosts(text: &str) -> Self {
        text.lines().filter_map(parse_line).collect()
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.domains.contains(domain)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.domains.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    fn insert(&mut self, domain: &str) {
        let domain = domain.trim().to_ascii_lowercase();
        if domain.is_empty() || EXCLUDED_DOMAINS.contains(&domain.as_str()) {
            return;
        }
        self.domains.insert(domain);
    }
}

impl<S: AsRef<str>> FromIterator<S> for DomainSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::default();
        for domain in iter {
            set.insert(domain.as_ref());
        }
        set
    }
}

/// Immutable mapping from list id to its domains.
#[derive(Debug, Default)]
pub struct ListStore {
    lists: FxHashMap<ListId, DomainSet>,
}

impl ListStore {
    pub fn get(&self, id: ListId) -> Option<&DomainSet> {
        self.lists.get(&id)
    }

    pub fn contains(&self, id: ListId) -> bool {
        self.lists.contains_key(&id)
    }

    /// Returns the loaded ids in ascending order.
    pub fn ids(&self) -> Vec<ListId> {
        let mut ids: Vec<_> = self.lists.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Returns the number of loaded lists.
    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Total number of domains across all lists, counting overlaps once per list.
    pub fn domain_count(&self) -> usize {
        self.lists.values().map(DomainSet::len).sum()
    }
}

impl From<FxHashMap<ListId, DomainSet>> for ListStore {
    fn from(lists: FxHashMap<ListId, DomainSet>) -> Self {
        Self { lists }
    }
}

impl FromIterator<(ListId, DomainSet)> for ListStore {
    fn from_iter<I: IntoIterator<Item = (ListId, DomainSet)>>(iter: I) -> Self {
        Self {
            lists: iter.into_iter().collect(),
        }
    }
}
