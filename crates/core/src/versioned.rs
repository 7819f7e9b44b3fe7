//! Versioned lookup results
//!
//! Every table lookup returns a `VersionedInfo<T>`: the complete list of
//! (version, payload) pairs stored for the entity, plus the index of the
//! entry that applies to the reader's query version.
//!
//! ## Selection
//!
//! Entries are sorted ascending by version, with the unversioned entry (empty
//! version) first when present. For a non-empty query version `V`, the
//! selected entry is the first versioned entry whose version is `>= V`: if the
//! query is `4`, an entry for `4` wins over one for `5`, and an entry for `5`
//! still applies when there is none for `4`. When no versioned entry
//! qualifies, the unversioned entry is selected if there is one.
//!
//! An empty query version selects the first entry.
//!
//! This picks the least newer-or-equal entry, not the latest entry that is
//! not newer than the query. Readers written against the same format must
//! select identically.

use crate::version::VersionTuple;
use smallvec::SmallVec;

/// Storage for versioned entries; most entities carry a single version
pub type VersionedEntries<T> = SmallVec<[(VersionTuple, T); 1]>;

/// All stored versions of an entity's payload and the applicable one
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedInfo<T> {
    entries: VersionedEntries<T>,
    selected: Option<usize>,
}

impl<T> Default for VersionedInfo<T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T> VersionedInfo<T> {
    /// An empty result: nothing stored, nothing selected
    pub fn none() -> Self {
        VersionedInfo {
            entries: SmallVec::new(),
            selected: None,
        }
    }

    /// Wrap sorted entries and select the one applicable to `version`
    pub fn new(version: VersionTuple, entries: VersionedEntries<T>) -> Self {
        debug_assert!(
            entries.windows(2).all(|w| w[0].0 < w[1].0),
            "versioned entries must be sorted and unique"
        );
        let selected = select_version(version, entries.iter().map(|(v, _)| v));
        VersionedInfo { entries, selected }
    }

    /// Whether an entry applies to the query version
    #[inline]
    pub fn is_some(&self) -> bool {
        self.selected.is_some()
    }

    /// Whether no entry applies to the query version
    #[inline]
    pub fn is_none(&self) -> bool {
        self.selected.is_none()
    }

    /// The applicable payload, if any
    pub fn selected(&self) -> Option<&T> {
        self.selected.map(|i| &self.entries[i].1)
    }

    /// Index of the applicable entry, if any
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// Version of the applicable entry, if any
    pub fn selected_version(&self) -> Option<VersionTuple> {
        self.selected.map(|i| self.entries[i].0)
    }

    /// Number of stored versions
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stored entry at `index`
    pub fn get(&self, index: usize) -> Option<&(VersionTuple, T)> {
        self.entries.get(index)
    }

    /// All stored entries in ascending version order
    pub fn iter(&self) -> std::slice::Iter<'_, (VersionTuple, T)> {
        self.entries.iter()
    }

    /// Consume the result, returning the applicable payload
    pub fn into_selected(self) -> Option<T> {
        let index = self.selected?;
        self.entries.into_iter().nth(index).map(|(_, info)| info)
    }
}

impl<'a, T> IntoIterator for &'a VersionedInfo<T> {
    type Item = &'a (VersionTuple, T);
    type IntoIter = std::slice::Iter<'a, (VersionTuple, T)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Pick the applicable entry among versions sorted ascending
pub fn select_version<'a, I>(query: VersionTuple, versions: I) -> Option<usize>
where
    I: IntoIterator<Item = &'a VersionTuple>,
{
    let mut first_is_unversioned = false;
    for (index, version) in versions.into_iter().enumerate() {
        if index == 0 {
            if query.is_empty() {
                return Some(0);
            }
            first_is_unversioned = version.is_empty();
        }
        if !version.is_empty() && *version >= query {
            return Some(index);
        }
    }
    if first_is_unversioned {
        Some(0)
    } else {
        None
    }
}
