//! Identifier and selector interning for the writer
//!
//! IDs are assigned in first-seen order and are stable for the lifetime of
//! one writer. Identifier 0 is reserved for the empty string and never
//! stored.

use apinotes_core::{IdentifierId, SelectorId, SelectorRef, StoredSelector};
use rustc_hash::FxHashMap;

/// String → identifier ID
#[derive(Debug, Default)]
pub struct IdentifierInterner {
    ids: FxHashMap<String, IdentifierId>,
}

impl IdentifierInterner {
    /// Create an empty interner
    pub fn new() -> Self {
        Self::default()
    }

    /// ID for `name`, assigning the next one if it is new
    pub fn intern(&mut self, name: &str) -> IdentifierId {
        if name.is_empty() {
            return IdentifierId::EMPTY;
        }
        if let Some(id) = self.ids.get(name) {
            return *id;
        }
        let id = IdentifierId(self.ids.len() as u32 + 1);
        self.ids.insert(name.to_string(), id);
        id
    }

    /// ID already assigned to `name`
    pub fn get(&self, name: &str) -> Option<IdentifierId> {
        if name.is_empty() {
            return Some(IdentifierId::EMPTY);
        }
        self.ids.get(name).copied()
    }

    /// Number of stored identifiers (the empty string is not counted)
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no identifiers are stored
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// All stored identifiers in ID order
    pub fn iter(&self) -> impl Iterator<Item = (&str, IdentifierId)> {
        let mut all: Vec<_> = self.ids.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        all.sort_by_key(|(_, id)| *id);
        all.into_iter()
    }
}

/// Selector → selector ID
#[derive(Debug, Default)]
pub struct SelectorInterner {
    ids: FxHashMap<StoredSelector, SelectorId>,
}

impl SelectorInterner {
    /// Create an empty interner
    pub fn new() -> Self {
        Self::default()
    }

    /// ID for a selector already expressed as identifier IDs
    pub fn intern(&mut self, selector: StoredSelector) -> SelectorId {
        let next = SelectorId(self.ids.len() as u32);
        *self.ids.entry(selector).or_insert(next)
    }

    /// Intern every piece of `selector` and then the selector itself
    ///
    /// Returns `None` when the argument count does not fit the stored form.
    pub fn intern_ref(
        &mut self,
        identifiers: &mut IdentifierInterner,
        selector: &SelectorRef<'_>,
    ) -> Option<SelectorId> {
        let num_args = u16::try_from(selector.num_args).ok()?;
        let stored = StoredSelector {
            num_args,
            identifiers: selector
                .pieces
                .iter()
                .map(|piece| identifiers.intern(piece))
                .collect(),
        };
        Some(self.intern(stored))
    }

    /// Number of stored selectors
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no selectors are stored
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// All stored selectors in ID order
    pub fn iter(&self) -> impl Iterator<Item = (&StoredSelector, SelectorId)> {
        let mut all: Vec<_> = self.ids.iter().map(|(k, v)| (k, *v)).collect();
        all.sort_by_key(|(_, id)| *id);
        all.into_iter()
    }
}
