use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

/// Value returned by [`IdentifierRegistry::resolve`] for keys that were never registered.
pub const UNRESOLVED_VID: &str = "";

/// Picks the vertex identifier for a record: the display name when it is
/// present and non-empty, the source identifier otherwise.
pub fn vertex_id(display_name: Option<&str>, source_id: &str) -> String {
    match display_name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => source_id.to_string(),
    }
}

/// Run-scoped map from a source key to the VID chosen for it.
///
/// The typed pipeline keys by OpenStack UUID, the topology pipeline by
/// `graph_index`. Entries are never removed; re-registering a key overwrites it.
#[derive(Debug, Clone)]
pub struct IdentifierRegistry<K = String> {
    entries: HashMap<K, String>,
}

impl<K> Default for IdentifierRegistry<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> IdentifierRegistry<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, key: impl Into<K>, vid: impl Into<String>) {
        self.entries.insert(key.into(), vid.into());
    }

    /// Returns the VID for `key`, or [`UNRESOLVED_VID`] if it was never registered.
    pub fn resolve<Q>(&self, key: &Q) -> &str
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.lookup(key).unwrap_or(UNRESOLVED_VID)
    }

    pub fn lookup<Q>(&self, key: &Q) -> Option<&str>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
