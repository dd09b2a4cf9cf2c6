use std::collections::BTreeSet;

/// Set of selected collection ids.
///
/// Ordering contract:
/// - Iteration yields ids in ascending lexical order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionSelection {
    ids: BTreeSet<String>,
}

impl CollectionSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Inserts `id` into the set.
    ///
    /// Returns `true` if the set changed.
    pub fn insert(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    /// Removes `id` from the set.
    ///
    /// Returns `true` if the set changed.
    pub fn remove(&mut self, id: &str) -> bool {
        self.ids.remove(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.ids.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for CollectionSelection {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().map(Into::into).collect(),
        }
    }
}
