use foundation::PlaceId;

/// Ordered set of selected place ids.
///
/// Ordering contract:
/// - Ids keep the order they were first selected in.
/// - Re-selecting an id already present does not move it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<PlaceId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<PlaceId>,
    {
        let mut s = Self::default();
        for id in ids {
            s.insert(id.into());
        }
        s
    }

    /// Parses the comma-joined form a multi-select control may hand back.
    pub fn from_comma_list(raw: &str) -> Self {
        Self::from_ids(raw.split(',').map(str::trim).filter(|s| !s.is_empty()))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &PlaceId) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> &[PlaceId] {
        &self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlaceId> + '_ {
        self.ids.iter()
    }

    /// Adds `id` to the end of the selection.
    ///
    /// Returns `true` if the selection changed.
    pub fn insert(&mut self, id: PlaceId) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Returns `true` if the selection changed.
    pub fn remove(&mut self, id: &PlaceId) -> bool {
        let before = self.ids.len();
        self.ids.retain(|x| x != id);
        self.ids.len() != before
    }

    /// Checkbox semantics: select if absent, deselect if present.
    pub fn toggle(&mut self, id: PlaceId) {
        if !self.remove(&id) {
            self.ids.push(id);
        }
    }

    /// Replaces the whole selection. Returns `true` if it changed.
    pub fn set(&mut self, next: Selection) -> bool {
        if *self == next {
            return false;
        }
        *self = next;
        true
    }

    /// Returns `true` if the selection changed.
    pub fn clear(&mut self) -> bool {
        let changed = !self.ids.is_empty();
        self.ids.clear();
        changed
    }
}
