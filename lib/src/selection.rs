use roaring::RoaringBitmap;

use crate::types::Id;

/// Difference between two selection states.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionDelta {
    pub added: RoaringBitmap,
    pub removed: RoaringBitmap,
}

impl SelectionDelta {
    /// The delta that turns `current` into `next`.
    pub fn replace(current: &SelectionSet, next: &RoaringBitmap) -> Self {
        Self {
            added: next - &current.selected,
            removed: &current.selected - next,
        }
    }

    pub fn clear(current: &SelectionSet) -> Self {
        Self {
            added: RoaringBitmap::new(),
            removed: current.selected.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// The currently selected ids. Only ever changed by applying deltas.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSet {
    selected: RoaringBitmap,
}

impl SelectionSet {
    pub fn apply(&mut self, delta: &SelectionDelta) {
        self.selected -= &delta.removed;
        self.selected |= &delta.added;
    }

    pub fn contains(&self, id: Id) -> bool {
        self.selected.contains(id.0)
    }

    pub fn len(&self) -> u64 {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = Id> + '_ {
        self.selected.iter().map(Id)
    }
}
