//! Sparse basic feasible solutions keyed by column label.

use crate::basis::Label;
use crate::numeric::Scalar;
use rustc_hash::FxHashMap;

/// Values of a basic solution, keyed by the label they belong to.
///
/// Labels not present are implicitly zero.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bfs<T> {
    values: FxHashMap<Label, T>,
}

impl<T: Scalar> Bfs<T> {
    /// Empty solution.
    pub fn new() -> Self {
        Self {
            values: FxHashMap::default(),
        }
    }

    /// Define the value of `label`, returning any previous value.
    pub fn insert(&mut self, label: Label, value: T) -> Option<T> {
        self.values.insert(label, value)
    }

    /// Explicitly stored value of `label`.
    pub fn get(&self, label: Label) -> Option<&T> {
        self.values.get(&label)
    }

    /// Value of `label`, zero when absent.
    pub fn value(&self, label: Label) -> T {
        self.values.get(&label).cloned().unwrap_or_else(T::zero)
    }

    /// Whether `label` has an explicit entry.
    pub fn contains(&self, label: Label) -> bool {
        self.values.contains_key(&label)
    }

    /// Number of explicit entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no explicit entries.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Entries in ascending label order.
    pub fn sorted(&self) -> Vec<(Label, &T)> {
        let mut entries: Vec<_> = self.values.iter().map(|(&l, v)| (l, v)).collect();
        entries.sort_by_key(|&(label, _)| label);
        entries
    }
}

impl<T: Scalar> FromIterator<(Label, T)> for Bfs<T> {
    fn from_iter<I: IntoIterator<Item = (Label, T)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
