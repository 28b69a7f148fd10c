//! Column labels and the row-to-column basis map.
//!
//! A tableau with `m` rows and `n` structural columns has `n + m` columns in
//! total: the structural columns `Structural(0..n)` and one unit column per
//! row, `Slack(0..m)`. The basis assigns exactly one column to every row.

use crate::error::{PivotError, PivotResult};
use rustc_hash::FxHashSet;
use std::cmp::Ordering;
use std::fmt;

/// Identifies a tableau column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    /// Unit column `e_r` belonging to row `r`.
    Slack(usize),
    /// Column `j` of the constraint matrix.
    Structural(usize),
}

impl Label {
    /// Signed integer view: `Structural(j)` is `j + 1`, `Slack(r)` is `-(r + 1)`.
    pub fn signed(self) -> isize {
        match self {
            Label::Structural(j) => j as isize + 1,
            Label::Slack(r) => -(r as isize) - 1,
        }
    }

    /// Inverse of [`Label::signed`]. Zero is not a label.
    pub fn from_signed(value: isize) -> Option<Self> {
        match value.cmp(&0) {
            Ordering::Greater => Some(Label::Structural(value as usize - 1)),
            Ordering::Less => Some(Label::Slack(value.unsigned_abs() - 1)),
            Ordering::Equal => None,
        }
    }

    /// Whether this is a unit column.
    pub fn is_slack(self) -> bool {
        matches!(self, Label::Slack(_))
    }
}

impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        self.signed().cmp(&other.signed())
    }
}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.signed())
    }
}

/// Which column is basic in which row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Basis {
    /// Basic label of each row.
    labels: Vec<Label>,
    /// Row holding each structural column, if basic.
    structural_rows: Vec<Option<usize>>,
    /// Row holding each slack column, if basic.
    slack_rows: Vec<Option<usize>>,
    /// Columns excluded from enumeration.
    blocked: FxHashSet<Label>,
}

impl Basis {
    /// The slack basis: row `r` holds `Slack(r)`.
    pub fn identity(rows: usize, cols: usize) -> Self {
        Self {
            labels: (0..rows).map(Label::Slack).collect(),
            structural_rows: vec![None; cols],
            slack_rows: (0..rows).map(Some).collect(),
            blocked: FxHashSet::default(),
        }
    }

    /// Build a basis from explicit labels, one per row.
    pub fn from_labels(labels: Vec<Label>, cols: usize) -> PivotResult<Self> {
        let rows = labels.len();
        let mut basis = Self {
            labels: Vec::with_capacity(rows),
            structural_rows: vec![None; cols],
            slack_rows: vec![None; rows],
            blocked: FxHashSet::default(),
        };
        for (row, label) in labels.into_iter().enumerate() {
            let slot = basis
                .slot_mut(label)
                .ok_or(PivotError::LabelOutOfRange { label })?;
            if slot.is_some() {
                return Err(PivotError::DuplicateLabel { label });
            }
            *slot = Some(row);
            basis.labels.push(label);
        }
        Ok(basis)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the basis has no rows.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of structural columns.
    pub fn num_columns(&self) -> usize {
        self.structural_rows.len()
    }

    /// Basic label of `row`, `None` past the last row.
    pub fn label(&self, row: usize) -> Option<Label> {
        self.labels.get(row).copied()
    }

    /// All basic labels in row order.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Whether `label` names a column of this tableau.
    pub fn contains_label(&self, label: Label) -> bool {
        match label {
            Label::Structural(j) => j < self.structural_rows.len(),
            Label::Slack(r) => r < self.slack_rows.len(),
        }
    }

    /// Row in which `label` is basic.
    pub fn find(&self, label: Label) -> Option<usize> {
        match label {
            Label::Structural(j) => self.structural_rows.get(j).copied().flatten(),
            Label::Slack(r) => self.slack_rows.get(r).copied().flatten(),
        }
    }

    /// Whether `label` is currently basic.
    pub fn member(&self, label: Label) -> bool {
        self.find(label).is_some()
    }

    /// True when every row holds its own slack column.
    pub fn is_ident(&self) -> bool {
        self.labels
            .iter()
            .enumerate()
            .all(|(row, &label)| label == Label::Slack(row))
    }

    /// Put `label` in `row` and return the label that left.
    ///
    /// The caller guarantees `label` is in range and not basic elsewhere.
    pub(crate) fn pivot(&mut self, row: usize, label: Label) -> Label {
        let leaving = self.labels[row];
        if let Some(slot) = self.slot_mut(leaving) {
            *slot = None;
        }
        if let Some(slot) = self.slot_mut(label) {
            *slot = Some(row);
        }
        self.labels[row] = label;
        leaving
    }

    /// Exclude a column from enumeration.
    pub fn block(&mut self, label: Label) {
        self.blocked.insert(label);
    }

    /// Undo [`Basis::block`].
    pub fn unblock(&mut self, label: Label) {
        self.blocked.remove(&label);
    }

    /// Whether `label` is blocked.
    pub fn is_blocked(&self, label: Label) -> bool {
        self.blocked.contains(&label)
    }

    /// Copy the blocked set of another basis over the same columns.
    pub(crate) fn inherit_blocks(&mut self, other: &Basis) {
        self.blocked.clone_from(&other.blocked);
    }

    /// Every column label, slacks first, in ascending label order.
    pub fn all_labels(&self) -> impl Iterator<Item = Label> + '_ {
        (0..self.slack_rows.len())
            .rev()
            .map(Label::Slack)
            .chain((0..self.structural_rows.len()).map(Label::Structural))
    }

    /// Non-basic, unblocked labels in ascending label order.
    pub fn nonbasic(&self) -> impl Iterator<Item = Label> + '_ {
        self.all_labels()
            .filter(move |&label| !self.member(label) && !self.is_blocked(label))
    }

    fn slot_mut(&mut self, label: Label) -> Option<&mut Option<usize>> {
        match label {
            Label::Structural(j) => self.structural_rows.get_mut(j),
            Label::Slack(r) => self.slack_rows.get_mut(r),
        }
    }
}
