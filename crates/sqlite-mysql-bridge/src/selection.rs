//! Checkbox-style table selection.
//!
//! Rebuilt from scratch whenever the source side's table list is
//! (re)loaded; entries keep the lister's order.

use serde::Serialize;

/// One listed table and its checked state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionEntry {
    pub name: String,
    pub checked: bool,
}

/// The set of listed tables with per-table checkboxes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableSelection {
    entries: Vec<SelectionEntry>,
}

impl TableSelection {
    /// Build a selection from a freshly listed set of tables, all unchecked.
    pub fn from_tables(names: impl IntoIterator<Item = String>) -> Self {
        Self {
            entries: names
                .into_iter()
                .map(|name| SelectionEntry {
                    name,
                    checked: false,
                })
                .collect(),
        }
    }

    /// The "select all" control: drives every entry's checked state, both
    /// directions.
    pub fn set_all(&mut self, checked: bool) {
        for entry in &mut self.entries {
            entry.checked = checked;
        }
    }

    /// Set one table's checked state. Returns false when the table is not
    /// in the selection.
    pub fn set_checked(&mut self, name: &str, checked: bool) -> bool {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => {
                entry.checked = checked;
                true
            }
            None => false,
        }
    }

    /// Flip one table's checkbox. Returns the new state, or `None` when the
    /// table is not in the selection.
    pub fn toggle(&mut self, name: &str) -> Option<bool> {
        self.entries.iter_mut().find(|e| e.name == name).map(|e| {
            e.checked = !e.checked;
            e.checked
        })
    }

    /// Names of the checked tables, in display order.
    pub fn checked_tables(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.checked)
            .map(|e| e.name.clone())
            .collect()
    }

    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn all_checked(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|e| e.checked)
    }
}
