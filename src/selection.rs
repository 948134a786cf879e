//! Selected and hovered annotations.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::AnnotationId;

/// How a select gesture changes the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SelectionMode {
    /// Add matches to the selection.
    #[default]
    Add,
    /// Remove matches from the selection.
    Remove,
    /// Flip each match.
    Toggle,
}

/// Engine-local selection state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    selected: BTreeSet<AnnotationId>,
    hovered: Option<AnnotationId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &BTreeSet<AnnotationId> {
        &self.selected
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    pub fn set_hovered(&mut self, id: Option<AnnotationId>) {
        self.hovered = id;
    }

    /// Apply a selection mode to a batch of ids.
    pub fn apply(&mut self, mode: SelectionMode, ids: &[AnnotationId]) {
        match mode {
            SelectionMode::Add => self.selected.extend(ids.iter().cloned()),
            SelectionMode::Remove => {
                for id in ids {
                    self.selected.remove(id);
                }
            }
            SelectionMode::Toggle => {
                for id in ids {
                    if !self.selected.remove(id) {
                        self.selected.insert(id.clone());
                    }
                }
            }
        }
        log::debug!("🎯 Selection {:?}: {} now selected", mode, self.selected.len());
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Drain the selection, returning the ids in order.
    pub fn take(&mut self) -> Vec<AnnotationId> {
        std::mem::take(&mut self.selected).into_iter().collect()
    }
}
