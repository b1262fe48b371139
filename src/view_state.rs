//! Expand/collapse and selection bookkeeping for the tree view.
//!
//! Nodes are remembered by id, so every id change made by the tree
//! operations has to be replayed here. A category rename moves the category
//! entry and every collapsed item under the old prefix; an item rename moves
//! only the item's own entry, even though its descendants were renamed too.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The node currently selected in the tree view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    Category(String),
    Item { category: String, item: String },
}

/// UI state of one editor session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorViewState {
    collapsed_categories: BTreeSet<String>,
    collapsed_items: BTreeSet<String>,
    selection: Option<Selection>,
}

impl EditorViewState {
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Collapse state
    // ─────────────────────────────────────────────────────────────────────────

    pub fn is_category_collapsed(&self, id: &str) -> bool {
        self.collapsed_categories.contains(id)
    }

    pub fn is_item_collapsed(&self, id: &str) -> bool {
        self.collapsed_items.contains(id)
    }

    /// Toggle a category; returns true if it is now collapsed.
    pub fn toggle_category(&mut self, id: &str) -> bool {
        toggle(&mut self.collapsed_categories, id)
    }

    /// Toggle an item; returns true if it is now collapsed.
    pub fn toggle_item(&mut self, id: &str) -> bool {
        toggle(&mut self.collapsed_items, id)
    }

    pub fn set_category_collapsed(&mut self, id: &str, collapsed: bool) {
        set(&mut self.collapsed_categories, id, collapsed);
    }

    pub fn set_item_collapsed(&mut self, id: &str, collapsed: bool) {
        set(&mut self.collapsed_items, id, collapsed);
    }

    /// Expand everything.
    pub fn expand_all(&mut self) {
        self.collapsed_categories.clear();
        self.collapsed_items.clear();
    }

    pub fn collapsed_categories(&self) -> impl Iterator<Item = &str> {
        self.collapsed_categories.iter().map(String::as_str)
    }

    pub fn collapsed_items(&self) -> impl Iterator<Item = &str> {
        self.collapsed_items.iter().map(String::as_str)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Id changes
    // ─────────────────────────────────────────────────────────────────────────

    /// Follow a category rename: the category entry and every collapsed item
    /// id starting with `old_id` move to `new_id`.
    pub fn remap_category_rename(&mut self, old_id: &str, new_id: &str) {
        if self.collapsed_categories.remove(old_id) {
            self.collapsed_categories.insert(new_id.to_string());
        }

        let moved: Vec<String> = self
            .collapsed_items
            .iter()
            .filter(|id| id.starts_with(old_id))
            .cloned()
            .collect();
        for id in moved {
            self.collapsed_items.remove(&id);
            self.collapsed_items
                .insert(format!("{}{}", new_id, &id[old_id.len()..]));
        }

        match &mut self.selection {
            Some(Selection::Category(id)) if id == old_id => *id = new_id.to_string(),
            Some(Selection::Item { category, .. }) if category == old_id => {
                *category = new_id.to_string()
            }
            _ => {}
        }
    }

    /// Follow an item rename: only the exact entry moves.
    pub fn remap_item_rename(&mut self, old_id: &str, new_id: &str) {
        if self.collapsed_items.remove(old_id) {
            self.collapsed_items.insert(new_id.to_string());
        }
        if let Some(Selection::Item { item, .. }) = &mut self.selection {
            if item == old_id {
                *item = new_id.to_string();
            }
        }
    }

    /// Follow an item move, possibly into another category and under a
    /// regenerated id. Only the item's own entry moves, as for a rename.
    pub fn remap_item_move(
        &mut self,
        old_category: &str,
        old_id: &str,
        new_category: &str,
        new_id: &str,
    ) {
        if old_id != new_id && self.collapsed_items.remove(old_id) {
            self.collapsed_items.insert(new_id.to_string());
        }
        if let Some(Selection::Item { category, item }) = &mut self.selection {
            if category == old_category && item == old_id {
                *category = new_category.to_string();
                *item = new_id.to_string();
            }
        }
    }

    /// Forget a deleted category and every collapsed item under its prefix.
    pub fn forget_category(&mut self, id: &str) {
        self.collapsed_categories.remove(id);
        self.collapsed_items.retain(|item| !item.starts_with(id));
        if matches!(
            &self.selection,
            Some(Selection::Category(c)) | Some(Selection::Item { category: c, .. }) if c == id
        ) {
            self.selection = None;
        }
    }

    /// Forget deleted items.
    pub fn forget_items<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for id in ids {
            self.collapsed_items.remove(id);
            if matches!(&self.selection, Some(Selection::Item { item, .. }) if item == id) {
                self.selection = None;
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection
    // ─────────────────────────────────────────────────────────────────────────

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn select(&mut self, selection: Selection) {
        self.selection = Some(selection);
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }
}

fn toggle(set: &mut BTreeSet<String>, id: &str) -> bool {
    if set.remove(id) {
        false
    } else {
        set.insert(id.to_string());
        true
    }
}

fn set(set: &mut BTreeSet<String>, id: &str, collapsed: bool) {
    if collapsed {
        set.insert(id.to_string());
    } else {
        set.remove(id);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let mut state = EditorViewState::new();
        assert!(state.toggle_category("S010"));
        assert!(state.is_category_collapsed("S010"));
        assert!(!state.toggle_category("S010"));
        assert!(!state.is_category_collapsed("S010"));

        state.set_item_collapsed("S010010", true);
        assert!(state.is_item_collapsed("S010010"));
        state.expand_all();
        assert_eq!(state.collapsed_items().count(), 0);
    }

    #[test]
    fn test_category_rename_remaps_prefix() {
        let mut state = EditorViewState::new();
        state.set_category_collapsed("S020", true);
        state.set_item_collapsed("S020010", true);
        state.set_item_collapsed("S020020010", true);
        state.set_item_collapsed("S030010", true);

        state.remap_category_rename("S020", "S999");

        assert!(state.is_category_collapsed("S999"));
        assert!(!state.is_category_collapsed("S020"));
        let items: Vec<&str> = state.collapsed_items().collect();
        assert_eq!(items, vec!["S030010", "S999010", "S999020010"]);
    }

    #[test]
    fn test_item_rename_remaps_exact_entry_only() {
        let mut state = EditorViewState::new();
        state.set_item_collapsed("S020010", true);
        state.set_item_collapsed("S020010010", true);

        state.remap_item_rename("S020010", "S020050");

        assert!(state.is_item_collapsed("S020050"));
        // Descendant entries keep the old prefix.
        assert!(state.is_item_collapsed("S020010010"));
        assert!(!state.is_item_collapsed("S020050010"));
    }

    #[test]
    fn test_rename_follows_selection() {
        let mut state = EditorViewState::new();
        state.select(Selection::Item {
            category: "S020".into(),
            item: "S020010".into(),
        });
        state.remap_item_rename("S020010", "S020030");
        state.remap_category_rename("S020", "S040");
        assert_eq!(
            state.selection(),
            Some(&Selection::Item {
                category: "S040".into(),
                item: "S020030".into()
            })
        );
    }

    #[test]
    fn test_item_move_follows_selection_across_categories() {
        let mut state = EditorViewState::new();
        state.set_item_collapsed("S010020", true);
        state.select(Selection::Item {
            category: "S010".into(),
            item: "S010020".into(),
        });

        state.remap_item_move("S010", "S010020", "S020", "S010020");
        assert_eq!(
            state.selection(),
            Some(&Selection::Item {
                category: "S020".into(),
                item: "S010020".into()
            })
        );
        assert!(state.is_item_collapsed("S010020"));

        state.remap_item_move("S020", "S010020", "S030", "S030010");
        assert_eq!(
            state.selection(),
            Some(&Selection::Item {
                category: "S030".into(),
                item: "S030010".into()
            })
        );
        assert!(state.is_item_collapsed("S030010"));
        assert!(!state.is_item_collapsed("S010020"));
    }

    #[test]
    fn test_item_move_leaves_other_selection() {
        let mut state = EditorViewState::new();
        state.select(Selection::Item {
            category: "S020".into(),
            item: "S010020".into(),
        });
        state.remap_item_move("S010", "S010020", "S030", "S030010");
        assert_eq!(
            state.selection(),
            Some(&Selection::Item {
                category: "S020".into(),
                item: "S010020".into()
            })
        );
    }

    #[test]
    fn test_forget_category() {
        let mut state = EditorViewState::new();
        state.set_category_collapsed("S020", true);
        state.set_item_collapsed("S020010", true);
        state.set_item_collapsed("S030010", true);
        state.select(Selection::Category("S020".into()));

        state.forget_category("S020");

        assert!(!state.is_category_collapsed("S020"));
        assert!(!state.is_item_collapsed("S020010"));
        assert!(state.is_item_collapsed("S030010"));
        assert!(state.selection().is_none());
    }

    #[test]
    fn test_forget_items_clears_selection() {
        let mut state = EditorViewState::new();
        state.set_item_collapsed("S020010", true);
        state.select(Selection::Item {
            category: "S020".into(),
            item: "S020010".into(),
        });
        state.forget_items(["S020010"]);
        assert!(!state.is_item_collapsed("S020010"));
        assert!(state.selection().is_none());
    }

    #[test]
    fn test_view_state_serialization_roundtrip() {
        let mut state = EditorViewState::new();
        state.set_category_collapsed("S010", true);
        state.select(Selection::Category("S010".into()));
        let json = serde_json::to_string(&state).unwrap();
        let restored: EditorViewState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, restored);
    }
}
