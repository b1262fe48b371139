//! Structural editing of the canonical document tree
//!
//! This module provides everything that changes the shape of a document:
//! - **ids**: hierarchical id generation, uniqueness probing, rename cascades
//! - **ordering**: per-sibling sort keys and renumbering
//! - **ops**: insert, delete, move, rename for items and categories
//! - **validate**: audit of the document invariants
//!
//! # Design
//! Every operation validates against the current tree before touching it, so a
//! failed operation leaves the document exactly as it was.

pub mod ids;
pub mod ops;
pub mod ordering;
pub mod validate;

pub use ops::{
    delete_category, delete_item, insert_category, insert_item, move_category, move_item,
    rename_category, rename_item, set_item_ordering, ItemRef, KeepIds, MoveOutcome,
    OrderingChange, RegenerationPrompt,
};
pub use ordering::renumber_document;
pub use validate::{validate_document, Violation};

use std::fmt;

/// Where a dragged node lands relative to the node it was dropped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPosition {
    Before,
    After,
    /// Last child of the target. Only valid for items.
    Inside,
}

impl DropPosition {
    /// Parse a drop position name as sent by the UI.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "before" => Some(Self::Before),
            "after" => Some(Self::After),
            "inside" => Some(Self::Inside),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
            Self::Inside => "inside",
        }
    }
}

impl fmt::Display for DropPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_position_names() {
        assert_eq!(DropPosition::from_name("Before"), Some(DropPosition::Before));
        assert_eq!(DropPosition::from_name("inside"), Some(DropPosition::Inside));
        assert_eq!(DropPosition::from_name("over"), None);
        assert_eq!(DropPosition::After.to_string(), "after");
    }
}
