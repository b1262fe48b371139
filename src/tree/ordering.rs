//! Ordering resolver.
//!
//! Each sibling array is kept in structural order. Items with a fixed sort
//! key carry their 1-based position in that array; alphabetical items keep
//! the sentinel but still occupy a position, so a fixed item that follows
//! one is numbered past it.

use crate::model::{Category, Document, Item, SortKey};

/// Renumber the fixed sort keys of a sibling array from structural position.
pub fn renumber_ordering(siblings: &mut [Item]) {
    for (index, item) in siblings.iter_mut().enumerate() {
        if !item.ordering.is_alphabetical() {
            item.ordering = SortKey::Fixed(index as u32 + 1);
        }
    }
}

/// Renumber categories `1..=N`. Categories are never alphabetical.
pub fn renumber_categories(categories: &mut [Category]) {
    for (index, category) in categories.iter_mut().enumerate() {
        category.ordering = SortKey::Fixed(index as u32 + 1);
    }
}

/// Renumber every sibling array of the document, categories included.
pub fn renumber_document(document: &mut Document) {
    renumber_categories(&mut document.topics);
    for category in &mut document.topics {
        renumber_tree(&mut category.groups);
    }
}

fn renumber_tree(siblings: &mut [Item]) {
    renumber_ordering(siblings);
    for item in siblings {
        renumber_tree(&mut item.children);
    }
}

/// Check that every fixed key in the array matches its position.
pub fn is_consistent(siblings: &[Item]) -> bool {
    siblings.iter().enumerate().all(|(index, item)| match item.ordering {
        SortKey::Fixed(n) => n as usize == index + 1,
        SortKey::Alphabetical => true,
    })
}

/// Give the item at `index` a fixed position and move it there.
///
/// The position is `requested` when it lies within the array, otherwise the
/// item's current fixed value when that does, otherwise its current
/// structural position. Returns the item's new index, or `None` if `index`
/// is out of bounds.
pub fn set_fixed_position(
    siblings: &mut Vec<Item>,
    index: usize,
    requested: Option<u32>,
) -> Option<usize> {
    let len = siblings.len();
    let item = siblings.get(index)?;
    let in_range = |n: &u32| (1..=len as u32).contains(n);

    let position = requested
        .filter(in_range)
        .or_else(|| item.ordering.position().filter(in_range))
        .unwrap_or(index as u32 + 1)
        .clamp(1, len as u32);
    let target = position as usize - 1;

    let mut item = siblings.remove(index);
    item.ordering = SortKey::Fixed(position);
    siblings.insert(target, item);
    renumber_ordering(siblings);
    Some(target)
}

/// Switch the item at `index` to alphabetical sorting. Returns false if
/// `index` is out of bounds.
pub fn set_alphabetical(siblings: &mut [Item], index: usize) -> bool {
    let Some(item) = siblings.get_mut(index) else {
        return false;
    };
    item.ordering = SortKey::Alphabetical;
    renumber_ordering(siblings);
    true
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
