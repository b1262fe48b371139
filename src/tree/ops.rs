//! Mutation operations on the document tree.
//!
//! Each operation looks up and checks everything it needs before changing
//! anything. Operations whose changes span several sibling arrays (moves)
//! are staged on a copy of the affected categories and committed at the end,
//! so an error never leaves a half-applied edit behind.

use super::ids::{
    build_next_category_id, build_unique_id, generate_id, is_valid_id, renumber_category_ids,
    renumber_descendant_ids, update_child_ids_by_prefix,
};
use super::ordering::{renumber_categories, renumber_ordering, set_alphabetical, set_fixed_position};
use super::DropPosition;
use crate::error::{Error, Result};
use crate::model::{Category, Document, Item, SortKey};
use log::debug;
use std::collections::HashSet;

// ─────────────────────────────────────────────────────────────────────────────
// Shared Types
// ─────────────────────────────────────────────────────────────────────────────

/// Address of an item: its category and its own id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemRef<'a> {
    pub category: &'a str,
    pub item: &'a str,
}

impl<'a> ItemRef<'a> {
    pub fn new(category: &'a str, item: &'a str) -> Self {
        Self { category, item }
    }
}

/// Asks the user whether a moved item with `lockIdOnSort == false` should
/// take the id of its new position.
pub trait RegenerationPrompt {
    fn confirm_regenerate(&mut self, current_id: &str, proposed_id: &str) -> bool;
}

impl<F> RegenerationPrompt for F
where
    F: FnMut(&str, &str) -> bool,
{
    fn confirm_regenerate(&mut self, current_id: &str, proposed_id: &str) -> bool {
        self(current_id, proposed_id)
    }
}

/// Prompt that always declines regeneration.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepIds;

impl RegenerationPrompt for KeepIds {
    fn confirm_regenerate(&mut self, _current_id: &str, _proposed_id: &str) -> bool {
        false
    }
}

/// Result of a successful item move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Category now holding the item
    pub category: String,
    /// The item's id after the move
    pub item_id: String,
    /// The id before the move, if it was regenerated
    pub previous_id: Option<String>,
    /// Index of the item within its new sibling array
    pub index: usize,
}

/// Requested change of an item's sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingChange {
    /// Sort by label text.
    Alphabetical,
    /// Fixed position; `None` keeps the stored value or the current position.
    Fixed(Option<u32>),
}

fn category_mut<'d>(document: &'d mut Document, id: &str) -> Result<&'d mut Category> {
    document
        .category_mut(id)
        .ok_or_else(|| Error::CategoryNotFound(id.to_string()))
}

fn locate(category: &Category, id: &str) -> Result<Vec<usize>> {
    category
        .locate(id)
        .ok_or_else(|| Error::item_not_found(&category.id, id))
}

fn check_new_id(id: &str) -> Result<()> {
    if is_valid_id(id) {
        Ok(())
    } else {
        Err(Error::InvalidId(id.to_string()))
    }
}

/// First id that renaming `item` from `old_id` to `new_id` would duplicate,
/// with descendants following the prefix. Items outside the subtree are
/// checked as they are in `category`.
fn cascade_collision(
    category: &Category,
    item: &Item,
    old_id: &str,
    new_id: &str,
) -> Option<String> {
    let own: HashSet<&str> = item.subtree_ids().into_iter().collect();
    let mut taken: HashSet<String> = category
        .item_ids()
        .into_iter()
        .filter(|id| !own.contains(id))
        .map(str::to_string)
        .collect();
    item.subtree_ids().into_iter().find_map(|id| {
        let renamed = match id.strip_prefix(old_id) {
            Some(suffix) => format!("{}{}", new_id, suffix),
            None => id.to_string(),
        };
        if taken.insert(renamed.clone()) {
            None
        } else {
            Some(renamed)
        }
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Insert
// ─────────────────────────────────────────────────────────────────────────────

/// Append `item` to a category root (`parent_id == None`) or to an item's
/// children. The item gets a fresh unique id and the next fixed position;
/// any children it carries are renumbered beneath the new id.
///
/// Returns the new item's id.
pub fn insert_item(
    document: &mut Document,
    category_id: &str,
    parent_id: Option<&str>,
    mut item: Item,
) -> Result<String> {
    let category = category_mut(document, category_id)?;
    let parent_path = match parent_id {
        Some(pid) => locate(category, pid)?,
        None => Vec::new(),
    };
    let owner_id = parent_id.unwrap_or(category.id.as_str()).to_string();
    let sibling_count = match parent_id {
        Some(_) => category
            .item_at(&parent_path)
            .map_or(0, |parent| parent.children.len()),
        None => category.groups.len(),
    };

    item.id = build_unique_id(category, &owner_id, sibling_count, "");
    item.ordering = SortKey::Fixed(sibling_count as u32 + 1);
    renumber_descendant_ids(&mut item);
    if let Some(taken) = item
        .subtree_ids()
        .into_iter()
        .find(|id| category.has_item_id(id, ""))
    {
        return Err(Error::DuplicateId(taken.to_string()));
    }

    let new_id = item.id.clone();
    let siblings = category
        .siblings_mut(&parent_path)
        .ok_or_else(|| Error::item_not_found(category_id, &owner_id))?;
    siblings.push(item);
    renumber_ordering(siblings);

    debug!("Inserted item {} under {}", new_id, owner_id);
    Ok(new_id)
}

/// Append a category. It gets the next category id and the last position;
/// items it carries are renumbered beneath the new id.
///
/// Returns the new category's id.
pub fn insert_category(document: &mut Document, mut category: Category) -> String {
    let new_id = build_next_category_id(document);
    renumber_category_ids(&mut category, &new_id);
    category.ordering = SortKey::Fixed(document.topics.len() as u32 + 1);
    document.topics.push(category);
    renumber_categories(&mut document.topics);

    debug!("Inserted category {}", new_id);
    new_id
}

// ─────────────────────────────────────────────────────────────────────────────
// Delete
// ─────────────────────────────────────────────────────────────────────────────

/// Remove an item and its subtree. Returns the removed item.
pub fn delete_item(document: &mut Document, category_id: &str, item_id: &str) -> Result<Item> {
    let category = category_mut(document, category_id)?;
    let path = locate(category, item_id)?;
    let Some((&index, parent_path)) = path.split_last() else {
        return Err(Error::item_not_found(category_id, item_id));
    };
    let siblings = category
        .siblings_mut(parent_path)
        .ok_or_else(|| Error::item_not_found(category_id, item_id))?;
    let removed = siblings.remove(index);
    renumber_ordering(siblings);

    debug!(
        "Deleted item {} ({} items) from {}",
        item_id,
        removed.subtree_len(),
        category_id
    );
    Ok(removed)
}

/// Remove a category and everything in it. Returns the removed category.
pub fn delete_category(document: &mut Document, category_id: &str) -> Result<Category> {
    let index = document
        .category_index(category_id)
        .ok_or_else(|| Error::CategoryNotFound(category_id.to_string()))?;
    let removed = document.topics.remove(index);
    renumber_categories(&mut document.topics);

    debug!("Deleted category {}", category_id);
    Ok(removed)
}

// ─────────────────────────────────────────────────────────────────────────────
// Move
// ─────────────────────────────────────────────────────────────────────────────

/// Move an item relative to another item, possibly in another category.
///
/// `Inside` makes the source the last child of the target; `Before` and
/// `After` place it next to the target. Both the old and the new sibling
/// arrays are renumbered. If the item is not locked to its id, `prompt` is
/// asked whether it should take the id of its new position; descendants
/// follow via prefix replacement.
pub fn move_item(
    document: &mut Document,
    source: ItemRef<'_>,
    target: ItemRef<'_>,
    position: DropPosition,
    prompt: &mut dyn RegenerationPrompt,
) -> Result<MoveOutcome> {
    let source_index = document
        .category_index(source.category)
        .ok_or_else(|| Error::CategoryNotFound(source.category.to_string()))?;
    let target_index = document
        .category_index(target.category)
        .ok_or_else(|| Error::CategoryNotFound(target.category.to_string()))?;
    let same_category = source_index == target_index;

    let source_path = locate(&document.topics[source_index], source.item)?;
    locate(&document.topics[target_index], target.item)?;

    if same_category && source.item == target.item {
        return Err(Error::MoveOntoSelf(source.item.to_string()));
    }

    let moving = document.topics[source_index]
        .item_at(&source_path)
        .ok_or_else(|| Error::item_not_found(source.category, source.item))?;
    if same_category && moving.subtree_contains(target.item) {
        return Err(Error::MoveIntoDescendant {
            source: source.item.to_string(),
            target: target.item.to_string(),
        });
    }
    if !same_category {
        let destination = &document.topics[target_index];
        if let Some(taken) = moving
            .subtree_ids()
            .into_iter()
            .find(|id| destination.has_item_id(id, ""))
        {
            return Err(Error::DuplicateId(taken.to_string()));
        }
    }

    // Stage on copies of the affected categories.
    let mut origin = document.topics[source_index].clone();
    let mut destination_copy = if same_category {
        None
    } else {
        Some(document.topics[target_index].clone())
    };

    let Some((&old_index, old_parent)) = source_path.split_last() else {
        return Err(Error::item_not_found(source.category, source.item));
    };
    let origin_siblings = origin
        .siblings_mut(old_parent)
        .ok_or_else(|| Error::item_not_found(source.category, source.item))?;
    let mut item = origin_siblings.remove(old_index);
    renumber_ordering(origin_siblings);

    let destination = destination_copy.as_mut().unwrap_or(&mut origin);
    let target_path = locate(destination, target.item)?;
    let (parent_path, index) = match position {
        DropPosition::Inside => {
            let len = destination
                .item_at(&target_path)
                .map_or(0, |t| t.children.len());
            (target_path, len)
        }
        DropPosition::Before | DropPosition::After => {
            let Some((&target_at, parent)) = target_path.split_last() else {
                return Err(Error::item_not_found(target.category, target.item));
            };
            let offset = usize::from(position == DropPosition::After);
            (parent.to_vec(), target_at + offset)
        }
    };

    let previous_id = if item.lock_id_on_sort {
        None
    } else {
        let parent_id = if parent_path.is_empty() {
            destination.id.clone()
        } else {
            destination
                .item_at(&parent_path)
                .map(|p| p.id.clone())
                .ok_or_else(|| Error::item_not_found(target.category, target.item))?
        };
        let mut slot = index;
        let proposed = loop {
            let candidate = generate_id(&parent_id, slot);
            if cascade_collision(destination, &item, &item.id, &candidate).is_none() {
                break candidate;
            }
            slot += 1;
        };
        if proposed != item.id && prompt.confirm_regenerate(&item.id, &proposed) {
            let old_id = std::mem::replace(&mut item.id, proposed);
            update_child_ids_by_prefix(&mut item.children, &old_id, &item.id);
            Some(old_id)
        } else {
            None
        }
    };

    let item_id = item.id.clone();
    let siblings = destination
        .siblings_mut(&parent_path)
        .ok_or_else(|| Error::item_not_found(target.category, target.item))?;
    siblings.insert(index, item);
    renumber_ordering(siblings);

    // Commit.
    let destination_id = destination.id.clone();
    document.topics[source_index] = origin;
    if let Some(destination) = destination_copy {
        document.topics[target_index] = destination;
    }

    debug!(
        "Moved item {} {} {} (now {})",
        source.item, position, target.item, item_id
    );
    Ok(MoveOutcome {
        category: destination_id,
        item_id,
        previous_id,
        index,
    })
}

/// Move a category before or after another one and renumber all categories.
pub fn move_category(
    document: &mut Document,
    source_id: &str,
    target_id: &str,
    position: DropPosition,
) -> Result<()> {
    if position == DropPosition::Inside {
        return Err(Error::UnsupportedDrop(position));
    }
    let source_index = document
        .category_index(source_id)
        .ok_or_else(|| Error::CategoryNotFound(source_id.to_string()))?;
    document
        .category_index(target_id)
        .ok_or_else(|| Error::CategoryNotFound(target_id.to_string()))?;
    if source_id == target_id {
        return Err(Error::MoveOntoSelf(source_id.to_string()));
    }

    let category = document.topics.remove(source_index);
    let target_index = document
        .category_index(target_id)
        .unwrap_or(document.topics.len());
    let index = match position {
        DropPosition::After => target_index + 1,
        _ => target_index,
    };
    document.topics.insert(index.min(document.topics.len()), category);
    renumber_categories(&mut document.topics);

    debug!("Moved category {} {} {}", source_id, position, target_id);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Rename
// ─────────────────────────────────────────────────────────────────────────────

/// Give an item a new id. Descendant ids keep their suffixes and take the
/// new prefix; the rename is rejected if any resulting id is already taken.
pub fn rename_item(
    document: &mut Document,
    category_id: &str,
    old_id: &str,
    new_id: &str,
) -> Result<()> {
    let category = category_mut(document, category_id)?;
    let path = locate(category, old_id)?;
    if old_id == new_id {
        return Ok(());
    }
    check_new_id(new_id)?;
    let current = category
        .item_at(&path)
        .ok_or_else(|| Error::item_not_found(category_id, old_id))?;
    if let Some(taken) = cascade_collision(category, current, old_id, new_id) {
        return Err(Error::DuplicateId(taken));
    }

    let item = category
        .item_at_mut(&path)
        .ok_or_else(|| Error::item_not_found(category_id, old_id))?;
    item.id = new_id.to_string();
    update_child_ids_by_prefix(&mut item.children, old_id, new_id);

    debug!("Renamed item {} to {} in {}", old_id, new_id, category_id);
    Ok(())
}

/// Give a category a new id. Every item id beneath it is regenerated from
/// the new id and the current structure.
pub fn rename_category(document: &mut Document, old_id: &str, new_id: &str) -> Result<()> {
    if !document.has_category_id(old_id) {
        return Err(Error::CategoryNotFound(old_id.to_string()));
    }
    if old_id == new_id {
        return Ok(());
    }
    check_new_id(new_id)?;
    if document.has_category_id(new_id) {
        return Err(Error::DuplicateId(new_id.to_string()));
    }

    let category = category_mut(document, old_id)?;
    renumber_category_ids(category, new_id);

    debug!("Renamed category {} to {}", old_id, new_id);
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Ordering
// ─────────────────────────────────────────────────────────────────────────────

/// Change how an item sorts among its siblings. Returns the item's index
/// afterwards; switching to a fixed position may move it.
pub fn set_item_ordering(
    document: &mut Document,
    category_id: &str,
    item_id: &str,
    change: OrderingChange,
) -> Result<usize> {
    let category = category_mut(document, category_id)?;
    let path = locate(category, item_id)?;
    let Some((&index, parent_path)) = path.split_last() else {
        return Err(Error::item_not_found(category_id, item_id));
    };
    let siblings = category
        .siblings_mut(parent_path)
        .ok_or_else(|| Error::item_not_found(category_id, item_id))?;

    let new_index = match change {
        OrderingChange::Alphabetical => set_alphabetical(siblings, index).then_some(index),
        OrderingChange::Fixed(requested) => set_fixed_position(siblings, index, requested),
    };
    let new_index = new_index.ok_or_else(|| Error::item_not_found(category_id, item_id))?;

    debug!("Ordering of {} set to {:?}", item_id, change);
    Ok(new_index)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Localized;
    use crate::tree::validate_document;

    fn item(id: &str, n: u32, children: Vec<Item>) -> Item {
        Item {
            id: id.to_string(),
            ordering: SortKey::Fixed(n),
            children,
            ..Item::default()
        }
    }

    fn unlocked(mut item: Item) -> Item {
        item.lock_id_on_sort = false;
        item
    }

    fn category(id: &str, n: u32, groups: Vec<Item>) -> Category {
        let mut category = Category::new(id, Localized::new(id, id));
        category.ordering = SortKey::Fixed(n);
        category.groups = groups;
        category
    }

    /// S010: S010010 { S010010010, S010010020 }, S010020, S010030
    /// S020: S020010
    fn sample() -> Document {
        Document::new(vec![
            category(
                "S010",
                1,
                vec![
                    item(
                        "S010010",
                        1,
                        vec![item("S010010010", 1, vec![]), item("S010010020", 2, vec![])],
                    ),
                    item("S010020", 2, vec![]),
                    item("S010030", 3, vec![]),
                ],
            ),
            category("S020", 2, vec![item("S020010", 1, vec![])]),
        ])
    }

    fn root_ids(document: &Document, category: &str) -> Vec<String> {
        document
            .category(category)
            .unwrap()
            .groups
            .iter()
            .map(|i| i.id.clone())
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Insert
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_insert_item_at_category_root() {
        let mut document = sample();
        let id = insert_item(&mut document, "S010", None, Item::with_label("Ny", "New")).unwrap();
        assert_eq!(id, "S010040");
        let inserted = document.category("S010").unwrap().find_item(&id).unwrap();
        assert_eq!(inserted.ordering, SortKey::Fixed(4));
        assert_eq!(inserted.translations.en, "New");
        assert!(validate_document(&document).is_empty());
    }

    #[test]
    fn test_insert_item_as_child() {
        let mut document = sample();
        let id = insert_item(&mut document, "S010", Some("S010010"), Item::default()).unwrap();
        assert_eq!(id, "S010010030");
        let parent = document.category("S010").unwrap().find_item("S010010").unwrap();
        assert_eq!(parent.children.len(), 3);
        assert_eq!(parent.children[2].ordering, SortKey::Fixed(3));
    }

    #[test]
    fn test_insert_item_skips_stale_ids() {
        let mut document = sample();
        // A moved item still carries the id the next slot would get.
        document.topics[1].groups.push(item("S020020", 2, vec![]));
        document.topics[1].groups.swap(0, 1);
        document.topics[1].groups[0].id = "S020030".to_string();
        let id = insert_item(&mut document, "S020", None, Item::default()).unwrap();
        assert_eq!(id, "S020040");
    }

    #[test]
    fn test_insert_item_renumbers_carried_children() {
        let mut document = sample();
        let mut draft = Item::default();
        draft.children = vec![Item::default(), Item::default()];
        let id = insert_item(&mut document, "S020", None, draft).unwrap();
        let inserted = document.category("S020").unwrap().find_item(&id).unwrap();
        assert_eq!(inserted.children[0].id, "S020020010");
        assert_eq!(inserted.children[1].id, "S020020020");
    }

    #[test]
    fn test_insert_item_missing_targets() {
        let mut document = sample();
        let before = document.clone();
        let err = insert_item(&mut document, "S999", None, Item::default()).unwrap_err();
        assert!(matches!(err, Error::CategoryNotFound(_)));
        let err = insert_item(&mut document, "S010", Some("S010999"), Item::default()).unwrap_err();
        assert!(matches!(err, Error::ItemNotFound { .. }));
        assert_eq!(document, before);
    }

    #[test]
    fn test_insert_category() {
        let mut document = sample();
        let mut draft = Category::new("", Localized::new("Demens", "Dementia"));
        draft.groups = vec![Item::default()];
        let id = insert_category(&mut document, draft);
        assert_eq!(id, "S030");
        let inserted = document.category("S030").unwrap();
        assert_eq!(inserted.ordering, SortKey::Fixed(3));
        assert_eq!(inserted.groups[0].id, "S030010");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Delete
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_delete_item_closes_gap() {
        let mut document = sample();
        let removed = delete_item(&mut document, "S010", "S010020").unwrap();
        assert_eq!(removed.id, "S010020");
        let groups = &document.category("S010").unwrap().groups;
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].id, "S010030");
        assert_eq!(groups[1].ordering, SortKey::Fixed(2));
    }

    #[test]
    fn test_delete_item_removes_subtree() {
        let mut document = sample();
        let removed = delete_item(&mut document, "S010", "S010010").unwrap();
        assert_eq!(removed.subtree_len(), 3);
        assert!(document.category("S010").unwrap().find_item("S010010020").is_none());
    }

    #[test]
    fn test_delete_missing_item() {
        let mut document = sample();
        let err = delete_item(&mut document, "S010", "S010999").unwrap_err();
        assert!(matches!(err, Error::ItemNotFound { .. }));
    }

    #[test]
    fn test_delete_category_renumbers() {
        let mut document = sample();
        delete_category(&mut document, "S010").unwrap();
        assert_eq!(document.topics.len(), 1);
        assert_eq!(document.topics[0].ordering, SortKey::Fixed(1));
        assert!(matches!(
            delete_category(&mut document, "S010"),
            Err(Error::CategoryNotFound(_))
        ));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Move
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_move_item_after_sibling() {
        let mut document = sample();
        let outcome = move_item(
            &mut document,
            ItemRef::new("S010", "S010010"),
            ItemRef::new("S010", "S010030"),
            DropPosition::After,
            &mut KeepIds,
        )
        .unwrap();
        assert_eq!(outcome.index, 2);
        assert_eq!(outcome.previous_id, None);
        assert_eq!(root_ids(&document, "S010"), vec!["S010020", "S010030", "S010010"]);
        assert!(validate_document(&document).is_empty());
    }

    #[test]
    fn test_move_item_before_sibling() {
        let mut document = sample();
        move_item(
            &mut document,
            ItemRef::new("S010", "S010030"),
            ItemRef::new("S010", "S010010"),
            DropPosition::Before,
            &mut KeepIds,
        )
        .unwrap();
        assert_eq!(root_ids(&document, "S010"), vec!["S010030", "S010010", "S010020"]);
        let groups = &document.category("S010").unwrap().groups;
        assert_eq!(groups[0].ordering, SortKey::Fixed(1));
        assert_eq!(groups[2].ordering, SortKey::Fixed(3));
    }

    #[test]
    fn test_move_item_inside_appends_child() {
        let mut document = sample();
        let outcome = move_item(
            &mut document,
            ItemRef::new("S010", "S010020"),
            ItemRef::new("S010", "S010010"),
            DropPosition::Inside,
            &mut KeepIds,
        )
        .unwrap();
        assert_eq!(outcome.index, 2);
        let parent = document.category("S010").unwrap().find_item("S010010").unwrap();
        assert_eq!(parent.children[2].id, "S010020");
        assert_eq!(parent.children[2].ordering, SortKey::Fixed(3));
        assert_eq!(root_ids(&document, "S010"), vec!["S010010", "S010030"]);
        assert!(validate_document(&document).is_empty());
    }

    #[test]
    fn test_move_item_into_descendant_is_rejected() {
        let mut document = sample();
        let before = document.clone();
        let err = move_item(
            &mut document,
            ItemRef::new("S010", "S010010"),
            ItemRef::new("S010", "S010010020"),
            DropPosition::Inside,
            &mut KeepIds,
        )
        .unwrap_err();
        assert!(matches!(err, Error::MoveIntoDescendant { .. }));
        assert_eq!(document, before);
    }

    #[test]
    fn test_move_item_onto_itself_is_rejected() {
        let mut document = sample();
        let before = document.clone();
        let err = move_item(
            &mut document,
            ItemRef::new("S010", "S010020"),
            ItemRef::new("S010", "S010020"),
            DropPosition::Before,
            &mut KeepIds,
        )
        .unwrap_err();
        assert!(matches!(err, Error::MoveOntoSelf(_)));
        assert_eq!(document, before);
    }

    #[test]
    fn test_move_item_to_other_category() {
        let mut document = sample();
        let outcome = move_item(
            &mut document,
            ItemRef::new("S010", "S010010"),
            ItemRef::new("S020", "S020010"),
            DropPosition::Before,
            &mut KeepIds,
        )
        .unwrap();
        assert_eq!(outcome.category, "S020");
        assert_eq!(root_ids(&document, "S020"), vec!["S010010", "S020010"]);
        assert_eq!(root_ids(&document, "S010"), vec!["S010020", "S010030"]);
        assert!(validate_document(&document).is_empty());
    }

    #[test]
    fn test_move_item_to_other_category_rejects_id_clash() {
        let mut document = sample();
        document.topics[1].groups[0].children = vec![item("S010030", 1, vec![])];
        let before = document.clone();
        let err = move_item(
            &mut document,
            ItemRef::new("S010", "S010030"),
            ItemRef::new("S020", "S020010"),
            DropPosition::After,
            &mut KeepIds,
        )
        .unwrap_err();
        assert!(matches!(err, Error::DuplicateId(id) if id == "S010030"));
        assert_eq!(document, before);
    }

    #[test]
    fn test_move_unlocked_item_regenerates_when_confirmed() {
        let mut document = sample();
        let branch = document.topics[0].groups.remove(0);
        document.topics[0].groups.insert(0, unlocked(branch));

        let mut asked = Vec::new();
        let mut prompt = |current: &str, proposed: &str| {
            asked.push((current.to_string(), proposed.to_string()));
            true
        };
        let outcome = move_item(
            &mut document,
            ItemRef::new("S010", "S010010"),
            ItemRef::new("S010", "S010030"),
            DropPosition::Inside,
            &mut prompt,
        )
        .unwrap();

        assert_eq!(asked, vec![("S010010".to_string(), "S010030010".to_string())]);
        assert_eq!(outcome.item_id, "S010030010");
        assert_eq!(outcome.previous_id.as_deref(), Some("S010010"));
        let moved = document.category("S010").unwrap().find_item("S010030010").unwrap();
        assert_eq!(moved.children[0].id, "S010030010010");
        assert_eq!(moved.children[1].id, "S010030010020");
        assert!(validate_document(&document).is_empty());
    }

    #[test]
    fn test_move_unlocked_item_skips_ids_whose_children_clash() {
        // The slot after B is S010020 (B itself), and S010030 would turn
        // A's child into B's child S010030010.
        let mut document = Document::new(vec![category(
            "S010",
            1,
            vec![
                unlocked(item("S010010", 1, vec![item("S010010010", 1, vec![])])),
                unlocked(item("S010020", 2, vec![item("S010030010", 1, vec![])])),
            ],
        )]);
        let mut asked = Vec::new();
        let mut prompt = |_: &str, proposed: &str| {
            asked.push(proposed.to_string());
            true
        };
        let outcome = move_item(
            &mut document,
            ItemRef::new("S010", "S010010"),
            ItemRef::new("S010", "S010020"),
            DropPosition::After,
            &mut prompt,
        )
        .unwrap();

        assert_eq!(asked, vec!["S010040".to_string()]);
        assert_eq!(outcome.item_id, "S010040");
        let moved = document.category("S010").unwrap().find_item("S010040").unwrap();
        assert_eq!(moved.children[0].id, "S010040010");
        assert!(validate_document(&document).is_empty());
    }

    #[test]
    fn test_move_unlocked_item_keeps_id_when_declined() {
        let mut document = sample();
        let last = document.topics[0].groups.pop().unwrap();
        document.topics[0].groups.push(unlocked(last));
        let outcome = move_item(
            &mut document,
            ItemRef::new("S010", "S010030"),
            ItemRef::new("S010", "S010010"),
            DropPosition::Before,
            &mut |_: &str, _: &str| false,
        )
        .unwrap();
        assert_eq!(outcome.item_id, "S010030");
        assert_eq!(outcome.previous_id, None);
    }

    #[test]
    fn test_move_locked_item_never_prompts() {
        let mut document = sample();
        let mut prompt = |_: &str, _: &str| -> bool { panic!("locked items must not prompt") };
        move_item(
            &mut document,
            ItemRef::new("S010", "S010030"),
            ItemRef::new("S010", "S010010"),
            DropPosition::Before,
            &mut prompt,
        )
        .unwrap();
    }

    #[test]
    fn test_move_category() {
        let mut document = sample();
        move_category(&mut document, "S010", "S020", DropPosition::After).unwrap();
        assert_eq!(document.topics[0].id, "S020");
        assert_eq!(document.topics[0].ordering, SortKey::Fixed(1));
        assert_eq!(document.topics[1].id, "S010");
        assert_eq!(document.topics[1].ordering, SortKey::Fixed(2));

        move_category(&mut document, "S010", "S020", DropPosition::Before).unwrap();
        assert_eq!(document.topics[0].id, "S010");
    }

    #[test]
    fn test_move_category_inside_is_rejected() {
        let mut document = sample();
        let err = move_category(&mut document, "S010", "S020", DropPosition::Inside).unwrap_err();
        assert!(matches!(err, Error::UnsupportedDrop(DropPosition::Inside)));
        let err = move_category(&mut document, "S010", "S010", DropPosition::After).unwrap_err();
        assert!(matches!(err, Error::MoveOntoSelf(_)));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rename
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_rename_item_cascades_prefix() {
        let mut document = sample();
        rename_item(&mut document, "S010", "S010010", "S010090").unwrap();
        let renamed = document.category("S010").unwrap().find_item("S010090").unwrap();
        assert_eq!(renamed.children[0].id, "S010090010");
        assert_eq!(renamed.children[1].id, "S010090020");
    }

    #[test]
    fn test_rename_item_rejects_duplicate() {
        let mut document = sample();
        let before = document.clone();
        let err = rename_item(&mut document, "S010", "S010010", "S010020").unwrap_err();
        assert!(matches!(err, Error::DuplicateId(_)));
        let err = rename_item(&mut document, "S010", "S010010", "bad id").unwrap_err();
        assert!(matches!(err, Error::InvalidId(_)));
        assert_eq!(document, before);
    }

    #[test]
    fn test_rename_item_rejects_descendant_clash() {
        let mut document = Document::new(vec![category(
            "S010",
            1,
            vec![
                item("S010010", 1, vec![item("S010010010", 1, vec![])]),
                item("S010020", 2, vec![item("S010090010", 1, vec![])]),
            ],
        )]);
        let before = document.clone();
        let err = rename_item(&mut document, "S010", "S010010", "S010090").unwrap_err();
        assert!(matches!(err, Error::DuplicateId(id) if id == "S010090010"));
        assert_eq!(document, before);
        assert!(validate_document(&document).is_empty());
    }

    #[test]
    fn test_rename_category_renumbers_items() {
        let mut document = sample();
        document.topics[1].groups.push(item("S020020", 2, vec![]));
        rename_category(&mut document, "S020", "S999").unwrap();
        assert_eq!(root_ids(&document, "S999"), vec!["S999010", "S999020"]);
        assert!(document.category("S020").is_none());
    }

    #[test]
    fn test_rename_category_rejects_duplicate() {
        let mut document = sample();
        let err = rename_category(&mut document, "S020", "S010").unwrap_err();
        assert!(matches!(err, Error::DuplicateId(_)));
        let err = rename_category(&mut document, "S404", "S500").unwrap_err();
        assert!(matches!(err, Error::CategoryNotFound(_)));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Ordering
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_set_item_ordering_roundtrip() {
        let mut document = sample();
        let index = set_item_ordering(&mut document, "S010", "S010030", OrderingChange::Alphabetical)
            .unwrap();
        assert_eq!(index, 2);
        let item = document.category("S010").unwrap().find_item("S010030").unwrap();
        assert!(item.ordering.is_alphabetical());

        let index =
            set_item_ordering(&mut document, "S010", "S010030", OrderingChange::Fixed(Some(1)))
                .unwrap();
        assert_eq!(index, 0);
        assert_eq!(root_ids(&document, "S010"), vec!["S010030", "S010010", "S010020"]);
        assert!(validate_document(&document).is_empty());
    }

    #[test]
    fn test_set_item_ordering_missing_item() {
        let mut document = sample();
        let err = set_item_ordering(&mut document, "S010", "nope", OrderingChange::Fixed(None))
            .unwrap_err();
        assert!(matches!(err, Error::ItemNotFound { .. }));
    }
}
