//! Hierarchical id scheme.
//!
//! An item id is its parent's id followed by a three-digit segment encoding
//! the 1-based sibling position in steps of ten: the second root item of
//! category `S020` is `S020020`, its first child `S020020010`. Other tooling
//! associates search strings by these ids, so the textual format is fixed.

use crate::model::{Category, Document, Item};
use regex::Regex;
use std::sync::OnceLock;

/// Distance between the numeric segments of consecutive siblings.
pub const ID_STEP: usize = 10;

/// Width of one numeric id segment.
const SEGMENT_WIDTH: usize = 3;

/// Prefix used when no existing category id can be parsed.
const DEFAULT_CATEGORY_PREFIX: &str = "S";

fn id_format() -> &'static Regex {
    static ID_FORMAT: OnceLock<Regex> = OnceLock::new();
    ID_FORMAT.get_or_init(|| Regex::new(r"^[A-Za-z]+[0-9]{3,}([0-9]{3})*$").expect("valid id regex"))
}

fn category_id_parts() -> &'static Regex {
    static CATEGORY_ID: OnceLock<Regex> = OnceLock::new();
    CATEGORY_ID.get_or_init(|| Regex::new(r"^([A-Za-z]+)([0-9]+)$").expect("valid category id regex"))
}

/// Check an id against the hierarchical id format.
pub fn is_valid_id(id: &str) -> bool {
    id_format().is_match(id)
}

/// Id for the child at `sibling_index` (0-based) under `parent_id`.
pub fn generate_id(parent_id: &str, sibling_index: usize) -> String {
    format!(
        "{}{:0width$}",
        parent_id,
        ID_STEP * (sibling_index + 1),
        width = SEGMENT_WIDTH
    )
}

/// First generated id at or after `sibling_index` that no item in the
/// category uses, ignoring the item currently named `exclude_id`.
pub fn build_unique_id(
    category: &Category,
    parent_id: &str,
    sibling_index: usize,
    exclude_id: &str,
) -> String {
    let mut index = sibling_index;
    loop {
        let candidate = generate_id(parent_id, index);
        if !category.has_item_id(&candidate, exclude_id) {
            return candidate;
        }
        index += 1;
    }
}

/// Propose an id for a new category.
///
/// Existing ids are read as `letters + digits`; the proposal continues the
/// prefix of the highest number, ten higher, keeping its digit width.
pub fn build_next_category_id(document: &Document) -> String {
    let mut highest: Option<(u64, &str, usize)> = None;
    for category in &document.topics {
        let Some(caps) = category_id_parts().captures(&category.id) else {
            continue;
        };
        let (Some(prefix), Some(digits)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let Ok(number) = digits.as_str().parse::<u64>() else {
            continue;
        };
        if highest.map_or(true, |(max, _, _)| number > max) {
            highest = Some((number, prefix.as_str(), digits.as_str().len()));
        }
    }

    let (max, prefix, width) = highest.unwrap_or((0, DEFAULT_CATEGORY_PREFIX, SEGMENT_WIDTH));
    let width = width.max(SEGMENT_WIDTH);
    if let Some(candidate) = next_free_category_id(document, prefix, max, width) {
        return candidate;
    }
    // The highest number sits at the top of the range; restart the default series.
    next_free_category_id(document, DEFAULT_CATEGORY_PREFIX, 0, SEGMENT_WIDTH)
        .unwrap_or_else(|| generate_id(DEFAULT_CATEGORY_PREFIX, 0))
}

/// First free `prefix + number` above `after`, stepping by ten.
fn next_free_category_id(
    document: &Document,
    prefix: &str,
    after: u64,
    width: usize,
) -> Option<String> {
    let mut next = after.checked_add(ID_STEP as u64);
    while let Some(number) = next {
        let candidate = format!("{}{:0width$}", prefix, number, width = width);
        if !document.has_category_id(&candidate) {
            return Some(candidate);
        }
        next = number.checked_add(ID_STEP as u64);
    }
    None
}

/// Swap the `old_prefix` of every id in these subtrees for `new_prefix`.
/// Ids that do not start with `old_prefix` are left alone.
pub fn update_child_ids_by_prefix(items: &mut [Item], old_prefix: &str, new_prefix: &str) {
    for item in items {
        if let Some(suffix) = item.id.strip_prefix(old_prefix) {
            item.id = format!("{}{}", new_prefix, suffix);
        }
        update_child_ids_by_prefix(&mut item.children, old_prefix, new_prefix);
    }
}

/// Give a category a new id and regenerate every item id beneath it from
/// the current structure.
pub fn renumber_category_ids(category: &mut Category, new_id: &str) {
    category.id = new_id.to_string();
    assign_ids(&mut category.groups, new_id);
}

/// Regenerate the ids of all descendants of `item` from its own id.
pub fn renumber_descendant_ids(item: &mut Item) {
    assign_ids(&mut item.children, &item.id);
}

fn assign_ids(items: &mut [Item], parent_id: &str) {
    for (index, item) in items.iter_mut().enumerate() {
        item.id = generate_id(parent_id, index);
        assign_ids(&mut item.children, &item.id);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
