//! Invariant audit for whole documents.

use super::ids::is_valid_id;
use super::ordering::is_consistent;
use crate::model::{Category, Document, Item, SortKey};
use std::collections::HashSet;
use std::fmt;

/// A broken document invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Two categories share an id
    DuplicateCategoryId(String),
    /// Two items in one category share an id
    DuplicateItemId { category: String, id: String },
    /// An id does not follow the hierarchical id format
    MalformedId(String),
    /// Fixed sort keys of a sibling array do not match structural positions
    OrderingOutOfSync { parent: String },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::DuplicateCategoryId(id) => write!(f, "duplicate category id '{}'", id),
            Violation::DuplicateItemId { category, id } => {
                write!(f, "duplicate item id '{}' in category '{}'", id, category)
            }
            Violation::MalformedId(id) => write!(f, "malformed id '{}'", id),
            Violation::OrderingOutOfSync { parent } => {
                write!(f, "ordering of the children of '{}' is out of sync", parent)
            }
        }
    }
}

/// Collect every invariant violation in the document.
pub fn validate_document(document: &Document) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut category_ids = HashSet::new();

    for category in &document.topics {
        if !category_ids.insert(category.id.as_str()) {
            violations.push(Violation::DuplicateCategoryId(category.id.clone()));
        }
        if !is_valid_id(&category.id) {
            violations.push(Violation::MalformedId(category.id.clone()));
        }
        validate_category(category, &mut violations);
    }

    let categories_in_sync = document
        .topics
        .iter()
        .enumerate()
        .all(|(index, c)| c.ordering == SortKey::Fixed(index as u32 + 1));
    if !categories_in_sync {
        violations.push(Violation::OrderingOutOfSync {
            parent: "document".to_string(),
        });
    }

    violations
}

fn validate_category(category: &Category, violations: &mut Vec<Violation>) {
    let mut seen = HashSet::new();
    for item in &category.groups {
        item.walk(&mut |node| {
            if !seen.insert(node.id.as_str()) {
                violations.push(Violation::DuplicateItemId {
                    category: category.id.clone(),
                    id: node.id.clone(),
                });
            }
            if !is_valid_id(&node.id) {
                violations.push(Violation::MalformedId(node.id.clone()));
            }
        });
    }
    validate_siblings(&category.id, &category.groups, violations);
}

fn validate_siblings(parent: &str, siblings: &[Item], violations: &mut Vec<Violation>) {
    if !is_consistent(siblings) {
        violations.push(Violation::OrderingOutOfSync {
            parent: parent.to_string(),
        });
    }
    for item in siblings {
        validate_siblings(&item.id, &item.children, violations);
    }
}
