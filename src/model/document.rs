//! Document, category and item types.

use super::SortKey;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─────────────────────────────────────────────────────────────────────────────
// Shared Value Types
// ─────────────────────────────────────────────────────────────────────────────

/// A text translated into every supported language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Localized {
    pub dk: String,
    pub en: String,
}

impl Localized {
    pub fn new(dk: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            dk: dk.into(),
            en: en.into(),
        }
    }
}

/// Search strings of an item, per search scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchStrings {
    pub narrow: Vec<String>,
    pub normal: Vec<String>,
    pub broad: Vec<String>,
}

impl SearchStrings {
    pub fn is_empty(&self) -> bool {
        self.narrow.is_empty() && self.normal.is_empty() && self.broad.is_empty()
    }
}

fn default_true() -> bool {
    true
}

// ─────────────────────────────────────────────────────────────────────────────
// Item
// ─────────────────────────────────────────────────────────────────────────────

/// A node of a category tree. Items with children are branches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    #[serde(default)]
    pub translations: Localized,
    #[serde(default)]
    pub tooltip: Localized,
    #[serde(default)]
    pub search_strings: SearchStrings,
    #[serde(default)]
    pub search_string_comment: Localized,
    #[serde(default)]
    pub ordering: SortKey,
    /// When false, structural moves offer to regenerate the id.
    #[serde(default = "default_true")]
    pub lock_id_on_sort: bool,
    #[serde(default)]
    pub hidden_by_default: bool,
    #[serde(default)]
    pub buttons: bool,
    #[serde(default)]
    pub children: Vec<Item>,
    /// Stored fields the engine does not interpret, written back unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Item {
    fn default() -> Self {
        Self {
            id: String::new(),
            translations: Localized::default(),
            tooltip: Localized::default(),
            search_strings: SearchStrings::default(),
            search_string_comment: Localized::default(),
            ordering: SortKey::default(),
            lock_id_on_sort: true,
            hidden_by_default: false,
            buttons: false,
            children: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl Item {
    /// Create an id-less item with the given labels, ready for insertion.
    pub fn with_label(dk: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            translations: Localized::new(dk, en),
            ..Self::default()
        }
    }

    /// Visit this item and every descendant, depth first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Item)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Check whether `id` names this item or one of its descendants.
    pub fn subtree_contains(&self, id: &str) -> bool {
        self.id == id || self.children.iter().any(|c| c.subtree_contains(id))
    }

    /// Ids of this item and all descendants.
    pub fn subtree_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        self.walk(&mut |item| ids.push(item.id.as_str()));
        ids
    }

    /// Number of items in this subtree, including this one.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Item::subtree_len).sum::<usize>()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Category
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level grouping node directly under the document root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    #[serde(default)]
    pub translations: Localized,
    #[serde(default)]
    pub tooltip: Localized,
    #[serde(default)]
    pub ordering: SortKey,
    #[serde(default)]
    pub hidden_by_default: bool,
    #[serde(default)]
    pub groups: Vec<Item>,
    /// Stored fields the engine does not interpret, written back unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Category {
    pub fn new(id: impl Into<String>, translations: Localized) -> Self {
        Self {
            id: id.into(),
            translations,
            tooltip: Localized::default(),
            ordering: SortKey::default(),
            hidden_by_default: false,
            groups: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Find an item anywhere in this category.
    pub fn find_item(&self, id: &str) -> Option<&Item> {
        let path = self.locate(id)?;
        self.item_at(&path)
    }

    /// Find an item anywhere in this category, mutably.
    pub fn find_item_mut(&mut self, id: &str) -> Option<&mut Item> {
        let path = self.locate(id)?;
        self.item_at_mut(&path)
    }

    /// Index path from `groups` down to the item with this id.
    pub fn locate(&self, id: &str) -> Option<Vec<usize>> {
        fn search(items: &[Item], id: &str, path: &mut Vec<usize>) -> bool {
            for (index, item) in items.iter().enumerate() {
                path.push(index);
                if item.id == id || search(&item.children, id, path) {
                    return true;
                }
                path.pop();
            }
            false
        }

        let mut path = Vec::new();
        search(&self.groups, id, &mut path).then_some(path)
    }

    /// Item at an index path.
    pub fn item_at(&self, path: &[usize]) -> Option<&Item> {
        let (first, rest) = path.split_first()?;
        let mut item = self.groups.get(*first)?;
        for index in rest {
            item = item.children.get(*index)?;
        }
        Some(item)
    }

    /// Item at an index path, mutably.
    pub fn item_at_mut(&mut self, path: &[usize]) -> Option<&mut Item> {
        let (first, rest) = path.split_first()?;
        let mut item = self.groups.get_mut(*first)?;
        for index in rest {
            item = item.children.get_mut(*index)?;
        }
        Some(item)
    }

    /// The sibling array that holds the children of `parent_path`
    /// (`groups` for the empty path).
    pub fn siblings_mut(&mut self, parent_path: &[usize]) -> Option<&mut Vec<Item>> {
        if parent_path.is_empty() {
            Some(&mut self.groups)
        } else {
            self.item_at_mut(parent_path).map(|item| &mut item.children)
        }
    }

    /// Check whether any item other than `exclude_id` already uses `id`.
    pub fn has_item_id(&self, id: &str, exclude_id: &str) -> bool {
        let mut found = false;
        for root in &self.groups {
            root.walk(&mut |item| {
                if item.id == id && item.id != exclude_id {
                    found = true;
                }
            });
        }
        found
    }

    /// Every item id in this category, depth first.
    pub fn item_ids(&self) -> Vec<&str> {
        self.groups.iter().flat_map(Item::subtree_ids).collect()
    }

    /// Number of items in this category.
    pub fn item_count(&self) -> usize {
        self.groups.iter().map(Item::subtree_len).sum()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Document
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered list of categories; the canonical tree the engine edits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub topics: Vec<Category>,
}

impl Document {
    pub fn new(topics: Vec<Category>) -> Self {
        Self { topics }
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.topics.iter().find(|c| c.id == id)
    }

    pub fn category_mut(&mut self, id: &str) -> Option<&mut Category> {
        self.topics.iter_mut().find(|c| c.id == id)
    }

    pub fn category_index(&self, id: &str) -> Option<usize> {
        self.topics.iter().position(|c| c.id == id)
    }

    pub fn has_category_id(&self, id: &str) -> bool {
        self.topics.iter().any(|c| c.id == id)
    }

    /// Total number of items across all categories.
    pub fn item_count(&self) -> usize {
        self.topics.iter().map(Category::item_count).sum()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: &str, children: Vec<Item>) -> Item {
        Item {
            id: id.to_string(),
            children,
            ..Item::default()
        }
    }

    fn sample_category() -> Category {
        let mut category = Category::new("S020", Localized::new("Diabetes", "Diabetes"));
        category.groups = vec![
            item("S020010", vec![item("S020010010", vec![]), item("S020010020", vec![])]),
            item("S020020", vec![]),
        ];
        category
    }

    #[test]
    fn test_item_defaults_lock_id() {
        assert!(Item::default().lock_id_on_sort);
        let parsed: Item = serde_json::from_value(json!({"id": "S010010"})).unwrap();
        assert!(parsed.lock_id_on_sort);
        assert!(parsed.ordering.is_alphabetical());
        assert!(parsed.search_strings.is_empty());
    }

    #[test]
    fn test_unknown_fields_survive_roundtrip() {
        let stored = json!({
            "id": "S010010",
            "maintopic": true,
            "subtopiclevel": 1,
            "children": [{"id": "S010010010", "note": "keep"}]
        });
        let parsed: Item = serde_json::from_value(stored).unwrap();
        assert_eq!(parsed.extra.get("maintopic"), Some(&json!(true)));
        assert!(!parsed.extra.contains_key("children"));

        let value = serde_json::to_value(&parsed).unwrap();
        assert_eq!(value["maintopic"], json!(true));
        assert_eq!(value["subtopiclevel"], json!(1));
        assert_eq!(value["children"][0]["note"], json!("keep"));
    }

    #[test]
    fn test_item_serializes_camel_case() {
        let value = serde_json::to_value(Item::with_label("Insulin", "Insulin")).unwrap();
        assert!(value.get("lockIdOnSort").is_some());
        assert!(value.get("searchStringComment").is_some());
        assert!(value.get("hiddenByDefault").is_some());
    }

    #[test]
    fn test_locate_nested_item() {
        let category = sample_category();
        assert_eq!(category.locate("S020010020"), Some(vec![0, 1]));
        assert_eq!(category.locate("S020020"), Some(vec![1]));
        assert_eq!(category.locate("S020999"), None);
    }

    #[test]
    fn test_has_item_id_respects_exclusion() {
        let category = sample_category();
        assert!(category.has_item_id("S020010010", ""));
        assert!(!category.has_item_id("S020010010", "S020010010"));
        assert!(!category.has_item_id("S020030", ""));
    }

    #[test]
    fn test_subtree_queries() {
        let category = sample_category();
        let branch = category.find_item("S020010").unwrap();
        assert!(branch.subtree_contains("S020010020"));
        assert!(!branch.subtree_contains("S020020"));
        assert_eq!(branch.subtree_len(), 3);
        assert_eq!(category.item_count(), 4);
        assert_eq!(
            category.item_ids(),
            vec!["S020010", "S020010010", "S020010020", "S020020"]
        );
    }

    #[test]
    fn test_document_lookup() {
        let document = Document::new(vec![sample_category()]);
        assert!(document.has_category_id("S020"));
        assert_eq!(document.category_index("S020"), Some(0));
        assert!(document.category("S030").is_none());
        assert_eq!(document.item_count(), 4);
    }
}
