//! Field-level description of the persisted shapes and the JSON rewrites
//! between them and the canonical layout (`groups` under categories,
//! `children` under items).

use super::json_type;
use crate::error::{Error, Result};
use serde_json::{Map, Value};

const CANONICAL_CATEGORY_ITEMS: &str = "groups";
const CANONICAL_ITEM_CHILDREN: &str = "children";

/// How one content type lays out its tree.
#[derive(Debug)]
pub(super) struct Shape {
    /// Top-level key holding the category list
    pub list_key: &'static str,
    /// Keys that may hold a category's items; the first is written back
    category_items: &'static [&'static str],
    /// Keys that may hold an item's children; the first is written back
    item_children: &'static [&'static str],
    /// Display-only category fields dropped on read
    category_cosmetic: &'static [&'static str],
    /// Display-only item fields dropped on read
    item_cosmetic: &'static [&'static str],
}

pub(super) static TOPICS: Shape = Shape {
    list_key: "topics",
    category_items: &["groups", "children"],
    item_children: &["groups", "children"],
    category_cosmetic: &["name"],
    item_cosmetic: &["groupname"],
};

pub(super) static FILTERS: Shape = Shape {
    list_key: "filters",
    category_items: &["choices"],
    item_children: &["choices"],
    category_cosmetic: &[],
    item_cosmetic: &[],
};

impl Shape {
    /// Rewrite a stored category into the canonical layout.
    pub fn canonical_category(&self, value: &Value) -> Result<Value> {
        let mut fields = object_fields(value, "category")?;
        for key in self.category_cosmetic {
            fields.remove(*key);
        }
        let items = take_list(&mut fields, self.category_items)?
            .iter()
            .map(|item| self.canonical_item(item))
            .collect::<Result<Vec<_>>>()?;
        fields.insert(CANONICAL_CATEGORY_ITEMS.to_string(), Value::Array(items));
        Ok(Value::Object(fields))
    }

    fn canonical_item(&self, value: &Value) -> Result<Value> {
        let mut fields = object_fields(value, "item")?;
        for key in self.item_cosmetic {
            fields.remove(*key);
        }
        let children = take_list(&mut fields, self.item_children)?
            .iter()
            .map(|child| self.canonical_item(child))
            .collect::<Result<Vec<_>>>()?;
        fields.insert(CANONICAL_ITEM_CHILDREN.to_string(), Value::Array(children));
        Ok(Value::Object(fields))
    }

    /// Rewrite a canonical category into this shape.
    pub fn persisted_category(&self, value: Value) -> Value {
        self.rename_list(value, CANONICAL_CATEGORY_ITEMS, self.category_items[0])
    }

    fn persisted_item(&self, value: Value) -> Value {
        self.rename_list(value, CANONICAL_ITEM_CHILDREN, self.item_children[0])
    }

    fn rename_list(&self, value: Value, from: &str, to: &str) -> Value {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => return other,
        };
        let list = match fields.remove(from) {
            Some(Value::Array(list)) => list,
            _ => Vec::new(),
        };
        let persisted = list.into_iter().map(|v| self.persisted_item(v)).collect();
        fields.insert(to.to_string(), Value::Array(persisted));
        Value::Object(fields)
    }
}

fn object_fields(value: &Value, what: &str) -> Result<Map<String, Value>> {
    match value {
        Value::Object(fields) => Ok(fields.clone()),
        other => Err(Error::Shape(format!(
            "each {} must be an object, found {}",
            what,
            json_type(other)
        ))),
    }
}

/// Remove every key in `keys` and return the list under the first present.
fn take_list(fields: &mut Map<String, Value>, keys: &[&str]) -> Result<Vec<Value>> {
    let mut found = None;
    for key in keys {
        if let Some(value) = fields.remove(*key) {
            if found.is_none() {
                found = Some((*key, value));
            }
        }
    }
    match found {
        None | Some((_, Value::Null)) => Ok(Vec::new()),
        Some((_, Value::Array(list))) => Ok(list),
        Some((key, other)) => Err(Error::Shape(format!(
            "'{}' must be an array, found {}",
            key,
            json_type(&other)
        ))),
    }
}
