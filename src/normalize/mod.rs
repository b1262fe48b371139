//! Conversion between persisted documents and the canonical tree
//!
//! Content domains store their taxonomies in one of two JSON shapes:
//! - **topics**: `{ "topics": [...] }`, nesting every level under `groups`
//!   and carrying cosmetic `name`/`groupname` fields
//! - **filters**: `{ "filters": [...], ... }`, nesting every level under
//!   `choices` next to unrelated top-level fields
//!
//! `normalize` reads either shape into a [`Document`]; `denormalize` writes a
//! document back into the stored JSON, keeping every top-level field it does
//! not own.

mod shape;

use crate::error::{Error, Result};
use crate::model::Document;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shape::Shape;
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Content Type
// ─────────────────────────────────────────────────────────────────────────────

/// Persisted shape of a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Topics,
    Filters,
}

impl ContentType {
    /// Parse the `type` discriminator used by the content store.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "topics" => Some(Self::Topics),
            "filters" => Some(Self::Filters),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Topics => "topics",
            Self::Filters => "filters",
        }
    }

    fn shape(&self) -> &'static Shape {
        match self {
            Self::Topics => &shape::TOPICS,
            Self::Filters => &shape::FILTERS,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Normalize / Denormalize
// ─────────────────────────────────────────────────────────────────────────────

/// Read a stored document into the canonical tree.
///
/// A missing or `null` list yields an empty document.
pub fn normalize(content_type: ContentType, raw: &Value) -> Result<Document> {
    let shape = content_type.shape();
    let root = match raw {
        Value::Object(root) => root,
        Value::Null => return Ok(Document::default()),
        other => {
            return Err(Error::Shape(format!(
                "expected a JSON object at the root, found {}",
                json_type(other)
            )))
        }
    };

    let categories = match root.get(shape.list_key) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(list)) => list
            .iter()
            .map(|category| shape.canonical_category(category))
            .collect::<Result<Vec<_>>>()?,
        Some(other) => {
            return Err(Error::Shape(format!(
                "'{}' must be an array, found {}",
                shape.list_key,
                json_type(other)
            )))
        }
    };

    let document: Document = serde_json::from_value(serde_json::json!({ "topics": categories }))
        .map_err(|e| Error::Shape(e.to_string()))?;
    debug!(
        "Normalized {} document: {} categories, {} items",
        content_type,
        document.topics.len(),
        document.item_count()
    );
    Ok(document)
}

/// Write the canonical tree back into the stored document.
///
/// The list key owned by `content_type` is replaced; every other top-level
/// field of `current_raw` is kept. A non-object `current_raw` starts fresh.
pub fn denormalize(
    content_type: ContentType,
    document: &Document,
    current_raw: &Value,
) -> Result<Value> {
    let shape = content_type.shape();
    let categories = match serde_json::to_value(&document.topics)? {
        Value::Array(list) => list,
        other => {
            return Err(Error::Shape(format!(
                "categories serialized to {}",
                json_type(&other)
            )))
        }
    };
    let persisted = categories
        .into_iter()
        .map(|category| shape.persisted_category(category))
        .collect();

    let mut root = match current_raw {
        Value::Object(root) => root.clone(),
        _ => serde_json::Map::new(),
    };
    root.insert(shape.list_key.to_string(), Value::Array(persisted));
    Ok(Value::Object(root))
}

// ─────────────────────────────────────────────────────────────────────────────
// Text Boundary
// ─────────────────────────────────────────────────────────────────────────────

/// Parse a text buffer into the stored JSON and its canonical tree.
pub fn parse_document(content_type: ContentType, text: &str) -> Result<(Value, Document)> {
    let raw: Value = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(text)?
    };
    let document = normalize(content_type, &raw)?;
    Ok((raw, document))
}

/// Pretty-print stored JSON with `indent` spaces per level.
pub fn to_pretty_json(value: &Value, indent: usize) -> Result<String> {
    let indent = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    String::from_utf8(out).map_err(|e| Error::Shape(e.to_string()))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
