//! Editor state management for Topiary
//!
//! `EditorState` owns one open document: the text buffer that is the
//! authoritative serialized form, the stored JSON it was parsed from (so
//! fields the engine does not own survive a save), the canonical tree, the
//! tree-view state and the user settings.
//!
//! Tree edits go through [`EditorState::apply`]: the operation runs against
//! the tree and, on success, the tree is written back into the buffer. A
//! buffer that does not parse leaves the state without a tree; the text stays
//! editable and tree edits fail with [`Error::NoDocument`].

use crate::config::Settings;
use crate::diff::{diff_lines_with_window, DiffRow};
use crate::error::{Error, Result};
use crate::model::{Category, Document, Item, Localized};
use crate::normalize::{denormalize, parse_document, to_pretty_json, ContentType};
use crate::tree::{
    self, renumber_document, validate_document, DropPosition, ItemRef, MoveOutcome,
    OrderingChange, RegenerationPrompt, Violation,
};
use crate::view_state::EditorViewState;
use log::{debug, info, warn};
use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Editor State
// ─────────────────────────────────────────────────────────────────────────────

/// One open document and everything the editor keeps about it.
#[derive(Debug, Clone)]
pub struct EditorState {
    content_type: ContentType,
    /// Serialized document, as shown in the raw editor
    buffer: String,
    /// Buffer contents at the last load or save
    saved_buffer: String,
    /// Stored JSON the tree is merged back into
    raw: Value,
    /// Canonical tree; `None` while the buffer does not parse
    document: Option<Document>,
    /// Message of the last parse failure
    parse_error: Option<String>,
    view: EditorViewState,
    settings: Settings,
}

impl EditorState {
    /// Create an empty editor for `content_type`.
    pub fn new(content_type: ContentType, settings: Settings) -> Self {
        Self {
            content_type,
            buffer: String::new(),
            saved_buffer: String::new(),
            raw: Value::Null,
            document: Some(Document::default()),
            parse_error: None,
            view: EditorViewState::new(),
            settings,
        }
    }

    /// Create an editor with `text` loaded, using the settings' default
    /// content type.
    pub fn with_text(settings: Settings, text: &str) -> Self {
        let mut state = Self::new(settings.default_content_type, settings);
        state.load(text);
        state
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Buffer
    // ─────────────────────────────────────────────────────────────────────────

    /// Replace the buffer with freshly loaded text and forget view state.
    ///
    /// Returns false if the text holds no parsable document.
    pub fn load(&mut self, text: &str) -> bool {
        self.buffer = text.to_string();
        self.saved_buffer = self.buffer.clone();
        self.view = EditorViewState::new();
        let parsed = self.reparse();
        info!(
            "Loaded {} document ({} bytes, parsed: {})",
            self.content_type,
            text.len(),
            parsed
        );
        parsed
    }

    /// Replace the buffer after a raw text edit and re-parse it.
    pub fn set_buffer(&mut self, text: String) -> bool {
        if text == self.buffer {
            return self.document.is_some();
        }
        self.buffer = text;
        self.reparse()
    }

    /// Switch the content type and re-read the buffer with the new shape.
    pub fn set_content_type(&mut self, content_type: ContentType) -> bool {
        self.content_type = content_type;
        self.reparse()
    }

    fn reparse(&mut self) -> bool {
        match parse_document(self.content_type, &self.buffer) {
            Ok((raw, document)) => {
                self.raw = raw;
                self.document = Some(document);
                self.parse_error = None;
                true
            }
            Err(e) => {
                warn!("Buffer does not hold a {} document: {}", self.content_type, e);
                self.document = None;
                self.parse_error = Some(e.to_string());
                false
            }
        }
    }

    /// Write the tree back into the stored JSON and the buffer.
    fn sync_buffer(&mut self) -> Result<()> {
        let document = self.document.as_ref().ok_or(Error::NoDocument)?;
        let raw = denormalize(self.content_type, document, &self.raw)?;
        self.buffer = to_pretty_json(&raw, self.settings.json_indent)?;
        self.raw = raw;
        Ok(())
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn parse_error(&self) -> Option<&str> {
        self.parse_error.as_deref()
    }

    pub fn view(&self) -> &EditorViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut EditorViewState {
        &mut self.view
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Check if the buffer has unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.buffer != self.saved_buffer
    }

    /// Mark the current buffer as saved.
    pub fn mark_saved(&mut self) {
        self.saved_buffer = self.buffer.clone();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Tree Edits
    // ─────────────────────────────────────────────────────────────────────────

    /// Run a tree operation and, if it succeeds, re-serialize the buffer.
    pub fn apply<T>(&mut self, op: impl FnOnce(&mut Document) -> Result<T>) -> Result<T> {
        let document = self.document.as_mut().ok_or(Error::NoDocument)?;
        let value = op(document)?;
        self.sync_buffer()?;
        Ok(value)
    }

    /// Insert a new item with the given labels. Its id lock follows the
    /// `lock_new_item_ids` setting.
    pub fn add_item(
        &mut self,
        category_id: &str,
        parent_id: Option<&str>,
        translations: Localized,
    ) -> Result<String> {
        let item = Item {
            translations,
            lock_id_on_sort: self.settings.lock_new_item_ids,
            ..Item::default()
        };
        self.insert_item(category_id, parent_id, item)
    }

    /// Insert a prepared item (and any children it carries).
    pub fn insert_item(
        &mut self,
        category_id: &str,
        parent_id: Option<&str>,
        item: Item,
    ) -> Result<String> {
        self.apply(|document| tree::insert_item(document, category_id, parent_id, item))
    }

    /// Insert a new, empty category with the given labels.
    pub fn add_category(&mut self, translations: Localized) -> Result<String> {
        self.insert_category(Category::new("", translations))
    }

    pub fn insert_category(&mut self, category: Category) -> Result<String> {
        self.apply(|document| Ok(tree::insert_category(document, category)))
    }

    pub fn delete_item(&mut self, category_id: &str, item_id: &str) -> Result<Item> {
        let removed = self.apply(|document| tree::delete_item(document, category_id, item_id))?;
        self.view.forget_items(removed.subtree_ids());
        Ok(removed)
    }

    pub fn delete_category(&mut self, category_id: &str) -> Result<Category> {
        let removed = self.apply(|document| tree::delete_category(document, category_id))?;
        self.view.forget_category(category_id);
        Ok(removed)
    }

    /// Move an item. The new category and any regenerated id are carried
    /// over into the view state.
    pub fn move_item(
        &mut self,
        source: ItemRef<'_>,
        target: ItemRef<'_>,
        position: DropPosition,
        prompt: &mut dyn RegenerationPrompt,
    ) -> Result<MoveOutcome> {
        let outcome =
            self.apply(|document| tree::move_item(document, source, target, position, prompt))?;
        self.view.remap_item_move(
            source.category,
            source.item,
            &outcome.category,
            &outcome.item_id,
        );
        Ok(outcome)
    }

    pub fn move_category(
        &mut self,
        source_id: &str,
        target_id: &str,
        position: DropPosition,
    ) -> Result<()> {
        self.apply(|document| tree::move_category(document, source_id, target_id, position))
    }

    pub fn rename_item(&mut self, category_id: &str, old_id: &str, new_id: &str) -> Result<()> {
        self.apply(|document| tree::rename_item(document, category_id, old_id, new_id))?;
        self.view.remap_item_rename(old_id, new_id);
        Ok(())
    }

    pub fn rename_category(&mut self, old_id: &str, new_id: &str) -> Result<()> {
        self.apply(|document| tree::rename_category(document, old_id, new_id))?;
        self.view.remap_category_rename(old_id, new_id);
        Ok(())
    }

    pub fn set_item_ordering(
        &mut self,
        category_id: &str,
        item_id: &str,
        change: OrderingChange,
    ) -> Result<usize> {
        self.apply(|document| tree::set_item_ordering(document, category_id, item_id, change))
    }

    /// Renumber every sibling array and rewrite the buffer.
    pub fn renumber(&mut self) -> Result<()> {
        self.apply(|document| {
            renumber_document(document);
            Ok(())
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inspection
    // ─────────────────────────────────────────────────────────────────────────

    /// Audit the tree. Fails with `NoDocument` while the buffer does not parse.
    pub fn validate(&self) -> Result<Vec<Violation>> {
        self.document
            .as_ref()
            .map(validate_document)
            .ok_or(Error::NoDocument)
    }

    /// Diff a stored revision (left) against the current buffer (right).
    pub fn diff_against(&self, revision: &str) -> Vec<DiffRow> {
        let old: Vec<&str> = revision.lines().collect();
        let new: Vec<&str> = self.buffer.lines().collect();
        debug!(
            "Diffing revision ({} lines) against buffer ({} lines)",
            old.len(),
            new.len()
        );
        diff_lines_with_window(&old, &new, self.settings.diff_lookahead)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
