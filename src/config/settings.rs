//! User settings and preferences for Topiary
//!
//! This module defines the `Settings` struct that holds all user-configurable
//! options, with serde support for JSON persistence.

use crate::diff::LOOKAHEAD_WINDOW;
use crate::normalize::ContentType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// Application settings persisted between sessions.
///
/// All fields have sensible defaults via `#[serde(default)]`, so partial
/// or outdated config files still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Documents
    /// Content type assumed when none is given
    pub default_content_type: ContentType,

    /// Recently opened documents (most recent first)
    pub recent_documents: Vec<PathBuf>,

    /// Maximum number of recent documents to remember
    pub max_recent_documents: usize,

    // Editing
    /// Initial `lockIdOnSort` of newly inserted items
    pub lock_new_item_ids: bool,

    /// Spaces per indentation level when re-serializing the buffer
    pub json_indent: usize,

    // Revisions
    /// Lines the revision diff searches ahead for a resync point
    pub diff_lookahead: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_content_type: ContentType::Topics,
            recent_documents: Vec::new(),
            max_recent_documents: 10,
            lock_new_item_ids: true,
            json_indent: 2,
            diff_lookahead: LOOKAHEAD_WINDOW,
        }
    }
}

impl Settings {
    /// Minimum diff lookahead
    pub const MIN_DIFF_LOOKAHEAD: usize = 1;
    /// Maximum diff lookahead
    pub const MAX_DIFF_LOOKAHEAD: usize = 500;
    /// Maximum JSON indentation
    pub const MAX_JSON_INDENT: usize = 8;
    /// Maximum recent documents
    pub const MAX_RECENT_DOCUMENTS: usize = 100;

    /// Add a document to the recent documents list.
    ///
    /// If the document already exists in the list, it's moved to the front.
    /// The list is trimmed to `max_recent_documents`.
    pub fn add_recent_document(&mut self, path: PathBuf) {
        self.recent_documents.retain(|p| p != &path);
        self.recent_documents.insert(0, path);
        self.recent_documents.truncate(self.max_recent_documents);
    }

    /// Validate and sanitize settings after loading.
    ///
    /// Clamps values that may have been edited by hand into valid ranges.
    pub fn sanitize(&mut self) {
        self.diff_lookahead = self
            .diff_lookahead
            .clamp(Self::MIN_DIFF_LOOKAHEAD, Self::MAX_DIFF_LOOKAHEAD);
        self.json_indent = self.json_indent.min(Self::MAX_JSON_INDENT);

        if self.max_recent_documents == 0 {
            self.max_recent_documents = 10;
        } else if self.max_recent_documents > Self::MAX_RECENT_DOCUMENTS {
            self.max_recent_documents = Self::MAX_RECENT_DOCUMENTS;
        }
        self.recent_documents.truncate(self.max_recent_documents);
    }

    /// Load settings and sanitize them to ensure validity.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
