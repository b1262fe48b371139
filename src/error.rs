//! Centralized error handling for Topiary
//!
//! This module provides a unified error type that covers all error scenarios
//! in the engine: tree lookups against stale state, invariant violations,
//! malformed document buffers, file I/O, and configuration.

use crate::tree::DropPosition;
use log::warn;
use std::fmt;
use std::io;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Custom Result Type Alias
// ─────────────────────────────────────────────────────────────────────────────

/// A specialized `Result` type for the engine.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`].
///
/// Callers (usually the UI layer) decide how to react based on the kind:
/// structural errors mean the caller acted on stale state, invariant
/// violations are user mistakes, parse errors mean the buffer holds no tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Structural,
    Invariant,
    Parse,
    Io,
    Config,
}

/// The centralized error type for the engine.
#[derive(Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Structural Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// No category with this id exists in the document
    CategoryNotFound(String),

    /// No item with this id exists in the category subtree
    ItemNotFound { category: String, item: String },

    // ─────────────────────────────────────────────────────────────────────────
    // Invariant Violations
    // ─────────────────────────────────────────────────────────────────────────
    /// The id is already used by another node in the same scope
    DuplicateId(String),

    /// The id does not follow the hierarchical id format
    InvalidId(String),

    /// A node was dropped onto itself
    MoveOntoSelf(String),

    /// A node was dropped into its own subtree
    MoveIntoDescendant { source: String, target: String },

    /// The drop position is not allowed for this kind of node
    UnsupportedDrop(DropPosition),

    // ─────────────────────────────────────────────────────────────────────────
    // Parse Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The backing JSON text is malformed
    Parse {
        message: String,
        line: Option<usize>,
    },

    /// The JSON is well-formed but does not have the expected shape
    Shape(String),

    /// The buffer currently holds no parsed tree (raw-text mode)
    NoDocument,

    // ─────────────────────────────────────────────────────────────────────────
    // File I/O Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic I/O error wrapper
    Io(io::Error),

    /// Failed to read file contents
    FileRead { path: PathBuf, source: io::Error },

    /// Failed to write file contents
    FileWrite { path: PathBuf, source: io::Error },

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to load configuration file
    ConfigLoad {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to save configuration file
    ConfigSave {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse configuration (invalid JSON/format)
    ConfigParse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration directory not found or inaccessible
    ConfigDirNotFound,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::CategoryNotFound(_) | Error::ItemNotFound { .. } => ErrorKind::Structural,
            Error::DuplicateId(_)
            | Error::InvalidId(_)
            | Error::MoveOntoSelf(_)
            | Error::MoveIntoDescendant { .. }
            | Error::UnsupportedDrop(_) => ErrorKind::Invariant,
            Error::Parse { .. } | Error::Shape(_) | Error::NoDocument => ErrorKind::Parse,
            Error::Io(_) | Error::FileRead { .. } | Error::FileWrite { .. } => ErrorKind::Io,
            Error::ConfigLoad { .. }
            | Error::ConfigSave { .. }
            | Error::ConfigParse { .. }
            | Error::ConfigDirNotFound => ErrorKind::Config,
        }
    }

    pub(crate) fn item_not_found(category: &str, item: &str) -> Self {
        Error::ItemNotFound {
            category: category.to_string(),
            item: item.to_string(),
        }
    }
}

// Implement From traits for convenient error conversion
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        let line = err.line();
        Error::Parse {
            message: err.to_string(),
            line: if line > 0 { Some(line) } else { None },
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display trait implementation for user-friendly error messages
// ─────────────────────────────────────────────────────────────────────────────
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Structural Errors
            Error::CategoryNotFound(id) => write!(f, "Category '{}' not found", id),
            Error::ItemNotFound { category, item } => {
                write!(f, "Item '{}' not found in category '{}'", item, category)
            }

            // Invariant Violations
            Error::DuplicateId(id) => write!(f, "Id '{}' is already in use", id),
            Error::InvalidId(id) => write!(f, "'{}' is not a valid hierarchical id", id),
            Error::MoveOntoSelf(id) => write!(f, "Cannot move '{}' onto itself", id),
            Error::MoveIntoDescendant { source, target } => write!(
                f,
                "Cannot move '{}' into its own descendant '{}'",
                source, target
            ),
            Error::UnsupportedDrop(position) => {
                write!(f, "Drop position '{}' is not allowed here", position)
            }

            // Parse Errors
            Error::Parse { message, line } => match line {
                Some(line) => write!(f, "Invalid document JSON (line {}): {}", line, message),
                None => write!(f, "Invalid document JSON: {}", message),
            },
            Error::Shape(message) => write!(f, "Unexpected document shape: {}", message),
            Error::NoDocument => write!(f, "The buffer does not contain a parsed document"),

            // File I/O Errors
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::FileRead { path, source } => {
                write!(f, "Failed to read '{}': {}", path.display(), source)
            }
            Error::FileWrite { path, source } => {
                write!(f, "Failed to write '{}': {}", path.display(), source)
            }

            // Configuration Errors
            Error::ConfigLoad { path, source } => {
                write!(
                    f,
                    "Failed to load configuration from '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigSave { path, source } => {
                write!(
                    f,
                    "Failed to save configuration to '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigParse { message, .. } => {
                write!(f, "Invalid configuration format: {}", message)
            }
            Error::ConfigDirNotFound => {
                write!(f, "Configuration directory not found")
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// std::error::Error trait implementation for error chaining
// ─────────────────────────────────────────────────────────────────────────────
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::FileRead { source, .. } => Some(source),
            Error::FileWrite { source, .. } => Some(source),
            Error::ConfigLoad { source, .. } => Some(source.as_ref()),
            Error::ConfigSave { source, .. } => Some(source.as_ref()),
            Error::ConfigParse { source, .. } => source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Graceful Degradation Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for Result to support graceful degradation.
pub trait ResultExt<T> {
    /// If the result is an error, log it at warning level and return the provided default.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                warn!("{}: {}. Using default.", context, err);
                default
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
