//! Topiary - tree editing and revision diffing for topic taxonomies
//!
//! The engine behind a taxonomy editor: documents of categories and nested
//! items with hierarchical ids are read from their stored JSON shape into a
//! canonical tree, edited through operations that keep ids unique and sort
//! keys in sync, and written back. Revisions of the serialized text are
//! compared with a bounded line diff.

pub mod config;
pub mod diff;
pub mod error;
pub mod model;
pub mod normalize;
pub mod state;
pub mod tree;
pub mod view_state;

pub use error::{Error, ErrorKind, Result};
pub use model::{Category, Document, Item, Localized, SortKey};
pub use normalize::ContentType;
pub use state::EditorState;
pub use view_state::{EditorViewState, Selection};
