//! Canonical document model
//!
//! This module defines the single in-memory tree shape used by the engine,
//! independent of how a content domain persists it (see `normalize`).

mod document;
mod sort_key;

pub use document::*;
pub use sort_key::SortKey;
