//! Per-node sort key.
//!
//! Persisted as a `{ "dk": .., "en": .. }` pair. Both languages always carry
//! the same value, so the pair collapses to a single enum in memory and the
//! "equal or both null" invariant holds by construction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sort key of a category or item among its siblings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "OrderingPair", into = "OrderingPair")]
pub enum SortKey {
    /// Fixed 1-based position among siblings.
    Fixed(u32),
    /// Sorted by label text by the renderer; stored as `null`/`null`.
    #[default]
    Alphabetical,
}

impl SortKey {
    /// Check if this is the alphabetical sentinel.
    pub fn is_alphabetical(&self) -> bool {
        matches!(self, SortKey::Alphabetical)
    }

    /// The fixed position, if any.
    pub fn position(&self) -> Option<u32> {
        match self {
            SortKey::Fixed(n) => Some(*n),
            SortKey::Alphabetical => None,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Fixed(n) => write!(f, "{}", n),
            SortKey::Alphabetical => write!(f, "A-Z"),
        }
    }
}

/// Wire representation of a [`SortKey`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
struct OrderingPair {
    dk: Option<u32>,
    en: Option<u32>,
}

impl From<OrderingPair> for SortKey {
    // Half-null pairs take the present value; mismatched pairs trust `dk`.
    fn from(pair: OrderingPair) -> Self {
        match (pair.dk, pair.en) {
            (Some(n), _) | (None, Some(n)) => SortKey::Fixed(n),
            (None, None) => SortKey::Alphabetical,
        }
    }
}

impl From<SortKey> for OrderingPair {
    fn from(key: SortKey) -> Self {
        let n = key.position();
        OrderingPair { dk: n, en: n }
    }
}
