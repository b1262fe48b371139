//! Line diff between two revisions of a document.
//!
//! This is a bounded greedy aligner rather than a longest-common-subsequence
//! diff: at each mismatch it looks a fixed number of lines ahead on both sides
//! for the other side's current line and takes the nearer resync point,
//! preferring to treat lines as added when both sides are equally near.

use serde::Serialize;
use std::fmt::Write as _;

/// How far ahead the aligner searches for a resync point.
pub const LOOKAHEAD_WINDOW: usize = 30;

/// Classification of one aligned row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffTag {
    Same,
    Added,
    Removed,
    Changed,
}

impl DiffTag {
    /// Single-character gutter marker.
    pub fn marker(&self) -> char {
        match self {
            DiffTag::Same => ' ',
            DiffTag::Added => '+',
            DiffTag::Removed => '-',
            DiffTag::Changed => '~',
        }
    }
}

/// One aligned row. Line numbers are 1-based; the side a row does not touch
/// has neither a number nor text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffRow {
    pub tag: DiffTag,
    pub left_line: Option<usize>,
    pub right_line: Option<usize>,
    pub left: Option<String>,
    pub right: Option<String>,
}

impl DiffRow {
    fn same(i: usize, j: usize, text: &str) -> Self {
        Self {
            tag: DiffTag::Same,
            left_line: Some(i + 1),
            right_line: Some(j + 1),
            left: Some(text.to_string()),
            right: Some(text.to_string()),
        }
    }

    fn added(j: usize, text: &str) -> Self {
        Self {
            tag: DiffTag::Added,
            left_line: None,
            right_line: Some(j + 1),
            left: None,
            right: Some(text.to_string()),
        }
    }

    fn removed(i: usize, text: &str) -> Self {
        Self {
            tag: DiffTag::Removed,
            left_line: Some(i + 1),
            right_line: None,
            left: Some(text.to_string()),
            right: None,
        }
    }

    fn changed(i: usize, j: usize, left: &str, right: &str) -> Self {
        Self {
            tag: DiffTag::Changed,
            left_line: Some(i + 1),
            right_line: Some(j + 1),
            left: Some(left.to_string()),
            right: Some(right.to_string()),
        }
    }

    pub fn marker(&self) -> char {
        self.tag.marker()
    }
}

/// Row counts per tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub same: usize,
    pub added: usize,
    pub removed: usize,
    pub changed: usize,
}

impl DiffSummary {
    pub fn from_rows(rows: &[DiffRow]) -> Self {
        let mut summary = Self::default();
        for row in rows {
            match row.tag {
                DiffTag::Same => summary.same += 1,
                DiffTag::Added => summary.added += 1,
                DiffTag::Removed => summary.removed += 1,
                DiffTag::Changed => summary.changed += 1,
            }
        }
        summary
    }

    pub fn is_identical(&self) -> bool {
        self.added == 0 && self.removed == 0 && self.changed == 0
    }
}

/// Diff two texts line by line with the default window.
pub fn diff_texts(old: &str, new: &str) -> Vec<DiffRow> {
    let left: Vec<&str> = old.lines().collect();
    let right: Vec<&str> = new.lines().collect();
    diff_lines(&left, &right)
}

pub fn diff_lines<S: AsRef<str>>(left: &[S], right: &[S]) -> Vec<DiffRow> {
    diff_lines_with_window(left, right, LOOKAHEAD_WINDOW)
}

/// Diff two line sequences, searching up to `window` lines ahead on each side.
pub fn diff_lines_with_window<S: AsRef<str>>(
    left: &[S],
    right: &[S],
    window: usize,
) -> Vec<DiffRow> {
    let left: Vec<&str> = left.iter().map(AsRef::as_ref).collect();
    let right: Vec<&str> = right.iter().map(AsRef::as_ref).collect();

    let mut rows = Vec::with_capacity(left.len().max(right.len()));
    let (mut i, mut j) = (0, 0);

    while i < left.len() || j < right.len() {
        let (l, r) = (left.get(i), right.get(j));

        if let (Some(l), Some(r)) = (l, r) {
            if l == r {
                rows.push(DiffRow::same(i, j, l));
                i += 1;
                j += 1;
                continue;
            }
        }

        // Offset at which the other side's current line reappears.
        let right_offset = l.and_then(|l| find_ahead(&right, j, l, window));
        let left_offset = r.and_then(|r| find_ahead(&left, i, r, window));

        match (right_offset, left_offset) {
            (Some(ro), lo) if lo.map_or(true, |lo| ro <= lo) => {
                for k in j..j + ro {
                    rows.push(DiffRow::added(k, right[k]));
                }
                j += ro;
            }
            (_, Some(lo)) => {
                for k in i..i + lo {
                    rows.push(DiffRow::removed(k, left[k]));
                }
                i += lo;
            }
            _ => match (l, r) {
                (Some(l), Some(r)) => {
                    rows.push(DiffRow::changed(i, j, l, r));
                    i += 1;
                    j += 1;
                }
                (Some(l), None) => {
                    rows.push(DiffRow::removed(i, l));
                    i += 1;
                }
                (None, Some(r)) => {
                    rows.push(DiffRow::added(j, r));
                    j += 1;
                }
                (None, None) => break,
            },
        }
    }

    rows
}

/// Smallest offset in `1..=window` with `lines[from + offset] == needle`.
fn find_ahead(lines: &[&str], from: usize, needle: &str, window: usize) -> Option<usize> {
    (1..=window)
        .take_while(|offset| from + offset < lines.len())
        .find(|offset| lines[from + offset] == needle)
}

/// Render rows as a unified-style listing with both line numbers.
pub fn render(rows: &[DiffRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let left_no = row.left_line.map(|n| n.to_string()).unwrap_or_default();
        let right_no = row.right_line.map(|n| n.to_string()).unwrap_or_default();
        let text = match row.tag {
            DiffTag::Changed => format!(
                "{} => {}",
                row.left.as_deref().unwrap_or_default(),
                row.right.as_deref().unwrap_or_default()
            ),
            DiffTag::Removed => row.left.clone().unwrap_or_default(),
            _ => row.right.clone().unwrap_or_default(),
        };
        let _ = writeln!(out, "{} {:>5} {:>5} | {}", row.marker(), left_no, right_no, text);
    }
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
