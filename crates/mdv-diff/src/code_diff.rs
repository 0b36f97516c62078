//! Code diff: align the lines of a code block.
//!
//! Lines align by exact equality with edit-distance pairing for edited
//! lines. Deletion anchoring follows the aligner's rule, which is what puts
//! a removed line immediately before its replacement in the rendered view.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strsim::normalized_levenshtein;

use mdv_types::Token;

use crate::align::{align, AlignedChange, Deletion};

/// The result of diffing one code block pair's lines.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeDiff {
    /// New-line index to change entry.
    pub changes: BTreeMap<usize, LineChange>,
    /// Deleted old lines in deterministic order.
    pub deletions: Vec<Deletion<Token>>,
}

impl CodeDiff {
    /// Returns `true` if the line sequences were identical.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.deletions.is_empty()
    }

    /// Number of change entries.
    pub fn len(&self) -> usize {
        self.changes.len()
    }
}

/// What happened to one line of the new code block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LineChange {
    /// A new line with no prior counterpart.
    Added,
    /// An edited line.
    Modified { old: Token },
}

/// Diff the lines of a single matched code block pair.
pub fn diff_code(old: &Token, new: &Token) -> CodeDiff {
    let alignment = align(
        &old.children,
        &new.children,
        |a: &Token, b: &Token| a.raw == b.raw,
        line_similarity,
    );

    let mut changes = BTreeMap::new();
    for (idx, change) in alignment.changes {
        let entry = match change {
            AlignedChange::Added => LineChange::Added,
            AlignedChange::Modified { old } => LineChange::Modified { old },
        };
        changes.insert(idx, entry);
    }

    CodeDiff {
        changes,
        deletions: alignment.deletions,
    }
}

fn line_similarity(a: &Token, b: &Token) -> f64 {
    normalized_levenshtein(&a.raw, &b.raw)
}
