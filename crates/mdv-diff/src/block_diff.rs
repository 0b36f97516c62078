//! Top-level document diff: align block tokens and dispatch container pairs.
//!
//! Blocks are aligned by exact raw-text equality with an edit-distance
//! similarity for pairing changed blocks. A paired block of container kind
//! (list, table, code, blockquote) is handed to the matching typed differ so
//! the result describes changed items, rows, lines, or quoted blocks instead
//! of a whole-block replacement.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strsim::normalized_levenshtein;
use tracing::trace;

use mdv_types::{Token, TokenKind};

use crate::align::{align, AlignedChange, Deletion, MAX_ALIGN_CELLS};
use crate::code_diff::{diff_code, CodeDiff};
use crate::list_diff::{diff_lists, ListDiff};
use crate::quote_diff::diff_blockquotes;
use crate::table_diff::{diff_tables, TableDiff};

/// The result of diffing two block sequences.
///
/// `changes` maps new-sequence indices to what happened there; `deletions`
/// carry old blocks with no counterpart, anchored to the new index they
/// render before. A fresh value is produced per invocation and never
/// retained by the engine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DiffResult {
    /// New-block index to change entry.
    pub changes: BTreeMap<usize, ChangeEntry>,
    /// Deleted old blocks in deterministic order.
    pub deletions: Vec<Deletion<Token>>,
}

impl DiffResult {
    /// Create an empty diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the documents were identical.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.deletions.is_empty()
    }

    /// Number of change entries.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Number of added blocks.
    pub fn additions(&self) -> usize {
        self.changes
            .values()
            .filter(|c| matches!(c, ChangeEntry::Added))
            .count()
    }
}

/// What happened to one block of the new document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ChangeEntry {
    /// A new block with no prior counterpart.
    Added,
    /// Whole-block replacement; no deeper structure to report.
    Modified { old: Token },
    /// A list whose items changed.
    List(ListDiff),
    /// A table whose rows changed.
    Table(TableDiff),
    /// A code block whose lines changed.
    Code(CodeDiff),
    /// A blockquote whose inner blocks changed.
    Blockquote(Box<DiffResult>),
}

/// Diff two parsed documents.
///
/// This is the engine's single entry point: a pure function of the two token
/// trees, holding no state across calls. Malformed trees (a leaf kind
/// carrying children) indicate an upstream parser bug and fail fast.
pub fn diff(old: &[Token], new: &[Token]) -> DiffResult {
    check_well_formed(old);
    check_well_formed(new);

    let result = diff_blocks(old, new);
    trace!(
        changes = result.changes.len(),
        deletions = result.deletions.len(),
        "document diff complete"
    );
    result
}

fn check_well_formed(tokens: &[Token]) {
    for token in tokens {
        if let Err(err) = token.validate() {
            panic!("malformed token tree from parser: {err}");
        }
    }
}

/// Align two block sequences and dispatch modified container pairs.
pub fn diff_blocks(old: &[Token], new: &[Token]) -> DiffResult {
    let alignment = align(
        old,
        new,
        |a: &Token, b: &Token| a.raw == b.raw,
        block_similarity,
    );

    let mut changes = BTreeMap::new();
    for (idx, change) in alignment.changes {
        let entry = match change {
            AlignedChange::Added => ChangeEntry::Added,
            AlignedChange::Modified { old } => dispatch_modified(old, &new[idx]),
        };
        changes.insert(idx, entry);
    }

    DiffResult {
        changes,
        deletions: alignment.deletions,
    }
}

fn block_similarity(a: &Token, b: &Token) -> f64 {
    normalized_levenshtein(&a.raw, &b.raw)
}

/// Turn a paired block into its typed diff where the kinds allow it.
///
/// Mismatched or non-container kinds stay a plain replacement. An
/// over-budget container pair also stays one coarse replacement rather than
/// paying for quadratic inner alignment. A typed diff that comes back empty
/// (raw text changed but children identical, e.g. only a fence info string)
/// downgrades to a plain replacement so the change still surfaces.
fn dispatch_modified(old: Token, new: &Token) -> ChangeEntry {
    if old.kind != new.kind || !old.kind.is_container() {
        return ChangeEntry::Modified { old };
    }
    if old
        .children
        .len()
        .saturating_mul(new.children.len())
        > MAX_ALIGN_CELLS
    {
        return ChangeEntry::Modified { old };
    }

    match old.kind {
        TokenKind::List => {
            let inner = diff_lists(&old, new);
            if inner.is_empty() {
                ChangeEntry::Modified { old }
            } else {
                ChangeEntry::List(inner)
            }
        }
        TokenKind::Table => {
            let inner = diff_tables(&old, new);
            if inner.is_empty() {
                ChangeEntry::Modified { old }
            } else {
                ChangeEntry::Table(inner)
            }
        }
        TokenKind::Code => {
            let inner = diff_code(&old, new);
            if inner.is_empty() {
                ChangeEntry::Modified { old }
            } else {
                ChangeEntry::Code(inner)
            }
        }
        TokenKind::Blockquote => {
            let inner = diff_blockquotes(&old, new);
            if inner.is_empty() {
                ChangeEntry::Modified { old }
            } else {
                ChangeEntry::Blockquote(Box::new(inner))
            }
        }
        _ => ChangeEntry::Modified { old },
    }
}
