//! Blockquote diff: a quote's inner tokens are a nested document.
//!
//! The quote pair delegates straight back to the block differ, so the same
//! change and deletion shape applies one level down, including typed diffs
//! for lists, tables, and code inside the quote.

use mdv_types::Token;

use crate::block_diff::{diff_blocks, DiffResult};

/// Diff of a blockquote's inner blocks; same shape as a document diff.
pub type BlockquoteDiff = DiffResult;

/// Diff the inner block sequences of a single matched blockquote pair.
pub fn diff_blockquotes(old: &Token, new: &Token) -> BlockquoteDiff {
    diff_blocks(&old.children, &new.children)
}
