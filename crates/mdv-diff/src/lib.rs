//! Structural markdown diff engine for mdview.
//!
//! Given the previously rendered and newly edited token trees of a markdown
//! document, computes a minimal, stable description of what changed, down to
//! list items, table rows, code lines, and quoted sub-blocks. The engine is
//! a pure, stateless transformation: no I/O, no retained state, and
//! identical inputs always produce identical results.
//!
//! # Key Types
//!
//! - [`DiffResult`] / [`ChangeEntry`] -- Document-level diff with typed
//!   entries for container blocks
//! - [`ListDiff`] / [`ListChange`] -- Item-level list diff, including
//!   nested-sub-list-only changes
//! - [`TableDiff`] / [`RowChange`] -- Row diff scoped to one table pair
//! - [`CodeDiff`] / [`LineChange`] -- Line-level code block diff
//! - [`Deletion`] -- An old element anchored to the new index it renders
//!   before
//!
//! The entry point is [`diff`].

pub mod align;
pub mod block_diff;
pub mod code_diff;
pub mod list_diff;
pub mod quote_diff;
pub mod table_diff;

pub use align::{Alignment, AlignedChange, Deletion, MAX_ALIGN_CELLS, MIN_PAIR_SIMILARITY};
pub use block_diff::{diff, diff_blocks, ChangeEntry, DiffResult};
pub use code_diff::{diff_code, CodeDiff, LineChange};
pub use list_diff::{diff_list_items, diff_lists, ListChange, ListDiff};
pub use quote_diff::{diff_blockquotes, BlockquoteDiff};
pub use table_diff::{diff_tables, RowChange, TableDiff};
