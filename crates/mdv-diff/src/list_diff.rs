//! List diff: align list items, recursing into nested sub-lists.
//!
//! Items align by deep equality (head text plus nested sub-list) with head
//! similarity pairing for changed items. A paired item whose head is
//! unchanged -- ignoring inline emphasis markers -- but whose sub-list
//! differs reports a nested-list change instead of a whole-item replacement,
//! so editing one child bullet never reads as the parent being rewritten.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strsim::normalized_levenshtein;
use unicode_normalization::UnicodeNormalization;

use mdv_types::Token;

use crate::align::{align, AlignedChange, Deletion};

/// The result of diffing two lists' items.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ListDiff {
    /// New-item index to change entry.
    pub changes: BTreeMap<usize, ListChange>,
    /// Deleted old items in deterministic order.
    pub deletions: Vec<Deletion<Token>>,
}

impl ListDiff {
    /// Returns `true` if the item sequences were identical.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.deletions.is_empty()
    }

    /// Number of change entries.
    pub fn len(&self) -> usize {
        self.changes.len()
    }
}

/// What happened to one item of the new list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ListChange {
    /// A new item with no prior counterpart.
    Added,
    /// Whole-item replacement (head text changed).
    Modified { old: Token },
    /// Head text unchanged; only the item's nested sub-list differs.
    NestedList(ListDiff),
}

/// Diff two list blocks by their item tokens.
pub fn diff_lists(old: &Token, new: &Token) -> ListDiff {
    diff_list_items(&old.children, &new.children)
}

/// Diff two item sequences; also the recursion point for nested sub-lists.
pub fn diff_list_items(old_items: &[Token], new_items: &[Token]) -> ListDiff {
    let alignment = align(
        old_items,
        new_items,
        |a: &Token, b: &Token| a.subtree_eq(b),
        head_similarity,
    );

    let mut changes = BTreeMap::new();
    for (idx, change) in alignment.changes {
        let entry = match change {
            AlignedChange::Added => ListChange::Added,
            AlignedChange::Modified { old } => resolve_item_pair(old, &new_items[idx]),
        };
        changes.insert(idx, entry);
    }

    ListDiff {
        changes,
        deletions: alignment.deletions,
    }
}

/// A paired item is a nested-list change only when the heads match after
/// normalization and the sub-lists actually differ; a head-only change (for
/// example bold added around identical text) stays a plain replacement so
/// the head repaints.
fn resolve_item_pair(old: Token, new: &Token) -> ListChange {
    let heads_match = normalized_head(&old.raw) == normalized_head(&new.raw);
    let nested_differs = old.children != new.children;
    if heads_match && nested_differs {
        ListChange::NestedList(diff_list_items(&old.children, &new.children))
    } else {
        ListChange::Modified { old }
    }
}

fn head_similarity(a: &Token, b: &Token) -> f64 {
    normalized_levenshtein(&a.raw, &b.raw)
}

/// Head text with inline emphasis markers stripped.
///
/// NFC-normalizes, removes the paired delimiters `**`, `__`, `~~` and the
/// single-character markers `*` and backtick, then trims. Single underscores
/// survive (word_internal_underscores are ordinary text); links and other
/// inline syntax are deliberately not normalized, so exact-match stays the
/// rule for everything beyond simple emphasis.
fn normalized_head(raw: &str) -> String {
    let nfc: String = raw.nfc().collect();
    nfc.replace("**", "")
        .replace("__", "")
        .replace("~~", "")
        .chars()
        .filter(|c| !matches!(c, '*' | '`'))
        .collect::<String>()
        .trim()
        .to_string()
}
