//! Table diff: align the rows of one matched table pair.
//!
//! The block differ pairs whole tables first; this module only ever sees a
//! single `(old table, new table)` pair and aligns that pair's rows. Rows of
//! different tables are therefore never compared, even when their cell
//! contents coincide.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strsim::normalized_levenshtein;

use mdv_types::Token;

use crate::align::{align, AlignedChange, Deletion};

/// The result of diffing one table pair's rows.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TableDiff {
    /// New-row index to change entry.
    pub changes: BTreeMap<usize, RowChange>,
    /// Deleted old rows in deterministic order.
    pub deletions: Vec<Deletion<Token>>,
}

impl TableDiff {
    /// Returns `true` if the row sequences were identical.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.deletions.is_empty()
    }

    /// Number of change entries.
    pub fn len(&self) -> usize {
        self.changes.len()
    }
}

/// What happened to one row of the new table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RowChange {
    /// A new row with no prior counterpart.
    Added,
    /// Whole-row replacement.
    Modified { old: Token },
}

/// Diff the rows of a single matched table pair.
pub fn diff_tables(old: &Token, new: &Token) -> TableDiff {
    let alignment = align(
        &old.children,
        &new.children,
        |a: &Token, b: &Token| a.raw == b.raw,
        row_similarity,
    );

    let mut changes = BTreeMap::new();
    for (idx, change) in alignment.changes {
        let entry = match change {
            AlignedChange::Added => RowChange::Added,
            AlignedChange::Modified { old } => RowChange::Modified { old },
        };
        changes.insert(idx, entry);
    }

    TableDiff {
        changes,
        deletions: alignment.deletions,
    }
}

/// Similarity over cell content only. Pipe delimiters and padding are shared
/// by every row of every table and would make unrelated rows look alike.
fn row_similarity(a: &Token, b: &Token) -> f64 {
    normalized_levenshtein(&cell_text(&a.raw), &cell_text(&b.raw))
}

fn cell_text(raw: &str) -> String {
    raw.chars()
        .map(|c| if c == '|' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&str]) -> Token {
        let raw = rows.join("\n");
        Token::table(raw, rows.iter().map(|r| Token::table_row(*r)).collect())
    }

    #[test]
    fn identical_tables_diff_empty() {
        let t = table(&["| name | count |", "| alpha | 1 |", "| beta | 2 |"]);
        assert!(diff_tables(&t, &t).is_empty());
    }

    #[test]
    fn unrelated_inserted_row_is_added_and_old_row_deleted() {
        // [r1, r2, r3] -> [r1, new, r3]: one Added, exactly one deletion.
        let old = table(&["| alpha | 1 |", "| beta | 2 |", "| gamma | 3 |"]);
        let new = table(&["| alpha | 1 |", "| zzzz | 999 |", "| gamma | 3 |"]);

        let out = diff_tables(&old, &new);
        assert_eq!(out.changes.len(), 1);
        assert!(matches!(out.changes.get(&1), Some(RowChange::Added)));
        assert_eq!(out.deletions.len(), 1);
        assert_eq!(out.deletions[0].token.raw, "| beta | 2 |");
        assert_eq!(out.deletions[0].before_idx, 1);
    }

    #[test]
    fn edited_cell_pairs_row_as_modified() {
        let old = table(&["| name | count |", "| alpha | 1 |"]);
        let new = table(&["| name | count |", "| alpha | 17 |"]);

        let out = diff_tables(&old, &new);
        assert_eq!(out.changes.len(), 1);
        match out.changes.get(&1) {
            Some(RowChange::Modified { old }) => assert_eq!(old.raw, "| alpha | 1 |"),
            other => panic!("expected Modified, got {other:?}"),
        }
        assert!(out.deletions.is_empty());
    }

    #[test]
    fn appended_row_is_added() {
        let old = table(&["| a | 1 |"]);
        let new = table(&["| a | 1 |", "| b | 2 |"]);
        let out = diff_tables(&old, &new);
        assert_eq!(out.changes.len(), 1);
        assert!(matches!(out.changes.get(&1), Some(RowChange::Added)));
    }

    #[test]
    fn pipes_alone_do_not_make_rows_similar() {
        assert_eq!(cell_text("| beta | 2 |"), "beta 2");
        let a = Token::table_row("| qqqq | 111 |");
        let b = Token::table_row("| zzzz | 999 |");
        assert!(row_similarity(&a, &b) < 0.15);
    }
}
