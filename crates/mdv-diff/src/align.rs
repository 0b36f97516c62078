//! Generic sequence alignment: exact-match anchors plus similarity pairing.
//!
//! Every differ in this crate reduces to the same problem: align two ordered
//! sequences, report new elements as added, vanished elements as deletions
//! anchored to the position they should render before, and pair up elements
//! that changed in place. The pairing inside unmatched regions is by
//! similarity score, never by position: an equal-length gap does not imply
//! positional correspondence (an unrelated insert and delete of equal count
//! must not collapse into one "modified" pair).

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Upper bound on `old.len() * new.len()` for fine-grained alignment.
///
/// Past this, the quadratic LCS and gap-pairing work is skipped in favor of
/// a linear coarse pass, trading precision for bounded latency on
/// pathological inputs such as multi-thousand-line code fences.
pub const MAX_ALIGN_CELLS: usize = 250_000;

/// Minimum similarity score for two unmatched elements to pair as a
/// modification; anything weaker stays an independent add plus delete.
///
/// Single-word block replacements ("World" -> "Earth") score 0.2 under
/// normalized edit distance and must still pair; content with disjoint
/// character sets scores near 0.0 and must not.
pub const MIN_PAIR_SIMILARITY: f64 = 0.15;

/// The result of aligning two sequences.
#[derive(Clone, Debug, PartialEq)]
pub struct Alignment<T> {
    /// New-sequence index to what happened there. Keys are unique and always
    /// within `[0, new.len())`.
    pub changes: BTreeMap<usize, AlignedChange<T>>,
    /// Old elements with no counterpart, in deterministic old-sequence order.
    pub deletions: Vec<Deletion<T>>,
}

impl<T> Alignment<T> {
    /// Returns `true` if the sequences were identical.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.deletions.is_empty()
    }
}

impl<T> Default for Alignment<T> {
    fn default() -> Self {
        Self {
            changes: BTreeMap::new(),
            deletions: Vec::new(),
        }
    }
}

/// What happened at one new-sequence index.
#[derive(Clone, Debug, PartialEq)]
pub enum AlignedChange<T> {
    /// No prior counterpart.
    Added,
    /// Paired with an old element by similarity; whole-element replacement.
    Modified { old: T },
}

/// An old element with no surviving counterpart.
///
/// `before_idx` is the new-sequence index the deleted content should render
/// immediately before, so deletions stay adjacent to their replacement or to
/// the next surviving content. Multiple deletions may share a `before_idx`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deletion<T> {
    /// The deleted old element.
    pub token: T,
    /// New-sequence index this deletion renders before.
    pub before_idx: usize,
}

/// Align `old` and `new` under the given equality and similarity functions.
///
/// 1. LCS over `equals` yields order-preserving anchor pairs.
/// 2. Unmatched runs between anchors form gaps.
/// 3. Within a gap, candidate pairs at or above [`MIN_PAIR_SIMILARITY`] are
///    taken greedily by descending score; ties break by ascending old index,
///    then ascending new index. Leftover new elements are added, leftover old
///    elements are deletions anchored just past the preceding anchor.
///
/// Identical inputs produce an empty result. Inputs whose length product
/// exceeds [`MAX_ALIGN_CELLS`] take the coarse linear path instead.
pub fn align<T, E, S>(old: &[T], new: &[T], equals: E, similarity: S) -> Alignment<T>
where
    T: Clone,
    E: Fn(&T, &T) -> bool,
    S: Fn(&T, &T) -> f64,
{
    if old.is_empty() && new.is_empty() {
        return Alignment::default();
    }

    if old.len().saturating_mul(new.len()) > MAX_ALIGN_CELLS {
        debug!(
            old_len = old.len(),
            new_len = new.len(),
            "alignment cost bound exceeded, falling back to coarse pass"
        );
        return align_coarse(old, new, &equals);
    }

    let anchors = lcs_anchors(old, new, &equals);

    let mut out = Alignment::default();
    let mut old_start = 0usize;
    let mut new_start = 0usize;
    let mut prev_anchor_new: Option<usize> = None;

    for &(ai, aj) in &anchors {
        pair_gap(
            old,
            new,
            old_start..ai,
            new_start..aj,
            prev_anchor_new,
            &similarity,
            &mut out,
        );
        prev_anchor_new = Some(aj);
        old_start = ai + 1;
        new_start = aj + 1;
    }
    pair_gap(
        old,
        new,
        old_start..old.len(),
        new_start..new.len(),
        prev_anchor_new,
        &similarity,
        &mut out,
    );

    out
}

/// Longest common subsequence as `(old_idx, new_idx)` anchor pairs.
///
/// Textbook O(n·m) dynamic program; callers guard the size. Backtracking
/// prefers advancing the old side on ties, which fixes one deterministic
/// anchor set for ambiguous inputs.
fn lcs_anchors<T, E>(old: &[T], new: &[T], equals: &E) -> Vec<(usize, usize)>
where
    E: Fn(&T, &T) -> bool,
{
    let n = old.len();
    let m = new.len();
    if n == 0 || m == 0 {
        return Vec::new();
    }

    let idx = |i: usize, j: usize| i * (m + 1) + j;
    let mut dp = vec![0u32; (n + 1) * (m + 1)];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            dp[idx(i, j)] = if equals(&old[i], &new[j]) {
                dp[idx(i + 1, j + 1)] + 1
            } else {
                dp[idx(i + 1, j)].max(dp[idx(i, j + 1)])
            };
        }
    }

    let mut anchors = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if equals(&old[i], &new[j]) {
            anchors.push((i, j));
            i += 1;
            j += 1;
        } else if dp[idx(i + 1, j)] >= dp[idx(i, j + 1)] {
            i += 1;
        } else {
            j += 1;
        }
    }
    anchors
}

/// Resolve one gap between anchors (or a sequence boundary).
///
/// `prev_anchor_new` is the new-sequence index of the nearest preceding
/// anchor; deletions in this gap render immediately after it.
fn pair_gap<T, S>(
    old: &[T],
    new: &[T],
    old_range: Range<usize>,
    new_range: Range<usize>,
    prev_anchor_new: Option<usize>,
    similarity: &S,
    out: &mut Alignment<T>,
) where
    T: Clone,
    S: Fn(&T, &T) -> f64,
{
    if old_range.is_empty() && new_range.is_empty() {
        return;
    }

    let mut candidates: Vec<(f64, usize, usize)> = Vec::new();
    for i in old_range.clone() {
        for j in new_range.clone() {
            let score = similarity(&old[i], &new[j]);
            if score >= MIN_PAIR_SIMILARITY {
                candidates.push((score, i, j));
            }
        }
    }
    // Descending score, ties by ascending old then new index. total_cmp keeps
    // the sort a total order, so identical inputs always rank identically.
    candidates.sort_by(|a, b| {
        b.0.total_cmp(&a.0)
            .then_with(|| a.1.cmp(&b.1))
            .then_with(|| a.2.cmp(&b.2))
    });

    let mut used_old = vec![false; old_range.len()];
    let mut used_new = vec![false; new_range.len()];
    for (_, i, j) in candidates {
        let oi = i - old_range.start;
        let nj = j - new_range.start;
        if used_old[oi] || used_new[nj] {
            continue;
        }
        used_old[oi] = true;
        used_new[nj] = true;
        out.changes
            .insert(j, AlignedChange::Modified { old: old[i].clone() });
    }

    for j in new_range.clone() {
        if !used_new[j - new_range.start] {
            out.changes.insert(j, AlignedChange::Added);
        }
    }

    let before_idx = prev_anchor_new.map(|j| j + 1).unwrap_or(0);
    for i in old_range.clone() {
        if !used_old[i - old_range.start] {
            out.deletions.push(Deletion {
                token: old[i].clone(),
                before_idx,
            });
        }
    }
}

/// Coarse linear fallback for over-budget inputs.
///
/// Keeps the shared prefix and suffix, then marks everything in between as
/// added on the new side and deleted on the old side. No similarity pairing
/// is attempted.
fn align_coarse<T, E>(old: &[T], new: &[T], equals: &E) -> Alignment<T>
where
    T: Clone,
    E: Fn(&T, &T) -> bool,
{
    let mut prefix = 0;
    while prefix < old.len() && prefix < new.len() && equals(&old[prefix], &new[prefix]) {
        prefix += 1;
    }
    let mut suffix = 0;
    while suffix < old.len() - prefix
        && suffix < new.len() - prefix
        && equals(&old[old.len() - 1 - suffix], &new[new.len() - 1 - suffix])
    {
        suffix += 1;
    }

    let mut out = Alignment::default();
    for j in prefix..new.len() - suffix {
        out.changes.insert(j, AlignedChange::Added);
    }
    for i in prefix..old.len() - suffix {
        out.deletions.push(Deletion {
            token: old[i].clone(),
            before_idx: prefix,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eq(a: &&str, b: &&str) -> bool {
        a == b
    }

    fn sim(a: &&str, b: &&str) -> f64 {
        strsim::normalized_levenshtein(a, b)
    }

    #[test]
    fn empty_sequences_align_empty() {
        let out = align::<&str, _, _>(&[], &[], eq, sim);
        assert!(out.is_empty());
    }

    #[test]
    fn identical_sequences_align_empty() {
        let seq = ["alpha", "beta", "gamma"];
        let out = align(&seq, &seq, eq, sim);
        assert!(out.is_empty());
    }

    #[test]
    fn zero_anchors_all_delete_all_add() {
        let old = ["aaaaaaaaaa", "bbbbbbbbbb"];
        let new = ["cccccccccc", "dddddddddd"];
        let out = align(&old, &new, eq, sim);
        assert_eq!(out.changes.len(), 2);
        assert!(out
            .changes
            .values()
            .all(|c| matches!(c, AlignedChange::Added)));
        assert_eq!(out.deletions.len(), 2);
        assert!(out.deletions.iter().all(|d| d.before_idx == 0));
    }

    #[test]
    fn pure_insertion() {
        let old = ["one", "two"];
        let new = ["one", "inserted-element", "two"];
        let out = align(&old, &new, eq, sim);
        assert_eq!(out.changes.len(), 1);
        assert!(matches!(out.changes.get(&1), Some(AlignedChange::Added)));
        assert!(out.deletions.is_empty());
    }

    #[test]
    fn pure_deletion_anchors_before_next_survivor() {
        let old = ["one", "two", "three"];
        let new = ["one", "three"];
        let out = align(&old, &new, eq, sim);
        assert!(out.changes.is_empty());
        assert_eq!(out.deletions.len(), 1);
        assert_eq!(out.deletions[0].token, "two");
        // Renders right before "three" at new index 1.
        assert_eq!(out.deletions[0].before_idx, 1);
    }

    #[test]
    fn similar_elements_pair_as_modified() {
        let old = ["one", "the quick brown fox", "three"];
        let new = ["one", "the quick brown cat", "three"];
        let out = align(&old, &new, eq, sim);
        assert_eq!(out.changes.len(), 1);
        match out.changes.get(&1) {
            Some(AlignedChange::Modified { old }) => assert_eq!(*old, "the quick brown fox"),
            other => panic!("expected Modified, got {other:?}"),
        }
        assert!(out.deletions.is_empty());
    }

    #[test]
    fn dissimilar_gap_elements_do_not_pair() {
        let old = ["one", "aaaaaaaaaa", "three"];
        let new = ["one", "zzzzzzzzzz", "three"];
        let out = align(&old, &new, eq, sim);
        assert!(matches!(out.changes.get(&1), Some(AlignedChange::Added)));
        assert_eq!(out.deletions.len(), 1);
        assert_eq!(out.deletions[0].token, "aaaaaaaaaa");
    }

    #[test]
    fn equal_length_gap_is_not_positional() {
        // Insert of NEW plus delete of Third: same length before and after,
        // but Second shifted rather than changed.
        let old = ["First", "Second", "Third", "Fourth"];
        let new = ["First", "@@@NEW@@@", "Second", "Fourth"];
        let out = align(&old, &new, eq, sim);

        assert_eq!(out.changes.len(), 1);
        assert!(matches!(out.changes.get(&1), Some(AlignedChange::Added)));
        assert!(!out.changes.contains_key(&2), "Second must stay anchored");
        assert_eq!(out.deletions.len(), 1);
        assert_eq!(out.deletions[0].token, "Third");
        assert_eq!(out.deletions[0].before_idx, 3);
    }

    #[test]
    fn greedy_pairing_picks_best_match_not_position() {
        // Old gap has two elements; the second one is the close match for the
        // single new element. Positional pairing would pick the first.
        let old = ["anchor", "zzzzzzzz", "needle one", "anchor2"];
        let new = ["anchor", "needle two", "anchor2"];
        let out = align(&old, &new, eq, sim);
        match out.changes.get(&1) {
            Some(AlignedChange::Modified { old }) => assert_eq!(*old, "needle one"),
            other => panic!("expected Modified with the similar element, got {other:?}"),
        }
        assert_eq!(out.deletions.len(), 1);
        assert_eq!(out.deletions[0].token, "zzzzzzzz");
    }

    #[test]
    fn tie_break_is_deterministic_and_index_ordered() {
        // Both old gap elements are equally similar to both new ones; the
        // tie-break pairs ascending old index with ascending new index.
        let old = ["anchor", "same-a", "same-b"];
        let new = ["anchor", "same-c", "same-d"];
        let first = align(&old, &new, eq, sim);
        for _ in 0..10 {
            assert_eq!(align(&old, &new, eq, sim), first);
        }
        match first.changes.get(&1) {
            Some(AlignedChange::Modified { old }) => assert_eq!(*old, "same-a"),
            other => panic!("expected Modified, got {other:?}"),
        }
        match first.changes.get(&2) {
            Some(AlignedChange::Modified { old }) => assert_eq!(*old, "same-b"),
            other => panic!("expected Modified, got {other:?}"),
        }
    }

    #[test]
    fn multiple_deletions_share_before_idx() {
        let old = ["keep", "gone one", "gone two", "tail"];
        let new = ["keep", "tail"];
        let out = align(&old, &new, eq, sim);
        assert_eq!(out.deletions.len(), 2);
        assert_eq!(out.deletions[0].before_idx, 1);
        assert_eq!(out.deletions[1].before_idx, 1);
        // Old-sequence order preserved.
        assert_eq!(out.deletions[0].token, "gone one");
        assert_eq!(out.deletions[1].token, "gone two");
    }

    #[test]
    fn coarse_path_keeps_prefix_and_suffix() {
        let old: Vec<String> = (0..600).map(|i| format!("line {i}")).collect();
        let mut new = old.clone();
        new[300] = "changed".to_string();
        let old_refs: Vec<&str> = old.iter().map(String::as_str).collect();
        let new_refs: Vec<&str> = new.iter().map(String::as_str).collect();
        assert!(old_refs.len() * new_refs.len() > MAX_ALIGN_CELLS);

        let out = align(&old_refs, &new_refs, eq, sim);
        assert_eq!(out.changes.len(), 1);
        assert!(matches!(out.changes.get(&300), Some(AlignedChange::Added)));
        assert_eq!(out.deletions.len(), 1);
        assert_eq!(out.deletions[0].token, "line 300");
        assert_eq!(out.deletions[0].before_idx, 300);
    }

    #[test]
    fn coarse_path_identical_inputs_empty() {
        let seq: Vec<String> = (0..600).map(|i| format!("line {i}")).collect();
        let refs: Vec<&str> = seq.iter().map(String::as_str).collect();
        let out = align(&refs, &refs, eq, sim);
        assert!(out.is_empty());
    }

    #[test]
    fn change_keys_stay_in_new_range() {
        let old = ["a", "b", "c", "d"];
        let new = ["x", "b", "y"];
        let out = align(&old, &new, eq, sim);
        assert!(out.changes.keys().all(|&k| k < new.len()));
    }
}
