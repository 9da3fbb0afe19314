//! Translation from selected lines to minimal hunk headers.
//!
//! Given a hunk's raw diff text and the set of lines the user selected, this
//! module produces the smallest set of [`HunkHeader`]s that, replayed against
//! the base file, reproduce exactly the selected changes and nothing else.
//!
//! Grouping rules:
//!
//! - Selected lines that are adjacent in the diff body form one run and one
//!   header, including mixed deletion/addition runs.
//! - Any unselected line (changed or context) breaks a run; non-contiguous
//!   selections yield multiple headers, ordered by ascending position and
//!   non-overlapping.
//! - A run with no deletions is anchored after the old line preceding it;
//!   all pure-addition runs of a hunk share that insertion point. A run with
//!   no additions is anchored the same way on the new side.
//! - Selecting every changed line short-circuits to the original hunk
//!   header, context included.

use crate::hunk::{HunkError, HunkHeader};
use crate::selection::SelectedLine;
use std::collections::BTreeSet;
use std::ops::Range;

/// What the emitted headers will be used for.
///
/// Committing wants zero-context headers; discarding reuses the same
/// translation but widens each run over adjacent context lines so the
/// inverse application can anchor against the worktree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Commit,
    Discard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Context,
    Removal,
    Addition,
}

/// One body line of the hunk, with the line numbers in effect when it was
/// reached.
#[derive(Debug, Clone, Copy)]
struct Row {
    kind: RowKind,
    /// Old line number this row consumes (context and removals)
    old_no: Option<u32>,
    /// New line number this row consumes (context and additions)
    new_no: Option<u32>,
    /// Next unconsumed old line number before this row
    next_old: u32,
    /// Next unconsumed new line number before this row
    next_new: u32,
    selected: bool,
}

/// Translate a line selection within one hunk into hunk headers.
///
/// An empty selection yields an empty sequence, equivalent to excluding the
/// hunk entirely. Selected line ids that match no changed line in the hunk
/// are ignored; if none match, the result is empty as well.
///
/// # Examples
///
/// ```
/// use selective_commit::{selected_line_headers, HunkHeader, Purpose, SelectedLine};
/// use std::collections::BTreeSet;
///
/// let hunk = "@@ -38,0 +39,5 @@\n+one\n+two\n+three\n+four\n+five\n";
/// let selected = BTreeSet::from([SelectedLine::New(39), SelectedLine::New(40)]);
/// let headers = selected_line_headers(hunk, &selected, Purpose::Commit).unwrap();
/// assert_eq!(headers, vec![HunkHeader::new(38, 0, 39, 2)]);
/// ```
///
/// # Errors
///
/// Returns [`HunkError`] if the hunk text is empty or its first line is not
/// a `@@` header.
pub fn selected_line_headers(
    hunk_text: &str,
    selected: &BTreeSet<SelectedLine>,
    purpose: Purpose,
) -> Result<Vec<HunkHeader>, HunkError> {
    if selected.is_empty() {
        return Ok(Vec::new());
    }

    let mut lines = hunk_text.lines();
    let first = lines.next().ok_or(HunkError::EmptyHunk)?;
    let header = HunkHeader::parse(first).ok_or_else(|| HunkError::MalformedHeader {
        header: first.to_string(),
    })?;

    let rows = collect_rows(header, lines, selected);

    let changed = rows.iter().filter(|r| r.kind != RowKind::Context).count();
    let chosen = rows.iter().filter(|r| r.selected).count();
    if chosen == 0 {
        return Ok(Vec::new());
    }
    if chosen == changed {
        // Every changed line is selected: the whole original hunk
        return Ok(vec![header]);
    }

    let mut ranges = selected_runs(&rows);
    if purpose == Purpose::Discard {
        widen_over_context(&rows, &mut ranges);
    }

    Ok(ranges
        .into_iter()
        .filter_map(|range| rows.get(range).and_then(run_header))
        .collect())
}

/// Walk the hunk body, numbering each row the way the header declares.
///
/// A zero-length side in the header means its start is the line *after
/// which* the change applies, so counting starts one past it.
fn collect_rows<'a>(
    header: HunkHeader,
    lines: impl Iterator<Item = &'a str>,
    selected: &BTreeSet<SelectedLine>,
) -> Vec<Row> {
    let mut next_old = if header.old_lines == 0 {
        header.old_start + 1
    } else {
        header.old_start
    };
    let mut next_new = if header.new_lines == 0 {
        header.new_start + 1
    } else {
        header.new_start
    };

    let mut rows = Vec::new();
    for line in lines {
        // "\ No newline at end of file" annotates the previous row
        if line.starts_with('\\') {
            continue;
        }

        if line.strip_prefix('-').is_some() {
            rows.push(Row {
                kind: RowKind::Removal,
                old_no: Some(next_old),
                new_no: None,
                next_old,
                next_new,
                selected: selected.contains(&SelectedLine::Old(next_old)),
            });
            next_old += 1;
        } else if line.strip_prefix('+').is_some() {
            rows.push(Row {
                kind: RowKind::Addition,
                old_no: None,
                new_no: Some(next_new),
                next_old,
                next_new,
                selected: selected.contains(&SelectedLine::New(next_new)),
            });
            next_new += 1;
        } else {
            rows.push(Row {
                kind: RowKind::Context,
                old_no: Some(next_old),
                new_no: Some(next_new),
                next_old,
                next_new,
                selected: false,
            });
            next_old += 1;
            next_new += 1;
        }
    }
    rows
}

/// Index ranges of maximal runs of adjacent selected rows, in body order.
fn selected_runs(rows: &[Row]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, row) in rows.iter().enumerate() {
        if row.selected {
            if start.is_none() {
                start = Some(i);
            }
        } else if let Some(s) = start.take() {
            runs.push(s..i);
        }
    }
    if let Some(s) = start {
        runs.push(s..rows.len());
    }
    runs
}

/// Extend each run over neighboring context rows, merging runs that end up
/// sharing context.
fn widen_over_context(rows: &[Row], ranges: &mut Vec<Range<usize>>) {
    for range in ranges.iter_mut() {
        while range.start > 0
            && rows
                .get(range.start - 1)
                .is_some_and(|r| r.kind == RowKind::Context)
        {
            range.start -= 1;
        }
        while rows.get(range.end).is_some_and(|r| r.kind == RowKind::Context) {
            range.end += 1;
        }
    }
    ranges.dedup_by(|next, prev| {
        if next.start <= prev.end {
            prev.end = prev.end.max(next.end);
            true
        } else {
            false
        }
    });
}

/// Header covering one run of rows. Sides with no rows are anchored just
/// before the run, with a zero count.
fn run_header(rows: &[Row]) -> Option<HunkHeader> {
    let first = rows.first()?;

    let old_first = rows.iter().find_map(|r| r.old_no);
    let old_lines = rows.iter().filter(|r| r.old_no.is_some()).count() as u32;
    let new_first = rows.iter().find_map(|r| r.new_no);
    let new_lines = rows.iter().filter(|r| r.new_no.is_some()).count() as u32;

    Some(HunkHeader {
        old_start: old_first.unwrap_or_else(|| first.next_old.saturating_sub(1)),
        old_lines,
        new_start: new_first.unwrap_or_else(|| first.next_new.saturating_sub(1)),
        new_lines,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn old(n: u32) -> SelectedLine {
        SelectedLine::Old(n)
    }

    fn new(n: u32) -> SelectedLine {
        SelectedLine::New(n)
    }

    const REPLACEMENT: &str = "@@ -10,2 +10,2 @@\n-old ten\n-old eleven\n+new ten\n+new eleven\n";

    #[test]
    fn empty_selection_excludes_the_hunk() {
        let headers =
            selected_line_headers(REPLACEMENT, &BTreeSet::new(), Purpose::Commit).unwrap();
        assert_eq!(headers, vec![]);
    }

    #[test]
    fn all_lines_selected_is_the_original_hunk() {
        let selected = BTreeSet::from([old(10), old(11), new(10), new(11)]);
        let headers = selected_line_headers(REPLACEMENT, &selected, Purpose::Commit).unwrap();
        assert_eq!(headers, vec![HunkHeader::new(10, 2, 10, 2)]);
    }

    #[test]
    fn all_changed_lines_selected_with_context_present() {
        let hunk = "@@ -1,4 +1,4 @@\n-one\n+uno\n two\n-three\n+tres\n four\n";
        // Only the changed lines are selectable; context rides along in the
        // original coordinates
        let selected = BTreeSet::from([old(1), new(1), old(3), new(3)]);
        let headers = selected_line_headers(hunk, &selected, Purpose::Commit).unwrap();
        assert_eq!(headers, vec![HunkHeader::new(1, 4, 1, 4)]);
    }

    #[test]
    fn subset_of_additions() {
        let hunk = "@@ -38,0 +39,5 @@\n+a\n+b\n+c\n+d\n+e\n";
        let selected = BTreeSet::from([new(39), new(40), new(41)]);
        let headers = selected_line_headers(hunk, &selected, Purpose::Commit).unwrap();
        assert_eq!(headers, vec![HunkHeader::new(38, 0, 39, 3)]);
    }

    #[test]
    fn non_contiguous_additions_share_the_insertion_point() {
        let hunk = "@@ -38,0 +39,5 @@\n+a\n+b\n+c\n+d\n+e\n";
        let selected = BTreeSet::from([new(40), new(42)]);
        let headers = selected_line_headers(hunk, &selected, Purpose::Commit).unwrap();
        assert_eq!(
            headers,
            vec![HunkHeader::new(38, 0, 40, 1), HunkHeader::new(38, 0, 42, 1)]
        );
    }

    #[test]
    fn subset_of_deletions_anchors_the_gap() {
        let hunk = "@@ -15,2 +14,0 @@\n-removed one\n-removed two\n";
        let selected = BTreeSet::from([old(16)]);
        let headers = selected_line_headers(hunk, &selected, Purpose::Commit).unwrap();
        assert_eq!(headers, vec![HunkHeader::new(16, 1, 14, 0)]);
    }

    #[test]
    fn adjacent_deletion_and_addition_merge_into_one_header() {
        let selected = BTreeSet::from([old(11), new(10)]);
        let headers = selected_line_headers(REPLACEMENT, &selected, Purpose::Commit).unwrap();
        assert_eq!(headers, vec![HunkHeader::new(11, 1, 10, 1)]);
    }

    #[test]
    fn separated_lines_yield_ordered_disjoint_headers() {
        let selected = BTreeSet::from([old(10), new(11)]);
        let headers = selected_line_headers(REPLACEMENT, &selected, Purpose::Commit).unwrap();
        assert_eq!(
            headers,
            vec![HunkHeader::new(10, 1, 9, 0), HunkHeader::new(11, 0, 11, 1)]
        );
    }

    #[test]
    fn context_breaks_runs_for_commit() {
        let hunk = "@@ -1,4 +1,4 @@\n-one\n+uno\n two\n-three\n+tres\n four\n";
        let selected = BTreeSet::from([old(1), new(1), old(3)]);
        let headers = selected_line_headers(hunk, &selected, Purpose::Commit).unwrap();
        assert_eq!(
            headers,
            vec![HunkHeader::new(1, 1, 1, 1), HunkHeader::new(3, 1, 2, 0)]
        );
    }

    #[test]
    fn discard_widens_runs_over_context() {
        let hunk = "@@ -1,4 +1,4 @@\n one\n-two\n+dos\n three\n-four\n+quatro\n";
        let selected = BTreeSet::from([old(2), new(2)]);
        let headers = selected_line_headers(hunk, &selected, Purpose::Discard).unwrap();
        // The run picks up " one" and " three" as anchoring context
        assert_eq!(headers, vec![HunkHeader::new(1, 3, 1, 3)]);
    }

    #[test]
    fn discard_merges_runs_sharing_context() {
        let hunk = "@@ -1,5 +1,5 @@\n-one\n+uno\n two\n-three\n+tres\n four\n five\n";
        let selected = BTreeSet::from([old(1), new(1), old(3)]);
        let headers = selected_line_headers(hunk, &selected, Purpose::Discard).unwrap();
        // Both runs widen over the shared " two" context row and merge;
        // the unselected "+tres" stops the widening on the right
        assert_eq!(headers, vec![HunkHeader::new(1, 3, 1, 2)]);
    }

    #[test]
    fn unmatched_line_ids_are_ignored() {
        let hunk = "@@ -38,0 +39,2 @@\n+a\n+b\n";
        let selected = BTreeSet::from([new(99), old(5)]);
        let headers = selected_line_headers(hunk, &selected, Purpose::Commit).unwrap();
        assert_eq!(headers, vec![]);
    }

    #[test]
    fn no_newline_marker_is_not_a_row() {
        let hunk = "@@ -3 +3 @@\n-old version\n\\ No newline at end of file\n+new version\n\\ No newline at end of file\n";
        let selected = BTreeSet::from([new(3)]);
        let headers = selected_line_headers(hunk, &selected, Purpose::Commit).unwrap();
        assert_eq!(headers, vec![HunkHeader::new(3, 0, 3, 1)]);
    }

    #[test]
    fn insertion_at_file_start_anchors_at_zero() {
        let hunk = "@@ -0,0 +1,2 @@\n+# Header\n+# Second line\n";
        let selected = BTreeSet::from([new(2)]);
        let headers = selected_line_headers(hunk, &selected, Purpose::Commit).unwrap();
        assert_eq!(headers, vec![HunkHeader::new(0, 0, 2, 1)]);
    }

    #[test]
    fn malformed_header_is_an_error() {
        let result = selected_line_headers(
            "not a hunk\n+line\n",
            &BTreeSet::from([new(1)]),
            Purpose::Commit,
        );
        assert!(matches!(result, Err(HunkError::MalformedHeader { .. })));
        let result = selected_line_headers("", &BTreeSet::from([new(1)]), Purpose::Commit);
        assert!(matches!(result, Err(HunkError::EmptyHunk)));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        /// A synthetic replacement hunk with `dels` deletions then `adds`
        /// additions, starting at old/new line 10.
        fn hunk_text(dels: u32, adds: u32) -> String {
            let old_part = match dels {
                0 => "-9,0".to_string(),
                n => format!("-10,{}", n),
            };
            let new_part = match adds {
                0 => "+9,0".to_string(),
                n => format!("+10,{}", n),
            };
            let mut text = format!("@@ {} {} @@\n", old_part, new_part);
            for i in 0..dels {
                text.push_str(&format!("-old {}\n", 10 + i));
            }
            for i in 0..adds {
                text.push_str(&format!("+new {}\n", 10 + i));
            }
            text
        }

        proptest! {
            #[test]
            fn headers_cover_exactly_the_selected_lines(
                dels in 0u32..6,
                adds in 0u32..6,
                picks in proptest::collection::btree_set(0u32..12, 0..12),
            ) {
                prop_assume!(dels + adds > 0);
                let selected: BTreeSet<SelectedLine> = picks
                    .iter()
                    .filter_map(|&i| {
                        if i < dels {
                            Some(SelectedLine::Old(10 + i))
                        } else if i >= 6 && i - 6 < adds {
                            Some(SelectedLine::New(10 + (i - 6)))
                        } else {
                            None
                        }
                    })
                    .collect();

                let headers =
                    selected_line_headers(&hunk_text(dels, adds), &selected, Purpose::Commit)
                        .unwrap();

                let picked_old =
                    selected.iter().filter(|l| matches!(l, SelectedLine::Old(_))).count() as u32;
                let picked_new =
                    selected.iter().filter(|l| matches!(l, SelectedLine::New(_))).count() as u32;

                if picked_old + picked_new == 0 {
                    prop_assert!(headers.is_empty());
                } else if picked_old == dels && picked_new == adds {
                    // Full selection is the original hunk
                    prop_assert_eq!(headers.len(), 1);
                } else {
                    let total_old: u32 = headers.iter().map(|h| h.old_lines).sum();
                    let total_new: u32 = headers.iter().map(|h| h.new_lines).sum();
                    prop_assert_eq!(total_old, picked_old);
                    prop_assert_eq!(total_new, picked_new);

                    // Ascending and non-overlapping on both sides
                    for pair in headers.windows(2) {
                        prop_assert!(pair[0].old_start + pair[0].old_lines <= pair[1].old_start
                            || pair[1].old_lines == 0);
                        prop_assert!(pair[0].new_start + pair[0].new_lines <= pair[1].new_start
                            || pair[1].new_lines == 0);
                    }
                }
            }

            #[test]
            fn translation_is_deterministic(
                dels in 0u32..5,
                adds in 1u32..5,
                picks in proptest::collection::btree_set(0u32..10, 1..10),
            ) {
                let selected: BTreeSet<SelectedLine> = picks
                    .iter()
                    .filter_map(|&i| {
                        if i < dels {
                            Some(SelectedLine::Old(10 + i))
                        } else if i >= 5 && i - 5 < adds {
                            Some(SelectedLine::New(10 + (i - 5)))
                        } else {
                            None
                        }
                    })
                    .collect();

                let text = hunk_text(dels, adds);
                let once = selected_line_headers(&text, &selected, Purpose::Commit).unwrap();
                let twice = selected_line_headers(&text, &selected, Purpose::Commit).unwrap();
                prop_assert_eq!(once, twice);
            }
        }
    }
}
