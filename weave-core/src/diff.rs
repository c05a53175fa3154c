//! Diff models shared by the merge editor and the diff viewer.
//!
//! Two independent pieces live here:
//! - [`parse_diff_blocks`]: the SEARCH/REPLACE conflict-marker parser.
//! - [`side_by_side`]: a read-only two-column line diff with word-level
//!   emphasis, computed with `similar`.

use similar::{ChangeTag, DiffTag, TextDiff};

pub const SEARCH_MARKER: &str = "<<<<<<< SEARCH";
pub const SEPARATOR_MARKER: &str = "=======";
pub const REPLACE_MARKER: &str = ">>>>>>> REPLACE";

/// Half-open range of marker line indices.
///
/// For the search side `start` is the `SEARCH` marker and `end` the separator;
/// for the replace side `start` is the separator and `end` the `REPLACE`
/// marker. The literal text therefore sits strictly between `start` and `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffBlock {
    pub search: LineSpan,
    pub replace: LineSpan,
}

/// Finds every complete `SEARCH / ======= / REPLACE` block in `content`.
///
/// Blocks missing their separator or closing marker are ignored.
pub fn parse_diff_blocks(content: &str) -> Vec<DiffBlock> {
    let mut blocks = Vec::new();
    let mut search_start: Option<usize> = None;
    let mut separator: Option<usize> = None;

    for (idx, line) in content.split('\n').enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim() == SEARCH_MARKER {
            search_start = Some(idx);
            separator = None;
        } else if line.trim() == SEPARATOR_MARKER && search_start.is_some() && separator.is_none() {
            separator = Some(idx);
        } else if line.trim() == REPLACE_MARKER {
            if let (Some(start), Some(sep)) = (search_start, separator) {
                blocks.push(DiffBlock {
                    search: LineSpan { start, end: sep },
                    replace: LineSpan { start: sep, end: idx },
                });
            }
            search_start = None;
            separator = None;
        }
    }

    blocks
}

/// True when `content` holds at least one complete conflict block.
pub fn has_diff_content(content: &str) -> bool {
    !parse_diff_blocks(content).is_empty()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Equal,
    Delete,
    Insert,
    Replace,
}

/// A run of text within one side of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    /// Part of a word-level change inside a replaced line.
    pub emphasized: bool,
}

/// One visual row of the side-by-side view.
///
/// Line numbers are 1-based; `None` marks the blank side of an insert/delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffRow {
    pub kind: RowKind,
    pub old_lineno: Option<usize>,
    pub old: Vec<Segment>,
    pub new_lineno: Option<usize>,
    pub new: Vec<Segment>,
}

/// Counts of changed lines, shown in the viewer title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
}

pub fn stats(rows: &[DiffRow]) -> DiffStats {
    rows.iter().fold(DiffStats::default(), |mut acc, row| {
        if row.old_lineno.is_some() && row.kind != RowKind::Equal {
            acc.removed += 1;
        }
        if row.new_lineno.is_some() && row.kind != RowKind::Equal {
            acc.added += 1;
        }
        acc
    })
}

/// Computes side-by-side rows for `old` vs `new`.
///
/// Replaced regions are paired line by line; each pair gets a word-level diff
/// so only the changed words are emphasized.
pub fn side_by_side(old: &str, new: &str) -> Vec<DiffRow> {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    let diff = TextDiff::from_lines(old, new);
    let mut rows = Vec::new();

    for op in diff.ops() {
        let old_range = op.old_range();
        let new_range = op.new_range();
        match op.tag() {
            DiffTag::Equal => {
                for (o, n) in old_range.zip(new_range) {
                    rows.push(DiffRow {
                        kind: RowKind::Equal,
                        old_lineno: Some(o + 1),
                        old: plain(old_lines.get(o).copied().unwrap_or_default()),
                        new_lineno: Some(n + 1),
                        new: plain(new_lines.get(n).copied().unwrap_or_default()),
                    });
                }
            }
            DiffTag::Delete => {
                for o in old_range {
                    rows.push(DiffRow {
                        kind: RowKind::Delete,
                        old_lineno: Some(o + 1),
                        old: plain(old_lines.get(o).copied().unwrap_or_default()),
                        new_lineno: None,
                        new: Vec::new(),
                    });
                }
            }
            DiffTag::Insert => {
                for n in new_range {
                    rows.push(DiffRow {
                        kind: RowKind::Insert,
                        old_lineno: None,
                        old: Vec::new(),
                        new_lineno: Some(n + 1),
                        new: plain(new_lines.get(n).copied().unwrap_or_default()),
                    });
                }
            }
            DiffTag::Replace => {
                let pairs = old_range.len().max(new_range.len());
                for k in 0..pairs {
                    let o = (k < old_range.len()).then(|| old_range.start + k);
                    let n = (k < new_range.len()).then(|| new_range.start + k);
                    let old_text = o.and_then(|i| old_lines.get(i).copied());
                    let new_text = n.and_then(|i| new_lines.get(i).copied());
                    let (old_segs, new_segs) = match (old_text, new_text) {
                        (Some(a), Some(b)) => word_segments(a, b),
                        (Some(a), None) => (plain(a), Vec::new()),
                        (None, Some(b)) => (Vec::new(), plain(b)),
                        (None, None) => (Vec::new(), Vec::new()),
                    };
                    rows.push(DiffRow {
                        kind: RowKind::Replace,
                        old_lineno: o.map(|i| i + 1),
                        old: old_segs,
                        new_lineno: n.map(|i| i + 1),
                        new: new_segs,
                    });
                }
            }
        }
    }

    rows
}

fn plain(text: &str) -> Vec<Segment> {
    vec![Segment { text: text.to_owned(), emphasized: false }]
}

/// Word-level diff of a replaced line pair, merged into runs.
fn word_segments(old_line: &str, new_line: &str) -> (Vec<Segment>, Vec<Segment>) {
    let diff = TextDiff::from_words(old_line, new_line);
    let mut old_segs: Vec<Segment> = Vec::new();
    let mut new_segs: Vec<Segment> = Vec::new();

    for change in diff.iter_all_changes() {
        let text = change.value();
        match change.tag() {
            ChangeTag::Equal => {
                push_segment(&mut old_segs, text, false);
                push_segment(&mut new_segs, text, false);
            }
            ChangeTag::Delete => push_segment(&mut old_segs, text, true),
            ChangeTag::Insert => push_segment(&mut new_segs, text, true),
        }
    }
    (old_segs, new_segs)
}

fn push_segment(segs: &mut Vec<Segment>, text: &str, emphasized: bool) {
    match segs.last_mut() {
        Some(last) if last.emphasized == emphasized => last.text.push_str(text),
        _ => segs.push(Segment { text: text.to_owned(), emphasized }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_block_spans() {
        let doc = "<<<<<<< SEARCH\na\nb\n=======\nc\n>>>>>>> REPLACE";
        let blocks = parse_diff_blocks(doc);
        assert_eq!(
            blocks,
            vec![DiffBlock {
                search: LineSpan { start: 0, end: 3 },
                replace: LineSpan { start: 3, end: 5 },
            }]
        );
        assert!(has_diff_content(doc));
    }

    #[test]
    fn incomplete_block_is_ignored() {
        assert!(parse_diff_blocks("<<<<<<< SEARCH\na\n=======\nb").is_empty());
        assert!(!has_diff_content("======="));
    }

    #[test]
    fn multiple_blocks_in_one_document() {
        let doc = "x\n<<<<<<< SEARCH\na\n=======\nb\n>>>>>>> REPLACE\ny\n<<<<<<< SEARCH\nc\n=======\nd\n>>>>>>> REPLACE";
        assert_eq!(parse_diff_blocks(doc).len(), 2);
    }

    #[test]
    fn side_by_side_marks_changes() {
        let old = "keep\nlet total = 0;\ngone\n";
        let new = "keep\nlet total = 10;\n";
        let rows = side_by_side(old, new);
        assert_eq!(rows[0].kind, RowKind::Equal);
        let replaced = rows.iter().find(|r| r.kind == RowKind::Replace && r.new_lineno == Some(2)).unwrap();
        assert!(replaced.new.iter().any(|s| s.emphasized && s.text.contains("10")));
        assert!(replaced.old.iter().any(|s| !s.emphasized && s.text.contains("total")));
        let st = stats(&rows);
        assert_eq!(st.added, 1);
        assert_eq!(st.removed, 2);
    }

    #[test]
    fn identical_texts_have_only_equal_rows() {
        let rows = side_by_side("a\nb", "a\nb");
        assert!(rows.iter().all(|r| r.kind == RowKind::Equal));
        assert_eq!(stats(&rows), DiffStats::default());
    }
}
