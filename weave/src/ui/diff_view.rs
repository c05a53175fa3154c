//! Side-by-side diff overlay.
//!
//! Rows come precomputed from `weave_core::diff::side_by_side`; only the
//! visible window is turned into `Line`s each frame.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph},
    Frame,
};
use weave_core::diff::{stats, DiffRow, RowKind, Segment};

use crate::app::AppState;
use crate::theme::Theme;
use crate::ui::layout::inner_rect;

pub fn render_diff(frame: &mut Frame, state: &AppState, theme: &Theme) {
    let Some(diff) = state.diff.as_ref() else {
        return;
    };
    let area = frame
        .area()
        .centered(Constraint::Percentage(95), Constraint::Percentage(90));
    frame.render_widget(Clear, area);

    let st = stats(&diff.rows);
    let title = format!(
        " {}  +{} -{}  (j/k scroll, Esc close) ",
        diff.path, st.added, st.removed
    );
    frame.render_widget(
        Block::bordered()
            .title(title)
            .border_style(Style::default().fg(theme.border_active)),
        area,
    );

    let inner = inner_rect(area);
    if diff.rows.is_empty() {
        frame.render_widget(Paragraph::new("Files are identical and empty."), inner);
        return;
    }
    let [left, right] =
        inner.layout(&Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]));

    let height = usize::from(inner.height);
    let start = diff.scroll.min(diff.rows.len().saturating_sub(1));
    let window = &diff.rows[start..(start + height).min(diff.rows.len())];

    let old: Vec<Line> = window.iter().map(|r| side_line(r, true, theme)).collect();
    let new: Vec<Line> = window.iter().map(|r| side_line(r, false, theme)).collect();
    frame.render_widget(Paragraph::new(old), left);
    frame.render_widget(Paragraph::new(new), right);
}

fn side_line(row: &DiffRow, old_side: bool, theme: &Theme) -> Line<'static> {
    let (lineno, segments) = if old_side {
        (row.old_lineno, &row.old)
    } else {
        (row.new_lineno, &row.new)
    };
    let Some(n) = lineno else {
        return Line::raw("");
    };
    let color = match (row.kind, old_side) {
        (RowKind::Equal, _) => theme.diff_context,
        (_, true) => theme.diff_removed,
        (_, false) => theme.diff_added,
    };
    let mut spans = vec![Span::styled(format!("{n:>4} "), Style::default().fg(theme.line_number))];
    spans.extend(segments.iter().map(|s| segment_span(s, color, theme)));
    Line::from(spans)
}

fn segment_span(seg: &Segment, color: ratatui::style::Color, theme: &Theme) -> Span<'static> {
    let style = if seg.emphasized {
        Style::default()
            .fg(color)
            .bg(theme.diff_emphasis_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color)
    };
    Span::styled(seg.text.trim_end_matches('\n').to_owned(), style)
}
