//! Three-panel merge overlay: original | modified | result.

use ratatui::{
    layout::{Constraint, Layout},
    style::Style,
    text::Line,
    widgets::{Block, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::AppState;
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block};

pub fn render_merge(frame: &mut Frame, state: &AppState, theme: &Theme) {
    let Some(merge) = state.merge.as_ref() else {
        return;
    };
    let area = frame
        .area()
        .centered(Constraint::Percentage(95), Constraint::Percentage(90));
    frame.render_widget(Clear, area);

    let title = format!(
        " Merge {}  block {}/{}  h original · l modified · Enter save · Esc cancel ",
        merge.path,
        (merge.selected + 1).min(merge.blocks.len()),
        merge.blocks.len()
    );
    frame.render_widget(
        Block::bordered()
            .title(title)
            .border_style(Style::default().fg(theme.border_active)),
        area,
    );

    let [original, modified, result] = inner_rect(area).layout(&Layout::horizontal([
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Fill(1),
    ]));

    let panels = [
        (original, "Original", merge.original.as_str(), theme.diff_removed),
        (modified, "Modified", merge.modified.as_str(), theme.diff_added),
        (result, "Result", merge.result.as_str(), theme.diff_context),
    ];
    for (rect, label, text, color) in panels {
        let lines: Vec<Line> = text
            .lines()
            .map(|l| Line::styled(l.to_owned(), Style::default().fg(color)))
            .collect();
        frame.render_widget(
            Paragraph::new(lines)
                .block(panel_block(label, label == "Result", theme))
                .wrap(Wrap { trim: false }),
            rect,
        );
    }
}
