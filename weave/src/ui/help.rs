//! Help overlay.
//!
//! Drawn inside the same `terminal.draw()` closure as the panels; `Clear`
//! erases the background first so the modal sits on top.

use ratatui::{
    layout::Constraint,
    text::{Line, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
    Frame,
};

use crate::theme::Theme;

/// Renders the help overlay, scrolled by `help_scroll` rows.
///
/// Skipped below 60 columns, where the centred area would be too small.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme, help_scroll: u16) {
    if frame.area().width < 60 {
        return;
    }

    let overlay_area = frame
        .area()
        .centered(Constraint::Percentage(80), Constraint::Percentage(80));
    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Help  j/k scroll, ? or Esc to dismiss ")
        .border_style(ratatui::style::Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(build_help_text())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((help_scroll, 0)),
        overlay_area,
    );
}

fn build_help_text() -> Text<'static> {
    Text::from(vec![
        Line::from("Chat"),
        Line::from("  Enter          Send the message"),
        Line::from("  Ctrl-r         Regenerate the last reply"),
        Line::from("  Ctrl-x         Stop the reply in progress"),
        Line::from("  Tab            Toggle Builder / Chat mode"),
        Line::from("  Ctrl-n         Next model"),
        Line::from("  Ctrl-l         Open chat history"),
        Line::from("  Up / Down      Scroll one line (pauses auto-scroll for 3s)"),
        Line::from("  PgUp / PgDn    Scroll one page"),
        Line::from("  End            Resume following new output"),
        Line::from(""),
        Line::from("Commands"),
        Line::from("  /new               Start a new chat"),
        Line::from("  /attach <paths>    Upload images for the next message (max 5 MB each)"),
        Line::from("  /diff <path>       Compare a file with its previous version"),
        Line::from("  /merge <path>      Merge the previous and current version of a file"),
        Line::from(""),
        Line::from("Merge editor"),
        Line::from("  h / l          Apply original / modified block"),
        Line::from("  j / k          Select block"),
        Line::from("  Enter          Save the result into the file"),
        Line::from("  Esc            Cancel"),
        Line::from(""),
        Line::from("General"),
        Line::from("  ?              Open / close this help (when the input is empty)"),
        Line::from("  q / Esc        Quit"),
    ])
}
