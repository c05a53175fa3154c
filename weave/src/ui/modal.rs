//! Blocking prompts raised by specific backend errors.

use ratatui::{
    layout::Constraint,
    style::Style,
    widgets::{Block, Clear, Paragraph, Wrap},
    Frame,
};
use weave_core::types::ModalKind;

use crate::app::AppState;
use crate::theme::Theme;

fn text(kind: ModalKind) -> (&'static str, &'static str) {
    match kind {
        ModalKind::QuotaLimit => (
            " Quota exhausted ",
            "Your quota is not enough for this request. Top up or switch to a cheaper model (Ctrl-n).",
        ),
        ModalKind::Login => (
            " Login required ",
            "The backend requires authentication. Set WEAVE_TOKEN or `token` in config.toml and restart.",
        ),
    }
}

pub fn render_modal(frame: &mut Frame, state: &AppState, theme: &Theme) {
    let Some(kind) = state.modal else {
        return;
    };
    let (title, body) = text(kind);
    let area = frame
        .area()
        .centered(Constraint::Percentage(50), Constraint::Length(7));
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(format!("{body}\n\nPress any key to dismiss."))
            .wrap(Wrap { trim: true })
            .block(
                Block::bordered()
                    .title(title)
                    .border_style(Style::default().fg(theme.toast_error)),
            ),
        area,
    );
}
