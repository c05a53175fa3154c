//! Screen layout and the always-visible chrome (input line, status bar).
//!
//! Pure layout arithmetic is recomputed every frame from `frame.area()`, so
//! resizes need no handling beyond the next render.
//!
//! | Terminal width | Layout |
//! |----------------|--------|
//! | `< 100` cols   | Files panel collapsed; chat fills the width |
//! | `>= 100` cols  | Files panel (25%) beside the chat (75%) |

use std::time::{SystemTime, UNIX_EPOCH};

use ratatui::{
    layout::{Constraint, Layout, Margin, Rect, Spacing},
    style::{Modifier, Style},
    symbols::merge::MergeStrategy,
    text::{Line, Span},
    widgets::{Block, BorderType, Paragraph},
    Frame,
};

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use crate::ui::SessionView;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Returns `[files, chat, input, status_bar]` for the current frame.
pub fn compute_layout(frame: &Frame) -> [Rect; 4] {
    let [main_area, input, status_bar] = frame.area().layout(&Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(3),
        Constraint::Length(1),
    ]));

    let horizontal = if frame.area().width >= 100 {
        Layout::horizontal([Constraint::Percentage(25), Constraint::Percentage(75)])
    } else {
        Layout::horizontal([Constraint::Length(0), Constraint::Fill(1)])
    }
    .spacing(Spacing::Overlap(1));
    let [files, chat] = main_area.layout(&horizontal);

    [files, chat, input, status_bar]
}

/// Inner `Rect` of a bordered panel.
pub fn inner_rect(area: Rect) -> Rect {
    area.inner(Margin { vertical: 1, horizontal: 1 })
}

/// Bordered block: thick when focused, plain otherwise.
///
/// `MergeStrategy::Fuzzy` because `Exact` draws wrong junctions where thick
/// and plain borders meet.
pub fn panel_block<'a>(title: &'a str, is_focused: bool, theme: &'a Theme) -> Block<'a> {
    let border_style = if is_focused {
        Style::default().fg(theme.border_active)
    } else {
        Style::default().fg(theme.border_inactive)
    };
    let border_type = if is_focused { BorderType::Thick } else { BorderType::Plain };

    Block::bordered()
        .title(title)
        .border_type(border_type)
        .border_style(border_style)
        .merge_borders(MergeStrategy::Fuzzy)
}

/// Spinner glyph for the current wall-clock time.
pub fn spinner_frame() -> &'static str {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    SPINNER[(millis / 120 % SPINNER.len() as u128) as usize]
}

/// Input line with a cursor block and the pending attachment count.
pub fn render_input(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    view: &SessionView<'_>,
    theme: &Theme,
) {
    let title = if view.attachments > 0 {
        format!("Message ({} attached)", view.attachments)
    } else {
        "Message".to_owned()
    };
    let focused = state.mode == Mode::Input;
    let block = panel_block(&title, focused, theme);

    // Keep the tail of long input visible.
    let width = usize::from(inner_rect(area).width.saturating_sub(1));
    let chars = state.input.chars().count();
    let visible: String = state.input.chars().skip(chars.saturating_sub(width)).collect();

    let mut spans = vec![Span::raw(visible)];
    if focused {
        spans.push(Span::styled(" ", Style::default().add_modifier(Modifier::REVERSED)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

/// One-row status bar: chat mode, model, activity, and the newest toast.
pub fn render_status_bar(
    frame: &mut Frame,
    area: Rect,
    state: &AppState,
    view: &SessionView<'_>,
    theme: &Theme,
) {
    let mode_span = Span::styled(
        format!(" {} ", view.mode.as_str().to_uppercase()),
        Style::default()
            .fg(theme.chat_mode(view.mode))
            .add_modifier(Modifier::BOLD),
    );
    let mut spans = vec![mode_span, Span::raw(format!(" {} ", view.model))];

    if view.loading {
        spans.push(Span::styled(
            format!(" {} thinking ", spinner_frame()),
            Style::default().fg(theme.spinner),
        ));
    }
    if view.uploading {
        spans.push(Span::styled(" uploading… ", Style::default().fg(theme.spinner)));
    }
    if !view.pending_commands.is_empty() {
        spans.push(Span::styled(
            format!(" {} command(s) to run ", view.pending_commands.len()),
            Style::default().fg(theme.toast_warning),
        ));
    }
    if let Some(toast) = state.toasts.last() {
        spans.push(Span::raw(" │ "));
        spans.push(Span::styled(
            toast.text.clone(),
            Style::default().fg(theme.notice(toast.level)),
        ));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans))
            .style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg)),
        area,
    );
}
