//! Chat history overlay (Ctrl-l).

use std::time::{SystemTime, UNIX_EPOCH};

use ratatui::{
    layout::Constraint,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, List, ListItem},
    Frame,
};

use crate::app::AppState;
use crate::theme::Theme;

/// Coarse "time ago" label for a Unix timestamp.
pub fn age_label(updated_at: i64, now: i64) -> String {
    let secs = (now - updated_at).max(0);
    match secs {
        0..60 => "just now".to_owned(),
        60..3600 => format!("{}m ago", secs / 60),
        3600..86400 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86400),
    }
}

pub fn render_chat_list(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let area = frame
        .area()
        .centered(Constraint::Percentage(60), Constraint::Percentage(70));
    frame.render_widget(Clear, area);

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default();

    let items: Vec<ListItem> = if state.chats.is_empty() {
        vec![ListItem::new("No saved chats")]
    } else {
        state
            .chats
            .iter()
            .map(|c| {
                ListItem::new(Line::from(vec![
                    Span::raw(c.title.clone()),
                    Span::styled(
                        format!("  {}", age_label(c.updated_at, now)),
                        Style::default().fg(theme.line_number),
                    ),
                ]))
            })
            .collect()
    };

    let list = List::new(items)
        .block(
            Block::bordered()
                .title(" Chats  Enter open · n new · Esc close ")
                .border_style(Style::default().fg(theme.border_active)),
        )
        .highlight_style(
            Style::default()
                .fg(theme.border_active)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, area, &mut state.chat_list_state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_labels() {
        assert_eq!(age_label(100, 130), "just now");
        assert_eq!(age_label(0, 600), "10m ago");
        assert_eq!(age_label(0, 7200), "2h ago");
        assert_eq!(age_label(0, 3 * 86400), "3d ago");
        assert_eq!(age_label(500, 100), "just now");
    }
}
