//! Conversation panel.
//!
//! Messages are flattened into pre-wrapped display rows so the scroll math
//! knows the exact line count. Artifact markup is folded: a file action shows
//! as one `▸ path` row instead of the whole file body.

use std::time::Instant;

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::Paragraph,
    Frame,
};
use unicode_width::UnicodeWidthChar;
use weave_core::types::{Message, Role};

use crate::app::AppState;
use crate::theme::Theme;
use crate::ui::layout::{inner_rect, panel_block, spinner_frame};
use crate::ui::SessionView;

/// Semantic class of a display row, mapped to a theme color at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStyle {
    Header(Role),
    Body(Role),
    Artifact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub text: String,
    pub style: RowStyle,
}

fn attr<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let key = format!("{name}=\"");
    let start = tag.find(&key)? + key.len();
    let len = tag[start..].find('"')?;
    Some(&tag[start..start + len])
}

/// Flattens one message into logical rows (before wrapping).
pub fn message_rows(message: &Message) -> Vec<DisplayRow> {
    let header = match message.role {
        Role::User => "you",
        Role::Assistant => "assistant",
        Role::System => "system",
    };
    let mut rows = vec![DisplayRow { text: header.to_owned(), style: RowStyle::Header(message.role) }];
    if let Some(attachments) = message.attachments.as_deref() {
        for a in attachments {
            rows.push(DisplayRow { text: format!("  [image] {}", a.name), style: RowStyle::Artifact });
        }
    }

    let mut in_file = false;
    for line in message.content.lines() {
        let trimmed = line.trim_start();
        if in_file {
            if trimmed.contains("</boltAction>") {
                in_file = false;
            }
            continue;
        }
        if trimmed.starts_with("<boltArtifact") {
            let title = attr(trimmed, "title").unwrap_or("artifact");
            rows.push(DisplayRow { text: format!("▾ {title}"), style: RowStyle::Artifact });
        } else if trimmed.starts_with("</boltArtifact>") {
            continue;
        } else if trimmed.starts_with("<boltAction") {
            match attr(trimmed, "type") {
                Some("file") => {
                    let path = attr(trimmed, "filePath").unwrap_or("?");
                    rows.push(DisplayRow { text: format!("  ▸ {path}"), style: RowStyle::Artifact });
                    in_file = !trimmed.contains("</boltAction>");
                }
                _ => {
                    let command = trimmed
                        .split_once('>')
                        .map_or("", |(_, rest)| rest)
                        .trim_end_matches("</boltAction>")
                        .trim();
                    rows.push(DisplayRow { text: format!("  $ {command}"), style: RowStyle::Artifact });
                }
            }
        } else {
            rows.push(DisplayRow { text: line.to_owned(), style: RowStyle::Body(message.role) });
        }
    }
    rows
}

/// Splits `text` into chunks no wider than `width` terminal columns.
///
/// A double-width glyph that would straddle the edge moves to the next row.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    if width == 0 || text.is_empty() {
        return vec![text.to_owned()];
    }
    let mut rows = Vec::new();
    let mut current = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width && !current.is_empty() {
            rows.push(std::mem::take(&mut current));
            used = 0;
        }
        current.push(c);
        used += w;
    }
    rows.push(current);
    rows
}

fn row_style(style: RowStyle, theme: &Theme) -> Style {
    match style {
        RowStyle::Header(role) => Style::default().fg(theme.role(role)).add_modifier(Modifier::BOLD),
        RowStyle::Body(role) => Style::default().fg(theme.role(role)),
        RowStyle::Artifact => Style::default().fg(theme.artifact),
    }
}

pub fn render_chat(
    frame: &mut Frame,
    area: Rect,
    state: &mut AppState,
    view: &SessionView<'_>,
    theme: &Theme,
) {
    let block = panel_block("Chat", true, theme);
    let inner = inner_rect(area);
    frame.render_widget(block, area);

    let width = usize::from(inner.width);
    let mut lines: Vec<Line> = Vec::new();
    for message in view.messages.iter().filter(|m| m.role != Role::System) {
        for row in message_rows(message) {
            let style = row_style(row.style, theme);
            lines.extend(wrap(&row.text, width).into_iter().map(|t| Line::styled(t, style)));
        }
        lines.push(Line::raw(""));
    }
    if view.loading {
        lines.push(Line::styled(format!("{} …", spinner_frame()), Style::default().fg(theme.spinner)));
    }
    if lines.is_empty() {
        lines.push(Line::styled(
            "Ask for something to build. Press ? for help.",
            Style::default().fg(theme.system),
        ));
    }

    let offset = state
        .chat_scroll
        .resolve(lines.len(), usize::from(inner.height), Instant::now());
    let visible: Vec<Line> = lines.into_iter().skip(offset).take(usize::from(inner.height)).collect();
    frame.render_widget(Paragraph::new(visible), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_actions_fold_to_one_row() {
        let msg = Message::with_id(
            "a",
            Role::Assistant,
            "Done.\n<boltArtifact id=\"x\" title=\"Todo\">\n<boltAction type=\"file\" filePath=\"src/a.js\">\nline 1\nline 2\n</boltAction>\n<boltAction type=\"shell\">npm install</boltAction>\n</boltArtifact>",
        );
        let texts: Vec<String> = message_rows(&msg).into_iter().map(|r| r.text).collect();
        assert_eq!(texts, ["assistant", "Done.", "▾ Todo", "  ▸ src/a.js", "  $ npm install"]);
    }

    #[test]
    fn wrap_splits_on_char_boundaries() {
        assert_eq!(wrap("abcdé", 2), ["ab", "cd", "é"]);
        assert_eq!(wrap("", 4), [""]);
    }

    #[test]
    fn wrap_measures_display_width() {
        assert_eq!(wrap("日本語テキスト", 4), ["日本", "語テ", "キス", "ト"]);
        assert_eq!(wrap("a日本", 4), ["a日", "本"]);
    }
}
