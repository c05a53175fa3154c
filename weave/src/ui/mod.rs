//! UI rendering for weave.
//!
//! `render()` is the single entry point called inside `terminal.draw()`. It
//! reads `AppState` plus a borrowed [`SessionView`] of the core state, so no
//! rendering code ever touches the session directly.

mod layout;
pub mod chat_list;
pub mod chat_view;
pub mod diff_view;
pub mod files_panel;
pub mod help;
pub mod keybindings;
pub mod merge_view;
pub mod modal;

use ratatui::{style::Style, widgets::Block, Frame};
use weave_core::types::{ChatMode, Message};

use crate::app::{AppState, Mode};
use crate::theme::Theme;
use layout::{compute_layout, inner_rect, render_input, render_status_bar};

/// How a workspace file compares with its baseline, for the files panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileBadge {
    /// No baseline: created during this session.
    Added,
    Modified,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: String,
    pub badge: FileBadge,
}

/// Read-only snapshot of core state for one frame.
pub struct SessionView<'a> {
    pub messages: &'a [Message],
    pub loading: bool,
    pub model: &'a str,
    pub mode: ChatMode,
    pub uploading: bool,
    pub attachments: usize,
    pub pending_commands: &'a [String],
    pub files: Vec<FileEntry>,
}

/// Renders one complete frame.
///
/// The chat viewport height is written back into `state` so PageUp/PageDown
/// on the next keypress scroll by a full page.
pub fn render(frame: &mut Frame, state: &mut AppState, view: &SessionView<'_>, theme: &Theme) {
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.background)),
        frame.area(),
    );
    let [files, chat, input, status_bar] = compute_layout(frame);
    state.chat_viewport_height = inner_rect(chat).height;

    if files.width > 0 {
        files_panel::render_files(frame, files, &view.files, theme);
    }
    chat_view::render_chat(frame, chat, state, view, theme);
    render_input(frame, input, state, view, theme);
    render_status_bar(frame, status_bar, state, view, theme);

    // Overlays sit on top of everything drawn above.
    match state.mode {
        Mode::HelpOverlay => help::render_help_overlay(frame, theme, state.help_scroll),
        Mode::ChatList => chat_list::render_chat_list(frame, state, theme),
        Mode::Diff => diff_view::render_diff(frame, state, theme),
        Mode::Merge => merge_view::render_merge(frame, state, theme),
        Mode::Modal => modal::render_modal(frame, state, theme),
        Mode::Input => {}
    }
}
