//! Keybinding dispatcher for weave.
//!
//! Translates crossterm `KeyEvent`s into `AppState` mutations and returns a
//! `KeyAction` for the work that needs the chat session or file store. The
//! dispatcher branches first on `state.mode` so each overlay has an isolated
//! handler.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use std::time::Instant;
use weave_core::merge::Side;
use weave_core::ChatSelection;

use crate::app::{AppState, Mode};

/// What the event loop should do after a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    Quit,
    /// The input line was submitted with this text.
    Submit(String),
    Reload,
    Stop,
    ToggleMode,
    NextModel,
    /// Load chat history rows, then show the list.
    OpenChatList,
    SelectChat(ChatSelection),
    MergeApply { side: Side, block: usize },
    MergeComplete,
    MergeCancel,
}

/// Dispatches a key event to the handler for the current mode.
pub fn handle_key(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match state.mode {
        Mode::Input => handle_input(key, state),
        Mode::HelpOverlay => handle_help(key, state),
        Mode::ChatList => handle_chat_list(key, state),
        Mode::Diff => handle_diff(key, state),
        Mode::Merge => handle_merge(key, state),
        Mode::Modal => {
            state.close_overlay();
            KeyAction::Continue
        }
    }
}

// ---------------------------------------------------------------------------
// Input mode
// ---------------------------------------------------------------------------

fn handle_input(key: KeyEvent, state: &mut AppState) -> KeyAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let now = Instant::now();

    match key.code {
        KeyCode::Char('c') if ctrl => KeyAction::Quit,
        KeyCode::Char('r') if ctrl => KeyAction::Reload,
        KeyCode::Char('x') if ctrl => KeyAction::Stop,
        KeyCode::Char('n') if ctrl => KeyAction::NextModel,
        KeyCode::Char('l') if ctrl => KeyAction::OpenChatList,
        KeyCode::Tab => KeyAction::ToggleMode,

        KeyCode::Enter => KeyAction::Submit(state.input.clone()),
        KeyCode::Backspace => {
            state.input.pop();
            KeyAction::Continue
        }

        KeyCode::Up => {
            state.chat_scroll.scroll_up(1, now);
            KeyAction::Continue
        }
        KeyCode::Down => {
            state.chat_scroll.scroll_down(1, now);
            KeyAction::Continue
        }
        KeyCode::PageUp => {
            let page = usize::from(state.chat_viewport_height.max(1));
            state.chat_scroll.scroll_up(page, now);
            KeyAction::Continue
        }
        KeyCode::PageDown => {
            let page = usize::from(state.chat_viewport_height.max(1));
            state.chat_scroll.scroll_down(page, now);
            KeyAction::Continue
        }
        KeyCode::End => {
            state.chat_scroll.follow();
            KeyAction::Continue
        }

        // Single-key shortcuts only while nothing has been typed.
        KeyCode::Char('?') if state.input.is_empty() => {
            state.help_scroll = 0;
            state.mode = Mode::HelpOverlay;
            KeyAction::Continue
        }
        KeyCode::Char('q') if state.input.is_empty() => KeyAction::Quit,
        KeyCode::Esc if state.input.is_empty() => KeyAction::Quit,

        KeyCode::Char(c) if !ctrl => {
            state.input.push(c);
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

// ---------------------------------------------------------------------------
// Overlays
// ---------------------------------------------------------------------------

fn handle_help(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            state.help_scroll = state.help_scroll.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.help_scroll = state.help_scroll.saturating_sub(1);
        }
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q') => {
            state.mode = Mode::Input;
        }
        _ => {}
    }
    KeyAction::Continue
}

fn handle_chat_list(key: KeyEvent, state: &mut AppState) -> KeyAction {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            state.chat_list_state.scroll_down_by(1);
            KeyAction::Continue
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.chat_list_state.scroll_up_by(1);
            KeyAction::Continue
        }
        KeyCode::Char('n') => {
            state.mode = Mode::Input;
            KeyAction::SelectChat(ChatSelection(None))
        }
        KeyCode::Enter => {
            let selection = state
                .selected_chat()
                .and_then(|c| uuid::Uuid::parse_str(&c.id).ok());
            state.mode = Mode::Input;
            match selection {
                Some(id) => KeyAction::SelectChat(ChatSelection(Some(id))),
                None => KeyAction::Continue,
            }
        }
        KeyCode::Esc | KeyCode::Char('q') => {
            state.mode = Mode::Input;
            KeyAction::Continue
        }
        _ => KeyAction::Continue,
    }
}

fn handle_diff(key: KeyEvent, state: &mut AppState) -> KeyAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.scroll_diff(true, 1),
        KeyCode::Char('k') | KeyCode::Up => state.scroll_diff(false, 1),
        KeyCode::Char('d') if ctrl => state.scroll_diff(true, 15),
        KeyCode::Char('u') if ctrl => state.scroll_diff(false, 15),
        KeyCode::Esc | KeyCode::Char('q') => state.close_overlay(),
        _ => {}
    }
    KeyAction::Continue
}

fn handle_merge(key: KeyEvent, state: &mut AppState) -> KeyAction {
    let block = state.merge.as_ref().map_or(0, |m| m.selected);
    match key.code {
        KeyCode::Char('h') => KeyAction::MergeApply { side: Side::Original, block },
        KeyCode::Char('l') => KeyAction::MergeApply { side: Side::Modified, block },
        KeyCode::Char('j') | KeyCode::Down => {
            state.select_merge_block(true);
            KeyAction::Continue
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.select_merge_block(false);
            KeyAction::Continue
        }
        KeyCode::Enter => KeyAction::MergeComplete,
        KeyCode::Esc => KeyAction::MergeCancel,
        _ => KeyAction::Continue,
    }
}

// ---------------------------------------------------------------------------
// Mouse events
// ---------------------------------------------------------------------------

/// Scroll wheel moves the chat, diff, or help view by 3 lines.
pub fn handle_mouse(mouse: MouseEvent, state: &mut AppState) -> KeyAction {
    let down = match mouse.kind {
        MouseEventKind::ScrollDown => true,
        MouseEventKind::ScrollUp => false,
        _ => return KeyAction::Continue,
    };
    let now = Instant::now();
    match state.mode {
        Mode::HelpOverlay if down => state.help_scroll = state.help_scroll.saturating_add(3),
        Mode::HelpOverlay => state.help_scroll = state.help_scroll.saturating_sub(3),
        Mode::Diff => state.scroll_diff(down, 3),
        Mode::Input if down => state.chat_scroll.scroll_down(3, now),
        Mode::Input => state.chat_scroll.scroll_up(3, now),
        _ => {}
    }
    KeyAction::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::MergeView;
    use weave_core::types::ChatSummary;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            handle_key(press(KeyCode::Char(c)), state);
        }
    }

    #[test]
    fn typing_then_enter_submits_the_line() {
        let mut state = AppState::default();
        type_text(&mut state, "hi q?");
        assert_eq!(state.input, "hi q?");
        assert_eq!(handle_key(press(KeyCode::Enter), &mut state), KeyAction::Submit("hi q?".into()));
    }

    #[test]
    fn shortcuts_only_when_input_empty() {
        let mut state = AppState::default();
        assert_eq!(handle_key(press(KeyCode::Char('?')), &mut state), KeyAction::Continue);
        assert_eq!(state.mode, Mode::HelpOverlay);
        handle_key(press(KeyCode::Esc), &mut state);
        assert_eq!(state.mode, Mode::Input);
        assert_eq!(handle_key(press(KeyCode::Char('q')), &mut state), KeyAction::Quit);
    }

    #[test]
    fn esc_keeps_a_typed_draft() {
        let mut state = AppState::default();
        type_text(&mut state, "draft");
        assert_eq!(handle_key(press(KeyCode::Esc), &mut state), KeyAction::Continue);
        assert_eq!(state.input, "draft");

        state.input.clear();
        assert_eq!(handle_key(press(KeyCode::Esc), &mut state), KeyAction::Quit);
    }

    #[test]
    fn control_keys_map_to_session_actions() {
        let mut state = AppState::default();
        assert_eq!(handle_key(ctrl('r'), &mut state), KeyAction::Reload);
        assert_eq!(handle_key(ctrl('x'), &mut state), KeyAction::Stop);
        assert_eq!(handle_key(ctrl('n'), &mut state), KeyAction::NextModel);
        assert_eq!(handle_key(ctrl('l'), &mut state), KeyAction::OpenChatList);
        assert_eq!(handle_key(press(KeyCode::Tab), &mut state), KeyAction::ToggleMode);
        assert!(state.input.is_empty());
    }

    #[test]
    fn chat_list_enter_selects_uuid_rows() {
        let id = uuid::Uuid::new_v4();
        let mut state = AppState::default();
        state.open_chat_list(vec![
            ChatSummary { id: "not-a-uuid".into(), title: "x".into(), updated_at: 0 },
            ChatSummary { id: id.to_string(), title: "y".into(), updated_at: 0 },
        ]);
        handle_key(press(KeyCode::Char('j')), &mut state);
        assert_eq!(
            handle_key(press(KeyCode::Enter), &mut state),
            KeyAction::SelectChat(ChatSelection(Some(id)))
        );
        assert_eq!(state.mode, Mode::Input);
    }

    #[test]
    fn merge_keys_target_selected_block() {
        let mut state = AppState::default();
        state.mode = Mode::Merge;
        state.merge = Some(MergeView {
            path: "a.js".into(),
            original: "a".into(),
            modified: "b".into(),
            blocks: Vec::new(),
            result: String::new(),
            selected: 0,
        });
        assert_eq!(
            handle_key(press(KeyCode::Char('h')), &mut state),
            KeyAction::MergeApply { side: Side::Original, block: 0 }
        );
        assert_eq!(
            handle_key(press(KeyCode::Char('l')), &mut state),
            KeyAction::MergeApply { side: Side::Modified, block: 0 }
        );
        assert_eq!(handle_key(press(KeyCode::Enter), &mut state), KeyAction::MergeComplete);
        assert_eq!(handle_key(press(KeyCode::Esc), &mut state), KeyAction::MergeCancel);
    }

    #[test]
    fn modal_is_dismissed_by_any_key() {
        let mut state = AppState::default();
        state.push_notices(
            vec![weave_core::types::Notice::Modal(weave_core::types::ModalKind::Login)],
            Instant::now(),
        );
        handle_key(press(KeyCode::Char('x')), &mut state);
        assert_eq!(state.mode, Mode::Input);
        assert!(state.modal.is_none());
        assert!(state.input.is_empty());
    }
}
