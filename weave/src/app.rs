//! Central UI state for weave.
//!
//! Pure state read by the renderer and mutated by the keybinding dispatcher.
//! Conversation data lives in `weave_core::ChatSession`; this module only
//! tracks what the terminal shows: mode, input line, scroll position,
//! overlays, toasts.

use std::time::{Duration, Instant};

use ratatui::widgets::ListState;
use weave_core::diff::DiffRow;
use weave_core::merge::ConflictBlock;
use weave_core::types::{ChatSummary, ModalKind, Notice, NoticeLevel};

/// How long a manual scroll suspends following new output.
pub const SCROLL_COOLDOWN: Duration = Duration::from_secs(3);

/// How long a toast stays on screen.
pub const TOAST_TTL: Duration = Duration::from_secs(4);

/// Which keybinding set is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Typing into the input line (default).
    #[default]
    Input,
    HelpOverlay,
    ChatList,
    Diff,
    Merge,
    /// Quota or login prompt; any key dismisses it.
    Modal,
}

/// Chat panel scroll position with auto-follow.
///
/// New content keeps the view pinned to the bottom unless the user scrolled
/// within the last [`SCROLL_COOLDOWN`].
#[derive(Debug, Default, Clone)]
pub struct ChatScroll {
    /// First visible line.
    pub offset: usize,
    /// Largest offset seen by the last [`ChatScroll::resolve`].
    bottom: usize,
    last_manual: Option<Instant>,
}

impl ChatScroll {
    pub fn scroll_up(&mut self, lines: usize, now: Instant) {
        self.offset = self.offset.saturating_sub(lines);
        self.last_manual = Some(now);
    }

    /// Reaching the bottom resumes following right away.
    pub fn scroll_down(&mut self, lines: usize, now: Instant) {
        self.offset = self.offset.saturating_add(lines);
        if self.offset >= self.bottom {
            self.offset = self.bottom;
            self.follow();
        } else {
            self.last_manual = Some(now);
        }
    }

    /// Drops the cooldown so the next frame snaps to the bottom.
    pub fn follow(&mut self) {
        self.last_manual = None;
    }

    pub fn is_following(&self, now: Instant) -> bool {
        self.last_manual
            .is_none_or(|t| now.saturating_duration_since(t) >= SCROLL_COOLDOWN)
    }

    /// Clamps the offset for a frame with `total` lines and `viewport` rows,
    /// pinning to the bottom while following.
    pub fn resolve(&mut self, total: usize, viewport: usize, now: Instant) -> usize {
        let max = total.saturating_sub(viewport);
        self.bottom = max;
        self.offset = if self.is_following(now) { max } else { self.offset.min(max) };
        self.offset
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub level: NoticeLevel,
    pub text: String,
    pub shown_at: Instant,
}

/// Side-by-side diff overlay.
#[derive(Debug, Clone)]
pub struct DiffView {
    pub path: String,
    pub rows: Vec<DiffRow>,
    pub scroll: usize,
}

/// Merge overlay contents, refreshed after each apply.
#[derive(Debug, Clone)]
pub struct MergeView {
    /// Workspace file the result will be written to.
    pub path: String,
    pub original: String,
    pub modified: String,
    pub blocks: Vec<ConflictBlock>,
    pub result: String,
    /// Block the `h`/`l` keys apply.
    pub selected: usize,
}

pub struct AppState {
    pub mode: Mode,
    pub input: String,
    pub chat_scroll: ChatScroll,
    pub chat_viewport_height: u16,
    pub help_scroll: u16,

    pub toasts: Vec<Toast>,
    pub modal: Option<ModalKind>,

    pub chats: Vec<ChatSummary>,
    pub chat_list_state: ListState,

    pub diff: Option<DiffView>,
    pub merge: Option<MergeView>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            input: String::new(),
            chat_scroll: ChatScroll::default(),
            chat_viewport_height: 0,
            help_scroll: 0,
            toasts: Vec::new(),
            modal: None,
            chats: Vec::new(),
            chat_list_state: ListState::default(),
            diff: None,
            merge: None,
        }
    }
}

impl AppState {
    /// Turns core notices into toasts or the modal prompt.
    pub fn push_notices(&mut self, notices: Vec<Notice>, now: Instant) {
        for notice in notices {
            match notice {
                Notice::Toast { level, text } => self.toasts.push(Toast { level, text, shown_at: now }),
                Notice::Modal(kind) => {
                    self.modal = Some(kind);
                    self.mode = Mode::Modal;
                }
            }
        }
    }

    pub fn toast(&mut self, notice: Notice) {
        self.push_notices(vec![notice], Instant::now());
    }

    pub fn expire_toasts(&mut self, now: Instant) {
        self.toasts
            .retain(|t| now.saturating_duration_since(t.shown_at) < TOAST_TTL);
    }

    pub fn open_chat_list(&mut self, chats: Vec<ChatSummary>) {
        self.chat_list_state
            .select(if chats.is_empty() { None } else { Some(0) });
        self.chats = chats;
        self.mode = Mode::ChatList;
    }

    pub fn selected_chat(&self) -> Option<&ChatSummary> {
        self.chat_list_state.selected().and_then(|i| self.chats.get(i))
    }

    pub fn open_diff(&mut self, path: &str, rows: Vec<DiffRow>) {
        self.diff = Some(DiffView { path: path.to_owned(), rows, scroll: 0 });
        self.mode = Mode::Diff;
    }

    pub fn close_overlay(&mut self) {
        self.diff = None;
        self.merge = None;
        self.modal = None;
        self.mode = Mode::Input;
    }

    pub fn scroll_diff(&mut self, down: bool, lines: usize) {
        if let Some(diff) = self.diff.as_mut() {
            diff.scroll = if down {
                (diff.scroll + lines).min(diff.rows.len().saturating_sub(1))
            } else {
                diff.scroll.saturating_sub(lines)
            };
        }
    }

    /// Moves the merge block cursor, clamped to the known blocks.
    pub fn select_merge_block(&mut self, down: bool) {
        if let Some(merge) = self.merge.as_mut() {
            let last = merge.blocks.len().saturating_sub(1);
            merge.selected = if down {
                (merge.selected + 1).min(last)
            } else {
                merge.selected.saturating_sub(1)
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_until_manual_scroll_then_resumes_after_cooldown() {
        let start = Instant::now();
        let mut scroll = ChatScroll::default();
        assert_eq!(scroll.resolve(100, 20, start), 80);

        scroll.scroll_up(30, start);
        assert_eq!(scroll.resolve(120, 20, start + Duration::from_secs(1)), 50);

        let later = start + SCROLL_COOLDOWN + Duration::from_millis(1);
        assert_eq!(scroll.resolve(120, 20, later), 100);
    }

    #[test]
    fn scrolling_back_to_bottom_resumes_following() {
        let start = Instant::now();
        let mut scroll = ChatScroll::default();
        scroll.resolve(100, 20, start);

        scroll.scroll_up(5, start);
        scroll.scroll_down(2, start);
        assert!(!scroll.is_following(start));
        assert_eq!(scroll.resolve(100, 20, start), 77);

        scroll.scroll_down(10, start);
        assert!(scroll.is_following(start));
        assert_eq!(scroll.resolve(130, 20, start), 110);
    }

    #[test]
    fn short_conversations_stay_at_top() {
        let mut scroll = ChatScroll::default();
        assert_eq!(scroll.resolve(5, 20, Instant::now()), 0);
    }

    #[test]
    fn follow_cancels_cooldown() {
        let now = Instant::now();
        let mut scroll = ChatScroll::default();
        scroll.scroll_up(1, now);
        assert!(!scroll.is_following(now));
        scroll.follow();
        assert!(scroll.is_following(now));
    }

    #[test]
    fn modal_notice_switches_mode_and_toasts_expire() {
        let now = Instant::now();
        let mut state = AppState::default();
        state.push_notices(
            vec![Notice::error("Quota not enough"), Notice::Modal(ModalKind::QuotaLimit)],
            now,
        );
        assert_eq!(state.mode, Mode::Modal);
        assert_eq!(state.modal, Some(ModalKind::QuotaLimit));
        assert_eq!(state.toasts.len(), 1);

        state.expire_toasts(now + TOAST_TTL);
        assert!(state.toasts.is_empty());
    }

    #[test]
    fn chat_list_selects_first_row() {
        let mut state = AppState::default();
        state.open_chat_list(vec![ChatSummary { id: "a".into(), title: "A".into(), updated_at: 0 }]);
        assert_eq!(state.mode, Mode::ChatList);
        assert_eq!(state.selected_chat().map(|c| c.id.as_str()), Some("a"));

        state.open_chat_list(Vec::new());
        assert!(state.selected_chat().is_none());
    }
}
