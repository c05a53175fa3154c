//! Color themes.
//!
//! Two built-ins: `dark` (ANSI 16 colors, safe on any terminal) and
//! `catppuccin-mocha` (RGB, needs truecolor).

use ratatui::style::Color;
use weave_core::types::{ChatMode, NoticeLevel, Role};

#[derive(Debug, Clone)]
pub struct Theme {
    pub border_active: Color,
    pub border_inactive: Color,

    // Conversation
    pub user: Color,
    pub assistant: Color,
    pub system: Color,
    /// Artifact markup lines inside a message.
    pub artifact: Color,
    pub spinner: Color,

    // Diff and merge panels
    pub diff_added: Color,
    pub diff_removed: Color,
    pub diff_context: Color,
    /// Background behind changed words within a replaced line.
    pub diff_emphasis_bg: Color,
    pub line_number: Color,

    // Toasts
    pub toast_info: Color,
    pub toast_success: Color,
    pub toast_warning: Color,
    pub toast_error: Color,

    // Status bar
    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    pub mode_builder: Color,
    pub mode_chat: Color,

    pub background: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            user: Color::Cyan,
            assistant: Color::Reset,
            system: Color::DarkGray,
            artifact: Color::Magenta,
            spinner: Color::Yellow,

            diff_added: Color::Green,
            diff_removed: Color::Red,
            diff_context: Color::Reset,
            diff_emphasis_bg: Color::DarkGray,
            line_number: Color::DarkGray,

            toast_info: Color::Blue,
            toast_success: Color::Green,
            toast_warning: Color::Yellow,
            toast_error: Color::Red,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            mode_builder: Color::Green,
            mode_chat: Color::Cyan,

            background: Color::Reset,
        }
    }

    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let green = Color::Rgb(166, 227, 161); // #a6e3a1
        let red = Color::Rgb(243, 139, 168); // #f38ba8
        let yellow = Color::Rgb(249, 226, 175); // #f9e2af
        let blue = Color::Rgb(137, 180, 250); // #89b4fa
        let mauve = Color::Rgb(203, 166, 247); // #cba6f7
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface1 = Color::Rgb(69, 71, 90); // #45475a
        let base = Color::Rgb(30, 30, 46); // #1e1e2e
        let text = Color::Rgb(205, 214, 244); // #cdd6f4
        let peach = Color::Rgb(250, 179, 135); // #fab387

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            user: blue,
            assistant: text,
            system: overlay1,
            artifact: mauve,
            spinner: peach,

            diff_added: green,
            diff_removed: red,
            diff_context: text,
            diff_emphasis_bg: surface1,
            line_number: overlay1,

            toast_info: blue,
            toast_success: green,
            toast_warning: yellow,
            toast_error: red,

            status_bar_bg: surface1,
            status_bar_fg: text,
            mode_builder: green,
            mode_chat: lavender,

            background: base,
        }
    }

    /// Resolves a config theme name. Unknown names fall back to `dark()`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                tracing::warn!(theme = other, "unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }

    pub fn role(&self, role: Role) -> Color {
        match role {
            Role::User => self.user,
            Role::Assistant => self.assistant,
            Role::System => self.system,
        }
    }

    pub fn notice(&self, level: NoticeLevel) -> Color {
        match level {
            NoticeLevel::Info => self.toast_info,
            NoticeLevel::Success => self.toast_success,
            NoticeLevel::Warning => self.toast_warning,
            NoticeLevel::Error => self.toast_error,
        }
    }

    pub fn chat_mode(&self, mode: ChatMode) -> Color {
        match mode {
            ChatMode::Builder => self.mode_builder,
            ChatMode::Chat => self.mode_chat,
        }
    }
}
