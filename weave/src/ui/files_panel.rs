//! Workspace files sidebar.
//!
//! Each entry shows a badge comparing it with the baseline from history:
//! `A` (no baseline), `M` (differs), blank (unchanged).

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem},
    Frame,
};

use crate::theme::Theme;
use crate::ui::layout::panel_block;
use crate::ui::{FileBadge, FileEntry};

pub fn render_files(frame: &mut Frame, area: Rect, files: &[FileEntry], theme: &Theme) {
    let title = if files.is_empty() {
        "Files".to_owned()
    } else {
        format!("Files ({})", files.len())
    };
    let block = panel_block(&title, false, theme);

    let items: Vec<ListItem> = if files.is_empty() {
        vec![ListItem::new(Line::raw("No files yet"))]
    } else {
        files.iter().map(|f| file_item(f, theme)).collect()
    };
    frame.render_widget(List::new(items).block(block), area);
}

fn file_item(entry: &FileEntry, theme: &Theme) -> ListItem<'static> {
    let (badge, color) = match entry.badge {
        FileBadge::Added => ("A ", theme.diff_added),
        FileBadge::Modified => ("M ", theme.toast_warning),
        FileBadge::Unchanged => ("  ", theme.diff_context),
    };
    ListItem::new(Line::from(vec![
        Span::styled(badge, Style::default().fg(color)),
        Span::raw(entry.path.clone()),
    ]))
}
