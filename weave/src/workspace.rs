//! Glue between the UI and `weave-core`.
//!
//! `Workspace` owns the chat session, the file store, the upload queue and the
//! merge editor, and carries out the `KeyAction`s the keybinding dispatcher
//! cannot handle on `AppState` alone. Slow work (uploads, history listing)
//! runs on spawned tasks that report back through the event bus.

use std::time::Instant;

use tokio::sync::mpsc::UnboundedSender;
use weave_core::diff::side_by_side;
use weave_core::merge::{MergeEditor, Side, MODIFIED_FILE, ORIGINAL_FILE, RESULT_FILE};
use weave_core::types::Notice;
use weave_core::upload::{upload_all, PendingFile, UploadQueue};
use weave_core::{db, ChatSelection, ChatSession, FileStore, Transport, TransportEvent};

use crate::api::ApiClient;
use crate::app::{AppState, MergeView, Mode};
use crate::command::{self, InputCommand};
use crate::event::AppEvent;
use crate::ui::keybindings::KeyAction;
use crate::ui::{FileBadge, FileEntry, SessionView};

const CHAT_LIST_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Workspace<T: Transport> {
    pub session: ChatSession<T>,
    pub files: FileStore,
    pub uploads: UploadQueue,
    merge: MergeEditor,
    api: ApiClient,
    events: UnboundedSender<AppEvent>,
}

impl<T: Transport> Workspace<T> {
    pub fn new(session: ChatSession<T>, api: ApiClient, events: UnboundedSender<AppEvent>) -> Self {
        Self {
            session,
            files: FileStore::new(),
            uploads: UploadQueue::new(),
            merge: MergeEditor::new(),
            api,
            events,
        }
    }

    /// Borrowed snapshot of the session for the next frame.
    pub fn view(&self) -> SessionView<'_> {
        let files = self
            .files
            .all()
            .iter()
            .filter(|(path, _)| ![ORIGINAL_FILE, MODIFIED_FILE, RESULT_FILE].contains(&path.as_str()))
            .map(|(path, content)| FileEntry {
                path: path.clone(),
                badge: match self.files.old_content(path) {
                    None => FileBadge::Added,
                    Some(old) if old != content => FileBadge::Modified,
                    Some(_) => FileBadge::Unchanged,
                },
            })
            .collect();
        SessionView {
            messages: self.session.messages(),
            loading: self.session.is_loading(),
            model: &self.session.model().label,
            mode: self.session.mode(),
            uploading: self.uploads.is_busy(),
            attachments: self.uploads.attachments().len(),
            pending_commands: self.session.pending_commands(),
            files,
        }
    }

    /// Moves queued core notices into the UI.
    pub fn drain_notices(&mut self, state: &mut AppState) {
        let now = Instant::now();
        state.push_notices(self.session.take_notices(), now);
        state.push_notices(self.uploads.take_notices(), now);
    }

    pub async fn perform(&mut self, action: KeyAction, state: &mut AppState) -> Flow {
        match action {
            KeyAction::Continue => {}
            KeyAction::Quit => return Flow::Quit,
            KeyAction::Submit(text) => self.submit(text, state).await,
            KeyAction::Reload => self.session.reload(),
            KeyAction::Stop => self.session.stop(),
            KeyAction::ToggleMode => {
                let mode = self.session.mode().toggle();
                self.session.set_mode(mode);
            }
            KeyAction::NextModel => self.session.next_model(),
            KeyAction::OpenChatList => self.list_chats(state),
            KeyAction::SelectChat(selection) => {
                self.session.select_chat(&mut self.files, selection).await;
                state.chat_scroll.follow();
            }
            KeyAction::MergeApply { side, block } => self.merge_apply(side, block, state),
            KeyAction::MergeComplete => {
                self.merge.complete(&self.files);
                self.merge.unmount(&mut self.files);
            }
            KeyAction::MergeCancel => {
                self.merge.cancel();
                self.merge.unmount(&mut self.files);
            }
        }
        Flow::Continue
    }

    pub async fn on_transport(&mut self, event: TransportEvent, state: &mut AppState) {
        match event {
            TransportEvent::Fragment { message, is_final } => {
                self.session
                    .on_stream_fragment(&mut self.files, message, is_final)
                    .await;
            }
            TransportEvent::Error(message) => self.session.on_transport_error(&message),
            TransportEvent::Closed => self.session.on_transport_closed(),
        }
        self.drain_notices(state);
    }

    async fn submit(&mut self, text: String, state: &mut AppState) {
        match command::parse(&text) {
            InputCommand::Message(body) => {
                self.session.sync_workspace_files(&self.files);
                let attachments = self.uploads.take_attachments();
                if self.session.submit(&body, attachments) {
                    state.input.clear();
                    state.chat_scroll.follow();
                }
            }
            InputCommand::NewChat => {
                self.session
                    .select_chat(&mut self.files, ChatSelection(None))
                    .await;
                state.input.clear();
            }
            InputCommand::Attach(paths) => {
                state.input.clear();
                self.attach(paths, state);
            }
            InputCommand::Diff(path) => {
                let Some(current) = self.files.get_content(&path) else {
                    state.toast(Notice::error(format!("No such file: {path}")));
                    return;
                };
                let baseline = self.files.old_content(&path).unwrap_or_default();
                let rows = side_by_side(baseline, current);
                state.input.clear();
                state.open_diff(&path, rows);
            }
            InputCommand::Merge(path) => {
                state.input.clear();
                self.open_merge(path, state);
            }
            InputCommand::Invalid(name) => {
                state.toast(Notice::warning(format!("Unknown or incomplete command {name}")));
            }
        }
    }

    fn attach(&mut self, paths: Vec<std::path::PathBuf>, state: &mut AppState) {
        let mut pending = Vec::with_capacity(paths.len());
        for path in paths {
            match PendingFile::from_path(&path) {
                Ok(file) => pending.push(file),
                Err(e) => state.toast(Notice::error(format!("{}: {e}", path.display()))),
            }
        }
        let Some(batch) = self.uploads.begin(pending) else {
            self.drain_notices(state);
            return;
        };
        let api = self.api.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let outcome = upload_all(batch, |file| api.upload(file)).await;
            let _ = tx.send(AppEvent::UploadDone(outcome));
        });
        self.drain_notices(state);
    }

    fn open_merge(&mut self, path: String, state: &mut AppState) {
        let Some(modified) = self.files.get_content(&path).map(str::to_owned) else {
            state.toast(Notice::error(format!("No such file: {path}")));
            return;
        };
        let original = self.files.old_content(&path).unwrap_or_default().to_owned();

        let done_tx = self.events.clone();
        let target = path.clone();
        let cancel_tx = self.events.clone();
        self.merge = MergeEditor::new()
            .on_complete(move |result| {
                let _ = done_tx.send(AppEvent::MergeFinished { path: target.clone(), result });
            })
            .on_cancel(move || {
                let _ = cancel_tx.send(AppEvent::MergeCancelled);
            });
        self.merge.mount(&mut self.files, &original, &modified);

        state.merge = Some(MergeView {
            path,
            original,
            modified,
            blocks: self.merge.blocks().to_vec(),
            result: String::new(),
            selected: 0,
        });
        state.mode = Mode::Merge;
    }

    fn merge_apply(&mut self, side: Side, block: usize, state: &mut AppState) {
        let outcome = match side {
            Side::Original => self.merge.apply_original(&mut self.files, block),
            Side::Modified => self.merge.apply_modified(&mut self.files, block),
        };
        match outcome {
            Ok(outcome @ weave_core::merge::ApplyOutcome::Applied { .. }) => {
                state.toast(Notice::success(outcome.message()));
            }
            Ok(outcome) => state.toast(Notice::error(outcome.message())),
            Err(e) => state.toast(Notice::error(e.to_string())),
        }
        if let Some(view) = state.merge.as_mut() {
            self.merge.result().clone_into(&mut view.result);
        }
    }

    /// Writes a finished merge back to its workspace file.
    pub fn finish_merge(&mut self, path: &str, result: &str, state: &mut AppState) {
        self.files.update_content(path, result, true);
        state.close_overlay();
        state.toast(Notice::success(format!("Merged into {path}")));
    }

    fn list_chats(&self, state: &mut AppState) {
        let Some(conn) = self.session.history().cloned() else {
            state.toast(Notice::error("Chat history is unavailable"));
            return;
        };
        let tx = self.events.clone();
        tokio::spawn(async move {
            match db::list_chats(&conn, CHAT_LIST_LIMIT).await {
                Ok(rows) => {
                    let _ = tx.send(AppEvent::ChatsListed(rows));
                }
                Err(e) => tracing::error!(error = %e, "failed to list chats"),
            }
        });
    }
}
