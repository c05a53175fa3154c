//! Chat session controller.
//!
//! Owns the conversation for one session id and drives it through the
//! transport: user input goes out as a [`ChatRequest`], streamed fragments are
//! merged back by message id, and a final fragment triggers finalization
//! (artifact extraction into the [`FileStore`], history persistence, and the
//! truncation check).
//!
//! The file store is passed into the operations that touch it rather than
//! owned here, so the UI, the merge editor and the controller all work on the
//! same map without shared ownership.

use std::collections::{BTreeMap, HashSet};

use tokio_rusqlite::Connection;
use uuid::Uuid;

use crate::config::Settings;
use crate::db;
use crate::files::FileStore;
use crate::parser::{self, ARTIFACT_MARKER};
use crate::transport::Transport;
use crate::types::{
    Attachment, ChatMode, ChatRequest, Fragment, Message, ModalKind, ModelOption, Notice,
    OtherConfig, Role, ToolSpec,
};

const DEFAULT_TITLE: &str = "New Chat";
const TITLE_MAX_CHARS: usize = 50;

/// Id of the synthetic message carrying the workspace on the first turn.
pub const CURRENT_FILES_ID: &str = "1";
/// Id of the synthetic message carrying locally edited files.
pub const MODIFIED_FILES_ID: &str = "2";

/// Request to switch conversations. `None` starts a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatSelection(pub Option<Uuid>);

/// Title for a conversation: the first user message that is not injected
/// artifact markup, cut to 50 characters.
pub fn derive_title(messages: &[Message]) -> String {
    messages
        .iter()
        .find(|m| m.role == Role::User && !m.content.contains(ARTIFACT_MARKER))
        .map(|m| m.content.chars().take(TITLE_MAX_CHARS).collect::<String>())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_owned())
}

pub struct ChatSession<T: Transport> {
    id: Uuid,
    messages: Vec<Message>,
    loading: bool,
    model: ModelOption,
    models: Vec<ModelOption>,
    mode: ChatMode,
    other_config: OtherConfig,
    tools: Vec<ToolSpec>,
    /// Messages whose artifacts were already written to the file store.
    parsed_ids: HashSet<String>,
    /// Commands the user has confirmed as run.
    executed: HashSet<String>,
    pending_commands: Vec<String>,
    notices: Vec<Notice>,
    history: Option<Connection>,
    transport: T,
    auto_continues: u32,
    max_auto_continue: u32,
}

impl<T: Transport> ChatSession<T> {
    pub fn new(transport: T) -> Self {
        Self {
            id: Uuid::new_v4(),
            messages: Vec::new(),
            loading: false,
            model: ModelOption::default(),
            models: Vec::new(),
            mode: ChatMode::default(),
            other_config: OtherConfig::default(),
            tools: Vec::new(),
            parsed_ids: HashSet::new(),
            executed: HashSet::new(),
            pending_commands: Vec::new(),
            notices: Vec::new(),
            history: None,
            transport,
            auto_continues: 0,
            max_auto_continue: 2,
        }
    }

    /// Builds a session from runtime settings, persisting to `history` if given.
    pub fn from_settings(transport: T, settings: &Settings, history: Option<Connection>) -> Self {
        let mut session = Self::new(transport);
        session.mode = settings.mode;
        session.other_config = settings.backend.clone();
        session.max_auto_continue = settings.max_auto_continue;
        session.history = history;
        session
    }

    pub fn with_history(mut self, conn: Connection) -> Self {
        self.history = Some(conn);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ChatMode) {
        self.mode = mode;
    }

    pub fn model(&self) -> &ModelOption {
        &self.model
    }

    pub fn models(&self) -> &[ModelOption] {
        &self.models
    }

    pub fn other_config_mut(&mut self) -> &mut OtherConfig {
        &mut self.other_config
    }

    pub fn set_tools(&mut self, tools: Vec<ToolSpec>) {
        self.tools = tools;
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn history(&self) -> Option<&Connection> {
        self.history.as_ref()
    }

    /// Commands from the latest reply that have not been marked as run.
    pub fn pending_commands(&self) -> &[String] {
        &self.pending_commands
    }

    pub fn mark_executed(&mut self, command: &str) {
        self.executed.insert(command.to_owned());
        self.pending_commands.retain(|c| c != command);
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn set_model(&mut self, model: ModelOption) {
        tracing::info!(model = %model.value, "model selected");
        self.model = model;
    }

    /// Selects the known model whose `value` matches. Returns false if none does.
    pub fn select_model_by_value(&mut self, value: &str) -> bool {
        match self.models.iter().find(|m| m.value == value).cloned() {
            Some(model) => {
                self.set_model(model);
                true
            }
            None => false,
        }
    }

    /// Replaces the model list; its first entry becomes the selection.
    pub fn set_models(&mut self, models: Vec<ModelOption>) {
        if let Some(first) = models.first() {
            self.set_model(first.clone());
        }
        self.models = models;
    }

    /// Cycles to the model after the current one.
    pub fn next_model(&mut self) {
        if self.models.is_empty() {
            return;
        }
        let idx = self
            .models
            .iter()
            .position(|m| m.value == self.model.value)
            .map_or(0, |i| (i + 1) % self.models.len());
        self.set_model(self.models[idx].clone());
    }

    /// Appends a message with a fresh id. User messages are sent immediately.
    pub fn append(&mut self, role: Role, content: &str, attachments: Option<Vec<Attachment>>) -> String {
        let mut message = Message::new(role, content);
        message.attachments = attachments;
        let id = message.id.clone();
        self.messages.push(message);
        if role == Role::User {
            self.send(self.messages.clone());
        }
        id
    }

    /// Submits user input. Blank input without attachments is rejected, and so
    /// is anything sent while a reply is still streaming.
    pub fn submit(&mut self, input: &str, attachments: Vec<Attachment>) -> bool {
        if input.trim().is_empty() && attachments.is_empty() {
            return false;
        }
        if self.loading {
            self.notices
                .push(Notice::warning("Wait for the current reply or stop it first"));
            return false;
        }
        self.auto_continues = 0;
        let attachments = (!attachments.is_empty()).then_some(attachments);
        self.append(Role::User, input, attachments);
        true
    }

    /// Sends `snapshot` as one request. An empty snapshot is ignored.
    pub fn send(&mut self, snapshot: Vec<Message>) {
        if snapshot.is_empty() {
            return;
        }
        let tools = (self.model.supports_function_call() && !self.tools.is_empty())
            .then(|| self.tools.clone());
        let request = ChatRequest {
            messages: snapshot,
            model: self.model.value.clone(),
            mode: self.mode,
            other_config: self.other_config.for_request(),
            tools,
        };
        self.loading = true;
        tracing::debug!(
            chat = %self.id,
            messages = request.messages.len(),
            model = %request.model,
            "sending chat request"
        );
        if let Err(e) = self.transport.send_message(&request) {
            self.on_transport_error(&e.to_string());
        }
    }

    /// Merges a streamed fragment by id; a final fragment finalizes the turn.
    pub async fn on_stream_fragment(&mut self, files: &mut FileStore, fragment: Fragment, is_final: bool) {
        let incoming = fragment.into_message();
        match self.messages.iter_mut().find(|m| m.id == incoming.id) {
            Some(existing) => existing.content = incoming.content,
            None => self.messages.push(incoming),
        }
        if is_final {
            self.finalize(files).await;
        }
    }

    /// Ends a turn: extracts files, persists history, checks for truncation.
    pub async fn finalize(&mut self, files: &mut FileStore) {
        self.loading = false;

        for message in &self.messages {
            if self.parsed_ids.insert(message.id.clone()) {
                write_files(files, &message.content);
            }
        }
        if let Some(last) = self.messages.last() {
            write_files(files, &last.content);
        }
        files.clear_send_flags();

        self.persist().await;
        self.check_completion();
    }

    async fn persist(&self) {
        let Some(conn) = self.history.as_ref() else {
            return;
        };
        let title = derive_title(&self.messages);
        let id = self.id.to_string();
        if let Err(e) = db::save_chat(conn, &id, &title, &self.messages).await {
            tracing::error!(chat = %id, error = %e, "failed to save chat history");
        }
    }

    /// Continues a truncated reply, or surfaces commands awaiting execution.
    fn check_completion(&mut self) {
        let Some(last) = self.messages.last().filter(|m| m.role == Role::Assistant) else {
            return;
        };
        if let Some(prompt) = parser::check_finish(&last.content) {
            if self.auto_continues < self.max_auto_continue {
                self.auto_continues += 1;
                tracing::info!(attempt = self.auto_continues, "reply truncated; continuing");
                self.append(Role::User, prompt, None);
            } else {
                tracing::warn!("reply truncated; auto-continue limit reached");
                self.notices
                    .push(Notice::warning("Reply was cut off and could not be completed"));
            }
            return;
        }
        self.auto_continues = 0;

        let pending = parser::pending_commands(&self.messages, &self.executed);
        if !pending.is_empty() {
            self.notices.push(Notice::warning(format!(
                "Commands awaiting execution: {}",
                pending.join("; ")
            )));
        }
        self.pending_commands = pending;
    }

    /// Resends from the last user message, dropping everything after it.
    /// Ignored while a reply is streaming.
    pub fn reload(&mut self) {
        if self.loading {
            return;
        }
        let Some(idx) = self.messages.iter().rposition(|m| m.role == Role::User) else {
            return;
        };
        self.messages.truncate(idx + 1);
        self.auto_continues = 0;
        self.send(self.messages.clone());
    }

    pub fn stop(&mut self) {
        self.transport.disconnect();
        self.loading = false;
    }

    pub fn on_transport_error(&mut self, message: &str) {
        tracing::error!(error = message, "chat transport error");
        self.loading = false;
        self.notices.push(Notice::error(message));
        if message.contains("Quota not enough") {
            self.notices.push(Notice::Modal(ModalKind::QuotaLimit));
        }
        if message.contains("Authentication required") {
            self.notices.push(Notice::Modal(ModalKind::Login));
        }
    }

    /// The socket closed on its own. Only noteworthy mid-reply.
    pub fn on_transport_closed(&mut self) {
        if self.loading {
            self.loading = false;
            self.notices
                .push(Notice::warning("Connection closed before the reply finished"));
        }
    }

    /// Switches to another conversation, or a fresh one for `None`.
    ///
    /// Selecting the current conversation does nothing.
    pub async fn select_chat(&mut self, files: &mut FileStore, selection: ChatSelection) {
        let Some(id) = selection.0 else {
            self.reset(Uuid::new_v4(), Vec::new());
            files.clear();
            tracing::info!(chat = %self.id, "started new chat");
            return;
        };
        if id == self.id {
            return;
        }
        let Some(conn) = self.history.as_ref() else {
            self.notices.push(Notice::error("Chat history is unavailable"));
            return;
        };
        let record = match db::load_chat(conn, &id.to_string()).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                self.notices.push(Notice::error("Chat not found"));
                return;
            }
            Err(e) => {
                tracing::error!(chat = %id, error = %e, "failed to load chat");
                self.notices.push(Notice::error(format!("Failed to load chat: {e}")));
                return;
            }
        };

        self.reset(id, record.messages);
        self.parsed_ids = self.messages.iter().map(|m| m.id.clone()).collect();

        let mut current = BTreeMap::new();
        for message in &self.messages {
            current.extend(parser::parse_message(&message.content).files);
        }
        files.set_files(current);

        let old = self
            .messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .nth(1)
            .map(|m| parser::parse_message(&m.content).files)
            .unwrap_or_default();
        files.set_old_files(old);

        if self.mode == ChatMode::Builder {
            if let Some(artifact) = parser::render_artifact("Current files", files.all()) {
                let message = Message::new(Role::User, artifact);
                self.parsed_ids.insert(message.id.clone());
                self.messages.push(message);
                files.clear_send_flags();
            }
        }
        tracing::info!(chat = %id, messages = self.messages.len(), "chat loaded");
    }

    fn reset(&mut self, id: Uuid, messages: Vec<Message>) {
        if self.loading {
            self.transport.disconnect();
        }
        self.id = id;
        self.messages = messages;
        self.loading = false;
        self.parsed_ids.clear();
        self.pending_commands.clear();
        self.auto_continues = 0;
    }

    /// Builder-mode context injection ahead of a send.
    ///
    /// A fresh conversation gets the whole workspace as message `"1"`. Later
    /// turns carry locally edited files in message `"2"`, replaced in place
    /// while it is still the last message.
    pub fn sync_workspace_files(&mut self, files: &FileStore) {
        if self.mode != ChatMode::Builder {
            return;
        }
        let only_context = match self.messages.as_slice() {
            [] => true,
            [only] => only.id == CURRENT_FILES_ID,
            _ => false,
        };
        if only_context {
            let pending = files.first_send_files();
            if let Some(artifact) = parser::render_artifact("the current file", &pending) {
                self.messages = vec![Message::with_id(CURRENT_FILES_ID, Role::User, artifact)];
            }
            return;
        }

        let modified = files.update_send_files();
        let Some(artifact) = parser::render_artifact("Currently modified files", &modified) else {
            return;
        };
        if let Some(last) = self.messages.last_mut().filter(|m| m.id == MODIFIED_FILES_ID) {
            last.content = artifact;
            return;
        }
        self.messages.retain(|m| m.id != MODIFIED_FILES_ID);
        self.messages
            .push(Message::with_id(MODIFIED_FILES_ID, Role::User, artifact));
    }
}

fn write_files(files: &mut FileStore, content: &str) {
    for (path, body) in parser::parse_message(content).files {
        files.update_content(&path, &body, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::types::NoticeLevel;

    #[derive(Debug, Default)]
    struct Recording {
        sent: Vec<ChatRequest>,
        disconnects: usize,
        fail_with: Option<String>,
    }

    impl Transport for Recording {
        fn send_message(&mut self, request: &ChatRequest) -> Result<(), TransportError> {
            if let Some(reason) = &self.fail_with {
                return Err(TransportError::Socket(reason.clone()));
            }
            self.sent.push(request.clone());
            Ok(())
        }

        fn disconnect(&mut self) {
            self.disconnects += 1;
        }
    }

    fn session() -> ChatSession<Recording> {
        ChatSession::new(Recording::default())
    }

    fn fragment(id: &str, content: &str) -> Fragment {
        Fragment { id: Some(id.into()), role: None, content: Some(content.into()) }
    }

    const FILE_REPLY: &str = "<boltArtifact id=\"x\" title=\"t\">\n<boltAction type=\"file\" filePath=\"src/a.js\">\nlet a = 1;\n</boltAction>\n</boltArtifact>";

    #[test]
    fn blank_submit_is_rejected() {
        let mut s = session();
        assert!(!s.submit("   \n", Vec::new()));
        assert!(s.messages().is_empty());
        assert!(s.transport().sent.is_empty());
        assert!(!s.is_loading());
    }

    #[test]
    fn submit_sends_snapshot_and_sets_loading() {
        let mut s = session();
        assert!(s.submit("  hello ", Vec::new()));
        assert!(s.is_loading());
        let sent = &s.transport().sent;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].messages.len(), 1);
        assert_eq!(sent[0].messages[0].content, "  hello ");
        assert_eq!(sent[0].model, "claude-3-5-sonnet-20240620");
    }

    #[test]
    fn attachments_alone_are_enough_to_submit() {
        let mut s = session();
        let att = Attachment {
            id: "a".into(),
            name: "x.png".into(),
            media_type: "image/png".into(),
            local_ref: "/tmp/x.png".into(),
            remote_url: "https://cdn/x.png".into(),
        };
        assert!(s.submit("", vec![att.clone()]));
        assert_eq!(s.messages()[0].attachments, Some(vec![att]));
    }

    #[test]
    fn tools_only_sent_for_function_call_models() {
        let mut s = session();
        s.set_tools(vec![ToolSpec::new("t1", "fs", "read", None, serde_json::json!({}))]);
        s.submit("hi", Vec::new());
        assert_eq!(s.transport().sent[0].tools.as_ref().map(Vec::len), Some(1));

        s.stop();
        s.set_model(ModelOption { function_call: None, ..ModelOption::default() });
        s.submit("again", Vec::new());
        assert!(s.transport().sent[1].tools.is_none());
    }

    #[tokio::test]
    async fn repeated_fragments_keep_one_entry() {
        let mut s = session();
        let mut files = FileStore::new();
        s.submit("hi", Vec::new());
        for chunk in ["He", "Hell", "Hello"] {
            s.on_stream_fragment(&mut files, fragment("r1", chunk), false).await;
        }
        assert_eq!(s.messages().len(), 2);
        assert_eq!(s.messages()[1].content, "Hello");
        assert_eq!(s.messages()[1].role, Role::Assistant);
        assert!(s.is_loading());

        s.on_stream_fragment(&mut files, fragment("r1", "Hello!"), true).await;
        assert!(!s.is_loading());
        assert_eq!(s.messages().len(), 2);
    }

    #[tokio::test]
    async fn final_fragment_writes_files() {
        let mut s = session();
        let mut files = FileStore::new();
        s.submit("make a", Vec::new());
        s.on_stream_fragment(&mut files, fragment("r1", FILE_REPLY), true).await;
        assert_eq!(files.get_content("src/a.js"), Some("let a = 1;"));
        assert!(s.take_notices().is_empty());
    }

    #[tokio::test]
    async fn truncated_reply_is_continued_up_to_the_cap() {
        let mut s = session();
        let mut files = FileStore::new();
        s.submit("go", Vec::new());
        let cut = "<boltArtifact id=\"x\" title=\"t\">\n<boltAction type=\"file\" filePath=\"a\">\npart";

        s.on_stream_fragment(&mut files, fragment("r1", cut), true).await;
        assert_eq!(s.transport().sent.len(), 2);
        assert_eq!(s.messages().last().unwrap().content, parser::CONTINUE_PROMPT);

        s.on_stream_fragment(&mut files, fragment("r2", cut), true).await;
        s.on_stream_fragment(&mut files, fragment("r3", cut), true).await;
        assert_eq!(s.transport().sent.len(), 3);
        let notices = s.take_notices();
        assert!(matches!(&notices[..], [Notice::Toast { level: NoticeLevel::Warning, .. }]));
    }

    #[tokio::test]
    async fn pending_commands_are_surfaced() {
        let mut s = session();
        let mut files = FileStore::new();
        s.submit("setup", Vec::new());
        let reply = "<boltArtifact id=\"x\" title=\"t\">\n<boltAction type=\"shell\">npm install</boltAction>\n</boltArtifact>";
        s.on_stream_fragment(&mut files, fragment("r1", reply), true).await;
        assert_eq!(s.pending_commands(), ["npm install"]);
        assert_eq!(s.take_notices().len(), 1);

        s.mark_executed("npm install");
        assert!(s.pending_commands().is_empty());
    }

    #[test]
    fn reload_truncates_after_last_user_message() {
        let mut s = session();
        s.messages = vec![
            Message::with_id("a", Role::User, "A"),
            Message::with_id("b", Role::Assistant, "B"),
            Message::with_id("c", Role::User, "C"),
            Message::with_id("d", Role::Assistant, "D"),
        ];
        s.reload();
        let ids: Vec<&str> = s.messages().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert!(s.is_loading());
        assert_eq!(s.transport().sent.len(), 1);
        assert_eq!(s.transport().sent[0].messages.len(), 3);
    }

    #[tokio::test]
    async fn only_one_reply_streams_at_a_time() {
        let mut s = session();
        let mut files = FileStore::new();
        assert!(s.submit("first", Vec::new()));
        s.on_stream_fragment(&mut files, fragment("r1", "partial"), false).await;

        assert!(!s.submit("second", Vec::new()));
        s.reload();
        assert_eq!(s.transport().sent.len(), 1);
        assert_eq!(s.messages().len(), 2);
        assert!(matches!(
            &s.take_notices()[..],
            [Notice::Toast { level: NoticeLevel::Warning, .. }]
        ));

        s.on_stream_fragment(&mut files, fragment("r1", "partial done"), true).await;
        assert!(s.submit("second", Vec::new()));
        assert_eq!(s.transport().sent.len(), 2);
    }

    #[test]
    fn reload_without_user_message_does_nothing() {
        let mut s = session();
        s.messages.push(Message::new(Role::Assistant, "hello"));
        s.reload();
        assert_eq!(s.messages().len(), 1);
        assert!(s.transport().sent.is_empty());
    }

    #[test]
    fn transport_errors_escalate_to_modals() {
        let mut s = session();
        s.submit("hi", Vec::new());
        s.on_transport_error("Quota not enough for this model");
        assert!(!s.is_loading());
        let notices = s.take_notices();
        assert_eq!(notices[0], Notice::error("Quota not enough for this model"));
        assert_eq!(notices[1], Notice::Modal(ModalKind::QuotaLimit));

        s.on_transport_error("Authentication required");
        assert_eq!(s.take_notices()[1], Notice::Modal(ModalKind::Login));
    }

    #[test]
    fn synchronous_send_failure_is_a_transport_error() {
        let mut s = ChatSession::new(Recording { fail_with: Some("refused".into()), ..Default::default() });
        s.submit("hi", Vec::new());
        assert!(!s.is_loading());
        assert_eq!(s.take_notices(), vec![Notice::error("websocket error: refused")]);
    }

    #[test]
    fn stop_disconnects_and_clears_loading() {
        let mut s = session();
        s.submit("hi", Vec::new());
        s.stop();
        assert!(!s.is_loading());
        assert_eq!(s.transport().disconnects, 1);
    }

    #[test]
    fn title_skips_artifact_messages_and_truncates() {
        let long = "x".repeat(80);
        let messages = vec![
            Message::new(Role::User, "<boltArtifact id=\"a\">"),
            Message::new(Role::Assistant, "ok"),
            Message::new(Role::User, long),
        ];
        assert_eq!(derive_title(&messages).chars().count(), 50);
        assert_eq!(derive_title(&[]), "New Chat");
        assert_eq!(derive_title(&[Message::new(Role::User, "")]), "New Chat");
        let only_artifact = [
            Message::new(Role::User, "<boltArtifact id=\"f\" title=\"files\">\n</boltArtifact>"),
            Message::new(Role::Assistant, "ok"),
        ];
        assert_eq!(derive_title(&only_artifact), "New Chat");
    }

    #[test]
    fn builder_sync_injects_current_then_modified_files() {
        let mut s = session();
        let mut files = FileStore::new();
        files.set_files(BTreeMap::from([("a.js".to_owned(), "1".to_owned())]));

        s.sync_workspace_files(&files);
        assert_eq!(s.messages().len(), 1);
        assert_eq!(s.messages()[0].id, CURRENT_FILES_ID);
        assert!(s.messages()[0].content.contains("title=\"the current file\""));

        s.messages.push(Message::new(Role::Assistant, "ok"));
        files.clear_send_flags();
        files.update_content("a.js", "2", true);
        s.sync_workspace_files(&files);
        assert_eq!(s.messages().last().unwrap().id, MODIFIED_FILES_ID);

        files.update_content("a.js", "3", true);
        s.sync_workspace_files(&files);
        assert_eq!(s.messages().len(), 3);
        assert!(s.messages()[2].content.contains("\n3\n"));
    }

    #[test]
    fn chat_mode_skips_workspace_sync() {
        let mut s = session();
        s.set_mode(ChatMode::Chat);
        let mut files = FileStore::new();
        files.set_files(BTreeMap::from([("a.js".to_owned(), "1".to_owned())]));
        s.sync_workspace_files(&files);
        assert!(s.messages().is_empty());
    }

    #[test]
    fn model_list_selects_first_and_cycles() {
        let mut s = session();
        let m = |v: &str| ModelOption { value: v.into(), label: v.into(), ..ModelOption::default() };
        s.set_models(vec![m("a"), m("b")]);
        assert_eq!(s.model().value, "a");
        s.next_model();
        assert_eq!(s.model().value, "b");
        s.next_model();
        assert_eq!(s.model().value, "a");
        assert!(s.select_model_by_value("b"));
        assert!(!s.select_model_by_value("zzz"));
        assert_eq!(s.model().value, "b");
    }

    #[tokio::test]
    async fn new_chat_selection_resets_state() {
        let mut s = session();
        let mut files = FileStore::new();
        files.add_file("a.js", "1");
        s.submit("hi", Vec::new());
        let before = s.id();
        s.select_chat(&mut files, ChatSelection(None)).await;
        assert_ne!(s.id(), before);
        assert!(s.messages().is_empty());
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn selecting_current_chat_is_ignored() {
        let mut s = session();
        let mut files = FileStore::new();
        s.submit("hi", Vec::new());
        let id = s.id();
        s.select_chat(&mut files, ChatSelection(Some(id))).await;
        assert_eq!(s.messages().len(), 1);
        assert!(s.take_notices().is_empty());
    }
}
