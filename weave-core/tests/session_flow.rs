//! End-to-end session flow against a real history database.
//!
//! Exercises: submit, on_stream_fragment, finalize (file extraction and
//! persistence), select_chat (restore and Builder-mode injection).

use std::sync::{Arc, Mutex};

use weave_core::db;
use weave_core::error::TransportError;
use weave_core::merge::{MergeEditor, RESULT_FILE};
use weave_core::types::{ChatMode, ChatRequest, Fragment, Role};
use weave_core::{ChatSelection, ChatSession, FileStore, Transport};

/// Records requests; clones share the same log.
#[derive(Clone, Default)]
struct SharedTransport {
    sent: Arc<Mutex<Vec<ChatRequest>>>,
}

impl Transport for SharedTransport {
    fn send_message(&mut self, request: &ChatRequest) -> Result<(), TransportError> {
        self.sent.lock().unwrap().push(request.clone());
        Ok(())
    }

    fn disconnect(&mut self) {}
}

fn temp_db_path() -> String {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.keep().join("chats.db");
    path.to_string_lossy().to_string()
}

fn reply(id: &str, content: &str) -> Fragment {
    Fragment {
        id: Some(id.to_owned()),
        role: Some(Role::Assistant),
        content: Some(content.to_owned()),
    }
}

fn file_artifact(path: &str, body: &str) -> String {
    format!(
        "Sure.\n<boltArtifact id=\"app\" title=\"App\">\n<boltAction type=\"file\" filePath=\"{path}\">\n{body}\n</boltAction>\n</boltArtifact>"
    )
}

#[tokio::test]
async fn finalized_turns_are_persisted_and_restored() {
    let conn = db::open_db(&temp_db_path()).await.unwrap();
    let transport = SharedTransport::default();
    let mut files = FileStore::new();

    let mut session = ChatSession::new(transport.clone()).with_history(conn.clone());
    session.set_mode(ChatMode::Chat);
    assert!(session.submit("write index.js", Vec::new()));
    session
        .on_stream_fragment(&mut files, reply("r1", &file_artifact("index.js", "v1")), true)
        .await;
    assert!(session.submit("now change it", Vec::new()));
    session
        .on_stream_fragment(&mut files, reply("r2", &file_artifact("index.js", "v2")), true)
        .await;

    assert_eq!(files.get_content("index.js"), Some("v2"));
    assert_eq!(transport.sent.lock().unwrap().len(), 2);
    let chat_id = session.id();

    let saved = db::load_chat(&conn, &chat_id.to_string()).await.unwrap().unwrap();
    assert_eq!(saved.title, "write index.js");
    assert_eq!(saved.messages.len(), 4);

    // A fresh Builder-mode session restores the chat and re-injects the files.
    let mut restored_files = FileStore::new();
    let mut restored = ChatSession::new(transport.clone()).with_history(conn.clone());
    restored
        .select_chat(&mut restored_files, ChatSelection(Some(chat_id)))
        .await;

    assert_eq!(restored.id(), chat_id);
    assert_eq!(restored_files.get_content("index.js"), Some("v2"));
    assert_eq!(restored_files.old_content("index.js"), Some("v2"));
    let last = restored.messages().last().unwrap();
    assert_eq!(last.role, Role::User);
    assert!(last.content.contains("title=\"Current files\""));
    assert_eq!(restored.messages().len(), 5);
    assert!(restored.take_notices().is_empty());
}

#[tokio::test]
async fn unknown_chat_selection_queues_error() {
    let conn = db::open_db(&temp_db_path()).await.unwrap();
    let mut files = FileStore::new();
    let mut session = ChatSession::new(SharedTransport::default()).with_history(conn);
    session
        .select_chat(&mut files, ChatSelection(Some(uuid::Uuid::new_v4())))
        .await;
    assert_eq!(session.take_notices().len(), 1);
    assert!(session.messages().is_empty());
}

#[tokio::test]
async fn merge_result_flows_back_into_the_file_store() {
    let mut files = FileStore::new();
    files.add_file("app.js", "const a = 1;");

    let merged = Arc::new(Mutex::new(String::new()));
    let sink = Arc::clone(&merged);
    let mut editor = MergeEditor::new().on_complete(move |r| *sink.lock().unwrap() = r);
    editor.mount(&mut files, "const a = 1;", "const a = 2;");
    editor.apply_modified(&mut files, 0).unwrap();
    let result = editor.complete(&files);
    editor.unmount(&mut files);
    files.update_content("app.js", &result, true);

    assert_eq!(*merged.lock().unwrap(), "const a = 2;");
    assert_eq!(files.get_content(RESULT_FILE), None);
    assert_eq!(files.update_send_files().get("app.js").map(String::as_str), Some("const a = 2;"));
}
