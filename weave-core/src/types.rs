use serde::{Deserialize, Serialize};

/// Author of a chat message.
///
/// Fixed at creation time; streaming updates never change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// A file attached to a user message (currently images only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub name: String,
    #[serde(rename = "contentType", default)]
    pub media_type: String,
    /// Path of the file on this machine, shown in the UI.
    #[serde(rename = "localUrl", default)]
    pub local_ref: String,
    /// URL returned by the upload endpoint, sent to the assistant.
    #[serde(rename = "url", default)]
    pub remote_url: String,
}

/// One entry in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(
        rename = "experimental_attachments",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub attachments: Option<Vec<Attachment>>,
}

impl Message {
    /// Builds a message with a fresh UUID v4 id.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            attachments: None,
        }
    }

    /// Builds a message with a caller-chosen id (synthetic context messages).
    pub fn with_id(id: impl Into<String>, role: Role, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
            attachments: None,
        }
    }
}

/// An incremental assistant update as delivered by the transport.
///
/// Every field is optional on the wire; [`Fragment::into_message`] fills the gaps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub content: Option<String>,
}

impl Fragment {
    /// Normalises the fragment: missing id gets a UUID, missing role is assistant.
    pub fn into_message(self) -> Message {
        Message {
            id: self
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            role: self.role.unwrap_or(Role::Assistant),
            content: self.content.unwrap_or_default(),
            attachments: None,
        }
    }
}

/// Which prompt the backend should use.
///
/// `Builder` additionally injects the current workspace files into the
/// conversation as artifact markup.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    #[default]
    Builder,
    Chat,
}

impl ChatMode {
    pub fn toggle(self) -> Self {
        match self {
            ChatMode::Builder => ChatMode::Chat,
            ChatMode::Chat => ChatMode::Builder,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChatMode::Builder => "builder",
            ChatMode::Chat => "chat",
        }
    }
}

/// A selectable model as returned by `GET /api/model/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelOption {
    pub value: String,
    pub label: String,
    #[serde(default)]
    pub use_image: bool,
    #[serde(default)]
    pub quota: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<bool>,
}

impl Default for ModelOption {
    fn default() -> Self {
        Self {
            value: "claude-3-5-sonnet-20240620".to_owned(),
            label: "Claude 3.5 Sonnet".to_owned(),
            use_image: true,
            quota: 2.0,
            from: Some("default".to_owned()),
            provider: None,
            function_call: Some(true),
        }
    }
}

impl ModelOption {
    pub fn supports_function_call(&self) -> bool {
        self.function_call.unwrap_or(false)
    }
}

/// A tool exposed by an MCP server, as advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub id: String,
    /// `<server>.<tool>`
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolSpec {
    pub fn new(
        id: impl Into<String>,
        server: &str,
        tool: &str,
        description: Option<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: format!("{server}.{tool}"),
            description: description.unwrap_or_default(),
            parameters,
        }
    }
}

/// Backend-generation options carried in every request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherConfig {
    #[serde(default)]
    pub is_back_end: bool,
    #[serde(default)]
    pub backend_language: String,
    #[serde(default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
    #[serde(flatten)]
    pub rest: serde_json::Map<String, serde_json::Value>,
}

impl OtherConfig {
    /// Copy of this config with `isBackEnd` / `backendLanguage` mirrored into `extra`.
    pub fn for_request(&self) -> OtherConfig {
        let mut out = self.clone();
        out.extra
            .insert("isBackEnd".to_owned(), serde_json::Value::Bool(self.is_back_end));
        out.extra.insert(
            "backendLanguage".to_owned(),
            serde_json::Value::String(self.backend_language.clone()),
        );
        out
    }
}

/// The single JSON object sent over the socket per turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub model: String,
    pub mode: ChatMode,
    pub other_config: OtherConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolSpec>>,
}

/// Persisted snapshot of one conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRecord {
    pub id: String, // UUID v4 text
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: i64, // Unix timestamp seconds
    pub updated_at: i64, // Unix timestamp seconds
}

/// Sidebar row for the chat list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSummary {
    pub id: String,
    pub title: String,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Modal prompts escalated from specific transport errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    /// "Quota not enough"
    QuotaLimit,
    /// "Authentication required"
    Login,
}

/// User-visible feedback queued by the core and drained by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Toast { level: NoticeLevel, text: String },
    Modal(ModalKind),
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Notice::Toast { level: NoticeLevel::Info, text: text.into() }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Notice::Toast { level: NoticeLevel::Success, text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Notice::Toast { level: NoticeLevel::Warning, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Notice::Toast { level: NoticeLevel::Error, text: text.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_defaults_fill_missing_fields() {
        let msg = Fragment { id: None, role: None, content: Some("hi".into()) }.into_message();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.content, "hi");
        assert!(uuid::Uuid::parse_str(&msg.id).is_ok());
    }

    #[test]
    fn attachments_omitted_when_absent() {
        let msg = Message::with_id("a", Role::User, "hello");
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("experimental_attachments").is_none());
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn request_other_config_mirrors_backend_flags_into_extra() {
        let mut cfg = OtherConfig { is_back_end: true, backend_language: "java".into(), ..Default::default() };
        cfg.extra.insert("keep".into(), serde_json::json!(1));
        let json = serde_json::to_value(cfg.for_request()).unwrap();
        assert_eq!(json["isBackEnd"], true);
        assert_eq!(json["extra"]["isBackEnd"], true);
        assert_eq!(json["extra"]["backendLanguage"], "java");
        assert_eq!(json["extra"]["keep"], 1);
    }

    #[test]
    fn model_option_ignores_unknown_keys() {
        let raw = r#"{"value":"m","label":"M","useImage":false,"quota":1,"functionCall":true,"icon":"x"}"#;
        let model: ModelOption = serde_json::from_str(raw).unwrap();
        assert!(model.supports_function_call());
        assert!(!model.use_image);
    }
}
