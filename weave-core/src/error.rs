//! Error types shared across weave-core.
//!
//! Each subsystem gets its own enum so callers can match on the failure they
//! actually care about. `Error` is the umbrella used by the session controller
//! and history store, where failures from several layers meet.

use thiserror::Error;

/// Umbrella error for controller-level operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Db(#[from] tokio_rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error in {path}: {source}")]
    Config {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("stored chat {id} has a malformed record: {details}")]
    CorruptRecord { id: String, details: String },
}

/// Failures raised by a [`crate::transport::Transport`] implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to encode chat request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("websocket connection closed")]
    Closed,

    #[error("websocket error: {0}")]
    Socket(String),
}

/// Failures raised by the merge editor.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MergeError {
    #[error("merge editor is not mounted")]
    NotMounted,

    #[error("merge result file '{0}' is missing from the file store")]
    ResultFileMissing(String),
}

/// Failures raised while uploading attachments.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("file '{name}' exceeds the {limit} byte upload limit")]
    TooLarge { name: String, limit: u64 },

    #[error("upload of '{name}' failed: {reason}")]
    Failed { name: String, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
