//! Core of the weave assistant client: conversation state, streaming
//! transport, artifact parsing, the workspace file map, merge/diff models,
//! uploads, configuration and chat history. Nothing here touches a terminal.

pub mod config;
pub mod db;
pub mod diff;
pub mod error;
pub mod files;
pub mod merge;
pub mod parser;
pub mod schema;
pub mod session;
pub mod transport;
pub mod types;
pub mod upload;

pub use error::{Error, Result};
pub use files::FileStore;
pub use session::{ChatSelection, ChatSession};
pub use transport::{Transport, TransportEvent, WsTransport};
