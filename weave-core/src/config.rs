//! Runtime settings: TOML file plus environment overrides.
//!
//! The file lives at `$XDG_CONFIG_HOME/weave/config.toml` (or
//! `~/.config/weave/config.toml`). Every key is optional. Environment
//! variables win over the file:
//!
//! | Variable            | Field          |
//! |---------------------|----------------|
//! | `APP_WS_BASE_URL`   | `ws_base_url`  |
//! | `APP_BASE_URL`      | `base_url`     |
//! | `VITE_PROXY_TARGET` | `proxy_target` |
//! | `WEAVE_TOKEN`       | `token`        |

use std::path::{Path, PathBuf};

use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};
use crate::types::{ChatMode, OtherConfig};

const CHAT_WS_PATH: &str = "/api/chat/ws";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Theme name, e.g. `"dark"` or `"catppuccin-mocha"`.
    pub theme: String,
    /// Where the web front end would be served from; stands in for the page
    /// location when resolving relative endpoints.
    pub origin: String,
    pub base_url: Option<String>,
    pub ws_base_url: Option<String>,
    pub proxy_target: Option<String>,
    pub token: Option<String>,
    pub mode: ChatMode,
    /// Directory holding the chat database and the log file.
    pub data_dir: PathBuf,
    /// Consecutive automatic "continue" prompts allowed after truncated replies.
    pub max_auto_continue: u32,
    pub backend: OtherConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "catppuccin-mocha".to_owned(),
            origin: "http://localhost:3000".to_owned(),
            base_url: None,
            ws_base_url: None,
            proxy_target: None,
            token: None,
            mode: ChatMode::default(),
            data_dir: PathBuf::from(".weave"),
            max_auto_continue: 2,
            backend: OtherConfig::default(),
        }
    }
}

/// Returns the path to the weave config file.
///
/// Prefers `$XDG_CONFIG_HOME/weave/config.toml`; falls back to
/// `~/.config/weave/config.toml` when the env var is absent.
pub fn config_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join(".config"))
        })
        .unwrap_or_else(|| PathBuf::from(".config"));
    base.join("weave").join("config.toml")
}

impl Settings {
    /// Reads `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file exists but cannot be read, and
    /// [`Error::Config`] if it is not valid TOML for this schema.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        toml::from_str(&raw).map_err(|source| Error::Config {
            path: path.display().to_string(),
            source,
        })
    }

    /// Applies environment overrides through `lookup` (usually `std::env::var`).
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(v) = non_empty("APP_WS_BASE_URL") {
            self.ws_base_url = Some(v);
        }
        if let Some(v) = non_empty("APP_BASE_URL") {
            self.base_url = Some(v);
        }
        if let Some(v) = non_empty("VITE_PROXY_TARGET") {
            self.proxy_target = Some(v);
        }
        if let Some(v) = non_empty("WEAVE_TOKEN") {
            self.token = Some(v);
        }
        self
    }

    /// Absolute HTTP URL for an API `path` (which must start with `/`).
    pub fn api_url(&self, path: &str) -> String {
        let base = self
            .base_url
            .as_deref()
            .filter(|b| !b.is_empty())
            .unwrap_or(&self.origin);
        format!("{}{}", base.trim_end_matches('/'), path)
    }

    /// Resolves the chat websocket endpoint, including the auth token.
    pub fn chat_ws_url(&self) -> String {
        let backend_base = self
            .base_url
            .as_deref()
            .or(self.ws_base_url.as_deref())
            .or(self.proxy_target.as_deref())
            .filter(|b| !b.is_empty());

        let configured = if let Some(ws) = self.ws_base_url.as_deref().filter(|b| !b.is_empty()) {
            ws.to_owned()
        } else if let Some(base) = backend_base {
            format!("{}{}", base.strip_suffix('/').unwrap_or(base), CHAT_WS_PATH)
        } else {
            self.api_url(CHAT_WS_PATH)
        };

        let resolved = self.resolve_absolute(&configured);
        match self.token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => with_token(&resolved, token),
            None => resolved,
        }
    }

    /// Turns `target` into an absolute `ws:`/`wss:` URL.
    fn resolve_absolute(&self, target: &str) -> String {
        if target.starts_with("ws") {
            return target.to_owned();
        }
        if let Some(rest) = target.strip_prefix("http") {
            return format!("ws{rest}");
        }
        let secure = self.origin.starts_with("https:");
        let protocol = if secure { "wss:" } else { "ws:" };
        let host = Url::parse(&self.origin)
            .ok()
            .and_then(|u| {
                u.host_str().map(|h| match u.port() {
                    Some(p) => format!("{h}:{p}"),
                    None => h.to_owned(),
                })
            })
            .unwrap_or_else(|| "localhost".to_owned());
        let normalized = if target.starts_with('/') {
            target.to_owned()
        } else {
            format!("/{target}")
        };
        format!("{protocol}//{host}{normalized}")
    }
}

/// Sets the `token` query parameter, replacing any existing one.
///
/// Falls back to the unmodified URL when it does not parse.
fn with_token(resolved: &str, token: &str) -> String {
    match Url::parse(resolved) {
        Ok(mut url) => {
            let kept: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(k, _)| k != "token")
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            {
                let mut pairs = url.query_pairs_mut();
                pairs.clear();
                for (k, v) in &kept {
                    pairs.append_pair(k, v);
                }
                pairs.append_pair("token", token);
            }
            url.to_string()
        }
        Err(e) => {
            tracing::warn!(url = resolved, error = %e, "websocket url did not parse; token not attached");
            resolved.to_owned()
        }
    }
}
