//! Artifact markup parser.
//!
//! The assistant embeds workspace changes in its replies as
//!
//! ```text
//! <boltArtifact id="..." title="...">
//! <boltAction type="file" filePath="src/main.js">
//! ...file body...
//! </boltAction>
//! <boltAction type="shell">npm install</boltAction>
//! </boltArtifact>
//! ```
//!
//! Bodies are literal source text, so this is scanned with regexes rather than
//! an XML reader: a body may contain `<`, `&` and unbalanced tags. A wrapper or
//! action left open at the end of the text (a reply still streaming, or a
//! truncated generation) is scanned up to the end of the input.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::types::{Message, Role};

/// Opening tag prefix of the artifact wrapper.
pub const ARTIFACT_MARKER: &str = "<boltArtifact";

/// Generated icon-component files that are never extracted or re-sent.
pub const EXCLUDED_FILES: &[&str] = &[
    "components/weicon/base64.js",
    "components/weicon/icon.css",
    "components/weicon/index.js",
    "components/weicon/index.json",
    "components/weicon/index.wxml",
    "components/weicon/icondata.js",
    "components/weicon/index.css",
    "/miniprogram/components/weicon/base64.js",
    "/miniprogram/components/weicon/icon.css",
    "/miniprogram/components/weicon/index.js",
    "/miniprogram/components/weicon/index.json",
    "/miniprogram/components/weicon/index.wxml",
    "/miniprogram/components/weicon/icondata.js",
    "/miniprogram/components/weicon/index.css",
];

/// Prompt appended when a reply stops in the middle of an artifact.
pub const CONTINUE_PROMPT: &str =
    "Your previous response was cut off. Continue exactly where you stopped, without repeating finished files.";

static ARTIFACT_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<boltArtifact\b[^>]*>").expect("valid regex"));
static ACTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<boltAction\b([^>]*)>(.*?)(?:</boltAction>|\z)").expect("valid regex")
});
static ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"([A-Za-z_][\w-]*)="([^"]*)""#).expect("valid regex"));

const ARTIFACT_CLOSE: &str = "</boltArtifact>";
const ACTION_OPEN: &str = "<boltAction";
const ACTION_CLOSE: &str = "</boltAction>";

/// One `<boltAction>` child of an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    File { path: String, content: String },
    Shell { command: String },
    Start { command: String },
}

/// Everything extracted from one message body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedMessage {
    pub files: BTreeMap<String, String>,
    pub actions: Vec<Action>,
}

impl ParsedMessage {
    /// Shell/start commands in document order.
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.actions.iter().filter_map(|a| match a {
            Action::Shell { command } | Action::Start { command } => Some(command.as_str()),
            Action::File { .. } => None,
        })
    }
}

pub fn is_excluded(path: &str) -> bool {
    EXCLUDED_FILES.contains(&path)
}

/// Extracts file blocks and commands from every artifact wrapper in `text`.
pub fn parse_message(text: &str) -> ParsedMessage {
    let mut parsed = ParsedMessage::default();

    for open in ARTIFACT_OPEN.find_iter(text) {
        let rest = &text[open.end()..];
        let body = match rest.find(ARTIFACT_CLOSE) {
            Some(end) => &rest[..end],
            None => rest,
        };

        for caps in ACTION.captures_iter(body) {
            let attrs = parse_attrs(&caps[1]);
            let raw = &caps[2];
            let kind = attrs.iter().find(|(k, _)| k == "type").map(|(_, v)| v.as_str());
            match kind {
                Some("file") => {
                    let Some(path) = attrs
                        .iter()
                        .find(|(k, _)| k == "filePath")
                        .map(|(_, v)| v.clone())
                    else {
                        tracing::debug!("file action without filePath skipped");
                        continue;
                    };
                    if is_excluded(&path) {
                        continue;
                    }
                    let content = trim_body(raw).to_owned();
                    parsed.files.insert(path.clone(), content.clone());
                    parsed.actions.push(Action::File { path, content });
                }
                Some("shell") => parsed.actions.push(Action::Shell {
                    command: raw.trim().to_owned(),
                }),
                Some("start") => parsed.actions.push(Action::Start {
                    command: raw.trim().to_owned(),
                }),
                other => tracing::debug!(?other, "unknown action type skipped"),
            }
        }
    }

    parsed
}

/// Renders `files` as a single artifact wrapper, or `None` when nothing is left
/// after the denylist.
pub fn render_artifact(title: &str, files: &BTreeMap<String, String>) -> Option<String> {
    let actions: Vec<String> = files
        .iter()
        .filter(|(path, _)| !is_excluded(path))
        .map(|(path, content)| {
            format!("<boltAction type=\"file\" filePath=\"{path}\">\n{content}\n</boltAction>")
        })
        .collect();
    if actions.is_empty() {
        return None;
    }
    Some(format!(
        "<boltArtifact id=\"hello-js\" title=\"{title}\">\n{}\n</boltArtifact>\n\n",
        actions.join("\n\n")
    ))
}

/// True when the text ends inside an unterminated artifact or action.
pub fn is_truncated(text: &str) -> bool {
    let open_unclosed = |open: &str, close: &str| match text.rfind(open) {
        Some(pos) => !text[pos..].contains(close),
        None => false,
    };
    open_unclosed(ARTIFACT_MARKER, ARTIFACT_CLOSE) || open_unclosed(ACTION_OPEN, ACTION_CLOSE)
}

/// Returns the follow-up prompt to send when `text` stopped mid-artifact.
pub fn check_finish(text: &str) -> Option<&'static str> {
    is_truncated(text).then_some(CONTINUE_PROMPT)
}

/// Commands from the last assistant message that have no recorded result.
pub fn pending_commands(messages: &[Message], executed: &HashSet<String>) -> Vec<String> {
    let Some(last) = messages.iter().rev().find(|m| m.role == Role::Assistant) else {
        return Vec::new();
    };
    parse_message(&last.content)
        .commands()
        .filter(|cmd| !executed.contains(*cmd))
        .map(str::to_owned)
        .collect()
}

fn parse_attrs(raw: &str) -> Vec<(String, String)> {
    ATTR.captures_iter(raw)
        .map(|c| (c[1].to_owned(), c[2].to_owned()))
        .collect()
}

/// Drops the single newline that follows the opening tag and precedes the closing one.
fn trim_body(raw: &str) -> &str {
    let body = raw.strip_prefix('\n').unwrap_or(raw);
    body.strip_suffix('\n').unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = "Here you go.\n\
<boltArtifact id=\"todo\" title=\"Todo app\">\n\
<boltAction type=\"file\" filePath=\"src/index.js\">\n\
if (a < b && c) { run(); }\n\
</boltAction>\n\
<boltAction type=\"file\" filePath=\"components/weicon/index.js\">\nicons\n</boltAction>\n\
<boltAction type=\"shell\">\nnpm install\n</boltAction>\n\
<boltAction type=\"start\">npm run dev</boltAction>\n\
</boltArtifact>\nDone.";

    #[test]
    fn extracts_files_and_commands() {
        let parsed = parse_message(REPLY);
        assert_eq!(parsed.files.len(), 1);
        assert_eq!(parsed.files["src/index.js"], "if (a < b && c) { run(); }");
        let cmds: Vec<&str> = parsed.commands().collect();
        assert_eq!(cmds, vec!["npm install", "npm run dev"]);
    }

    #[test]
    fn denylisted_paths_are_skipped() {
        let parsed = parse_message(REPLY);
        assert!(!parsed.files.contains_key("components/weicon/index.js"));
    }

    #[test]
    fn text_without_artifact_yields_nothing() {
        let parsed = parse_message("<boltAction type=\"file\" filePath=\"x\">y</boltAction>");
        assert_eq!(parsed, ParsedMessage::default());
    }

    #[test]
    fn streaming_tail_is_still_scanned() {
        let partial = "<boltArtifact id=\"a\" title=\"b\">\n<boltAction type=\"file\" filePath=\"a.js\">\nconst x = 1;";
        let parsed = parse_message(partial);
        assert_eq!(parsed.files["a.js"], "const x = 1;");
        assert!(is_truncated(partial));
        assert_eq!(check_finish(partial), Some(CONTINUE_PROMPT));
    }

    #[test]
    fn complete_reply_is_not_truncated() {
        assert!(!is_truncated(REPLY));
        assert!(!is_truncated("plain answer"));
        assert_eq!(check_finish(REPLY), None);
    }

    #[test]
    fn render_then_parse_recovers_files() {
        let files = BTreeMap::from([
            ("a.js".to_owned(), "let a;\nlet b;".to_owned()),
            ("components/weicon/icon.css".to_owned(), "x".to_owned()),
        ]);
        let text = render_artifact("the current file", &files).unwrap();
        assert!(text.starts_with(ARTIFACT_MARKER));
        let parsed = parse_message(&text);
        assert_eq!(parsed.files.len(), 1);
        assert_eq!(parsed.files["a.js"], "let a;\nlet b;");
    }

    #[test]
    fn render_of_only_excluded_files_is_none() {
        let files = BTreeMap::from([("components/weicon/icon.css".to_owned(), "x".to_owned())]);
        assert_eq!(render_artifact("t", &files), None);
    }

    #[test]
    fn pending_commands_skip_executed() {
        let messages = vec![
            Message::with_id("u", Role::User, "make it"),
            Message::with_id("a", Role::Assistant, REPLY),
        ];
        let executed = HashSet::from(["npm install".to_owned()]);
        assert_eq!(pending_commands(&messages, &executed), vec!["npm run dev".to_owned()]);
    }
}
