//! Slash commands typed into the input line.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    /// Plain text for the assistant.
    Message(String),
    /// `/new`
    NewChat,
    /// `/attach <path>...`
    Attach(Vec<PathBuf>),
    /// `/diff <path>`
    Diff(String),
    /// `/merge <path>`
    Merge(String),
    /// A slash command that is unknown or missing its argument.
    Invalid(String),
}

/// Classifies a submitted input line.
///
/// Only input starting with `/` is inspected; everything else (including
/// `//` and text with a leading space) goes to the assistant unchanged.
pub fn parse(input: &str) -> InputCommand {
    let Some(rest) = input.strip_prefix('/').filter(|r| !r.starts_with('/')) else {
        return InputCommand::Message(input.to_owned());
    };
    let mut words = rest.split_whitespace();
    let Some(name) = words.next() else {
        return InputCommand::Message(input.to_owned());
    };
    let args: Vec<&str> = words.collect();

    match (name, args.as_slice()) {
        ("new", []) => InputCommand::NewChat,
        ("attach", paths) if !paths.is_empty() => {
            InputCommand::Attach(paths.iter().map(PathBuf::from).collect())
        }
        ("diff", [path]) => InputCommand::Diff((*path).to_owned()),
        ("merge", [path]) => InputCommand::Merge((*path).to_owned()),
        _ => InputCommand::Invalid(format!("/{name}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_message() {
        assert_eq!(parse("fix the bug"), InputCommand::Message("fix the bug".into()));
        assert_eq!(parse("//not a command"), InputCommand::Message("//not a command".into()));
    }

    #[test]
    fn recognises_commands() {
        assert_eq!(parse("/new"), InputCommand::NewChat);
        assert_eq!(
            parse("/attach a.png  b.png"),
            InputCommand::Attach(vec![PathBuf::from("a.png"), PathBuf::from("b.png")])
        );
        assert_eq!(parse("/diff src/app.js"), InputCommand::Diff("src/app.js".into()));
        assert_eq!(parse("/merge src/app.js"), InputCommand::Merge("src/app.js".into()));
    }

    #[test]
    fn bad_commands_are_flagged() {
        assert_eq!(parse("/attach"), InputCommand::Invalid("/attach".into()));
        assert_eq!(parse("/frobnicate x"), InputCommand::Invalid("/frobnicate".into()));
    }
}
