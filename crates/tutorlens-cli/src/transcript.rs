//! JSONL chat transcript as the host query surface.
//!
//! Each line is one message, either `{"role": ..., "content": ...}` or the
//! same object nested under `"message"`. Content is a string or an array of
//! parts, of which only `text` parts count. Meta lines and tool-result
//! continuations carry the `user` role but are not prompts, so they are
//! skipped.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};
use tutorlens_watch::PromptSource;

#[derive(Debug, Deserialize)]
struct TranscriptEntry {
    #[serde(default)]
    role: Option<String>,
    #[serde(default, rename = "type")]
    entry_type: Option<String>,
    #[serde(default)]
    content: Option<MessageContent>,
    #[serde(default)]
    message: Option<Box<TranscriptEntry>>,
    #[serde(default, rename = "isMeta")]
    is_meta: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(default, rename = "type")]
    part_type: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

impl TranscriptEntry {
    fn is_user(&self) -> bool {
        match (&self.message, self.role.as_deref()) {
            (Some(message), _) => message.is_user(),
            (None, Some(role)) => role == "user",
            (None, None) => self.entry_type.as_deref() == Some("user"),
        }
    }

    /// A user line written by the user, not by the tool loop.
    fn is_prompt(&self) -> bool {
        self.is_user() && !self.is_meta && !self.is_tool_result_continuation()
    }

    fn is_tool_result_continuation(&self) -> bool {
        if let Some(message) = &self.message {
            return message.is_meta || message.is_tool_result_continuation();
        }
        matches!(
            &self.content,
            Some(MessageContent::Parts(parts))
                if parts.iter().any(|part| part.part_type.as_deref() == Some("tool_result"))
        )
    }

    fn text(&self) -> Option<String> {
        if let Some(message) = &self.message {
            return message.text();
        }
        let text = match self.content.as_ref()? {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Parts(parts) => parts
                .iter()
                .filter_map(|part| part.text.as_deref())
                .collect::<Vec<_>>()
                .join("\n"),
        };
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_owned())
    }
}

/// Plain text of the last user message in JSONL `contents`.
///
/// Unparseable lines, meta lines and tool results are skipped. A last user
/// prompt without text yields `None` rather than falling back to an older
/// one.
pub fn latest_user_text(contents: &str) -> Option<String> {
    contents
        .lines()
        .rev()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<TranscriptEntry>(line) {
            Ok(entry) => Some(entry),
            Err(error) => {
                debug!("skipping unparseable transcript line: {error}");
                None
            }
        })
        .find(TranscriptEntry::is_prompt)
        .and_then(|entry| entry.text())
}

/// Reads the latest user message from a transcript file on every query.
#[derive(Debug, Clone)]
pub struct TranscriptSource {
    path: PathBuf,
}

impl TranscriptSource {
    /// Creates a source over the transcript at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Transcript location.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PromptSource for TranscriptSource {
    fn latest_user_text(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => latest_user_text(&contents),
            Err(error) if error.kind() == ErrorKind::NotFound => None,
            Err(error) => {
                warn!(path = %self.path.display(), "failed to read transcript: {error}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_latest_user_message_wins() {
        let contents = r#"{"role":"user","content":"first question here"}
{"role":"assistant","content":"an answer"}
{"role":"user","content":"  second question here  "}
{"role":"assistant","content":"another answer"}"#;
        assert_eq!(
            latest_user_text(contents),
            Some("second question here".to_owned())
        );
    }

    #[test]
    fn test_content_parts_and_nested_messages() {
        let contents = r#"{"type":"user","message":{"role":"user","content":[{"type":"text","text":"Is my proof"},{"type":"image"},{"type":"text","text":"correct?"}]}}"#;
        assert_eq!(
            latest_user_text(contents),
            Some("Is my proof\ncorrect?".to_owned())
        );
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let contents = "{\"role\":\"user\",\"content\":\"explain closures to me\"}\nnot json at all\n";
        assert_eq!(
            latest_user_text(contents),
            Some("explain closures to me".to_owned())
        );
    }

    #[test]
    fn test_no_user_message() {
        assert_eq!(latest_user_text(""), None);
        assert_eq!(
            latest_user_text(r#"{"role":"assistant","content":"hello"}"#),
            None
        );
    }

    #[test]
    fn test_textless_user_message_is_absent() {
        let contents = r#"{"role":"user","content":"older prompt with text"}
{"role":"user","content":[{"type":"image"}]}"#;
        assert_eq!(latest_user_text(contents), None);
    }

    #[test]
    fn test_tool_results_and_meta_lines_are_skipped() {
        let contents = r#"{"type":"user","message":{"role":"user","content":"Please write the code for a binary search tree"}}
{"type":"assistant","message":{"role":"assistant","content":[{"type":"tool_use","id":"toolu_1","name":"Read","input":{}}]}}
{"type":"user","message":{"role":"user","content":[{"type":"tool_result","tool_use_id":"toolu_1","content":"fn main() {}"}]}}
{"type":"user","isMeta":true,"message":{"role":"user","content":"<local-command-caveat>ignore</local-command-caveat>"}}"#;
        assert_eq!(
            latest_user_text(contents),
            Some("Please write the code for a binary search tree".to_owned())
        );
    }

    #[test]
    fn test_source_reads_file_and_tolerates_missing() {
        let temp = match TempDir::new() {
            Ok(temp) => temp,
            Err(error) => panic!("temp dir: {error}"),
        };
        let path = temp.path().join("chat.jsonl");
        let source = TranscriptSource::new(&path);
        assert_eq!(source.latest_user_text(), None);

        if let Err(error) = fs::write(&path, "{\"role\":\"user\",\"content\":\"write the code\"}\n") {
            panic!("write failed: {error}");
        }
        assert_eq!(source.latest_user_text(), Some("write the code".to_owned()));
        assert_eq!(source.path(), path.as_path());
    }
}
