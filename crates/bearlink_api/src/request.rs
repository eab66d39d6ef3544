//! Agent request decoding.
//!
//! Requests arrive as `{"tool": "<name>", "arguments": {...}}`. A missing or
//! `null` `arguments` is treated as an empty object so argument-free tools
//! can be called either way.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One agent-facing operation with its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tool", content = "arguments", rename_all = "snake_case")]
pub enum ToolRequest {
    CreateNote {
        title: String,
        text: String,
        #[serde(default)]
        tags: Option<Vec<String>>,
    },
    Search {
        #[serde(default)]
        term: Option<String>,
        #[serde(default)]
        tag: Option<String>,
    },
    GetNote {
        id: String,
    },
    AppendText {
        id: String,
        text: String,
    },
    PrependText {
        id: String,
        text: String,
    },
    ReplaceContent {
        id: String,
        title: String,
        text: String,
        #[serde(default)]
        tags: Option<Vec<String>>,
    },
    ListTags {},
    ListByTag {
        tag: String,
    },
    RenameTag {
        name: String,
        new_name: String,
    },
    DeleteTag {
        name: String,
    },
    TrashNote {
        id: String,
    },
    ArchiveNote {
        id: String,
    },
    UnarchiveNote {
        id: String,
    },
    ListArchived {},
}

#[derive(Debug, Deserialize)]
struct RawRequest {
    tool: String,
    #[serde(default)]
    arguments: Value,
}

impl ToolRequest {
    /// Tool name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateNote { .. } => "create_note",
            Self::Search { .. } => "search",
            Self::GetNote { .. } => "get_note",
            Self::AppendText { .. } => "append_text",
            Self::PrependText { .. } => "prepend_text",
            Self::ReplaceContent { .. } => "replace_content",
            Self::ListTags {} => "list_tags",
            Self::ListByTag { .. } => "list_by_tag",
            Self::RenameTag { .. } => "rename_tag",
            Self::DeleteTag { .. } => "delete_tag",
            Self::TrashNote { .. } => "trash_note",
            Self::ArchiveNote { .. } => "archive_note",
            Self::UnarchiveNote { .. } => "unarchive_note",
            Self::ListArchived {} => "list_archived",
        }
    }

    /// Decodes one JSON request.
    ///
    /// # Errors
    /// Returns a human-readable message for malformed JSON, unknown tools or
    /// bad arguments.
    pub fn from_json(input: &str) -> Result<Self, String> {
        let raw: RawRequest =
            serde_json::from_str(input).map_err(|err| format!("malformed request: {err}"))?;
        let arguments = match raw.arguments {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        let tool = raw.tool;

        let mut envelope = Map::new();
        envelope.insert("tool".to_string(), Value::String(tool.clone()));
        envelope.insert("arguments".to_string(), arguments);
        serde_json::from_value(Value::Object(envelope))
            .map_err(|err| format!("invalid request for tool `{tool}`: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::ToolRequest;

    #[test]
    fn decodes_tool_with_arguments() {
        let request = ToolRequest::from_json(
            r#"{"tool":"create_note","arguments":{"title":"X","text":"body","tags":["a","b"]}}"#,
        )
        .unwrap();
        assert_eq!(
            request,
            ToolRequest::CreateNote {
                title: "X".to_string(),
                text: "body".to_string(),
                tags: Some(vec!["a".to_string(), "b".to_string()]),
            }
        );
        assert_eq!(request.name(), "create_note");
    }

    #[test]
    fn argument_free_tools_accept_missing_null_or_empty_arguments() {
        for input in [
            r#"{"tool":"list_tags"}"#,
            r#"{"tool":"list_tags","arguments":null}"#,
            r#"{"tool":"list_tags","arguments":{}}"#,
        ] {
            assert_eq!(ToolRequest::from_json(input).unwrap(), ToolRequest::ListTags {});
        }
    }

    #[test]
    fn search_arguments_are_optional() {
        assert_eq!(
            ToolRequest::from_json(r#"{"tool":"search"}"#).unwrap(),
            ToolRequest::Search {
                term: None,
                tag: None
            }
        );
    }

    #[test]
    fn unknown_tool_and_missing_fields_are_reported() {
        let unknown = ToolRequest::from_json(r#"{"tool":"format_disk"}"#).unwrap_err();
        assert!(unknown.contains("format_disk"));

        let missing = ToolRequest::from_json(r#"{"tool":"get_note","arguments":{}}"#).unwrap_err();
        assert!(missing.contains("id"));

        let malformed = ToolRequest::from_json("{not json").unwrap_err();
        assert!(malformed.starts_with("malformed request"));
    }
}
