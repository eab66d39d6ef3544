//! Write path: callback-URL actions handed to the host app.
//!
//! # Responsibility
//! - Describe mutations as named actions with ordered parameters.
//! - Encode them as `<scheme>://x-callback-url/<action>?<params>` URLs.
//! - Dispatch through an [`ActionChannel`].
//!
//! # Invariants
//! - Every parameter value is percent-encoded; spaces become `%20`.
//! - A successful dispatch means the URL was handed to the opener, not that
//!   the host app applied the change. Reads may not reflect it yet.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod channel;
pub mod compose;

pub use channel::{ActionChannel, SystemActionChannel};

pub type ActionResult<T> = Result<T, ActionError>;

/// Host app actions reachable through the callback scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    AddText,
    Trash,
    Archive,
    Unarchive,
    RenameTag,
    DeleteTag,
}

impl Action {
    /// Path segment used in the callback URL.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::AddText => "add-text",
            Self::Trash => "trash",
            Self::Archive => "archive",
            Self::Unarchive => "unarchive",
            Self::RenameTag => "rename-tag",
            Self::DeleteTag => "delete-tag",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `mode` values of the `add-text` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextMode {
    Append,
    Prepend,
    ReplaceAll,
}

impl TextMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Append => "append",
            Self::Prepend => "prepend",
            Self::ReplaceAll => "replace_all",
        }
    }
}

/// One action plus its parameters, in the order they are encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub action: Action,
    pub params: Vec<(&'static str, String)>,
}

impl ActionRequest {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            params: Vec::new(),
        }
    }

    /// Appends a parameter.
    pub fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.params.push((name, value.into()));
        self
    }

    /// Returns the first value recorded for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Encodes this request as a callback URL for `scheme`.
    pub fn to_url(&self, scheme: &str) -> String {
        let mut url = format!("{scheme}://x-callback-url/{}", self.action.as_str());
        for (idx, (name, value)) in self.params.iter().enumerate() {
            url.push(if idx == 0 { '?' } else { '&' });
            url.push_str(&urlencoding::encode(name));
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }
}

/// Write path failure.
#[derive(Debug)]
pub enum ActionError {
    /// The platform opener could not be invoked.
    DispatchFailed {
        action: Action,
        params: Vec<(&'static str, String)>,
        source: std::io::Error,
    },
}

impl Display for ActionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DispatchFailed { action, .. } => {
                write!(f, "action call failed: could not dispatch `{action}` to the notes app")
            }
        }
    }
}

impl Error for ActionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DispatchFailed { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, ActionRequest, TextMode};

    #[test]
    fn url_without_params_has_no_query_string() {
        let request = ActionRequest::new(Action::Trash);
        assert_eq!(request.to_url("bear"), "bear://x-callback-url/trash");
    }

    #[test]
    fn url_percent_encodes_every_value_in_order() {
        let request = ActionRequest::new(Action::AddText)
            .param("id", "ABC-123")
            .param("mode", TextMode::ReplaceAll.as_str())
            .param("text", "# Plan & Budget\n#work 100%");

        assert_eq!(
            request.to_url("bear"),
            "bear://x-callback-url/add-text?id=ABC-123&mode=replace_all\
             &text=%23%20Plan%20%26%20Budget%0A%23work%20100%25"
        );
    }

    #[test]
    fn url_encodes_non_ascii_as_utf8() {
        let request = ActionRequest::new(Action::RenameTag)
            .param("name", "café")
            .param("new_name", "a/b");
        assert_eq!(
            request.to_url("bear"),
            "bear://x-callback-url/rename-tag?name=caf%C3%A9&new_name=a%2Fb"
        );
    }

    #[test]
    fn get_returns_first_matching_param() {
        let request = ActionRequest::new(Action::Create).param("title", "X");
        assert_eq!(request.get("title"), Some("X"));
        assert_eq!(request.get("text"), None);
        assert_eq!(Action::DeleteTag.to_string(), "delete-tag");
    }
}
