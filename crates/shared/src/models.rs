use serde::{Deserialize, Serialize};

use crate::geo::LatLng;
use crate::options::OptionsSnapshot;

/// CSS class carried by every content element.
pub const CONTENT_CLASS: &str = "leaflet-comment";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentMode {
    /// Following the pointer, showing the drag prompt.
    Placeholder,
    /// Dropped; showing a text input.
    Editable,
}

impl std::fmt::Display for ContentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentMode::Placeholder => write!(f, "placeholder"),
            ContentMode::Editable => write!(f, "editable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentContent {
    pub mode: ContentMode,
    pub text: String,
}

impl Default for CommentContent {
    fn default() -> Self {
        Self {
            mode: ContentMode::Placeholder,
            text: String::new(),
        }
    }
}

/// Everything a host needs to render the popup body.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentElement {
    /// `<div>` showing `message`.
    Prompt {
        id: String,
        class: String,
        style: String,
        message: String,
    },
    /// `<textarea>` with a placeholder; the host reports edits back through
    /// the popup's input hook.
    TextInput {
        id: String,
        class: String,
        style: String,
        placeholder: String,
        value: String,
    },
}

impl ContentElement {
    pub fn id(&self) -> &str {
        match self {
            ContentElement::Prompt { id, .. } | ContentElement::TextInput { id, .. } => id,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ContentElement::Prompt { .. } => "div",
            ContentElement::TextInput { .. } => "textarea",
        }
    }

    pub fn mode(&self) -> ContentMode {
        match self {
            ContentElement::Prompt { .. } => ContentMode::Placeholder,
            ContentElement::TextInput { .. } => ContentMode::Editable,
        }
    }
}

/// Current properties of a comment instance; also the persisted record body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSnapshot {
    pub id: Option<String>,
    pub enabled: bool,
    pub options: OptionsSnapshot,
    pub content: CommentContent,
    pub position: Option<LatLng>,
}

/// A record read back from the store. Only `content` is required so that
/// records written by a bare `save("text")` can still be told apart from
/// unrelated data and rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord {
    pub content: CommentContent,
    #[serde(default)]
    pub position: Option<LatLng>,
    #[serde(default)]
    pub options: Option<OptionsSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::CommentOptions;

    fn snapshot() -> CommentSnapshot {
        CommentSnapshot {
            id: Some("L-Comment-3".into()),
            enabled: true,
            options: CommentOptions::default().snapshot(),
            content: CommentContent {
                mode: ContentMode::Editable,
                text: "bridge is out".into(),
            },
            position: Some(LatLng::new(48.2, 16.37)),
        }
    }

    #[test]
    fn test_content_mode_display() {
        assert_eq!(ContentMode::Placeholder.to_string(), "placeholder");
        assert_eq!(ContentMode::Editable.to_string(), "editable");
    }

    #[test]
    fn test_snapshot_parses_as_record() {
        let json = serde_json::to_string(&snapshot()).unwrap();
        let record: PersistedRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record.content.text, "bridge is out");
        assert_eq!(record.content.mode, ContentMode::Editable);
        assert_eq!(record.position, Some(LatLng::new(48.2, 16.37)));
        assert_eq!(record.options.unwrap().cookie_stamp, "L-Comment-");
    }

    #[test]
    fn test_record_without_content_is_rejected() {
        let result = serde_json::from_str::<PersistedRecord>(r#"{"value":"hello"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_content_element_accessors() {
        let el = ContentElement::TextInput {
            id: "c-1".into(),
            class: CONTENT_CLASS.into(),
            style: String::new(),
            placeholder: "type".into(),
            value: String::new(),
        };
        assert_eq!(el.id(), "c-1");
        assert_eq!(el.tag(), "textarea");
        assert_eq!(el.mode(), ContentMode::Editable);
    }
}
