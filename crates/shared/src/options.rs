use serde::{Deserialize, Serialize};
use std::rc::Rc;
use thiserror::Error;

/// Invoked with the content element id and the new text on every input event.
pub type InputCallback = Rc<dyn Fn(&str, &str)>;

pub const DEFAULT_BACKGROUND_COLOR: &str = "white";
pub const DEFAULT_TEXT_COLOR: &str = "black";
pub const DEFAULT_DRAG_MESSAGE: &str = "Click to drop me somewhere!";
pub const DEFAULT_CLICK_PLACEHOLDER: &str = "What is interesting here?";
pub const DEFAULT_COOKIE_STAMP: &str = "L-Comment-";

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("invalid comment options: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Widget configuration. Every field has a default, so any subset of keys
/// may be supplied as JSON.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommentOptions {
    pub background_color: String,
    pub text_color: String,
    pub on_drag_message: String,
    pub on_click_placeholder: String,
    #[serde(alias = "saveInCookies")]
    pub use_cookies: bool,
    pub cookie_stamp: String,
    #[serde(skip)]
    pub on_input: Option<InputCallback>,
}

impl Default for CommentOptions {
    fn default() -> Self {
        Self {
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            text_color: DEFAULT_TEXT_COLOR.to_string(),
            on_drag_message: DEFAULT_DRAG_MESSAGE.to_string(),
            on_click_placeholder: DEFAULT_CLICK_PLACEHOLDER.to_string(),
            use_cookies: true,
            cookie_stamp: DEFAULT_COOKIE_STAMP.to_string(),
            on_input: None,
        }
    }
}

impl std::fmt::Debug for CommentOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommentOptions")
            .field("background_color", &self.background_color)
            .field("text_color", &self.text_color)
            .field("on_drag_message", &self.on_drag_message)
            .field("on_click_placeholder", &self.on_click_placeholder)
            .field("use_cookies", &self.use_cookies)
            .field("cookie_stamp", &self.cookie_stamp)
            .field("on_input", &self.on_input.is_some())
            .finish()
    }
}

impl CommentOptions {
    pub fn from_json(json: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_on_input(mut self, callback: impl Fn(&str, &str) + 'static) -> Self {
        self.on_input = Some(Rc::new(callback));
        self
    }

    pub fn snapshot(&self) -> OptionsSnapshot {
        OptionsSnapshot {
            background_color: self.background_color.clone(),
            text_color: self.text_color.clone(),
            on_drag_message: self.on_drag_message.clone(),
            on_click_placeholder: self.on_click_placeholder.clone(),
            use_cookies: self.use_cookies,
            cookie_stamp: self.cookie_stamp.clone(),
        }
    }

    /// Inline style applied to every content element.
    pub fn inline_style(&self) -> String {
        format!(
            "background-color: {}; color: {};",
            self.background_color, self.text_color
        )
    }
}

/// The data part of `CommentOptions`, persisted with every record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsSnapshot {
    pub background_color: String,
    pub text_color: String,
    pub on_drag_message: String,
    pub on_click_placeholder: String,
    pub use_cookies: bool,
    pub cookie_stamp: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_defaults() {
        let opts = CommentOptions::default();
        assert_eq!(opts.background_color, "white");
        assert_eq!(opts.text_color, "black");
        assert!(opts.use_cookies);
        assert_eq!(opts.cookie_stamp, "L-Comment-");
        assert!(opts.on_input.is_none());
    }

    #[test]
    fn test_from_json_partial_keeps_defaults() {
        let opts = CommentOptions::from_json(r#"{"textColor":"red","cookieStamp":"pin-"}"#).unwrap();
        assert_eq!(opts.text_color, "red");
        assert_eq!(opts.cookie_stamp, "pin-");
        assert_eq!(opts.background_color, "white");
        assert_eq!(opts.on_drag_message, DEFAULT_DRAG_MESSAGE);
    }

    #[test]
    fn test_save_in_cookies_alias() {
        let opts = CommentOptions::from_json(r#"{"saveInCookies":false}"#).unwrap();
        assert!(!opts.use_cookies);
        let opts = CommentOptions::from_json(r#"{"useCookies":false}"#).unwrap();
        assert!(!opts.use_cookies);
    }

    #[test]
    fn test_from_json_rejects_bad_types() {
        let result = CommentOptions::from_json(r#"{"useCookies":"yes"}"#);
        assert!(matches!(result, Err(OptionsError::Parse(_))));
    }

    #[test]
    fn test_on_input_callback_is_invoked() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let opts = CommentOptions::default()
            .with_on_input(move |id, text| sink.borrow_mut().push(format!("{id}:{text}")));
        (opts.on_input.as_ref().unwrap())("L-Comment-1", "hi");
        assert_eq!(seen.borrow().as_slice(), ["L-Comment-1:hi"]);
    }

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let json = serde_json::to_value(CommentOptions::default().snapshot()).unwrap();
        assert_eq!(json["backgroundColor"], "white");
        assert_eq!(json["cookieStamp"], "L-Comment-");
        assert!(json.get("onInput").is_none());
    }

    #[test]
    fn test_inline_style() {
        let opts = CommentOptions {
            background_color: "#222".into(),
            text_color: "#eee".into(),
            ..Default::default()
        };
        assert_eq!(opts.inline_style(), "background-color: #222; color: #eee;");
    }
}
