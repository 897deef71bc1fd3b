//! Editor Configuration

use serde::Deserialize;

use crate::EditorResult;

/// Editor configuration options
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Selectors whose matches (and their descendants) cannot be selected,
    /// dragged or deleted
    pub read_only: Vec<String>,

    /// Selectors for fallback targets when selection hits a read-only node
    pub editable: Vec<String>,

    /// Selector for the node selected when nothing better applies
    pub default_selected: Option<String>,

    /// Maximum number of undo snapshots
    pub history_limit: usize,

    /// Smallest width or height a resize may produce
    pub min_resize: f64,

    /// Tags that become contenteditable on activation
    pub editable_tags: Vec<String>,

    /// Source given to catalog images declared without one
    pub placeholder_image: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            read_only: Vec::new(),
            editable: Vec::new(),
            default_selected: None,
            history_limit: 100,
            min_resize: 20.0,
            editable_tags: [
                "label", "span", "p", "h1", "h2", "h3", "div", "a", "td", "th", "button", "ul", "li",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            placeholder_image: "assets/no-image.jpg".to_string(),
        }
    }
}

impl EditorConfig {
    /// Load from JSON; missing fields keep their defaults
    pub fn from_json(text: &str) -> EditorResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Whether activation should make this tag contenteditable
    pub fn is_editable_tag(&self, tag: &str) -> bool {
        self.editable_tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.history_limit, 100);
        assert_eq!(config.min_resize, 20.0);
        assert!(config.is_editable_tag("LI"));
        assert!(!config.is_editable_tag("img"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EditorConfig::from_json(
            r#"{ "read_only": [".locked"], "editable": [".card"], "history_limit": 5 }"#,
        )
        .unwrap();

        assert_eq!(config.read_only, vec![".locked"]);
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.min_resize, 20.0);
        assert!(config.default_selected.is_none());
    }

    #[test]
    fn test_bad_json() {
        assert!(EditorConfig::from_json("{ nope").is_err());
    }
}
