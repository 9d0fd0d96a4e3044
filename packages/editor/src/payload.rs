//! Persisted page model and the save hook.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Document shown when a page has no stored markup
pub const PLACEHOLDER_HTML: &str = concat!(
    r#"<section style="padding: 64px 24px; text-align: center;">"#,
    r#"<h1 style="font-size: 40px; margin: 0 0 16px;">Start building your page</h1>"#,
    r#"<p style="font-size: 18px; color: #6b7280;">Drag components from the left panel onto the canvas.</p>"#,
    "</section>",
);

/// Stylesheet emitted when the caller supplies none
pub const UTILITY_CSS: &str = "\
* { box-sizing: border-box; }
body { margin: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; color: #1a1a1a; }
img { max-width: 100%; height: auto; }
a { color: inherit; }
.text-center { text-align: center; }
.text-left { text-align: left; }
.text-right { text-align: right; }
.container { max-width: 1200px; margin: 0 auto; padding: 0 16px; }
";

/// Page payload exchanged with the save callback and the backend
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PagePayload {
    #[serde(default)]
    pub components: Vec<Value>,
    #[serde(default)]
    pub sections: Vec<Value>,
    #[serde(default)]
    pub html: String,
    #[serde(default)]
    pub css: String,
}

impl PagePayload {
    /// Outgoing payload. Component and section lists are always empty;
    /// blank css is replaced by [`UTILITY_CSS`].
    pub fn new(html: impl Into<String>, css: &str) -> Self {
        Self {
            components: Vec::new(),
            sections: Vec::new(),
            html: html.into(),
            css: css_or_default(css),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Markup to load into the editor
    pub fn initial_html(&self) -> &str {
        if self.html.trim().is_empty() {
            PLACEHOLDER_HTML
        } else {
            &self.html
        }
    }
}

pub fn css_or_default(css: &str) -> String {
    if css.trim().is_empty() {
        UTILITY_CSS.to_string()
    } else {
        css.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveKind {
    /// Debounced save after edits settle
    Auto,
    /// Explicit save button
    Manual,
}

/// Receiver of serialized pages
pub trait SaveSink {
    fn save(&mut self, payload: &PagePayload, kind: SaveKind);
}

impl<F> SaveSink for F
where
    F: FnMut(&PagePayload, SaveKind),
{
    fn save(&mut self, payload: &PagePayload, kind: SaveKind) {
        self(payload, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outgoing_payload_shape() {
        let payload = PagePayload::new("<p>Hi</p>", "");
        let json: Value = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["components"], serde_json::json!([]));
        assert_eq!(json["sections"], serde_json::json!([]));
        assert_eq!(json["html"], "<p>Hi</p>");
        assert_eq!(json["css"], UTILITY_CSS);
    }

    #[test]
    fn test_css_passthrough() {
        let payload = PagePayload::new("", "h1 { color: red; }");
        assert_eq!(payload.css, "h1 { color: red; }");
    }

    #[test]
    fn test_partial_payload_and_placeholder() {
        let payload = PagePayload::from_json(r#"{ "css": "" }"#).unwrap();
        assert!(payload.components.is_empty());
        assert_eq!(payload.initial_html(), PLACEHOLDER_HTML);
    }

    #[test]
    fn test_closure_sink() {
        let mut saved = Vec::new();
        {
            let mut sink = |payload: &PagePayload, kind: SaveKind| {
                saved.push((payload.html.clone(), kind));
            };
            sink.save(&PagePayload::new("<p>x</p>", ""), SaveKind::Manual);
        }
        assert_eq!(saved, vec![("<p>x</p>".to_string(), SaveKind::Manual)]);
    }
}
