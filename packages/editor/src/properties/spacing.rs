use super::{remove_style, set_style, PropertyEdit, RejectedValue};
use crate::mutations::Mutation;
use pagecraft_parser::{Element, NodeKey};
use serde::{Deserialize, Serialize};

pub const WIDTH_PRESETS: [&str; 5] = ["25%", "50%", "75%", "100%", "auto"];
pub const HEIGHT_PRESETS: [&str; 5] = ["auto", "100px", "200px", "300px", "100vh"];

/// Free-text box property. An empty value removes the property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "property", content = "value", rename_all = "snake_case")]
pub enum SpacingEdit {
    Padding(String),
    Margin(String),
    Width(String),
    Height(String),
}

impl SpacingEdit {
    fn property(&self) -> (&'static str, &str) {
        match self {
            SpacingEdit::Padding(v) => ("padding", v.as_str()),
            SpacingEdit::Margin(v) => ("margin", v.as_str()),
            SpacingEdit::Width(v) => ("width", v.as_str()),
            SpacingEdit::Height(v) => ("height", v.as_str()),
        }
    }
}

impl PropertyEdit for SpacingEdit {
    fn mutations(&self, node: &NodeKey, _element: &Element) -> Result<Vec<Mutation>, RejectedValue> {
        let (property, value) = self.property();
        let value = value.trim();
        Ok(if value.is_empty() {
            vec![remove_style(node, property)]
        } else {
            vec![set_style(node, property, value)]
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Spacing {
    pub padding: String,
    pub margin: String,
    pub width: String,
    pub height: String,
}

impl Spacing {
    pub fn read(element: &Element) -> Self {
        let style = element.style();
        let get = |property: &str| style.get(property).unwrap_or_default().to_string();
        Self {
            padding: get("padding"),
            margin: get("margin"),
            width: get("width"),
            height: get("height"),
        }
    }
}
