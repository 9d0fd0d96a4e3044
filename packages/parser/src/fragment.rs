//! Detached node trees used to build content before it is inserted into a
//! [`Document`](crate::Document).
//!
//! Templates are written with the chainable builder:
//!
//! ```
//! use pagecraft_parser::fragment::{element, text};
//!
//! let button = element("a")
//!     .with_attr("href", "#")
//!     .with_style("padding", "12px 24px")
//!     .with_child(text("Click Me"));
//! ```

use crate::ast::Attribute;
use crate::style::InlineStyle;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FragmentNode {
    Element {
        tag: String,
        #[serde(default)]
        attributes: Vec<Attribute>,
        #[serde(default)]
        children: Vec<FragmentNode>,
    },
    Text {
        content: String,
    },
    Comment {
        content: String,
    },
}

pub fn element(tag: &str) -> FragmentNode {
    FragmentNode::Element {
        tag: tag.to_ascii_lowercase(),
        attributes: Vec::new(),
        children: Vec::new(),
    }
}

pub fn text(content: impl Into<String>) -> FragmentNode {
    FragmentNode::Text {
        content: content.into(),
    }
}

impl FragmentNode {
    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        if let FragmentNode::Element { attributes, .. } = &mut self {
            let value = value.into();
            match attributes.iter_mut().find(|a| a.name == name) {
                Some(attr) => attr.value = value,
                None => attributes.push(Attribute::new(name, value)),
            }
        }
        self
    }

    /// Set a single inline style property, merging into any existing style.
    pub fn with_style(self, property: &str, value: &str) -> Self {
        let mut style = InlineStyle::parse(self.attr("style").unwrap_or_default());
        style.set(property, value);
        self.with_attr("style", style.to_string())
    }

    /// Set several inline style properties in order.
    pub fn with_styles(self, declarations: &[(&str, &str)]) -> Self {
        declarations
            .iter()
            .fold(self, |node, (property, value)| node.with_style(property, value))
    }

    pub fn with_child(mut self, child: FragmentNode) -> Self {
        if let FragmentNode::Element { children, .. } = &mut self {
            children.push(child);
        }
        self
    }

    pub fn with_children(mut self, new_children: impl IntoIterator<Item = FragmentNode>) -> Self {
        if let FragmentNode::Element { children, .. } = &mut self {
            children.extend(new_children);
        }
        self
    }

    pub fn with_text(self, content: impl Into<String>) -> Self {
        self.with_child(text(content))
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            FragmentNode::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            FragmentNode::Element { attributes, .. } => attributes
                .iter()
                .find(|a| a.name == name)
                .map(|a| a.value.as_str()),
            _ => None,
        }
    }

    pub fn children(&self) -> &[FragmentNode] {
        match self {
            FragmentNode::Element { children, .. } => children,
            _ => &[],
        }
    }

    /// Concatenated text of this subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            FragmentNode::Text { content } => out.push_str(content),
            FragmentNode::Element { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
            FragmentNode::Comment { .. } => {}
        }
    }
}
