use crate::style::InlineStyle;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Attribute marking elements the editor injects into the live document
/// (resize handles, drag labels). Never part of page content.
pub const CONTROL_ATTR: &str = "data-pc-control";

/// Attribute carrying a node's stable key in live (editor-facing) markup.
pub const KEY_ATTR: &str = "data-pc-key";

/// Attribute designating an element as a drop container.
pub const CONTAINER_ATTR: &str = "data-pc-container";

/// Marker class on the selected element.
pub const SELECTED_CLASS: &str = "pc-selected";

/// Marker class on the container under an active drag.
pub const DROP_TARGET_CLASS: &str = "pc-drop-target";

/// Classes the editor adds to live nodes. Other `pc-` classes belong to
/// the page.
pub const EDITOR_CLASSES: &[&str] = &[SELECTED_CLASS, DROP_TARGET_CLASS];

/// Set next to `contenteditable` while a node is edited in place. Holds the
/// page's own `contenteditable` value, empty when it had none.
pub const EDITING_ATTR: &str = "data-pc-editing";

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_TAGS: &[&str] = &["script", "style", "textarea", "title"];

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "dialog", "dd", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hgroup", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "ul",
    "body", "img", "video", "iframe",
];

const TEXT_BEARING_TAGS: &[&str] = &["p", "h1", "h2", "h3", "h4", "h5", "h6", "span", "a"];

const SECTION_TAGS: &[&str] = &["section", "div", "article", "aside", "header", "footer"];

pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

pub fn is_raw_text_tag(tag: &str) -> bool {
    RAW_TEXT_TAGS.contains(&tag)
}

pub fn is_block_tag(tag: &str) -> bool {
    BLOCK_TAGS.contains(&tag)
}

/// Tags that enter inline editing mode when clicked while selected.
pub fn is_text_bearing_tag(tag: &str) -> bool {
    TEXT_BEARING_TAGS.contains(&tag)
}

/// Tags flagged as section-level in the outline.
pub fn is_section_tag(tag: &str) -> bool {
    SECTION_TAGS.contains(&tag)
}

/// Index of a node inside a document arena.
///
/// Only meaningful for the document (and version) that produced it; hold a
/// [`NodeKey`] to refer to a node across versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Stable opaque identity assigned to every node when it is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeKey(String);

impl NodeKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for NodeKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Where a node goes relative to an anchor node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertPosition {
    Before,
    After,
    /// Appended as the anchor's last child.
    Inside,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// HTML element data. Attributes keep source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<Attribute>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|a| a.name == name)
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value,
            None => self.attributes.push(Attribute::new(name, value)),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|a| a.name == name)?;
        Some(self.attributes.remove(pos).value)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let mut classes: Vec<&str> = self.classes().collect();
        classes.push(class);
        let joined = classes.join(" ");
        self.set_attribute("class", joined);
    }

    pub fn remove_class(&mut self, class: &str) {
        if !self.has_class(class) {
            return;
        }
        let remaining: Vec<&str> = self.classes().filter(|c| *c != class).collect();
        if remaining.is_empty() {
            self.remove_attribute("class");
        } else {
            let joined = remaining.join(" ");
            self.set_attribute("class", joined);
        }
    }

    pub fn style(&self) -> InlineStyle {
        InlineStyle::parse(self.attribute("style").unwrap_or_default())
    }

    /// Write an inline style back, dropping the attribute when it is empty.
    pub fn set_style(&mut self, style: &InlineStyle) {
        if style.is_empty() {
            self.remove_attribute("style");
        } else {
            self.set_attribute("style", style.to_string());
        }
    }

    /// Make the element editable in place, remembering the page's own
    /// `contenteditable` value.
    pub fn begin_inline_edit(&mut self) {
        if !self.has_attribute(EDITING_ATTR) {
            let previous = self.attribute("contenteditable").unwrap_or_default().to_string();
            self.set_attribute(EDITING_ATTR, previous);
        }
        self.set_attribute("contenteditable", "true");
    }

    /// Undo [`begin_inline_edit`](Self::begin_inline_edit). Elements the
    /// editor never touched keep their attributes.
    pub fn end_inline_edit(&mut self) {
        match self.remove_attribute(EDITING_ATTR) {
            Some(previous) if !previous.is_empty() => self.set_attribute("contenteditable", previous),
            Some(_) => {
                self.remove_attribute("contenteditable");
            }
            None => {}
        }
    }

    /// Remove every marker the editor writes on a live element
    pub fn strip_editor_markers(&mut self) {
        self.end_inline_edit();
        self.remove_attribute(KEY_ATTR);
        for class in EDITOR_CLASSES {
            self.remove_class(class);
        }
    }

    pub fn is_control(&self) -> bool {
        self.has_attribute(CONTROL_ATTR)
    }

    pub fn is_container(&self) -> bool {
        self.has_attribute(CONTAINER_ATTR)
    }

    pub fn is_void(&self) -> bool {
        is_void_tag(&self.tag)
    }

    pub fn is_block(&self) -> bool {
        is_block_tag(&self.tag)
    }

    pub fn is_text_bearing(&self) -> bool {
        is_text_bearing_tag(&self.tag)
    }

    pub fn is_section_level(&self) -> bool {
        is_section_tag(&self.tag)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Element(Element),
    Text { content: String },
    Comment { content: String },
}

/// Arena node. Parent/children links are indices into the owning document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub key: NodeKey,
    pub kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(key: NodeKey, kind: NodeKind) -> Self {
        Self {
            key,
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn as_element(&self) -> Option<&Element> {
        match &self.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match &mut self.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text { content } => Some(content),
            _ => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element(_))
    }

    pub fn is_control(&self) -> bool {
        self.as_element().map(Element::is_control).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_helpers() {
        let mut el = Element::new("DIV");
        assert_eq!(el.tag, "div");

        el.add_class("hero");
        el.add_class("pc-selected");
        el.add_class("hero");
        assert_eq!(el.attribute("class"), Some("hero pc-selected"));

        el.remove_class("hero");
        assert_eq!(el.attribute("class"), Some("pc-selected"));

        el.remove_class("pc-selected");
        assert!(!el.has_attribute("class"));
    }

    #[test]
    fn test_set_style_drops_empty_attribute() {
        let mut el = Element::new("p");
        el.set_attribute("style", "color: red;");

        let mut style = el.style();
        style.remove("color");
        el.set_style(&style);

        assert!(!el.has_attribute("style"));
    }

    #[test]
    fn test_tag_classification() {
        assert!(is_void_tag("img"));
        assert!(is_text_bearing_tag("h3"));
        assert!(!is_text_bearing_tag("div"));
        assert!(is_section_tag("footer"));
        assert!(!is_section_tag("p"));
        assert!(is_block_tag("section"));
        assert!(!is_block_tag("span"));
    }
}
