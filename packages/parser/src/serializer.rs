use crate::ast::{Element, NodeId, NodeKind, EDITING_ATTR, EDITOR_CLASSES, KEY_ATTR};
use crate::document::Document;
use crate::entities::{escape_attribute, escape_text};
use std::fmt::Write;

/// What the serializer emits besides page content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Emit each element's node key as a `data-pc-key` attribute
    pub include_keys: bool,
    /// Skip control elements, `pc-` classes and editor-toggled attributes
    pub strip_editor_artifacts: bool,
    /// One element per line, indented
    pub pretty: bool,
}

impl SerializeOptions {
    /// The persisted form of a page
    pub fn canonical() -> Self {
        Self {
            include_keys: false,
            strip_editor_artifacts: true,
            pretty: false,
        }
    }

    /// The form pushed into a render surface: everything, keys included
    pub fn live() -> Self {
        Self {
            include_keys: true,
            strip_editor_artifacts: false,
            pretty: false,
        }
    }

    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self::canonical()
    }
}

/// Serializer converts a document back to markup
///
/// Text and attribute values are escaped; `script`/`style` bodies are written
/// verbatim. Void elements get no close tag. The body element itself is never
/// written: serializing a document yields its inner markup.
pub struct Serializer {
    options: SerializeOptions,
    indent_level: usize,
    indent_string: String,
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializer {
    pub fn new() -> Self {
        Self::with_options(SerializeOptions::canonical())
    }

    pub fn with_options(options: SerializeOptions) -> Self {
        Self {
            options,
            indent_level: 0,
            indent_string: "  ".to_string(), // 2 spaces
        }
    }

    pub fn with_indent(mut self, indent: &str) -> Self {
        self.indent_string = indent.to_string();
        self
    }

    /// Serialize the body's content
    pub fn serialize(&mut self, doc: &Document) -> String {
        self.inner_html(doc, doc.root())
    }

    /// Markup of a node including its own tags
    pub fn serialize_node(&mut self, doc: &Document, id: NodeId) -> String {
        let mut output = String::new();
        self.indent_level = 0;
        self.write_node(doc, id, false, &mut output);
        output.trim_start_matches('\n').to_string()
    }

    /// Markup of a node's children
    pub fn inner_html(&mut self, doc: &Document, id: NodeId) -> String {
        let mut output = String::new();
        self.indent_level = 0;
        let raw = is_verbatim(doc.element(id));
        for &child in doc.children(id) {
            self.write_node(doc, child, raw, &mut output);
        }
        output.trim_start_matches('\n').to_string()
    }

    fn write_node(&mut self, doc: &Document, id: NodeId, raw: bool, output: &mut String) {
        let Some(node) = doc.node(id) else {
            return;
        };

        match &node.kind {
            NodeKind::Text { content } => {
                if self.options.pretty {
                    let trimmed = content.trim();
                    if trimmed.is_empty() {
                        return;
                    }
                    self.newline(output);
                    output.push_str(&escape_text(trimmed));
                } else if raw {
                    output.push_str(content);
                } else {
                    output.push_str(&escape_text(content));
                }
            }
            NodeKind::Comment { content } => {
                self.newline(output);
                let _ = write!(output, "<!--{}-->", content);
            }
            NodeKind::Element(el) => {
                if self.options.strip_editor_artifacts && el.is_control() {
                    return;
                }

                self.newline(output);
                output.push('<');
                output.push_str(&el.tag);
                self.write_attributes(el, output);
                if self.options.include_keys {
                    let _ = write!(output, " {}=\"{}\"", KEY_ATTR, escape_attribute(node.key.as_str()));
                }
                output.push('>');

                if el.is_void() {
                    return;
                }

                let verbatim = is_verbatim(Some(el));
                let inline = self.options.pretty && verbatim;
                self.indent_level += 1;
                for &child in node.children() {
                    if inline {
                        // Keep raw text bodies byte-for-byte
                        if let Some(text) = doc.node(child).and_then(|n| n.as_text()) {
                            output.push_str(text);
                        }
                    } else {
                        self.write_node(doc, child, verbatim, output);
                    }
                }
                self.indent_level -= 1;

                if !inline && node.children().iter().any(|&c| self.starts_line(doc, c)) {
                    self.newline(output);
                }
                let _ = write!(output, "</{}>", el.tag);
            }
        }
    }

    fn write_attributes(&self, el: &Element, output: &mut String) {
        let editing = el.attribute(EDITING_ATTR);
        for attr in &el.attributes {
            let value = if self.options.strip_editor_artifacts {
                match attr.name.as_str() {
                    KEY_ATTR | EDITING_ATTR => continue,
                    "contenteditable" => match editing {
                        Some("") => continue,
                        Some(previous) => previous.to_string(),
                        None => attr.value.clone(),
                    },
                    "class" => {
                        let classes: Vec<&str> = attr
                            .value
                            .split_ascii_whitespace()
                            .filter(|c| !EDITOR_CLASSES.contains(c))
                            .collect();
                        if classes.is_empty() {
                            continue;
                        }
                        classes.join(" ")
                    }
                    _ => attr.value.clone(),
                }
            } else {
                attr.value.clone()
            };
            let _ = write!(output, " {}=\"{}\"", attr.name, escape_attribute(&value));
        }
    }

    /// Whether a child begins on its own line in pretty mode
    fn starts_line(&self, doc: &Document, id: NodeId) -> bool {
        if !self.options.pretty {
            return false;
        }
        match doc.node(id).map(|n| &n.kind) {
            Some(NodeKind::Element(el)) => !(self.options.strip_editor_artifacts && el.is_control()),
            Some(NodeKind::Text { content }) => !content.trim().is_empty(),
            Some(NodeKind::Comment { .. }) => true,
            None => false,
        }
    }

    fn newline(&self, output: &mut String) {
        if self.options.pretty {
            output.push('\n');
            output.push_str(&self.indent_string.repeat(self.indent_level));
        }
    }
}

fn is_verbatim(el: Option<&Element>) -> bool {
    el.map(|el| matches!(el.tag.as_str(), "script" | "style"))
        .unwrap_or(false)
}

/// Canonical markup of a document's body content
pub fn serialize(doc: &Document) -> String {
    Serializer::new().serialize(doc)
}

/// Markup for a render surface, with node keys
pub fn serialize_live(doc: &Document) -> String {
    Serializer::with_options(SerializeOptions::live()).serialize(doc)
}
