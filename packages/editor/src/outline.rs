//! # Outline Projection
//!
//! Derives the navigator tree shown beside the canvas: the body's direct
//! element children as sections, and one level of their element children.
//! Never deeper, and never editor controls.
//!
//! Outline ids are node keys, so expand/collapse state survives
//! re-projection for as long as the nodes do.

use pagecraft_parser::{Document, NodeId, NodeKey};
use serde::Serialize;
use std::collections::HashSet;

/// Longest preview shown before truncation
pub const PREVIEW_MAX_CHARS: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineNode {
    pub id: NodeKey,
    pub tag_name: String,
    pub text_preview: String,
    pub is_section_level: bool,
    pub children: Vec<OutlineNode>,
}

/// Project the two-level outline of a document
pub fn project(doc: &Document) -> Vec<OutlineNode> {
    outline_children(doc, doc.root())
        .into_iter()
        .map(|id| {
            let mut node = outline_node(doc, id);
            node.children = outline_children(doc, id)
                .into_iter()
                .map(|child| outline_node(doc, child))
                .collect();
            node
        })
        .collect()
}

fn outline_children(doc: &Document, id: NodeId) -> Vec<NodeId> {
    doc.element_children(id)
        .into_iter()
        .filter(|&child| {
            doc.element(child)
                .map(|el| !el.is_control())
                .unwrap_or(false)
        })
        .collect()
}

fn outline_node(doc: &Document, id: NodeId) -> OutlineNode {
    let (tag_name, is_section_level) = doc
        .element(id)
        .map(|el| (el.tag.clone(), el.is_section_level()))
        .unwrap_or_default();

    OutlineNode {
        id: doc.key(id).cloned().unwrap_or_else(|| NodeKey::new("")),
        text_preview: text_preview(&doc.text_content(id), &tag_name),
        tag_name,
        is_section_level,
        children: Vec::new(),
    }
}

/// Trimmed, whitespace-collapsed preview, truncated with "..." past
/// [`PREVIEW_MAX_CHARS`]. Falls back to the tag name when there is no text.
pub fn text_preview(text: &str, tag_name: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return tag_name.to_ascii_lowercase();
    }

    if collapsed.chars().count() > PREVIEW_MAX_CHARS {
        let mut preview: String = collapsed.chars().take(PREVIEW_MAX_CHARS).collect();
        preview.push_str("...");
        preview
    } else {
        collapsed
    }
}

/// Depth-first iterator over an outline (sections, then their children)
pub fn flatten(outline: &[OutlineNode]) -> impl Iterator<Item = &OutlineNode> {
    outline
        .iter()
        .flat_map(|node| std::iter::once(node).chain(node.children.iter()))
}

/// Set of expanded outline ids
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpandState {
    expanded: HashSet<NodeKey>,
}

impl ExpandState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, id: &NodeKey) -> bool {
        self.expanded.contains(id)
    }

    pub fn expand(&mut self, id: NodeKey) {
        self.expanded.insert(id);
    }

    pub fn collapse(&mut self, id: &NodeKey) {
        self.expanded.remove(id);
    }

    /// Flip one entry, returning the new state
    pub fn toggle(&mut self, id: &NodeKey) -> bool {
        if self.expanded.remove(id) {
            false
        } else {
            self.expanded.insert(id.clone());
            true
        }
    }

    /// Expand every entry that has children
    pub fn expand_all(&mut self, outline: &[OutlineNode]) {
        for node in flatten(outline) {
            if !node.children.is_empty() {
                self.expanded.insert(node.id.clone());
            }
        }
    }

    pub fn collapse_all(&mut self) {
        self.expanded.clear();
    }

    /// Forget ids that no longer appear in the outline
    pub fn retain_present(&mut self, outline: &[OutlineNode]) {
        let present: HashSet<&NodeKey> = flatten(outline).map(|node| &node.id).collect();
        self.expanded.retain(|id| present.contains(id));
    }

    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_parser::parse;

    #[test]
    fn test_two_levels_only() {
        let doc = parse(
            "<section><div><p>deep</p></div><h2>Title</h2></section><p>Loose</p>",
        )
        .unwrap();
        let outline = project(&doc);

        assert_eq!(outline.len(), 2);
        assert_eq!(outline[0].tag_name, "section");
        assert!(outline[0].is_section_level);
        assert_eq!(outline[0].children.len(), 2);
        assert!(outline[0].children.iter().all(|c| c.children.is_empty()));
        assert_eq!(outline[1].tag_name, "p");
        assert!(!outline[1].is_section_level);
    }

    #[test]
    fn test_controls_are_skipped() {
        let doc = parse(
            r#"<div><p>a</p><div data-pc-control="handles"><span>x</span></div></div>"#,
        )
        .unwrap();
        let outline = project(&doc);

        assert_eq!(outline[0].children.len(), 1);
        assert_eq!(outline[0].text_preview, "a");
    }

    #[test]
    fn test_preview_truncation() {
        let long = "x".repeat(45);
        let preview = text_preview(&long, "p");
        assert_eq!(preview.chars().count(), 33);
        assert!(preview.ends_with("..."));

        let short = "y".repeat(20);
        assert_eq!(text_preview(&short, "p"), short);
        assert_eq!(text_preview(&"z".repeat(30), "p"), "z".repeat(30));
    }

    #[test]
    fn test_preview_collapses_whitespace_and_falls_back() {
        assert_eq!(text_preview("  Hello \n\t  world  ", "p"), "Hello world");
        assert_eq!(text_preview("   ", "IMG"), "img");
    }

    #[test]
    fn test_projection_is_stable() {
        let doc = parse("<header><h1>Hi</h1></header><footer>Bye</footer>").unwrap();
        assert_eq!(project(&doc), project(&doc));
    }

    #[test]
    fn test_expand_state_survives_reprojection() {
        let doc = parse("<section><p>a</p></section><section><p>b</p></section>").unwrap();
        let outline = project(&doc);
        let first = outline[0].id.clone();

        let mut state = ExpandState::new();
        state.expand_all(&outline);
        assert_eq!(state.len(), 2);
        assert!(!state.toggle(&outline[1].id));

        let again = project(&doc);
        state.retain_present(&again);
        assert!(state.is_expanded(&first));
        assert_eq!(state.len(), 1);

        state.collapse_all();
        assert!(state.is_empty());
    }
}
