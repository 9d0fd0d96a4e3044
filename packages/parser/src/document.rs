//! # Arena Document
//!
//! The page body as an arena tree. Nodes live in a flat `Vec` and refer to
//! each other by [`NodeId`]; every node also carries a stable [`NodeKey`]
//! assigned at creation, and attached nodes are reachable by key in O(1).
//!
//! Design:
//! - The root is always a `body` element and can be neither moved nor removed
//! - Detaching a subtree unregisters its keys; the nodes stay in the arena
//!   until [`Document::compact`]
//! - Primitives mutate in place; callers wanting immutable versions clone
//!   first (documents are plain data)

use crate::ast::{
    is_raw_text_tag, Element, InsertPosition, Node, NodeId, NodeKey, NodeKind, KEY_ATTR,
};
use crate::error::TreeError;
use crate::fragment::FragmentNode;
use crate::id_generator::IDGenerator;
use crate::selector::Selector;
use std::collections::HashMap;

pub type TreeResult<T> = Result<T, TreeError>;

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    index: HashMap<NodeKey, NodeId>,
    keys: IDGenerator,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::with_seed("untitled")
    }

    /// Empty document whose keys derive from `name` (usually the page id).
    pub fn with_seed(name: &str) -> Self {
        Self::from_generator(IDGenerator::new(name))
    }

    pub fn from_generator(keys: IDGenerator) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            index: HashMap::new(),
            keys,
        };
        doc.root = doc.alloc(NodeKind::Element(Element::new("body")), None);
        doc
    }

    pub fn seed(&self) -> &str {
        self.keys.seed()
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Look up an attached node by key.
    pub fn get(&self, key: &NodeKey) -> Option<NodeId> {
        self.index.get(key).copied()
    }

    pub fn key(&self, id: NodeId) -> Option<&NodeKey> {
        self.node(id).map(|n| &n.key)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.node(id).and_then(Node::as_element)
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(id.0).and_then(Node::as_element_mut)
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(Node::parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or(&[])
    }

    /// Element children, skipping text, comments and editor controls.
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| {
                self.node(c)
                    .map(|n| n.is_element() && !n.is_control())
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Descendants in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        if id == self.root {
            return true;
        }
        self.node(id).is_some() && self.ancestors(id).any(|a| a == self.root)
    }

    pub fn is_ancestor_of(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Text content of a subtree. Editor controls, comments and
    /// script/style bodies do not count.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text { content } => out.push_str(content),
            NodeKind::Comment { .. } => {}
            NodeKind::Element(el) if el.is_control() => {}
            NodeKind::Element(el) if is_raw_text_tag(&el.tag) && el.tag != "textarea" => {}
            NodeKind::Element(_) => {
                for &child in &node.children {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Nearest element (self first, then ancestors) matching `pred`.
    pub fn closest(&self, id: NodeId, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|&n| self.element(n).map(&pred).unwrap_or(false))
    }

    /// Nearest block-level element at or above `id`, never an editor control.
    pub fn nearest_block(&self, id: NodeId) -> Option<NodeId> {
        self.closest(id, |el| el.is_block() && !el.is_control())
    }

    /// True when the body holds no elements and only whitespace text.
    pub fn is_empty(&self) -> bool {
        self.children(self.root).iter().all(|&c| match self.node(c) {
            Some(node) => match &node.kind {
                NodeKind::Element(el) => el.is_control(),
                NodeKind::Text { content } => content.trim().is_empty(),
                NodeKind::Comment { .. } => true,
            },
            None => true,
        })
    }

    /// Number of attached nodes.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Number of arena slots, including detached garbage.
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }

    /// All attached element ids in document order, root first.
    pub fn elements(&self) -> Vec<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .filter(|&n| self.element(n).is_some())
            .collect()
    }

    /// Elements matching a simple selector list (`tag.class#id[attr=v], ...`).
    pub fn query_all(&self, selector: &str) -> Vec<NodeId> {
        let Some(selector) = Selector::parse(selector) else {
            return Vec::new();
        };
        self.elements()
            .into_iter()
            .filter(|&n| self.element(n).map(|el| selector.matches(el)).unwrap_or(false))
            .collect()
    }

    pub fn query(&self, selector: &str) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Allocate a node, reusing `key` when it is free.
    pub(crate) fn alloc(&mut self, kind: NodeKind, key: Option<&str>) -> NodeId {
        let key = match key {
            Some(k) if !k.is_empty() && !self.index.contains_key(k) => NodeKey::new(k),
            _ => {
                let index = &self.index;
                NodeKey::new(self.keys.new_unique_id(|candidate| index.contains_key(candidate)))
            }
        };
        let id = NodeId(self.nodes.len());
        self.index.insert(key.clone(), id);
        self.nodes.push(Node::new(key, kind));
        id
    }

    /// Build `fragment` and append it to `parent` without validation.
    pub(crate) fn append_fragment(&mut self, parent: NodeId, fragment: &FragmentNode) -> NodeId {
        let id = self.build(fragment);
        self.push_child(parent, id);
        id
    }

    pub(crate) fn push_child(&mut self, parent: NodeId, child: NodeId) {
        let len = self.nodes[parent.0].children.len();
        self.link(parent, child, len);
    }

    fn link(&mut self, parent: NodeId, child: NodeId, index: usize) {
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
    }

    fn unlink(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != id);
        }
    }

    fn unregister(&mut self, id: NodeId) {
        for n in std::iter::once(id).chain(self.descendants(id)) {
            let key = &self.nodes[n.0].key;
            if self.index.get(key) == Some(&n) {
                self.index.remove(key);
            }
        }
    }

    fn build(&mut self, fragment: &FragmentNode) -> NodeId {
        match fragment {
            FragmentNode::Element {
                tag,
                attributes,
                children,
            } => {
                let mut el = Element::new(tag.as_str());
                let mut key = None;
                for attr in attributes {
                    if attr.name == KEY_ATTR {
                        key = Some(attr.value.as_str());
                    } else {
                        el.set_attribute(&attr.name, attr.value.clone());
                    }
                }
                let is_void = el.is_void();
                let id = self.alloc(NodeKind::Element(el), key);
                if !is_void {
                    for child in children {
                        let child = self.build(child);
                        self.push_child(id, child);
                    }
                }
                id
            }
            FragmentNode::Text { content } => self.alloc(
                NodeKind::Text {
                    content: content.clone(),
                },
                None,
            ),
            FragmentNode::Comment { content } => self.alloc(
                NodeKind::Comment {
                    content: content.clone(),
                },
                None,
            ),
        }
    }

    fn ensure_attached(&self, id: NodeId) -> TreeResult<()> {
        if self.node(id).is_none() {
            return Err(TreeError::NodeNotFound(id));
        }
        if !self.is_attached(id) {
            return Err(TreeError::Detached(id));
        }
        Ok(())
    }

    fn container_for(&self, id: NodeId) -> TreeResult<&Element> {
        let el = self.element(id).ok_or(TreeError::NotAnElement)?;
        if el.is_void() {
            return Err(TreeError::VoidElement(el.tag.clone()));
        }
        Ok(el)
    }

    /// Parent and child index for a node placed at `position` relative to
    /// `anchor`.
    fn resolve_position(
        &self,
        anchor: NodeId,
        position: InsertPosition,
    ) -> TreeResult<(NodeId, usize)> {
        match position {
            InsertPosition::Inside => {
                self.container_for(anchor)?;
                Ok((anchor, self.children(anchor).len()))
            }
            InsertPosition::Before | InsertPosition::After => {
                let parent = self.parent(anchor).ok_or(TreeError::RootImmutable)?;
                let index = self
                    .index_in_parent(anchor)
                    .ok_or(TreeError::NodeNotFound(anchor))?;
                let index = if position == InsertPosition::After {
                    index + 1
                } else {
                    index
                };
                Ok((parent, index))
            }
        }
    }

    // ------------------------------------------------------------------
    // In-place primitives
    // ------------------------------------------------------------------

    /// Build `fragment` and insert it as child `index` of `parent`.
    pub fn insert_fragment(
        &mut self,
        parent: NodeId,
        index: usize,
        fragment: &FragmentNode,
    ) -> TreeResult<NodeId> {
        self.ensure_attached(parent)?;
        self.container_for(parent)?;
        let id = self.build(fragment);
        self.link(parent, id, index);
        Ok(id)
    }

    pub fn insert_fragment_at(
        &mut self,
        anchor: NodeId,
        position: InsertPosition,
        fragment: &FragmentNode,
    ) -> TreeResult<NodeId> {
        self.ensure_attached(anchor)?;
        let (parent, index) = self.resolve_position(anchor, position)?;
        let id = self.build(fragment);
        self.link(parent, id, index);
        Ok(id)
    }

    /// Remove a subtree from the tree and from the key index.
    pub fn detach(&mut self, id: NodeId) -> TreeResult<()> {
        if id == self.root {
            return Err(TreeError::RootImmutable);
        }
        self.ensure_attached(id)?;
        self.unlink(id);
        self.unregister(id);
        Ok(())
    }

    /// Move an attached node (keeping its key) relative to `anchor`.
    /// Moving a node relative to itself is a no-op.
    pub fn move_node(
        &mut self,
        node: NodeId,
        anchor: NodeId,
        position: InsertPosition,
    ) -> TreeResult<()> {
        if node == self.root {
            return Err(TreeError::RootImmutable);
        }
        self.ensure_attached(node)?;
        self.ensure_attached(anchor)?;
        if node == anchor {
            return Ok(());
        }
        if self.is_ancestor_of(node, anchor) {
            return Err(TreeError::CycleDetected);
        }
        self.resolve_position(anchor, position)?;

        self.unlink(node);
        let (parent, index) = self.resolve_position(anchor, position)?;
        self.link(parent, node, index);
        Ok(())
    }

    fn element_checked(&mut self, id: NodeId) -> TreeResult<&mut Element> {
        self.ensure_attached(id)?;
        self.nodes[id.0]
            .as_element_mut()
            .ok_or(TreeError::NotAnElement)
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> TreeResult<()> {
        self.element_checked(id)?.set_attribute(name, value);
        Ok(())
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> TreeResult<Option<String>> {
        Ok(self.element_checked(id)?.remove_attribute(name))
    }

    /// Set one inline style property; `None` or a blank value removes it.
    pub fn set_style_property(
        &mut self,
        id: NodeId,
        property: &str,
        value: Option<&str>,
    ) -> TreeResult<()> {
        let el = self.element_checked(id)?;
        let mut style = el.style();
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => style.set(property, v),
            _ => {
                style.remove(property);
            }
        }
        el.set_style(&style);
        Ok(())
    }

    /// Replace every child of an element with freshly built fragments.
    pub fn replace_children(&mut self, id: NodeId, fragments: &[FragmentNode]) -> TreeResult<()> {
        self.ensure_attached(id)?;
        self.container_for(id)?;
        for child in self.children(id).to_vec() {
            self.unlink(child);
            self.unregister(child);
        }
        for fragment in fragments {
            let child = self.build(fragment);
            self.push_child(id, child);
        }
        Ok(())
    }

    /// Set the text of a text node, or replace an element's children with
    /// a single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> TreeResult<()> {
        self.ensure_attached(id)?;
        if let NodeKind::Text { content } = &mut self.nodes[id.0].kind {
            *content = text.to_string();
            return Ok(());
        }
        if !self.nodes[id.0].is_element() {
            return Err(TreeError::NotAnElement);
        }
        self.replace_children(
            id,
            &[FragmentNode::Text {
                content: text.to_string(),
            }],
        )
    }

    /// Detach every editor control element.
    pub fn remove_controls(&mut self) {
        let controls: Vec<NodeId> = self
            .descendants(self.root)
            .into_iter()
            .filter(|&n| self.nodes[n.0].is_control())
            .collect();
        for id in controls {
            // Nested controls go with their outer control.
            if self.is_attached(id) {
                self.unlink(id);
                self.unregister(id);
            }
        }
    }

    // ------------------------------------------------------------------
    // Versions
    // ------------------------------------------------------------------

    /// Copy of this document without anything the editor injects: control
    /// elements, marker classes, in-place editing state and key attributes.
    /// Keys of the remaining nodes are preserved.
    pub fn strip_editor_artifacts(&self) -> Document {
        let mut doc = self.clone();
        doc.remove_controls();
        for id in doc.elements() {
            if let Some(el) = doc.nodes[id.0].as_element_mut() {
                el.strip_editor_markers();
            }
        }
        doc.compact()
    }

    /// Copy holding only attached nodes. Keys and the key generator state
    /// carry over.
    pub fn compact(&self) -> Document {
        let mut out = Document {
            nodes: Vec::with_capacity(self.index.len()),
            root: NodeId(0),
            index: HashMap::with_capacity(self.index.len()),
            keys: self.keys.clone(),
        };
        out.root = out.copy_subtree(self, self.root);
        out
    }

    fn copy_subtree(&mut self, src: &Document, id: NodeId) -> NodeId {
        let node = &src.nodes[id.0];
        let new_id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(node.key.clone(), node.kind.clone()));
        self.index.insert(node.key.clone(), new_id);
        for &child in &node.children {
            let copied = self.copy_subtree(src, child);
            self.nodes[copied.0].parent = Some(new_id);
            self.nodes[new_id.0].children.push(copied);
        }
        new_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::CONTROL_ATTR;
    use crate::fragment::{element, text};

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::with_seed("sample");
        let root = doc.root();
        let a = doc
            .insert_fragment(root, 0, &element("section").with_text("A"))
            .unwrap();
        let b = doc
            .insert_fragment(root, 1, &element("section").with_text("B"))
            .unwrap();
        let c = doc
            .insert_fragment(root, 2, &element("section").with_text("C"))
            .unwrap();
        (doc, a, b, c)
    }

    fn texts(doc: &Document) -> Vec<String> {
        doc.element_children(doc.root())
            .into_iter()
            .map(|n| doc.text_content(n))
            .collect()
    }

    #[test]
    fn test_keys_are_indexed() {
        let (doc, a, b, _) = sample();
        let key_a = doc.key(a).unwrap().clone();
        assert_eq!(doc.get(&key_a), Some(a));
        assert_ne!(doc.key(a), doc.key(b));
        assert!(key_a.as_str().starts_with(doc.seed()));
    }

    #[test]
    fn test_move_after_last() {
        let (mut doc, a, _, c) = sample();
        let key_a = doc.key(a).unwrap().clone();

        doc.move_node(a, c, InsertPosition::After).unwrap();

        assert_eq!(texts(&doc), vec!["B", "C", "A"]);
        assert_eq!(doc.get(&key_a), Some(a));
    }

    #[test]
    fn test_move_into_descendant_is_rejected() {
        let (mut doc, a, _, _) = sample();
        let inner = doc
            .insert_fragment_at(a, InsertPosition::Inside, &element("div"))
            .unwrap();

        assert_eq!(
            doc.move_node(a, inner, InsertPosition::Inside),
            Err(TreeError::CycleDetected)
        );
        assert_eq!(texts(&doc), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_detach_unregisters_subtree() {
        let (mut doc, a, _, _) = sample();
        let text_id = doc.children(a)[0];
        let key_a = doc.key(a).unwrap().clone();
        let key_text = doc.key(text_id).unwrap().clone();

        doc.detach(a).unwrap();

        assert_eq!(doc.get(&key_a), None);
        assert_eq!(doc.get(&key_text), None);
        assert!(!doc.is_attached(a));
        assert_eq!(doc.detach(a), Err(TreeError::Detached(a)));
        assert_eq!(doc.len(), doc.compact().len());
        assert!(doc.compact().arena_len() < doc.arena_len());
    }

    #[test]
    fn test_root_is_immutable() {
        let (mut doc, a, _, _) = sample();
        let root = doc.root();
        assert_eq!(doc.detach(root), Err(TreeError::RootImmutable));
        assert_eq!(
            doc.move_node(root, a, InsertPosition::Inside),
            Err(TreeError::RootImmutable)
        );
        assert_eq!(
            doc.insert_fragment_at(root, InsertPosition::Before, &element("p")),
            Err(TreeError::RootImmutable)
        );
    }

    #[test]
    fn test_void_elements_reject_children() {
        let mut doc = Document::new();
        let img = doc
            .insert_fragment(doc.root(), 0, &element("img").with_attr("src", "a.png"))
            .unwrap();
        assert_eq!(
            doc.insert_fragment_at(img, InsertPosition::Inside, &text("x")),
            Err(TreeError::VoidElement("img".to_string()))
        );
    }

    #[test]
    fn test_text_content_skips_controls() {
        let (mut doc, a, _, _) = sample();
        doc.insert_fragment_at(
            a,
            InsertPosition::Inside,
            &element("div")
                .with_attr(CONTROL_ATTR, "handles")
                .with_text("Move"),
        )
        .unwrap();

        assert_eq!(doc.text_content(a), "A");
        assert_eq!(doc.element_children(a).len(), 0);
    }

    #[test]
    fn test_strip_editor_artifacts() {
        let (mut doc, a, _, _) = sample();
        doc.element_mut(a).unwrap().add_class("hero");
        doc.element_mut(a).unwrap().add_class("pc-selected");
        doc.element_mut(a).unwrap().begin_inline_edit();
        doc.insert_fragment_at(a, InsertPosition::Inside, &element("div").with_attr(CONTROL_ATTR, ""))
            .unwrap();

        let clean = doc.strip_editor_artifacts();
        let clean_a = clean.get(doc.key(a).unwrap()).unwrap();
        let el = clean.element(clean_a).unwrap();

        assert_eq!(el.attribute("class"), Some("hero"));
        assert!(!el.has_attribute("contenteditable"));
        assert!(!el.has_attribute(crate::ast::EDITING_ATTR));
        assert_eq!(clean.children(clean_a).len(), 1);
    }

    #[test]
    fn test_strip_keeps_page_markup() {
        let (mut doc, a, b, _) = sample();
        let el = doc.element_mut(a).unwrap();
        el.set_attribute("class", "pc-grid pc-selected");
        el.set_attribute("draggable", "true");
        el.set_attribute("contenteditable", "false");
        el.begin_inline_edit();
        doc.set_attribute(b, "contenteditable", "plaintext-only").unwrap();

        let clean = doc.strip_editor_artifacts();
        let el = clean.element(clean.get(doc.key(a).unwrap()).unwrap()).unwrap();
        assert_eq!(el.attribute("class"), Some("pc-grid"));
        assert_eq!(el.attribute("draggable"), Some("true"));
        assert_eq!(el.attribute("contenteditable"), Some("false"));
        let el = clean.element(clean.get(doc.key(b).unwrap()).unwrap()).unwrap();
        assert_eq!(el.attribute("contenteditable"), Some("plaintext-only"));
    }

    #[test]
    fn test_style_property_round_trip() {
        let (mut doc, a, _, _) = sample();
        doc.set_style_property(a, "color", Some("red")).unwrap();
        doc.set_style_property(a, "padding", Some("8px")).unwrap();
        doc.set_style_property(a, "color", None).unwrap();
        assert_eq!(doc.element(a).unwrap().attribute("style"), Some("padding: 8px;"));

        doc.set_style_property(a, "padding", Some("  ")).unwrap();
        assert!(!doc.element(a).unwrap().has_attribute("style"));
    }

    #[test]
    fn test_nearest_block_and_query() {
        let mut doc = Document::new();
        let p = doc
            .insert_fragment(
                doc.root(),
                0,
                &element("p")
                    .with_attr("class", "lead")
                    .with_child(element("span").with_text("hi")),
            )
            .unwrap();
        let span = doc.children(p)[0];
        let span_text = doc.children(span)[0];

        assert_eq!(doc.nearest_block(span_text), Some(p));
        assert_eq!(doc.query("p.lead"), Some(p));
        assert_eq!(doc.query("span"), Some(span));
        assert_eq!(doc.query("h1"), None);
        assert!(!doc.is_empty());
        assert!(Document::new().is_empty());
    }

    #[test]
    fn test_fragment_key_attribute_is_reused() {
        let mut doc = Document::new();
        let id = doc
            .insert_fragment(doc.root(), 0, &element("p").with_attr(KEY_ATTR, "fixed-1"))
            .unwrap();
        assert_eq!(doc.key(id).unwrap().as_str(), "fixed-1");
        assert!(!doc.element(id).unwrap().has_attribute(KEY_ATTR));

        // Taken keys get a fresh one.
        let other = doc
            .insert_fragment(doc.root(), 1, &element("p").with_attr(KEY_ATTR, "fixed-1"))
            .unwrap();
        assert_ne!(doc.key(other).unwrap().as_str(), "fixed-1");
    }
}
