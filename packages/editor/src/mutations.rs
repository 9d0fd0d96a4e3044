//! # Document Mutations
//!
//! Every change the engine makes to page content goes through one of these
//! operations. Nodes are addressed by stable [`NodeKey`], never by position.
//!
//! ## Design Principles
//!
//! 1. **Pure**: `apply` takes a document version and returns the next one;
//!    the input is never touched
//! 2. **Validated**: structural constraints are checked before anything
//!    changes
//! 3. **Atomic batches**: [`Mutation::apply_all`] either applies every
//!    mutation or none
//!
//! ## Mutation Semantics
//!
//! ### MoveNode
//! - Relocates a node (keeping its key) before, after or inside an anchor
//! - Fails if the anchor is the node itself or one of its descendants
//!
//! ### ReplaceContent
//! - Replaces an element's children with parsed markup (rich-text edits);
//!   keys carried in the markup are reused when free
//!
//! ### SetStyle
//! - Sets one inline style property; `None` removes it

use pagecraft_parser::{
    parse_fragment, Document, FragmentNode, InsertPosition, NodeId, NodeKey, ParseError,
    TreeError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mutation {
    /// Insert a new subtree relative to an anchor
    InsertFragment {
        anchor: NodeKey,
        position: InsertPosition,
        fragment: FragmentNode,
    },

    /// Move an existing node relative to an anchor
    MoveNode {
        node: NodeKey,
        anchor: NodeKey,
        position: InsertPosition,
    },

    /// Remove a node and its descendants
    RemoveNode { node: NodeKey },

    SetAttribute {
        node: NodeKey,
        name: String,
        value: String,
    },

    RemoveAttribute { node: NodeKey, name: String },

    SetStyle {
        node: NodeKey,
        property: String,
        value: Option<String>,
    },

    /// Replace an element's children with parsed markup
    ReplaceContent { node: NodeKey, html: String },

    /// Replace an element's children with plain text
    SetText { node: NodeKey, text: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeKey),

    #[error("Anchor not found: {0}")]
    AnchorNotFound(NodeKey),

    #[error("Would create cycle")]
    CycleDetected,

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    #[error("Node is not an element")]
    NotAnElement,

    #[error("The document root cannot be moved or removed")]
    RootImmutable,

    #[error("Invalid markup: {0}")]
    InvalidMarkup(#[from] ParseError),
}

impl From<TreeError> for MutationError {
    fn from(err: TreeError) -> Self {
        match err {
            TreeError::RootImmutable => MutationError::RootImmutable,
            TreeError::CycleDetected => MutationError::CycleDetected,
            TreeError::NotAnElement => MutationError::NotAnElement,
            other => MutationError::InvalidStructure(other.to_string()),
        }
    }
}

pub type MutationResult<T> = Result<T, MutationError>;

impl Mutation {
    /// Key of the node this mutation changes
    pub fn target(&self) -> &NodeKey {
        match self {
            Mutation::InsertFragment { anchor, .. } => anchor,
            Mutation::MoveNode { node, .. }
            | Mutation::RemoveNode { node }
            | Mutation::SetAttribute { node, .. }
            | Mutation::RemoveAttribute { node, .. }
            | Mutation::SetStyle { node, .. }
            | Mutation::ReplaceContent { node, .. }
            | Mutation::SetText { node, .. } => node,
        }
    }

    /// Debug name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::InsertFragment { .. } => "insert_fragment",
            Mutation::MoveNode { .. } => "move_node",
            Mutation::RemoveNode { .. } => "remove_node",
            Mutation::SetAttribute { .. } => "set_attribute",
            Mutation::RemoveAttribute { .. } => "remove_attribute",
            Mutation::SetStyle { .. } => "set_style",
            Mutation::ReplaceContent { .. } => "replace_content",
            Mutation::SetText { .. } => "set_text",
        }
    }

    /// Check that this mutation can be applied to the document
    pub fn validate(&self, doc: &Document) -> MutationResult<()> {
        match self {
            Mutation::InsertFragment { anchor, position, .. } => {
                let anchor_id = resolve_anchor(doc, anchor)?;
                validate_position(doc, anchor_id, *position)
            }

            Mutation::MoveNode {
                node,
                anchor,
                position,
            } => {
                let node_id = resolve(doc, node)?;
                let anchor_id = resolve_anchor(doc, anchor)?;
                if node_id == doc.root() {
                    return Err(MutationError::RootImmutable);
                }
                if node_id == anchor_id || doc.is_ancestor_of(node_id, anchor_id) {
                    return Err(MutationError::CycleDetected);
                }
                validate_position(doc, anchor_id, *position)
            }

            Mutation::RemoveNode { node } => {
                if resolve(doc, node)? == doc.root() {
                    return Err(MutationError::RootImmutable);
                }
                Ok(())
            }

            Mutation::SetAttribute { node, name, .. } | Mutation::RemoveAttribute { node, name } => {
                resolve_element(doc, node)?;
                if name.is_empty() || name.contains(|c: char| c.is_whitespace() || "\"'<>/=".contains(c)) {
                    return Err(MutationError::InvalidStructure(format!(
                        "Invalid attribute name '{}'",
                        name
                    )));
                }
                Ok(())
            }

            Mutation::SetStyle { node, property, .. } => {
                resolve_element(doc, node)?;
                if property.trim().is_empty() {
                    return Err(MutationError::InvalidStructure(
                        "Style property name is empty".to_string(),
                    ));
                }
                Ok(())
            }

            Mutation::ReplaceContent { node, .. } | Mutation::SetText { node, .. } => {
                let id = resolve_element(doc, node)?;
                let is_void = doc.element(id).map(|el| el.is_void()).unwrap_or(false);
                if is_void {
                    return Err(MutationError::InvalidStructure(
                        "Void elements have no content".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Apply to a document version, producing the next one
    pub fn apply(&self, doc: &Document) -> MutationResult<Document> {
        let mut next = doc.clone();
        self.apply_in_place(&mut next)?;
        Ok(next)
    }

    /// Apply a batch atomically: on error the input version is all that
    /// remains
    pub fn apply_all(doc: &Document, mutations: &[Mutation]) -> MutationResult<Document> {
        let mut next = doc.clone();
        for mutation in mutations {
            mutation.apply_in_place(&mut next)?;
        }
        Ok(next)
    }

    fn apply_in_place(&self, doc: &mut Document) -> MutationResult<()> {
        // Validate first
        self.validate(doc)?;

        match self {
            Mutation::InsertFragment {
                anchor,
                position,
                fragment,
            } => {
                let anchor_id = resolve_anchor(doc, anchor)?;
                doc.insert_fragment_at(anchor_id, *position, fragment)?;
            }

            Mutation::MoveNode {
                node,
                anchor,
                position,
            } => {
                let node_id = resolve(doc, node)?;
                let anchor_id = resolve_anchor(doc, anchor)?;
                doc.move_node(node_id, anchor_id, *position)?;
            }

            Mutation::RemoveNode { node } => {
                let id = resolve(doc, node)?;
                doc.detach(id)?;
            }

            Mutation::SetAttribute { node, name, value } => {
                let id = resolve(doc, node)?;
                doc.set_attribute(id, name, value)?;
            }

            Mutation::RemoveAttribute { node, name } => {
                let id = resolve(doc, node)?;
                doc.remove_attribute(id, name)?;
            }

            Mutation::SetStyle {
                node,
                property,
                value,
            } => {
                let id = resolve(doc, node)?;
                doc.set_style_property(id, property, value.as_deref())?;
            }

            Mutation::ReplaceContent { node, html } => {
                let id = resolve(doc, node)?;
                let fragments = parse_fragment(html)?;
                doc.replace_children(id, &fragments)?;
            }

            Mutation::SetText { node, text } => {
                let id = resolve(doc, node)?;
                doc.set_text(id, text)?;
            }
        }

        Ok(())
    }
}

fn resolve(doc: &Document, key: &NodeKey) -> MutationResult<NodeId> {
    doc.get(key)
        .ok_or_else(|| MutationError::NodeNotFound(key.clone()))
}

fn resolve_anchor(doc: &Document, key: &NodeKey) -> MutationResult<NodeId> {
    doc.get(key)
        .ok_or_else(|| MutationError::AnchorNotFound(key.clone()))
}

fn resolve_element(doc: &Document, key: &NodeKey) -> MutationResult<NodeId> {
    let id = resolve(doc, key)?;
    doc.element(id).ok_or(MutationError::NotAnElement)?;
    Ok(id)
}

fn validate_position(doc: &Document, anchor: NodeId, position: InsertPosition) -> MutationResult<()> {
    match position {
        InsertPosition::Inside => {
            let el = doc.element(anchor).ok_or(MutationError::NotAnElement)?;
            if el.is_void() {
                return Err(MutationError::InvalidStructure(format!(
                    "<{}> cannot have children",
                    el.tag
                )));
            }
            Ok(())
        }
        InsertPosition::Before | InsertPosition::After => {
            if anchor == doc.root() {
                return Err(MutationError::RootImmutable);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_parser::fragment::element;
    use pagecraft_parser::{parse, serialize};

    fn keys_of(doc: &Document) -> Vec<NodeKey> {
        doc.element_children(doc.root())
            .into_iter()
            .map(|n| doc.key(n).unwrap().clone())
            .collect()
    }

    #[test]
    fn test_apply_leaves_input_untouched() {
        let doc = parse("<p>a</p>").unwrap();
        let p = keys_of(&doc)[0].clone();

        let next = Mutation::SetText {
            node: p,
            text: "b".to_string(),
        }
        .apply(&doc)
        .unwrap();

        assert_eq!(serialize(&doc), "<p>a</p>");
        assert_eq!(serialize(&next), "<p>b</p>");
    }

    #[test]
    fn test_insert_before_after_inside() {
        let doc = parse(r#"<div data-pc-container=""><p>x</p></div>"#).unwrap();
        let div = keys_of(&doc)[0].clone();

        let batch = vec![
            Mutation::InsertFragment {
                anchor: div.clone(),
                position: InsertPosition::Before,
                fragment: element("h1").with_text("before"),
            },
            Mutation::InsertFragment {
                anchor: div.clone(),
                position: InsertPosition::After,
                fragment: element("footer").with_text("after"),
            },
            Mutation::InsertFragment {
                anchor: div,
                position: InsertPosition::Inside,
                fragment: element("span").with_text("inside"),
            },
        ];
        let next = Mutation::apply_all(&doc, &batch).unwrap();

        assert_eq!(
            serialize(&next),
            r#"<h1>before</h1><div data-pc-container=""><p>x</p><span>inside</span></div><footer>after</footer>"#
        );
    }

    #[test]
    fn test_move_keeps_key() {
        let doc = parse("<p>A</p><p>B</p><p>C</p>").unwrap();
        let keys = keys_of(&doc);

        let next = Mutation::MoveNode {
            node: keys[0].clone(),
            anchor: keys[2].clone(),
            position: InsertPosition::After,
        }
        .apply(&doc)
        .unwrap();

        assert_eq!(serialize(&next), "<p>B</p><p>C</p><p>A</p>");
        assert_eq!(keys_of(&next), vec![keys[1].clone(), keys[2].clone(), keys[0].clone()]);
    }

    #[test]
    fn test_move_into_own_subtree_fails() {
        let doc = parse("<section><div>inner</div></section>").unwrap();
        let section = keys_of(&doc)[0].clone();
        let section_id = doc.get(&section).unwrap();
        let inner = doc.key(doc.element_children(section_id)[0]).unwrap().clone();

        let result = Mutation::MoveNode {
            node: section.clone(),
            anchor: inner,
            position: InsertPosition::Inside,
        }
        .apply(&doc);
        assert_eq!(result.err(), Some(MutationError::CycleDetected));

        let onto_self = Mutation::MoveNode {
            node: section.clone(),
            anchor: section,
            position: InsertPosition::After,
        }
        .apply(&doc);
        assert_eq!(onto_self.err(), Some(MutationError::CycleDetected));
    }

    #[test]
    fn test_batch_is_atomic() {
        let doc = parse("<p>a</p>").unwrap();
        let p = keys_of(&doc)[0].clone();

        let batch = vec![
            Mutation::SetText {
                node: p.clone(),
                text: "changed".to_string(),
            },
            Mutation::RemoveNode {
                node: NodeKey::new("missing"),
            },
        ];

        let result = Mutation::apply_all(&doc, &batch);
        assert_eq!(
            result.err(),
            Some(MutationError::NodeNotFound(NodeKey::new("missing")))
        );
        assert_eq!(serialize(&doc), "<p>a</p>");
    }

    #[test]
    fn test_root_cannot_be_removed() {
        let doc = parse("<p>a</p>").unwrap();
        let root = doc.key(doc.root()).unwrap().clone();

        assert_eq!(
            Mutation::RemoveNode { node: root.clone() }.apply(&doc).err(),
            Some(MutationError::RootImmutable)
        );
        assert_eq!(
            Mutation::InsertFragment {
                anchor: root,
                position: InsertPosition::After,
                fragment: element("p"),
            }
            .apply(&doc)
            .err(),
            Some(MutationError::RootImmutable)
        );
    }

    #[test]
    fn test_style_set_and_remove() {
        let doc = parse(r#"<div style="color: red;">x</div>"#).unwrap();
        let div = keys_of(&doc)[0].clone();

        let next = Mutation::apply_all(
            &doc,
            &[
                Mutation::SetStyle {
                    node: div.clone(),
                    property: "width".to_string(),
                    value: Some("120px".to_string()),
                },
                Mutation::SetStyle {
                    node: div,
                    property: "color".to_string(),
                    value: None,
                },
            ],
        )
        .unwrap();

        assert_eq!(serialize(&next), r#"<div style="width: 120px;">x</div>"#);
    }

    #[test]
    fn test_replace_content_parses_markup() {
        let doc = parse("<p>plain</p>").unwrap();
        let p = keys_of(&doc)[0].clone();

        let next = Mutation::ReplaceContent {
            node: p.clone(),
            html: "<b>bold</b> and <i>italic</i>".to_string(),
        }
        .apply(&doc)
        .unwrap();
        assert_eq!(serialize(&next), "<p><b>bold</b> and <i>italic</i></p>");

        let img = parse(r#"<img src="a.png">"#).unwrap();
        let img_key = keys_of(&img)[0].clone();
        assert!(matches!(
            Mutation::SetText {
                node: img_key,
                text: "x".to_string()
            }
            .apply(&img),
            Err(MutationError::InvalidStructure(_))
        ));
    }

    #[test]
    fn test_attribute_names_are_checked() {
        let doc = parse("<a>x</a>").unwrap();
        let a = keys_of(&doc)[0].clone();
        let result = Mutation::SetAttribute {
            node: a,
            name: "on click".to_string(),
            value: "x".to_string(),
        }
        .apply(&doc);
        assert!(matches!(result, Err(MutationError::InvalidStructure(_))));
    }

    #[test]
    fn test_serde_shape() {
        let mutation = Mutation::SetStyle {
            node: NodeKey::new("k-1"),
            property: "color".to_string(),
            value: None,
        };
        let json = serde_json::to_value(&mutation).unwrap();
        assert_eq!(json["kind"], "set_style");
        assert_eq!(json["node"], "k-1");

        let back: Mutation = serde_json::from_value(json).unwrap();
        assert_eq!(back, mutation);
    }
}
