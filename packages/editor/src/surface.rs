//! # Render Surface
//!
//! The isolated render context holding the live document (the canvas
//! iframe in a browser host). The engine is handed a surface explicitly and
//! never looks one up globally.
//!
//! [`HeadlessSurface`] keeps the document in memory and takes layout boxes
//! from its host, which is all hit testing and drop placement need.

use crate::geometry::{Point, Rect};
use pagecraft_parser::{parse_with_seed, Document, NodeKey, ParseError};
use std::collections::HashMap;

pub trait RenderSurface {
    /// The live document currently displayed
    fn document(&self) -> &Document;

    /// Replace the displayed document with a new version
    fn apply_document(&mut self, doc: Document);

    /// Replace the displayed document by parsing markup
    fn apply_html(&mut self, html: &str) -> Result<(), ParseError>;

    /// Keys of elements matching a simple selector
    fn query(&self, selector: &str) -> Vec<NodeKey>;

    /// Rendered box of a node, if it is laid out
    fn bounding_box(&self, key: &NodeKey) -> Option<Rect>;

    /// Topmost node under a canvas point
    fn hit_test(&self, point: Point) -> Option<NodeKey>;

    /// Move keyboard focus to a node (inline editing)
    fn focus(&mut self, key: &NodeKey);
}

/// In-memory surface with host-supplied layout
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    document: Document,
    layout: HashMap<NodeKey, Rect>,
    focused: Option<NodeKey>,
    seed: String,
}

impl HeadlessSurface {
    pub fn new(seed: &str) -> Self {
        Self {
            document: Document::with_seed(seed),
            layout: HashMap::new(),
            focused: None,
            seed: seed.to_string(),
        }
    }

    pub fn set_layout(&mut self, key: NodeKey, rect: Rect) {
        self.layout.insert(key, rect);
    }

    pub fn clear_layout(&mut self) {
        self.layout.clear();
    }

    pub fn focused(&self) -> Option<&NodeKey> {
        self.focused.as_ref()
    }

    fn depth(&self, key: &NodeKey) -> usize {
        self.document
            .get(key)
            .map(|id| self.document.ancestors(id).count())
            .unwrap_or(0)
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new("untitled")
    }
}

impl RenderSurface for HeadlessSurface {
    fn document(&self) -> &Document {
        &self.document
    }

    fn apply_document(&mut self, doc: Document) {
        if let Some(focused) = &self.focused {
            if doc.get(focused).is_none() {
                self.focused = None;
            }
        }
        self.document = doc;
    }

    fn apply_html(&mut self, html: &str) -> Result<(), ParseError> {
        let doc = parse_with_seed(html, &self.seed)?;
        self.apply_document(doc);
        Ok(())
    }

    fn query(&self, selector: &str) -> Vec<NodeKey> {
        self.document
            .query_all(selector)
            .into_iter()
            .filter_map(|id| self.document.key(id).cloned())
            .collect()
    }

    fn bounding_box(&self, key: &NodeKey) -> Option<Rect> {
        self.document.get(key)?;
        self.layout.get(key).copied()
    }

    /// Deepest laid-out node containing the point; among equals, the one
    /// later in document order wins (it paints on top)
    fn hit_test(&self, point: Point) -> Option<NodeKey> {
        let doc = &self.document;
        let mut best: Option<(usize, usize, &NodeKey)> = None;

        for (order, id) in doc.elements().into_iter().enumerate() {
            let Some(key) = doc.key(id) else { continue };
            let Some(rect) = self.layout.get(key) else {
                continue;
            };
            if !rect.contains(point) {
                continue;
            }
            let depth = self.depth(key);
            let better = match best {
                Some((best_depth, best_order, _)) => {
                    (depth, order) > (best_depth, best_order)
                }
                None => true,
            };
            if better {
                best = Some((depth, order, key));
            }
        }

        best.map(|(_, _, key)| key.clone())
    }

    fn focus(&mut self, key: &NodeKey) {
        if self.document.get(key).is_some() {
            self.focused = Some(key.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface_with(html: &str) -> HeadlessSurface {
        let mut surface = HeadlessSurface::new("test");
        surface.apply_html(html).unwrap();
        surface
    }

    #[test]
    fn test_hit_test_prefers_deepest() {
        let mut surface = surface_with("<section><p>Hello</p></section>");
        let section = surface.query("section")[0].clone();
        let p = surface.query("p")[0].clone();

        surface.set_layout(section.clone(), Rect::new(0.0, 0.0, 400.0, 200.0));
        surface.set_layout(p.clone(), Rect::new(20.0, 20.0, 200.0, 40.0));

        assert_eq!(surface.hit_test(Point::new(30.0, 30.0)), Some(p));
        assert_eq!(surface.hit_test(Point::new(300.0, 150.0)), Some(section));
        assert_eq!(surface.hit_test(Point::new(500.0, 500.0)), None);
    }

    #[test]
    fn test_layout_of_removed_nodes_is_ignored() {
        let mut surface = surface_with("<p>a</p>");
        let p = surface.query("p")[0].clone();
        surface.set_layout(p.clone(), Rect::new(0.0, 0.0, 10.0, 10.0));

        surface.apply_html("<div>b</div>").unwrap();
        assert_eq!(surface.bounding_box(&p), None);
    }

    #[test]
    fn test_focus_requires_attached_node() {
        let mut surface = surface_with("<p>a</p>");
        let p = surface.query("p")[0].clone();

        surface.focus(&NodeKey::new("nope"));
        assert_eq!(surface.focused(), None);

        surface.focus(&p);
        assert_eq!(surface.focused(), Some(&p));

        surface.apply_html("").unwrap();
        assert_eq!(surface.focused(), None);
    }
}
