//! # Drag and Drop Insertion
//!
//! Two kinds of drag share one drop rule:
//!
//! - **Palette** drags carry a component type tag and insert a fresh
//!   subtree
//! - **Canvas** drags carry the key of an existing node and move it
//!
//! The target is the nearest block-level element under the drop point. The
//! new position is `before` when the pointer is above the target's vertical
//! midpoint and `after` otherwise, or `inside` for the body and for
//! designated containers.

use crate::components;
use crate::geometry::{Point, Rect};
use crate::mutations::Mutation;
use crate::surface::RenderSurface;
use pagecraft_parser::{Document, InsertPosition, NodeId, NodeKey};
use serde::{Deserialize, Serialize};

pub use pagecraft_parser::DROP_TARGET_CLASS;

/// What is being dragged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum DragPayload {
    Palette { component: String },
    Canvas { key: NodeKey },
}

impl DragPayload {
    pub fn palette(component: impl Into<String>) -> Self {
        DragPayload::Palette {
            component: component.into(),
        }
    }

    pub fn canvas(key: NodeKey) -> Self {
        DragPayload::Canvas { key }
    }

    pub fn dragged_key(&self) -> Option<&NodeKey> {
        match self {
            DragPayload::Canvas { key } => Some(key),
            DragPayload::Palette { .. } => None,
        }
    }

    /// Mutation that performs the drop at `target`
    pub fn drop_mutation(&self, target: &DropTarget) -> Mutation {
        match self {
            DragPayload::Palette { component } => Mutation::InsertFragment {
                anchor: target.anchor.clone(),
                position: target.position,
                fragment: components::create(component),
            },
            DragPayload::Canvas { key } => Mutation::MoveNode {
                node: key.clone(),
                anchor: target.anchor.clone(),
                position: target.position,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTarget {
    pub anchor: NodeKey,
    pub position: InsertPosition,
}

/// `Before` above the midpoint, `After` at or below it
pub fn position_for(rect: &Rect, point: Point) -> InsertPosition {
    if point.y < rect.mid_y() {
        InsertPosition::Before
    } else {
        InsertPosition::After
    }
}

/// Element that would receive a drop at `point`
pub fn target_element(doc: &Document, hit: Option<&NodeKey>) -> NodeId {
    hit.and_then(|key| doc.get(key))
        .and_then(|id| doc.nearest_block(id))
        .unwrap_or_else(|| doc.root())
}

/// Where a drop at `point` lands. `None` when the target is the dragged
/// node itself or lies inside it.
pub fn resolve_drop<S: RenderSurface + ?Sized>(
    surface: &S,
    point: Point,
    dragged: Option<&NodeKey>,
) -> Option<DropTarget> {
    let doc = surface.document();
    let target = target_element(doc, surface.hit_test(point).as_ref());

    if let Some(dragged) = dragged.and_then(|key| doc.get(key)) {
        if target == dragged || doc.is_ancestor_of(dragged, target) {
            return None;
        }
    }

    let anchor = doc.key(target)?.clone();
    let is_container = doc.element(target).map(|el| el.is_container()).unwrap_or(false);
    let position = if target == doc.root() || is_container {
        InsertPosition::Inside
    } else {
        surface
            .bounding_box(&anchor)
            .map(|rect| position_for(&rect, point))
            .unwrap_or(InsertPosition::After)
    };

    Some(DropTarget { anchor, position })
}

/// One drag gesture, from start to drop or cancel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragState {
    pub payload: DragPayload,
    /// Element currently highlighted as the target
    pub over: Option<NodeKey>,
    /// Whole-canvas highlight while a palette item hovers the canvas
    pub canvas_highlight: bool,
}

impl DragState {
    pub fn new(payload: DragPayload) -> Self {
        Self {
            payload,
            over: None,
            canvas_highlight: false,
        }
    }
}

pub fn highlight_target(doc: &mut Document, id: NodeId) {
    if id == doc.root() {
        return;
    }
    if let Some(el) = doc.element_mut(id) {
        el.add_class(DROP_TARGET_CLASS);
    }
}

pub fn clear_highlights(doc: &mut Document) {
    for id in doc.elements() {
        if let Some(el) = doc.element_mut(id) {
            el.remove_class(DROP_TARGET_CLASS);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::HeadlessSurface;

    fn surface() -> (HeadlessSurface, Vec<NodeKey>) {
        let mut surface = HeadlessSurface::new("drag");
        surface
            .apply_html(r#"<p>A</p><p>B</p><div data-pc-container=""><p>C</p></div>"#)
            .unwrap();
        let p = surface.query("p");
        let container = surface.query("div")[0].clone();
        surface.set_layout(p[0].clone(), Rect::new(0.0, 0.0, 300.0, 40.0));
        surface.set_layout(p[1].clone(), Rect::new(0.0, 40.0, 300.0, 40.0));
        surface.set_layout(container.clone(), Rect::new(0.0, 80.0, 300.0, 100.0));
        surface.set_layout(p[2].clone(), Rect::new(0.0, 90.0, 300.0, 20.0));
        (surface, vec![p[0].clone(), p[1].clone(), container, p[2].clone()])
    }

    #[test]
    fn test_midpoint_is_after() {
        let rect = Rect::new(0.0, 40.0, 300.0, 40.0);
        assert_eq!(position_for(&rect, Point::new(5.0, 59.9)), InsertPosition::Before);
        assert_eq!(position_for(&rect, Point::new(5.0, 60.0)), InsertPosition::After);
    }

    #[test]
    fn test_resolve_before_and_after() {
        let (surface, keys) = surface();
        let top = resolve_drop(&surface, Point::new(10.0, 45.0), None).unwrap();
        assert_eq!(top, DropTarget { anchor: keys[1].clone(), position: InsertPosition::Before });

        let bottom = resolve_drop(&surface, Point::new(10.0, 70.0), None).unwrap();
        assert_eq!(bottom.position, InsertPosition::After);
    }

    #[test]
    fn test_miss_targets_body() {
        let (surface, _) = surface();
        let target = resolve_drop(&surface, Point::new(10.0, 500.0), None).unwrap();
        assert_eq!(target.position, InsertPosition::Inside);
        assert_eq!(surface.document().get(&target.anchor), Some(surface.document().root()));
    }

    #[test]
    fn test_container_receives_inside() {
        let (surface, keys) = surface();
        let target = resolve_drop(&surface, Point::new(10.0, 150.0), None).unwrap();
        assert_eq!(target.anchor, keys[2]);
        assert_eq!(target.position, InsertPosition::Inside);
    }

    #[test]
    fn test_drop_on_self_or_descendant_is_rejected() {
        let (surface, keys) = surface();
        assert_eq!(resolve_drop(&surface, Point::new(10.0, 10.0), Some(&keys[0])), None);
        assert_eq!(resolve_drop(&surface, Point::new(10.0, 95.0), Some(&keys[2])), None);
    }

    #[test]
    fn test_payload_json() {
        let payload: DragPayload =
            serde_json::from_str(r#"{ "source": "palette", "component": "button" }"#).unwrap();
        assert_eq!(payload, DragPayload::palette("button"));
        assert_eq!(payload.dragged_key(), None);
    }
}
