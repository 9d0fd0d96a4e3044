//! # Selection and Inline Editing
//!
//! ```text
//!              click                  click text node
//! Unselected ────────▶ Selected ─────────────────────▶ Editing
//!      ▲                │   ▲                            │
//!      └── clear/click ─┘   └──── blur / Enter ──────────┘
//!          outside
//! ```
//!
//! The selection holds node keys only. Decorations (marker class, resize
//! handles, drag label, `contenteditable`) are written into the live
//! document and never reach the canonical markup.

use crate::geometry::{Point, Rect};
use crate::mutations::Mutation;
use pagecraft_parser::fragment::{element, FragmentNode};
use pagecraft_parser::{Document, InsertPosition, NodeId, NodeKey, CONTROL_ATTR};
use serde::{Deserialize, Serialize};

pub use pagecraft_parser::SELECTED_CLASS;

/// Attribute naming a resize handle's direction
pub const HANDLE_ATTR: &str = "data-pc-handle";

/// Key of the void node a sibling handle overlay belongs to
pub const HANDLES_FOR_ATTR: &str = "data-pc-for";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Unselected,
    Selected {
        node: NodeKey,
    },
    Editing {
        node: NodeKey,
    },
}

/// Current selection plus a version bumped on every selection change or
/// content mutation
#[derive(Debug, Clone, Default)]
pub struct Selection {
    state: SelectionState,
    version: u64,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn node(&self) -> Option<&NodeKey> {
        match &self.state {
            SelectionState::Unselected => None,
            SelectionState::Selected { node, .. } | SelectionState::Editing { node } => Some(node),
        }
    }

    pub fn is_selected(&self, key: &NodeKey) -> bool {
        self.node() == Some(key)
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, SelectionState::Editing { .. })
    }

    pub fn bump(&mut self) {
        self.version += 1;
    }

    /// Transition to a new state. Returns false when nothing changed.
    pub fn set(&mut self, state: SelectionState) -> bool {
        if self.state == state {
            return false;
        }
        self.state = state;
        self.bump();
        true
    }

    pub fn clear(&mut self) -> bool {
        self.set(SelectionState::Unselected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResizeHandle {
    NorthWest,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::NorthWest,
        ResizeHandle::North,
        ResizeHandle::NorthEast,
        ResizeHandle::East,
        ResizeHandle::SouthEast,
        ResizeHandle::South,
        ResizeHandle::SouthWest,
        ResizeHandle::West,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResizeHandle::NorthWest => "nw",
            ResizeHandle::North => "n",
            ResizeHandle::NorthEast => "ne",
            ResizeHandle::East => "e",
            ResizeHandle::SouthEast => "se",
            ResizeHandle::South => "s",
            ResizeHandle::SouthWest => "sw",
            ResizeHandle::West => "w",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.as_str() == s)
    }

    /// -1 grows leftwards, 1 rightwards, 0 leaves width alone
    fn x_sign(self) -> f64 {
        match self {
            ResizeHandle::NorthWest | ResizeHandle::West | ResizeHandle::SouthWest => -1.0,
            ResizeHandle::NorthEast | ResizeHandle::East | ResizeHandle::SouthEast => 1.0,
            ResizeHandle::North | ResizeHandle::South => 0.0,
        }
    }

    fn y_sign(self) -> f64 {
        match self {
            ResizeHandle::NorthWest | ResizeHandle::North | ResizeHandle::NorthEast => -1.0,
            ResizeHandle::SouthWest | ResizeHandle::South | ResizeHandle::SouthEast => 1.0,
            ResizeHandle::East | ResizeHandle::West => 0.0,
        }
    }

    fn cursor(self) -> &'static str {
        match self {
            ResizeHandle::NorthWest | ResizeHandle::SouthEast => "nwse-resize",
            ResizeHandle::NorthEast | ResizeHandle::SouthWest => "nesw-resize",
            ResizeHandle::North | ResizeHandle::South => "ns-resize",
            ResizeHandle::East | ResizeHandle::West => "ew-resize",
        }
    }

    /// Offsets (left, top) as percentages of the host box
    fn anchor(self) -> (&'static str, &'static str) {
        match self {
            ResizeHandle::NorthWest => ("0%", "0%"),
            ResizeHandle::North => ("50%", "0%"),
            ResizeHandle::NorthEast => ("100%", "0%"),
            ResizeHandle::East => ("100%", "50%"),
            ResizeHandle::SouthEast => ("100%", "100%"),
            ResizeHandle::South => ("50%", "100%"),
            ResizeHandle::SouthWest => ("0%", "100%"),
            ResizeHandle::West => ("0%", "50%"),
        }
    }
}

/// An in-progress resize, measured against the box at drag start
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeGesture {
    pub node: NodeKey,
    pub handle: ResizeHandle,
    pub origin: Point,
    pub start: Rect,
    /// Inline style before the gesture
    pub start_style: Option<String>,
}

impl ResizeGesture {
    /// Mutation that puts the node's inline style back as it was at drag start
    pub fn restore(&self) -> Mutation {
        match &self.start_style {
            Some(style) => Mutation::SetAttribute {
                node: self.node.clone(),
                name: "style".to_string(),
                value: style.clone(),
            },
            None => Mutation::RemoveAttribute {
                node: self.node.clone(),
                name: "style".to_string(),
            },
        }
    }

    /// Width and height for the pointer at `point`, clamped to the minimum
    pub fn size_at(&self, point: Point, min_width: f64, min_height: f64) -> (f64, f64) {
        let dx = point.x - self.origin.x;
        let dy = point.y - self.origin.y;
        let width = self.start.width + dx * self.handle.x_sign();
        let height = self.start.height + dy * self.handle.y_sign();
        (width.max(min_width), height.max(min_height))
    }
}

/// Where the handle overlay of a selected node goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlePlacement {
    /// Last child of the node, covering it
    Inside(NodeId),
    /// Next sibling of a void node, framed on the node's box
    After(NodeId),
}

/// Handles always belong to the selected node itself. The root and
/// editor controls never carry them.
pub fn handle_placement(doc: &Document, id: NodeId) -> Option<HandlePlacement> {
    let el = doc.element(id)?;
    if id == doc.root() || el.is_control() {
        return None;
    }
    Some(if el.is_void() {
        HandlePlacement::After(id)
    } else {
        HandlePlacement::Inside(id)
    })
}

/// Resize handles and drag label. With a `frame` the overlay is placed on
/// that box, otherwise it fills its parent.
pub fn handle_fragment(handle_size: f64, frame: Option<Rect>) -> FragmentNode {
    let size = format!("{}px", handle_size);
    let offset = format!("-{}px", handle_size / 2.0);

    let handles = ResizeHandle::ALL.into_iter().map(|handle| {
        let (left, top) = handle.anchor();
        element("span")
            .with_attr(CONTROL_ATTR, "handle")
            .with_attr(HANDLE_ATTR, handle.as_str())
            .with_styles(&[
                ("position", "absolute"),
                ("left", left),
                ("top", top),
                ("width", size.as_str()),
                ("height", size.as_str()),
                ("margin-left", offset.as_str()),
                ("margin-top", offset.as_str()),
                ("background", "#4f46e5"),
                ("cursor", handle.cursor()),
            ])
    });

    let label = element("span")
        .with_attr(CONTROL_ATTR, "drag-label")
        .with_attr("draggable", "true")
        .with_styles(&[
            ("position", "absolute"),
            ("left", "0"),
            ("top", "-22px"),
            ("padding", "2px 6px"),
            ("font-size", "11px"),
            ("background", "#4f46e5"),
            ("color", "#ffffff"),
            ("cursor", "move"),
        ])
        .with_text("Drag");

    let overlay = element("div").with_attr(CONTROL_ATTR, "handles");
    let overlay = match frame {
        Some(frame) => {
            let px = |v: f64| format!("{}px", v.round());
            let (left, top) = (px(frame.x), px(frame.y));
            let (width, height) = (px(frame.width), px(frame.height));
            overlay.with_styles(&[
                ("position", "absolute"),
                ("left", left.as_str()),
                ("top", top.as_str()),
                ("width", width.as_str()),
                ("height", height.as_str()),
                ("pointer-events", "none"),
            ])
        }
        None => overlay.with_styles(&[
            ("position", "absolute"),
            ("inset", "0"),
            ("pointer-events", "none"),
        ]),
    };
    overlay.with_children(handles).with_child(label)
}

/// Remove every selection decoration from the live document
pub fn clear_decorations(doc: &mut Document) {
    doc.remove_controls();
    for id in doc.elements() {
        if let Some(el) = doc.element_mut(id) {
            el.remove_class(SELECTED_CLASS);
            el.end_inline_edit();
        }
    }
}

/// Mark `node` selected and attach its handles. `frame` is the node's
/// layout box, used when the handles sit beside a void node.
pub fn decorate_selected(doc: &mut Document, node: NodeId, handle_size: f64, frame: Option<Rect>) {
    let Some(placement) = handle_placement(doc, node) else {
        return;
    };
    if let Some(el) = doc.element_mut(node) {
        el.add_class(SELECTED_CLASS);
    }
    let attached = match placement {
        HandlePlacement::Inside(host) => {
            let index = doc.children(host).len();
            doc.insert_fragment(host, index, &handle_fragment(handle_size, None))
        }
        HandlePlacement::After(anchor) => {
            let owner = doc.key(anchor).map(|key| key.to_string()).unwrap_or_default();
            let overlay = handle_fragment(handle_size, frame).with_attr(HANDLES_FOR_ATTR, owner);
            doc.insert_fragment_at(anchor, InsertPosition::After, &overlay)
        }
    };
    if let Err(err) = attached {
        tracing::debug!(error = %err, "could not attach resize handles");
    }
}

/// Mark `node` selected and content-editable, without handles
pub fn decorate_editing(doc: &mut Document, node: NodeId) {
    if let Some(el) = doc.element_mut(node) {
        el.add_class(SELECTED_CLASS);
        el.begin_inline_edit();
    }
}

/// What a control element under the pointer is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Handle(ResizeHandle),
    DragLabel,
    Other,
}

pub fn control_kind(doc: &Document, id: NodeId) -> Option<ControlKind> {
    let el = doc.element(id)?;
    match el.attribute(CONTROL_ATTR)? {
        "handle" => Some(
            el.attribute(HANDLE_ATTR)
                .and_then(ResizeHandle::parse)
                .map(ControlKind::Handle)
                .unwrap_or(ControlKind::Other),
        ),
        "drag-label" => Some(ControlKind::DragLabel),
        _ => Some(ControlKind::Other),
    }
}
