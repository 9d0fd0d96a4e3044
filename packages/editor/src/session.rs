//! # Edit Session
//!
//! The interaction controller a host drives with pointer and keyboard
//! events. It owns the [`Pipeline`] and the transient interaction state:
//! selection, inline editing, the active drag or resize gesture and a
//! pending delete confirmation.
//!
//! Every content change funnels through [`Pipeline::apply`]; afterwards the
//! session rewrites its decorations (marker class, handles, drop highlight)
//! on the new live document.

use crate::clock::Clock;
use crate::config::EditorConfig;
use crate::drag_drop::{self, DragPayload, DragState};
use crate::errors::EditorError;
use crate::geometry::Point;
use crate::mutations::Mutation;
use crate::notices::{Notice, Notices};
use crate::outline::OutlineNode;
use crate::payload::{PagePayload, SaveSink};
use crate::pipeline::{ChangeKind, Pipeline, TickReport};
use crate::properties::{BackgroundImageEdit, PropertyChange, PropertyEdit, PropertyPanel};
use crate::selection::{self, ControlKind, ResizeGesture, ResizeHandle, Selection, SelectionState};
use crate::surface::RenderSurface;
use crate::upload::{UploadPolicy, UploadedFile};
use pagecraft_parser::{InsertPosition, NodeKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// What a click did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClickOutcome {
    Selected { node: NodeKey },
    Editing { node: NodeKey },
    /// The selected image was clicked; the host should open a file picker
    /// and call [`EditorSession::replace_image`]
    PickImage { node: NodeKey },
    Cleared,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Enter,
    Escape,
    Delete,
    Backspace,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInput {
    pub key: Key,
    #[serde(default)]
    pub shift: bool,
    /// Ctrl, Alt or Meta held
    #[serde(default)]
    pub modifier: bool,
}

impl KeyInput {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            shift: false,
            modifier: false,
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

pub struct EditorSession<S: RenderSurface> {
    pipeline: Pipeline<S>,
    selection: Selection,
    drag: Option<DragState>,
    resize: Option<ResizeGesture>,
    pending_delete: Option<NodeKey>,
    notices: Notices,
    upload_policy: UploadPolicy,
}

impl<S: RenderSurface> EditorSession<S> {
    pub fn new(surface: S, config: EditorConfig, clock: Box<dyn Clock>) -> Self {
        let upload_policy = UploadPolicy::images(config.upload_limit_mb);
        Self {
            pipeline: Pipeline::new(surface, config, clock),
            selection: Selection::new(),
            drag: None,
            resize: None,
            pending_delete: None,
            notices: Notices::default(),
            upload_policy,
        }
    }

    pub fn with_sink(mut self, sink: impl SaveSink + 'static) -> Self {
        self.pipeline.set_sink(Box::new(sink));
        self
    }

    pub fn set_upload_limit(&mut self, max_size_mb: f64) {
        self.upload_policy.max_size_mb = max_size_mb;
    }

    pub fn load(&mut self, html: &str, css: &str) -> Result<(), EditorError> {
        self.pipeline.load(html, css)?;
        self.drag = None;
        self.resize = None;
        self.pending_delete = None;
        self.selection.clear();
        Ok(())
    }

    /// Load stored page data, falling back to the placeholder document
    pub fn load_payload(&mut self, payload: &PagePayload) -> Result<(), EditorError> {
        self.load(payload.initial_html(), &payload.css)
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    /// Click on the canvas. `None` is a click on empty canvas.
    pub fn click(&mut self, target: Option<&NodeKey>) -> ClickOutcome {
        let doc = self.pipeline.document();
        let Some(hit) = target.and_then(|key| doc.get(key)) else {
            return self.click_outside();
        };
        if doc.closest(hit, |el| el.is_control()).is_some() {
            return ClickOutcome::Ignored;
        }
        // Text nodes select their element
        let Some(id) = doc.closest(hit, |_| true) else {
            return self.click_outside();
        };
        if id == doc.root() {
            return self.click_outside();
        }
        let Some(key) = doc.key(id).cloned() else {
            return ClickOutcome::Ignored;
        };
        let (is_image, is_text) = doc
            .element(id)
            .map(|el| (el.tag == "img", el.is_text_bearing()))
            .unwrap_or_default();

        match self.selection.state().clone() {
            SelectionState::Editing { node } if node == key => ClickOutcome::Ignored,
            SelectionState::Selected { node, .. } if node == key => {
                if is_image {
                    ClickOutcome::PickImage { node: key }
                } else if is_text {
                    self.begin_editing(&key);
                    ClickOutcome::Editing { node: key }
                } else {
                    ClickOutcome::Ignored
                }
            }
            _ => match self.select(&key) {
                Ok(()) => ClickOutcome::Selected { node: key },
                Err(_) => ClickOutcome::Ignored,
            },
        }
    }

    pub fn click_at(&mut self, point: Point) -> ClickOutcome {
        let hit = self.pipeline.surface().hit_test(point);
        self.click(hit.as_ref())
    }

    fn click_outside(&mut self) -> ClickOutcome {
        if self.clear_selection() {
            ClickOutcome::Cleared
        } else {
            ClickOutcome::Ignored
        }
    }

    /// Double click. On the drag label it resets the selected node's size.
    pub fn double_click(&mut self, target: Option<&NodeKey>) -> Result<bool, EditorError> {
        let doc = self.pipeline.document();
        let kind = target
            .and_then(|key| doc.get(key))
            .and_then(|id| selection::control_kind(doc, id));
        match kind {
            Some(ControlKind::DragLabel) => self.reset_size(),
            _ => Ok(false),
        }
    }

    /// Select a node (from the canvas or the outline)
    pub fn select(&mut self, key: &NodeKey) -> Result<(), EditorError> {
        let doc = self.pipeline.document();
        doc.get(key)
            .filter(|&id| id != doc.root() && doc.element(id).is_some())
            .ok_or_else(|| EditorError::UnknownNode(key.clone()))?;

        if self.selection.is_editing() {
            self.commit_edit();
        }
        self.selection.set(SelectionState::Selected { node: key.clone() });
        self.refresh_decorations();
        Ok(())
    }

    /// Drop the selection and its decorations. Commits an open edit first.
    pub fn clear_selection(&mut self) -> bool {
        if self.selection.is_editing() {
            self.commit_edit();
        }
        let cleared = self.selection.clear();
        if cleared {
            self.refresh_decorations();
        }
        cleared
    }

    // ------------------------------------------------------------------
    // Inline editing
    // ------------------------------------------------------------------

    fn begin_editing(&mut self, key: &NodeKey) {
        self.selection.set(SelectionState::Editing { node: key.clone() });
        self.refresh_decorations();
        self.pipeline.surface_mut().focus(key);
    }

    /// Content of the edited node changed (rich-text toolbar or typing)
    pub fn text_input(&mut self, html: &str) -> Result<bool, EditorError> {
        let SelectionState::Editing { node } = self.selection.state().clone() else {
            return Err(EditorError::NoSelection);
        };
        let mutation = Mutation::ReplaceContent {
            node,
            html: html.to_string(),
        };
        self.commit(&[mutation], ChangeKind::TextInput)
    }

    /// Leave inline editing (blur or Enter), keeping the node selected
    pub fn commit_edit(&mut self) -> bool {
        let SelectionState::Editing { node } = self.selection.state().clone() else {
            return false;
        };
        self.pipeline.flush_pending();

        let state = match self.pipeline.document().get(&node) {
            Some(_) => SelectionState::Selected { node },
            None => SelectionState::Unselected,
        };
        self.selection.set(state);
        self.refresh_decorations();
        true
    }

    pub fn blur(&mut self) -> bool {
        self.commit_edit()
    }

    pub fn key_down(&mut self, input: KeyInput) -> bool {
        let editing = self.selection.is_editing();
        let selected = self.selected_node().is_some();
        match input.key {
            Key::Enter if editing && !input.shift => self.commit_edit(),
            Key::Escape if self.resize.is_some() => self.cancel_resize().unwrap_or(false),
            Key::Escape if editing || selected => self.clear_selection(),
            Key::Delete | Key::Backspace if selected => self.request_delete(),
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // Deletion
    // ------------------------------------------------------------------

    /// Ask to delete the selected node. The host confirms with
    /// [`resolve_delete`](Self::resolve_delete).
    pub fn request_delete(&mut self) -> bool {
        let Some(node) = self.selection.node().cloned() else {
            return false;
        };
        self.pending_delete = Some(node);
        true
    }

    pub fn pending_delete(&self) -> Option<&NodeKey> {
        self.pending_delete.as_ref()
    }

    pub fn resolve_delete(&mut self, confirmed: bool) -> Result<bool, EditorError> {
        let Some(node) = self.pending_delete.take() else {
            return Ok(false);
        };
        if !confirmed {
            return Ok(false);
        }
        if self.selection.is_selected(&node) {
            self.selection.clear();
        }
        let changed = self.commit(&[Mutation::RemoveNode { node }], ChangeKind::Discrete)?;
        if changed {
            self.notices.success("Element deleted");
        }
        Ok(changed)
    }

    // ------------------------------------------------------------------
    // Resize
    // ------------------------------------------------------------------

    pub fn begin_resize(&mut self, handle: ResizeHandle, point: Point) -> bool {
        let Some(node) = self.selected_node() else {
            return false;
        };
        let Some(start) = self.pipeline.surface().bounding_box(&node) else {
            return false;
        };
        let doc = self.pipeline.document();
        let start_style = doc
            .get(&node)
            .and_then(|id| doc.element(id))
            .and_then(|el| el.attribute("style"))
            .map(str::to_string);
        self.resize = Some(ResizeGesture {
            node,
            handle,
            origin: point,
            start,
            start_style,
        });
        true
    }

    /// Pointer down on a handle element
    pub fn begin_resize_at(&mut self, target: &NodeKey, point: Point) -> bool {
        let doc = self.pipeline.document();
        match doc.get(target).and_then(|id| selection::control_kind(doc, id)) {
            Some(ControlKind::Handle(handle)) => self.begin_resize(handle, point),
            _ => false,
        }
    }

    /// Live size while dragging a handle. Nothing is committed.
    pub fn update_resize(&mut self, point: Point) -> Result<Option<(f64, f64)>, EditorError> {
        let Some(gesture) = &self.resize else {
            return Ok(None);
        };
        let config = self.pipeline.config();
        let (width, height) = gesture.size_at(point, config.min_width, config.min_height);
        let mutations = size_mutations(&gesture.node, width, height);
        self.pipeline.apply_preview(&mutations)?;
        Ok(Some((width, height)))
    }

    /// Release: fix the size in pixels and commit
    pub fn end_resize(&mut self, point: Point) -> Result<bool, EditorError> {
        let Some(gesture) = self.resize.take() else {
            return Ok(false);
        };
        let config = self.pipeline.config();
        let (width, height) = gesture.size_at(point, config.min_width, config.min_height);
        self.commit(&size_mutations(&gesture.node, width, height), ChangeKind::Discrete)
    }

    /// Abandon the gesture and put back the size it started with. Nothing
    /// is committed.
    pub fn cancel_resize(&mut self) -> Result<bool, EditorError> {
        let Some(gesture) = self.resize.take() else {
            return Ok(false);
        };
        if self.pipeline.document().get(&gesture.node).is_some() {
            self.pipeline.apply_preview(&[gesture.restore()])?;
        }
        self.refresh_decorations();
        Ok(true)
    }

    pub fn is_resizing(&self) -> bool {
        self.resize.is_some()
    }

    /// Width back to 100%, height back to auto
    pub fn reset_size(&mut self) -> Result<bool, EditorError> {
        let Some(node) = self.selected_node() else {
            return Ok(false);
        };
        let mutations = [
            style_mutation(&node, "width", "100%"),
            style_mutation(&node, "height", "auto"),
        ];
        self.commit(&mutations, ChangeKind::Discrete)
    }

    // ------------------------------------------------------------------
    // Drag and drop
    // ------------------------------------------------------------------

    /// Start a drag. Only one drag runs at a time.
    pub fn begin_drag(&mut self, payload: DragPayload) -> bool {
        if self.drag.is_some() {
            return false;
        }
        debug!(?payload, "drag started");
        self.drag = Some(DragState::new(payload));
        true
    }

    /// Pointer down on the canvas: starts a canvas drag from the drag label,
    /// or from any block element while a modifier key is held
    pub fn begin_drag_at(&mut self, point: Point, modifier: bool) -> bool {
        let doc = self.pipeline.document();
        let Some(hit) = self.pipeline.surface().hit_test(point).and_then(|k| doc.get(&k)) else {
            return false;
        };

        let key = match selection::control_kind(doc, hit) {
            Some(ControlKind::DragLabel) => self.selection.node().cloned(),
            Some(_) => None,
            None if modifier => doc
                .nearest_block(hit)
                .filter(|&id| id != doc.root())
                .and_then(|id| doc.key(id).cloned()),
            None => None,
        };
        match key {
            Some(key) => self.begin_drag(DragPayload::canvas(key)),
            None => false,
        }
    }

    pub fn drag_over(&mut self, point: Point) {
        let Some(drag) = &self.drag else {
            return;
        };
        let surface = self.pipeline.surface();
        let target = drag_drop::resolve_drop(surface, point, drag.payload.dragged_key());
        let root = surface.document().key(surface.document().root()).cloned();
        let over = target.map(|t| t.anchor).filter(|anchor| Some(anchor) != root.as_ref());
        let is_palette = matches!(drag.payload, DragPayload::Palette { .. });

        if let Some(drag) = self.drag.as_mut() {
            drag.canvas_highlight = is_palette;
            drag.over = over;
        }
        self.refresh_decorations();
    }

    pub fn drag_leave(&mut self) {
        if let Some(drag) = self.drag.as_mut() {
            drag.over = None;
            drag.canvas_highlight = false;
            self.refresh_decorations();
        }
    }

    /// Release the pointer: always attempts the insertion
    pub fn drop(&mut self, point: Point) -> Result<bool, EditorError> {
        let Some(drag) = self.drag.take() else {
            return Ok(false);
        };

        if let Some(key) = drag.payload.dragged_key() {
            if self.pipeline.document().get(key).is_none() {
                warn!(%key, "dragged element no longer exists");
                self.notices.warning("The dragged element no longer exists");
                self.refresh_decorations();
                return Ok(false);
            }
        }

        let target = drag_drop::resolve_drop(self.pipeline.surface(), point, drag.payload.dragged_key());
        let Some(target) = target else {
            debug!("drop onto the dragged element ignored");
            self.refresh_decorations();
            return Ok(false);
        };

        let changed = self.commit(&[drag.payload.drop_mutation(&target)], ChangeKind::Discrete)?;
        if changed && matches!(drag.payload, DragPayload::Palette { .. }) {
            self.notices.success("Component added");
        }
        Ok(changed)
    }

    pub fn cancel_drag(&mut self) {
        if self.drag.take().is_some() {
            self.refresh_decorations();
        }
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    pub fn is_canvas_highlighted(&self) -> bool {
        self.drag.as_ref().map(|d| d.canvas_highlight).unwrap_or(false)
    }

    // ------------------------------------------------------------------
    // Outline
    // ------------------------------------------------------------------

    /// Reorder from the outline; same move path as canvas drags
    pub fn move_in_outline(
        &mut self,
        node: &NodeKey,
        anchor: &NodeKey,
        position: InsertPosition,
    ) -> Result<bool, EditorError> {
        let mutation = Mutation::MoveNode {
            node: node.clone(),
            anchor: anchor.clone(),
            position,
        };
        self.commit(&[mutation], ChangeKind::Discrete)
    }

    pub fn toggle_outline(&mut self, id: &NodeKey) -> bool {
        self.pipeline.expanded_mut().toggle(id)
    }

    pub fn expand_all(&mut self) {
        let outline = self.pipeline.outline().to_vec();
        self.pipeline.expanded_mut().expand_all(&outline);
    }

    pub fn collapse_all(&mut self) {
        self.pipeline.expanded_mut().collapse_all();
    }

    pub fn is_expanded(&self, id: &NodeKey) -> bool {
        self.pipeline.expanded().is_expanded(id)
    }

    // ------------------------------------------------------------------
    // Properties and images
    // ------------------------------------------------------------------

    /// Values the property panels show for the selection
    pub fn properties(&self) -> Option<PropertyPanel> {
        let doc = self.pipeline.document();
        let id = doc.get(self.selection.node()?)?;
        doc.element(id).map(PropertyPanel::read)
    }

    pub fn apply_property(&mut self, change: &PropertyChange) -> Result<bool, EditorError> {
        self.apply_edit(change)
    }

    fn apply_edit(&mut self, edit: &dyn PropertyEdit) -> Result<bool, EditorError> {
        let node = self.selection.node().cloned().ok_or(EditorError::NoSelection)?;
        let doc = self.pipeline.document();
        let element = doc
            .get(&node)
            .and_then(|id| doc.element(id))
            .ok_or_else(|| EditorError::UnknownNode(node.clone()))?;

        let mutations = match edit.mutations(&node, element) {
            Ok(mutations) => mutations,
            Err(rejected) => {
                self.notices.alert(rejected.to_string());
                return Ok(false);
            }
        };
        if mutations.is_empty() {
            return Ok(false);
        }
        self.commit(&mutations, ChangeKind::Discrete)
    }

    /// Replace the selected image's source with an uploaded file
    pub fn replace_image(&mut self, file: &UploadedFile) -> Result<bool, EditorError> {
        let node = self.selection.node().cloned().ok_or(EditorError::NoSelection)?;
        let doc = self.pipeline.document();
        let is_image = doc
            .get(&node)
            .and_then(|id| doc.element(id))
            .map(|el| el.tag == "img")
            .unwrap_or(false);
        if !is_image {
            return Ok(false);
        }

        let Some(url) = self.read_upload(file) else {
            return Ok(false);
        };
        let mutation = Mutation::SetAttribute {
            node,
            name: "src".to_string(),
            value: url,
        };
        self.commit(&[mutation], ChangeKind::Discrete)
    }

    /// Use an uploaded file as the selection's background image
    pub fn upload_background_image(&mut self, file: &UploadedFile) -> Result<bool, EditorError> {
        if self.selection.node().is_none() {
            return Err(EditorError::NoSelection);
        }
        let Some(url) = self.read_upload(file) else {
            return Ok(false);
        };
        self.apply_edit(&BackgroundImageEdit::Url(url))
    }

    fn read_upload(&mut self, file: &UploadedFile) -> Option<String> {
        match self.upload_policy.read_as_data_url(file) {
            Ok(url) => Some(url),
            Err(err) => {
                debug!(file = %file.name, error = %err, "upload rejected");
                self.notices.alert(err.to_string());
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // History and saving
    // ------------------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        self.leave_editing();
        let changed = self.pipeline.undo();
        self.after_replay(changed)
    }

    pub fn redo(&mut self) -> bool {
        self.leave_editing();
        let changed = self.pipeline.redo();
        self.after_replay(changed)
    }

    pub fn reset(&mut self) -> bool {
        self.leave_editing();
        let changed = self.pipeline.reset();
        self.after_replay(changed)
    }

    fn leave_editing(&mut self) {
        if self.selection.is_editing() {
            self.commit_edit();
        }
    }

    fn after_replay(&mut self, changed: bool) -> bool {
        if changed {
            self.selection.bump();
            self.refresh_decorations();
        }
        changed
    }

    pub fn can_undo(&self) -> bool {
        self.pipeline.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.pipeline.can_redo()
    }

    /// Manual save
    pub fn save(&mut self) -> PagePayload {
        self.pipeline.save_now()
    }

    pub fn tick(&mut self) -> TickReport {
        self.pipeline.tick()
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn html(&self) -> &str {
        self.pipeline.html()
    }

    pub fn outline(&self) -> &[OutlineNode] {
        self.pipeline.outline()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_version(&self) -> u64 {
        self.selection.version()
    }

    pub fn pipeline(&self) -> &Pipeline<S> {
        &self.pipeline
    }

    pub fn surface(&self) -> &S {
        self.pipeline.surface()
    }

    /// Surface access for layout updates
    pub fn surface_mut(&mut self) -> &mut S {
        self.pipeline.surface_mut()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn selected_node(&self) -> Option<NodeKey> {
        match self.selection.state() {
            SelectionState::Selected { node, .. } => Some(node.clone()),
            _ => None,
        }
    }

    /// Apply through the pipeline, then bump the version and redecorate
    fn commit(&mut self, mutations: &[Mutation], kind: ChangeKind) -> Result<bool, EditorError> {
        let changed = self.pipeline.apply(mutations, kind)?;
        if changed {
            self.selection.bump();
        }
        self.refresh_decorations();
        Ok(changed)
    }

    /// Rewrite every decoration from the current interaction state. A
    /// selection whose node disappeared is dropped.
    fn refresh_decorations(&mut self) {
        let doc = self.pipeline.document();
        let state = match self.selection.state().clone() {
            SelectionState::Selected { node } if doc.get(&node).is_none() => {
                SelectionState::Unselected
            }
            SelectionState::Editing { node } if doc.get(&node).is_none() => {
                SelectionState::Unselected
            }
            other => other,
        };
        self.selection.set(state.clone());

        let handle_size = self.pipeline.config().handle_size;
        let frame = match &state {
            SelectionState::Selected { node } => self.pipeline.surface().bounding_box(node),
            _ => None,
        };
        let over = self.drag.as_ref().and_then(|d| d.over.clone());

        self.pipeline.decorate(|doc| {
            selection::clear_decorations(doc);
            drag_drop::clear_highlights(doc);

            match &state {
                SelectionState::Selected { node } => {
                    if let Some(node) = doc.get(node) {
                        selection::decorate_selected(doc, node, handle_size, frame);
                    }
                }
                SelectionState::Editing { node } => {
                    if let Some(node) = doc.get(node) {
                        selection::decorate_editing(doc, node);
                    }
                }
                SelectionState::Unselected => {}
            }

            if let Some(over) = over.and_then(|key| doc.get(&key)) {
                drag_drop::highlight_target(doc, over);
            }
        });
    }
}

fn style_mutation(node: &NodeKey, property: &str, value: &str) -> Mutation {
    Mutation::SetStyle {
        node: node.clone(),
        property: property.to_string(),
        value: Some(value.to_string()),
    }
}

fn size_mutations(node: &NodeKey, width: f64, height: f64) -> [Mutation; 2] {
    [
        style_mutation(node, "width", &format!("{}px", width.round())),
        style_mutation(node, "height", &format!("{}px", height.round())),
    ]
}
