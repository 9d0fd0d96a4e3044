use pagecraft_editor::{
    ClickOutcome, DragPayload, EditorConfig, EditorSession, HeadlessSurface, HostClock,
    InsertPosition, Key, KeyInput, NodeKey, PagePayload, Point, PropertyChange, Rect,
    RenderSurface, SaveKind, SelectionState, UploadedFile,
};
use pagecraft_parser::serialize_live;
use serde::Serialize;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

#[derive(Serialize)]
struct SavedPage {
    kind: SaveKind,
    payload: PagePayload,
}

/// Editing session driven by the page hosting the canvas.
///
/// The host renders `liveHtml()` into its frame, reports element boxes with
/// `setLayout`, forwards pointer and keyboard events, and calls `tick(now)`
/// from a timer. Saved payloads are collected with `takeSaves()`.
#[wasm_bindgen]
pub struct WasmEditor {
    session: EditorSession<HeadlessSurface>,
    clock: HostClock,
    saves: Rc<RefCell<Vec<SavedPage>>>,
}

#[wasm_bindgen]
impl WasmEditor {
    /// `config_json` may be empty for the default configuration
    #[wasm_bindgen(constructor)]
    pub fn new(seed: &str, config_json: &str) -> Result<WasmEditor, JsValue> {
        let config: EditorConfig = if config_json.trim().is_empty() {
            EditorConfig::default()
        } else {
            serde_json::from_str(config_json).map_err(js_error)?
        };

        let clock = HostClock::new();
        let saves: Rc<RefCell<Vec<SavedPage>>> = Rc::default();
        let sink = saves.clone();
        let session = EditorSession::new(HeadlessSurface::new(seed), config, Box::new(clock.clone()))
            .with_sink(move |payload: &PagePayload, kind: SaveKind| {
                sink.borrow_mut().push(SavedPage {
                    kind,
                    payload: payload.clone(),
                });
            });

        Ok(WasmEditor { session, clock, saves })
    }

    pub fn load(&mut self, html: &str, css: &str) -> Result<(), JsValue> {
        self.session.load(html, css).map_err(js_error)
    }

    #[wasm_bindgen(js_name = loadPayload)]
    pub fn load_payload(&mut self, payload_json: &str) -> Result<(), JsValue> {
        let payload = PagePayload::from_json(payload_json).map_err(js_error)?;
        self.session.load_payload(&payload).map_err(js_error)
    }

    // ------------------------------------------------------------------
    // Layout and time
    // ------------------------------------------------------------------

    #[wasm_bindgen(js_name = setLayout)]
    pub fn set_layout(&mut self, key: &str, x: f64, y: f64, width: f64, height: f64) {
        self.session
            .surface_mut()
            .set_layout(NodeKey::new(key), Rect::new(x, y, width, height));
    }

    #[wasm_bindgen(js_name = clearLayout)]
    pub fn clear_layout(&mut self) {
        self.session.surface_mut().clear_layout();
    }

    /// Advance the clock and run due debounced work. Returns what fired.
    pub fn tick(&mut self, now_ms: f64) -> Result<String, JsValue> {
        self.clock.set(now_ms.max(0.0) as u64);
        let report = self.session.tick();
        to_json(&json!({
            "outline": report.outline,
            "history": report.history,
            "saved": report.saved,
        }))
    }

    // ------------------------------------------------------------------
    // Pointer and keyboard
    // ------------------------------------------------------------------

    /// Click on an element key, or on empty canvas when `key` is absent
    pub fn click(&mut self, key: Option<String>) -> Result<String, JsValue> {
        let key = key.map(NodeKey::new);
        let outcome = self.session.click(key.as_ref());
        to_json(&outcome)
    }

    #[wasm_bindgen(js_name = clickAt)]
    pub fn click_at(&mut self, x: f64, y: f64) -> Result<String, JsValue> {
        let outcome: ClickOutcome = self.session.click_at(Point::new(x, y));
        to_json(&outcome)
    }

    #[wasm_bindgen(js_name = doubleClick)]
    pub fn double_click(&mut self, key: &str) -> Result<bool, JsValue> {
        self.session
            .double_click(Some(&NodeKey::new(key)))
            .map_err(js_error)
    }

    /// `key` is a DOM `KeyboardEvent.key` value
    #[wasm_bindgen(js_name = keyDown)]
    pub fn key_down(&mut self, key: &str, shift: bool, modifier: bool) -> bool {
        let key = match key {
            "Enter" => Key::Enter,
            "Escape" => Key::Escape,
            "Delete" => Key::Delete,
            "Backspace" => Key::Backspace,
            _ => Key::Other,
        };
        self.session.key_down(KeyInput { key, shift, modifier })
    }

    pub fn select(&mut self, key: &str) -> Result<(), JsValue> {
        self.session.select(&NodeKey::new(key)).map_err(js_error)
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) -> bool {
        self.session.clear_selection()
    }

    // ------------------------------------------------------------------
    // Inline editing and deletion
    // ------------------------------------------------------------------

    /// Content emitted by the rich-text toolbar for the edited element
    #[wasm_bindgen(js_name = textInput)]
    pub fn text_input(&mut self, html: &str) -> Result<bool, JsValue> {
        self.session.text_input(html).map_err(js_error)
    }

    #[wasm_bindgen(js_name = commitEdit)]
    pub fn commit_edit(&mut self) -> bool {
        self.session.commit_edit()
    }

    #[wasm_bindgen(js_name = requestDelete)]
    pub fn request_delete(&mut self) -> bool {
        self.session.request_delete()
    }

    #[wasm_bindgen(js_name = resolveDelete)]
    pub fn resolve_delete(&mut self, confirmed: bool) -> Result<bool, JsValue> {
        self.session.resolve_delete(confirmed).map_err(js_error)
    }

    // ------------------------------------------------------------------
    // Drag and drop
    // ------------------------------------------------------------------

    #[wasm_bindgen(js_name = beginPaletteDrag)]
    pub fn begin_palette_drag(&mut self, component: &str) -> bool {
        self.session.begin_drag(DragPayload::palette(component))
    }

    #[wasm_bindgen(js_name = beginCanvasDrag)]
    pub fn begin_canvas_drag(&mut self, x: f64, y: f64, modifier: bool) -> bool {
        self.session.begin_drag_at(Point::new(x, y), modifier)
    }

    #[wasm_bindgen(js_name = dragOver)]
    pub fn drag_over(&mut self, x: f64, y: f64) {
        self.session.drag_over(Point::new(x, y));
    }

    #[wasm_bindgen(js_name = dragLeave)]
    pub fn drag_leave(&mut self) {
        self.session.drag_leave();
    }

    pub fn drop(&mut self, x: f64, y: f64) -> Result<bool, JsValue> {
        self.session.drop(Point::new(x, y)).map_err(js_error)
    }

    #[wasm_bindgen(js_name = cancelDrag)]
    pub fn cancel_drag(&mut self) {
        self.session.cancel_drag();
    }

    /// Reorder from the outline. `position` is `before`, `after` or `inside`.
    #[wasm_bindgen(js_name = moveNode)]
    pub fn move_node(&mut self, node: &str, anchor: &str, position: &str) -> Result<bool, JsValue> {
        let position = match position {
            "before" => InsertPosition::Before,
            "after" => InsertPosition::After,
            "inside" => InsertPosition::Inside,
            other => return Err(JsValue::from_str(&format!("Unknown position '{}'", other))),
        };
        self.session
            .move_in_outline(&NodeKey::new(node), &NodeKey::new(anchor), position)
            .map_err(js_error)
    }

    // ------------------------------------------------------------------
    // Resize
    // ------------------------------------------------------------------

    /// Pointer down on a resize handle element
    #[wasm_bindgen(js_name = beginResize)]
    pub fn begin_resize(&mut self, handle_key: &str, x: f64, y: f64) -> bool {
        self.session
            .begin_resize_at(&NodeKey::new(handle_key), Point::new(x, y))
    }

    /// Live `[width, height]`, empty when no resize is running
    #[wasm_bindgen(js_name = updateResize)]
    pub fn update_resize(&mut self, x: f64, y: f64) -> Result<Vec<f64>, JsValue> {
        let size = self
            .session
            .update_resize(Point::new(x, y))
            .map_err(js_error)?;
        Ok(size.map(|(w, h)| vec![w, h]).unwrap_or_default())
    }

    /// Drop the running resize (focus loss) and restore the start size
    #[wasm_bindgen(js_name = cancelResize)]
    pub fn cancel_resize(&mut self) -> Result<bool, JsValue> {
        self.session.cancel_resize().map_err(js_error)
    }

    #[wasm_bindgen(js_name = endResize)]
    pub fn end_resize(&mut self, x: f64, y: f64) -> Result<bool, JsValue> {
        self.session.end_resize(Point::new(x, y)).map_err(js_error)
    }

    // ------------------------------------------------------------------
    // Properties and uploads
    // ------------------------------------------------------------------

    /// Current values for the property panels, `null` without a selection
    pub fn properties(&self) -> Result<String, JsValue> {
        to_json(&self.session.properties())
    }

    #[wasm_bindgen(js_name = applyProperty)]
    pub fn apply_property(&mut self, change_json: &str) -> Result<bool, JsValue> {
        let change: PropertyChange = serde_json::from_str(change_json).map_err(js_error)?;
        self.session.apply_property(&change).map_err(js_error)
    }

    #[wasm_bindgen(js_name = setUploadLimit)]
    pub fn set_upload_limit(&mut self, max_size_mb: f64) {
        self.session.set_upload_limit(max_size_mb);
    }

    #[wasm_bindgen(js_name = replaceImage)]
    pub fn replace_image(&mut self, name: &str, mime_type: &str, bytes: Vec<u8>) -> Result<bool, JsValue> {
        let file = UploadedFile::new(name, mime_type, bytes);
        self.session.replace_image(&file).map_err(js_error)
    }

    #[wasm_bindgen(js_name = uploadBackgroundImage)]
    pub fn upload_background_image(
        &mut self,
        name: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<bool, JsValue> {
        let file = UploadedFile::new(name, mime_type, bytes);
        self.session.upload_background_image(&file).map_err(js_error)
    }

    // ------------------------------------------------------------------
    // History and saving
    // ------------------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        self.session.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.session.redo()
    }

    pub fn reset(&mut self) -> bool {
        self.session.reset()
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.session.can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.session.can_redo()
    }

    /// Manual save; the payload is also queued for `takeSaves()`
    pub fn save(&mut self) -> Result<String, JsValue> {
        let payload = self.session.save();
        to_json(&payload)
    }

    /// Saved payloads since the last call, oldest first
    #[wasm_bindgen(js_name = takeSaves)]
    pub fn take_saves(&mut self) -> Result<String, JsValue> {
        let saves = std::mem::take(&mut *self.saves.borrow_mut());
        to_json(&saves)
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// Canonical HTML, free of editor artifacts
    pub fn html(&self) -> String {
        self.session.html().to_string()
    }

    /// Markup for the canvas frame, with element keys and decorations
    #[wasm_bindgen(js_name = liveHtml)]
    pub fn live_html(&self) -> String {
        serialize_live(self.session.surface().document())
    }

    pub fn outline(&self) -> Result<String, JsValue> {
        to_json(self.session.outline())
    }

    #[wasm_bindgen(js_name = toggleOutline)]
    pub fn toggle_outline(&mut self, key: &str) -> bool {
        self.session.toggle_outline(&NodeKey::new(key))
    }

    #[wasm_bindgen(js_name = isExpanded)]
    pub fn is_expanded(&self, key: &str) -> bool {
        self.session.is_expanded(&NodeKey::new(key))
    }

    #[wasm_bindgen(js_name = expandAll)]
    pub fn expand_all(&mut self) {
        self.session.expand_all();
    }

    #[wasm_bindgen(js_name = collapseAll)]
    pub fn collapse_all(&mut self) {
        self.session.collapse_all();
    }

    pub fn payload(&self) -> Result<String, JsValue> {
        to_json(&self.session.pipeline().payload())
    }

    pub fn selection(&self) -> Result<String, JsValue> {
        let selection = self.session.selection();
        let value = match selection.state() {
            SelectionState::Unselected => json!({ "state": "unselected" }),
            SelectionState::Selected { node } => json!({ "state": "selected", "node": node }),
            SelectionState::Editing { node } => json!({ "state": "editing", "node": node }),
        };
        to_json(&json!({ "version": selection.version(), "selection": value }))
    }

    /// Notices raised since the last call
    pub fn notices(&mut self) -> Result<String, JsValue> {
        to_json(&self.session.drain_notices())
    }

    pub fn components(&self) -> Result<String, JsValue> {
        to_json(pagecraft_editor::components::catalog())
    }

    /// Keys of elements matching a simple selector
    pub fn query(&self, selector: &str) -> Vec<String> {
        self.session
            .surface()
            .query(selector)
            .into_iter()
            .map(|key| key.as_str().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editor(html: &str) -> WasmEditor {
        let mut editor = WasmEditor::new("wasm-test", "").unwrap();
        editor.load(html, "").unwrap();
        editor
    }

    #[test]
    fn test_palette_drop_and_undo() {
        let mut editor = editor("");
        assert!(editor.begin_palette_drag("heading"));
        assert!(editor.drop(0.0, 0.0).unwrap());
        assert!(editor.html().starts_with("<h2"));
        assert!(editor.notices().unwrap().contains("Component added"));

        assert!(editor.undo());
        assert_eq!(editor.html(), "");
    }

    #[test]
    fn test_live_html_carries_keys() {
        let mut editor = editor("<section><p>Hi</p></section>");
        let p = editor.query("p")[0].clone();
        editor.click(Some(p.clone())).unwrap();

        let live = editor.live_html();
        assert!(live.contains(&p));
        assert!(live.contains("pc-selected"));
        assert_eq!(editor.html(), "<section><p>Hi</p></section>");
        assert!(editor.selection().unwrap().contains("\"selected\""));
    }

    #[test]
    fn test_autosave_is_collected() {
        let mut editor = editor("<p>a</p>");
        editor.begin_palette_drag("divider");
        editor.drop(0.0, 0.0).unwrap();

        assert!(editor.tick(2500.0).unwrap().contains("\"saved\":true"));
        let saves = editor.take_saves().unwrap();
        assert!(saves.contains("\"kind\":\"auto\""));
        assert_eq!(editor.take_saves().unwrap(), "[]");
    }

    #[test]
    fn test_key_names() {
        let mut editor = editor("<p>a</p>");
        let p = editor.query("p")[0].clone();
        editor.select(&p).unwrap();
        assert!(editor.key_down("Escape", false, false));
        assert!(!editor.key_down("a", false, false));
    }
}
