//! Browser tests for the wasm bindings.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

#![cfg(target_arch = "wasm32")]

use pagecraft_wasm::WasmEditor;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn editor(html: &str) -> WasmEditor {
    let mut editor = WasmEditor::new("web-test", "").unwrap();
    editor.load(html, "").unwrap();
    editor
}

#[wasm_bindgen_test]
fn test_bad_config_is_a_js_error() {
    let err = WasmEditor::new("web-test", "{ not json").err().unwrap();
    assert!(err.as_string().is_some());
}

#[wasm_bindgen_test]
fn test_unknown_move_position_is_rejected() {
    let mut editor = editor("<p>A</p><p>B</p>");
    let keys = editor.query("p");

    let err = editor.move_node(&keys[0], &keys[1], "sideways").unwrap_err();
    assert_eq!(err.as_string().as_deref(), Some("Unknown position 'sideways'"));
    assert!(editor.move_node(&keys[0], &keys[1], "after").unwrap());
    assert_eq!(editor.html(), "<p>B</p><p>A</p>");
}

#[wasm_bindgen_test]
fn test_resize_cancel_from_host() {
    let mut editor = editor("<div>Box</div>");
    let div = editor.query("div")[0].clone();
    editor.set_layout(&div, 0.0, 0.0, 400.0, 200.0);
    editor.select(&div).unwrap();

    let handle = editor.query("[data-pc-handle=se]")[0].clone();
    assert!(editor.begin_resize(&handle, 400.0, 200.0));
    assert_eq!(editor.update_resize(300.0, 100.0).unwrap(), vec![300.0, 100.0]);
    assert!(editor.cancel_resize().unwrap());

    assert!(editor.properties().unwrap().contains(r#""width":"""#));
    assert_eq!(editor.html(), "<div>Box</div>");
    assert!(!editor.can_undo());
}

#[wasm_bindgen_test]
fn test_selecting_an_image_keeps_handles_beside_it() {
    let mut editor = editor(r#"<img src="a.png"><p>x</p>"#);
    let img = editor.query("img")[0].clone();
    editor.set_layout(&img, 0.0, 0.0, 120.0, 80.0);
    editor.select(&img).unwrap();

    let overlay = format!(r#"[data-pc-for="{}"]"#, img);
    assert_eq!(editor.query(&overlay).len(), 1);
    assert_eq!(editor.html(), r#"<img src="a.png"><p>x</p>"#);
}
