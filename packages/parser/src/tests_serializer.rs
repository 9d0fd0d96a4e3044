/// Tests to verify the serializer reproduces page markup
use crate::ast::{InsertPosition, CONTROL_ATTR, KEY_ATTR};
use crate::fragment::element;
use crate::*;

#[test]
fn test_roundtrip_canonical_markup() {
    let sources = vec![
        r#"<section style="padding: 40px;"><h1>Title</h1><p>Body text</p></section>"#,
        r#"<div class="row"><img src="a.png" alt="A"><hr></div>"#,
        r#"<p>Fish &amp; Chips &lt;3</p>"#,
        r#"<a href="/x?a=1&amp;b=2" title="say &quot;hi&quot;">link</a>"#,
        r#"<!-- kept --><footer>Footer</footer>"#,
        r#"<style>.a > .b { color: red; }</style><p>x</p>"#,
        "<p>line one\n  line two</p>",
    ];

    for source in sources {
        let doc = parse(source).unwrap_or_else(|e| panic!("Failed to parse {}: {}", source, e));
        let serialized = serialize(&doc);
        assert_eq!(serialized, source, "round trip changed markup");

        let reparsed = parse(&serialized).unwrap();
        assert_eq!(serialize(&reparsed), serialized);
    }
}

#[test]
fn test_normalizes_case_and_quotes() {
    let doc = parse("<DIV CLASS=hero data-x='1'><BR></DIV>").unwrap();
    assert_eq!(serialize(&doc), r#"<div class="hero" data-x="1"><br></div>"#);
}

#[test]
fn test_canonical_output_strips_editor_artifacts() {
    let mut doc = parse(r#"<section class="hero"><p>Hello</p></section>"#).unwrap();
    let section = doc.element_children(doc.root())[0];
    let p = doc.element_children(section)[0];

    doc.element_mut(section).unwrap().add_class("pc-selected");
    doc.element_mut(p).unwrap().begin_inline_edit();
    doc.insert_fragment_at(
        section,
        InsertPosition::Inside,
        &element("div")
            .with_attr(CONTROL_ATTR, "handles")
            .with_child(element("div").with_attr(CONTROL_ATTR, "handle-nw"))
            .with_text("Move"),
    )
    .unwrap();

    let canonical = serialize(&doc);
    assert_eq!(canonical, r#"<section class="hero"><p>Hello</p></section>"#);

    // The stripped copy serializes identically in either mode
    let stripped = doc.strip_editor_artifacts();
    assert_eq!(serialize(&stripped), canonical);
    assert_eq!(
        Serializer::with_options(SerializeOptions {
            include_keys: false,
            strip_editor_artifacts: false,
            pretty: false,
        })
        .serialize(&stripped),
        canonical
    );
}

#[test]
fn test_page_attributes_like_editor_markers_survive() {
    let source = r#"<div class="pc-grid hero" draggable="true" contenteditable="false">a</div>"#;
    let mut doc = parse(source).unwrap();
    assert_eq!(serialize(&doc), source);

    // Editing the element in place and finishing leaves it as it was
    let div = doc.element_children(doc.root())[0];
    doc.element_mut(div).unwrap().add_class("pc-selected");
    doc.element_mut(div).unwrap().begin_inline_edit();
    assert_eq!(doc.element(div).unwrap().attribute("contenteditable"), Some("true"));
    assert_eq!(serialize(&doc), source);

    doc.element_mut(div).unwrap().end_inline_edit();
    assert_eq!(doc.element(div).unwrap().attribute("contenteditable"), Some("false"));
    assert_eq!(serialize(&doc.strip_editor_artifacts()), source);
}

#[test]
fn test_live_output_carries_keys() {
    let doc = parse("<section><p>Hi</p></section>").unwrap();
    let section = doc.element_children(doc.root())[0];
    let key = doc.key(section).unwrap().clone();

    let live = serialize_live(&doc);
    assert!(live.contains(&format!(r#"{}="{}""#, KEY_ATTR, key)));

    // Keys survive a trip through a surface
    let reparsed = parse(&live).unwrap();
    assert_eq!(reparsed.get(&key).and_then(|n| reparsed.tag_name(n)), Some("section"));
    assert_eq!(serialize(&reparsed), "<section><p>Hi</p></section>");
}

#[test]
fn test_serialize_node_and_inner_html() {
    let doc = parse(r#"<div class="card"><h2>Title</h2><p>Text</p></div>"#).unwrap();
    let card = doc.element_children(doc.root())[0];

    let mut serializer = Serializer::new();
    assert_eq!(
        serializer.serialize_node(&doc, card),
        r#"<div class="card"><h2>Title</h2><p>Text</p></div>"#
    );
    assert_eq!(serializer.inner_html(&doc, card), "<h2>Title</h2><p>Text</p>");
}

#[test]
fn test_pretty_output() {
    let doc = parse("<section><h1>Title</h1><p>Body</p></section>").unwrap();
    let pretty = Serializer::with_options(SerializeOptions::canonical().pretty()).serialize(&doc);
    assert_eq!(
        pretty,
        "<section>\n  <h1>\n    Title\n  </h1>\n  <p>\n    Body\n  </p>\n</section>"
    );
}
