//! # Component Factory
//!
//! Maps a palette type tag to a fresh detached subtree. Templates carry
//! inline styles only, never classes, so pages render without the editor's
//! stylesheet.

use pagecraft_parser::fragment::{element, text, FragmentNode};
use pagecraft_parser::CONTAINER_ATTR;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentCategory {
    Basic,
    Layout,
    Section,
}

/// Palette entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComponentInfo {
    pub tag: &'static str,
    pub label: &'static str,
    pub category: ComponentCategory,
}

const CATALOG: &[ComponentInfo] = &[
    ComponentInfo { tag: "heading", label: "Heading", category: ComponentCategory::Basic },
    ComponentInfo { tag: "text", label: "Text", category: ComponentCategory::Basic },
    ComponentInfo { tag: "button", label: "Button", category: ComponentCategory::Basic },
    ComponentInfo { tag: "image", label: "Image", category: ComponentCategory::Basic },
    ComponentInfo { tag: "divider", label: "Divider", category: ComponentCategory::Layout },
    ComponentInfo { tag: "spacer", label: "Spacer", category: ComponentCategory::Layout },
    ComponentInfo { tag: "columns", label: "Columns", category: ComponentCategory::Layout },
    ComponentInfo { tag: "hero_header", label: "Hero Header", category: ComponentCategory::Section },
    ComponentInfo { tag: "features", label: "Features", category: ComponentCategory::Section },
    ComponentInfo { tag: "testimonial", label: "Testimonial", category: ComponentCategory::Section },
    ComponentInfo { tag: "call_to_action", label: "Call To Action", category: ComponentCategory::Section },
    ComponentInfo { tag: "contact_form", label: "Contact Form", category: ComponentCategory::Section },
    ComponentInfo { tag: "footer", label: "Footer", category: ComponentCategory::Section },
];

/// Every component the palette offers
pub fn catalog() -> &'static [ComponentInfo] {
    CATALOG
}

pub fn is_known(type_tag: &str) -> bool {
    CATALOG.iter().any(|info| info.tag == type_tag) || type_tag == "paragraph"
}

/// Build the subtree for a component type. Unknown tags yield a
/// placeholder block naming the component.
pub fn create(type_tag: &str) -> FragmentNode {
    match type_tag {
        "heading" => heading(),
        "text" | "paragraph" => paragraph(),
        "button" => button(),
        "image" => image(),
        "divider" => divider(),
        "spacer" => spacer(),
        "columns" => columns(),
        "hero_header" => hero_header(),
        "features" => features(),
        "testimonial" => testimonial(),
        "call_to_action" => call_to_action(),
        "contact_form" => contact_form(),
        "footer" => footer(),
        other => placeholder(other),
    }
}

/// "call_to_action" -> "Call To Action"
pub fn humanize(type_tag: &str) -> String {
    type_tag
        .split(|c: char| c == '_' || c == '-' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn heading() -> FragmentNode {
    element("h2")
        .with_styles(&[("font-size", "32px"), ("margin", "16px 0"), ("color", "#1a1a1a")])
        .with_text("Your Heading Here")
}

fn paragraph() -> FragmentNode {
    element("p")
        .with_styles(&[("font-size", "16px"), ("line-height", "1.6"), ("margin", "12px 0")])
        .with_text("Write your text here. Click to edit this paragraph.")
}

fn button_link(label: &str) -> FragmentNode {
    element("a")
        .with_attr("href", "#")
        .with_styles(&[
            ("display", "inline-block"),
            ("padding", "12px 28px"),
            ("background-color", "#4f46e5"),
            ("color", "#ffffff"),
            ("border-radius", "6px"),
            ("text-decoration", "none"),
            ("font-weight", "600"),
        ])
        .with_text(label)
}

fn button() -> FragmentNode {
    element("div")
        .with_styles(&[("text-align", "center"), ("padding", "16px 0")])
        .with_child(button_link("Click Me"))
}

fn image() -> FragmentNode {
    element("img")
        .with_attr("src", "https://placehold.co/800x400?text=Image")
        .with_attr("alt", "Image")
        .with_styles(&[("display", "block"), ("max-width", "100%"), ("height", "auto")])
}

fn divider() -> FragmentNode {
    element("hr").with_styles(&[
        ("border", "none"),
        ("border-top", "1px solid #e5e7eb"),
        ("margin", "24px 0"),
    ])
}

fn spacer() -> FragmentNode {
    element("div").with_styles(&[("height", "40px")])
}

fn column(label: &str) -> FragmentNode {
    element("div")
        .with_attr(CONTAINER_ATTR, "")
        .with_styles(&[("flex", "1"), ("padding", "16px"), ("min-height", "80px")])
        .with_child(element("p").with_text(label))
}

fn columns() -> FragmentNode {
    element("div")
        .with_styles(&[("display", "flex"), ("gap", "24px"), ("padding", "16px 0")])
        .with_child(column("Column 1"))
        .with_child(column("Column 2"))
}

fn section(background: &str) -> FragmentNode {
    element("section").with_styles(&[
        ("padding", "64px 24px"),
        ("background-color", background),
        ("text-align", "center"),
    ])
}

fn hero_header() -> FragmentNode {
    section("#f5f7ff").with_children([
        element("h1")
            .with_styles(&[("font-size", "48px"), ("margin", "0 0 16px")])
            .with_text("Welcome to Our Store"),
        element("p")
            .with_styles(&[("font-size", "20px"), ("color", "#4b5563"), ("margin", "0 0 32px")])
            .with_text("Discover products you will love."),
        button_link("Shop Now"),
    ])
}

fn feature(title: &str, body: &str) -> FragmentNode {
    element("div")
        .with_styles(&[("flex", "1"), ("padding", "16px")])
        .with_children([
            element("h3").with_styles(&[("font-size", "20px")]).with_text(title),
            element("p").with_styles(&[("color", "#6b7280")]).with_text(body),
        ])
}

fn features() -> FragmentNode {
    section("#ffffff").with_children([
        element("h2")
            .with_styles(&[("font-size", "32px"), ("margin", "0 0 32px")])
            .with_text("Why Choose Us"),
        element("div")
            .with_styles(&[("display", "flex"), ("gap", "24px")])
            .with_children([
                feature("Fast Shipping", "Orders ship within 24 hours."),
                feature("Quality Products", "Every item is checked by hand."),
                feature("Easy Returns", "30 days, no questions asked."),
            ]),
    ])
}

fn testimonial() -> FragmentNode {
    section("#f9fafb").with_children([
        element("blockquote")
            .with_styles(&[("font-size", "20px"), ("font-style", "italic"), ("margin", "0 0 16px")])
            .with_text("\"The best purchase I have made this year.\""),
        element("p")
            .with_styles(&[("font-weight", "600"), ("color", "#374151")])
            .with_text("Happy Customer"),
    ])
}

fn call_to_action() -> FragmentNode {
    section("#4f46e5").with_children([
        element("h2")
            .with_styles(&[("font-size", "32px"), ("color", "#ffffff"), ("margin", "0 0 16px")])
            .with_text("Ready to get started?"),
        element("p")
            .with_styles(&[("color", "#e0e7ff"), ("margin", "0 0 24px")])
            .with_text("Join thousands of satisfied customers today."),
        element("a")
            .with_attr("href", "#")
            .with_styles(&[
                ("display", "inline-block"),
                ("padding", "12px 28px"),
                ("background-color", "#ffffff"),
                ("color", "#4f46e5"),
                ("border-radius", "6px"),
                ("text-decoration", "none"),
                ("font-weight", "600"),
            ])
            .with_text("Get Started"),
    ])
}

fn form_field(input_type: &str, name: &str, placeholder: &str) -> FragmentNode {
    element("input")
        .with_attr("type", input_type)
        .with_attr("name", name)
        .with_attr("placeholder", placeholder)
        .with_styles(&[
            ("display", "block"),
            ("width", "100%"),
            ("padding", "10px"),
            ("margin", "0 0 12px"),
            ("border", "1px solid #d1d5db"),
            ("border-radius", "4px"),
        ])
}

fn contact_form() -> FragmentNode {
    section("#ffffff").with_children([
        element("h2")
            .with_styles(&[("font-size", "28px"), ("margin", "0 0 24px")])
            .with_text("Contact Us"),
        element("form")
            .with_styles(&[("max-width", "480px"), ("margin", "0 auto"), ("text-align", "left")])
            .with_children([
                form_field("text", "name", "Your name"),
                form_field("email", "email", "Your email"),
                element("textarea")
                    .with_attr("name", "message")
                    .with_attr("placeholder", "Your message")
                    .with_styles(&[
                        ("display", "block"),
                        ("width", "100%"),
                        ("min-height", "120px"),
                        ("padding", "10px"),
                        ("margin", "0 0 12px"),
                        ("border", "1px solid #d1d5db"),
                        ("border-radius", "4px"),
                    ]),
                element("button")
                    .with_attr("type", "submit")
                    .with_styles(&[
                        ("padding", "12px 28px"),
                        ("background-color", "#4f46e5"),
                        ("color", "#ffffff"),
                        ("border", "none"),
                        ("border-radius", "6px"),
                    ])
                    .with_text("Send Message"),
            ]),
    ])
}

fn footer() -> FragmentNode {
    element("footer")
        .with_styles(&[
            ("padding", "32px 24px"),
            ("background-color", "#111827"),
            ("color", "#9ca3af"),
            ("text-align", "center"),
            ("font-size", "14px"),
        ])
        .with_child(element("p").with_text("\u{a9} 2024 Your Store. All rights reserved."))
}

fn placeholder(type_tag: &str) -> FragmentNode {
    element("div")
        .with_styles(&[
            ("padding", "24px"),
            ("border", "2px dashed #d1d5db"),
            ("color", "#6b7280"),
            ("text-align", "center"),
        ])
        .with_child(text(humanize(type_tag)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_contains_click_me() {
        let button = create("button");
        assert_eq!(button.tag(), Some("div"));
        let link = &button.children()[0];
        assert_eq!(link.tag(), Some("a"));
        assert_eq!(link.attr("href"), Some("#"));
        assert_eq!(button.text_content(), "Click Me");
    }

    #[test]
    fn test_unknown_tag_uses_humanized_placeholder() {
        let node = create("pricing_table");
        assert_eq!(node.tag(), Some("div"));
        assert_eq!(node.text_content(), "Pricing Table");
        assert!(!is_known("pricing_table"));
    }

    #[test]
    fn test_every_catalog_entry_is_known() {
        for info in catalog() {
            assert!(is_known(info.tag), "{}", info.tag);
            let node = create(info.tag);
            assert!(node.tag().is_some());
            assert!(node.attr("class").is_none());
        }
    }

    #[test]
    fn test_create_is_pure() {
        assert_eq!(create("features"), create("features"));
    }

    #[test]
    fn test_columns_are_containers() {
        let node = create("columns");
        assert!(node
            .children()
            .iter()
            .all(|c| c.attr(CONTAINER_ATTR).is_some()));
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize("call_to_action"), "Call To Action");
        assert_eq!(humanize("hero-header"), "Hero Header");
        assert_eq!(humanize(""), "");
    }
}
