use super::{remove_style, set_style, PropertyEdit, RejectedValue, Rgba};
use crate::mutations::Mutation;
use pagecraft_parser::{Element, NodeKey};
use serde::{Deserialize, Serialize};

/// Font sizes offered by the typography panel, in pixels
pub const FONT_SIZES: [u32; 13] = [12, 14, 16, 18, 20, 24, 28, 32, 36, 40, 48, 56, 64];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "left" => Some(TextAlign::Left),
            "center" => Some(TextAlign::Center),
            "right" => Some(TextAlign::Right),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "property", content = "value", rename_all = "snake_case")]
pub enum TypographyEdit {
    FontSize(u32),
    ToggleBold,
    ToggleItalic,
    ToggleUnderline,
    Color(Rgba),
    Align(TextAlign),
}

impl PropertyEdit for TypographyEdit {
    fn mutations(&self, node: &NodeKey, element: &Element) -> Result<Vec<Mutation>, RejectedValue> {
        let current = Typography::read(element);
        Ok(match self {
            TypographyEdit::FontSize(size) => {
                if !FONT_SIZES.contains(size) {
                    return Err(RejectedValue(format!("{}px", size)));
                }
                vec![set_style(node, "font-size", format!("{}px", size))]
            }
            TypographyEdit::ToggleBold => vec![if current.bold && is_bold_tag(&element.tag) {
                set_style(node, "font-weight", "normal")
            } else if current.bold {
                remove_style(node, "font-weight")
            } else {
                set_style(node, "font-weight", "bold")
            }],
            TypographyEdit::ToggleItalic => vec![if current.italic {
                remove_style(node, "font-style")
            } else {
                set_style(node, "font-style", "italic")
            }],
            TypographyEdit::ToggleUnderline => vec![if current.underline {
                remove_style(node, "text-decoration")
            } else {
                set_style(node, "text-decoration", "underline")
            }],
            TypographyEdit::Color(color) => vec![set_style(node, "color", color.to_css())],
            TypographyEdit::Align(align) => vec![set_style(node, "text-align", align.as_str())],
        })
    }
}

fn is_bold_tag(tag: &str) -> bool {
    matches!(tag, "b" | "strong" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// What the typography panel shows for an element
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    pub font_size: Option<u32>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: Option<Rgba>,
    pub align: Option<TextAlign>,
}

impl Typography {
    pub fn read(element: &Element) -> Self {
        let style = element.style();
        let bold = match style.get("font-weight") {
            Some("bold") | Some("bolder") => true,
            Some(weight) => weight.parse::<u32>().map(|w| w >= 600).unwrap_or(false),
            None => is_bold_tag(&element.tag),
        };

        Self {
            font_size: style
                .get("font-size")
                .and_then(|v| v.strip_suffix("px"))
                .and_then(|v| v.trim().parse::<f64>().ok())
                .map(|v| v.round() as u32),
            bold,
            italic: style.get("font-style") == Some("italic"),
            underline: style
                .get("text-decoration")
                .map(|v| v.contains("underline"))
                .unwrap_or(false),
            color: style.get("color").and_then(Rgba::parse),
            align: style.get("text-align").and_then(TextAlign::parse),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(style: &str) -> Element {
        let mut el = Element::new("p");
        el.set_attribute("style", style);
        el
    }

    #[test]
    fn test_font_size_only_from_set() {
        let key = NodeKey::new("k");
        let el = element("");
        assert_eq!(
            TypographyEdit::FontSize(24).mutations(&key, &el),
            Ok(vec![set_style(&key, "font-size", "24px")])
        );
        assert_eq!(
            TypographyEdit::FontSize(23).mutations(&key, &el),
            Err(RejectedValue("23px".to_string()))
        );
    }

    #[test]
    fn test_toggles_flip_current_state() {
        let key = NodeKey::new("k");
        assert_eq!(
            TypographyEdit::ToggleBold.mutations(&key, &element("font-weight: 700")),
            Ok(vec![remove_style(&key, "font-weight")])
        );
        assert_eq!(
            TypographyEdit::ToggleItalic.mutations(&key, &element("")),
            Ok(vec![set_style(&key, "font-style", "italic")])
        );
        assert_eq!(
            TypographyEdit::ToggleUnderline.mutations(&key, &element("text-decoration: underline")),
            Ok(vec![remove_style(&key, "text-decoration")])
        );
    }

    #[test]
    fn test_read() {
        let typography =
            Typography::read(&element("font-size: 18px; color: #333; text-align: center"));
        assert_eq!(typography.font_size, Some(18));
        assert_eq!(typography.color, Some(Rgba::opaque(0x33, 0x33, 0x33)));
        assert_eq!(typography.align, Some(TextAlign::Center));
        assert!(!typography.bold);
    }

    #[test]
    fn test_edit_json() {
        let edit: TypographyEdit =
            serde_json::from_str(r#"{ "property": "align", "value": "right" }"#).unwrap();
        assert_eq!(edit, TypographyEdit::Align(TextAlign::Right));
        let toggle: TypographyEdit =
            serde_json::from_str(r#"{ "property": "toggle_bold" }"#).unwrap();
        assert_eq!(toggle, TypographyEdit::ToggleBold);
    }
}
