use super::{remove_present, set_style, PropertyEdit, RejectedValue};
use crate::mutations::Mutation;
use pagecraft_parser::{Element, NodeKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackgroundSize {
    #[default]
    Cover,
    Contain,
    Auto,
}

impl BackgroundSize {
    pub fn as_str(self) -> &'static str {
        match self {
            BackgroundSize::Cover => "cover",
            BackgroundSize::Contain => "contain",
            BackgroundSize::Auto => "auto",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackgroundPosition {
    #[default]
    Center,
    Top,
    Bottom,
    Left,
    Right,
}

impl BackgroundPosition {
    pub fn as_str(self) -> &'static str {
        match self {
            BackgroundPosition::Center => "center",
            BackgroundPosition::Top => "top",
            BackgroundPosition::Bottom => "bottom",
            BackgroundPosition::Left => "left",
            BackgroundPosition::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackgroundRepeat {
    #[default]
    NoRepeat,
    Repeat,
    RepeatX,
    RepeatY,
}

impl BackgroundRepeat {
    pub fn as_str(self) -> &'static str {
        match self {
            BackgroundRepeat::NoRepeat => "no-repeat",
            BackgroundRepeat::Repeat => "repeat",
            BackgroundRepeat::RepeatX => "repeat-x",
            BackgroundRepeat::RepeatY => "repeat-y",
        }
    }
}

fn parse_preset<T: Copy>(value: Option<&str>, all: &[T], as_str: fn(T) -> &'static str) -> Option<T> {
    let value = value?.trim();
    all.iter().copied().find(|p| as_str(*p) == value)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "property", content = "value", rename_all = "snake_case")]
pub enum BackgroundImageEdit {
    /// Remote URL or `data:` URL of an uploaded file
    Url(String),
    Size(BackgroundSize),
    Position(BackgroundPosition),
    Repeat(BackgroundRepeat),
    Remove,
}

impl PropertyEdit for BackgroundImageEdit {
    fn mutations(&self, node: &NodeKey, element: &Element) -> Result<Vec<Mutation>, RejectedValue> {
        Ok(match self {
            BackgroundImageEdit::Url(url) => {
                let url = url.trim();
                if url.is_empty() {
                    return Err(RejectedValue("an empty image URL".to_string()));
                }
                let style = element.style();
                let mut mutations =
                    remove_present(node, element, &["background", "background-color"]);
                mutations.push(set_style(node, "background-image", css_url(url)));
                if !style.contains("background-size") {
                    mutations.push(set_style(node, "background-size", BackgroundSize::default().as_str()));
                }
                if !style.contains("background-position") {
                    mutations.push(set_style(
                        node,
                        "background-position",
                        BackgroundPosition::default().as_str(),
                    ));
                }
                if !style.contains("background-repeat") {
                    mutations.push(set_style(
                        node,
                        "background-repeat",
                        BackgroundRepeat::default().as_str(),
                    ));
                }
                mutations
            }
            BackgroundImageEdit::Size(size) => vec![set_style(node, "background-size", size.as_str())],
            BackgroundImageEdit::Position(position) => {
                vec![set_style(node, "background-position", position.as_str())]
            }
            BackgroundImageEdit::Repeat(repeat) => {
                vec![set_style(node, "background-repeat", repeat.as_str())]
            }
            BackgroundImageEdit::Remove => remove_present(
                node,
                element,
                &[
                    "background-image",
                    "background-size",
                    "background-position",
                    "background-repeat",
                ],
            ),
        })
    }
}

/// What the background image panel shows for an element
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BackgroundImage {
    pub url: Option<String>,
    pub size: Option<BackgroundSize>,
    pub position: Option<BackgroundPosition>,
    pub repeat: Option<BackgroundRepeat>,
}

impl BackgroundImage {
    pub fn read(element: &Element) -> Self {
        let style = element.style();
        Self {
            url: style.get("background-image").and_then(parse_css_url),
            size: parse_preset(
                style.get("background-size"),
                &[BackgroundSize::Cover, BackgroundSize::Contain, BackgroundSize::Auto],
                BackgroundSize::as_str,
            ),
            position: parse_preset(
                style.get("background-position"),
                &[
                    BackgroundPosition::Center,
                    BackgroundPosition::Top,
                    BackgroundPosition::Bottom,
                    BackgroundPosition::Left,
                    BackgroundPosition::Right,
                ],
                BackgroundPosition::as_str,
            ),
            repeat: parse_preset(
                style.get("background-repeat"),
                &[
                    BackgroundRepeat::NoRepeat,
                    BackgroundRepeat::Repeat,
                    BackgroundRepeat::RepeatX,
                    BackgroundRepeat::RepeatY,
                ],
                BackgroundRepeat::as_str,
            ),
        }
    }
}

/// `url("...")` with quotes and backslashes escaped
pub fn css_url(url: &str) -> String {
    format!("url(\"{}\")", url.replace('\\', "\\\\").replace('"', "\\\""))
}

/// URL inside a `url(...)` value, quoted or not
pub fn parse_css_url(value: &str) -> Option<String> {
    let inner = value.trim().strip_prefix("url(")?.strip_suffix(')')?.trim();
    let unquoted = inner
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| inner.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(inner);
    if unquoted.is_empty() {
        return None;
    }
    Some(unquoted.replace("\\\"", "\"").replace("\\\\", "\\"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_sets_defaults_and_clears_color() {
        let key = NodeKey::new("k");
        let mut el = Element::new("section");
        el.set_attribute("style", "background-color: #fff; background-size: contain");

        let mutations = BackgroundImageEdit::Url("https://cdn.test/a.png".into()).mutations(&key, &el);
        assert_eq!(
            mutations,
            Ok(vec![
                super::super::remove_style(&key, "background-color"),
                set_style(&key, "background-image", "url(\"https://cdn.test/a.png\")"),
                set_style(&key, "background-position", "center"),
                set_style(&key, "background-repeat", "no-repeat"),
            ])
        );
    }

    #[test]
    fn test_blank_url_is_rejected() {
        let el = Element::new("div");
        assert!(BackgroundImageEdit::Url("  ".into())
            .mutations(&NodeKey::new("k"), &el)
            .is_err());
    }

    #[test]
    fn test_remove_without_image_is_empty() {
        let el = Element::new("div");
        assert_eq!(
            BackgroundImageEdit::Remove.mutations(&NodeKey::new("k"), &el),
            Ok(Vec::new())
        );
    }

    #[test]
    fn test_read_presets() {
        let mut el = Element::new("div");
        el.set_attribute(
            "style",
            "background-image: url('data:image/png;base64,AAAA'); background-size: auto; background-repeat: repeat-x",
        );
        let image = BackgroundImage::read(&el);
        assert_eq!(image.url.as_deref(), Some("data:image/png;base64,AAAA"));
        assert_eq!(image.size, Some(BackgroundSize::Auto));
        assert_eq!(image.repeat, Some(BackgroundRepeat::RepeatX));
        assert_eq!(image.position, None);
    }

    #[test]
    fn test_css_url_escaping() {
        let url = r#"a"b.png"#;
        assert_eq!(parse_css_url(&css_url(url)).as_deref(), Some(url));
    }
}
