//! Solid and gradient backgrounds.
//!
//! An element shows at most one background kind. Choosing a mode removes
//! the properties every other mode writes, so switching from a gradient to a
//! solid color leaves no `background-image` behind and vice versa.

use super::{remove_present, set_style, PropertyEdit, RejectedValue};
use crate::mutations::Mutation;
use pagecraft_parser::style::split_top_level;
use pagecraft_parser::{Element, NodeKey};
use serde::{Deserialize, Serialize};

/// Every property a background mode may write
const BACKGROUND_PROPERTIES: &[&str] = &[
    "background",
    "background-color",
    "background-image",
    "background-size",
    "background-position",
    "background-repeat",
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity 0.0 to 1.0
    pub a: f64,
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self {
            r,
            g,
            b,
            a: a.clamp(0.0, 1.0),
        }
    }

    pub fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(...)`, `rgba(...)` or
    /// `transparent`
    pub fn parse(source: &str) -> Option<Self> {
        let source = source.trim().to_ascii_lowercase();
        if source == "transparent" {
            return Some(Self::new(0, 0, 0, 0.0));
        }
        if let Some(hex) = source.strip_prefix('#') {
            return parse_hex(hex);
        }

        let inner = source
            .strip_prefix("rgba(")
            .or_else(|| source.strip_prefix("rgb("))?
            .strip_suffix(')')?;
        let parts: Vec<&str> = inner
            .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
            .filter(|p| !p.is_empty())
            .collect();

        let channel = |s: &str| s.parse::<f64>().ok().map(|v| v.round().clamp(0.0, 255.0) as u8);
        match parts.as_slice() {
            [r, g, b] => Some(Self::opaque(channel(r)?, channel(g)?, channel(b)?)),
            [r, g, b, a] => {
                let alpha = match a.strip_suffix('%') {
                    Some(pct) => pct.parse::<f64>().ok()? / 100.0,
                    None => a.parse::<f64>().ok()?,
                };
                Some(Self::new(channel(r)?, channel(g)?, channel(b)?, alpha))
            }
            _ => None,
        }
    }

    /// Hex when opaque, `rgba()` otherwise
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, round2(self.a))
        }
    }
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |s: &str| u8::from_str_radix(s, 16).ok();
    let nibble = |c: &str| byte(&c.repeat(2));
    match hex.len() {
        3 => Some(Rgba::opaque(nibble(&hex[0..1])?, nibble(&hex[1..2])?, nibble(&hex[2..3])?)),
        6 => Some(Rgba::opaque(byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?)),
        8 => Some(Rgba::new(
            byte(&hex[0..2])?,
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
            f64::from(byte(&hex[6..8])?) / 255.0,
        )),
        _ => None,
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub id: String,
    pub color: Rgba,
    /// 0 to 100
    pub position: f64,
}

impl GradientStop {
    pub fn new(id: impl Into<String>, color: Rgba, position: f64) -> Self {
        Self {
            id: id.into(),
            color,
            position: position.clamp(0.0, 100.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientKind {
    Linear,
    Radial,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    pub kind: GradientKind,
    /// Degrees, 0 to 360. Ignored for radial gradients.
    pub angle: f64,
    pub stops: Vec<GradientStop>,
}

impl Default for Gradient {
    fn default() -> Self {
        Self {
            kind: GradientKind::Linear,
            angle: 90.0,
            stops: vec![
                GradientStop::new("stop-1", Rgba::opaque(0x66, 0x7e, 0xea), 0.0),
                GradientStop::new("stop-2", Rgba::opaque(0x76, 0x4b, 0xa2), 100.0),
            ],
        }
    }
}

impl Gradient {
    pub fn new(kind: GradientKind, angle: f64, stops: Vec<GradientStop>) -> Self {
        let mut gradient = Self { kind, angle, stops };
        gradient.normalize();
        gradient
    }

    /// Clamp the angle and positions, order stops by position
    pub fn normalize(&mut self) {
        self.angle = self.angle.clamp(0.0, 360.0);
        for stop in &mut self.stops {
            stop.position = stop.position.clamp(0.0, 100.0);
        }
        self.stops
            .sort_by(|a, b| a.position.total_cmp(&b.position));
    }

    pub fn add_stop(&mut self, color: Rgba, position: f64) -> &GradientStop {
        let mut n = self.stops.len() + 1;
        while self.stops.iter().any(|s| s.id == format!("stop-{}", n)) {
            n += 1;
        }
        let id = format!("stop-{}", n);
        self.stops.push(GradientStop::new(id.clone(), color, position));
        self.normalize();
        let index = self.stops.iter().position(|s| s.id == id).unwrap_or(0);
        &self.stops[index]
    }

    /// Remove a stop, keeping at least two
    pub fn remove_stop(&mut self, id: &str) -> bool {
        if self.stops.len() <= 2 {
            return false;
        }
        let before = self.stops.len();
        self.stops.retain(|s| s.id != id);
        self.stops.len() != before
    }

    pub fn to_css(&self) -> String {
        let stops = self
            .stops
            .iter()
            .map(|s| format!("{} {}%", s.color.to_css(), round2(s.position)))
            .collect::<Vec<_>>()
            .join(", ");
        match self.kind {
            GradientKind::Linear => format!("linear-gradient({}deg, {})", round2(self.angle), stops),
            GradientKind::Radial => format!("radial-gradient(circle, {})", stops),
        }
    }

    /// Parse a `linear-gradient(...)` or `radial-gradient(...)` value.
    /// Stops without a position are spread evenly.
    pub fn parse(source: &str) -> Option<Self> {
        let source = source.trim();
        let (kind, inner) = if let Some(rest) = source.strip_prefix("linear-gradient(") {
            (GradientKind::Linear, rest)
        } else if let Some(rest) = source.strip_prefix("radial-gradient(") {
            (GradientKind::Radial, rest)
        } else {
            return None;
        };
        let inner = inner.strip_suffix(')')?;

        let mut args = split_top_level(inner, ',').into_iter().map(str::trim).peekable();
        let mut angle = 180.0;
        if let Some(&first) = args.peek() {
            if let Some(deg) = first.strip_suffix("deg") {
                angle = deg.trim().parse().ok()?;
                args.next();
            } else if kind == GradientKind::Radial && parse_stop(first).is_none() {
                args.next();
            }
        }

        let parsed: Vec<(Rgba, Option<f64>)> = args.map(parse_stop).collect::<Option<_>>()?;
        if parsed.len() < 2 {
            return None;
        }
        let last = (parsed.len() - 1) as f64;
        let stops = parsed
            .into_iter()
            .enumerate()
            .map(|(i, (color, position))| {
                let position = position.unwrap_or(i as f64 / last * 100.0);
                GradientStop::new(format!("stop-{}", i + 1), color, position)
            })
            .collect();

        Some(Self::new(kind, angle, stops))
    }
}

fn parse_stop(source: &str) -> Option<(Rgba, Option<f64>)> {
    let source = source.trim();
    if let Some(color) = Rgba::parse(source) {
        return Some((color, None));
    }
    let (color, position) = source.rsplit_once(char::is_whitespace)?;
    let position = position.strip_suffix('%')?.parse::<f64>().ok()?;
    Some((Rgba::parse(color)?, Some(position)))
}

/// Change of background mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum BackgroundEdit {
    Solid { color: Rgba },
    Gradient { gradient: Gradient },
    Image { url: String },
    None,
}

impl PropertyEdit for BackgroundEdit {
    fn mutations(&self, node: &NodeKey, element: &Element) -> Result<Vec<Mutation>, RejectedValue> {
        let (keep, set): (&[&str], Vec<Mutation>) = match self {
            BackgroundEdit::Solid { color } => (
                &["background-color"][..],
                vec![set_style(node, "background-color", color.to_css())],
            ),
            BackgroundEdit::Gradient { gradient } => {
                let mut gradient = gradient.clone();
                gradient.normalize();
                if gradient.stops.len() < 2 {
                    return Err(RejectedValue("a gradient with fewer than two stops".to_string()));
                }
                (
                    &["background-image"][..],
                    vec![set_style(node, "background-image", gradient.to_css())],
                )
            }
            BackgroundEdit::Image { url } => {
                return super::BackgroundImageEdit::Url(url.clone()).mutations(node, element);
            }
            BackgroundEdit::None => (&[][..], Vec::new()),
        };

        let stale: Vec<&str> = BACKGROUND_PROPERTIES
            .iter()
            .copied()
            .filter(|p| !keep.contains(p))
            .collect();
        let mut mutations = remove_present(node, element, &stale);
        mutations.extend(set);
        Ok(mutations)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundMode {
    None,
    Solid,
    Gradient,
    Image,
}

/// What the background panel shows for an element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackgroundState {
    pub mode: BackgroundMode,
    pub color: Option<Rgba>,
    pub gradient: Option<Gradient>,
    pub image_url: Option<String>,
}

impl BackgroundState {
    pub fn read(element: &Element) -> Self {
        let style = element.style();
        let image = style
            .get("background-image")
            .or_else(|| style.get("background"))
            .unwrap_or_default();

        let mut state = Self {
            mode: BackgroundMode::None,
            color: None,
            gradient: None,
            image_url: None,
        };

        if let Some(gradient) = Gradient::parse(image) {
            state.mode = BackgroundMode::Gradient;
            state.gradient = Some(gradient);
        } else if let Some(url) = super::background_image::parse_css_url(image) {
            state.mode = BackgroundMode::Image;
            state.image_url = Some(url);
        } else if let Some(color) = style
            .get("background-color")
            .or_else(|| style.get("background"))
            .and_then(Rgba::parse)
        {
            state.mode = BackgroundMode::Solid;
            state.color = Some(color);
        }
        state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_parser::{parse, InlineStyle};

    fn apply(element: &mut Element, edit: &BackgroundEdit) {
        let mut style = element.style();
        for mutation in edit.mutations(&NodeKey::new("k"), element).unwrap() {
            if let Mutation::SetStyle { property, value, .. } = mutation {
                match value {
                    Some(v) => style.set(&property, v),
                    None => {
                        style.remove(&property);
                    }
                }
            }
        }
        element.set_style(&style);
    }

    #[test]
    fn test_parse_colors() {
        assert_eq!(Rgba::parse("#fff"), Some(Rgba::opaque(255, 255, 255)));
        assert_eq!(Rgba::parse("#1A2b3C"), Some(Rgba::opaque(0x1a, 0x2b, 0x3c)));
        assert_eq!(Rgba::parse("rgb(1, 2, 3)"), Some(Rgba::opaque(1, 2, 3)));
        assert_eq!(Rgba::parse("rgba(1,2,3,0.5)"), Some(Rgba::new(1, 2, 3, 0.5)));
        assert_eq!(Rgba::parse("red"), None);
        assert_eq!(Rgba::new(1, 2, 3, 0.5).to_css(), "rgba(1, 2, 3, 0.5)");
        assert_eq!(Rgba::opaque(255, 0, 16).to_css(), "#ff0010");
    }

    #[test]
    fn test_gradient_css_round_trip() {
        let gradient = Gradient::new(
            GradientKind::Linear,
            45.0,
            vec![
                GradientStop::new("b", Rgba::opaque(0, 0, 0), 100.0),
                GradientStop::new("a", Rgba::new(255, 0, 0, 0.5), 0.0),
            ],
        );
        let css = gradient.to_css();
        assert_eq!(css, "linear-gradient(45deg, rgba(255, 0, 0, 0.5) 0%, #000000 100%)");

        let parsed = Gradient::parse(&css).unwrap();
        assert_eq!(parsed.angle, 45.0);
        assert_eq!(parsed.stops.len(), 2);
        assert_eq!(parsed.to_css(), css);
    }

    #[test]
    fn test_gradient_bounds() {
        let gradient = Gradient::new(
            GradientKind::Radial,
            400.0,
            vec![
                GradientStop::new("a", Rgba::opaque(0, 0, 0), -10.0),
                GradientStop::new("b", Rgba::opaque(0, 0, 0), 150.0),
            ],
        );
        assert_eq!(gradient.angle, 360.0);
        assert_eq!(gradient.stops[0].position, 0.0);
        assert_eq!(gradient.stops[1].position, 100.0);
        assert!(gradient.to_css().starts_with("radial-gradient(circle, "));
    }

    #[test]
    fn test_stop_editing_keeps_two() {
        let mut gradient = Gradient::default();
        let id = gradient.add_stop(Rgba::opaque(1, 1, 1), 50.0).id.clone();
        assert_eq!(gradient.stops[1].id, id);
        assert!(gradient.remove_stop(&id));
        assert!(!gradient.remove_stop("stop-1"));
    }

    #[test]
    fn test_solid_then_gradient_leaves_no_color() {
        let mut el = Element::new("div");
        apply(&mut el, &BackgroundEdit::Solid { color: Rgba::opaque(255, 0, 0) });
        assert_eq!(el.style().get("background-color"), Some("#ff0000"));

        apply(&mut el, &BackgroundEdit::Gradient { gradient: Gradient::default() });
        let style = el.style();
        assert!(!style.contains("background-color"));
        assert!(style.get("background-image").unwrap().starts_with("linear-gradient("));
        assert_eq!(BackgroundState::read(&el).mode, BackgroundMode::Gradient);
    }

    #[test]
    fn test_gradient_then_solid_leaves_no_gradient() {
        let mut el = Element::new("div");
        apply(&mut el, &BackgroundEdit::Gradient { gradient: Gradient::default() });
        apply(&mut el, &BackgroundEdit::Solid { color: Rgba::opaque(0, 0, 255) });

        let style = el.style();
        assert!(!style.contains("background-image"));
        assert!(!style.contains("background"));
        assert_eq!(style.get("background-color"), Some("#0000ff"));
        assert_eq!(BackgroundState::read(&el).color, Some(Rgba::opaque(0, 0, 255)));
    }

    #[test]
    fn test_none_clears_everything() {
        let doc = parse(
            r#"<div style="background: #fff; background-size: cover; padding: 4px"></div>"#,
        )
        .unwrap();
        let mut el = doc.element(doc.query("div").unwrap()).unwrap().clone();
        apply(&mut el, &BackgroundEdit::None);
        assert_eq!(el.style(), InlineStyle::parse("padding: 4px"));
    }

    #[test]
    fn test_none_on_plain_element_is_empty() {
        let el = Element::new("div");
        assert_eq!(BackgroundEdit::None.mutations(&NodeKey::new("k"), &el), Ok(Vec::new()));
    }

    #[test]
    fn test_single_stop_gradient_is_rejected() {
        let gradient = Gradient::new(
            GradientKind::Linear,
            90.0,
            vec![GradientStop::new("a", Rgba::opaque(0, 0, 0), 0.0)],
        );
        let edit = BackgroundEdit::Gradient { gradient };
        assert!(edit.mutations(&NodeKey::new("k"), &Element::new("div")).is_err());
    }
}
