//! Minimal selector matching for surface queries.
//!
//! Supports selector lists of compound selectors: `tag`, `*`, `.class`,
//! `#id`, `[attr]` and `[attr=value]` (value optionally quoted). Combinators
//! are not supported; a selector containing one parses to `None`.

use crate::ast::Element;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Compound>,
}

impl Selector {
    pub fn parse(source: &str) -> Option<Self> {
        let alternatives = source
            .split(',')
            .map(|part| parse_compound(part.trim()))
            .collect::<Option<Vec<_>>>()?;
        if alternatives.is_empty() {
            return None;
        }
        Some(Self { alternatives })
    }

    pub fn matches(&self, el: &Element) -> bool {
        self.alternatives.iter().any(|c| compound_matches(c, el))
    }
}

fn parse_compound(source: &str) -> Option<Compound> {
    if source.is_empty() || source.contains(char::is_whitespace) || source.contains(['>', '+', '~'])
    {
        return None;
    }

    let mut compound = Compound::default();
    let mut rest = source;

    let tag_len = rest
        .find(['.', '#', '['])
        .unwrap_or(rest.len());
    let tag = &rest[..tag_len];
    if !tag.is_empty() && tag != "*" {
        compound.tag = Some(tag.to_ascii_lowercase());
    }
    rest = &rest[tag_len..];

    while let Some(c) = rest.chars().next() {
        match c {
            '.' | '#' => {
                let body = &rest[1..];
                let end = body.find(['.', '#', '[']).unwrap_or(body.len());
                let name = &body[..end];
                if name.is_empty() {
                    return None;
                }
                if c == '.' {
                    compound.classes.push(name.to_string());
                } else {
                    compound.id = Some(name.to_string());
                }
                rest = &body[end..];
            }
            '[' => {
                let close = rest.find(']')?;
                let inner = &rest[1..close];
                let attr = match inner.split_once('=') {
                    Some((name, value)) => {
                        let value = value.trim().trim_matches(|q| q == '"' || q == '\'');
                        (name.trim().to_ascii_lowercase(), Some(value.to_string()))
                    }
                    None => (inner.trim().to_ascii_lowercase(), None),
                };
                if attr.0.is_empty() {
                    return None;
                }
                compound.attributes.push(attr);
                rest = &rest[close + 1..];
            }
            _ => return None,
        }
    }

    Some(compound)
}

fn compound_matches(compound: &Compound, el: &Element) -> bool {
    if let Some(tag) = &compound.tag {
        if *tag != el.tag {
            return false;
        }
    }
    if let Some(id) = &compound.id {
        if el.attribute("id") != Some(id.as_str()) {
            return false;
        }
    }
    if !compound.classes.iter().all(|c| el.has_class(c)) {
        return false;
    }
    compound.attributes.iter().all(|(name, value)| match value {
        Some(value) => el.attribute(name) == Some(value.as_str()),
        None => el.has_attribute(name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button() -> Element {
        let mut el = Element::new("a");
        el.set_attribute("id", "cta");
        el.set_attribute("class", "btn primary");
        el.set_attribute("href", "#");
        el
    }

    #[test]
    fn test_compound_selectors() {
        let el = button();
        assert!(Selector::parse("a").unwrap().matches(&el));
        assert!(Selector::parse("*").unwrap().matches(&el));
        assert!(Selector::parse("a.btn.primary#cta").unwrap().matches(&el));
        assert!(Selector::parse("[href=\"#\"]").unwrap().matches(&el));
        assert!(Selector::parse("[href]").unwrap().matches(&el));
        assert!(!Selector::parse("a.secondary").unwrap().matches(&el));
        assert!(!Selector::parse("div, p").unwrap().matches(&el));
        assert!(Selector::parse("div, a").unwrap().matches(&el));
    }

    #[test]
    fn test_combinators_are_rejected() {
        assert!(Selector::parse("div a").is_none());
        assert!(Selector::parse("div > a").is_none());
        assert!(Selector::parse("").is_none());
        assert!(Selector::parse("a.").is_none());
    }
}
