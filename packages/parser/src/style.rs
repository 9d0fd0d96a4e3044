//! Inline `style` attribute model.
//!
//! Declarations keep their source order so that re-serializing an untouched
//! style attribute is stable. Splitting respects parentheses and quotes:
//! `url(data:image/png;base64,...)` contains semicolons.

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<(String, String)>,
}

impl InlineStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(source: &str) -> Self {
        let mut style = Self::new();
        for decl in split_top_level(source, ';') {
            let Some((name, value)) = decl.split_once(':') else {
                continue;
            };
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            if name.is_empty() || value.is_empty() {
                continue;
            }
            style.set(&name, value);
        }
        style
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    /// Set a declaration, replacing an existing one in place.
    pub fn set(&mut self, property: &str, value: impl Into<String>) {
        let value = value.into();
        let property = property.to_ascii_lowercase();
        match self.declarations.iter_mut().find(|(name, _)| *name == property) {
            Some((_, existing)) => *existing = value,
            None => self.declarations.push((property, value)),
        }
    }

    pub fn remove(&mut self, property: &str) -> Option<String> {
        let pos = self
            .declarations
            .iter()
            .position(|(name, _)| name == property)?;
        Some(self.declarations.remove(pos).1)
    }

    pub fn contains(&self, property: &str) -> bool {
        self.get(property).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl fmt::Display for InlineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.declarations.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}: {};", name, value)?;
        }
        Ok(())
    }
}

/// Split on `separator` outside of parentheses and quoted strings.
pub fn split_top_level(source: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in source.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' => quote = Some(c),
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                c if c == separator && depth == 0 => {
                    parts.push(&source[start..i]);
                    start = i + c.len_utf8();
                }
                _ => {}
            },
        }
    }
    parts.push(&source[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_render() {
        let style = InlineStyle::parse("color: red;  PADDING:8px 16px ; ;margin:0");
        assert_eq!(style.get("color"), Some("red"));
        assert_eq!(style.get("padding"), Some("8px 16px"));
        assert_eq!(style.len(), 3);
        assert_eq!(style.to_string(), "color: red; padding: 8px 16px; margin: 0;");
    }

    #[test]
    fn test_data_url_survives_split() {
        let source = "background-image: url(data:image/png;base64,AAAA); color: blue";
        let style = InlineStyle::parse(source);
        assert_eq!(
            style.get("background-image"),
            Some("url(data:image/png;base64,AAAA)")
        );
        assert_eq!(style.get("color"), Some("blue"));
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut style = InlineStyle::parse("width: 10px; height: 20px;");
        style.set("width", "100%");
        assert_eq!(style.to_string(), "width: 100%; height: 20px;");

        assert_eq!(style.remove("width"), Some("100%".to_string()));
        assert!(!style.contains("width"));
    }

    #[test]
    fn test_gradient_commas_are_not_split() {
        let parts = split_top_level("linear-gradient(90deg, red 0%, blue 100%), url(a.png)", ',');
        assert_eq!(parts.len(), 2);
    }
}
