use crate::ast::is_raw_text_tag;
use logos::{Lexer, Logos};
use std::fmt;
use std::ops::Range;

/// Markup-level tokens of an HTML body
#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token<'src> {
    // Comment body, without the delimiters
    #[token("<!--", lex_comment)]
    Comment(&'src str),

    #[regex(r"<![a-zA-Z][^>]*>", |lex| lex.slice())]
    Doctype(&'src str),

    // Complete open tag including attributes, e.g. `<a href="#">` or `<br/>`
    #[regex(r#"<[a-zA-Z][a-zA-Z0-9:_-]*([^>"']|"[^"]*"|'[^']*')*>"#, |lex| lex.slice())]
    OpenTag(&'src str),

    #[regex(r"</[a-zA-Z][a-zA-Z0-9:_-]*[ \t\r\n\f]*>", |lex| lex.slice())]
    CloseTag(&'src str),

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),
}

fn lex_comment<'src>(lex: &mut Lexer<'src, Token<'src>>) -> &'src str {
    let rest = lex.remainder();
    match rest.find("-->") {
        Some(end) => {
            lex.bump(end + 3);
            &rest[..end]
        }
        None => {
            // Unterminated comments run to the end of input
            lex.bump(rest.len());
            rest
        }
    }
}

impl<'src> fmt::Display for Token<'src> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Comment(c) => write!(f, "comment '{}'", c),
            Token::Doctype(d) => write!(f, "doctype {}", d),
            Token::OpenTag(t) => write!(f, "open tag {}", t),
            Token::CloseTag(t) => write!(f, "close tag {}", t),
            Token::Text(t) => write!(f, "text '{}'", t),
        }
    }
}

/// Tokenize markup.
///
/// Bytes the lexer cannot match (a stray `<`, an unterminated tag) come back
/// as text. The body of a raw-text element (`script`, `style`, `textarea`,
/// `title`) is a single text token running up to its close tag.
pub fn tokenize(source: &str) -> Vec<(Token<'_>, Range<usize>)> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        match result {
            Ok(Token::OpenTag(raw)) => {
                tokens.push((Token::OpenTag(raw), span.clone()));

                let (name, _, self_closing) = split_open_tag(raw);
                let name = name.to_ascii_lowercase();
                if is_raw_text_tag(&name) && !self_closing {
                    let rest = lexer.remainder();
                    let end = find_close_tag(rest, &name).unwrap_or(rest.len());
                    if end > 0 {
                        tokens.push((Token::Text(&rest[..end]), span.end..span.end + end));
                        lexer.bump(end);
                    }
                }
            }
            Ok(token) => tokens.push((token, span)),
            Err(()) => tokens.push((Token::Text(lexer.slice()), span)),
        }
    }

    tokens
}

fn find_close_tag(rest: &str, name: &str) -> Option<usize> {
    let needle = format!("</{}", name);
    rest.to_ascii_lowercase().find(&needle)
}

/// Split a raw open tag into name, attribute source and self-closing flag.
pub fn split_open_tag(raw: &str) -> (&str, &str, bool) {
    let inner = raw.trim_start_matches('<').trim_end_matches('>');
    let name_end = inner
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, ':' | '_' | '-')))
        .unwrap_or(inner.len());
    let (name, attrs) = inner.split_at(name_end);

    let trimmed = attrs.trim_end();
    match trimmed.strip_suffix('/') {
        Some(attrs) => (name, attrs, true),
        None => (name, attrs, false),
    }
}

/// Tokens inside an open tag's attribute list
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum AttrToken<'src> {
    #[token("=")]
    Equals,

    #[token("/")]
    Slash,

    #[regex(r#""[^"]*""#, |lex| unquote(lex.slice()))]
    #[regex(r"'[^']*'", |lex| unquote(lex.slice()))]
    Quoted(&'src str),

    #[regex(r#"[^ \t\r\n\f"'=/>]+"#, |lex| lex.slice())]
    Word(&'src str),
}

fn unquote(s: &str) -> &str {
    &s[1..s.len() - 1]
}

/// Parse an attribute list into `(name, raw value)` pairs.
///
/// Names are lowercased. Boolean attributes get an empty value. Unquoted
/// values run until whitespace, so `src=/img/a.png` keeps its slashes.
pub fn parse_attributes(source: &str) -> Vec<(String, String)> {
    let tokens: Vec<(Option<AttrToken<'_>>, Range<usize>)> = AttrToken::lexer(source)
        .spanned()
        .map(|(result, span)| (result.ok(), span))
        .collect();

    let mut attributes: Vec<(String, String)> = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let name = match &tokens[i].0 {
            Some(AttrToken::Word(word)) => word.to_ascii_lowercase(),
            _ => {
                i += 1;
                continue;
            }
        };
        i += 1;

        let mut value = String::new();
        if matches!(tokens.get(i), Some((Some(AttrToken::Equals), _))) {
            i += 1;
            match tokens.get(i) {
                Some((Some(AttrToken::Quoted(quoted)), _)) => {
                    value = quoted.to_string();
                    i += 1;
                }
                Some((_, first)) => {
                    let start = first.start;
                    let mut end = first.end;
                    i += 1;
                    while let Some((token, span)) = tokens.get(i) {
                        if span.start != end || matches!(token, Some(AttrToken::Quoted(_))) {
                            break;
                        }
                        end = span.end;
                        i += 1;
                    }
                    value = source[start..end].to_string();
                }
                None => {}
            }
        }

        if !attributes.iter().any(|(existing, _)| *existing == name) {
            attributes.push((name, value));
        }
    }

    attributes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markup_tokens() {
        let tokens = tokenize(r#"<!DOCTYPE html><p class="a">Hi<br/></p><!-- note -->"#);
        let kinds: Vec<&Token> = tokens.iter().map(|(t, _)| t).collect();

        assert!(matches!(kinds[0], Token::Doctype(_)));
        assert_eq!(*kinds[1], Token::OpenTag(r#"<p class="a">"#));
        assert_eq!(*kinds[2], Token::Text("Hi"));
        assert_eq!(*kinds[3], Token::OpenTag("<br/>"));
        assert_eq!(*kinds[4], Token::CloseTag("</p>"));
        assert_eq!(*kinds[5], Token::Comment(" note "));
    }

    #[test]
    fn test_gt_inside_quoted_attribute() {
        let tokens = tokenize(r#"<a title="1 > 0">x</a>"#);
        assert_eq!(tokens[0].0, Token::OpenTag(r#"<a title="1 > 0">"#));
        assert_eq!(tokens[1].0, Token::Text("x"));
    }

    #[test]
    fn test_stray_lt_is_text() {
        let tokens = tokenize("a < b");
        let text: String = tokens
            .iter()
            .map(|(t, _)| match t {
                Token::Text(s) => *s,
                other => panic!("unexpected token {}", other),
            })
            .collect();
        assert_eq!(text, "a < b");
    }

    #[test]
    fn test_raw_text_body() {
        let source = "<script>if (a < b) { x = '<p>'; }</script><p>after</p>";
        let tokens = tokenize(source);

        assert_eq!(tokens[0].0, Token::OpenTag("<script>"));
        assert_eq!(tokens[1].0, Token::Text("if (a < b) { x = '<p>'; }"));
        assert_eq!(tokens[2].0, Token::CloseTag("</script>"));
        assert_eq!(tokens[3].0, Token::OpenTag("<p>"));
        assert_eq!(&source[tokens[1].1.clone()], "if (a < b) { x = '<p>'; }");
    }

    #[test]
    fn test_split_open_tag() {
        assert_eq!(split_open_tag("<img src=a.png />"), ("img", " src=a.png ", true));
        assert_eq!(split_open_tag("<div>"), ("div", "", false));
        assert_eq!(split_open_tag("<a href=/x/>"), ("a", " href=/x", true));
    }

    #[test]
    fn test_attributes() {
        let attrs = parse_attributes(r#" class="hero big" data-id='7' hidden SRC=/img/a.png title="""#);
        assert_eq!(
            attrs,
            vec![
                ("class".to_string(), "hero big".to_string()),
                ("data-id".to_string(), "7".to_string()),
                ("hidden".to_string(), String::new()),
                ("src".to_string(), "/img/a.png".to_string()),
                ("title".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_duplicate_attributes_keep_first() {
        let attrs = parse_attributes(r#"id="a" id="b""#);
        assert_eq!(attrs, vec![("id".to_string(), "a".to_string())]);
    }
}
