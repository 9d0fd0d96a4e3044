use crate::ast::{is_raw_text_tag, is_void_tag, Attribute};
use crate::document::Document;
use crate::entities;
use crate::error::{ParseError, ParseResult};
use crate::fragment::FragmentNode;
use crate::tokenizer::{parse_attributes, split_open_tag, tokenize, Token};
use std::ops::Range;
use tracing::debug;

/// Maximum element nesting accepted before parsing fails
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Lenient HTML tree builder
///
/// Never rejects markup for being malformed: unmatched close tags are
/// ignored, a close tag closes every element opened after its match, and
/// elements still open at the end are closed. `html`, `head` and `body`
/// wrappers are unwrapped; head content is dropped.
pub struct Parser<'src> {
    tokens: Vec<(Token<'src>, Range<usize>)>,
    pos: usize,
    max_depth: usize,
}

struct OpenElement {
    tag: String,
    attributes: Vec<Attribute>,
    children: Vec<FragmentNode>,
}

impl OpenElement {
    fn finish(self) -> FragmentNode {
        FragmentNode::Element {
            tag: self.tag,
            attributes: self.attributes,
            children: self.children,
        }
    }
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            tokens: tokenize(source),
            pos: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse into detached top-level nodes
    pub fn parse_fragment(&mut self) -> ParseResult<Vec<FragmentNode>> {
        let mut top: Vec<FragmentNode> = Vec::new();
        let mut stack: Vec<OpenElement> = Vec::new();

        while let Some((token, span)) = self.advance() {
            match token {
                Token::Doctype(_) => {}
                Token::Comment(content) => {
                    push_node(
                        &mut stack,
                        &mut top,
                        FragmentNode::Comment {
                            content: content.to_string(),
                        },
                    );
                }
                Token::Text(raw) => {
                    let verbatim = stack
                        .last()
                        .map(|open| matches!(open.tag.as_str(), "script" | "style"))
                        .unwrap_or(false);
                    let content = if verbatim {
                        raw.to_string()
                    } else {
                        entities::decode(raw)
                    };
                    push_text(&mut stack, &mut top, content);
                }
                Token::OpenTag(raw) => {
                    let (name, attr_source, self_closing) = split_open_tag(raw);
                    let tag = name.to_ascii_lowercase();

                    match tag.as_str() {
                        "html" | "body" => continue,
                        "head" => {
                            self.skip_until_close("head");
                            continue;
                        }
                        _ => {}
                    }

                    let attributes = parse_attributes(attr_source)
                        .into_iter()
                        .map(|(name, value)| Attribute::new(name, entities::decode(&value)))
                        .collect();
                    let open = OpenElement {
                        tag,
                        attributes,
                        children: Vec::new(),
                    };

                    if is_void_tag(&open.tag) || (self_closing && !is_raw_text_tag(&open.tag)) {
                        push_node(&mut stack, &mut top, open.finish());
                    } else {
                        if stack.len() >= self.max_depth {
                            return Err(ParseError::too_deep(span.start, self.max_depth));
                        }
                        stack.push(open);
                    }
                }
                Token::CloseTag(raw) => {
                    let tag = close_tag_name(raw);
                    if matches!(tag.as_str(), "html" | "body" | "head") || is_void_tag(&tag) {
                        continue;
                    }
                    let Some(depth) = stack.iter().rposition(|open| open.tag == tag) else {
                        debug!(tag = %tag, pos = span.start, "ignoring unmatched close tag");
                        continue;
                    };
                    while stack.len() > depth {
                        close_top(&mut stack, &mut top);
                    }
                }
            }
        }

        while !stack.is_empty() {
            close_top(&mut stack, &mut top);
        }

        Ok(top)
    }

    fn advance(&mut self) -> Option<(Token<'src>, Range<usize>)> {
        let next = self.tokens.get(self.pos).cloned();
        if next.is_some() {
            self.pos += 1;
        }
        next
    }

    fn skip_until_close(&mut self, tag: &str) {
        while let Some((token, _)) = self.advance() {
            if let Token::CloseTag(raw) = token {
                if close_tag_name(raw) == tag {
                    return;
                }
            }
        }
    }
}

fn close_tag_name(raw: &str) -> String {
    raw.trim_start_matches("</")
        .trim_end_matches('>')
        .trim()
        .to_ascii_lowercase()
}

fn push_node(stack: &mut [OpenElement], top: &mut Vec<FragmentNode>, node: FragmentNode) {
    match stack.last_mut() {
        Some(open) => open.children.push(node),
        None => top.push(node),
    }
}

/// Adjacent text merges into one node.
fn push_text(stack: &mut [OpenElement], top: &mut Vec<FragmentNode>, content: String) {
    let siblings = match stack.last_mut() {
        Some(open) => &mut open.children,
        None => top,
    };
    match siblings.last_mut() {
        Some(FragmentNode::Text { content: existing }) => existing.push_str(&content),
        _ => siblings.push(FragmentNode::Text { content }),
    }
}

fn close_top(stack: &mut Vec<OpenElement>, top: &mut Vec<FragmentNode>) {
    if let Some(open) = stack.pop() {
        let node = open.finish();
        push_node(stack, top, node);
    }
}

/// Parse a body document
pub fn parse(source: &str) -> ParseResult<Document> {
    parse_with_seed(source, "untitled")
}

/// Parse a body document whose keys derive from `seed`
pub fn parse_with_seed(source: &str, seed: &str) -> ParseResult<Document> {
    let fragments = Parser::new(source).parse_fragment()?;
    let mut doc = Document::with_seed(seed);
    let root = doc.root();
    for fragment in &fragments {
        doc.append_fragment(root, fragment);
    }
    debug!(seed = %seed, nodes = doc.len(), "parsed document");
    Ok(doc)
}

/// Parse markup into detached nodes (templates, rich-text content)
pub fn parse_fragment(source: &str) -> ParseResult<Vec<FragmentNode>> {
    Parser::new(source).parse_fragment()
}
