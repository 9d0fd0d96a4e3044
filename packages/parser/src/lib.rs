//! HTML model for the Pagecraft editor: logos tokenizer, lenient parser,
//! arena document with stable node keys, and serializer.

pub mod ast;
pub mod document;
pub mod entities;
pub mod error;
pub mod fragment;
pub mod id_generator;
pub mod parser;
pub mod selector;
pub mod serializer;
pub mod style;
pub mod tokenizer;

#[cfg(test)]
mod tests_serializer;

pub use ast::{
    Attribute, Element, InsertPosition, Node, NodeId, NodeKey, NodeKind, CONTAINER_ATTR,
    CONTROL_ATTR, DROP_TARGET_CLASS, EDITING_ATTR, EDITOR_CLASSES, KEY_ATTR, SELECTED_CLASS,
};
pub use document::{Document, TreeResult};
pub use error::{ParseError, ParseResult, TreeError};
pub use fragment::FragmentNode;
pub use id_generator::{get_document_id, IDGenerator};
pub use parser::{parse, parse_fragment, parse_with_seed, Parser};
pub use serializer::{serialize, serialize_live, SerializeOptions, Serializer};
pub use style::InlineStyle;
pub use tokenizer::{tokenize, Token};
