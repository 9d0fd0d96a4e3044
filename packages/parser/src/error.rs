use crate::ast::NodeId;
use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Nesting deeper than {limit} levels at {pos}")]
    TooDeep { pos: usize, limit: usize },

    #[error("Invalid markup at {pos}: {message}")]
    InvalidSyntax { pos: usize, message: String },
}

impl ParseError {
    pub fn too_deep(pos: usize, limit: usize) -> Self {
        Self::TooDeep { pos, limit }
    }

    pub fn invalid_syntax(pos: usize, message: impl Into<String>) -> Self {
        Self::InvalidSyntax {
            pos,
            message: message.into(),
        }
    }
}

/// Structural errors raised by in-place tree primitives.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    #[error("Node is detached from the document: {0:?}")]
    Detached(NodeId),

    #[error("The document root cannot be moved or removed")]
    RootImmutable,

    #[error("Would create cycle")]
    CycleDetected,

    #[error("Node is not an element")]
    NotAnElement,

    #[error("<{0}> cannot have children")]
    VoidElement(String),
}
