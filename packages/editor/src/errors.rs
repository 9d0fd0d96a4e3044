//! Error types for the editor

use pagecraft_parser::NodeKey;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] pagecraft_parser::ParseError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    #[error("Upload rejected: {0}")]
    Upload(#[from] crate::upload::UploadError),

    #[error("Invalid payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Unknown node: {0}")]
    UnknownNode(NodeKey),

    #[error("No element is selected")]
    NoSelection,
}
