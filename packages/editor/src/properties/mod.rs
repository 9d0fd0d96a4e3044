//! # Property Editors
//!
//! Each editor reads the selected element's inline style into a plain
//! state value, and turns one user change into document mutations. Nothing
//! here touches the document directly; the session applies the mutations
//! through the pipeline so they are serialized and recorded like any other
//! change.

pub mod background_image;
pub mod color;
pub mod spacing;
pub mod typography;

pub use background_image::{
    BackgroundImage, BackgroundImageEdit, BackgroundPosition, BackgroundRepeat, BackgroundSize,
};
pub use color::{BackgroundEdit, BackgroundMode, BackgroundState, Gradient, GradientKind, GradientStop, Rgba};
pub use spacing::{Spacing, SpacingEdit, HEIGHT_PRESETS, WIDTH_PRESETS};
pub use typography::{TextAlign, Typography, TypographyEdit, FONT_SIZES};

use crate::mutations::Mutation;
use pagecraft_parser::{Element, NodeKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Input a property editor refuses to turn into styles
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("That value is not allowed here: {0}")]
pub struct RejectedValue(pub String);

/// One change made in a property panel
pub trait PropertyEdit {
    /// Mutations that apply this change to `element` (keyed `node`). An
    /// empty list is a valid change with nothing left to do.
    fn mutations(&self, node: &NodeKey, element: &Element) -> Result<Vec<Mutation>, RejectedValue>;
}

/// Any property edit, as sent by a host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "editor", content = "edit", rename_all = "snake_case")]
pub enum PropertyChange {
    Background(BackgroundEdit),
    Typography(TypographyEdit),
    BackgroundImage(BackgroundImageEdit),
    Spacing(SpacingEdit),
}

impl PropertyEdit for PropertyChange {
    fn mutations(&self, node: &NodeKey, element: &Element) -> Result<Vec<Mutation>, RejectedValue> {
        match self {
            PropertyChange::Background(edit) => edit.mutations(node, element),
            PropertyChange::Typography(edit) => edit.mutations(node, element),
            PropertyChange::BackgroundImage(edit) => edit.mutations(node, element),
            PropertyChange::Spacing(edit) => edit.mutations(node, element),
        }
    }
}

/// Everything the property panels show for one element
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyPanel {
    pub background: BackgroundState,
    pub typography: Typography,
    pub background_image: BackgroundImage,
    pub spacing: Spacing,
}

impl PropertyPanel {
    pub fn read(element: &Element) -> Self {
        Self {
            background: BackgroundState::read(element),
            typography: Typography::read(element),
            background_image: BackgroundImage::read(element),
            spacing: Spacing::read(element),
        }
    }
}

pub(crate) fn set_style(node: &NodeKey, property: &str, value: impl Into<String>) -> Mutation {
    Mutation::SetStyle {
        node: node.clone(),
        property: property.to_string(),
        value: Some(value.into()),
    }
}

pub(crate) fn remove_style(node: &NodeKey, property: &str) -> Mutation {
    Mutation::SetStyle {
        node: node.clone(),
        property: property.to_string(),
        value: None,
    }
}

/// Removals for the listed properties the element actually has
pub(crate) fn remove_present(node: &NodeKey, element: &Element, properties: &[&str]) -> Vec<Mutation> {
    let style = element.style();
    properties
        .iter()
        .filter(|property| style.contains(property))
        .map(|property| remove_style(node, property))
        .collect()
}
