//! Records returned by the backend.
//!
//! Fields the editor does not read are kept loosely typed; unknown fields are
//! ignored so the backend can grow without breaking the client.

use pagecraft_editor::PagePayload;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Responses arrive either bare or wrapped as `{"data": ...}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(value) => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Store {
    pub id: Option<Value>,
    pub uuid: String,
    pub name: String,
}

/// Tracking pixel configured for a store
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PixelStore {
    pub id: Option<Value>,
    pub store_uuid: String,
    pub platform: String,
    pub pixel_id: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LandingPage {
    pub id: Option<Value>,
    pub title: String,
    pub slug: String,
    pub store_uuid: Option<String>,
    pub components: Vec<Value>,
    pub sections: Vec<Value>,
    pub html: String,
    pub css: String,
}

impl From<LandingPage> for PagePayload {
    fn from(page: LandingPage) -> Self {
        PagePayload {
            components: page.components,
            sections: page.sections,
            html: page.html,
            css: page.css,
        }
    }
}
