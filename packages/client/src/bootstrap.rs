//! Data the editor screen loads before editing starts.
//!
//! Every fetch is independent. A failure is logged, appended to `errors`
//! for display, and leaves that slice at its empty fallback. Loading flags
//! are cleared whether the fetch succeeded or not.

use crate::client::ApiClient;
use crate::models::{LandingPage, PixelStore, Store};
use pagecraft_editor::PagePayload;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Loading {
    pub stores: bool,
    pub pixels: bool,
    pub page: bool,
}

impl Loading {
    pub fn any(&self) -> bool {
        self.stores || self.pixels || self.page
    }
}

#[derive(Debug, Clone, Default)]
pub struct EditorBootstrap {
    pub stores: Vec<Store>,
    pub pixels: Vec<PixelStore>,
    pub page: Option<LandingPage>,
    pub errors: Vec<String>,
    pub loading: Loading,
}

impl EditorBootstrap {
    /// Fetch stores, the store's pixels (when a store is chosen) and the page
    /// being edited (when in edit mode)
    #[instrument(skip(client))]
    pub async fn load(client: &ApiClient, store_uuid: Option<&str>, page_id: Option<&str>) -> Self {
        let mut state = Self {
            loading: Loading {
                stores: true,
                pixels: store_uuid.is_some(),
                page: page_id.is_some(),
            },
            ..Self::default()
        };

        match client.stores().await {
            Ok(stores) => state.stores = stores,
            Err(err) => state.fail("stores", err),
        }
        state.loading.stores = false;

        if let Some(uuid) = store_uuid {
            match client.pixel_stores(uuid).await {
                Ok(pixels) => state.pixels = pixels,
                Err(err) => state.fail("pixels", err),
            }
            state.loading.pixels = false;
        }

        if let Some(id) = page_id {
            match client.landing_page(id).await {
                Ok(page) => state.page = Some(page),
                Err(err) => state.fail("page", err),
            }
            state.loading.page = false;
        }

        info!(
            stores = state.stores.len(),
            pixels = state.pixels.len(),
            has_page = state.page.is_some(),
            errors = state.errors.len(),
            "editor data loaded"
        );
        state
    }

    fn fail(&mut self, what: &str, err: impl std::fmt::Display) {
        warn!(%err, "failed to load {}", what);
        self.errors.push(format!("Failed to load {}: {}", what, err));
    }

    /// Payload to open the editor with; a new page when none was loaded
    pub fn payload(&self) -> PagePayload {
        self.page
            .clone()
            .map(PagePayload::from)
            .unwrap_or_default()
    }
}
