pub mod apply;
pub mod components;
pub mod fetch;
pub mod init;
pub mod outline;

pub use apply::{apply, ApplyArgs};
pub use components::{components, ComponentsArgs};
pub use fetch::{fetch, FetchArgs};
pub use init::{init, InitArgs};
pub use outline::{outline, OutlineArgs};

use anyhow::{Context, Result};
use pagecraft_editor::PagePayload;
use std::fs;
use std::path::Path;

/// Read a page from a payload `.json` file or a bare `.html` file
pub(crate) fn read_page(path: &Path) -> Result<PagePayload> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;

    if path.extension().map(|e| e == "json").unwrap_or(false) {
        PagePayload::from_json(&content)
            .with_context(|| format!("{} is not a page payload", path.display()))
    } else {
        Ok(PagePayload {
            html: content,
            ..PagePayload::default()
        })
    }
}

/// Write a payload to a file, or to stdout when no path is given
pub(crate) fn write_payload(payload: &PagePayload, out: Option<&Path>) -> Result<()> {
    let json = payload.to_json()?;
    match out {
        Some(path) => fs::write(path, json).with_context(|| format!("Cannot write {}", path.display())),
        None => {
            println!("{}", json);
            Ok(())
        }
    }
}
