//! # Pagecraft Client
//!
//! Async REST client for the backend the editor talks to: store listing,
//! per-store tracking pixels and stored landing pages.

mod bootstrap;
mod client;
mod error;
pub mod models;

pub use bootstrap::{EditorBootstrap, Loading};
pub use client::ApiClient;
pub use error::{ClientError, ClientResult};
pub use models::{LandingPage, PixelStore, Store};
