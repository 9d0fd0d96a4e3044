//! # Pagecraft Editor
//!
//! Editing engine for landing pages built from HTML.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ host: pointer, keyboard, toolbar events     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ session: selection, inline edit, drag/drop, │
//! │          resize, property editors           │
//! └─────────────────────────────────────────────┘
//!                     ↓  Mutation
//! ┌─────────────────────────────────────────────┐
//! │ pipeline: live document on the surface      │
//! │  - canonical HTML re-derived after changes  │
//! │  - outline projection                       │
//! │  - snapshot history (undo/redo/reset)       │
//! │  - debounced auto-save, manual save         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ SaveSink: { components, sections, html, css}│
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Canonical HTML is the state**: the live document is a projection
//!    that also carries editor decorations, which never serialize
//! 2. **Stable keys**: nodes are addressed by key, never by position
//! 3. **Pure transforms**: mutations produce a new document version
//! 4. **Host-driven time**: debounced work runs on `tick()`
//!
//! ## Usage
//!
//! ```rust
//! use pagecraft_editor::{
//!     ClickOutcome, DragPayload, EditorConfig, EditorSession, HeadlessSurface, Point,
//!     SystemClock,
//! };
//!
//! let mut session = EditorSession::new(
//!     HeadlessSurface::default(),
//!     EditorConfig::default(),
//!     Box::new(SystemClock),
//! );
//! session.load("", "").unwrap();
//!
//! session.begin_drag(DragPayload::palette("button"));
//! session.drop(Point::new(10.0, 10.0)).unwrap();
//! assert!(session.html().contains("Click Me"));
//!
//! assert_eq!(session.click(None), ClickOutcome::Ignored);
//! assert!(session.undo());
//! assert_eq!(session.html(), "");
//! ```

pub mod clock;
pub mod components;
pub mod config;
pub mod drag_drop;
mod errors;
pub mod geometry;
pub mod history;
pub mod mutations;
pub mod notices;
pub mod outline;
pub mod payload;
pub mod pipeline;
pub mod properties;
pub mod selection;
pub mod session;
pub mod surface;
pub mod upload;

pub use clock::{Clock, Debouncer, HostClock, SystemClock};
pub use config::EditorConfig;
pub use drag_drop::{DragPayload, DragState, DropTarget};
pub use errors::EditorError;
pub use geometry::{Point, Rect};
pub use history::SnapshotHistory;
pub use mutations::{Mutation, MutationError, MutationResult};
pub use notices::{Notice, NoticeLevel};
pub use outline::{ExpandState, OutlineNode};
pub use payload::{PagePayload, SaveKind, SaveSink};
pub use pipeline::{ChangeKind, Pipeline, Snapshot, TickReport};
pub use properties::{PropertyChange, PropertyEdit, PropertyPanel, RejectedValue};
pub use selection::{ResizeHandle, Selection, SelectionState};
pub use session::{ClickOutcome, EditorSession, Key, KeyInput};
pub use surface::{HeadlessSurface, RenderSurface};
pub use upload::{UploadError, UploadPolicy, UploadedFile};

// Re-export common types for convenience
pub use pagecraft_parser::{Document, InsertPosition, NodeKey};
