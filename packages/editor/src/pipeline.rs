//! # Editing Pipeline
//!
//! Coordinates the document lifecycle: Mutate → Serialize → Project → Record
//!
//! The Pipeline manages:
//! - Applying mutations to the live document on the render surface
//! - Re-deriving the canonical HTML after every change
//! - Outline re-projection (immediate, or debounced for typing)
//! - History snapshots (immediate, or debounced for typing)
//! - Debounced auto-save and immediate manual save
//!
//! Undo, redo and reset go through the same sync path as edits; the
//! history's replay guard keeps them from recording themselves.

use crate::clock::{Clock, Debouncer};
use crate::config::EditorConfig;
use crate::errors::EditorError;
use crate::history::SnapshotHistory;
use crate::mutations::Mutation;
use crate::outline::{self, ExpandState, OutlineNode};
use crate::payload::{css_or_default, PagePayload, SaveKind, SaveSink};
use crate::surface::RenderSurface;
use pagecraft_parser::{serialize, Document};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Arena slots allowed beyond twice the live node count before compacting
const COMPACT_SLACK: usize = 64;

/// How a change entered the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Insert, move, delete, property edit: outline and history follow now
    Discrete,
    /// Free-text typing: outline and history follow after a quiet period
    TextInput,
}

/// A recorded document version: the canonical HTML plus the pinned,
/// artifact-free document it was serialized from
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub html: String,
    pub document: Arc<Document>,
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.html == other.html
    }
}

/// What a [`Pipeline::tick`] fired
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub outline: bool,
    pub history: bool,
    pub saved: bool,
}

pub struct Pipeline<S: RenderSurface> {
    surface: S,
    config: EditorConfig,
    html: String,
    css: String,
    outline: Vec<OutlineNode>,
    expanded: ExpandState,
    history: SnapshotHistory<Snapshot>,
    outline_debounce: Debouncer,
    history_debounce: Debouncer,
    autosave: Debouncer,
    dirty: bool,
    clock: Box<dyn Clock>,
    sink: Option<Box<dyn SaveSink>>,
}

impl<S: RenderSurface> Pipeline<S> {
    pub fn new(surface: S, config: EditorConfig, clock: Box<dyn Clock>) -> Self {
        let mut pipeline = Self {
            outline_debounce: Debouncer::new(config.outline_debounce_ms),
            history_debounce: Debouncer::new(config.text_history_debounce_ms),
            autosave: Debouncer::new(config.auto_save_delay_ms),
            history: SnapshotHistory::empty().with_max_entries(config.history_limit),
            surface,
            config,
            html: String::new(),
            css: String::new(),
            outline: Vec::new(),
            expanded: ExpandState::new(),
            dirty: false,
            clock,
            sink: None,
        };
        pipeline.reinitialize();
        pipeline
    }

    pub fn set_sink(&mut self, sink: Box<dyn SaveSink>) {
        self.sink = Some(sink);
    }

    /// Start a session from stored markup. History restarts with this
    /// document as the original.
    #[instrument(skip_all, fields(bytes = html.len()))]
    pub fn load(&mut self, html: &str, css: &str) -> Result<(), EditorError> {
        self.surface.apply_html(html)?;
        self.css = css.to_string();
        self.reinitialize();
        info!(nodes = self.surface.document().len(), "loaded document");
        Ok(())
    }

    fn reinitialize(&mut self) {
        self.html = serialize(self.surface.document());
        self.outline_debounce.cancel();
        self.history_debounce.cancel();
        self.autosave.cancel();
        self.dirty = false;
        self.history = SnapshotHistory::empty().with_max_entries(self.config.history_limit);
        let snapshot = self.snapshot();
        self.history.push(snapshot);
        self.refresh_outline();
    }

    // ------------------------------------------------------------------
    // Changes
    // ------------------------------------------------------------------

    /// Apply a batch atomically and commit the result. Returns whether the
    /// canonical HTML changed.
    pub fn apply(&mut self, mutations: &[Mutation], kind: ChangeKind) -> Result<bool, EditorError> {
        if mutations.is_empty() {
            return Ok(false);
        }
        let next = Mutation::apply_all(self.surface.document(), mutations)?;
        debug!(count = mutations.len(), first = mutations[0].name(), "applied mutations");
        self.surface.apply_document(compacted(next));
        Ok(self.sync(kind))
    }

    /// Apply a batch to the live document without committing it. Used for
    /// in-gesture feedback such as resizing.
    pub fn apply_preview(&mut self, mutations: &[Mutation]) -> Result<(), EditorError> {
        let next = Mutation::apply_all(self.surface.document(), mutations)?;
        self.surface.apply_document(compacted(next));
        Ok(())
    }

    /// Rewrite editor decorations on the live document. Decorations never
    /// reach the canonical HTML, so nothing is committed.
    pub fn decorate(&mut self, f: impl FnOnce(&mut Document)) {
        let mut doc = self.surface.document().clone();
        f(&mut doc);
        self.surface.apply_document(compacted(doc));
    }

    /// Re-derive the canonical HTML from the live document and schedule the
    /// work that follows a content change
    pub fn sync(&mut self, kind: ChangeKind) -> bool {
        let html = serialize(self.surface.document());
        if html == self.html {
            return false;
        }
        self.html = html;
        self.mark_dirty();

        match kind {
            ChangeKind::Discrete => {
                self.outline_debounce.cancel();
                self.history_debounce.cancel();
                self.refresh_outline();
                self.record();
            }
            ChangeKind::TextInput => {
                let now = self.clock.now_ms();
                self.outline_debounce.schedule(now);
                self.history_debounce.schedule(now);
            }
        }
        true
    }

    pub fn set_css(&mut self, css: &str) {
        if self.css != css {
            self.css = css.to_string();
            self.mark_dirty();
        }
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
        self.autosave.schedule(self.clock.now_ms());
    }

    fn snapshot(&self) -> Snapshot {
        let clean = self.surface.document().strip_editor_artifacts();
        Snapshot {
            html: serialize(&clean),
            document: Arc::new(clean),
        }
    }

    fn record(&mut self) {
        let snapshot = self.snapshot();
        if self.history.push(snapshot) {
            debug!(entries = self.history.len(), cursor = self.history.cursor(), "recorded snapshot");
        }
    }

    fn refresh_outline(&mut self) {
        self.outline = outline::project(self.surface.document());
        self.expanded.retain_present(&self.outline);
    }

    /// Run pending text-input work now
    pub fn flush_pending(&mut self) {
        if self.outline_debounce.cancel() {
            self.refresh_outline();
        }
        if self.history_debounce.cancel() {
            self.record();
        }
    }

    /// Fire debounced work whose quiet period has passed
    pub fn tick(&mut self) -> TickReport {
        let now = self.clock.now_ms();
        let mut report = TickReport::default();

        if self.outline_debounce.poll(now) {
            self.refresh_outline();
            report.outline = true;
        }
        if self.history_debounce.poll(now) {
            self.record();
            report.history = true;
        }
        if self.autosave.poll(now) && self.dirty {
            self.save(SaveKind::Auto);
            report.saved = true;
        }
        report
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        self.flush_pending();
        match self.history.undo().cloned() {
            Some(snapshot) => {
                self.replay(snapshot);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        self.flush_pending();
        match self.history.redo().cloned() {
            Some(snapshot) => {
                self.replay(snapshot);
                true
            }
            None => false,
        }
    }

    /// Discard all history and return to the session-start document
    pub fn reset(&mut self) -> bool {
        self.flush_pending();
        match self.history.reset().cloned() {
            Some(snapshot) => {
                self.replay(snapshot);
                true
            }
            None => false,
        }
    }

    fn replay(&mut self, snapshot: Snapshot) {
        self.history.begin_replay();
        self.surface.apply_document(Document::clone(&snapshot.document));
        self.sync(ChangeKind::Discrete);
        self.history.end_replay();
        debug!(cursor = self.history.cursor(), "replayed snapshot");
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo() || self.history_debounce.is_pending()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo() && !self.history_debounce.is_pending()
    }

    // ------------------------------------------------------------------
    // Saving
    // ------------------------------------------------------------------

    pub fn payload(&self) -> PagePayload {
        PagePayload::new(self.html.clone(), &self.css)
    }

    /// Manual save: immediate, and cancels any pending auto-save
    pub fn save_now(&mut self) -> PagePayload {
        self.autosave.cancel();
        self.save(SaveKind::Manual)
    }

    fn save(&mut self, kind: SaveKind) -> PagePayload {
        let payload = self.payload();
        if let Some(sink) = self.sink.as_mut() {
            sink.save(&payload, kind);
        }
        self.dirty = false;
        info!(?kind, bytes = payload.html.len(), "saved page");
        payload
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Surface access for layout and focus. Content changes must go
    /// through [`apply`](Self::apply).
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn document(&self) -> &Document {
        self.surface.document()
    }

    /// Canonical HTML of the page
    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn css(&self) -> String {
        css_or_default(&self.css)
    }

    pub fn outline(&self) -> &[OutlineNode] {
        &self.outline
    }

    pub fn expanded(&self) -> &ExpandState {
        &self.expanded
    }

    pub fn expanded_mut(&mut self) -> &mut ExpandState {
        &mut self.expanded
    }

    pub fn history(&self) -> &SnapshotHistory<Snapshot> {
        &self.history
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }
}

fn compacted(doc: Document) -> Document {
    if doc.arena_len() > doc.len() * 2 + COMPACT_SLACK {
        doc.compact()
    } else {
        doc
    }
}
