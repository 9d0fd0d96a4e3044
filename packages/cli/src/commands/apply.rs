use super::{read_page, write_payload};
use crate::config::Config;
use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{
    DragPayload, EditorConfig, EditorSession, HeadlessSurface, HostClock, InsertPosition, NodeKey,
    PagePayload, Point, PropertyChange, RenderSurface,
};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Page payload (.json) or HTML file to edit
    pub payload: PathBuf,

    /// JSON array of editing steps
    #[arg(short, long)]
    pub script: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

/// One scripted editing action. Elements are addressed by selector, with
/// `index` picking among several matches.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Select {
        selector: String,
        #[serde(default)]
        index: usize,
    },
    /// Drop a palette component at the end of the page
    Insert { component: String },
    Move {
        selector: String,
        #[serde(default)]
        index: usize,
        anchor: String,
        #[serde(default)]
        anchor_index: usize,
        position: InsertPosition,
    },
    /// Replace the selected element's content through inline editing
    Edit { html: String },
    Property { change: PropertyChange },
    Delete,
    Clear,
    Undo,
    Redo,
    Reset,
}

pub fn apply(args: ApplyArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let page = read_page(&args.payload)?;
    let script = fs::read_to_string(&args.script)
        .with_context(|| format!("Cannot read {}", args.script.display()))?;
    let steps: Vec<Step> = serde_json::from_str(&script)
        .with_context(|| format!("{} is not a list of steps", args.script.display()))?;

    let payload = run_steps(&page, &steps, config.editor)?;
    write_payload(&payload, args.out.as_deref())?;

    if let Some(out) = &args.out {
        println!(
            "  {} {} steps → {}",
            "✓".green(),
            steps.len(),
            out.display()
        );
    }
    Ok(())
}

/// Run steps in a headless session and return the saved payload
pub fn run_steps(page: &PagePayload, steps: &[Step], config: EditorConfig) -> Result<PagePayload> {
    let mut session = EditorSession::new(
        HeadlessSurface::new("cli"),
        config,
        Box::new(HostClock::new()),
    );
    session.load_payload(page)?;

    for (i, step) in steps.iter().enumerate() {
        debug!(step = i, ?step, "applying");
        run_step(&mut session, step).with_context(|| format!("Step {} failed", i + 1))?;
        for notice in session.drain_notices() {
            debug!(level = ?notice.level, message = %notice.message, "notice");
        }
    }
    Ok(session.save())
}

fn run_step(session: &mut EditorSession<HeadlessSurface>, step: &Step) -> Result<()> {
    match step {
        Step::Select { selector, index } => {
            let key = find(session, selector, *index)?;
            session.select(&key)?;
        }
        Step::Insert { component } => {
            session.clear_selection();
            session.begin_drag(DragPayload::palette(component.as_str()));
            session.drop(Point::new(0.0, 0.0))?;
        }
        Step::Move {
            selector,
            index,
            anchor,
            anchor_index,
            position,
        } => {
            let node = find(session, selector, *index)?;
            let anchor = find(session, anchor, *anchor_index)?;
            session.move_in_outline(&node, &anchor, *position)?;
        }
        Step::Edit { html } => {
            let node = session
                .selection()
                .node()
                .cloned()
                .ok_or_else(|| anyhow!("Nothing is selected"))?;
            session.click(Some(&node));
            if !session.selection().is_editing() {
                bail!("Element {} is not editable", node);
            }
            session.text_input(html)?;
            session.commit_edit();
        }
        Step::Property { change } => {
            session.apply_property(change)?;
        }
        Step::Delete => {
            if !session.request_delete() {
                bail!("Nothing is selected");
            }
            session.resolve_delete(true)?;
        }
        Step::Clear => {
            session.clear_selection();
        }
        Step::Undo => {
            session.undo();
        }
        Step::Redo => {
            session.redo();
        }
        Step::Reset => {
            session.reset();
        }
    }
    Ok(())
}

fn find(session: &EditorSession<HeadlessSurface>, selector: &str, index: usize) -> Result<NodeKey> {
    session
        .surface()
        .query(selector)
        .into_iter()
        .nth(index)
        .ok_or_else(|| anyhow!("No element matches '{}' (index {})", selector, index))
}
