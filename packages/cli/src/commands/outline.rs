use super::read_page;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_editor::outline::{self, OutlineNode};
use pagecraft_parser::parse;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct OutlineArgs {
    /// HTML file or page payload (.json)
    pub file: PathBuf,

    /// Print the outline as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn outline(args: OutlineArgs) -> Result<()> {
    let page = read_page(&args.file)?;
    let doc = parse(page.initial_html()).map_err(|e| anyhow!("{}: {}", args.file.display(), e))?;
    let tree = outline::project(&doc);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
        return Ok(());
    }

    if tree.is_empty() {
        println!("{}", "⚠️  The page is empty".yellow());
        return Ok(());
    }
    for node in &tree {
        print_node(node, 0);
        for child in &node.children {
            print_node(child, 1);
        }
    }
    Ok(())
}

fn print_node(node: &OutlineNode, depth: usize) {
    let tag = if node.is_section_level {
        node.tag_name.bright_blue().bold()
    } else {
        node.tag_name.normal()
    };
    println!(
        "{}{} {} {}",
        "  ".repeat(depth),
        tag,
        node.text_preview,
        format!("#{}", node.id).dimmed()
    );
}
