use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_editor::components::{catalog, ComponentCategory};

#[derive(Debug, Args)]
pub struct ComponentsArgs {
    /// Print the catalogue as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn components(args: ComponentsArgs) -> Result<()> {
    if args.json {
        println!("{}", serde_json::to_string_pretty(catalog())?);
        return Ok(());
    }

    for (category, title) in [
        (ComponentCategory::Basic, "Basic"),
        (ComponentCategory::Layout, "Layout"),
        (ComponentCategory::Section, "Sections"),
    ] {
        println!("{}", title.bright_blue().bold());
        for info in catalog().iter().filter(|c| c.category == category) {
            println!("  {:<16} {}", info.tag.bright_white(), info.label);
        }
        println!();
    }
    Ok(())
}
