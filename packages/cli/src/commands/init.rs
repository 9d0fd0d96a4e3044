use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_editor::payload::PLACEHOLDER_HTML;
use pagecraft_editor::PagePayload;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Backend base URL
    #[arg(long)]
    pub api_base_url: Option<String>,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    // Check if config already exists
    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Pagecraft project...".bright_blue().bold());

    // Starter page to edit
    let page_path = PathBuf::from(cwd).join("page.json");
    if !page_path.exists() {
        let payload = PagePayload::new(PLACEHOLDER_HTML, "");
        fs::write(&page_path, payload.to_json()?)?;
        println!("  {} Created page.json", "✓".green());
    }

    let mut config = Config::default();
    if let Some(url) = args.api_base_url {
        config.api_base_url = url;
    }

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: pagecraft outline page.json");
    println!("  2. Run: pagecraft apply page.json --script steps.json");

    Ok(())
}
