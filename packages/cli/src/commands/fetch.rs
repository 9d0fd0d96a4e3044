use super::write_payload;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_client::ApiClient;
use pagecraft_editor::PagePayload;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Landing page id
    pub page_id: String,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Bearer token (overrides config)
    #[arg(long, env = "PAGECRAFT_TOKEN")]
    pub token: Option<String>,
}

pub fn fetch(args: FetchArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;

    let mut client = ApiClient::new(&config.api_base_url)?;
    if let Some(token) = args.token.or(config.token) {
        client = client.with_token(token);
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let page = runtime.block_on(client.landing_page(&args.page_id))?;
    let title = page.title.clone();
    let payload = PagePayload::from(page);

    write_payload(&payload, args.out.as_deref())?;
    if let Some(out) = &args.out {
        println!(
            "  {} {} → {}",
            "✓".green(),
            if title.is_empty() { args.page_id.as_str() } else { title.as_str() },
            out.display()
        );
    }
    Ok(())
}
