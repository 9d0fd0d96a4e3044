mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    apply, components, fetch, init, outline, ApplyArgs, ComponentsArgs, FetchArgs, InitArgs,
    OutlineArgs,
};

/// Pagecraft CLI - headless landing-page editing
#[derive(Parser, Debug)]
#[command(name = "pagecraft")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new Pagecraft project
    Init(InitArgs),

    /// List the component palette
    Components(ComponentsArgs),

    /// Print the outline of a page
    Outline(OutlineArgs),

    /// Run scripted editing steps against a page
    Apply(ApplyArgs),

    /// Download a stored landing page
    Fetch(FetchArgs),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| {
            let cwd = cwd.display().to_string();
            match cli.command {
                Command::Init(args) => init(args, &cwd),
                Command::Components(args) => components(args),
                Command::Outline(args) => outline(args),
                Command::Apply(args) => apply(args, &cwd),
                Command::Fetch(args) => fetch(args, &cwd),
            }
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
