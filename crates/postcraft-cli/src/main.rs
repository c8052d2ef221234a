use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "postcraft")]
#[command(about = "Postcraft - AI-assisted social media post builder", long_about = None)]
struct Cli {
    /// Path to config.toml (defaults to ~/.config/postcraft/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Generation proxy URL; overrides [client].proxy_url
    #[arg(long, global = true)]
    proxy: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a post in one shot
    Generate(commands::generate::GenerateArgs),
    /// List platforms, post formats and tones
    Formats,
    /// Fill in the post form interactively
    Form,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = commands::context::Options {
        config: cli.config,
        proxy: cli.proxy,
    };

    match cli.command {
        Commands::Generate(args) => commands::generate::run(&options, args).await?,
        Commands::Formats => commands::formats::run(),
        Commands::Form => commands::form::run(&options).await?,
    }

    Ok(())
}
