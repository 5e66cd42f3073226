use anyhow::Result;
use clap::Parser;
use shared::{Config, RunOptions};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "data-report")]
#[command(about = "Build a news trend report from the New York Times most popular articles")]
struct Args {
    /// Popularity list to read (viewed, emailed, shared)
    #[arg(short, long, default_value = "viewed")]
    endpoint: String,

    /// Number of days the ranking covers (1, 7 or 30)
    #[arg(short, long, default_value = "7")]
    period: u32,

    /// Maximum number of articles to include
    #[arg(short, long, default_value = "30")]
    articles: usize,

    /// Where to write the report
    #[arg(short, long, default_value = shared::writer::DEFAULT_REPORT_PATH)]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let args = Args::parse();
    let config = Config::load()?;
    debug!(?config.report_check, ollama = %config.ollama_url, "configuration loaded");

    let options = RunOptions {
        endpoint: args.endpoint,
        period: args.period,
        articles: args.articles,
        output: args.output,
    };
    shared::run(&config, &options).await?;

    Ok(())
}
