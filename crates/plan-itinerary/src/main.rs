use anyhow::Result;
use clap::Parser;
use shared::itinerary::DEFAULT_PROMPT;
use shared::{Config, ItineraryPlanner};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "plan-itinerary")]
#[command(about = "Ask a chat model for a morning/afternoon/evening travel itinerary")]
struct Args {
    /// What to ask the model for
    #[arg(short, long, default_value = DEFAULT_PROMPT)]
    prompt: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let config = Config::load()?;
    let planner = ItineraryPlanner::from_config(&config)?;

    println!("🗺  {}", args.prompt);
    let itinerary = planner.plan(&args.prompt).await?;
    println!("\n{}", itinerary);

    Ok(())
}
